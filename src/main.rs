use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use lingo_cli::api_constants::{is_supported_language, is_valid_api_url, language_name};
use lingo_cli::charset::script_ratios;
use lingo_cli::config::{Cli, Command, LocalTranslationConfig, TranslateArgs};
use lingo_cli::detector::{
    DebouncedDetector, FixedLocale, LanguageDetector, LocaleSource, SystemLocale,
};
use lingo_cli::dictionary::DictionaryClient;
use lingo_cli::history::{RecentTranslation, RecentTranslations};
use lingo_cli::live::{LiveTranslator, LiveUpdate};
use lingo_cli::report::write_report;
use lingo_cli::share::{generate_shareable_link, params_from_url};
use lingo_cli::stats::{print_session_stats, SessionStats};
use lingo_cli::translator::{translate_on_demand, MyMemoryClient, TranslationOutcome};
use lingo_cli::utils::{init_logging, read_input, validate_input_source};
use lingo_cli::voice::{select_voice, Voice};

type Detector = LanguageDetector<DictionaryClient, FixedLocale>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志系统
    init_logging(cli.verbose, cli.quiet);

    let config = cli.to_config();
    if !is_valid_api_url(config.api_url()) {
        anyhow::bail!("无效的翻译API地址: {}", config.api_url());
    }

    let locale = FixedLocale(cli.locale.clone().or_else(|| SystemLocale.locale()));
    let dictionary = DictionaryClient::new(config.dictionary_url(), config.request_timeout())
        .context("创建词典客户端失败")?;
    let detector = Arc::new(
        LanguageDetector::new(dictionary, locale)
            .context("创建语言检测器失败")?
            .with_cache(config.is_cache_enabled()),
    );
    let translator = MyMemoryClient::new(config.api_url(), config.request_timeout())
        .context("创建翻译客户端失败")?;

    let total_start = Instant::now();
    let mut stats = SessionStats::default();

    let result = match &cli.command {
        Command::Translate(args) => {
            run_translate(args, &translator, &detector, &mut stats).await.and_then(|(_, outcome)| {
                println!("{}", outcome.as_str());
                ensure_translated(&outcome)
            })
        }
        Command::Detect { text } => {
            run_detect(text, &detector).await;
            Ok(())
        }
        Command::Live { from, to } => {
            run_live(from.as_deref(), to, &config, translator, detector.clone(), &mut stats).await
        }
        Command::Share { text, from, to, base } => generate_shareable_link(base, text, from, to)
            .map(|link| println!("{}", link))
            .map_err(anyhow::Error::from),
        Command::Open { link } => run_open(link, &config, &translator, &mut stats).await,
        Command::Export { input, output } => {
            run_translate(input, &translator, &detector, &mut stats)
                .await
                .and_then(|(original, outcome)| {
                    if !outcome.is_translated() {
                        println!("{}", outcome.as_str());
                        return ensure_translated(&outcome);
                    }
                    write_report(output, &original, outcome.as_str())?;
                    println!("{}", output.display());
                    Ok(())
                })
        }
        Command::Voices { lang, available } => {
            let voices: Vec<Voice> = available.iter().map(|tag| Voice::new(tag, tag)).collect();
            match select_voice(&voices, lang) {
                Some(voice) => println!("{}", voice.lang),
                None => warn!("⚠️  没有可用于 {} 的语音", lang),
            }
            Ok(())
        }
    };

    if cli.stats || cli.verbose {
        stats.detector = detector.stats();
        print_session_stats(&stats, total_start.elapsed());
    }

    if let Err(e) = result {
        error!("❌ 执行失败: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// 手动翻译，返回原文与译文；`--detect` 时用检测结果覆盖源语言
async fn run_translate(
    args: &TranslateArgs,
    translator: &MyMemoryClient,
    detector: &Detector,
    stats: &mut SessionStats,
) -> Result<(String, TranslationOutcome)> {
    let source = validate_input_source(args.text.as_deref(), args.file.as_ref())?;
    let text = read_input(&source)?;

    let mut from = args.from.clone();
    if args.detect {
        match detector.detect(&text).await {
            Some(detected) => {
                info!("🔍 检测到源语言: {}", detected);
                from = detected;
            }
            None => debug!("未检测到语言，保留 {}", from),
        }
    }

    if !is_supported_language(&args.to) {
        warn!("⚠️  目标语言可能不受支持: {}", args.to);
    }

    info!("🌐 {} -> {}", from, args.to);
    let outcome = translate_on_demand(translator, &text, &from, &args.to).await;
    if outcome.is_translated() {
        stats.record_translation(&text, outcome.as_str());
    }

    Ok((text, outcome))
}

/// 译文或固定提示已输出到标准输出；未得到译文时以非零状态退出
fn ensure_translated(outcome: &TranslationOutcome) -> Result<()> {
    if !outcome.is_translated() {
        anyhow::bail!("{}", outcome.as_str());
    }
    Ok(())
}

async fn run_detect(text: &str, detector: &Detector) {
    for (lang, ratio) in script_ratios(text) {
        debug!("   {}: {:.1}%", lang, ratio * 100.0);
    }

    match detector.detect(text).await {
        Some(lang) => {
            let name = language_name(&lang).unwrap_or("Unknown");
            println!("{} ({})", lang, name);
        }
        None => println!("unknown"),
    }
}

/// 打开分享链接，缺失的语言参数使用默认配置
async fn run_open(
    link: &str,
    config: &LocalTranslationConfig,
    translator: &MyMemoryClient,
    stats: &mut SessionStats,
) -> Result<()> {
    let params = params_from_url(link);
    let text = params.text.context("分享链接中没有 text 参数")?;
    let from = params.from.unwrap_or_else(|| config.source_lang().to_string());
    let to = params.to.unwrap_or_else(|| config.target_lang().to_string());

    info!("🔗 {} -> {}: {}", from, to, text);
    let outcome = translate_on_demand(translator, &text, &from, &to).await;
    if outcome.is_translated() {
        stats.record_translation(&text, outcome.as_str());
    }

    println!("{}", outcome.as_str());
    ensure_translated(&outcome)
}

/// 实时翻译：每行标准输入视为输入框的最新内容
///
/// 显式指定 `--from` 时源语言锁定，检测结果不会覆盖它。
async fn run_live(
    from: Option<&str>,
    to: &str,
    config: &LocalTranslationConfig,
    translator: MyMemoryClient,
    detector: Arc<Detector>,
    stats: &mut SessionStats,
) -> Result<()> {
    let (live_tx, mut live_rx) = mpsc::unbounded_channel();
    let (detect_tx, mut detect_rx) = mpsc::unbounded_channel();

    // 用户显式选择源语言后不再被检测结果覆盖
    let mut source_locked = from.is_some();
    let from = from.unwrap_or(config.source_lang());

    let mut live = LiveTranslator::new(translator, from, to, config.debounce_window(), live_tx);
    let mut debounced = DebouncedDetector::new(detector, config.debounce_window(), detect_tx);
    let mut history = RecentTranslations::default();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("⌨️  实时翻译已启动 ({} -> {})，输入 :from xx / :to xx / :history / :quit", from, to);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("读取标准输入失败")? else {
                    break;
                };

                if let Some(lang) = line.strip_prefix(":from ") {
                    source_locked = true;
                    live.set_source(lang.trim());
                } else if let Some(lang) = line.strip_prefix(":to ") {
                    live.set_target(lang.trim());
                } else if line.trim() == ":history" {
                    println!("{}", history.to_json()?);
                } else if line.trim() == ":quit" {
                    break;
                } else {
                    if !source_locked {
                        debounced.submit(line.clone());
                    }
                    live.set_text(line);
                }
            }
            Some(update) = live_rx.recv() => {
                print_live_update(&update, stats);
                if !update.is_failure() {
                    history.push(RecentTranslation::new(
                        &update.original,
                        &update.text,
                        &update.from,
                        &update.to,
                    ));
                }
            }
            Some(detection) = detect_rx.recv() => {
                if let Some(lang) = detection.lang {
                    if !source_locked && lang != live.source() {
                        info!("🔍 检测到源语言: {}", lang);
                        live.set_source(&lang);
                    }
                }
            }
        }
    }

    // 输入结束后等待挂起的翻译完成
    debounced.cancel();
    while !live.is_idle() {
        tokio::select! {
            Some(update) = live_rx.recv() => print_live_update(&update, stats),
            _ = tokio::time::sleep(Duration::from_millis(50)) => {}
        }
    }
    while let Ok(update) = live_rx.try_recv() {
        print_live_update(&update, stats);
    }

    Ok(())
}

fn print_live_update(update: &LiveUpdate, stats: &mut SessionStats) {
    stats.live_updates += 1;
    if !update.is_failure() {
        stats.record_translation(&update.original, &update.text);
    }
    println!("{}", update.text);
}
