//! 实时翻译模块
//!
//! 文本变化经过防抖后才发起翻译；语言切换立即对已稳定的文本重新翻译。
//! 每个请求领取一个单调递增的序号，完成时若已有更新的请求发出，则丢弃该结果，
//! 保证结果按请求的先后而非响应到达的先后生效。

// 标准库导入
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

// 第三方crate导入
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

// 本地模块导入
use crate::api_constants::error_messages;
use crate::debounce::Debouncer;
use crate::translator::Translate;

/// 推送给结果接收方的一次更新
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveUpdate {
    /// 请求序号
    pub seq: u64,
    /// 原文
    pub original: String,
    pub from: String,
    pub to: String,
    /// 译文，或固定的失败提示
    pub text: String,
}

impl LiveUpdate {
    /// 是否为调用失败时推送的固定提示，而非真实译文
    pub fn is_failure(&self) -> bool {
        self.text == error_messages::LIVE_TRANSLATION_FAILED
    }
}

#[derive(Debug, Default, Clone)]
struct LiveState {
    settled_text: String,
    source: String,
    target: String,
}

struct Shared<T> {
    translator: T,
    latest_seq: AtomicU64,
    in_flight: AtomicUsize,
    state: Mutex<LiveState>,
    sink: UnboundedSender<LiveUpdate>,
}

impl<T> Shared<T> {
    fn state(&self) -> MutexGuard<'_, LiveState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 领取下一个序号；调用方必须持有 `state` 锁，序号顺序才与状态写入顺序一致
    fn next_seq(&self, _state: &MutexGuard<'_, LiveState>) -> u64 {
        self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl<T: Translate + 'static> Shared<T> {
    /// 文本已稳定：与上次稳定文本相同则不重复请求
    fn settle(self: &Arc<Self>, text: String) {
        let (seq, source, target) = {
            let mut state = self.state();
            if state.settled_text == text {
                debug!("⏭️  文本未变化，跳过翻译");
                return;
            }
            state.settled_text = text.clone();
            (self.next_seq(&state), state.source.clone(), state.target.clone())
        };

        self.issue(seq, text, source, target);
    }

    /// 发出序号为 `seq` 的翻译请求；空白文本只作废尚在途中的旧请求
    fn issue(self: &Arc<Self>, seq: u64, text: String, source: String, target: String) {
        if text.trim().is_empty() {
            return;
        }

        let shared = Arc::clone(self);
        shared.in_flight.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            let result = shared.translator.translate(&text, &source, &target).await;
            shared.in_flight.fetch_sub(1, Ordering::SeqCst);

            let translated = match result {
                Ok(translated) => translated,
                Err(e) => {
                    warn!("❌ 实时翻译失败: {}", e);
                    error_messages::LIVE_TRANSLATION_FAILED.to_string()
                }
            };

            let latest = shared.latest_seq.load(Ordering::SeqCst);
            if latest != seq {
                debug!("🗑️  丢弃过期结果 #{} (最新 #{})", seq, latest);
                return;
            }

            let _ = shared.sink.send(LiveUpdate {
                seq,
                original: text,
                from: source,
                to: target,
                text: translated,
            });
        });
    }
}

/// 边输入边翻译
pub struct LiveTranslator<T> {
    shared: Arc<Shared<T>>,
    debouncer: Debouncer,
}

impl<T: Translate + 'static> LiveTranslator<T> {
    /// 创建实时翻译器，结果通过 `sink` 推送
    pub fn new(
        translator: T,
        source: &str,
        target: &str,
        window: Duration,
        sink: UnboundedSender<LiveUpdate>,
    ) -> Self {
        let state = LiveState {
            settled_text: String::new(),
            source: source.to_string(),
            target: target.to_string(),
        };

        Self {
            shared: Arc::new(Shared {
                translator,
                latest_seq: AtomicU64::new(0),
                in_flight: AtomicUsize::new(0),
                state: Mutex::new(state),
                sink,
            }),
            debouncer: Debouncer::new(window),
        }
    }

    /// 文本发生变化；静默窗口结束后才翻译
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        let shared = Arc::clone(&self.shared);
        self.debouncer.schedule(async move {
            shared.settle(text);
        });
    }

    /// 切换语言对；有稳定文本时立即重新翻译
    pub fn set_languages(&mut self, source: &str, target: &str) {
        let (seq, text) = {
            let mut state = self.shared.state();
            if state.source == source && state.target == target {
                return;
            }
            state.source = source.to_string();
            state.target = target.to_string();
            (self.shared.next_seq(&state), state.settled_text.clone())
        };

        debug!("🔁 语言切换为 {} -> {}", source, target);
        self.shared
            .issue(seq, text, source.to_string(), target.to_string());
    }

    pub fn set_source(&mut self, source: &str) {
        let target = self.target();
        self.set_languages(source, &target);
    }

    pub fn set_target(&mut self, target: &str) {
        let source = self.source();
        self.set_languages(&source, target);
    }

    pub fn source(&self) -> String {
        self.shared.state().source.clone()
    }

    pub fn target(&self) -> String {
        self.shared.state().target.clone()
    }

    /// 最近一次稳定下来的文本
    pub fn settled_text(&self) -> String {
        self.shared.state().settled_text.clone()
    }

    /// 已发出的最新请求序号
    pub fn latest_seq(&self) -> u64 {
        self.shared.latest_seq.load(Ordering::SeqCst)
    }

    /// 是否有尚未触发的防抖定时器
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// 尚未返回的翻译请求数
    pub fn in_flight(&self) -> usize {
        self.shared.in_flight.load(Ordering::SeqCst)
    }

    /// 既没有挂起的定时器也没有在途请求
    pub fn is_idle(&self) -> bool {
        !self.is_pending() && self.in_flight() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::translation_error;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    /// 以 "文本@目标语言" 作为译文，可为特定文本设置延迟或失败
    struct ScriptedTranslator {
        calls: Arc<Mutex<Vec<(String, String, String)>>>,
        slow_text: Option<&'static str>,
        failures: AtomicUsize,
    }

    impl ScriptedTranslator {
        fn new(calls: Arc<Mutex<Vec<(String, String, String)>>>) -> Self {
            Self {
                calls,
                slow_text: None,
                failures: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Translate for ScriptedTranslator {
        async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), from.to_string(), to.to_string()));

            let delay = if self.slow_text == Some(text) { 2_000 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;

            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(translation_error!(network, "timeout"));
            }
            Ok(format!("{}@{}", text, to))
        }
    }

    type Calls = Arc<Mutex<Vec<(String, String, String)>>>;

    fn live(
        translator: ScriptedTranslator,
    ) -> (LiveTranslator<ScriptedTranslator>, mpsc::UnboundedReceiver<LiveUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let live = LiveTranslator::new(translator, "en", "hi", Duration::from_millis(500), tx);
        (live, rx)
    }

    fn sleep(ms: u64) -> tokio::time::Sleep {
        tokio::time::sleep(Duration::from_millis(ms))
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_latest_input_is_translated() {
        let calls = Calls::default();
        let (mut live, mut rx) = live(ScriptedTranslator::new(calls.clone()));

        live.set_text("A");
        sleep(200).await;
        live.set_text("B");
        sleep(600).await;

        assert_eq!(calls.lock().unwrap().len(), 1);
        assert_eq!(calls.lock().unwrap()[0].0, "B");
        let update = rx.try_recv().unwrap();
        assert_eq!(update.text, "B@hi");
        assert_eq!((update.original.as_str(), update.from.as_str()), ("B", "en"));
        assert!(rx.try_recv().is_err());
        assert!(live.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_stale_result_is_discarded() {
        let calls = Calls::default();
        let mut translator = ScriptedTranslator::new(calls.clone());
        translator.slow_text = Some("A");
        let (mut live, mut rx) = live(translator);

        live.set_text("A");
        sleep(600).await;
        live.set_text("B");
        sleep(600).await;
        assert_eq!(live.in_flight(), 1);
        // A 的响应在 B 之后才到达
        sleep(3_000).await;

        assert_eq!(calls.lock().unwrap().len(), 2);
        let update = rx.try_recv().unwrap();
        assert_eq!(update.text, "B@hi");
        assert_eq!(update.seq, 2);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_language_change_reissues_immediately() {
        let calls = Calls::default();
        let (mut live, mut rx) = live(ScriptedTranslator::new(calls.clone()));

        live.set_text("hello");
        sleep(600).await;
        assert_eq!(rx.try_recv().unwrap().text, "hello@hi");

        live.set_target("fr");
        sleep(20).await;
        assert_eq!(rx.try_recv().unwrap().text, "hello@fr");

        // 相同语言对不会重复请求
        live.set_languages("en", "fr");
        sleep(20).await;
        assert!(rx.try_recv().is_err());

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[1],
            ("hello".to_string(), "en".to_string(), "fr".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_text_issues_nothing() {
        let calls = Calls::default();
        let (mut live, mut rx) = live(ScriptedTranslator::new(calls.clone()));

        live.set_text("   ");
        sleep(600).await;
        live.set_source("fr");
        sleep(20).await;

        assert!(calls.lock().unwrap().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_settled_text_is_not_retranslated() {
        let calls = Calls::default();
        let (mut live, mut rx) = live(ScriptedTranslator::new(calls.clone()));

        live.set_text("hello");
        sleep(600).await;
        live.set_text("hello!");
        sleep(100).await;
        live.set_text("hello");
        sleep(600).await;

        assert_eq!(calls.lock().unwrap().len(), 1);
        assert_eq!(rx.try_recv().unwrap().text, "hello@hi");
        assert!(rx.try_recv().is_err());
        assert_eq!(live.settled_text(), "hello");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_delivers_sentinel() {
        let calls = Calls::default();
        let translator = ScriptedTranslator::new(calls.clone());
        translator.failures.store(1, Ordering::SeqCst);
        let (mut live, mut rx) = live(translator);

        live.set_text("hello");
        sleep(600).await;

        let update = rx.try_recv().unwrap();
        assert_eq!(update.text, "Live translation failed.");
        assert!(update.is_failure());

        live.set_text("hello again");
        sleep(600).await;
        assert!(!rx.try_recv().unwrap().is_failure());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_text_invalidates_in_flight_result() {
        let calls = Calls::default();
        let mut translator = ScriptedTranslator::new(calls.clone());
        translator.slow_text = Some("hello");
        let (mut live, mut rx) = live(translator);

        live.set_text("hello");
        sleep(600).await;
        live.set_text("");
        sleep(3_000).await;

        assert_eq!(calls.lock().unwrap().len(), 1);
        assert!(rx.try_recv().is_err());
        assert_eq!(live.latest_seq(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequence_follows_state_writes() {
        let calls = Calls::default();
        let (mut live, mut rx) = live(ScriptedTranslator::new(calls.clone()));

        // 先稳定文本（旧语言对），再切换语言：后写入状态的请求序号更大
        live.shared.settle("hello".to_string());
        live.set_languages("fr", "de");
        assert_eq!(live.latest_seq(), 2);
        sleep(50).await;

        let update = rx.try_recv().unwrap();
        assert_eq!(update.seq, 2);
        assert_eq!((update.from.as_str(), update.to.as_str()), ("fr", "de"));
        assert_eq!(update.text, "hello@de");
        assert!(rx.try_recv().is_err());
        assert_eq!(calls.lock().unwrap().len(), 2);
    }
}
