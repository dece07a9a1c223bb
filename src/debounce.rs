//! 可取消的防抖定时器
//!
//! 每次 [`Debouncer::schedule`] 都会取消尚未触发的上一个任务，保证任意时刻最多只有一个定时器存在。

// 标准库导入
use std::future::Future;
use std::time::Duration;

// 第三方crate导入
use tokio::task::JoinHandle;
use tracing::debug;

/// 单次触发的防抖器
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// 创建防抖器
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// 静默窗口
    pub fn window(&self) -> Duration {
        self.window
    }

    /// 在静默窗口结束后执行任务；已挂起的任务会被取消
    ///
    /// 必须在tokio运行时内调用。
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.cancel() {
            debug!("⏱️  输入未稳定，重置防抖定时器");
        }

        let window = self.window;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            task.await;
        }));
    }

    /// 取消挂起的任务，返回是否确实取消了一个未完成的任务
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                let was_pending = !handle.is_finished();
                handle.abort();
                was_pending
            }
            None => false,
        }
    }

    /// 是否有尚未完成的任务
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
