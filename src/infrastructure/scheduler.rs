//! 协作式调度原语
//!
//! 所有周期性 / 延时任务都通过这里创建，并返回 [`TaskHandle`]。
//! 句柄被取消或被 drop 时，后台任务随之中止。

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// 可取消的后台任务句柄
#[derive(Debug)]
pub struct TaskHandle {
    inner: Option<JoinHandle<()>>,
}

impl TaskHandle {
    /// 取消任务；对已结束或已取消的任务调用是空操作
    pub fn cancel(&mut self) {
        if let Some(handle) = self.inner.take() {
            handle.abort();
        }
    }

    /// 任务是否仍在调度中
    pub fn is_active(&self) -> bool {
        self.inner.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// 每隔 `period` 调用一次 `tick`，首次调用发生在一个周期之后
///
/// `tick` 返回 `ControlFlow::Break` 时任务自行结束
pub fn spawn_interval<F>(period: Duration, mut tick: F) -> TaskHandle
where
    F: FnMut() -> ControlFlow<()> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if tick().is_break() {
                break;
            }
        }
    });
    TaskHandle {
        inner: Some(handle),
    }
}

/// 延时 `delay` 后执行一次 `f`
pub fn spawn_after<F>(delay: Duration, f: F) -> TaskHandle
where
    F: FnOnce() + Send + 'static,
{
    let handle = tokio::spawn(async move {
        time::sleep(delay).await;
        f();
    });
    TaskHandle {
        inner: Some(handle),
    }
}

/// 在后台运行一个一次性的异步任务，例如一次网络请求
pub fn spawn_task<F>(task: F) -> TaskHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    TaskHandle {
        inner: Some(tokio::spawn(task)),
    }
}
