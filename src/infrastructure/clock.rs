//! 考试倒计时
//!
//! 每秒触发一次；暂停期间时间冻结，恢复后从冻结的剩余值继续。
//! 剩余时间跌破零时触发一次 `on_expire` 并停止调度。

use crate::infrastructure::scheduler::{spawn_interval, TaskHandle};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct ClockState {
    remaining: AtomicI64,
    paused: AtomicBool,
    expired: AtomicBool,
}

/// 单个会话唯一的倒计时
#[derive(Debug, Default)]
pub struct Clock {
    state: Arc<ClockState>,
    task: Option<TaskHandle>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始倒计时；如果已有调度，先取消旧的
    pub fn start<T, E>(&mut self, duration_secs: u64, mut on_tick: T, on_expire: E)
    where
        T: FnMut(u64) + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        self.stop();

        // 每次启动使用新的状态，旧任务即使还没被中止也碰不到它
        let state = Arc::new(ClockState {
            remaining: AtomicI64::new(i64::try_from(duration_secs).unwrap_or(i64::MAX)),
            ..Default::default()
        });
        self.state = state.clone();

        let mut on_expire = Some(on_expire);
        self.task = Some(spawn_interval(Duration::from_secs(1), move || {
            if state.paused.load(Ordering::SeqCst) {
                return ControlFlow::Continue(());
            }
            let remaining = state.remaining.fetch_sub(1, Ordering::SeqCst) - 1;
            if remaining < 0 {
                state.remaining.store(0, Ordering::SeqCst);
                state.expired.store(true, Ordering::SeqCst);
                if let Some(expire) = on_expire.take() {
                    expire();
                }
                return ControlFlow::Break(());
            }
            on_tick(remaining as u64);
            ControlFlow::Continue(())
        }));
    }

    pub fn pause(&self) {
        self.state.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.state.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused.load(Ordering::SeqCst)
    }

    pub fn remaining(&self) -> u64 {
        self.state.remaining.load(Ordering::SeqCst).max(0) as u64
    }

    pub fn has_expired(&self) -> bool {
        self.state.expired.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(TaskHandle::is_active)
    }

    /// 停止调度，剩余时间保持不变
    pub fn stop(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.cancel();
        }
    }
}
