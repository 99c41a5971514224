//! 生成阶段的模拟进度
//!
//! 进度条与真实完成度无关，只是在请求未返回前平滑地推进到 95%，
//! 请求返回后由调用方 [`ProgressEstimator::finish`] 拉满到 100%。
//! 预计剩余时间按秒倒数，跌破零后显示 "Finishing up..."。

use crate::infrastructure::scheduler::{spawn_interval, TaskHandle};
use crate::utils::format_mm_ss;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// 请求返回前进度的上限（百分比）
pub const PROGRESS_CAP: f64 = 95.0;

/// 预计剩余时间的显示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Remaining(u64),
    FinishingUp,
}

impl std::fmt::Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Countdown::Remaining(secs) => {
                write!(f, "Estimated Time Remaining: {}", format_mm_ss(*secs))
            }
            Countdown::FinishingUp => write!(f, "Finishing up..."),
        }
    }
}

/// 加载界面的状态快照
#[derive(Debug, Clone, PartialEq)]
pub struct LoadingStatus {
    pub caption: String,
    /// 0.0 ~ 100.0
    pub progress: f64,
    pub countdown: Countdown,
    pub active: bool,
}

impl Default for LoadingStatus {
    fn default() -> Self {
        Self {
            caption: String::new(),
            progress: 0.0,
            countdown: Countdown::Remaining(0),
            active: false,
        }
    }
}

/// 预估总耗时：条目数 × 每条耗时
pub fn estimate_total_secs(items: usize, seconds_per_item: u64) -> u64 {
    (items as u64).saturating_mul(seconds_per_item)
}

/// 模拟进度
///
/// 进度条和倒计时是两个独立的调度，总是一起取消
#[derive(Debug)]
pub struct ProgressEstimator {
    status: Arc<watch::Sender<LoadingStatus>>,
    bar: TaskHandle,
    countdown: TaskHandle,
}

impl ProgressEstimator {
    pub fn start(
        status: Arc<watch::Sender<LoadingStatus>>,
        caption: impl Into<String>,
        estimated_total_secs: u64,
        tick: Duration,
    ) -> Self {
        status.send_replace(LoadingStatus {
            caption: caption.into(),
            progress: 0.0,
            countdown: Countdown::Remaining(estimated_total_secs),
            active: true,
        });

        let tick_ms = tick.as_millis().max(1) as u64;
        let total_intervals = (estimated_total_secs.saturating_mul(1000) / tick_ms).max(1);
        let bar_status = status.clone();
        let mut current = 0u64;
        let bar = spawn_interval(tick, move || {
            if current >= total_intervals {
                return ControlFlow::Break(());
            }
            current += 1;
            let progress = current as f64 / total_intervals as f64 * PROGRESS_CAP;
            bar_status.send_modify(|s| s.progress = progress);
            ControlFlow::Continue(())
        });

        let countdown_status = status.clone();
        let mut remaining = i64::try_from(estimated_total_secs).unwrap_or(i64::MAX);
        let countdown = spawn_interval(Duration::from_secs(1), move || {
            remaining -= 1;
            if remaining >= 0 {
                countdown_status
                    .send_modify(|s| s.countdown = Countdown::Remaining(remaining as u64));
                ControlFlow::Continue(())
            } else {
                countdown_status.send_modify(|s| s.countdown = Countdown::FinishingUp);
                ControlFlow::Break(())
            }
        });

        Self {
            status,
            bar,
            countdown,
        }
    }

    pub fn snapshot(&self) -> LoadingStatus {
        self.status.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.bar.is_active() || self.countdown.is_active()
    }

    /// 请求完成：取消调度并拉满进度
    pub fn finish(&mut self) {
        self.stop_schedules();
        self.status.send_modify(|s| {
            s.progress = 100.0;
            s.active = false;
        });
    }

    /// 中止：取消调度，进度保持当前值
    pub fn cancel(&mut self) {
        self.stop_schedules();
        self.status.send_modify(|s| s.active = false);
    }

    fn stop_schedules(&mut self) {
        self.bar.cancel();
        self.countdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn channel() -> Arc<watch::Sender<LoadingStatus>> {
        Arc::new(watch::channel(LoadingStatus::default()).0)
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_approaches_cap_without_exceeding() {
        let status = channel();
        let estimator = ProgressEstimator::start(
            status.clone(),
            "Building Mock Test...",
            2,
            Duration::from_millis(100),
        );

        sleep(Duration::from_millis(1_050)).await;
        let snap = estimator.snapshot();
        assert_eq!(snap.progress, 47.5);
        assert_eq!(snap.countdown, Countdown::Remaining(1));
        assert!(snap.active);

        sleep(Duration::from_secs(5)).await;
        let snap = estimator.snapshot();
        assert_eq!(snap.progress, PROGRESS_CAP);
        assert_eq!(snap.countdown, Countdown::FinishingUp);
        assert!(!estimator.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_snaps_to_full_and_cancels() {
        let status = channel();
        let mut rx = status.subscribe();
        let mut estimator =
            ProgressEstimator::start(status.clone(), "Generating", 40, Duration::from_millis(100));
        sleep(Duration::from_millis(550)).await;
        assert!(estimator.snapshot().progress < PROGRESS_CAP);

        estimator.finish();
        let snap = rx.borrow_and_update().clone();
        assert_eq!(snap.progress, 100.0);
        assert!(!snap.active);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(estimator.snapshot().progress, 100.0);
        assert_eq!(estimator.snapshot().countdown, Countdown::Remaining(40));
        assert!(!estimator.is_running());

        // 完成后再次取消是空操作
        estimator.cancel();
        estimator.finish();
        assert_eq!(estimator.snapshot().progress, 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_keeps_partial_progress() {
        let status = channel();
        let mut estimator =
            ProgressEstimator::start(status, "Generating", 10, Duration::from_millis(100));
        sleep(Duration::from_millis(1_050)).await;
        estimator.cancel();
        let frozen = estimator.snapshot();
        assert!(frozen.progress > 0.0 && frozen.progress < PROGRESS_CAP);
        assert!(!frozen.active);

        sleep(Duration::from_secs(3)).await;
        assert_eq!(estimator.snapshot(), frozen);
    }

    #[test]
    fn test_countdown_labels() {
        assert_eq!(
            Countdown::Remaining(75).to_string(),
            "Estimated Time Remaining: 01:15"
        );
        assert_eq!(Countdown::FinishingUp.to_string(), "Finishing up...");
        assert_eq!(estimate_total_secs(10, 4), 40);
    }
}
