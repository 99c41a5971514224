//! 基础设施层（Infrastructure Layer）
//!
//! 只提供"时间"相关的能力：可取消的调度、考试倒计时、生成进度模拟。
//! 不认识 Question / Session，不处理业务流程。

pub mod clock;
pub mod progress;
pub mod scheduler;

pub use clock::Clock;
pub use progress::{estimate_total_secs, Countdown, LoadingStatus, ProgressEstimator};
pub use scheduler::{spawn_after, spawn_interval, spawn_task, TaskHandle};
