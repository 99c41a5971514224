//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层把各层能力串成完整的考试流程，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `test_runner` - 考试运行器
//! - 持有配置流程、出题服务、倒计时与提示服务
//! - 唯一修改会话的地方
//! - 接收用户操作与后台事件，产出界面与提示
//!
//! ### `app` - 终端前端
//! - 读取标准输入并解析命令
//! - 打印当前界面与加载进度
//!
//! ## 层次关系
//!
//! ```text
//! app (命令行输入 / 输出)
//!     ↓
//! test_runner (状态机 + 事件通道)
//!     ↓
//! workflow (ConfigurationFlow / Session / ReviewNavigator)
//!     ↓
//! services (出题 / 评分 / 提示)
//!     ↓
//! clients + infrastructure (HTTP / 调度 / 倒计时 / 进度)
//! ```

pub mod app;
pub mod test_runner;

// 重新导出主要类型
pub use app::{parse_command, App, Command, CommandContext};
pub use test_runner::{EventKind, Intent, Notice, Screen, SessionEvent, TestRunner};
