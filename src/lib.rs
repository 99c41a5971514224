//! # Quiz Session
//!
//! 自适应测验的客户端考试引擎：配置考试、向出题服务请求题目、
//! 计时作答（支持暂停）、评分并逐题回顾。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 只提供"时间"相关的能力
//! - `TaskHandle` - 可取消的后台任务，drop 时自动中止
//! - `Clock` - 每秒一次的考试倒计时
//! - `ProgressEstimator` - 出题期间的模拟进度
//!
//! ### ② 业务能力层（Services）
//! - `clients/` - 出题服务的 HTTP 接口（`QuizApi` trait + reqwest 实现）
//! - `GenerationService` - 单主题 / 整科模拟出题
//! - `scoring_service` - 评分
//! - `HintService` - 针对当前题目的提示
//!
//! ### ③ 流程层（Workflow）
//! - `ConfigurationFlow` - 模式 → 科目 → 主题 → 参数
//! - `Session` - 导航、作答、暂停、提交
//! - `ReviewNavigator` - 交卷后的只读回顾
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/test_runner` - 状态机，唯一的会话修改者
//! - `orchestrator/app` - 终端前端
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{QuizApi, QuizClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Catalog, Question, TestMode, TestRequest};
pub use orchestrator::{App, Intent, Notice, Screen, TestRunner};
pub use workflow::{ConfigurationFlow, ReviewNavigator, Session};
