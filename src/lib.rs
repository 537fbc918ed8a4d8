//! # Diagnóstico Client
//!
//! 自适应诊断测验的客户端控制器
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有后台计时任务，只暴露能力
//! - `CountdownTimer` - 以服务器给出的基准秒数为起点的倒计时
//!
//! ### ② 业务能力层（Services / Clients）
//! - `services/` - `StepList`，学生作答步骤的有序列表
//! - `clients/` - `AnswerTransport` 提交接口，`DiagnosticClient` 是 HTTP 实现
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次提交"的完整流程
//! - `ExerciseCtx` - 当前题目上下文
//! - `SubmissionController` - 提交状态机（Idle → Submitting → Terminal）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/session` - 页面控制器，串起计时、输入和提交
//! - `orchestrator/console_view` / `input` - 终端前端
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
pub use clients::{AnswerTransport, DiagnosticClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{CountdownTimer, RemainingTime};
pub use models::{
    Exercise, PageData, ServerOutcome, SubmissionPayload, TerminalOutcome, TerminalReason,
};
pub use orchestrator::{ConsoleView, DiagnosticSession, SessionSummary, UserCommand};
pub use services::StepList;
pub use workflow::{
    ExerciseCtx, SessionView, SubmissionController, SubmissionState, Transition, Trigger,
};
