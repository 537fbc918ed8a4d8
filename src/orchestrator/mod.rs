//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `session` - 诊断会话
//! - 持有倒计时器、提交控制器和界面
//! - 单线程事件循环：计时事件 / 用户命令 / 正在进行的请求
//! - 结束时停止计时并跳转
//!
//! ### `console_view` / `input` - 终端前端
//! - 把会话状态打印到终端
//! - 把标准输入翻译成用户命令
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::session (页面控制器)
//!     ↓
//! workflow::SubmissionController (提交状态机)
//!     ↓
//! services::StepList / clients::AnswerTransport
//!     ↓
//! infrastructure::CountdownTimer
//! ```

pub mod console_view;
pub mod input;
pub mod session;

pub use console_view::ConsoleView;
pub use session::{DiagnosticSession, SessionSummary, UserCommand};
