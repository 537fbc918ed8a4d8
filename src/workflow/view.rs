//! 界面投影
//!
//! 模型（步骤列表、当前题目、计时）是唯一的事实来源，
//! 界面只负责把它们画出来。

use crate::models::TerminalOutcome;
use crate::services::StepList;
use crate::workflow::ExerciseCtx;

/// 面向学生的提示文案
pub mod messages {
    pub const EMPTY_STEPS: &str = "Completa al menos un paso.";
    pub const SEND_FAILED: &str = "No se pudo enviar la respuesta.";
    pub const MISSING_START: &str = "Error: no se pudo determinar cuándo comenzó la prueba.";
}

/// 诊断页面的界面
pub trait SessionView {
    /// 倒计时显示
    fn render_time(&mut self, remaining_secs: u64);
    /// 题干 / 提示
    fn render_exercise(&mut self, ctx: &ExerciseCtx);
    /// 步骤输入框
    fn render_steps(&mut self, steps: &StepList);
    /// 提交按钮是否可用
    fn set_submit_enabled(&mut self, enabled: bool);
    /// "正在发送" 提示
    fn show_sending(&mut self, visible: bool);
    /// 给学生的错误提示
    fn show_error(&mut self, message: &str);
    /// 结束信息（原因和可选的分数）
    fn show_terminal(&mut self, outcome: &TerminalOutcome);
    /// 离开页面
    fn navigate(&mut self, url: &str);
}
