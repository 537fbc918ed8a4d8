//! 终端界面
//!
//! 把会话状态打印到标准输出；日志仍然走 tracing。

use tracing::debug;

use crate::models::TerminalOutcome;
use crate::services::StepList;
use crate::utils::format_seconds;
use crate::workflow::{ExerciseCtx, SessionView};

/// 最后这么多秒内每秒都显示倒计时
const FINAL_COUNTDOWN_SECS: u64 = 10;

/// 终端界面
#[derive(Debug, Default)]
pub struct ConsoleView {
    sending: bool,
}

impl ConsoleView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionView for ConsoleView {
    fn render_time(&mut self, remaining_secs: u64) {
        // 每分钟整点和最后十秒才打印，避免刷屏
        if remaining_secs % 60 == 0 || remaining_secs <= FINAL_COUNTDOWN_SECS {
            println!("Tiempo: {}", format_seconds(remaining_secs));
        } else {
            debug!("Tiempo: {}", format_seconds(remaining_secs));
        }
    }

    fn render_exercise(&mut self, ctx: &ExerciseCtx) {
        println!("\n{}", "─".repeat(60));
        println!("Ejercicio #{}", ctx.exercise.id);
        println!("{}", ctx.exercise.display_text);
        if ctx.hint_visible && !ctx.exercise.hint.is_empty() {
            println!("Pista: {}", ctx.exercise.hint);
        }
        if let Some(line) = estimate_line(ctx) {
            println!("{}", line);
        }
        println!("{}", "─".repeat(60));
    }

    fn render_steps(&mut self, steps: &StepList) {
        for (i, field) in steps.fields().iter().enumerate() {
            let marker = if i == steps.focused() { '>' } else { ' ' };
            println!("{} {}. {}", marker, i + 1, field);
        }
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        debug!("提交按钮: {}", if enabled { "可用" } else { "禁用" });
    }

    fn show_sending(&mut self, visible: bool) {
        if visible && !self.sending {
            println!("Enviando respuesta...");
        }
        self.sending = visible;
    }

    fn show_error(&mut self, message: &str) {
        println!("⚠️ {}", message);
    }

    fn show_terminal(&mut self, outcome: &TerminalOutcome) {
        println!("\n{}", "=".repeat(60));
        println!("{}", outcome.message());
        if let Some(theta) = outcome.theta {
            println!("θ = {:.3}", theta);
        }
        if let Some(se) = outcome.standard_error {
            println!("SE = {:.3}", se);
        }
        println!("{}", "=".repeat(60));
    }

    fn navigate(&mut self, url: &str) {
        println!("→ {}", url);
    }
}

/// 已答题数和能力估计；第一题之前没有
fn estimate_line(ctx: &ExerciseCtx) -> Option<String> {
    let theta = ctx.theta?;
    let mut line = format!("Respondidos: {} | θ = {:.3}", ctx.answered, theta);
    if let Some(se) = ctx.standard_error {
        line.push_str(&format!(" | SE = {:.3}", se));
    }
    Some(line)
}
