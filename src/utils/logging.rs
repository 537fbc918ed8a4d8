/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::TerminalOutcome;

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG`，否则根据 `verbose` 选择 debug / info。
/// 重复调用是安全的（测试中会多次初始化）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录诊断会话启动信息
///
/// # 参数
/// - `exercise_id`: 第一道题的ID
/// - `baseline_secs`: 服务器给出的剩余时间
/// - `post_url`: 提交地址
pub fn log_session_start(exercise_id: i64, baseline_secs: u64, post_url: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 诊断会话启动 - {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("📝 当前题目: #{}", exercise_id);
    info!("⏱️ 剩余时间: {}", format_seconds(baseline_secs));
    info!("🌐 提交地址: {}", post_url);
    info!("{}", "=".repeat(60));
}

/// 记录一次提交
pub fn log_submission(exercise_id: i64, step_count: usize, remaining_secs: u64) {
    info!(
        "📤 提交题目 #{}: {} 个步骤, 剩余 {}",
        exercise_id,
        step_count,
        format_seconds(remaining_secs)
    );
}

/// 记录服务器给出的能力估计
pub fn log_estimate(theta: Option<f64>, standard_error: Option<f64>) {
    match (theta, standard_error) {
        (Some(theta), Some(se)) => info!("📈 能力估计 θ={:.3}, SE={:.3}", theta, se),
        (Some(theta), None) => info!("📈 能力估计 θ={:.3}", theta),
        _ => {}
    }
}

/// 打印会话结束信息
pub fn print_final_summary(outcome: &TerminalOutcome, answered: usize, remaining_secs: u64) {
    info!("\n{}", "=".repeat(60));
    info!("📊 诊断结束: {}", outcome.message());
    info!("✅ 已提交题目: {}", answered);
    if let Some(theta) = outcome.theta {
        info!("θ: {:.3}", theta);
    }
    if let Some(se) = outcome.standard_error {
        info!("SE: {:.3}", se);
    }
    info!("⏱️ 剩余时间: {}", format_seconds(remaining_secs));
    info!("{}", "=".repeat(60));
}

/// 用户中途离开时的记录
pub fn print_session_abandoned(answered: usize, remaining_secs: u64) {
    info!(
        "👋 会话未完成即退出: 已提交 {} 题, 剩余 {}",
        answered,
        format_seconds(remaining_secs)
    );
}

/// 把秒数格式化为 `MM:SS`
///
/// 分钟数不截断，超过一小时时显示为 `75:00` 这样的形式。
pub fn format_seconds(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
