use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::mpsc;

use diagnostico_client::models::load_page_data;
use diagnostico_client::orchestrator::input;
use diagnostico_client::utils::logging;
use diagnostico_client::workflow::view::messages;
use diagnostico_client::{Config, ConsoleView, DiagnosticClient, DiagnosticSession, SessionView};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 读取页面数据
    let page = load_page_data(Path::new(&config.page_data_file))
        .await
        .with_context(|| format!("无法加载页面数据: {}", config.page_data_file))?;

    let post_url = page.post_url.clone().unwrap_or_else(|| config.post_url.clone());
    let client = DiagnosticClient::with_url(&config, post_url).context("无法创建 HTTP 客户端")?;

    let mut view = ConsoleView::new();
    let baseline = match page.baseline_seconds(Utc::now(), config.default_duration_secs) {
        Ok(baseline) => baseline,
        Err(e) => {
            // 无法确定开始时间时不能开始计时
            view.show_error(messages::MISSING_START);
            view.navigate(&config.redirect_url);
            return Err(e.into());
        }
    };

    let exercise = page.exercise();
    logging::log_session_start(exercise.id, baseline, client.post_url());

    let (tx, mut rx) = mpsc::channel(32);
    println!("{}", input::HELP);
    let reader = input::spawn_stdin_reader(tx);

    let mut session = DiagnosticSession::new(&config, exercise, baseline, Arc::new(client), view);
    let summary = session.run(&mut rx).await;
    reader.abort();

    if summary.outcome.is_none() {
        logging::print_session_abandoned(summary.answered, summary.remaining_seconds);
    }

    Ok(())
}
