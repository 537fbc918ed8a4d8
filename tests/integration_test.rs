use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::time::sleep;
use tokio_test::{assert_err, assert_ok};

use diagnostico_client::clients::diagnostic_client::interpret_response;
use diagnostico_client::error::{ApiError, AppError};
use diagnostico_client::models::loaders::parse_page_data;
use diagnostico_client::models::{NextExercise, TerminalReason};
use diagnostico_client::{
    AnswerTransport, AppResult, Config, DiagnosticClient, DiagnosticSession, Exercise, ExerciseCtx,
    PageData, ServerOutcome, SessionView, StepList, SubmissionPayload, TerminalOutcome, Trigger,
    UserCommand,
};

/// 把响应正文交给真实的解析逻辑，模拟服务器
struct FakeServer {
    bodies: Mutex<VecDeque<(u16, &'static str)>>,
    received: Mutex<Vec<SubmissionPayload>>,
    calls: AtomicUsize,
    latency: Duration,
}

impl FakeServer {
    fn new(bodies: Vec<(u16, &'static str)>, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            bodies: Mutex::new(bodies.into()),
            received: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            latency,
        })
    }
}

#[async_trait]
impl AnswerTransport for FakeServer {
    async fn submit_answer(&self, payload: &SubmissionPayload) -> AppResult<ServerOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().unwrap().push(payload.clone());
        sleep(self.latency).await;
        let (status, body) = self
            .bodies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((500, r#"{"error": "sin respuesta"}"#));
        interpret_response("fake", status, body)
    }
}

#[derive(Default)]
struct PageView {
    times: Vec<u64>,
    texts: Vec<String>,
    errors: Vec<String>,
    submit_enabled: bool,
    terminal: Option<TerminalOutcome>,
    navigated_to: Option<String>,
}

impl SessionView for PageView {
    fn render_time(&mut self, remaining_secs: u64) {
        self.times.push(remaining_secs);
    }
    fn render_exercise(&mut self, ctx: &ExerciseCtx) {
        self.texts.push(ctx.exercise.display_text.clone());
    }
    fn render_steps(&mut self, _steps: &StepList) {}
    fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled = enabled;
    }
    fn show_sending(&mut self, _visible: bool) {}
    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
    fn show_terminal(&mut self, outcome: &TerminalOutcome) {
        self.terminal = Some(outcome.clone());
    }
    fn navigate(&mut self, url: &str) {
        self.navigated_to = Some(url.to_string());
    }
}

fn config() -> Config {
    Config {
        request_timeout_secs: 5,
        redirect_url: "/estudiante/".to_string(),
        ..Config::default()
    }
}

fn session(baseline: u64, server: Arc<FakeServer>) -> DiagnosticSession<FakeServer, PageView> {
    DiagnosticSession::new(
        &config(),
        Exercise::new(1, "Q1", "piensa en la suma"),
        baseline,
        server,
        PageView::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_full_diagnostic_until_final() {
    let server = FakeServer::new(
        vec![
            (
                200,
                r#"{"success": true, "final": false,
                    "contexto": {"display_text": "Q2", "hint": "h2"},
                    "ejercicio": {"id": 2}, "theta": 0.1, "error": 0.9, "num_items": 1}"#,
            ),
            (
                200,
                r#"{"success": true, "final": true, "motivo": "done",
                    "theta": 0.5, "error": 0.38}"#,
            ),
        ],
        Duration::from_millis(200),
    );
    let mut session = session(600, Arc::clone(&server));
    let (tx, mut rx) = mpsc::channel(8);

    let (summary, _) = tokio::join!(session.run(&mut rx), async {
        sleep(Duration::from_secs(20)).await;
        tx.send(UserCommand::Type("x + 1 = 3".into())).await.unwrap();
        tx.send(UserCommand::NextField).await.unwrap();
        tx.send(UserCommand::Type("x = 2".into())).await.unwrap();
        tx.send(UserCommand::Submit(Trigger::EnterKey)).await.unwrap();
        sleep(Duration::from_secs(30)).await;
        tx.send(UserCommand::Type("y = 7".into())).await.unwrap();
        tx.send(UserCommand::Submit(Trigger::CtrlEnter)).await.unwrap();
    });

    let received = server.received.lock().unwrap().clone();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].exercise_id, 1);
    assert_eq!(received[0].steps, vec!["x + 1 = 3", "x = 2"]);
    assert_eq!(received[0].final_answer, "x = 2");
    assert_eq!(received[0].elapsed_seconds, 20);
    assert_eq!(received[1].exercise_id, 2);
    assert_eq!(received[1].steps, vec!["y = 7"]);

    let outcome = summary.outcome.unwrap();
    assert_eq!(outcome.reason, TerminalReason::Completed("done".into()));
    assert_eq!(outcome.theta, Some(0.5));
    assert_eq!(outcome.standard_error, Some(0.38));
    assert_eq!(summary.answered, 2);

    let view = session.view();
    assert_eq!(view.texts, vec!["Q1", "Q2"]);
    assert_eq!(view.navigated_to.as_deref(), Some("/estudiante/"));
    assert!(!view.submit_enabled);
    assert!(!session.timer().is_running());
}

#[tokio::test(start_paused = true)]
async fn test_server_error_then_retry() {
    let server = FakeServer::new(
        vec![
            (500, r#"{"error": "fallo interno"}"#),
            (200, r#"{"succes": false, "error": "Ejercicio no encontrado"}"#),
        ],
        Duration::ZERO,
    );
    let mut session = session(600, Arc::clone(&server));
    let (tx, mut rx) = mpsc::channel(8);

    for command in [
        UserCommand::Type("a".into()),
        UserCommand::Submit(Trigger::Button),
    ] {
        tx.send(command).await.unwrap();
    }
    let (summary, _) = tokio::join!(session.run(&mut rx), async {
        sleep(Duration::from_secs(2)).await;
        tx.send(UserCommand::Submit(Trigger::Button)).await.unwrap();
    });

    assert_eq!(server.calls.load(Ordering::SeqCst), 2);
    assert_eq!(session.view().errors, vec!["No se pudo enviar la respuesta."]);
    assert_eq!(
        summary.outcome.unwrap().reason,
        TerminalReason::Failed("Ejercicio no encontrado".into())
    );
}

#[tokio::test(start_paused = true)]
async fn test_empty_answer_is_not_sent() {
    let server = FakeServer::new(vec![], Duration::ZERO);
    let mut session = session(600, Arc::clone(&server));
    let (tx, mut rx) = mpsc::channel(8);

    for command in [
        UserCommand::Type("   ".into()),
        UserCommand::Submit(Trigger::Button),
        UserCommand::Quit,
    ] {
        tx.send(command).await.unwrap();
    }
    let summary = session.run(&mut rx).await;

    assert_eq!(server.calls.load(Ordering::SeqCst), 0);
    assert_eq!(session.view().errors, vec!["Completa al menos un paso."]);
    assert_eq!(session.controller().steps().len(), 1);
    assert_eq!(summary.outcome, None);
}

#[tokio::test(start_paused = true)]
async fn test_countdown_expires_during_slow_request() {
    let server = FakeServer::new(
        vec![(200, r#"{"success": true, "final": true, "motivo": "tarde"}"#)],
        Duration::from_secs(4),
    );
    let mut session = session(3, Arc::clone(&server));
    let (tx, mut rx) = mpsc::channel(8);

    tx.send(UserCommand::Type("a".into())).await.unwrap();
    tx.send(UserCommand::Submit(Trigger::Button)).await.unwrap();
    let summary = session.run(&mut rx).await;

    assert_eq!(summary.outcome, Some(TerminalOutcome::time_expired()));
    assert_eq!(session.view().times, vec![3, 2, 1, 0]);
    assert_eq!(
        session.view().terminal.as_ref().map(|o| o.message()),
        Some("Tiempo agotado. Se finalizará el diagnóstico.")
    );
}

#[tokio::test(start_paused = true)]
async fn test_closed_session_is_terminal() {
    let server = FakeServer::new(
        vec![(403, r#"{"error": "El diagnóstico ya terminó", "finalizado": true}"#)],
        Duration::ZERO,
    );
    let mut session = session(600, Arc::clone(&server));
    let (tx, mut rx) = mpsc::channel(8);

    tx.send(UserCommand::Type("a".into())).await.unwrap();
    tx.send(UserCommand::Submit(Trigger::Button)).await.unwrap();
    let summary = session.run(&mut rx).await;

    assert_eq!(
        summary.outcome.unwrap().reason,
        TerminalReason::Failed("El diagnóstico ya terminó".into())
    );
    assert_eq!(session.view().navigated_to.as_deref(), Some("/estudiante/"));
}

#[test]
fn test_page_data_baseline_from_start_date() {
    let content = r#"
ejercicio_id = 7
display_text = "Resuelve 2x = 8"
fecha_inicio = "2026-03-01T10:00:00Z"
duracion = 3540
"#;
    let page: PageData = assert_ok!(parse_page_data(content, Path::new("diagnostico.toml")));
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 9, 0).unwrap();

    assert_eq!(page.exercise().id, 7);
    assert_eq!(assert_ok!(page.baseline_seconds(now, 3540)), 3000);

    let missing = PageData {
        fecha_inicio: None,
        ..page
    };
    assert_err!(missing.baseline_seconds(now, 3540));
}

#[test]
fn test_next_exercise_defaults() {
    let outcome = interpret_response("fake", 200, r#"{"success": true, "final": false}"#).unwrap();
    assert_eq!(outcome, ServerOutcome::Continue(NextExercise::default()));
}

/// 收到的原始 HTTP 请求
struct CapturedRequest {
    head: String,
    body: String,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }
}

/// 读取一个请求（头部 + Content-Length 指定的正文）
async fn read_request(stream: &mut tokio::net::TcpStream) -> CapturedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "连接提前关闭");
        buf.extend_from_slice(&chunk[..n]);

        let Some(split) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..split]).to_string();
        let request = CapturedRequest {
            head,
            body: String::new(),
        };
        let length = request
            .header("content-length")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        let body_start = split + 4;
        if buf.len() - body_start >= length {
            let body = &buf[body_start..body_start + length];
            return CapturedRequest {
                body: String::from_utf8_lossy(body).to_string(),
                ..request
            };
        }
    }
}

/// 应答一次请求后把请求交给测试
async fn serve_once(
    status_line: &'static str,
    body: &'static str,
) -> (String, oneshot::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/ejercicios/diagnostico/", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
             Connection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        let _ = tx.send(request);
    });

    (url, rx)
}

fn two_steps() -> StepList {
    let mut steps = StepList::new();
    steps.type_into_focused("a");
    steps.focus_next_or_add();
    steps.type_into_focused("b");
    steps
}

#[tokio::test]
async fn test_http_request_headers_and_body() {
    let body = r#"{"success": true, "final": true, "motivo": "fin"}"#;
    let (url, captured) = serve_once("200 OK", body).await;
    let config = Config {
        csrf_token: "tok123".to_string(),
        session_cookie: Some("sessionid=abc".to_string()),
        ..Config::default()
    };
    let client = DiagnosticClient::with_url(&config, url).unwrap();

    let payload = SubmissionPayload::build(1, &two_steps(), 10, 50).unwrap();
    let outcome = client.submit_answer(&payload).await.unwrap();

    let request = captured.await.unwrap();
    assert!(request.head.starts_with("POST /ejercicios/diagnostico/ HTTP/1.1"));
    assert_eq!(request.header("x-requested-with"), Some("XMLHttpRequest"));
    assert_eq!(request.header("x-csrftoken"), Some("tok123"));
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.header("cookie"), Some("csrftoken=tok123; sessionid=abc"));

    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "ejercicio_id": 1,
            "respuesta_estudiante": "b",
            "tiempo_en_segundos": 10,
            "remaining_seconds": 50,
            "pasos": ["a", "b"]
        })
    );
    assert_eq!(
        outcome,
        ServerOutcome::Terminal(TerminalOutcome {
            reason: TerminalReason::Completed("fin".into()),
            theta: None,
            standard_error: None,
        })
    );
}

#[tokio::test]
async fn test_http_error_status_is_retryable() {
    let (url, _captured) = serve_once("500 Internal Server Error", r#"{"error": "fallo"}"#).await;
    let client = DiagnosticClient::with_url(&Config::default(), url).unwrap();

    let payload = SubmissionPayload::build(1, &two_steps(), 1, 59).unwrap();
    let err = client.submit_answer(&payload).await.unwrap_err();

    assert!(err.is_retryable());
    assert!(matches!(
        err,
        AppError::Api(ApiError::BadStatus { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_http_server_that_never_answers_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/ejercicios/diagnostico/", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let _request = read_request(&mut stream).await;
        sleep(Duration::from_secs(30)).await;
        drop(stream);
    });

    let config = Config {
        request_timeout_secs: 1,
        ..Config::default()
    };
    let client = DiagnosticClient::with_url(&config, url).unwrap();
    let payload = SubmissionPayload::build(1, &two_steps(), 1, 59).unwrap();

    let err = client.submit_answer(&payload).await.unwrap_err();

    assert!(err.is_retryable());
    match err {
        AppError::Api(ApiError::Timeout { after_secs, .. }) => assert_eq!(after_secs, 1),
        other => panic!("应该超时: {:?}", other),
    }
}

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_submit_to_live_server() {
    diagnostico_client::utils::logging::init(true);

    // 需要设置 DIAGNOSTICO_POST_URL / CSRF_TOKEN / SESSION_COOKIE
    let config = Config::from_env();
    let client = DiagnosticClient::new(&config).expect("创建客户端失败");

    let mut steps = StepList::new();
    steps.type_into_focused("x = 2");
    let payload = SubmissionPayload::build(1, &steps, 10, 3530).unwrap();
    let outcome = client.submit_answer(&payload).await.expect("提交失败");
    println!("服务器响应: {:?}", outcome);
}
