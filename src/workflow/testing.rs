//! 测试用的替身：固定时钟、脚本化传输层、记录型界面

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::clients::AnswerTransport;
use crate::error::{ApiError, AppError, AppResult};
use crate::infrastructure::RemainingTime;
use crate::models::{ServerOutcome, SubmissionPayload, TerminalOutcome};
use crate::services::StepList;
use crate::workflow::view::SessionView;
use crate::workflow::ExerciseCtx;

pub struct FixedClock {
    remaining: u64,
    elapsed: u64,
}

impl FixedClock {
    pub fn new(remaining: u64, elapsed: u64) -> Self {
        Self { remaining, elapsed }
    }
}

impl RemainingTime for FixedClock {
    fn remaining_seconds(&self) -> u64 {
        self.remaining
    }

    fn elapsed_seconds(&self) -> u64 {
        self.elapsed
    }
}

#[derive(Default)]
struct Script {
    responses: Mutex<VecDeque<AppResult<ServerOutcome>>>,
    payloads: Mutex<Vec<SubmissionPayload>>,
    calls: AtomicUsize,
}

/// 按顺序返回预设响应的传输层
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Script>,
    delay: Duration,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<AppResult<ServerOutcome>>) -> Self {
        let transport = Self::default();
        *transport.script.responses.lock().unwrap() = responses.into();
        transport
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.script.calls.load(Ordering::SeqCst)
    }

    pub fn payloads(&self) -> Vec<SubmissionPayload> {
        self.script.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerTransport for ScriptedTransport {
    async fn submit_answer(&self, payload: &SubmissionPayload) -> AppResult<ServerOutcome> {
        self.script.calls.fetch_add(1, Ordering::SeqCst);
        self.script.payloads.lock().unwrap().push(payload.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.script.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Err(AppError::Api(ApiError::BadStatus {
                endpoint: "scripted".into(),
                status: 503,
                message: Some("sin respuesta preparada".into()),
            }))
        })
    }
}

/// 记录所有界面调用
#[derive(Debug, Default)]
pub struct RecordingView {
    pub times: Vec<u64>,
    pub exercise_texts: Vec<String>,
    pub step_renders: usize,
    pub submit_enabled: Option<bool>,
    pub sending: Option<bool>,
    pub errors: Vec<String>,
    pub terminal: Option<TerminalOutcome>,
    pub navigated_to: Option<String>,
}

impl SessionView for RecordingView {
    fn render_time(&mut self, remaining_secs: u64) {
        self.times.push(remaining_secs);
    }

    fn render_exercise(&mut self, ctx: &ExerciseCtx) {
        self.exercise_texts.push(ctx.exercise.display_text.clone());
    }

    fn render_steps(&mut self, _steps: &StepList) {
        self.step_renders += 1;
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled = Some(enabled);
    }

    fn show_sending(&mut self, visible: bool) {
        self.sending = Some(visible);
    }

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
