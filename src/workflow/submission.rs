//! 提交控制器 - 流程层
//!
//! 状态机：`Idle → Submitting → {Idle | Terminal}`
//!
//! 按钮、回车、Ctrl+Enter 可能几乎同时触发提交；`Submitting` 期间的
//! 任何新尝试都被拒绝，保证同一时刻最多只有一个网络请求。
//! 进入 `Terminal` 之后不再返回，先到的结束事件生效，后到的被丢弃。

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, error, info, warn};

use crate::clients::AnswerTransport;
use crate::error::{AppError, AppResult, SessionError, ValidationError};
use crate::infrastructure::RemainingTime;
use crate::models::{Exercise, ServerOutcome, SubmissionPayload, TerminalOutcome, TerminalReason};
use crate::services::StepList;
use crate::utils::logging;
use crate::workflow::view::{messages, SessionView};
use crate::workflow::ExerciseCtx;

/// 提交状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Terminal,
}

/// 提交的触发方式（只用于日志）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Button,
    EnterKey,
    CtrlEnter,
}

impl Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Trigger::Button => "按钮",
            Trigger::EnterKey => "回车",
            Trigger::CtrlEnter => "Ctrl+Enter",
        };
        f.write_str(name)
    }
}

/// 一次响应处理后的结果
#[derive(Debug)]
pub enum Transition {
    /// 进入下一题，回到 Idle
    Continued,
    /// 网络 / HTTP 失败，回到 Idle，可以重试
    RetryableFailure(AppError),
    /// 流程结束
    Terminal(TerminalOutcome),
    /// 会话已经结束，迟到的响应被丢弃
    Discarded,
}

/// 提交控制器
///
/// 职责：
/// - 持有步骤列表和当前题目
/// - 防止重复提交
/// - 组装载荷、发送、根据响应切换状态
/// - 只读取计时器，不修改它
pub struct SubmissionController<T: AnswerTransport + 'static> {
    transport: Arc<T>,
    state: SubmissionState,
    steps: StepList,
    exercise: ExerciseCtx,
    request_timeout: Duration,
}

impl<T: AnswerTransport + 'static> SubmissionController<T> {
    pub fn new(transport: Arc<T>, exercise: Exercise, request_timeout: Duration) -> Self {
        Self {
            transport,
            state: SubmissionState::Idle,
            steps: StepList::new(),
            exercise: ExerciseCtx::new(exercise),
            request_timeout,
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state == SubmissionState::Terminal
    }

    pub fn steps(&self) -> &StepList {
        &self.steps
    }

    /// 编辑步骤；会话结束后返回 `None`
    pub fn steps_mut(&mut self) -> Option<&mut StepList> {
        if self.is_terminal() {
            None
        } else {
            Some(&mut self.steps)
        }
    }

    pub fn exercise(&self) -> &ExerciseCtx {
        &self.exercise
    }

    pub fn exercise_mut(&mut self) -> &mut ExerciseCtx {
        &mut self.exercise
    }

    /// 开始一次提交
    ///
    /// 成功时进入 `Submitting` 并返回要发送的载荷。剩余时间在这一刻读取。
    pub fn begin(
        &mut self,
        trigger: Trigger,
        clock: &dyn RemainingTime,
        view: &mut dyn SessionView,
    ) -> AppResult<SubmissionPayload> {
        match self.state {
            SubmissionState::Submitting => {
                debug!("{} 忽略{}触发：已有提交进行中", self.exercise, trigger);
                return Err(SessionError::AlreadySubmitting.into());
            }
            SubmissionState::Terminal => {
                debug!("{} 忽略{}触发：会话已结束", self.exercise, trigger);
                return Err(SessionError::Terminated.into());
            }
            SubmissionState::Idle => {}
        }

        self.state = SubmissionState::Submitting;
        view.set_submit_enabled(false);

        let remaining = clock.remaining_seconds();
        let elapsed = clock.elapsed_seconds();

        let Some(payload) =
            SubmissionPayload::build(self.exercise.exercise_id(), &self.steps, elapsed, remaining)
        else {
            warn!("{} 没有填写任何步骤，取消提交", self.exercise);
            view.show_error(messages::EMPTY_STEPS);
            self.state = SubmissionState::Idle;
            view.set_submit_enabled(true);
            return Err(ValidationError::EmptySteps.into());
        };

        info!("{} 通过{}提交", self.exercise, trigger);
        logging::log_submission(payload.exercise_id, payload.steps.len(), remaining);
        view.show_sending(true);
        Ok(payload)
    }

    /// 发送载荷
    ///
    /// 返回的 future 不借用控制器，可以和计时事件一起 select。
    /// 超过 `request_timeout` 视为可重试的失败。
    pub fn dispatch(
        &self,
        payload: SubmissionPayload,
    ) -> BoxFuture<'static, AppResult<ServerOutcome>> {
        let transport = Arc::clone(&self.transport);
        let limit = self.request_timeout;
        async move {
            match tokio::time::timeout(limit, transport.submit_answer(&payload)).await {
                Ok(result) => result,
                Err(_) => Err(AppError::api_timeout("submit_answer", limit.as_secs())),
            }
        }
        .boxed()
    }

    /// 处理响应
    pub fn complete(
        &mut self,
        result: AppResult<ServerOutcome>,
        view: &mut dyn SessionView,
    ) -> Transition {
        if self.state != SubmissionState::Submitting {
            warn!("{} 会话已结束，丢弃迟到的响应", self.exercise);
            return Transition::Discarded;
        }
        view.show_sending(false);

        match result {
            Err(e) => {
                error!("{} ❌ 提交失败: {}", self.exercise, e);
                view.show_error(messages::SEND_FAILED);
                self.state = SubmissionState::Idle;
                view.set_submit_enabled(true);
                Transition::RetryableFailure(e)
            }
            Ok(ServerOutcome::Continue(next)) => {
                self.exercise.answered += 1;
                self.steps.reset();
                self.exercise.apply(&next);
                info!(
                    "{} ✓ 进入下一题: {}",
                    self.exercise,
                    logging::truncate_text(&self.exercise.exercise.display_text, 40)
                );
                logging::log_estimate(self.exercise.theta, self.exercise.standard_error);
                view.render_steps(&self.steps);
                view.render_exercise(&self.exercise);
                self.state = SubmissionState::Idle;
                view.set_submit_enabled(true);
                Transition::Continued
            }
            Ok(ServerOutcome::Terminal(outcome)) => {
                if matches!(outcome.reason, TerminalReason::Completed(_)) {
                    self.exercise.answered += 1;
                }
                info!("{} 🏁 服务器结束诊断: {}", self.exercise, outcome.message());
                self.state = SubmissionState::Terminal;
                Transition::Terminal(outcome)
            }
        }
    }

    /// 倒计时归零
    ///
    /// 已经结束时返回 `None`；否则进入 `Terminal`，正在进行的提交结果将被丢弃。
    pub fn expire(&mut self) -> Option<TerminalOutcome> {
        if self.is_terminal() {
            debug!("{} 倒计时结束，但会话已结束", self.exercise);
            return None;
        }
        if self.state == SubmissionState::Submitting {
            warn!("{} ⏱️ 时间到，正在进行的提交将被丢弃", self.exercise);
        }
        self.state = SubmissionState::Terminal;
        Some(TerminalOutcome::time_expired())
    }

    /// 完整的一次提交：begin → dispatch → complete
    pub async fn submit(
        &mut self,
        trigger: Trigger,
        clock: &dyn RemainingTime,
        view: &mut dyn SessionView,
    ) -> AppResult<Transition> {
        let payload = self.begin(trigger, clock, view)?;
        let result = self.dispatch(payload).await;
        Ok(self.complete(result, view))
    }
}
