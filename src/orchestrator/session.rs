//! 诊断会话 - 编排层
//!
//! ## 职责
//!
//! 本模块相当于"页面控制器"，每个页面会话构造一次。
//!
//! 1. **资源所有者**：唯一持有倒计时器、提交控制器和界面
//! 2. **事件循环**：在同一个逻辑线程上交替处理计时事件、用户命令和正在进行的请求
//! 3. **结束处理**：停止计时、展示结束信息、跳转
//!
//! 计时器的回调只把事件送进通道，所有状态修改都发生在循环内部，
//! 因此界面状态不会在两个 tick 之间被撕裂。

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info, warn};

use crate::clients::AnswerTransport;
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{CountdownTimer, RemainingTime};
use crate::models::{Exercise, ServerOutcome, TerminalOutcome};
use crate::utils::logging;
use crate::workflow::{SessionView, SubmissionController, Transition, Trigger};

/// 用户在页面上的操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// "添加步骤"按钮
    AddStep,
    /// "删除步骤"按钮
    RemoveStep,
    /// 在当前聚焦的输入框里输入
    Type(String),
    /// 修改指定输入框
    EditStep { index: usize, text: String },
    /// 在输入框里按回车
    NextField,
    /// 展开 / 收起提示
    ToggleHint,
    /// 提交
    Submit(Trigger),
    /// 离开页面
    Quit,
}

#[derive(Debug)]
enum TimerEvent {
    Tick(u64),
    Finished,
}

/// 会话结束时的统计
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    /// 结束原因；用户主动离开时为 `None`
    pub outcome: Option<TerminalOutcome>,
    /// 被服务器接受的提交次数
    pub answered: usize,
    /// 结束时的剩余秒数
    pub remaining_seconds: u64,
}

/// 诊断会话
pub struct DiagnosticSession<T: AnswerTransport + 'static, V: SessionView> {
    redirect_url: String,
    timer: CountdownTimer,
    timer_events: UnboundedReceiver<TimerEvent>,
    controller: SubmissionController<T>,
    view: V,
}

impl<T: AnswerTransport + 'static, V: SessionView> DiagnosticSession<T, V> {
    pub fn new(
        config: &Config,
        exercise: Exercise,
        baseline: u64,
        transport: Arc<T>,
        view: V,
    ) -> Self {
        let (tx, timer_events) = mpsc::unbounded_channel();
        let tick_tx = tx.clone();
        let timer = CountdownTimer::new(
            baseline,
            move |remaining| {
                let _ = tick_tx.send(TimerEvent::Tick(remaining));
            },
            move || {
                let _ = tx.send(TimerEvent::Finished);
            },
        );

        Self {
            redirect_url: config.redirect_url.clone(),
            timer,
            timer_events,
            controller: SubmissionController::new(transport, exercise, config.request_timeout()),
            view,
        }
    }

    pub fn controller(&self) -> &SubmissionController<T> {
        &self.controller
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// 运行会话直到结束或用户离开
    pub async fn run(&mut self, commands: &mut mpsc::Receiver<UserCommand>) -> SessionSummary {
        self.view.render_exercise(self.controller.exercise());
        self.view.render_steps(self.controller.steps());
        self.view.set_submit_enabled(true);
        self.timer.start();

        let mut in_flight: Option<BoxFuture<'static, AppResult<ServerOutcome>>> = None;

        loop {
            tokio::select! {
                biased;

                Some(event) = self.timer_events.recv() => match event {
                    TimerEvent::Tick(remaining) => self.view.render_time(remaining),
                    TimerEvent::Finished => {
                        if let Some(outcome) = self.controller.expire() {
                            if in_flight.take().is_some() {
                                warn!("⏱️ 时间到，取消正在进行的提交");
                            }
                            return self.finish(Some(outcome));
                        }
                    }
                },

                result = poll_in_flight(&mut in_flight) => {
                    in_flight = None;
                    match self.controller.complete(result, &mut self.view) {
                        Transition::Terminal(outcome) => return self.finish(Some(outcome)),
                        Transition::RetryableFailure(e) => debug!("等待用户重试: {}", e),
                        Transition::Continued | Transition::Discarded => {}
                    }
                }

                command = commands.recv() => match command {
                    None | Some(UserCommand::Quit) => {
                        info!("👋 用户离开页面");
                        return self.finish(None);
                    }
                    Some(UserCommand::Submit(trigger)) => {
                        match self.controller.begin(trigger, &self.timer, &mut self.view) {
                            Ok(payload) => in_flight = Some(self.controller.dispatch(payload)),
                            Err(e) => debug!("提交未开始: {}", e),
                        }
                    }
                    Some(edit) => self.apply_edit(edit),
                },
            }
        }
    }

    fn apply_edit(&mut self, command: UserCommand) {
        if command == UserCommand::ToggleHint {
            self.controller.exercise_mut().toggle_hint();
            self.view.render_exercise(self.controller.exercise());
            return;
        }

        let Some(steps) = self.controller.steps_mut() else {
            debug!("会话已结束，忽略编辑: {:?}", command);
            return;
        };
        match command {
            UserCommand::AddStep => {
                steps.add_step();
            }
            UserCommand::RemoveStep => {
                if !steps.remove_last_step() {
                    debug!("只剩一个步骤，不能删除");
                }
            }
            UserCommand::Type(text) => steps.type_into_focused(text),
            UserCommand::EditStep { index, text } => {
                if let Err(e) = steps.set_step(index, text) {
                    warn!("忽略编辑: {}", e);
                }
            }
            UserCommand::NextField => {
                steps.focus_next_or_add();
            }
            UserCommand::ToggleHint | UserCommand::Submit(_) | UserCommand::Quit => {}
        }
        self.view.render_steps(self.controller.steps());
    }

    fn finish(&mut self, outcome: Option<TerminalOutcome>) -> SessionSummary {
        self.timer.stop();
        self.view.show_sending(false);
        self.view.set_submit_enabled(false);

        let summary = SessionSummary {
            outcome,
            answered: self.controller.exercise().answered,
            remaining_seconds: self.timer.remaining_seconds(),
        };

        if let Some(outcome) = &summary.outcome {
            logging::print_final_summary(outcome, summary.answered, summary.remaining_seconds);
            self.view.show_terminal(outcome);
            self.view.navigate(&self.redirect_url);
        }

        summary
    }
}

async fn poll_in_flight(
    in_flight: &mut Option<BoxFuture<'static, AppResult<ServerOutcome>>>,
) -> AppResult<ServerOutcome> {
    match in_flight {
        Some(request) => request.await,
        None => std::future::pending().await,
    }
}
