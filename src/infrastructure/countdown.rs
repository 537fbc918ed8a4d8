//! 倒计时器 - 基础设施层
//!
//! 剩余时间每次都从启动时刻重新计算，而不是每个 tick 减一：
//! 错过或延迟的 tick 不会造成累计漂移。

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

type TickHandler = Box<dyn FnMut(u64) + Send + 'static>;
type FinishHandler = Box<dyn FnOnce() + Send + 'static>;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// 只读的剩余时间来源
///
/// 提交控制器只通过这个 trait 读取计时器，不能修改它。
pub trait RemainingTime {
    /// 当前剩余秒数（不小于 0）
    fn remaining_seconds(&self) -> u64;
    /// 启动以来已用秒数（不超过基准）
    fn elapsed_seconds(&self) -> u64;
}

/// 倒计时器
///
/// 职责：
/// - 以服务器给出的剩余秒数为基准倒数
/// - 每秒调用一次 `on_tick(remaining)`
/// - 归零时先取消定时任务，再调用且只调用一次 `on_finish()`
pub struct CountdownTimer {
    baseline: u64,
    started_at: Option<Instant>,
    stopped_at: Option<Instant>,
    on_tick: Option<TickHandler>,
    on_finish: Option<FinishHandler>,
    handle: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    pub fn new(
        baseline: u64,
        on_tick: impl FnMut(u64) + Send + 'static,
        on_finish: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            baseline,
            started_at: None,
            stopped_at: None,
            on_tick: Some(Box::new(on_tick)),
            on_finish: Some(Box::new(on_finish)),
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.stopped_at.is_none()
    }

    /// 启动倒计时
    ///
    /// 立即同步触发一次 tick，之后每秒一次。只能启动一次，重复调用无效。
    /// 必须在 tokio 运行时内调用。
    pub fn start(&mut self) {
        let (Some(mut on_tick), Some(on_finish)) = (self.on_tick.take(), self.on_finish.take())
        else {
            debug!("倒计时已经启动过，忽略重复的 start()");
            return;
        };

        let started_at = Instant::now();
        self.started_at = Some(started_at);
        debug!("⏱️ 倒计时启动，基准 {} 秒", self.baseline);

        on_tick(self.baseline);
        if self.baseline == 0 {
            self.stopped_at = Some(started_at);
            on_finish();
            return;
        }

        let baseline = self.baseline;
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(started_at + TICK_PERIOD, TICK_PERIOD);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                let now = ticker.tick().await;
                let remaining = remaining_at(baseline, started_at, now.max(Instant::now()));
                on_tick(remaining);
                if remaining == 0 {
                    drop(ticker);
                    on_finish();
                    break;
                }
            }
        }));
    }

    /// 停止倒计时（幂等）
    ///
    /// 停止后剩余时间冻结在停止时刻的值。
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        if self.started_at.is_some() && self.stopped_at.is_none() {
            self.stopped_at = Some(Instant::now());
            debug!("倒计时已停止，剩余 {} 秒", self.remaining_seconds());
        }
    }
}

impl RemainingTime for CountdownTimer {
    fn remaining_seconds(&self) -> u64 {
        match self.started_at {
            None => self.baseline,
            Some(started_at) => {
                let now = self.stopped_at.unwrap_or_else(Instant::now);
                remaining_at(self.baseline, started_at, now)
            }
        }
    }

    fn elapsed_seconds(&self) -> u64 {
        self.baseline - self.remaining_seconds()
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

fn remaining_at(baseline: u64, started_at: Instant, now: Instant) -> u64 {
    let elapsed = now.saturating_duration_since(started_at).as_secs();
    baseline.saturating_sub(elapsed)
}
