use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppResult, ConfigError};
use crate::models::Exercise;

/// 页面加载时由服务器嵌入的数据
///
/// 计时基准有两种来源：直接给出 `remaining_seconds`，
/// 或者给出开始时间 `fecha_inicio` 与总时长 `duracion`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageData {
    pub ejercicio_id: i64,
    pub display_text: String,
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub remaining_seconds: Option<u64>,
    /// RFC 3339 时间戳或 `YYYY-MM-DD` 日期
    #[serde(default)]
    pub fecha_inicio: Option<String>,
    #[serde(default)]
    pub duracion: Option<u64>,
    /// 覆盖配置里的提交地址
    #[serde(default)]
    pub post_url: Option<String>,
}

impl PageData {
    pub fn exercise(&self) -> Exercise {
        Exercise::new(self.ejercicio_id, self.display_text.clone(), self.hint.clone())
    }

    /// 计算倒计时基准（秒）
    ///
    /// `remaining_seconds` 优先；否则为 `max(0, duracion - (now - fecha_inicio))`。
    /// 开始时间在未来（时钟偏差）时按未开始处理。
    pub fn baseline_seconds(&self, now: DateTime<Utc>, default_duration: u64) -> AppResult<u64> {
        if let Some(remaining) = self.remaining_seconds {
            return Ok(remaining);
        }

        let raw = self
            .fecha_inicio
            .as_deref()
            .ok_or(ConfigError::MissingStartTime)?;
        let started_at = parse_start(raw)?;
        let duration = self.duracion.unwrap_or(default_duration);

        let elapsed = (now - started_at).num_seconds().max(0) as u64;
        Ok(duration.saturating_sub(elapsed))
    }
}

fn parse_start(raw: &str) -> AppResult<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(source) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or_else(|| {
                ConfigError::InvalidTimestamp {
                    value: raw.to_string(),
                    source,
                }
                .into()
            }),
    }
}
