//! 服务器响应模型
//!
//! 服务器返回的 JSON 字段比较松散（`error` 既可能是标准误也可能是错误信息，
//! 有的分支还把 `success` 拼成了 `succes`），这里先宽松地反序列化，
//! 再统一转换成 [`ServerOutcome`]。

use serde::Deserialize;

/// 服务器未给出 motivo 时的结束提示
pub const DEFAULT_FINISHED_MESSAGE: &str = "Diagnóstico finalizado.";
/// 服务器返回 success=false 且没有说明时的提示
pub const DEFAULT_FAILED_MESSAGE: &str = "No se pudo procesar la respuesta.";
/// 倒计时结束时的提示
pub const TIME_UP_MESSAGE: &str = "Tiempo agotado. Se finalizará el diagnóstico.";

/// 服务器原始响应
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerResponse {
    #[serde(default, alias = "succes")]
    pub success: bool,
    #[serde(default, rename = "final")]
    pub is_final: bool,
    #[serde(default)]
    pub motivo: Option<String>,
    #[serde(default)]
    pub contexto: Option<ExerciseContext>,
    #[serde(default)]
    pub ejercicio: Option<ExerciseRef>,
    #[serde(default)]
    pub theta: Option<f64>,
    #[serde(default)]
    pub error: Option<ErrorField>,
    #[serde(default)]
    pub num_items: Option<u32>,
    #[serde(default)]
    pub mensaje: Option<String>,
    /// 只出现在 403 响应里：诊断已经结束或过期
    #[serde(default)]
    pub finalizado: Option<bool>,
}

/// 下一题的显示内容
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExerciseContext {
    #[serde(default)]
    pub display_text: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

/// 下一题的元数据
#[derive(Debug, Clone, Deserialize)]
pub struct ExerciseRef {
    pub id: i64,
    #[serde(default)]
    pub enunciado: Option<String>,
}

/// `error` 字段：数字为能力估计的标准误，字符串为错误信息
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ErrorField {
    Estimate(f64),
    Message(String),
}

/// 解析后的结果：继续下一题，或者结束
#[derive(Debug, Clone, PartialEq)]
pub enum ServerOutcome {
    Continue(NextExercise),
    Terminal(TerminalOutcome),
}

/// 继续作答时的下一题信息
///
/// 各字段独立可选，缺失的字段保持页面当前值不变。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NextExercise {
    pub exercise_id: Option<i64>,
    pub display_text: Option<String>,
    pub hint: Option<String>,
    pub theta: Option<f64>,
    pub standard_error: Option<f64>,
    pub items_answered: Option<u32>,
}

/// 结束原因
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalReason {
    /// 服务器判定诊断完成（final=true）
    Completed(String),
    /// 服务器拒绝（success=false 或会话已关闭）
    Failed(String),
    /// 本地倒计时结束
    TimeExpired,
}

/// 结束时展示给用户的信息
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalOutcome {
    pub reason: TerminalReason,
    pub theta: Option<f64>,
    pub standard_error: Option<f64>,
}

impl TerminalOutcome {
    pub fn time_expired() -> Self {
        Self {
            reason: TerminalReason::TimeExpired,
            theta: None,
            standard_error: None,
        }
    }

    pub fn message(&self) -> &str {
        match &self.reason {
            TerminalReason::Completed(msg) | TerminalReason::Failed(msg) => msg,
            TerminalReason::TimeExpired => TIME_UP_MESSAGE,
        }
    }
}

impl ServerResponse {
    /// 错误信息字符串（`error` 为字符串时）
    pub fn error_message(&self) -> Option<&str> {
        match &self.error {
            Some(ErrorField::Message(msg)) => Some(msg),
            _ => None,
        }
    }

    fn standard_error(&self) -> Option<f64> {
        match &self.error {
            Some(ErrorField::Estimate(se)) => Some(*se),
            _ => None,
        }
    }

    /// `success && !final` 才继续，其余情况都结束流程
    pub fn into_outcome(self) -> ServerOutcome {
        let standard_error = self.standard_error();

        if self.success && !self.is_final {
            let (display_text, hint) = match self.contexto {
                Some(ctx) => (ctx.display_text, ctx.hint),
                None => (None, None),
            };
            let (exercise_id, display_text) = match self.ejercicio {
                Some(ejercicio) => (Some(ejercicio.id), display_text.or(ejercicio.enunciado)),
                None => (None, display_text),
            };
            return ServerOutcome::Continue(NextExercise {
                exercise_id,
                display_text,
                hint,
                theta: self.theta,
                standard_error,
                items_answered: self.num_items,
            });
        }

        let reason = if self.success {
            TerminalReason::Completed(
                self.motivo
                    .or(self.mensaje)
                    .unwrap_or_else(|| DEFAULT_FINISHED_MESSAGE.to_string()),
            )
        } else {
            let message = self
                .motivo
                .clone()
                .or_else(|| self.error_message().map(str::to_string))
                .or_else(|| self.mensaje.clone())
                .unwrap_or_else(|| DEFAULT_FAILED_MESSAGE.to_string());
            TerminalReason::Failed(message)
        };

        ServerOutcome::Terminal(TerminalOutcome {
            reason,
            theta: self.theta,
            standard_error,
        })
    }
}
