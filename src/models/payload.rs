use serde::Serialize;

use crate::services::StepList;

/// 提交到服务器的答案
///
/// 每次提交重新构建，从不持久化。字段名与服务器接口保持一致。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionPayload {
    #[serde(rename = "ejercicio_id")]
    pub exercise_id: i64,
    /// 最后一个非空步骤
    #[serde(rename = "respuesta_estudiante")]
    pub final_answer: String,
    /// 会话开始以来已用的秒数
    #[serde(rename = "tiempo_en_segundos")]
    pub elapsed_seconds: u64,
    /// 提交瞬间客户端计算的剩余秒数（仅供参考，以服务器为准）
    pub remaining_seconds: u64,
    #[serde(rename = "pasos")]
    pub steps: Vec<String>,
}

impl SubmissionPayload {
    /// 从步骤列表构建载荷
    ///
    /// 没有任何非空步骤时返回 `None`
    pub fn build(
        exercise_id: i64,
        steps: &StepList,
        elapsed_seconds: u64,
        remaining_seconds: u64,
    ) -> Option<Self> {
        let final_answer = steps.final_answer()?;
        Some(Self {
            exercise_id,
            final_answer,
            elapsed_seconds,
            remaining_seconds,
            steps: steps.collect_steps(),
        })
    }
}
