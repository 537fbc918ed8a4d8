pub mod diagnostic_client;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{ServerOutcome, SubmissionPayload};

pub use diagnostic_client::DiagnosticClient;

/// 提交答案的传输层
///
/// 生产环境用 [`DiagnosticClient`]，测试里可以换成内存实现。
#[async_trait]
pub trait AnswerTransport: Send + Sync {
    async fn submit_answer(&self, payload: &SubmissionPayload) -> AppResult<ServerOutcome>;
}
