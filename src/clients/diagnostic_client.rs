/// 诊断接口 HTTP 客户端
///
/// 封装提交答案的 POST 请求：JSON body、CSRF 头、AJAX 标记和同源 cookie
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE};
use reqwest::Client;
use tracing::{debug, warn};

use crate::clients::AnswerTransport;
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult, ConfigError};
use crate::models::{
    ServerOutcome, ServerResponse, SubmissionPayload, TerminalOutcome, TerminalReason,
};

/// 诊断接口客户端
pub struct DiagnosticClient {
    http: Client,
    post_url: String,
    timeout_secs: u64,
}

impl DiagnosticClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        Self::with_url(config, config.post_url.clone())
    }

    /// 使用页面给出的提交地址创建客户端
    pub fn with_url(config: &Config, post_url: impl Into<String>) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
        if !config.csrf_token.is_empty() {
            let token = HeaderValue::from_str(&config.csrf_token)
                .map_err(|source| ConfigError::InvalidHeader { name: "X-CSRFToken", source })?;
            headers.insert("X-CSRFToken", token);
        }
        if let Some(cookie) = build_cookie(config) {
            let value = HeaderValue::from_str(&cookie)
                .map_err(|source| ConfigError::InvalidHeader { name: "Cookie", source })?;
            headers.insert(COOKIE, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            http,
            post_url: post_url.into(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    pub fn post_url(&self) -> &str {
        &self.post_url
    }

    fn map_send_error(&self, err: reqwest::Error) -> AppError {
        if err.is_timeout() {
            warn!("提交超时: {}", self.post_url);
            AppError::api_timeout(&self.post_url, self.timeout_secs)
        } else {
            AppError::api_request_failed(&self.post_url, err)
        }
    }
}

#[async_trait]
impl AnswerTransport for DiagnosticClient {
    async fn submit_answer(&self, payload: &SubmissionPayload) -> AppResult<ServerOutcome> {
        debug!("提交 Payload: {}", serde_json::to_string(payload)?);

        let response = self
            .http
            .post(&self.post_url)
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(&self.post_url, e))?;

        debug!("提交结果 ({}): {}", status, body);

        interpret_response(&self.post_url, status.as_u16(), &body)
    }
}

/// 根据状态码和响应体得到结果
///
/// 非 2xx 一律是可重试的错误，除非响应体里 `finalizado: true`（会话已关闭）。
pub fn interpret_response(endpoint: &str, status: u16, body: &str) -> AppResult<ServerOutcome> {
    if (200..300).contains(&status) {
        let parsed: ServerResponse = serde_json::from_str(body)?;
        return Ok(parsed.into_outcome());
    }

    let parsed = serde_json::from_str::<ServerResponse>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|r| r.error_message().map(str::to_string));

    if parsed.as_ref().and_then(|r| r.finalizado) == Some(true) {
        let reason = message.unwrap_or_else(|| "El diagnostico ya finalizó o expiró".to_string());
        return Ok(ServerOutcome::Terminal(TerminalOutcome {
            reason: TerminalReason::Failed(reason),
            theta: None,
            standard_error: None,
        }));
    }

    Err(AppError::Api(ApiError::BadStatus {
        endpoint: endpoint.to_string(),
        status,
        message,
    }))
}

fn build_cookie(config: &Config) -> Option<String> {
    let mut parts = Vec::new();
    if !config.csrf_token.is_empty() {
        parts.push(format!("csrftoken={}", config.csrf_token));
    }
    if let Some(session) = config.session_cookie.as_deref().filter(|s| !s.is_empty()) {
        parts.push(session.to_string());
    }
    (!parts.is_empty()).then(|| parts.join("; "))
}
