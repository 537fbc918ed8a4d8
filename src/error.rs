use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 本地校验错误（不会访问服务器）
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 会话状态错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
}

/// 校验错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// 没有任何非空步骤
    #[error("至少需要填写一个步骤")]
    EmptySteps,
    /// 步骤索引超出范围
    #[error("步骤索引 {index} 超出范围 [0, {len})")]
    StepOutOfRange { index: usize, len: usize },
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务器返回非 2xx 状态码
    #[error("API返回错误响应 ({endpoint}): status={status}, message={message:?}")]
    BadStatus {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    /// 请求超时
    #[error("API请求超时 ({endpoint}), 已等待 {after_secs} 秒")]
    Timeout { endpoint: String, after_secs: u64 },
    /// JSON 解析失败
    #[error("JSON解析失败: {0}")]
    JsonParseFailed(#[from] serde_json::Error),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 无法确定诊断开始时间
    #[error("页面数据缺少 remaining_seconds 和 fecha_inicio，无法确定诊断开始时间")]
    MissingStartTime,
    /// 时间戳解析失败
    #[error("无法解析时间戳 '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// 凭据无法放进请求头
    #[error("无效的请求头 {name}: {source}")]
    InvalidHeader {
        name: &'static str,
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },
    /// HTTP 客户端构建失败
    #[error("HTTP 客户端构建失败: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// 会话状态错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// 已有提交正在进行
    #[error("已有提交正在进行中")]
    AlreadySubmitting,
    /// 会话已结束
    #[error("会话已结束，不再接受提交")]
    Terminated,
}

impl AppError {
    /// 是否可以由用户重试（网络 / HTTP 失败）
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Api(_))
    }

    /// 创建API请求失败错误
    pub fn api_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建请求超时错误
    pub fn api_timeout(endpoint: impl Into<String>, after_secs: u64) -> Self {
        AppError::Api(ApiError::Timeout {
            endpoint: endpoint.into(),
            after_secs,
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed(err))
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
