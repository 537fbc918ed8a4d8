use std::time::Duration;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 提交答案的接口地址
    pub post_url: String,
    /// CSRF token（X-CSRFToken 头）
    pub csrf_token: String,
    /// 会话 cookie（同源凭据），例如 `sessionid=...`
    pub session_cookie: Option<String>,
    /// 单次提交的最长等待时间（秒）
    pub request_timeout_secs: u64,
    /// 诊断结束后跳转的地址
    pub redirect_url: String,
    /// 页面数据 TOML 文件
    pub page_data_file: String,
    /// 页面未提供时长时使用的默认时长（秒）
    pub default_duration_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            post_url: "http://127.0.0.1:8000/ejercicios/diagnostico/".to_string(),
            csrf_token: String::new(),
            session_cookie: None,
            request_timeout_secs: 30,
            redirect_url: "/".to_string(),
            page_data_file: "diagnostico.toml".to_string(),
            default_duration_secs: 3540,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            post_url: std::env::var("DIAGNOSTICO_POST_URL").unwrap_or(default.post_url),
            csrf_token: std::env::var("CSRF_TOKEN").unwrap_or(default.csrf_token),
            session_cookie: std::env::var("SESSION_COOKIE").ok().or(default.session_cookie),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.request_timeout_secs),
            redirect_url: std::env::var("REDIRECT_URL").unwrap_or(default.redirect_url),
            page_data_file: std::env::var("PAGE_DATA_FILE").unwrap_or(default.page_data_file),
            default_duration_secs: std::env::var("DEFAULT_DURATION_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.default_duration_secs),
            verbose_logging: std::env::var("VERBOSE_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.verbose_logging),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
