use crate::error::{AppError, AppResult, FileError};
use crate::models::page::PageData;
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载页面数据
pub async fn load_page_data(toml_file_path: &Path) -> AppResult<PageData> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(toml_file_path.display().to_string(), e))?;

    let page = parse_page_data(&content, toml_file_path)?;

    tracing::info!(
        "成功加载页面数据: {} (题目 #{})",
        toml_file_path.display(),
        page.ejercicio_id
    );

    Ok(page)
}

/// 解析 TOML 文本（`path` 只用于错误信息）
pub fn parse_page_data(content: &str, path: &Path) -> AppResult<PageData> {
    toml::from_str(content).map_err(|source| {
        FileError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        }
        .into()
    })
}
