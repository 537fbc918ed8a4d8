use serde::{Deserialize, Serialize};

/// 一道诊断题（页面上显示的部分）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// 题目ID
    pub id: i64,
    /// 题干
    pub display_text: String,
    /// 提示（可以为空）
    #[serde(default)]
    pub hint: String,
}

impl Exercise {
    pub fn new(id: i64, display_text: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            id,
            display_text: display_text.into(),
            hint: hint.into(),
        }
    }
}
