//! 步骤列表 - 业务能力层
//!
//! 纯内存模型，界面只是它的投影。列表永远至少有一个输入框。

use crate::error::{AppResult, ValidationError};

/// 学生作答的步骤列表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepList {
    steps: Vec<String>,
    focused: usize,
}

impl StepList {
    /// 创建只含一个空输入框的列表
    pub fn new() -> Self {
        Self {
            steps: vec![String::new()],
            focused: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// 是否没有任何输入框
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 当前获得焦点的输入框索引
    pub fn focused(&self) -> usize {
        self.focused
    }

    /// 所有输入框的原始内容（含空白）
    pub fn fields(&self) -> &[String] {
        &self.steps
    }

    /// 在末尾追加一个空输入框并聚焦
    ///
    /// # 返回
    /// 新输入框的索引
    pub fn add_step(&mut self) -> usize {
        self.steps.push(String::new());
        self.focused = self.steps.len() - 1;
        self.focused
    }

    /// 删除最后一个输入框，只剩一个时不做任何事
    ///
    /// # 返回
    /// 是否真的删除了
    pub fn remove_last_step(&mut self) -> bool {
        if self.steps.len() <= 1 {
            return false;
        }
        self.steps.pop();
        self.focused = self.focused.min(self.steps.len() - 1);
        true
    }

    /// 修改指定输入框的内容
    pub fn set_step(&mut self, index: usize, text: impl Into<String>) -> AppResult<()> {
        let len = self.steps.len();
        let slot = self
            .steps
            .get_mut(index)
            .ok_or(ValidationError::StepOutOfRange { index, len })?;
        *slot = text.into();
        Ok(())
    }

    /// 修改当前聚焦的输入框
    pub fn type_into_focused(&mut self, text: impl Into<String>) {
        self.steps[self.focused] = text.into();
    }

    /// 回车键：聚焦下一个输入框，已经是最后一个时追加新的
    pub fn focus_next_or_add(&mut self) -> usize {
        if self.focused + 1 < self.steps.len() {
            self.focused += 1;
            self.focused
        } else {
            self.add_step()
        }
    }

    /// 收集去掉首尾空白后的非空步骤，保持原有顺序
    pub fn collect_steps(&self) -> Vec<String> {
        self.steps
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// 最后一个非空步骤，作为最终答案
    pub fn final_answer(&self) -> Option<String> {
        self.steps
            .iter()
            .rev()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// 丢弃所有输入框，换成一个新的空输入框
    pub fn reset(&mut self) {
        self.steps.clear();
        self.steps.push(String::new());
        self.focused = 0;
    }
}

impl Default for StepList {
    fn default() -> Self {
        Self::new()
    }
}
