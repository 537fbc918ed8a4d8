//! 当前题目上下文
//!
//! 封装"页面上正在显示哪道题"这一信息

use std::fmt::Display;

use crate::models::{Exercise, NextExercise};

/// 当前题目的显示状态
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseCtx {
    /// 当前题目
    pub exercise: Exercise,

    /// 提示是否展开
    pub hint_visible: bool,

    /// 已被服务器接受的提交次数
    pub answered: usize,

    /// 服务器最近一次给出的能力估计
    pub theta: Option<f64>,

    /// 能力估计的标准误
    pub standard_error: Option<f64>,
}

impl ExerciseCtx {
    pub fn new(exercise: Exercise) -> Self {
        Self {
            exercise,
            hint_visible: false,
            answered: 0,
            theta: None,
            standard_error: None,
        }
    }

    pub fn exercise_id(&self) -> i64 {
        self.exercise.id
    }

    /// 用服务器返回的下一题更新显示内容
    ///
    /// 只有带题干时才替换提示；缺失的字段保持不变。
    pub fn apply(&mut self, next: &NextExercise) {
        if let Some(id) = next.exercise_id {
            self.exercise.id = id;
        }
        if let Some(text) = &next.display_text {
            self.exercise.display_text = text.clone();
            self.exercise.hint = next.hint.clone().unwrap_or_default();
        }
        if next.theta.is_some() {
            self.theta = next.theta;
        }
        if next.standard_error.is_some() {
            self.standard_error = next.standard_error;
        }
        // 以服务器记录的作答数为准
        if let Some(items) = next.items_answered {
            self.answered = items as usize;
        }
        self.hint_visible = false;
    }

    /// 展开 / 收起提示，返回新的状态
    pub fn toggle_hint(&mut self) -> bool {
        self.hint_visible = !self.hint_visible;
        self.hint_visible
    }
}

impl Display for ExerciseCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[题目 #{} 已答 {}]", self.exercise.id, self.answered)
    }
}
