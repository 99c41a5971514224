//! 评分服务 - 业务能力层
//!
//! 只负责"对比答案并给出成绩"，不关心会话状态机

use crate::models::Question;
use crate::utils::format_mm_ss;
use chrono::{DateTime, Local};
use std::time::Duration;

/// 成绩单
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreReport {
    pub score: usize,
    pub total: usize,
    /// 已四舍五入到两位小数
    pub percentage: f64,
    pub time_taken_secs: u64,
    pub submitted_at: DateTime<Local>,
}

impl ScoreReport {
    /// 两位小数的百分比文本，如 `"50.00"`
    pub fn percentage_label(&self) -> String {
        format!("{:.2}", self.percentage)
    }

    /// `MM:SS`
    pub fn time_taken_label(&self) -> String {
        format_mm_ss(self.time_taken_secs)
    }

    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("You scored {} out of {}.", self.score, self.total),
            format!("Percentage: {}%", self.percentage_label()),
            format!("Time Taken: {}", self.time_taken_label()),
        ]
    }
}

/// 评分
///
/// # 参数
/// - `questions`: 题目列表
/// - `answers`: 与题目一一对应的作答（未作答为 `None`）
/// - `elapsed`: 从开始到提交的时长，向下取整到秒
/// - `submitted_at`: 提交时刻（仅用于展示）
pub fn grade(
    questions: &[Question],
    answers: &[Option<usize>],
    elapsed: Duration,
    submitted_at: DateTime<Local>,
) -> ScoreReport {
    let score = questions
        .iter()
        .zip(answers)
        .filter(|(q, a)| q.is_correct(**a))
        .count();
    let total = questions.len();
    let percentage = if total == 0 {
        0.0
    } else {
        round2(score as f64 / total as f64 * 100.0)
    };

    ScoreReport {
        score,
        total,
        percentage,
        time_taken_secs: elapsed.as_secs(),
        submitted_at,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
