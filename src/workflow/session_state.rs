//! 考试会话 - 流程层
//!
//! 持有题目、作答与当前位置，是作答阶段唯一的可变状态。
//! 计时与自动跳题由编排层调度，这里只提供同步的状态变更。
//!
//! 状态机：InProgress ⇄ Paused → Submitted（终态）
//! - 暂停期间拒绝一切导航与作答
//! - 提交（手动确认或超时）绕过暂停，且只发生一次

use crate::error::SessionError;
use crate::models::Question;
use crate::services::scoring_service::{self, ScoreReport};
use chrono::{DateTime, Local};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// 会话所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    InProgress,
    Paused,
    Submitted,
}

/// 题号面板中的一格
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub index: usize,
    pub current: bool,
    pub answered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub index: usize,
    pub text: String,
    pub selected: bool,
}

/// 当前题目的展示数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub header: String,
    pub text: String,
    pub options: Vec<OptionView>,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

/// 一次作答的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// 这道题此前未作答
    pub first_answer: bool,
    /// 需要延迟跳转到的题目
    pub auto_advance_to: Option<usize>,
}

/// 考试会话
#[derive(Debug, Clone)]
pub struct Session {
    title: String,
    questions: Vec<Question>,
    answers: Vec<Option<usize>>,
    current_index: usize,
    paused: bool,
    duration_secs: u64,
    started_at: Instant,
    ended_at: Option<Instant>,
    submitted_at: Option<DateTime<Local>>,
}

impl Session {
    /// 创建会话，题目列表为空时返回错误
    pub fn new(
        title: impl Into<String>,
        questions: Vec<Question>,
        duration_secs: u64,
        started_at: Instant,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        let answers = vec![None; questions.len()];
        Ok(Self {
            title: title.into(),
            questions,
            answers,
            current_index: 0,
            paused: false,
            duration_secs,
            started_at,
            ended_at: None,
            submitted_at: None,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_submitted(&self) -> bool {
        self.ended_at.is_some()
    }

    pub fn phase(&self) -> Phase {
        if self.is_submitted() {
            Phase::Submitted
        } else if self.paused {
            Phase::Paused
        } else {
            Phase::InProgress
        }
    }

    fn accepts_input(&self) -> bool {
        !self.paused && !self.is_submitted()
    }

    /// 跳转到指定题目；暂停、已提交或越界时不做任何事
    pub fn goto(&mut self, index: usize) -> bool {
        if !self.accepts_input() || index >= self.questions.len() {
            return false;
        }
        self.current_index = index;
        true
    }

    pub fn next(&mut self) -> bool {
        self.goto(self.current_index + 1)
    }

    pub fn prev(&mut self) -> bool {
        match self.current_index.checked_sub(1) {
            Some(index) => self.goto(index),
            None => false,
        }
    }

    /// 记录当前题目的作答
    ///
    /// 首次作答且不在最后一题时返回自动跳转目标；暂停、已提交或选项越界时返回 `None`
    pub fn record_answer(&mut self, option: usize) -> Option<AnswerOutcome> {
        if !self.accepts_input() {
            return None;
        }
        let index = self.current_index;
        if option >= self.questions[index].options.len() {
            debug!("忽略越界选项 {} (第 {} 题)", option, index + 1);
            return None;
        }

        let first_answer = self.answers[index].is_none();
        self.answers[index] = Some(option);

        let last = self.questions.len() - 1;
        let auto_advance_to = (first_answer && index < last).then_some(index + 1);
        Some(AnswerOutcome {
            first_answer,
            auto_advance_to,
        })
    }

    /// 切换暂停状态，返回切换后的状态；已提交时不变
    pub fn toggle_pause(&mut self) -> bool {
        if !self.is_submitted() {
            self.paused = !self.paused;
            let state = if self.paused { "⏸️ 已暂停" } else { "▶️ 继续" };
            info!("{} {}", state, self.title);
        }
        self.paused
    }

    pub fn palette(&self) -> Vec<PaletteEntry> {
        self.answers
            .iter()
            .enumerate()
            .map(|(index, answer)| PaletteEntry {
                index,
                current: index == self.current_index,
                answered: answer.is_some(),
            })
            .collect()
    }

    pub fn view(&self) -> QuestionView {
        let question = self.current_question();
        let selected = self.answers[self.current_index];
        QuestionView {
            header: format!("Question {} of {}", self.current_index + 1, self.len()),
            text: question.text.clone(),
            options: question
                .options
                .iter()
                .enumerate()
                .map(|(index, text)| OptionView {
                    index,
                    text: text.clone(),
                    selected: selected == Some(index),
                })
                .collect(),
            prev_enabled: self.current_index > 0,
            next_enabled: self.current_index + 1 < self.len(),
        }
    }

    pub fn unanswered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_none()).count()
    }

    /// 手动提交前的确认文案
    pub fn submit_prompt(&self) -> String {
        match self.unanswered_count() {
            0 => "Are you sure you want to submit the test?".to_string(),
            n => format!("You have {} unanswered questions. Submit?", n),
        }
    }

    /// 提交；只有第一次调用生效，返回本次是否完成了提交
    pub fn submit(&mut self, now: Instant) -> bool {
        if self.is_submitted() {
            return false;
        }
        self.ended_at = Some(now);
        self.submitted_at = Some(Local::now());
        self.paused = false;
        info!(
            "📝 提交 {}: 已作答 {}/{}",
            self.title,
            self.len() - self.unanswered_count(),
            self.len()
        );
        true
    }

    /// 开始到提交的时长；未提交时为 `None`
    pub fn elapsed(&self) -> Option<Duration> {
        self.ended_at
            .map(|end| end.saturating_duration_since(self.started_at))
    }

    /// 评分，仅在提交后可用
    pub fn grade(&self) -> Result<ScoreReport, SessionError> {
        let (elapsed, submitted_at) = self
            .elapsed()
            .zip(self.submitted_at)
            .ok_or(SessionError::NotSubmitted)?;
        Ok(scoring_service::grade(
            &self.questions,
            &self.answers,
            elapsed,
            submitted_at,
        ))
    }
}
