//! 交卷后的逐题回顾
//!
//! 只读：持有已提交的会话，不提供任何修改作答的入口

use crate::error::SessionError;
use crate::services::ScoreReport;
use crate::workflow::session_state::Session;

/// 选项标记
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionTag {
    /// 正确答案
    Correct,
    /// 用户选了但不正确
    Incorrect,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOption {
    pub text: String,
    pub tag: OptionTag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewView {
    pub header: String,
    pub text: String,
    pub explanation: String,
    pub options: Vec<ReviewOption>,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

/// 为一道题的每个选项打标记；未作答时不会出现 `Incorrect`
pub fn tag_options(options_len: usize, key: usize, answer: Option<usize>) -> Vec<OptionTag> {
    (0..options_len)
        .map(|i| {
            if i == key {
                OptionTag::Correct
            } else if answer == Some(i) {
                OptionTag::Incorrect
            } else {
                OptionTag::Neutral
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct ReviewNavigator {
    session: Session,
    report: ScoreReport,
    index: usize,
}

impl ReviewNavigator {
    pub fn new(session: Session) -> Result<Self, SessionError> {
        let report = session.grade()?;
        Ok(Self {
            session,
            report,
            index: 0,
        })
    }

    pub fn report(&self) -> &ScoreReport {
        &self.report
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(&mut self) -> bool {
        if self.index + 1 < self.session.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    pub fn view(&self) -> ReviewView {
        let question = &self.session.questions()[self.index];
        let answer = self.session.answers()[self.index];
        let tags = tag_options(question.options.len(), question.correct_option_index, answer);

        ReviewView {
            header: format!(
                "Reviewing Question {} of {}",
                self.index + 1,
                self.session.len()
            ),
            text: question.text.clone(),
            explanation: question.explanation.clone(),
            options: question
                .options
                .iter()
                .zip(tags)
                .map(|(text, tag)| ReviewOption {
                    text: text.clone(),
                    tag,
                })
                .collect(),
            prev_enabled: self.index > 0,
            next_enabled: self.index + 1 < self.session.len(),
        }
    }
}
