//! 考试配置流程 - 流程层
//!
//! 步骤顺序：
//! 1. 选择模式（单主题 / 整科模拟）
//! 2. 选择科目（仅单主题）
//! 3. 选择主题（仅单主题，分页显示）
//! 4. 选择题量与时长 → 产出 TestRequest
//!
//! 整科模拟在第 1 步选定科目后直接进入第 4 步。

use crate::config::Config;
use crate::error::{AppError, AppResult, FlowError};
use crate::models::{display_name, Catalog, MockSubject, TestMode, TestRequest, UnitEntry};
use tracing::{debug, info, warn};

const MOCK_QUESTION_CHOICES: &[u32] = &[10, 15, 20];
const MOCK_MINUTE_CHOICES: &[u32] = &[10, 15, 20];
const TOPIC_QUESTION_CHOICES: &[u32] = &[5, 10, 15];
const TOPIC_MINUTE_CHOICES: &[u32] = &[5, 10, 15];

/// 配置步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ModeSelection,
    Subject,
    Topic,
    Config,
}

impl Step {
    pub fn name(self) -> &'static str {
        match self {
            Step::ModeSelection => "mode-selection",
            Step::Subject => "subject",
            Step::Topic => "topic",
            Step::Config => "config",
        }
    }
}

/// 第 4 步可选的参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOptions {
    pub title: String,
    pub question_choices: &'static [u32],
    pub default_questions: u32,
    pub minute_choices: &'static [u32],
    pub default_minutes: u32,
}

/// 主题列表的一页
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPage {
    pub header: String,
    /// 原始主题名（用于请求）
    pub topics: Vec<String>,
    pub page: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl TopicPage {
    /// 显示用名称（下划线替换为空格）
    pub fn labels(&self) -> Vec<String> {
        self.topics.iter().map(|t| display_name(t)).collect()
    }
}

/// 第 3 步的显示内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicArea {
    Page(TopicPage),
    /// 科目没有单元或单元没有主题时的提示
    Message(String),
}

/// 考试配置流程
#[derive(Debug, Clone)]
pub struct ConfigurationFlow {
    catalog: Option<Catalog>,
    catalog_error: Option<String>,
    page_size: usize,
    step: Step,
    mode: Option<TestMode>,
    subject: Option<String>,
    unit: Option<String>,
    topic: Option<String>,
    topic_page: usize,
}

impl ConfigurationFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            catalog: None,
            catalog_error: None,
            page_size: config.topics_per_page.max(1),
            step: Step::ModeSelection,
            mode: None,
            subject: None,
            unit: None,
            topic: None,
            topic_page: 0,
        }
    }

    pub fn set_catalog(&mut self, catalog: Catalog) {
        info!("✓ 目录加载完成: {} 个科目", catalog.subjects.len());
        self.catalog = Some(catalog);
        self.catalog_error = None;
    }

    /// 目录加载失败：记录内联提示，此后拒绝进入下一步
    pub fn set_catalog_error(&mut self, message: &str) {
        warn!("⚠️ 目录加载失败: {}", message);
        self.catalog = None;
        self.catalog_error = Some(format!("Could not load test structure: {}", message));
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    pub fn catalog_message(&self) -> Option<&str> {
        self.catalog_error.as_deref()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn mode(&self) -> Option<TestMode> {
        self.mode
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// 第 1 步：单主题练习
    pub fn choose_topic_wise(&mut self) -> AppResult<()> {
        self.expect_step(Step::ModeSelection)?;
        self.require_catalog()?;
        self.mode = Some(TestMode::TopicWise);
        self.step = Step::Subject;
        Ok(())
    }

    /// 第 1 步：整科模拟，直接进入参数配置
    pub fn choose_mock(&mut self, subject: MockSubject) -> AppResult<()> {
        self.expect_step(Step::ModeSelection)?;
        self.require_catalog()?;
        self.mode = Some(TestMode::Mock);
        self.subject = Some(subject.name().to_string());
        self.unit = None;
        self.topic = None;
        self.step = Step::Config;
        debug!("选择整科模拟: {}", subject);
        Ok(())
    }

    /// 第 2 步：选择科目，默认进入第一个单元的第 0 页
    pub fn choose_subject(&mut self, subject: &str) -> AppResult<()> {
        self.expect_step(Step::Subject)?;
        let unit = self
            .require_catalog()?
            .first_unit(subject)
            .map(|u| u.name.clone());
        if unit.is_none() {
            warn!("⚠️ 科目 {} 下没有任何单元", subject);
        }
        self.subject = Some(subject.to_string());
        self.unit = unit;
        self.topic = None;
        self.topic_page = 0;
        self.step = Step::Topic;
        Ok(())
    }

    /// 第 3 步的显示内容
    pub fn topic_area(&self) -> Option<TopicArea> {
        if self.step != Step::Topic {
            return None;
        }
        let subject = self.subject.as_deref()?;
        let Some(unit) = self.current_unit() else {
            return Some(TopicArea::Message(format!(
                "No topic files found for {}.",
                subject
            )));
        };
        if unit.topics.is_empty() {
            return Some(TopicArea::Message("No topics found.".to_string()));
        }

        let start = self.topic_page * self.page_size;
        let end = (start + self.page_size).min(unit.topics.len());
        Some(TopicArea::Page(TopicPage {
            header: format!("Step 2: Select a Topic for {}", subject),
            topics: unit.topics[start.min(end)..end].to_vec(),
            page: self.topic_page,
            has_prev: self.topic_page > 0,
            has_next: end < unit.topics.len(),
        }))
    }

    pub fn topic_page(&self) -> Option<TopicPage> {
        match self.topic_area()? {
            TopicArea::Page(page) => Some(page),
            TopicArea::Message(_) => None,
        }
    }

    /// 下一页；已在最后一页时不变，返回是否翻页
    pub fn next_topic_page(&mut self) -> bool {
        match self.topic_page() {
            Some(page) if page.has_next => {
                self.topic_page += 1;
                true
            }
            _ => false,
        }
    }

    pub fn prev_topic_page(&mut self) -> bool {
        match self.topic_page() {
            Some(page) if page.has_prev => {
                self.topic_page -= 1;
                true
            }
            _ => false,
        }
    }

    /// 第 3 步：选择主题
    pub fn choose_topic(&mut self, topic: &str) -> AppResult<()> {
        self.expect_step(Step::Topic)?;
        let known = self
            .current_unit()
            .is_some_and(|u| u.topics.iter().any(|t| t == topic));
        if !known {
            return Err(FlowError::UnknownTopic {
                topic: topic.to_string(),
            }
            .into());
        }
        self.topic = Some(topic.to_string());
        // 从参数配置返回后模式已被清空，重新选择主题即回到单主题练习
        self.mode = Some(TestMode::TopicWise);
        self.step = Step::Config;
        Ok(())
    }

    /// 返回上一步
    ///
    /// 离开参数配置时清空模式：整科模拟回到模式选择，单主题回到主题列表
    pub fn back(&mut self) {
        self.step = match self.step {
            Step::ModeSelection => Step::ModeSelection,
            Step::Subject => {
                self.mode = None;
                Step::ModeSelection
            }
            Step::Topic => Step::Subject,
            Step::Config => match self.mode.take() {
                Some(TestMode::Mock) => {
                    self.subject = None;
                    Step::ModeSelection
                }
                _ => Step::Topic,
            },
        };
    }

    /// 回到初始步骤，保留已加载的目录
    pub fn reset(&mut self) {
        self.step = Step::ModeSelection;
        self.mode = None;
        self.subject = None;
        self.unit = None;
        self.topic = None;
        self.topic_page = 0;
    }

    /// 第 4 步可选参数
    pub fn config_options(&self) -> AppResult<ConfigOptions> {
        self.expect_step(Step::Config)?;
        let options = match self.mode.ok_or(FlowError::ModeNotSelected)? {
            TestMode::Mock => ConfigOptions {
                title: format!(
                    "Configure {} Mock",
                    self.subject.as_deref().unwrap_or_default()
                ),
                question_choices: MOCK_QUESTION_CHOICES,
                default_questions: 10,
                minute_choices: MOCK_MINUTE_CHOICES,
                default_minutes: 15,
            },
            TestMode::TopicWise => ConfigOptions {
                title: "Step 3: Configure Your Test".to_string(),
                question_choices: TOPIC_QUESTION_CHOICES,
                default_questions: 10,
                minute_choices: TOPIC_MINUTE_CHOICES,
                default_minutes: 10,
            },
        };
        Ok(options)
    }

    /// 第 4 步：产出考试请求
    pub fn build_request(
        &self,
        num_questions: u32,
        duration_minutes: u32,
    ) -> AppResult<TestRequest> {
        self.expect_step(Step::Config)?;
        let mode = self.mode.ok_or(FlowError::ModeNotSelected)?;
        let request = TestRequest {
            mode,
            subject: self.subject.clone().unwrap_or_default(),
            unit: match mode {
                TestMode::TopicWise => self.unit.clone(),
                TestMode::Mock => None,
            },
            topic: match mode {
                TestMode::TopicWise => self.topic.clone(),
                TestMode::Mock => None,
            },
            num_questions,
            duration_minutes,
        };
        request.validate().map_err(AppError::invalid_request)?;
        Ok(request)
    }

    fn current_unit(&self) -> Option<&UnitEntry> {
        let catalog = self.catalog.as_ref()?;
        catalog.unit(self.subject.as_deref()?, self.unit.as_deref()?)
    }

    fn require_catalog(&self) -> Result<&Catalog, FlowError> {
        match (&self.catalog, &self.catalog_error) {
            (Some(catalog), _) => Ok(catalog),
            (None, Some(msg)) => Err(FlowError::CatalogUnavailable(msg.clone())),
            (None, None) => Err(FlowError::CatalogUnavailable(
                "Test structure is still loading.".to_string(),
            )),
        }
    }

    fn expect_step(&self, step: Step) -> Result<(), FlowError> {
        if self.step == step {
            Ok(())
        } else {
            Err(FlowError::WrongStep {
                step: self.step.name().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Topic_{}", i)).collect()
    }

    fn flow_with(n: usize) -> ConfigurationFlow {
        let json = serde_json::json!({
            "Quantitative Aptitude": { "Arithmetic": topics(n), "Advanced": ["Geometry"] },
            "Reasoning Ability": { "Topics": ["Syllogism"] },
            "General Awareness": {}
        });
        let mut flow = ConfigurationFlow::new(&Config::default());
        flow.set_catalog(serde_json::from_value(json).unwrap());
        flow
    }

    #[test]
    fn test_topic_pagination() {
        let mut flow = flow_with(20);
        flow.choose_topic_wise().unwrap();
        flow.choose_subject("Quantitative Aptitude").unwrap();

        let page = flow.topic_page().unwrap();
        assert_eq!(page.topics, topics(20)[0..8].to_vec());
        assert!(!page.has_prev);
        assert!(page.has_next);
        assert_eq!(page.header, "Step 2: Select a Topic for Quantitative Aptitude");
        assert_eq!(page.labels()[0], "Topic 0");

        assert!(flow.next_topic_page());
        assert!(flow.next_topic_page());
        let page = flow.topic_page().unwrap();
        assert_eq!(page.page, 2);
        assert_eq!(page.topics, topics(20)[16..20].to_vec());
        assert!(page.has_prev);
        assert!(!page.has_next);

        // 最后一页再翻页不变
        assert!(!flow.next_topic_page());
        assert_eq!(flow.topic_page().unwrap().page, 2);
    }

    #[test]
    fn test_exact_multiple_has_no_empty_trailing_page() {
        let mut flow = flow_with(8);
        flow.choose_topic_wise().unwrap();
        flow.choose_subject("Quantitative Aptitude").unwrap();
        let page = flow.topic_page().unwrap();
        assert!(!page.has_next && !page.has_prev);
        assert!(!flow.prev_topic_page());
    }

    #[test]
    fn test_topic_wise_flow_builds_request() {
        let mut flow = flow_with(3);
        flow.choose_topic_wise().unwrap();
        flow.choose_subject("Quantitative Aptitude").unwrap();
        flow.choose_topic("Topic_1").unwrap();
        assert_eq!(flow.step(), Step::Config);

        let options = flow.config_options().unwrap();
        assert_eq!(options.title, "Step 3: Configure Your Test");
        assert_eq!(options.question_choices, &[5, 10, 15]);
        assert_eq!((options.default_questions, options.default_minutes), (10, 10));

        let request = flow.build_request(5, 10).unwrap();
        assert_eq!(request.mode, TestMode::TopicWise);
        assert_eq!(request.unit.as_deref(), Some("Arithmetic"));
        assert_eq!(request.topic.as_deref(), Some("Topic_1"));
        assert_eq!(request.duration_secs(), 600);
    }

    #[test]
    fn test_mock_jumps_to_config_and_back_clears_mode() {
        let mut flow = flow_with(3);
        flow.choose_mock(MockSubject::Reasoning).unwrap();
        assert_eq!(flow.step(), Step::Config);
        let options = flow.config_options().unwrap();
        assert_eq!(options.title, "Configure Reasoning Ability Mock");
        assert_eq!((options.default_questions, options.default_minutes), (10, 15));

        let request = flow.build_request(10, 15).unwrap();
        assert_eq!(request.mode, TestMode::Mock);
        assert_eq!(request.subject, "Reasoning Ability");
        assert!(request.topic.is_none());

        flow.back();
        assert_eq!(flow.step(), Step::ModeSelection);
        assert_eq!(flow.mode(), None);
    }

    #[test]
    fn test_back_from_topic_wise_config_returns_to_topics() {
        let mut flow = flow_with(3);
        flow.choose_topic_wise().unwrap();
        flow.choose_subject("Quantitative Aptitude").unwrap();
        flow.choose_topic("Topic_2").unwrap();

        flow.back();
        assert_eq!(flow.step(), Step::Topic);
        assert_eq!(flow.mode(), None);

        flow.choose_topic("Topic_0").unwrap();
        assert_eq!(flow.mode(), Some(TestMode::TopicWise));

        flow.back();
        flow.back();
        assert_eq!(flow.step(), Step::Subject);
        flow.back();
        assert_eq!(flow.step(), Step::ModeSelection);
    }

    #[test]
    fn test_subject_without_units_shows_message() {
        let mut flow = flow_with(3);
        flow.choose_topic_wise().unwrap();
        flow.choose_subject("General Awareness").unwrap();
        assert_eq!(
            flow.topic_area(),
            Some(TopicArea::Message(
                "No topic files found for General Awareness.".to_string()
            ))
        );
        assert!(flow.choose_topic("Anything").is_err());
    }

    #[test]
    fn test_catalog_failure_blocks_progression() {
        let mut flow = ConfigurationFlow::new(&Config::default());
        flow.set_catalog_error("Base folder 'source_material' not found.");
        assert_eq!(
            flow.catalog_message(),
            Some("Could not load test structure: Base folder 'source_material' not found.")
        );

        let err = flow.choose_topic_wise().unwrap_err();
        assert_eq!(
            err.user_message(),
            "Could not load test structure: Base folder 'source_material' not found."
        );
        assert!(flow.choose_mock(MockSubject::Quant).is_err());
        assert_eq!(flow.step(), Step::ModeSelection);
    }

    #[test]
    fn test_wrong_step_and_invalid_values_rejected() {
        let mut flow = flow_with(3);
        assert!(matches!(
            flow.choose_subject("Quantitative Aptitude"),
            Err(AppError::Flow(FlowError::WrongStep { .. }))
        ));
        assert!(flow.build_request(10, 10).is_err());

        flow.choose_mock(MockSubject::Quant).unwrap();
        assert!(flow.build_request(0, 10).is_err());

        flow.reset();
        assert_eq!(flow.step(), Step::ModeSelection);
        assert!(flow.subject().is_none());
        assert!(flow.catalog().is_some());
    }
}
