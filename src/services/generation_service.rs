//! 出题编排服务 - 业务能力层
//!
//! 只负责"把一个 TestRequest 变成题目列表"，不关心会话和界面
//!
//! ## 两种请求形态
//! - 单主题：一次请求，失败即整体失败
//! - 模拟卷：按主题逐个顺序请求，单个主题失败只记录并跳过，
//!   最后打乱并截取到请求的数量

use crate::clients::{GenerateTestBody, QuizApi};
use crate::config::Config;
use crate::error::{AppError, AppResult, GenerationError};
use crate::infrastructure::{estimate_total_secs, LoadingStatus, ProgressEstimator};
use crate::models::{display_name, Catalog, Question, TestMode, TestRequest};
use crate::utils::logging::{log_generation_complete, log_generation_start};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// 生成结果
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// 考试标题
    pub title: String,
    pub questions: Vec<Question>,
    /// 请求的题目数量
    pub requested: usize,
    /// 模拟卷中失败被跳过的主题
    pub skipped_topics: Vec<String>,
}

/// 模拟卷中每个主题请求的题目数：`max(1, ceil(total / topics))`
pub fn questions_per_topic(total: usize, topic_count: usize) -> usize {
    if topic_count == 0 {
        return total.max(1);
    }
    total.div_ceil(topic_count).max(1)
}

/// 无偏打乱后截取前 `total` 道
pub fn sample_questions<R: Rng + ?Sized>(
    mut pool: Vec<Question>,
    total: usize,
    rng: &mut R,
) -> Vec<Question> {
    pool.shuffle(rng);
    pool.truncate(total);
    pool
}

/// 出题编排服务
pub struct GenerationService<A: QuizApi + ?Sized> {
    api: Arc<A>,
    seconds_per_item: u64,
    topic_tick: Duration,
    mock_tick: Duration,
    loading: Arc<watch::Sender<LoadingStatus>>,
}

impl<A: QuizApi + ?Sized> GenerationService<A> {
    /// 创建新的出题服务
    pub fn new(api: Arc<A>, config: &Config) -> Self {
        let (loading, _) = watch::channel(LoadingStatus::default());
        Self {
            api,
            seconds_per_item: config.estimated_seconds_per_item,
            topic_tick: Duration::from_millis(config.topic_progress_tick_ms),
            mock_tick: Duration::from_millis(config.mock_progress_tick_ms),
            loading: Arc::new(loading),
        }
    }

    /// 订阅加载状态（进度条 + 预计剩余时间）
    pub fn subscribe_loading(&self) -> watch::Receiver<LoadingStatus> {
        self.loading.subscribe()
    }

    pub fn loading_status(&self) -> LoadingStatus {
        self.loading.borrow().clone()
    }

    /// 根据请求生成题目
    ///
    /// 返回时网络结果已确定、进度已处理完毕、所有模拟进度调度均已取消
    pub async fn generate(
        &self,
        request: &TestRequest,
        catalog: Option<&Catalog>,
    ) -> AppResult<GenerationOutcome> {
        request.validate().map_err(AppError::invalid_request)?;

        match request.mode {
            TestMode::TopicWise => self.generate_topic_wise(request).await,
            TestMode::Mock => {
                let catalog = catalog.ok_or_else(|| GenerationError::UnknownSubject {
                    subject: request.subject.clone(),
                })?;
                self.assemble_mock(request, catalog).await
            }
        }
    }

    async fn generate_topic_wise(&self, request: &TestRequest) -> AppResult<GenerationOutcome> {
        let topic = request.topic.clone().unwrap_or_default();
        let requested = request.num_questions as usize;
        let estimated = estimate_total_secs(requested, self.seconds_per_item);
        let caption = format!(
            "Generating {} questions for \"{}\"...",
            requested,
            display_name(&topic)
        );
        log_generation_start(&caption, estimated);

        let mut estimator =
            ProgressEstimator::start(self.loading.clone(), caption, estimated, self.topic_tick);

        let body = GenerateTestBody {
            subject: request.subject.clone(),
            unit: request.unit.clone(),
            topic: Some(topic.clone()),
            num_questions: request.num_questions,
            test_type: TestMode::TopicWise,
        };

        match self.api.generate_test(&body).await {
            Ok(questions) => {
                estimator.finish();
                let questions = keep_valid(questions, &topic);
                log_generation_complete(questions.len(), requested, 0);
                Ok(GenerationOutcome {
                    title: format!("{} Test", display_name(&topic)),
                    questions,
                    requested,
                    skipped_topics: Vec::new(),
                })
            }
            Err(e) => {
                estimator.cancel();
                error!("❌ 单主题出题失败 ({}): {}", topic, e);
                Err(GenerationError::TopicRequestFailed(e).into())
            }
        }
    }

    async fn assemble_mock(
        &self,
        request: &TestRequest,
        catalog: &Catalog,
    ) -> AppResult<GenerationOutcome> {
        let subject = &request.subject;
        let entry = catalog
            .subject(subject)
            .ok_or_else(|| GenerationError::UnknownSubject {
                subject: subject.clone(),
            })?;
        let unit = entry
            .units
            .first()
            .filter(|u| !u.topics.is_empty())
            .ok_or_else(|| GenerationError::NoTopics {
                subject: subject.clone(),
            })?;

        let requested = request.num_questions as usize;
        let per_topic = questions_per_topic(requested, unit.topics.len());
        let estimated = estimate_total_secs(unit.topics.len(), self.seconds_per_item);
        let caption = "Building Mock Test...".to_string();
        log_generation_start(&caption, estimated);
        info!(
            "📋 {} 个主题，每个主题请求 {} 道题",
            unit.topics.len(),
            per_topic
        );

        let mut estimator =
            ProgressEstimator::start(self.loading.clone(), caption, estimated, self.mock_tick);

        let mut pool = Vec::new();
        let mut skipped_topics = Vec::new();

        // 逐个主题顺序请求
        for (idx, topic) in unit.topics.iter().enumerate() {
            let body = GenerateTestBody {
                subject: subject.clone(),
                unit: Some(unit.name.clone()),
                topic: Some(topic.clone()),
                num_questions: per_topic as u32,
                test_type: TestMode::Mock,
            };

            match self.api.generate_test(&body).await {
                Ok(questions) => {
                    let questions = keep_valid(questions, topic);
                    info!(
                        "[主题 {}/{}] ✓ {} 返回 {} 道题",
                        idx + 1,
                        unit.topics.len(),
                        topic,
                        questions.len()
                    );
                    pool.extend(questions);
                }
                Err(e) => {
                    warn!(
                        "[主题 {}/{}] ⚠️ {} 生成失败，跳过: {}",
                        idx + 1,
                        unit.topics.len(),
                        topic,
                        e
                    );
                    skipped_topics.push(topic.clone());
                }
            }
        }

        estimator.finish();

        let questions = sample_questions(pool, requested, &mut rand::rng());
        log_generation_complete(questions.len(), requested, skipped_topics.len());

        if questions.is_empty() {
            return Err(GenerationError::EmptyMock {
                subject: subject.clone(),
            }
            .into());
        }

        Ok(GenerationOutcome {
            title: format!("{} Mock Test", subject),
            questions,
            requested,
            skipped_topics,
        })
    }
}

/// 丢弃结构不合法的题目
fn keep_valid(questions: Vec<Question>, topic: &str) -> Vec<Question> {
    questions
        .into_iter()
        .filter(|q| match q.validate() {
            Ok(()) => true,
            Err(reason) => {
                warn!("⚠️ 丢弃不合法的题目 ({}): {} | {}", topic, reason, q);
                false
            }
        })
        .collect()
}
