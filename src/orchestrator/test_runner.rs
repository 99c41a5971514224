//! 考试运行器 - 编排层
//!
//! ## 职责
//!
//! 把配置流程、出题、会话、计时、评分与回顾串成一个状态机：
//!
//! ```text
//! Configuring → (Generating) → Running ⇄ Paused → Finished
//!      ↑                                              │
//!      └──────────────────── restart ─────────────────┘
//! ```
//!
//! ## 事件模型
//!
//! - 用户操作通过 [`Intent`] 同步进入 [`TestRunner::dispatch`]
//! - 计时、自动跳题与提示请求在后台任务中运行，只向通道投递 [`SessionEvent`]
//! - 运行器是会话唯一的修改者；每个事件带有会话代号（epoch），
//!   过期会话的事件直接丢弃

use crate::clients::QuizApi;
use crate::config::Config;
use crate::error::{AppResult, SessionError};
use crate::infrastructure::{spawn_after, spawn_task, Clock, LoadingStatus, TaskHandle};
use crate::models::TestRequest;
use crate::services::{GenerationService, HintService};
use crate::utils::format_mm_ss;
use crate::utils::logging::print_final_stats;
use crate::workflow::{
    ConfigurationFlow, PaletteEntry, QuestionView, ReviewNavigator, ReviewView, Session, Step,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, error, info};

/// 后台任务投递的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub epoch: u64,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// 倒计时剩余秒数
    Tick(u64),
    /// 倒计时到期的时刻
    Expired(Instant),
    /// 自动跳转到指定题目
    AutoAdvance(usize),
    /// 提示服务的回复
    HintReply(String),
}

/// 用户操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SelectOption(usize),
    Next,
    Prev,
    Goto(usize),
    TogglePause,
    RequestSubmit,
    ConfirmSubmit,
    /// 放弃本次交卷确认
    CancelSubmit,
    ReviewNext,
    ReviewPrev,
    Restart,
}

/// 需要前端展示给用户的提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// 阻塞式提示
    Alert(String),
    /// 需要用户确认
    Confirm(String),
    Info(String),
    /// 提示回复
    Hint(String),
}

/// 当前界面
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Configuring {
        step: Step,
        catalog_message: Option<String>,
    },
    InProgress {
        title: String,
        question: QuestionView,
        palette: Vec<PaletteEntry>,
        timer_label: String,
        paused: bool,
    },
    Finished {
        summary: Vec<String>,
        review: ReviewView,
    },
}

enum Stage {
    Configuring,
    Running(Session),
    Finished(ReviewNavigator),
}

/// 考试运行器
pub struct TestRunner<A: QuizApi + ?Sized> {
    api: Arc<A>,
    flow: ConfigurationFlow,
    generation: GenerationService<A>,
    hints: HintService<A>,
    clock: Clock,
    auto_advance: Option<TaskHandle>,
    auto_advance_delay: Duration,
    hint_requests: Vec<TaskHandle>,
    confirm_pending: bool,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    epoch: u64,
    remaining_secs: u64,
    stage: Stage,
}

impl<A: QuizApi + ?Sized + 'static> TestRunner<A> {
    pub fn new(api: Arc<A>, config: &Config) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            flow: ConfigurationFlow::new(config),
            generation: GenerationService::new(api.clone(), config),
            hints: HintService::new(api.clone(), config),
            api,
            clock: Clock::new(),
            auto_advance: None,
            auto_advance_delay: Duration::from_millis(config.auto_advance_delay_ms),
            hint_requests: Vec::new(),
            confirm_pending: false,
            events_tx,
            events_rx,
            epoch: 0,
            remaining_secs: 0,
            stage: Stage::Configuring,
        }
    }

    pub fn flow(&self) -> &ConfigurationFlow {
        &self.flow
    }

    pub fn flow_mut(&mut self) -> &mut ConfigurationFlow {
        &mut self.flow
    }

    pub fn hints(&self) -> &HintService<A> {
        &self.hints
    }

    pub fn hints_mut(&mut self) -> &mut HintService<A> {
        &mut self.hints
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<LoadingStatus> {
        self.generation.subscribe_loading()
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.stage {
            Stage::Running(session) => Some(session),
            _ => None,
        }
    }

    pub fn review(&self) -> Option<&ReviewNavigator> {
        match &self.stage {
            Stage::Finished(review) => Some(review),
            _ => None,
        }
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// 是否已给出交卷确认提示、正在等待确认
    pub fn confirm_pending(&self) -> bool {
        self.confirm_pending
    }

    /// 加载科目目录；失败不致命，提示保存在配置流程中
    pub async fn load_catalog(&mut self) -> bool {
        match self.api.get_structure().await {
            Ok(catalog) => {
                self.flow.set_catalog(catalog);
                true
            }
            Err(e) => {
                self.flow.set_catalog_error(&e.to_string());
                false
            }
        }
    }

    /// 按配置流程当前的选择开始考试
    pub async fn start_configured(
        &mut self,
        num_questions: u32,
        duration_minutes: u32,
    ) -> AppResult<()> {
        let request = self.flow.build_request(num_questions, duration_minutes)?;
        self.start_test(request).await
    }

    /// 出题并开始计时
    ///
    /// 出题失败时配置流程回到第一步，错误交给前端提示
    pub async fn start_test(&mut self, request: TestRequest) -> AppResult<()> {
        if !matches!(self.stage, Stage::Configuring) {
            return Err(SessionError::NotRunning.into());
        }
        info!("🧪 开始出题: {} ({})", request.subject, request.mode);

        let outcome = match self
            .generation
            .generate(&request, self.flow.catalog())
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("❌ 出题失败: {}", e);
                self.flow.reset();
                return Err(e);
            }
        };

        let session = match Session::new(
            outcome.title,
            outcome.questions,
            request.duration_secs(),
            Instant::now(),
        ) {
            Ok(session) => session,
            Err(e) => {
                error!("❌ 无法开始考试: {}", e);
                self.flow.reset();
                return Err(e.into());
            }
        };

        self.epoch += 1;
        self.confirm_pending = false;
        self.remaining_secs = session.duration_secs();
        self.start_clock(session.duration_secs());
        info!(
            "✓ 考试开始: {} | {} 道题 | {}",
            session.title(),
            session.len(),
            format_mm_ss(session.duration_secs())
        );
        self.stage = Stage::Running(session);
        Ok(())
    }

    fn start_clock(&mut self, duration_secs: u64) {
        let epoch = self.epoch;
        let tick_tx = self.events_tx.clone();
        let expire_tx = self.events_tx.clone();
        self.clock.start(
            duration_secs,
            move |remaining| {
                let _ = tick_tx.send(SessionEvent {
                    epoch,
                    kind: EventKind::Tick(remaining),
                });
            },
            move || {
                let _ = expire_tx.send(SessionEvent {
                    epoch,
                    kind: EventKind::Expired(Instant::now()),
                });
            },
        );
    }

    /// 处理一个用户操作
    pub fn dispatch(&mut self, intent: Intent) -> Option<Notice> {
        debug!("操作: {:?}", intent);
        match intent {
            Intent::Restart => {
                self.restart();
                None
            }
            Intent::ReviewNext | Intent::ReviewPrev => {
                if let Stage::Finished(review) = &mut self.stage {
                    if intent == Intent::ReviewNext {
                        review.next();
                    } else {
                        review.prev();
                    }
                }
                None
            }
            Intent::ConfirmSubmit => {
                if matches!(self.stage, Stage::Running(_)) && self.confirm_pending {
                    self.finish_session(Instant::now());
                } else {
                    debug!("没有待确认的交卷提示，忽略确认");
                }
                None
            }
            intent => self.dispatch_running(intent),
        }
    }

    fn dispatch_running(&mut self, intent: Intent) -> Option<Notice> {
        let Stage::Running(session) = &mut self.stage else {
            debug!("当前没有进行中的考试，忽略操作 {:?}", intent);
            return None;
        };
        self.confirm_pending = false;
        match intent {
            Intent::SelectOption(option) => {
                let outcome = session.record_answer(option)?;
                if let Some(target) = outcome.auto_advance_to {
                    let tx = self.events_tx.clone();
                    let epoch = self.epoch;
                    self.auto_advance = Some(spawn_after(self.auto_advance_delay, move || {
                        let _ = tx.send(SessionEvent {
                            epoch,
                            kind: EventKind::AutoAdvance(target),
                        });
                    }));
                }
            }
            Intent::Next => {
                session.next();
            }
            Intent::Prev => {
                session.prev();
            }
            Intent::Goto(index) => {
                session.goto(index);
            }
            Intent::TogglePause => {
                if session.toggle_pause() {
                    self.clock.pause();
                } else {
                    self.clock.resume();
                }
            }
            Intent::RequestSubmit => {
                self.confirm_pending = true;
                return Some(Notice::Confirm(session.submit_prompt()));
            }
            Intent::CancelSubmit
            | Intent::ConfirmSubmit
            | Intent::ReviewNext
            | Intent::ReviewPrev
            | Intent::Restart => {}
        }
        None
    }

    /// 等待下一个后台事件
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    /// 处理后台事件；过期会话的事件被丢弃
    pub fn handle_event(&mut self, event: SessionEvent) -> Option<Notice> {
        if event.epoch != self.epoch {
            debug!("丢弃过期事件 {:?} (当前 epoch {})", event, self.epoch);
            return None;
        }
        let Stage::Running(session) = &mut self.stage else {
            return None;
        };
        match event.kind {
            EventKind::Tick(remaining) => {
                self.remaining_secs = remaining;
                None
            }
            EventKind::AutoAdvance(target) => {
                session.goto(target);
                None
            }
            EventKind::Expired(at) => {
                info!("⏰ 考试时间到，强制交卷");
                self.remaining_secs = 0;
                self.finish_session(at);
                Some(Notice::Info("Time's up!".to_string()))
            }
            EventKind::HintReply(reply) => {
                self.hints.record_reply(&reply);
                Some(Notice::Hint(reply))
            }
        }
    }

    /// 交卷：停止计时、取消后台任务、评分并进入回顾
    ///
    /// `ended_at` 是交卷发生的时刻，而不是事件被处理的时刻
    fn finish_session(&mut self, ended_at: Instant) {
        self.clock.stop();
        if let Some(mut pending) = self.auto_advance.take() {
            pending.cancel();
        }
        self.hint_requests.clear();
        self.confirm_pending = false;

        let Stage::Running(mut session) = std::mem::replace(&mut self.stage, Stage::Configuring)
        else {
            return;
        };
        session.submit(ended_at);
        self.epoch += 1;

        match ReviewNavigator::new(session) {
            Ok(review) => {
                let report = review.report();
                print_final_stats(
                    report.score,
                    report.total,
                    &report.percentage_label(),
                    &report.time_taken_label(),
                );
                self.stage = Stage::Finished(review);
            }
            Err(e) => {
                error!("❌ 评分失败: {}", e);
                self.flow.reset();
            }
        }
    }

    fn restart(&mut self) {
        info!("🔄 重新开始");
        self.clock.stop();
        self.auto_advance = None;
        self.hint_requests.clear();
        self.confirm_pending = false;
        self.epoch += 1;
        self.remaining_secs = 0;
        self.hints.clear();
        self.flow.reset();
        self.stage = Stage::Configuring;
    }

    /// 针对当前题目请求提示，返回是否已发出请求
    ///
    /// 请求在后台进行，回复以 [`EventKind::HintReply`] 送回；等待期间考试照常进行
    pub fn ask_hint(&mut self, query: &str) -> bool {
        let Stage::Running(session) = &self.stage else {
            return false;
        };
        let Some(body) = self.hints.prepare(query, session.current_question()) else {
            return false;
        };

        let fetch = self.hints.fetch(body);
        let tx = self.events_tx.clone();
        let epoch = self.epoch;
        self.hint_requests.retain(TaskHandle::is_active);
        self.hint_requests.push(spawn_task(async move {
            let reply = fetch.await;
            let _ = tx.send(SessionEvent {
                epoch,
                kind: EventKind::HintReply(reply),
            });
        }));
        true
    }

    pub fn render(&self) -> Screen {
        match &self.stage {
            Stage::Configuring => Screen::Configuring {
                step: self.flow.step(),
                catalog_message: self.flow.catalog_message().map(str::to_string),
            },
            Stage::Running(session) => Screen::InProgress {
                title: session.title().to_string(),
                question: session.view(),
                palette: session.palette(),
                timer_label: format_mm_ss(self.remaining_secs),
                paused: session.is_paused(),
            },
            Stage::Finished(review) => Screen::Finished {
                summary: review.report().summary_lines(),
                review: review.view(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MockSubject, TestMode};
    use crate::services::generation_service::tests::{catalog, FakeApi};
    use crate::workflow::Phase;
    use tokio::time::sleep;

    fn topic_request(num_questions: u32, duration_minutes: u32) -> TestRequest {
        TestRequest {
            mode: TestMode::TopicWise,
            subject: "Quantitative Aptitude".into(),
            unit: Some("Topics".into()),
            topic: Some("Percentage".into()),
            num_questions,
            duration_minutes,
        }
    }

    async fn running(num_questions: u32, duration_minutes: u32) -> TestRunner<FakeApi> {
        let mut runner = TestRunner::new(Arc::new(FakeApi::default()), &Config::default());
        runner
            .start_test(topic_request(num_questions, duration_minutes))
            .await
            .unwrap();
        runner
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_forces_submission_without_prompt() {
        let mut runner = running(3, 1).await;
        let start = Instant::now();

        let notice = loop {
            let event = runner.next_event().await.unwrap();
            if let Some(notice) = runner.handle_event(event) {
                break notice;
            }
        };
        assert_eq!(notice, Notice::Info("Time's up!".to_string()));
        assert_eq!(start.elapsed(), Duration::from_secs(61));

        let review = runner.review().unwrap();
        assert_eq!(review.session().phase(), Phase::Submitted);
        assert_eq!(review.session().unanswered_count(), 3);
        assert_eq!(review.report().time_taken_label(), "01:01");
        assert!(!runner.clock.is_running());

        // 交卷之后不再有任何事件生效
        sleep(Duration::from_secs(5)).await;
        assert!(runner.events_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_updates_timer_label() {
        let mut runner = running(2, 5).await;
        let event = runner.next_event().await.unwrap();
        assert_eq!(event.kind, EventKind::Tick(299));
        runner.handle_event(event);
        match runner.render() {
            Screen::InProgress { timer_label, .. } => assert_eq!(timer_label, "04:59"),
            other => panic!("unexpected screen {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_advance_only_on_first_answer() {
        let mut runner = running(4, 5).await;

        runner.dispatch(Intent::SelectOption(2));
        let event = runner.next_event().await.unwrap();
        assert_eq!(event.kind, EventKind::AutoAdvance(1));
        runner.handle_event(event);
        assert_eq!(runner.session().unwrap().current_index(), 1);

        // 回到第 1 题改答案，不会再次跳题
        runner.dispatch(Intent::Prev);
        runner.dispatch(Intent::SelectOption(3));
        let event = runner.next_event().await.unwrap();
        assert_eq!(event.kind, EventKind::Tick(299));
        assert_eq!(runner.session().unwrap().current_index(), 0);
        assert_eq!(runner.session().unwrap().answers()[0], Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_freezes_countdown_and_navigation() {
        let mut runner = running(3, 5).await;
        let event = runner.next_event().await.unwrap();
        runner.handle_event(event);
        assert_eq!(runner.remaining_secs(), 299);

        runner.dispatch(Intent::TogglePause);
        sleep(Duration::from_secs(10)).await;
        assert!(runner.events_rx.try_recv().is_err());
        runner.dispatch(Intent::Next);
        runner.dispatch(Intent::SelectOption(0));
        let session = runner.session().unwrap();
        assert_eq!(session.current_index(), 0);
        assert!(session.answers().iter().all(Option::is_none));

        runner.dispatch(Intent::TogglePause);
        let event = runner.next_event().await.unwrap();
        assert_eq!(event.kind, EventKind::Tick(298));
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_submit_requires_confirmation() {
        let mut runner = running(3, 5).await;
        runner.dispatch(Intent::SelectOption(0));

        let notice = runner.dispatch(Intent::RequestSubmit);
        assert_eq!(
            notice,
            Some(Notice::Confirm(
                "You have 2 unanswered questions. Submit?".to_string()
            ))
        );
        assert!(runner.session().is_some());

        runner.dispatch(Intent::ConfirmSubmit);
        assert!(runner.auto_advance.is_none());
        match runner.render() {
            Screen::Finished { summary, review } => {
                assert_eq!(summary[0], "You scored 1 out of 3.");
                assert_eq!(summary[1], "Percentage: 33.33%");
                assert_eq!(review.header, "Reviewing Question 1 of 3");
            }
            other => panic!("unexpected screen {:?}", other),
        }

        // 自动跳题已被取消，交卷后的事件被丢弃
        sleep(Duration::from_secs(2)).await;
        while let Ok(event) = runner.events_rx.try_recv() {
            assert_eq!(runner.handle_event(event), None);
        }

        runner.dispatch(Intent::ReviewNext);
        assert_eq!(runner.review().unwrap().index(), 1);
        runner.dispatch(Intent::ReviewPrev);
        runner.dispatch(Intent::ReviewPrev);
        assert_eq!(runner.review().unwrap().index(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_epoch_events_are_discarded() {
        let mut runner = running(3, 5).await;
        let stale = SessionEvent {
            epoch: runner.epoch - 1,
            kind: EventKind::Expired(Instant::now()),
        };
        assert_eq!(runner.handle_event(stale), None);
        assert!(runner.session().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_topic_wise_failure_resets_flow() {
        let api = Arc::new(FakeApi {
            catalog_json: Some(
                serde_json::json!({"Quantitative Aptitude": {"Topics": ["Percentage"]}})
                    .to_string(),
            ),
            ..FakeApi::failing(&["Percentage"])
        });
        let mut runner = TestRunner::new(api, &Config::default());
        assert!(runner.load_catalog().await);

        let flow = runner.flow_mut();
        flow.choose_topic_wise().unwrap();
        flow.choose_subject("Quantitative Aptitude").unwrap();
        flow.choose_topic("Percentage").unwrap();

        let err = runner.start_configured(10, 10).await.unwrap_err();
        assert_eq!(err.user_message(), "Failed to generate questions for 'Percentage'.");
        assert_eq!(runner.flow().step(), Step::ModeSelection);
        assert!(matches!(runner.render(), Screen::Configuring { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_catalog_failure_is_inline() {
        let mut runner = TestRunner::new(Arc::new(FakeApi::default()), &Config::default());
        assert!(!runner.load_catalog().await);
        match runner.render() {
            Screen::Configuring {
                step,
                catalog_message,
            } => {
                assert_eq!(step, Step::ModeSelection);
                assert_eq!(
                    catalog_message.as_deref(),
                    Some("Could not load test structure: Base folder 'source_material' not found.")
                );
            }
            other => panic!("unexpected screen {:?}", other),
        }
        assert!(runner.flow_mut().choose_mock(MockSubject::Quant).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_run_and_restart() {
        let mut runner = TestRunner::new(Arc::new(FakeApi::default()), &Config::default());
        runner.flow.set_catalog(catalog(&["Ages", "Percentage"]));
        runner.flow_mut().choose_mock(MockSubject::Quant).unwrap();
        runner.start_configured(10, 15).await.unwrap();

        let session = runner.session().unwrap();
        assert_eq!(session.title(), "Quantitative Aptitude Mock Test");
        assert_eq!(session.len(), 10);
        assert_eq!(runner.remaining_secs(), 900);

        runner.dispatch(Intent::Restart);
        assert!(runner.session().is_none());
        assert_eq!(runner.flow().step(), Step::ModeSelection);
        assert!(!runner.clock.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hint_uses_current_question() {
        let api = Arc::new(FakeApi {
            chat_reply: Some("Think in terms of 100.".into()),
            ..Default::default()
        });
        let mut runner = TestRunner::new(api, &Config::default());
        assert!(!runner.ask_hint("help"));

        runner.start_test(topic_request(2, 5)).await.unwrap();
        assert!(runner.ask_hint("help"));
        assert!(!runner.ask_hint("   "));
        assert_eq!(runner.hints().pending(), 1);

        let event = runner.next_event().await.unwrap();
        assert_eq!(
            event.kind,
            EventKind::HintReply("Think in terms of 100.".to_string())
        );
        assert_eq!(
            runner.handle_event(event),
            Some(Notice::Hint("Think in terms of 100.".to_string()))
        );
        assert_eq!(runner.hints().transcript().len(), 2);
        assert_eq!(runner.hints().pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_hint_does_not_delay_expiry() {
        let api = Arc::new(FakeApi {
            chat_reply: Some("Eliminate two options first.".into()),
            chat_delay: Duration::from_secs(120),
            ..Default::default()
        });
        let mut runner = TestRunner::new(api, &Config::default());
        runner.start_test(topic_request(3, 1)).await.unwrap();
        let start = Instant::now();

        assert!(runner.ask_hint("stuck"));
        assert_eq!(start.elapsed(), Duration::ZERO);

        // 等待回复期间仍可作答
        runner.dispatch(Intent::Goto(2));
        runner.dispatch(Intent::SelectOption(1));
        assert_eq!(runner.session().unwrap().answers()[2], Some(1));

        let notice = loop {
            let event = runner.next_event().await.unwrap();
            if let Some(notice) = runner.handle_event(event) {
                break notice;
            }
        };
        assert_eq!(notice, Notice::Info("Time's up!".to_string()));
        assert_eq!(start.elapsed(), Duration::from_secs(61));
        assert_eq!(runner.review().unwrap().report().time_taken_label(), "01:01");
        assert!(runner.hint_requests.is_empty());

        // 请求已随交卷取消，不会再有回复
        sleep(Duration::from_secs(180)).await;
        assert!(runner.events_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_uses_time_of_expiry_not_of_handling() {
        let mut runner = running(2, 1).await;
        let start = Instant::now();

        let expired = loop {
            let event = runner.next_event().await.unwrap();
            if matches!(event.kind, EventKind::Expired(_)) {
                break event;
            }
            runner.handle_event(event);
        };
        // 事件晚一些才被处理
        sleep(Duration::from_secs(30)).await;
        runner.handle_event(expired);

        assert_eq!(start.elapsed(), Duration::from_secs(91));
        assert_eq!(runner.review().unwrap().report().time_taken_label(), "01:01");
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_auto_advance_is_dropped_while_paused() {
        let mut runner = running(3, 5).await;

        runner.dispatch(Intent::SelectOption(0));
        runner.dispatch(Intent::TogglePause);

        let event = runner.next_event().await.unwrap();
        assert_eq!(event.kind, EventKind::AutoAdvance(1));
        runner.handle_event(event);
        assert_eq!(runner.session().unwrap().current_index(), 0);

        // 恢复后不会补做之前的跳题
        runner.dispatch(Intent::TogglePause);
        let event = runner.next_event().await.unwrap();
        assert_eq!(event.kind, EventKind::Tick(299));
        runner.handle_event(event);
        assert_eq!(runner.session().unwrap().current_index(), 0);
        assert_eq!(runner.session().unwrap().answers()[0], Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_without_prompt_is_ignored() {
        let mut runner = running(3, 5).await;

        assert_eq!(runner.dispatch(Intent::ConfirmSubmit), None);
        assert!(runner.session().is_some());

        // 提示之后的其他操作会撤销待确认状态
        runner.dispatch(Intent::RequestSubmit);
        assert!(runner.confirm_pending());
        runner.dispatch(Intent::Next);
        assert!(!runner.confirm_pending());
        runner.dispatch(Intent::ConfirmSubmit);
        assert!(runner.session().is_some());

        runner.dispatch(Intent::RequestSubmit);
        runner.dispatch(Intent::CancelSubmit);
        runner.dispatch(Intent::ConfirmSubmit);
        assert!(runner.session().is_some());

        runner.dispatch(Intent::RequestSubmit);
        runner.dispatch(Intent::ConfirmSubmit);
        assert!(runner.review().is_some());
        assert!(!runner.confirm_pending());
    }
}
