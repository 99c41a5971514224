//! 终端前端 - 编排层
//!
//! 逐行读取命令，翻译成运行器的操作，并打印当前界面。
//! 标准输入与后台事件在同一个循环里用 `tokio::select!` 交替处理。

use crate::clients::QuizClient;
use crate::config::Config;
use crate::infrastructure::LoadingStatus;
use crate::models::MockSubject;
use crate::orchestrator::test_runner::{Intent, Notice, Screen, TestRunner};
use crate::utils::logging::log_startup;
use crate::workflow::{OptionTag, Step, TopicArea};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// 命令所处的上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandContext {
    Configuring,
    InProgress,
    Finished,
}

/// 解析后的一行命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    TopicWise,
    Mock(MockSubject),
    /// 科目名或从 1 开始的序号
    Subject(String),
    /// 当前页中从 1 开始的主题序号
    PickTopic(usize),
    NextPage,
    PrevPage,
    Back,
    Start {
        questions: Option<u32>,
        minutes: Option<u32>,
    },
    Intent(Intent),
    Hint(String),
    ToggleChat,
    Show,
    Help,
    Quit,
    Unknown(String),
}

/// 解析一行输入
pub fn parse_command(context: CommandContext, line: &str) -> Command {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    let head = head.to_lowercase();

    match head.as_str() {
        "" | "show" => return Command::Show,
        "help" | "?" => return Command::Help,
        "quit" | "exit" => return Command::Quit,
        "restart" => return Command::Intent(Intent::Restart),
        _ => {}
    }

    let unknown = || Command::Unknown(line.to_string());
    match context {
        CommandContext::Configuring => match head.as_str() {
            "topic" => Command::TopicWise,
            "mock" => MockSubject::find(rest).map_or_else(unknown, Command::Mock),
            "subject" if !rest.is_empty() => Command::Subject(rest.to_string()),
            "n" | "next" => Command::NextPage,
            "p" | "prev" => Command::PrevPage,
            "b" | "back" => Command::Back,
            "start" => {
                let mut numbers = rest.split_whitespace().map(str::parse::<u32>);
                match (numbers.next().transpose(), numbers.next().transpose()) {
                    (Ok(questions), Ok(minutes)) => Command::Start { questions, minutes },
                    _ => unknown(),
                }
            }
            _ => match head.parse::<usize>() {
                Ok(n) if n > 0 && rest.is_empty() => Command::PickTopic(n),
                _ => unknown(),
            },
        },
        CommandContext::InProgress => match head.as_str() {
            "n" | "next" => Command::Intent(Intent::Next),
            "p" | "prev" => Command::Intent(Intent::Prev),
            "g" | "goto" => match rest.parse::<usize>() {
                Ok(n) if n > 0 => Command::Intent(Intent::Goto(n - 1)),
                _ => unknown(),
            },
            "pause" | "resume" => Command::Intent(Intent::TogglePause),
            "submit" => Command::Intent(Intent::RequestSubmit),
            "y" | "yes" => Command::Intent(Intent::ConfirmSubmit),
            "no" => Command::Intent(Intent::CancelSubmit),
            "hint" => Command::Hint(rest.to_string()),
            "chat" => Command::ToggleChat,
            option if option.len() == 1 && option.as_bytes()[0].is_ascii_lowercase() => {
                Command::Intent(Intent::SelectOption(usize::from(option.as_bytes()[0] - b'a')))
            }
            _ => match head.parse::<usize>() {
                Ok(n) if n > 0 && rest.is_empty() => Command::Intent(Intent::Goto(n - 1)),
                _ => unknown(),
            },
        },
        CommandContext::Finished => match head.as_str() {
            "n" | "next" => Command::Intent(Intent::ReviewNext),
            "p" | "prev" => Command::Intent(Intent::ReviewPrev),
            _ => unknown(),
        },
    }
}

/// 应用主结构
pub struct App {
    runner: TestRunner<QuizClient>,
}

impl App {
    /// 初始化应用：创建客户端并加载科目目录
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let client = QuizClient::new(&config).context("创建出题服务客户端失败")?;
        let mut runner = TestRunner::new(Arc::new(client), &config);

        info!("\n📁 正在加载科目目录...");
        if !runner.load_catalog().await {
            warn!("⚠️ 目录不可用，暂时无法开始考试");
        }

        Ok(Self { runner })
    }

    /// 运行应用主循环，直到输入 quit 或标准输入关闭
    pub async fn run(mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        self.print_screen();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("读取标准输入失败")? else {
                        break;
                    };
                    if !self.handle_line(&line).await {
                        break;
                    }
                }
                Some(event) = self.runner.next_event() => {
                    if let Some(notice) = self.runner.handle_event(event) {
                        print_notice(&notice);
                        if !matches!(notice, Notice::Hint(_)) {
                            self.print_screen();
                        }
                    }
                }
            }
        }

        info!("👋 程序结束");
        Ok(())
    }

    fn context(&self) -> CommandContext {
        match self.runner.render() {
            Screen::Configuring { .. } => CommandContext::Configuring,
            Screen::InProgress { .. } => CommandContext::InProgress,
            Screen::Finished { .. } => CommandContext::Finished,
        }
    }

    /// 处理一行命令；返回 `false` 表示退出
    async fn handle_line(&mut self, line: &str) -> bool {
        let command = parse_command(self.context(), line);
        let mut notice = None;

        match command {
            Command::Quit => return false,
            Command::Help => {
                print_help(self.context());
                return true;
            }
            Command::Show => {}
            Command::Unknown(text) => {
                println!("Unknown command: {} (type 'help')", text);
                return true;
            }
            Command::TopicWise => {
                notice = alert_on_err(self.runner.flow_mut().choose_topic_wise())
            }
            Command::Mock(subject) => {
                notice = alert_on_err(self.runner.flow_mut().choose_mock(subject))
            }
            Command::Subject(name) => {
                let name = self.resolve_subject(&name);
                notice = alert_on_err(self.runner.flow_mut().choose_subject(&name));
            }
            Command::PickTopic(n) => {
                let topic = self
                    .runner
                    .flow()
                    .topic_page()
                    .and_then(|page| page.topics.get(n - 1).cloned());
                notice = match topic {
                    Some(topic) => alert_on_err(self.runner.flow_mut().choose_topic(&topic)),
                    None => Some(Notice::Alert(format!("No topic #{} on this page.", n))),
                };
            }
            Command::NextPage => {
                self.runner.flow_mut().next_topic_page();
            }
            Command::PrevPage => {
                self.runner.flow_mut().prev_topic_page();
            }
            Command::Back => self.runner.flow_mut().back(),
            Command::Start { questions, minutes } => notice = self.start(questions, minutes).await,
            Command::Hint(query) => {
                if self.runner.ask_hint(&query) {
                    println!("💬 ...");
                }
                return true;
            }
            Command::ToggleChat => {
                let open = self.runner.hints_mut().toggle();
                if open {
                    for message in self.runner.hints().transcript() {
                        println!("  {:?}: {}", message.sender, message.text);
                    }
                }
                return true;
            }
            Command::Intent(Intent::ConfirmSubmit) if !self.runner.confirm_pending() => {
                println!("Type 'submit' first.");
                return true;
            }
            Command::Intent(intent) => notice = self.runner.dispatch(intent),
        }

        if let Some(notice) = &notice {
            print_notice(notice);
        }
        if !matches!(notice, Some(Notice::Confirm(_))) {
            self.print_screen();
        }
        true
    }

    /// 序号转换为目录中的科目名
    fn resolve_subject(&self, input: &str) -> String {
        let catalog = self.runner.flow().catalog();
        match (input.parse::<usize>(), catalog) {
            (Ok(n), Some(catalog)) if n > 0 => catalog
                .subject_names()
                .nth(n - 1)
                .map(str::to_string)
                .unwrap_or_else(|| input.to_string()),
            _ => input.to_string(),
        }
    }

    async fn start(&mut self, questions: Option<u32>, minutes: Option<u32>) -> Option<Notice> {
        let options = match self.runner.flow().config_options() {
            Ok(options) => options,
            Err(e) => return Some(Notice::Alert(e.user_message())),
        };
        let questions = questions.unwrap_or(options.default_questions);
        let minutes = minutes.unwrap_or(options.default_minutes);

        let mut loading = self.runner.subscribe_loading();
        let start = self.runner.start_configured(questions, minutes);
        tokio::pin!(start);

        let mut last_label = String::new();
        let result = loop {
            tokio::select! {
                result = &mut start => break result,
                Ok(()) = loading.changed() => {
                    let status = loading.borrow_and_update().clone();
                    let label = status.countdown.to_string();
                    if label != last_label {
                        print_loading(&status);
                        last_label = label;
                    }
                }
            }
        };

        result.err().map(|e| Notice::Alert(e.user_message()))
    }

    fn print_screen(&self) {
        match self.runner.render() {
            Screen::Configuring {
                step,
                catalog_message,
            } => self.print_configuring(step, catalog_message.as_deref()),
            Screen::InProgress {
                title,
                question,
                palette,
                timer_label,
                paused,
            } => {
                println!("\n{}", "=".repeat(60));
                println!(
                    "{} | ⏱️ {}{}",
                    title,
                    timer_label,
                    if paused { " | PAUSED" } else { "" }
                );
                let strip: Vec<String> = palette
                    .iter()
                    .map(|p| {
                        let mark = if p.answered { "●" } else { "○" };
                        if p.current {
                            format!("[{}{}]", mark, p.index + 1)
                        } else {
                            format!("{}{}", mark, p.index + 1)
                        }
                    })
                    .collect();
                println!("{}", strip.join(" "));
                println!("{}", "─".repeat(60));
                println!("{}", question.header);
                println!("{}", question.text);
                for option in &question.options {
                    let marker = if option.selected { ">" } else { " " };
                    println!("{} {}) {}", marker, option_letter(option.index), option.text);
                }
            }
            Screen::Finished { summary, review } => {
                println!("\n{}", "=".repeat(60));
                for line in summary {
                    println!("{}", line);
                }
                println!("{}", "─".repeat(60));
                println!("{}", review.header);
                println!("{}", review.text);
                for (index, option) in review.options.iter().enumerate() {
                    let tag = match option.tag {
                        OptionTag::Correct => "✓",
                        OptionTag::Incorrect => "✗",
                        OptionTag::Neutral => " ",
                    };
                    println!("{} {}) {}", tag, option_letter(index), option.text);
                }
                if !review.explanation.is_empty() {
                    println!("Explanation: {}", review.explanation);
                }
            }
        }
    }

    fn print_configuring(&self, step: Step, catalog_message: Option<&str>) {
        let flow = self.runner.flow();
        println!("\n{}", "=".repeat(60));
        match step {
            Step::ModeSelection => {
                println!("Step 1: Choose a Test Mode");
                println!("  topic                 Topic-wise practice");
                for subject in MockSubject::ALL {
                    println!("  mock {:<16} {} Mock", subject_alias(subject), subject.name());
                }
                if let Some(message) = catalog_message {
                    println!("{}", message);
                }
            }
            Step::Subject => {
                println!("Choose a Subject");
                if let Some(catalog) = flow.catalog() {
                    for (i, name) in catalog.subject_names().enumerate() {
                        println!("  subject {}  {}", i + 1, name);
                    }
                }
            }
            Step::Topic => match flow.topic_area() {
                Some(TopicArea::Page(page)) => {
                    println!("{}", page.header);
                    for (i, label) in page.labels().iter().enumerate() {
                        println!("  {}  {}", i + 1, label);
                    }
                    let mut controls = Vec::new();
                    if page.has_prev {
                        controls.push("prev = Previous");
                    }
                    if page.has_next {
                        controls.push("next = Next");
                    }
                    if !controls.is_empty() {
                        println!("  {}", controls.join(" | "));
                    }
                }
                Some(TopicArea::Message(message)) => println!("{}", message),
                None => {}
            },
            Step::Config => {
                if let Ok(options) = flow.config_options() {
                    println!("{}", options.title);
                    println!(
                        "  questions: {:?} (default {})",
                        options.question_choices, options.default_questions
                    );
                    println!(
                        "  minutes:   {:?} (default {})",
                        options.minute_choices, options.default_minutes
                    );
                    println!("  start [questions] [minutes]");
                }
            }
        }
    }
}

fn alert_on_err(result: crate::error::AppResult<()>) -> Option<Notice> {
    result.err().map(|e| Notice::Alert(e.user_message()))
}

fn option_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'a'.checked_add(i))
        .map_or('?', char::from)
}

fn subject_alias(subject: MockSubject) -> &'static str {
    match subject {
        MockSubject::Quant => "quant",
        MockSubject::Reasoning => "reasoning",
        MockSubject::English => "english",
    }
}

fn print_notice(notice: &Notice) {
    match notice {
        Notice::Alert(message) => println!("❌ {}", message),
        Notice::Confirm(message) => println!("❓ {} (yes / no)", message),
        Notice::Info(message) => println!("ℹ️ {}", message),
        Notice::Hint(reply) => println!("💬 {}", reply),
    }
}

fn print_loading(status: &LoadingStatus) {
    let filled = (status.progress / 5.0) as usize;
    println!(
        "{} [{:<20}] {:>3.0}% {}",
        status.caption,
        "#".repeat(filled.min(20)),
        status.progress,
        status.countdown
    );
}

fn print_help(context: CommandContext) {
    match context {
        CommandContext::Configuring => {
            println!("topic | mock <quant|reasoning|english> | subject <n|name> | <n>");
            println!("next | prev | back | start [q] [m]");
        }
        CommandContext::InProgress => {
            println!("a-d = answer | next | prev | goto <n> | pause | submit | hint <text> | chat");
        }
        CommandContext::Finished => println!("next | prev | restart"),
    }
    println!("show | restart | quit");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuring_commands() {
        use CommandContext::Configuring;
        assert_eq!(parse_command(Configuring, "topic"), Command::TopicWise);
        assert_eq!(
            parse_command(Configuring, "mock Reasoning Ability"),
            Command::Mock(MockSubject::Reasoning)
        );
        assert!(matches!(
            parse_command(Configuring, "mock history"),
            Command::Unknown(_)
        ));
        assert_eq!(parse_command(Configuring, "3"), Command::PickTopic(3));
        assert_eq!(
            parse_command(Configuring, "start 15 10"),
            Command::Start {
                questions: Some(15),
                minutes: Some(10)
            }
        );
        assert_eq!(
            parse_command(Configuring, "start"),
            Command::Start {
                questions: None,
                minutes: None
            }
        );
        assert!(matches!(
            parse_command(Configuring, "start ten"),
            Command::Unknown(_)
        ));
    }

    #[test]
    fn test_in_progress_commands() {
        use CommandContext::InProgress;
        assert_eq!(
            parse_command(InProgress, "b"),
            Command::Intent(Intent::SelectOption(1))
        );
        assert_eq!(parse_command(InProgress, "goto 4"), Command::Intent(Intent::Goto(3)));
        assert_eq!(parse_command(InProgress, "2"), Command::Intent(Intent::Goto(1)));
        assert_eq!(parse_command(InProgress, "n"), Command::Intent(Intent::Next));
        assert_eq!(
            parse_command(InProgress, "hint what is a ratio"),
            Command::Hint("what is a ratio".to_string())
        );
        assert_eq!(parse_command(InProgress, "0"), Command::Unknown("0".to_string()));
        assert_eq!(
            parse_command(InProgress, "yes"),
            Command::Intent(Intent::ConfirmSubmit)
        );
        assert_eq!(
            parse_command(InProgress, "no"),
            Command::Intent(Intent::CancelSubmit)
        );
    }

    #[test]
    fn test_context_changes_meaning_of_next() {
        assert_eq!(
            parse_command(CommandContext::Configuring, "next"),
            Command::NextPage
        );
        assert_eq!(
            parse_command(CommandContext::Finished, "next"),
            Command::Intent(Intent::ReviewNext)
        );
        assert_eq!(parse_command(CommandContext::Finished, "  "), Command::Show);
        assert_eq!(parse_command(CommandContext::Finished, "QUIT"), Command::Quit);
    }

    #[test]
    fn test_option_letter() {
        assert_eq!(option_letter(0), 'a');
        assert_eq!(option_letter(3), 'd');
    }
}
