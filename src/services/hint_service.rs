//! 提示服务 - 业务能力层
//!
//! 针对当前题目向出题服务请求一条不泄露答案的提示。
//! 任何失败都返回固定的兜底回复，不影响考试进行。

use crate::clients::{ChatSupportBody, QuizApi};
use crate::config::Config;
use crate::models::Question;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatSender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: ChatSender,
    pub text: String,
}

/// 提示服务，附带对话记录
pub struct HintService<A: QuizApi + ?Sized> {
    api: Arc<A>,
    fallback_reply: String,
    transcript: Vec<ChatMessage>,
    open: bool,
    pending: usize,
}

impl<A: QuizApi + ?Sized> HintService<A> {
    pub fn new(api: Arc<A>, config: &Config) -> Self {
        Self {
            api,
            fallback_reply: config.chat_fallback_reply.clone(),
            transcript: Vec::new(),
            open: false,
            pending: 0,
        }
    }

    /// 打开 / 关闭对话窗口
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn clear(&mut self) {
        self.transcript.clear();
        self.open = false;
        self.pending = 0;
    }

    /// 记录用户的提问并生成请求体；空白问题不发送，返回 `None`
    pub fn prepare(&mut self, query: &str, question: &Question) -> Option<ChatSupportBody> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        self.transcript.push(ChatMessage {
            sender: ChatSender::User,
            text: query.to_string(),
        });
        self.pending += 1;

        Some(ChatSupportBody {
            user_query: query.to_string(),
            question_text: question.text.clone(),
            topic: question.topic.clone(),
        })
    }

    /// 请求提示的 future，不借用服务本身，可以在后台任务中运行
    ///
    /// 失败时得到兜底回复
    pub fn fetch(&self, body: ChatSupportBody) -> impl Future<Output = String> + Send + 'static
    where
        A: 'static,
    {
        let api = self.api.clone();
        let fallback = self.fallback_reply.clone();
        async move {
            match api.chat_support(&body).await {
                Ok(reply) => {
                    debug!("提示返回 {} 字符", reply.len());
                    reply
                }
                Err(e) => {
                    warn!("⚠️ 获取提示失败: {}", e);
                    fallback
                }
            }
        }
    }

    /// 把回复追加到对话记录
    pub fn record_reply(&mut self, reply: &str) {
        self.pending = self.pending.saturating_sub(1);
        self.transcript.push(ChatMessage {
            sender: ChatSender::Assistant,
            text: reply.to_string(),
        });
    }

    /// 还在等待回复的提问数
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// 提问并等待回复
    pub async fn ask(&mut self, query: &str, question: &Question) -> Option<String>
    where
        A: 'static,
    {
        let body = self.prepare(query, question)?;
        let reply = self.fetch(body).await;
        self.record_reply(&reply);
        Some(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::generation_service::tests::{question, FakeApi};

    #[tokio::test]
    async fn test_reply_is_recorded() {
        let api = Arc::new(FakeApi {
            chat_reply: Some("Try working backwards from the options.".into()),
            ..Default::default()
        });
        let mut hints = HintService::new(api, &Config::default());

        let reply = hints.ask("  how?  ", &question("Ages", 0)).await;
        assert_eq!(reply.as_deref(), Some("Try working backwards from the options."));
        assert_eq!(hints.transcript().len(), 2);
        assert_eq!(hints.transcript()[0].text, "how?");
        assert_eq!(hints.transcript()[1].sender, ChatSender::Assistant);
    }

    #[tokio::test]
    async fn test_failure_uses_fallback_reply() {
        let mut hints = HintService::new(Arc::new(FakeApi::default()), &Config::default());
        let reply = hints.ask("hint please", &question("Ages", 1)).await;
        assert_eq!(reply.as_deref(), Some("Error getting hint."));
        assert_eq!(hints.pending(), 0);
    }

    #[tokio::test]
    async fn test_prepare_then_record_keeps_order() {
        let api = Arc::new(FakeApi {
            chat_reply: Some("Compare the ratios.".into()),
            ..Default::default()
        });
        let mut hints = HintService::new(api, &Config::default());

        let body = hints.prepare("stuck", &question("Ages", 2)).unwrap();
        assert_eq!(body.question_text, "Ages question 2");
        assert_eq!(body.topic, "Ages");
        assert_eq!(hints.pending(), 1);
        assert_eq!(hints.transcript().len(), 1);

        let reply = hints.fetch(body).await;
        hints.record_reply(&reply);
        assert_eq!(hints.pending(), 0);
        assert_eq!(hints.transcript()[1].text, "Compare the ratios.");
    }

    #[tokio::test]
    async fn test_blank_query_is_not_sent() {
        let mut hints = HintService::new(Arc::new(FakeApi::default()), &Config::default());
        assert_eq!(hints.ask("   ", &question("Ages", 1)).await, None);
        assert!(hints.transcript().is_empty());
        assert!(hints.toggle());
        assert!(!hints.toggle());
    }
}
