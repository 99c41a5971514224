/// 出题服务 API 客户端
///
/// 封装三个 HTTP 接口，以及统一的非 2xx 响应处理
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{Catalog, Question, TestMode};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const STRUCTURE_ENDPOINT: &str = "/api/get-structure";
const GENERATE_ENDPOINT: &str = "/api/generate-test";
const CHAT_ENDPOINT: &str = "/api/chat-support";

/// 出题请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateTestBody {
    pub subject: String,
    pub unit: Option<String>,
    pub topic: Option<String>,
    pub num_questions: u32,
    pub test_type: TestMode,
}

/// 提示请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatSupportBody {
    pub user_query: String,
    pub question_text: String,
    pub topic: String,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    reply: String,
}

/// 出题服务能力
///
/// 编排层只依赖这个 trait，测试中用内存实现替换
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// `GET /api/get-structure`
    async fn get_structure(&self) -> Result<Catalog, ApiError>;

    /// `POST /api/generate-test`
    async fn generate_test(&self, body: &GenerateTestBody) -> Result<Vec<Question>, ApiError>;

    /// `POST /api/chat-support`，返回 `reply` 字段
    async fn chat_support(&self, body: &ChatSupportBody) -> Result<String, ApiError>;
}

/// 基于 reqwest 的实现
#[derive(Debug, Clone)]
pub struct QuizClient {
    http: Client,
    base_url: String,
}

impl QuizClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::api_request_failed("client", e))?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

#[async_trait]
impl QuizApi for QuizClient {
    async fn get_structure(&self) -> Result<Catalog, ApiError> {
        let response = self
            .http
            .get(self.url(STRUCTURE_ENDPOINT))
            .send()
            .await
            .map_err(|source| request_failed(STRUCTURE_ENDPOINT, source))?;
        handle_api_response(STRUCTURE_ENDPOINT, response).await
    }

    async fn generate_test(&self, body: &GenerateTestBody) -> Result<Vec<Question>, ApiError> {
        debug!("出题请求 Payload: {:?}", body);
        let response = self
            .http
            .post(self.url(GENERATE_ENDPOINT))
            .json(body)
            .send()
            .await
            .map_err(|source| request_failed(GENERATE_ENDPOINT, source))?;
        handle_api_response(GENERATE_ENDPOINT, response).await
    }

    async fn chat_support(&self, body: &ChatSupportBody) -> Result<String, ApiError> {
        let response = self
            .http
            .post(self.url(CHAT_ENDPOINT))
            .json(body)
            .send()
            .await
            .map_err(|source| request_failed(CHAT_ENDPOINT, source))?;
        let reply: ChatReply = handle_api_response(CHAT_ENDPOINT, response).await?;
        Ok(reply.reply)
    }
}

fn request_failed(endpoint: &str, source: reqwest::Error) -> ApiError {
    ApiError::RequestFailed {
        endpoint: endpoint.to_string(),
        source,
    }
}

/// 统一处理响应：2xx 解析 JSON，其余按内容类型提取错误消息
async fn handle_api_response<T: DeserializeOwned>(
    endpoint: &str,
    response: Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));

    let body = response
        .text()
        .await
        .map_err(|source| request_failed(endpoint, source))?;

    if !status.is_success() {
        debug!("API 返回错误 ({}): {} {}", endpoint, status, body);
        return Err(ApiError::BadResponse {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message: classify_error_body(is_json, &body),
        });
    }

    serde_json::from_str(&body).map_err(|e| ApiError::JsonParseFailed {
        endpoint: endpoint.to_string(),
        source: Box::new(e),
    })
}

/// 从错误响应体中提取消息
///
/// - JSON：优先取 `error` 字段，缺失或为假值时返回整个 JSON 文本
/// - 非 JSON：原样返回文本
pub fn classify_error_body(is_json: bool, body: &str) -> String {
    if !is_json {
        return body.to_string();
    }
    match serde_json::from_str::<Value>(body) {
        Ok(value) => match value.get("error") {
            Some(Value::String(msg)) if !msg.is_empty() => msg.clone(),
            Some(err) if is_truthy(err) => err.to_string(),
            _ => value.to_string(),
        },
        Err(_) => body.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
