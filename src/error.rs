use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 题目生成错误
    #[error("生成错误: {0}")]
    Generation(#[from] GenerationError),
    /// 会话状态错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 配置流程错误
    #[error("流程错误: {0}")]
    Flow(#[from] FlowError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// API 调用错误
///
/// `BadResponse` 的 Display 只输出服务端给出的消息本身，
/// 这样用户看到的提示与服务端返回的内容一致。
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// API 返回非 2xx 响应
    #[error("{message}")]
    BadResponse {
        endpoint: String,
        status: u16,
        message: String,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 题目生成错误
#[derive(Debug, Error)]
pub enum GenerationError {
    /// 请求参数不合法
    #[error("请求参数不合法: {reason}")]
    InvalidRequest { reason: String },
    /// 目录中不存在该科目
    #[error("目录中没有科目: {subject}")]
    UnknownSubject { subject: String },
    /// 科目下没有任何主题
    #[error("科目 {subject} 下没有可用的主题")]
    NoTopics { subject: String },
    /// 模拟卷组装完成但没有任何题目
    #[error("模拟卷 {subject} 没有生成任何题目")]
    EmptyMock { subject: String },
    /// 单主题请求失败（整个流程中止）
    #[error("{0}")]
    TopicRequestFailed(#[source] ApiError),
}

/// 会话状态错误
#[derive(Debug, Error)]
pub enum SessionError {
    /// 题目列表为空
    #[error("题目列表为空，无法开始考试")]
    NoQuestions,
    /// 考试尚未提交
    #[error("考试尚未提交")]
    NotSubmitted,
    /// 当前没有进行中的考试
    #[error("当前没有进行中的考试")]
    NotRunning,
}

/// 配置流程错误
#[derive(Debug, Error)]
pub enum FlowError {
    /// 目录未加载
    #[error("{0}")]
    CatalogUnavailable(String),
    /// 当前步骤不允许该操作
    #[error("当前步骤 {step} 不允许该操作")]
    WrongStep { step: String },
    /// 尚未选择模式
    #[error("尚未选择考试模式")]
    ModeNotSelected,
    /// 主题不存在
    #[error("主题不存在: {topic}")]
    UnknownTopic { topic: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            endpoint: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: err,
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Config(ConfigError::FileReadFailed {
            path: String::new(),
            source: err,
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建非法请求错误
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        AppError::Generation(GenerationError::InvalidRequest {
            reason: reason.into(),
        })
    }

    /// 面向用户的提示消息
    ///
    /// 服务端返回的错误原样展示，其余错误使用完整描述
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api(e) | AppError::Generation(GenerationError::TopicRequestFailed(e)) => {
                e.to_string()
            }
            AppError::Flow(FlowError::CatalogUnavailable(msg)) => msg.clone(),
            other => other.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
