use crate::error::{AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 出题服务地址
    pub api_base_url: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 每道题（或每个主题）预估的生成耗时（秒）
    pub estimated_seconds_per_item: u64,
    /// 主题列表每页数量
    pub topics_per_page: usize,
    /// 首次作答后自动跳题的延迟（毫秒）
    pub auto_advance_delay_ms: u64,
    /// 单主题生成时进度条刷新间隔（毫秒）
    pub topic_progress_tick_ms: u64,
    /// 模拟卷生成时进度条刷新间隔（毫秒）
    pub mock_progress_tick_ms: u64,
    /// 提示服务失败时的兜底回复
    pub chat_fallback_reply: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080".to_string(),
            request_timeout_secs: 300,
            estimated_seconds_per_item: 4,
            topics_per_page: 8,
            auto_advance_delay_ms: 300,
            topic_progress_tick_ms: 100,
            mock_progress_tick_ms: 200,
            chat_fallback_reply: "Error getting hint.".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 默认值 ← 配置文件（QUIZ_CONFIG，缺省为 quiz.toml）← 环境变量
    pub fn load() -> AppResult<Self> {
        let path = std::env::var("QUIZ_CONFIG").unwrap_or_else(|_| "quiz.toml".to_string());
        let base = if Path::new(&path).exists() {
            Self::from_toml_file(&path)?
        } else {
            Self::default()
        };
        base.with_env_overrides()
    }

    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取配置，缺失字段使用默认值
    pub fn from_toml_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            crate::AppError::Config(ConfigError::TomlParseFailed { source, .. }) => {
                ConfigError::TomlParseFailed {
                    path: path.to_string(),
                    source,
                }
                .into()
            }
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        Ok(toml::from_str(content)?)
    }

    fn with_env_overrides(self) -> AppResult<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// 依次覆盖各字段；变量已设置但无法解析时报错
    fn with_overrides<F>(self, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = self;
        let topics_per_page = parse_var(&lookup, "QUIZ_TOPICS_PER_PAGE", "usize")?
            .unwrap_or(default.topics_per_page);
        if topics_per_page == 0 {
            return Err(ConfigError::EnvVarParseFailed {
                var_name: "QUIZ_TOPICS_PER_PAGE".to_string(),
                value: "0".to_string(),
                expected_type: "正整数".to_string(),
            }
            .into());
        }

        Ok(Self {
            api_base_url: lookup("QUIZ_API_BASE_URL").unwrap_or(default.api_base_url),
            request_timeout_secs: parse_var(&lookup, "QUIZ_REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(default.request_timeout_secs),
            estimated_seconds_per_item: parse_var(&lookup, "QUIZ_SECONDS_PER_ITEM", "u64")?
                .unwrap_or(default.estimated_seconds_per_item),
            topics_per_page,
            auto_advance_delay_ms: parse_var(&lookup, "QUIZ_AUTO_ADVANCE_MS", "u64")?
                .unwrap_or(default.auto_advance_delay_ms),
            topic_progress_tick_ms: parse_var(&lookup, "QUIZ_TOPIC_PROGRESS_TICK_MS", "u64")?
                .unwrap_or(default.topic_progress_tick_ms),
            mock_progress_tick_ms: parse_var(&lookup, "QUIZ_MOCK_PROGRESS_TICK_MS", "u64")?
                .unwrap_or(default.mock_progress_tick_ms),
            chat_fallback_reply: lookup("QUIZ_CHAT_FALLBACK")
                .unwrap_or(default.chat_fallback_reply),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING", "bool")?
                .unwrap_or(default.verbose_logging),
        })
    }
}

/// 读取并解析一个变量；未设置返回 `None`
fn parse_var<F, T>(lookup: &F, var_name: &str, expected_type: &str) -> AppResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()),
        },
    }
}
