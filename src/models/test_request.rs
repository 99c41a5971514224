use serde::{Deserialize, Serialize};

/// 考试模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestMode {
    /// 单主题练习
    TopicWise,
    /// 整科模拟卷
    Mock,
}

impl TestMode {
    /// 出题接口中的 `test_type` 取值
    pub fn as_str(self) -> &'static str {
        match self {
            TestMode::TopicWise => "topic-wise",
            TestMode::Mock => "mock",
        }
    }
}

impl std::fmt::Display for TestMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 一次考试的配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRequest {
    pub mode: TestMode,
    pub subject: String,
    pub unit: Option<String>,
    pub topic: Option<String>,
    pub num_questions: u32,
    pub duration_minutes: u32,
}

impl TestRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.num_questions == 0 {
            return Err("题目数量必须为正数".to_string());
        }
        if self.duration_minutes == 0 {
            return Err("考试时长必须为正数".to_string());
        }
        if self.subject.trim().is_empty() {
            return Err("未选择科目".to_string());
        }
        if self.mode == TestMode::TopicWise && self.topic.is_none() {
            return Err("单主题练习必须选择主题".to_string());
        }
        Ok(())
    }

    pub fn duration_secs(&self) -> u64 {
        u64::from(self.duration_minutes) * 60
    }
}
