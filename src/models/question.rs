use serde::{Deserialize, Serialize};

/// 单道选择题
///
/// 由出题服务返回，接收后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    #[serde(rename = "correct_answer_index")]
    pub correct_option_index: usize,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub topic: String,
}

impl Question {
    /// 校验题目结构：至少两个选项，答案下标在范围内
    pub fn validate(&self) -> Result<(), String> {
        if self.options.len() < 2 {
            return Err(format!("选项数量不足: {}", self.options.len()));
        }
        if self.correct_option_index >= self.options.len() {
            return Err(format!(
                "答案下标 {} 超出范围 [0, {})",
                self.correct_option_index,
                self.options.len()
            ));
        }
        Ok(())
    }

    pub fn is_correct(&self, answer: Option<usize>) -> bool {
        answer == Some(self.correct_option_index)
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 截断题干以便显示（最多80个字符）
        let preview = crate::utils::logging::truncate_text(&self.text, 80);
        write!(f, "{} [{} 个选项]", preview, self.options.len())
    }
}
