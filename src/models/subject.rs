use phf::phf_map;

/// 提供整科模拟卷的科目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MockSubject {
    /// 数量关系
    Quant,
    /// 逻辑推理
    Reasoning,
    /// 英语
    English,
}

/// 别名 → 科目（命令行快捷输入）
static ALIASES: phf::Map<&'static str, MockSubject> = phf_map! {
    "quant" => MockSubject::Quant,
    "quantitative" => MockSubject::Quant,
    "quantitative aptitude" => MockSubject::Quant,
    "reasoning" => MockSubject::Reasoning,
    "reasoning ability" => MockSubject::Reasoning,
    "english" => MockSubject::English,
    "english language" => MockSubject::English,
};

impl MockSubject {
    pub const ALL: [MockSubject; 3] = [
        MockSubject::Quant,
        MockSubject::Reasoning,
        MockSubject::English,
    ];

    /// 获取目录中的标准名称
    pub fn name(self) -> &'static str {
        match self {
            MockSubject::Quant => "Quantitative Aptitude",
            MockSubject::Reasoning => "Reasoning Ability",
            MockSubject::English => "English Language",
        }
    }

    /// 解析科目（忽略大小写与首尾空白）
    pub fn find(s: &str) -> Option<Self> {
        ALIASES.get(s.trim().to_lowercase().as_str()).copied()
    }
}

impl std::fmt::Display for MockSubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
