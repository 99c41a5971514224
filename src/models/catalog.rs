//! 科目目录：科目 → 单元 → 主题
//!
//! 服务端返回 JSON 对象，键的顺序即展示顺序（"第一个单元"依赖该顺序），
//! 因此这里按文档顺序逐项读取，而不是落到无序的 HashMap 里。

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::marker::PhantomData;

/// 整个目录
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub subjects: Vec<SubjectEntry>,
}

/// 单个科目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectEntry {
    pub name: String,
    pub units: Vec<UnitEntry>,
}

/// 单个单元及其主题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitEntry {
    pub name: String,
    pub topics: Vec<String>,
}

impl Catalog {
    pub fn subject(&self, name: &str) -> Option<&SubjectEntry> {
        self.subjects.iter().find(|s| s.name == name)
    }

    /// 科目的第一个单元
    pub fn first_unit(&self, subject: &str) -> Option<&UnitEntry> {
        self.subject(subject).and_then(|s| s.units.first())
    }

    pub fn unit(&self, subject: &str, unit: &str) -> Option<&UnitEntry> {
        self.subject(subject)
            .and_then(|s| s.units.iter().find(|u| u.name == unit))
    }

    pub fn subject_names(&self) -> impl Iterator<Item = &str> {
        self.subjects.iter().map(|s| s.name.as_str())
    }
}

/// 主题名中的下划线显示为空格
pub fn display_name(raw: &str) -> String {
    raw.replace('_', " ")
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let subjects = deserializer.deserialize_map(OrderedMapVisitor::<OrderedUnits>::new())?;
        Ok(Catalog {
            subjects: subjects
                .into_iter()
                .map(|(name, units)| SubjectEntry {
                    name,
                    units: units
                        .0
                        .into_iter()
                        .map(|(name, topics)| UnitEntry { name, topics })
                        .collect(),
                })
                .collect(),
        })
    }
}

struct OrderedUnits(Vec<(String, Vec<String>)>);

impl<'de> Deserialize<'de> for OrderedUnits {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer
            .deserialize_map(OrderedMapVisitor::<Vec<String>>::new())
            .map(OrderedUnits)
    }
}

/// 按文档顺序收集 JSON 对象的键值对
struct OrderedMapVisitor<V> {
    marker: PhantomData<V>,
}

impl<V> OrderedMapVisitor<V> {
    fn new() -> Self {
        Self {
            marker: PhantomData,
        }
    }
}

impl<'de, V> Visitor<'de> for OrderedMapVisitor<V>
where
    V: Deserialize<'de>,
{
    type Value = Vec<(String, V)>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON object")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            entries.push((key, value));
        }
        Ok(entries)
    }
}
