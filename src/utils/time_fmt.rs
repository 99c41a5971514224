/// 格式化为 `MM:SS`
///
/// 不输出小时，超过 60 分钟时分钟数直接累加（如 `75:03`）
#[must_use]
pub fn format_mm_ss(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
