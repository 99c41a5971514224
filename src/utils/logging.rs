/// 日志工具模块
///
/// 提供日志初始化以及格式化输出的辅助函数
use crate::config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 优先读取 `RUST_LOG`，否则根据 `verbose_logging` 选择 debug / info
pub fn init(config: &Config) {
    let fallback = if config.verbose_logging { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 出题服务: {}", config.api_base_url);
    info!("{}", "=".repeat(60));
}

/// 记录生成开始
pub fn log_generation_start(caption: &str, estimated_secs: u64) {
    info!("\n{}", "─".repeat(60));
    info!("📦 {}", caption);
    info!("⏱️ 预计耗时: {} 秒", estimated_secs);
}

/// 记录生成完成
pub fn log_generation_complete(received: usize, requested: usize, skipped_topics: usize) {
    info!(
        "✓ 生成完成: 收到 {}/{} 道题目, 跳过主题 {} 个",
        received, requested, skipped_topics
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终成绩
pub fn print_final_stats(score: usize, total: usize, percentage: &str, time_taken: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 考试完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 得分: {}/{}", score, total);
    info!("📈 正确率: {}%", percentage);
    info!("⏱️ 用时: {}", time_taken);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
