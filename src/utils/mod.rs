pub mod logging;
pub mod time_fmt;

pub use time_fmt::format_mm_ss;
