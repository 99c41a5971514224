pub mod config_flow;
pub mod review;
pub mod session_state;

pub use config_flow::{ConfigOptions, ConfigurationFlow, Step, TopicArea, TopicPage};
pub use review::{OptionTag, ReviewNavigator, ReviewView};
pub use session_state::{AnswerOutcome, Phase, PaletteEntry, QuestionView, Session};
