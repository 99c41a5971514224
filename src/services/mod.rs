pub mod generation_service;
pub mod hint_service;
pub mod scoring_service;

pub use generation_service::{GenerationOutcome, GenerationService};
pub use hint_service::{ChatMessage, ChatSender, HintService};
pub use scoring_service::{grade, ScoreReport};
