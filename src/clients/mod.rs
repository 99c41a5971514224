pub mod quiz_client;

pub use quiz_client::{ChatSupportBody, GenerateTestBody, QuizApi, QuizClient};
