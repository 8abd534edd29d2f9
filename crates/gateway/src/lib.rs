#![forbid(unsafe_code)]

pub mod error;
pub mod persistence;
pub mod question_source;

pub use error::GatewayError;
pub use persistence::{AttemptContext, PersistenceGateway, RecordingGateway};
pub use question_source::{InMemoryQuestionSource, QuestionSource};
