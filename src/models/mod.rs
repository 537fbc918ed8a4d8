pub mod exercise;
pub mod loaders;
pub mod page;
pub mod payload;
pub mod response;

pub use exercise::Exercise;
pub use loaders::load_page_data;
pub use page::PageData;
pub use payload::SubmissionPayload;
pub use response::{NextExercise, ServerOutcome, ServerResponse, TerminalOutcome, TerminalReason};
