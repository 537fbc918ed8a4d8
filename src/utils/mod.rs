pub mod logging;

pub use logging::{format_seconds, truncate_text};
