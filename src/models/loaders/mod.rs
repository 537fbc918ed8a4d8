pub mod toml_loader;

pub use toml_loader::{load_page_data, parse_page_data};
