//! CLI command implementations.

pub mod search;
pub mod upload;

pub use search::SearchCommand;
pub use upload::UploadCommand;
