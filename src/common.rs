pub mod error;
pub mod json;
pub mod log;
pub mod text;
