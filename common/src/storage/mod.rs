pub mod cache;
pub mod types;
