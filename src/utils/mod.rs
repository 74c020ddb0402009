// utils/mod.rs
// Shared helpers

mod retry;

pub use retry::{get_with_retry, is_retriable};
