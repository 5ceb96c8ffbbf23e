pub mod dto;
pub mod services;

pub use dto::HistoryEntry;
pub use services::{relative_age, HistoryService};
