pub mod claims;
pub mod dto;
pub mod services;
pub mod session;

pub use dto::{Session, SessionEvent};
pub use session::SessionStore;
