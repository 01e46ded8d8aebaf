//! Identity for admission decisions and session bookkeeping.

pub mod models;
pub mod session;

pub use models::{User, UserRole};
pub use session::{Session, SessionManager};
