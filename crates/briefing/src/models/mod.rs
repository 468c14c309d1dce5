//! Domain models for the briefing flow

mod email;
mod identity;
mod summary;

pub use email::EmailRecord;
pub use identity::Identity;
pub use summary::SummaryResult;
