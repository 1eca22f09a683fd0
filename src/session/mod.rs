//! Session state, the accumulating lead record, and the process-wide store.

pub mod model;
pub mod record;
pub mod store;

pub use model::{Session, SessionMode, Turn, TurnRole};
pub use record::{ExtractedFields, LeadRecord};
pub use store::{SessionHandle, SessionStore};
