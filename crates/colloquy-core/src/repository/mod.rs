//! Store traits for conversation persistence.
//!
//! Two collections back every conversation: sessions (one record per
//! conversation) and turns (one record per answered question). Both are
//! created lazily through `ensure_schema` before the first write.

pub mod session;
pub mod turn;
