//! List filtering and ordering for backlogs, epics and PBIs.
//!
//! Everything here is a pure function of the rows it is given, so the same
//! code orders results on the server (`order=` query) and in the CLI views.

pub mod error;
pub mod filter;
pub mod filter_order;
pub mod filter_where;
pub mod types;

pub use error::FilterError;
pub use filter::Filter;
pub use filter_order::{BacklogField, EpicField, FilterOrder, PbiField};
pub use types::*;
