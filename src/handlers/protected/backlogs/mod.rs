pub mod collection;
pub mod record;

// Re-export handler functions for use in routing
pub use collection::get as backlogs_get;
pub use collection::post as backlogs_post;

pub use record::delete as backlog_delete;
pub use record::get as backlog_get;
pub use record::put as backlog_put;
