pub mod collection;
pub mod record;

pub use collection::get as epics_get;
pub use collection::post as epics_post;

pub use record::delete as epic_delete;
pub use record::get as epic_get;
pub use record::put as epic_put;
