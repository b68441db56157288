pub mod collection;
pub mod record;

pub use collection::get as pbis_get;
pub use collection::post as pbis_post;

pub use record::delete as pbi_delete;
pub use record::get as pbi_get;
pub use record::put as pbi_put;
