pub mod backlog;
pub mod epic;
pub mod pbi;
pub mod user;

pub use backlog::{Backlog, BacklogDraft, BacklogForm};
pub use epic::{Epic, EpicDraft, EpicForm, EpicWithBacklog};
pub use pbi::{Pbi, PbiDraft, PbiForm, PbiWithDetails, Priority};
pub use user::{DashboardStats, User};
