// handlers/protected/mod.rs - Handlers behind the session guard
//
// Every handler here runs after jwt_auth_middleware and
// validate_user_middleware, so a ValidatedUser extension is always present.
// Route prefix: /api

pub mod auth;
pub mod backlogs;
pub mod dashboard;
pub mod epics;
pub mod pbis;
pub mod utils;
