// handlers/mod.rs - HTTP handlers grouped by access level
//
// public/    - no authentication (login, registration)
// protected/ - require a valid JWT and an existing user; mounted under /api

pub mod protected;
pub mod public;
