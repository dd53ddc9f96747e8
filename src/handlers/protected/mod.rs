// handlers/protected/mod.rs - handlers behind the single-tenant gate
//
// Every handler here can rely on an `AuthUser` extension carrying the
// resolved user id; the principal row is guaranteed to exist.
pub mod auth;
pub mod holdings;
pub mod portfolio;
