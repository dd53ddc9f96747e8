// handlers/public/mod.rs - endpoints reachable without credentials
pub mod auth;
mod root;

pub use root::{health, root};
