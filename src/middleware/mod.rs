pub mod auth;
pub mod response;

pub use auth::{authenticate, single_tenant_auth, AuthMethod, AuthSettings, AuthUser, SHARED_SECRET_HEADER};
pub use response::{ApiResponse, ApiResult};
