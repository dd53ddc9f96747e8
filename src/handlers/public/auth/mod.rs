mod token;

pub use token::{token_post, TokenRequest, TokenResponse};
