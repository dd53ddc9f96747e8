use anyhow::Context;
use clap::Args;
use serde_json::json;

use crate::auth::{generate_jwt, Claims, MAX_TOKEN_EXPIRY_HOURS};
use crate::cli::OutputFormat;
use crate::config;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "User id to embed (defaults to SINGLE_USER_ID)")]
    pub user_id: Option<i64>,

    #[arg(
        long,
        value_parser = clap::value_parser!(u64).range(1..=MAX_TOKEN_EXPIRY_HOURS),
        help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)"
    )]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let secret = config
        .security
        .jwt_secret
        .as_deref()
        .context("JWT_SECRET must be set to sign tokens")?;

    let user_id = args.user_id.unwrap_or(config.tenant.user_id);
    let hours = args.hours.unwrap_or(config.security.jwt_expiry_hours);
    if user_id != config.tenant.user_id {
        tracing::warn!("User {} is not the configured user {}; the API will answer 403", user_id, config.tenant.user_id);
    }

    let claims = Claims::new(user_id, hours)?;
    let expires_at = claims.exp;
    let token = generate_jwt(&claims, secret)?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "token": token, "user_id": user_id, "expires_at": expires_at })
        ),
        OutputFormat::Text => println!("{}", token),
    }

    Ok(())
}
