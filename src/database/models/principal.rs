use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::FromRow;
use uuid::Uuid;

use crate::config::TenantConfig;

/// The single account every admitted request resolves to
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Principal {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub auth_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Column values used when the principal row has to be created
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub email: String,
    pub name: String,
    pub auth_hash: String,
}

impl NewPrincipal {
    pub fn for_tenant(tenant: &TenantConfig) -> Self {
        Self {
            email: tenant.email_for(tenant.user_id),
            name: tenant.default_name.clone(),
            auth_hash: unusable_auth_hash(),
        }
    }

    pub fn into_principal(self, id: i64) -> Principal {
        Principal {
            id,
            email: self.email,
            name: self.name,
            auth_hash: self.auth_hash,
            created_at: Utc::now(),
        }
    }
}

// Nobody logs in with a password here; the column only has to be non-null.
fn unusable_auth_hash() -> String {
    let digest = Sha256::digest(Uuid::new_v4().as_bytes());
    format!("{:x}", digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_tenant_config() {
        let tenant = TenantConfig {
            user_id: 42,
            default_email: "family+{id}@example.com".to_string(),
            default_name: "Family".to_string(),
        };
        let new = NewPrincipal::for_tenant(&tenant);
        assert_eq!(new.email, "family+42@example.com");
        assert_eq!(new.name, "Family");
        assert_eq!(new.auth_hash.len(), 64);
        assert!(new.auth_hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn auth_hash_is_not_serialized() {
        let principal = NewPrincipal::for_tenant(&TenantConfig::default()).into_principal(1);
        let value = serde_json::to_value(&principal).unwrap();
        assert!(value.get("auth_hash").is_none());
        assert_eq!(value["id"], 1);
    }
}
