use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingKind {
    Stock,
    Bond,
    PrivateEquity,
    Cash,
    Liability,
}

impl HoldingKind {
    pub const ALL: [HoldingKind; 5] = [
        HoldingKind::Stock,
        HoldingKind::Bond,
        HoldingKind::PrivateEquity,
        HoldingKind::Cash,
        HoldingKind::Liability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HoldingKind::Stock => "stock",
            HoldingKind::Bond => "bond",
            HoldingKind::PrivateEquity => "private_equity",
            HoldingKind::Cash => "cash",
            HoldingKind::Liability => "liability",
        }
    }

    pub fn is_liability(&self) -> bool {
        matches!(self, HoldingKind::Liability)
    }
}

impl fmt::Display for HoldingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HoldingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HoldingKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown holding kind '{}'", s))
    }
}

/// One position in the portfolio. Liabilities carry positive values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub id: Uuid,
    pub user_id: i64,
    pub kind: HoldingKind,
    pub name: String,
    pub symbol: Option<String>,
    pub quantity: Decimal,
    pub unit_value: Decimal,
    pub currency: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Holding {
    pub fn market_value(&self) -> Decimal {
        self.quantity * self.unit_value
    }

    /// Build a fresh holding from validated input
    pub fn from_draft(user_id: i64, draft: &HoldingDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind: draft.kind,
            name: draft.name.clone(),
            symbol: draft.symbol.clone(),
            quantity: draft.quantity,
            unit_value: draft.unit_value,
            currency: draft.currency.clone(),
            notes: draft.notes.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, draft: &HoldingDraft) {
        self.kind = draft.kind;
        self.name = draft.name.clone();
        self.symbol = draft.symbol.clone();
        self.quantity = draft.quantity;
        self.unit_value = draft.unit_value;
        self.currency = draft.currency.clone();
        self.notes = draft.notes.clone();
        self.updated_at = Utc::now();
    }
}

/// Raw `holdings` row; `kind` is stored as TEXT
#[derive(Debug, FromRow)]
pub struct HoldingRow {
    pub id: Uuid,
    pub user_id: i64,
    pub kind: String,
    pub name: String,
    pub symbol: Option<String>,
    pub quantity: Decimal,
    pub unit_value: Decimal,
    pub currency: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<HoldingRow> for Holding {
    type Error = String;

    fn try_from(row: HoldingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            kind: row.kind.parse()?,
            name: row.name,
            symbol: row.symbol,
            quantity: row.quantity,
            unit_value: row.unit_value,
            currency: row.currency,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Request body for creating or replacing a holding
#[derive(Debug, Clone, Deserialize)]
pub struct HoldingInput {
    pub kind: HoldingKind,
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
    pub quantity: Decimal,
    pub unit_value: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Validated, normalized holding fields
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingDraft {
    pub kind: HoldingKind,
    pub name: String,
    pub symbol: Option<String>,
    pub quantity: Decimal,
    pub unit_value: Decimal,
    pub currency: String,
    pub notes: Option<String>,
}

impl HoldingInput {
    /// Validate and normalize. Errors are keyed by field name.
    pub fn validate(self) -> Result<HoldingDraft, HashMap<String, String>> {
        let mut errors = HashMap::new();

        let name = self.name.trim().to_string();
        if name.is_empty() {
            errors.insert("name".to_string(), "must not be empty".to_string());
        }
        if self.quantity < Decimal::ZERO {
            errors.insert("quantity".to_string(), "must not be negative".to_string());
        }
        if self.unit_value < Decimal::ZERO {
            errors.insert("unit_value".to_string(), "must not be negative".to_string());
        }

        let currency = self
            .currency
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            errors.insert("currency".to_string(), "must be a 3-letter currency code".to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(HoldingDraft {
            kind: self.kind,
            name,
            symbol: blank_to_none(self.symbol).map(|s| s.to_ascii_uppercase()),
            quantity: self.quantity,
            unit_value: self.unit_value,
            currency,
            notes: blank_to_none(self.notes),
        })
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
