use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::database::models::{Holding, HoldingKind};

/// Totals for one currency. Amounts are never converted between currencies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencySummary {
    pub currency: String,
    pub by_kind: BTreeMap<HoldingKind, Decimal>,
    pub assets: Decimal,
    pub liabilities: Decimal,
    pub net_worth: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub holding_count: usize,
    pub currencies: Vec<CurrencySummary>,
}

impl CurrencySummary {
    fn empty(currency: &str) -> Self {
        Self {
            currency: currency.to_string(),
            by_kind: BTreeMap::new(),
            assets: Decimal::ZERO,
            liabilities: Decimal::ZERO,
            net_worth: Decimal::ZERO,
        }
    }

    fn add(&mut self, holding: &Holding) {
        let value = holding.market_value();
        *self.by_kind.entry(holding.kind).or_insert(Decimal::ZERO) += value;
        if holding.kind.is_liability() {
            self.liabilities += value;
        } else {
            self.assets += value;
        }
        self.net_worth = self.assets - self.liabilities;
    }
}

impl PortfolioSummary {
    /// Group by currency (alphabetical), then total per kind
    pub fn from_holdings(holdings: &[Holding]) -> Self {
        let mut currencies: BTreeMap<&str, CurrencySummary> = BTreeMap::new();
        for holding in holdings {
            currencies
                .entry(holding.currency.as_str())
                .or_insert_with(|| CurrencySummary::empty(&holding.currency))
                .add(holding);
        }

        Self {
            holding_count: holdings.len(),
            currencies: currencies.into_values().collect(),
        }
    }
}
