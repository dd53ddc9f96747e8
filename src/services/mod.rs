pub mod portfolio;

pub use portfolio::{CurrencySummary, PortfolioSummary};
