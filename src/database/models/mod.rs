pub mod holding;
pub mod principal;

pub use holding::{Holding, HoldingDraft, HoldingInput, HoldingKind};
pub use principal::{NewPrincipal, Principal};
