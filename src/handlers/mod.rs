// handlers/mod.rs - two security tiers
//
// Public (no auth) → Protected (single-tenant gate on /api/*)
pub mod protected; // Shared secret or bearer token required (/api/*)
pub mod public; // No authentication required (/, /health, /auth/*)
