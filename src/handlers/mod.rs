// handlers/mod.rs - Two handler tiers
//
// Public (no auth) → Protected (bearer token required)
pub mod protected; // Gated by BearerAuth: /todo, /todo/:id
pub mod public; // No authentication: /health, /limit, /x, /tokenz
