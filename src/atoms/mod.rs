// ── Keepsake Atoms Layer ───────────────────────────────────────────────────
// Pure constants, types, errors, and collaborator traits — zero side effects.
// Dependency rule: atoms may only depend on std and external pure crates.
// Nothing here may import from engine/ or server/.

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;
