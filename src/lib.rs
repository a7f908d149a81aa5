// Keepsake — caregiver memory capture + patient-facing retrieval assistant.
//
// Layer rules:
//   atoms/   — pure constants, types, errors, traits. No I/O.
//   engine/  — retrieval orchestration, collaborator clients, stores.
//   server/  — axum HTTP surface. Converts engine errors into the fixed
//              patient-safe sentences; never leaks raw errors to the caller.

pub mod atoms;
pub mod engine;
pub mod server;
