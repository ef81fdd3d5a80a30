// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits that describe what the system
// works with: poems, samples, errors.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain structs, enums, and traits

// The poem corpus, one poem per line
pub mod corpus;

// One (input, target) training window
pub mod sample;

// The error taxonomy shared by every layer
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
