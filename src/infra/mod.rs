// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File-system concerns shared by the use cases:
//
//   model_store.rs — Training config, vocabulary and model
//                    weights for a finished run, so `generate`
//                    can rebuild the exact model later.
//
//   metrics.rs     — Per-epoch loss rows in a CSV file.

/// Model artifact saving and loading
pub mod model_store;

/// Training metrics CSV logger
pub mod metrics;
