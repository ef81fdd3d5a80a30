// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal.
//
// Rules for this layer:
//   - No tensor math or model code here
//   - No argument parsing here (that's Layer 1)
//   - Only workflow coordination

// The training workflow
pub mod train_use_case;

// Text generation from a saved model
pub mod generate_use_case;
