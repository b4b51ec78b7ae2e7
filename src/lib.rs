// Sierpinski gasket generation and the two lab rendering demos.
// The binary in main.rs owns the window and GPU; everything testable lives here.

pub mod engine;
