//! Discord command implementations.

/// Music playback commands
pub mod music;

// Export commands
pub use music::*;
