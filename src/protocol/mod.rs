//! Wire-level vocabulary: topic derivation and broker message types

pub mod messages;
pub mod topics;

pub use messages::*;
pub use topics::*;
