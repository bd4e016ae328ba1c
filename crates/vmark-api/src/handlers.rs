//! Request handlers.

pub mod analysis;
pub mod health;
pub mod videos;
pub mod workspace;

pub use analysis::*;
pub use health::*;
pub use videos::*;
pub use workspace::*;
