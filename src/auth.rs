//! Authentication modes, token records, and the token-updater hook.

pub mod mode;
pub mod secret;
pub mod token;
pub mod updater;

pub use mode::*;
pub use secret::*;
pub use token::*;
pub use updater::*;
