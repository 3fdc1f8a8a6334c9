mod account;
mod catalog;
mod chain;
mod constants;
mod intent;

pub use account::*;
pub use catalog::*;
pub use chain::*;
pub use constants::*;
pub use intent::*;
