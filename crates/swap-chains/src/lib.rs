mod allowance;
mod error;
mod evm;
mod traits;

pub use allowance::*;
pub use error::*;
pub use evm::*;
pub use traits::*;
