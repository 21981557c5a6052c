pub mod transaction;
pub mod utxo;
pub mod handler;

pub use transaction::*;
pub use utxo::*;
pub use handler::*;

pub mod crypto;
pub mod errors;
