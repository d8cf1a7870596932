//! Pure ledger computations shared by adapters.

pub mod address_codec;
pub mod keypair;

pub use keypair::{Keypair, sha512_half};
