//! Transaction signing

mod eip155;

use alloy::signers::local::PrivateKeySigner;

use crate::chain::{SignedTransaction, UnsignedTx};
use crate::error::Result;

pub use eip155::LegacySigner;

/// Turns an unsigned transaction into a signed, encoded one
pub trait TransactionSigner {
    fn sign(
        &self,
        tx: UnsignedTx,
        chain_id: u64,
        key: &PrivateKeySigner,
    ) -> Result<SignedTransaction>;
}
