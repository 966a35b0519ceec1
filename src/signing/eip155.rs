//! EIP-155 signing of legacy transactions

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Bytes, TxKind};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use super::TransactionSigner;
use crate::chain::{SignedTransaction, UnsignedTx};
use crate::error::{Error, Result};

/// Signs legacy transactions with replay protection (`v = chain_id * 2 + 35 + parity`)
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacySigner;

impl TransactionSigner for LegacySigner {
    fn sign(
        &self,
        tx: UnsignedTx,
        chain_id: u64,
        key: &PrivateKeySigner,
    ) -> Result<SignedTransaction> {
        if chain_id == 0 {
            return Err(Error::Signing("chain id must be set".to_string()));
        }

        let tx = TxLegacy {
            chain_id: Some(chain_id),
            nonce: tx.nonce,
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
            to: TxKind::Call(tx.to),
            value: tx.value,
            input: tx.input,
        };

        let signature = key.sign_hash_sync(&tx.signature_hash())?;
        let signed = tx.into_signed(signature);
        let hash = *signed.hash();
        let raw = TxEnvelope::Legacy(signed).encoded_2718();

        Ok(SignedTransaction {
            hash,
            raw: Bytes::from(raw),
        })
    }
}
