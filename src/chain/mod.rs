//! Chain access: the client and connection seams, and the transaction types
//! that flow through them

mod http;

use std::future::Future;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use serde::Serialize;

use crate::error::Result;

pub use http::{HttpClient, HttpConnection};

/// Gas limit used for every submitted transaction
pub const GAS_LIMIT: u64 = 3_000_000;

/// Opens connections to a node
pub trait ChainClient {
    type Connection: Connection;

    /// Connects to `endpoint`, failing with [`crate::Error::Connection`] when unreachable
    fn connect(&self, endpoint: &str) -> impl Future<Output = Result<Self::Connection>> + Send;
}

/// An open connection to a node
pub trait Connection {
    /// Executes a read-only call and returns the raw return data
    fn call(&self, to: Address, data: Bytes) -> impl Future<Output = Result<Bytes>> + Send;

    /// Pending transaction count of `address`
    fn nonce(&self, address: Address) -> impl Future<Output = Result<u64>> + Send;

    /// Suggested gas price in wei
    fn gas_price(&self) -> impl Future<Output = Result<u128>> + Send;

    /// Broadcasts a signed transaction
    fn send(&self, tx: SignedTransaction) -> impl Future<Output = Result<TxHash>> + Send;

    /// Receipt of a mined transaction, `None` while pending or unknown
    fn receipt(&self, hash: TxHash) -> impl Future<Output = Result<Option<Receipt>>> + Send;

    /// Deployed bytecode at `address`, empty for accounts without code
    fn code_at(&self, address: Address) -> impl Future<Output = Result<Bytes>> + Send;

    /// Chain id reported by the node
    fn chain_id(&self) -> impl Future<Output = Result<u64>> + Send;
}

/// A legacy transaction ready to be signed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTx {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: Address,
    pub value: U256,
    pub input: Bytes,
}

impl UnsignedTx {
    /// Call to `to` with the fixed [`GAS_LIMIT`]
    pub fn call(to: Address, input: Bytes, value: U256, nonce: u64, gas_price: u128) -> Self {
        Self {
            nonce,
            gas_price,
            gas_limit: GAS_LIMIT,
            to,
            value,
            input,
        }
    }
}

/// An encoded, signed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub hash: TxHash,
    /// EIP-2718 encoding, as sent with `eth_sendRawTransaction`
    pub raw: Bytes,
}

/// The parts of a transaction receipt shown to the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub success: bool,
    pub contract_address: Option<Address>,
}
