//! JSON-RPC over HTTP, backed by an alloy provider

use alloy::network::{AnyNetwork, Network, ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use tracing::debug;
use url::Url;

use super::{ChainClient, Connection, Receipt, SignedTransaction};
use crate::error::{Error, Result};

/// Connects to HTTP JSON-RPC endpoints
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpClient;

impl ChainClient for HttpClient {
    type Connection = HttpConnection;

    async fn connect(&self, endpoint: &str) -> Result<HttpConnection> {
        let connection_err = |reason: String| Error::Connection {
            endpoint: endpoint.to_string(),
            reason,
        };

        let url: Url = endpoint.parse().map_err(|e: url::ParseError| connection_err(e.to_string()))?;
        let provider = ProviderBuilder::new()
            .network::<AnyNetwork>()
            .connect_http(url)
            .erased();

        // The HTTP transport is lazy; query the node so a dead endpoint fails here
        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| connection_err(e.to_string()))?;
        debug!(endpoint, chain_id, "Connected to node");

        Ok(HttpConnection {
            provider,
            endpoint: endpoint.to_string(),
        })
    }
}

/// A live provider for one endpoint
#[derive(Clone)]
pub struct HttpConnection {
    provider: DynProvider<AnyNetwork>,
    endpoint: String,
}

impl HttpConnection {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for HttpConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConnection")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Connection for HttpConnection {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let tx = <AnyNetwork as Network>::TransactionRequest::default()
            .with_to(to)
            .with_input(data);

        self.provider
            .call(tx)
            .await
            .map_err(|e| Error::ChainCall(e.to_string()))
    }

    async fn nonce(&self, address: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(address)
            .await
            .map_err(|e| Error::Submission(format!("failed to fetch nonce: {e}")))
    }

    async fn gas_price(&self) -> Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| Error::Submission(format!("failed to fetch gas price: {e}")))
    }

    async fn send(&self, tx: SignedTransaction) -> Result<TxHash> {
        let pending = self
            .provider
            .send_raw_transaction(&tx.raw)
            .await
            .map_err(|e| Error::Submission(e.to_string()))?;
        Ok(*pending.tx_hash())
    }

    async fn receipt(&self, hash: TxHash) -> Result<Option<Receipt>> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| Error::ChainCall(format!("failed to fetch receipt: {e}")))?;

        Ok(receipt.map(|r| Receipt {
            transaction_hash: r.transaction_hash(),
            block_number: r.block_number(),
            gas_used: r.gas_used(),
            success: r.status(),
            contract_address: r.contract_address(),
        }))
    }

    async fn code_at(&self, address: Address) -> Result<Bytes> {
        self.provider
            .get_code_at(address)
            .await
            .map_err(|e| Error::ChainCall(format!("failed to fetch code: {e}")))
    }

    async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| Error::ChainCall(format!("failed to fetch chain id: {e}")))
    }
}
