//! State that persists across interaction cycles

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use tracing::warn;

use crate::validation::{parse_private_key, validate_rpc_url};

/// Values taken from a config file before the session starts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub rpc_url: Option<String>,
    pub private_key: Option<String>,
    pub chain_id: Option<u64>,
}

/// Connection, signing key, chain id and target contract of one session
///
/// Once acquired, the connection, key and chain id are never replaced: the
/// `install_*` methods refuse to overwrite and return `false`.
pub struct SessionContext<C> {
    connection: Option<C>,
    endpoint: Option<String>,
    /// Endpoint from settings, tried once before prompting
    configured_endpoint: Option<String>,
    key: Option<PrivateKeySigner>,
    chain_id: u64,
    contract: Option<Address>,
}

impl<C> Default for SessionContext<C> {
    fn default() -> Self {
        Self {
            connection: None,
            endpoint: None,
            configured_endpoint: None,
            key: None,
            chain_id: 0,
            contract: None,
        }
    }
}

impl<C> SessionContext<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies settings, skipping (with a warning) any field that fails validation
    pub fn from_settings(settings: &Settings) -> Self {
        let mut ctx = Self::new();

        if let Some(url) = &settings.rpc_url {
            match validate_rpc_url(url) {
                Ok(()) => ctx.configured_endpoint = Some(url.trim().to_string()),
                Err(e) => warn!(error = %e, "Ignoring configured rpc_url"),
            }
        }

        if let Some(key) = settings.private_key.as_deref().filter(|k| !k.is_empty()) {
            match parse_private_key(key) {
                Ok(signer) => ctx.key = Some(signer),
                Err(_) => warn!("Ignoring configured private_key: not a valid secp256k1 key"),
            }
        }

        match settings.chain_id {
            Some(0) => warn!("Ignoring configured chain_id: must be greater than 0"),
            Some(id) => ctx.chain_id = id,
            None => {}
        }

        ctx
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn connection(&self) -> Option<&C> {
        self.connection.as_ref()
    }

    /// Endpoint of the installed connection
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Installs the first connection; later calls are ignored
    pub fn install_connection(&mut self, endpoint: impl Into<String>, connection: C) -> bool {
        if self.connection.is_some() {
            return false;
        }
        self.endpoint = Some(endpoint.into());
        self.connection = Some(connection);
        self.configured_endpoint = None;
        true
    }

    /// Hands out the configured endpoint once
    pub fn take_configured_endpoint(&mut self) -> Option<String> {
        self.configured_endpoint.take()
    }

    pub fn key(&self) -> Option<&PrivateKeySigner> {
        self.key.as_ref()
    }

    pub fn signer_address(&self) -> Option<Address> {
        self.key.as_ref().map(|k| k.address())
    }

    pub fn install_key(&mut self, key: PrivateKeySigner) -> bool {
        if self.key.is_some() {
            return false;
        }
        self.key = Some(key);
        true
    }

    /// Chain id used for signing, 0 while unset
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn install_chain_id(&mut self, chain_id: u64) -> bool {
        if self.chain_id != 0 || chain_id == 0 {
            return false;
        }
        self.chain_id = chain_id;
        true
    }

    pub fn contract(&self) -> Option<Address> {
        self.contract
    }

    pub fn set_contract(&mut self, address: Address) {
        self.contract = Some(address);
    }

    pub fn clear_contract(&mut self) {
        self.contract = None;
    }
}

impl<C> std::fmt::Debug for SessionContext<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("connected", &self.is_connected())
            .field("endpoint", &self.endpoint)
            .field("signer", &self.signer_address())
            .field("chain_id", &self.chain_id)
            .field("contract", &self.contract)
            .finish()
    }
}
