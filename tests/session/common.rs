//! Shared fixtures for session scenario tests: a scripted prompt surface, an
//! in-memory chain and an in-memory address book

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{address, Address, Bytes, TxHash, U256};
use solizard::abi::{Interface, InterfaceRegistry};
use solizard::{
    AddressBook, ChainClient, Connection, Error, LegacySigner, PromptSurface, Receipt, Report,
    Result, Session, SignedTransaction, TextPrompt,
};

pub const ENDPOINT: &str = "http://localhost:8545";
pub const TOKEN: Address = address!("0x1111111111111111111111111111111111111111");
pub const HOLDER: Address = address!("0x2222222222222222222222222222222222222222");
pub const EMPTY: Address = address!("0x3333333333333333333333333333333333333333");
pub const KEY: &str = "0x4646464646464646464646464646464646464646464646464646464646464646";

pub const TOKEN_ABI: &str = r#"[
    {"type":"function","name":"balanceOf","stateMutability":"view",
     "inputs":[{"name":"owner","type":"address"}],
     "outputs":[{"name":"","type":"uint256"}]},
    {"type":"function","name":"transfer","stateMutability":"nonpayable",
     "inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],
     "outputs":[{"name":"","type":"bool"}]},
    {"type":"function","name":"deposit","stateMutability":"payable",
     "inputs":[],"outputs":[]}
]"#;

pub const VIEWER_ABI: &str = r#"[
    {"type":"function","name":"version","stateMutability":"pure",
     "inputs":[],"outputs":[{"name":"","type":"string"}]}
]"#;

pub fn registry() -> InterfaceRegistry {
    InterfaceRegistry::from_interfaces(vec![
        Interface::from_json("Token", TOKEN_ABI.as_bytes()).unwrap(),
        Interface::from_json("Viewer", VIEWER_ABI.as_bytes()).unwrap(),
    ])
}

// =============================================================================
// Scripted prompt
// =============================================================================

/// One scripted operator answer
#[derive(Debug, Clone)]
pub enum Answer {
    Text(String),
    /// Picks the item with this label
    Choose(String),
    Confirm(bool),
}

pub fn text(s: &str) -> Answer {
    Answer::Text(s.to_string())
}

pub fn choose(s: &str) -> Answer {
    Answer::Choose(s.to_string())
}

pub fn confirm(yes: bool) -> Answer {
    Answer::Confirm(yes)
}

/// Answers prompts from a script; fails with `Error::Prompt` once the script runs out
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<Answer>,
    /// Labels of every prompt shown, in order
    pub asked: Vec<String>,
    pub reports: Vec<Report>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, label: &str) -> Result<Answer> {
        self.asked.push(label.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| Error::Prompt(format!("script exhausted at '{label}'")))
    }
}

impl PromptSurface for ScriptedPrompt {
    fn text(&mut self, prompt: &TextPrompt) -> Result<String> {
        match self.next(&prompt.label)? {
            Answer::Text(s) if s.is_empty() => Ok(prompt.default.clone().unwrap_or_default()),
            Answer::Text(s) => Ok(s),
            other => Err(Error::Prompt(format!("expected text for '{}', scripted {other:?}", prompt.label))),
        }
    }

    fn select(&mut self, label: &str, items: &[String]) -> Result<usize> {
        match self.next(label)? {
            Answer::Choose(item) => items
                .iter()
                .position(|i| *i == item)
                .ok_or_else(|| Error::Prompt(format!("'{item}' not offered for '{label}': {items:?}"))),
            other => Err(Error::Prompt(format!("expected choice for '{label}', scripted {other:?}"))),
        }
    }

    fn confirm(&mut self, label: &str, _default: bool) -> Result<bool> {
        match self.next(label)? {
            Answer::Confirm(yes) => Ok(yes),
            other => Err(Error::Prompt(format!("expected confirm for '{label}', scripted {other:?}"))),
        }
    }

    fn report(&mut self, report: &Report) {
        self.reports.push(report.clone());
    }
}

// =============================================================================
// In-memory chain
// =============================================================================

#[derive(Debug)]
pub struct ChainState {
    pub chain_id: u64,
    pub nonces: HashMap<Address, u64>,
    pub gas_price: u128,
    pub code: HashMap<Address, Bytes>,
    /// Return data keyed by selector
    pub returns: HashMap<[u8; 4], Bytes>,
    /// Whether sent transactions have a receipt
    pub mined: bool,
    pub fail_nonce: bool,
    pub connect_attempts: Vec<String>,
    pub calls: Vec<(Address, Bytes)>,
    pub nonce_queries: Vec<Address>,
    pub sent: Vec<SignedTransaction>,
}

impl Default for ChainState {
    fn default() -> Self {
        Self {
            chain_id: 31337,
            nonces: HashMap::new(),
            gas_price: 1_000_000_000,
            code: HashMap::from([(TOKEN, Bytes::from(vec![0x60, 0x80, 0x60, 0x40]))]),
            returns: HashMap::new(),
            mined: true,
            fail_nonce: false,
            connect_attempts: Vec::new(),
            calls: Vec::new(),
            nonce_queries: Vec::new(),
            sent: Vec::new(),
        }
    }
}

/// Connects only to the endpoints listed as reachable
#[derive(Debug, Clone)]
pub struct MockClient {
    pub state: Arc<Mutex<ChainState>>,
    pub reachable: Vec<String>,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ChainState::default())),
            reachable: vec![ENDPOINT.to_string()],
        }
    }

    pub fn with_state(self, f: impl FnOnce(&mut ChainState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, ChainState> {
        self.state.lock().unwrap()
    }
}

impl ChainClient for MockClient {
    type Connection = MockConnection;

    async fn connect(&self, endpoint: &str) -> Result<MockConnection> {
        self.state.lock().unwrap().connect_attempts.push(endpoint.to_string());
        if self.reachable.iter().any(|e| e == endpoint) {
            Ok(MockConnection {
                state: self.state.clone(),
            })
        } else {
            Err(Error::Connection {
                endpoint: endpoint.to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }
}

#[derive(Debug, Clone)]
pub struct MockConnection {
    state: Arc<Mutex<ChainState>>,
}

impl Connection for MockConnection {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((to, data.clone()));
        let selector: [u8; 4] = data[..4].try_into().unwrap();
        state
            .returns
            .get(&selector)
            .cloned()
            .ok_or_else(|| Error::ChainCall("execution reverted".to_string()))
    }

    async fn nonce(&self, address: Address) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        state.nonce_queries.push(address);
        if state.fail_nonce {
            return Err(Error::Submission("failed to fetch nonce: timeout".to_string()));
        }
        Ok(state.nonces.get(&address).copied().unwrap_or_default())
    }

    async fn gas_price(&self) -> Result<u128> {
        Ok(self.state.lock().unwrap().gas_price)
    }

    async fn send(&self, tx: SignedTransaction) -> Result<TxHash> {
        let hash = tx.hash;
        self.state.lock().unwrap().sent.push(tx);
        Ok(hash)
    }

    async fn receipt(&self, hash: TxHash) -> Result<Option<Receipt>> {
        let state = self.state.lock().unwrap();
        Ok(state.mined.then(|| Receipt {
            transaction_hash: hash,
            block_number: Some(1),
            gas_used: 51_000,
            success: true,
            contract_address: None,
        }))
    }

    async fn code_at(&self, address: Address) -> Result<Bytes> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .code
            .get(&address)
            .cloned()
            .unwrap_or_default())
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.state.lock().unwrap().chain_id)
    }
}

// =============================================================================
// Address book
// =============================================================================

/// Address book whose entries stay observable after it is moved into a session
#[derive(Debug, Clone, Default)]
pub struct MemoryBook(pub Arc<Mutex<Vec<(String, Address)>>>);

impl MemoryBook {
    pub fn with(entries: &[(&str, Address)]) -> Self {
        Self(Arc::new(Mutex::new(
            entries.iter().map(|(n, a)| (n.to_string(), *a)).collect(),
        )))
    }

    pub fn entries(&self) -> Vec<(String, Address)> {
        self.0.lock().unwrap().clone()
    }
}

impl AddressBook for MemoryBook {
    fn addresses(&self, interface: &str) -> Vec<Address> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == interface)
            .map(|(_, address)| *address)
            .collect()
    }

    fn remember(&mut self, interface: &str, address: Address) -> Result<()> {
        let mut entries = self.0.lock().unwrap();
        if !entries.iter().any(|(n, a)| n == interface && *a == address) {
            entries.push((interface.to_string(), address));
        }
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

pub type TestSession<'r> = Session<'r, ScriptedPrompt, MockClient, LegacySigner>;

pub fn session<'r>(
    registry: &'r InterfaceRegistry,
    client: &MockClient,
    answers: impl IntoIterator<Item = Answer>,
) -> TestSession<'r> {
    Session::new(registry, ScriptedPrompt::new(answers), client.clone(), LegacySigner)
        .with_wait_time(Duration::ZERO)
}

/// ABI-encoded single uint256
pub fn uint_word(value: u64) -> Bytes {
    Bytes::from(U256::from(value).to_be_bytes::<32>().to_vec())
}

/// The standard answers up to an open connection and a selected Token contract
pub fn open_token() -> Vec<Answer> {
    vec![
        choose("Token"),
        text(ENDPOINT),
        text("0x1111111111111111111111111111111111111111"),
    ]
}
