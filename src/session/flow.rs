//! The interactive flow: a state machine driven one transition at a time
//!
//! ```text
//! SelectInterface -> AcquireConnection -> AcquireAddress -> SelectMethod
//!        ^                                      ^               |
//!        |                                      |        CollectArguments
//!        |                                      |               |
//!        +------------- ChooseNext <------------+----------- Execute
//!                           |
//!                          Exit
//! ```

use std::time::Duration;

use alloy::primitives::{Address, Bytes, U256};
use tracing::{debug, info, warn};

use super::context::SessionContext;
use crate::abi::{
    decode_output, encode, parse, Interface, InterfaceRegistry, MethodDescriptor, MethodKind,
    TypedValue,
};
use crate::chain::{ChainClient, Connection, UnsignedTx};
use crate::error::{Error, Result};
use crate::prompt::{PromptSurface, Report, TextPrompt};
use crate::signing::TransactionSigner;
use crate::validation::{
    parse_address, parse_chain_id, parse_private_key, parse_wei, validate_address,
    validate_chain_id, validate_int, validate_private_key, validate_rpc_url, DEFAULT_RPC_URL,
};

/// Seconds to wait between submitting a transaction and fetching its receipt
pub const DEFAULT_WAIT_TIME: Duration = Duration::from_secs(5);

/// Remembered contract addresses, keyed by interface name
pub trait AddressBook {
    /// Addresses previously used with `interface`, oldest first
    fn addresses(&self, interface: &str) -> Vec<Address>;

    fn remember(&mut self, interface: &str, address: Address) -> Result<()>;
}

/// A method together with its parsed arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub method: MethodDescriptor,
    pub values: Vec<TypedValue>,
}

/// Where the flow currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    SelectInterface,
    AcquireConnection,
    AcquireAddress,
    SelectMethod,
    CollectArguments(MethodDescriptor),
    Execute(Invocation),
    ChooseNext,
    Exit,
}

impl State {
    pub fn name(&self) -> &'static str {
        match self {
            State::SelectInterface => "select_interface",
            State::AcquireConnection => "acquire_connection",
            State::AcquireAddress => "acquire_address",
            State::SelectMethod => "select_method",
            State::CollectArguments(_) => "collect_arguments",
            State::Execute(_) => "execute",
            State::ChooseNext => "choose_next",
            State::Exit => "exit",
        }
    }
}

/// The operator's choice after an execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    SelectMethod,
    ChangeAddress,
    ChangeContract,
    Exit,
}

impl NextStep {
    pub const ALL: [NextStep; 4] = [
        NextStep::SelectMethod,
        NextStep::ChangeAddress,
        NextStep::ChangeContract,
        NextStep::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NextStep::SelectMethod => "select method",
            NextStep::ChangeAddress => "change contract address",
            NextStep::ChangeContract => "change contract",
            NextStep::Exit => "exit",
        }
    }

    pub fn target(self) -> State {
        match self {
            NextStep::SelectMethod => State::SelectMethod,
            NextStep::ChangeAddress => State::AcquireAddress,
            NextStep::ChangeContract => State::SelectInterface,
            NextStep::Exit => State::Exit,
        }
    }
}

/// Summary of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit {
    /// Calls and transactions executed
    pub executions: usize,
}

/// Runs a session with a fresh context until the operator exits
pub async fn run_session<P, C, S>(
    registry: &InterfaceRegistry,
    prompt: P,
    client: C,
    signer: S,
) -> Result<Exit>
where
    P: PromptSurface,
    C: ChainClient,
    S: TransactionSigner,
{
    Session::new(registry, prompt, client, signer).run().await
}

/// One interactive session over a registry of interfaces
pub struct Session<'r, P, C: ChainClient, S> {
    registry: &'r InterfaceRegistry,
    prompt: P,
    client: C,
    signer: S,
    context: SessionContext<C::Connection>,
    address_book: Option<Box<dyn AddressBook + Send>>,
    wait_time: Duration,
    interface: Option<&'r Interface>,
    /// The current address came from the address book
    address_from_book: bool,
    executions: usize,
}

impl<'r, P, C, S> Session<'r, P, C, S>
where
    P: PromptSurface,
    C: ChainClient,
    S: TransactionSigner,
{
    pub fn new(registry: &'r InterfaceRegistry, prompt: P, client: C, signer: S) -> Self {
        Self {
            registry,
            prompt,
            client,
            signer,
            context: SessionContext::new(),
            address_book: None,
            wait_time: DEFAULT_WAIT_TIME,
            interface: None,
            address_from_book: false,
            executions: 0,
        }
    }

    /// Starts from a prepared context (e.g. one built from settings)
    pub fn with_context(mut self, context: SessionContext<C::Connection>) -> Self {
        self.context = context;
        self
    }

    pub fn with_address_book(mut self, book: impl AddressBook + Send + 'static) -> Self {
        self.address_book = Some(Box::new(book));
        self
    }

    /// How long to wait before fetching a receipt
    pub fn with_wait_time(mut self, wait_time: Duration) -> Self {
        self.wait_time = wait_time;
        self
    }

    pub fn context(&self) -> &SessionContext<C::Connection> {
        &self.context
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Drives the state machine from `SelectInterface` until `Exit` or a fatal error
    pub async fn run(&mut self) -> Result<Exit> {
        let mut state = State::SelectInterface;
        while state != State::Exit {
            debug!(state = state.name(), "Entering state");
            state = self.step(state).await?;
        }

        info!(executions = self.executions, "Session finished");
        Ok(Exit {
            executions: self.executions,
        })
    }

    /// Performs one transition
    pub async fn step(&mut self, state: State) -> Result<State> {
        match state {
            State::SelectInterface => self.select_interface(),
            State::AcquireConnection => self.acquire_connection().await,
            State::AcquireAddress => self.acquire_address().await,
            State::SelectMethod => self.select_method(),
            State::CollectArguments(method) => self.collect_arguments(method),
            State::Execute(invocation) => self.execute(invocation).await,
            State::ChooseNext => self.choose_next(),
            State::Exit => Ok(State::Exit),
        }
    }

    fn select_interface(&mut self) -> Result<State> {
        let registry = self.registry;
        let names: Vec<String> = registry.names().into_iter().map(String::from).collect();
        if names.is_empty() {
            return Err(Error::InterfaceLoad {
                name: String::new(),
                reason: "no interfaces available".to_string(),
            });
        }

        let index = self.prompt.select("Select a contract", &names)?;
        let name = names
            .get(index)
            .ok_or_else(|| Error::Prompt(format!("selection {index} out of range")))?;
        self.interface = registry.get(name);
        info!(interface = %name, "Selected contract");

        Ok(State::AcquireConnection)
    }

    async fn acquire_connection(&mut self) -> Result<State> {
        if self.context.is_connected() {
            return Ok(State::AcquireAddress);
        }

        let (endpoint, configured) = match self.context.take_configured_endpoint() {
            Some(endpoint) => (endpoint, true),
            None => {
                let prompt = TextPrompt::new("RPC URL")
                    .with_default(DEFAULT_RPC_URL)
                    .with_validator(validate_rpc_url);
                (self.prompt.text(&prompt)?.trim().to_string(), false)
            }
        };

        let connection = match self.client.connect(&endpoint).await {
            Ok(connection) => connection,
            Err(e) if e.is_retryable() => {
                warn!(endpoint = %endpoint, error = %e, "Failed to connect");
                self.prompt.report(&Report::ConnectionFailed {
                    endpoint,
                    reason: e.to_string(),
                });
                return Ok(State::AcquireConnection);
            }
            Err(e) => return Err(e),
        };

        let expected = self.context.chain_id();
        if expected != 0 {
            match connection.chain_id().await {
                Ok(actual) if actual != expected => {
                    warn!(
                        configured = expected,
                        connected = actual,
                        "Configured chain id does not match the connected network"
                    );
                    self.prompt.report(&Report::ChainIdMismatch {
                        configured: expected,
                        connected: actual,
                    });
                }
                Ok(_) => {}
                Err(e) => debug!(error = %e, "Could not verify chain id"),
            }
        }

        info!(endpoint = %endpoint, "Connected");
        self.context.install_connection(endpoint.clone(), connection);
        if !configured {
            self.prompt.report(&Report::EndpointAcquired { endpoint });
        }

        Ok(State::AcquireAddress)
    }

    async fn acquire_address(&mut self) -> Result<State> {
        let interface = self.current_interface()?;

        let remembered = self
            .address_book
            .as_ref()
            .map(|book| book.addresses(&interface.name))
            .unwrap_or_default();

        let mut chosen = None;
        for address in remembered {
            let label = format!("Use {address} from the address book?");
            if self.prompt.confirm(&label, true)? {
                chosen = Some(address);
                break;
            }
        }

        let (address, from_book) = match chosen {
            Some(address) => (address, true),
            None => {
                let prompt = TextPrompt::new("Contract address").with_validator(validate_address);
                let text = self.prompt.text(&prompt)?;
                match parse_address(&text) {
                    Ok(address) => (address, false),
                    Err(e) => {
                        self.prompt.report(&Report::InvalidArgument {
                            parameter: "contract address".to_string(),
                            reason: e.to_string(),
                        });
                        return Ok(State::AcquireAddress);
                    }
                }
            }
        };

        let Some(connection) = self.context.connection() else {
            return Ok(State::AcquireConnection);
        };
        let reason = match connection.code_at(address).await {
            Ok(code) if !code.is_empty() => None,
            Ok(_) => Some(Error::NoCode(address).to_string()),
            Err(e) => Some(e.to_string()),
        };

        if let Some(reason) = reason {
            warn!(%address, %reason, "Invalid contract address");
            self.prompt.report(&Report::NoCode { address, reason });
            return Ok(State::AcquireAddress);
        }

        debug!(%address, from_book, "Contract address set");
        self.context.set_contract(address);
        self.address_from_book = from_book;

        Ok(State::SelectMethod)
    }

    fn select_method(&mut self) -> Result<State> {
        let interface = self.current_interface()?;

        let kinds = [MethodKind::Read, MethodKind::Write];
        let labels: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
        let index = self.prompt.select("Read or write?", &labels)?;
        let kind = *kinds
            .get(index)
            .ok_or_else(|| Error::Prompt(format!("selection {index} out of range")))?;

        if kind == MethodKind::Write {
            self.acquire_signing()?;
        }

        let methods = interface.methods_of(kind);
        if methods.is_empty() {
            self.prompt.report(&Report::NoMethods {
                interface: interface.name.clone(),
                kind,
            });
            return Ok(State::SelectMethod);
        }

        let labels: Vec<String> = methods.iter().map(|m| m.signature.clone()).collect();
        let index = self.prompt.select("Select a method", &labels)?;
        let method = methods
            .get(index)
            .ok_or_else(|| Error::Prompt(format!("selection {index} out of range")))?;

        Ok(State::CollectArguments((*method).clone()))
    }

    /// Prompts for the signing key and chain id if either is missing
    fn acquire_signing(&mut self) -> Result<()> {
        while self.context.key().is_none() {
            let prompt = TextPrompt::new("Private key")
                .masked()
                .with_validator(validate_private_key);
            match parse_private_key(&self.prompt.text(&prompt)?) {
                Ok(key) => {
                    info!(signer = %key.address(), "Signing key loaded");
                    self.context.install_key(key);
                }
                Err(e) => self.prompt.report(&Report::InvalidArgument {
                    parameter: "private key".to_string(),
                    reason: e.to_string(),
                }),
            }
        }

        while self.context.chain_id() == 0 {
            let prompt = TextPrompt::new("Chain id").with_validator(validate_chain_id);
            match parse_chain_id(&self.prompt.text(&prompt)?) {
                Ok(chain_id) => {
                    self.context.install_chain_id(chain_id);
                    self.prompt.report(&Report::ChainIdAcquired { chain_id });
                }
                Err(e) => self.prompt.report(&Report::InvalidArgument {
                    parameter: "chain id".to_string(),
                    reason: e.to_string(),
                }),
            }
        }

        Ok(())
    }

    fn collect_arguments(&mut self, method: MethodDescriptor) -> Result<State> {
        let mut values = Vec::with_capacity(method.inputs.len());

        for param in &method.inputs {
            let prompt = TextPrompt::new(param.label());
            loop {
                let text = self.prompt.text(&prompt)?;
                match parse(&text, &param.ty) {
                    Ok(value) => {
                        values.push(value);
                        break;
                    }
                    Err(e) if e.is_retryable() => {
                        warn!(parameter = %prompt.label, error = %e, "Invalid argument");
                        self.prompt.report(&Report::InvalidArgument {
                            parameter: prompt.label.clone(),
                            reason: e.to_string(),
                        });
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(State::Execute(Invocation { method, values }))
    }

    async fn execute(&mut self, invocation: Invocation) -> Result<State> {
        let Some(contract) = self.context.contract() else {
            return Ok(State::AcquireAddress);
        };
        let calldata = encode(&invocation.method, &invocation.values)?;
        debug!(
            method = %invocation.method.signature,
            calldata = %calldata,
            "Encoded call"
        );

        match invocation.method.kind() {
            MethodKind::Read => {
                let Some(connection) = self.context.connection() else {
                    return Ok(State::AcquireConnection);
                };
                let output = connection.call(contract, calldata).await?;
                let values = decode_output(&invocation.method, &output)?;
                self.prompt.report(&Report::CallResult {
                    signature: invocation.method.signature.clone(),
                    values,
                });
            }
            MethodKind::Write => {
                let value = if invocation.method.is_payable() {
                    self.prompt_value()?
                } else {
                    U256::ZERO
                };
                self.submit(contract, calldata, value).await?;
            }
        }

        self.executions += 1;
        self.remember_contract(contract);

        Ok(State::ChooseNext)
    }

    fn prompt_value(&mut self) -> Result<U256> {
        let prompt = TextPrompt::new("Value (wei)")
            .with_default("0")
            .with_validator(validate_int);
        loop {
            match parse_wei(&self.prompt.text(&prompt)?) {
                Ok(value) => return Ok(value),
                Err(e) => self.prompt.report(&Report::InvalidArgument {
                    parameter: prompt.label.clone(),
                    reason: e.to_string(),
                }),
            }
        }
    }

    /// Signs and sends a legacy transaction, then fetches its receipt once
    async fn submit(&mut self, to: Address, input: Bytes, value: U256) -> Result<()> {
        let (Some(connection), Some(key)) = (self.context.connection(), self.context.key()) else {
            return Err(Error::Submission(
                "connection and signing key are required".to_string(),
            ));
        };

        let nonce = connection.nonce(key.address()).await?;
        let gas_price = connection.gas_price().await?;
        let tx = UnsignedTx::call(to, input, value, nonce, gas_price);

        let signed = self.signer.sign(tx, self.context.chain_id(), key)?;
        let hash = connection.send(signed).await?;
        info!(%hash, nonce, "Transaction sent");
        self.prompt.report(&Report::TransactionSubmitted { hash });

        self.prompt.report(&Report::Waiting {
            seconds: self.wait_time.as_secs(),
        });
        tokio::time::sleep(self.wait_time).await;

        let report = match connection.receipt(hash).await {
            Ok(Some(receipt)) => Report::Receipt { receipt },
            Ok(None) => Report::ReceiptUnavailable {
                hash,
                reason: "transaction not mined yet".to_string(),
            },
            Err(e) => {
                warn!(%hash, error = %e, "Failed to fetch receipt");
                Report::ReceiptUnavailable {
                    hash,
                    reason: e.to_string(),
                }
            }
        };
        self.prompt.report(&report);

        Ok(())
    }

    /// Saves a typed-in address once it has been used successfully
    fn remember_contract(&mut self, address: Address) {
        if self.address_from_book {
            return;
        }
        let (Some(book), Some(interface)) = (self.address_book.as_mut(), self.interface) else {
            return;
        };
        match book.remember(&interface.name, address) {
            Ok(()) => self.address_from_book = true,
            Err(e) => warn!(error = %e, "Failed to update address book"),
        }
    }

    fn choose_next(&mut self) -> Result<State> {
        let labels: Vec<String> = NextStep::ALL.iter().map(|s| s.label().to_string()).collect();
        let index = self.prompt.select("What next?", &labels)?;
        let step = *NextStep::ALL
            .get(index)
            .ok_or_else(|| Error::Prompt(format!("selection {index} out of range")))?;

        if matches!(step, NextStep::ChangeAddress | NextStep::ChangeContract) {
            self.context.clear_contract();
            self.address_from_book = false;
        }

        Ok(step.target())
    }

    fn current_interface(&self) -> Result<&'r Interface> {
        self.interface
            .ok_or_else(|| Error::Prompt("no contract selected".to_string()))
    }
}
