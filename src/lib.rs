//! # solizard
//!
//! Interactive contract interaction engine for EVM chains.
//!
//! ## Features
//!
//! - Typed parsing of operator text into ABI values, including nested arrays and tuples
//! - Call-data encoding and return-data decoding via alloy's dynamic ABI
//! - A guided session state machine: pick a contract, connect, pick a method,
//!   enter arguments, then call or send a signed EIP-155 transaction
//! - Narrow traits for the chain, the signer, interface sources and the prompt surface
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use solizard::{run_session, HttpClient, InterfaceRegistry, LegacySigner};
//!
//! let registry = InterfaceRegistry::load(&abi_dir)?;
//! let exit = run_session(&registry, console, HttpClient, LegacySigner).await?;
//! println!("{} executions", exit.executions);
//! ```
//!
//! ## Parsing arguments
//!
//! ```rust,ignore
//! use solizard::abi::{parse, TypeDescriptor};
//!
//! let ty = TypeDescriptor::parse("(uint256,address,bool)")?;
//! let value = parse("(1,0xAbC0000000000000000000000000000000000DeF,true)", &ty)?;
//! ```

pub mod abi;
pub mod chain;
pub mod error;
pub mod prompt;
pub mod session;
pub mod signing;
pub mod validation;

// Re-export main types at crate root
pub use abi::{
    Interface, InterfaceRegistry, InterfaceSource, MethodDescriptor, MethodKind, Parameter,
    TypeDescriptor, TypedValue,
};
pub use chain::{
    ChainClient, Connection, HttpClient, HttpConnection, Receipt, SignedTransaction, UnsignedTx,
    GAS_LIMIT,
};
pub use error::{Error, Result};
pub use prompt::{PromptSurface, Report, TextPrompt, Validator};
pub use session::{
    run_session, AddressBook, Exit, NextStep, Session, SessionContext, Settings, State,
};
pub use signing::{LegacySigner, TransactionSigner};

// Re-export alloy types that are commonly used
pub use alloy::primitives::{Address, Bytes, TxHash, U256};
pub use alloy::signers::local::PrivateKeySigner;
