//! The operator-facing prompt surface
//!
//! The session asks for input through [`PromptSurface`] and announces results
//! with [`Report`] events; rendering is up to the implementation.

use alloy::primitives::{Address, TxHash};
use serde::Serialize;

use crate::abi::{MethodKind, TypedValue};
use crate::chain::Receipt;
use crate::error::Result;

/// Checks raw text before it is accepted
pub type Validator = fn(&str) -> Result<()>;

/// Choice lists longer than this switch to type-ahead filtering
pub const SELECTABLE_LIST_SIZE: usize = 4;

/// A free-text question
#[derive(Debug, Clone)]
pub struct TextPrompt {
    pub label: String,
    pub default: Option<String>,
    /// Hide the input while typing (private keys)
    pub masked: bool,
    pub validator: Option<Validator>,
}

impl TextPrompt {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            default: None,
            masked: false,
            validator: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Runs the validator, if any
    pub fn validate(&self, input: &str) -> Result<()> {
        match self.validator {
            Some(validator) => validator(input),
            None => Ok(()),
        }
    }
}

/// Where prompts are answered and results shown
pub trait PromptSurface {
    /// Asks for free text; implementations re-ask until the validator passes
    fn text(&mut self, prompt: &TextPrompt) -> Result<String>;

    /// Picks one of `items`, returning its index
    fn select(&mut self, label: &str, items: &[String]) -> Result<usize>;

    fn confirm(&mut self, label: &str, default: bool) -> Result<bool>;

    fn report(&mut self, report: &Report);
}

/// Events the session shows to the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Report {
    /// A new endpoint was connected
    EndpointAcquired { endpoint: String },
    /// A chain id was entered for signing
    ChainIdAcquired { chain_id: u64 },
    ConnectionFailed { endpoint: String, reason: String },
    /// The node reports a different chain id than the one used for signing
    ChainIdMismatch { configured: u64, connected: u64 },
    /// The address has no code or its code could not be fetched
    NoCode { address: Address, reason: String },
    NoMethods { interface: String, kind: MethodKind },
    InvalidArgument { parameter: String, reason: String },
    CallResult {
        signature: String,
        #[serde(serialize_with = "serialize_values")]
        values: Vec<(String, TypedValue)>,
    },
    TransactionSubmitted { hash: TxHash },
    Waiting { seconds: u64 },
    Receipt { receipt: Receipt },
    ReceiptUnavailable { hash: TxHash, reason: String },
}

fn serialize_values<S: serde::Serializer>(
    values: &[(String, TypedValue)],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    use serde::ser::SerializeSeq;

    #[derive(Serialize)]
    struct NamedValue<'a> {
        name: &'a str,
        value: String,
    }

    let mut seq = serializer.serialize_seq(Some(values.len()))?;
    for (name, value) in values {
        seq.serialize_element(&NamedValue {
            name,
            value: value.to_string(),
        })?;
    }
    seq.end()
}
