use alloy::primitives::{Address, TxHash};
use serde::Serialize;
use solizard::{Receipt, Report};

use crate::chain_info::{ChainList, NativeCurrency};
use crate::config::ConfigFile;

/// Printed before asking whether to apply `config.toml`
#[derive(Serialize)]
pub struct ConfigSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// Known only for chains in the chain list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_currency: Option<NativeCurrency>,
    /// Address of the configured key; the key itself is never shown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer: Option<Address>,
    pub wait_time_secs: u64,
}

impl ConfigSummary {
    pub fn from_config(config: &ConfigFile, chains: &ChainList) -> Self {
        let signer = config
            .private_key
            .as_deref()
            .and_then(|k| solizard::validation::parse_private_key(k).ok())
            .map(|k| k.address());
        let chain = config.chain_id.and_then(|id| chains.get(id));

        Self {
            rpc_url: config.rpc_url.clone(),
            chain_id: config.chain_id,
            chain_name: chain.map(|c| c.name.clone()),
            native_currency: chain.map(|c| c.native_currency.clone()),
            signer,
            wait_time_secs: config.wait_time().as_secs(),
        }
    }

    pub fn print(&self, json: bool) {
        if json {
            println!("{}", serde_json::to_string_pretty(self).unwrap());
        } else {
            println!("Config:");
            if let Some(url) = &self.rpc_url {
                println!("  RPC URL: {}", url);
            }
            if let Some(chain_id) = self.chain_id {
                println!("  Chain ID: {}", chain_id);
            }
            if let Some(name) = &self.chain_name {
                println!("  Chain Name: {}", name);
            }
            if let Some(currency) = &self.native_currency {
                println!(
                    "  Native Currency: {} ({}), {} decimals",
                    currency.name, currency.symbol, currency.decimals
                );
            }
            if let Some(signer) = self.signer {
                println!("  Signer: {}", signer);
            }
            println!("  Wait Time: {}s", self.wait_time_secs);
        }
    }
}

#[derive(Serialize)]
pub struct CallOutput {
    pub method: String,
    pub outputs: Vec<NamedOutput>,
}

#[derive(Serialize)]
pub struct NamedOutput {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub value: String,
}

impl CallOutput {
    pub fn print(&self, json: bool) {
        if json {
            println!("{}", serde_json::to_string_pretty(self).unwrap());
        } else {
            println!("Call Result: {}", self.method);
            if self.outputs.is_empty() {
                println!("  (no outputs)");
            }
            for (i, output) in self.outputs.iter().enumerate() {
                if output.name.is_empty() {
                    println!("  {}: {}", i, output.value);
                } else {
                    println!("  {}: {}", output.name, output.value);
                }
            }
        }
    }
}

#[derive(Serialize)]
pub struct SubmissionOutput {
    pub tx_hash: TxHash,
}

impl SubmissionOutput {
    pub fn print(&self, json: bool) {
        if json {
            println!("{}", serde_json::to_string_pretty(self).unwrap());
        } else {
            println!("Transaction Sent:");
            println!("  Tx Hash: {}", self.tx_hash);
        }
    }
}

#[derive(Serialize)]
pub struct ReceiptOutput<'a> {
    #[serde(flatten)]
    pub receipt: &'a Receipt,
}

impl ReceiptOutput<'_> {
    pub fn print(&self, json: bool) {
        if json {
            println!("{}", serde_json::to_string_pretty(self).unwrap());
        } else {
            let r = self.receipt;
            println!("Transaction Receipt:");
            println!("  Tx Hash: {}", r.transaction_hash);
            println!("  Success: {}", r.success);
            if let Some(block) = r.block_number {
                println!("  Block: {}", block);
            }
            println!("  Gas Used: {}", r.gas_used);
            if let Some(address) = r.contract_address {
                println!("  Contract Address: {}", address);
            }
        }
    }
}

#[derive(Serialize)]
pub struct SessionSummary {
    pub executions: usize,
}

impl SessionSummary {
    pub fn print(&self, json: bool) {
        if json {
            println!("{}", serde_json::to_string_pretty(self).unwrap());
        } else {
            println!("Bye! ({} executions)", self.executions);
        }
    }
}

/// Renders a session event; problems go to stderr so JSON on stdout stays parseable
pub fn print_report(report: &Report, json: bool) {
    match report {
        Report::CallResult { signature, values } => CallOutput {
            method: signature.clone(),
            outputs: values
                .iter()
                .map(|(name, value)| NamedOutput {
                    name: name.clone(),
                    value: value.to_string(),
                })
                .collect(),
        }
        .print(json),
        Report::TransactionSubmitted { hash } => SubmissionOutput { tx_hash: *hash }.print(json),
        Report::Receipt { receipt } => ReceiptOutput { receipt }.print(json),
        Report::ReceiptUnavailable { hash, reason } => {
            eprintln!("Receipt for {} unavailable: {}", hash, reason)
        }
        Report::Waiting { seconds } => {
            eprintln!("Waiting {}s for the transaction to be mined...", seconds)
        }
        Report::ConnectionFailed { endpoint, reason } => {
            eprintln!("Failed to connect to {}: {}", endpoint, reason)
        }
        Report::ChainIdMismatch {
            configured,
            connected,
        } => eprintln!(
            "Warning: configured chain id {} differs from the node's chain id {}",
            configured, connected
        ),
        Report::NoCode { address, reason } => {
            eprintln!("Invalid contract address {}: {}", address, reason)
        }
        Report::NoMethods { interface, kind } => {
            eprintln!("{} has no {} methods", interface, kind)
        }
        Report::InvalidArgument { parameter, reason } => {
            eprintln!("Invalid {}: {}", parameter, reason)
        }
        Report::EndpointAcquired { endpoint } => eprintln!("Connected to {}", endpoint),
        Report::ChainIdAcquired { chain_id } => eprintln!("Using chain id {}", chain_id),
    }
}
