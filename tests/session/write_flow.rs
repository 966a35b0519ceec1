//! Signed transactions: key and chain id acquisition, submission and receipts

use alloy::consensus::TxEnvelope;
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::U256;
use solizard::abi::compute_selector;
use solizard::session::SessionContext;
use solizard::validation::parse_private_key;
use solizard::{Error, Report, Settings, GAS_LIMIT};

use crate::common::*;

fn transfer_script() -> Vec<Answer> {
    let mut answers = open_token();
    answers.extend([
        choose("write"),
        text(KEY),
        text("31337"),
        choose("transfer(address,uint256)"),
        text("0x2222222222222222222222222222222222222222"),
        text("250"),
        choose("exit"),
    ]);
    answers
}

fn decode_sent(client: &MockClient) -> alloy::consensus::Signed<alloy::consensus::TxLegacy> {
    let state = client.state();
    assert_eq!(state.sent.len(), 1);
    match TxEnvelope::decode_2718(&mut &state.sent[0].raw[..]).unwrap() {
        TxEnvelope::Legacy(signed) => signed,
        other => panic!("Expected legacy transaction, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transfer_signs_with_held_chain_id() {
    let registry = registry();
    let signer = parse_private_key(KEY).unwrap().address();
    let client = MockClient::new().with_state(|s| {
        s.nonces.insert(signer, 7);
    });
    let mut session = session(&registry, &client, transfer_script());

    let exit = session.run().await.unwrap();
    assert_eq!(exit.executions, 1);

    let signed = decode_sent(&client);
    let tx = signed.tx();
    assert_eq!(tx.chain_id, Some(31337));
    assert_eq!(tx.nonce, 7);
    assert_eq!(tx.gas_limit, GAS_LIMIT);
    assert_eq!(tx.gas_price, 1_000_000_000);
    assert_eq!(tx.value, U256::ZERO);
    assert_eq!(tx.to.to(), Some(&TOKEN));
    assert_eq!(tx.input[..4], compute_selector("transfer(address,uint256)"));

    assert_eq!(client.state().nonce_queries, vec![signer]);

    let hash = *signed.hash();
    let reports = &session.prompt().reports;
    assert!(reports.contains(&Report::TransactionSubmitted { hash }));
    assert!(reports.contains(&Report::ChainIdAcquired { chain_id: 31337 }));
    assert!(reports
        .iter()
        .any(|r| matches!(r, Report::Receipt { receipt } if receipt.transaction_hash == hash)));
}

#[tokio::test]
async fn test_key_is_asked_once_per_run() {
    let registry = registry();
    let client = MockClient::new();

    let mut answers = transfer_script();
    answers.pop();
    answers.extend([
        choose("select method"),
        choose("write"),
        choose("transfer(address,uint256)"),
        text("0x2222222222222222222222222222222222222222"),
        text("1"),
        choose("exit"),
    ]);
    let mut session = session(&registry, &client, answers);

    let exit = session.run().await.unwrap();
    assert_eq!(exit.executions, 2);
    assert_eq!(client.state().sent.len(), 2);

    let key_prompts = session
        .prompt()
        .asked
        .iter()
        .filter(|l| *l == "Private key")
        .count();
    assert_eq!(key_prompts, 1);
}

#[tokio::test]
async fn test_invalid_key_and_chain_id_reprompt() {
    let registry = registry();
    let client = MockClient::new();

    let mut answers = transfer_script();
    answers.insert(4, text("0x1234"));
    answers.insert(6, text("0"));
    let mut session = session(&registry, &client, answers);

    session.run().await.unwrap();

    let invalid: Vec<_> = session
        .prompt()
        .reports
        .iter()
        .filter_map(|r| match r {
            Report::InvalidArgument { parameter, .. } => Some(parameter.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(invalid, vec!["private key", "chain id"]);
    assert_eq!(session.context().chain_id(), 31337);
}

#[tokio::test]
async fn test_missing_receipt_is_not_fatal() {
    let registry = registry();
    let client = MockClient::new().with_state(|s| s.mined = false);
    let mut session = session(&registry, &client, transfer_script());

    let exit = session.run().await.unwrap();
    assert_eq!(exit.executions, 1);
    assert!(session
        .prompt()
        .reports
        .iter()
        .any(|r| matches!(r, Report::ReceiptUnavailable { .. })));
}

#[tokio::test]
async fn test_nonce_failure_is_fatal() {
    let registry = registry();
    let client = MockClient::new().with_state(|s| s.fail_nonce = true);
    let mut session = session(&registry, &client, transfer_script());

    let err = session.run().await.unwrap_err();
    assert!(matches!(err, Error::Submission(_)));
    assert!(client.state().sent.is_empty());
}

#[tokio::test]
async fn test_payable_method_asks_for_value() {
    let registry = registry();
    let client = MockClient::new();

    let mut answers = open_token();
    answers.extend([
        choose("write"),
        text(KEY),
        text("1"),
        choose("deposit()"),
        text("1000000000000000000"),
        choose("exit"),
    ]);
    let mut session = session(&registry, &client, answers);
    session.run().await.unwrap();

    let signed = decode_sent(&client);
    assert_eq!(signed.tx().value, U256::from(10u64.pow(18)));
    assert_eq!(signed.tx().chain_id, Some(1));
    assert_eq!(signed.tx().input.to_vec(), compute_selector("deposit()").to_vec());
}

#[tokio::test]
async fn test_settings_skip_prompts() {
    let registry = registry();
    let client = MockClient::new();
    let context = SessionContext::from_settings(&Settings {
        rpc_url: Some(ENDPOINT.to_string()),
        private_key: Some(KEY.to_string()),
        chain_id: Some(31337),
    });

    let answers = vec![
        choose("Token"),
        text("0x1111111111111111111111111111111111111111"),
        choose("write"),
        choose("transfer(address,uint256)"),
        text("0x2222222222222222222222222222222222222222"),
        text("5"),
        choose("exit"),
    ];
    let mut session = session(&registry, &client, answers).with_context(context);

    session.run().await.unwrap();

    let asked = &session.prompt().asked;
    assert!(!asked.contains(&"RPC URL".to_string()));
    assert!(!asked.contains(&"Private key".to_string()));
    assert!(!asked.contains(&"Chain id".to_string()));
    assert!(!session
        .prompt()
        .reports
        .iter()
        .any(|r| matches!(r, Report::EndpointAcquired { .. })));
    assert_eq!(decode_sent(&client).tx().chain_id, Some(31337));
}

#[tokio::test]
async fn test_chain_id_mismatch_is_reported_and_not_fatal() {
    let registry = registry();
    let client = MockClient::new();
    let context = SessionContext::from_settings(&Settings {
        rpc_url: Some(ENDPOINT.to_string()),
        private_key: Some(KEY.to_string()),
        chain_id: Some(1),
    });

    let answers = vec![
        choose("Token"),
        text("0x1111111111111111111111111111111111111111"),
        choose("write"),
        choose("transfer(address,uint256)"),
        text("0x2222222222222222222222222222222222222222"),
        text("5"),
        choose("exit"),
    ];
    let mut session = session(&registry, &client, answers).with_context(context);

    let exit = session.run().await.unwrap();
    assert_eq!(exit.executions, 1);

    let mismatches: Vec<_> = session
        .prompt()
        .reports
        .iter()
        .filter(|r| matches!(r, Report::ChainIdMismatch { .. }))
        .collect();
    assert_eq!(
        mismatches,
        vec![&Report::ChainIdMismatch {
            configured: 1,
            connected: 31337,
        }]
    );
    assert_eq!(session.context().chain_id(), 1);
    assert_eq!(decode_sent(&client).tx().chain_id, Some(1));
}

#[tokio::test]
async fn test_matching_chain_id_is_not_reported() {
    let registry = registry();
    let client = MockClient::new();
    let context = SessionContext::from_settings(&Settings {
        rpc_url: Some(ENDPOINT.to_string()),
        chain_id: Some(31337),
        ..Default::default()
    });

    let answers = vec![
        choose("Token"),
        text("0x1111111111111111111111111111111111111111"),
    ];
    let mut session = session(&registry, &client, answers).with_context(context);

    // Script ends at method selection
    assert!(session.run().await.is_err());
    assert!(!session
        .prompt()
        .reports
        .iter()
        .any(|r| matches!(r, Report::ChainIdMismatch { .. })));
}

#[tokio::test]
async fn test_unreachable_configured_endpoint_falls_back_to_prompt() {
    let registry = registry();
    let client = MockClient::new();
    let context = SessionContext::from_settings(&Settings {
        rpc_url: Some("http://10.0.0.1:8545".to_string()),
        ..Default::default()
    });

    let answers = vec![
        choose("Token"),
        text(ENDPOINT),
        text("0x1111111111111111111111111111111111111111"),
        choose("exit"),
    ];
    let mut session = session(&registry, &client, answers).with_context(context);

    // Script ends at method selection
    let err = session.run().await.unwrap_err();
    assert!(matches!(err, Error::Prompt(_)));
    assert_eq!(
        client.state().connect_attempts,
        vec!["http://10.0.0.1:8545".to_string(), ENDPOINT.to_string()]
    );
    assert_eq!(session.context().endpoint(), Some(ENDPOINT));
}
