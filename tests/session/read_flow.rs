//! Read-only calls: connection, address and argument acquisition

use alloy::primitives::U256;
use solizard::abi::compute_selector;
use solizard::{Error, Report, TypedValue};

use crate::common::*;

fn balance_of_script() -> Vec<Answer> {
    let mut answers = open_token();
    answers.extend([
        choose("read"),
        choose("balanceOf(address)"),
        text("0x2222222222222222222222222222222222222222"),
        choose("exit"),
    ]);
    answers
}

fn with_balance(client: MockClient) -> MockClient {
    client.with_state(|s| {
        s.returns
            .insert(compute_selector("balanceOf(address)"), uint_word(1000));
    })
}

#[tokio::test]
async fn test_balance_of_payload_and_result() {
    let registry = registry();
    let client = with_balance(MockClient::new());
    let mut session = session(&registry, &client, balance_of_script());

    let exit = session.run().await.unwrap();
    assert_eq!(exit.executions, 1);

    let state = client.state();
    assert_eq!(state.calls.len(), 1);
    let (to, payload) = &state.calls[0];
    assert_eq!(*to, TOKEN);

    let mut expected = vec![0x70, 0xa0, 0x82, 0x31];
    expected.extend([0u8; 12]);
    expected.extend(HOLDER.as_slice());
    assert_eq!(payload.to_vec(), expected);

    let result = session
        .prompt()
        .reports
        .iter()
        .find_map(|r| match r {
            Report::CallResult { signature, values } => Some((signature.clone(), values.clone())),
            _ => None,
        })
        .expect("call result reported");
    assert_eq!(result.0, "balanceOf(address)");
    assert_eq!(result.1, vec![(String::new(), TypedValue::Uint(U256::from(1000), 256))]);
}

#[tokio::test]
async fn test_new_endpoint_is_reported() {
    let registry = registry();
    let client = with_balance(MockClient::new());
    let mut session = session(&registry, &client, balance_of_script());
    session.run().await.unwrap();

    assert!(session.prompt().reports.contains(&Report::EndpointAcquired {
        endpoint: ENDPOINT.to_string()
    }));
    assert_eq!(session.context().endpoint(), Some(ENDPOINT));
}

#[tokio::test]
async fn test_default_endpoint_is_offered() {
    let registry = registry();
    let client = with_balance(MockClient::new());
    let mut answers = balance_of_script();
    answers[1] = text("");
    let mut session = session(&registry, &client, answers);

    session.run().await.unwrap();
    assert_eq!(client.state().connect_attempts, vec![ENDPOINT.to_string()]);
}

#[tokio::test]
async fn test_unreachable_endpoint_reprompts() {
    let registry = registry();
    let client = with_balance(MockClient::new());
    let mut answers = balance_of_script();
    answers.insert(1, text("http://10.0.0.1:8545"));
    let mut session = session(&registry, &client, answers);

    session.run().await.unwrap();

    assert_eq!(
        client.state().connect_attempts,
        vec!["http://10.0.0.1:8545".to_string(), ENDPOINT.to_string()]
    );
    assert!(session
        .prompt()
        .reports
        .iter()
        .any(|r| matches!(r, Report::ConnectionFailed { endpoint, .. } if endpoint == "http://10.0.0.1:8545")));
}

#[tokio::test]
async fn test_address_without_code_reprompts() {
    let registry = registry();
    let client = with_balance(MockClient::new());
    let mut answers = balance_of_script();
    answers.insert(2, text("0x3333333333333333333333333333333333333333"));
    let mut session = session(&registry, &client, answers);

    session.run().await.unwrap();

    assert!(session
        .prompt()
        .reports
        .iter()
        .any(|r| matches!(r, Report::NoCode { address, .. } if *address == EMPTY)));
    assert_eq!(client.state().calls[0].0, TOKEN);
}

#[tokio::test]
async fn test_malformed_address_reprompts() {
    let registry = registry();
    let client = with_balance(MockClient::new());
    let mut answers = balance_of_script();
    answers.insert(2, text("0x1234"));
    let mut session = session(&registry, &client, answers);

    let exit = session.run().await.unwrap();
    assert_eq!(exit.executions, 1);
    assert!(session
        .prompt()
        .reports
        .iter()
        .any(|r| matches!(r, Report::InvalidArgument { parameter, .. } if parameter == "contract address")));
}

#[tokio::test]
async fn test_bad_argument_reprompts_same_parameter() {
    let registry = registry();
    let client = with_balance(MockClient::new());
    let mut answers = balance_of_script();
    // The holder argument comes right after the method choice
    answers.insert(5, text("not-an-address"));
    let mut session = session(&registry, &client, answers);

    let exit = session.run().await.unwrap();
    assert_eq!(exit.executions, 1);

    let asked = &session.prompt().asked;
    let owner_prompts = asked.iter().filter(|l| *l == "owner (address)").count();
    assert_eq!(owner_prompts, 2);
    assert!(session
        .prompt()
        .reports
        .iter()
        .any(|r| matches!(r, Report::InvalidArgument { parameter, .. } if parameter == "owner (address)")));
}

#[tokio::test]
async fn test_reverted_call_is_fatal() {
    let registry = registry();
    let client = MockClient::new();
    let mut session = session(&registry, &client, balance_of_script());

    let err = session.run().await.unwrap_err();
    assert!(matches!(err, Error::ChainCall(_)));
}

#[tokio::test]
async fn test_undecodable_output_is_fatal() {
    let registry = registry();
    let client = MockClient::new().with_state(|s| {
        s.returns.insert(
            compute_selector("balanceOf(address)"),
            vec![0x01, 0x02].into(),
        );
    });
    let mut session = session(&registry, &client, balance_of_script());

    let err = session.run().await.unwrap_err();
    assert!(matches!(err, Error::Decoding(_)));
}

#[tokio::test]
async fn test_address_book_offer_is_used() {
    let registry = registry();
    let client = with_balance(MockClient::new());
    let book = MemoryBook::with(&[("Token", TOKEN)]);

    let answers = vec![
        choose("Token"),
        text(ENDPOINT),
        confirm(true),
        choose("read"),
        choose("balanceOf(address)"),
        text("0x2222222222222222222222222222222222222222"),
        choose("exit"),
    ];
    let mut session = session(&registry, &client, answers).with_address_book(book.clone());

    session.run().await.unwrap();
    assert!(!session.prompt().asked.contains(&"Contract address".to_string()));
    assert_eq!(book.entries().len(), 1);
}

#[tokio::test]
async fn test_typed_address_is_remembered_once() {
    let registry = registry();
    let client = with_balance(MockClient::new());
    let book = MemoryBook::default();

    let mut answers = open_token();
    answers.extend([
        choose("read"),
        choose("balanceOf(address)"),
        text("0x2222222222222222222222222222222222222222"),
        choose("select method"),
        choose("read"),
        choose("balanceOf(address)"),
        text("0x2222222222222222222222222222222222222222"),
        choose("exit"),
    ]);
    let mut session = session(&registry, &client, answers).with_address_book(book.clone());

    let exit = session.run().await.unwrap();
    assert_eq!(exit.executions, 2);
    assert_eq!(book.entries(), vec![("Token".to_string(), TOKEN)]);
}

#[tokio::test]
async fn test_declined_address_book_falls_back_to_prompt() {
    let registry = registry();
    let client = with_balance(MockClient::new());
    let book = MemoryBook::with(&[("Token", EMPTY)]);

    let answers = vec![
        choose("Token"),
        text(ENDPOINT),
        confirm(false),
        text("0x1111111111111111111111111111111111111111"),
        choose("read"),
        choose("balanceOf(address)"),
        text("0x2222222222222222222222222222222222222222"),
        choose("exit"),
    ];
    let mut session = session(&registry, &client, answers).with_address_book(book.clone());

    session.run().await.unwrap();
    assert_eq!(
        book.entries(),
        vec![("Token".to_string(), EMPTY), ("Token".to_string(), TOKEN)]
    );
}
