//! Fallback loop behavior against a scripted model client
//!
//! These tests drive the dispatcher with an in-process [`ModelClient`]
//! whose outcome is scripted per decrypted key, so ordering, short-circuit
//! and aggregation behavior can be checked without any network.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use keywarden_core::dispatch::wire::GenerateRequest;
use keywarden_core::{
    AttemptFailure, AttemptOutcome, CredentialCipher, DispatchError, Dispatcher, MasterKey,
    MemoryRepository, ModelClient, SecretString, TenantRepository, TenantStore,
};

/// Model client that answers from a per-key script and records every
/// attempt in order
struct ScriptedClient {
    outcomes: HashMap<String, AttemptOutcome>,
    attempts: Mutex<Vec<String>>,
    seen_instructions: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(outcomes: Vec<(&str, AttemptOutcome)>) -> Self {
        Self {
            outcomes: outcomes
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            attempts: Mutex::new(Vec::new()),
            seen_instructions: Mutex::new(Vec::new()),
        }
    }

    fn attempted_keys(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    fn seen_instructions(&self) -> Vec<String> {
        self.seen_instructions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn generate(&self, api_key: &SecretString, request: &GenerateRequest) -> AttemptOutcome {
        let key = api_key.to_str().unwrap().to_string();
        self.attempts.lock().unwrap().push(key.clone());
        self.seen_instructions
            .lock()
            .unwrap()
            .push(request.system_instruction.parts[0].text.clone());

        self.outcomes
            .get(&key)
            .cloned()
            .unwrap_or(AttemptOutcome::Failed(AttemptFailure::Network(
                "unscripted key".to_string(),
            )))
    }
}

fn test_cipher() -> CredentialCipher {
    let key = MasterKey::from_hex(&"11".repeat(32)).unwrap();
    CredentialCipher::new(&key)
}

fn build(client: Arc<ScriptedClient>) -> (Arc<TenantStore>, Dispatcher) {
    let store = Arc::new(TenantStore::new(
        Arc::new(MemoryRepository::new()),
        test_cipher(),
    ));
    let dispatcher = Dispatcher::new(store.clone(), client);
    (store, dispatcher)
}

#[tokio::test]
async fn zero_credentials_fails_without_any_attempt() {
    let client = Arc::new(ScriptedClient::new(vec![]));
    let (_store, dispatcher) = build(client.clone());

    let result = dispatcher.dispatch("g1", "hi").await;
    assert!(matches!(
        result,
        Err(DispatchError::NoCredentialsConfigured)
    ));
    assert!(client.attempted_keys().is_empty());
}

#[tokio::test]
async fn first_success_short_circuits() {
    let client = Arc::new(ScriptedClient::new(vec![
        (
            "k1",
            AttemptOutcome::Failed(AttemptFailure::Status(403)),
        ),
        ("k2", AttemptOutcome::Success("answer".to_string())),
        ("k3", AttemptOutcome::Success("never used".to_string())),
    ]));
    let (store, dispatcher) = build(client.clone());

    for key in ["k1", "k2", "k3"] {
        store.add_credential("g1", key).await.unwrap();
    }

    let result = dispatcher.dispatch("g1", "hi").await.unwrap();
    assert_eq!(result, "answer");
    assert_eq!(client.attempted_keys(), vec!["k1", "k2"]);
}

#[tokio::test]
async fn mixed_failures_then_success() {
    // K1 fails with a network error, K2 with an empty result, K3 succeeds
    let client = Arc::new(ScriptedClient::new(vec![
        (
            "k1",
            AttemptOutcome::Failed(AttemptFailure::Network("connection refused".to_string())),
        ),
        ("k2", AttemptOutcome::Failed(AttemptFailure::Empty)),
        ("k3", AttemptOutcome::Success("hello".to_string())),
    ]));
    let (store, dispatcher) = build(client.clone());

    for key in ["k1", "k2", "k3"] {
        store.add_credential("G1", key).await.unwrap();
    }

    let result = dispatcher.dispatch("G1", "payload").await.unwrap();
    assert_eq!(result, "hello");
    assert_eq!(client.attempted_keys(), vec!["k1", "k2", "k3"]);
}

#[tokio::test]
async fn exhaustion_reports_attempts_and_last_failure() {
    let client = Arc::new(ScriptedClient::new(vec![
        (
            "k1",
            AttemptOutcome::Failed(AttemptFailure::Status(500)),
        ),
        (
            "k2",
            AttemptOutcome::Failed(AttemptFailure::Api("quota exceeded".to_string())),
        ),
        ("k3", AttemptOutcome::Failed(AttemptFailure::Empty)),
    ]));
    let (store, dispatcher) = build(client.clone());

    for key in ["k1", "k2", "k3"] {
        store.add_credential("g1", key).await.unwrap();
    }

    let err = dispatcher.dispatch("g1", "hi").await.unwrap_err();
    match err {
        DispatchError::AllCredentialsFailed { attempts, last } => {
            assert_eq!(attempts, 3);
            assert!(last.contains("empty"));
        }
        other => panic!("expected AllCredentialsFailed, got {other:?}"),
    }
    // Every key was attempted exactly once, in stored order
    assert_eq!(client.attempted_keys(), vec!["k1", "k2", "k3"]);
}

#[tokio::test]
async fn corrupted_blob_advances_to_next_key() {
    let client = Arc::new(ScriptedClient::new(vec![(
        "k2",
        AttemptOutcome::Success("recovered".to_string()),
    )]));

    let repo = Arc::new(MemoryRepository::new());
    let store = Arc::new(TenantStore::new(repo.clone(), test_cipher()));
    let dispatcher = Dispatcher::new(store.clone(), client.clone());

    // First entry is garbage that will fail decryption, second is valid
    repo.push_credential("g1", "deadbeef").await.unwrap();
    store.add_credential("g1", "k2").await.unwrap();

    let result = dispatcher.dispatch("g1", "hi").await.unwrap();
    assert_eq!(result, "recovered");
    assert_eq!(client.attempted_keys(), vec!["k2"]);
}

#[tokio::test]
async fn default_persona_used_when_instruction_unset() {
    let client = Arc::new(ScriptedClient::new(vec![(
        "k1",
        AttemptOutcome::Success("ok".to_string()),
    )]));
    let (store, dispatcher) = build(client.clone());
    store.add_credential("g1", "k1").await.unwrap();

    dispatcher.dispatch("g1", "hi").await.unwrap();

    let seen = client.seen_instructions();
    assert!(seen[0].contains("Warden"));
}

#[tokio::test]
async fn tenant_instruction_overrides_default() {
    let client = Arc::new(ScriptedClient::new(vec![(
        "k1",
        AttemptOutcome::Success("ok".to_string()),
    )]));
    let (store, dispatcher) = build(client.clone());
    store.add_credential("g1", "k1").await.unwrap();
    store
        .set_instruction_text("g1", "speak only in riddles")
        .await
        .unwrap();

    dispatcher.dispatch("g1", "hi").await.unwrap();

    let seen = client.seen_instructions();
    assert_eq!(seen[0], "speak only in riddles");
}
