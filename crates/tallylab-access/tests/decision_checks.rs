//! Each append check, exercised on its own against otherwise passing inputs.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tallylab_access::{
    AccessController, AccessDecision, AccessError, Denial, LogEntry, TallyLabAccessController,
};
use tallylab_crypto::Signature;
use tallylab_identity::{IdentityVerifier, Keystore, TallyLabIdentityProvider};
use tallylab_test::{MockVerifier, TestNode, init_test_logging, test_entry, test_payload};

fn owned_controller(node: &TestNode) -> TallyLabAccessController {
    node.controller([node.identity.id.clone()])
}

#[tokio::test]
async fn all_checks_pass_allows() {
    init_test_logging();
    let node = TestNode::new();
    let controller = owned_controller(&node);
    let entry = test_entry(&node.identity);

    assert_eq!(
        controller.evaluate(&entry, node.verifier()).await.unwrap(),
        AccessDecision::Allow
    );
    assert!(controller.can_append(&entry, node.verifier()).await.unwrap());
}

#[tokio::test]
async fn tampered_identity_fails_verification_alone() {
    let node = TestNode::new();
    let controller = owned_controller(&node);

    // Same id, so origin, write-set and key possession all still pass.
    let mut identity = node.identity.clone();
    identity.signatures.public_key = Signature::from_bytes([7u8; 64]);
    let entry = test_entry(&identity);

    assert!(controller.is_local_origin(&identity));
    assert!(node.verifier().has_local_key(&identity.id).await.unwrap());
    assert_eq!(
        controller.evaluate(&entry, node.verifier()).await.unwrap(),
        AccessDecision::Deny(Denial::VerificationFailure)
    );
    assert!(!controller.can_append(&entry, node.verifier()).await.unwrap());
}

#[tokio::test]
async fn missing_identity_is_a_verification_failure() {
    let node = TestNode::new();
    let controller = owned_controller(&node);
    let entry = LogEntry {
        identity: None,
        payload: test_payload(),
    };

    assert_eq!(
        controller.evaluate(&entry, node.verifier()).await.unwrap(),
        AccessDecision::Deny(Denial::VerificationFailure)
    );
}

#[tokio::test]
async fn foreign_origin_denies_alone() {
    let node = TestNode::new();
    let controller = owned_controller(&node);

    // Issued on this node, so it verifies and its key is held locally.
    let other = node.issue_local_identity();
    let entry = test_entry(&other);

    assert!(node.verifier().verify_identity(&other).await.unwrap());
    assert!(node.verifier().has_local_key(&other.id).await.unwrap());
    assert_eq!(
        controller.evaluate(&entry, node.verifier()).await.unwrap(),
        AccessDecision::Deny(Denial::ForeignOrigin)
    );
}

#[tokio::test]
async fn unauthorized_writer_denies_alone() {
    let node = TestNode::new();
    let other = node.issue_local_identity();
    let controller = node.controller([other.id.clone()]);
    let entry = test_entry(&node.identity);

    assert_eq!(
        controller.evaluate(&entry, node.verifier()).await.unwrap(),
        AccessDecision::Deny(Denial::UnauthorizedWriter)
    );
}

#[tokio::test]
async fn key_not_locally_held_denies_alone() {
    let node = TestNode::new();
    let controller = owned_controller(&node);
    let entry = test_entry(&node.identity);

    // A verifier over a keystore that never saw this identity.
    let elsewhere = TallyLabIdentityProvider::new(Arc::new(Keystore::in_memory()));
    assert!(elsewhere.verify_identity(&node.identity).await.unwrap());

    assert_eq!(
        controller.evaluate(&entry, &elsewhere).await.unwrap(),
        AccessDecision::Deny(Denial::KeyNotLocallyHeld)
    );
    assert!(!controller.can_append(&entry, &elsewhere).await.unwrap());
}

#[tokio::test]
async fn verification_runs_first() {
    let node = TestNode::new();
    let controller = node.controller(Vec::<String>::new());
    let verifier = MockVerifier::new().rejecting_signatures();

    let decision = controller
        .evaluate(&test_entry(&node.identity), &verifier)
        .await
        .unwrap();

    assert_eq!(decision, AccessDecision::Deny(Denial::VerificationFailure));
    assert_eq!(verifier.calls(), vec![format!("verify:{}", node.identity.id)]);
}

#[tokio::test]
async fn verifier_errors_are_not_decisions() {
    let node = TestNode::new();
    let controller = owned_controller(&node);
    let entry = test_entry(&node.identity);

    let failing_verify = MockVerifier::new().failing_verification();
    assert!(matches!(
        controller.can_append(&entry, &failing_verify).await,
        Err(AccessError::Identity(_))
    ));

    let failing_lookup = MockVerifier::new().failing_key_lookup();
    assert!(matches!(
        controller.can_append(&entry, &failing_lookup).await,
        Err(AccessError::Identity(_))
    ));
}

#[tokio::test]
async fn removing_writer_revokes_approval() {
    let node = TestNode::new();
    let entry = test_entry(&node.identity);
    let other = node.issue_local_identity();

    let with_writer = node.controller([node.identity.id.clone(), other.id.clone()]);
    let without_writer = node.controller([other.id.clone()]);

    assert!(with_writer.can_append(&entry, node.verifier()).await.unwrap());
    assert!(!without_writer.can_append(&entry, node.verifier()).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_decisions_are_independent() {
    let node = TestNode::new();
    let controller = Arc::new(owned_controller(&node));
    let verifier = MockVerifier::new().with_delay(Duration::from_millis(5));
    let foreign = node.issue_local_identity();

    let cases: Vec<(LogEntry, AccessDecision)> = std::iter::repeat_n(
        [
            (test_entry(&node.identity), AccessDecision::Allow),
            (
                test_entry(&foreign),
                AccessDecision::Deny(Denial::ForeignOrigin),
            ),
        ],
        16,
    )
    .flatten()
    .collect();

    let decisions = join_all(
        cases
            .iter()
            .map(|(entry, _)| controller.evaluate(entry, &verifier)),
    )
    .await;

    for (i, (decision, (_, expected))) in decisions.into_iter().zip(&cases).enumerate() {
        assert_eq!(decision.unwrap(), *expected, "entry {i}");
    }
}

#[tokio::test]
async fn abandoned_decision_is_not_an_approval() {
    let node = TestNode::new();
    let controller = owned_controller(&node);
    let slow = MockVerifier::new().with_delay(Duration::from_secs(5));
    let entry = test_entry(&node.identity);

    let outcome =
        tokio::time::timeout(Duration::from_millis(20), controller.can_append(&entry, &slow)).await;
    let approved = matches!(outcome, Ok(Ok(true)));
    assert!(!approved);
}
