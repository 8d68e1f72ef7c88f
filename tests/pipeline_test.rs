//! End-to-end pipeline behaviour against a scripted node.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use tzkit::blockchain::{
    BlockchainError, Limits, OperationKind, PendingOperation, ResultHandlers, Tez, TezosRpc,
    TransferRequest,
};
use tzkit::crypto::{base58, prefix, Watermark};
use tzkit::keys::SigningCapability;
use tzkit::lifecycle::Cancellation;
use tzkit::wallet::{AccountProvider, SeedWallet};

mod common;
use common::{rpc_with, Call, ScriptedGateway, DESTINATION, FORGED_HEX, OP_HASH, SOURCE};

fn transfer() -> TransferRequest {
    TransferRequest::new(DESTINATION, "1.5".parse::<Tez>().unwrap())
        .with_fee("0.001".parse().unwrap())
}

#[tokio::test]
async fn test_revealed_account_single_transfer() {
    let gateway = Arc::new(ScriptedGateway::new(41, Some("sppkRevealed")));
    let rpc = rpc_with(gateway.clone());

    let outcome = rpc.send_transaction(0, &transfer()).await.unwrap();

    let contents = gateway.forged_contents();
    assert_eq!(contents.len(), 1);
    let PendingOperation::Transaction(tx) = &contents[0] else {
        panic!("expected a transaction, got {:?}", contents[0]);
    };
    assert_eq!(tx.counter, 42);
    assert_eq!(tx.amount, 1_500_000);
    assert_eq!(tx.fee, 1_000);
    assert_eq!(tx.source, SOURCE);
    assert_eq!(tx.destination, DESTINATION);

    let wire = serde_json::to_value(&contents[0]).unwrap();
    assert_eq!(wire["amount"], "1500000");
    assert_eq!(wire["counter"], "42");

    assert!(outcome.injected());
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].operation_hash.as_deref(), Some(OP_HASH));
    assert_eq!(outcome.results[0].data["op_hash"], OP_HASH);
}

#[tokio::test]
async fn test_unrevealed_account_gets_reveal_first() {
    let gateway = Arc::new(ScriptedGateway::new(41, None));
    let rpc = rpc_with(gateway.clone());

    let outcome = rpc.send_transaction(0, &transfer()).await.unwrap();

    let contents = gateway.forged_contents();
    assert_eq!(contents.len(), 2);
    let PendingOperation::Reveal(reveal) = &contents[0] else {
        panic!("expected reveal first");
    };
    assert_eq!(reveal.fee, 0);
    assert_eq!(reveal.counter, 42);
    assert!(reveal.public_key.starts_with("sppk"));
    assert_eq!(serde_json::to_value(&contents[0]).unwrap()["fee"], "0");
    assert_eq!(contents[1].kind(), OperationKind::Transaction);
    assert_eq!(contents[1].counter(), Some(43));

    // Only the last result carries the hash.
    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.results[0].operation_hash, None);
    assert!(outcome.results[0].data.get("op_hash").is_none());
    assert_eq!(outcome.results[1].operation_hash.as_deref(), Some(OP_HASH));
}

#[tokio::test]
async fn test_calls_run_in_order() {
    let gateway = Arc::new(ScriptedGateway::new(1, Some("sppk")));
    rpc_with(gateway.clone())
        .send_transaction(0, &transfer())
        .await
        .unwrap();

    let calls = gateway.calls();
    assert_eq!(calls.len(), 6);
    assert_eq!(calls[0], Call::Header);
    assert!(matches!(&calls[1], Call::Account { address, .. } if address == SOURCE));
    assert!(matches!(calls[2], Call::ManagerKey { .. }));
    assert!(matches!(calls[3], Call::Forge { .. }));
    assert!(matches!(&calls[4], Call::Preapply { protocol, .. } if protocol == "PtTestProtocol"));
    assert!(matches!(calls[5], Call::Inject { .. }));
}

#[tokio::test]
async fn test_signature_covers_generic_watermarked_forge() {
    let gateway = Arc::new(ScriptedGateway::new(1, Some("sppk")));
    let rpc = rpc_with(gateway.clone());
    rpc.send_transaction(0, &transfer()).await.unwrap();

    let calls = gateway.calls();
    let signature = calls
        .iter()
        .find_map(|c| match c {
            Call::Preapply { signature, .. } => Some(signature.clone()),
            _ => None,
        })
        .unwrap();
    let signed_bytes = calls
        .iter()
        .find_map(|c| match c {
            Call::Inject { signed_bytes } => Some(signed_bytes.clone()),
            _ => None,
        })
        .unwrap();

    let raw = base58::decode(&signature, prefix::SPSIG1).unwrap();
    assert_eq!(signed_bytes, format!("{}{}", FORGED_HEX, hex::encode(&raw)));

    let account = common::test_wallet().account(0).unwrap();
    let payload = Watermark::apply(Some(Watermark::Generic), &hex::decode(FORGED_HEX).unwrap());
    let public_key = account.decrypted_public_key();
    assert!(account.keys().verify(&payload, &raw, &public_key));
}

#[tokio::test]
async fn test_failed_preapply_is_never_injected() {
    let gateway = Arc::new(ScriptedGateway::new(41, None).with_statuses(&["applied", "failed"]));
    let rpc = rpc_with(gateway.clone());

    let outcome = rpc.send_transaction(0, &transfer()).await.unwrap();

    assert!(!gateway.injected());
    assert!(!outcome.injected());
    assert!(!outcome.all_succeeded());
    assert!(outcome.results[0].succeeded);
    assert!(!outcome.results[1].succeeded);
    assert_eq!(outcome.results[1].status, "failed");
    assert!(outcome.results.iter().all(|r| r.operation_hash.is_none()));
}

#[tokio::test]
async fn test_single_failed_operation_blocks_injection() {
    let gateway = Arc::new(ScriptedGateway::new(41, Some("sppk")).with_statuses(&["failed"]));
    let outcome = rpc_with(gateway.clone())
        .send_transaction(0, &transfer())
        .await
        .unwrap();

    assert_eq!(outcome.results.len(), 1);
    assert!(!outcome.results[0].succeeded);
    assert!(!gateway.injected());
}

#[tokio::test]
async fn test_oversized_error_strings_blanked() {
    let long = "p".repeat(1001);
    let short = "q".repeat(1000);
    let response = json!([{
        "contents": [{
            "kind": "transaction",
            "metadata": {"operation_result": {
                "status": "failed",
                "errors": [
                    {"kind": "temporary", "id": "proto.michelson_v1.script_rejected", "contractCode": long},
                    {"kind": "permanent", "location": short}
                ]
            }}
        }]
    }]);
    let gateway = Arc::new(ScriptedGateway::new(41, Some("sppk")).with_preapply_response(response));

    let outcome = rpc_with(gateway.clone())
        .send_transaction(0, &transfer())
        .await
        .unwrap();

    let errors = &outcome.results[0].data["metadata"]["operation_result"]["errors"];
    assert_eq!(errors[0]["contractCode"], "");
    assert_eq!(errors[0]["id"], "proto.michelson_v1.script_rejected");
    assert_eq!(errors[1]["location"].as_str().unwrap().len(), 1000);
    assert!(!gateway.injected());
}

#[tokio::test]
async fn test_unknown_kinds_are_dropped() {
    let response = json!([{
        "contents": [
            {"kind": "transaction", "metadata": {"operation_result": {"status": "applied"}}},
            {"kind": "smart_rollup_publish", "metadata": {"operation_result": {"status": "applied"}}},
            {"metadata": {}}
        ]
    }]);
    let gateway = Arc::new(ScriptedGateway::new(41, Some("sppk")).with_preapply_response(response));

    let outcome = rpc_with(gateway.clone())
        .send_transaction(0, &transfer())
        .await
        .unwrap();

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].kind(), OperationKind::Transaction);
    assert!(gateway.injected());
}

#[tokio::test]
async fn test_preapply_without_contents_is_never_injected() {
    let gateway = Arc::new(
        ScriptedGateway::new(41, Some("sppk")).with_preapply_response(json!([{"id": "proto.error"}])),
    );
    let err = rpc_with(gateway.clone())
        .send_transaction(0, &transfer())
        .await
        .unwrap_err();
    assert!(matches!(err, BlockchainError::Parse(_)));
    assert!(!gateway.injected());

    let gateway = Arc::new(ScriptedGateway::new(41, Some("sppk")).with_preapply_response(json!([])));
    let err = rpc_with(gateway.clone())
        .send_transaction(0, &transfer())
        .await
        .unwrap_err();
    assert!(matches!(err, BlockchainError::Parse(_)));
    assert!(!gateway.injected());
}

#[tokio::test]
async fn test_non_hex_forge_is_parse_error() {
    let gateway = Arc::new(ScriptedGateway::new(41, Some("sppk")).with_forged("<html>bad gateway</html>"));
    let err = rpc_with(gateway.clone())
        .send_transaction(0, &transfer())
        .await
        .unwrap_err();
    assert!(matches!(err, BlockchainError::Parse(_)), "got {err:?}");
    assert!(!gateway.calls().iter().any(|c| matches!(c, Call::Preapply { .. })));
    assert!(!gateway.injected());
}

#[tokio::test]
async fn test_batch_counters_and_reveal_limits() {
    let gateway = Arc::new(ScriptedGateway::new(41, None));
    let rpc = rpc_with(gateway.clone());
    let transfers = vec![
        transfer().with_gas_limit(1_500),
        TransferRequest::new(DESTINATION, Tez::from_mutez(1)),
    ];
    let reveal_limits = Limits {
        gas_limit: Some(10_000),
        storage_limit: Some(257),
    };

    let outcome = rpc.send_transactions(0, &transfers, reveal_limits).await.unwrap();
    assert_eq!(outcome.results.len(), 3);

    let contents = gateway.forged_contents();
    let counters: Vec<_> = contents.iter().filter_map(PendingOperation::counter).collect();
    assert_eq!(counters, vec![42, 43, 44]);

    let PendingOperation::Reveal(reveal) = &contents[0] else {
        panic!("expected reveal first");
    };
    assert_eq!((reveal.gas_limit, reveal.storage_limit), (10_000, 257));
    let PendingOperation::Transaction(first) = &contents[1] else {
        panic!("expected transaction");
    };
    assert_eq!(first.gas_limit, 1_500);
    let PendingOperation::Transaction(second) = &contents[2] else {
        panic!("expected transaction");
    };
    assert_eq!((second.gas_limit, second.storage_limit, second.amount), (200, 0, 1));
}

#[tokio::test]
async fn test_no_wallet_fails_before_io() {
    let gateway = Arc::new(ScriptedGateway::new(41, None));
    let rpc = TezosRpc::new(gateway.clone(), ResultHandlers::default(), None);

    let err = rpc.send_transaction(0, &transfer()).await.unwrap_err();
    assert!(matches!(err, BlockchainError::Configuration(_)));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_destination_fails_before_io() {
    let gateway = Arc::new(ScriptedGateway::new(41, None));
    let bad = TransferRequest::new("addr2", Tez::from_mutez(5));
    let err = rpc_with(gateway.clone())
        .send_transaction(0, &bad)
        .await
        .unwrap_err();
    assert!(matches!(err, BlockchainError::Configuration(_)));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_malformed_counter_is_parse_error() {
    let gateway = Arc::new(ScriptedGateway::new(0, None).with_counter_text("n/a"));
    let err = rpc_with(gateway.clone())
        .send_transaction(0, &transfer())
        .await
        .unwrap_err();
    assert!(matches!(err, BlockchainError::Parse(_)));
    assert!(!gateway.calls().iter().any(|c| matches!(c, Call::Forge { .. })));
}

#[tokio::test]
async fn test_inject_error_surfaces_body() {
    let gateway = Arc::new(
        ScriptedGateway::new(41, Some("sppk")).with_inject_error(500, "counter_in_the_past"),
    );
    let err = rpc_with(gateway)
        .send_transaction(0, &transfer())
        .await
        .unwrap_err();
    match err {
        BlockchainError::Request { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "counter_in_the_past");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_cancellation_during_preapply_skips_inject() {
    let gateway = Arc::new(
        ScriptedGateway::new(41, Some("sppk")).with_preapply_delay(Duration::from_secs(30)),
    );
    let cancellation = Cancellation::new();
    let rpc = rpc_with(gateway.clone()).with_cancel_token(cancellation.token());

    let tx = transfer();
    let send = rpc.send_transaction(0, &tx);
    let cancel = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancellation.cancel();
    };
    let (result, ()) = tokio::join!(send, cancel);

    assert!(matches!(result, Err(BlockchainError::Cancelled)));
    assert!(gateway.calls().iter().any(|c| matches!(c, Call::Preapply { .. })));
    assert!(!gateway.injected());
}

#[tokio::test]
async fn test_cancelled_before_start_makes_no_calls() {
    let gateway = Arc::new(ScriptedGateway::new(41, Some("sppk")));
    let cancellation = Cancellation::new();
    cancellation.cancel();
    let rpc = rpc_with(gateway.clone()).with_cancel_token(cancellation.token());

    let err = rpc.send_transaction(0, &transfer()).await.unwrap_err();
    assert!(matches!(err, BlockchainError::Cancelled));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_activate_account_signed_by_fundraiser_key() {
    let gateway = Arc::new(ScriptedGateway::new(0, None));
    let rpc = rpc_with(gateway.clone());
    let fundraiser = SeedWallet::from_fundraiser(common::TEST_MNEMONIC, "user@example.com", "pw").unwrap();

    let outcome = rpc
        .activate_account(fundraiser.keys(), "41f98b15efc63fa893d61d7d6eee4a2ce9427ac4")
        .await
        .unwrap();

    let contents = gateway.forged_contents();
    assert_eq!(contents.len(), 1);
    let PendingOperation::ActivateAccount(op) = &contents[0] else {
        panic!("expected activation");
    };
    assert_eq!(op.pkh, fundraiser.address());
    assert!(outcome.injected());
    assert!(gateway.calls().iter().all(|c| !matches!(c, Call::Account { .. })));
}
