//! Remote signing service client against a local stub service.

mod common;

use common::engine::RecordingEngine;
use common::server;
use pdf_remote_signer::{
    DigestSigner, RemoteDigestSigner, RemoteSignerConfig, RevocationHttpConfig, SignRequest,
    SignResult, SignWorkflow, SignerOptions, SigningError,
};
use std::sync::Arc;

const TOKEN: &str = "test-token";

fn options(pairs: &[(&str, &str)]) -> SignerOptions {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_remote_signer_sends_digest_and_options() {
    let addr = server::serve(server::signing_service(TOKEN));
    let signer = RemoteDigestSigner::new(
        RemoteSignerConfig::new(server::url(addr, "/sign")).with_auth_token(TOKEN),
    )
    .unwrap();

    let cms = signer
        .sign_digest("DIGEST", &options(&[("profile", "qualified")]))
        .await
        .unwrap();

    assert_eq!(cms, "CMS[DIGEST|qualified]");
}

#[tokio::test]
async fn test_remote_signer_reports_service_errors() {
    let addr = server::serve(server::signing_service(TOKEN));
    let signer = RemoteDigestSigner::new(
        RemoteSignerConfig::new(server::url(addr, "/sign")).with_auth_token("wrong"),
    )
    .unwrap();

    let err = signer
        .sign_digest("DIGEST", &SignerOptions::new())
        .await
        .unwrap_err();

    match err {
        SigningError::SignerError(msg) => {
            assert!(msg.contains("401"), "{msg}");
            assert!(msg.contains("unauthorized"), "{msg}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_remote_signer_requires_cms_in_response() {
    let addr = server::serve(server::signing_service(TOKEN));
    let signer = RemoteDigestSigner::new(
        RemoteSignerConfig::new(server::url(addr, "/sign")).with_auth_token(TOKEN),
    )
    .unwrap();

    let err = signer
        .sign_digest("no-cms", &SignerOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SigningError::SignerError(_)));
}

#[tokio::test]
async fn test_unreachable_service_is_a_network_error() {
    let signer =
        RemoteDigestSigner::new(RemoteSignerConfig::new("http://127.0.0.1:9/sign").with_timeout(2))
            .unwrap();

    let err = signer
        .sign_digest("DIGEST", &SignerOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SigningError::NetworkError(_)));
}

#[tokio::test]
async fn test_workflow_with_remote_signer() {
    let addr = server::serve(server::signing_service(TOKEN));
    let engine = Arc::new(RecordingEngine::succeeding("H1"));
    let signer = RemoteDigestSigner::new(
        RemoteSignerConfig::new(server::url(addr, "/sign")).with_auth_token(TOKEN),
    )
    .unwrap();
    let workflow = SignWorkflow::with_http_config(
        engine.clone(),
        Arc::new(signer),
        &RevocationHttpConfig::default(),
    )
    .unwrap()
    .with_signer_options(options(&[("profile", "basic")]));

    let result = workflow.sign(&SignRequest::new("a.pdf", "b.pdf")).await;

    assert_eq!(result, SignResult::success());
    let revocation: serde_json::Value =
        serde_json::from_str(&engine.embed_calls()[0].1).unwrap();
    assert_eq!(revocation["cms"], "CMS[H1|basic]");
}

#[tokio::test]
async fn test_workflow_with_rejecting_service_fails_fast() {
    let addr = server::serve(server::signing_service(TOKEN));
    let engine = Arc::new(RecordingEngine::succeeding("H1"));
    let signer =
        RemoteDigestSigner::new(RemoteSignerConfig::new(server::url(addr, "/sign"))).unwrap();
    let workflow = SignWorkflow::with_http_config(
        engine.clone(),
        Arc::new(signer),
        &RevocationHttpConfig::default(),
    )
    .unwrap();

    let result = workflow.sign(&SignRequest::new("a.pdf", "b.pdf")).await;

    assert_eq!(result.response_code, 4);
    assert!(engine.embed_calls().is_empty());
}
