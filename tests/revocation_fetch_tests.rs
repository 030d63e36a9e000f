//! Revocation fetching against local OCSP responder and CRL stubs.

mod common;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::server;
use pdf_remote_signer::domain::FetchOutcome;
use pdf_remote_signer::{
    RevocationBundleBuilder, RevocationDescriptor, RevocationFetcher, RevocationHttpClient,
    RevocationHttpConfig, RevocationKind,
};
use std::time::Duration;

fn fetcher(max_concurrent: usize) -> RevocationFetcher {
    let config = RevocationHttpConfig {
        timeout: Duration::from_secs(5),
        max_concurrent_fetches: max_concurrent,
        ..RevocationHttpConfig::default()
    };
    RevocationFetcher::new(RevocationHttpClient::new(&config).unwrap())
}

fn ocsp(addr: std::net::SocketAddr, name: &str, delay_ms: u64) -> RevocationDescriptor {
    RevocationDescriptor::ocsp(
        server::url(addr, &format!("/ocsp/{name}/{delay_ms}")),
        STANDARD.encode(format!("req-{name}")),
    )
}

fn fetched_body(outcome: &FetchOutcome) -> Option<Vec<u8>> {
    match outcome {
        FetchOutcome::Fetched { body_b64, .. } => Some(STANDARD.decode(body_b64).unwrap()),
        FetchOutcome::Skipped { .. } => None,
    }
}

#[tokio::test]
async fn test_failed_source_is_skipped_and_order_kept() {
    let addr = server::serve(server::ocsp_responder());
    let items = vec![ocsp(addr, "a", 0), ocsp(addr, "fail-b", 0), ocsp(addr, "c", 0)];

    let outcomes = fetcher(4).fetch_all(&items).await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(fetched_body(&outcomes[0]).unwrap(), b"ocsp-a");
    assert!(!outcomes[1].is_fetched());
    assert_eq!(fetched_body(&outcomes[2]).unwrap(), b"ocsp-c");

    let builder = RevocationBundleBuilder::new(fetcher(4));
    let bundle = builder.build("CMS", &items, true).await;
    assert_eq!(
        bundle.ocsp(),
        &[STANDARD.encode("ocsp-a"), STANDARD.encode("ocsp-c")]
    );
    assert!(bundle.crl().is_empty());
}

#[tokio::test]
async fn test_results_follow_source_order_not_completion_order() {
    let addr = server::serve(server::ocsp_responder());
    let items = vec![
        ocsp(addr, "slow", 300),
        ocsp(addr, "medium", 100),
        ocsp(addr, "fast", 0),
    ];

    for limit in [1, 3] {
        let outcomes = fetcher(limit).fetch_all(&items).await;
        let bodies: Vec<Vec<u8>> = outcomes.iter().filter_map(fetched_body).collect();
        assert_eq!(
            bodies,
            vec![b"ocsp-slow".to_vec(), b"ocsp-medium".to_vec(), b"ocsp-fast".to_vec()],
            "limit {limit}"
        );
    }
}

#[tokio::test]
async fn test_pem_crl_is_stored_as_der() {
    let der = vec![0x30, 0x82, 0x02, 0x10, 0x01, 0x02, 0x03, 0xff];
    let addr = server::serve(server::crl_distribution_point(der.clone()));
    let items = vec![
        RevocationDescriptor::crl(server::url(addr, "/crl/pem")),
        RevocationDescriptor::crl(server::url(addr, "/crl/der")),
        RevocationDescriptor::crl(server::url(addr, "/crl/missing")),
    ];

    let bundle = RevocationBundleBuilder::new(fetcher(2))
        .build("CMS", &items, true)
        .await;

    assert_eq!(bundle.crl(), &[STANDARD.encode(&der), STANDARD.encode(&der)]);
    assert!(bundle.ocsp().is_empty());
}

#[tokio::test]
async fn test_unusable_descriptors_are_skipped() {
    let addr = server::serve(server::ocsp_responder());
    let unknown: RevocationDescriptor =
        serde_json::from_str(r#"{"type":"ldap","url":"ldap://dir.example.test"}"#).unwrap();
    let mut no_request = ocsp(addr, "x", 0);
    no_request.request = None;
    let mut bad_request = ocsp(addr, "y", 0);
    bad_request.request = Some("%%% not base64 %%%".to_string());
    let unreachable = RevocationDescriptor::crl("http://127.0.0.1:9/crl");

    let items = vec![unknown, no_request, bad_request, unreachable, ocsp(addr, "ok", 0)];
    let outcomes = fetcher(4).fetch_all(&items).await;

    assert_eq!(unknown_kinds(&items), vec![RevocationKind::Unknown]);
    assert_eq!(
        outcomes.iter().map(FetchOutcome::is_fetched).collect::<Vec<_>>(),
        vec![false, false, false, false, true]
    );
}

#[tokio::test]
async fn test_disabled_dss_performs_no_requests() {
    // Port 9 has no listener.
    let items = vec![RevocationDescriptor::crl("http://127.0.0.1:9/crl")];

    let bundle = RevocationBundleBuilder::new(fetcher(1))
        .build("CMS", &items, false)
        .await;

    assert_eq!(bundle.cms(), "CMS");
    assert!(bundle.ocsp().is_empty() && bundle.crl().is_empty());
    assert_eq!(
        bundle.to_json().unwrap(),
        r#"{"cms":"CMS","ocsp":[],"crl":[]}"#
    );
}

#[tokio::test]
async fn test_empty_source_list() {
    let outcomes = fetcher(4).fetch_all(&[]).await;
    assert!(outcomes.is_empty());
}

fn unknown_kinds(items: &[RevocationDescriptor]) -> Vec<RevocationKind> {
    items
        .iter()
        .map(|d| d.kind)
        .filter(|k| *k == RevocationKind::Unknown)
        .collect()
}
