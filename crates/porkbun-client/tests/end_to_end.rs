//! End-to-end Test: Lifecycle controllers over the wire client
//!
//! Drives the glue and DNS record controllers through `PorkbunClient`
//! against the stateful mock registrar.
//!
//! Constraints verified:
//! - The full create/read/update/delete/import cycle over HTTP
//! - Independent keys can be reconciled concurrently through one client
//! - Cancellation aborts an in-flight request with a cancellation error
//! - Tracked state follows Read, including removal when gone upstream

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use common::*;
use porkbun_core::traits::{PlanAction, ReadOutcome, Resource, ResourceState, StateStore};
use porkbun_core::{
    DnsRecordPlan, DnsRecordResource, ErrorKind, GlueRecordPlan, GlueRecordResource,
    MemoryStateStore, RegistrarApi,
};
use tokio_util::sync::CancellationToken;

fn set(ips: &[&str]) -> BTreeSet<String> {
    ips.iter().map(|ip| ip.to_string()).collect()
}

#[tokio::test]
async fn glue_record_lifecycle_over_http() {
    let double = RegistrarDouble::with_domains(&["example.com"]);
    let server = double.start().await;
    let resource = GlueRecordResource::new(Arc::new(client_for(&server)));
    let cancel = CancellationToken::new();

    let plan = GlueRecordPlan::new("example.com", "ns1", ["192.168.1.1", "2001:db8::1"]);
    let state = resource.create(&plan, &cancel).await.unwrap();
    assert_eq!(state.id, "example.com:ns1");

    let refreshed = resource.read(&state, &cancel).await.unwrap().into_present().unwrap();
    assert_eq!(refreshed.ips, set(&["192.168.1.1", "2001:db8::1"]));

    let plan = GlueRecordPlan::new("example.com", "ns1", ["192.168.1.2"]);
    let state = resource.update(&plan, &refreshed, &cancel).await.unwrap();

    let refreshed = resource.read(&state, &cancel).await.unwrap().into_present().unwrap();
    assert_eq!(refreshed.ips, set(&["192.168.1.2"]));

    resource.delete(&refreshed, &cancel).await.unwrap();
    assert_eq!(resource.read(&refreshed, &cancel).await.unwrap(), ReadOutcome::Gone);

    assert_eq!(
        double.request_paths(),
        vec![
            "/domain/createGlue/example.com/ns1",
            "/domain/getGlue/example.com",
            "/domain/updateGlue/example.com/ns1",
            "/domain/getGlue/example.com",
            "/domain/deleteGlue/example.com/ns1",
            "/domain/getGlue/example.com",
        ]
    );
}

#[tokio::test]
async fn import_then_read_over_http() {
    let double = RegistrarDouble::with_domains(&["example.com"]);
    let server = double.start().await;
    let client = client_for(&server);
    let resource = GlueRecordResource::new(Arc::new(client.clone()));
    let cancel = CancellationToken::new();

    client
        .create_glue_record("example.com", "ns1", &["192.0.2.1".to_string()])
        .await
        .unwrap();

    let imported = resource.import("example.com:ns1").unwrap();
    let hydrated = resource.read(&imported, &cancel).await.unwrap().into_present().unwrap();
    assert_eq!(hydrated.ips, set(&["192.0.2.1"]));

    // Malformed ids never reach the server
    assert!(resource.import("example.com").is_err());
    assert_eq!(double.requests().len(), 2);
}

#[tokio::test]
async fn independent_keys_reconcile_concurrently() {
    let double = RegistrarDouble::with_domains(&["example.com"]);
    let server = double.start().await;
    let resource = Arc::new(GlueRecordResource::new(Arc::new(client_for(&server))));
    let cancel = CancellationToken::new();

    let mut handles = Vec::new();
    for n in 1..=8 {
        let resource = Arc::clone(&resource);
        let cancel = cancel.clone();
        handles.push(tokio::spawn(async move {
            let plan = GlueRecordPlan::new("example.com", format!("ns{}", n), [format!("192.0.2.{}", n)]);
            resource.create(&plan, &cancel).await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for n in 1..=8 {
        let state = resource.import(&format!("example.com:ns{}", n)).unwrap();
        let refreshed = resource.read(&state, &cancel).await.unwrap().into_present().unwrap();
        let expected = format!("192.0.2.{}", n);
        assert_eq!(refreshed.ips, set(&[expected.as_str()]));
    }
}

#[tokio::test]
async fn cancellation_aborts_slow_request() {
    let double = RegistrarDouble::with_domains(&["example.com"]);
    double.set_delay(Duration::from_secs(10));
    let server = double.start().await;
    let resource = GlueRecordResource::new(Arc::new(client_for(&server)));
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = tokio::time::Instant::now();
    let plan = GlueRecordPlan::new("example.com", "ns1", ["192.0.2.1"]);
    let err = resource.create(&plan, &cancel).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn refresh_forgets_resources_gone_upstream() {
    let double = RegistrarDouble::with_domains(&["example.com"]);
    let server = double.start().await;
    let client = client_for(&server);
    let resource = GlueRecordResource::new(Arc::new(client.clone()));
    let store = MemoryStateStore::new();
    let cancel = CancellationToken::new();

    let address = "porkbun_glue_record.ns1";
    let plan = GlueRecordPlan::new("example.com", "ns1", ["192.0.2.1"]);
    let state = resource.create(&plan, &cancel).await.unwrap();
    store.put(address, ResourceState::GlueRecord(state.clone())).await.unwrap();

    // Removed outside the provider
    client.delete_glue_record("example.com", "ns1").await.unwrap();

    match resource.read(&state, &cancel).await.unwrap() {
        ReadOutcome::Present(state) => {
            store.put(address, ResourceState::GlueRecord(state)).await.unwrap();
        }
        ReadOutcome::Gone => store.remove(address).await.unwrap(),
    }

    assert!(store.get(address).await.unwrap().is_none());
    assert_eq!(resource.plan(None, &plan), PlanAction::Create);
}

#[tokio::test]
async fn dns_record_lifecycle_over_http() {
    let double = RegistrarDouble::with_domains(&["example.com"]);
    let server = double.start().await;
    let resource = DnsRecordResource::new(Arc::new(client_for(&server)));
    let cancel = CancellationToken::new();

    let plan = DnsRecordPlan::new("example.com", "www", "A", "192.0.2.10").with_ttl(600);
    let state = resource.create(&plan, &cancel).await.unwrap();
    assert_eq!(state.id, "106926650");

    let refreshed = resource.read(&state, &cancel).await.unwrap().into_present().unwrap();
    assert_eq!(refreshed, state);
    assert_eq!(resource.plan(Some(&refreshed), &plan), PlanAction::NoOp);

    let plan = DnsRecordPlan::new("example.com", "www", "A", "192.0.2.11").with_ttl(600);
    let state = resource.update(&plan, &refreshed, &cancel).await.unwrap();
    assert_eq!(double.dns_record("example.com", &state.id).unwrap()["content"], "192.0.2.11");

    let imported = resource.import(&state.import_id()).unwrap();
    let hydrated = resource.read(&imported, &cancel).await.unwrap().into_present().unwrap();
    assert_eq!(hydrated, state);

    resource.delete(&state, &cancel).await.unwrap();
    assert_eq!(resource.read(&state, &cancel).await.unwrap(), ReadOutcome::Gone);
}

#[tokio::test]
async fn dns_record_without_ttl_settles_over_http() {
    let double = RegistrarDouble::with_domains(&["example.com"]);
    let server = double.start().await;
    let resource = DnsRecordResource::new(Arc::new(client_for(&server)));
    let cancel = CancellationToken::new();

    let plan = DnsRecordPlan::new("example.com", "www", "A", "192.0.2.10");
    let state = resource.create(&plan, &cancel).await.unwrap();

    let refreshed = resource.read(&state, &cancel).await.unwrap().into_present().unwrap();
    assert_eq!(refreshed.ttl, Some(600));
    assert_eq!(resource.plan(Some(&refreshed), &plan), PlanAction::NoOp);
}
