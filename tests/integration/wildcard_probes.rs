//! Wildcard detection against a local zone that actually behaves like a
//! wildcard: every name under one parent resolves, only provisioned names
//! under the other.

mod support;

use hickory_proto::op::ResponseCode;
use scout_dns_resolver::{RecordType, ServerPool};
use std::time::Duration;
use support::{answer, queried_name, spawn_udp};

async fn zone_pool() -> ServerPool {
    // *.wild.example resolves for any leftmost label; under plain.example
    // only "www" is provisioned.
    let addr = spawn_udp(|q| {
        let name = queried_name(q);
        if name.ends_with(".wild.example") {
            answer(q, ResponseCode::NoError, 1, false)
        } else if name == "www.plain.example" {
            answer(q, ResponseCode::NoError, 1, false)
        } else {
            answer(q, ResponseCode::NXDomain, 0, false)
        }
    })
    .await;

    let pool = ServerPool::from_addrs(
        3,
        Duration::from_millis(500),
        &[format!("udp://{}", addr)],
    )
    .unwrap();
    pool.seed_rng(9);
    pool
}

#[tokio::test]
async fn wildcard_zone_is_detected() {
    let pool = zone_pool().await;
    assert!(pool
        .is_wildcard("anything.wild.example", RecordType::A)
        .await
        .unwrap());
}

#[tokio::test]
async fn provisioned_name_in_plain_zone_is_not_a_wildcard() {
    let pool = zone_pool().await;
    assert!(!pool
        .is_wildcard("www.plain.example", RecordType::A)
        .await
        .unwrap());
}

#[tokio::test]
async fn wildcard_answers_are_dropped_from_aggregation() {
    let pool = zone_pool().await;

    let records = pool.lookup_any("sub.wild.example").await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn is_set_sees_through_both_zones() {
    let pool = zone_pool().await;

    assert!(pool.is_set("www.plain.example", RecordType::A).await.unwrap());
    assert!(!pool.is_set("other.plain.example", RecordType::A).await.unwrap());
}
