//! Traffic policy and traffic policy instance lifecycle against the fake

mod common;

use common::*;
use r53_core::model::RecordType;
use r53_core::resources::traffic_policy::{TrafficPolicyConfig, TrafficPolicyResource};
use r53_core::resources::traffic_policy_instance::{
    TrafficPolicyInstanceConfig, TrafficPolicyInstanceResource,
};
use r53_core::traits::Resource;
use serde_json::json;

fn document(value: &str) -> String {
    json!({
        "AWSPolicyFormatVersion": "2015-10-01",
        "RecordType": "A",
        "Endpoints": { "main": { "Type": "value", "Value": value } },
        "StartEndpoint": "main"
    })
    .to_string()
}

fn policy(doc: String, comment: Option<&str>) -> TrafficPolicyConfig {
    TrafficPolicyConfig {
        name: "app-policy".into(),
        document: doc,
        comment: comment.map(str::to_string),
    }
}

#[tokio::test]
async fn document_change_publishes_new_version() {
    let fake = FakeRoute53::new();
    let ctx = fake.context();

    let config = policy(document("192.0.2.1"), None);
    TrafficPolicyResource.validate(&config).unwrap();
    let state = TrafficPolicyResource.create(&ctx, &config).await.unwrap();
    assert_eq!(state.version, 1);
    assert_eq!(state.policy_type, RecordType::A);

    let changed = policy(document("192.0.2.2"), None);
    assert!(!TrafficPolicyResource.in_sync(&state, &changed));
    let state = TrafficPolicyResource.update(&ctx, &state, &changed).await.unwrap();
    assert_eq!(state.version, 2);

    // read tracks the latest version
    let read = TrafficPolicyResource.read(&ctx, &state.id).await.unwrap().unwrap();
    assert_eq!(read.version, 2);
    assert!(TrafficPolicyResource.in_sync(&read, &changed));
}

#[tokio::test]
async fn comment_change_is_in_place() {
    let fake = FakeRoute53::new();
    let ctx = fake.context();

    let state = TrafficPolicyResource
        .create(&ctx, &policy(document("192.0.2.1"), None))
        .await
        .unwrap();
    let commented = policy(document("192.0.2.1"), Some("primary"));
    let state = TrafficPolicyResource.update(&ctx, &state, &commented).await.unwrap();

    assert_eq!(state.version, 1);
    assert_eq!(state.comment.as_deref(), Some("primary"));
    assert_eq!(fake.calls("create_traffic_policy_version"), 0);
}

#[tokio::test]
async fn reformatted_document_is_in_sync() {
    let fake = FakeRoute53::new();
    let ctx = fake.context();

    let state = TrafficPolicyResource
        .create(&ctx, &policy(document("192.0.2.1"), None))
        .await
        .unwrap();
    let pretty = serde_json::to_string_pretty(
        &serde_json::from_str::<serde_json::Value>(&document("192.0.2.1")).unwrap(),
    )
    .unwrap();
    assert!(TrafficPolicyResource.in_sync(&state, &policy(pretty, None)));
}

#[tokio::test]
async fn delete_removes_every_version() {
    let fake = FakeRoute53::new();
    let ctx = fake.context();

    let state = TrafficPolicyResource
        .create(&ctx, &policy(document("192.0.2.1"), None))
        .await
        .unwrap();
    let state = TrafficPolicyResource
        .update(&ctx, &state, &policy(document("192.0.2.2"), None))
        .await
        .unwrap();

    TrafficPolicyResource.delete(&ctx, &state).await.unwrap();
    assert_eq!(fake.calls("delete_traffic_policy"), 2);
    assert!(TrafficPolicyResource.read(&ctx, &state.id).await.unwrap().is_none());
}

#[tokio::test]
async fn instance_waits_until_applied_and_gone() {
    let fake = FakeRoute53::new();
    let ctx = fake.context();
    let zone_id = fake.seed_zone("example.com");

    let tp = TrafficPolicyResource
        .create(&ctx, &policy(document("192.0.2.1"), None))
        .await
        .unwrap();

    let config = TrafficPolicyInstanceConfig {
        hosted_zone_id: zone_id.clone(),
        name: "app.example.com".into(),
        ttl: 60,
        traffic_policy_id: tp.id.clone(),
        traffic_policy_version: 1,
    };
    TrafficPolicyInstanceResource.validate(&config).unwrap();

    let state = TrafficPolicyInstanceResource.create(&ctx, &config).await.unwrap();
    assert_eq!(state.name, "app.example.com");
    assert_eq!(state.hosted_zone_id, zone_id);
    assert!(fake.calls("get_traffic_policy_instance") >= 1);
    assert!(TrafficPolicyInstanceResource.in_sync(&state, &config));

    let retuned = TrafficPolicyInstanceConfig { ttl: 300, ..config.clone() };
    assert!(!TrafficPolicyInstanceResource.requires_replacement(&state, &retuned));
    let state = TrafficPolicyInstanceResource.update(&ctx, &state, &retuned).await.unwrap();
    assert_eq!(state.ttl, 300);

    let renamed = TrafficPolicyInstanceConfig { name: "other.example.com".into(), ..config };
    assert!(TrafficPolicyInstanceResource.requires_replacement(&state, &renamed));

    TrafficPolicyInstanceResource.delete(&ctx, &state).await.unwrap();
    assert!(TrafficPolicyInstanceResource.read(&ctx, &state.id).await.unwrap().is_none());

    // deleting again is a no-op
    TrafficPolicyInstanceResource.delete(&ctx, &state).await.unwrap();
}
