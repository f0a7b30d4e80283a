//! Engine plan/apply/destroy/import against the in-memory fake
//!
//! Verified:
//! - Declarations that reference unknown attributes are deferred at plan time
//!   and resolved during apply
//! - A converged stack plans no changes and apply makes no mutating calls
//! - Undeclared tracked resources are deleted
//! - Retry policy is owned by the engine and configured explicitly
//! - A create that fails after the object exists is tracked, not repeated
//! - State survives a restart with the file store

mod common;

use common::*;
use r53_core::engine::{EngineEvent, LifecycleEngine, PlanAction};
use r53_core::error::Error;
use r53_core::model::RecordType;
use r53_core::resources::ResourceKind;
use r53_core::state::{FileStateStore, MemoryStateStore};
use r53_core::traits::{Route53Api, StateStore};
use r53_core::StackConfig;
use serde_json::{Value, json};
use tokio::sync::mpsc;

fn stack(resources: Value) -> StackConfig {
    serde_json::from_value(json!({
        "provider": { "type": "aws" },
        "engine": { "max_retries": 3, "retry_delay_secs": 0 },
        "resources": resources
    }))
    .unwrap()
}

fn zone_and_record(ttl: i64) -> Value {
    json!([
        { "address": "zone.main", "kind": "zone", "config": { "name": "example.com" } },
        {
            "address": "record.www",
            "kind": "record",
            "config": {
                "zone_id": "${zone.main.zone_id}",
                "name": "www",
                "type": "A",
                "ttl": ttl,
                "records": ["192.0.2.10"]
            }
        }
    ])
}

fn drain(rx: &mut mpsc::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn plan_defers_unknown_references() {
    let fake = FakeRoute53::new();
    let (engine, mut rx) = LifecycleEngine::new(
        fake.context(),
        Box::new(MemoryStateStore::new()),
        stack(zone_and_record(300)),
    )
    .unwrap();

    let plan = engine.plan().await.unwrap();
    assert_eq!(plan.action("zone.main"), Some(&PlanAction::Create));
    assert_eq!(
        plan.action("record.www"),
        Some(&PlanAction::Deferred {
            references: vec!["zone.main.zone_id".to_string()]
        })
    );
    assert!(plan.has_changes());

    // plan never calls mutating APIs
    assert_eq!(fake.calls("create_hosted_zone"), 0);
    assert!(drain(&mut rx).contains(&EngineEvent::Planned {
        creates: 1,
        updates: 0,
        replaces: 0,
        deletes: 0,
    }));
}

#[tokio::test]
async fn apply_converges_and_is_idempotent() {
    let fake = FakeRoute53::new();
    let store = MemoryStateStore::new();
    let (engine, mut rx) = LifecycleEngine::new(
        fake.context(),
        Box::new(store.clone()),
        stack(zone_and_record(300)),
    )
    .unwrap();

    let summary = engine.apply().await.unwrap();
    assert_eq!(summary.created, 2);
    assert_eq!(store.len().await, 2);

    let zone = store.get("zone.main").await.unwrap().unwrap();
    assert_eq!(zone.kind, ResourceKind::Zone);
    let record = fake.record(&zone.id, "www.example.com", RecordType::A).unwrap();
    assert_eq!(record.records, vec!["192.0.2.10".to_string()]);

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::ActionSucceeded { address, action, .. }
            if address == "record.www" && action == "create"
    )));

    // second pass: nothing to do
    let plan = engine.plan().await.unwrap();
    assert!(!plan.has_changes(), "unexpected plan: {plan:?}");

    let batches = fake.calls("change_resource_record_sets");
    let summary = engine.apply().await.unwrap();
    assert_eq!(summary.unchanged, 2);
    assert_eq!(summary.created, 0);
    assert_eq!(fake.calls("create_hosted_zone"), 1);
    assert_eq!(fake.calls("change_resource_record_sets"), batches);
}

#[tokio::test]
async fn changed_declaration_updates_in_place() {
    let fake = FakeRoute53::new();
    let store = MemoryStateStore::new();

    let (engine, _rx) =
        LifecycleEngine::new(fake.context(), Box::new(store.clone()), stack(zone_and_record(300)))
            .unwrap();
    engine.apply().await.unwrap();

    let (engine, _rx) =
        LifecycleEngine::new(fake.context(), Box::new(store.clone()), stack(zone_and_record(60)))
            .unwrap();
    let plan = engine.plan().await.unwrap();
    assert_eq!(plan.action("zone.main"), Some(&PlanAction::NoOp));
    assert_eq!(plan.action("record.www"), Some(&PlanAction::Update));

    let summary = engine.apply().await.unwrap();
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.unchanged, 1);

    let zone_id = store.get("zone.main").await.unwrap().unwrap().id;
    let record = fake.record(&zone_id, "www.example.com", RecordType::A).unwrap();
    assert_eq!(record.ttl, Some(60));
}

#[tokio::test]
async fn undeclared_resources_are_deleted() {
    let fake = FakeRoute53::new();
    let store = MemoryStateStore::new();

    let (engine, _rx) =
        LifecycleEngine::new(fake.context(), Box::new(store.clone()), stack(zone_and_record(300)))
            .unwrap();
    engine.apply().await.unwrap();
    let zone_id = store.get("zone.main").await.unwrap().unwrap().id;

    let only_zone = json!([
        { "address": "zone.main", "kind": "zone", "config": { "name": "example.com" } }
    ]);
    let (engine, _rx) =
        LifecycleEngine::new(fake.context(), Box::new(store.clone()), stack(only_zone)).unwrap();
    let plan = engine.plan().await.unwrap();
    assert_eq!(plan.action("record.www"), Some(&PlanAction::Delete));

    let summary = engine.apply().await.unwrap();
    assert_eq!(summary.deleted, 1);
    assert!(fake.record(&zone_id, "www.example.com", RecordType::A).is_none());
    assert!(store.get("record.www").await.unwrap().is_none());
}

#[tokio::test]
async fn destroy_deletes_in_reverse_order() {
    let fake = FakeRoute53::new();
    let store = MemoryStateStore::new();
    let (engine, _rx) =
        LifecycleEngine::new(fake.context(), Box::new(store.clone()), stack(zone_and_record(300)))
            .unwrap();
    engine.apply().await.unwrap();

    // the zone can only go once the record is gone
    let summary = engine.destroy().await.unwrap();
    assert_eq!(summary.deleted, 2);
    assert_eq!(fake.zone_count(), 0);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn out_of_band_deletion_is_recreated() {
    let fake = FakeRoute53::new();
    let store = MemoryStateStore::new();
    let zone_only = json!([
        { "address": "zone.main", "kind": "zone", "config": { "name": "example.com" } }
    ]);
    let (engine, mut rx) =
        LifecycleEngine::new(fake.context(), Box::new(store.clone()), stack(zone_only)).unwrap();
    engine.apply().await.unwrap();

    let old_id = store.get("zone.main").await.unwrap().unwrap().id;
    fake.delete_hosted_zone(&old_id).await.unwrap();
    drain(&mut rx);

    let plan = engine.plan().await.unwrap();
    assert_eq!(plan.action("zone.main"), Some(&PlanAction::Create));
    assert!(drain(&mut rx).iter().any(|e| matches!(
        e,
        EngineEvent::Drifted { address, id } if address == "zone.main" && *id == old_id
    )));

    engine.apply().await.unwrap();
    let new_id = store.get("zone.main").await.unwrap().unwrap().id;
    assert_ne!(new_id, old_id);
    assert!(fake.has_zone(&new_id));
}

#[tokio::test]
async fn throttled_calls_are_retried_by_engine() {
    let fake = FakeRoute53::new();
    fake.throttle("create_hosted_zone", 2);

    let zone_only = json!([
        { "address": "zone.main", "kind": "zone", "config": { "name": "example.com" } }
    ]);
    let (engine, _rx) =
        LifecycleEngine::new(fake.context(), Box::new(MemoryStateStore::new()), stack(zone_only))
            .unwrap();

    engine.apply().await.unwrap();
    assert_eq!(fake.calls("create_hosted_zone"), 3);
    assert_eq!(fake.zone_count(), 1);
}

#[tokio::test]
async fn throttled_change_polling_does_not_create_twice() {
    let fake = FakeRoute53::new();
    fake.throttle("get_change", 1);

    let zone_only = json!([
        { "address": "zone.main", "kind": "zone", "config": { "name": "example.com" } }
    ]);
    let (engine, _rx) =
        LifecycleEngine::new(fake.context(), Box::new(MemoryStateStore::new()), stack(zone_only))
            .unwrap();

    let summary = engine.apply().await.unwrap();
    assert_eq!(summary.created, 1);
    assert_eq!(fake.calls("create_hosted_zone"), 1);
    assert_eq!(fake.zone_count(), 1);
}

#[tokio::test]
async fn partially_created_zone_is_tracked_and_converged() {
    let fake = FakeRoute53::new();
    fake.throttle("list_tags", 1);
    let store = MemoryStateStore::new();

    let zone_only = json!([
        { "address": "zone.main", "kind": "zone", "config": { "name": "example.com" } }
    ]);
    let (engine, _rx) =
        LifecycleEngine::new(fake.context(), Box::new(store.clone()), stack(zone_only)).unwrap();

    let err = engine.apply().await.unwrap_err();
    let Error::Incomplete { id, .. } = &err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(store.get("zone.main").await.unwrap().unwrap().id, *id);
    assert_eq!(fake.calls("create_hosted_zone"), 1);

    // the next run adopts the zone instead of creating another
    let summary = engine.apply().await.unwrap();
    assert_eq!(summary.created, 0);
    assert_eq!(summary.unchanged, 1);
    assert_eq!(fake.calls("create_hosted_zone"), 1);
    assert_eq!(fake.zone_count(), 1);
    assert!(!store.get("zone.main").await.unwrap().unwrap().attributes.is_null());
}

#[tokio::test]
async fn force_destroy_zone_converges_and_empties_on_destroy() {
    let fake = FakeRoute53::new();
    let store = MemoryStateStore::new();
    let zone_only = json!([
        {
            "address": "zone.main",
            "kind": "zone",
            "config": { "name": "example.com", "force_destroy": true }
        }
    ]);
    let (engine, _rx) =
        LifecycleEngine::new(fake.context(), Box::new(store.clone()), stack(zone_only)).unwrap();

    assert_eq!(engine.apply().await.unwrap().created, 1);
    let plan = engine.plan().await.unwrap();
    assert_eq!(plan.action("zone.main"), Some(&PlanAction::NoOp));
    assert_eq!(engine.apply().await.unwrap().unchanged, 1);

    // records created outside the stack do not block deletion
    let zone_id = store.get("zone.main").await.unwrap().unwrap().id;
    fake.seed_record(
        &zone_id,
        r53_core::model::ResourceRecordSet::simple(
            "stray.example.com",
            RecordType::Txt,
            300,
            vec!["\"left behind\"".into()],
        ),
    );

    assert_eq!(engine.destroy().await.unwrap().deleted, 1);
    assert_eq!(fake.zone_count(), 0);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn retries_can_be_disabled_via_config() {
    let fake = FakeRoute53::new();
    fake.throttle("create_hosted_zone", 1);

    let mut config = stack(json!([
        { "address": "zone.main", "kind": "zone", "config": { "name": "example.com" } }
    ]));
    config.engine.max_retries = 0;
    let (engine, mut rx) =
        LifecycleEngine::new(fake.context(), Box::new(MemoryStateStore::new()), config).unwrap();

    let err = engine.apply().await.unwrap_err();
    assert!(matches!(err, Error::Throttled(_)));
    assert_eq!(fake.calls("create_hosted_zone"), 1);
    assert!(drain(&mut rx).iter().any(|e| matches!(
        e,
        EngineEvent::ActionFailed { address, retry_count: 0, .. } if address == "zone.main"
    )));
}

#[tokio::test]
async fn non_retryable_errors_fail_immediately() {
    let fake = FakeRoute53::new();
    let zone_id = fake.seed_zone("example.com");

    let resources = json!([
        {
            "address": "record.www",
            "kind": "record",
            "config": {
                "zone_id": zone_id,
                "name": "www",
                "type": "A",
                "ttl": 300,
                "records": ["192.0.2.10"]
            }
        }
    ]);
    fake.seed_record(
        &zone_id,
        r53_core::model::ResourceRecordSet::simple(
            "www.example.com",
            RecordType::A,
            300,
            vec!["198.51.100.1".into()],
        ),
    );
    let (engine, _rx) =
        LifecycleEngine::new(fake.context(), Box::new(MemoryStateStore::new()), stack(resources))
            .unwrap();

    let err = engine.apply().await.unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));
    assert_eq!(fake.calls("change_resource_record_sets"), 1);
}

#[tokio::test]
async fn invalid_config_fails_before_any_call() {
    let fake = FakeRoute53::new();
    let resources = json!([
        { "address": "zone.main", "kind": "zone", "config": { "name": "example.com" } },
        {
            "address": "record.www",
            "kind": "record",
            "config": {
                "zone_id": "${zone.main.zone_id}",
                "name": "www",
                "type": "A",
                "records": ["192.0.2.10"]
            }
        }
    ]);
    let (engine, _rx) =
        LifecycleEngine::new(fake.context(), Box::new(MemoryStateStore::new()), stack(resources))
            .unwrap();

    // the zone is created, the record fails validation (no ttl)
    let err = engine.apply().await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(fake.calls("change_resource_record_sets"), 0);
}

#[tokio::test]
async fn import_adopts_existing_zone() {
    let fake = FakeRoute53::new();
    let zone_id = fake.seed_zone("example.com");
    let store = MemoryStateStore::new();

    let resources = json!([
        {
            "address": "zone.main",
            "kind": "zone",
            "config": { "name": "example.com", "comment": "" }
        }
    ]);
    let (engine, mut rx) =
        LifecycleEngine::new(fake.context(), Box::new(store.clone()), stack(resources)).unwrap();

    let record = engine.import("zone.main", ResourceKind::Zone, &zone_id).await.unwrap();
    assert_eq!(record.id, zone_id);
    assert!(drain(&mut rx).contains(&EngineEvent::Imported {
        address: "zone.main".into(),
        id: zone_id.clone(),
    }));

    let plan = engine.plan().await.unwrap();
    assert_eq!(plan.action("zone.main"), Some(&PlanAction::NoOp));

    // already managed
    assert!(engine.import("zone.main", ResourceKind::Zone, &zone_id).await.is_err());
    // declared as another kind
    store.delete("zone.main").await.unwrap();
    assert!(matches!(
        engine.import("zone.main", ResourceKind::HealthCheck, "hc-1").await,
        Err(Error::Config(_))
    ));
    // nothing to adopt
    assert!(
        engine
            .import("zone.other", ResourceKind::Zone, "ZMISSING")
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn state_survives_restart_with_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("r53.json");
    let fake = FakeRoute53::new();

    {
        let store = FileStateStore::new(&path).await.unwrap();
        let (engine, _rx) =
            LifecycleEngine::new(fake.context(), Box::new(store), stack(zone_and_record(300)))
                .unwrap();
        engine.apply().await.unwrap();
    }
    assert!(path.exists());

    let store = FileStateStore::new(&path).await.unwrap();
    assert_eq!(store.list().await.unwrap().len(), 2);

    let (engine, _rx) =
        LifecycleEngine::new(fake.context(), Box::new(store), stack(zone_and_record(300))).unwrap();
    let plan = engine.plan().await.unwrap();
    assert!(!plan.has_changes());
    assert_eq!(fake.calls("create_hosted_zone"), 1);
}
