//! CIDR collection and location lifecycle against the fake

mod common;

use common::*;
use r53_core::resources::cidr_collection::{CidrCollectionConfig, CidrCollectionResource};
use r53_core::resources::cidr_location::{CidrLocationConfig, CidrLocationResource};
use r53_core::traits::Resource;

fn location(collection_id: &str, blocks: &[&str]) -> CidrLocationConfig {
    CidrLocationConfig {
        cidr_collection_id: collection_id.to_string(),
        name: "office".into(),
        cidr_blocks: blocks.iter().map(|b| b.to_string()).collect(),
    }
}

#[tokio::test]
async fn collection_and_location_lifecycle() {
    let fake = FakeRoute53::new();
    let ctx = fake.context();

    let collection_config = CidrCollectionConfig { name: "offices".into() };
    CidrCollectionResource.validate(&collection_config).unwrap();
    let collection = CidrCollectionResource.create(&ctx, &collection_config).await.unwrap();
    assert!(collection.arn.ends_with(&collection.id));

    let config = location(&collection.id, &["198.51.100.0/24", "192.0.2.0/24"]);
    CidrLocationResource.validate(&config).unwrap();
    let state = CidrLocationResource.create(&ctx, &config).await.unwrap();
    assert_eq!(state.cidr_blocks, vec!["192.0.2.0/24", "198.51.100.0/24"]);

    let id = CidrLocationResource.id(&state);
    assert_eq!(id, format!("{},office", collection.id));
    let read = CidrLocationResource.read(&ctx, &id).await.unwrap().unwrap();
    assert_eq!(read, state);
    assert!(CidrLocationResource.in_sync(&read, &config));

    // a collection with locations cannot be deleted
    assert!(CidrCollectionResource.delete(&ctx, &collection).await.is_err());

    let moved = location(&collection.id, &["192.0.2.0/24", "2001:db8::/32"]);
    let state = CidrLocationResource.update(&ctx, &state, &moved).await.unwrap();
    let read = CidrLocationResource.read(&ctx, &id).await.unwrap().unwrap();
    assert_eq!(read.cidr_blocks, vec!["192.0.2.0/24", "2001:db8::/32"]);

    CidrLocationResource.delete(&ctx, &state).await.unwrap();
    assert!(CidrLocationResource.read(&ctx, &id).await.unwrap().is_none());

    CidrCollectionResource.delete(&ctx, &collection).await.unwrap();
    assert!(CidrCollectionResource.read(&ctx, &collection.id).await.unwrap().is_none());
}

#[tokio::test]
async fn unchanged_blocks_send_nothing() {
    let fake = FakeRoute53::new();
    let ctx = fake.context();

    let collection = CidrCollectionResource
        .create(&ctx, &CidrCollectionConfig { name: "offices".into() })
        .await
        .unwrap();
    let config = location(&collection.id, &["192.0.2.0/24"]);
    let state = CidrLocationResource.create(&ctx, &config).await.unwrap();

    let calls = fake.calls("change_cidr_collection");
    CidrLocationResource.update(&ctx, &state, &config).await.unwrap();
    assert_eq!(fake.calls("change_cidr_collection"), calls);
}

#[test]
fn invalid_blocks_are_rejected() {
    for bad in ["192.0.2.0", "192.0.2.0/33", "not-a-cidr/8", "2001:db8::/129"] {
        let config = location("cc-1", &[bad]);
        assert!(CidrLocationResource.validate(&config).is_err(), "{bad} accepted");
    }
    assert!(CidrLocationResource.validate(&location("cc-1", &[])).is_err());
}

#[test]
fn renaming_collection_requires_replacement() {
    let state = r53_core::resources::cidr_collection::CidrCollectionState {
        id: "cc-1".into(),
        arn: "arn:aws:route53:::cidrcollection/cc-1".into(),
        name: "offices".into(),
        version: 1,
    };
    let renamed = CidrCollectionConfig { name: "branches".into() };
    assert!(CidrCollectionResource.requires_replacement(&state, &renamed));
}
