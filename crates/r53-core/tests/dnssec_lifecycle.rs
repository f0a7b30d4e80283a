//! Key-signing key and hosted zone DNSSEC lifecycle against the fake
//!
//! Verified:
//! - Signing cannot start without an active key-signing key
//! - Key status changes wait for the change and the key status
//! - Active keys are deactivated before deletion

mod common;

use common::*;
use r53_core::model::{KeySigningKeyStatus, ServeSignature};
use r53_core::resources::hosted_zone_dnssec::{HostedZoneDnssecConfig, HostedZoneDnssecResource};
use r53_core::resources::key_signing_key::{KeySigningKeyConfig, KeySigningKeyResource};
use r53_core::traits::Resource;

const KMS_ARN: &str = "arn:aws:kms:us-east-1:111122223333:key/1234abcd-12ab-34cd-56ef-1234567890ab";

fn ksk(zone_id: &str, status: KeySigningKeyStatus) -> KeySigningKeyConfig {
    KeySigningKeyConfig {
        hosted_zone_id: zone_id.to_string(),
        name: "primary_ksk".into(),
        key_management_service_arn: KMS_ARN.into(),
        status,
    }
}

fn signing(zone_id: &str, status: ServeSignature) -> HostedZoneDnssecConfig {
    HostedZoneDnssecConfig {
        hosted_zone_id: zone_id.to_string(),
        signing_status: status,
    }
}

#[tokio::test]
async fn signing_requires_active_key() {
    let fake = FakeRoute53::new();
    let ctx = fake.context();
    let zone_id = fake.seed_zone("example.com");

    let err = HostedZoneDnssecResource
        .create(&ctx, &signing(&zone_id, ServeSignature::Signing))
        .await
        .unwrap_err();
    assert!(matches!(err, r53_core::Error::InvalidInput(_)));
}

#[tokio::test]
async fn full_dnssec_lifecycle() {
    let fake = FakeRoute53::new();
    let ctx = fake.context();
    let zone_id = fake.seed_zone("example.com");

    let key_config = ksk(&zone_id, KeySigningKeyStatus::Active);
    KeySigningKeyResource.validate(&key_config).unwrap();
    let key = KeySigningKeyResource.create(&ctx, &key_config).await.unwrap();
    assert_eq!(key.key.status, KeySigningKeyStatus::Active);
    assert!(!key.key.ds_record.is_empty());
    assert_eq!(KeySigningKeyResource.id(&key), format!("{zone_id},primary_ksk"));

    let dnssec = HostedZoneDnssecResource
        .create(&ctx, &signing(&zone_id, ServeSignature::Signing))
        .await
        .unwrap();
    assert_eq!(dnssec.signing_status, ServeSignature::Signing);

    let read = HostedZoneDnssecResource.read(&ctx, &zone_id).await.unwrap().unwrap();
    assert!(HostedZoneDnssecResource.in_sync(&read, &signing(&zone_id, ServeSignature::Signing)));

    // tear down in reverse order
    HostedZoneDnssecResource.delete(&ctx, &dnssec).await.unwrap();
    assert_eq!(fake.calls("disable_hosted_zone_dnssec"), 1);

    KeySigningKeyResource.delete(&ctx, &key).await.unwrap();
    assert_eq!(fake.calls("deactivate_key_signing_key"), 1);
    let id = KeySigningKeyResource.id(&key);
    assert!(KeySigningKeyResource.read(&ctx, &id).await.unwrap().is_none());
}

#[tokio::test]
async fn key_status_change_is_in_place() {
    let fake = FakeRoute53::new();
    let ctx = fake.context();
    let zone_id = fake.seed_zone("example.com");

    let key = KeySigningKeyResource
        .create(&ctx, &ksk(&zone_id, KeySigningKeyStatus::Inactive))
        .await
        .unwrap();
    assert_eq!(key.key.status, KeySigningKeyStatus::Inactive);

    let active = ksk(&zone_id, KeySigningKeyStatus::Active);
    assert!(!KeySigningKeyResource.requires_replacement(&key, &active));
    assert!(!KeySigningKeyResource.in_sync(&key, &active));

    let key = KeySigningKeyResource.update(&ctx, &key, &active).await.unwrap();
    assert_eq!(key.key.status, KeySigningKeyStatus::Active);
    assert_eq!(fake.calls("activate_key_signing_key"), 1);

    let mut rotated = active.clone();
    rotated.key_management_service_arn = format!("{KMS_ARN}-2");
    assert!(KeySigningKeyResource.requires_replacement(&key, &rotated));
}

#[tokio::test]
async fn not_signing_zone_delete_is_a_no_op() {
    let fake = FakeRoute53::new();
    let ctx = fake.context();
    let zone_id = fake.seed_zone("example.com");

    let state = HostedZoneDnssecResource
        .create(&ctx, &signing(&zone_id, ServeSignature::NotSigning))
        .await
        .unwrap();
    assert_eq!(state.signing_status, ServeSignature::NotSigning);

    let calls = fake.calls("disable_hosted_zone_dnssec");
    HostedZoneDnssecResource.delete(&ctx, &state).await.unwrap();
    assert_eq!(fake.calls("disable_hosted_zone_dnssec"), calls);
}
