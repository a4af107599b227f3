//! Group creation, quota, rename and deactivation.

mod common;

use std::sync::{Arc, Mutex};

use domain::models::GroupRole;
use domain::services::Clock;
use domain::{GroupError, StoreError};
use pet_groups_engine::config::LimitsConfig;
use pet_groups_engine::services::GroupIdGenerator;
use tokio_test::{assert_err, assert_ok};

use common::{group_name, setup, setup_with_limits, user};

#[tokio::test]
async fn test_create_group_makes_creator_membership() {
    let t = setup();
    let alice = user();

    let group = assert_ok!(t.engine.create_group("Pets", alice).await);

    assert_eq!(group.name, "Pets");
    assert_eq!(group.created_by, alice);
    assert_eq!(group.id.len(), 8);
    assert!(group.is_active);
    assert_eq!(group.created_at, t.clock.now());
    assert_eq!(
        t.engine.get_role(&group.id, alice).await.unwrap(),
        Some(GroupRole::Creator)
    );
    assert_eq!(t.store.creator_count(&group.id).await, 1);
}

#[tokio::test]
async fn test_create_group_validates_name_length() {
    let t = setup();
    let alice = user();

    let empty = t.engine.create_group("", alice).await;
    assert!(matches!(empty, Err(GroupError::Validation(_))));

    let too_long = t.engine.create_group(&"x".repeat(51), alice).await;
    assert!(matches!(too_long, Err(GroupError::Validation(_))));

    assert_ok!(t.engine.create_group(&"x".repeat(50), alice).await);
    assert_ok!(t.engine.create_group("P", alice).await);
}

#[tokio::test]
async fn test_eleventh_group_exceeds_quota() {
    let t = setup();
    let alice = user();

    for _ in 0..10 {
        assert_ok!(t.engine.create_group(&group_name(), alice).await);
    }

    let err = assert_err!(t.engine.create_group(&group_name(), alice).await);
    assert!(matches!(err, GroupError::QuotaExceeded { limit: 10 }));
    assert_eq!(err.status_code(), 400);
    assert_eq!(t.engine.registry().created_group_count(alice).await.unwrap(), 10);

    // Quota is per creator
    assert_ok!(t.engine.create_group(&group_name(), user()).await);
}

#[tokio::test]
async fn test_joined_groups_do_not_count_toward_quota() {
    let t = setup_with_limits(LimitsConfig {
        max_groups_per_creator: 1,
        ..LimitsConfig::default()
    });
    let alice = user();
    let bob = user();

    let alices = t.group(alice).await;
    t.join(&alices.id, alice, bob).await;

    assert_ok!(t.engine.create_group(&group_name(), bob).await);
}

#[tokio::test]
async fn test_deactivated_group_frees_quota() {
    let t = setup_with_limits(LimitsConfig {
        max_groups_per_creator: 2,
        ..LimitsConfig::default()
    });
    let alice = user();

    let first = t.group(alice).await;
    t.group(alice).await;
    assert_err!(t.engine.create_group(&group_name(), alice).await);

    assert_ok!(t.engine.deactivate_group(&first.id, alice).await);
    assert_ok!(t.engine.create_group(&group_name(), alice).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_never_exceed_quota() {
    let t = Arc::new(setup_with_limits(LimitsConfig {
        max_groups_per_creator: 3,
        ..LimitsConfig::default()
    }));
    let alice = user();

    let handles: Vec<_> = (0..12)
        .map(|_| {
            let t = t.clone();
            tokio::spawn(async move { t.engine.create_group(&group_name(), alice).await })
        })
        .collect();

    let mut created = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(GroupError::QuotaExceeded { .. }) => refused += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(created, 3);
    assert_eq!(refused, 9);
}

#[tokio::test]
async fn test_id_collision_is_retried_with_fresh_id() {
    let ids = Mutex::new(vec!["taken001", "taken001", "fresh001"].into_iter());
    let generator: GroupIdGenerator = Arc::new(move || {
        ids.lock()
            .unwrap()
            .next()
            .unwrap_or("spare001")
            .to_string()
    });
    let t = setup();
    let engine = t.engine.clone().with_id_generator(generator);

    let first = assert_ok!(engine.create_group("First", user()).await);
    assert_eq!(first.id, "taken001");

    let second = assert_ok!(engine.create_group("Second", user()).await);
    assert_eq!(second.id, "fresh001");
    assert_eq!(t.store.creator_count("fresh001").await, 1);
}

#[tokio::test]
async fn test_id_collisions_give_up_after_configured_attempts() {
    let t = setup();
    let engine = t
        .engine
        .clone()
        .with_id_generator(Arc::new(|| "same0001".to_string()));

    assert_ok!(engine.create_group("First", user()).await);
    let err = assert_err!(engine.create_group("Second", user()).await);
    assert!(matches!(
        err,
        GroupError::Storage(StoreError::UniqueViolation(_))
    ));
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn test_get_group_unknown_is_not_found() {
    let t = setup();
    let err = assert_err!(t.engine.get_group("nope0000").await);
    assert!(matches!(err, GroupError::NotFound(_)));
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_only_creator_renames() {
    let t = setup();
    let alice = user();
    let bob = user();
    let group = t.group(alice).await;
    t.join(&group.id, alice, bob).await;

    t.clock.advance(chrono::Duration::minutes(5));
    let renamed = assert_ok!(t.engine.rename_group(&group.id, alice, "Cats").await);
    assert_eq!(renamed.name, "Cats");
    assert!(renamed.updated_at > group.updated_at);

    let err = assert_err!(t.engine.rename_group(&group.id, bob, "Dogs").await);
    assert!(matches!(err, GroupError::Forbidden(_)));

    let err = assert_err!(t.engine.rename_group(&group.id, alice, "").await);
    assert!(matches!(err, GroupError::Validation(_)));

    assert_eq!(t.engine.get_group(&group.id).await.unwrap().name, "Cats");
}

#[tokio::test]
async fn test_only_creator_deactivates() {
    let t = setup();
    let alice = user();
    let bob = user();
    let group = t.group(alice).await;
    t.join(&group.id, alice, bob).await;

    let err = assert_err!(t.engine.deactivate_group(&group.id, bob).await);
    assert!(matches!(err, GroupError::Forbidden(_)));
    assert_eq!(err.status_code(), 403);

    let err = assert_err!(t.engine.deactivate_group(&group.id, user()).await);
    assert!(matches!(err, GroupError::Forbidden(_)));

    assert_ok!(t.engine.deactivate_group(&group.id, alice).await);
    assert!(matches!(
        t.engine.get_group(&group.id).await,
        Err(GroupError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_deactivated_group_hides_roles_but_keeps_rows() {
    let t = setup();
    let alice = user();
    let bob = user();
    let group = t.group(alice).await;
    t.join(&group.id, alice, bob).await;

    assert_ok!(t.engine.deactivate_group(&group.id, alice).await);

    assert_eq!(t.engine.get_role(&group.id, alice).await.unwrap(), None);
    assert!(!t
        .engine
        .can_perform(&group.id, bob, "view_group")
        .await
        .unwrap());
    assert!(t.engine.list_groups_for_user(alice).await.unwrap().is_empty());
    // Soft delete: membership rows are untouched
    let rows = t.store.all_memberships().await;
    assert_eq!(rows.iter().filter(|m| m.group_id == group.id && m.is_active).count(), 2);
}
