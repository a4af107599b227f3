//! Capability checks through the engine and the one-creator invariant.

mod common;

use domain::models::{GroupRole, Permission};
use domain::services::{can_assign_role, can_manage_member, can_perform, permissions_for_role_name};

use common::{setup, user};

#[test]
fn test_permission_matrix_properties() {
    assert!(!can_assign_role(GroupRole::Creator, GroupRole::Creator));
    assert!(!can_manage_member(GroupRole::Creator, GroupRole::Creator));
    assert!(!can_perform(GroupRole::Viewer, "invite_members"));
    assert!(can_perform(GroupRole::Member, "invite_members"));
    assert!(!can_perform(GroupRole::Member, "remove_members"));
    assert!(permissions_for_role_name("owner").is_empty());
}

#[tokio::test]
async fn test_can_perform_follows_role() {
    let t = setup();
    let alice = user();
    let bob = user();
    let carol = user();
    let group = t.group(alice).await;
    t.join(&group.id, alice, bob).await;
    t.join(&group.id, alice, carol).await;
    t.engine
        .update_role(&group.id, carol, GroupRole::Viewer, alice)
        .await
        .unwrap();

    for permission in Permission::ALL {
        assert!(t
            .engine
            .can_perform(&group.id, alice, permission.as_str())
            .await
            .unwrap());
    }

    let engine = &t.engine;
    assert!(engine.can_perform(&group.id, bob, "manage_content").await.unwrap());
    assert!(engine.can_perform(&group.id, bob, "invite_members").await.unwrap());
    assert!(!engine.can_perform(&group.id, bob, "change_roles").await.unwrap());
    assert!(engine.can_perform(&group.id, carol, "view_content").await.unwrap());
    assert!(!engine.can_perform(&group.id, carol, "manage_content").await.unwrap());
    assert!(!engine.can_perform(&group.id, carol, "edit_group").await.unwrap());
}

#[tokio::test]
async fn test_outsiders_and_unknown_capabilities_are_denied() {
    let t = setup();
    let alice = user();
    let group = t.group(alice).await;

    assert_eq!(t.engine.get_role(&group.id, user()).await.unwrap(), None);
    assert!(!t
        .engine
        .can_perform(&group.id, user(), "view_group")
        .await
        .unwrap());
    assert!(!t
        .engine
        .can_perform(&group.id, alice, "launch_rockets")
        .await
        .unwrap());
    assert!(!t
        .engine
        .can_perform("missing1", alice, "view_group")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_permissions_lists_capability_names() {
    let t = setup();
    let alice = user();
    let bob = user();
    let group = t.group(alice).await;
    t.join(&group.id, alice, bob).await;

    let creator = t.engine.permissions(&group.id, alice).await.unwrap();
    assert_eq!(creator.len(), Permission::ALL.len());

    let member = t.engine.permissions(&group.id, bob).await.unwrap();
    assert!(member.contains("invite_members"));
    assert!(!member.contains("remove_members"));

    assert!(t.engine.permissions(&group.id, user()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_exactly_one_creator_survives_every_mutation() {
    let t = setup();
    let alice = user();
    let group = t.group(alice).await;
    let others: Vec<_> = (0..4).map(|_| user()).collect();
    for other in &others {
        t.join(&group.id, alice, *other).await;
    }

    // Every attempt to touch the creator fails; everything else succeeds
    for other in &others {
        let _ = t
            .engine
            .update_role(&group.id, alice, GroupRole::Viewer, *other)
            .await;
        let _ = t
            .engine
            .update_role(&group.id, *other, GroupRole::Creator, alice)
            .await;
        let _ = t.engine.remove_membership(&group.id, alice, *other).await;
    }
    t.engine
        .update_role(&group.id, others[0], GroupRole::Viewer, alice)
        .await
        .unwrap();
    t.engine
        .remove_membership(&group.id, others[1], alice)
        .await
        .unwrap();
    assert!(t.engine.remove_membership(&group.id, alice, alice).await.is_err());

    assert_eq!(t.store.creator_count(&group.id).await, 1);
    let members = t.engine.list_members(&group.id, alice).await.unwrap();
    assert_eq!(
        members.iter().filter(|m| m.role == GroupRole::Creator).count(),
        1
    );
    assert_eq!(members[0].user_id, alice);
    assert_eq!(members.len(), 4);
}
