//! Common fixtures for engine tests.
//!
//! Every test gets its own in-memory store and a manual clock, so tests can
//! run in parallel and move time without sleeping.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use domain::models::{Group, Invitation};
use domain::services::ManualClock;
use domain::store::InvitationStore;
use fake::faker::name::en::LastName;
use fake::Fake;
use persistence::InMemoryStore;
use pet_groups_engine::config::LimitsConfig;
use pet_groups_engine::GroupEngine;
use uuid::Uuid;

pub struct TestEngine {
    pub engine: GroupEngine,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<ManualClock>,
}

/// Engine over a fresh store with default limits, clock frozen at a fixed instant.
pub fn setup() -> TestEngine {
    setup_with_limits(LimitsConfig::default())
}

pub fn setup_with_limits(limits: LimitsConfig) -> TestEngine {
    let store = Arc::new(InMemoryStore::new());
    let start = Utc
        .with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
        .single()
        .expect("valid start time");
    let clock = Arc::new(ManualClock::new(start));
    let engine = GroupEngine::new(store.clone(), clock.clone(), limits);
    TestEngine {
        engine,
        store,
        clock,
    }
}

/// A random group name in the allowed length range.
pub fn group_name() -> String {
    let family: String = LastName().fake();
    format!("{} household", family)
}

pub fn user() -> Uuid {
    Uuid::new_v4()
}

impl TestEngine {
    /// Creates a group owned by `creator`.
    pub async fn group(&self, creator: Uuid) -> Group {
        self.engine
            .create_group(&group_name(), creator)
            .await
            .expect("Failed to create group")
    }

    /// Invites and admits `user` to `group_id` as a MEMBER, invited by `inviter`.
    pub async fn join(&self, group_id: &str, inviter: Uuid, user: Uuid) {
        let (_, code) = self
            .engine
            .create_invitation(group_id, inviter)
            .await
            .expect("Failed to create invitation");
        self.engine
            .redeem_invitation(&code, user)
            .await
            .expect("Failed to redeem invitation");
    }

    /// The stored invitation row for `code`, read straight from the store.
    pub async fn store_invitation(&self, code: &str) -> Option<Invitation> {
        self.store
            .find_invitation_by_code(code)
            .await
            .expect("Failed to read invitation")
    }
}
