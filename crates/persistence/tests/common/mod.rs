//! Common test utilities for PostgreSQL integration tests.
//!
//! Tests run only when `TEST_DATABASE_URL` points at a database the suite may
//! migrate. Each test works on freshly generated ids, so runs do not interfere.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use domain::models::{Group, Membership, NewGroup};
use domain::store::{CreateGroupOutcome, GroupStore};
use fake::faker::name::en::LastName;
use fake::Fake;
use persistence::db::{create_pool, run_migrations, DatabaseConfig};
use persistence::PgStore;
use uuid::Uuid;

/// Connects to the test database and applies migrations.
///
/// Returns `None` when `TEST_DATABASE_URL` is not set.
pub async fn test_store() -> Option<PgStore> {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL not set, skipping PostgreSQL test");
            return None;
        }
    };

    let config = DatabaseConfig {
        url,
        max_connections: 20,
        min_connections: 1,
        connect_timeout_secs: 30,
        idle_timeout_secs: 60,
        max_retries: 3,
    };
    let pool = create_pool(&config)
        .await
        .expect("Failed to connect to test database");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    Some(PgStore::new(pool).with_max_retries(config.max_retries))
}

/// A random group name in the allowed length range.
pub fn group_name() -> String {
    let family: String = LastName().fake();
    format!("{} household", family)
}

pub fn new_group(created_by: Uuid, now: DateTime<Utc>) -> NewGroup {
    NewGroup {
        id: shared::tokens::generate_group_id(),
        name: group_name(),
        created_by,
        created_at: now,
    }
}

/// Creates a group and returns it with the creator membership.
pub async fn create_group(store: &PgStore, created_by: Uuid) -> (Group, Membership) {
    match store
        .create_group_with_creator(new_group(created_by, Utc::now()), 10)
        .await
        .expect("Failed to create group")
    {
        CreateGroupOutcome::Created { group, creator } => (group, creator),
        other => panic!("Unexpected create outcome: {:?}", other),
    }
}
