//! Fixtures shared by the service and router tests.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    db::{memorydb::MemoryDB, MarketStore},
    models::usermodel::{User, UserRole},
};

pub fn user_with_role(role: UserRole) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        name: format!("{} user", role.to_str()),
        email: format!("{}@example.com", Uuid::new_v4()),
        password: String::new(),
        role,
        bio: None,
        skills: Vec::new(),
        company: None,
        rating: 0.0,
        ratings_count: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn memory_store() -> Arc<dyn MarketStore> {
    Arc::new(MemoryDB::new())
}

pub async fn seed_user(db_client: &Arc<dyn MarketStore>, name: &str, role: UserRole) -> User {
    db_client
        .save_user(
            name.to_string(),
            format!("{}@example.com", name.to_lowercase()),
            "hashed".to_string(),
            role,
            None,
            if role == UserRole::Freelancer {
                vec!["rust".to_string()]
            } else {
                Vec::new()
            },
            None,
        )
        .await
        .expect("seed user")
}

pub fn next_week() -> chrono::DateTime<Utc> {
    Utc::now() + Duration::days(7)
}
