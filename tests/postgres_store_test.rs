//! Runs against a real database: `DATABASE_URL=... cargo test -- --ignored`.

use std::env;
use std::sync::Arc;

use jobboard_backend::{
    database::{pool::run_migrations, BlockableStore, PgStore, Store, UserStore},
    models::user::{NewUser, Role, User},
    services::{audit_service::AuditService, lifecycle_service::LifecycleService},
    utils::crypto::hash_password,
};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

#[tokio::test]
#[ignore]
async fn postgres_block_is_a_single_conditional_write() {
    dotenvy::dotenv().ok();
    let url = env::var("DATABASE_URL").expect("DATABASE_URL");
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("pool");
    run_migrations(&pool).await.expect("migrations");

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
    let tag = Uuid::new_v4().simple().to_string();
    let user = store
        .insert_user(NewUser {
            role: Role::Candidate,
            email: format!("pg_{}@example.com", tag),
            mobile: format!("+1{:010}", Uuid::new_v4().as_u128() % 10_000_000_000),
            password_hash: hash_password("correct-horse-battery").unwrap(),
        })
        .await
        .expect("seed user");

    let actor = Uuid::new_v4();
    assert!(BlockableStore::<User>::transition_active(store.as_ref(), user.id, true, false)
        .await
        .unwrap());
    assert!(!BlockableStore::<User>::transition_active(store.as_ref(), user.id, true, false)
        .await
        .unwrap());

    let audit = AuditService::new(store.clone());
    let lifecycle = LifecycleService::new(store.clone(), audit.clone());
    let restored: User = lifecycle.unblock(actor, user.id, None).await.unwrap();
    assert!(restored.is_active);
    assert_eq!(restored.email, user.email);
    audit.drain().await;
}
