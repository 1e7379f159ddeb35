#![allow(dead_code)]

use actix_web::web;
use marketfeedback::db::Database;
use marketfeedback::models::{Role, TargetKind};

pub struct Fixture {
    pub db: Database,
    pub user_id: i64,
    pub user_token: &'static str,
    pub other_token: &'static str,
    pub admin_token: &'static str,
    pub service_id: i64,
    pub event_id: i64,
    pub business_id: i64,
}

// In-memory database with a user, a second user, an admin and one listing of each kind
pub async fn fixture() -> Fixture {
    let db = Database::new(":memory:").unwrap();
    db.create_schema().await.unwrap();

    let user_id = db
        .insert_user("Grace", "Hopper", "grace@example.com", Some("avatars/grace.png"), Role::User)
        .await
        .unwrap();
    let other_id = db
        .insert_user("Alan", "Turing", "alan@example.com", None, Role::User)
        .await
        .unwrap();
    let admin_id = db
        .insert_user("Ada", "Lovelace", "ada@example.com", None, Role::Admin)
        .await
        .unwrap();
    db.insert_api_token("user-token", user_id).await.unwrap();
    db.insert_api_token("other-token", other_id).await.unwrap();
    db.insert_api_token("admin-token", admin_id).await.unwrap();

    let service_id = db.insert_target(TargetKind::Service, "Web design").await.unwrap();
    let event_id = db.insert_target(TargetKind::Event, "Food festival").await.unwrap();
    let business_id = db.insert_target(TargetKind::Business, "Corner cafe").await.unwrap();

    Fixture {
        db,
        user_id,
        user_token: "user-token",
        other_token: "other-token",
        admin_token: "admin-token",
        service_id,
        event_id,
        business_id,
    }
}

pub fn data(db: &Database) -> web::Data<Database> {
    web::Data::new(db.clone())
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}
