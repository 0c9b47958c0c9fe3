//! Seed script for development — populates the key-value store with demo
//! users, friendships, pending requests and a short chat history.
//!
//! Usage: `cargo run --bin seed`
//!
//! Reads the same environment as the server (`SESSION_SECRET`, `STORE_BACKEND`,
//! `REDIS_URL` or the REST variables; `.env` is honoured).

use chatdash::config::AppConfig;
use chatdash::models::friend::Message;
use chatdash::models::user::User;
use chatdash::services::auth;
use chatdash::store::{self, keys, KeyValueStore};
use chrono::Utc;
use uuid::Uuid;

const DEMO_PASSWORD: &str = "Test123!";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let store = store::connect(&config).await?;

    println!("=== Chat dashboard seed ===");

    let ada = demo_user("ada", "Ada Lovelace", Some("https://i.pravatar.cc/150?u=ada"));
    let grace = demo_user("grace", "Grace Hopper", Some("https://i.pravatar.cc/150?u=grace"));
    let alan = demo_user("alan", "Alan Turing", None);
    let edsger = demo_user("edsger", "Edsger Dijkstra", None);

    for user in [&ada, &grace, &alan, &edsger] {
        auth::register_user(store.as_ref(), user, DEMO_PASSWORD).await?;
    }
    println!("[done] Registered 4 users");

    befriend(store.as_ref(), &ada, &grace).await?;
    befriend(store.as_ref(), &ada, &alan).await?;
    println!("[done] Ada is friends with Grace and Alan");

    store::sadd(
        store.as_ref(),
        &keys::incoming_friend_requests(&ada.id),
        &edsger.id,
    )
    .await?;
    println!("[done] Edsger sent Ada a friend request");

    let now = Utc::now().timestamp_millis();
    send(store.as_ref(), &ada, &grace, "Did you find the bug?", now - 60_000).await?;
    send(store.as_ref(), &grace, &ada, "It was a moth.", now).await?;
    println!("[done] Wrote chat history");

    println!("\n=== Seed complete! ===");
    println!("Sign in: {} / {DEMO_PASSWORD}", ada.email);

    Ok(())
}

fn demo_user(handle: &str, name: &str, image: Option<&str>) -> User {
    User {
        id: handle.to_string(),
        name: name.to_string(),
        email: format!("{handle}@chat.local"),
        image: image.map(str::to_string),
    }
}

async fn befriend(store: &dyn KeyValueStore, a: &User, b: &User) -> anyhow::Result<()> {
    store::sadd(store, &keys::friends(&a.id), &b.id).await?;
    store::sadd(store, &keys::friends(&b.id), &a.id).await?;
    Ok(())
}

async fn send(
    store: &dyn KeyValueStore,
    from: &User,
    to: &User,
    text: &str,
    timestamp: i64,
) -> anyhow::Result<()> {
    let message = Message {
        id: Uuid::new_v4().to_string(),
        sender_id: from.id.clone(),
        text: text.to_string(),
        timestamp,
    };
    let key = keys::chat_messages(&keys::chat_id(&from.id, &to.id));
    store::zadd(store, &key, timestamp, &serde_json::to_string(&message)?).await?;
    Ok(())
}
