//! Users and notes behind bearer authentication
//!
//! Run with `cargo run --example user_api`, optionally passing a config file:
//! `cargo run --example user_api -- demos/config.yaml`. Set `JWT_SECRET` to
//! override the secret from the file.

use anyhow::Result;
use crudkit::prelude::*;
use std::path::PathBuf;

impl_record!(
    Note,
    "note",
    "notes",
    {
        title: String,
        body: Option<String>,
        link: Option<String>,
    },
    schema: [
        FieldDescriptor::new("title").required().max_length(120),
        FieldDescriptor::new("link").format(FieldFormat::Url),
    ]
);

#[tokio::main]
async fn main() -> Result<()> {
    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load(path.as_deref())?;
    init_tracing(&config.logging.level);

    let users: Arc<dyn RecordStore<User>> = Arc::new(InMemoryStore::new());
    let notes: Arc<dyn RecordStore<Note>> = Arc::new(InMemoryStore::new());

    // seed a first account so that /login has someone to authenticate
    let accounts = ResourceController::new(users.clone(), SecretHasher::new(config.auth.bcrypt_cost));
    let admin = accounts
        .create(
            &[
                ("username", "admin"),
                ("email", "admin@example.com"),
                ("password", "change-me"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::from(v)))
            .collect(),
        )
        .await?;
    tracing::info!(id = %admin["id"], "seeded admin@example.com / change-me");

    println!("\n🌐 Server running on http://{}", config.addr());
    println!("\n  POST   /login              - Get a bearer token");
    println!("  GET    /whoami             - Identity of the token");
    println!("  GET    /users | /notes     - List");
    println!("  POST   /users | /notes     - Create");
    println!("  GET    /notes/{{id}}         - Retrieve");
    println!("  PATCH  /notes/{{id}}         - Partial update");
    println!("  DELETE /notes/{{id}}         - Delete\n");

    ServerBuilder::new(config)
        .register_resource::<User>(users.clone())
        .register_resource::<Note>(notes)
        .with_login::<User>(users)?
        .serve()
        .await
}
