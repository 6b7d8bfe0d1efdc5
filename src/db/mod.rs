mod models;

pub use models::*;

use anyhow::Result;
use mongodb::{
    bson::{doc, Document},
    Client, Collection,
};
use tracing::info;

/// Handles to the backing collections, acquired once at startup and shared
/// across all requests.
#[derive(Clone)]
pub struct Db {
    pub users: Collection<User>,
    pub houses: Collection<House>,
    pub booked_houses: Collection<Document>,
}

pub async fn connect(uri: &str, name: &str) -> Result<Db> {
    info!("Connecting to MongoDB database '{}'", name);

    let client = Client::with_uri_str(uri).await?;
    let database = client.database(name);

    // Fail fast on bad credentials or an unreachable cluster
    database.run_command(doc! { "ping": 1 }).await?;

    info!("Database connection established");

    Ok(Db {
        users: database.collection("users"),
        houses: database.collection("houses"),
        booked_houses: database.collection("bookedHousesList"),
    })
}
