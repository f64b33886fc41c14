use std::path::Path;
use std::sync::Arc;

use maadugal::{
    BroadcastHub, FileStorage, FilterCriteria, ListingStore, LoggingLauncher, StoreConfig,
    StorePorts,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🐄 maadugal - listing store");
    info!("==========================");

    let config = StoreConfig::load_or_default(Path::new("maadugal.json"))?;
    let storage = FileStorage::open("data")?;
    let hub = BroadcastHub::new(config.sync_channel.clone());
    let ports = StorePorts::new(
        Arc::new(storage),
        Arc::new(hub.endpoint()),
        Arc::new(LoggingLauncher),
    );

    let store = ListingStore::initialize(config, ports).await;
    info!("Language: {}", store.language().code());

    let listings = store.view(&FilterCriteria::default());
    info!("\n✅ {} active listings\n", listings.len());

    for (i, cow) in listings.iter().enumerate() {
        println!("{}. {} (₹{})", i + 1, cow.breed, cow.price);
        println!("   {} yrs, {} L/day", cow.age, cow.milk_yield);
        println!("   District: {}", cow.district);
        if !cow.features.is_empty() {
            println!("   Features: {}", cow.features);
        }
        println!("   Status: {}", cow.status().label());
        println!("   Expires: {}", cow.expires_at.format("%Y-%m-%d"));
        println!("   ID: {}", cow.id);
        println!();
    }

    let booked = store.booked_listings();
    info!("📌 {} booked listings", booked.len());

    store.shutdown();
    Ok(())
}
