use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::contact::{ContactHandoff, ContactIntent, ContactLauncher};
use crate::error::{StorageError, StoreError};
use crate::expiry::prune;
use crate::filter::{filtered_view, FilterCriteria};
use crate::media::embed_media;
use crate::models::{Language, Listing, ListingDraft};
use crate::storage::{KeyValueStorage, ListingRepository};
use crate::sync::SyncChannel;

/// External collaborators a store is built from
#[derive(Clone)]
pub struct StorePorts {
    pub storage: Arc<dyn KeyValueStorage>,
    pub sync: Arc<dyn SyncChannel>,
    pub launcher: Arc<dyn ContactLauncher>,
    pub clock: Arc<dyn Clock>,
}

impl StorePorts {
    /// Ports using the wall clock
    pub fn new(
        storage: Arc<dyn KeyValueStorage>,
        sync: Arc<dyn SyncChannel>,
        launcher: Arc<dyn ContactLauncher>,
    ) -> Self {
        Self {
            storage,
            sync,
            launcher,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

#[derive(Debug, Default)]
struct StoreState {
    listings: Vec<Listing>,
    selected: Option<String>,
    /// False while `listings` may be missing what storage holds, because the
    /// last read failed. Writes must reload first.
    in_sync_with_storage: bool,
}

/// State shared with the background tasks
struct Shared {
    config: StoreConfig,
    repo: ListingRepository,
    contact: ContactHandoff,
    clock: Arc<dyn Clock>,
    state: Mutex<StoreState>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, StoreState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Reload from storage, recompute expiry, adopt and write back.
    ///
    /// A failed read skips the cycle: memory is kept and nothing is written,
    /// so a transient backend error cannot wipe the stored collection.
    fn refresh(&self) -> Result<(), StorageError> {
        let mut state = self.state();
        let loaded = match self.repo.try_load() {
            Ok(listings) => listings,
            Err(e) => {
                warn!("Skipping refresh, storage read failed: {}", e);
                return Err(e);
            }
        };
        state.listings = prune(loaded, self.clock.now());
        state.in_sync_with_storage = true;
        self.repo.save(&state.listings)
    }

    /// Before a write, reload if the last read from storage failed
    fn reload_if_stale(&self, state: &mut StoreState) -> Result<(), StorageError> {
        if !state.in_sync_with_storage {
            let loaded = self.repo.try_load().map_err(|e| {
                warn!("Refusing to write, storage is still unreadable: {}", e);
                e
            })?;
            state.listings = prune(loaded, self.clock.now());
            state.in_sync_with_storage = true;
            info!("Recovered {} listings from storage", state.listings.len());
        }
        Ok(())
    }

    /// Take over a collection received from another context
    fn adopt(&self, listings: Vec<Listing>) {
        let listings = prune(listings, self.clock.now());
        debug!("Adopting {} listings from another context", listings.len());
        let mut state = self.state();
        state.listings = listings;
        state.in_sync_with_storage = true;
    }
}

/// The in-memory source of truth for listings.
///
/// All mutations go through a single lock that is never held across an
/// `.await`, so user intents, the periodic refresh and inbound sync messages
/// each apply atomically.
///
/// Storage is synchronous. `create`, `book` and `set_language` write to it on
/// the calling task; the periodic refresh runs on the blocking pool.
pub struct ListingStore {
    shared: Arc<Shared>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ListingStore {
    /// Load and prune the stored collection without starting background work
    pub fn open(config: StoreConfig, ports: StorePorts) -> Self {
        let repo = ListingRepository::new(ports.storage, ports.sync, &config);
        let contact = ContactHandoff::new(&config, ports.launcher);
        if let Err(e) = config.validate() {
            warn!("Config out of range, clamping: {}", e);
        }
        let (listings, in_sync_with_storage) = match repo.try_load() {
            Ok(listings) => (prune(listings, ports.clock.now()), true),
            Err(e) => {
                warn!("Failed to read listings, starting empty until storage recovers: {}", e);
                (Vec::new(), false)
            }
        };
        info!("Loaded {} listings", listings.len());

        Self {
            shared: Arc::new(Shared {
                config,
                repo,
                contact,
                clock: ports.clock,
                state: Mutex::new(StoreState {
                    listings,
                    selected: None,
                    in_sync_with_storage,
                }),
            }),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Open the store, then start the periodic refresh and the sync listener
    pub async fn initialize(config: StoreConfig, ports: StorePorts) -> Self {
        let store = Self::open(config, ports);
        store.start();
        store
    }

    fn tasks(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        match self.tasks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Start background work. Must run inside a tokio runtime; calling it
    /// again while running does nothing.
    pub fn start(&self) {
        let mut tasks = self.tasks();
        if !tasks.is_empty() {
            return;
        }

        let period = self.shared.config.refresh_interval();
        let shared = Arc::clone(&self.shared);
        tasks.push(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let shared = Arc::clone(&shared);
                match tokio::task::spawn_blocking(move || shared.refresh()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!("Periodic refresh failed: {}", e),
                    Err(e) => warn!("Periodic refresh task failed: {}", e),
                }
            }
        }));

        match self.shared.repo.sync().subscribe() {
            Some(mut subscription) => {
                let shared = Arc::clone(&self.shared);
                tasks.push(tokio::spawn(async move {
                    while let Some(listings) = subscription.recv().await {
                        shared.adopt(listings);
                    }
                    debug!("Sync channel closed");
                }));
            }
            None => debug!("Sync channel unsupported, not listening"),
        }
        info!("Store started, refreshing every {:?}", period);
    }

    /// Stop the periodic refresh and the sync listener
    pub fn shutdown(&self) {
        let mut tasks = self.tasks();
        for task in tasks.drain(..) {
            task.abort();
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.shared.config
    }

    pub fn sync_supported(&self) -> bool {
        self.shared.repo.sync().is_supported()
    }

    /// Run one refresh cycle now
    pub fn refresh(&self) -> Result<(), StoreError> {
        Ok(self.shared.refresh()?)
    }

    /// Snapshot of the collection in stored order (newest created first)
    pub fn listings(&self) -> Vec<Listing> {
        self.shared.state().listings.clone()
    }

    /// Every booked listing, expired or not
    pub fn booked_listings(&self) -> Vec<Listing> {
        self.shared
            .state()
            .listings
            .iter()
            .filter(|l| l.booked)
            .cloned()
            .collect()
    }

    pub fn view(&self, criteria: &FilterCriteria) -> Vec<Listing> {
        filtered_view(&self.shared.state().listings, criteria)
    }

    pub fn get(&self, id: &str) -> Option<Listing> {
        self.shared
            .state()
            .listings
            .iter()
            .find(|l| l.id == id)
            .cloned()
    }

    /// Validate, embed media, persist and announce a new listing.
    ///
    /// Nothing is stored when validation, media reading or the storage write
    /// fails.
    pub async fn create(&self, draft: ListingDraft) -> Result<Listing, StoreError> {
        let validated = draft.validate(&self.shared.config)?;
        let media = embed_media(&validated, &self.shared.config).await?;
        let now = self.shared.clock.now();

        let listing = {
            let mut state = self.shared.state();
            self.shared.reload_if_stale(&mut state)?;
            let id = unique_id(&state.listings);
            let listing = Listing::new(id, validated, media, now, self.shared.config.listing_ttl());

            let mut next = Vec::with_capacity(state.listings.len() + 1);
            next.push(listing.clone());
            next.extend(state.listings.iter().cloned());
            self.shared.repo.save(&next)?;
            state.listings = next;
            listing
        };

        info!(
            "Created listing {} ({} in {})",
            listing.id, listing.breed, listing.district
        );
        self.shared
            .contact
            .send(ContactIntent::NewListing(&listing))
            .await;
        Ok(listing)
    }

    /// Mark a listing as booked and send a booking request.
    ///
    /// Booking an already booked listing changes nothing but still sends the
    /// request again.
    pub async fn book(&self, id: &str) -> Result<Listing, StoreError> {
        let listing = {
            let mut state = self.shared.state();
            self.shared.reload_if_stale(&mut state)?;
            let Some(index) = state.listings.iter().position(|l| l.id == id) else {
                warn!("Cannot book unknown listing {}", id);
                return Err(StoreError::NotFound(id.to_string()));
            };

            if !state.listings[index].booked {
                let mut next = state.listings.clone();
                next[index].booked = true;
                self.shared.repo.save(&next)?;
                state.listings = next;
            } else {
                self.shared.repo.save(&state.listings)?;
            }
            state.listings[index].clone()
        };

        info!("Booking requested for listing {}", listing.id);
        self.shared
            .contact
            .send(ContactIntent::BookingRequest(&listing))
            .await;
        Ok(listing)
    }

    /// Open the support chat
    pub async fn contact_support(&self) {
        self.shared.contact.send(ContactIntent::Support).await;
    }

    /// Select a listing for the detail view
    pub fn select(&self, id: &str) -> Result<Listing, StoreError> {
        let mut state = self.shared.state();
        let listing = state
            .listings
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        state.selected = Some(listing.id.clone());
        Ok(listing)
    }

    /// The selected listing as it currently stands
    pub fn selected(&self) -> Option<Listing> {
        let state = self.shared.state();
        let id = state.selected.as_deref()?;
        state.listings.iter().find(|l| l.id == id).cloned()
    }

    pub fn clear_selection(&self) {
        self.shared.state().selected = None;
    }

    pub fn language(&self) -> Language {
        self.shared.repo.load_language()
    }

    pub fn set_language(&self, language: Language) -> Result<(), StoreError> {
        self.shared.repo.save_language(language)?;
        debug!("Language set to {}", language.code());
        Ok(())
    }
}

impl Drop for ListingStore {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn unique_id(existing: &[Listing]) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !existing.iter().any(|l| l.id == id) {
            return id;
        }
    }
}
