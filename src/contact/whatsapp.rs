use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::contact::traits::ContactLauncher;
use crate::models::Listing;

/// Why the marketplace admin is being contacted
#[derive(Debug, Clone, Copy)]
pub enum ContactIntent<'a> {
    NewListing(&'a Listing),
    BookingRequest(&'a Listing),
    Support,
}

impl ContactIntent<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            ContactIntent::NewListing(_) => "new-listing",
            ContactIntent::BookingRequest(_) => "booking-request",
            ContactIntent::Support => "support",
        }
    }

    /// Pre-filled message text for the admin
    pub fn message(&self) -> String {
        match self {
            ContactIntent::NewListing(l) => {
                let features = if l.features.is_empty() { "-" } else { l.features.as_str() };
                let video = l.video_drive_link.as_deref().unwrap_or("Attached");
                let images = if l.image_drive_links.is_empty() {
                    "Attached".to_string()
                } else {
                    l.image_drive_links.join(", ")
                };
                format!(
                    "New Cow Listing on maadugal\n\
                     Breed: {}\n\
                     Age: {}\n\
                     Milk Yield: {} L/day\n\
                     District: {}\n\
                     Price: ₹{}\n\
                     Features: {}\n\
                     Video: {}\n\
                     Images: {}\n\
                     Listing ID: {}",
                    l.breed,
                    format_number(l.age),
                    format_number(l.milk_yield),
                    l.district,
                    format_number(l.price),
                    features,
                    video,
                    images,
                    l.id
                )
            }
            ContactIntent::BookingRequest(l) => format!(
                "Booking request on maadugal\n\
                 Listing ID: {}\n\
                 Breed: {}\n\
                 District: {}\n\
                 Price: ₹{}\n\
                 Please assist with this booking.",
                l.id,
                l.breed,
                l.district,
                format_number(l.price)
            ),
            ContactIntent::Support => "Hi maadugal support, I need help.".to_string(),
        }
    }
}

/// Whole numbers print without a fractional part, like form input
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

/// Builds WhatsApp deep-links to the admin and opens them
pub struct ContactHandoff {
    phone: String,
    launcher: Arc<dyn ContactLauncher>,
}

impl ContactHandoff {
    pub fn new(config: &StoreConfig, launcher: Arc<dyn ContactLauncher>) -> Self {
        Self {
            phone: format!("{}{}", config.country_code, config.admin_whatsapp),
            launcher,
        }
    }

    pub fn link(&self, intent: &ContactIntent<'_>) -> String {
        format!(
            "https://wa.me/{}?text={}",
            self.phone,
            urlencoding::encode(&intent.message())
        )
    }

    /// Open the link for `intent`. A launcher failure is logged, not returned.
    pub async fn send(&self, intent: ContactIntent<'_>) {
        let url = self.link(&intent);
        debug!(
            "Opening {} link via {} launcher",
            intent.kind(),
            self.launcher.launcher_name()
        );
        if let Err(e) = self.launcher.open(&url).await {
            warn!("Failed to open {} contact link: {:#}", intent.kind(), e);
        }
    }
}
