pub mod draft;
pub mod language;

pub use draft::{
    parse_drive_links, Field, ListingDraft, MediaContent, MediaFile, ValidatedDraft,
    ValidationErrors,
};
pub use language::{Language, TN_DISTRICTS};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::clock::truncate_to_millis;

/// Embedded media payloads produced while creating a listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddedMedia {
    pub images: Vec<String>,
    pub video: Option<String>,
}

/// A cow offered for sale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub breed: String,
    /// Age in years
    pub age: f64,
    /// Litres per day
    pub milk_yield: f64,
    /// Price in rupees
    pub price: f64,
    pub district: String,
    #[serde(default)]
    pub features: String,
    /// Embedded images as data URLs
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub video: Option<String>,
    #[serde(default)]
    pub image_drive_links: Vec<String>,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub video_drive_link: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
    /// Derived from `expires_at`; recomputed on every load
    #[serde(default)]
    pub expired: bool,
    #[serde(default)]
    pub booked: bool,
}

/// The two independent lifecycle flags of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListingStatus {
    pub expired: bool,
    pub booked: bool,
}

impl ListingStatus {
    pub fn label(&self) -> &'static str {
        match (self.expired, self.booked) {
            (false, false) => "Active",
            (false, true) => "Booked",
            (true, false) => "Expired",
            (true, true) => "Expired, Booked",
        }
    }
}

impl Listing {
    /// Build a fresh listing from a validated draft.
    ///
    /// `expires_at` is fixed to `created_at + ttl` here and never changes afterwards.
    pub fn new(
        id: String,
        draft: ValidatedDraft,
        media: EmbeddedMedia,
        created_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let created_at = truncate_to_millis(created_at);
        let fields = draft.into_fields();
        Self {
            id,
            breed: fields.breed,
            age: fields.age,
            milk_yield: fields.milk_yield,
            price: fields.price,
            district: fields.district,
            features: fields.features,
            images: media.images,
            video: media.video,
            image_drive_links: fields.image_drive_links,
            video_drive_link: fields.video_drive_link,
            created_at,
            expires_at: created_at + ttl,
            expired: false,
            booked: false,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn status(&self) -> ListingStatus {
        ListingStatus {
            expired: self.expired,
            booked: self.booked,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
