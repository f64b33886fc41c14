use chrono::{DateTime, Utc};

use crate::models::Listing;

/// Recompute the `expired` flag of every listing against `now`.
///
/// Nothing is removed; hiding expired listings is the job of the filtered view.
pub fn prune(listings: Vec<Listing>, now: DateTime<Utc>) -> Vec<Listing> {
    listings
        .into_iter()
        .map(|mut listing| {
            listing.expired = listing.is_expired_at(now);
            listing
        })
        .collect()
}
