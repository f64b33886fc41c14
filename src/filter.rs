use serde::{Deserialize, Serialize};

use crate::models::Listing;

/// Display ordering of a listing view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most recently created first
    #[default]
    Newest,
}

/// Criteria of a listing view. The default is the cleared filter state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub district: Option<String>,
    pub active_only: bool,
    pub sort: SortOrder,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            district: None,
            active_only: true,
            sort: SortOrder::Newest,
        }
    }
}

impl FilterCriteria {
    pub fn district(mut self, district: impl Into<String>) -> Self {
        self.district = Some(district.into());
        self
    }

    pub fn include_expired(mut self) -> Self {
        self.active_only = false;
        self
    }
}

/// Project `listings` through `criteria` without touching the input
pub fn filtered_view(listings: &[Listing], criteria: &FilterCriteria) -> Vec<Listing> {
    let mut view: Vec<Listing> = listings
        .iter()
        .filter(|l| match &criteria.district {
            Some(district) => &l.district == district,
            None => true,
        })
        .filter(|l| !(criteria.active_only && l.expired))
        .cloned()
        .collect();

    match criteria.sort {
        SortOrder::Newest => view.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
    view
}
