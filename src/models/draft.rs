use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::config::StoreConfig;

/// Where the bytes of an attached file come from
#[derive(Debug, Clone, PartialEq)]
pub enum MediaContent {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// A file attached to a listing draft, with its declared metadata
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFile {
    pub name: String,
    /// Declared media type, e.g. `image/jpeg`
    pub media_type: String,
    /// Declared size in bytes
    pub size: u64,
    pub content: MediaContent,
}

impl MediaFile {
    pub fn from_bytes(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: bytes.len() as u64,
            content: MediaContent::Bytes(bytes),
        }
    }

    pub fn from_path(
        name: impl Into<String>,
        media_type: impl Into<String>,
        size: u64,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size,
            content: MediaContent::Path(path.into()),
        }
    }
}

/// User input for a new listing, before validation
#[derive(Debug, Clone, Default)]
pub struct ListingDraft {
    pub breed: String,
    pub age: f64,
    pub milk_yield: f64,
    pub price: f64,
    pub district: String,
    pub features: String,
    pub image_files: Vec<MediaFile>,
    pub video_file: Option<MediaFile>,
    pub image_drive_links: Vec<String>,
    pub video_drive_link: String,
}

/// Form field a validation message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Breed,
    Age,
    MilkYield,
    Price,
    District,
    Images,
    Video,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Breed => "breed",
            Field::Age => "age",
            Field::MilkYield => "milkYield",
            Field::Price => "price",
            Field::District => "district",
            Field::Images => "images",
            Field::Video => "video",
        }
    }
}

/// Per-field validation messages. At most one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    /// Later messages for the same field replace earlier ones
    fn set(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// The size-limit message for an attachment field
    pub(crate) fn too_large(field: Field, config: &StoreConfig) -> Self {
        let mut errors = Self::default();
        errors.set(field, size_limit_message(field, config));
        errors
    }
}

fn size_limit_message(field: Field, config: &StoreConfig) -> String {
    match field {
        Field::Video => format!("Video must be <= {}MB", config.max_video_mb()),
        _ => format!("Each image must be <= {}MB", config.max_image_mb()),
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field.as_str(), message)?;
            first = false;
        }
        Ok(())
    }
}

/// Normalized listing fields that passed validation
#[derive(Debug, Clone)]
pub(crate) struct DraftFields {
    pub breed: String,
    pub age: f64,
    pub milk_yield: f64,
    pub price: f64,
    pub district: String,
    pub features: String,
    pub image_drive_links: Vec<String>,
    pub video_drive_link: Option<String>,
}

/// A draft that passed validation. Only obtainable from [`ListingDraft::validate`].
#[derive(Debug, Clone)]
pub struct ValidatedDraft {
    fields: DraftFields,
    image_files: Vec<MediaFile>,
    video_file: Option<MediaFile>,
}

impl ValidatedDraft {
    pub fn image_files(&self) -> &[MediaFile] {
        &self.image_files
    }

    pub fn video_file(&self) -> Option<&MediaFile> {
        self.video_file.as_ref()
    }

    pub(crate) fn into_fields(self) -> DraftFields {
        self.fields
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl ListingDraft {
    /// Check every field and normalize the text inputs.
    pub fn validate(self, config: &StoreConfig) -> Result<ValidatedDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let breed = self.breed.trim().to_string();
        if breed.is_empty() {
            errors.set(Field::Breed, "Required");
        }
        if !is_positive(self.age) {
            errors.set(Field::Age, "Invalid");
        }
        if !is_positive(self.milk_yield) {
            errors.set(Field::MilkYield, "Invalid");
        }
        if !is_positive(self.price) {
            errors.set(Field::Price, "Invalid");
        }
        let district = self.district.trim().to_string();
        if district.is_empty() {
            errors.set(Field::District, "Required");
        }

        for file in &self.image_files {
            if !file.media_type.starts_with("image/") {
                errors.set(Field::Images, "Images only");
            }
            if file.size > config.max_image_bytes {
                errors.set(Field::Images, size_limit_message(Field::Images, config));
            }
        }
        if let Some(video) = &self.video_file {
            if !video.media_type.starts_with("video/") {
                errors.set(Field::Video, "Video only");
            }
            if video.size > config.max_video_bytes {
                errors.set(Field::Video, size_limit_message(Field::Video, config));
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let video_drive_link = Some(self.video_drive_link.trim().to_string()).filter(|s| !s.is_empty());
        Ok(ValidatedDraft {
            fields: DraftFields {
                breed,
                age: self.age,
                milk_yield: self.milk_yield,
                price: self.price,
                district,
                features: self.features.trim().to_string(),
                image_drive_links: self
                    .image_drive_links
                    .into_iter()
                    .map(|link| link.trim().to_string())
                    .filter(|link| !link.is_empty())
                    .collect(),
                video_drive_link,
            },
            image_files: self.image_files,
            video_file: self.video_file,
        })
    }
}

/// Split a comma separated list of drive links, dropping blanks
pub fn parse_drive_links(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
