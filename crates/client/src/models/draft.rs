//! Vendor product draft types.
//!
//! A [`Draft`] is the in-progress product record edited across the three
//! wizard steps. File slots hold live [`AttachedFile`] handles next to their
//! serializable [`FileMetadata`] shadows; the two are only ever changed
//! together through [`Draft::apply`].

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use marketplace_core::{CategoryId, FileMetadata, LicenseType, Price};
use thiserror::Error;
use url::Url;

/// Basic information: name, description, price, category.
pub const STEP_BASIC_INFO: u8 = 1;
/// Delivery: downloadable file or external link, plus thumbnail.
pub const STEP_DELIVERY: u8 = 2;
/// Review and confirm.
pub const STEP_REVIEW: u8 = 3;
/// Last step of the wizard.
pub const LAST_STEP: u8 = STEP_REVIEW;

// =============================================================================
// Files
// =============================================================================

/// A live file handle picked by the vendor.
///
/// Holds the file contents in memory so that the submission API can upload
/// them. Intentionally not serializable: only its [`FileMetadata`] survives
/// persistence.
#[derive(Clone, PartialEq, Eq)]
pub struct AttachedFile {
    name: String,
    mime_type: Option<String>,
    contents: Arc<[u8]>,
}

impl AttachedFile {
    /// Wrap in-memory contents.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        mime_type: Option<String>,
        contents: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type,
            contents: contents.into(),
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    ///
    /// # Errors
    ///
    /// Returns `std::io::Error` if the file cannot be read.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let contents = std::fs::read(path)?;
        let name = path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_owned());
        Ok(Self::new(name, mime_type, contents))
    }

    /// File name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIME type, when known.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        u64::try_from(self.contents.len()).unwrap_or(u64::MAX)
    }

    /// File contents.
    #[must_use]
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }
}

// Contents are left out so that debug logs stay readable.
impl fmt::Debug for AttachedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachedFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.contents.len())
            .finish()
    }
}

/// Summarize a file slot for persistence.
///
/// `None` in, `None` out: a cleared slot always clears its shadow.
#[must_use]
pub fn derive_metadata(file: Option<&AttachedFile>) -> Option<FileMetadata> {
    file.map(|f| FileMetadata {
        name: f.name.clone(),
        size: f.size(),
        mime_type: f.mime_type.clone(),
    })
}

/// Summarize every file of a multi-file slot.
#[must_use]
pub fn derive_all_metadata(files: &[AttachedFile]) -> Vec<FileMetadata> {
    files.iter().filter_map(|f| derive_metadata(Some(f))).collect()
}

/// The four file-bearing fields of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileSlot {
    /// The downloadable product file.
    File,
    /// Listing thumbnail.
    Thumbnail,
    /// Optional preview (sample pages, demo clip).
    Preview,
    /// Gallery images.
    Images,
}

impl fmt::Display for FileSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Thumbnail => write!(f, "thumbnail"),
            Self::Preview => write!(f, "preview"),
            Self::Images => write!(f, "images"),
        }
    }
}

impl std::str::FromStr for FileSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Self::File),
            "thumbnail" => Ok(Self::Thumbnail),
            "preview" => Ok(Self::Preview),
            "images" => Ok(Self::Images),
            _ => Err(format!("invalid file slot: {s}")),
        }
    }
}

// =============================================================================
// Draft
// =============================================================================

/// The in-progress product record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Draft {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub original_price: Option<Price>,
    pub discount_percentage: Option<u8>,
    pub category_id: CategoryId,
    pub requirements: String,
    pub instructions: String,
    pub license_type: LicenseType,
    /// License duration in days, for time-bound licenses.
    pub license_duration: Option<u32>,
    pub download_limit: Option<u32>,
    pub tags: Vec<String>,
    pub features: Vec<String>,
    /// Deliver through `link_url` instead of an uploaded file.
    pub is_link: bool,
    pub link_url: String,

    pub file: Option<AttachedFile>,
    pub thumbnail: Option<AttachedFile>,
    pub preview: Option<AttachedFile>,
    pub images: Vec<AttachedFile>,

    pub file_metadata: Option<FileMetadata>,
    pub thumbnail_metadata: Option<FileMetadata>,
    pub preview_metadata: Option<FileMetadata>,
    pub images_metadata: Vec<FileMetadata>,
}

impl Draft {
    /// Merge `update` into the draft, field by field.
    ///
    /// Every file slot present in the update has its metadata shadow
    /// recomputed here, including explicit clears.
    pub fn apply(&mut self, update: DraftUpdate) {
        let DraftUpdate {
            name,
            description,
            price,
            original_price,
            discount_percentage,
            category_id,
            requirements,
            instructions,
            license_type,
            license_duration,
            download_limit,
            tags,
            features,
            is_link,
            link_url,
            file,
            thumbnail,
            preview,
            images,
        } = update;

        if let Some(v) = name {
            self.name = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = price {
            self.price = v;
        }
        if let Some(v) = original_price {
            self.original_price = v;
        }
        if let Some(v) = discount_percentage {
            self.discount_percentage = v;
        }
        if let Some(v) = category_id {
            self.category_id = v;
        }
        if let Some(v) = requirements {
            self.requirements = v;
        }
        if let Some(v) = instructions {
            self.instructions = v;
        }
        if let Some(v) = license_type {
            self.license_type = v;
        }
        if let Some(v) = license_duration {
            self.license_duration = v;
        }
        if let Some(v) = download_limit {
            self.download_limit = v;
        }
        if let Some(v) = tags {
            self.tags = v;
        }
        if let Some(v) = features {
            self.features = v;
        }
        if let Some(v) = is_link {
            self.is_link = v;
        }
        if let Some(v) = link_url {
            self.link_url = v;
        }

        if let Some(v) = file {
            self.file_metadata = derive_metadata(v.as_ref());
            self.file = v;
        }
        if let Some(v) = thumbnail {
            self.thumbnail_metadata = derive_metadata(v.as_ref());
            self.thumbnail = v;
        }
        if let Some(v) = preview {
            self.preview_metadata = derive_metadata(v.as_ref());
            self.preview = v;
        }
        if let Some(v) = images {
            self.images_metadata = derive_all_metadata(&v);
            self.images = v;
        }
    }

    /// Whether the given wizard step may be left.
    ///
    /// Unknown step numbers are never valid.
    #[must_use]
    pub fn is_step_valid(&self, step: u8) -> bool {
        match step {
            STEP_BASIC_INFO => {
                !self.name.trim().is_empty()
                    && !self.description.trim().is_empty()
                    && self.price.is_positive()
                    && !self.category_id.is_blank()
            }
            STEP_DELIVERY => {
                if self.is_link {
                    self.parsed_link_url().is_some() && self.thumbnail_metadata.is_some()
                } else {
                    self.file_metadata.is_some() && self.thumbnail_metadata.is_some()
                }
            }
            STEP_REVIEW => true,
            _ => false,
        }
    }

    /// The delivery link, if it is non-blank and an absolute URL.
    #[must_use]
    pub fn parsed_link_url(&self) -> Option<Url> {
        let link = self.link_url.trim();
        if link.is_empty() {
            return None;
        }
        Url::parse(link).ok()
    }

    /// Discount implied by `original_price`, falling back to the stored
    /// `discount_percentage`.
    #[must_use]
    pub fn effective_discount_percentage(&self) -> Option<u8> {
        self.original_price
            .and_then(|original| self.price.discount_from(original))
            .or(self.discount_percentage)
    }

    /// Slots whose metadata shadow outlived the live handle.
    ///
    /// After a reload every previously attached file shows up here until the
    /// vendor picks it again.
    #[must_use]
    pub fn detached_slots(&self) -> Vec<FileSlot> {
        let mut slots = Vec::new();
        if self.file_metadata.is_some() && self.file.is_none() {
            slots.push(FileSlot::File);
        }
        if self.thumbnail_metadata.is_some() && self.thumbnail.is_none() {
            slots.push(FileSlot::Thumbnail);
        }
        if self.preview_metadata.is_some() && self.preview.is_none() {
            slots.push(FileSlot::Preview);
        }
        if self.images_metadata.len() != self.images.len() {
            slots.push(FileSlot::Images);
        }
        slots
    }

    /// Assemble the payload for the product submission API.
    ///
    /// # Errors
    ///
    /// Returns `DraftError::StepInvalid` for the first of steps 1-2 that does
    /// not validate, and `DraftError::MissingFile` if a required live file
    /// handle is absent (typically after a reload).
    pub fn to_submission(&self) -> Result<ProductSubmission, DraftError> {
        for step in [STEP_BASIC_INFO, STEP_DELIVERY] {
            if !self.is_step_valid(step) {
                return Err(DraftError::StepInvalid(step));
            }
        }

        let delivery = if self.is_link {
            let url = self
                .parsed_link_url()
                .ok_or(DraftError::StepInvalid(STEP_DELIVERY))?;
            Delivery::Link(url)
        } else {
            Delivery::File(
                self.file
                    .clone()
                    .ok_or(DraftError::MissingFile(FileSlot::File))?,
            )
        };
        let thumbnail = self
            .thumbnail
            .clone()
            .ok_or(DraftError::MissingFile(FileSlot::Thumbnail))?;

        Ok(ProductSubmission {
            name: self.name.trim().to_owned(),
            description: self.description.trim().to_owned(),
            price: self.price,
            original_price: self.original_price,
            discount_percentage: self.effective_discount_percentage(),
            category_id: self.category_id.clone(),
            requirements: self.requirements.clone(),
            instructions: self.instructions.clone(),
            license_type: self.license_type,
            license_duration: self
                .license_duration
                .filter(|_| self.license_type.is_time_bound()),
            download_limit: self.download_limit,
            tags: self.tags.clone(),
            features: self.features.clone(),
            delivery,
            thumbnail,
            preview: self.preview.clone(),
            images: self.images.clone(),
        })
    }
}

// =============================================================================
// Partial updates
// =============================================================================

macro_rules! setters {
    ($($(#[$doc:meta])* $field:ident: $ty:ty),* $(,)?) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $field(mut self, value: $ty) -> Self {
                self.$field = Some(value);
                self
            }
        )*
    };
}

/// A partial draft: only fields set to `Some` are written.
///
/// Nullable fields use a nested `Option` so that "leave alone" (`None`) and
/// "clear" (`Some(None)`) stay distinguishable.
#[derive(Debug, Clone, Default)]
pub struct DraftUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub original_price: Option<Option<Price>>,
    pub discount_percentage: Option<Option<u8>>,
    pub category_id: Option<CategoryId>,
    pub requirements: Option<String>,
    pub instructions: Option<String>,
    pub license_type: Option<LicenseType>,
    pub license_duration: Option<Option<u32>>,
    pub download_limit: Option<Option<u32>>,
    pub tags: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub is_link: Option<bool>,
    pub link_url: Option<String>,
    pub file: Option<Option<AttachedFile>>,
    pub thumbnail: Option<Option<AttachedFile>>,
    pub preview: Option<Option<AttachedFile>>,
    pub images: Option<Vec<AttachedFile>>,
}

impl DraftUpdate {
    /// An update that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        price: Price,
        original_price: Option<Price>,
        discount_percentage: Option<u8>,
        category_id: CategoryId,
        license_type: LicenseType,
        license_duration: Option<u32>,
        download_limit: Option<u32>,
        tags: Vec<String>,
        features: Vec<String>,
        is_link: bool,
        /// Replace (or with `None`, clear) the downloadable file.
        file: Option<AttachedFile>,
        /// Replace (or with `None`, clear) the thumbnail.
        thumbnail: Option<AttachedFile>,
        /// Replace (or with `None`, clear) the preview.
        preview: Option<AttachedFile>,
        /// Replace the gallery; an empty vector clears it.
        images: Vec<AttachedFile>,
    }

    #[must_use]
    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.name = Some(value.into());
        self
    }

    #[must_use]
    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into());
        self
    }

    #[must_use]
    pub fn requirements(mut self, value: impl Into<String>) -> Self {
        self.requirements = Some(value.into());
        self
    }

    #[must_use]
    pub fn instructions(mut self, value: impl Into<String>) -> Self {
        self.instructions = Some(value.into());
        self
    }

    #[must_use]
    pub fn link_url(mut self, value: impl Into<String>) -> Self {
        self.link_url = Some(value.into());
        self
    }

    /// Set or clear a single-file slot. Setting [`FileSlot::Images`] replaces
    /// the gallery with at most one image.
    #[must_use]
    pub fn slot(self, slot: FileSlot, file: Option<AttachedFile>) -> Self {
        match slot {
            FileSlot::File => self.file(file),
            FileSlot::Thumbnail => self.thumbnail(file),
            FileSlot::Preview => self.preview(file),
            FileSlot::Images => self.images(file.into_iter().collect()),
        }
    }
}

// =============================================================================
// Submission
// =============================================================================

/// Errors raised while assembling a submission from a draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    /// A wizard step does not validate.
    #[error("step {0} is incomplete")]
    StepInvalid(u8),

    /// A required file only exists as metadata and must be attached again.
    #[error("{0} must be attached again before submitting")]
    MissingFile(FileSlot),
}

/// How buyers receive the product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// External download link.
    Link(Url),
    /// Uploaded file.
    File(AttachedFile),
}

/// Everything the product submission API needs, live file handles included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSubmission {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub original_price: Option<Price>,
    pub discount_percentage: Option<u8>,
    pub category_id: CategoryId,
    pub requirements: String,
    pub instructions: String,
    pub license_type: LicenseType,
    /// Only carried for time-bound licenses.
    pub license_duration: Option<u32>,
    pub download_limit: Option<u32>,
    pub tags: Vec<String>,
    pub features: Vec<String>,
    pub delivery: Delivery,
    pub thumbnail: AttachedFile,
    pub preview: Option<AttachedFile>,
    pub images: Vec<AttachedFile>,
}
