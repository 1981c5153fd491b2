//! Product draft commands.
//!
//! Files attached in one invocation only survive as metadata in the next,
//! exactly like a browser reload. `submit-check` therefore takes the files to
//! re-attach before assembling the submission.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;

use marketplace_client::models::{
    AttachedFile, Delivery, Draft, DraftUpdate, FileSlot, LAST_STEP, STEP_BASIC_INFO,
};
use marketplace_client::storage::StorageArea;
use marketplace_client::stores::ProductDraftStore;
use marketplace_core::{CategoryId, FileMetadata, LicenseType, Price};

use super::{CliError, Context, print_json};

#[derive(Subcommand)]
pub enum DraftAction {
    /// Print the draft and its step validity
    Show,
    /// Update draft fields
    Set(SetArgs),
    /// Attach a file to a slot (`file`, `thumbnail`, `preview`, `images`)
    Attach { slot: FileSlot, path: PathBuf },
    /// Clear a file slot
    Detach { slot: FileSlot },
    /// Check one wizard step, or all of them
    Validate { step: Option<u8> },
    /// Reset the draft in memory only; the stored snapshot is kept
    Reset,
    /// Erase the stored draft
    Discard,
    /// Re-attach files and check that the draft can be submitted
    SubmitCheck {
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        thumbnail: Option<PathBuf>,
        #[arg(long)]
        preview: Option<PathBuf>,
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },
}

#[derive(Args)]
pub struct SetArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: Option<Price>,
    #[arg(long)]
    original_price: Option<Price>,
    #[arg(long)]
    discount: Option<u8>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    requirements: Option<String>,
    #[arg(long)]
    instructions: Option<String>,
    /// `SINGLE_USE`, `MULTIPLE_USE`, `UNLIMITED`, `TIME_LIMITED` or `SUBSCRIPTION`
    #[arg(long)]
    license: Option<LicenseType>,
    /// License duration in days
    #[arg(long)]
    license_duration: Option<u32>,
    #[arg(long)]
    download_limit: Option<u32>,
    /// Replace tags (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,
    /// Replace features (repeatable)
    #[arg(long = "feature")]
    features: Vec<String>,
    /// Deliver through this link instead of a file
    #[arg(long, conflicts_with = "no_link")]
    link: Option<String>,
    /// Deliver through an uploaded file
    #[arg(long)]
    no_link: bool,
}

impl From<SetArgs> for DraftUpdate {
    fn from(args: SetArgs) -> Self {
        let mut update = Self::new();
        update.name = args.name;
        update.description = args.description;
        update.price = args.price;
        update.original_price = args.original_price.map(Some);
        update.discount_percentage = args.discount.map(Some);
        update.category_id = args.category.map(CategoryId::new);
        update.requirements = args.requirements;
        update.instructions = args.instructions;
        update.license_type = args.license;
        update.license_duration = args.license_duration.map(Some);
        update.download_limit = args.download_limit.map(Some);
        update.tags = (!args.tags.is_empty()).then_some(args.tags);
        update.features = (!args.features.is_empty()).then_some(args.features);
        if let Some(link) = args.link {
            update.is_link = Some(true);
            update.link_url = Some(link);
        } else if args.no_link {
            update.is_link = Some(false);
        }
        update
    }
}

/// JSON view of a draft, including derived status.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DraftView<'a> {
    current_step: u8,
    name: &'a str,
    description: &'a str,
    price: Price,
    original_price: Option<Price>,
    discount_percentage: Option<u8>,
    category_id: &'a CategoryId,
    requirements: &'a str,
    instructions: &'a str,
    license_type: LicenseType,
    license_duration: Option<u32>,
    download_limit: Option<u32>,
    tags: &'a [String],
    features: &'a [String],
    is_link: bool,
    link_url: &'a str,
    file_metadata: Option<&'a FileMetadata>,
    thumbnail_metadata: Option<&'a FileMetadata>,
    preview_metadata: Option<&'a FileMetadata>,
    images_metadata: &'a [FileMetadata],
    detached_slots: Vec<String>,
    steps: Vec<StepView>,
}

#[derive(Serialize)]
struct StepView {
    step: u8,
    valid: bool,
}

impl<'a> DraftView<'a> {
    fn new(draft: &'a Draft, current_step: u8) -> Self {
        Self {
            current_step,
            name: &draft.name,
            description: &draft.description,
            price: draft.price,
            original_price: draft.original_price,
            discount_percentage: draft.effective_discount_percentage(),
            category_id: &draft.category_id,
            requirements: &draft.requirements,
            instructions: &draft.instructions,
            license_type: draft.license_type,
            license_duration: draft.license_duration,
            download_limit: draft.download_limit,
            tags: &draft.tags,
            features: &draft.features,
            is_link: draft.is_link,
            link_url: &draft.link_url,
            file_metadata: draft.file_metadata.as_ref(),
            thumbnail_metadata: draft.thumbnail_metadata.as_ref(),
            preview_metadata: draft.preview_metadata.as_ref(),
            images_metadata: &draft.images_metadata,
            detached_slots: draft
                .detached_slots()
                .iter()
                .map(ToString::to_string)
                .collect(),
            steps: step_report(draft),
        }
    }
}

fn step_report(draft: &Draft) -> Vec<StepView> {
    (STEP_BASIC_INFO..=LAST_STEP)
        .map(|step| StepView {
            step,
            valid: draft.is_step_valid(step),
        })
        .collect()
}

fn show<S: StorageArea>(store: &ProductDraftStore<S>) -> Result<(), CliError> {
    print_json(&DraftView::new(store.draft(), store.current_step()))
}

/// Run a `draft` subcommand.
///
/// # Errors
///
/// Returns `CliError` if the store cannot be opened or persisted, a file
/// cannot be read, or (for `submit-check`) the draft is not submittable.
pub fn draft(ctx: &Context, action: DraftAction) -> Result<(), CliError> {
    let mut store = ctx.draft_store()?;
    match action {
        DraftAction::Show => show(&store),
        DraftAction::Set(args) => {
            store.update_form_data(args.into())?;
            show(&store)
        }
        DraftAction::Attach { slot, path } => {
            let file = AttachedFile::open(&path)?;
            tracing::info!(%slot, name = file.name(), size = file.size(), "Attached file");
            let update = if slot == FileSlot::Images {
                let mut images = store.draft().images.clone();
                images.push(file);
                DraftUpdate::new().images(images)
            } else {
                DraftUpdate::new().slot(slot, Some(file))
            };
            store.update_form_data(update)?;
            show(&store)
        }
        DraftAction::Detach { slot } => {
            store.update_form_data(DraftUpdate::new().slot(slot, None))?;
            show(&store)
        }
        DraftAction::Validate { step } => match step {
            Some(step) => print_json(&StepView {
                step,
                valid: store.is_step_valid(step),
            }),
            None => print_json(&step_report(store.draft())),
        },
        DraftAction::Reset => {
            store.reset_form();
            show(&store)
        }
        DraftAction::Discard => {
            store.clear_persisted_data()?;
            show(&store)
        }
        DraftAction::SubmitCheck {
            file,
            thumbnail,
            preview,
            images,
        } => {
            let mut update = DraftUpdate::new();
            if let Some(path) = file {
                update = update.file(Some(AttachedFile::open(&path)?));
            }
            if let Some(path) = thumbnail {
                update = update.thumbnail(Some(AttachedFile::open(&path)?));
            }
            if let Some(path) = preview {
                update = update.preview(Some(AttachedFile::open(&path)?));
            }
            if !images.is_empty() {
                let files = images
                    .iter()
                    .map(|path| AttachedFile::open(path))
                    .collect::<std::io::Result<Vec<_>>>()?;
                update = update.images(files);
            }
            store.update_form_data(update)?;

            let submission = store.submission()?;
            let delivery = match &submission.delivery {
                Delivery::Link(url) => format!("link {url}"),
                Delivery::File(file) => format!("file {} ({} bytes)", file.name(), file.size()),
            };
            tracing::info!(name = %submission.name, %delivery, "Draft is ready to submit");
            print_json(&serde_json::json!({
                "ready": true,
                "name": submission.name,
                "price": submission.price,
                "delivery": delivery,
                "thumbnail": submission.thumbnail.name(),
                "images": submission.images.len(),
            }))
        }
    }
}
