//! Assets domain: image slots and the photo gallery
//!
//! Both components write optimistically: a local preview is published at once,
//! the transfer to durable storage runs afterwards, and only the latest
//! submission for an entity may settle it.

pub mod domain;
pub mod gallery;
pub mod pipeline;
pub mod preview;
pub mod slot;

pub use domain::entities::{AssetRef, ImageRules, ALLOWED_IMAGE_TYPES};
pub use gallery::{
    AddReport, GalleryCollection, GalleryItem, GallerySnapshot, MoveDirection, GALLERY_CAPACITY,
};
pub use pipeline::PipelineContext;
pub use preview::{EphemeralPreview, PreviewRegistry};
pub use slot::{AssetSlot, SlotSnapshot, SubmitOutcome};
