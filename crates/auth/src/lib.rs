//! Actor identity for Bouquet
//!
//! Identity is issued by an external collaborator; this crate only models the
//! fields the invitation lifecycle reads. An `Actor` is scoped to one session
//! and passed explicitly into every component that needs it.

mod context;
mod types;

pub use context::Actor;
pub use types::{ActorProfile, ActorRole};
