//! Domain layer for invitations

pub mod entities;
pub mod state;
