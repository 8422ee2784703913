//! Domain layer for assets

pub mod entities;
