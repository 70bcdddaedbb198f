//! Helpers shared between ptpy crates

pub mod nom_helpers;
