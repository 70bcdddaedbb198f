#![doc = include_str!("../README.md")]

pub mod backend;
pub mod error;
pub mod frontend;
pub mod resolution;

pub use frontend::{BuildFrontendError, Frontend, FrontendBuilder};
pub use resolution::{NameClass, ResolvedModule};
