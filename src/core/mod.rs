//! Core module - fundamental types and utilities

pub mod config;
pub mod identity;
pub mod lifecycle;
pub mod project;
pub mod quality;
pub mod store;

pub use config::{Config, Role};
pub use identity::RecordPrefix;
pub use project::{Project, ProjectError};
pub use quality::{evaluate, Evaluation, Measurements};
pub use store::{Store, StoreError};
