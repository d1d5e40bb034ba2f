//! CLI command implementations

pub mod batch;
pub mod collect;
pub mod init;
pub mod lab;
pub mod product;
pub mod trace;
pub mod validate;
