//! HBT: Plain-text Herbal Supply-Chain Traceability Toolkit
//!
//! A Unix-style toolkit for managing supply-chain traceability records
//! (collection events, processing batches, lab tests, finished products)
//! as plain text JSON ledgers inside a project directory.

pub mod cli;
pub mod core;
pub mod entities;
