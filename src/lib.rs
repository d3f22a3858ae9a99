//! registrar - admissions assistant core
//!
//! Two subsystems back every agent in the admissions assistant:
//! - A retrieval pipeline that embeds course knowledge-base chunks and
//!   serves similarity queries against a Qdrant collection.
//! - A file-backed student profile store with cross-process locking and
//!   data-completeness accounting.

pub mod commands;
pub mod config;
pub mod docparse;
pub mod embed;
pub mod error;
pub mod kb;
pub mod profile;
pub mod rag;
pub mod store;
pub mod tools;

pub use error::{Error, Result};
