//! Minimal RO-Crate graph writer and reader for moving image metadata from
//! OMERO into electronic lab notebooks as `.eln` archives.
//!
//! ```text
//! *Info records -> writer::build_document -> archive::export -> .eln
//! .eln -> archive::read_document -> reader::resolve -> ingest::prepare_entry
//! ```
pub mod archive;
pub mod config;
pub mod diagnostics;
pub mod entity;
mod error;
pub mod graph;
pub mod ingest;
pub mod link;
pub mod reader;
pub mod writer;

pub use config::Config;
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{Error, Result};
pub use graph::{GraphDocument, Node, Reference};
pub use reader::{Resolution, ResolvedContent, parse, resolve};
pub use writer::{build_document, serialize};
