//! Concept mapping verification against a FHIR terminology server.
//!
//! Each `(source_code, target_code)` pair of an input CSV is looked up with
//! `CodeSystem/$validate-code` (display text of both codes) and
//! `ConceptMap/$translate` (does the server know this mapping), and written
//! back as an annotated CSV row.
//!
//! # Components
//!
//! - [`Parameters`] - Typed, name-keyed access to a FHIR `Parameters` resource
//! - [`TerminologyClient`] - The two terminology operations over HTTP
//! - [`MappingVerifier`] - Per-row display and mapping checks
//! - [`pipeline`] - CSV reading and writing around the verifier
//! - [`config`] - Run configuration from a config file or from flags
//!
//! # Example
//!
//! ```ignore
//! use mapcheck_core::{MappingVerifier, TerminologyClient, config::loader::load_config};
//!
//! let cfg = load_config(Path::new("mapcheck.toml"))?;
//! let client = TerminologyClient::new(&cfg.server_url, cfg.verify_tls)?;
//! let verifier = MappingVerifier::new(client, cfg.mapping);
//! let rows = mapcheck_core::pipeline::annotate_files(&verifier, input, output, |_, _| {}).await?;
//! ```

mod client;
pub mod config;
mod error;
mod parameters;
pub mod pipeline;
mod verifier;

pub use client::TerminologyClient;
pub use config::{CodeSystemRef, ConceptMapSelection, MappingConfig, RunConfig};
pub use error::{Error, Result};
pub use parameters::{Code, Coding, ParameterKind, Parameters};
pub use verifier::{
    AnnotatedMapping, MappingRecord, MappingVerifier, mapping_is_valid, resolve_display,
};
