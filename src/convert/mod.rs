//! State-to-schema conversion pipeline
//!
//! Fetched apps are classified into destination types and declared
//! ([`classifier`], [`definition`]); once the IaC tool has imported them, the
//! captured state is filtered through per-type allow-lists ([`schema`],
//! [`converter`]) and written back out as declaration files ([`hcl`]).

pub mod classifier;
pub mod converter;
pub mod definition;
pub mod hcl;
pub mod registry;
pub mod schema;
pub mod state;

pub use classifier::{AppType, classify_all};
pub use converter::convert;
pub use definition::{ResourceDefinition, assemble_headers};
pub use hcl::ProviderBlock;
pub use registry::Conversion;
pub use schema::{SchemaOverrides, SchemaSelector, Variant};
pub use state::StateParser;
