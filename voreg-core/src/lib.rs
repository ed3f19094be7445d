//! # voreg-core
//!
//! Compiles heterogeneous, hierarchically-inherited resource metadata into
//! well-formed, namespace-qualified registry documents: resource
//! descriptions in the VOResource family of schemas, wrapped on demand in
//! OAI-PMH harvesting envelopes.
//!
//! ## Architecture
//!
//! ```text
//! MetaBlock / MetaScope      ← multi-valued, propagating metadata
//!     │
//! ModelBuilder               ← declarative rule tree → document nodes
//!     │
//! KindResolver               ← key → handler tables (kinds, mechanisms)
//!     │
//! RecordAssembler            ← per-kind resource documents,
//! CapabilityAssembler          per-mechanism capabilities/interfaces
//!     │
//! envelope                   ← OAI records, lists, Identify
//! ```
//!
//! Schema conformance is by construction: element ordering is declared per
//! element type, empty substructures vanish when trees are finalized, and
//! the namespace prefixes used anywhere in a tree are declared on its root.
//! Building is synchronous and idempotent; strict/lenient error handling is
//! an explicit argument ([`BuildMode`]) on every top-level entry point.

pub mod builder;
pub mod capabilities;
pub mod config;
pub mod coverage;
pub mod envelope;
pub mod error;
pub mod makers;
pub mod meta;
pub mod model;
pub mod records;
pub mod resolve;
pub mod resource;
pub mod tableset;
pub mod xml;

pub use builder::{BuildContext, BuildMode, ModelBuilder, Rule};
pub use capabilities::{mech, CapabilityAssembler, CapabilityMaker, InterfaceMaker};
pub use config::RegistryConfig;
pub use envelope::RecordFormat;
pub use error::{BuildError, OaiFault};
pub use makers::{kind, RecordAssembler, ResourceMaker};
pub use meta::{MetaBlock, MetaScope, MetaValue};
pub use records::{publish_rows, tombstone_rows, PublishRow};
pub use resolve::KindResolver;
pub use resource::{
    default_sets, DependencyCache, NoPrerequisites, PrerequisiteLoader, Publication, Resource,
    ResourceStatus, MANAGED_SET,
};
pub use xml::{EmptyPolicy, Node};
