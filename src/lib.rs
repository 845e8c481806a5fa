//! Offer Desk Core - house offer pricing and print preparation
//!
//! # Ground Rules
//! 1. Pricing Is Pure
//! 2. Every Item Code Has a Value
//! 3. Image Failures Stay Local
//! 4. Image Sets Are Replaced, Never Patched
//! 5. Cancellation Never Commits

pub mod builtin;
pub mod catalog;
pub mod config;
pub mod hashing;
pub mod images;
pub mod narrative;
pub mod offer;
pub mod pricing;
pub mod print;
pub mod selection;

pub use catalog::{Catalog, CatalogError, House, ItemKind, ItemOption, OfferItem};
pub use config::{Config, ConfigError};
pub use hashing::{canonical_json, compute_manifest_hash, compute_offer_hash};
pub use images::{BatchDriver, ImageSet, ImageSource, PipelineEvents, RunOutcome, RunState};
pub use narrative::NarrativeService;
pub use offer::{OfferError, OfferManifest, OfferSession};
pub use pricing::{compute_total, format_amount, PricedLine, Quote, TaxSummary, VAT_RATE};
pub use print::{PrintAuthority, PrintSpec};
pub use selection::{FinishState, ItemValue, Selection, SelectionError, NO_CHOICE};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
