//! # varanno-core
//!
//! Data model shared by the varanno crates: alleles, genotypes, variant records
//! and their builders, header declarations, read evidence and queryable
//! comparison resources.
//!
//! Records are immutable. Anything that "modifies" a record builds a new one:
//!
//! ```rust
//! use varanno_core::models::{Allele, VariantContextBuilder};
//!
//! let vc = VariantContextBuilder::new(
//!     "chr1",
//!     100,
//!     vec![Allele::reference("A").unwrap(), Allele::alternate("C").unwrap()],
//! )
//! .build()
//! .unwrap();
//!
//! let annotated = VariantContextBuilder::from(&vc)
//!     .attribute("DP", 12)
//!     .build()
//!     .unwrap();
//!
//! assert!(!vc.has_attribute("DP"));
//! assert!(annotated.has_attribute("DP"));
//! ```
pub mod errors;
pub mod evidence;
pub mod models;
pub mod track;
pub mod utils;

// re-exports
pub use errors::VariantError;
pub use track::{FeatureSource, Resources, VariantTrack};
