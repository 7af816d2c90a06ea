//! # varanno-annotate
//!
//! Annotation engine for variant records.
//!
//! ## Purpose
//!
//! The engine decorates variant records with derived fields: site-level (INFO)
//! values, per-sample (FORMAT) values, values copied from comparison resources,
//! a dbSNP ID and membership flags for overlapping comparison records.
//!
//! ## Reducible annotations
//!
//! Some annotations cannot be recomputed once records from several samples are
//! merged. Those annotators implement [ReducibleAnnotation] and go through three
//! stages:
//!
//! - **raw**: per-allele data, written under the annotator's raw key
//! - **combine**: raw data from several records added up over the merged alleles
//! - **finalize**: the raw key is replaced by the reportable value
//!
//! ## Main Components
//!
//! - **`VariantAnnotatorEngine`**: runs every stage over one record at a time
//! - **`ExpressionResolver`**: copies `resource.FIELD` values from comparison resources
//! - **`VariantOverlapAnnotator`**: dbSNP IDs and overlap flags
//! - **`AlleleSpecificAnnotationData`**: per-allele raw data container
//!
//! ## Example
//!
//! ```rust
//! use varanno_annotate::annotations::{Coverage, DepthPerSample};
//! use varanno_annotate::{AnnotationContext, AnnotatorConfig, VariantAnnotatorEngine};
//! use varanno_core::Resources;
//! use varanno_core::evidence::{Pileup, PileupElement, StratifiedPileups};
//! use varanno_core::models::{Allele, AttributeValue, VariantContextBuilder, VcfHeader};
//!
//! let engine = VariantAnnotatorEngine::new(
//!     vec![Box::new(Coverage)],
//!     vec![Box::new(DepthPerSample)],
//!     &Resources::new(),
//!     &AnnotatorConfig::default(),
//!     &VcfHeader::new(),
//! )
//! .unwrap();
//!
//! let vc = VariantContextBuilder::new(
//!     "chr1",
//!     100,
//!     vec![Allele::reference("A").unwrap(), Allele::alternate("C").unwrap()],
//! )
//! .build()
//! .unwrap();
//!
//! let element = PileupElement { base: b'C', base_quality: 30, mapping_quality: 60, is_deletion: false };
//! let mut pileups = StratifiedPileups::default();
//! pileups.insert("sample".to_string(), Pileup::new(vec![element; 3]));
//!
//! let annotated = engine
//!     .annotate_context(&vc, &AnnotationContext::new(Some(&pileups), None))
//!     .unwrap();
//! assert_eq!(annotated.attribute("DP"), Some(&AttributeValue::Integer(3)));
//! ```
//!
pub mod annotations;
pub mod config;
pub mod engine;
pub mod error;
pub mod expression;
pub mod overlap;
pub mod reducible;
pub mod snpeff;
pub mod traits;

// re-export things
pub use config::*;
pub use engine::*;
pub use error::*;
pub use expression::*;
pub use overlap::*;
pub use reducible::*;
pub use traits::*;
