//!
//! Reference annotators.
//!
pub mod as_rms_mapping_quality;
pub mod coding_effect;
pub mod coverage;
pub mod depth_per_sample;

pub use as_rms_mapping_quality::AlleleSpecificRmsMappingQuality;
pub use coding_effect::CodingEffect;
pub use coverage::Coverage;
pub use depth_per_sample::DepthPerSample;

use crate::traits::{GenotypeAnnotation, InfoAnnotation};

///
/// One instance of every site-level annotator in this crate.
///
pub fn default_info_annotations() -> Vec<Box<dyn InfoAnnotation>> {
    vec![
        Box::new(Coverage),
        Box::new(AlleleSpecificRmsMappingQuality),
        Box::new(CodingEffect),
    ]
}

///
/// One instance of every sample-level annotator in this crate.
///
pub fn default_genotype_annotations() -> Vec<Box<dyn GenotypeAnnotation>> {
    vec![Box::new(DepthPerSample)]
}
