use varanno_core::evidence::{
    PerReadAlleleLikelihoods, Pileup, StratifiedLikelihoods, StratifiedPileups,
};
use varanno_core::models::{
    Allele, Attributes, Genotype, GenotypeBuilder, HeaderLine, VariantContext,
};

use crate::error::AnnotationResult;
use crate::reducible::AlleleSpecificAnnotationData;

///
/// Read evidence for one site, stratified by sample. Either part may be absent;
/// annotators decide for themselves whether they can work without it.
///
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationContext<'a> {
    pub pileups: Option<&'a StratifiedPileups>,
    pub likelihoods: Option<&'a StratifiedLikelihoods>,
}

impl<'a> AnnotationContext<'a> {
    pub fn new(
        pileups: Option<&'a StratifiedPileups>,
        likelihoods: Option<&'a StratifiedLikelihoods>,
    ) -> Self {
        AnnotationContext {
            pileups,
            likelihoods,
        }
    }

    pub fn from_likelihoods(likelihoods: &'a StratifiedLikelihoods) -> Self {
        AnnotationContext {
            pileups: None,
            likelihoods: Some(likelihoods),
        }
    }

    pub fn sample(&self, sample_name: &str) -> SampleEvidence<'a> {
        SampleEvidence {
            pileup: self.pileups.and_then(|p| p.get(sample_name)),
            likelihoods: self.likelihoods.and_then(|l| l.get(sample_name)),
        }
    }
}

///
/// Read evidence for a single sample.
///
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleEvidence<'a> {
    pub pileup: Option<&'a Pileup>,
    pub likelihoods: Option<&'a PerReadAlleleLikelihoods>,
}

///
/// What every annotator exposes: a name and the fields it writes.
///
pub trait VariantAnnotation: Send + Sync {
    /// Name used to select or exclude the annotator
    fn name(&self) -> &str;

    /// Attribute keys this annotator writes. Must not change between calls.
    fn key_names(&self) -> Vec<&'static str>;

    /// Header lines describing the keys
    fn descriptions(&self) -> Vec<HeaderLine>;
}

///
/// Site-level (INFO) annotator.
///
pub trait InfoAnnotation: VariantAnnotation {
    ///
    /// Compute finalized values for the site. `Ok(None)` means the annotator has
    /// nothing to say about this site.
    ///
    fn annotate(
        &self,
        ctx: &AnnotationContext<'_>,
        vc: &VariantContext,
    ) -> AnnotationResult<Option<Attributes>>;

    ///
    /// The reducible view of this annotator, for annotators that support the
    /// raw/combine/finalize protocol.
    ///
    fn as_reducible(&self) -> Option<&dyn ReducibleAnnotation> {
        None
    }
}

///
/// Sample-level (FORMAT) annotator. Writes into the builder seeded from the
/// original genotype.
///
pub trait GenotypeAnnotation: VariantAnnotation {
    fn annotate(
        &self,
        vc: &VariantContext,
        genotype: &Genotype,
        evidence: SampleEvidence<'_>,
        builder: &mut GenotypeBuilder,
    ) -> AnnotationResult<()>;
}

///
/// Annotation whose value is derived from raw per-allele data that survives
/// merging records.
///
pub trait ReducibleAnnotation: Send + Sync {
    /// Key holding the serialized raw data
    fn raw_key_name(&self) -> &'static str;

    ///
    /// Compute raw per-allele data for the site, stored under
    /// [raw_key_name](ReducibleAnnotation::raw_key_name).
    ///
    fn annotate_raw(
        &self,
        ctx: &AnnotationContext<'_>,
        vc: &VariantContext,
    ) -> AnnotationResult<Option<Attributes>>;

    ///
    /// Combine raw data from several records. Each entry is bound to the alleles
    /// of its own record, expressed against `alleles` (the merged allele list),
    /// and carries its raw string; payloads are not parsed yet.
    ///
    fn combine_raw(
        &self,
        alleles: &[Allele],
        raw: &[AlleleSpecificAnnotationData<String>],
    ) -> AnnotationResult<Attributes>;

    ///
    /// Turn the raw data on `vc` into finalized values. `original` is the merged
    /// record before any allele subsetting and defines the allele order of the
    /// raw data.
    ///
    fn finalize_raw(
        &self,
        vc: &VariantContext,
        original: &VariantContext,
    ) -> AnnotationResult<Option<Attributes>>;
}
