use thiserror::Error;

use varanno_core::VariantError;

use super::config::ConfigError;

///
/// Errors raised by individual annotators and by the per-allele data containers
/// they use.
///
#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error(
        "Configuration error: annotation data needs exactly one reference allele, found {0}"
    )]
    ReferenceAllele(usize),
    #[error("Read likelihoods for sample {sample} at {locus} do not cover alleles {alleles}")]
    AlleleLikelihoodMismatch {
        sample: String,
        locus: String,
        alleles: String,
    },
    #[error("Invalid raw data for {key}: {value}")]
    InvalidRawData { key: String, value: String },
    #[error("Unknown effect type: {0}")]
    UnknownEffect(String),
    #[error(transparent)]
    Variant(#[from] VariantError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

///
/// Errors raised by the annotation engine. Configuration problems surface when
/// the engine is built; the rest abort the current site.
///
#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid expression {0}: it should be in resource.field format")]
    MalformedExpression(String),
    #[error("Expression {expression} refers to unknown resource {resource}")]
    UnknownResource { expression: String, resource: String },
    #[error("Unknown resource: {0}")]
    UnknownTrack(String),
    #[error("Cannot annotate expression {0}: missing header info")]
    MissingHeaderInfo(String),
    #[error("Candidate {candidate} does not start at the same position as {target}")]
    CandidateLocusMismatch { candidate: String, target: String },
    #[error("Annotation {name} failed: {source}")]
    Annotation {
        name: String,
        #[source]
        source: AnnotationError,
    },
    #[error(transparent)]
    Data(#[from] AnnotationError),
    #[error(transparent)]
    Variant(#[from] VariantError),
}

pub type AnnotationResult<T> = std::result::Result<T, AnnotationError>;
pub type AnnotateResult<T> = std::result::Result<T, AnnotateError>;
