use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VariantError {
    #[error("Invalid allele bases: {0}")]
    InvalidAllele(String),

    #[error("A variant needs at least one allele")]
    NoAlleles,

    #[error("The first allele of a variant must be the reference, found {0}")]
    FirstAlleleNotReference(String),

    #[error("Expected exactly one reference allele, found {0}")]
    ReferenceAlleleCount(usize),

    #[error("Duplicate allele {0} in variant")]
    DuplicateAllele(String),

    #[error("Invalid locus: {0}")]
    InvalidLocus(String),

    #[error("Read {read} has {found} likelihoods, expected one per allele ({expected})")]
    LikelihoodCount {
        read: String,
        expected: usize,
        found: usize,
    },
}
