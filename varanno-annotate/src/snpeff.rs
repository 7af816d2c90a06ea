//!
//! Functional effect classes reported by snpEff and the "is a kind of" lattice
//! over them.
//!
//! Every effect has a fixed set of parent effects (a stop gained is a non-synonymous
//! coding change, which is a CDS change, which is an exon change ...). Annotators that
//! stratify by effect ask [is_subtype_of] instead of matching effect names.
//!
use std::collections::VecDeque;
use std::fmt::{self, Display};
use std::str::FromStr;

use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
use once_cell::sync::Lazy;

use crate::error::AnnotationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(clippy::upper_case_acronyms)]
pub enum EffectType {
    Chromosome,
    Intergenic,
    IntergenicConserved,
    Upstream,
    Downstream,
    Regulation,
    Gene,
    Transcript,
    Exon,
    ExonDeleted,
    Intron,
    IntronConserved,
    SpliceSiteAcceptor,
    SpliceSiteDonor,
    Utr5Prime,
    Utr5Deleted,
    StartGained,
    Utr3Prime,
    Utr3Deleted,
    CDS,
    FrameShift,
    CodonChange,
    CodonInsertion,
    CodonChangePlusCodonInsertion,
    CodonDeletion,
    CodonChangePlusCodonDeletion,
    NonSynonymousCoding,
    NonSynonymousStart,
    StartLost,
    StopGained,
    StopLost,
    SynonymousCoding,
    SynonymousStart,
    SynonymousStop,
}

impl EffectType {
    pub const ALL: [EffectType; 34] = [
        EffectType::Chromosome,
        EffectType::Intergenic,
        EffectType::IntergenicConserved,
        EffectType::Upstream,
        EffectType::Downstream,
        EffectType::Regulation,
        EffectType::Gene,
        EffectType::Transcript,
        EffectType::Exon,
        EffectType::ExonDeleted,
        EffectType::Intron,
        EffectType::IntronConserved,
        EffectType::SpliceSiteAcceptor,
        EffectType::SpliceSiteDonor,
        EffectType::Utr5Prime,
        EffectType::Utr5Deleted,
        EffectType::StartGained,
        EffectType::Utr3Prime,
        EffectType::Utr3Deleted,
        EffectType::CDS,
        EffectType::FrameShift,
        EffectType::CodonChange,
        EffectType::CodonInsertion,
        EffectType::CodonChangePlusCodonInsertion,
        EffectType::CodonDeletion,
        EffectType::CodonChangePlusCodonDeletion,
        EffectType::NonSynonymousCoding,
        EffectType::NonSynonymousStart,
        EffectType::StartLost,
        EffectType::StopGained,
        EffectType::StopLost,
        EffectType::SynonymousCoding,
        EffectType::SynonymousStart,
        EffectType::SynonymousStop,
    ];

    /// The snpEff name of the effect
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectType::Chromosome => "CHROMOSOME",
            EffectType::Intergenic => "INTERGENIC",
            EffectType::IntergenicConserved => "INTERGENIC_CONSERVED",
            EffectType::Upstream => "UPSTREAM",
            EffectType::Downstream => "DOWNSTREAM",
            EffectType::Regulation => "REGULATION",
            EffectType::Gene => "GENE",
            EffectType::Transcript => "TRANSCRIPT",
            EffectType::Exon => "EXON",
            EffectType::ExonDeleted => "EXON_DELETED",
            EffectType::Intron => "INTRON",
            EffectType::IntronConserved => "INTRON_CONSERVED",
            EffectType::SpliceSiteAcceptor => "SPLICE_SITE_ACCEPTOR",
            EffectType::SpliceSiteDonor => "SPLICE_SITE_DONOR",
            EffectType::Utr5Prime => "UTR_5_PRIME",
            EffectType::Utr5Deleted => "UTR_5_DELETED",
            EffectType::StartGained => "START_GAINED",
            EffectType::Utr3Prime => "UTR_3_PRIME",
            EffectType::Utr3Deleted => "UTR_3_DELETED",
            EffectType::CDS => "CDS",
            EffectType::FrameShift => "FRAME_SHIFT",
            EffectType::CodonChange => "CODON_CHANGE",
            EffectType::CodonInsertion => "CODON_INSERTION",
            EffectType::CodonChangePlusCodonInsertion => "CODON_CHANGE_PLUS_CODON_INSERTION",
            EffectType::CodonDeletion => "CODON_DELETION",
            EffectType::CodonChangePlusCodonDeletion => "CODON_CHANGE_PLUS_CODON_DELETION",
            EffectType::NonSynonymousCoding => "NON_SYNONYMOUS_CODING",
            EffectType::NonSynonymousStart => "NON_SYNONYMOUS_START",
            EffectType::StartLost => "START_LOST",
            EffectType::StopGained => "STOP_GAINED",
            EffectType::StopLost => "STOP_LOST",
            EffectType::SynonymousCoding => "SYNONYMOUS_CODING",
            EffectType::SynonymousStart => "SYNONYMOUS_START",
            EffectType::SynonymousStop => "SYNONYMOUS_STOP",
        }
    }

    ///
    /// Direct parents in the effect lattice. `Chromosome` is the only root.
    ///
    pub fn parents(&self) -> &'static [EffectType] {
        use EffectType::*;
        match self {
            Chromosome => &[],
            Intergenic | Regulation | Gene => &[Chromosome],
            IntergenicConserved | Upstream | Downstream => &[Intergenic],
            Transcript => &[Gene],
            Exon | Intron => &[Transcript],
            IntronConserved => &[Intron],
            // splice sites sit on the exon/intron boundary
            SpliceSiteAcceptor | SpliceSiteDonor => &[Intron, Exon],
            ExonDeleted | Utr5Prime | Utr3Prime | CDS => &[Exon],
            Utr5Deleted | StartGained => &[Utr5Prime],
            Utr3Deleted => &[Utr3Prime],
            FrameShift
            | CodonChange
            | CodonInsertion
            | CodonChangePlusCodonInsertion
            | CodonDeletion
            | CodonChangePlusCodonDeletion
            | NonSynonymousCoding
            | SynonymousCoding => &[CDS],
            NonSynonymousStart | StartLost | StopGained | StopLost => &[NonSynonymousCoding],
            SynonymousStart | SynonymousStop => &[SynonymousCoding],
        }
    }

    ///
    /// The effect itself plus all of its transitive ancestors.
    ///
    pub fn ancestors(&self) -> &'static HashSet<EffectType> {
        &ANCESTORS[self]
    }
}

///
/// Breadth-first walk up the parent table, collecting every effect reached
/// (`effect` included).
///
fn ancestor_closure(effect: EffectType) -> HashSet<EffectType> {
    let mut seen = HashSet::default();
    let mut queue = VecDeque::from([effect]);
    while let Some(current) = queue.pop_front() {
        if seen.insert(current) {
            queue.extend(current.parents().iter().copied());
        }
    }
    seen
}

static ANCESTORS: Lazy<HashMap<EffectType, HashSet<EffectType>>> = Lazy::new(|| {
    EffectType::ALL
        .iter()
        .map(|effect| (*effect, ancestor_closure(*effect)))
        .collect()
});

///
/// True if `parent` is `child` itself or one of its ancestors.
///
pub fn is_subtype_of(child: EffectType, parent: EffectType) -> bool {
    child.ancestors().contains(&parent)
}

impl Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EffectType {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_uppercase();
        EffectType::ALL
            .iter()
            .find(|e| e.as_str() == name)
            .copied()
            .ok_or_else(|| AnnotationError::UnknownEffect(s.to_string()))
    }
}
