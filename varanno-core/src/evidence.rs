//!
//! Read evidence handed to annotators: per-sample pileups and per-read allele
//! likelihoods. Both are optional inputs; annotators must cope with either
//! being absent.
//!
use fxhash::FxHashMap as HashMap;

use crate::errors::VariantError;
use crate::models::Allele;

/// Minimum log10 likelihood gap for a read to count as informative.
pub const INFORMATIVE_LIKELIHOOD_THRESHOLD: f64 = 0.2;

/// Per-sample pileups, keyed by sample name.
pub type StratifiedPileups = HashMap<String, Pileup>;

/// Per-sample read likelihoods, keyed by sample name.
pub type StratifiedLikelihoods = HashMap<String, PerReadAlleleLikelihoods>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PileupElement {
    pub base: u8,
    pub base_quality: u8,
    pub mapping_quality: u8,
    pub is_deletion: bool,
}

///
/// Bases observed at one position for one sample.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pileup {
    elements: Vec<PileupElement>,
}

impl Pileup {
    pub fn new(elements: Vec<PileupElement>) -> Self {
        Pileup { elements }
    }

    pub fn push(&mut self, element: PileupElement) {
        self.elements.push(element);
    }

    pub fn elements(&self) -> &[PileupElement] {
        &self.elements
    }

    pub fn depth(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn mapping_qualities(&self) -> impl Iterator<Item = u8> + '_ {
        self.elements.iter().map(|e| e.mapping_quality)
    }

    ///
    /// Count of reads carrying the given base (case-insensitive); deletions
    /// never match.
    ///
    pub fn base_count(&self, base: u8) -> usize {
        let base = base.to_ascii_uppercase();
        self.elements
            .iter()
            .filter(|e| !e.is_deletion && e.base.to_ascii_uppercase() == base)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadLikelihood {
    pub read_name: String,
    pub mapping_quality: u8,
    /// log10 likelihood of the read given each allele, in allele order
    pub log10_likelihoods: Vec<f64>,
}

///
/// Likelihoods of each read given each allele for one sample.
///
#[derive(Debug, Clone, PartialEq)]
pub struct PerReadAlleleLikelihoods {
    alleles: Vec<Allele>,
    reads: Vec<ReadLikelihood>,
}

impl PerReadAlleleLikelihoods {
    pub fn new(alleles: Vec<Allele>) -> Self {
        PerReadAlleleLikelihoods {
            alleles,
            reads: Vec::new(),
        }
    }

    ///
    /// Add a read. It must carry exactly one likelihood per allele.
    ///
    pub fn add_read(
        &mut self,
        read_name: &str,
        mapping_quality: u8,
        log10_likelihoods: Vec<f64>,
    ) -> Result<(), VariantError> {
        if log10_likelihoods.len() != self.alleles.len() {
            return Err(VariantError::LikelihoodCount {
                read: read_name.to_string(),
                expected: self.alleles.len(),
                found: log10_likelihoods.len(),
            });
        }
        self.reads.push(ReadLikelihood {
            read_name: read_name.to_string(),
            mapping_quality,
            log10_likelihoods,
        });
        Ok(())
    }

    pub fn alleles(&self) -> &[Allele] {
        &self.alleles
    }

    pub fn reads(&self) -> &[ReadLikelihood] {
        &self.reads
    }

    pub fn len(&self) -> usize {
        self.reads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    ///
    /// True when every allele in `alleles` has likelihoods in this map.
    ///
    pub fn covers(&self, alleles: &[Allele]) -> bool {
        alleles.iter().all(|a| self.alleles.contains(a))
    }

    ///
    /// The most likely allele for a read, restricted to `candidates`. Returns
    /// `None` when the read does not separate the best allele from the runner-up
    /// by at least [INFORMATIVE_LIKELIHOOD_THRESHOLD].
    ///
    pub fn most_likely_allele<'a>(
        &self,
        read: &ReadLikelihood,
        candidates: &'a [Allele],
    ) -> Option<&'a Allele> {
        let mut best: Option<(&Allele, f64)> = None;
        let mut second = f64::NEG_INFINITY;

        for candidate in candidates {
            let Some(idx) = self.alleles.iter().position(|a| a == candidate) else {
                continue;
            };
            let lik = read.log10_likelihoods[idx];
            match best {
                Some((_, best_lik)) if lik <= best_lik => {
                    second = second.max(lik);
                }
                Some((_, best_lik)) => {
                    second = best_lik;
                    best = Some((candidate, lik));
                }
                None => best = Some((candidate, lik)),
            }
        }

        let (allele, best_lik) = best?;
        if best_lik - second >= INFORMATIVE_LIKELIHOOD_THRESHOLD {
            Some(allele)
        } else {
            None
        }
    }

    ///
    /// Number of reads informative for some allele in `candidates`.
    ///
    pub fn informative_read_count(&self, candidates: &[Allele]) -> usize {
        self.reads
            .iter()
            .filter(|r| self.most_likely_allele(r, candidates).is_some())
            .count()
    }
}
