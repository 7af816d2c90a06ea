use std::fmt::{self, Display};

use fxhash::FxHashSet as HashSet;

use super::allele::Allele;
use super::attribute::{AttributeValue, Attributes};
use super::genotype::Genotype;
use super::locus::Locus;
use crate::errors::VariantError;

/// Separator between multiple IDs in the ID field.
pub const ID_FIELD_SEPARATOR: &str = ";";

/// Rendered value of an unfiltered FILTER field.
pub const PASSES_FILTERS: &str = "PASS";

///
/// One variant site: position, alleles, per-sample genotypes and site attributes.
///
/// Immutable once built; derived records are produced through
/// [VariantContextBuilder].
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "VariantContextBuilder"))]
pub struct VariantContext {
    contig: String,
    start: u64,
    id: Option<String>,
    alleles: Vec<Allele>,
    filters: Vec<String>,
    qual: Option<f64>,
    genotypes: Vec<Genotype>,
    attributes: Attributes,
}

impl VariantContext {
    pub fn contig(&self) -> &str {
        &self.contig
    }

    /// 1-based position of the first reference base
    pub fn start(&self) -> u64 {
        self.start
    }

    /// 1-based position of the last reference base
    pub fn end(&self) -> u64 {
        self.start + self.reference().len() as u64 - 1
    }

    pub fn locus(&self) -> Locus {
        Locus::new(&self.contig, self.start)
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }

    pub fn alleles(&self) -> &[Allele] {
        &self.alleles
    }

    pub fn reference(&self) -> &Allele {
        &self.alleles[0]
    }

    pub fn alternate_alleles(&self) -> &[Allele] {
        &self.alleles[1..]
    }

    pub fn alternate_allele(&self, i: usize) -> Option<&Allele> {
        self.alternate_alleles().get(i)
    }

    pub fn n_alleles(&self) -> usize {
        self.alleles.len()
    }

    pub fn is_biallelic(&self) -> bool {
        self.alleles.len() == 2
    }

    pub fn is_variant(&self) -> bool {
        self.alleles.len() > 1
    }

    ///
    /// True when every allele is a single, concrete base.
    ///
    pub fn is_snp(&self) -> bool {
        self.is_variant()
            && self
                .alleles
                .iter()
                .all(|a| a.len() == 1 && !a.is_symbolic())
    }

    pub fn is_symbolic(&self) -> bool {
        self.alleles.iter().any(|a| a.is_symbolic())
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    pub fn is_filtered(&self) -> bool {
        !self.filters.is_empty()
    }

    pub fn qual(&self) -> Option<f64> {
        self.qual
    }

    pub fn genotypes(&self) -> &[Genotype] {
        &self.genotypes
    }

    pub fn genotype(&self, sample_name: &str) -> Option<&Genotype> {
        self.genotypes
            .iter()
            .find(|g| g.sample_name() == sample_name)
    }

    pub fn sample_names(&self) -> impl Iterator<Item = &str> {
        self.genotypes.iter().map(|g| g.sample_name())
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }
}

impl Display for VariantContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alts = self
            .alternate_alleles()
            .iter()
            .map(|a| a.bases())
            .collect::<Vec<&str>>()
            .join(",");
        write!(
            f,
            "{}:{} {} {}/{}",
            self.contig,
            self.start,
            self.id.as_deref().unwrap_or("."),
            self.reference().bases(),
            if alts.is_empty() { "." } else { alts.as_str() }
        )
    }
}

///
/// Builder for [VariantContext]. Seed it from an existing record with
/// `VariantContextBuilder::from(&vc)` to derive a modified copy.
///
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct VariantContextBuilder {
    contig: String,
    start: u64,
    id: Option<String>,
    alleles: Vec<Allele>,
    filters: Vec<String>,
    qual: Option<f64>,
    genotypes: Vec<Genotype>,
    attributes: Attributes,
}

impl VariantContextBuilder {
    pub fn new(contig: &str, start: u64, alleles: Vec<Allele>) -> Self {
        VariantContextBuilder {
            contig: contig.to_string(),
            start,
            id: None,
            alleles,
            filters: Vec::new(),
            qual: None,
            genotypes: Vec::new(),
            attributes: Attributes::new(),
        }
    }

    pub fn start(&mut self, start: u64) -> &mut Self {
        self.start = start;
        self
    }

    ///
    /// Set the ID. `.` and the empty string both clear it.
    ///
    pub fn id(&mut self, id: &str) -> &mut Self {
        self.id = match id {
            "" | "." => None,
            other => Some(other.to_string()),
        };
        self
    }

    pub fn no_id(&mut self) -> &mut Self {
        self.id = None;
        self
    }

    pub fn alleles(&mut self, alleles: Vec<Allele>) -> &mut Self {
        self.alleles = alleles;
        self
    }

    pub fn filters(&mut self, filters: Vec<String>) -> &mut Self {
        self.filters = filters;
        self
    }

    pub fn filter(&mut self, filter: &str) -> &mut Self {
        self.filters.push(filter.to_string());
        self
    }

    pub fn qual(&mut self, qual: f64) -> &mut Self {
        self.qual = Some(qual);
        self
    }

    pub fn genotypes(&mut self, genotypes: Vec<Genotype>) -> &mut Self {
        self.genotypes = genotypes;
        self
    }

    /// Replace the whole attribute map.
    pub fn attributes(&mut self, attributes: Attributes) -> &mut Self {
        self.attributes = attributes;
        self
    }

    pub fn attribute<V: Into<AttributeValue>>(&mut self, key: &str, value: V) -> &mut Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn rm_attribute(&mut self, key: &str) -> &mut Self {
        self.attributes.shift_remove(key);
        self
    }

    ///
    /// Validate and build the record. The first allele must be the only
    /// reference allele and allele bases must be unique.
    ///
    pub fn build(&self) -> Result<VariantContext, VariantError> {
        let first = self.alleles.first().ok_or(VariantError::NoAlleles)?;
        if !first.is_reference() {
            return Err(VariantError::FirstAlleleNotReference(
                first.bases().to_string(),
            ));
        }

        let n_ref = self.alleles.iter().filter(|a| a.is_reference()).count();
        if n_ref != 1 {
            return Err(VariantError::ReferenceAlleleCount(n_ref));
        }

        let mut seen: HashSet<&Allele> = HashSet::default();
        for allele in self.alleles.iter() {
            if !seen.insert(allele) {
                return Err(VariantError::DuplicateAllele(allele.bases().to_string()));
            }
        }

        Ok(VariantContext {
            contig: self.contig.clone(),
            start: self.start,
            id: self.id.clone(),
            alleles: self.alleles.clone(),
            filters: self.filters.clone(),
            qual: self.qual,
            genotypes: self.genotypes.clone(),
            attributes: self.attributes.clone(),
        })
    }
}

impl From<&VariantContext> for VariantContextBuilder {
    fn from(vc: &VariantContext) -> Self {
        VariantContextBuilder {
            contig: vc.contig.clone(),
            start: vc.start,
            id: vc.id.clone(),
            alleles: vc.alleles.clone(),
            filters: vc.filters.clone(),
            qual: vc.qual,
            genotypes: vc.genotypes.clone(),
            attributes: vc.attributes.clone(),
        }
    }
}

impl TryFrom<VariantContextBuilder> for VariantContext {
    type Error = VariantError;

    fn try_from(builder: VariantContextBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}
