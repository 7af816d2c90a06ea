//!
//! Identity and overlap annotation against comparison resources.
//!
//! A record "overlaps" a comparison record when the comparison record is
//! unfiltered, has the same reference allele and shares at least one alternate
//! allele. The identity resource (dbSNP) also contributes its ID.
//!
use std::sync::Arc;

use log::trace;

use varanno_core::models::variant::ID_FIELD_SEPARATOR;
use varanno_core::models::{HeaderLine, VariantContext, VariantContextBuilder};
use varanno_core::{FeatureSource, Resources};

use crate::config::AnnotatorConfig;
use crate::error::{AnnotateError, AnnotateResult};

/// Flag set on records found in the dbSNP resource.
pub const DBSNP_KEY: &str = "DB";

///
/// A resource whose hits set a boolean flag on the record.
///
#[derive(Clone)]
pub struct OverlapBinding {
    pub source: Arc<dyn FeatureSource>,
    pub flag: String,
}

impl OverlapBinding {
    pub fn new(source: Arc<dyn FeatureSource>, flag: &str) -> Self {
        OverlapBinding {
            source,
            flag: flag.to_string(),
        }
    }
}

///
/// The first unfiltered candidate with the same reference allele and at least one
/// shared alternate allele. Candidates must start where `vc` starts.
///
fn first_match<'a>(
    candidates: &[&'a VariantContext],
    vc: &VariantContext,
) -> AnnotateResult<Option<&'a VariantContext>> {
    for candidate in candidates.iter().copied() {
        if candidate.is_filtered() {
            continue;
        }
        if candidate.contig() != vc.contig() || candidate.start() != vc.start() {
            return Err(AnnotateError::CandidateLocusMismatch {
                candidate: candidate.to_string(),
                target: vc.to_string(),
            });
        }
        if candidate.reference() == vc.reference()
            && vc
                .alternate_alleles()
                .iter()
                .any(|alt| candidate.alternate_alleles().contains(alt))
        {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

///
/// Fill in the ID of `vc` from the first matching candidate. An existing ID is
/// extended with `;`, unless it already contains the candidate ID, so applying
/// this twice changes nothing.
///
pub fn annotate_identity(
    candidates: &[&VariantContext],
    vc: &VariantContext,
) -> AnnotateResult<VariantContext> {
    let Some(id) = first_match(candidates, vc)?.and_then(|c| c.id()) else {
        return Ok(vc.clone());
    };

    let new_id = match vc.id() {
        None => id.to_string(),
        Some(existing) if !existing.contains(id) => {
            format!("{}{}{}", existing, ID_FIELD_SEPARATOR, id)
        }
        Some(_) => return Ok(vc.clone()),
    };

    trace!("Setting ID of {} to {}", vc, new_id);
    Ok(VariantContextBuilder::from(vc).id(&new_id).build()?)
}

///
/// Set `flag = true` on `vc` when any candidate matches it.
///
pub fn annotate_overlap(
    candidates: &[&VariantContext],
    flag: &str,
    vc: &VariantContext,
) -> AnnotateResult<VariantContext> {
    match first_match(candidates, vc)? {
        Some(_) => {
            trace!("Flagging {} with {}", vc, flag);
            Ok(VariantContextBuilder::from(vc).attribute(flag, true).build()?)
        }
        None => Ok(vc.clone()),
    }
}

///
/// Identity (dbSNP) and overlap annotation for a set of bound resources.
///
#[derive(Clone, Default)]
pub struct VariantOverlapAnnotator {
    dbsnp: Option<Arc<dyn FeatureSource>>,
    overlaps: Vec<OverlapBinding>,
}

impl VariantOverlapAnnotator {
    ///
    /// Create a new annotator. A dbSNP resource is also bound as the `DB` overlap
    /// flag unless some other resource already claims that flag.
    ///
    pub fn new(dbsnp: Option<Arc<dyn FeatureSource>>, mut overlaps: Vec<OverlapBinding>) -> Self {
        if let Some(dbsnp) = &dbsnp {
            if !overlaps.iter().any(|b| b.flag == DBSNP_KEY) {
                overlaps.push(OverlapBinding::new(dbsnp.clone(), DBSNP_KEY));
            }
        }
        VariantOverlapAnnotator { dbsnp, overlaps }
    }

    ///
    /// Bind the `dbsnp` and `comparisons` resources named in the config. Each
    /// comparison is flagged under its own name.
    ///
    pub fn from_config(config: &AnnotatorConfig, resources: &Resources) -> AnnotateResult<Self> {
        let lookup = |name: &str| {
            resources
                .get(name)
                .ok_or_else(|| AnnotateError::UnknownTrack(name.to_string()))
        };

        let dbsnp = config.dbsnp.as_deref().map(lookup).transpose()?;
        let overlaps = config
            .comparisons
            .iter()
            .map(|name| Ok(OverlapBinding::new(lookup(name.as_str())?, name)))
            .collect::<AnnotateResult<Vec<OverlapBinding>>>()?;

        Ok(VariantOverlapAnnotator::new(dbsnp, overlaps))
    }

    ///
    /// Update the ID of `vc` from the dbSNP resource, if one is bound.
    ///
    pub fn annotate_rs_id(&self, vc: &VariantContext) -> AnnotateResult<VariantContext> {
        match &self.dbsnp {
            Some(dbsnp) => annotate_identity(&dbsnp.query_at(vc.contig(), vc.start()), vc),
            None => Ok(vc.clone()),
        }
    }

    ///
    /// Apply every overlap binding to `vc`, in binding order.
    ///
    pub fn annotate_overlaps(&self, vc: &VariantContext) -> AnnotateResult<VariantContext> {
        let mut annotated = vc.clone();
        for binding in self.overlaps.iter() {
            let candidates = binding.source.query_at(vc.contig(), vc.start());
            annotated = annotate_overlap(&candidates, &binding.flag, &annotated)?;
        }
        Ok(annotated)
    }

    pub fn overlap_names(&self) -> Vec<&str> {
        self.overlaps.iter().map(|b| b.flag.as_str()).collect()
    }

    ///
    /// One flag INFO line per overlap binding.
    ///
    pub fn descriptions(&self) -> Vec<HeaderLine> {
        self.overlap_names()
            .into_iter()
            .map(|name| {
                if name == DBSNP_KEY {
                    HeaderLine::flag(DBSNP_KEY, "dbSNP Membership")
                } else {
                    HeaderLine::flag(name, &format!("{} Membership", name))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use varanno_core::VariantTrack;
    use varanno_core::models::{Allele, AttributeValue};

    fn record(contig: &str, pos: u64, bases: &[&str]) -> VariantContextBuilder {
        let alleles = bases
            .iter()
            .enumerate()
            .map(|(i, b)| Allele::new(b, i == 0).unwrap())
            .collect();
        VariantContextBuilder::new(contig, pos, alleles)
    }

    #[fixture]
    fn target() -> VariantContext {
        record("chr2", 50, &["G", "A"]).build().unwrap()
    }

    #[rstest]
    fn test_overlap_sets_flag(target: VariantContext) {
        let comp = record("chr2", 50, &["G", "A"]).build().unwrap();
        let annotated = annotate_overlap(&[&comp], "FOO", &target).unwrap();
        assert_eq!(annotated.attribute("FOO"), Some(&AttributeValue::Flag(true)));
    }

    #[rstest]
    fn test_filtered_candidate_does_not_flag(target: VariantContext) {
        let comp = record("chr2", 50, &["G", "A"])
            .filter("LowQual")
            .build()
            .unwrap();
        let annotated = annotate_overlap(&[&comp], "FOO", &target).unwrap();
        assert_eq!(annotated.has_attribute("FOO"), false);
        assert_eq!(annotated, target);
    }

    #[rstest]
    fn test_different_alt_does_not_flag(target: VariantContext) {
        let comp = record("chr2", 50, &["G", "T"]).build().unwrap();
        let annotated = annotate_overlap(&[&comp], "FOO", &target).unwrap();
        assert_eq!(annotated.has_attribute("FOO"), false);
    }

    #[rstest]
    fn test_different_reference_does_not_flag(target: VariantContext) {
        let comp = record("chr2", 50, &["GT", "A"]).build().unwrap();
        let annotated = annotate_overlap(&[&comp], "FOO", &target).unwrap();
        assert_eq!(annotated.has_attribute("FOO"), false);
    }

    #[rstest]
    fn test_candidate_at_other_locus_is_an_error(target: VariantContext) {
        let comp = record("chr2", 51, &["G", "A"]).build().unwrap();
        let result = annotate_overlap(&[&comp], "FOO", &target);
        assert!(matches!(
            result,
            Err(AnnotateError::CandidateLocusMismatch { .. })
        ));
    }

    #[rstest]
    fn test_identity_sets_missing_id(target: VariantContext) {
        let comp = record("chr2", 50, &["G", "A", "C"]).id("rs123").build().unwrap();
        let annotated = annotate_identity(&[&comp], &target).unwrap();
        assert_eq!(annotated.id(), Some("rs123"));
    }

    #[rstest]
    fn test_identity_appends_and_is_idempotent() {
        let target = record("chr2", 50, &["G", "A"]).id("COSM1").build().unwrap();
        let comp = record("chr2", 50, &["G", "A"]).id("rs123").build().unwrap();

        let once = annotate_identity(&[&comp], &target).unwrap();
        assert_eq!(once.id(), Some("COSM1;rs123"));

        let twice = annotate_identity(&[&comp], &once).unwrap();
        assert_eq!(twice.id(), Some("COSM1;rs123"));
    }

    #[rstest]
    fn test_identity_first_match_wins(target: VariantContext) {
        let filtered = record("chr2", 50, &["G", "A"]).id("rs0").filter("X").build().unwrap();
        let first = record("chr2", 50, &["G", "A"]).id("rs1").build().unwrap();
        let second = record("chr2", 50, &["G", "A"]).id("rs2").build().unwrap();

        let annotated = annotate_identity(&[&filtered, &first, &second], &target).unwrap();
        assert_eq!(annotated.id(), Some("rs1"));
    }

    #[rstest]
    fn test_identity_no_match_is_unchanged(target: VariantContext) {
        let annotated = annotate_identity(&[], &target).unwrap();
        assert_eq!(annotated, target);
    }

    #[rstest]
    fn test_dbsnp_adds_db_flag(target: VariantContext) {
        let dbsnp: Arc<dyn FeatureSource> = Arc::new(VariantTrack::from((
            "dbsnp",
            vec![record("chr2", 50, &["G", "A"]).id("rs9").build().unwrap()],
        )));
        let annotator = VariantOverlapAnnotator::new(Some(dbsnp), vec![]);
        assert_eq!(annotator.overlap_names(), vec![DBSNP_KEY]);

        let annotated = annotator
            .annotate_overlaps(&annotator.annotate_rs_id(&target).unwrap())
            .unwrap();
        assert_eq!(annotated.id(), Some("rs9"));
        assert_eq!(
            annotated.attribute(DBSNP_KEY),
            Some(&AttributeValue::Flag(true))
        );
    }

    #[rstest]
    fn test_from_config_unknown_resource() {
        let config = AnnotatorConfig {
            comparisons: vec!["missing".to_string()],
            ..Default::default()
        };
        let result = VariantOverlapAnnotator::from_config(&config, &Resources::new());
        assert!(matches!(result, Err(AnnotateError::UnknownTrack(_))));
    }

    #[rstest]
    fn test_descriptions() {
        let mut resources = Resources::new();
        resources.insert(VariantTrack::new("hapmap"));
        resources.insert(VariantTrack::new("dbsnp"));
        let config = AnnotatorConfig {
            comparisons: vec!["hapmap".to_string()],
            dbsnp: Some("dbsnp".to_string()),
            ..Default::default()
        };
        let annotator = VariantOverlapAnnotator::from_config(&config, &resources).unwrap();
        let descriptions = annotator.descriptions();

        assert_eq!(descriptions.len(), 2);
        assert_eq!(descriptions[0].description, "hapmap Membership");
        assert_eq!(descriptions[1].description, "dbSNP Membership");
    }
}
