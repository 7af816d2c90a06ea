//!
//! Allele-specific root-mean-square mapping quality.
//!
//! The raw form keeps, per allele, the sum of squared mapping qualities and the
//! number of reads (`sum_sq,n`), so values from several records can be added up
//! before the square root is taken.
//!
use std::fmt::{self, Display};

use varanno_core::models::{
    Allele, AttributeValue, Attributes, Cardinality, HeaderLine, ValueType, VariantContext,
};

use crate::error::{AnnotationError, AnnotationResult};
use crate::reducible::{AlleleSpecificAnnotationData, RAW_DELIMITER};
use crate::traits::{AnnotationContext, InfoAnnotation, ReducibleAnnotation, VariantAnnotation};

pub const AS_RMS_MAPPING_QUALITY_KEY: &str = "AS_MQ";
pub const AS_RAW_RMS_MAPPING_QUALITY_KEY: &str = "AS_RAW_MQ";

/// Written for alternate alleles supported by no read
const MISSING_VALUE: &str = ".";

///
/// Running mapping quality totals for one allele.
///
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MappingQualitySums {
    pub sum_squared: f64,
    pub reads: usize,
}

impl MappingQualitySums {
    fn add_read(&mut self, mapping_quality: u8) {
        self.sum_squared += f64::from(mapping_quality).powi(2);
        self.reads += 1;
    }

    fn merge(&mut self, other: &MappingQualitySums) {
        self.sum_squared += other.sum_squared;
        self.reads += other.reads;
    }

    pub fn rms(&self) -> Option<f64> {
        (self.reads > 0).then(|| (self.sum_squared / self.reads as f64).sqrt())
    }

    fn parse(slot: &str) -> Option<Self> {
        let (sum_squared, reads) = slot.split_once(',')?;
        Some(MappingQualitySums {
            sum_squared: sum_squared.trim().parse().ok()?,
            reads: reads.trim().parse().ok()?,
        })
    }
}

impl Display for MappingQualitySums {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.sum_squared, self.reads)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlleleSpecificRmsMappingQuality;

impl AlleleSpecificRmsMappingQuality {
    ///
    /// Per-allele totals over every sample. Each read counts towards its most
    /// likely allele; uninformative reads are ignored.
    ///
    fn raw_sums(
        &self,
        ctx: &AnnotationContext<'_>,
        vc: &VariantContext,
    ) -> AnnotationResult<Option<AlleleSpecificAnnotationData<MappingQualitySums>>> {
        let Some(likelihoods) = ctx.likelihoods else {
            return Ok(None);
        };

        let mut data = AlleleSpecificAnnotationData::new(vc.alleles().to_vec(), "")?;
        for allele in vc.alleles() {
            data.put(allele.clone(), MappingQualitySums::default());
        }

        for (sample, per_read) in likelihoods.iter() {
            if !per_read.covers(vc.alleles()) {
                return Err(AnnotationError::AlleleLikelihoodMismatch {
                    sample: sample.to_string(),
                    locus: vc.locus().to_string(),
                    alleles: allele_list(vc.alleles()),
                });
            }
            for read in per_read.reads() {
                let Some(allele) = per_read.most_likely_allele(read, vc.alleles()) else {
                    continue;
                };
                if let Some(sums) = data.get_mut(allele) {
                    sums.add_read(read.mapping_quality);
                }
            }
        }
        Ok(Some(data))
    }

    ///
    /// RMS mapping quality for each alternate allele of `vc`, formatted with two
    /// decimals.
    ///
    fn finalize_sums(
        &self,
        vc: &VariantContext,
        data: &AlleleSpecificAnnotationData<MappingQualitySums>,
    ) -> Attributes {
        let values = vc
            .alternate_alleles()
            .iter()
            .map(|alt| match data.get(alt).and_then(|s| s.rms()) {
                Some(rms) => AttributeValue::from(format!("{:.2}", rms)),
                None => AttributeValue::from(MISSING_VALUE),
            })
            .collect::<Vec<AttributeValue>>();

        let mut attributes = Attributes::new();
        attributes.insert(
            AS_RMS_MAPPING_QUALITY_KEY.to_string(),
            AttributeValue::List(values),
        );
        attributes
    }
}

fn allele_list(alleles: &[Allele]) -> String {
    alleles
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<String>>()
        .join(",")
}

impl VariantAnnotation for AlleleSpecificRmsMappingQuality {
    fn name(&self) -> &str {
        "AS_RMSMappingQuality"
    }

    fn key_names(&self) -> Vec<&'static str> {
        vec![AS_RMS_MAPPING_QUALITY_KEY, AS_RAW_RMS_MAPPING_QUALITY_KEY]
    }

    fn descriptions(&self) -> Vec<HeaderLine> {
        vec![
            HeaderLine::info(
                AS_RMS_MAPPING_QUALITY_KEY,
                Cardinality::PerAltAllele,
                ValueType::Float,
                "Allele-specific RMS Mapping Quality",
            ),
            HeaderLine::info(
                AS_RAW_RMS_MAPPING_QUALITY_KEY,
                Cardinality::PerAllele,
                ValueType::String,
                "Allele-specific raw data for RMS Mapping Quality",
            ),
        ]
    }
}

impl InfoAnnotation for AlleleSpecificRmsMappingQuality {
    fn annotate(
        &self,
        ctx: &AnnotationContext<'_>,
        vc: &VariantContext,
    ) -> AnnotationResult<Option<Attributes>> {
        Ok(self
            .raw_sums(ctx, vc)?
            .map(|data| self.finalize_sums(vc, &data)))
    }

    fn as_reducible(&self) -> Option<&dyn ReducibleAnnotation> {
        Some(self)
    }
}

impl ReducibleAnnotation for AlleleSpecificRmsMappingQuality {
    fn raw_key_name(&self) -> &'static str {
        AS_RAW_RMS_MAPPING_QUALITY_KEY
    }

    fn annotate_raw(
        &self,
        ctx: &AnnotationContext<'_>,
        vc: &VariantContext,
    ) -> AnnotationResult<Option<Attributes>> {
        Ok(self.raw_sums(ctx, vc)?.map(|data| {
            let mut attributes = Attributes::new();
            attributes.insert(
                AS_RAW_RMS_MAPPING_QUALITY_KEY.to_string(),
                AttributeValue::from(data.format_raw(RAW_DELIMITER)),
            );
            attributes
        }))
    }

    fn combine_raw(
        &self,
        alleles: &[Allele],
        raw: &[AlleleSpecificAnnotationData<String>],
    ) -> AnnotationResult<Attributes> {
        let mut combined: AlleleSpecificAnnotationData<MappingQualitySums> =
            AlleleSpecificAnnotationData::new(alleles.to_vec(), "")?;

        for entry in raw {
            let mut parsed: AlleleSpecificAnnotationData<MappingQualitySums> =
                AlleleSpecificAnnotationData::new(entry.alleles().to_vec(), entry.raw_data())?;
            parsed.parse_raw(
                AS_RAW_RMS_MAPPING_QUALITY_KEY,
                RAW_DELIMITER,
                MappingQualitySums::parse,
            )?;

            for allele in alleles {
                let Some(sums) = parsed.get(allele) else {
                    continue;
                };
                match combined.get_mut(allele) {
                    Some(total) => total.merge(sums),
                    None => {
                        combined.put(allele.clone(), *sums);
                    }
                }
            }
        }

        let mut attributes = Attributes::new();
        attributes.insert(
            AS_RAW_RMS_MAPPING_QUALITY_KEY.to_string(),
            AttributeValue::from(combined.format_raw(RAW_DELIMITER)),
        );
        Ok(attributes)
    }

    fn finalize_raw(
        &self,
        vc: &VariantContext,
        original: &VariantContext,
    ) -> AnnotationResult<Option<Attributes>> {
        let Some(raw) = vc.attribute(AS_RAW_RMS_MAPPING_QUALITY_KEY) else {
            return Ok(None);
        };

        let mut data = AlleleSpecificAnnotationData::new(original.alleles().to_vec(), &raw.to_string())?;
        data.parse_raw(
            AS_RAW_RMS_MAPPING_QUALITY_KEY,
            RAW_DELIMITER,
            MappingQualitySums::parse,
        )?;
        Ok(Some(self.finalize_sums(vc, &data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use varanno_core::evidence::{PerReadAlleleLikelihoods, StratifiedLikelihoods};
    use varanno_core::models::VariantContextBuilder;

    fn alleles(bases: &[&str]) -> Vec<Allele> {
        bases
            .iter()
            .enumerate()
            .map(|(i, b)| Allele::new(b, i == 0).unwrap())
            .collect()
    }

    #[fixture]
    fn vc() -> VariantContext {
        VariantContextBuilder::new("chr1", 10, alleles(&["A", "G"]))
            .build()
            .unwrap()
    }

    #[fixture]
    fn likelihoods(vc: VariantContext) -> StratifiedLikelihoods {
        let mut per_read = PerReadAlleleLikelihoods::new(vc.alleles().to_vec());
        per_read.add_read("r1", 60, vec![-0.1, -3.0]).unwrap();
        per_read.add_read("r2", 20, vec![-3.0, -0.1]).unwrap();
        per_read.add_read("r3", 40, vec![-3.0, -0.1]).unwrap();

        let mut stratified = StratifiedLikelihoods::default();
        stratified.insert("s1".to_string(), per_read);
        stratified
    }

    #[rstest]
    fn test_raw_data(vc: VariantContext, likelihoods: StratifiedLikelihoods) {
        let ctx = AnnotationContext::from_likelihoods(&likelihoods);
        let raw = AlleleSpecificRmsMappingQuality
            .annotate_raw(&ctx, &vc)
            .unwrap()
            .unwrap();
        assert_eq!(
            raw[AS_RAW_RMS_MAPPING_QUALITY_KEY],
            AttributeValue::from("3600,1|2000,2")
        );
    }

    #[rstest]
    fn test_finalized_value(vc: VariantContext, likelihoods: StratifiedLikelihoods) {
        let ctx = AnnotationContext::from_likelihoods(&likelihoods);
        let finalized = AlleleSpecificRmsMappingQuality
            .annotate(&ctx, &vc)
            .unwrap()
            .unwrap();
        // sqrt((400 + 1600) / 2)
        assert_eq!(finalized[AS_RMS_MAPPING_QUALITY_KEY].to_string(), "31.62");
        assert_eq!(finalized.contains_key(AS_RAW_RMS_MAPPING_QUALITY_KEY), false);
    }

    #[rstest]
    fn test_uncovered_alleles_fail(likelihoods: StratifiedLikelihoods) {
        let vc = VariantContextBuilder::new("chr1", 10, alleles(&["A", "T"]))
            .build()
            .unwrap();
        let ctx = AnnotationContext::from_likelihoods(&likelihoods);
        let result = AlleleSpecificRmsMappingQuality.annotate_raw(&ctx, &vc);
        assert!(matches!(
            result,
            Err(AnnotationError::AlleleLikelihoodMismatch { .. })
        ));
    }

    #[rstest]
    fn test_no_likelihoods(vc: VariantContext) {
        let result = AlleleSpecificRmsMappingQuality
            .annotate(&AnnotationContext::default(), &vc)
            .unwrap();
        assert_eq!(result, None);
    }

    #[rstest]
    fn test_combine_over_merged_alleles() {
        let merged = alleles(&["A", "G", "T"]);
        let first = AlleleSpecificAnnotationData::new(alleles(&["A", "G"]), "3600,1|400,1").unwrap();
        let second = AlleleSpecificAnnotationData::new(alleles(&["A", "T"]), "1600,1|900,1").unwrap();

        let combined = AlleleSpecificRmsMappingQuality
            .combine_raw(&merged, &[first, second])
            .unwrap();
        assert_eq!(
            combined[AS_RAW_RMS_MAPPING_QUALITY_KEY],
            AttributeValue::from("5200,2|400,1|900,1")
        );
    }

    #[rstest]
    fn test_combine_rejects_bad_raw_data() {
        let merged = alleles(&["A", "G"]);
        let entry = AlleleSpecificAnnotationData::new(merged.clone(), "3600|x").unwrap();
        let result = AlleleSpecificRmsMappingQuality.combine_raw(&merged, &[entry]);
        assert!(matches!(result, Err(AnnotationError::InvalidRawData { .. })));
    }

    #[rstest]
    fn test_finalize_follows_subset_alleles() {
        let original = VariantContextBuilder::new("chr1", 10, alleles(&["A", "G", "T"]))
            .attribute(AS_RAW_RMS_MAPPING_QUALITY_KEY, "5200,2|400,1|")
            .build()
            .unwrap();
        let subset = VariantContextBuilder::from(&original)
            .alleles(alleles(&["A", "T", "G"]))
            .build()
            .unwrap();

        let finalized = AlleleSpecificRmsMappingQuality
            .finalize_raw(&subset, &original)
            .unwrap()
            .unwrap();
        assert_eq!(finalized[AS_RMS_MAPPING_QUALITY_KEY].to_string(), ".,20.00");
    }
}
