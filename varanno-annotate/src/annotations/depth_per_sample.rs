use varanno_core::models::{Cardinality, Genotype, GenotypeBuilder, HeaderLine, ValueType, VariantContext};

use crate::error::AnnotationResult;
use crate::traits::{GenotypeAnnotation, SampleEvidence, VariantAnnotation};

use super::coverage::DEPTH_KEY;

///
/// Per-sample depth. Uncalled genotypes and samples without evidence are left
/// alone.
///
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthPerSample;

impl VariantAnnotation for DepthPerSample {
    fn name(&self) -> &str {
        "DepthPerSample"
    }

    fn key_names(&self) -> Vec<&'static str> {
        vec![DEPTH_KEY]
    }

    fn descriptions(&self) -> Vec<HeaderLine> {
        vec![HeaderLine::format(
            DEPTH_KEY,
            Cardinality::Fixed(1),
            ValueType::Integer,
            "Approximate read depth (reads with MQ=255 or with bad mates are filtered)",
        )]
    }
}

impl GenotypeAnnotation for DepthPerSample {
    fn annotate(
        &self,
        vc: &VariantContext,
        genotype: &Genotype,
        evidence: SampleEvidence<'_>,
        builder: &mut GenotypeBuilder,
    ) -> AnnotationResult<()> {
        if !genotype.is_called() {
            return Ok(());
        }

        let depth = match (evidence.pileup, evidence.likelihoods) {
            (Some(pileup), _) => pileup.depth(),
            (None, Some(likelihoods)) => likelihoods.informative_read_count(vc.alleles()),
            (None, None) => return Ok(()),
        };
        builder.attribute(DEPTH_KEY, depth);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use varanno_core::evidence::{Pileup, PileupElement};
    use varanno_core::models::{Allele, AttributeValue, VariantContextBuilder};

    #[fixture]
    fn vc() -> VariantContext {
        VariantContextBuilder::new(
            "chr1",
            10,
            vec![Allele::reference("A").unwrap(), Allele::alternate("G").unwrap()],
        )
        .build()
        .unwrap()
    }

    fn annotate(vc: &VariantContext, genotype: &Genotype, evidence: SampleEvidence<'_>) -> Genotype {
        let mut builder = GenotypeBuilder::from(genotype);
        DepthPerSample
            .annotate(vc, genotype, evidence, &mut builder)
            .unwrap();
        builder.build()
    }

    #[rstest]
    fn test_depth_from_pileup(vc: VariantContext) {
        let genotype = Genotype::new("s1", vc.alleles().to_vec());
        let element = PileupElement {
            base: b'G',
            base_quality: 30,
            mapping_quality: 60,
            is_deletion: false,
        };
        let pileup = Pileup::new(vec![element; 5]);
        let evidence = SampleEvidence {
            pileup: Some(&pileup),
            likelihoods: None,
        };

        let annotated = annotate(&vc, &genotype, evidence);
        assert_eq!(annotated.attribute(DEPTH_KEY), Some(&AttributeValue::Integer(5)));
    }

    #[rstest]
    fn test_no_call_is_untouched(vc: VariantContext) {
        let genotype = Genotype::new("s1", vec![]);
        let pileup = Pileup::default();
        let evidence = SampleEvidence {
            pileup: Some(&pileup),
            likelihoods: None,
        };

        let annotated = annotate(&vc, &genotype, evidence);
        assert_eq!(annotated, genotype);
    }

    #[rstest]
    fn test_no_evidence_is_untouched(vc: VariantContext) {
        let genotype = Genotype::new("s1", vc.alleles().to_vec());
        let annotated = annotate(&vc, &genotype, SampleEvidence::default());
        assert_eq!(annotated.has_attribute(DEPTH_KEY), false);
    }
}
