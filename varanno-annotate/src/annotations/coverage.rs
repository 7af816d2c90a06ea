use varanno_core::models::{AttributeValue, Attributes, Cardinality, HeaderLine, ValueType, VariantContext};

use crate::error::AnnotationResult;
use crate::traits::{AnnotationContext, InfoAnnotation, VariantAnnotation};

pub const DEPTH_KEY: &str = "DP";

///
/// Total depth over all samples. Pileups are preferred; without them the count
/// of reads informative for one of the record's alleles is used.
///
#[derive(Debug, Clone, Copy, Default)]
pub struct Coverage;

impl VariantAnnotation for Coverage {
    fn name(&self) -> &str {
        "Coverage"
    }

    fn key_names(&self) -> Vec<&'static str> {
        vec![DEPTH_KEY]
    }

    fn descriptions(&self) -> Vec<HeaderLine> {
        vec![HeaderLine::info(
            DEPTH_KEY,
            Cardinality::Fixed(1),
            ValueType::Integer,
            "Approximate read depth; some reads may have been filtered",
        )]
    }
}

impl InfoAnnotation for Coverage {
    fn annotate(
        &self,
        ctx: &AnnotationContext<'_>,
        vc: &VariantContext,
    ) -> AnnotationResult<Option<Attributes>> {
        let depth = match (ctx.pileups, ctx.likelihoods) {
            (Some(pileups), _) if !pileups.is_empty() => {
                pileups.values().map(|p| p.depth()).sum::<usize>()
            }
            (_, Some(likelihoods)) if !likelihoods.is_empty() => likelihoods
                .values()
                .map(|l| l.informative_read_count(vc.alleles()))
                .sum::<usize>(),
            _ => return Ok(None),
        };

        let mut attributes = Attributes::new();
        attributes.insert(DEPTH_KEY.to_string(), AttributeValue::from(depth));
        Ok(Some(attributes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use varanno_core::evidence::{
        PerReadAlleleLikelihoods, Pileup, PileupElement, StratifiedLikelihoods, StratifiedPileups,
    };
    use varanno_core::models::{Allele, VariantContextBuilder};

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

    fn pileup(depth: usize) -> Pileup {
        let element = PileupElement {
            base: b'A',
            base_quality: 30,
            mapping_quality: 60,
            is_deletion: false,
        };
        Pileup::new(vec![element; depth])
    }

    #[rstest]
    fn test_depth_from_pileups(vc: VariantContext) {
        let mut pileups = StratifiedPileups::default();
        pileups.insert("s1".to_string(), pileup(4));
        pileups.insert("s2".to_string(), pileup(3));

        let ctx = AnnotationContext::new(Some(&pileups), None);
        let attributes = Coverage.annotate(&ctx, &vc).unwrap().unwrap();
        assert_eq!(attributes[DEPTH_KEY], AttributeValue::Integer(7));
    }

    #[rstest]
    fn test_depth_from_likelihoods(vc: VariantContext) {
        let mut likelihoods = PerReadAlleleLikelihoods::new(vc.alleles().to_vec());
        likelihoods.add_read("r1", 60, vec![-0.1, -3.0]).unwrap();
        likelihoods.add_read("r2", 60, vec![-3.0, -0.1]).unwrap();
        // uninformative
        likelihoods.add_read("r3", 60, vec![-1.0, -1.05]).unwrap();

        let mut stratified = StratifiedLikelihoods::default();
        stratified.insert("s1".to_string(), likelihoods);

        let ctx = AnnotationContext::from_likelihoods(&stratified);
        let attributes = Coverage.annotate(&ctx, &vc).unwrap().unwrap();
        assert_eq!(attributes[DEPTH_KEY], AttributeValue::Integer(2));
    }

    #[rstest]
    fn test_no_evidence(vc: VariantContext) {
        let result = Coverage.annotate(&AnnotationContext::default(), &vc).unwrap();
        assert_eq!(result, None);
    }
}
