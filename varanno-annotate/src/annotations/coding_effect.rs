use varanno_core::models::{AttributeValue, Attributes, HeaderLine, VariantContext};

use crate::error::AnnotationResult;
use crate::snpeff::{EffectType, is_subtype_of};
use crate::traits::{AnnotationContext, InfoAnnotation, VariantAnnotation};

/// snpEff effect attribute, e.g. `EFF=STOP_GAINED(HIGH|NONSENSE|...),INTRON(...)`
pub const EFFECT_KEY: &str = "EFF";
pub const CODING_KEY: &str = "CODING";
pub const NON_SYNONYMOUS_KEY: &str = "NONSYN";

///
/// Flags records whose snpEff effects fall in a coding sequence, and among those
/// the ones that change the protein.
///
#[derive(Debug, Clone, Copy, Default)]
pub struct CodingEffect;

fn parse_effects(value: &AttributeValue) -> AnnotationResult<Vec<EffectType>> {
    value
        .values()
        .iter()
        .map(|entry| entry.split('(').next().unwrap_or_default())
        .filter(|name| !name.trim().is_empty())
        .map(|name| name.parse::<EffectType>())
        .collect()
}

impl VariantAnnotation for CodingEffect {
    fn name(&self) -> &str {
        "CodingEffect"
    }

    fn key_names(&self) -> Vec<&'static str> {
        vec![CODING_KEY, NON_SYNONYMOUS_KEY]
    }

    fn descriptions(&self) -> Vec<HeaderLine> {
        vec![
            HeaderLine::flag(CODING_KEY, "Variant has an effect on a coding sequence"),
            HeaderLine::flag(
                NON_SYNONYMOUS_KEY,
                "Variant has a non-synonymous effect on a coding sequence",
            ),
        ]
    }
}

impl InfoAnnotation for CodingEffect {
    fn annotate(
        &self,
        _ctx: &AnnotationContext<'_>,
        vc: &VariantContext,
    ) -> AnnotationResult<Option<Attributes>> {
        let Some(value) = vc.attribute(EFFECT_KEY) else {
            return Ok(None);
        };
        let effects = parse_effects(value)?;

        let mut attributes = Attributes::new();
        if effects.iter().any(|e| is_subtype_of(*e, EffectType::CDS)) {
            attributes.insert(CODING_KEY.to_string(), AttributeValue::Flag(true));
        }
        if effects
            .iter()
            .any(|e| is_subtype_of(*e, EffectType::NonSynonymousCoding))
        {
            attributes.insert(NON_SYNONYMOUS_KEY.to_string(), AttributeValue::Flag(true));
        }

        Ok((!attributes.is_empty()).then_some(attributes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::error::AnnotationError;
    use varanno_core::models::{Allele, VariantContextBuilder};

    fn vc_with_effects(effects: &str) -> VariantContext {
        VariantContextBuilder::new(
            "chr1",
            10,
            vec![Allele::reference("A").unwrap(), Allele::alternate("G").unwrap()],
        )
        .attribute(EFFECT_KEY, effects)
        .build()
        .unwrap()
    }

    fn flags(attributes: Option<Attributes>) -> Vec<String> {
        attributes
            .map(|a| a.keys().cloned().collect())
            .unwrap_or_default()
    }

    #[rstest]
    #[case("STOP_GAINED(HIGH|NONSENSE|Cag/Tag)", vec!["CODING", "NONSYN"])]
    #[case("SYNONYMOUS_STOP(LOW|SILENT),INTRON(MODIFIER)", vec!["CODING"])]
    #[case("INTRON(MODIFIER),UPSTREAM(MODIFIER)", vec![])]
    #[case("SPLICE_SITE_DONOR(HIGH)", vec![])]
    fn test_coding_flags(#[case] effects: &str, #[case] expected: Vec<&str>) {
        let vc = vc_with_effects(effects);
        let attributes = CodingEffect
            .annotate(&AnnotationContext::default(), &vc)
            .unwrap();
        assert_eq!(flags(attributes), expected);
    }

    #[rstest]
    fn test_no_effects() {
        let vc = VariantContextBuilder::new(
            "chr1",
            10,
            vec![Allele::reference("A").unwrap(), Allele::alternate("G").unwrap()],
        )
        .build()
        .unwrap();
        let result = CodingEffect.annotate(&AnnotationContext::default(), &vc).unwrap();
        assert_eq!(result, None);
    }

    #[rstest]
    fn test_unknown_effect_fails() {
        let vc = vc_with_effects("NOT_AN_EFFECT(HIGH)");
        let result = CodingEffect.annotate(&AnnotationContext::default(), &vc);
        assert!(matches!(result, Err(AnnotationError::UnknownEffect(_))));
    }
}
