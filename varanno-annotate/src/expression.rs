//!
//! Copy fields from comparison resources onto target records.
//!
//! An expression `resource.FIELD` names a field of records in the resource
//! `resource`. At every site the first resource record starting at the target's
//! position supplies the value, which is stored on the target as `resource.FIELD`.
//!
use std::sync::Arc;

use log::{debug, warn};

use varanno_core::models::variant::PASSES_FILTERS;
use varanno_core::models::{Allele, AttributeValue, Attributes, Cardinality, VariantContext, VcfHeader};
use varanno_core::utils::{split_to_biallelics, trim_alleles};
use varanno_core::{FeatureSource, Resources};

use crate::error::{AnnotateError, AnnotateResult};

/// Value written for a target allele with no counterpart in the resource record
pub const MISSING_ALLELE_VALUE: &str = "0";

/// Fields read from the record itself rather than from its attributes
const ID_FIELD: &str = "ID";
const ALT_FIELD: &str = "ALT";
const FILTER_FIELD: &str = "FILTER";

fn is_record_field(field: &str) -> bool {
    field == ID_FIELD || field == ALT_FIELD || field == FILTER_FIELD
}

///
/// A parsed `resource.field` expression.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub full_name: String,
    pub resource: String,
    pub field: String,
}

impl Expression {
    ///
    /// Parse `resource.field`. The split happens at the last dot, so resource
    /// names may contain dots themselves.
    ///
    pub fn parse(expression: &str) -> AnnotateResult<Self> {
        match expression.rsplit_once('.') {
            Some((resource, field)) if !resource.is_empty() && !field.is_empty() => {
                Ok(Expression {
                    full_name: expression.to_string(),
                    resource: resource.to_string(),
                    field: field.to_string(),
                })
            }
            _ => Err(AnnotateError::MalformedExpression(expression.to_string())),
        }
    }
}

///
/// An expression bound to its resource and declared cardinality.
///
#[derive(Clone)]
pub struct ExpressionBinding {
    pub expression: Expression,
    pub source: Arc<dyn FeatureSource>,
    /// `None` for ID, ALT and FILTER, which need no declaration
    pub number: Option<Cardinality>,
}

///
/// Resolves a list of expressions against the resources at each site.
///
#[derive(Clone, Default)]
pub struct ExpressionResolver {
    bindings: Vec<ExpressionBinding>,
    require_allele_match: bool,
}

impl ExpressionResolver {
    ///
    /// Parse and bind every expression. The header must declare an INFO line
    /// for each `full_name`, except for ID, ALT and FILTER expressions.
    ///
    pub fn new(
        expressions: &[String],
        resources: &Resources,
        header: &VcfHeader,
        require_allele_match: bool,
    ) -> AnnotateResult<Self> {
        let mut bindings = Vec::with_capacity(expressions.len());
        for raw in expressions {
            let expression = Expression::parse(raw)?;

            let source = resources.get(&expression.resource).ok_or_else(|| {
                AnnotateError::UnknownResource {
                    expression: expression.full_name.clone(),
                    resource: expression.resource.clone(),
                }
            })?;

            let number = if is_record_field(&expression.field) {
                None
            } else {
                let line = header
                    .info_line(&expression.full_name)
                    .ok_or_else(|| AnnotateError::MissingHeaderInfo(expression.full_name.clone()))?;
                Some(line.number)
            };

            bindings.push(ExpressionBinding {
                expression,
                source,
                number,
            });
        }

        Ok(ExpressionResolver {
            bindings,
            require_allele_match,
        })
    }

    pub fn bindings(&self) -> &[ExpressionBinding] {
        &self.bindings
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    ///
    /// Values for every expression that resolves at the site of `vc`, keyed by
    /// full name. Expressions with no resource record, no field or no allele
    /// match are left out.
    ///
    pub fn resolve(&self, vc: &VariantContext) -> AnnotateResult<Attributes> {
        let mut resolved = Attributes::new();
        for binding in self.bindings.iter() {
            let candidates = binding.source.query_at(vc.contig(), vc.start());
            let Some(source) = candidates.first() else {
                continue;
            };
            if let Some(value) = self.resolve_one(binding, source, vc)? {
                resolved.insert(binding.expression.full_name.clone(), value);
            }
        }
        Ok(resolved)
    }

    fn resolve_one(
        &self,
        binding: &ExpressionBinding,
        source: &VariantContext,
        vc: &VariantContext,
    ) -> AnnotateResult<Option<AttributeValue>> {
        let expression = &binding.expression;
        match expression.field.as_str() {
            ID_FIELD => Ok(source.id().map(AttributeValue::from)),
            ALT_FIELD => Ok(source
                .alternate_allele(0)
                .map(|alt| AttributeValue::from(alt.display_string()))),
            FILTER_FIELD => {
                if source.is_filtered() {
                    Ok(Some(AttributeValue::from(source.filters().join(","))))
                } else {
                    Ok(Some(AttributeValue::from(PASSES_FILTERS)))
                }
            }
            field => {
                let Some(value) = source.attribute(field) else {
                    debug!("{} has no {} at {}", expression.resource, field, vc.locus());
                    return Ok(None);
                };
                let per_allele = matches!(
                    binding.number,
                    Some(Cardinality::PerAltAllele) | Some(Cardinality::PerAllele)
                );
                if !(per_allele || self.require_allele_match) {
                    return Ok(Some(value.clone()));
                }
                let with_reference = binding.number == Some(Cardinality::PerAllele);
                let matched = concordant_values(vc, source, value, with_reference)?;
                if matched.is_none() {
                    debug!(
                        "No allele of {} matches {} for {}",
                        vc, source, expression.full_name
                    );
                }
                Ok(matched)
            }
        }
    }
}

///
/// Bi-allelic pieces of `vc` in minimal representation, as (start, ref, alt).
/// Trimming a shared prefix moves the start, so two pieces only match when all
/// three agree.
///
fn min_representation_biallelics(
    vc: &VariantContext,
) -> AnnotateResult<Vec<(u64, Allele, Allele)>> {
    split_to_biallelics(vc)?
        .iter()
        .map(|biallelic| {
            let trimmed = trim_alleles(biallelic)?;
            let alt = trimmed.alternate_allele(0).cloned().unwrap_or_else(|| trimmed.reference().clone());
            Ok((trimmed.start(), trimmed.reference().clone(), alt))
        })
        .collect()
}

///
/// Elements of a possibly multi-valued attribute.
///
fn elements(value: &AttributeValue) -> Vec<AttributeValue> {
    match value {
        AttributeValue::List(items) => items.clone(),
        AttributeValue::String(s) if s.contains(',') => {
            s.split(',').map(AttributeValue::from).collect()
        }
        other => vec![other.clone()],
    }
}

///
/// Reorder the per-allele `value` of `source` to follow the alleles of `vc`.
/// Target alleles without a counterpart get [MISSING_ALLELE_VALUE]; when none
/// of them has one the result is `None`.
///
fn concordant_values(
    vc: &VariantContext,
    source: &VariantContext,
    value: &AttributeValue,
    with_reference: bool,
) -> AnnotateResult<Option<AttributeValue>> {
    let targets = min_representation_biallelics(vc)?;
    let sources = min_representation_biallelics(source)?;
    let values = elements(value);
    let offset = usize::from(with_reference);

    let mut out = Vec::with_capacity(targets.len() + offset);
    if with_reference {
        match values.first() {
            Some(reference_value) => out.push(reference_value.clone()),
            None => {
                warn!("Empty per-allele value at {}", vc.locus());
                return Ok(None);
            }
        }
    }

    let mut any_match = false;
    for target in targets.iter() {
        let matched = sources
            .iter()
            .position(|s| s == target)
            .and_then(|i| values.get(i + offset));
        match matched {
            Some(v) => {
                any_match = true;
                out.push(v.clone());
            }
            None => out.push(AttributeValue::from(MISSING_ALLELE_VALUE)),
        }
    }

    Ok(any_match.then_some(AttributeValue::List(out)))
}
