use std::path::Path;

use indexmap::IndexMap;
use log::debug;

use varanno_core::Resources;
use varanno_core::evidence::StratifiedLikelihoods;
use varanno_core::models::{
    Allele, Attributes, Genotype, GenotypeBuilder, HeaderLine, VariantContext,
    VariantContextBuilder, VcfHeader,
};

use crate::config::AnnotatorConfig;
use crate::error::{AnnotateError, AnnotateResult, AnnotationError};
use crate::expression::ExpressionResolver;
use crate::overlap::VariantOverlapAnnotator;
use crate::reducible::AlleleSpecificAnnotationData;
use crate::traits::{AnnotationContext, GenotypeAnnotation, InfoAnnotation};

///
/// Raw per-allele data gathered from several records, keyed by raw annotation key.
///
pub type RawAnnotations = IndexMap<String, Vec<AlleleSpecificAnnotationData<String>>>;

///
/// Result of [VariantAnnotatorEngine::combine]: the combined raw values plus the
/// raw entries no annotator claimed.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinedAnnotations {
    pub annotations: Attributes,
    pub remaining: RawAnnotations,
}

fn wrap(name: &str) -> impl FnOnce(AnnotationError) -> AnnotateError + '_ {
    move |source| AnnotateError::Annotation {
        name: name.to_string(),
        source,
    }
}

/// `vc` with `values` written over its attributes, later keys winning.
fn with_attributes(vc: &VariantContext, values: Attributes) -> AnnotateResult<VariantContext> {
    if values.is_empty() {
        return Ok(vc.clone());
    }
    let mut builder = VariantContextBuilder::from(vc);
    for (key, value) in values {
        builder.attribute(&key, value);
    }
    Ok(builder.build()?)
}

///
/// Runs the configured annotators, expressions and overlap tracks over variant
/// records, one site at a time.
///
pub struct VariantAnnotatorEngine {
    info_annotations: Vec<Box<dyn InfoAnnotation>>,
    genotype_annotations: Vec<Box<dyn GenotypeAnnotation>>,
    expressions: ExpressionResolver,
    overlaps: VariantOverlapAnnotator,
}

impl VariantAnnotatorEngine {
    ///
    /// Build an engine from annotator instances, the resources they may refer to
    /// and the header describing expression fields. Annotators named in
    /// `config.exclude` are dropped.
    ///
    pub fn new(
        info_annotations: Vec<Box<dyn InfoAnnotation>>,
        genotype_annotations: Vec<Box<dyn GenotypeAnnotation>>,
        resources: &Resources,
        config: &AnnotatorConfig,
        header: &VcfHeader,
    ) -> AnnotateResult<Self> {
        let excluded = |name: &str| {
            let excluded = config.exclude.iter().any(|e| e == name);
            if excluded {
                debug!("Excluding annotation {}", name);
            }
            excluded
        };

        let info_annotations = info_annotations
            .into_iter()
            .filter(|a| !excluded(a.name()))
            .collect();
        let genotype_annotations = genotype_annotations
            .into_iter()
            .filter(|a| !excluded(a.name()))
            .collect();

        let expressions = ExpressionResolver::new(
            &config.expressions,
            resources,
            header,
            config.require_allele_match,
        )?;
        let overlaps = VariantOverlapAnnotator::from_config(config, resources)?;

        Ok(VariantAnnotatorEngine {
            info_annotations,
            genotype_annotations,
            expressions,
            overlaps,
        })
    }

    ///
    /// Same as [VariantAnnotatorEngine::new], reading the configuration from a
    /// TOML file.
    ///
    pub fn from_config_file(
        info_annotations: Vec<Box<dyn InfoAnnotation>>,
        genotype_annotations: Vec<Box<dyn GenotypeAnnotation>>,
        resources: &Resources,
        path: &Path,
        header: &VcfHeader,
    ) -> AnnotateResult<Self> {
        let config = AnnotatorConfig::try_from(path)?;
        VariantAnnotatorEngine::new(info_annotations, genotype_annotations, resources, &config, header)
    }

    pub fn info_annotations(&self) -> &[Box<dyn InfoAnnotation>] {
        &self.info_annotations
    }

    pub fn genotype_annotations(&self) -> &[Box<dyn GenotypeAnnotation>] {
        &self.genotype_annotations
    }

    pub fn overlaps(&self) -> &VariantOverlapAnnotator {
        &self.overlaps
    }

    ///
    /// Header lines for every key the engine may write.
    ///
    pub fn header_lines(&self) -> Vec<HeaderLine> {
        let mut lines: Vec<HeaderLine> = self
            .info_annotations
            .iter()
            .flat_map(|a| a.descriptions())
            .collect();
        lines.extend(self.genotype_annotations.iter().flat_map(|a| a.descriptions()));
        lines.extend(self.overlaps.descriptions());
        lines
    }

    ///
    /// Run the genotype annotators over every sample of `vc`. Each annotator writes
    /// into a builder seeded from the original genotype, so a later annotator
    /// overwrites keys set by an earlier one.
    ///
    pub fn annotate_genotypes(
        &self,
        vc: &VariantContext,
        ctx: &AnnotationContext<'_>,
    ) -> AnnotateResult<Vec<Genotype>> {
        if self.genotype_annotations.is_empty() {
            return Ok(vc.genotypes().to_vec());
        }

        let mut genotypes = Vec::with_capacity(vc.genotypes().len());
        for genotype in vc.genotypes() {
            let evidence = ctx.sample(genotype.sample_name());
            let mut builder = GenotypeBuilder::from(genotype);
            for annotation in self.genotype_annotations.iter() {
                annotation
                    .annotate(vc, genotype, evidence, &mut builder)
                    .map_err(wrap(annotation.name()))?;
            }
            genotypes.push(builder.build());
        }
        Ok(genotypes)
    }

    ///
    /// Fully annotate one record: genotypes, expressions, site annotators, then
    /// the ID and overlap flags. Site annotators see the record with the
    /// annotated genotypes and every attribute written before them.
    ///
    pub fn annotate_context(
        &self,
        vc: &VariantContext,
        ctx: &AnnotationContext<'_>,
    ) -> AnnotateResult<VariantContext> {
        let genotypes = self.annotate_genotypes(vc, ctx)?;
        let annotated = VariantContextBuilder::from(vc).genotypes(genotypes).build()?;
        let mut annotated = with_attributes(&annotated, self.expressions.resolve(&annotated)?)?;

        for annotation in self.info_annotations.iter() {
            if let Some(values) = annotation
                .annotate(ctx, &annotated)
                .map_err(wrap(annotation.name()))?
            {
                annotated = with_attributes(&annotated, values)?;
            }
        }

        self.stamp(&annotated)
    }

    ///
    /// Annotate a record called from an active region, where only read
    /// likelihoods are available. With `use_raw`, reducible annotators emit their
    /// raw data instead of finalized values. Expressions are not resolved.
    ///
    pub fn annotate_context_for_active_region(
        &self,
        vc: &VariantContext,
        likelihoods: &StratifiedLikelihoods,
        use_raw: bool,
    ) -> AnnotateResult<VariantContext> {
        let ctx = AnnotationContext::from_likelihoods(likelihoods);
        let genotypes = self.annotate_genotypes(vc, &ctx)?;
        let mut annotated = VariantContextBuilder::from(vc).genotypes(genotypes).build()?;

        for annotation in self.info_annotations.iter() {
            let values = match annotation.as_reducible() {
                Some(reducible) if use_raw => reducible.annotate_raw(&ctx, &annotated),
                _ => annotation.annotate(&ctx, &annotated),
            }
            .map_err(wrap(annotation.name()))?;

            if let Some(values) = values {
                annotated = with_attributes(&annotated, values)?;
            }
        }

        self.stamp(&annotated)
    }

    fn stamp(&self, vc: &VariantContext) -> AnnotateResult<VariantContext> {
        let annotated = self.overlaps.annotate_rs_id(vc)?;
        self.overlaps.annotate_overlaps(&annotated)
    }

    ///
    /// Combine raw data from several records over the merged allele list. Every
    /// reducible annotator consumes its raw key; unclaimed keys are returned in
    /// `remaining`.
    ///
    pub fn combine(
        &self,
        alleles: &[Allele],
        raw: RawAnnotations,
    ) -> AnnotateResult<CombinedAnnotations> {
        let mut remaining = raw;
        let mut annotations = Attributes::new();

        for annotation in self.info_annotations.iter() {
            let Some(reducible) = annotation.as_reducible() else {
                continue;
            };
            let Some(data) = remaining.shift_remove(reducible.raw_key_name()) else {
                continue;
            };
            let combined = reducible
                .combine_raw(alleles, &data)
                .map_err(wrap(annotation.name()))?;
            annotations.extend(combined);
        }

        Ok(CombinedAnnotations {
            annotations,
            remaining,
        })
    }

    ///
    /// Replace the raw data of every reducible annotator on `vc` by its finalized
    /// value. `original` is the merged record before allele subsetting. Raw keys
    /// are always removed.
    ///
    pub fn finalize_annotations(
        &self,
        vc: &VariantContext,
        original: &VariantContext,
    ) -> AnnotateResult<VariantContext> {
        let mut builder = VariantContextBuilder::from(vc);
        for annotation in self.info_annotations.iter() {
            let Some(reducible) = annotation.as_reducible() else {
                continue;
            };
            if let Some(values) = reducible
                .finalize_raw(vc, original)
                .map_err(wrap(annotation.name()))?
            {
                for (key, value) in values {
                    builder.attribute(&key, value);
                }
            }
            builder.rm_attribute(reducible.raw_key_name());
        }
        Ok(builder.build()?)
    }
}
