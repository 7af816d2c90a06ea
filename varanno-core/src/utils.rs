//!
//! Allele-level transforms on variant records: splitting multi-allelic sites into
//! bi-allelic ones and trimming alleles to their minimal representation.
//!
//! Trimming keeps at least one base in every allele, so indels stay anchored on
//! their padding base the way VCF requires.
//!
use crate::errors::VariantError;
use crate::models::{Allele, VariantContext, VariantContextBuilder};

///
/// Number of trailing bases shared by every allele that can be removed while
/// leaving each allele at least one base long.
///
fn common_suffix_len(alleles: &[&[u8]]) -> usize {
    let Some(min_len) = alleles.iter().map(|a| a.len()).min() else {
        return 0;
    };
    let mut trimmed = 0;
    while trimmed + 1 < min_len {
        let ch = alleles[0][alleles[0].len() - 1 - trimmed];
        if alleles.iter().all(|a| a[a.len() - 1 - trimmed] == ch) {
            trimmed += 1;
        } else {
            break;
        }
    }
    trimmed
}

///
/// Number of leading bases shared by every allele that can be removed while
/// leaving each allele at least one base long.
///
fn common_prefix_len(alleles: &[&[u8]]) -> usize {
    let Some(min_len) = alleles.iter().map(|a| a.len()).min() else {
        return 0;
    };
    let mut trimmed = 0;
    while trimmed + 1 < min_len {
        let ch = alleles[0][trimmed];
        if alleles.iter().all(|a| a[trimmed] == ch) {
            trimmed += 1;
        } else {
            break;
        }
    }
    trimmed
}

fn allele_bytes(vc: &VariantContext) -> Vec<&[u8]> {
    vc.alleles().iter().map(|a| a.bases().as_bytes()).collect()
}

///
/// Rebuild `vc` with `left` bases removed from the front and `right` from the back
/// of every allele. Genotypes are dropped since their alleles no longer match.
///
fn clip_alleles(vc: &VariantContext, left: usize, right: usize) -> Result<VariantContext, VariantError> {
    if left == 0 && right == 0 {
        return Ok(vc.clone());
    }
    let alleles: Vec<Allele> = vc
        .alleles()
        .iter()
        .map(|a| a.with_bases(&a.bases()[left..a.len() - right]))
        .collect();

    VariantContextBuilder::from(vc)
        .start(vc.start() + left as u64)
        .alleles(alleles)
        .genotypes(Vec::new())
        .build()
}

///
/// Remove trailing bases common to all alleles.
///
pub fn reverse_trim_alleles(vc: &VariantContext) -> Result<VariantContext, VariantError> {
    if vc.n_alleles() <= 1 || vc.is_symbolic() {
        return Ok(vc.clone());
    }
    let right = common_suffix_len(&allele_bytes(vc));
    clip_alleles(vc, 0, right)
}

///
/// Trim a record to its minimal representation: first the shared suffix, then the
/// shared prefix (shifting the start accordingly). Records with symbolic alleles
/// are returned unchanged.
///
pub fn trim_alleles(vc: &VariantContext) -> Result<VariantContext, VariantError> {
    if vc.n_alleles() <= 1 || vc.is_symbolic() {
        return Ok(vc.clone());
    }
    let reverse_trimmed = reverse_trim_alleles(vc)?;
    let left = common_prefix_len(&allele_bytes(&reverse_trimmed));
    clip_alleles(&reverse_trimmed, left, 0)
}

///
/// Split a record into one bi-allelic record per alternate allele. Each piece is
/// reverse-trimmed and loses its genotypes. Bi-allelic and monomorphic records
/// come back as a single clone.
///
pub fn split_to_biallelics(vc: &VariantContext) -> Result<Vec<VariantContext>, VariantError> {
    if !vc.is_variant() || vc.is_biallelic() {
        return Ok(vec![vc.clone()]);
    }

    vc.alternate_alleles()
        .iter()
        .map(|alt| {
            let biallelic = VariantContextBuilder::from(vc)
                .alleles(vec![vc.reference().clone(), alt.clone()])
                .genotypes(Vec::new())
                .build()?;
            reverse_trim_alleles(&biallelic)
        })
        .collect()
}
