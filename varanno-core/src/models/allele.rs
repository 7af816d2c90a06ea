use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

use crate::errors::VariantError;

/// Bases that can appear in a concrete (non-symbolic) allele.
const VALID_BASES: &[u8] = b"ACGTN";

/// Allele used for spanning deletions.
pub const SPAN_DEL: &str = "*";

///
/// A single allele of a variant: a base string and whether it is the reference.
///
/// Two alleles are equal when their bases are equal; the reference flag does not
/// take part in equality or hashing. Within one variant the bases are unique, so
/// this is enough to key per-allele maps.
///
#[derive(Debug, Clone, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Allele {
    bases: String,
    is_reference: bool,
}

impl Allele {
    ///
    /// Create an allele, validating the bases. Symbolic alleles (`<DEL>`,
    /// `<NON_REF>`, breakends) and the spanning deletion `*` are accepted as-is.
    ///
    pub fn new(bases: &str, is_reference: bool) -> Result<Self, VariantError> {
        if bases.is_empty() {
            return Err(VariantError::InvalidAllele(bases.to_string()));
        }

        let allele = Allele {
            bases: bases.to_string(),
            is_reference,
        };

        if allele.is_symbolic() {
            if is_reference {
                return Err(VariantError::InvalidAllele(bases.to_string()));
            }
            return Ok(allele);
        }

        let upper = bases.to_ascii_uppercase();
        if !upper.bytes().all(|b| VALID_BASES.contains(&b)) {
            return Err(VariantError::InvalidAllele(bases.to_string()));
        }

        Ok(Allele {
            bases: upper,
            is_reference,
        })
    }

    /// Shorthand for a reference allele.
    pub fn reference(bases: &str) -> Result<Self, VariantError> {
        Allele::new(bases, true)
    }

    /// Shorthand for an alternate allele.
    pub fn alternate(bases: &str) -> Result<Self, VariantError> {
        Allele::new(bases, false)
    }

    pub fn bases(&self) -> &str {
        &self.bases
    }

    pub fn display_string(&self) -> &str {
        &self.bases
    }

    pub fn is_reference(&self) -> bool {
        self.is_reference
    }

    pub fn is_non_reference(&self) -> bool {
        !self.is_reference
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    ///
    /// Symbolic alleles carry no literal sequence: `<ID>`, breakend notation,
    /// or the spanning deletion.
    ///
    pub fn is_symbolic(&self) -> bool {
        self.bases == SPAN_DEL
            || (self.bases.starts_with('<') && self.bases.ends_with('>'))
            || self.bases.contains('[')
            || self.bases.contains(']')
    }

    ///
    /// A copy of this allele holding a sub-range of its bases; used when trimming
    /// alleles to their minimal representation.
    ///
    pub(crate) fn with_bases(&self, bases: &str) -> Self {
        Allele {
            bases: bases.to_string(),
            is_reference: self.is_reference,
        }
    }
}

impl PartialEq for Allele {
    fn eq(&self, other: &Self) -> bool {
        self.bases == other.bases
    }
}

impl Hash for Allele {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bases.hash(state);
    }
}

impl Display for Allele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_reference {
            write!(f, "{}*", self.bases)
        } else {
            write!(f, "{}", self.bases)
        }
    }
}
