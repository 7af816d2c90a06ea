use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::VariantError;

///
/// A single genomic position: contig plus 1-based coordinate.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Locus {
    pub contig: String,
    pub position: u64,
}

impl Locus {
    pub fn new(contig: &str, position: u64) -> Self {
        Locus {
            contig: contig.to_string(),
            position,
        }
    }
}

impl Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.contig, self.position)
    }
}

impl FromStr for Locus {
    type Err = VariantError;

    ///
    /// Parse a `contig:position` string
    ///
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (contig, position) = s
            .rsplit_once(':')
            .ok_or_else(|| VariantError::InvalidLocus(s.to_string()))?;
        let position = position
            .parse::<u64>()
            .map_err(|_| VariantError::InvalidLocus(s.to_string()))?;
        if contig.is_empty() {
            return Err(VariantError::InvalidLocus(s.to_string()));
        }
        Ok(Locus::new(contig, position))
    }
}
