pub mod allele;
pub mod attribute;
pub mod genotype;
pub mod header;
pub mod locus;
pub mod variant;

// re-export for cleaner imports
pub use self::allele::Allele;
pub use self::attribute::{AttributeValue, Attributes};
pub use self::genotype::{Genotype, GenotypeBuilder};
pub use self::header::{Cardinality, HeaderLine, HeaderLineKind, ValueType, VcfHeader};
pub use self::locus::Locus;
pub use self::variant::{VariantContext, VariantContextBuilder};
