use std::fmt::{self, Display};

use indexmap::IndexMap;

///
/// Declared number of values for an INFO/FORMAT field.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cardinality {
    /// A fixed count (`Number=0` for flags, `Number=1`, ...)
    Fixed(u32),
    /// One value per alternate allele (`Number=A`)
    PerAltAllele,
    /// One value per allele, reference included (`Number=R`)
    PerAllele,
    /// One value per possible genotype (`Number=G`)
    PerGenotype,
    /// Unknown or unbounded (`Number=.`)
    Unbounded,
}

impl Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Fixed(n) => write!(f, "{}", n),
            Cardinality::PerAltAllele => write!(f, "A"),
            Cardinality::PerAllele => write!(f, "R"),
            Cardinality::PerGenotype => write!(f, "G"),
            Cardinality::Unbounded => write!(f, "."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueType {
    Integer,
    Float,
    Flag,
    Character,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeaderLineKind {
    Info,
    Format,
}

///
/// An INFO or FORMAT declaration.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeaderLine {
    pub kind: HeaderLineKind,
    pub id: String,
    pub number: Cardinality,
    pub value_type: ValueType,
    pub description: String,
}

impl HeaderLine {
    pub fn info(id: &str, number: Cardinality, value_type: ValueType, description: &str) -> Self {
        HeaderLine {
            kind: HeaderLineKind::Info,
            id: id.to_string(),
            number,
            value_type,
            description: description.to_string(),
        }
    }

    pub fn format(id: &str, number: Cardinality, value_type: ValueType, description: &str) -> Self {
        HeaderLine {
            kind: HeaderLineKind::Format,
            id: id.to_string(),
            number,
            value_type,
            description: description.to_string(),
        }
    }

    ///
    /// Flag INFO line, as used for overlap membership fields.
    ///
    pub fn flag(id: &str, description: &str) -> Self {
        HeaderLine::info(id, Cardinality::Fixed(0), ValueType::Flag, description)
    }
}

impl Display for HeaderLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            HeaderLineKind::Info => "INFO",
            HeaderLineKind::Format => "FORMAT",
        };
        write!(
            f,
            "##{}=<ID={},Number={},Type={:?},Description=\"{}\">",
            kind, self.id, self.number, self.value_type, self.description
        )
    }
}

///
/// The subset of a VCF header the annotation engine needs: the INFO and FORMAT
/// declarations, keyed by ID.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VcfHeader {
    info: IndexMap<String, HeaderLine>,
    format: IndexMap<String, HeaderLine>,
}

impl VcfHeader {
    pub fn new() -> Self {
        Self::default()
    }

    ///
    /// Add a header line, replacing any earlier declaration with the same ID and kind.
    ///
    pub fn add_line(&mut self, line: HeaderLine) {
        match line.kind {
            HeaderLineKind::Info => self.info.insert(line.id.clone(), line),
            HeaderLineKind::Format => self.format.insert(line.id.clone(), line),
        };
    }

    pub fn info_line(&self, id: &str) -> Option<&HeaderLine> {
        self.info.get(id)
    }

    pub fn format_line(&self, id: &str) -> Option<&HeaderLine> {
        self.format.get(id)
    }

    pub fn info_lines(&self) -> impl Iterator<Item = &HeaderLine> {
        self.info.values()
    }

    pub fn format_lines(&self) -> impl Iterator<Item = &HeaderLine> {
        self.format.values()
    }
}

impl FromIterator<HeaderLine> for VcfHeader {
    fn from_iter<T: IntoIterator<Item = HeaderLine>>(iter: T) -> Self {
        let mut header = VcfHeader::new();
        for line in iter {
            header.add_line(line);
        }
        header
    }
}
