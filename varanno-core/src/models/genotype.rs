use super::allele::Allele;
use super::attribute::{AttributeValue, Attributes};

///
/// The call for one sample at one site.
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Genotype {
    sample_name: String,
    alleles: Vec<Allele>,
    attributes: Attributes,
}

impl Genotype {
    pub fn new(sample_name: &str, alleles: Vec<Allele>) -> Self {
        Genotype {
            sample_name: sample_name.to_string(),
            alleles,
            attributes: Attributes::new(),
        }
    }

    pub fn sample_name(&self) -> &str {
        &self.sample_name
    }

    pub fn alleles(&self) -> &[Allele] {
        &self.alleles
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// No-call genotypes carry no alleles.
    pub fn is_called(&self) -> bool {
        !self.alleles.is_empty()
    }

    pub fn is_het(&self) -> bool {
        self.alleles.windows(2).any(|w| w[0] != w[1])
    }
}

///
/// Builds modified copies of a [Genotype]. Annotators write through this so the
/// source genotype is never touched.
///
#[derive(Debug, Clone)]
pub struct GenotypeBuilder {
    sample_name: String,
    alleles: Vec<Allele>,
    attributes: Attributes,
}

impl GenotypeBuilder {
    pub fn new(sample_name: &str) -> Self {
        GenotypeBuilder {
            sample_name: sample_name.to_string(),
            alleles: Vec::new(),
            attributes: Attributes::new(),
        }
    }

    pub fn alleles(&mut self, alleles: Vec<Allele>) -> &mut Self {
        self.alleles = alleles;
        self
    }

    ///
    /// Set an attribute, replacing any earlier value under the same key.
    ///
    pub fn attribute<V: Into<AttributeValue>>(&mut self, key: &str, value: V) -> &mut Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn attributes(&mut self, attributes: Attributes) -> &mut Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn get_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn build(&self) -> Genotype {
        Genotype {
            sample_name: self.sample_name.clone(),
            alleles: self.alleles.clone(),
            attributes: self.attributes.clone(),
        }
    }
}

impl From<&Genotype> for GenotypeBuilder {
    fn from(genotype: &Genotype) -> Self {
        GenotypeBuilder {
            sample_name: genotype.sample_name.clone(),
            alleles: genotype.alleles.clone(),
            attributes: genotype.attributes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_builder_leaves_source_untouched() {
        let a = Allele::reference("A").unwrap();
        let c = Allele::alternate("C").unwrap();
        let genotype = Genotype::new("NA12878", vec![a, c]);

        let mut builder = GenotypeBuilder::from(&genotype);
        builder.attribute("DP", 10);
        let annotated = builder.build();

        assert_eq!(genotype.has_attribute("DP"), false);
        assert_eq!(annotated.attribute("DP"), Some(&AttributeValue::Integer(10)));
        assert!(annotated.is_het());
    }

    #[rstest]
    fn test_builder_last_write_wins() {
        let mut builder = GenotypeBuilder::new("s1");
        builder.attribute("K", "p").attribute("K", "q");
        assert_eq!(builder.build().attribute("K"), Some(&AttributeValue::from("q")));
    }
}
