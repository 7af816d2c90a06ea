//!
//! Containers for the raw, per-allele data of reducible annotations.
//!
//! A reducible annotation cannot be finalized from a single record when records
//! are later merged; instead it stores raw per-allele data, which is combined
//! across records and only then turned into a reportable value. These types hold
//! that raw data between the stages.
//!
use std::fmt::Display;

use fxhash::FxHashMap as HashMap;

use varanno_core::models::Allele;

use crate::error::{AnnotationError, AnnotationResult};

/// Delimiter between alleles in serialized raw data.
pub const RAW_DELIMITER: &str = "|";

///
/// Per-allele payloads plus the raw string they were read from (or will be
/// written to).
///
#[derive(Debug, Clone, PartialEq)]
pub struct ReducibleAnnotationData<T> {
    raw_data: String,
    attribute_map: HashMap<Allele, T>,
}

impl<T> ReducibleAnnotationData<T> {
    pub fn new(raw_data: &str) -> Self {
        ReducibleAnnotationData {
            raw_data: raw_data.to_string(),
            attribute_map: HashMap::default(),
        }
    }

    pub fn raw_data(&self) -> &str {
        &self.raw_data
    }

    pub fn has_attribute(&self, allele: &Allele) -> bool {
        self.attribute_map.contains_key(allele)
    }

    ///
    /// Payload for `allele`. `None` means no data for that allele yet.
    ///
    pub fn get(&self, allele: &Allele) -> Option<&T> {
        self.attribute_map.get(allele)
    }

    pub fn get_mut(&mut self, allele: &Allele) -> Option<&mut T> {
        self.attribute_map.get_mut(allele)
    }

    pub fn put(&mut self, allele: Allele, value: T) -> Option<T> {
        self.attribute_map.insert(allele, value)
    }

    pub fn attribute_map(&self) -> &HashMap<Allele, T> {
        &self.attribute_map
    }

    ///
    /// Replace every payload at once.
    ///
    pub fn set_attribute_map(&mut self, attribute_map: HashMap<Allele, T>) {
        self.attribute_map = attribute_map;
    }
}

///
/// [ReducibleAnnotationData] bound to the allele list of one record. Exactly one
/// of those alleles must be the reference.
///
#[derive(Debug, Clone, PartialEq)]
pub struct AlleleSpecificAnnotationData<T> {
    data: ReducibleAnnotationData<T>,
    alleles: Vec<Allele>,
    reference: Allele,
}

fn find_reference(alleles: &[Allele]) -> AnnotationResult<&Allele> {
    let mut references = alleles.iter().filter(|a| a.is_reference());
    match (references.next(), references.count()) {
        (Some(reference), 0) => Ok(reference),
        (None, _) => Err(AnnotationError::ReferenceAllele(0)),
        (Some(_), extra) => Err(AnnotationError::ReferenceAllele(1 + extra)),
    }
}

impl<T> AlleleSpecificAnnotationData<T> {
    pub fn new(alleles: Vec<Allele>, raw_data: &str) -> AnnotationResult<Self> {
        let reference = find_reference(&alleles)?.clone();
        Ok(AlleleSpecificAnnotationData {
            data: ReducibleAnnotationData::new(raw_data),
            alleles,
            reference,
        })
    }

    ///
    /// Alleles in the order given at construction.
    ///
    pub fn alleles(&self) -> &[Allele] {
        &self.alleles
    }

    pub fn reference_allele(&self) -> &Allele {
        &self.reference
    }

    pub fn raw_data(&self) -> &str {
        self.data.raw_data()
    }

    pub fn has_attribute(&self, allele: &Allele) -> bool {
        self.data.has_attribute(allele)
    }

    pub fn get(&self, allele: &Allele) -> Option<&T> {
        self.data.get(allele)
    }

    pub fn get_mut(&mut self, allele: &Allele) -> Option<&mut T> {
        self.data.get_mut(allele)
    }

    pub fn put(&mut self, allele: Allele, value: T) -> Option<T> {
        self.data.put(allele, value)
    }

    pub fn attribute_map(&self) -> &HashMap<Allele, T> {
        self.data.attribute_map()
    }

    ///
    /// Replace every payload at once. The reference invariant is checked again:
    /// a map keyed by a second, different reference allele is rejected.
    ///
    pub fn set_attribute_map(&mut self, attribute_map: HashMap<Allele, T>) -> AnnotationResult<()> {
        find_reference(&self.alleles)?;
        let foreign = attribute_map
            .keys()
            .filter(|a| a.is_reference() && **a != self.reference)
            .count();
        if foreign > 0 {
            return Err(AnnotationError::ReferenceAllele(1 + foreign));
        }
        self.data.set_attribute_map(attribute_map);
        Ok(())
    }

    ///
    /// Split the raw string into one slot per allele, in allele order.
    ///
    pub fn raw_slots(&self, delimiter: &str) -> Vec<&str> {
        self.data.raw_data().split(delimiter).collect()
    }

    ///
    /// Fill the payloads from the raw string. Empty slots are left absent. The
    /// raw string must hold exactly one slot per allele.
    ///
    pub fn parse_raw<F>(&mut self, key: &str, delimiter: &str, parse: F) -> AnnotationResult<()>
    where
        F: Fn(&str) -> Option<T>,
    {
        let invalid = || AnnotationError::InvalidRawData {
            key: key.to_string(),
            value: self.data.raw_data().to_string(),
        };

        let slots: Vec<String> = self.raw_slots(delimiter).into_iter().map(String::from).collect();
        if slots.len() != self.alleles.len() {
            return Err(invalid());
        }

        let mut parsed = Vec::with_capacity(slots.len());
        for (allele, slot) in self.alleles.iter().zip(slots.iter()) {
            if slot.is_empty() {
                continue;
            }
            let value = parse(slot).ok_or_else(invalid)?;
            parsed.push((allele.clone(), value));
        }

        for (allele, value) in parsed {
            self.data.put(allele, value);
        }
        Ok(())
    }

    ///
    /// Render the payloads in allele order, joined by `delimiter`, with brackets
    /// and whitespace removed. Absent payloads render as empty strings.
    ///
    pub fn format_raw(&self, delimiter: &str) -> String
    where
        T: Display,
    {
        self.alleles
            .iter()
            .map(|a| self.data.get(a).map(|v| v.to_string()).unwrap_or_default())
            .collect::<Vec<String>>()
            .join(delimiter)
            .chars()
            .filter(|c| *c != '[' && *c != ']' && !c.is_whitespace())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn alleles() -> Vec<Allele> {
        vec![
            Allele::reference("A").unwrap(),
            Allele::alternate("C").unwrap(),
            Allele::alternate("T").unwrap(),
        ]
    }

    #[rstest]
    fn test_reference_allele(alleles: Vec<Allele>) {
        let data: AlleleSpecificAnnotationData<i64> =
            AlleleSpecificAnnotationData::new(alleles.clone(), "").unwrap();
        assert_eq!(data.reference_allele(), &alleles[0]);
        assert!(data.reference_allele().is_reference());
    }

    #[rstest]
    fn test_no_reference_allele_fails() {
        let alleles = vec![
            Allele::alternate("C").unwrap(),
            Allele::alternate("T").unwrap(),
        ];
        let result = AlleleSpecificAnnotationData::<i64>::new(alleles, "");
        assert!(matches!(result, Err(AnnotationError::ReferenceAllele(0))));
    }

    #[rstest]
    fn test_two_reference_alleles_fail() {
        let alleles = vec![
            Allele::reference("A").unwrap(),
            Allele::reference("C").unwrap(),
        ];
        let result = AlleleSpecificAnnotationData::<i64>::new(alleles, "");
        assert!(matches!(result, Err(AnnotationError::ReferenceAllele(2))));
    }

    #[rstest]
    fn test_alleles_keep_construction_order(alleles: Vec<Allele>) {
        let mut data = AlleleSpecificAnnotationData::new(alleles.clone(), "").unwrap();
        data.put(alleles[2].clone(), 3);
        data.put(alleles[0].clone(), 1);
        assert_eq!(data.alleles(), alleles.as_slice());
    }

    #[rstest]
    fn test_absent_allele_is_not_an_error(alleles: Vec<Allele>) {
        let data: AlleleSpecificAnnotationData<i64> =
            AlleleSpecificAnnotationData::new(alleles.clone(), "").unwrap();
        assert_eq!(data.get(&alleles[1]), None);
        assert_eq!(data.has_attribute(&alleles[1]), false);
    }

    #[rstest]
    fn test_format_raw_strips_brackets(alleles: Vec<Allele>) {
        let mut data = AlleleSpecificAnnotationData::new(alleles.clone(), "").unwrap();
        data.put(alleles[0].clone(), "[10, 2]".to_string());
        data.put(alleles[2].clone(), "[4, 1]".to_string());
        assert_eq!(data.format_raw(RAW_DELIMITER), "10,2||4,1");
    }

    #[rstest]
    fn test_parse_raw_round_trip(alleles: Vec<Allele>) {
        let mut data: AlleleSpecificAnnotationData<i64> =
            AlleleSpecificAnnotationData::new(alleles.clone(), "7||3").unwrap();
        data.parse_raw("RAW", RAW_DELIMITER, |s| s.parse().ok())
            .unwrap();

        assert_eq!(data.get(&alleles[0]), Some(&7));
        assert_eq!(data.get(&alleles[1]), None);
        assert_eq!(data.get(&alleles[2]), Some(&3));
        assert_eq!(data.format_raw(RAW_DELIMITER), "7||3");
    }

    #[rstest]
    fn test_parse_raw_wrong_slot_count(alleles: Vec<Allele>) {
        let mut data: AlleleSpecificAnnotationData<i64> =
            AlleleSpecificAnnotationData::new(alleles, "7|3").unwrap();
        let result = data.parse_raw("RAW", RAW_DELIMITER, |s| s.parse().ok());
        assert!(matches!(result, Err(AnnotationError::InvalidRawData { .. })));
    }

    #[rstest]
    fn test_set_attribute_map_rechecks_reference(alleles: Vec<Allele>) {
        let mut data: AlleleSpecificAnnotationData<i64> =
            AlleleSpecificAnnotationData::new(alleles.clone(), "").unwrap();

        let mut good = HashMap::default();
        good.insert(alleles[0].clone(), 1);
        good.insert(alleles[1].clone(), 2);
        assert!(data.set_attribute_map(good).is_ok());
        assert_eq!(data.get(&alleles[1]), Some(&2));

        let mut bad = HashMap::default();
        bad.insert(Allele::reference("G").unwrap(), 1);
        assert!(matches!(
            data.set_attribute_map(bad),
            Err(AnnotationError::ReferenceAllele(2))
        ));
    }
}
