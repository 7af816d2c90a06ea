//!
//! Comparison datasets ("resources") that can be queried for the records starting
//! at a locus: dbSNP, comparison call sets, or any resource an expression reads from.
//!
use std::collections::BTreeMap;
use std::sync::Arc;

use fxhash::FxHashMap as HashMap;

use crate::models::VariantContext;

///
/// A named, queryable set of variant records.
///
pub trait FeatureSource: Send + Sync {
    fn name(&self) -> &str;

    ///
    /// All records starting at `contig:position`, in dataset order. An empty
    /// result means the resource has nothing at that locus.
    ///
    fn query_at(&self, contig: &str, position: u64) -> Vec<&VariantContext>;
}

///
/// An in-memory [FeatureSource], indexed by contig and start position.
/// Records at the same position keep their insertion order.
///
#[derive(Debug, Clone, Default)]
pub struct VariantTrack {
    name: String,
    records: HashMap<String, BTreeMap<u64, Vec<VariantContext>>>,
}

impl VariantTrack {
    pub fn new(name: &str) -> Self {
        VariantTrack {
            name: name.to_string(),
            records: HashMap::default(),
        }
    }

    pub fn add(&mut self, vc: VariantContext) {
        self.records
            .entry(vc.contig().to_string())
            .or_default()
            .entry(vc.start())
            .or_default()
            .push(vc);
    }

    pub fn len(&self) -> usize {
        self.records
            .values()
            .flat_map(|by_pos| by_pos.values())
            .map(|v| v.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FeatureSource for VariantTrack {
    fn name(&self) -> &str {
        &self.name
    }

    fn query_at(&self, contig: &str, position: u64) -> Vec<&VariantContext> {
        self.records
            .get(contig)
            .and_then(|by_pos| by_pos.get(&position))
            .map(|records| records.iter().collect())
            .unwrap_or_default()
    }
}

impl<I: IntoIterator<Item = VariantContext>> From<(&str, I)> for VariantTrack {
    fn from((name, records): (&str, I)) -> Self {
        let mut track = VariantTrack::new(name);
        for vc in records {
            track.add(vc);
        }
        track
    }
}

///
/// Resources bound by name, shared between the expression resolver and the
/// overlap annotator.
///
#[derive(Clone, Default)]
pub struct Resources {
    sources: HashMap<String, Arc<dyn FeatureSource>>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    ///
    /// Bind a resource under its own name, replacing any earlier binding.
    ///
    pub fn insert<S: FeatureSource + 'static>(&mut self, source: S) {
        let source: Arc<dyn FeatureSource> = Arc::new(source);
        self.sources.insert(source.name().to_string(), source);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn FeatureSource>> {
        self.sources.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
