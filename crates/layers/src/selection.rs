/// Which features of a source collection a layer draws.
///
/// Ordering contract:
/// - `Indices` are strictly ascending source indices, so layer position `i`
///   maps back to a unique source feature and iteration order is stable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FeatureSelection {
    #[default]
    All,
    Indices(Vec<u32>),
}

impl FeatureSelection {
    /// Build from ascending indices (caller guarantees ordering).
    pub fn from_sorted(indices: Vec<u32>) -> Self {
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        FeatureSelection::Indices(indices)
    }

    /// Number of selected features given the source collection length.
    pub fn len(&self, source_len: usize) -> usize {
        match self {
            FeatureSelection::All => source_len,
            FeatureSelection::Indices(ix) => ix.len(),
        }
    }

    pub fn is_empty(&self, source_len: usize) -> bool {
        self.len(source_len) == 0
    }

    /// Source index of the `position`-th selected feature.
    pub fn source_index(&self, position: usize, source_len: usize) -> Option<usize> {
        match self {
            FeatureSelection::All => (position < source_len).then_some(position),
            FeatureSelection::Indices(ix) => ix
                .get(position)
                .map(|&i| i as usize)
                .filter(|&i| i < source_len),
        }
    }

    /// Iterates selected source indices in ascending order.
    pub fn iter_indices(&self, source_len: usize) -> Box<dyn Iterator<Item = usize> + '_> {
        match self {
            FeatureSelection::All => Box::new(0..source_len),
            FeatureSelection::Indices(ix) => Box::new(
                ix.iter()
                    .map(|&i| i as usize)
                    .take_while(move |&i| i < source_len),
            ),
        }
    }
}
