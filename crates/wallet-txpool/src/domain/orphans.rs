use super::entities::{Hash, OutPoint};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// A spend received before the output it consumes was observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrphanSpend {
    /// Hash of the spending transaction (held in the pool's `all` index).
    pub tx_hash: Hash,
    /// Index of the input that awaits the output.
    pub input_index: usize,
}

// Pending spends indexed by the outpoint they wait for.
// Spends for one outpoint keep arrival order; the first one that verifies
// wins the output when it shows up.
#[derive(Debug, Default)]
pub struct OrphanIndex {
    by_outpoint: HashMap<OutPoint, Vec<OrphanSpend>>,
}

impl OrphanIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, awaited: OutPoint, spend: OrphanSpend) {
        match self.by_outpoint.entry(awaited) {
            Entry::Occupied(mut e) => e.get_mut().push(spend),
            Entry::Vacant(e) => {
                e.insert(vec![spend]);
            }
        }
    }

    /// Removes every spend waiting for `awaited` and returns them in arrival order.
    pub fn take(&mut self, awaited: &OutPoint) -> Vec<OrphanSpend> {
        self.by_outpoint.remove(awaited).unwrap_or_default()
    }

    pub fn contains(&self, awaited: &OutPoint) -> bool {
        self.by_outpoint
            .get(awaited)
            .map_or(false, |spends| !spends.is_empty())
    }

    pub fn get(&self, awaited: &OutPoint) -> &[OrphanSpend] {
        self.by_outpoint
            .get(awaited)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of outpoints with pending spends.
    pub fn len(&self) -> usize {
        self.by_outpoint.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_outpoint.is_empty()
    }

    /// Outpoints with pending spends, in no particular order.
    pub fn awaited(&self) -> impl Iterator<Item = &OutPoint> {
        self.by_outpoint.keys()
    }
}
