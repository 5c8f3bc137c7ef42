/// Epoch-stamped visited set.
///
/// Clearing bumps the epoch instead of zeroing memory, so reuse across
/// layers within one traversal is O(1).
pub(crate) struct VisitedSet {
    epochs: Vec<u32>,
    epoch: u32,
}

impl VisitedSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            epochs: vec![0; capacity.max(1)],
            epoch: 1,
        }
    }

    pub fn clear(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        if self.epoch == 0 {
            // Wrapped: stale stamps could alias the new epoch.
            self.epochs.fill(0);
            self.epoch = 1;
        }
    }

    /// Mark `id` visited; returns true the first time only.
    pub fn insert(&mut self, id: usize) -> bool {
        if id >= self.epochs.len() {
            self.epochs.resize((id + 1).next_power_of_two(), 0);
        }
        if self.epochs[id] == self.epoch {
            return false;
        }
        self.epochs[id] = self.epoch;
        true
    }
}
