//! # Min-Priority Queue
//!
//! Binary min-heap over a `Vec`, keyed separately from its payload.
//!
//! Children of slot `i` live at `2i + 1` and `2i + 2`. Entries with equal
//! keys are all kept; their relative pop order is unspecified.

/// Index-based min-priority queue.
#[derive(Debug, Clone)]
pub struct MinQueue<K, V> {
    slots: Vec<(K, V)>,
}

impl<K: Ord, V> Default for MinQueue<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> MinQueue<K, V> {
    /// Empty queue.
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Smallest key, if any.
    pub fn peek_key(&self) -> Option<&K> {
        self.slots.first().map(|(k, _)| k)
    }

    /// Insert an entry. O(log n).
    pub fn push(&mut self, key: K, value: V) {
        self.slots.push((key, value));
        self.sift_up(self.slots.len() - 1);
    }

    /// Remove and return the entry with the smallest key. O(log n).
    pub fn pop(&mut self) -> Option<(K, V)> {
        if self.slots.is_empty() {
            return None;
        }
        let last = self.slots.len() - 1;
        self.slots.swap(0, last);
        let min = self.slots.pop();
        if !self.slots.is_empty() {
            self.sift_down(0);
        }
        min
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.slots[i].0 >= self.slots[parent].0 {
                break;
            }
            self.slots.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.slots.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut smallest = i;
            if left < len && self.slots[left].0 < self.slots[smallest].0 {
                smallest = left;
            }
            if right < len && self.slots[right].0 < self.slots[smallest].0 {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.slots.swap(i, smallest);
            i = smallest;
        }
    }
}
