pub const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// One slot per 16-bit sequence number.
pub const MAX_BUFFER_CAPACITY: usize = u16::MAX as usize + 1;

#[derive(Debug, Clone)]
struct Entry<T> {
    sequence: u16,
    value: T,
}

/// Ring buffer keyed by a wrapping 16-bit sequence number.
///
/// Each slot remembers the exact sequence it holds, so a lookup only hits when
/// the stored sequence matches. Inserting a sequence evicts whatever occupied
/// `sequence % capacity` before.
///
/// `most_recent_sequence` follows a capacity-relative heuristic rather than a
/// half-range comparison: a jump across the `u16::MAX -> 0` boundary is only
/// recognised when both sides lie within `capacity` of the boundary. This is
/// correct as long as the spread of live sequence numbers stays below the
/// capacity, which the ack bitfield math relies on.
#[derive(Debug, Clone)]
pub struct SequenceBuffer<T> {
    slots: Vec<Option<Entry<T>>>,
    most_recent: u16,
}

impl<T> Default for SequenceBuffer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}

impl<T> SequenceBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity > 0 && capacity <= MAX_BUFFER_CAPACITY,
            "sequence buffer capacity must be within 1..={MAX_BUFFER_CAPACITY}, got {capacity}"
        );

        Self {
            slots: (0..capacity).map(|_| None).collect(),
            most_recent: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn most_recent_sequence(&self) -> u16 {
        self.most_recent
    }

    pub fn insert(&mut self, sequence: u16, value: T) {
        let index = self.index(sequence);
        self.slots[index] = Some(Entry { sequence, value });
        self.advance_most_recent(sequence);
    }

    pub fn get(&self, sequence: u16) -> Option<&T> {
        self.slots[self.index(sequence)]
            .as_ref()
            .filter(|e| e.sequence == sequence)
            .map(|e| &e.value)
    }

    pub fn get_mut(&mut self, sequence: u16) -> Option<&mut T> {
        let index = self.index(sequence);
        self.slots[index]
            .as_mut()
            .filter(|e| e.sequence == sequence)
            .map(|e| &mut e.value)
    }

    pub fn contains(&self, sequence: u16) -> bool {
        self.get(sequence).is_some()
    }

    /// Frees the slot if it still holds `sequence`. Stale slots are left alone.
    pub fn remove(&mut self, sequence: u16) -> Option<T> {
        let index = self.index(sequence);
        if self.slots[index]
            .as_ref()
            .is_some_and(|e| e.sequence == sequence)
        {
            self.slots[index].take().map(|e| e.value)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn index(&self, sequence: u16) -> usize {
        sequence as usize % self.slots.len()
    }

    // TODO: replace with a half-range comparison once the ack bitfield no
    // longer depends on this exact cursor behaviour.
    fn advance_most_recent(&mut self, sequence: u16) {
        let capacity = self.slots.len() as u32;
        let sequence_wide = sequence as u32;
        let recent = self.most_recent as u32;
        let boundary = (u16::MAX as u32).saturating_sub(capacity);

        let wrapped_forward = recent > boundary && sequence_wide < capacity;
        let wrapped_backward = recent < capacity && sequence_wide > boundary;

        if wrapped_forward || (!wrapped_backward && sequence_wide > recent) {
            self.most_recent = sequence;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_get() {
        let mut buffer = SequenceBuffer::new(10);

        buffer.insert(2, 123);
        buffer.insert(4, 456);
        buffer.insert(5, 789);

        assert_eq!(buffer.get(2), Some(&123));
        assert_eq!(buffer.get(4), Some(&456));
        assert_eq!(buffer.get(5), Some(&789));

        assert!(buffer.get(1).is_none());
        assert!(buffer.get(9).is_none());
        assert!(buffer.get(10).is_none());

        // same slots as 1 and 4, but never inserted
        assert!(buffer.get(11).is_none());
        assert!(buffer.get(14).is_none());

        buffer.insert(12, 111);
        assert_eq!(buffer.get(12), Some(&111));
        // 2 shared the slot with 12
        assert!(buffer.get(2).is_none());
    }

    #[test]
    fn eviction_after_one_full_lap() {
        let mut buffer = SequenceBuffer::default();
        let capacity = buffer.capacity() as u16;

        buffer.insert(7, "old");
        buffer.insert(7 + capacity, "new");

        assert!(buffer.get(7).is_none());
        assert_eq!(buffer.get(7 + capacity), Some(&"new"));
    }

    #[test]
    fn fresh_buffer_has_no_entries() {
        let buffer: SequenceBuffer<()> = SequenceBuffer::default();

        assert!(buffer.is_empty());
        assert!(!buffer.contains(0));
        assert!(!buffer.contains(u16::MAX));
        assert_eq!(buffer.most_recent_sequence(), 0);
    }

    #[test]
    fn remove_only_clears_matching_sequence() {
        let mut buffer = SequenceBuffer::new(16);
        buffer.insert(3, 'a');

        assert_eq!(buffer.remove(19), None);
        assert_eq!(buffer.get(3), Some(&'a'));

        assert_eq!(buffer.remove(3), Some('a'));
        assert!(buffer.get(3).is_none());
        assert_eq!(buffer.remove(3), None);
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut buffer = SequenceBuffer::new(8);
        buffer.insert(42, 1);

        if let Some(value) = buffer.get_mut(42) {
            *value += 1;
        }

        assert_eq!(buffer.get(42), Some(&2));
        assert!(buffer.get_mut(50).is_none());
    }

    #[test]
    fn most_recent_sequence_tracks_wraparound() {
        let mut buffer = SequenceBuffer::default();
        let steps = [
            (2, 2),
            (1, 2),
            (4, 4),
            (10000, 10000),
            (u16::MAX - 100, u16::MAX - 100),
            (0, 0),
            (3000, 3000),
            (u16::MAX, u16::MAX),
            (10, 10),
            (u16::MAX - 50, 10),
            (u16::MAX, 10),
            (11, 11),
            (100, 100),
        ];

        for (sequence, expected) in steps {
            buffer.insert(sequence, ());
            assert_eq!(
                buffer.most_recent_sequence(),
                expected,
                "after inserting {sequence}"
            );
        }
    }

    #[test]
    #[should_panic]
    fn zero_capacity_is_rejected() {
        let _ = SequenceBuffer::<u8>::new(0);
    }
}
