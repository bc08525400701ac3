//! Bounded accumulator for inbound bytes

use bytes::{Buf, BytesMut};

/// Append-only accumulator of inbound bytes with tail-retention eviction.
///
/// Length never exceeds `max_size` after [`evict_to_capacity`]; when the
/// cap is exceeded the oldest bytes are dropped, keeping the most recent
/// ones. Eviction may silently destroy the prefix of an in-flight,
/// not-yet-terminated frame; under sustained buffer pressure that loss is
/// accepted, not masked.
///
/// Positions handed out by [`front_offset`]/[`end_offset`] and accepted by
/// [`slice_from`] are *logical* offsets into the whole stream since
/// creation. Eviction only ever advances the front, never renumbering what
/// is left, so consumers keep valid forward-only cursors across evictions.
///
/// [`evict_to_capacity`]: ByteStreamBuffer::evict_to_capacity
/// [`front_offset`]: ByteStreamBuffer::front_offset
/// [`end_offset`]: ByteStreamBuffer::end_offset
/// [`slice_from`]: ByteStreamBuffer::slice_from
#[derive(Debug)]
pub struct ByteStreamBuffer {
    data: BytesMut,
    max_size: usize,
    evicted: u64,
}

impl ByteStreamBuffer {
    pub fn new(max_size: usize) -> Self {
        Self {
            data: BytesMut::new(),
            max_size,
            evicted: 0,
        }
    }

    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Drop the oldest bytes until the length fits the cap, returning how
    /// many were dropped.
    pub fn evict_to_capacity(&mut self) -> usize {
        if self.data.len() <= self.max_size {
            return 0;
        }
        let excess = self.data.len() - self.max_size;
        self.data.advance(excess);
        self.evicted += excess as u64;
        excess
    }

    /// Discard everything, advancing the logical front past the dropped
    /// bytes so stale cursors clamp forward instead of rewinding.
    pub fn clear(&mut self) {
        self.evicted += self.data.len() as u64;
        self.data.clear();
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Logical offset of the oldest retained byte.
    pub fn front_offset(&self) -> u64 {
        self.evicted
    }

    /// Logical offset one past the newest byte.
    pub fn end_offset(&self) -> u64 {
        self.evicted + self.data.len() as u64
    }

    /// The bytes from the given logical offset to the end. Offsets that
    /// fall before the current front are clamped to it: the bytes they
    /// name are already gone, which is lost data rather than an error.
    pub fn slice_from(&self, offset: u64) -> &[u8] {
        let start = offset.max(self.evicted) - self.evicted;
        let start = (start as usize).min(self.data.len());
        &self.data[start..]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eviction_keeps_the_most_recent_bytes() {
        let mut buffer = ByteStreamBuffer::new(10);
        buffer.append(b"0123456789");
        assert_eq!(buffer.evict_to_capacity(), 0);
        buffer.append(b"AB");
        assert_eq!(buffer.evict_to_capacity(), 2);
        assert_eq!(buffer.as_slice(), b"23456789AB");
        assert_eq!(buffer.front_offset(), 2);
    }

    #[test]
    fn length_never_exceeds_cap_even_for_oversized_appends() {
        let mut buffer = ByteStreamBuffer::new(8);
        for chunk in [&b"abc"[..], &[0u8; 100][..], &b"xyz"[..]] {
            buffer.append(chunk);
            buffer.evict_to_capacity();
            assert!(buffer.len() <= buffer.max_size());
        }
        assert_eq!(&buffer.as_slice()[5..], b"xyz");
    }

    #[test]
    fn slice_from_clamps_stale_offsets_to_the_front() {
        let mut buffer = ByteStreamBuffer::new(4);
        buffer.append(b"abcdef");
        buffer.evict_to_capacity();
        // Offsets 0 and 1 point at evicted bytes.
        assert_eq!(buffer.slice_from(0), b"cdef");
        assert_eq!(buffer.slice_from(2), b"cdef");
        assert_eq!(buffer.slice_from(4), b"ef");
        assert_eq!(buffer.slice_from(99), b"");
    }

    #[test]
    fn clear_advances_the_logical_front() {
        let mut buffer = ByteStreamBuffer::new(16);
        buffer.append(b"stale");
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.front_offset(), 5);
        buffer.append(b"fresh");
        assert_eq!(buffer.slice_from(0), b"fresh");
        assert_eq!(buffer.slice_from(5), b"fresh");
        assert_eq!(buffer.end_offset(), 10);
    }
}
