//! Header/terminator frame extraction

use crate::buffer::ByteStreamBuffer;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serline_core::{LinkError, LinkResult};

/// One fully matched payload: the bytes strictly between a header match
/// and the next terminator match. Frames are transient; nothing stores
/// them after delivery.
pub type Frame = Bytes;

/// Header/terminator pattern pair for one filter.
///
/// A frame on the wire is `header || payload || terminator`. The header
/// may be empty (every position is a potential frame start); the
/// terminator must not be. The payload must not itself contain the
/// terminator sequence: no escaping is provided at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameFilterConfig {
    #[serde(with = "serde_bytes")]
    pub header: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub terminator: Vec<u8>,
}

impl FrameFilterConfig {
    /// # Panics
    ///
    /// Panics if `terminator` is empty.
    pub fn new(header: impl Into<Vec<u8>>, terminator: impl Into<Vec<u8>>) -> Self {
        let header = header.into();
        let terminator = terminator.into();
        assert!(!terminator.is_empty(), "frame terminator must not be empty");
        Self { header, terminator }
    }

    /// Line-oriented framing: no header, newline terminator.
    pub fn lines() -> Self {
        Self::new(Vec::new(), b"\n")
    }
}

/// A configured pattern plus its consumption progress over the shared
/// stream.
///
/// The cursor is a logical stream offset (see [`ByteStreamBuffer`]), so a
/// filter never re-scans bytes it already emitted, and eviction can only
/// move the cursor forward, never backward. Multiple filters over the same
/// buffer each keep their own cursor.
#[derive(Debug)]
pub struct FrameFilter {
    config: FrameFilterConfig,
    consumed: u64,
}

impl FrameFilter {
    pub fn new(config: FrameFilterConfig) -> Self {
        Self {
            config,
            consumed: 0,
        }
    }

    pub fn config(&self) -> &FrameFilterConfig {
        &self.config
    }

    /// Logical stream offset up to which this filter has consumed.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Extract every complete frame currently visible past the cursor.
    ///
    /// Noise ahead of a header match is skipped without being emitted. An
    /// absent header or terminator leaves the cursor where a future chunk
    /// can complete the match; when no header is found, the cursor still
    /// advances past everything except a possible partial match at the
    /// tail, so stalled noise does not pin the scan window.
    pub fn poll(&mut self, buffer: &ByteStreamBuffer) -> Vec<Frame> {
        let header = &self.config.header;
        let terminator = &self.config.terminator;
        let mut frames = Vec::new();

        // Bytes this filter never got to consume may already be evicted.
        if self.consumed < buffer.front_offset() {
            self.consumed = buffer.front_offset();
        }

        loop {
            let window = buffer.slice_from(self.consumed);
            let Some(start) = find_pattern(window, header) else {
                let keep = header.len().saturating_sub(1).min(window.len());
                self.consumed += (window.len() - keep) as u64;
                break;
            };

            // Bytes before the header are noise; skip them for good.
            self.consumed += start as u64;
            let window = &window[start..];

            let payload_start = header.len();
            let Some(term_at) = find_pattern(&window[payload_start..], terminator) else {
                // Incomplete frame: consume nothing past the header start.
                break;
            };

            frames.push(Bytes::copy_from_slice(
                &window[payload_start..payload_start + term_at],
            ));
            self.consumed += (payload_start + term_at + terminator.len()) as u64;
        }

        frames
    }
}

/// First occurrence of `needle` in `haystack`; an empty needle matches at
/// offset zero.
fn find_pattern(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|candidate| candidate == needle)
}

/// Interpret frame bytes as UTF-8 text.
pub fn decode_frame_text(frame: &[u8]) -> LinkResult<String> {
    std::str::from_utf8(frame)
        .map(str::to_owned)
        .map_err(|e| LinkError::DecodeFailure(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with(chunks: &[&[u8]]) -> ByteStreamBuffer {
        let mut buffer = ByteStreamBuffer::new(1024);
        for chunk in chunks {
            buffer.append(chunk);
        }
        buffer
    }

    #[test]
    fn frame_between_noise_is_extracted_across_chunks() {
        let mut buffer = ByteStreamBuffer::new(1024);
        let mut filter = FrameFilter::new(FrameFilterConfig::new(b"<<", b">>"));

        buffer.append(b"noise<<he");
        assert!(filter.poll(&buffer).is_empty());

        buffer.append(b"llo>>tail");
        let frames = filter.poll(&buffer);
        assert_eq!(frames, vec![Bytes::from_static(b"hello")]);

        // "tail" must not produce anything, now or later.
        assert!(filter.poll(&buffer).is_empty());
    }

    #[test]
    fn every_chunk_splitting_yields_exactly_one_frame() {
        let stream = b"xx<<payload>>yy";
        for split in 0..=stream.len() {
            let mut buffer = ByteStreamBuffer::new(1024);
            let mut filter = FrameFilter::new(FrameFilterConfig::new(b"<<", b">>"));
            let mut frames = Vec::new();

            buffer.append(&stream[..split]);
            frames.extend(filter.poll(&buffer));
            buffer.append(&stream[split..]);
            frames.extend(filter.poll(&buffer));

            assert_eq!(
                frames,
                vec![Bytes::from_static(b"payload")],
                "split at {split}"
            );
        }
    }

    #[test]
    fn back_to_back_frames_in_one_chunk_emit_in_order_without_repeats() {
        let buffer = buffer_with(&[b"<<a>><<bb>><<ccc>>"]);
        let mut filter = FrameFilter::new(FrameFilterConfig::new(b"<<", b">>"));

        let frames = filter.poll(&buffer);
        assert_eq!(
            frames,
            vec![
                Bytes::from_static(b"a"),
                Bytes::from_static(b"bb"),
                Bytes::from_static(b"ccc"),
            ]
        );
        assert!(filter.poll(&buffer).is_empty());
    }

    #[test]
    fn empty_header_frames_on_terminator_only() {
        let buffer = buffer_with(&[b"one\ntwo\nthree"]);
        let mut filter = FrameFilter::new(FrameFilterConfig::lines());

        let frames = filter.poll(&buffer);
        assert_eq!(
            frames,
            vec![Bytes::from_static(b"one"), Bytes::from_static(b"two")]
        );
        // "three" waits for its newline.
        assert!(filter.poll(&buffer).is_empty());
    }

    #[test]
    fn empty_payload_is_a_valid_frame() {
        let buffer = buffer_with(&[b"<<>>"]);
        let mut filter = FrameFilter::new(FrameFilterConfig::new(b"<<", b">>"));
        assert_eq!(filter.poll(&buffer), vec![Bytes::new()]);
    }

    #[test]
    fn partial_header_at_the_tail_still_matches_later() {
        let mut buffer = ByteStreamBuffer::new(1024);
        let mut filter = FrameFilter::new(FrameFilterConfig::new(b"##", b";"));

        // Ends on the first byte of a split header.
        buffer.append(b"junk#");
        assert!(filter.poll(&buffer).is_empty());

        buffer.append(b"#data;");
        assert_eq!(filter.poll(&buffer), vec![Bytes::from_static(b"data")]);
    }

    #[test]
    fn independent_filters_keep_independent_cursors() {
        let buffer = buffer_with(&[b"<<x>>(y)"]);
        let mut angle = FrameFilter::new(FrameFilterConfig::new(b"<<", b">>"));
        let mut paren = FrameFilter::new(FrameFilterConfig::new(b"(", b")"));

        assert_eq!(angle.poll(&buffer), vec![Bytes::from_static(b"x")]);
        assert_eq!(paren.poll(&buffer), vec![Bytes::from_static(b"y")]);
        assert!(angle.poll(&buffer).is_empty());
        assert!(paren.poll(&buffer).is_empty());
    }

    #[test]
    fn eviction_clamps_the_cursor_forward() {
        let mut buffer = ByteStreamBuffer::new(8);
        let mut filter = FrameFilter::new(FrameFilterConfig::new(b"<<", b">>"));

        // The frame opening gets evicted before it can complete.
        buffer.append(b"<<abcdefgh");
        buffer.evict_to_capacity();
        assert!(filter.poll(&buffer).is_empty());

        buffer.append(b"<<ok>>");
        buffer.evict_to_capacity();
        assert_eq!(filter.poll(&buffer), vec![Bytes::from_static(b"ok")]);
    }

    #[test]
    fn decode_frame_text_maps_invalid_utf8_to_decode_failure() {
        assert_eq!(decode_frame_text(b"hello").unwrap(), "hello");
        assert!(matches!(
            decode_frame_text(&[0xff, 0xfe]),
            Err(LinkError::DecodeFailure(_))
        ));
    }

    #[test]
    #[should_panic(expected = "terminator must not be empty")]
    fn empty_terminator_is_rejected() {
        let _ = FrameFilterConfig::new(b"<<", b"");
    }
}
