//! Regroups timed fragments into sentences.
//!
//! Boundaries are driven by terminal punctuation only. Two fragments separated
//! by a long silence stay in the same sentence when the first one does not end
//! with `.`, `!` or `?`; consumers rely on this grouping.

use crate::transcript::{RawFragment, Sentence};

const TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Merge fragments into sentences in a single forward pass.
///
/// Fragments are expected to be cleaned already; empty ones are skipped.
/// A trailing run without terminator is flushed as the last sentence.
pub fn merge(fragments: &[RawFragment]) -> Vec<Sentence> {
    let mut sentences = Vec::new();
    let mut buffer = String::new();
    let mut start_time: Option<f64> = None;
    let mut last_seen_end = 0.0;

    for fragment in fragments {
        if fragment.text.is_empty() {
            continue;
        }

        last_seen_end = fragment.end();
        let start = *start_time.get_or_insert(fragment.start);

        buffer.push(' ');
        buffer.push_str(&fragment.text);

        if fragment.text.trim().ends_with(TERMINATORS) {
            sentences.push(Sentence::new(buffer.trim(), start, last_seen_end));
            buffer.clear();
            start_time = None;
        }
    }

    if let Some(start) = start_time
        && !buffer.is_empty()
    {
        sentences.push(Sentence::new(buffer.trim(), start, last_seen_end));
    }

    sentences
}
