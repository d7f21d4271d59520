//! Payload chunking at line boundaries.
//!
//! The transport caps message length, so an oversized report is split into
//! the fewest pieces that each fit. Splits happen between lines; a single
//! line longer than the limit is hard-split at character boundaries, never
//! mid-character. When more than one chunk results, each is prefixed with a
//! `[part i/n]` marker line; concatenating the chunk bodies with the markers
//! stripped reproduces the original text exactly.

/// Headroom reserved for the part-marker line, in characters.
///
/// `[part 999/999]\n` is 15 characters, so 16 covers any realistic count.
const MARKER_RESERVE: usize = 16;

/// Split `text` into transport-sized chunks.
///
/// Limits are counted in characters. Text that already fits is returned as
/// a single unprefixed chunk.
#[must_use]
pub fn chunk_message(text: &str, limit: usize) -> Vec<String> {
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let capacity = limit.saturating_sub(MARKER_RESERVE).max(1);
    let mut bodies: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for segment in text.split_inclusive('\n') {
        let segment_chars = segment.chars().count();

        if segment_chars > capacity {
            // A single line exceeding the capacity: flush, then hard-split
            // it at char boundaries. The tail stays open so following lines
            // can pack after it.
            if !current.is_empty() {
                bodies.push(std::mem::take(&mut current));
                current_chars = 0;
            }
            for ch in segment.chars() {
                current.push(ch);
                current_chars += 1;
                if current_chars == capacity {
                    bodies.push(std::mem::take(&mut current));
                    current_chars = 0;
                }
            }
            continue;
        }

        if current_chars + segment_chars > capacity {
            bodies.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        current.push_str(segment);
        current_chars += segment_chars;
    }

    if !current.is_empty() {
        bodies.push(current);
    }

    let total = bodies.len();
    if total <= 1 {
        return bodies;
    }
    bodies
        .into_iter()
        .enumerate()
        .map(|(index, body)| format!("[part {}/{}]\n{}", index + 1, total, body))
        .collect()
}

/// Strip the part marker from a chunk, returning the original body.
#[must_use]
pub fn strip_marker(chunk: &str) -> &str {
    if chunk.starts_with("[part ") {
        match chunk.split_once('\n') {
            Some((_, body)) => body,
            None => chunk,
        }
    } else {
        chunk
    }
}
