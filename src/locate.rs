//! Word location from a screen coordinate.
//! Platform hit-testing is abstracted behind `TextProbe`; the locator owns
//! word-run expansion and acceptance. Pure: no side effects, and a miss is a
//! normal negative result, not an error.

use regex::Regex;

/// Text content and caret offset resolved at a screen point.
/// `offset` is a byte offset into `content`.
#[derive(Debug, Clone)]
pub struct TextHit {
    pub content: String,
    pub offset: usize,
}

/// The single capability-queried hit-testing primitive: resolve the text and
/// caret offset under a screen point.
///
/// Adapters must return `None` when no element is under the point, when the
/// element is an editable/input surface (hover lookups must not interfere
/// with text entry), or when the caret does not land inside a text node.
pub trait TextProbe: Send + Sync {
    fn text_at(&self, x: f64, y: f64) -> Option<TextHit>;
}

/// Minimum accepted word length, in characters.
const MIN_WORD_LEN: usize = 2;

/// Expands the maximal `[A-Za-z0-9_]` run around the caret offset, then
/// accepts only pure-alphabetic runs of at least two characters, lowercased.
pub struct WordLocator {
    alphabetic: Regex,
}

impl WordLocator {
    pub fn new() -> Self {
        Self {
            alphabetic: Regex::new(r"^[A-Za-z]+$").unwrap(),
        }
    }

    /// Return the lowercase word under the point, or None.
    pub fn locate(&self, probe: &dyn TextProbe, x: f64, y: f64) -> Option<String> {
        let hit = probe.text_at(x, y)?;
        let bytes = hit.content.as_bytes();
        if hit.offset > bytes.len() {
            return None;
        }

        // Maximal contiguous run of word-constituent characters around the
        // caret. The class is ASCII-only, so expansion never splits a
        // multi-byte character.
        let mut start = hit.offset;
        let mut end = hit.offset;
        while start > 0 && is_word_byte(bytes[start - 1]) {
            start -= 1;
        }
        while end < bytes.len() && is_word_byte(bytes[end]) {
            end += 1;
        }

        let run = hit.content.get(start..end)?;
        if run.len() < MIN_WORD_LEN || !self.alphabetic.is_match(run) {
            return None;
        }
        Some(run.to_lowercase())
    }
}

impl Default for WordLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
