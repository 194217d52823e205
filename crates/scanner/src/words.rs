//! Word-shaped substring extraction.
//!
//! A word is a run of letters, with single internal hyphens or apostrophes
//! permitted when flanked by letters on both sides (`mother-in-law`,
//! `don't`). Offsets are byte offsets into the scanned content.

/// One extracted word with its byte range, original casing preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawWord {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Extract every word-shaped substring from `text`, in document order.
pub fn extract_words(text: &str) -> Vec<RawWord> {
    let mut words = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        if !ch.is_alphabetic() {
            chars.next();
            continue;
        }

        let mut end = start;
        loop {
            // Consume the current letter run.
            while let Some(&(idx, ch)) = chars.peek() {
                if ch.is_alphabetic() {
                    end = idx + ch.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            // A single `-`/`'` continues the word only when a letter follows.
            match chars.peek() {
                Some(&(idx, sep)) if sep == '-' || sep == '\'' => {
                    let after = text[idx + sep.len_utf8()..].chars().next();
                    if matches!(after, Some(ch) if ch.is_alphabetic()) {
                        chars.next();
                        continue;
                    }
                    break;
                }
                _ => break,
            }
        }

        words.push(RawWord {
            text: text[start..end].to_string(),
            start,
            end,
        });
    }

    words
}
