use crate::boundary::{is_end_boundary, is_start_boundary, is_terminator};

/// How far (in chars) a fallback cut may be nudged to find a clean boundary.
const BOUNDARY_LOOKAROUND: usize = 20;

/// Extract a context window around `target_text` for translation quality.
///
/// The window respects sentence boundaries when possible: the sentence
/// containing the target is extended greedily one sentence at a time in each
/// direction while the result stays within `max_chars`. When the containing
/// sentence alone is too long, the extractor falls back to a character
/// budget split around the target, with each cut nudged onto a whitespace,
/// punctuation, or CJK boundary so words are not split.
///
/// `target_offset` is the byte offset of the occurrence being translated; if
/// the target is not found there, the first occurrence in `full_text` is
/// used instead. If `target_text` does not occur at all, the first
/// `max_chars` characters of `full_text` are returned as a degraded context.
/// This function never fails.
pub fn extract_context(
    full_text: &str,
    target_text: &str,
    target_offset: usize,
    max_chars: usize,
) -> String {
    if max_chars == 0 || full_text.is_empty() {
        return String::new();
    }

    let (target_start, target_end) = match locate_target(full_text, target_text, target_offset) {
        Some(range) => range,
        None => return prefix_chars(full_text, max_chars).trim().to_string(),
    };

    let spans = sentence_spans(full_text);
    let (core_first, core_last) = covering_spans(&spans, target_start, target_end);
    let core = &full_text[spans[core_first].0..spans[core_last].1];

    if char_len(core.trim()) <= max_chars {
        let (lo, hi) = extend_window(full_text, &spans, core_first, core_last, max_chars);
        return full_text[spans[lo].0..spans[hi].1].trim().to_string();
    }

    budget_window(full_text, target_start, target_end, max_chars)
        .trim()
        .to_string()
}

/// Verify the target sits at the recorded offset, falling back to the first
/// occurrence when the document shifted underneath the caller.
fn locate_target(
    full_text: &str,
    target_text: &str,
    target_offset: usize,
) -> Option<(usize, usize)> {
    if target_text.is_empty() {
        return None;
    }
    if full_text
        .get(target_offset..target_offset + target_text.len())
        .is_some_and(|slice| slice == target_text)
    {
        return Some((target_offset, target_offset + target_text.len()));
    }
    full_text
        .find(target_text)
        .map(|start| (start, start + target_text.len()))
}

/// Partition `text` into consecutive sentence byte ranges.
///
/// A sentence ends at a terminator character plus any following run of
/// terminators and whitespace, so `"Wait... done."` is two spans and the
/// inter-sentence gap always belongs to the earlier span.
fn sentence_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0usize;
    let mut iter = text.char_indices().peekable();

    while let Some((idx, ch)) = iter.next() {
        if !is_terminator(ch) {
            continue;
        }
        let mut end = idx + ch.len_utf8();
        while let Some(&(next_idx, next_ch)) = iter.peek() {
            if is_terminator(next_ch) || next_ch.is_whitespace() {
                end = next_idx + next_ch.len_utf8();
                iter.next();
            } else {
                break;
            }
        }
        spans.push((start, end));
        start = end;
    }

    if start < text.len() || spans.is_empty() {
        spans.push((start, text.len()));
    }
    spans
}

/// Indices of the first and last sentence spans overlapping the target range.
fn covering_spans(spans: &[(usize, usize)], target_start: usize, target_end: usize) -> (usize, usize) {
    let locate = |pos: usize| {
        spans
            .iter()
            .position(|&(start, end)| pos >= start && pos < end)
            .unwrap_or(spans.len() - 1)
    };
    let first = locate(target_start);
    let last = locate(target_end.saturating_sub(1).max(target_start));
    (first, last.max(first))
}

/// Greedily pull in neighboring sentences while the window fits.
fn extend_window(
    text: &str,
    spans: &[(usize, usize)],
    mut lo: usize,
    mut hi: usize,
    max_chars: usize,
) -> (usize, usize) {
    let window_len =
        |lo: usize, hi: usize| char_len(text[spans[lo].0..spans[hi].1].trim());

    loop {
        let mut grew = false;
        if lo > 0 && window_len(lo - 1, hi) <= max_chars {
            lo -= 1;
            grew = true;
        }
        if hi + 1 < spans.len() && window_len(lo, hi + 1) <= max_chars {
            hi += 1;
            grew = true;
        }
        if !grew {
            return (lo, hi);
        }
    }
}

/// Character-budget fallback for oversized sentences: split the remaining
/// budget around the target and nudge each cut onto a clean boundary.
fn budget_window(text: &str, target_start: usize, target_end: usize, max_chars: usize) -> &str {
    let target_chars = char_len(&text[target_start..target_end]);
    if target_chars >= max_chars {
        return &text[target_start..step_forward(text, target_start, max_chars)];
    }

    let budget = max_chars - target_chars;
    let before_budget = budget / 2;
    let after_budget = budget - before_budget;

    let raw_start = step_back(text, target_start, before_budget);
    let raw_end = step_forward(text, target_end, after_budget);

    let start = nudge_start(text, raw_start, target_start);
    let end = nudge_end(text, raw_end, target_end);
    &text[start..end]
}

/// Move a left cut inward (never past the target) until it lands on a
/// boundary, scanning at most [`BOUNDARY_LOOKAROUND`] characters.
fn nudge_start(text: &str, raw_start: usize, target_start: usize) -> usize {
    let mut pos = raw_start;
    for _ in 0..BOUNDARY_LOOKAROUND {
        if pos >= target_start || is_start_boundary(text, pos) {
            return pos.min(target_start);
        }
        pos = step_forward(text, pos, 1);
    }
    if is_start_boundary(text, pos) {
        pos.min(target_start)
    } else {
        raw_start
    }
}

/// Move a right cut inward (never before the target end) until it lands on
/// a boundary, scanning at most [`BOUNDARY_LOOKAROUND`] characters.
fn nudge_end(text: &str, raw_end: usize, target_end: usize) -> usize {
    let mut pos = raw_end;
    for _ in 0..BOUNDARY_LOOKAROUND {
        if pos <= target_end || is_end_boundary(text, pos) {
            return pos.max(target_end);
        }
        pos = step_back(text, pos, 1);
    }
    if is_end_boundary(text, pos) {
        pos.max(target_end)
    } else {
        raw_end
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// First `count` characters of `text`, sliced on a char boundary.
fn prefix_chars(text: &str, count: usize) -> &str {
    &text[..step_forward(text, 0, count)]
}

fn step_back(text: &str, from: usize, chars: usize) -> usize {
    let mut pos = from;
    for _ in 0..chars {
        match text[..pos].chars().next_back() {
            Some(ch) => pos -= ch.len_utf8(),
            None => break,
        }
    }
    pos
}

fn step_forward(text: &str, from: usize, chars: usize) -> usize {
    let mut pos = from;
    for _ in 0..chars {
        match text[pos..].chars().next() {
            Some(ch) => pos += ch.len_utf8(),
            None => break,
        }
    }
    pos
}
