//! LEXGLOSS context layer.
//!
//! Translating a single word in isolation loses sense disambiguation, so the
//! scanner hands each translation request a bounded window of surrounding
//! text. This crate selects that window.
//!
//! ## What we do
//!
//! - Partition text into sentences on `. ! ? ;` and their CJK counterparts
//! - Pick the sentence containing the target, then greedily pull in
//!   neighboring sentences while the window fits the character budget
//! - Fall back to a raw character budget split around the target when the
//!   containing sentence alone is too long, nudging each cut onto a
//!   whitespace/punctuation/CJK boundary instead of mid-word
//! - Degrade to a text prefix when the target cannot be located at all
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock calls, no locale dependence, no failure mode: the same
//! inputs produce the same window on any machine, and a window is always
//! produced.

mod boundary;
mod extractor;

pub use crate::extractor::extract_context;
