//! Canonical output name synthesis
//!
//! The output base name is `<episode:03>_<cleaned title>`, derived from the
//! first file of a validated sequence. Every cleaning step feeds the next one
//! verbatim, so the order in [`synthesize_name`] is significant.

use super::markers::extract_episode_tag;
use super::transliterate::transliterate;

/// Fallback episode numbering for files without a `Folge` marker.
///
/// One counter lives for one directory run. It starts at 1 and advances each
/// time a fallback number is handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeCounter {
    next: u32,
}

impl EpisodeCounter {
    /// Create a counter starting at 1
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Take the current value and advance.
    pub fn next_value(&mut self) -> u32 {
        let value = self.next;
        self.next += 1;
        value
    }
}

impl Default for EpisodeCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the canonical base name (no extension) from a file stem.
pub fn synthesize_name(stem: &str, counter: &mut EpisodeCounter) -> String {
    let episode = extract_episode_tag(stem).unwrap_or_else(|| counter.next_value());
    let tag = format_episode(episode);

    let text = strip_episode_and_brackets(stem);
    let text = strip_ordinal_markers(&text);
    let text = underscore_separators(&text);
    let text = transliterate(&text);
    let title = collapse_underscores(&text);

    if title.is_empty() {
        tag
    } else {
        format!("{}_{}", tag, title)
    }
}

/// Zero-pad to three digits; wider numbers keep their natural width.
pub fn format_episode(episode: u32) -> String {
    format!("{:03}", episode)
}

fn strip_episode_and_brackets(text: &str) -> String {
    regex!(r"Folge\s*\d+|\s*\(.*?\)|\s*\[.*?\]")
        .replace_all(text, "")
        .into_owned()
}

fn strip_ordinal_markers(text: &str) -> String {
    regex!(r"(Kapitel|Teil)\s*\d+")
        .replace_all(text, "")
        .into_owned()
}

fn underscore_separators(text: &str) -> String {
    text.replace([' ', '-'], "_")
}

fn collapse_underscores(text: &str) -> String {
    regex!(r"_+")
        .replace_all(text, "_")
        .trim_matches('_')
        .to_string()
}
