//! Marker extraction from file names
//!
//! Audio drama releases encode the episode as `Folge <n>` and the part as
//! `Kapitel <n>` or `Teil <n>`. Markers are case-sensitive and may be
//! separated from their number by any amount of whitespace.

/// Extract the part/chapter ordinal.
///
/// Returns 0 when the name carries no `Kapitel`/`Teil` marker. Real ordinals
/// start at 1, so 0 never collides with a valid part.
pub fn extract_ordinal(name: &str) -> u32 {
    regex!(r"(Kapitel|Teil)\s*(\d+)")
        .captures(name)
        .and_then(|caps| caps.get(2))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Extract the explicit episode number, if present.
///
/// A number too large for `u32` counts as no tag, so the file falls back to
/// counter numbering.
pub fn extract_episode_tag(name: &str) -> Option<u32> {
    let digits = regex!(r"Folge\s*(\d+)").captures(name)?.get(1)?.as_str();
    match digits.parse() {
        Ok(tag) => Some(tag),
        Err(e) => {
            tracing::debug!("Ignoring episode number {} in {:?}: {}", digits, name, e);
            None
        }
    }
}

/// Extract the title candidate used for similarity clustering: the leading
/// run of letters and spaces, ending before the first digit, punctuation or
/// extension dot.
pub fn extract_title(name: &str) -> String {
    let end = name
        .char_indices()
        .find(|(_, c)| !(c.is_alphabetic() || *c == ' '))
        .map(|(i, _)| i)
        .unwrap_or(name.len());

    let title = name[..end].trim_end();
    if title.trim_start().is_empty() {
        return name.to_string();
    }
    title.to_string()
}
