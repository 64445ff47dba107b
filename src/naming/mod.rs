//! Filename parsing and canonical naming
//!
//! This module handles everything derived from filename text alone:
//! - Episode tag ("Folge N") and ordinal ("Kapitel N" / "Teil N") extraction
//! - Title extraction and fuzzy title similarity
//! - Transliteration of accented characters
//! - Canonical output name synthesis

// helper.
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).unwrap())
    }};
}

pub mod canonical;
pub mod markers;
pub mod similarity;
pub mod transliterate;

pub use canonical::{synthesize_name, EpisodeCounter};
pub use markers::{extract_episode_tag, extract_ordinal, extract_title};
pub use similarity::similarity;
pub use transliterate::transliterate;
