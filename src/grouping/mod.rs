//! Episode grouping
//!
//! Files are partitioned into provisional episode groups before validation.
//! Two policies exist:
//! - exact tag: group by the `Folge` number, untagged files share one bucket
//! - similarity: greedy clustering on the extracted title

pub mod grouper;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::naming::{extract_episode_tag, extract_ordinal, extract_title};

pub use grouper::group_files;

/// One input audio file with the fields derived from its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub path: PathBuf,
    /// File name without extension
    pub stem: String,
    pub explicit_tag: Option<u32>,
    pub ordinal: u32,
    pub raw_title: String,
}

impl FileRef {
    /// Derive a file reference from a path. Only the file name is inspected.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            explicit_tag: extract_episode_tag(&stem),
            ordinal: extract_ordinal(&stem),
            raw_title: extract_title(&stem),
            stem,
            path,
        }
    }

    /// File name including extension
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// How files are clustered into episodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupingPolicy {
    /// Group by explicit `Folge` number
    #[default]
    ExactTag,
    /// Greedy clustering on title similarity
    Similarity,
}

impl fmt::Display for GroupingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GroupingPolicy::ExactTag => write!(f, "exact_tag"),
            GroupingPolicy::Similarity => write!(f, "similarity"),
        }
    }
}

/// Key of a provisional group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum GroupKey {
    /// Explicit episode number
    Tag(u32),
    /// Shared bucket for files without an episode number (exact-tag policy)
    Untagged,
    /// Representative title (similarity policy)
    Title(String),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GroupKey::Tag(n) => write!(f, "Folge {}", n),
            GroupKey::Untagged => write!(f, "untagged files"),
            GroupKey::Title(t) => write!(f, "\"{}\"", t),
        }
    }
}

/// A provisional episode: files believed to belong together, in input order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub key: GroupKey,
    pub files: Vec<FileRef>,
}

impl Group {
    pub fn new(key: GroupKey) -> Self {
        Self {
            key,
            files: Vec::new(),
        }
    }
}
