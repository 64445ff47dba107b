//! Ordinal sequence validator

use serde::Serialize;
use thiserror::Error;

use crate::grouping::{FileRef, Group, GroupKey};

/// Why a group cannot be merged
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationFailure {
    #[error("no start, first part is {first} instead of 1")]
    NoStart { first: u32 },

    #[error("only {count} distinct part(s), nothing to merge")]
    TooFewParts { count: usize },

    #[error("gap in part order, expected {expected} but found {found}")]
    Gap { expected: u32, found: u32 },
}

/// Files of one episode in part order, parts numbered 1..=N with N >= 2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSequence {
    pub key: GroupKey,
    pub files: Vec<FileRef>,
}

impl ValidatedSequence {
    /// The file whose name the output name is derived from
    pub fn first(&self) -> &FileRef {
        // never empty: validation requires two parts
        &self.files[0]
    }
}

/// Validate one group.
///
/// Duplicate ordinals keep the first file in group order. The group is
/// rejected as a whole on any failure; a gapless prefix is never merged.
pub fn validate_group(group: &Group) -> Result<ValidatedSequence, ValidationFailure> {
    let mut seen = std::collections::HashSet::new();
    let mut parts: Vec<&FileRef> = group
        .files
        .iter()
        .filter(|f| seen.insert(f.ordinal))
        .collect();

    parts.sort_by_key(|f| f.ordinal);

    let first = match parts.first() {
        Some(f) => f.ordinal,
        None => return Err(ValidationFailure::TooFewParts { count: 0 }),
    };
    if first != 1 {
        return Err(ValidationFailure::NoStart { first });
    }
    if parts.len() < 2 {
        return Err(ValidationFailure::TooFewParts { count: parts.len() });
    }
    for pair in parts.windows(2) {
        let expected = pair[0].ordinal.saturating_add(1);
        if pair[1].ordinal != expected {
            return Err(ValidationFailure::Gap {
                expected,
                found: pair[1].ordinal,
            });
        }
    }

    Ok(ValidatedSequence {
        key: group.key.clone(),
        files: parts.into_iter().cloned().collect(),
    })
}
