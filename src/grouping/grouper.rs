//! Grouping policies

use crate::naming::similarity;

use super::{FileRef, Group, GroupKey, GroupingPolicy};

/// Default similarity above which a title joins an existing group
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.9;

/// Partition files into groups.
///
/// Files are ordered by file name first so the outcome does not depend on the
/// order the directory was listed in. Groups come back in creation order.
pub fn group_files(files: Vec<FileRef>, policy: GroupingPolicy, threshold: f64) -> Vec<Group> {
    let mut files = files;
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let groups = match policy {
        GroupingPolicy::ExactTag => group_by_tag(files),
        GroupingPolicy::Similarity => group_by_similarity(files, threshold),
    };

    tracing::debug!(
        policy = %policy,
        groups = groups.len(),
        "grouped input files"
    );
    groups
}

fn group_by_tag(files: Vec<FileRef>) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();

    for file in files {
        let key = match file.explicit_tag {
            Some(tag) => GroupKey::Tag(tag),
            None => GroupKey::Untagged,
        };
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.files.push(file),
            None => {
                let mut group = Group::new(key);
                group.files.push(file);
                groups.push(group);
            }
        }
    }
    groups
}

/// Greedy clustering: each file joins the first group whose representative
/// title is similar enough, otherwise it founds a new group. Matching is
/// against the representative only, so it is not transitive.
fn group_by_similarity(files: Vec<FileRef>, threshold: f64) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();

    for file in files {
        let found = groups.iter_mut().find(|g| match &g.key {
            GroupKey::Title(rep) => similarity(rep, &file.raw_title) > threshold,
            _ => false,
        });
        match found {
            Some(group) => group.files.push(file),
            None => {
                let mut group = Group::new(GroupKey::Title(file.raw_title.clone()));
                group.files.push(file);
                groups.push(group);
            }
        }
    }
    groups
}
