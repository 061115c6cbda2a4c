// Copyright (c) 2026 - present BDM Software
// SPDX-License-Identifier: MIT

//! Tag types.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::commit::{Commit, Contributor, ContributorRole};

/// Prefix of fully qualified tag refs.
pub const TAG_REF_PREFIX: &str = "refs/tags/";

static SEMVER_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d+\.\d+\.\d+").expect("valid regex"));

/// A tag as read from repository history.
///
/// Annotated tags carry their own message and tagger; lightweight tags
/// borrow everything from the commit they point at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Fully qualified ref (`refs/tags/v1.2.3`), the unique key
    pub git_ref: String,
    /// SHA of the tag object (annotated) or the commit (lightweight)
    pub sha: String,
    /// Ref with the `refs/tags/` prefix stripped
    pub name: String,
    /// The commit the tag ultimately points at
    pub commit: Option<Commit>,
    /// Tag message subject (annotated) or commit subject (lightweight)
    pub subject: String,
    /// Tag message body
    pub body: String,
    /// Contributors by role (author, committer, tagger)
    pub contributors: BTreeMap<ContributorRole, Contributor>,
    /// Timestamps by role
    pub contributor_dates: BTreeMap<ContributorRole, DateTime<FixedOffset>>,
}

impl Tag {
    /// True when the tag name looks like `v{major}.{minor}.{patch}`.
    #[must_use]
    pub fn is_semantic_version_tag(&self) -> bool {
        SEMVER_TAG.is_match(&self.name)
    }

    /// The tag's timestamp: tagger date, falling back to author date, then
    /// committer date.
    #[must_use]
    pub fn date(&self) -> Option<DateTime<FixedOffset>> {
        self.contributor_dates
            .get(&ContributorRole::Tagger)
            .or_else(|| self.contributor_dates.get(&ContributorRole::Author))
            .or_else(|| self.contributor_dates.get(&ContributorRole::Committer))
            .copied()
    }

    /// Strips the `refs/tags/` prefix from a fully qualified ref.
    #[must_use]
    pub fn name_from_ref(git_ref: &str) -> &str {
        git_ref.strip_prefix(TAG_REF_PREFIX).unwrap_or(git_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use similar_asserts::assert_eq;

    fn tag_named(name: &str) -> Tag {
        Tag {
            git_ref: format!("{TAG_REF_PREFIX}{name}"),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_semantic_version_tag_detection() {
        assert!(tag_named("v1.2.3").is_semantic_version_tag());
        assert!(tag_named("v0.0.1").is_semantic_version_tag());
        // Prefix match only, like the original convention
        assert!(tag_named("v1.2.3-rc1").is_semantic_version_tag());
        assert!(!tag_named("1.2.3").is_semantic_version_tag());
        assert!(!tag_named("release-candidate").is_semantic_version_tag());
        assert!(!tag_named("v1.2").is_semantic_version_tag());
    }

    #[test]
    fn test_name_from_ref() {
        assert_eq!(Tag::name_from_ref("refs/tags/v1.0.0"), "v1.0.0");
        assert_eq!(Tag::name_from_ref("v1.0.0"), "v1.0.0");
    }

    #[test]
    fn test_date_prefers_tagger() {
        let mut tag = tag_named("v1.0.0");
        let tagger_date = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap().fixed_offset();
        let author_date = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap().fixed_offset();
        tag.contributor_dates.insert(ContributorRole::Tagger, tagger_date);
        tag.contributor_dates.insert(ContributorRole::Author, author_date);
        assert_eq!(tag.date(), Some(tagger_date));

        tag.contributor_dates.remove(&ContributorRole::Tagger);
        assert_eq!(tag.date(), Some(author_date));

        tag.contributor_dates.remove(&ContributorRole::Author);
        assert_eq!(tag.date(), None);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut tag = tag_named("v2.0.0");
        tag.sha = "a".repeat(40);
        tag.subject = "release v2.0.0".to_string();
        let json = serde_json::to_string(&tag).expect("serialize");
        let deserialized: Tag = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(tag, deserialized);
    }
}
