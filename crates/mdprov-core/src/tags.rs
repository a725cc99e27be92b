//! Upload tags.
//!
//! Tags are (name, value) pairs attached to a submitted item. Name uniqueness
//! is the submitter's business, with one exception: a [`TagSet`] never holds
//! more than one [`CONTENT_ID_TAG`], since that tag is the remote dedup key.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cid::ContentId;

/// Canonical tag carrying the content identifier.
pub const CONTENT_ID_TAG: &str = "IPFS-CID";

/// A single (name, value) tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UploadTag {
    pub name: String,
    pub value: String,
}

impl UploadTag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An ordered set of tags with at most one content-id tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<UploadTag>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tag.
    ///
    /// Returns `false` (and drops the tag) if it is a second content-id tag.
    pub fn push(&mut self, tag: UploadTag) -> bool {
        if tag.name == CONTENT_ID_TAG && self.content_id().is_some() {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(UploadTag::new(name, value));
        self
    }

    /// Add the content-id tag unless one is already present.
    pub fn with_content_id(self, cid: &ContentId) -> Self {
        self.with(CONTENT_ID_TAG, cid.to_string())
    }

    /// Append every tag from an iterator, applying the same dedup rule.
    pub fn extend<I: IntoIterator<Item = UploadTag>>(&mut self, tags: I) {
        for tag in tags {
            self.push(tag);
        }
    }

    /// Value of the first tag with the given name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value.as_str())
    }

    /// Value of the content-id tag, if present.
    pub fn content_id(&self) -> Option<&str> {
        self.get(CONTENT_ID_TAG)
    }

    /// Number of tags with the given name.
    pub fn count(&self, name: &str) -> usize {
        self.tags.iter().filter(|t| t.name == name).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UploadTag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn as_slice(&self) -> &[UploadTag] {
        &self.tags
    }

    /// Name -> value map; the first occurrence of a name wins.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for tag in &self.tags {
            map.entry(tag.name.clone())
                .or_insert_with(|| tag.value.clone());
        }
        map
    }

    /// One-line rendering for progress output.
    pub fn summary(&self) -> String {
        self.tags
            .iter()
            .map(|t| format!("{}: {}", t.name, t.value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromIterator<UploadTag> for TagSet {
    fn from_iter<I: IntoIterator<Item = UploadTag>>(iter: I) -> Self {
        let mut set = TagSet::new();
        set.extend(iter);
        set
    }
}

impl From<TagSet> for Vec<UploadTag> {
    fn from(set: TagSet) -> Self {
        set.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_content_id_tag() {
        let cid = ContentId::identify(b"doc");
        let mut tags = TagSet::new().with("App-Name", "x").with_content_id(&cid);

        assert!(!tags.push(UploadTag::new(CONTENT_ID_TAG, "bafkreisomethingelse")));
        let tags = tags.with_content_id(&ContentId::identify(b"other"));

        assert_eq!(tags.count(CONTENT_ID_TAG), 1);
        assert_eq!(tags.content_id(), Some(cid.to_string().as_str()));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_other_duplicates_are_kept() {
        let tags = TagSet::new().with("Topic", "a").with("Topic", "b");
        assert_eq!(tags.count("Topic"), 2);
        assert_eq!(tags.get("Topic"), Some("a"));
        assert_eq!(tags.to_map().get("Topic").map(String::as_str), Some("a"));
    }

    #[test]
    fn test_order_preserved() {
        let tags: TagSet = vec![
            UploadTag::new("b", "2"),
            UploadTag::new("a", "1"),
            UploadTag::new("c", "3"),
        ]
        .into_iter()
        .collect();
        let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(tags.summary(), "b: 2, a: 1, c: 3");
    }
}
