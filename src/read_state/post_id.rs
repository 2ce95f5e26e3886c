use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::ReadStateError;

/// Identifier of a post. Always a positive integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u64")]
pub struct PostId(u64);

impl PostId {
    /// Ids must fit an `i64`, the type they are stored with.
    pub fn new(raw: u64) -> Result<PostId, ReadStateError> {
        match i64::try_from(raw) {
            Ok(raw) => PostId::try_from(raw),
            Err(_) => Err(ReadStateError::MalformedPostId(raw.to_string())),
        }
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<i64> for PostId {
    type Error = ReadStateError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        if raw <= 0 {
            return Err(ReadStateError::InvalidPostId(raw));
        }
        Ok(PostId(raw as u64))
    }
}

impl From<PostId> for u64 {
    fn from(id: PostId) -> u64 {
        id.0
    }
}

impl From<PostId> for i64 {
    fn from(id: PostId) -> i64 {
        id.0 as i64
    }
}

impl FromStr for PostId {
    type Err = ReadStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s
            .trim()
            .parse()
            .map_err(|_| ReadStateError::MalformedPostId(s.to_string()))?;
        PostId::try_from(raw)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(PostId),
    Many(Vec<PostId>),
}

/// Post IDs handed to a mark operation: either a single ID or a list.
///
/// Duplicates collapse, so the same ID given twice counts once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "OneOrMany")]
pub struct PostIds(BTreeSet<PostId>);

impl PostIds {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PostId> {
        self.0.iter()
    }
}

impl From<OneOrMany> for PostIds {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(id) => PostIds::from(id),
            OneOrMany::Many(ids) => ids.into_iter().collect(),
        }
    }
}

impl From<PostId> for PostIds {
    fn from(id: PostId) -> Self {
        PostIds(BTreeSet::from([id]))
    }
}

impl FromIterator<PostId> for PostIds {
    fn from_iter<T: IntoIterator<Item = PostId>>(iter: T) -> Self {
        PostIds(iter.into_iter().collect())
    }
}

impl TryFrom<&[i64]> for PostIds {
    type Error = ReadStateError;

    fn try_from(raw: &[i64]) -> Result<Self, Self::Error> {
        raw.iter().map(|id| PostId::try_from(*id)).collect()
    }
}

impl<'a> IntoIterator for &'a PostIds {
    type Item = &'a PostId;
    type IntoIter = std::collections::btree_set::Iter<'a, PostId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
pub(crate) fn ids(raw: &[i64]) -> PostIds {
    PostIds::try_from(raw).unwrap()
}
