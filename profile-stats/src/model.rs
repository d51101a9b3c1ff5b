// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Core data types shared by the fetcher, aggregator, and renderer.
//!
//! Values in this module carry no behaviour beyond simple accumulation. They
//! are produced by [`StatsSource`](crate::StatsSource) implementations and
//! consumed by the renderer, which imposes its own ordering on the language
//! distribution.

use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
};

/// Identifies one remote repository to aggregate over.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize,)]
pub struct RepositoryRef
{
    /// Account that owns the repository.
    pub owner:          String,
    /// Repository name without the owner prefix.
    pub name:           String,
    /// Branch designated as the primary line of history.
    pub default_branch: String,
}

impl RepositoryRef
{
    /// Creates a repository reference from its parts.
    pub fn new(
        owner: impl Into<String,>,
        name: impl Into<String,>,
        default_branch: impl Into<String,>,
    ) -> Self
    {
        Self {
            owner: owner.into(), name: name.into(), default_branch: default_branch.into(),
        }
    }
}

impl fmt::Display for RepositoryRef
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Repository as returned by a listing endpoint, before filtering.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct ListedRepository
{
    /// Reference used for all follow-up requests.
    pub repository: RepositoryRef,
    /// Whether the repository is a fork of another repository.
    pub fork:       bool,
    /// Whether the repository is archived.
    pub archived:   bool,
}

/// One page of a paginated collection.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct PageResponse<T,>
{
    /// Items in the order returned by the remote API.
    pub items:        Vec<T,>,
    /// Page number advertised by the `next` relation, when present.
    pub next_page:    Option<u32,>,
    /// Set when the response metadata marks this page as the final one.
    pub is_last_page: bool,
}

/// Byte count accumulated for a single language.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct LanguageBytes
{
    /// Language name as reported by the remote API.
    pub language: String,
    /// Accumulated byte count.
    pub bytes:    u64,
}

/// Mapping from language name to accumulated byte count.
///
/// Entries keep the order in which languages were first seen. That order is
/// only used as a tie-breaker when rendering; equality compares the mapping
/// alone.
#[derive(Debug, Clone, Default,)]
pub struct LanguageByteMap
{
    entries: Vec<LanguageBytes,>,
}

impl LanguageByteMap
{
    /// Creates an empty map.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Adds `bytes` to the running total for `language`.
    ///
    /// Unknown languages are appended after every previously seen language.
    /// Totals saturate instead of overflowing.
    pub fn add(&mut self, language: &str, bytes: u64,)
    {
        match self.entries.iter_mut().find(|entry| entry.language == language,) {
            Some(entry,) => entry.bytes = entry.bytes.saturating_add(bytes,),
            None => self.entries.push(LanguageBytes {
                language: language.to_owned(),
                bytes,
            },),
        }
    }

    /// Sums every entry of `other` into this map.
    pub fn merge(&mut self, other: &LanguageByteMap,)
    {
        for entry in &other.entries {
            self.add(&entry.language, entry.bytes,);
        }
    }

    /// Returns the byte count recorded for `language`.
    pub fn get(&self, language: &str,) -> Option<u64,>
    {
        self.entries.iter().find(|entry| entry.language == language,).map(|entry| entry.bytes,)
    }

    /// Sum of all byte counts.
    pub fn total_bytes(&self,) -> u64
    {
        self.entries.iter().fold(0u64, |total, entry| total.saturating_add(entry.bytes,),)
    }

    /// Number of distinct languages.
    pub fn len(&self,) -> usize
    {
        self.entries.len()
    }

    /// Returns `true` when no language has been recorded.
    pub fn is_empty(&self,) -> bool
    {
        self.entries.is_empty()
    }

    /// Iterates over entries in first-seen order.
    pub fn iter(&self,) -> impl Iterator<Item = &LanguageBytes,>
    {
        self.entries.iter()
    }
}

impl PartialEq for LanguageByteMap
{
    fn eq(&self, other: &Self,) -> bool
    {
        self.len() == other.len()
            && self.entries.iter().all(|entry| other.get(&entry.language,) == Some(entry.bytes,),)
    }
}

impl Eq for LanguageByteMap {}

impl<S: AsRef<str,>,> FromIterator<(S, u64,),> for LanguageByteMap
{
    fn from_iter<I: IntoIterator<Item = (S, u64,),>,>(iter: I,) -> Self
    {
        let mut map = Self::new();
        for (language, bytes,) in iter {
            map.add(language.as_ref(), bytes,);
        }
        map
    }
}

impl Serialize for LanguageByteMap
{
    fn serialize<S,>(&self, serializer: S,) -> Result<S::Ok, S::Error,>
    where
        S: Serializer,
    {
        serializer.collect_map(self.entries.iter().map(|entry| (&entry.language, entry.bytes,),),)
    }
}

impl<'de,> Deserialize<'de,> for LanguageByteMap
{
    fn deserialize<D,>(deserializer: D,) -> Result<Self, D::Error,>
    where
        D: Deserializer<'de,>,
    {
        struct LanguageVisitor;

        impl<'de,> Visitor<'de,> for LanguageVisitor
        {
            type Value = LanguageByteMap;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_,>,) -> fmt::Result
            {
                formatter.write_str("a mapping of language names to byte counts",)
            }

            fn visit_map<A,>(self, mut access: A,) -> Result<Self::Value, A::Error,>
            where
                A: MapAccess<'de,>,
            {
                let mut map = LanguageByteMap::new();
                while let Some((language, bytes,),) = access.next_entry::<String, u64>()? {
                    map.add(&language, bytes,);
                }
                Ok(map,)
            }
        }

        deserializer.deserialize_map(LanguageVisitor,)
    }
}

/// Statistics gathered for a single repository.
#[derive(Debug, Clone, PartialEq, Eq, Default,)]
pub struct RepositoryStats
{
    /// Language byte distribution of the repository.
    pub languages: LanguageByteMap,
    /// Commit count on the default branch.
    pub commits:   u64,
}

/// Result of processing one repository: its statistics or the reason it was
/// skipped.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct RepositoryOutcome
{
    /// Repository the outcome belongs to.
    pub repository: RepositoryRef,
    /// Statistics on success, failure reason otherwise.
    pub result:     Result<RepositoryStats, String,>,
}

/// Run-scoped totals across every processed repository.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize,)]
pub struct AggregateStats
{
    /// Language byte distribution summed across repositories.
    pub language_bytes: LanguageByteMap,
    /// Commit totals summed across repositories.
    pub total_commits:  u64,
    /// Number of repositories that contributed to the totals.
    pub processed:      usize,
    /// Number of repositories skipped because a request failed.
    pub failed:         usize,
}

impl AggregateStats
{
    /// Folds a single repository outcome into the totals.
    ///
    /// Failed outcomes only bump the failure counter.
    pub fn absorb(&mut self, outcome: &RepositoryOutcome,)
    {
        match &outcome.result {
            Ok(stats,) => {
                self.language_bytes.merge(&stats.languages,);
                self.total_commits = self.total_commits.saturating_add(stats.commits,);
                self.processed += 1;
            }
            Err(_,) => self.failed += 1,
        }
    }
}
