//! Calculation graph types.
//!
//! A [`CalcGraph`] maps each parent tag to its ordered, weighted children as
//! declared by a calculation linkbase. Graphs are assembled through
//! [`CalcGraphBuilder`] and are immutable afterwards.
//!
//! Tags coming from linkbases carry a namespace prefix (`us-gaap_Assets`)
//! while the presentation tables use bare names (`Assets`). Every lookup on the
//! graph therefore compares tags both with and without the prefix.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Strips the namespace prefix from a tag (`us-gaap_Assets` -> `Assets`).
#[must_use]
pub fn local_name(tag: &str) -> &str {
    tag.split_once('_').map_or(tag, |(_, rest)| rest)
}

/// Returns true if two tags name the same concept, ignoring namespace prefixes.
#[must_use]
pub fn same_concept(a: &str, b: &str) -> bool {
    a == b || local_name(a) == local_name(b)
}

/// A weighted child of a roll-up parent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalcChild {
    /// Child tag as it appears in the linkbase.
    pub tag: String,
    /// Contribution weight, normally `1.0` or `-1.0`.
    pub weight: f64,
}

/// Parent tag to ordered weighted children.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Vec<CalcChild>>", into = "BTreeMap<String, Vec<CalcChild>>")]
pub struct CalcGraph {
    parents: BTreeMap<String, Vec<CalcChild>>,
    by_local: HashMap<String, String>,
}

impl CalcGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of parent tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Returns true if the graph has no relationships.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Returns true if `tag` is a parent in the graph.
    #[must_use]
    pub fn is_parent(&self, tag: &str) -> bool {
        self.resolve(tag).is_some()
    }

    /// Ordered children of `tag`, or an empty slice if it is not a parent.
    #[must_use]
    pub fn children(&self, tag: &str) -> &[CalcChild] {
        self.resolve(tag)
            .and_then(|key| self.parents.get(key))
            .map_or(&[], Vec::as_slice)
    }

    /// Iterates parents in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[CalcChild])> {
        self.parents.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    fn resolve(&self, tag: &str) -> Option<&str> {
        if let Some((key, _)) = self.parents.get_key_value(tag) {
            return Some(key.as_str());
        }
        self.by_local.get(local_name(tag)).map(String::as_str)
    }

    fn index(parents: BTreeMap<String, Vec<CalcChild>>) -> Self {
        let mut by_local = HashMap::with_capacity(parents.len());
        for key in parents.keys() {
            by_local
                .entry(local_name(key).to_string())
                .or_insert_with(|| key.clone());
        }
        Self { parents, by_local }
    }
}

impl From<BTreeMap<String, Vec<CalcChild>>> for CalcGraph {
    fn from(parents: BTreeMap<String, Vec<CalcChild>>) -> Self {
        Self::index(parents)
    }
}

impl From<CalcGraph> for BTreeMap<String, Vec<CalcChild>> {
    fn from(graph: CalcGraph) -> Self {
        graph.parents
    }
}

/// Accumulates calculation arcs from one or more linkbase documents.
///
/// The first arc seen for a (parent, child) pair wins; children are ordered by
/// their `order` attribute, ties keeping insertion order.
#[derive(Debug, Default)]
pub struct CalcGraphBuilder {
    arcs: BTreeMap<String, Vec<(f64, CalcChild)>>,
}

impl CalcGraphBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an arc. Returns false if the pair was already present.
    pub fn add_arc(&mut self, parent: &str, child: &str, weight: f64, order: f64) -> bool {
        let children = self.arcs.entry(parent.to_string()).or_default();
        if children.iter().any(|(_, c)| c.tag == child) {
            return false;
        }
        children.push((
            order,
            CalcChild {
                tag: child.to_string(),
                weight,
            },
        ));
        true
    }

    /// Number of parents collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Returns true if no arcs have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Finishes the graph.
    #[must_use]
    pub fn build(self) -> CalcGraph {
        let parents = self
            .arcs
            .into_iter()
            .map(|(parent, mut children)| {
                children.sort_by(|a, b| a.0.total_cmp(&b.0));
                (parent, children.into_iter().map(|(_, c)| c).collect())
            })
            .collect();
        CalcGraph::index(parents)
    }
}

/// Where a calculation graph came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalcSource {
    /// The filing's own calculation linkbase (`*_cal.xml`).
    FilingLinkbase,
    /// Calculation arcs embedded in the filing's extension schema.
    EmbeddedSchema,
    /// The standard US-GAAP taxonomy for the given year.
    Taxonomy(u16),
}

impl fmt::Display for CalcSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FilingLinkbase => f.write_str("filing-linkbase"),
            Self::EmbeddedSchema => f.write_str("embedded-schema"),
            Self::Taxonomy(year) => write!(f, "us-gaap-{}", year),
        }
    }
}

/// One entry in the loader's attempt log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAttempt {
    /// The source that was tried.
    pub source: CalcSource,
    /// Number of parent tags obtained (0 when the attempt produced nothing).
    pub parents: usize,
    /// Whether the result was served from the cache.
    pub cached: bool,
    /// Why the attempt succeeded or fell through.
    pub reason: String,
}

impl SourceAttempt {
    /// Returns true if the attempt produced a populated graph.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.parents > 0
    }
}

/// Outcome of loading a calculation graph for one filing.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CalcGraphLoad {
    /// The graph; empty when every source was exhausted.
    pub graph: CalcGraph,
    /// The source that produced the graph, if any.
    pub source: Option<CalcSource>,
    /// Every attempt in order, with reasons.
    pub attempts: Vec<SourceAttempt>,
}

impl CalcGraphLoad {
    /// Returns true if no source produced relationships.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.source.is_none()
    }
}
