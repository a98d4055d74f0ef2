//! Kinship-reachability filtering.
//!
//! With the filter enabled, the visible graph is the set of seed persons plus
//! everyone reachable from them over relation types in the active kinship
//! set. Family membership only picks the seeds; a member of a selected family
//! that cannot be reached through kinship edges is filtered out. Once the
//! node set is fixed, every edge between surviving persons is kept,
//! whatever its type.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::model::{
    FamilyId, GraphSnapshot, Person, PersonId, RelationCategory, RelationTaxonomy, RelationType,
    Relationship,
};

/// Which relation types count as kinship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KinshipMode {
    /// Blood relations only.
    #[default]
    Strict,
    /// Blood and family relations plus custom types flagged as kinship.
    Expanded,
}

/// Filter configuration supplied by the data owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub enabled: bool,
    /// Selected families. All of their members seed the traversal.
    pub families: BTreeSet<FamilyId>,
    /// Additional seed persons, independent of family.
    pub people: BTreeSet<PersonId>,
    pub mode: KinshipMode,
}

impl FilterState {
    /// An enabled filter seeded by the given families.
    pub fn families<I>(mode: KinshipMode, families: I) -> Self
    where
        I: IntoIterator<Item = FamilyId>,
    {
        Self {
            enabled: true,
            families: families.into_iter().collect(),
            people: BTreeSet::new(),
            mode,
        }
    }

    /// An enabled filter seeded by a single person.
    pub fn lineage(mode: KinshipMode, person: PersonId) -> Self {
        Self {
            enabled: true,
            families: BTreeSet::new(),
            people: BTreeSet::from([person]),
            mode,
        }
    }

    /// Whether the filter restricts anything.
    pub fn is_active(&self) -> bool {
        self.enabled && !(self.families.is_empty() && self.people.is_empty())
    }
}

/// Relation types traversed in `mode`.
pub fn kinship_types(mode: KinshipMode, taxonomy: &RelationTaxonomy) -> HashSet<RelationType> {
    use RelationType::*;
    let builtins = [
        Parent, Spouse, Sibling, Partner, Relative, Friend, Colleague, Acquaintance, Rival, Other,
    ];
    let allowed = |category: RelationCategory| match mode {
        KinshipMode::Strict => category == RelationCategory::Blood,
        KinshipMode::Expanded => {
            matches!(category, RelationCategory::Blood | RelationCategory::Family)
        }
    };

    let mut types: HashSet<RelationType> = builtins
        .into_iter()
        .filter(|t| t.builtin_category().is_some_and(allowed))
        .collect();
    if mode == KinshipMode::Expanded {
        types.extend(taxonomy.kinship_customs());
    }
    types
}

/// Seeds plus everything reachable from them over `allowed` edges.
///
/// Edges are traversed in both directions. Seeds absent from `people` are
/// ignored, as are edges with a missing endpoint.
pub fn kinship_closure<I>(
    people: &[Person],
    edges: &[Relationship],
    seeds: I,
    allowed: &HashSet<RelationType>,
) -> HashSet<PersonId>
where
    I: IntoIterator<Item = PersonId>,
{
    let known: HashSet<PersonId> = people.iter().map(|p| p.id).collect();

    let mut adjacency: HashMap<PersonId, Vec<PersonId>> = HashMap::new();
    for edge in edges.iter().filter(|e| allowed.contains(&e.relation)) {
        if known.contains(&edge.source) && known.contains(&edge.target) {
            adjacency.entry(edge.source).or_default().push(edge.target);
            adjacency.entry(edge.target).or_default().push(edge.source);
        }
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    for seed in seeds {
        if known.contains(&seed) && visited.insert(seed) {
            queue.push_back(seed);
        }
    }

    while let Some(id) = queue.pop_front() {
        for &next in adjacency.get(&id).into_iter().flatten() {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    visited
}

/// Borrowed view of the snapshot that survives filtering.
#[derive(Debug, Clone, Default)]
pub struct FilteredGraph<'a> {
    pub people: Vec<&'a Person>,
    pub relationships: Vec<&'a Relationship>,
}

impl FilteredGraph<'_> {
    pub fn contains(&self, id: PersonId) -> bool {
        self.people.iter().any(|p| p.id == id)
    }
}

/// Apply `filter` to `snapshot`.
///
/// An inactive filter passes every person through. In both cases the edge
/// list keeps only edges whose endpoints are both present.
pub fn apply_filter<'a>(
    snapshot: &'a GraphSnapshot,
    filter: &FilterState,
    taxonomy: &RelationTaxonomy,
) -> FilteredGraph<'a> {
    let people: Vec<&Person> = if filter.is_active() {
        let seeds = snapshot
            .people
            .iter()
            .filter(|p| filter.families.contains(&p.family_id))
            .map(|p| p.id)
            .chain(filter.people.iter().copied());
        let allowed = kinship_types(filter.mode, taxonomy);
        let keep = kinship_closure(&snapshot.people, &snapshot.relationships, seeds, &allowed);
        snapshot.people.iter().filter(|p| keep.contains(&p.id)).collect()
    } else {
        snapshot.people.iter().collect()
    };

    let present: HashSet<PersonId> = people.iter().map(|p| p.id).collect();
    let relationships = snapshot
        .relationships
        .iter()
        .filter(|e| present.contains(&e.source) && present.contains(&e.target))
        .collect();

    FilteredGraph { people, relationships }
}
