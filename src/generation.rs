//! Generation levels for the genealogy and tree layouts.
//!
//! A person's generation is one more than the deepest of their recorded
//! parents; parentless persons sit at generation 0. Spouses are merged into
//! one group first, so a couple always shares the higher of the two levels
//! and their descendants are placed below that shared band.
//!
//! Malformed ancestry (a person who is their own ancestor, or who married
//! into their own line) does not fail: the group that closes the cycle
//! resolves to 0, links inside a couple are dropped, and the rest is
//! computed around it. Levels never exceed the length of the longest
//! acyclic parent chain.

use log::{debug, trace};
use std::collections::{HashMap, HashSet};

use crate::model::{PersonId, RelationType, Relationship};

/// The two relation types the calculator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationRelations {
    /// Edge type whose `source` is the child and `target` the parent.
    pub ancestor: RelationType,
    pub spouse: RelationType,
}

impl Default for GenerationRelations {
    fn default() -> Self {
        Self { ancestor: RelationType::Parent, spouse: RelationType::Spouse }
    }
}

/// Person id → generation level. Transient, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationMap {
    levels: HashMap<PersonId, i32>,
}

impl GenerationMap {
    /// Level of `id`, if it was part of the computation.
    pub fn get(&self, id: PersonId) -> Option<i32> {
        self.levels.get(&id).copied()
    }

    /// Level of `id`, defaulting to 0 for unknown persons.
    pub fn level(&self, id: PersonId) -> i32 {
        self.get(id).unwrap_or(0)
    }

    /// Deepest generation present (0 for an empty map).
    pub fn depth(&self) -> i32 {
        self.levels.values().copied().max().unwrap_or(0)
    }

    /// Number of distinct generation bands.
    pub fn band_count(&self) -> usize {
        self.levels.values().collect::<HashSet<_>>().len()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PersonId, i32)> + '_ {
        self.levels.iter().map(|(&id, &level)| (id, level))
    }
}

/// Compute generation levels for `people` from the full edge list.
///
/// Edges naming persons outside `people` are ignored.
pub fn compute_generations<I>(
    people: I,
    edges: &[Relationship],
    relations: &GenerationRelations,
) -> GenerationMap
where
    I: IntoIterator<Item = PersonId>,
{
    let ids: Vec<PersonId> = people.into_iter().collect();
    let known: HashSet<PersonId> = ids.iter().copied().collect();

    let mut couples = SpouseGroups::default();
    let mut ancestry: Vec<(PersonId, PersonId)> = Vec::new();

    for edge in edges {
        if !known.contains(&edge.source) || !known.contains(&edge.target) {
            continue;
        }
        if edge.source == edge.target {
            trace!("ignoring self-referencing relationship {}", edge.id);
            continue;
        }
        if edge.relation == relations.ancestor {
            ancestry.push((edge.source, edge.target));
        } else if edge.relation == relations.spouse {
            couples.union(edge.source, edge.target);
        }
    }

    let mut parents: HashMap<PersonId, Vec<PersonId>> = HashMap::new();
    for (child, parent) in ancestry {
        let (child_group, parent_group) = (couples.find(child), couples.find(parent));
        if child_group == parent_group {
            debug!("person {child} is married into their own ancestry; ignoring the parent link");
            continue;
        }
        parents.entry(child_group).or_default().push(parent_group);
    }

    let mut resolver = Resolver {
        parents: &parents,
        levels: HashMap::with_capacity(ids.len()),
        visiting: HashSet::new(),
    };
    let mut levels = HashMap::with_capacity(ids.len());
    for &id in &ids {
        let group = couples.find(id);
        levels.insert(id, resolver.resolve(group));
    }

    GenerationMap { levels }
}

/// Union-find over spouse links. Every couple (and every chain of remarriages)
/// collapses into one group that shares a single generation.
#[derive(Default)]
struct SpouseGroups {
    parent: HashMap<PersonId, PersonId>,
}

impl SpouseGroups {
    fn find(&mut self, id: PersonId) -> PersonId {
        let mut root = id;
        while let Some(&next) = self.parent.get(&root) {
            if next == root {
                break;
            }
            root = next;
        }
        let mut cursor = id;
        while cursor != root {
            let next = self.parent.get(&cursor).copied().unwrap_or(root);
            self.parent.insert(cursor, root);
            cursor = next;
        }
        root
    }

    fn union(&mut self, a: PersonId, b: PersonId) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Lowest id is the representative, so results don't depend on edge order
            let (low, high) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent.insert(high, low);
        }
    }
}

/// Memoised longest-path lookup over spouse groups.
struct Resolver<'a> {
    /// Group → parent groups.
    parents: &'a HashMap<PersonId, Vec<PersonId>>,
    levels: HashMap<PersonId, i32>,
    /// Groups on the active recursion path.
    visiting: HashSet<PersonId>,
}

impl Resolver<'_> {
    fn resolve(&mut self, group: PersonId) -> i32 {
        if let Some(&level) = self.levels.get(&group) {
            return level;
        }
        if !self.visiting.insert(group) {
            debug!("cyclic ancestry through person {group}; using generation 0");
            return 0;
        }

        let parents = self.parents;
        let mut level = 0;
        for &parent in parents.get(&group).into_iter().flatten() {
            level = level.max(self.resolve(parent) + 1);
        }

        self.visiting.remove(&group);
        self.levels.insert(group, level);
        level
    }
}
