//! Input records supplied by the data owner.
//!
//! The engine never creates or deletes these; it reads a [`GraphSnapshot`]
//! each time the data changes and reports positions back through
//! [`GraphEvent`](crate::interaction::GraphEvent)s.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Identifier of a person (graph node).
pub type PersonId = i32;

/// Identifier of a relationship (graph edge).
pub type EdgeId = i32;

/// Identifier of the family a person belongs to.
pub type FamilyId = i32;

/// A person as stored by the data owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub family_id: FamilyId,
    /// Last known position, if the person has been laid out before.
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    /// Pinned position. When set the solver treats the node as fixed.
    #[serde(default)]
    pub fx: Option<f32>,
    #[serde(default)]
    pub fy: Option<f32>,
}

impl Person {
    /// Create an unplaced, unpinned person.
    pub fn new(id: PersonId, family_id: FamilyId) -> Self {
        Self { id, family_id, x: None, y: None, fx: None, fy: None }
    }

    /// Builder: set the stored position.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Builder: pin the person at the given position.
    pub fn pinned_at(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self.fx = Some(x);
        self.fy = Some(y);
        self
    }
}

/// Built-in and user-defined relation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationType {
    /// `source` is the child, `target` is the parent.
    Parent,
    Spouse,
    Sibling,
    Partner,
    Relative,
    Friend,
    Colleague,
    Acquaintance,
    Rival,
    Other,
    /// A user-defined type, described in the [`RelationTaxonomy`].
    Custom(u32),
}

/// Broad grouping of the built-in relation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationCategory {
    /// Blood relations: the strict kinship set.
    Blood,
    /// Family by marriage or extended family.
    Family,
    Social,
    Other,
}

impl RelationType {
    /// Category of a built-in type. Custom types report `None`; their kinship
    /// status lives in the taxonomy.
    pub fn builtin_category(self) -> Option<RelationCategory> {
        use RelationType::*;
        match self {
            Parent | Sibling => Some(RelationCategory::Blood),
            Spouse | Partner | Relative => Some(RelationCategory::Family),
            Friend | Colleague | Acquaintance | Rival => Some(RelationCategory::Social),
            Other => Some(RelationCategory::Other),
            Custom(_) => None,
        }
    }
}

/// A relationship as stored by the data owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: EdgeId,
    pub source: PersonId,
    pub target: PersonId,
    pub relation: RelationType,
    /// Link-force weight multiplier.
    #[serde(default = "default_strength")]
    pub strength: f32,
}

fn default_strength() -> f32 {
    1.0
}

impl Relationship {
    pub fn new(id: EdgeId, source: PersonId, target: PersonId, relation: RelationType) -> Self {
        Self { id, source, target, relation, strength: default_strength() }
    }

    /// Builder: set the link strength.
    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    /// Unordered endpoint key shared by every edge of a parallel group.
    pub fn pair_key(&self) -> (PersonId, PersonId) {
        if self.source <= self.target {
            (self.source, self.target)
        } else {
            (self.target, self.source)
        }
    }
}

/// A user-defined relation type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRelationType {
    pub id: u32,
    pub name: String,
    /// Counts as kinship for the expanded filter.
    #[serde(default)]
    pub kinship: bool,
}

/// Built-in relation categories plus the user's custom types.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationTaxonomy {
    custom: HashMap<u32, CustomRelationType>,
}

impl RelationTaxonomy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a custom relation type.
    pub fn add_custom(&mut self, custom: CustomRelationType) {
        self.custom.insert(custom.id, custom);
    }

    pub fn custom(&self, id: u32) -> Option<&CustomRelationType> {
        self.custom.get(&id)
    }

    /// Whether `relation` is a custom type flagged as kinship.
    ///
    /// Unknown custom ids are not kinship.
    pub fn is_custom_kinship(&self, relation: RelationType) -> bool {
        match relation {
            RelationType::Custom(id) => self.custom.get(&id).is_some_and(|c| c.kinship),
            _ => false,
        }
    }

    /// Custom types flagged as kinship.
    pub fn kinship_customs(&self) -> impl Iterator<Item = RelationType> + '_ {
        self.custom
            .values()
            .filter(|c| c.kinship)
            .map(|c| RelationType::Custom(c.id))
    }
}

/// The node and edge lists handed over by the data owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub people: Vec<Person>,
    pub relationships: Vec<Relationship>,
}

impl GraphSnapshot {
    pub fn new(people: Vec<Person>, relationships: Vec<Relationship>) -> Self {
        Self { people, relationships }
    }

    /// Person and relationship ids, ignoring positions and attributes.
    pub fn identity(&self) -> (BTreeSet<PersonId>, BTreeSet<EdgeId>) {
        (
            self.people.iter().map(|p| p.id).collect(),
            self.relationships.iter().map(|r| r.id).collect(),
        )
    }
}

/// Trait for UI-side person rows whose position the engine can write back.
///
/// Implement this for the struct backing a Slint `VecModel` so
/// [`GraphViewController::sync_people_model`](crate::GraphViewController::sync_people_model)
/// can push solver output into the model.
pub trait MovablePerson: Clone + 'static {
    fn id(&self) -> PersonId;
    fn x(&self) -> f32;
    fn y(&self) -> f32;
    fn set_x(&mut self, x: f32);
    fn set_y(&mut self, y: f32);
}
