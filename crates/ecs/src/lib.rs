//! Sparse, deterministic entity-component storage.
//!
//! Each component kind has its own column, a `BTreeMap` from entity to value,
//! so iteration order is canonical and independent of insertion order.
//! An entity has no data of its own: it exists while at least one column
//! holds it.
//!
//! # Invariants
//! - Every write (add, update, remove) records a [`ComponentEvent`].
//! - Reads hand out shared references only. Systems change state by writing
//!   a new value back through [`ComponentStore::add_component`], so later
//!   systems in the same tick observe every write.
//! - Queries never fail; no match is an empty list.

mod components;

pub use components::{
    Aabb, Ball, Component, ComponentData, ComponentKind, Geometry, Mesh3D, Name, Paddle, PaddleAi,
    PlayerControl, Position, Renderable2D, RotationBehavior, Score, Velocity, ViewModeComponent,
};

use phosphor_common::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Change record produced by every store write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComponentEvent {
    Added {
        entity: EntityId,
        component: Component,
    },
    Updated {
        entity: EntityId,
        old: Component,
        new: Component,
    },
    Removed {
        entity: EntityId,
        component: Component,
    },
}

impl ComponentEvent {
    pub fn entity(&self) -> EntityId {
        match self {
            Self::Added { entity, .. } | Self::Updated { entity, .. } | Self::Removed { entity, .. } => {
                *entity
            }
        }
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Added { component, .. } | Self::Removed { component, .. } => component.kind(),
            Self::Updated { new, .. } => new.kind(),
        }
    }
}

/// Component storage keyed by kind, then by entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentStore {
    next_entity: u64,
    columns: BTreeMap<ComponentKind, BTreeMap<EntityId, Component>>,
    #[serde(skip)]
    events: Vec<ComponentEvent>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh entity id. Ids are sequential and never reused.
    pub fn spawn(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    /// Insert or replace a component.
    pub fn add_component(&mut self, entity: EntityId, component: impl Into<Component>) {
        let component = component.into();
        let column = self.columns.entry(component.kind()).or_default();
        let event = match column.insert(entity, component.clone()) {
            Some(old) => ComponentEvent::Updated {
                entity,
                old,
                new: component,
            },
            None => ComponentEvent::Added { entity, component },
        };
        self.events.push(event);
    }

    /// Remove a component by kind. Missing components are not an error.
    pub fn remove_component(&mut self, entity: EntityId, kind: ComponentKind) -> Option<Component> {
        let removed = self.columns.get_mut(&kind)?.remove(&entity)?;
        self.events.push(ComponentEvent::Removed {
            entity,
            component: removed.clone(),
        });
        Some(removed)
    }

    /// Typed removal.
    pub fn remove<T: ComponentData>(&mut self, entity: EntityId) -> Option<T> {
        self.remove_component(entity, T::KIND)
            .and_then(|c| T::from_component(&c).cloned())
    }

    pub fn get_component(&self, entity: EntityId, kind: ComponentKind) -> Option<&Component> {
        self.columns.get(&kind)?.get(&entity)
    }

    /// Typed read.
    pub fn get<T: ComponentData>(&self, entity: EntityId) -> Option<&T> {
        self.get_component(entity, T::KIND).and_then(T::from_component)
    }

    pub fn has(&self, entity: EntityId, kind: ComponentKind) -> bool {
        self.columns
            .get(&kind)
            .is_some_and(|column| column.contains_key(&entity))
    }

    /// Every entity holding all of `kinds`, in ascending id order.
    ///
    /// An empty `kinds` list matches nothing.
    pub fn query(&self, kinds: &[ComponentKind]) -> Vec<EntityId> {
        let Some((first, rest)) = kinds.split_first() else {
            return Vec::new();
        };
        let Some(column) = self.columns.get(first) else {
            return Vec::new();
        };
        column
            .keys()
            .copied()
            .filter(|&entity| rest.iter().all(|&kind| self.has(entity, kind)))
            .collect()
    }

    /// Iterate one column in entity order.
    pub fn column<'a, T: ComponentData + 'a>(&'a self) -> impl Iterator<Item = (EntityId, &'a T)> {
        self.columns
            .get(&T::KIND)
            .into_iter()
            .flat_map(|column| column.iter())
            .filter_map(|(&entity, c)| T::from_component(c).map(|value| (entity, value)))
    }

    /// Kinds currently attached to an entity; this is the entity's shape.
    pub fn kinds_of(&self, entity: EntityId) -> Vec<ComponentKind> {
        self.columns
            .iter()
            .filter(|(_, column)| column.contains_key(&entity))
            .map(|(&kind, _)| kind)
            .collect()
    }

    /// All entities holding at least one component.
    pub fn entities(&self) -> BTreeSet<EntityId> {
        self.columns
            .values()
            .flat_map(|column| column.keys().copied())
            .collect()
    }

    pub fn entity_count(&self) -> usize {
        self.entities().len()
    }

    /// Destroy an entity by removing every component it holds.
    pub fn despawn(&mut self, entity: EntityId) {
        for kind in self.kinds_of(entity) {
            self.remove_component(entity, kind);
        }
        tracing::trace!(%entity, "despawned");
    }

    /// Drain and return all pending component events.
    pub fn drain_events(&mut self) -> Vec<ComponentEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only access to pending events.
    pub fn events(&self) -> &[ComponentEvent] {
        &self.events
    }

    /// Replay an event without recording a new one.
    pub fn apply_event(&mut self, event: &ComponentEvent) {
        match event {
            ComponentEvent::Added { entity, component }
            | ComponentEvent::Updated {
                entity,
                new: component,
                ..
            } => {
                self.next_entity = self.next_entity.max(entity.0 + 1);
                self.columns
                    .entry(component.kind())
                    .or_default()
                    .insert(*entity, component.clone());
            }
            ComponentEvent::Removed { entity, component } => {
                if let Some(column) = self.columns.get_mut(&component.kind()) {
                    column.remove(entity);
                }
            }
        }
    }
}
