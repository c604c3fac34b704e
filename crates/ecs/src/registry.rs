use crate::storage::{AnyStorage, Storage};
use gravefield_common::EntityId;
use std::any::{TypeId, type_name};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::marker::PhantomData;

/// Handle to a registered group over entities owning both `A` and `B`.
///
/// Obtained once from [`Registry::group`] and reused every frame; the member
/// list is maintained by the registry as components come and go.
pub struct Group<A, B> {
    slot: usize,
    _marker: PhantomData<fn() -> (A, B)>,
}

impl<A, B> Clone for Group<A, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, B> Copy for Group<A, B> {}

impl<A, B> std::fmt::Debug for Group<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("slot", &self.slot)
            .field("a", &type_name::<A>())
            .field("b", &type_name::<B>())
            .finish()
    }
}

#[derive(Debug)]
struct GroupState {
    types: [TypeId; 2],
    members: Vec<EntityId>,
}

/// Owns entity lifetime and one storage per component type.
///
/// Systems receive the registry explicitly; there is no global instance.
/// Grouped iteration borrows the registry, so components cannot be added
/// to or removed from a group while it is being walked.
#[derive(Default)]
pub struct Registry {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free: Vec<u32>,
    storages: HashMap<TypeId, Box<dyn AnyStorage>>,
    groups: Vec<GroupState>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entities", &self.entity_count())
            .field("storages", &self.storages.len())
            .field("groups", &self.groups)
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new entity with no components.
    pub fn create(&mut self) -> EntityId {
        if let Some(index) = self.free.pop() {
            let slot = index as usize;
            self.alive[slot] = true;
            return EntityId::new(index, self.generations[slot]);
        }
        let index = self.generations.len() as u32;
        self.generations.push(0);
        self.alive.push(true);
        EntityId::new(index, 0)
    }

    /// Destroy an entity and every component attached to it.
    pub fn destroy(&mut self, entity: EntityId) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        for storage in self.storages.values_mut() {
            storage.remove_entity(entity);
        }
        for group in &mut self.groups {
            group.members.retain(|e| *e != entity);
        }
        let slot = entity.index() as usize;
        self.alive[slot] = false;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free.push(entity.index());
        tracing::trace!(%entity, "entity destroyed");
        true
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        let slot = entity.index() as usize;
        self.alive.get(slot).copied().unwrap_or(false) && self.generations[slot] == entity.generation()
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.alive.iter().filter(|a| **a).count()
    }

    /// Live entities in index order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(i, _)| EntityId::new(i as u32, self.generations[i]))
    }

    pub fn storage<T: 'static>(&self) -> Option<&Storage<T>> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|s| s.as_any().downcast_ref::<Storage<T>>())
    }

    fn storage_mut<T: 'static>(&mut self) -> &mut Storage<T> {
        self.storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Storage::<T>::default()))
            .as_any_mut()
            .downcast_mut::<Storage<T>>()
            .unwrap_or_else(|| unreachable!("storage registered under a foreign TypeId"))
    }

    fn has_type(&self, entity: EntityId, ty: TypeId) -> bool {
        self.storages
            .get(&ty)
            .is_some_and(|s| s.contains_entity(entity))
    }

    /// Attach `component` to `entity`, replacing any existing one of the same type.
    ///
    /// # Panics
    /// If `entity` is not alive.
    pub fn emplace<T: 'static>(&mut self, entity: EntityId, component: T) -> &mut T {
        assert!(
            self.is_alive(entity),
            "emplace {} on dead entity {entity}",
            type_name::<T>()
        );
        self.storage_mut::<T>().insert(entity, component);
        self.join_groups(entity, TypeId::of::<T>());
        self.storage_mut::<T>()
            .get_mut(entity)
            .unwrap_or_else(|| unreachable!("component was just inserted"))
    }

    /// Return the component, creating a default one first if absent.
    pub fn get_or_emplace<T: Default + 'static>(&mut self, entity: EntityId) -> &mut T {
        if !self.has::<T>(entity) {
            return self.emplace(entity, T::default());
        }
        self.get_mut::<T>(entity)
    }

    pub fn has<T: 'static>(&self, entity: EntityId) -> bool {
        self.storage::<T>().is_some_and(|s| s.contains(entity))
    }

    /// # Panics
    /// If `entity` has no `T`; absence here is a programming error.
    pub fn get<T: 'static>(&self, entity: EntityId) -> &T {
        match self.try_get::<T>(entity) {
            Some(c) => c,
            None => panic!("entity {entity} has no {} component", type_name::<T>()),
        }
    }

    /// # Panics
    /// If `entity` has no `T`; absence here is a programming error.
    pub fn get_mut<T: 'static>(&mut self, entity: EntityId) -> &mut T {
        match self.try_get_mut::<T>(entity) {
            Some(c) => c,
            None => panic!("entity {entity} has no {} component", type_name::<T>()),
        }
    }

    pub fn try_get<T: 'static>(&self, entity: EntityId) -> Option<&T> {
        self.storage::<T>()?.get(entity)
    }

    pub fn try_get_mut<T: 'static>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.storages
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<Storage<T>>()?
            .get_mut(entity)
    }

    /// Detach and return the `T` component of `entity`.
    pub fn remove<T: 'static>(&mut self, entity: EntityId) -> Option<T> {
        let ty = TypeId::of::<T>();
        let removed = self
            .storages
            .get_mut(&ty)?
            .as_any_mut()
            .downcast_mut::<Storage<T>>()?
            .remove(entity);
        if removed.is_some() {
            for group in self.groups.iter_mut().filter(|g| g.types.contains(&ty)) {
                group.members.retain(|e| *e != entity);
            }
        }
        removed
    }

    /// All `(entity, &T)` pairs.
    pub fn view<T: 'static>(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.storage::<T>().into_iter().flat_map(|s| s.iter())
    }

    /// All `(entity, &mut T)` pairs.
    pub fn view_mut<T: 'static>(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.as_any_mut().downcast_mut::<Storage<T>>())
            .into_iter()
            .flat_map(|s| s.iter_mut())
    }

    /// Entities owning both `A` and `B`, walked in `A`'s storage order.
    pub fn view2<A: 'static, B: 'static>(&self) -> impl Iterator<Item = (EntityId, &A, &B)> {
        let b = self.storage::<B>();
        self.view::<A>()
            .filter_map(move |(e, a)| b.and_then(|b| b.get(e)).map(|b| (e, a, b)))
    }

    /// Snapshot of the entities that currently own `T`.
    pub fn entities_with<T: 'static>(&self) -> Vec<EntityId> {
        self.storage::<T>()
            .map(|s| s.entities().to_vec())
            .unwrap_or_default()
    }

    /// Register (or look up) the group over `A` x `B`.
    pub fn group<A: 'static, B: 'static>(&mut self) -> Group<A, B> {
        let types = [TypeId::of::<A>(), TypeId::of::<B>()];
        let slot = match self.groups.iter().position(|g| g.types == types) {
            Some(slot) => slot,
            None => {
                let members = self
                    .view2::<A, B>()
                    .map(|(e, _, _)| e)
                    .collect::<Vec<_>>();
                tracing::debug!(
                    a = type_name::<A>(),
                    b = type_name::<B>(),
                    members = members.len(),
                    "group registered"
                );
                self.groups.push(GroupState { types, members });
                self.groups.len() - 1
            }
        };
        Group {
            slot,
            _marker: PhantomData,
        }
    }

    fn join_groups(&mut self, entity: EntityId, ty: TypeId) {
        for i in 0..self.groups.len() {
            let types = self.groups[i].types;
            if !types.contains(&ty) {
                continue;
            }
            if types.iter().all(|t| self.has_type(entity, *t))
                && !self.groups[i].members.contains(&entity)
            {
                self.groups[i].members.push(entity);
            }
        }
    }

    /// Current member order of a group.
    pub fn group_entities<A, B>(&self, group: Group<A, B>) -> &[EntityId] {
        &self.groups[group.slot].members
    }

    /// Reorder a group's members by comparing their `A` components.
    ///
    /// The sort is stable and the order persists across frames, so a group
    /// that is already sorted costs one linear pass.
    pub fn sort_group<A: 'static, B: 'static>(
        &mut self,
        group: Group<A, B>,
        mut compare: impl FnMut(&A, &A) -> Ordering,
    ) {
        let Some(storage) = self
            .storages
            .get(&TypeId::of::<A>())
            .and_then(|s| s.as_any().downcast_ref::<Storage<A>>())
        else {
            return;
        };
        let members = &mut self.groups[group.slot].members;
        members.sort_by(|l, r| match (storage.get(*l), storage.get(*r)) {
            (Some(l), Some(r)) => compare(l, r),
            _ => Ordering::Equal,
        });
    }

    /// Walk a group in its current member order.
    pub fn group_iter<A: 'static, B: 'static>(
        &self,
        group: Group<A, B>,
    ) -> impl Iterator<Item = (EntityId, &A, &B)> {
        let a = self.storage::<A>();
        let b = self.storage::<B>();
        self.groups[group.slot]
            .members
            .iter()
            .filter_map(move |e| Some((*e, a?.get(*e)?, b?.get(*e)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Health(i32);

    #[derive(Debug, PartialEq)]
    struct Layer(i32);

    #[test]
    fn create_and_destroy() {
        let mut r = Registry::new();
        let a = r.create();
        let b = r.create();
        assert_eq!(r.entity_count(), 2);
        assert!(r.destroy(a));
        assert!(!r.is_alive(a));
        assert!(r.is_alive(b));
        assert!(!r.destroy(a));
        assert_eq!(r.entity_count(), 1);
    }

    #[test]
    fn reused_slot_gets_new_generation() {
        let mut r = Registry::new();
        let a = r.create();
        r.destroy(a);
        let b = r.create();
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert!(!r.is_alive(a));
    }

    #[test]
    fn destroy_removes_components() {
        let mut r = Registry::new();
        let e = r.create();
        r.emplace(e, Health(3));
        r.destroy(e);
        assert!(r.view::<Health>().next().is_none());
    }

    #[test]
    fn emplace_get_remove() {
        let mut r = Registry::new();
        let e = r.create();
        r.emplace(e, Health(10));
        r.get_mut::<Health>(e).0 -= 4;
        assert_eq!(r.get::<Health>(e), &Health(6));
        assert_eq!(r.remove::<Health>(e), Some(Health(6)));
        assert!(!r.has::<Health>(e));
    }

    #[test]
    #[should_panic(expected = "has no")]
    fn get_missing_component_panics() {
        let mut r = Registry::new();
        let e = r.create();
        r.get::<Health>(e);
    }

    #[test]
    fn get_or_emplace_creates_default() {
        let mut r = Registry::new();
        let e = r.create();
        assert_eq!(r.get_or_emplace::<Health>(e), &mut Health(0));
        r.get_mut::<Health>(e).0 = 5;
        assert_eq!(r.get_or_emplace::<Health>(e), &mut Health(5));
    }

    #[test]
    fn view2_filters_on_both_types() {
        let mut r = Registry::new();
        let both = r.create();
        let only_health = r.create();
        r.emplace(both, Health(1));
        r.emplace(both, Layer(2));
        r.emplace(only_health, Health(3));
        let found: Vec<EntityId> = r.view2::<Health, Layer>().map(|(e, _, _)| e).collect();
        assert_eq!(found, vec![both]);
    }

    #[test]
    fn group_tracks_membership_live() {
        let mut r = Registry::new();
        let early = r.create();
        r.emplace(early, Layer(1));
        r.emplace(early, Health(1));
        let group = r.group::<Layer, Health>();
        assert_eq!(r.group_entities(group), &[early]);

        let late = r.create();
        r.emplace(late, Health(2));
        assert_eq!(r.group_entities(group).len(), 1);
        r.emplace(late, Layer(0));
        assert_eq!(r.group_entities(group), &[early, late]);

        r.remove::<Health>(early);
        assert_eq!(r.group_entities(group), &[late]);
        r.destroy(late);
        assert!(r.group_entities(group).is_empty());
    }

    #[test]
    fn group_is_registered_once() {
        let mut r = Registry::new();
        let g1 = r.group::<Layer, Health>();
        let g2 = r.group::<Layer, Health>();
        assert_eq!(g1.slot, g2.slot);
    }

    #[test]
    fn sort_group_orders_members() {
        let mut r = Registry::new();
        let group = r.group::<Layer, Health>();
        let mut ids = Vec::new();
        for layer in [5, 1, 3] {
            let e = r.create();
            r.emplace(e, Health(0));
            r.emplace(e, Layer(layer));
            ids.push(e);
        }
        r.sort_group(group, |a: &Layer, b: &Layer| a.0.cmp(&b.0));
        let layers: Vec<i32> = r.group_iter(group).map(|(_, l, _)| l.0).collect();
        assert_eq!(layers, vec![1, 3, 5]);

        // Order persists until the next sort.
        let e = r.create();
        r.emplace(e, Health(0));
        r.emplace(e, Layer(0));
        let layers: Vec<i32> = r.group_iter(group).map(|(_, l, _)| l.0).collect();
        assert_eq!(layers, vec![1, 3, 5, 0]);
    }
}
