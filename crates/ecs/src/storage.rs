use gravefield_common::EntityId;
use std::any::Any;

/// Sparse-set storage for one component type.
///
/// Components live densely in `components`; `sparse` maps an entity index to
/// its dense slot. Iteration order is dense order, which is insertion order
/// until a removal swaps the last element into the hole.
#[derive(Debug)]
pub struct Storage<T> {
    sparse: Vec<Option<usize>>,
    entities: Vec<EntityId>,
    components: Vec<T>,
}

impl<T> Default for Storage<T> {
    fn default() -> Self {
        Self {
            sparse: Vec::new(),
            entities: Vec::new(),
            components: Vec::new(),
        }
    }
}

impl<T> Storage<T> {
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn slot(&self, entity: EntityId) -> Option<usize> {
        let slot = (*self.sparse.get(entity.index() as usize)?)?;
        (self.entities[slot] == entity).then_some(slot)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.slot(entity).is_some()
    }

    /// Insert or replace the component for `entity`. Returns the old value.
    pub fn insert(&mut self, entity: EntityId, component: T) -> Option<T> {
        if let Some(slot) = self.slot(entity) {
            return Some(std::mem::replace(&mut self.components[slot], component));
        }
        let index = entity.index() as usize;
        if index >= self.sparse.len() {
            self.sparse.resize(index + 1, None);
        }
        self.sparse[index] = Some(self.components.len());
        self.entities.push(entity);
        self.components.push(component);
        None
    }

    pub fn remove(&mut self, entity: EntityId) -> Option<T> {
        let slot = self.slot(entity)?;
        self.sparse[entity.index() as usize] = None;
        self.entities.swap_remove(slot);
        let removed = self.components.swap_remove(slot);
        if let Some(moved) = self.entities.get(slot) {
            self.sparse[moved.index() as usize] = Some(slot);
        }
        Some(removed)
    }

    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.slot(entity).map(|slot| &self.components[slot])
    }

    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        self.slot(entity).map(|slot| &mut self.components[slot])
    }

    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.entities.iter().copied().zip(self.components.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.entities.iter().copied().zip(self.components.iter_mut())
    }
}

/// Type-erased view of a storage so the registry can hold all of them in
/// one map and strip an entity from every storage on destroy.
pub(crate) trait AnyStorage: Any {
    fn contains_entity(&self, entity: EntityId) -> bool;
    fn remove_entity(&mut self, entity: EntityId) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> AnyStorage for Storage<T> {
    fn contains_entity(&self, entity: EntityId) -> bool {
        self.contains(entity)
    }

    fn remove_entity(&mut self, entity: EntityId) -> bool {
        self.remove(entity).is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(index: u32) -> EntityId {
        EntityId::new(index, 0)
    }

    #[test]
    fn insert_get_remove() {
        let mut s = Storage::default();
        assert!(s.insert(id(3), "a").is_none());
        assert_eq!(s.get(id(3)), Some(&"a"));
        assert_eq!(s.insert(id(3), "b"), Some("a"));
        assert_eq!(s.len(), 1);
        assert_eq!(s.remove(id(3)), Some("b"));
        assert!(s.is_empty());
    }

    #[test]
    fn remove_keeps_other_slots_valid() {
        let mut s = Storage::default();
        for i in 0..5 {
            s.insert(id(i), i * 10);
        }
        s.remove(id(1));
        for i in [0, 2, 3, 4] {
            assert_eq!(s.get(id(i)), Some(&(i * 10)));
        }
        assert!(!s.contains(id(1)));
    }

    #[test]
    fn stale_generation_is_not_found() {
        let mut s = Storage::default();
        s.insert(EntityId::new(0, 1), 7);
        assert!(s.get(EntityId::new(0, 0)).is_none());
        assert!(s.get(EntityId::new(0, 1)).is_some());
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut s = Storage::default();
        s.insert(id(9), 'x');
        s.insert(id(2), 'y');
        let order: Vec<EntityId> = s.iter().map(|(e, _)| e).collect();
        assert_eq!(order, vec![id(9), id(2)]);
    }
}
