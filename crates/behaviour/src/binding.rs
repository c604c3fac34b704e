use gravefield_common::EntityId;
use gravefield_ecs::Registry;
use gravefield_input::InputState;
use std::any::Any;

/// Upcast helper so bound behaviours can be found again by concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Everything a behaviour may touch while it updates.
///
/// No isolation is enforced: a behaviour may read or write any component of
/// any entity through `registry`.
pub struct BehaviourContext<'a> {
    pub registry: &'a mut Registry,
    pub input: &'a InputState,
    pub dt: f32,
}

/// Per-entity update logic.
pub trait Behaviour: AsAny + std::fmt::Debug {
    fn update(&mut self, entity: EntityId, ctx: &mut BehaviourContext<'_>);

    fn enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    /// Behaviour name for debugging.
    fn name(&self) -> &'static str;
}

/// Component owning an entity's behaviours in update order.
///
/// While [`dispatch`] runs a behaviour its slot is empty; every other
/// behaviour of the entity stays reachable through the registry.
#[derive(Debug, Default)]
pub struct BehaviourBinding {
    behaviours: Vec<Option<Box<dyn Behaviour>>>,
}

impl BehaviourBinding {
    /// Number of bound behaviours, including one that is currently updating.
    pub fn len(&self) -> usize {
        self.behaviours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviours.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Behaviour> {
        self.behaviours.iter().flatten().map(|b| b.as_ref())
    }

    /// First bound behaviour of type `T`.
    pub fn get<T: Behaviour>(&self) -> Option<&T> {
        self.behaviours
            .iter()
            .flatten()
            .find_map(|b| b.as_ref().as_any().downcast_ref::<T>())
    }

    pub fn get_mut<T: Behaviour>(&mut self) -> Option<&mut T> {
        self.behaviours
            .iter_mut()
            .flatten()
            .find_map(|b| b.as_mut().as_any_mut().downcast_mut::<T>())
    }

    fn push<T: Behaviour>(&mut self, behaviour: T) -> &mut T {
        self.behaviours.push(Some(Box::new(behaviour)));
        match self
            .behaviours
            .last_mut()
            .and_then(|slot| slot.as_mut())
            .and_then(|b| b.as_mut().as_any_mut().downcast_mut::<T>())
        {
            Some(b) => b,
            None => unreachable!("just pushed a {}", std::any::type_name::<T>()),
        }
    }

    fn take(&mut self, index: usize) -> Option<Box<dyn Behaviour>> {
        self.behaviours.get_mut(index)?.take()
    }

    fn restore(&mut self, index: usize, behaviour: Box<dyn Behaviour>) {
        if let Some(slot) = self.behaviours.get_mut(index) {
            *slot = Some(behaviour);
        }
    }
}

/// Append a default-constructed, enabled `T` to `entity` and return it for
/// configuration.
pub fn bind<T: Behaviour + Default>(registry: &mut Registry, entity: EntityId) -> &mut T {
    bind_with(registry, entity, T::default())
}

/// Like [`bind`], but the behaviour starts disabled.
pub fn bind_disabled<T: Behaviour + Default>(registry: &mut Registry, entity: EntityId) -> &mut T {
    let behaviour = bind_with(registry, entity, T::default());
    behaviour.set_enabled(false);
    behaviour
}

/// Append an already configured behaviour.
pub fn bind_with<T: Behaviour>(registry: &mut Registry, entity: EntityId, behaviour: T) -> &mut T {
    tracing::debug!(%entity, behaviour = behaviour.name(), "behaviour bound");
    registry
        .get_or_emplace::<BehaviourBinding>(entity)
        .push(behaviour)
}

/// First behaviour of type `T` bound to `entity`.
pub fn behaviour<T: Behaviour>(registry: &Registry, entity: EntityId) -> Option<&T> {
    registry.try_get::<BehaviourBinding>(entity)?.get::<T>()
}

pub fn behaviour_mut<T: Behaviour>(registry: &mut Registry, entity: EntityId) -> Option<&mut T> {
    registry
        .try_get_mut::<BehaviourBinding>(entity)?
        .get_mut::<T>()
}

/// Update every enabled behaviour of every bound entity.
///
/// Returns how many behaviour updates ran. Only the running behaviour leaves
/// its slot, so it may enable, disable or reconfigure its siblings; the
/// enabled flag is read right before each update. Behaviours bound during
/// dispatch first run on the next call.
pub fn dispatch(registry: &mut Registry, input: &InputState, dt: f32) -> usize {
    let _span = tracing::debug_span!("behaviour_dispatch", dt).entered();
    let mut updated = 0;
    for entity in registry.entities_with::<BehaviourBinding>() {
        let Some(count) = registry.try_get::<BehaviourBinding>(entity).map(BehaviourBinding::len) else {
            // destroyed by an earlier behaviour this frame
            continue;
        };
        for index in 0..count {
            let Some(mut behaviour) = registry
                .try_get_mut::<BehaviourBinding>(entity)
                .and_then(|binding| binding.take(index))
            else {
                continue;
            };
            if behaviour.enabled() {
                let mut ctx = BehaviourContext {
                    registry: &mut *registry,
                    input,
                    dt,
                };
                behaviour.update(entity, &mut ctx);
                updated += 1;
            }
            if let Some(binding) = registry.try_get_mut::<BehaviourBinding>(entity) {
                binding.restore(index, behaviour);
            }
        }
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Counter {
        enabled: bool,
        hits: u32,
        log: Option<(u8, EntityId)>,
    }

    impl Default for Counter {
        fn default() -> Self {
            Self {
                enabled: true,
                hits: 0,
                log: None,
            }
        }
    }

    /// Pushes its tag into the entity's `Trace` component.
    #[derive(Debug)]
    struct Tagger(u8);

    #[derive(Debug, Default)]
    struct Trace(Vec<u8>);

    impl Behaviour for Counter {
        fn update(&mut self, entity: EntityId, _ctx: &mut BehaviourContext<'_>) {
            self.hits += 1;
            self.log = Some((0, entity));
        }
        fn enabled(&self) -> bool {
            self.enabled
        }
        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
        }
        fn name(&self) -> &'static str {
            "Counter"
        }
    }

    impl Behaviour for Tagger {
        fn update(&mut self, entity: EntityId, ctx: &mut BehaviourContext<'_>) {
            ctx.registry.get_or_emplace::<Trace>(entity).0.push(self.0);
        }
        fn enabled(&self) -> bool {
            true
        }
        fn set_enabled(&mut self, _enabled: bool) {}
        fn name(&self) -> &'static str {
            "Tagger"
        }
    }

    #[test]
    fn bind_returns_configurable_instance() {
        let mut r = Registry::new();
        let e = r.create();
        bind::<Counter>(&mut r, e).hits = 5;
        assert_eq!(behaviour::<Counter>(&r, e).unwrap().hits, 5);
        assert_eq!(r.get::<BehaviourBinding>(e).len(), 1);
    }

    #[test]
    fn behaviours_update_in_insertion_order() {
        let mut r = Registry::new();
        let e = r.create();
        bind_with(&mut r, e, Tagger(2));
        bind_with(&mut r, e, Tagger(1));
        bind_with(&mut r, e, Tagger(3));
        let ran = dispatch(&mut r, &InputState::new(), 0.016);
        assert_eq!(ran, 3);
        assert_eq!(r.get::<Trace>(e).0, vec![2, 1, 3]);
    }

    #[test]
    fn get_finds_by_concrete_type() {
        let mut r = Registry::new();
        let e = r.create();
        bind_with(&mut r, e, Tagger(1));
        bind::<Counter>(&mut r, e);
        assert!(behaviour::<Counter>(&r, e).is_some());
        let other = r.create();
        assert!(behaviour::<Counter>(&r, other).is_none());
    }

    #[test]
    fn dispatch_passes_owning_entity() {
        let mut r = Registry::new();
        let a = r.create();
        let b = r.create();
        bind::<Counter>(&mut r, a);
        bind::<Counter>(&mut r, b);
        dispatch(&mut r, &InputState::new(), 0.016);
        assert_eq!(behaviour::<Counter>(&r, a).unwrap().log, Some((0, a)));
        assert_eq!(behaviour::<Counter>(&r, b).unwrap().log, Some((0, b)));
    }
}
