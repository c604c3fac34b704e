use crate::components::Parent;
use crate::registry::Registry;
use gravefield_common::{EntityId, Transform};

/// Refresh every cached world matrix for this frame.
///
/// Unparented transforms get `world = local`; parented ones are then
/// recomputed in depth order so a parent is always final before its
/// children read it.
pub fn refresh_world_matrices(registry: &mut Registry) {
    let _span = tracing::trace_span!("refresh_world_matrices").entered();
    for (_, transform) in registry.view_mut::<Transform>() {
        transform.update_world_matrix();
    }

    let reader: &Registry = registry;
    let mut children: Vec<(usize, EntityId, EntityId)> = reader
        .view::<Parent>()
        .map(|(child, parent)| (depth(reader, child), child, parent.0))
        .collect();
    if children.is_empty() {
        return;
    }
    children.sort_by_key(|(depth, _, _)| *depth);

    for (_, child, parent) in children {
        let Some(parent_world) = registry
            .try_get::<Transform>(parent)
            .map(Transform::local_transform)
        else {
            continue;
        };
        if let Some(transform) = registry.try_get_mut::<Transform>(child) {
            transform.update_world_matrix_with_parent(parent_world);
        }
    }
}

/// Number of parent links above `entity`, bounded so a cycle terminates.
fn depth(registry: &Registry, entity: EntityId) -> usize {
    let limit = registry.entity_count();
    let mut depth = 0;
    let mut current = entity;
    while let Some(Parent(parent)) = registry.try_get::<Parent>(current) {
        depth += 1;
        if depth > limit {
            tracing::warn!(%entity, "parent cycle detected");
            break;
        }
        current = *parent;
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn unparented_world_equals_local() {
        let mut r = Registry::new();
        let e = r.create();
        r.emplace(e, Transform::from_position(Vec3::new(1.0, 2.0, 3.0)));
        refresh_world_matrices(&mut r);
        let t = r.get::<Transform>(e);
        assert_eq!(t.local_transform(), t.local_matrix());
    }

    #[test]
    fn grandchild_sees_refreshed_ancestors() {
        let mut r = Registry::new();
        let root = r.create();
        let mid = r.create();
        let leaf = r.create();
        // Insert leaf first so storage order differs from depth order.
        r.emplace(leaf, Transform::from_position(Vec3::Z));
        r.emplace(leaf, Parent(mid));
        r.emplace(mid, Transform::from_position(Vec3::Y));
        r.emplace(mid, Parent(root));
        r.emplace(root, Transform::from_position(Vec3::X));

        refresh_world_matrices(&mut r);
        assert!(
            r.get::<Transform>(leaf)
                .world_position()
                .abs_diff_eq(Vec3::ONE, 1e-6)
        );

        r.get_mut::<Transform>(root).set_local_position(Vec3::ZERO);
        refresh_world_matrices(&mut r);
        assert!(
            r.get::<Transform>(leaf)
                .world_position()
                .abs_diff_eq(Vec3::new(0.0, 1.0, 1.0), 1e-6)
        );
    }

    #[test]
    fn parent_cycle_terminates() {
        let mut r = Registry::new();
        let a = r.create();
        let b = r.create();
        r.emplace(a, Transform::default());
        r.emplace(b, Transform::default());
        r.emplace(a, Parent(b));
        r.emplace(b, Parent(a));
        refresh_world_matrices(&mut r);
    }
}
