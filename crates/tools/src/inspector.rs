use gravefield_behaviour::BehaviourBinding;
use gravefield_common::{EntityId, Transform};
use gravefield_ecs::{Name, Renderable};
use gravefield_kernel::Scene;
use std::collections::BTreeMap;

/// Scene inspector for developer tooling.
///
/// Read-only queries against a [`Scene`] for debugging and the overlay UI.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene.
    pub fn summary(scene: &Scene) -> SceneSummary {
        let registry = &scene.registry;
        SceneSummary {
            entity_count: registry.entity_count(),
            renderable_count: registry.entities_with::<Renderable>().len(),
            behaviour_count: registry
                .view::<BehaviourBinding>()
                .map(|(_, binding)| binding.len())
                .sum(),
            material_count: scene.resources.material_count(),
            scattered_count: scene.scatter.created().len(),
            selected: scene
                .selected_controllable()
                .and_then(|e| scene.entity_name(e))
                .map(str::to_string),
        }
    }

    /// Transform and component details of one entity.
    pub fn inspect_entity(scene: &Scene, id: EntityId) -> Option<EntityInfo> {
        let registry = &scene.registry;
        let transform = registry.try_get::<Transform>(id)?;
        Some(EntityInfo {
            id,
            name: registry.try_get::<Name>(id).map(|n| n.0.clone()),
            position: transform.local_position().to_array(),
            rotation: transform.local_rotation().to_array(),
            scale: transform.local_scale().to_array(),
            renderable: registry.has::<Renderable>(id),
            behaviours: registry
                .try_get::<BehaviourBinding>(id)
                .map_or(0, BehaviourBinding::len),
        })
    }

    /// Entity count per name, e.g. how many `models/grass.obj` were scattered.
    pub fn name_histogram(scene: &Scene) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for (_, name) in scene.registry.view::<Name>() {
            *counts.entry(name.0.clone()).or_insert(0) += 1;
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSummary {
    pub entity_count: usize,
    pub renderable_count: usize,
    pub behaviour_count: usize,
    pub material_count: usize,
    pub scattered_count: usize,
    pub selected: Option<String>,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: entities={} renderables={} behaviours={} materials={} scattered={}",
            self.entity_count,
            self.renderable_count,
            self.behaviour_count,
            self.material_count,
            self.scattered_count
        )?;
        if let Some(selected) = &self.selected {
            write!(f, " selected={selected}")?;
        }
        Ok(())
    }
}

/// Detailed info about a single entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityInfo {
    pub id: EntityId,
    pub name: Option<String>,
    pub position: [f32; 3],
    /// Euler angles in degrees.
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub renderable: bool,
    pub behaviours: usize,
}

impl std::fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Entity [{}] {} pos=({:.2}, {:.2}, {:.2}) rot=({:.1}, {:.1}, {:.1}) scale=({:.2}, {:.2}, {:.2})",
            self.id,
            self.name.as_deref().unwrap_or("<unnamed>"),
            self.position[0],
            self.position[1],
            self.position[2],
            self.rotation[0],
            self.rotation[1],
            self.rotation[2],
            self.scale[0],
            self.scale[1],
            self.scale[2],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use gravefield_behaviour::{FollowPath, OscillatingMover, bind_disabled, bind_with};
    use gravefield_scatter::EnvironmentGenerator;

    fn scene() -> Scene {
        Scene::new(EnvironmentGenerator::new(7))
    }

    #[test]
    fn summary_empty_scene() {
        let summary = SceneInspector::summary(&scene());
        assert_eq!(summary.entity_count, 0);
        assert_eq!(summary.behaviour_count, 0);
        assert_eq!(summary.selected, None);
    }

    #[test]
    fn summary_counts_behaviours_and_selection() {
        let mut scene = scene();
        let tombstone = scene.spawn("tombstone");
        bind_disabled::<OscillatingMover>(&mut scene.registry, tombstone);
        scene.add_controllable(tombstone);
        let walker = scene.spawn("skeleton");
        bind_with(
            &mut scene.registry,
            walker,
            FollowPath::new(vec![Vec3::ZERO, Vec3::X], 1.0),
        );

        let summary = SceneInspector::summary(&scene);
        assert_eq!(summary.entity_count, 2);
        assert_eq!(summary.behaviour_count, 2);
        assert_eq!(summary.selected.as_deref(), Some("tombstone"));
        assert!(summary.to_string().contains("selected=tombstone"));
    }

    #[test]
    fn inspect_entity_reads_local_transform() {
        let mut scene = scene();
        let id = scene.spawn("skull");
        scene
            .registry
            .get_mut::<Transform>(id)
            .set_local_position(Vec3::new(1.0, 2.0, 3.0))
            .set_local_rotation(Vec3::new(90.0, 0.0, 0.0));

        let info = SceneInspector::inspect_entity(&scene, id).unwrap();
        assert_eq!(info.name.as_deref(), Some("skull"));
        assert_eq!(info.position, [1.0, 2.0, 3.0]);
        assert_eq!(info.rotation, [90.0, 0.0, 0.0]);
        assert!(!info.renderable);
        assert!(info.to_string().contains("skull"));
    }

    #[test]
    fn inspect_destroyed_entity() {
        let mut scene = scene();
        let id = scene.spawn("gone");
        scene.registry.destroy(id);
        assert!(SceneInspector::inspect_entity(&scene, id).is_none());
    }

    #[test]
    fn histogram_groups_by_name() {
        let mut scene = scene();
        scene.spawn("models/grass.obj");
        scene.spawn("models/grass.obj");
        scene.spawn("Camera");

        let counts = SceneInspector::name_histogram(&scene);
        assert_eq!(counts["models/grass.obj"], 2);
        assert_eq!(counts["Camera"], 1);
    }
}
