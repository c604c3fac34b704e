use crate::binding::{Behaviour, BehaviourContext};
use glam::Vec3;
use gravefield_common::{EntityId, Transform};

/// Distance under which a waypoint counts as reached.
pub const WAYPOINT_EPSILON: f32 = 0.01;

/// Moves an entity along a closed loop of waypoints at constant speed.
#[derive(Debug, Clone)]
pub struct FollowPath {
    pub enabled: bool,
    pub points: Vec<Vec3>,
    /// Units per second.
    pub speed: f32,
    next: usize,
}

impl Default for FollowPath {
    fn default() -> Self {
        Self {
            enabled: true,
            points: Vec::new(),
            speed: 1.0,
            next: 0,
        }
    }
}

impl FollowPath {
    pub fn new(points: Vec<Vec3>, speed: f32) -> Self {
        Self {
            points,
            speed,
            ..Self::default()
        }
    }

    /// Index of the waypoint currently being approached.
    pub fn next_index(&self) -> usize {
        self.next
    }

    /// Advance `position` by `distance` along the loop.
    ///
    /// Distance left over after reaching a waypoint carries on toward the
    /// following one, so large steps do not stall at corners.
    pub fn advance(&mut self, mut position: Vec3, distance: f32) -> Vec3 {
        assert!(!self.points.is_empty(), "path follower has no waypoints");
        let mut remaining = distance.max(0.0);
        // one lap at most; a degenerate loop of identical points never ends
        for _ in 0..=self.points.len() {
            let target = self.points[self.next % self.points.len()];
            let to_target = target - position;
            let gap = to_target.length();
            if gap <= remaining || gap <= WAYPOINT_EPSILON {
                position = target;
                remaining = (remaining - gap).max(0.0);
                self.next = (self.next + 1) % self.points.len();
                if remaining <= 0.0 {
                    break;
                }
            } else {
                position += to_target / gap * remaining;
                break;
            }
        }
        position
    }
}

impl Behaviour for FollowPath {
    fn update(&mut self, entity: EntityId, ctx: &mut BehaviourContext<'_>) {
        let step = self.speed * ctx.dt;
        let transform = ctx.registry.get_mut::<Transform>(entity);
        let position = self.advance(transform.local_position(), step);
        transform.set_local_position(position);
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn name(&self) -> &'static str {
        "FollowPath"
    }
}
