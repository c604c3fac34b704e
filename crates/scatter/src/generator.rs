use crate::rect::Rect;
use glam::{Vec2, Vec3};
use gravefield_common::{EntityId, Transform};
use gravefield_ecs::{MaterialHandle, MeshHandle, Name, Registry, Renderable};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Sampling attempts allowed per requested instance before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 64;

/// One kind of decoration to scatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRequest {
    pub name: String,
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub count: usize,
    pub spawn: Rect,
    pub exclusions: Vec<Rect>,
    /// Base rotation in Euler degrees applied to every instance.
    pub rotation: Vec3,
    /// Uniform scale applied to every instance.
    pub scale: f32,
}

impl PlacementRequest {
    pub fn new(
        name: impl Into<String>,
        mesh: MeshHandle,
        material: MaterialHandle,
        count: usize,
        spawn: Rect,
    ) -> Self {
        Self {
            name: name.into(),
            mesh,
            material,
            count,
            spawn,
            exclusions: Vec::new(),
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }

    pub fn with_exclusions(mut self, exclusions: impl IntoIterator<Item = Rect>) -> Self {
        self.exclusions.extend(exclusions);
        self
    }

    pub fn with_rotation(mut self, degrees: Vec3) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// A point is valid when it is in the spawn area and in no exclusion.
    pub fn accepts(&self, p: Vec2) -> bool {
        self.spawn.contains(p) && !self.exclusions.iter().any(|r| r.contains(p))
    }
}

/// Outcome of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestReport {
    pub name: String,
    pub requested: usize,
    pub placed: usize,
    pub attempts: u64,
}

impl RequestReport {
    pub fn shortfall(&self) -> usize {
        self.requested - self.placed
    }
}

/// Outcome of one generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScatterReport {
    pub requests: Vec<RequestReport>,
}

impl ScatterReport {
    pub fn placed(&self) -> usize {
        self.requests.iter().map(|r| r.placed).sum()
    }

    pub fn requested(&self) -> usize {
        self.requests.iter().map(|r| r.requested).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.requests.iter().all(|r| r.placed == r.requested)
    }
}

/// Places decorative entities from queued requests.
///
/// Created entities belong to the registry; the generator only remembers
/// their ids (and the consumed requests) so it can regenerate, until
/// [`EnvironmentGenerator::clean_up_pointers`] drops that bookkeeping.
#[derive(Debug)]
pub struct EnvironmentGenerator {
    rng: ChaCha8Rng,
    max_attempts: u32,
    pending: Vec<PlacementRequest>,
    consumed: Vec<PlacementRequest>,
    created: Vec<EntityId>,
}

impl EnvironmentGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            pending: Vec::new(),
            consumed: Vec::new(),
            created: Vec::new(),
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn add_request(&mut self, request: PlacementRequest) {
        self.pending.push(request);
    }

    pub fn pending(&self) -> &[PlacementRequest] {
        &self.pending
    }

    /// Entities created since the last clean-up.
    pub fn created(&self) -> &[EntityId] {
        &self.created
    }

    /// Consume every pending request, creating one entity per valid point.
    pub fn generate(&mut self, registry: &mut Registry) -> ScatterReport {
        let _span = tracing::info_span!("scatter_generate", requests = self.pending.len()).entered();
        let requests = std::mem::take(&mut self.pending);
        let mut report = ScatterReport::default();

        for request in requests {
            let budget = attempt_budget(request.count, self.max_attempts);
            let mut attempts = 0u64;
            let mut placed = 0usize;
            while placed < request.count && attempts < budget {
                attempts += 1;
                let point = self.sample(&request.spawn);
                if !request.accepts(point) {
                    continue;
                }
                let entity = self.spawn(registry, &request, point);
                self.created.push(entity);
                placed += 1;
            }

            if placed < request.count {
                tracing::warn!(
                    request = %request.name,
                    requested = request.count,
                    placed,
                    attempts,
                    "scatter request fell short"
                );
            } else {
                tracing::debug!(request = %request.name, placed, attempts, "scatter request placed");
            }
            report.requests.push(RequestReport {
                name: request.name.clone(),
                requested: request.count,
                placed,
                attempts,
            });
            self.consumed.push(request);
        }

        tracing::info!(
            placed = report.placed(),
            requested = report.requested(),
            "environment generated"
        );
        report
    }

    /// Destroy everything created so far and run the consumed requests again.
    pub fn regenerate(&mut self, registry: &mut Registry) -> ScatterReport {
        for entity in self.created.drain(..) {
            registry.destroy(entity);
        }
        let mut requests = std::mem::take(&mut self.consumed);
        requests.append(&mut self.pending);
        self.pending = requests;
        self.generate(registry)
    }

    /// Forget created entities and consumed requests without destroying
    /// anything; the entities stay in the registry.
    pub fn clean_up_pointers(&mut self) {
        tracing::debug!(
            created = self.created.len(),
            consumed = self.consumed.len(),
            "scatter bookkeeping released"
        );
        self.created.clear();
        self.consumed.clear();
    }

    fn sample(&mut self, area: &Rect) -> Vec2 {
        let (min, max) = (area.min(), area.max());
        Vec2::new(
            self.rng.gen_range(min.x..=max.x),
            self.rng.gen_range(min.y..=max.y),
        )
    }

    fn spawn(&mut self, registry: &mut Registry, request: &PlacementRequest, point: Vec2) -> EntityId {
        let spin = self.rng.gen_range(0.0..360.0_f32);
        let mut transform = Transform::from_position(point.extend(0.0));
        transform
            .set_local_rotation(request.rotation + Vec3::new(0.0, 0.0, spin))
            .set_local_scale(Vec3::splat(request.scale));
        transform.update_world_matrix();

        let entity = registry.create();
        registry.emplace(entity, Name(request.name.clone()));
        registry.emplace(entity, transform);
        registry.emplace(
            entity,
            Renderable {
                mesh: request.mesh,
                material: request.material,
            },
        );
        entity
    }
}

/// Sampling attempts allowed for one request, clamped instead of wrapping.
fn attempt_budget(count: usize, max_attempts: u32) -> u64 {
    u64::try_from(count)
        .unwrap_or(u64::MAX)
        .saturating_mul(u64::from(max_attempts))
}
