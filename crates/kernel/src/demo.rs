//! Programmatic construction of the graveyard demo scene.
//!
//! Every asset is loaded up front; a missing or unreadable file aborts the
//! build with [`KernelError::Asset`].

use crate::error::KernelError;
use crate::scene::Scene;
use glam::{Mat3, Vec3};
use gravefield_assets::{AssetRoot, MeshFactory};
use gravefield_behaviour::{CameraControl, FollowPath, OscillatingMover, bind, bind_disabled, bind_with};
use gravefield_common::Transform;
use gravefield_ecs::{MaterialHandle, MeshHandle, Renderable};
use gravefield_render::{
    Camera, Material, ResourceUploader, SKYBOX_RENDER_LAYER, ShaderLayout, ShaderProgram,
    TextureHandle, UniformValue,
};
use gravefield_scatter::{EnvironmentGenerator, PlacementRequest, Rect};
use std::collections::HashMap;

/// Key help shown next to the selected controllable.
pub const CONTROLS_HELP: &str = "Q/E -> Yaw\nLeft/Right -> Roll\nUp/Down -> Pitch\nY -> Toggle Mode";

pub const SKYBOX_CUBE_MAP: &str = "images/cubemaps/skybox/ToonSky.jpg";

/// (name, diffuse, specular, shininess)
pub const DEMO_MATERIALS: [(&str, &str, &str, f32); 8] = [
    ("stone", "images/stone.jpg", "images/stone_bump.jpg", 2.0),
    ("grass", "images/grass.jpg", "images/grassSpec.png", 2.0),
    ("simpleFlora", "images/SimpleFlora.png", "images/grassSpec.png", 8.0),
    ("snow", "images/snow.jpg", "images/snow_spec.jpg", 1.0),
    ("flower", "images/flower_texture.png", "images/grassSpec.png", 1.0),
    ("mushroom", "images/mushroom_texture.png", "images/grassSpec.png", 1.0),
    ("grassLeaf", "images/grass_leaf.png", "images/grassSpec.png", 1.0),
    ("bush", "images/bush.png", "images/grassSpec.png", 1.0),
];

struct Prop {
    name: &'static str,
    mesh: &'static str,
    material: &'static str,
    position: Vec3,
    rotation: Vec3,
    scale: f32,
}

const PROPS: [Prop; 7] = [
    Prop {
        name: "Ground",
        mesh: "models/plane.obj",
        material: "grass",
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: 1.0,
    },
    Prop {
        name: "tombstone",
        mesh: "models/tombstone.obj",
        material: "stone",
        position: Vec3::ZERO,
        rotation: Vec3::new(90.0, 0.0, -90.0),
        scale: 1.0,
    },
    Prop {
        name: "arm",
        mesh: "models/Hand_L.obj",
        material: "snow",
        position: Vec3::new(0.0, 0.0, -0.5),
        rotation: Vec3::new(180.0, 0.0, 30.0),
        scale: 3.0,
    },
    Prop {
        name: "rib",
        mesh: "models/ribs.obj",
        material: "snow",
        position: Vec3::new(-5.0, 15.0, -0.5),
        rotation: Vec3::new(180.0, -20.0, 30.0),
        scale: 2.0,
    },
    Prop {
        name: "skull",
        mesh: "models/skull.obj",
        material: "snow",
        position: Vec3::new(-5.0, 15.0, -0.5),
        rotation: Vec3::new(180.0, 20.0, 30.0),
        scale: 2.0,
    },
    Prop {
        name: "skullTombstone",
        mesh: "models/skull.obj",
        material: "snow",
        position: Vec3::new(-2.0, 2.7, -2.5),
        rotation: Vec3::new(500.0, 0.0, 30.0),
        scale: 1.0,
    },
    Prop {
        name: "skeleton",
        mesh: "models/skelleton_final.obj",
        material: "snow",
        position: Vec3::new(0.0, -10.0, 0.0),
        rotation: Vec3::new(90.0, 0.0, 0.0),
        scale: 3.0,
    },
];

/// Waypoints the skeleton walks, in order.
pub const SKELETON_PATH: [Vec3; 4] = [
    Vec3::new(-4.0, -4.0, 0.0),
    Vec3::new(4.0, -4.0, 0.0),
    Vec3::new(4.0, 4.0, 0.0),
    Vec3::new(-4.0, 4.0, 0.0),
];
pub const SKELETON_SPEED: f32 = 2.0;

/// (mesh, material, count, exclusion zones are rock bands)
const SCATTER: [(&str, &str, usize, bool); 5] = [
    ("models/grass.obj", "grassLeaf", 200, false),
    ("models/mushroom.obj", "mushroom", 50, false),
    ("models/simpleRock.obj", "simpleFlora", 10, true),
    ("models/flower.obj", "flower", 10, true),
    ("models/bush.obj", "bush", 3, true),
];

pub fn scatter_spawn_area() -> Rect {
    Rect::from_corners(-18.0, -18.0, 18.0, 18.0)
}

fn clearing() -> Vec<Rect> {
    vec![Rect::from_corners(-7.0, -7.0, 7.0, 7.0)]
}

/// Keeps rocks and flowers in a ring between the clearing and the edge.
fn rock_band() -> Vec<Rect> {
    vec![
        Rect::from_corners(-3.0, -3.0, 3.0, 3.0),
        Rect::from_corners(-19.0, -19.0, 19.0, -5.0),
        Rect::from_corners(5.0, -19.0, 19.0, 19.0),
        Rect::from_corners(-19.0, 5.0, 19.0, 19.0),
        Rect::from_corners(-19.0, -19.0, -5.0, 19.0),
    ]
}

/// Uploads each file once and hands back the cached handle afterwards.
struct Loader<'a> {
    assets: &'a AssetRoot,
    uploader: &'a mut dyn ResourceUploader,
    meshes: HashMap<&'static str, MeshHandle>,
    textures: HashMap<&'static str, TextureHandle>,
}

impl Loader<'_> {
    fn mesh(&mut self, path: &'static str) -> Result<MeshHandle, KernelError> {
        if let Some(handle) = self.meshes.get(path) {
            return Ok(*handle);
        }
        let data = self.assets.mesh(path)?;
        let handle = self.uploader.upload_mesh(path, &data);
        tracing::debug!(path, triangles = data.triangle_count(), "mesh loaded");
        self.meshes.insert(path, handle);
        Ok(handle)
    }

    fn texture(&mut self, path: &'static str) -> Result<TextureHandle, KernelError> {
        if let Some(handle) = self.textures.get(path) {
            return Ok(*handle);
        }
        let data = self.assets.texture(path)?;
        let handle = self.uploader.upload_texture(path, &data);
        self.textures.insert(path, handle);
        Ok(handle)
    }
}

/// Build the full demo scene: shaders, materials, props, the walking
/// skeleton, the camera, the skybox and the scattered vegetation.
pub fn build_demo_scene(
    assets: &AssetRoot,
    uploader: &mut dyn ResourceUploader,
    seed: u64,
    max_attempts: u32,
) -> Result<Scene, KernelError> {
    let _span = tracing::info_span!("build_demo_scene", root = %assets.path().display()).entered();
    let mut scene = Scene::new(EnvironmentGenerator::new(seed).with_max_attempts(max_attempts));
    let mut loader = Loader {
        assets,
        uploader,
        meshes: HashMap::new(),
        textures: HashMap::new(),
    };

    let lit = scene
        .resources
        .add_shader(ShaderProgram::new("lit", ShaderLayout::Lit));
    scene.lit_shader = Some(lit);
    scene.apply_lighting()?;

    let mut materials: HashMap<&str, MaterialHandle> = HashMap::new();
    for (name, diffuse, specular, shininess) in DEMO_MATERIALS {
        let mut material = Material::new(lit);
        material
            .set("s_Diffuse", UniformValue::Texture(loader.texture(diffuse)?))
            .set("s_Specular", UniformValue::Texture(loader.texture(specular)?))
            .set("u_Shininess", shininess)
            .set("u_TextureMix", 0.0_f32);
        materials.insert(name, scene.resources.add_material(material)?);
    }
    let material = |name: &str| match materials.get(name) {
        Some(handle) => *handle,
        None => panic!("demo material {name} is not in the material table"),
    };

    for prop in &PROPS {
        let entity = scene.spawn(prop.name);
        let mut transform = Transform::from_position(prop.position);
        transform
            .set_local_rotation(prop.rotation)
            .set_local_scale(Vec3::splat(prop.scale));
        scene.registry.emplace(entity, transform);
        scene.registry.emplace(
            entity,
            Renderable {
                mesh: loader.mesh(prop.mesh)?,
                material: material(prop.material),
            },
        );

        match prop.name {
            "tombstone" => {
                bind_disabled::<OscillatingMover>(&mut scene.registry, entity);
                scene.add_controllable(entity);
            }
            "skeleton" => {
                bind_with(
                    &mut scene.registry,
                    entity,
                    FollowPath::new(SKELETON_PATH.to_vec(), SKELETON_SPEED),
                );
            }
            _ => {}
        }
    }

    let camera = scene.spawn("Camera");
    let mut eye = Transform::from_position(Vec3::new(0.0, 3.0, 3.0));
    eye.look_at(Vec3::ZERO, Vec3::Z);
    scene.registry.emplace(camera, eye);
    scene.registry.emplace(camera, Camera::default());
    bind::<CameraControl>(&mut scene.registry, camera);
    scene.set_camera(camera);

    let skybox_shader = scene
        .resources
        .add_shader(ShaderProgram::new("skybox", ShaderLayout::Skybox));
    let cube = assets.cube_map(SKYBOX_CUBE_MAP)?;
    let environment = loader.uploader.upload_cube_map(SKYBOX_CUBE_MAP, &cube);
    let mut sky_material = Material::new(skybox_shader).with_render_layer(SKYBOX_RENDER_LAYER);
    sky_material
        .set("s_Environment", UniformValue::CubeMap(environment))
        .set(
            "u_EnvironmentRotation",
            Mat3::from_rotation_x(90.0_f32.to_radians()),
        );
    let sky_material = scene.resources.add_material(sky_material)?;
    let mut sky_mesh = MeshFactory::ico_sphere(Vec3::ZERO, 1.0, 0);
    MeshFactory::invert_faces(&mut sky_mesh);
    let sky_mesh = loader.uploader.upload_mesh("skybox", &sky_mesh);
    let skybox = scene.spawn("skybox");
    scene.registry.emplace(
        skybox,
        Renderable {
            mesh: sky_mesh,
            material: sky_material,
        },
    );

    for (mesh, material_name, count, rocky) in SCATTER {
        let exclusions = if rocky { rock_band() } else { clearing() };
        let request = PlacementRequest::new(
            mesh,
            loader.mesh(mesh)?,
            material(material_name),
            count,
            scatter_spawn_area(),
        )
        .with_exclusions(exclusions)
        .with_rotation(Vec3::new(90.0, 0.0, 0.0));
        scene.scatter.add_request(request);
    }
    let report = scene.scatter.generate(&mut scene.registry);

    gravefield_ecs::refresh_world_matrices(&mut scene.registry);
    tracing::info!(
        entities = scene.registry.entity_count(),
        materials = scene.resources.material_count(),
        scattered = report.placed(),
        "demo scene built"
    );
    Ok(scene)
}
