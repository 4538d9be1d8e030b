//! JSON scene descriptions.
//!
//! A scene file names its materials once and lets objects refer to them by
//! name, so several objects share one material instance:
//!
//! ```json
//! {
//!   "camera": { "eye": [0, 1, 5], "target": [0, 0, 0], "fov": 60 },
//!   "sky": { "bottom": [1, 1, 1], "top": [0.5, 0.7, 1] },
//!   "materials": {
//!     "floor": { "type": "lambertian", "albedo": [0.5, 0.5, 0.5] },
//!     "glass": { "type": "dielectric", "albedo": [1, 1, 1], "ior": 1.5 }
//!   },
//!   "objects": [
//!     { "type": "plane", "point": [0, -1, 0], "normal": [0, 1, 0], "material": "floor" },
//!     { "type": "sphere", "center": [0, 0, 0], "radius": 1, "material": "glass" }
//!   ]
//! }
//! ```

use anyhow::{bail, Context, Result};
use lumen_math::{Quat, Transform, Vec3};
use lumen_tracer::{
    Camera, Color, Dielectric, Emissive, Lambertian, Material, Metal, Plane, Scene, Sphere,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Camera placement. Aspect ratio comes from the output size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewDesc {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
    /// Vertical field of view in degrees
    pub fov: f32,
}

impl Default for ViewDesc {
    fn default() -> Self {
        Self {
            eye: [0.0, 0.0, 5.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            fov: 70.0,
        }
    }
}

impl ViewDesc {
    pub fn build_camera(&self, aspect_ratio: f32) -> Result<Camera> {
        let camera = Camera::new(self.fov, aspect_ratio)
            .context("Invalid camera lens")?
            .with_view(self.eye.into(), self.target.into(), self.up.into())
            .context("Invalid camera view")?;
        Ok(camera)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyDesc {
    pub bottom: [f32; 3],
    pub top: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MaterialDesc {
    Lambertian {
        albedo: [f32; 3],
    },
    Metal {
        albedo: [f32; 3],
        #[serde(default)]
        fuzz: f32,
    },
    Dielectric {
        #[serde(default = "white")]
        albedo: [f32; 3],
        ior: f32,
    },
    Emissive {
        albedo: [f32; 3],
        #[serde(default = "unit")]
        intensity: f32,
    },
}

fn white() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn unit() -> f32 {
    1.0
}

impl MaterialDesc {
    fn build(&self) -> Arc<dyn Material> {
        match *self {
            MaterialDesc::Lambertian { albedo } => Arc::new(Lambertian::new(Color::from(albedo))),
            MaterialDesc::Metal { albedo, fuzz } => Arc::new(Metal::new(Color::from(albedo), fuzz)),
            MaterialDesc::Dielectric { albedo, ior } => {
                Arc::new(Dielectric::new(Color::from(albedo), ior))
            }
            MaterialDesc::Emissive { albedo, intensity } => {
                Arc::new(Emissive::new(Color::from(albedo), intensity))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectDesc {
    Sphere {
        center: [f32; 3],
        radius: f32,
        material: String,
    },
    Plane {
        point: [f32; 3],
        normal: [f32; 3],
        material: String,
    },
}

/// Top-level scene file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneFile {
    #[serde(default)]
    pub camera: ViewDesc,
    #[serde(default)]
    pub sky: Option<SkyDesc>,
    #[serde(default)]
    pub materials: BTreeMap<String, MaterialDesc>,
    #[serde(default)]
    pub objects: Vec<ObjectDesc>,
}

/// A scene ready to render plus where to look at it from.
pub struct SceneSetup {
    pub scene: Scene,
    pub view: ViewDesc,
}

impl SceneFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse scene file {}", path.display()))
    }

    /// Build the scene, creating each named material exactly once.
    pub fn build(&self) -> Result<SceneSetup> {
        let materials: BTreeMap<&str, Arc<dyn Material>> = self
            .materials
            .iter()
            .map(|(name, desc)| (name.as_str(), desc.build()))
            .collect();

        let lookup = |name: &str| -> Result<Arc<dyn Material>> {
            match materials.get(name) {
                Some(material) => Ok(Arc::clone(material)),
                None => bail!("Unknown material '{}'", name),
            }
        };

        let mut scene = Scene::new();
        if let Some(sky) = &self.sky {
            scene.set_sky(Color::from(sky.bottom), Color::from(sky.top));
        }

        for (i, object) in self.objects.iter().enumerate() {
            match object {
                ObjectDesc::Sphere {
                    center,
                    radius,
                    material,
                } => {
                    let material = lookup(material).with_context(|| format!("Object {}", i))?;
                    scene.add_object(Box::new(Sphere::at(Vec3::from(*center), *radius, material)));
                }
                ObjectDesc::Plane {
                    point,
                    normal,
                    material,
                } => {
                    let material = lookup(material).with_context(|| format!("Object {}", i))?;
                    let normal = Vec3::from(*normal).normalize_or_zero();
                    if normal == Vec3::ZERO {
                        bail!("Object {}: plane normal must not be zero", i);
                    }
                    let transform = Transform::from_position_rotation(
                        Vec3::from(*point),
                        Quat::from_rotation_arc(Vec3::Y, normal),
                    );
                    scene.add_object(Box::new(Plane::new(transform, material)));
                }
            }
        }

        log::debug!(
            "Built scene with {} materials and {} objects",
            materials.len(),
            scene.len()
        );

        Ok(SceneSetup {
            scene,
            view: self.camera.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_tracer::{Hittable, Interval, Ray};

    const ROOM: &str = r#"{
        "camera": { "eye": [0, 1, 5], "fov": 60 },
        "sky": { "bottom": [1, 0, 0], "top": [0, 0, 1] },
        "materials": {
            "floor": { "type": "lambertian", "albedo": [0.5, 0.5, 0.5] },
            "chrome": { "type": "metal", "albedo": [0.9, 0.9, 0.9] },
            "glass": { "type": "dielectric", "ior": 1.5 },
            "lamp": { "type": "emissive", "albedo": [1, 1, 1], "intensity": 4 }
        },
        "objects": [
            { "type": "plane", "point": [0, -1, 0], "normal": [0, 1, 0], "material": "floor" },
            { "type": "sphere", "center": [-1, 0, 0], "radius": 0.5, "material": "chrome" },
            { "type": "sphere", "center": [1, 0, 0], "radius": 0.5, "material": "chrome" },
            { "type": "sphere", "center": [0, 3, 0], "radius": 1, "material": "lamp" }
        ]
    }"#;

    #[test]
    fn test_parse_with_defaults() {
        let file: SceneFile = serde_json::from_str(ROOM).unwrap();

        assert_eq!(file.camera.eye, [0.0, 1.0, 5.0]);
        assert_eq!(file.camera.target, [0.0, 0.0, 0.0]);
        assert_eq!(file.camera.fov, 60.0);
        assert_eq!(
            file.materials["chrome"],
            MaterialDesc::Metal {
                albedo: [0.9, 0.9, 0.9],
                fuzz: 0.0
            }
        );
        assert_eq!(
            file.materials["glass"],
            MaterialDesc::Dielectric {
                albedo: [1.0, 1.0, 1.0],
                ior: 1.5
            }
        );
        assert_eq!(file.objects.len(), 4);
    }

    #[test]
    fn test_build_scene() {
        let file: SceneFile = serde_json::from_str(ROOM).unwrap();
        let setup = file.build().unwrap();

        assert_eq!(setup.scene.len(), 4);
        assert_eq!(
            setup.scene.sky(),
            (Color::new(1.0, 0.0, 0.0), Color::new(0.0, 0.0, 1.0))
        );

        // Straight down onto the floor plane
        let ray = Ray::new(Vec3::new(0.0, 5.0, 2.0), Vec3::NEG_Y);
        let hit = setup.scene.hit(&ray, Interval::new(0.001, 100.0)).unwrap();
        assert!((hit.point.y + 1.0).abs() < 1e-4);
        assert!((hit.normal - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_objects_share_named_material() {
        let file: SceneFile = serde_json::from_str(ROOM).unwrap();
        let setup = file.build().unwrap();
        let ray_t = Interval::new(0.001, 100.0);

        let left = setup
            .scene
            .hit(&Ray::new(Vec3::new(-1.0, 0.0, 5.0), Vec3::NEG_Z), ray_t)
            .unwrap();
        let right = setup
            .scene
            .hit(&Ray::new(Vec3::new(1.0, 0.0, 5.0), Vec3::NEG_Z), ray_t)
            .unwrap();

        assert!(std::ptr::addr_eq(left.material, right.material));
    }

    #[test]
    fn test_unknown_material_is_an_error() {
        let file: SceneFile = serde_json::from_str(
            r#"{ "objects": [ { "type": "sphere", "center": [0, 0, 0], "radius": 1, "material": "missing" } ] }"#,
        )
        .unwrap();

        let err = file.build().err().unwrap();
        assert!(format!("{:#}", err).contains("Unknown material 'missing'"));
    }

    #[test]
    fn test_zero_plane_normal_is_an_error() {
        let file: SceneFile = serde_json::from_str(
            r#"{
                "materials": { "m": { "type": "lambertian", "albedo": [1, 1, 1] } },
                "objects": [ { "type": "plane", "point": [0, 0, 0], "normal": [0, 0, 0], "material": "m" } ]
            }"#,
        )
        .unwrap();

        assert!(file.build().is_err());
    }

    #[test]
    fn test_unknown_material_type_fails_to_parse() {
        let result: Result<SceneFile, _> = serde_json::from_str(
            r#"{ "materials": { "m": { "type": "velvet", "albedo": [1, 1, 1] } } }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_view_builds_camera() {
        let view = ViewDesc::default();
        let camera = view.build_camera(4.0 / 3.0).unwrap();
        assert_eq!(camera.eye(), Vec3::new(0.0, 0.0, 5.0));
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-5);

        let bad = ViewDesc {
            target: [0.0, 0.0, 5.0],
            ..Default::default()
        };
        assert!(bad.build_camera(1.0).is_err());
    }
}
