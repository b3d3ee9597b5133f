//! End-to-end renders through the public API.

use std::f64::consts::PI;

use prism_renderer::{
    load_scene, render, scene_from_description, Camera, Color, Light, Material, NoProgress, PhongShader,
    PointLight, Ray, RayTracing, Scene, Shape, Sphere, Strategy, Vec3,
};
use prism_core::{ColorExt, SceneDescription, BACKGROUND};

fn red_sphere_scene(blocker: Option<Sphere>) -> Scene {
    let red = Sphere::new(Vec3::new(0.0, 0.0, 20.0), 5.0, Color::new(1.0, 0.0, 0.0), Material::DEFAULT_NON_REFLECTIVE);
    let mut shapes: Vec<Shape> = vec![red.into()];
    shapes.extend(blocker.map(Shape::from));
    let light = PointLight::new(Vec3::new(10.0, 10.0, 10.0), Color::ONE, 0.8);
    Scene::new(shapes, vec![Light::from(light)])
}

#[test]
fn test_red_sphere_center_and_silhouette() {
    let scene = red_sphere_scene(None);
    let camera = Camera::new().with_resolution(101).with_quality(1, 5);
    let raster = render(&scene, &camera, Strategy::Sequential, &NoProgress).unwrap();

    // Center ray hits (0, 0, 15) head on: N = V = -Z.
    let m = Material::DEFAULT_NON_REFLECTIVE;
    let red = Color::new(1.0, 0.0, 0.0);
    let to_light = Vec3::new(10.0, 10.0, -5.0) / 15.0;
    let n = Vec3::new(0.0, 0.0, -1.0);
    let i = 0.8 / (4.0 * PI * 225.0);
    let lambert = n.dot(to_light);
    let r = 2.0 * to_light.dot(n) * n - to_light;
    let highlight = r.dot(n).max(0.0).powf(m.phong_exponent());
    let expected = red * m.ambient + red * m.diffuse * (i * lambert) + Color::ONE * m.specular * (i * highlight);

    assert_eq!(raster.get(50, 50), expected.to_rgb8());

    // Silhouette: the sphere subtends asin(5 / 20) around the axis.
    let limit = (5.0f64 / 20.0).asin();
    let vp = camera.viewport();
    let background = BACKGROUND.to_rgb8();
    for y in 0..raster.height() {
        for x in 0..raster.width() {
            let d = vp.pixel_center_ray(x, y).direction.normalize();
            let angle = d.z.acos();
            if (angle - limit).abs() < 1e-6 {
                continue;
            }
            if angle > limit {
                assert_eq!(raster.get(x, y), background, "pixel ({x}, {y}) should miss");
            } else {
                assert_ne!(raster.get(x, y), background, "pixel ({x}, {y}) should hit");
            }
        }
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let description = SceneDescription::from_json_str(
        r#"{
            "shapes": [
                { "type": "sphere", "center": [-3, 0, 18], "radius": 3, "color": [0.2, 0.4, 0.9], "material": "mirror" },
                { "type": "sphere", "center": [4, -1, 22], "radius": 4, "color": [0.9, 0.3, 0.1], "material": "ruby" },
                { "type": "plane", "normal": [0, 1, 0], "point": [0, -5, 0], "color": [0.8, 0.8, 0.8], "material": "default-reflective" },
                { "type": "box", "min": [-1, -5, 12], "max": [1, -3, 14], "material": "concrete",
                  "transform": [ { "rotate_y": 30 } ] }
            ],
            "lights": [
                { "type": "point", "position": [0, 30, 0], "intensity": 40000 },
                { "type": "sphere", "center": [-20, 20, 10], "radius": 2, "intensity": 20000, "samples": 4 }
            ]
        }"#,
    )
    .unwrap();
    let scene = scene_from_description(&description).unwrap();

    for samples in [1, 2] {
        let camera = Camera::new().with_resolution(40).with_quality(samples, 4).with_seed(3);
        let sequential = render(&scene, &camera, Strategy::Sequential, &NoProgress).unwrap();
        let parallel = render(&scene, &camera, Strategy::Parallel, &NoProgress).unwrap();
        assert_eq!(sequential, parallel, "samples per side = {samples}");
    }
}

#[test]
fn test_occluder_darkens_pixel() {
    let camera = Camera::new().with_resolution(41).with_quality(1, 3);
    let open = render(&red_sphere_scene(None), &camera, Strategy::Parallel, &NoProgress).unwrap();

    // Center hit is (0, 0, 15); park a blocker halfway to the light.
    let blocker = Sphere::new(Vec3::new(5.0, 5.0, 12.5), 1.0, Color::ONE, Material::default());
    let blocked_scene = red_sphere_scene(Some(blocker));
    let shadowed = render(&blocked_scene, &camera, Strategy::Parallel, &NoProgress).unwrap();

    let ambient_only = (Color::new(1.0, 0.0, 0.0) * Material::DEFAULT_NON_REFLECTIVE.ambient).to_rgb8();
    assert_eq!(shadowed.get(20, 20), ambient_only);
    assert!(open.get(20, 20)[0] >= shadowed.get(20, 20)[0]);

    // The direct light term itself drops to exactly zero.
    let ray = Ray::new(Vec3::ZERO, Vec3::Z);
    let mut rng = rand_rng();
    let lit = ray.trace_with_reflections(&red_sphere_scene(None), &PhongShader, 1, &mut rng);
    let dark = ray.trace_with_reflections(&blocked_scene, &PhongShader, 1, &mut rng);
    assert!(lit.x > dark.x);
    assert!((dark - Color::new(0.4, 0.0, 0.0)).length() < 1e-12);
}

#[test]
fn test_two_mirrors_terminate_at_every_depth() {
    let mirror = Material::preset("mirror").unwrap();
    let near = Sphere::new(Vec3::new(0.0, 0.0, 10.0), 3.0, Color::ONE, mirror);
    let scene = Scene::new(
        vec![
            near.into(),
            prism_renderer::Plane::new(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0), Color::ONE, mirror).into(),
        ],
        vec![],
    );
    let mut rng = rand_rng();

    for depth in [0u32, 1, 5, 50, 500] {
        let c = Ray::new(Vec3::ZERO, Vec3::Z).trace_with_reflections(&scene, &PhongShader, depth, &mut rng);
        assert!(c.is_finite());
        if depth == 0 {
            assert_eq!(c, Color::ZERO);
        }
    }
}

#[test]
fn test_load_scene_from_file() {
    let path = std::env::temp_dir().join(format!("prism_load_{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{ "camera": { "height_px": 16 },
             "shapes": [ { "type": "sphere", "center": [0, 0, 10], "radius": 2 } ],
             "lights": [ { "type": "point", "position": [0, 5, 0], "intensity": 100 } ] }"#,
    )
    .unwrap();

    let (scene, spec) = load_scene(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let camera = Camera::new().apply(&spec).with_quality(1, 2);
    let raster = render(&scene, &camera, Strategy::Parallel, &NoProgress).unwrap();
    assert_eq!(raster.height(), 16);
}

fn rand_rng() -> rand::rngs::StdRng {
    use rand::SeedableRng;
    rand::rngs::StdRng::seed_from_u64(42)
}
