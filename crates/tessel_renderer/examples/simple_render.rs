//! Simple path tracer example.
//!
//! Renders a random sphere field on the threaded tile renderer, printing
//! progress while the workers run, and saves the result as PNG.
//!
//! Pass a JSON render configuration as the first argument to override the
//! defaults, e.g. `{"samples_per_pixel": 16, "tile_order": "spiral"}`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tessel_renderer::random::{gen_f64, gen_range_f64};
use tessel_renderer::{
    BvhNode, Camera, Color, Cuboid, Dielectric, DiffuseLight, Fog, Hittable, Lambertian, Material,
    Metal, RenderConfig, RotateY, Sphere, TileOrder, TileRenderer, Vec3,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(json) => RenderConfig::from_json(&json).context("invalid render configuration")?,
        None => RenderConfig {
            samples_per_pixel: 50,
            max_depth: 10,
            tile_order: TileOrder::Spiral,
            ..RenderConfig::default()
        },
    };

    // Build the scene
    let start = Instant::now();
    let world = build_scene(config.seed)?;
    println!("Scene built in {:?}", start.elapsed());

    let mut camera = Camera::new()
        .with_resolution(800, 450)
        .with_position(
            Vec3::new(13.0, 2.0, 3.0), // look_from
            Vec3::new(0.0, 0.0, 0.0),  // look_at
            Vec3::new(0.0, 1.0, 0.0),  // vup
        )
        .with_lens(20.0, 0.1, 10.0);
    camera.initialize();

    println!(
        "Rendering {}x{} @ {} spp...",
        camera.image_width, camera.image_height, config.samples_per_pixel
    );

    let start = Instant::now();
    let mut renderer = TileRenderer::new(config)?;
    renderer.render(Arc::new(world), Arc::new(camera))?;

    while !renderer.finished() {
        std::thread::sleep(Duration::from_millis(250));
        print!("\r{:5.1}% complete", 100.0 * renderer.percentage_complete());
        use std::io::Write;
        std::io::stdout().flush()?;
    }
    renderer.wait()?;
    println!("\nRendered in {:?}", start.elapsed());

    let image = renderer.snapshot();
    let filename = "output.png";
    image::RgbaImage::from_raw(image.width, image.height, image.to_rgba())
        .context("framebuffer size does not match resolution")?
        .save(filename)
        .with_context(|| format!("failed to save {}", filename))?;
    println!("Saved to {}", filename);

    Ok(())
}

fn build_scene(seed: u64) -> Result<BvhNode> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut objects: Vec<Box<dyn Hittable>> = Vec::new();

    // Ground
    objects.push(Box::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5))),
    )));

    // Three main spheres
    objects.push(Box::new(Sphere::new(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Dielectric::new(1.5)),
    )));
    objects.push(Box::new(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Lambertian::new(Color::new(0.4, 0.2, 0.1))),
    )));
    objects.push(Box::new(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    )));

    // A tilted crate, a wisp of fog and a small lamp
    let crate_box = Cuboid::new(
        Vec3::new(-0.5, 0.0, -0.5),
        Vec3::new(0.5, 1.0, 0.5),
        Arc::new(Lambertian::new(Color::new(0.6, 0.5, 0.3))),
    );
    objects.push(Box::new(RotateY::new(Box::new(crate_box), 30.0)));

    let fog_boundary = Sphere::new(
        Vec3::new(-2.0, 0.6, 2.5),
        0.6,
        Arc::new(Lambertian::new(Color::ONE)),
    );
    objects.push(Box::new(Fog::new(Box::new(fog_boundary), 2.0, Color::splat(0.9))));

    objects.push(Box::new(Sphere::new(
        Vec3::new(2.0, 0.3, 2.5),
        0.3,
        Arc::new(DiffuseLight::new(Color::new(4.0, 3.5, 3.0))),
    )));

    // Small random spheres
    for a in -5..5 {
        for b in -5..5 {
            let center = Vec3::new(
                a as f64 + 0.9 * gen_f64(&mut rng),
                0.2,
                b as f64 + 0.9 * gen_f64(&mut rng),
            );
            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let choose_mat = gen_f64(&mut rng);
            let material: Arc<dyn Material> = if choose_mat < 0.8 {
                // Diffuse
                let albedo = Color::new(
                    gen_f64(&mut rng) * gen_f64(&mut rng),
                    gen_f64(&mut rng) * gen_f64(&mut rng),
                    gen_f64(&mut rng) * gen_f64(&mut rng),
                );
                Arc::new(Lambertian::new(albedo))
            } else if choose_mat < 0.95 {
                // Metal
                let albedo = Color::new(
                    gen_range_f64(&mut rng, 0.5, 1.0),
                    gen_range_f64(&mut rng, 0.5, 1.0),
                    gen_range_f64(&mut rng, 0.5, 1.0),
                );
                Arc::new(Metal::new(albedo, 0.5 * gen_f64(&mut rng)))
            } else {
                // Glass
                Arc::new(Dielectric::new(1.5))
            };
            objects.push(Box::new(Sphere::new(center, 0.2, material)));
        }
    }

    println!("Created {} objects", objects.len());
    Ok(BvhNode::new(objects, &mut rng)?)
}
