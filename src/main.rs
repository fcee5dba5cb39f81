//! Fixed-raster demo
//!
//! Renders a small scene on the CPU and presents the finished buffer through
//! macroquad. WASD moves, right mouse button looks around, Escape quits.
//!
//! Usage: fixed-raster [mesh.obj [texture.png]]

use fixed_raster::config::{load_config, RenderConfig};
use fixed_raster::rasterizer::{self as raster, AssetError, RenderTarget, Renderer, Scalar};
use fixed_raster::world::{Behavior, Entity, InputState, Resources, Scene};
use fixed_raster::VERSION;
use macroquad::prelude::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const CONFIG_PATH: &str = "config.ron";

fn window_conf() -> Conf {
    // Runs before logging is set up; main reloads and reports problems
    let config = load_config(CONFIG_PATH).unwrap_or_default();
    Conf {
        window_title: format!("fixed-raster v{}", VERSION),
        window_width: (config.width as u32 * config.window_scale) as i32,
        window_height: (config.height as u32 * config.window_scale) as i32,
        window_resizable: true,
        fullscreen: config.fullscreen,
        ..Default::default()
    }
}

fn startup_config() -> RenderConfig {
    match load_config(CONFIG_PATH) {
        Ok(config) => {
            tracing::info!("Loaded {}", CONFIG_PATH);
            config
        }
        Err(e) => {
            tracing::warn!("Using default config ({}: {})", CONFIG_PATH, e);
            RenderConfig::default()
        }
    }
}

/// Spinning cube, checkerboard quad, an optional OBJ mesh and a fly camera
fn build_scene(resources: &mut Resources) -> Result<Scene, AssetError> {
    let checker = resources.add_texture(raster::Texture::checkerboard(64, 64, 0xFFE0_E0E0, 0xFF30_3040));
    let cube = resources.add_mesh(raster::Mesh::cube())?;
    let quad = resources.add_mesh(raster::Mesh::adjoining_quad().with_texture(checker))?;

    let mut scene = Scene::new();
    let root = scene.root();

    let spin = Behavior::Spin { rate: raster::Vec3::from_f32(0.5, 0.8, 0.0) };
    scene.spawn(root, Entity::default().with_mesh(cube).with_behavior(spin));
    scene.spawn(root, Entity::new(raster::Vec3::from_f32(-1.5, 0.0, 0.0)).with_mesh(quad));

    let mut args = std::env::args().skip(1);
    if let Some(obj_path) = args.next().map(PathBuf::from) {
        let texture_path = args.next().map(PathBuf::from);
        match resources.load_mesh(&obj_path, texture_path.as_deref()) {
            Ok(mesh) => {
                let position = raster::Vec3::from_f32(1.5, 0.0, 0.0);
                scene.spawn(root, Entity::new(position).with_mesh(mesh));
            }
            Err(e) => tracing::error!("Failed to load '{}': {}", obj_path.display(), e),
        }
    }

    let fly = Behavior::FlyCamera {
        move_speed: Scalar::from_int(3),
        turn_speed: Scalar::from_f32(0.005),
    };
    let eye = Entity::new(scene.camera.position).with_behavior(fly);
    scene.spawn(root, eye);

    Ok(scene)
}

fn poll_input(last_mouse: &mut (f32, f32)) -> InputState {
    let mouse = mouse_position();
    let (dx, dy) = if is_mouse_button_down(MouseButton::Right) {
        (mouse.0 - last_mouse.0, mouse.1 - last_mouse.1)
    } else {
        (0.0, 0.0)
    };
    *last_mouse = mouse;

    InputState {
        escape: is_key_pressed(KeyCode::Escape),
        forward: is_key_down(KeyCode::W) || is_key_down(KeyCode::Up),
        backward: is_key_down(KeyCode::S) || is_key_down(KeyCode::Down),
        left: is_key_down(KeyCode::A) || is_key_down(KeyCode::Left),
        right: is_key_down(KeyCode::D) || is_key_down(KeyCode::Right),
        look_dx: dx,
        look_dy: dy,
    }
}

/// Upload the frame and stretch it over the window, keeping its aspect ratio
fn present(target: &RenderTarget) {
    let texture = Texture2D::from_rgba8(target.width as u16, target.height as u16, &target.to_rgba_bytes());
    texture.set_filter(FilterMode::Nearest);

    let aspect = target.width as f32 / target.height as f32;
    let (screen_w, screen_h) = (screen_width(), screen_height());
    let (draw_w, draw_h) = if screen_w / screen_h > aspect {
        (screen_h * aspect, screen_h)
    } else {
        (screen_w, screen_w / aspect)
    };

    draw_texture_ex(
        &texture,
        (screen_w - draw_w) * 0.5,
        (screen_h - draw_h) * 0.5,
        WHITE,
        DrawTextureParams {
            dest_size: Some(Vec2::new(draw_w, draw_h)),
            // Row 0 of the target is the bottom of the view
            flip_y: true,
            ..Default::default()
        },
    );
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("=== fixed-raster v{} ===", VERSION);
    let config = startup_config();

    let mut resources = Resources::new();
    let mut scene = match build_scene(&mut resources) {
        Ok(scene) => scene,
        Err(e) => {
            tracing::error!("Failed to build scene: {}", e);
            return;
        }
    };

    let renderer = Renderer::new(&config);
    let mut target = RenderTarget::new(config.width, config.height);
    let mut last_mouse = mouse_position();

    loop {
        let input = poll_input(&mut last_mouse);
        if input.escape {
            break;
        }

        scene.update(Scalar::from_f32(get_frame_time()), &input);
        let stats = renderer.render(&scene, &resources, &mut target);

        clear_background(BLACK);
        present(&target);
        draw_text(
            &format!("{} fps | {} triangles", get_fps(), stats.triangles_drawn),
            8.0,
            20.0,
            20.0,
            WHITE,
        );

        next_frame().await;
    }
}
