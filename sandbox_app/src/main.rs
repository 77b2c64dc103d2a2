//! Headless behavior sandbox
//!
//! Loads a small declarative scene, drives the frame loop, and pokes the
//! entities with synthetic events so every built-in behavior gets exercised:
//! a red lead box, a follower that chases it, a hover color change, and an
//! event-bound logger.

use behavior_engine::behaviors::builtin_registry;
use behavior_engine::prelude::*;

/// The demo scene: a lead box and a chaser with hover + log behaviors.
const SCENE: &str = r##"
(
    entities: [
        (
            id: Some("lead"),
            position: Some((0.0, 0.0, 12.0)),
            behaviors: [
                (name: "box", properties: {"color": "#FF0000"}),
            ],
        ),
        (
            id: Some("chaser"),
            behaviors: [
                (name: "box", properties: {"width": "2", "color": "#4488AA"}),
                (name: "follow", properties: {"target": "#lead", "speed": "4"}),
                (name: "change-color-on-hover", properties: {"color": "yellow"}),
                (name: "log", properties: {"event": "ping", "message": "chaser was pinged"}),
                (name: "log", properties: {"message": "chaser is alive"}),
            ],
        ),
    ],
)
"##;

const FRAME_BUDGET: u64 = 240;
const FRAME_MS: u64 = 8;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    behavior_engine::foundation::logging::init();

    log::info!("Loading sandbox scene...");
    let declaration = SceneDeclaration::from_ron_str(SCENE)?;

    let mut scene = Scene::new();
    let mut system = BehaviorSystem::new(builtin_registry());
    declaration.instantiate(&mut scene, &mut system)?;

    let chaser = scene
        .resolve("chaser")
        .ok_or("scene declaration is missing the chaser entity")?;

    log::info!("Running {FRAME_BUDGET} frames...");
    let mut timer = FrameTimer::new();
    for frame in 0..FRAME_BUDGET {
        std::thread::sleep(std::time::Duration::from_millis(FRAME_MS));
        timer.update();
        system.tick(&mut scene, timer.elapsed_ms(), timer.delta_ms());

        // Synthetic input: hover the chaser mid-run and ping it twice.
        match frame {
            60 => system.emit(&mut scene, chaser, "mouseenter"),
            120 => system.emit(&mut scene, chaser, "mouseleave"),
            90 | 150 => system.emit(&mut scene, chaser, "ping"),
            _ => {}
        }

        if frame % 60 == 0 {
            let position = scene.position(chaser).unwrap_or_else(Vec3::zeros);
            log::info!(
                "frame {frame}: chaser at ({:.2}, {:.2}, {:.2})",
                position.x,
                position.y,
                position.z
            );
        }
    }

    let final_position = scene.position(chaser).unwrap_or_else(Vec3::zeros);
    log::info!(
        "Done after {} frames; chaser settled at ({:.2}, {:.2}, {:.2})",
        timer.frame_count(),
        final_position.x,
        final_position.y,
        final_position.z
    );
    Ok(())
}
