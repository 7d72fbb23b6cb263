//! Frame hand-off demo.
//!
//! A simulated capture thread produces frame samples (pixel bytes plus the
//! camera-to-world and projection matrices of the frame). The presentation
//! state lives in a thread-local on the main thread, so the only way to
//! update it is to hand the work over through the dispatcher.
//!
//! Run with: `cargo run --example frame_handoff_demo`

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use camstream::*;
use glam::{Mat4, Vec3};

const WIDTH: usize = 64;
const HEIGHT: usize = 36;
const FRAME_COUNT: u32 = 12;

/// One captured frame as delivered by the capture thread.
struct FrameSample {
    index: u32,
    bytes: Vec<u8>,
    camera_to_world: Mat4,
    projection: Mat4,
}

/// Main-thread-only presentation state.
#[derive(Default)]
struct VideoPanel {
    frames_shown: u32,
    latest_bytes: Vec<u8>,
    indicator: Option<Vec3>,
}

thread_local! {
    static PANEL: RefCell<VideoPanel> = RefCell::new(VideoPanel::default());
}

fn capture_frame(index: u32) -> FrameSample {
    let shade = u8::try_from(index * 16).unwrap_or(u8::MAX);
    let angle = index as f32 * 0.1;
    FrameSample {
        index,
        bytes: vec![shade; WIDTH * HEIGHT * 4],
        camera_to_world: Mat4::from_rotation_y(angle)
            * Mat4::from_translation(Vec3::new(0.0, 1.6, 0.0)),
        projection: Mat4::perspective_rh(60f32.to_radians(), 16.0 / 9.0, 0.1, 100.0),
    }
}

fn present(sample: FrameSample) -> std::result::Result<(), String> {
    if sample.bytes.len() != WIDTH * HEIGHT * 4 {
        return Err(format!(
            "frame {} has {} bytes, expected {}",
            sample.index,
            sample.bytes.len(),
            WIDTH * HEIGHT * 4
        ));
    }
    if sample.projection.determinant().abs() < f32::EPSILON {
        return Err(format!("frame {} has a singular projection", sample.index));
    }

    // Marker two meters in front of the camera.
    let position = sample.camera_to_world.transform_point3(Vec3::ZERO);
    let forward = sample.camera_to_world.transform_vector3(Vec3::NEG_Z);
    let marker = position + forward * 2.0;

    PANEL.with(|panel| {
        let mut panel = panel.borrow_mut();
        panel.frames_shown += 1;
        panel.latest_bytes = sample.bytes;
        panel.indicator = Some(marker);
    });
    Ok(())
}

fn main() -> Result<()> {
    let dispatcher = init_with_options(Options::default().with_max_fps(60))?;
    let capture_done = Arc::new(AtomicBool::new(false));

    let capture = {
        let dispatcher = Arc::clone(&dispatcher);
        let capture_done = Arc::clone(&capture_done);
        thread::spawn(move || {
            for index in 0..FRAME_COUNT {
                let sample = capture_frame(index);
                dispatcher.enqueue_fallible(move || present(sample));
                thread::sleep(Duration::from_millis(33));
            }
            capture_done.store(true, Ordering::SeqCst);
        })
    };

    let mut tick_loop = TickLoop::new(Arc::clone(&dispatcher));
    let ticks = tick_loop.run_until(|report| {
        if !report.is_clean() {
            log::warn!("tick {} had {} failures", report.tick, report.failures.len());
        }
        !capture_done.load(Ordering::SeqCst) || dispatcher.pending() > 0
    })?;

    if capture.join().is_err() {
        log::error!("capture thread panicked");
    }

    PANEL.with(|panel| {
        let panel = panel.borrow();
        println!(
            "presented {} of {FRAME_COUNT} frames over {ticks} ticks; last frame {} bytes, indicator at {:?}",
            panel.frames_shown,
            panel.latest_bytes.len(),
            panel.indicator
        );
    });

    Ok(())
}
