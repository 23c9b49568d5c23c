//! # Scene Collaborator Interface
//!
//! The abstract command surface of the external graphics/haptics engine.
//!
//! The dispatcher never touches scene internals: every decoded message maps
//! to exactly one call on [`SceneControl`]. Object capabilities are decided
//! at creation time: a dynamic object created through
//! [`create_dynamic_object`](SceneControl::create_dynamic_object) supports
//! start/stop/enable/parameter operations addressed by name, with no
//! downcasting at use time.
//!
//! The engine itself (rendering, force output, calibration) lives outside
//! this crate; tests exercise the trait with a recording fake.

/// A dynamic task object the scene can instantiate
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicObject {
    /// Continuous tracking task: an unstable first-order plant the subject
    /// stabilizes, with a gain (lambda) and a haptic force magnitude
    Tracking {
        lambda: f64,
        force_magnitude: f64,
        vision: bool,
        haptic: bool,
    },
    /// Cart-and-pendulum transport task
    Pendulum {
        escape_angle: f64,
        pendulum_length: f64,
        ball_mass: f64,
        cart_mass: f64,
    },
}

/// A named global force-field effect applied to the whole workspace
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEffect {
    ConstantForceField { direction: f64, magnitude: f64 },
    ViscosityField { matrix: [f64; 9] },
    /// Anchors the device at its current position with maximum stiffness
    Freeze,
}

/// A passive visual primitive or decoration
#[derive(Debug, Clone, PartialEq)]
pub enum Decoration {
    Pipe {
        height: f64,
        inner_radius: f64,
        outer_radius: f64,
        num_sides: u32,
        num_segments: u32,
        position: [f64; 3],
        rotation: [f64; 9],
        color: [f32; 4],
    },
    Arrow {
        length: f64,
        shaft_radius: f64,
        tip_length: f64,
        tip_radius: f64,
        bidirectional: bool,
        num_sides: u32,
        direction: [f64; 3],
        position: [f64; 3],
        color: [f32; 4],
    },
    Box {
        size: [f64; 3],
        position: [f64; 3],
        color: [f32; 4],
    },
    Sphere {
        radius: f64,
        position: [f64; 3],
        color: [f32; 4],
    },
    Torus {
        inner_radius: f64,
        outer_radius: f64,
    },
    MovingDots {
        num_dots: u32,
        coherence: f64,
        direction: f64,
        magnitude: f64,
    },
}

/// Scene-mutation operations the dispatcher invokes.
///
/// Implementations are expected to be cheap and non-blocking; heavy work
/// belongs on the engine's own threads.
pub trait SceneControl: Send + Sync {
    // Session and trial lifecycle markers
    fn session_start(&self);
    fn session_end(&self);
    fn trial_start(&self);
    fn trial_end(&self);

    // Binary session logging
    fn begin_recording(&self, filename: &str);
    fn end_recording(&self);

    /// Whether a named object (dynamic or decoration) currently exists
    fn contains_object(&self, name: &str) -> bool;

    /// Whether a named world effect currently exists
    fn contains_effect(&self, name: &str) -> bool;

    // Object lifecycle
    fn create_dynamic_object(&self, name: &str, object: DynamicObject);
    fn destroy_object(&self, name: &str);
    fn start_object(&self, name: &str);
    fn stop_object(&self, name: &str);
    fn reset_world(&self);

    // Per-object rendering toggles and parameters
    fn set_visual_enabled(&self, name: &str, enabled: bool);
    fn set_haptic_enabled(&self, name: &str, enabled: bool);
    fn set_stiffness(&self, name: &str, stiffness: f64);
    fn set_gain(&self, name: &str, gain: f64);

    // Global effects and workspace bounds
    fn add_world_effect(&self, name: &str, effect: WorldEffect);
    fn remove_world_effect(&self, name: &str);
    fn set_world_effect_enabled(&self, name: &str, enabled: bool);
    fn add_bounding_plane(&self, width: f64, height: f64);

    // Visual decorations and colors
    fn add_decoration(&self, name: &str, decoration: Decoration);
    fn set_background_color(&self, rgb: [f32; 3]);
    fn set_object_color(&self, name: &str, rgba: [f32; 4]);

    /// Key event published by the display module. Engines with no interest
    /// in input can leave the default no-op.
    fn key_pressed(&self, _keyname: &str) {}
}
