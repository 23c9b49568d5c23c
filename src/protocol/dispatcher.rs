//! # Datagram Dispatcher
//!
//! Decodes each inbound datagram and routes it to exactly one scene-mutation
//! call. Dispatch is stateless: nothing carries over between packets.
//!
//! Commands that mutate an existing object first check the scene's registry;
//! a missing name is logged and skipped, never fatal. Unknown type tags are
//! dropped but counted and logged at debug level so a misbehaving producer
//! is diagnosable rather than silent.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::error::{ProtocolError, Result};
use crate::protocol::message::Message;
use crate::protocol::wire;
use crate::scene::{Decoration, DynamicObject, SceneControl, WorldEffect};

/// Routes decoded messages to a [`SceneControl`] implementation
pub struct Dispatcher<S: SceneControl> {
    scene: Arc<S>,
    unknown_messages: AtomicU64,
}

impl<S: SceneControl> Dispatcher<S> {
    pub fn new(scene: Arc<S>) -> Self {
        Self {
            scene,
            unknown_messages: AtomicU64::new(0),
        }
    }

    /// Number of datagrams dropped because their type tag was unrecognized
    pub fn unknown_messages(&self) -> u64 {
        self.unknown_messages.load(Ordering::Relaxed)
    }

    /// Decode one datagram and invoke the matching scene operation.
    ///
    /// Unknown type tags return `Ok(())`: the packet is dropped and counted.
    /// Malformed packets return the decode error; callers treat this as a
    /// per-packet drop.
    pub fn dispatch(&self, datagram: &[u8]) -> Result<()> {
        let packet = match wire::decode(datagram) {
            Ok(packet) => packet,
            Err(ProtocolError::UnknownMessageType(tag)) => {
                self.unknown_messages.fetch_add(1, Ordering::Relaxed);
                debug!(tag, "Dropping datagram with unknown message type");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        trace!(
            serial = packet.header.serial_number,
            message_type = ?packet.message.message_type(),
            "Dispatching message"
        );
        self.handle(packet.message);
        Ok(())
    }

    /// True when the named object exists; logs and reports the miss otherwise
    fn object_exists(&self, name: &str) -> bool {
        if self.scene.contains_object(name) {
            true
        } else {
            warn!(object = %name, "Object not found, skipping command");
            false
        }
    }

    fn effect_exists(&self, name: &str) -> bool {
        if self.scene.contains_effect(name) {
            true
        } else {
            warn!(effect = %name, "World effect not found, skipping command");
            false
        }
    }

    fn handle(&self, message: Message) {
        let scene = &self.scene;
        match message {
            Message::SessionStart => scene.session_start(),
            Message::SessionEnd => scene.session_end(),
            Message::TrialStart => scene.trial_start(),
            Message::TrialEnd => scene.trial_end(),
            Message::StartRecording { filename } => scene.begin_recording(&filename),
            Message::StopRecording => scene.end_recording(),

            Message::RemoveObject { name } => {
                if self.object_exists(&name) {
                    scene.destroy_object(&name);
                }
            }
            Message::ResetWorld => scene.reset_world(),

            Message::TrackingCreate {
                name,
                lambda,
                force_magnitude,
                vision,
                haptic,
            } => scene.create_dynamic_object(
                &name,
                DynamicObject::Tracking {
                    lambda,
                    force_magnitude,
                    vision,
                    haptic,
                },
            ),
            Message::TrackingDestroy { name } | Message::PendulumDestroy { name } => {
                if self.object_exists(&name) {
                    scene.destroy_object(&name);
                }
            }
            Message::TrackingStart { name } | Message::PendulumStart { name } => {
                if self.object_exists(&name) {
                    scene.start_object(&name);
                }
            }
            Message::TrackingStop { name } | Message::PendulumStop { name } => {
                if self.object_exists(&name) {
                    scene.stop_object(&name);
                }
            }
            Message::TrackingSetVisual { name, enabled } => {
                if self.object_exists(&name) {
                    scene.set_visual_enabled(&name, enabled);
                }
            }
            Message::TrackingSetHaptic { name, enabled } => {
                if self.object_exists(&name) {
                    scene.set_haptic_enabled(&name, enabled);
                }
            }
            Message::TrackingSetLambda { name, lambda } => {
                if self.object_exists(&name) {
                    scene.set_gain(&name, lambda);
                }
            }

            Message::PendulumCreate {
                name,
                escape_angle,
                pendulum_length,
                ball_mass,
                cart_mass,
            } => scene.create_dynamic_object(
                &name,
                DynamicObject::Pendulum {
                    escape_angle,
                    pendulum_length,
                    ball_mass,
                    cart_mass,
                },
            ),

            Message::HapticsSetEnabled { name, enabled } => {
                if self.object_exists(&name) {
                    scene.set_haptic_enabled(&name, enabled);
                }
            }
            Message::HapticsSetEnabledWorld {
                effect_name,
                enabled,
            } => {
                if self.effect_exists(&effect_name) {
                    scene.set_world_effect_enabled(&effect_name, enabled);
                }
            }
            Message::HapticsSetStiffness { name, stiffness } => {
                if self.object_exists(&name) {
                    scene.set_stiffness(&name, stiffness);
                }
            }
            Message::HapticsBoundingPlane { width, height } => {
                scene.add_bounding_plane(width, height);
            }
            Message::HapticsConstantForceField {
                effect_name,
                direction,
                magnitude,
            } => scene.add_world_effect(
                &effect_name,
                WorldEffect::ConstantForceField {
                    direction,
                    magnitude,
                },
            ),
            Message::HapticsViscosityField {
                effect_name,
                matrix,
            } => scene.add_world_effect(&effect_name, WorldEffect::ViscosityField { matrix }),
            Message::HapticsFreezeEffect { effect_name } => {
                scene.add_world_effect(&effect_name, WorldEffect::Freeze);
            }
            Message::HapticsRemoveWorldEffect { effect_name } => {
                if self.effect_exists(&effect_name) {
                    scene.remove_world_effect(&effect_name);
                }
            }

            Message::GraphicsSetEnabled { name, enabled } => {
                if self.object_exists(&name) {
                    scene.set_visual_enabled(&name, enabled);
                }
            }
            Message::GraphicsChangeBgColor { rgb } => scene.set_background_color(rgb),
            Message::GraphicsChangeObjectColor { name, color } => {
                if self.object_exists(&name) {
                    scene.set_object_color(&name, color);
                }
            }
            Message::GraphicsPipe {
                name,
                height,
                inner_radius,
                outer_radius,
                num_sides,
                num_segments,
                position,
                rotation,
                color,
            } => scene.add_decoration(
                &name,
                Decoration::Pipe {
                    height,
                    inner_radius,
                    outer_radius,
                    num_sides,
                    num_segments,
                    position,
                    rotation,
                    color,
                },
            ),
            Message::GraphicsArrow {
                name,
                length,
                shaft_radius,
                tip_length,
                tip_radius,
                bidirectional,
                num_sides,
                direction,
                position,
                color,
            } => scene.add_decoration(
                &name,
                Decoration::Arrow {
                    length,
                    shaft_radius,
                    tip_length,
                    tip_radius,
                    bidirectional,
                    num_sides,
                    direction,
                    position,
                    color,
                },
            ),
            Message::GraphicsMovingDots {
                name,
                num_dots,
                coherence,
                direction,
                magnitude,
            } => scene.add_decoration(
                &name,
                Decoration::MovingDots {
                    num_dots,
                    coherence,
                    direction,
                    magnitude,
                },
            ),
            Message::GraphicsShapeBox {
                name,
                size,
                position,
                color,
            } => scene.add_decoration(
                &name,
                Decoration::Box {
                    size,
                    position,
                    color,
                },
            ),
            Message::GraphicsShapeSphere {
                name,
                radius,
                position,
                color,
            } => scene.add_decoration(
                &name,
                Decoration::Sphere {
                    radius,
                    position,
                    color,
                },
            ),
            Message::GraphicsShapeTorus {
                name,
                inner_radius,
                outer_radius,
            } => scene.add_decoration(
                &name,
                Decoration::Torus {
                    inner_radius,
                    outer_radius,
                },
            ),

            Message::Keypress { keyname } => scene.key_pressed(&keyname),
        }
    }
}
