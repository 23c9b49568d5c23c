//! # Wire Codec
//!
//! Fixed-layout binary encode/decode for every message in the catalogue.
//!
//! The wire format is little-endian with fixed field offsets, defined here
//! field by field rather than by any host struct layout. There is no length
//! field and no checksum: a receiver learns the payload length from the type
//! tag alone, so decode validates the buffer against that declared length
//! before reading a single field. A buffer shorter than the header, or
//! shorter than the tag's declared payload, fails with
//! [`ProtocolError::Truncated`] and never reads out of bounds.
//!
//! Name and filename fields are fixed-capacity NUL-padded byte arrays.
//! Decoded strings are bounded by the first NUL and validated as UTF-8;
//! wire bytes are never trusted verbatim. A name that fills its field with
//! no terminator is rejected.

use bytes::{Buf, BufMut, BytesMut};

use crate::config::{FILE_NAME_LEN, MAX_PACKET_LENGTH, NAME_LEN};
use crate::error::{ProtocolError, Result};
use crate::protocol::message::{Header, Message, MessageType, Packet};

/// Encode a packet into a fresh buffer.
///
/// The output is exactly `Header::SIZE + payload_len(tag)` bytes. Fails if
/// a name or filename exceeds its fixed wire capacity.
pub fn encode(header: Header, message: &Message) -> Result<BytesMut> {
    let ty = message.message_type();
    let total = Header::SIZE + ty.payload_len();
    debug_assert!(total <= MAX_PACKET_LENGTH);

    let mut buf = BytesMut::with_capacity(total);
    buf.put_u32_le(header.serial_number);
    buf.put_u16_le(ty.tag());
    buf.put_bytes(0, 2); // reserved
    buf.put_f64_le(header.timestamp);

    encode_payload(&mut buf, message)?;
    debug_assert_eq!(buf.len(), total);
    Ok(buf)
}

/// Decode one datagram.
///
/// Trailing bytes beyond the tag's declared payload length are ignored, as
/// the format carries no explicit framing length.
pub fn decode(buf: &[u8]) -> Result<Packet> {
    if buf.len() < Header::SIZE {
        return Err(ProtocolError::Truncated {
            needed: Header::SIZE,
            got: buf.len(),
        });
    }

    let mut head = &buf[..Header::SIZE];
    let serial_number = head.get_u32_le();
    let tag = head.get_u16_le();
    let ty = MessageType::from_tag(tag).ok_or(ProtocolError::UnknownMessageType(tag))?;
    head.advance(2); // reserved
    let timestamp = head.get_f64_le();

    let needed = Header::SIZE + ty.payload_len();
    if buf.len() < needed {
        return Err(ProtocolError::Truncated {
            needed,
            got: buf.len(),
        });
    }

    let mut body = &buf[Header::SIZE..needed];
    let message = decode_payload(ty, &mut body)?;

    Ok(Packet {
        header: Header {
            serial_number,
            timestamp,
        },
        message,
    })
}

/// Write a string into a fixed-capacity NUL-padded field.
///
/// The field always ends with at least one NUL, matching what the
/// collaborator layer expects from C-style name fields.
fn put_name(buf: &mut BytesMut, name: &str, cap: usize) -> Result<()> {
    let bytes = name.as_bytes();
    if bytes.len() >= cap {
        return Err(ProtocolError::NameTooLong(bytes.len()));
    }
    buf.put_slice(bytes);
    buf.put_bytes(0, cap - bytes.len());
    Ok(())
}

/// Read a string out of a fixed-capacity field, bounded by the first NUL
fn get_name(buf: &mut &[u8], cap: usize) -> Result<String> {
    let field = &buf[..cap];
    let end = field
        .iter()
        .position(|&b| b == 0)
        .ok_or(ProtocolError::InvalidName)?;
    let name = std::str::from_utf8(&field[..end])
        .map_err(|_| ProtocolError::InvalidName)?
        .to_owned();
    buf.advance(cap);
    Ok(name)
}

fn put_bool(buf: &mut BytesMut, v: bool) {
    buf.put_u8(u8::from(v));
}

fn get_bool(buf: &mut &[u8]) -> bool {
    buf.get_u8() != 0
}

fn put_f64x3(buf: &mut BytesMut, v: &[f64; 3]) {
    for x in v {
        buf.put_f64_le(*x);
    }
}

fn get_f64x3(buf: &mut &[u8]) -> [f64; 3] {
    [buf.get_f64_le(), buf.get_f64_le(), buf.get_f64_le()]
}

fn put_f64x9(buf: &mut BytesMut, v: &[f64; 9]) {
    for x in v {
        buf.put_f64_le(*x);
    }
}

fn get_f64x9(buf: &mut &[u8]) -> [f64; 9] {
    let mut out = [0.0; 9];
    for slot in &mut out {
        *slot = buf.get_f64_le();
    }
    out
}

fn put_rgba(buf: &mut BytesMut, v: &[f32; 4]) {
    for x in v {
        buf.put_f32_le(*x);
    }
}

fn get_rgba(buf: &mut &[u8]) -> [f32; 4] {
    [
        buf.get_f32_le(),
        buf.get_f32_le(),
        buf.get_f32_le(),
        buf.get_f32_le(),
    ]
}

fn encode_payload(buf: &mut BytesMut, message: &Message) -> Result<()> {
    use Message::*;
    match message {
        SessionStart | SessionEnd | TrialStart | TrialEnd | StopRecording | ResetWorld => {}

        StartRecording { filename } => put_name(buf, filename, FILE_NAME_LEN)?,
        RemoveObject { name } => put_name(buf, name, NAME_LEN)?,

        TrackingCreate {
            name,
            lambda,
            force_magnitude,
            vision,
            haptic,
        } => {
            put_name(buf, name, NAME_LEN)?;
            buf.put_f64_le(*lambda);
            buf.put_f64_le(*force_magnitude);
            put_bool(buf, *vision);
            put_bool(buf, *haptic);
        }
        TrackingDestroy { name } | TrackingStart { name } | TrackingStop { name } => {
            put_name(buf, name, NAME_LEN)?;
        }
        TrackingSetVisual { name, enabled } | TrackingSetHaptic { name, enabled } => {
            put_name(buf, name, NAME_LEN)?;
            put_bool(buf, *enabled);
        }
        TrackingSetLambda { name, lambda } => {
            put_name(buf, name, NAME_LEN)?;
            buf.put_f64_le(*lambda);
        }

        PendulumCreate {
            name,
            escape_angle,
            pendulum_length,
            ball_mass,
            cart_mass,
        } => {
            put_name(buf, name, NAME_LEN)?;
            buf.put_f64_le(*escape_angle);
            buf.put_f64_le(*pendulum_length);
            buf.put_f64_le(*ball_mass);
            buf.put_f64_le(*cart_mass);
        }
        PendulumDestroy { name } | PendulumStart { name } | PendulumStop { name } => {
            put_name(buf, name, NAME_LEN)?;
        }

        HapticsSetEnabled { name, enabled } => {
            put_name(buf, name, NAME_LEN)?;
            put_bool(buf, *enabled);
        }
        HapticsSetEnabledWorld {
            effect_name,
            enabled,
        } => {
            put_name(buf, effect_name, NAME_LEN)?;
            put_bool(buf, *enabled);
        }
        HapticsSetStiffness { name, stiffness } => {
            put_name(buf, name, NAME_LEN)?;
            buf.put_f64_le(*stiffness);
        }
        HapticsBoundingPlane { width, height } => {
            buf.put_f64_le(*width);
            buf.put_f64_le(*height);
        }
        HapticsConstantForceField {
            effect_name,
            direction,
            magnitude,
        } => {
            put_name(buf, effect_name, NAME_LEN)?;
            buf.put_f64_le(*direction);
            buf.put_f64_le(*magnitude);
        }
        HapticsViscosityField {
            effect_name,
            matrix,
        } => {
            put_name(buf, effect_name, NAME_LEN)?;
            put_f64x9(buf, matrix);
        }
        HapticsFreezeEffect { effect_name } | HapticsRemoveWorldEffect { effect_name } => {
            put_name(buf, effect_name, NAME_LEN)?;
        }

        GraphicsSetEnabled { name, enabled } => {
            put_name(buf, name, NAME_LEN)?;
            put_bool(buf, *enabled);
        }
        GraphicsChangeBgColor { rgb } => {
            for x in rgb {
                buf.put_f32_le(*x);
            }
        }
        GraphicsPipe {
            name,
            height,
            inner_radius,
            outer_radius,
            num_sides,
            num_segments,
            position,
            rotation,
            color,
        } => {
            put_name(buf, name, NAME_LEN)?;
            buf.put_f64_le(*height);
            buf.put_f64_le(*inner_radius);
            buf.put_f64_le(*outer_radius);
            buf.put_u32_le(*num_sides);
            buf.put_u32_le(*num_segments);
            put_f64x3(buf, position);
            put_f64x9(buf, rotation);
            put_rgba(buf, color);
        }
        GraphicsArrow {
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
        } => {
            put_name(buf, name, NAME_LEN)?;
            buf.put_f64_le(*length);
            buf.put_f64_le(*shaft_radius);
            buf.put_f64_le(*tip_length);
            buf.put_f64_le(*tip_radius);
            put_bool(buf, *bidirectional);
            buf.put_u32_le(*num_sides);
            put_f64x3(buf, direction);
            put_f64x3(buf, position);
            put_rgba(buf, color);
        }
        GraphicsChangeObjectColor { name, color } => {
            put_name(buf, name, NAME_LEN)?;
            put_rgba(buf, color);
        }
        GraphicsMovingDots {
            name,
            num_dots,
            coherence,
            direction,
            magnitude,
        } => {
            put_name(buf, name, NAME_LEN)?;
            buf.put_u32_le(*num_dots);
            buf.put_f64_le(*coherence);
            buf.put_f64_le(*direction);
            buf.put_f64_le(*magnitude);
        }
        GraphicsShapeBox {
            name,
            size,
            position,
            color,
        } => {
            put_name(buf, name, NAME_LEN)?;
            put_f64x3(buf, size);
            put_f64x3(buf, position);
            put_rgba(buf, color);
        }
        GraphicsShapeSphere {
            name,
            radius,
            position,
            color,
        } => {
            put_name(buf, name, NAME_LEN)?;
            buf.put_f64_le(*radius);
            put_f64x3(buf, position);
            put_rgba(buf, color);
        }
        GraphicsShapeTorus {
            name,
            inner_radius,
            outer_radius,
        } => {
            put_name(buf, name, NAME_LEN)?;
            buf.put_f64_le(*inner_radius);
            buf.put_f64_le(*outer_radius);
        }

        Keypress { keyname } => put_name(buf, keyname, NAME_LEN)?,
    }
    Ok(())
}

fn decode_payload(ty: MessageType, buf: &mut &[u8]) -> Result<Message> {
    let message = match ty {
        MessageType::SessionStart => Message::SessionStart,
        MessageType::SessionEnd => Message::SessionEnd,
        MessageType::TrialStart => Message::TrialStart,
        MessageType::TrialEnd => Message::TrialEnd,
        MessageType::StopRecording => Message::StopRecording,
        MessageType::ResetWorld => Message::ResetWorld,

        MessageType::StartRecording => Message::StartRecording {
            filename: get_name(buf, FILE_NAME_LEN)?,
        },
        MessageType::RemoveObject => Message::RemoveObject {
            name: get_name(buf, NAME_LEN)?,
        },

        MessageType::TrackingCreate => Message::TrackingCreate {
            name: get_name(buf, NAME_LEN)?,
            lambda: buf.get_f64_le(),
            force_magnitude: buf.get_f64_le(),
            vision: get_bool(buf),
            haptic: get_bool(buf),
        },
        MessageType::TrackingDestroy => Message::TrackingDestroy {
            name: get_name(buf, NAME_LEN)?,
        },
        MessageType::TrackingStart => Message::TrackingStart {
            name: get_name(buf, NAME_LEN)?,
        },
        MessageType::TrackingStop => Message::TrackingStop {
            name: get_name(buf, NAME_LEN)?,
        },
        MessageType::TrackingSetVisual => Message::TrackingSetVisual {
            name: get_name(buf, NAME_LEN)?,
            enabled: get_bool(buf),
        },
        MessageType::TrackingSetHaptic => Message::TrackingSetHaptic {
            name: get_name(buf, NAME_LEN)?,
            enabled: get_bool(buf),
        },
        MessageType::TrackingSetLambda => Message::TrackingSetLambda {
            name: get_name(buf, NAME_LEN)?,
            lambda: buf.get_f64_le(),
        },

        MessageType::PendulumCreate => Message::PendulumCreate {
            name: get_name(buf, NAME_LEN)?,
            escape_angle: buf.get_f64_le(),
            pendulum_length: buf.get_f64_le(),
            ball_mass: buf.get_f64_le(),
            cart_mass: buf.get_f64_le(),
        },
        MessageType::PendulumDestroy => Message::PendulumDestroy {
            name: get_name(buf, NAME_LEN)?,
        },
        MessageType::PendulumStart => Message::PendulumStart {
            name: get_name(buf, NAME_LEN)?,
        },
        MessageType::PendulumStop => Message::PendulumStop {
            name: get_name(buf, NAME_LEN)?,
        },

        MessageType::HapticsSetEnabled => Message::HapticsSetEnabled {
            name: get_name(buf, NAME_LEN)?,
            enabled: get_bool(buf),
        },
        MessageType::HapticsSetEnabledWorld => Message::HapticsSetEnabledWorld {
            effect_name: get_name(buf, NAME_LEN)?,
            enabled: get_bool(buf),
        },
        MessageType::HapticsSetStiffness => Message::HapticsSetStiffness {
            name: get_name(buf, NAME_LEN)?,
            stiffness: buf.get_f64_le(),
        },
        MessageType::HapticsBoundingPlane => Message::HapticsBoundingPlane {
            width: buf.get_f64_le(),
            height: buf.get_f64_le(),
        },
        MessageType::HapticsConstantForceField => Message::HapticsConstantForceField {
            effect_name: get_name(buf, NAME_LEN)?,
            direction: buf.get_f64_le(),
            magnitude: buf.get_f64_le(),
        },
        MessageType::HapticsViscosityField => Message::HapticsViscosityField {
            effect_name: get_name(buf, NAME_LEN)?,
            matrix: get_f64x9(buf),
        },
        MessageType::HapticsFreezeEffect => Message::HapticsFreezeEffect {
            effect_name: get_name(buf, NAME_LEN)?,
        },
        MessageType::HapticsRemoveWorldEffect => Message::HapticsRemoveWorldEffect {
            effect_name: get_name(buf, NAME_LEN)?,
        },

        MessageType::GraphicsSetEnabled => Message::GraphicsSetEnabled {
            name: get_name(buf, NAME_LEN)?,
            enabled: get_bool(buf),
        },
        MessageType::GraphicsChangeBgColor => Message::GraphicsChangeBgColor {
            rgb: [buf.get_f32_le(), buf.get_f32_le(), buf.get_f32_le()],
        },
        MessageType::GraphicsPipe => Message::GraphicsPipe {
            name: get_name(buf, NAME_LEN)?,
            height: buf.get_f64_le(),
            inner_radius: buf.get_f64_le(),
            outer_radius: buf.get_f64_le(),
            num_sides: buf.get_u32_le(),
            num_segments: buf.get_u32_le(),
            position: get_f64x3(buf),
            rotation: get_f64x9(buf),
            color: get_rgba(buf),
        },
        MessageType::GraphicsArrow => Message::GraphicsArrow {
            name: get_name(buf, NAME_LEN)?,
            length: buf.get_f64_le(),
            shaft_radius: buf.get_f64_le(),
            tip_length: buf.get_f64_le(),
            tip_radius: buf.get_f64_le(),
            bidirectional: get_bool(buf),
            num_sides: buf.get_u32_le(),
            direction: get_f64x3(buf),
            position: get_f64x3(buf),
            color: get_rgba(buf),
        },
        MessageType::GraphicsChangeObjectColor => Message::GraphicsChangeObjectColor {
            name: get_name(buf, NAME_LEN)?,
            color: get_rgba(buf),
        },
        MessageType::GraphicsMovingDots => Message::GraphicsMovingDots {
            name: get_name(buf, NAME_LEN)?,
            num_dots: buf.get_u32_le(),
            coherence: buf.get_f64_le(),
            direction: buf.get_f64_le(),
            magnitude: buf.get_f64_le(),
        },
        MessageType::GraphicsShapeBox => Message::GraphicsShapeBox {
            name: get_name(buf, NAME_LEN)?,
            size: get_f64x3(buf),
            position: get_f64x3(buf),
            color: get_rgba(buf),
        },
        MessageType::GraphicsShapeSphere => Message::GraphicsShapeSphere {
            name: get_name(buf, NAME_LEN)?,
            radius: buf.get_f64_le(),
            position: get_f64x3(buf),
            color: get_rgba(buf),
        },
        MessageType::GraphicsShapeTorus => Message::GraphicsShapeTorus {
            name: get_name(buf, NAME_LEN)?,
            inner_radius: buf.get_f64_le(),
            outer_radius: buf.get_f64_le(),
        },

        MessageType::Keypress => Message::Keypress {
            keyname: get_name(buf, NAME_LEN)?,
        },
    };
    Ok(message)
}
