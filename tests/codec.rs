#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Wire codec coverage across the full message catalogue:
//! round-trips, truncation handling, and name-field bounds.

use rignet::config::{MAX_PACKET_LENGTH, NAME_LEN};
use rignet::error::ProtocolError;
use rignet::protocol::wire::{decode, encode};
use rignet::protocol::{Header, Message, MessageType};

fn header() -> Header {
    Header {
        serial_number: 42,
        timestamp: 3.5,
    }
}

/// One representative value per message type
fn sample_messages() -> Vec<Message> {
    vec![
        Message::SessionStart,
        Message::SessionEnd,
        Message::TrialStart,
        Message::TrialEnd,
        Message::StartRecording {
            filename: "session_01.bin".into(),
        },
        Message::StopRecording,
        Message::RemoveObject {
            name: "cursor".into(),
        },
        Message::ResetWorld,
        Message::TrackingCreate {
            name: "cst".into(),
            lambda: 1.2,
            force_magnitude: 3.0,
            vision: true,
            haptic: true,
        },
        Message::TrackingDestroy { name: "cst".into() },
        Message::TrackingStart { name: "cst".into() },
        Message::TrackingStop { name: "cst".into() },
        Message::TrackingSetVisual {
            name: "cst".into(),
            enabled: false,
        },
        Message::TrackingSetHaptic {
            name: "cst".into(),
            enabled: true,
        },
        Message::TrackingSetLambda {
            name: "cst".into(),
            lambda: 0.95,
        },
        Message::PendulumCreate {
            name: "cup".into(),
            escape_angle: 0.6,
            pendulum_length: 0.25,
            ball_mass: 0.1,
            cart_mass: 1.0,
        },
        Message::PendulumDestroy { name: "cup".into() },
        Message::PendulumStart { name: "cup".into() },
        Message::PendulumStop { name: "cup".into() },
        Message::HapticsSetEnabled {
            name: "cursor".into(),
            enabled: true,
        },
        Message::HapticsSetEnabledWorld {
            effect_name: "drag".into(),
            enabled: false,
        },
        Message::HapticsSetStiffness {
            name: "wall".into(),
            stiffness: 400.0,
        },
        Message::HapticsBoundingPlane {
            width: 0.4,
            height: 0.3,
        },
        Message::HapticsConstantForceField {
            effect_name: "bias".into(),
            direction: 1.57,
            magnitude: 2.0,
        },
        Message::HapticsViscosityField {
            effect_name: "drag".into(),
            matrix: [5.0, 0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0, 5.0],
        },
        Message::HapticsFreezeEffect {
            effect_name: "hold".into(),
        },
        Message::HapticsRemoveWorldEffect {
            effect_name: "drag".into(),
        },
        Message::GraphicsSetEnabled {
            name: "cursor".into(),
            enabled: false,
        },
        Message::GraphicsChangeBgColor {
            rgb: [0.1, 0.1, 0.15],
        },
        Message::GraphicsPipe {
            name: "tube".into(),
            height: 0.3,
            inner_radius: 0.05,
            outer_radius: 0.06,
            num_sides: 32,
            num_segments: 4,
            position: [0.0, 0.0, 0.1],
            rotation: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            color: [0.8, 0.8, 0.8, 1.0],
        },
        Message::GraphicsArrow {
            name: "force_vec".into(),
            length: 0.1,
            shaft_radius: 0.005,
            tip_length: 0.02,
            tip_radius: 0.01,
            bidirectional: false,
            num_sides: 16,
            direction: [0.0, 1.0, 0.0],
            position: [0.05, 0.0, 0.0],
            color: [1.0, 0.0, 0.0, 1.0],
        },
        Message::GraphicsChangeObjectColor {
            name: "cursor".into(),
            color: [0.0, 1.0, 0.0, 0.5],
        },
        Message::GraphicsMovingDots {
            name: "dots".into(),
            num_dots: 200,
            coherence: 0.7,
            direction: 0.0,
            magnitude: 1.5,
        },
        Message::GraphicsShapeBox {
            name: "target".into(),
            size: [0.02, 0.02, 0.02],
            position: [0.0, 0.1, 0.0],
            color: [0.0, 0.0, 1.0, 1.0],
        },
        Message::GraphicsShapeSphere {
            name: "marker".into(),
            radius: 0.01,
            position: [0.0, -0.1, 0.0],
            color: [1.0, 1.0, 0.0, 1.0],
        },
        Message::GraphicsShapeTorus {
            name: "ring".into(),
            inner_radius: 0.01,
            outer_radius: 0.05,
        },
        Message::Keypress {
            keyname: "space".into(),
        },
    ]
}

#[test]
fn sample_covers_every_message_type() {
    let mut seen: Vec<MessageType> = sample_messages()
        .iter()
        .map(|m| m.message_type())
        .collect();
    seen.sort_by_key(|ty| ty.tag());
    seen.dedup();

    let mut all: Vec<MessageType> = (0..u16::MAX).filter_map(MessageType::from_tag).collect();
    all.sort_by_key(|ty| ty.tag());
    assert_eq!(seen, all);
}

#[test]
fn round_trip_every_message_type() {
    for msg in sample_messages() {
        let buf = encode(header(), &msg).unwrap();
        assert_eq!(
            buf.len(),
            Header::SIZE + msg.message_type().payload_len(),
            "{:?}",
            msg.message_type()
        );
        assert!(buf.len() <= MAX_PACKET_LENGTH);

        let packet = decode(&buf).unwrap();
        assert_eq!(packet.header, header());
        assert_eq!(packet.message, msg, "{:?}", msg.message_type());
    }
}

#[test]
fn truncated_buffers_fail_without_out_of_bounds_access() {
    for msg in sample_messages() {
        let buf = encode(header(), &msg).unwrap();
        for cut in 0..buf.len() {
            let err = decode(&buf[..cut]).unwrap_err();
            assert!(
                matches!(err, ProtocolError::Truncated { .. }),
                "{:?} at {cut}: {err:?}",
                msg.message_type()
            );
        }
    }
}

#[test]
fn name_at_exact_capacity_is_rejected_on_encode() {
    let msg = Message::TrackingStart {
        name: "n".repeat(NAME_LEN),
    };
    assert!(matches!(
        encode(header(), &msg),
        Err(ProtocolError::NameTooLong(_))
    ));
}

#[test]
fn serial_and_timestamp_survive_the_wire() {
    let h = Header {
        serial_number: u32::MAX,
        timestamp: 12345.6789,
    };
    let buf = encode(h, &Message::TrialEnd).unwrap();
    let packet = decode(&buf).unwrap();
    assert_eq!(packet.header.serial_number, u32::MAX);
    assert_eq!(packet.header.timestamp, 12345.6789);
}
