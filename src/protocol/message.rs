//! # Message Catalogue
//!
//! Every command that crosses the wire between modules: session and trial
//! lifecycle markers, recording control, and scene-mutation commands for the
//! haptic/graphic engine.
//!
//! Each message has a fixed-layout binary payload whose length is a total
//! function of its [`MessageType`] tag; the layouts themselves live in
//! [`wire`](super::wire). The decoded representation carries the type tag in
//! the [`Message`] variant, while serial number and timestamp live in
//! [`Header`].

use crate::config::{FILE_NAME_LEN, NAME_LEN};

/// Fixed header present at the start of every packet.
///
/// Wire layout (little-endian, 16 bytes total):
/// byte 0..4 serial number, 4..6 type tag, 6..8 reserved, 8..16 timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Header {
    /// Broker-issued sequence number, globally ordered across producers
    pub serial_number: u32,
    /// Seconds since broker start, stamped by the producer
    pub timestamp: f64,
}

impl Header {
    /// Header size in bytes on the wire
    pub const SIZE: usize = 16;
}

/// Type tag carried at bytes 4..6 of every packet.
///
/// Tags are grouped by subsystem with gaps left for additions, so a new
/// tracking-task command does not renumber the haptics block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum MessageType {
    SessionStart = 1,
    SessionEnd = 2,
    TrialStart = 3,
    TrialEnd = 4,
    StartRecording = 5,
    StopRecording = 6,
    RemoveObject = 7,
    ResetWorld = 8,

    TrackingCreate = 10,
    TrackingDestroy = 11,
    TrackingStart = 12,
    TrackingStop = 13,
    TrackingSetVisual = 14,
    TrackingSetHaptic = 15,
    TrackingSetLambda = 16,

    PendulumCreate = 20,
    PendulumDestroy = 21,
    PendulumStart = 22,
    PendulumStop = 23,

    HapticsSetEnabled = 30,
    HapticsSetEnabledWorld = 31,
    HapticsSetStiffness = 32,
    HapticsBoundingPlane = 33,
    HapticsConstantForceField = 34,
    HapticsViscosityField = 35,
    HapticsFreezeEffect = 36,
    HapticsRemoveWorldEffect = 37,

    GraphicsSetEnabled = 40,
    GraphicsChangeBgColor = 41,
    GraphicsPipe = 42,
    GraphicsArrow = 43,
    GraphicsChangeObjectColor = 44,
    GraphicsMovingDots = 45,
    GraphicsShapeBox = 46,
    GraphicsShapeSphere = 47,
    GraphicsShapeTorus = 48,

    Keypress = 50,
}

impl MessageType {
    /// Map a raw wire tag to a known message type
    pub fn from_tag(tag: u16) -> Option<Self> {
        use MessageType::*;
        Some(match tag {
            1 => SessionStart,
            2 => SessionEnd,
            3 => TrialStart,
            4 => TrialEnd,
            5 => StartRecording,
            6 => StopRecording,
            7 => RemoveObject,
            8 => ResetWorld,
            10 => TrackingCreate,
            11 => TrackingDestroy,
            12 => TrackingStart,
            13 => TrackingStop,
            14 => TrackingSetVisual,
            15 => TrackingSetHaptic,
            16 => TrackingSetLambda,
            20 => PendulumCreate,
            21 => PendulumDestroy,
            22 => PendulumStart,
            23 => PendulumStop,
            30 => HapticsSetEnabled,
            31 => HapticsSetEnabledWorld,
            32 => HapticsSetStiffness,
            33 => HapticsBoundingPlane,
            34 => HapticsConstantForceField,
            35 => HapticsViscosityField,
            36 => HapticsFreezeEffect,
            37 => HapticsRemoveWorldEffect,
            40 => GraphicsSetEnabled,
            41 => GraphicsChangeBgColor,
            42 => GraphicsPipe,
            43 => GraphicsArrow,
            44 => GraphicsChangeObjectColor,
            45 => GraphicsMovingDots,
            46 => GraphicsShapeBox,
            47 => GraphicsShapeSphere,
            48 => GraphicsShapeTorus,
            50 => Keypress,
            _ => return None,
        })
    }

    /// Raw wire tag for this message type
    pub fn tag(self) -> u16 {
        self as u16
    }

    /// Exact payload length in bytes for this message type.
    ///
    /// Receivers use this to validate a buffer is long enough before any
    /// field is read; there is no length field on the wire.
    pub fn payload_len(self) -> usize {
        use MessageType::*;
        match self {
            SessionStart | SessionEnd | TrialStart | TrialEnd | StopRecording | ResetWorld => 0,
            StartRecording => FILE_NAME_LEN,
            RemoveObject => NAME_LEN,

            TrackingCreate => NAME_LEN + 8 + 8 + 1 + 1,
            TrackingDestroy | TrackingStart | TrackingStop => NAME_LEN,
            TrackingSetVisual | TrackingSetHaptic => NAME_LEN + 1,
            TrackingSetLambda => NAME_LEN + 8,

            PendulumCreate => NAME_LEN + 8 * 4,
            PendulumDestroy | PendulumStart | PendulumStop => NAME_LEN,

            HapticsSetEnabled | HapticsSetEnabledWorld => NAME_LEN + 1,
            HapticsSetStiffness => NAME_LEN + 8,
            HapticsBoundingPlane => 8 * 2,
            HapticsConstantForceField => NAME_LEN + 8 * 2,
            HapticsViscosityField => NAME_LEN + 8 * 9,
            HapticsFreezeEffect | HapticsRemoveWorldEffect => NAME_LEN,

            GraphicsSetEnabled => NAME_LEN + 1,
            GraphicsChangeBgColor => 4 * 3,
            GraphicsPipe => NAME_LEN + 8 * 3 + 4 * 2 + 8 * 3 + 8 * 9 + 4 * 4,
            GraphicsArrow => NAME_LEN + 8 * 4 + 1 + 4 + 8 * 3 + 8 * 3 + 4 * 4,
            GraphicsChangeObjectColor => NAME_LEN + 4 * 4,
            GraphicsMovingDots => NAME_LEN + 4 + 8 * 3,
            GraphicsShapeBox => NAME_LEN + 8 * 3 + 8 * 3 + 4 * 4,
            GraphicsShapeSphere => NAME_LEN + 8 + 8 * 3 + 4 * 4,
            GraphicsShapeTorus => NAME_LEN + 8 * 2,

            Keypress => NAME_LEN,
        }
    }
}

/// One decoded scene/trial command.
///
/// Name fields are plain `String`s here; the codec enforces the fixed
/// `NAME_LEN`/`FILE_NAME_LEN` byte capacity and NUL padding on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    SessionStart,
    SessionEnd,
    TrialStart,
    TrialEnd,
    StartRecording {
        filename: String,
    },
    StopRecording,
    RemoveObject {
        name: String,
    },
    ResetWorld,

    TrackingCreate {
        name: String,
        lambda: f64,
        force_magnitude: f64,
        vision: bool,
        haptic: bool,
    },
    TrackingDestroy {
        name: String,
    },
    TrackingStart {
        name: String,
    },
    TrackingStop {
        name: String,
    },
    TrackingSetVisual {
        name: String,
        enabled: bool,
    },
    TrackingSetHaptic {
        name: String,
        enabled: bool,
    },
    TrackingSetLambda {
        name: String,
        lambda: f64,
    },

    PendulumCreate {
        name: String,
        escape_angle: f64,
        pendulum_length: f64,
        ball_mass: f64,
        cart_mass: f64,
    },
    PendulumDestroy {
        name: String,
    },
    PendulumStart {
        name: String,
    },
    PendulumStop {
        name: String,
    },

    HapticsSetEnabled {
        name: String,
        enabled: bool,
    },
    HapticsSetEnabledWorld {
        effect_name: String,
        enabled: bool,
    },
    HapticsSetStiffness {
        name: String,
        stiffness: f64,
    },
    HapticsBoundingPlane {
        width: f64,
        height: f64,
    },
    HapticsConstantForceField {
        effect_name: String,
        direction: f64,
        magnitude: f64,
    },
    HapticsViscosityField {
        effect_name: String,
        matrix: [f64; 9],
    },
    HapticsFreezeEffect {
        effect_name: String,
    },
    HapticsRemoveWorldEffect {
        effect_name: String,
    },

    GraphicsSetEnabled {
        name: String,
        enabled: bool,
    },
    GraphicsChangeBgColor {
        rgb: [f32; 3],
    },
    GraphicsPipe {
        name: String,
        height: f64,
        inner_radius: f64,
        outer_radius: f64,
        num_sides: u32,
        num_segments: u32,
        position: [f64; 3],
        rotation: [f64; 9],
        color: [f32; 4],
    },
    GraphicsArrow {
        name: String,
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
    GraphicsChangeObjectColor {
        name: String,
        color: [f32; 4],
    },
    GraphicsMovingDots {
        name: String,
        num_dots: u32,
        coherence: f64,
        direction: f64,
        magnitude: f64,
    },
    GraphicsShapeBox {
        name: String,
        size: [f64; 3],
        position: [f64; 3],
        color: [f32; 4],
    },
    GraphicsShapeSphere {
        name: String,
        radius: f64,
        position: [f64; 3],
        color: [f32; 4],
    },
    GraphicsShapeTorus {
        name: String,
        inner_radius: f64,
        outer_radius: f64,
    },

    /// Key event published by the display module for trial-control logic
    Keypress {
        keyname: String,
    },
}

impl Message {
    /// Wire type tag for this message
    pub fn message_type(&self) -> MessageType {
        use Message::*;
        match self {
            SessionStart => MessageType::SessionStart,
            SessionEnd => MessageType::SessionEnd,
            TrialStart => MessageType::TrialStart,
            TrialEnd => MessageType::TrialEnd,
            StartRecording { .. } => MessageType::StartRecording,
            StopRecording => MessageType::StopRecording,
            RemoveObject { .. } => MessageType::RemoveObject,
            ResetWorld => MessageType::ResetWorld,
            TrackingCreate { .. } => MessageType::TrackingCreate,
            TrackingDestroy { .. } => MessageType::TrackingDestroy,
            TrackingStart { .. } => MessageType::TrackingStart,
            TrackingStop { .. } => MessageType::TrackingStop,
            TrackingSetVisual { .. } => MessageType::TrackingSetVisual,
            TrackingSetHaptic { .. } => MessageType::TrackingSetHaptic,
            TrackingSetLambda { .. } => MessageType::TrackingSetLambda,
            PendulumCreate { .. } => MessageType::PendulumCreate,
            PendulumDestroy { .. } => MessageType::PendulumDestroy,
            PendulumStart { .. } => MessageType::PendulumStart,
            PendulumStop { .. } => MessageType::PendulumStop,
            HapticsSetEnabled { .. } => MessageType::HapticsSetEnabled,
            HapticsSetEnabledWorld { .. } => MessageType::HapticsSetEnabledWorld,
            HapticsSetStiffness { .. } => MessageType::HapticsSetStiffness,
            HapticsBoundingPlane { .. } => MessageType::HapticsBoundingPlane,
            HapticsConstantForceField { .. } => MessageType::HapticsConstantForceField,
            HapticsViscosityField { .. } => MessageType::HapticsViscosityField,
            HapticsFreezeEffect { .. } => MessageType::HapticsFreezeEffect,
            HapticsRemoveWorldEffect { .. } => MessageType::HapticsRemoveWorldEffect,
            GraphicsSetEnabled { .. } => MessageType::GraphicsSetEnabled,
            GraphicsChangeBgColor { .. } => MessageType::GraphicsChangeBgColor,
            GraphicsPipe { .. } => MessageType::GraphicsPipe,
            GraphicsArrow { .. } => MessageType::GraphicsArrow,
            GraphicsChangeObjectColor { .. } => MessageType::GraphicsChangeObjectColor,
            GraphicsMovingDots { .. } => MessageType::GraphicsMovingDots,
            GraphicsShapeBox { .. } => MessageType::GraphicsShapeBox,
            GraphicsShapeSphere { .. } => MessageType::GraphicsShapeSphere,
            GraphicsShapeTorus { .. } => MessageType::GraphicsShapeTorus,
            Keypress { .. } => MessageType::Keypress,
        }
    }
}

/// One decoded datagram: header plus command
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub header: Header,
    pub message: Message,
}
