#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Dispatcher routing: each message invokes exactly one scene operation,
//! missing objects are skipped, unknown tags are counted and dropped.

use std::sync::{Arc, Mutex};

use rignet::error::ProtocolError;
use rignet::protocol::wire::encode;
use rignet::protocol::{Dispatcher, Header, Message};
use rignet::scene::{Decoration, DynamicObject, SceneControl, WorldEffect};

/// Records every call, and reports objects/effects as present only when
/// their names were registered first.
#[derive(Default)]
struct RecordingScene {
    calls: Mutex<Vec<String>>,
    objects: Mutex<Vec<String>>,
    effects: Mutex<Vec<String>>,
}

impl RecordingScene {
    fn log(&self, entry: impl Into<String>) {
        self.calls.lock().unwrap().push(entry.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl SceneControl for RecordingScene {
    fn session_start(&self) {
        self.log("session_start");
    }
    fn session_end(&self) {
        self.log("session_end");
    }
    fn trial_start(&self) {
        self.log("trial_start");
    }
    fn trial_end(&self) {
        self.log("trial_end");
    }

    fn begin_recording(&self, filename: &str) {
        self.log(format!("begin_recording {filename}"));
    }
    fn end_recording(&self) {
        self.log("end_recording");
    }

    fn contains_object(&self, name: &str) -> bool {
        self.objects.lock().unwrap().iter().any(|n| n == name)
    }
    fn contains_effect(&self, name: &str) -> bool {
        self.effects.lock().unwrap().iter().any(|n| n == name)
    }

    fn create_dynamic_object(&self, name: &str, object: DynamicObject) {
        self.objects.lock().unwrap().push(name.to_owned());
        self.log(format!("create {name} {object:?}"));
    }
    fn destroy_object(&self, name: &str) {
        self.objects.lock().unwrap().retain(|n| n != name);
        self.log(format!("destroy {name}"));
    }
    fn start_object(&self, name: &str) {
        self.log(format!("start {name}"));
    }
    fn stop_object(&self, name: &str) {
        self.log(format!("stop {name}"));
    }
    fn reset_world(&self) {
        self.objects.lock().unwrap().clear();
        self.effects.lock().unwrap().clear();
        self.log("reset_world");
    }

    fn set_visual_enabled(&self, name: &str, enabled: bool) {
        self.log(format!("visual {name} {enabled}"));
    }
    fn set_haptic_enabled(&self, name: &str, enabled: bool) {
        self.log(format!("haptic {name} {enabled}"));
    }
    fn set_stiffness(&self, name: &str, stiffness: f64) {
        self.log(format!("stiffness {name} {stiffness}"));
    }
    fn set_gain(&self, name: &str, gain: f64) {
        self.log(format!("gain {name} {gain}"));
    }

    fn add_world_effect(&self, name: &str, effect: WorldEffect) {
        self.effects.lock().unwrap().push(name.to_owned());
        self.log(format!("add_effect {name} {effect:?}"));
    }
    fn remove_world_effect(&self, name: &str) {
        self.effects.lock().unwrap().retain(|n| n != name);
        self.log(format!("remove_effect {name}"));
    }
    fn set_world_effect_enabled(&self, name: &str, enabled: bool) {
        self.log(format!("effect_enabled {name} {enabled}"));
    }
    fn add_bounding_plane(&self, width: f64, height: f64) {
        self.log(format!("bounding_plane {width} {height}"));
    }

    fn add_decoration(&self, name: &str, _decoration: Decoration) {
        self.objects.lock().unwrap().push(name.to_owned());
        self.log(format!("decoration {name}"));
    }
    fn set_background_color(&self, rgb: [f32; 3]) {
        self.log(format!("bg_color {rgb:?}"));
    }
    fn set_object_color(&self, name: &str, _rgba: [f32; 4]) {
        self.log(format!("color {name}"));
    }
    fn key_pressed(&self, keyname: &str) {
        self.log(format!("key {keyname}"));
    }
}

fn packet(msg: &Message) -> Vec<u8> {
    encode(
        Header {
            serial_number: 1,
            timestamp: 0.0,
        },
        msg,
    )
    .unwrap()
    .to_vec()
}

fn dispatcher() -> (Dispatcher<RecordingScene>, Arc<RecordingScene>) {
    let scene = Arc::new(RecordingScene::default());
    (Dispatcher::new(Arc::clone(&scene)), scene)
}

#[test]
fn lifecycle_markers_route_directly() {
    let (dispatcher, scene) = dispatcher();
    for msg in [
        Message::SessionStart,
        Message::TrialStart,
        Message::TrialEnd,
        Message::SessionEnd,
    ] {
        dispatcher.dispatch(&packet(&msg)).unwrap();
    }
    assert_eq!(
        scene.calls(),
        vec!["session_start", "trial_start", "trial_end", "session_end"]
    );
}

#[test]
fn recording_commands_carry_the_filename() {
    let (dispatcher, scene) = dispatcher();
    dispatcher
        .dispatch(&packet(&Message::StartRecording {
            filename: "trial_07.bin".into(),
        }))
        .unwrap();
    dispatcher.dispatch(&packet(&Message::StopRecording)).unwrap();
    assert_eq!(scene.calls(), vec!["begin_recording trial_07.bin", "end_recording"]);
}

#[test]
fn create_then_start_reaches_the_scene() {
    let (dispatcher, scene) = dispatcher();
    dispatcher
        .dispatch(&packet(&Message::TrackingCreate {
            name: "cst".into(),
            lambda: 1.0,
            force_magnitude: 2.0,
            vision: true,
            haptic: true,
        }))
        .unwrap();
    dispatcher
        .dispatch(&packet(&Message::TrackingStart { name: "cst".into() }))
        .unwrap();

    let calls = scene.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].starts_with("create cst"));
    assert_eq!(calls[1], "start cst");
}

#[test]
fn commands_on_missing_objects_are_skipped() {
    let (dispatcher, scene) = dispatcher();
    for msg in [
        Message::TrackingStart {
            name: "ghost".into(),
        },
        Message::RemoveObject {
            name: "ghost".into(),
        },
        Message::HapticsSetStiffness {
            name: "ghost".into(),
            stiffness: 100.0,
        },
        Message::GraphicsSetEnabled {
            name: "ghost".into(),
            enabled: true,
        },
        Message::GraphicsChangeObjectColor {
            name: "ghost".into(),
            color: [1.0; 4],
        },
    ] {
        dispatcher.dispatch(&packet(&msg)).unwrap();
    }
    assert!(scene.calls().is_empty());
}

#[test]
fn effect_commands_check_the_effect_registry() {
    let (dispatcher, scene) = dispatcher();

    // Removing an unknown effect is skipped.
    dispatcher
        .dispatch(&packet(&Message::HapticsRemoveWorldEffect {
            effect_name: "drag".into(),
        }))
        .unwrap();
    assert!(scene.calls().is_empty());

    // Once created, enable and remove go through.
    dispatcher
        .dispatch(&packet(&Message::HapticsViscosityField {
            effect_name: "drag".into(),
            matrix: [0.0; 9],
        }))
        .unwrap();
    dispatcher
        .dispatch(&packet(&Message::HapticsSetEnabledWorld {
            effect_name: "drag".into(),
            enabled: false,
        }))
        .unwrap();
    dispatcher
        .dispatch(&packet(&Message::HapticsRemoveWorldEffect {
            effect_name: "drag".into(),
        }))
        .unwrap();

    let calls = scene.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1], "effect_enabled drag false");
    assert_eq!(calls[2], "remove_effect drag");
}

#[test]
fn keypress_events_reach_the_input_hook() {
    let (dispatcher, scene) = dispatcher();
    dispatcher
        .dispatch(&packet(&Message::Keypress {
            keyname: "escape".into(),
        }))
        .unwrap();
    assert_eq!(scene.calls(), vec!["key escape"]);
    assert_eq!(dispatcher.unknown_messages(), 0);
}

#[test]
fn unknown_tags_are_counted_not_errors() {
    let (dispatcher, scene) = dispatcher();

    let mut datagram = packet(&Message::SessionStart);
    datagram[4..6].copy_from_slice(&777u16.to_le_bytes());

    assert!(dispatcher.dispatch(&datagram).is_ok());
    assert!(dispatcher.dispatch(&datagram).is_ok());
    assert_eq!(dispatcher.unknown_messages(), 2);
    assert!(scene.calls().is_empty());
}

#[test]
fn malformed_datagrams_are_reported_as_errors() {
    let (dispatcher, scene) = dispatcher();
    let err = dispatcher.dispatch(&[0u8; 4]).unwrap_err();
    assert!(matches!(err, ProtocolError::Truncated { .. }));
    assert!(scene.calls().is_empty());
    assert_eq!(dispatcher.unknown_messages(), 0);
}

#[test]
fn dispatch_is_stateless_across_packets() {
    let (dispatcher, scene) = dispatcher();

    // A decode failure in between must not affect the next packet.
    dispatcher.dispatch(&packet(&Message::TrialStart)).unwrap();
    let _ = dispatcher.dispatch(&[1, 2, 3]);
    dispatcher.dispatch(&packet(&Message::TrialEnd)).unwrap();

    assert_eq!(scene.calls(), vec!["trial_start", "trial_end"]);
}
