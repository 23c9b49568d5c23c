#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Listener loop over a real loopback socket: dispatch of well-formed
//! datagrams, survival of malformed ones, and prompt shutdown.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

use rignet::listener::Listener;
use rignet::protocol::wire::encode;
use rignet::protocol::{Header, Message};
use rignet::scene::{Decoration, DynamicObject, SceneControl, WorldEffect};

/// Minimal scene that only tracks lifecycle markers
#[derive(Default)]
struct MarkerScene {
    markers: Mutex<Vec<&'static str>>,
}

impl MarkerScene {
    fn markers(&self) -> Vec<&'static str> {
        self.markers.lock().unwrap().clone()
    }

    fn push(&self, marker: &'static str) {
        self.markers.lock().unwrap().push(marker);
    }
}

impl SceneControl for MarkerScene {
    fn session_start(&self) {
        self.push("session_start");
    }
    fn session_end(&self) {
        self.push("session_end");
    }
    fn trial_start(&self) {
        self.push("trial_start");
    }
    fn trial_end(&self) {
        self.push("trial_end");
    }

    fn begin_recording(&self, _filename: &str) {}
    fn end_recording(&self) {}

    fn contains_object(&self, _name: &str) -> bool {
        false
    }
    fn contains_effect(&self, _name: &str) -> bool {
        false
    }

    fn create_dynamic_object(&self, _name: &str, _object: DynamicObject) {}
    fn destroy_object(&self, _name: &str) {}
    fn start_object(&self, _name: &str) {}
    fn stop_object(&self, _name: &str) {}
    fn reset_world(&self) {
        self.push("reset_world");
    }

    fn set_visual_enabled(&self, _name: &str, _enabled: bool) {}
    fn set_haptic_enabled(&self, _name: &str, _enabled: bool) {}
    fn set_stiffness(&self, _name: &str, _stiffness: f64) {}
    fn set_gain(&self, _name: &str, _gain: f64) {}

    fn add_world_effect(&self, _name: &str, _effect: WorldEffect) {}
    fn remove_world_effect(&self, _name: &str) {}
    fn set_world_effect_enabled(&self, _name: &str, _enabled: bool) {}
    fn add_bounding_plane(&self, _width: f64, _height: f64) {}

    fn add_decoration(&self, _name: &str, _decoration: Decoration) {}
    fn set_background_color(&self, _rgb: [f32; 3]) {}
    fn set_object_color(&self, _name: &str, _rgba: [f32; 4]) {}
}

fn packet(msg: &Message) -> Vec<u8> {
    encode(
        Header {
            serial_number: 0,
            timestamp: 0.0,
        },
        msg,
    )
    .unwrap()
    .to_vec()
}

async fn wait_for<F: Fn() -> bool>(condition: F) {
    timeout(Duration::from_secs(2), async {
        while !condition() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn datagrams_reach_the_scene_in_arrival_order() {
    let scene = Arc::new(MarkerScene::default());
    let listener = Listener::bind("127.0.0.1:0".parse().unwrap(), Arc::clone(&scene))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    let task = tokio::spawn(listener.run(shutdown_rx));

    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    for msg in [Message::SessionStart, Message::TrialStart, Message::TrialEnd] {
        sender.send_to(&packet(&msg), addr).await.unwrap();
    }

    wait_for(|| scene.markers().len() == 3).await;
    assert_eq!(
        scene.markers(),
        vec!["session_start", "trial_start", "trial_end"]
    );

    shutdown_tx.send(()).await.unwrap();
    timeout(Duration::from_secs(2), task).await.unwrap().unwrap();
}

#[tokio::test]
async fn malformed_datagrams_do_not_stop_the_loop() {
    let scene = Arc::new(MarkerScene::default());
    let listener = Listener::bind("127.0.0.1:0".parse().unwrap(), Arc::clone(&scene))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    let task = tokio::spawn(listener.run(shutdown_rx));

    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    sender.send_to(&[1, 2, 3], addr).await.unwrap();
    sender.send_to(&packet(&Message::SessionStart), addr).await.unwrap();

    wait_for(|| scene.markers() == vec!["session_start"]).await;

    shutdown_tx.send(()).await.unwrap();
    timeout(Duration::from_secs(2), task).await.unwrap().unwrap();
}

#[tokio::test]
async fn shutdown_signal_ends_the_loop_promptly() {
    let scene = Arc::new(MarkerScene::default());
    let listener = Listener::bind("127.0.0.1:0".parse().unwrap(), Arc::clone(&scene))
        .await
        .unwrap();

    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    let task = tokio::spawn(listener.run(shutdown_rx));

    shutdown_tx.send(()).await.unwrap();
    timeout(Duration::from_secs(2), task)
        .await
        .expect("listener should exit after shutdown")
        .unwrap();
    assert!(scene.markers().is_empty());
}
