//! End-to-end tests wiring the registry, router, dispatcher and driver
//! together over an in-memory transport. No broker or backend needed.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};
use tokio::sync::mpsc;

use homesim_app::ports::{DeviceSource, Transport};
use homesim_app::protocol::{InboundMessage, OutboundMessage, SenderId};
use homesim_app::router::{Outcome, Router};
use homesim_app::services::dispatcher::Dispatcher;
use homesim_app::services::driver::SimulationDriver;
use homesim_app::services::loader::DeviceLoader;
use homesim_app::services::{SharedRegistry, share};
use homesim_domain::drift::Drift;
use homesim_domain::error::SimError;
use homesim_domain::registry::Registry;
use homesim_domain::time::Timestamp;

const IDENTITY: &str = "simulator-e2e";
const BACKEND: &str = "backend-1";

#[derive(Default)]
struct LoopbackTransport {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl LoopbackTransport {
    fn take(&self) -> Vec<OutboundMessage> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }
}

impl Transport for LoopbackTransport {
    fn publish(&self, message: OutboundMessage) -> impl Future<Output = Result<(), SimError>> + Send {
        self.sent.lock().unwrap().push(message);
        async { Ok(()) }
    }

    fn subscribe(&self, _pattern: &str) -> impl Future<Output = Result<(), SimError>> + Send {
        async { Ok(()) }
    }
}

struct StaticSource(Vec<Value>);

impl DeviceSource for StaticSource {
    fn fetch_devices(&self) -> impl Future<Output = Result<Vec<Value>, SimError>> + Send {
        let devices = self.0.clone();
        async move { Ok(devices) }
    }
}

struct Harness {
    registry: SharedRegistry,
    dispatcher: Dispatcher,
    driver: SimulationDriver<Arc<LoopbackTransport>>,
    transport: Arc<LoopbackTransport>,
}

impl Harness {
    async fn with_devices(devices: Vec<Value>) -> Self {
        let mut registry = Registry::new();
        DeviceLoader::new(StaticSource(devices))
            .load_into(&mut registry)
            .await
            .unwrap();
        let registry = share(registry);
        let router = Router::new(SenderId::new(IDENTITY), "project/home");
        let transport = Arc::new(LoopbackTransport::default());
        let driver = SimulationDriver::new(
            Arc::clone(&registry),
            router.clone(),
            Arc::clone(&transport),
            Duration::from_secs(2),
        )
        .with_rng(StdRng::seed_from_u64(7))
        .with_drift(Drift::with_chance(0.0));
        Self {
            dispatcher: Dispatcher::new(Arc::clone(&registry), router),
            registry,
            driver,
            transport,
        }
    }

    async fn snapshot(&self, id: &str) -> Option<Value> {
        self.registry.lock().await.find(id).ok().map(|device| device.to_spec())
    }
}

fn noon() -> Timestamp {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn from_backend(topic: &str, body: &Value) -> InboundMessage {
    InboundMessage {
        topic: topic.to_string(),
        payload: serde_json::to_vec(body).unwrap(),
        sender_id: Some(BACKEND.to_string()),
    }
}

fn echoed(message: &OutboundMessage) -> InboundMessage {
    InboundMessage {
        topic: message.topic.clone(),
        payload: message.payload.clone(),
        sender_id: Some(message.sender_id.clone()),
    }
}

fn boiler() -> Value {
    json!({"id": "boiler", "room": "bath", "name": "Boiler", "type": "water_heater",
        "status": "on", "parameters": {"target_temperature": 55, "temperature": 23}})
}

fn lamp() -> Value {
    json!({"id": "lamp", "room": "hall", "name": "Lamp", "type": "light"})
}

#[tokio::test]
async fn should_load_bootstrap_devices_and_skip_invalid_ones() {
    let harness = Harness::with_devices(vec![
        boiler(),
        lamp(),
        json!({"id": "ghost", "room": "attic", "name": "Ghost", "type": "toaster"}),
    ])
    .await;

    assert_eq!(harness.registry.lock().await.ids(), vec!["boiler", "lamp"]);
}

#[tokio::test]
async fn should_publish_tick_changes_and_ignore_their_echo() {
    let mut harness = Harness::with_devices(vec![boiler()]).await;

    let published = harness.driver.tick_at(noon()).await;
    assert_eq!(published, 1);

    let sent = harness.transport.take();
    assert_eq!(sent[0].topic, "project/home/boiler/action");
    assert_eq!(sent[0].sender_id, IDENTITY);
    let body: Value = serde_json::from_slice(&sent[0].payload).unwrap();
    assert_eq!(body, json!({"contents": {"temperature": 24, "is_heating": true}}));

    let before = harness.snapshot("boiler").await;
    let outcome = harness.dispatcher.handle(&echoed(&sent[0])).await;
    assert_eq!(outcome, Some(Outcome::Echo));
    assert_eq!(harness.snapshot("boiler").await, before);
}

#[tokio::test]
async fn should_apply_backend_update_before_next_tick() {
    let mut harness = Harness::with_devices(vec![boiler()]).await;

    let update = from_backend(
        "project/home/boiler/update",
        &json!({"contents": {"status": "off", "room": "cellar"}}),
    );
    let outcome = harness.dispatcher.handle(&update).await;
    assert!(matches!(outcome, Some(Outcome::Applied { ref device_id, .. }) if device_id == "boiler"));

    harness.driver.tick_at(noon()).await;

    let spec = harness.snapshot("boiler").await.unwrap();
    assert_eq!(spec["status"], json!("off"));
    assert_eq!(spec["room"], json!("cellar"));
    assert_eq!(spec["parameters"]["is_heating"], json!(false));
    assert_eq!(spec["parameters"]["temperature"], json!(23));
}

#[tokio::test]
async fn should_treat_duplicate_delivery_as_idempotent() {
    let harness = Harness::with_devices(vec![lamp()]).await;
    let action = from_backend("project/home/lamp/action", &json!({"contents": {"status": "off"}}));

    harness.dispatcher.handle(&action).await;
    let once = harness.snapshot("lamp").await;
    harness.dispatcher.handle(&action).await;

    assert_eq!(harness.snapshot("lamp").await, once);
    assert_eq!(once.unwrap()["status"], json!("off"));
}

#[tokio::test]
async fn should_create_and_delete_devices_over_the_wire() {
    let mut harness = Harness::with_devices(vec![lamp()]).await;

    let post = from_backend("project/home/boiler/post", &boiler());
    assert_eq!(
        harness.dispatcher.handle(&post).await,
        Some(Outcome::Created {
            device_id: "boiler".to_string()
        })
    );
    assert_eq!(harness.driver.tick_at(noon()).await, 1);
    harness.transport.take();

    let delete = InboundMessage {
        topic: "project/home/boiler/delete".to_string(),
        payload: Vec::new(),
        sender_id: Some(BACKEND.to_string()),
    };
    assert_eq!(
        harness.dispatcher.handle(&delete).await,
        Some(Outcome::Deleted {
            device_id: "boiler".to_string()
        })
    );
    assert_eq!(harness.snapshot("boiler").await, None);

    harness.driver.tick_at(noon()).await;
    assert!(
        harness
            .transport
            .take()
            .iter()
            .all(|message| !message.topic.contains("boiler"))
    );
}

#[tokio::test]
async fn should_reject_messages_without_disturbing_the_registry() {
    let harness = Harness::with_devices(vec![lamp()]).await;
    let before = harness.snapshot("lamp").await;

    let unsigned = InboundMessage {
        sender_id: None,
        ..from_backend("project/home/lamp/update", &json!({"contents": {"status": "off"}}))
    };
    let unknown_field = from_backend(
        "project/home/lamp/update",
        &json!({"contents": {"status": "off", "temperature": 20}}),
    );
    let missing = from_backend("project/home/nobody/update", &json!({"contents": {}}));
    let duplicate = from_backend("project/home/lamp/post", &lamp());

    for message in [unsigned, unknown_field, missing, duplicate] {
        assert_eq!(harness.dispatcher.handle(&message).await, None);
    }
    assert_eq!(harness.snapshot("lamp").await, before);
}

#[tokio::test]
async fn should_drain_inbound_channel_in_arrival_order() {
    let harness = Harness::with_devices(vec![lamp()]).await;
    let (tx, rx) = mpsc::channel(8);
    let handle = harness.dispatcher.spawn(rx);

    for status in ["off", "on", "off"] {
        tx.send(from_backend(
            "project/home/lamp/update",
            &json!({"contents": {"status": status}}),
        ))
        .await
        .unwrap();
    }
    drop(tx);
    handle.await.unwrap();

    let spec = harness.registry.lock().await.find("lamp").unwrap().to_spec();
    assert_eq!(spec["status"], json!("off"));
}
