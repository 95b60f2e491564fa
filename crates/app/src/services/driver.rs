//! Simulation driver — ticks every device on a fixed interval and publishes
//! what changed.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use homesim_domain::drift::{Drift, TickContext};
use homesim_domain::time::{self, Timestamp};

use super::SharedRegistry;
use crate::ports::Transport;
use crate::router::Router;

/// Periodic tick loop.
pub struct SimulationDriver<T> {
    registry: SharedRegistry,
    router: Router,
    transport: T,
    rng: StdRng,
    drift: Drift,
    interval: Duration,
}

impl<T: Transport> SimulationDriver<T> {
    /// Create a driver seeded from OS entropy with the default drift chance.
    pub fn new(registry: SharedRegistry, router: Router, transport: T, interval: Duration) -> Self {
        Self {
            registry,
            router,
            transport,
            rng: StdRng::from_entropy(),
            drift: Drift::default(),
            interval,
        }
    }

    /// Replace the random source, for reproducible runs.
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    #[must_use]
    pub fn with_drift(mut self, drift: Drift) -> Self {
        self.drift = drift;
        self
    }

    /// Tick every device once at the current wall-clock time.
    pub async fn tick_all(&mut self) -> usize {
        self.tick_at(time::now()).await
    }

    /// Tick every device once as if the time were `now`, then publish.
    ///
    /// The registry lock covers the whole pass and is released before any
    /// publish. Publish failures are logged and do not stop the pass.
    /// Returns the number of messages handed to the transport.
    #[tracing::instrument(skip(self))]
    pub async fn tick_at(&mut self, now: Timestamp) -> usize {
        let messages = {
            let mut registry = self.registry.lock().await;
            let mut ctx = TickContext::new(&mut self.rng, self.drift, now);
            let mut messages = Vec::new();
            registry.for_each_mut(|device| {
                let outcome = device.tick(&mut ctx);
                messages.extend(self.router.outbound(device.id(), &outcome));
            });
            messages
        };

        let mut published = 0;
        for message in messages {
            let topic = message.topic.clone();
            match self.transport.publish(message).await {
                Ok(()) => published += 1,
                Err(err) => tracing::warn!(%topic, error = %err, "failed to publish"),
            }
        }
        tracing::debug!(published, "tick pass complete");
        published
    }

    /// Run [`tick_all`](Self::tick_all) every interval until the task is
    /// aborted. The first pass runs one interval after the call.
    pub fn spawn(mut self) -> JoinHandle<()>
    where
        T: 'static,
    {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            tracing::info!(interval_ms = self.interval.as_millis(), "simulation driver started");
            loop {
                ticker.tick().await;
                self.tick_all().await;
            }
        })
    }
}
