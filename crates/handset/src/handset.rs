use super::*;
use bzr_core::Address;
use bzr_core::Button;
use bzr_core::Lamp;
use bzr_core::Tasks;
use bzr_feedback::Pixels;
use bzr_feedback::Rgb;
use bzr_feedback::SharedPixels;
use bzr_protocol::Protocol;
use bzr_protocol::ProtocolError;
use bzr_radio::Radio;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;

/// A player's device: one button, one lamp, one status pixel, one radio.
pub struct Handset {
    radio: Arc<dyn Radio>,
    connection: Arc<Mutex<Connection>>,
    button: Arc<dyn Button>,
    lamp: Arc<dyn Lamp>,
    status: SharedPixels,
    config: HandsetConfig,
}

impl Handset {
    pub fn new(
        radio: Arc<dyn Radio>,
        button: Arc<dyn Button>,
        lamp: Arc<dyn Lamp>,
        status: SharedPixels,
        config: HandsetConfig,
    ) -> Self {
        let connection = Connection::new(&config.name, config.timer);
        Self {
            radio,
            connection: Arc::new(Mutex::new(connection)),
            button,
            lamp,
            status,
            config,
        }
    }
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.connection.clone()
    }
    pub fn address(&self) -> Address {
        self.radio.address()
    }

    /// Runs the receive, poll and status loops until one fails, then turns
    /// the lamp and status pixel off, releases the radio and returns the
    /// failure.
    pub async fn run(self) -> anyhow::Error {
        log::info!(
            "[handset] {} starting as {:?}",
            self.radio.address(),
            self.config.name
        );
        let mut tasks = Tasks::new();
        tasks.spawn(
            "receive",
            receive(self.radio.clone(), self.connection.clone()),
        );
        tasks.spawn(
            "poll",
            poll(
                self.radio.clone(),
                self.connection.clone(),
                self.button.clone(),
                self.lamp.clone(),
                self.config.poll,
            ),
        );
        tasks.spawn(
            "status",
            status(
                self.connection.clone(),
                self.status.clone(),
                self.config.blink,
            ),
        );
        let error = tasks.supervise().await;
        self.status.lock().await.blank();
        self.lamp.set(false);
        self.radio.close();
        error
    }
}

async fn deliver(radio: &dyn Radio, outbound: Outbound) {
    let Outbound { to, message } = outbound;
    let payload = match Protocol::encode(&message) {
        Ok(payload) => payload,
        Err(e) => return log::error!("[handset] {}", e),
    };
    radio.ensure_peer(to);
    match radio.send(to, &payload).await {
        Ok(()) => log::debug!("[handset] sent {} to {}", message, to),
        Err(e) => log::warn!("[handset] send {} to {} failed: {}", message, to, e),
    }
}

async fn receive(
    radio: Arc<dyn Radio>,
    connection: Arc<Mutex<Connection>>,
) -> anyhow::Result<Infallible> {
    loop {
        let frame = radio.recv().await?;
        let message = match Protocol::decode(&frame.payload) {
            Ok(message) => message,
            Err(ProtocolError::UnknownAction(action)) => {
                log::debug!("[handset] unknown action {} from {}", action, frame.from);
                continue;
            }
            Err(e) => {
                log::warn!("[handset] dropping frame from {}: {}", frame.from, e);
                continue;
            }
        };
        let outbound = connection
            .lock()
            .await
            .receive(frame.from, message, Instant::now());
        if let Some(outbound) = outbound {
            deliver(radio.as_ref(), outbound).await;
        }
    }
}

async fn poll(
    radio: Arc<dyn Radio>,
    connection: Arc<Mutex<Connection>>,
    button: Arc<dyn Button>,
    lamp: Arc<dyn Lamp>,
    period: Duration,
) -> anyhow::Result<Infallible> {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        let now = Instant::now();
        let (outbound, lit) = {
            let mut connection = connection.lock().await;
            connection.tick(now);
            let outbound = connection.sample(button.is_low(), now);
            (outbound, connection.lamp())
        };
        lamp.set(lit);
        if let Some(outbound) = outbound {
            deliver(radio.as_ref(), outbound).await;
        }
    }
}

async fn status(
    connection: Arc<Mutex<Connection>>,
    pixels: SharedPixels,
    phase: Duration,
) -> anyhow::Result<Infallible> {
    let mut on = false;
    loop {
        on = !on;
        let color = match on {
            true => connection.lock().await.status_color(),
            false => Rgb::OFF,
        };
        {
            let mut pixels = pixels.lock().await;
            pixels.set(0, color);
            pixels.show();
        }
        tokio::time::sleep(phase).await;
    }
}
