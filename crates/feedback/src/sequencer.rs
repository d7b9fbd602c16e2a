use super::*;
use bzr_core::BLINK_PHASE;
use std::collections::HashMap;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

/// One queued animation.
/// `blinks == 0` is a steady update: the color becomes the target's resting
/// color without animating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub target: Target,
    pub color: Rgb,
    pub blinks: u8,
}

/// Producer side of the feedback queue. Never waits.
#[derive(Debug, Clone)]
pub struct Feedback {
    tx: UnboundedSender<Request>,
}

impl Feedback {
    pub fn send(&self, request: Request) {
        if self.tx.send(request).is_err() {
            log::debug!("[feedback] sequencer gone, dropping {:?}", request);
        }
    }
    /// Blink a target, then restore it.
    pub fn blink(&self, target: Target, color: Rgb, blinks: u8) {
        self.send(Request {
            target,
            color,
            blinks,
        });
    }
    /// Set a target's resting color.
    pub fn paint(&self, target: Target, color: Rgb) {
        self.blink(target, color, 0);
    }
}

/// Drains the feedback queue one request at a time.
///
/// Player pixels remember their resting color and return to it after a
/// blink; every other pixel returns to off. The strip lock is taken once per
/// frame and released before each phase delay.
pub struct Sequencer {
    inbox: UnboundedReceiver<Request>,
    strip: SharedPixels,
    layout: Layout,
    steady: HashMap<usize, Rgb>,
    phase: Duration,
}

impl Sequencer {
    pub fn new(strip: SharedPixels, layout: Layout) -> (Feedback, Self) {
        let (tx, rx) = unbounded_channel();
        let sequencer = Self {
            inbox: rx,
            strip,
            layout,
            steady: HashMap::new(),
            phase: BLINK_PHASE,
        };
        (Feedback { tx }, sequencer)
    }
    pub fn with_phase(mut self, phase: Duration) -> Self {
        self.phase = phase;
        self
    }

    pub async fn run(mut self) -> anyhow::Result<Infallible> {
        while let Some(request) = self.inbox.recv().await {
            self.play(request).await;
        }
        Err(anyhow::anyhow!("feedback queue closed"))
    }

    async fn play(&mut self, request: Request) {
        let positions = self.layout.positions(request.target);
        if positions.is_empty() {
            log::debug!("[feedback] {} has no pixel", request.target);
            return;
        }
        if request.blinks == 0 {
            for &p in positions.iter().filter(|&&p| self.layout.owner(p).is_some()) {
                self.steady.insert(p, request.color);
            }
            self.frame(&positions, |_| request.color).await;
            return;
        }
        for _ in 0..request.blinks {
            self.frame(&positions, |_| request.color).await;
            tokio::time::sleep(self.phase).await;
            self.frame(&positions, |_| Rgb::OFF).await;
            tokio::time::sleep(self.phase).await;
        }
        self.frame(&positions, |p| self.resting(p)).await;
    }

    fn resting(&self, position: usize) -> Rgb {
        self.steady.get(&position).copied().unwrap_or(Rgb::OFF)
    }

    async fn frame<F>(&self, positions: &[usize], color: F)
    where
        F: Fn(usize) -> Rgb,
    {
        let mut strip = self.strip.lock().await;
        for &p in positions {
            strip.set(p, color(p));
        }
        strip.show();
    }
}
