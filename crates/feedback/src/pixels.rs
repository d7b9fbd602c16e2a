use super::*;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Addressable LED strip.
/// Writes are buffered until [`show`](Self::show) latches them.
pub trait Pixels: Send {
    fn len(&self) -> usize;
    fn get(&self, position: usize) -> Rgb;
    fn set(&mut self, position: usize, color: Rgb);
    fn show(&mut self);
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn blank(&mut self) {
        for position in 0..self.len() {
            self.set(position, Rgb::OFF);
        }
        self.show();
    }
}

/// Strip shared between the sequencer and the owner's cleanup path.
pub type SharedPixels = Arc<Mutex<dyn Pixels>>;

/// In-memory strip.
/// Optionally records every latched frame so tests can replay animations.
#[derive(Debug, Clone, Default)]
pub struct Strip {
    buffer: Vec<Rgb>,
    frames: Option<Vec<Vec<Rgb>>>,
}

impl Strip {
    pub fn new(length: usize) -> Self {
        Self {
            buffer: vec![Rgb::OFF; length],
            frames: None,
        }
    }
    pub fn recording(length: usize) -> Self {
        Self {
            buffer: vec![Rgb::OFF; length],
            frames: Some(Vec::new()),
        }
    }
    pub fn shared(self) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(self))
    }
    /// Frames latched so far, oldest first. Empty unless recording.
    pub fn frames(&self) -> &[Vec<Rgb>] {
        self.frames.as_deref().unwrap_or_default()
    }
    /// The buffer as it would be latched next.
    pub fn buffer(&self) -> &[Rgb] {
        &self.buffer
    }
}

impl Pixels for Strip {
    fn len(&self) -> usize {
        self.buffer.len()
    }
    fn get(&self, position: usize) -> Rgb {
        self.buffer.get(position).copied().unwrap_or_default()
    }
    fn set(&mut self, position: usize, color: Rgb) {
        match self.buffer.get_mut(position) {
            Some(pixel) => *pixel = color,
            None => log::debug!("[pixels] position {} out of range", position),
        }
    }
    fn show(&mut self) {
        if let Some(frames) = self.frames.as_mut() {
            frames.push(self.buffer.clone());
        }
    }
}
