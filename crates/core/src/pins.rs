use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

/// Digital input sampled by polling.
/// Buttons are wired with a pull-up, so a pressed button reads low.
pub trait Button: Send + Sync {
    fn is_low(&self) -> bool;
}

/// Single on/off output, such as the light inside a handset's button.
pub trait Lamp: Send + Sync {
    fn set(&self, on: bool);
}

/// Software pin standing in for a GPIO line.
/// Clones share the same level, so a test or simulator can drive a button
/// (or observe a lamp) that the device under test owns.
#[derive(Debug, Clone)]
pub struct Pin(Arc<AtomicBool>);

impl Pin {
    /// Pulled-up input: reads high until pressed.
    pub fn pulled_up() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
    /// Output that starts dark.
    pub fn dark() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }
    pub fn level(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
    pub fn press(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
    pub fn release(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl Button for Pin {
    fn is_low(&self) -> bool {
        !self.level()
    }
}

impl Lamp for Pin {
    fn set(&self, on: bool) {
        self.0.store(on, Ordering::SeqCst);
    }
}
