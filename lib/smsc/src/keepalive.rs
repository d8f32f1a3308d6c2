use std::sync::Mutex;

/// Simulated keepalive stall. An operator arms it with a number of
/// seconds; the next alert reply sleeps that long and disarms it.
pub struct Keepalive {
    secs: Mutex<u64>,
}

impl Keepalive {
    pub fn new() -> Keepalive {
        Keepalive { secs: Mutex::new(0) }
    }

    pub fn set(&self, secs: u64) {
        *self.secs.lock().expect("Keepalive lock poisoned") = secs;
    }

    /// Reads the armed stall and disarms it in one step.
    pub fn get_and_reset(&self) -> u64 {
        let mut secs = self.secs.lock().expect("Keepalive lock poisoned");
        let current = *secs;
        *secs = 0;
        current
    }

    pub fn peek(&self) -> u64 {
        *self.secs.lock().expect("Keepalive lock poisoned")
    }
}

impl Default for Keepalive {
    fn default() -> Keepalive {
        Keepalive::new()
    }
}
