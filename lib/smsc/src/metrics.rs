use hashbrown::HashMap;
use smscore::shared::Message;
use smscore::time;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Number of decoded messages retained for inspection.
pub const MESSAGE_RETAIN: usize = 10;

/// Narrow sink for counters, snapshots and billing. The simulator only
/// writes; reading is the embedder's business (a dashboard, a test).
pub trait MetricsSink: Send + Sync {
    fn inc_submit(&self);
    fn inc_deliver(&self);
    fn add_cost(&self, cost: f64);
    fn set_tps(&self, tps: i64);
    fn set_last_request(&self, raw: &[u8]);
    fn set_last_response(&self, raw: &[u8]);
    fn push_message(&self, message: Message);
    fn track_active(&self, addr: &str, expires_at: u64);
    /// Out-of-band counter reset.
    fn reset_submit(&self);
}

#[derive(Default)]
struct Counters {
    submits: u64,
    delivers: u64,
    cost: f64,
    tps: i64,
    last_request: Vec<u8>,
    last_response: Vec<u8>,
    messages: VecDeque<Message>,
    active: HashMap<String, u64>,
}

/// In-memory sink with snapshot accessors.
pub struct MemorySink {
    inner: Mutex<Counters>,
}

impl MemorySink {
    pub fn new() -> MemorySink {
        MemorySink {
            inner: Mutex::new(Counters::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Counters> {
        self.inner.lock().expect("Metrics lock poisoned")
    }

    pub fn submits(&self) -> u64 {
        self.lock().submits
    }

    pub fn delivers(&self) -> u64 {
        self.lock().delivers
    }

    pub fn cost(&self) -> f64 {
        self.lock().cost
    }

    pub fn tps(&self) -> i64 {
        self.lock().tps
    }

    pub fn last_request(&self) -> Vec<u8> {
        self.lock().last_request.clone()
    }

    pub fn last_response(&self) -> Vec<u8> {
        self.lock().last_response.clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.iter().cloned().collect()
    }

    /// Live connections, dropping entries whose expiry has passed.
    pub fn active(&self) -> Vec<String> {
        let now = time::timestamp_secs();
        let mut inner = self.lock();
        inner.active.retain(|_, &mut expires_at| expires_at > now);
        inner.active.keys().cloned().collect()
    }
}

impl Default for MemorySink {
    fn default() -> MemorySink {
        MemorySink::new()
    }
}

impl MetricsSink for MemorySink {
    fn inc_submit(&self) {
        self.lock().submits += 1;
    }

    fn inc_deliver(&self) {
        self.lock().delivers += 1;
    }

    fn add_cost(&self, cost: f64) {
        self.lock().cost += cost;
    }

    fn set_tps(&self, tps: i64) {
        self.lock().tps = tps;
    }

    fn set_last_request(&self, raw: &[u8]) {
        self.lock().last_request = raw.to_vec();
    }

    fn set_last_response(&self, raw: &[u8]) {
        self.lock().last_response = raw.to_vec();
    }

    fn push_message(&self, message: Message) {
        let mut inner = self.lock();
        inner.messages.push_back(message);
        while inner.messages.len() > MESSAGE_RETAIN {
            inner.messages.pop_front();
        }
    }

    fn track_active(&self, addr: &str, expires_at: u64) {
        self.lock().active.insert(addr.to_string(), expires_at);
    }

    fn reset_submit(&self) {
        self.lock().submits = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: &str) -> Message {
        Message {
            message: text.to_string(),
            sender: "acme".to_string(),
            recipient: "639171234567".to_string(),
            timestamp: "now".to_string(),
        }
    }

    #[test]
    fn test_counters() {
        let sink = MemorySink::new();
        sink.inc_submit();
        sink.inc_submit();
        sink.inc_deliver();
        sink.add_cost(2.5);
        sink.add_cost(1.0);
        sink.set_tps(7);

        assert_eq!(sink.submits(), 2);
        assert_eq!(sink.delivers(), 1);
        assert!((sink.cost() - 3.5).abs() < f64::EPSILON);
        assert_eq!(sink.tps(), 7);

        sink.reset_submit();
        assert_eq!(sink.submits(), 0);
        assert_eq!(sink.delivers(), 1);
    }

    #[test]
    fn test_snapshots() {
        let sink = MemorySink::new();
        sink.set_last_request(b"01/00023/O/31/12345/0539/AA");
        sink.set_last_response(b"01/00023/R/31/A/0000/27");
        assert_eq!(sink.last_request(), b"01/00023/O/31/12345/0539/AA".to_vec());
        assert_eq!(sink.last_response(), b"01/00023/R/31/A/0000/27".to_vec());
    }

    #[test]
    fn test_messages_retain_last_ten() {
        let sink = MemorySink::new();
        for idx in 0..15 {
            sink.push_message(message(&format!("msg-{}", idx)));
        }

        let messages = sink.messages();
        assert_eq!(messages.len(), MESSAGE_RETAIN);
        assert_eq!(messages[0].message, "msg-5");
        assert_eq!(messages[9].message, "msg-14");
    }

    #[test]
    fn test_active_prunes_expired() {
        let sink = MemorySink::new();
        let now = time::timestamp_secs();
        sink.track_active("10.0.0.1:5000", now + 60);
        sink.track_active("10.0.0.2:5000", now.saturating_sub(5));

        let active = sink.active();
        assert_eq!(active, vec!["10.0.0.1:5000".to_string()]);
    }
}
