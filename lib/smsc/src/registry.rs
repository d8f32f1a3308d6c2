use crate::session::Session;
use indexmap::IndexMap;
use smscore::logging::{self, Logger};
use std::sync::{Arc, Mutex};

/// Live sessions keyed by remote address. One entry per unique remote
/// endpoint; insertion order is kept so fan-out is deterministic.
pub struct Registry {
    sessions: Mutex<IndexMap<String, Arc<Session>>>,
    log: Logger,
}

impl Registry {
    pub fn new(log: &Logger) -> Registry {
        Registry {
            sessions: Mutex::new(IndexMap::new()),
            log: log.new(logging::o!("component" => "registry")),
        }
    }

    /// Registers a session. A session already present under the same
    /// remote address is left untouched.
    pub fn insert(&self, session: Arc<Session>) {
        let mut sessions = self.lock();
        if !sessions.contains_key(session.peer()) {
            logging::debug!(self.log, "session registered";
                            "peer" => session.peer(),
                            "live" => sessions.len() + 1);
            sessions.insert(session.peer().to_string(), session);
        }
    }

    pub fn remove(&self, peer: &str) {
        if self.lock().shift_remove(peer).is_some() {
            logging::debug!(self.log, "session deregistered"; "peer" => peer);
        }
    }

    /// Snapshot of the live sessions; fan-out iterates this copy so the
    /// registry lock is not held across socket writes.
    pub fn snapshot(&self) -> Vec<Arc<Session>> {
        self.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, IndexMap<String, Arc<Session>>> {
        self.sessions.lock().expect("Registry lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smscore::logging::Discard;
    use std::net::{TcpListener, TcpStream};

    fn discard_log() -> Logger {
        Logger::root(Discard, logging::o!())
    }

    /// A connected loopback socket and its server-side peer.
    fn socket_pair(listener: &TcpListener) -> (TcpStream, TcpStream) {
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server_side, _) = listener.accept().unwrap();
        (client, server_side)
    }

    #[test]
    fn test_insert_is_idempotent_per_peer() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let log = discard_log();
        let registry = Registry::new(&log);

        let (_client, server_side) = socket_pair(&listener);
        let session = Arc::new(Session::new(&server_side, &log).unwrap());

        registry.insert(session.clone());
        registry.insert(session.clone());
        assert_eq!(registry.len(), 1);

        let (_client2, server_side2) = socket_pair(&listener);
        let other = Arc::new(Session::new(&server_side2, &log).unwrap());
        registry.insert(other);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove_unknown_peer_is_noop() {
        let registry = Registry::new(&discard_log());
        registry.remove("10.0.0.1:1234");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_preserves_insertion_order() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let log = discard_log();
        let registry = Registry::new(&log);

        let (_c1, s1) = socket_pair(&listener);
        let (_c2, s2) = socket_pair(&listener);
        let first = Arc::new(Session::new(&s1, &log).unwrap());
        let second = Arc::new(Session::new(&s2, &log).unwrap());

        registry.insert(first.clone());
        registry.insert(second.clone());

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].peer(), first.peer());
        assert_eq!(snapshot[1].peer(), second.peer());

        registry.remove(first.peer());
        assert_eq!(registry.len(), 1);
    }
}
