//! Fan-out of injected mobile-originated messages. A bounded queue
//! decouples the injector from the consumer; the consumer writes every
//! queued message to every registered session.

use crate::registry::Registry;
use smscore::logging::{self, Logger};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread;
use ucp::ops::deliver::DeliverSm;

/// Queue capacity; offers beyond it are dropped.
pub const CAPACITY: usize = 10;

/// Handle for queueing mobile-originated messages.
#[derive(Clone)]
pub struct Injector {
    tx: SyncSender<DeliverSm>,
    log: Logger,
}

impl Injector {
    /// Non-blocking offer. Returns false when the queue is full or the
    /// consumer is gone; the message is dropped either way.
    pub fn offer(&self, message: DeliverSm) -> bool {
        match self.tx.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                logging::debug!(self.log, "broadcast queue full, dropping message");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                logging::warn!(self.log, "broadcast consumer gone, dropping message");
                false
            }
        }
    }
}

/// Spawns the fan-out consumer and returns the injector handle.
pub fn start(registry: Arc<Registry>, log: &Logger) -> Injector {
    let log = log.new(logging::o!("component" => "broadcast"));
    let (tx, rx) = mpsc::sync_channel(CAPACITY);

    let consumer_log = log.new(logging::o!());
    thread::spawn(move || consume(rx, registry, consumer_log));

    Injector { tx, log }
}

fn consume(rx: Receiver<DeliverSm>, registry: Arc<Registry>, log: Logger) {
    for message in rx.iter() {
        let frame = message.encode();
        let sessions = registry.snapshot();

        let mut delivered = 0;
        for session in &sessions {
            match session.write_frame(&frame) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    logging::warn!(log, "broadcast write failed";
                                   "peer" => session.peer(),
                                   "error" => %err);
                }
            }
        }

        logging::debug!(log, "mobile-originated message fanned out";
                        "sessions" => sessions.len(),
                        "delivered" => delivered);
    }
}
