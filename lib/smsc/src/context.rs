//! Process-wide state, composed explicitly instead of living in module
//! globals: every component receives what it needs through this context.

use crate::broadcast::{self, Injector};
use crate::config::Config;
use crate::keepalive::Keepalive;
use crate::metrics::MetricsSink;
use crate::registry::Registry;
use crate::stats::Stats;
use serde_derive::{Deserialize, Serialize};
use smscore::logging::{self, Logger};
use std::sync::Arc;
use ucp::ops::deliver::DeliverSm;

/// An injected mobile-originated message, as an external injector hands
/// it over.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MoMessage {
    pub sender: String,
    pub receiver: String,
    pub message: String,
}

/// Shared state of one simulator instance.
pub struct CoreContext {
    pub config: Config,
    pub registry: Arc<Registry>,
    pub keepalive: Arc<Keepalive>,
    pub metrics: Arc<dyn MetricsSink>,
    pub stats: Stats,
    injector: Injector,
    pub log: Logger,
}

impl CoreContext {
    pub fn new(config: Config, metrics: Arc<dyn MetricsSink>, log: &Logger) -> Arc<CoreContext> {
        let log = log.new(logging::o!());
        let registry = Arc::new(Registry::new(&log));
        let injector = broadcast::start(registry.clone(), &log);
        let stats = Stats::new(metrics.clone(), &log);

        Arc::new(CoreContext {
            config,
            registry,
            keepalive: Arc::new(Keepalive::new()),
            metrics,
            stats,
            injector,
            log,
        })
    }

    /// Arms the simulated stall: the next alert reply is delayed this
    /// many seconds, then the counter resets.
    pub fn set_keepalive(&self, secs: u64) {
        logging::info!(self.log, "keepalive stall armed"; "seconds" => secs);
        self.keepalive.set(secs);
    }

    /// UCS-2-encodes the message and offers it to the broadcast queue.
    /// Returns false when the queue is full and the message was dropped.
    pub fn inject_mo(&self, mo: &MoMessage) -> bool {
        self.injector
            .offer(DeliverSm::mo(&mo.sender, &mo.receiver, &mo.message))
    }

    /// Zeros the submit counter.
    pub fn reset_counters(&self) {
        self.metrics.reset_submit();
    }
}
