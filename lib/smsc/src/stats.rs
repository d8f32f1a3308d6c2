//! Submit and alert bookkeeping: throughput measurement, message-log
//! entries and concatenated-message reassembly.

use crate::metrics::MetricsSink;
use hashbrown::HashMap;
use smscore::logging::{self, Logger};
use smscore::shared::Message;
use smscore::time;
use ucp::charset;
use ucp::ops::submit::Submit;
use ucp::xser::{ExtraServices, Udh};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Sliding window of the throughput counter.
const TPS_WINDOW: Duration = Duration::from_secs(1);
/// Incomplete fragments older than this are discarded.
const REASSEMBLY_TTL: Duration = Duration::from_secs(60);
/// An alert keeps its connection on the active list this long.
const ACTIVE_WINDOW_SECS: u64 = 60;

/// Event counter over a sliding window.
pub struct TpsCounter {
    window: Duration,
    hits: Mutex<VecDeque<Instant>>,
}

impl TpsCounter {
    pub fn new(window: Duration) -> TpsCounter {
        TpsCounter {
            window,
            hits: Mutex::new(VecDeque::new()),
        }
    }

    pub fn incr(&self) {
        let mut hits = self.lock();
        let now = Instant::now();
        Self::prune(&mut hits, now, self.window);
        hits.push_back(now);
    }

    pub fn rate(&self) -> i64 {
        let mut hits = self.lock();
        Self::prune(&mut hits, Instant::now(), self.window);
        hits.len() as i64
    }

    fn prune(hits: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(&front) = hits.front() {
            if now.duration_since(front) < window {
                break;
            }
            hits.pop_front();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Instant>> {
        self.hits.lock().expect("Tps lock poisoned")
    }
}

struct Fragment {
    total_parts: u8,
    part_num: u8,
    body: String,
    touched: Instant,
}

/// Reassembly of concatenated messages, keyed by the UDH reference
/// number. An entry completes when the latest part number equals the
/// advertised total.
pub struct ReassemblyTable {
    ttl: Duration,
    entries: Mutex<HashMap<u8, Fragment>>,
}

impl ReassemblyTable {
    pub fn new(ttl: Duration) -> ReassemblyTable {
        ReassemblyTable {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Appends one part body; returns the full message when the last
    /// part lands, deleting the entry.
    pub fn absorb(&self, udh: Udh, body: &str) -> Option<String> {
        let mut entries = self.entries.lock().expect("Reassembly lock poisoned");
        let now = Instant::now();
        let ttl = self.ttl;
        entries.retain(|_, fragment| now.duration_since(fragment.touched) < ttl);

        let fragment = entries.entry(udh.ref_num).or_insert_with(|| Fragment {
            total_parts: 0,
            part_num: 0,
            body: String::new(),
            touched: now,
        });
        fragment.body.push_str(body);
        fragment.total_parts = udh.total_parts;
        fragment.part_num = udh.part_num;
        fragment.touched = now;

        if fragment.total_parts == fragment.part_num {
            return entries.remove(&udh.ref_num).map(|fragment| fragment.body);
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("Reassembly lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-PDU bookkeeping feeding the metrics sink.
pub struct Stats {
    tps: TpsCounter,
    reassembly: ReassemblyTable,
    sink: Arc<dyn MetricsSink>,
    log: Logger,
}

impl Stats {
    pub fn new(sink: Arc<dyn MetricsSink>, log: &Logger) -> Stats {
        Stats {
            tps: TpsCounter::new(TPS_WINDOW),
            reassembly: ReassemblyTable::new(REASSEMBLY_TTL),
            sink,
            log: log.new(logging::o!("component" => "stats")),
        }
    }

    /// Counts an accepted submit and records the decoded message once
    /// all of its parts have arrived.
    pub fn record_submit(&self, submit: &Submit, services: &ExtraServices) {
        self.tps.incr();
        self.sink.set_tps(self.tps.rate());
        self.sink.inc_submit();

        let body = match submit.message() {
            Ok(body) => body,
            Err(defect) => {
                logging::warn!(self.log, "undecodable message body"; "defect" => ?defect);
                String::new()
            }
        };

        let complete = match services.udh() {
            Some(udh) => self.reassembly.absorb(udh, &body),
            None => Some(body),
        };

        if let Some(message) = complete {
            self.sink.push_message(Message {
                message,
                sender: charset::originator_display(&submit.oadc),
                recipient: submit.recipient(),
                timestamp: time::now_display(),
            });
        }
    }

    /// Marks the connection behind an alert as active for one minute.
    pub fn record_alert(&self, peer: &str) {
        self.sink
            .track_active(peer, time::timestamp_secs() + ACTIVE_WINDOW_SECS);
    }

    pub fn reassembly(&self) -> &ReassemblyTable {
        &self.reassembly
    }
}
