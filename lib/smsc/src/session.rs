use crate::context::CoreContext;
use crate::dispatch;
use smscore::logging::{self, Logger};
use std::io::{self, BufReader, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// One ESME connection. Every byte written to the socket goes through the
/// write lock, so a submit ack, its delayed notification and broadcast
/// fan-out never interleave.
pub struct Session {
    peer: String,
    writer: Mutex<TcpStream>,
    bound: AtomicBool,
    log: Logger,
}

impl Session {
    pub fn new(stream: &TcpStream, log: &Logger) -> io::Result<Session> {
        let peer = stream.peer_addr()?.to_string();
        let writer = stream.try_clone()?;
        let log = log.new(logging::o!("peer" => peer.clone()));

        Ok(Session {
            peer,
            writer: Mutex::new(writer),
            bound: AtomicBool::new(false),
            log,
        })
    }

    /// Remote address; the registry dedup key.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn is_bound(&self) -> bool {
        self.bound.load(Ordering::Relaxed)
    }

    pub fn set_bound(&self) {
        self.bound.store(true, Ordering::Relaxed);
    }

    pub fn log(&self) -> &Logger {
        &self.log
    }

    /// Exclusive access to the socket's write half.
    pub fn writer(&self) -> MutexGuard<'_, TcpStream> {
        self.writer.lock().expect("Session writer lock poisoned")
    }

    /// Writes one encoded frame under the write lock.
    pub fn write_frame(&self, frame: &[u8]) -> io::Result<()> {
        let mut stream = self.writer();
        stream.write_all(frame)?;
        stream.flush()
    }

    fn shutdown(&self) {
        let _ = self.writer().shutdown(Shutdown::Both);
    }
}

/// Read loop for one accepted connection. Frames are decoded one at a
/// time; the session joins the registry on its first well-formed PDU and
/// leaves it when the loop ends.
pub fn run(ctx: Arc<CoreContext>, stream: TcpStream) {
    let session = match Session::new(&stream, &ctx.log) {
        Ok(session) => Arc::new(session),
        Err(err) => {
            logging::error!(ctx.log, "session setup failed"; "error" => %err);
            return;
        }
    };

    logging::debug!(session.log(), "session opened");
    let mut reader = BufReader::new(stream);

    loop {
        let raw = match ucp::pdu::read_frame(&mut reader) {
            Ok(raw) => raw,
            Err(defect) => {
                logging::debug!(session.log(), "read loop ended"; "reason" => ?defect);
                break;
            }
        };

        ctx.metrics.set_last_request(&raw[1..raw.len() - 1]);

        let pdu = match ucp::pdu::Pdu::parse(&raw) {
            Ok(pdu) => pdu,
            Err(defect) => {
                logging::warn!(session.log(), "unparseable frame"; "defect" => ?defect);
                break;
            }
        };

        if let Err(defect) = ucp::pdu::Pdu::verify(&raw) {
            logging::warn!(session.log(), "checksum mismatch"; "defect" => ?defect);
        }

        ctx.registry.insert(session.clone());

        if let Err(defect) = dispatch::handle(&ctx, &session, &pdu) {
            logging::warn!(session.log(), "session terminated"; "defect" => ?defect);
            break;
        }
    }

    ctx.registry.remove(session.peer());
    session.shutdown();
    logging::debug!(session.log(), "session closed"; "bound" => session.is_bound());
}
