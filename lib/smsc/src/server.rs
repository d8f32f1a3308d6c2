use crate::config::Config;
use crate::context::CoreContext;
use crate::metrics::MetricsSink;
use crate::session;
use smscore::logging::{self, Logger};
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread;

/// The UCP acceptor: listens on the configured port and runs one session
/// per accepted connection.
pub struct Server {
    listener: TcpListener,
    ctx: Arc<CoreContext>,
}

impl Server {
    pub fn bind(config: Config, metrics: Arc<dyn MetricsSink>, log: &Logger) -> io::Result<Server> {
        let listener = TcpListener::bind(("0.0.0.0", config.port))?;
        logging::info!(log, "ucp listener bound"; "addr" => %listener.local_addr()?);

        Ok(Server {
            listener,
            ctx: CoreContext::new(config, metrics, log),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// The context handle carrying the side-channel controls.
    pub fn context(&self) -> Arc<CoreContext> {
        self.ctx.clone()
    }

    /// Accept loop. Runs until the process ends; failed accepts are
    /// logged and do not stop the loop.
    pub fn run(&self) -> io::Result<()> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let ctx = self.ctx.clone();
                    thread::spawn(move || session::run(ctx, stream));
                }
                Err(err) => {
                    logging::warn!(self.ctx.log, "accept failed"; "error" => %err);
                }
            }
        }
        Ok(())
    }
}
