use clap::{App, Arg};
use smsc::config::Config;
use smsc::metrics::MemorySink;
use smsc::server::Server;
use smscore::logging;
use std::sync::Arc;

pub fn main() {
    let matches = App::new("SMSC Simulator")
        .version("1.0")
        .about("Runs a simulated SMSC speaking UCP/EMI over TCP.")
        .arg(
            Arg::with_name("CONFIG_FILE")
                .help("Path to the TOML config file; built-in defaults apply when omitted"),
        )
        .get_matches();

    let config = match matches.value_of("CONFIG_FILE") {
        Some(path) => Config::load(path),
        None => Config::default(),
    };

    let log = logging::init();
    logging::info!(
        log,
        "starting smsc simulator";
        "port" => config.port,
        "user" => &config.user,
        "access_code" => &config.access_code,
        "dn_delay_ms" => config.dn_delay_ms
    );

    let metrics = Arc::new(MemorySink::new());
    let server = Server::bind(config, metrics, &log).expect("Error binding UCP listener");
    server.run().expect("Acceptor terminated");
}
