//! Manual ESME smoke client: binds to a running simulator, submits one
//! message and prints everything that comes back.

use clap::{App, Arg};
use std::io::{BufReader, Write};
use std::net::TcpStream;
use std::time::Duration;
use ucp::charset;
use ucp::pdu::{self, OPERATION};

pub fn main() {
    let matches = App::new("ESME smoke client")
        .version("1.0")
        .about("Binds to a UCP simulator and submits one short message.")
        .arg(
            Arg::with_name("ADDRESS")
                .help("Simulator address, host:port")
                .required(true),
        )
        .arg(
            Arg::with_name("user")
                .long("user")
                .takes_value(true)
                .default_value("emi_client"),
        )
        .arg(
            Arg::with_name("password")
                .long("password")
                .takes_value(true)
                .default_value("password"),
        )
        .arg(
            Arg::with_name("recipient")
                .long("recipient")
                .takes_value(true)
                .default_value("639171234567"),
        )
        .arg(
            Arg::with_name("message")
                .long("message")
                .takes_value(true)
                .default_value("hello from the smoke client"),
        )
        .get_matches();

    let address = matches.value_of("ADDRESS").unwrap();
    let user = matches.value_of("user").unwrap();
    let password = matches.value_of("password").unwrap();
    let recipient = matches.value_of("recipient").unwrap();
    let message = matches.value_of("message").unwrap();

    let mut stream = TcpStream::connect(address).expect("Error connecting to the simulator");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .expect("Error arming read timeout");
    let mut reader = BufReader::new(stream.try_clone().expect("Error cloning stream"));

    let pw_hex = hex::encode(password.as_bytes());
    let bind_fields = [user, "2", "1", "1", &pw_hex, "", "", "", "", "", "0100", ""];
    send(&mut stream, &pdu::encode(b"01", OPERATION, b"60", bind_fields.join("/").as_bytes()));
    print_reply(&mut reader, "bind");

    let msg_hex = String::from_utf8(charset::ia5_encode(message)).expect("hex is ascii");
    let mut submit_fields = vec![""; 33];
    submit_fields[0] = recipient;
    submit_fields[1] = "1234";
    submit_fields[5] = "1";
    submit_fields[18] = "3";
    submit_fields[20] = &msg_hex;
    send(&mut stream, &pdu::encode(b"02", OPERATION, b"51", submit_fields.join("/").as_bytes()));
    print_reply(&mut reader, "submit ack");
    print_reply(&mut reader, "delivery notification");
}

fn send(stream: &mut TcpStream, frame: &[u8]) {
    stream.write_all(frame).expect("Error writing frame");
}

fn print_reply(reader: &mut BufReader<TcpStream>, label: &str) {
    match pdu::read_frame(reader) {
        Ok(raw) => println!("{}: {}", label, String::from_utf8_lossy(&raw[1..raw.len() - 1])),
        Err(defect) => println!("{}: no reply ({:?})", label, defect),
    }
}
