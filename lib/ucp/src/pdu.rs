//! PDU framing, parsing and emission.
//!
//! Every PDU on the wire is `STX trn '/' length '/' kind '/' op '/' data
//! '/' checksum ETX`. The length field counts every byte between STX and
//! ETX; the checksum is the low 8 bits of the byte sum from `trn` through
//! the `/` preceding the checksum field, as two uppercase hex digits.

use crate::support::{UcpError, UcpResult};
use std::io::BufRead;

pub const STX: u8 = 0x02;
pub const ETX: u8 = 0x03;

/// Request PDU.
pub const OPERATION: u8 = b'O';
/// Response PDU.
pub const RESULT: u8 = b'R';

/// Body bytes that are not payload: trn(2) + length(5) + kind(1) + op(2),
/// four inner delimiters, the delimiter closing the data field and the
/// checksum(2).
const FIXED_OVERHEAD: usize = 17;
/// Smallest parseable frame: empty data plus STX and ETX.
const MIN_FRAME: usize = FIXED_OVERHEAD + 2;

/// Operations answered by the simulator.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Operation {
    Alert,
    Submit,
    DeliverSm,
    DeliverNotification,
    SessionManagement,
}

impl Operation {
    pub fn from_code(code: &[u8]) -> Option<Operation> {
        match code {
            b"31" => Some(Operation::Alert),
            b"51" => Some(Operation::Submit),
            b"52" => Some(Operation::DeliverSm),
            b"53" => Some(Operation::DeliverNotification),
            b"60" => Some(Operation::SessionManagement),
            _ => None,
        }
    }

    pub fn code(self) -> &'static [u8; 2] {
        match self {
            Operation::Alert => b"31",
            Operation::Submit => b"51",
            Operation::DeliverSm => b"52",
            Operation::DeliverNotification => b"53",
            Operation::SessionManagement => b"60",
        }
    }
}

/// One parsed protocol data unit.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Pdu {
    /// Transaction reference number, two ASCII digits, echoed in replies.
    pub trn: [u8; 2],
    /// The five-digit length field as transmitted.
    pub len: usize,
    /// `'O'` for operations, `'R'` for results.
    pub kind: u8,
    /// Two-digit operation identifier, kept raw so unknown operations can
    /// be reported instead of rejected.
    pub op: [u8; 2],
    /// Operation payload, itself `/`-delimited.
    pub data: Vec<u8>,
    /// Two uppercase hex digits as transmitted.
    pub checksum: [u8; 2],
}

/// Reads bytes until ETX and validates the frame envelope. The returned
/// buffer includes both STX and ETX.
pub fn read_frame<R: BufRead>(reader: &mut R) -> UcpResult<Vec<u8>> {
    let mut raw = Vec::new();
    reader.read_until(ETX, &mut raw)?;

    if raw.is_empty() {
        return Err(UcpError::EmptyFrame);
    }
    if raw[0] != STX {
        return Err(UcpError::MissingStx);
    }
    if raw[raw.len() - 1] != ETX {
        return Err(UcpError::MissingEtx);
    }
    if raw.len() < MIN_FRAME {
        return Err(UcpError::FrameTooShort(raw.len()));
    }

    Ok(raw)
}

/// Low 8 bits of the byte sum, rendered as two uppercase hex digits.
pub fn checksum(body: &[u8]) -> [u8; 2] {
    let sum = body.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    let digits = format!("{:02X}", sum);
    let bytes = digits.as_bytes();
    [bytes[0], bytes[1]]
}

/// The body between STX and ETX, checksum excluded.
fn body(trn: &[u8; 2], kind: u8, op: &[u8; 2], data: &[u8]) -> Vec<u8> {
    let len = FIXED_OVERHEAD + data.len();
    let mut body = Vec::with_capacity(len);
    body.extend_from_slice(trn);
    body.push(b'/');
    body.extend_from_slice(format!("{:05}", len).as_bytes());
    body.push(b'/');
    body.push(kind);
    body.push(b'/');
    body.extend_from_slice(op);
    body.push(b'/');
    body.extend_from_slice(data);
    body.push(b'/');
    body
}

/// Emits a complete frame. The length field is derived from the payload:
/// `17 + data.len()` is the byte count between STX and ETX for any data.
pub fn encode(trn: &[u8; 2], kind: u8, op: &[u8; 2], data: &[u8]) -> Vec<u8> {
    let body = body(trn, kind, op, data);
    let ck = checksum(&body);

    let mut frame = Vec::with_capacity(body.len() + 4);
    frame.push(STX);
    frame.extend_from_slice(&body);
    frame.extend_from_slice(&ck);
    frame.push(ETX);
    frame
}

impl Pdu {
    /// Builds a PDU with length and checksum computed from the payload.
    pub fn new(trn: [u8; 2], kind: u8, op: [u8; 2], data: Vec<u8>) -> Pdu {
        let checksum = checksum(&body(&trn, kind, &op, &data));
        Pdu {
            trn,
            len: FIXED_OVERHEAD + data.len(),
            kind,
            op,
            data,
            checksum,
        }
    }

    /// Parses a framed buffer (STX..ETX inclusive). Field positions are
    /// fixed; the delimiter layout is validated before extraction.
    pub fn parse(raw: &[u8]) -> UcpResult<Pdu> {
        if raw.len() < MIN_FRAME {
            return Err(UcpError::FrameTooShort(raw.len()));
        }

        let end = raw.len();
        for &idx in &[3, 9, 11, 14, end - 4] {
            if raw[idx] != b'/' {
                return Err(UcpError::BadLayout);
            }
        }

        let trn = [raw[1], raw[2]];
        if !trn.iter().all(|b| b.is_ascii_digit()) {
            return Err(UcpError::BadNumericField);
        }

        Ok(Pdu {
            trn,
            len: parse_digits(&raw[4..9])?,
            kind: raw[10],
            op: [raw[12], raw[13]],
            data: raw[15..end - 4].to_vec(),
            checksum: [raw[end - 3], raw[end - 2]],
        })
    }

    /// Compares the embedded checksum against the computed byte sum.
    pub fn verify(raw: &[u8]) -> UcpResult<()> {
        if raw.len() < MIN_FRAME {
            return Err(UcpError::FrameTooShort(raw.len()));
        }

        let end = raw.len();
        let expected = checksum(&raw[1..end - 3]);
        let found = [raw[end - 3], raw[end - 2]];
        if expected != found {
            return Err(UcpError::Checksum { expected, found });
        }
        Ok(())
    }

    /// Re-emits the frame, recomputing length and checksum.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode(&self.trn, self.kind, &self.op, &self.data)
    }
}

fn parse_digits(field: &[u8]) -> UcpResult<usize> {
    let mut value = 0usize;
    for &b in field {
        if !b.is_ascii_digit() {
            return Err(UcpError::BadNumericField);
        }
        value = value * 10 + (b - b'0') as usize;
    }
    Ok(value)
}
