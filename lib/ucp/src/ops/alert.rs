//! Alert operation (31): ESME keepalive poll.

use crate::ops::split_fields;
use crate::pdu::{self, Pdu, RESULT};
use crate::support::UcpResult;

const FIELDS: usize = 2;

/// Parsed alert request.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Alert {
    pub adc: Vec<u8>,
    pub pid: Vec<u8>,
}

impl Alert {
    pub fn parse(pdu: &Pdu) -> UcpResult<Alert> {
        let f = split_fields(&pdu.data, FIELDS)?;
        Ok(Alert {
            adc: f[0].to_vec(),
            pid: f[1].to_vec(),
        })
    }
}

/// `R/31/A/0000`
pub fn ack(trn: [u8; 2]) -> Vec<u8> {
    pdu::encode(&trn, RESULT, b"31", b"A/0000")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdu::OPERATION;
    use crate::support::UcpError;

    #[test]
    fn test_parse_alert() {
        let pdu = Pdu::new(*b"03", OPERATION, *b"31", b"12345/0539".to_vec());
        let alert = Alert::parse(&pdu).unwrap();
        assert_eq!(alert.adc, b"12345".to_vec());
        assert_eq!(alert.pid, b"0539".to_vec());
    }

    #[test]
    fn test_parse_rejects_missing_pid() {
        let pdu = Pdu::new(*b"03", OPERATION, *b"31", b"12345".to_vec());
        assert_eq!(
            Alert::parse(&pdu).unwrap_err(),
            UcpError::FieldCount {
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn test_ack_bytes() {
        assert_eq!(ack(*b"01"), b"\x0201/00023/R/31/A/0000/27\x03".to_vec());
    }
}
