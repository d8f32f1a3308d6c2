//! Session management operation (60): ESME bind and authentication.

use crate::ops::split_fields;
use crate::pdu::{self, Pdu, RESULT};
use crate::support::{UcpError, UcpResult};

const FIELDS: usize = 12;

pub const BIND_OK: &str = "BIND AUTHENTICATED";
pub const BIND_FAIL: &str = "AUTHENTICATION FAILURE";

/// Parsed bind request.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SessionOp {
    pub oadc: Vec<u8>,
    pub oton: Vec<u8>,
    pub onpi: Vec<u8>,
    pub styp: Vec<u8>,
    pub pwd: Vec<u8>,
    pub npwd: Vec<u8>,
    pub vers: Vec<u8>,
    pub ladc: Vec<u8>,
    pub lton: Vec<u8>,
    pub lnpi: Vec<u8>,
    pub opid: Vec<u8>,
    pub res1: Vec<u8>,
}

impl SessionOp {
    pub fn parse(pdu: &Pdu) -> UcpResult<SessionOp> {
        let f = split_fields(&pdu.data, FIELDS)?;
        Ok(SessionOp {
            oadc: f[0].to_vec(),
            oton: f[1].to_vec(),
            onpi: f[2].to_vec(),
            styp: f[3].to_vec(),
            pwd: f[4].to_vec(),
            npwd: f[5].to_vec(),
            vers: f[6].to_vec(),
            ladc: f[7].to_vec(),
            lton: f[8].to_vec(),
            lnpi: f[9].to_vec(),
            opid: f[10].to_vec(),
            res1: f[11].to_vec(),
        })
    }

    /// The originator address, the bind username.
    pub fn originator(&self) -> String {
        String::from_utf8_lossy(&self.oadc).into_owned()
    }

    /// The hex-decoded password field.
    pub fn password(&self) -> UcpResult<String> {
        let raw = hex::decode(&self.pwd)?;
        String::from_utf8(raw).map_err(|_| UcpError::Encoding)
    }
}

/// `R/60/A/BIND AUTHENTICATED`
pub fn ack(trn: [u8; 2]) -> Vec<u8> {
    pdu::encode(&trn, RESULT, b"60", format!("A/{}", BIND_OK).as_bytes())
}

/// `R/60/N/07/AUTHENTICATION FAILURE`
pub fn nak(trn: [u8; 2]) -> Vec<u8> {
    pdu::encode(&trn, RESULT, b"60", format!("N/07/{}", BIND_FAIL).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdu::OPERATION;

    fn bind_pdu(data: &[u8]) -> Pdu {
        Pdu::new(*b"01", OPERATION, *b"60", data.to_vec())
    }

    #[test]
    fn test_parse_bind_request() {
        let pdu = bind_pdu(b"emi_client/2/1/1/70617373776F7264//0100/////");
        let bind = SessionOp::parse(&pdu).unwrap();

        assert_eq!(bind.originator(), "emi_client");
        assert_eq!(bind.styp, b"1".to_vec());
        assert_eq!(bind.password().unwrap(), "password");
    }

    #[test]
    fn test_parse_rejects_short_payload() {
        let pdu = bind_pdu(b"emi_client/2/1/1");
        assert_eq!(
            SessionOp::parse(&pdu).unwrap_err(),
            UcpError::FieldCount {
                expected: 12,
                found: 4,
            }
        );
    }

    #[test]
    fn test_password_rejects_bad_hex() {
        let pdu = bind_pdu(b"emi_client/2/1/1/zzzz//0100/////");
        let bind = SessionOp::parse(&pdu).unwrap();
        assert_eq!(bind.password().unwrap_err(), UcpError::BadHex);
    }

    #[test]
    fn test_ack_bytes() {
        assert_eq!(
            ack(*b"01"),
            b"\x0201/00037/R/60/A/BIND AUTHENTICATED/6E\x03".to_vec()
        );
    }

    #[test]
    fn test_nak_bytes() {
        assert_eq!(
            nak(*b"01"),
            b"\x0201/00044/R/60/N/07/AUTHENTICATION FAILURE/57\x03".to_vec()
        );
    }
}
