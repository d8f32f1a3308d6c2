//! The "extra services" field: a sequence of TLV-like triplets `TT LL
//! DD...` where `TT` is the service type, `LL` the byte length of the
//! data and `DD` the data itself, all hex-rendered.

use crate::support::{UcpError, UcpResult};
use indexmap::IndexMap;
use std::str;

/// User Data Header; carries concatenation info in its trailing bytes.
pub const UDH: u8 = 0x01;
/// Billing identifier; an opaque key into the tariff table.
pub const BILLING_IDENTIFIER: u8 = 0x0C;

/// Concatenation info carried in the last three UDH bytes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Udh {
    pub ref_num: u8,
    pub total_parts: u8,
    pub part_num: u8,
}

/// Parsed extra services, keyed by service type. Insertion order is
/// preserved so rendering reproduces the original sequence.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ExtraServices {
    services: IndexMap<u8, Vec<u8>>,
}

impl ExtraServices {
    pub fn new() -> ExtraServices {
        ExtraServices::default()
    }

    /// Parses the hex text of an `Xser` field. An empty field is an empty
    /// service map.
    pub fn parse(xser: &[u8]) -> UcpResult<ExtraServices> {
        let mut services = IndexMap::new();
        let mut rest = xser;

        while !rest.is_empty() {
            if rest.len() < 4 {
                return Err(UcpError::BadXser);
            }
            let service = hex_byte(&rest[0..2])?;
            let data_len = hex_byte(&rest[2..4])? as usize;
            let end = 4 + data_len * 2;
            if rest.len() < end {
                return Err(UcpError::BadXser);
            }
            services.insert(service, hex::decode(&rest[4..end])?);
            rest = &rest[end..];
        }

        Ok(ExtraServices { services })
    }

    /// Renders the services back into hex text, in insertion order.
    pub fn render(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (service, data) in &self.services {
            out.extend_from_slice(format!("{:02X}{:02X}", service, data.len()).as_bytes());
            out.extend_from_slice(hex::encode_upper(data).as_bytes());
        }
        out
    }

    pub fn insert(&mut self, service: u8, data: Vec<u8>) {
        self.services.insert(service, data);
    }

    pub fn get(&self, service: u8) -> Option<&[u8]> {
        self.services.get(&service).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Decoded billing identifier bytes, when present.
    pub fn billing_id(&self) -> Option<&[u8]> {
        self.get(BILLING_IDENTIFIER)
    }

    /// Concatenation info from the UDH service, when present and long
    /// enough to carry it.
    pub fn udh(&self) -> Option<Udh> {
        let data = self.get(UDH)?;
        if data.len() < 3 {
            return None;
        }
        let tail = &data[data.len() - 3..];
        Some(Udh {
            ref_num: tail[0],
            total_parts: tail[1],
            part_num: tail[2],
        })
    }
}

fn hex_byte(digits: &[u8]) -> UcpResult<u8> {
    let text = str::from_utf8(digits).map_err(|_| UcpError::BadHex)?;
    u8::from_str_radix(text, 16).map_err(|_| UcpError::BadHex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_service() {
        let services = ExtraServices::parse(b"020108").unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services.get(0x02), Some(&b"\x08"[..]));
    }

    #[test]
    fn test_parse_empty() {
        let services = ExtraServices::parse(b"").unwrap();
        assert!(services.is_empty());
    }

    #[test]
    fn test_parse_billing_identifier() {
        // 0C service carrying the ASCII tariff key "A".
        let services = ExtraServices::parse(b"0C0141").unwrap();
        assert_eq!(services.billing_id(), Some(&b"A"[..]));
    }

    #[test]
    fn test_parse_udh_concatenation_triplet() {
        // UDH: 05 00 03 <ref> <total> <part>
        let services = ExtraServices::parse(b"01060500037B0201").unwrap();
        assert_eq!(
            services.udh(),
            Some(Udh {
                ref_num: 0x7B,
                total_parts: 2,
                part_num: 1,
            })
        );
    }

    #[test]
    fn test_udh_too_short_for_triplet() {
        let services = ExtraServices::parse(b"01020102").unwrap();
        assert_eq!(services.udh(), None);
    }

    #[test]
    fn test_render_roundtrip_preserves_order() {
        let mut services = ExtraServices::new();
        services.insert(0x0C, b"ACME".to_vec());
        services.insert(0x01, vec![0x05, 0x00, 0x03, 0x7B, 0x02, 0x01]);

        let rendered = services.render();
        assert_eq!(rendered, b"0C0441434D4501060500037B0201".to_vec());
        assert_eq!(ExtraServices::parse(&rendered).unwrap(), services);
    }

    #[test]
    fn test_parse_rejects_truncated_triplet() {
        assert_eq!(ExtraServices::parse(b"0C").unwrap_err(), UcpError::BadXser);
        assert_eq!(ExtraServices::parse(b"0C04AB").unwrap_err(), UcpError::BadXser);
    }

    #[test]
    fn test_parse_rejects_bad_hex() {
        assert_eq!(ExtraServices::parse(b"zz0108").unwrap_err(), UcpError::BadHex);
    }
}
