//! Deliver operations synthesized by the simulator: mobile-originated
//! short messages (52) and delivery notifications (53).

use crate::charset;
use crate::ops::join_fields;
use crate::pdu::{self, OPERATION};
use chrono::Duration;
use smscore::time;

const SLOTS: usize = 33;

/// Fixed transaction reference of broadcast MO messages.
pub const MO_TRN: [u8; 2] = *b"01";
/// Fixed transaction reference of delivery notifications.
const NOTIFICATION_TRN: [u8; 2] = *b"99";

/// A mobile-originated short message pushed to every live session.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct DeliverSm {
    /// Recipient address code.
    pub adc: Vec<u8>,
    /// Originator address code.
    pub oadc: Vec<u8>,
    /// Raw message bytes; hex-rendered at emission.
    pub msg: Vec<u8>,
    /// Extra services, already in TTLLDD hex text.
    pub xser: Vec<u8>,
}

impl DeliverSm {
    /// Builds the MO message for an injected `{sender, receiver, text}`
    /// triple. The text travels as UCS-2; `Xser` advertises the
    /// transparent-data message type.
    pub fn mo(sender: &str, receiver: &str, text: &str) -> DeliverSm {
        DeliverSm {
            adc: receiver.as_bytes().to_vec(),
            oadc: sender.as_bytes().to_vec(),
            msg: charset::encode_ucs2(text),
            xser: b"020108".to_vec(),
        }
    }

    /// Emits the op-52 frame, stamping the current wall clock.
    pub fn encode(&self) -> Vec<u8> {
        self.encode_at(&time::scts_now())
    }

    pub fn encode_at(&self, scts: &str) -> Vec<u8> {
        let msg_hex = hex::encode(&self.msg);
        let mut slots: [&[u8]; SLOTS] = [b""; SLOTS];
        slots[0] = &self.adc;
        slots[1] = &self.oadc;
        slots[14] = scts.as_bytes();
        slots[20] = msg_hex.as_bytes();
        slots[30] = &self.xser;
        pdu::encode(&MO_TRN, OPERATION, b"52", &join_fields(&slots))
    }
}

/// The delivery receipt synthesized after an accepted submit that asked
/// for notification.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeliverNotification {
    /// The simulator's access code.
    pub adc: Vec<u8>,
    /// Recipient of the original submit.
    pub oadc: Vec<u8>,
    pub scts: String,
    pub dst: Vec<u8>,
    pub rsn: Vec<u8>,
    pub dscts: String,
    pub mt: Vec<u8>,
    /// Hex-rendered ASCII notification text.
    pub msg: Vec<u8>,
}

impl DeliverNotification {
    /// Synthesizes the receipt: delivery is reported two seconds after
    /// the submit's service center timestamp.
    pub fn new(access_code: &str, recipient: &str, scts: &str) -> DeliverNotification {
        let delivered = time::parse_scts(scts).map(|t| t + Duration::seconds(2));
        let (dscts, delivered_long) = match delivered {
            Some(t) => (time::format_scts(&t), time::format_long(&t)),
            None => (scts.to_string(), scts.to_string()),
        };

        let text = format!(
            "Message for {} with identification {}:{} has been delivered at {}",
            recipient, recipient, scts, delivered_long
        );

        DeliverNotification {
            adc: access_code.as_bytes().to_vec(),
            oadc: recipient.as_bytes().to_vec(),
            scts: scts.to_string(),
            dst: b"0".to_vec(),
            rsn: b"000".to_vec(),
            dscts,
            mt: b"3".to_vec(),
            msg: hex::encode(text.as_bytes()).into_bytes(),
        }
    }

    /// Emits the op-53 frame.
    pub fn encode(&self) -> Vec<u8> {
        let mut slots: [&[u8]; SLOTS] = [b""; SLOTS];
        slots[0] = &self.adc;
        slots[1] = &self.oadc;
        slots[14] = self.scts.as_bytes();
        slots[15] = &self.dst;
        slots[16] = &self.rsn;
        slots[17] = self.dscts.as_bytes();
        slots[18] = &self.mt;
        slots[20] = &self.msg;
        pdu::encode(&NOTIFICATION_TRN, OPERATION, b"53", &join_fields(&slots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdu::Pdu;
    use crate::support::UcpResult;

    fn fields(data: &[u8]) -> Vec<Vec<u8>> {
        data.split(|&b| b == b'/').map(|f| f.to_vec()).collect()
    }

    #[test]
    fn test_mo_encoding() -> UcpResult<()> {
        let mo = DeliverSm::mo("1234", "5678", "hi");
        let frame = mo.encode_at("010819120000");
        let pdu = Pdu::parse(&frame)?;

        assert_eq!(pdu.trn, MO_TRN);
        assert_eq!(pdu.kind, OPERATION);
        assert_eq!(pdu.op, *b"52");
        Pdu::verify(&frame)?;

        let f = fields(&pdu.data);
        assert_eq!(f.len(), 33);
        assert_eq!(f[0], b"5678".to_vec());
        assert_eq!(f[1], b"1234".to_vec());
        assert_eq!(f[14], b"010819120000".to_vec());
        assert_eq!(f[20], b"00680069".to_vec());
        assert_eq!(f[30], b"020108".to_vec());
        Ok(())
    }

    #[test]
    fn test_mo_frame_length_field() {
        let frame = DeliverSm::mo("1234", "5678", "hi").encode_at("010819120000");
        let len: usize = std::str::from_utf8(&frame[4..9]).unwrap().parse().unwrap();
        assert_eq!(len, frame.len() - 2);
    }

    #[test]
    fn test_notification_fields() -> UcpResult<()> {
        let dn = DeliverNotification::new("2929", "639171234567", "020106150405");
        let frame = dn.encode();
        let pdu = Pdu::parse(&frame)?;

        assert_eq!(pdu.trn, *b"99");
        assert_eq!(pdu.kind, OPERATION);
        assert_eq!(pdu.op, *b"53");
        Pdu::verify(&frame)?;

        let f = fields(&pdu.data);
        assert_eq!(f.len(), 33);
        assert_eq!(f[0], b"2929".to_vec());
        assert_eq!(f[1], b"639171234567".to_vec());
        assert_eq!(f[14], b"020106150405".to_vec());
        assert_eq!(f[15], b"0".to_vec());
        assert_eq!(f[16], b"000".to_vec());
        assert_eq!(f[17], b"020106150407".to_vec());
        assert_eq!(f[18], b"3".to_vec());

        let text = String::from_utf8(hex::decode(&f[20]).unwrap()).unwrap();
        assert_eq!(
            text,
            "Message for 639171234567 with identification 639171234567:020106150405 \
             has been delivered at 2006-01-02 15:04:07 +0000 UTC"
        );
        Ok(())
    }

    #[test]
    fn test_notification_with_unparseable_scts() {
        let dn = DeliverNotification::new("2929", "639171234567", "garbage");
        assert_eq!(dn.dscts, "garbage");
        assert_eq!(dn.scts, "garbage");
    }
}
