//! Submit short message operation (51): MT submission from an ESME.

use crate::charset;
use crate::ops::split_fields;
use crate::pdu::{self, Pdu, RESULT};
use crate::support::UcpResult;
use crate::xser::ExtraServices;
use smscore::time;

const FIELDS: usize = 33;

/// Message carried as packed 7-bit IA5, hex-rendered.
pub const MT_IA5: &[u8] = b"3";
/// Message carried as big-endian UCS-2, hex-rendered.
pub const MT_UCS2: &[u8] = b"4";

/// Parsed submit request. The service center timestamp is stamped by the
/// server at parse time, replacing whatever the client sent.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Submit {
    /// Recipient address code.
    pub adc: Vec<u8>,
    /// Originator address code.
    pub oadc: Vec<u8>,
    /// Authentication code.
    pub ac: Vec<u8>,
    pub nrq: Vec<u8>,
    pub nadc: Vec<u8>,
    /// Notification type; `1` requests a delivery notification.
    pub nt: Vec<u8>,
    pub npid: Vec<u8>,
    pub lrq: Vec<u8>,
    pub lrad: Vec<u8>,
    pub lpid: Vec<u8>,
    pub dd: Vec<u8>,
    pub ddt: Vec<u8>,
    pub vp: Vec<u8>,
    pub rpid: Vec<u8>,
    /// Service center timestamp, `DDMMYYhhmmss`.
    pub scts: String,
    pub dst: Vec<u8>,
    pub rsn: Vec<u8>,
    pub dscts: Vec<u8>,
    /// Message type selector for the `msg` field.
    pub mt: Vec<u8>,
    pub nb: Vec<u8>,
    /// Message payload, hex-rendered in the encoding `mt` selects.
    pub msg: Vec<u8>,
    pub mms: Vec<u8>,
    pub pr: Vec<u8>,
    pub dcs: Vec<u8>,
    pub mcls: Vec<u8>,
    pub rpi: Vec<u8>,
    pub cpg: Vec<u8>,
    pub rply: Vec<u8>,
    /// Originator type of address; advertises alphanumeric senders.
    pub otoa: Vec<u8>,
    pub hplmn: Vec<u8>,
    /// Extra services in the TTLLDD grammar.
    pub xser: Vec<u8>,
    pub res4: Vec<u8>,
    pub res5: Vec<u8>,
}

impl Submit {
    pub fn parse(pdu: &Pdu) -> UcpResult<Submit> {
        Submit::parse_at(pdu, time::scts_now())
    }

    /// Parse with an explicit service center timestamp.
    pub fn parse_at(pdu: &Pdu, scts: String) -> UcpResult<Submit> {
        let f = split_fields(&pdu.data, FIELDS)?;
        Ok(Submit {
            adc: f[0].to_vec(),
            oadc: f[1].to_vec(),
            ac: f[2].to_vec(),
            nrq: f[3].to_vec(),
            nadc: f[4].to_vec(),
            nt: f[5].to_vec(),
            npid: f[6].to_vec(),
            lrq: f[7].to_vec(),
            lrad: f[8].to_vec(),
            lpid: f[9].to_vec(),
            dd: f[10].to_vec(),
            ddt: f[11].to_vec(),
            vp: f[12].to_vec(),
            rpid: f[13].to_vec(),
            scts,
            dst: f[15].to_vec(),
            rsn: f[16].to_vec(),
            dscts: f[17].to_vec(),
            mt: f[18].to_vec(),
            nb: f[19].to_vec(),
            msg: f[20].to_vec(),
            mms: f[21].to_vec(),
            pr: f[22].to_vec(),
            dcs: f[23].to_vec(),
            mcls: f[24].to_vec(),
            rpi: f[25].to_vec(),
            cpg: f[26].to_vec(),
            rply: f[27].to_vec(),
            otoa: f[28].to_vec(),
            hplmn: f[29].to_vec(),
            xser: f[30].to_vec(),
            res4: f[31].to_vec(),
            res5: f[32].to_vec(),
        })
    }

    /// The recipient of the message.
    pub fn recipient(&self) -> String {
        String::from_utf8_lossy(&self.adc).into_owned()
    }

    /// True when the client asked for a delivery notification.
    pub fn notification_requested(&self) -> bool {
        self.nt == b"1"
    }

    /// The message decoded according to `mt`. Message types other than
    /// IA5 and UCS-2 decode to an empty string.
    pub fn message(&self) -> UcpResult<String> {
        if self.mt == MT_IA5 {
            charset::ia5_decode(&self.msg)
        } else if self.mt == MT_UCS2 {
            let raw = hex::decode(&self.msg)?;
            charset::decode_ucs2(&raw)
        } else {
            Ok(String::new())
        }
    }

    pub fn extra_services(&self) -> UcpResult<ExtraServices> {
        ExtraServices::parse(&self.xser)
    }

    /// `R/51/A//{AdC}:{SCTS}`
    pub fn ack(&self, trn: [u8; 2]) -> Vec<u8> {
        let message = format!("A//{}:{}", self.recipient(), self.scts);
        pdu::encode(&trn, RESULT, b"51", message.as_bytes())
    }
}
