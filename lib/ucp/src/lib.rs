//! UCP (EMI) protocol engine: PDU framing and emission, text codecs and
//! per-operation payload types.

pub mod charset;
pub mod ops;
pub mod pdu;
pub mod support;
pub mod xser;
