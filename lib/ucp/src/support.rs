use std::io;

pub type UcpResult<T> = Result<T, UcpError>;

/// Defects raised on the wire path. Frame and payload defects terminate
/// the session; checksum mismatches are reported but tolerated.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum UcpError {
    /// The peer closed before any byte of a frame arrived.
    EmptyFrame,
    MissingStx,
    MissingEtx,
    FrameTooShort(usize),
    /// A delimiter is not where the fixed field layout puts it.
    BadLayout,
    /// A numeric field contains non-digit bytes.
    BadNumericField,
    /// Odd-length or non-hex text where hex was required.
    BadHex,
    /// A truncated or over-running extra-services triplet.
    BadXser,
    /// Text that does not decode in the advertised character set.
    Encoding,
    /// Operation payload carries fewer fields than the operation defines.
    FieldCount { expected: usize, found: usize },
    /// Embedded checksum differs from the computed byte sum.
    Checksum { expected: [u8; 2], found: [u8; 2] },
    UnknownOperation([u8; 2]),
    Io(io::ErrorKind),
}

impl From<io::Error> for UcpError {
    #[inline]
    fn from(err: io::Error) -> Self {
        UcpError::Io(err.kind())
    }
}

impl From<hex::FromHexError> for UcpError {
    #[inline]
    fn from(_: hex::FromHexError) -> Self {
        UcpError::BadHex
    }
}
