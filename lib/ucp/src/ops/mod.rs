//! Per-operation payload types and response builders.

pub mod alert;
pub mod deliver;
pub mod session;
pub mod submit;

use crate::support::{UcpError, UcpResult};

/// Splits an operation payload on `/`, demanding at least the field count
/// the operation defines.
pub(crate) fn split_fields(data: &[u8], expected: usize) -> UcpResult<Vec<&[u8]>> {
    let fields: Vec<&[u8]> = data.split(|&b| b == b'/').collect();
    if fields.len() < expected {
        return Err(UcpError::FieldCount {
            expected,
            found: fields.len(),
        });
    }
    Ok(fields)
}

/// Joins the 33-slot deliver layout back into an operation payload.
pub(crate) fn join_fields(slots: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for (idx, slot) in slots.iter().enumerate() {
        if idx > 0 {
            out.push(b'/');
        }
        out.extend_from_slice(slot);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_fields_counts() {
        let fields = split_fields(b"a//c", 3).unwrap();
        assert_eq!(fields, vec![&b"a"[..], &b""[..], &b"c"[..]]);

        assert_eq!(
            split_fields(b"a/b", 3).unwrap_err(),
            UcpError::FieldCount {
                expected: 3,
                found: 2,
            }
        );
    }

    #[test]
    fn test_join_fields_inverts_split() {
        let joined = join_fields(&[&b"x"[..], &b""[..], &b"z"[..]]);
        assert_eq!(joined, b"x//z".to_vec());
    }
}
