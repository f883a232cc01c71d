//! Base-128 varint primitives
//!
//! Unsigned 64-bit values occupy 1 to 10 bytes, least-significant group
//! first, continuation bit set on every byte but the last.

/// Maximum number of bytes a 64-bit varint can occupy
pub const MAX_VARINT_LEN: usize = 10;

/// Encode `value` into `buf`, returning the number of bytes written.
///
/// Always emits the minimal-length encoding.
pub fn encode_varint64(mut value: u64, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut i = 0;
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf[i] = byte;
            return i + 1;
        }
        buf[i] = byte | 0x80;
        i += 1;
    }
}

/// Number of bytes `value` occupies when varint-encoded.
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - value.max(1).leading_zeros() as usize;
    (bits + 6) / 7
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(value: u64) -> Vec<u8> {
        let mut buf = [0u8; MAX_VARINT_LEN];
        let len = encode_varint64(value, &mut buf);
        buf[..len].to_vec()
    }

    #[test]
    fn known_encodings() {
        assert_eq!(encoded(0), [0x00]);
        assert_eq!(encoded(127), [0x7F]);
        assert_eq!(encoded(128), [0x80, 0x01]);
        assert_eq!(encoded(300), [0xAC, 0x02]);
    }

    #[test]
    fn encoding_is_minimal() {
        for value in [0, 1, 127, 128, 16383, 16384, u64::from(u32::MAX), u64::MAX] {
            assert_eq!(encoded(value).len(), varint_len(value), "value {}", value);
        }
    }

    #[test]
    fn max_value_takes_ten_bytes() {
        assert_eq!(encoded(u64::MAX).len(), 10);
    }
}
