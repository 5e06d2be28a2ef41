//! Big-endian field readers shared by the key and signature layouts.
//!
//! Callers check the buffer length first; short slices panic.

pub(crate) fn be_u16(b: &[u8]) -> u16 {
    u16::from_be_bytes([b[0], b[1]])
}

pub(crate) fn be_u32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

pub(crate) fn be_u64(b: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&b[..8]);
    u64::from_be_bytes(buf)
}

/// Two's complement, as timestamps before 1970 are stored.
pub(crate) fn be_i64(b: &[u8]) -> i64 {
    be_u64(b) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn reads_leading_bytes() {
        let buf = hex!("0102030405060708 ff");
        assert_eq!(be_u16(&buf), 0x0102);
        assert_eq!(be_u32(&buf), 0x0102_0304);
        assert_eq!(be_u64(&buf), 0x0102_0304_0506_0708);
        assert_eq!(be_i64(&hex!("ffffffffffffff9c")), -100);
    }
}
