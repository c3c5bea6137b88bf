//! Varint encoding.
//!
//! Decoding lives on [`Scanner`](crate::Scanner), which reads from a
//! contiguous slice so that it can rewind; the encoding side is needed to
//! reconstruct unknown fields and to build test inputs.

use bytes::BufMut;

/// Encodes an integer value into LEB128 variable length format, and writes
/// it to the buffer. The buffer must have enough remaining space (maximum 10
/// bytes).
#[inline]
pub fn encode_varint(mut value: u64, buf: &mut impl BufMut) {
    loop {
        if value < 0x80 {
            buf.put_u8(value as u8);
            break;
        }
        buf.put_u8(((value & 0x7F) | 0x80) as u8);
        value >>= 7;
    }
}

/// Returns the encoded length of the value in LEB128 variable length format.
/// The returned value will be between 1 and 10, inclusive.
#[inline]
pub const fn encoded_len_varint(value: u64) -> usize {
    // Based on [VarintSize64][1].
    // [1]: https://github.com/protocolbuffers/protobuf/blob/v28.3/src/google/protobuf/io/coded_stream.h#L1744-L1756
    ((((value | 1).leading_zeros() ^ 63) * 9 + 73) / 64) as usize
}

#[cfg(test)]
mod test {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn encode_varint_works() {
        // Examples from the encoding guide plus width boundaries.
        let cases: &[(u64, &[u8])] = &[
            (0, &[0x00]),
            (1, &[0x01]),
            (127, &[0x7F]),
            (128, &[0x80, 0x01]),
            (150, &[0x96, 0x01]),
            (300, &[0xAC, 0x02]),
            (16384, &[0x80, 0x80, 0x01]),
            (u32::MAX as u64, &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]),
            (
                u64::MAX,
                &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01],
            ),
        ];
        for &(value, expected) in cases {
            let mut buf = Vec::new();
            encode_varint(value, &mut buf);
            assert_eq!(buf, expected, "value {value}");
            assert_eq!(encoded_len_varint(value), expected.len(), "value {value}");
        }
    }

    #[test]
    fn encoded_len_matches_width_boundaries() {
        let mut boundaries = vec![(0u64, 1usize)];
        for width in 1..=9u32 {
            boundaries.push(((1 << (7 * width)) - 1, width as usize));
            boundaries.push((1 << (7 * width), width as usize + 1));
        }
        for (value, expected) in boundaries {
            assert_eq!(encoded_len_varint(value), expected, "value {value}");
        }
    }
}
