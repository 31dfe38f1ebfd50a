use bytes::{Buf, BufMut, BytesMut};
use std::io;

/// A length-prefixed frame: `{len: u64 big-endian}{item}`.
///
/// This is the on-the-wire unit exchanged by a connection: one frame carries the
/// request header+args, the other carries the response status+payload (spec
/// §4.2/§6: object encoding must be self-describing and both ends must read
/// exactly what the other wrote).
pub struct Frame;

impl Frame {
    pub const HEADER_SIZE: usize = 8;

    /// Writes `item` to `dst`, prefixed by its length.
    pub fn write(item: &[u8], dst: &mut BytesMut) {
        dst.reserve(Self::HEADER_SIZE + item.len());
        dst.put_u64(item.len() as u64);
        dst.put_slice(item);
    }

    /// Attempts to pull one complete frame's item out of `src`, advancing `src`
    /// past it. Returns `Ok(None)` if `src` does not yet contain a full frame.
    pub fn read(src: &mut BytesMut) -> io::Result<Option<Vec<u8>>> {
        if src.len() < Self::HEADER_SIZE {
            return Ok(None);
        }

        let item_len = u64::from_be_bytes(src[..Self::HEADER_SIZE].try_into().unwrap()) as usize;

        if src.len() < Self::HEADER_SIZE + item_len {
            return Ok(None);
        }

        src.advance(Self::HEADER_SIZE);
        let item = src.split_to(item_len).to_vec();
        Ok(Some(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_frame() {
        let mut buf = BytesMut::new();
        Frame::write(b"hello", &mut buf);
        let item = Frame::read(&mut buf).unwrap().unwrap();
        assert_eq!(item, b"hello");
        assert!(buf.is_empty());
    }

    #[test]
    fn returns_none_on_partial_frame() {
        let mut buf = BytesMut::new();
        Frame::write(b"hello", &mut buf);
        buf.truncate(buf.len() - 1);
        assert!(Frame::read(&mut buf).unwrap().is_none());
    }
}
