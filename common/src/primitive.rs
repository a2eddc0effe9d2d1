//! Primitive wire encoding helpers, written in the same spirit as the
//! teacher's `parser/primitive.rs`: one small function per field type,
//! big-endian throughout.

use byteorder::{BigEndian, ByteOrder};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    Truncated,
    InvalidUtf8,
    TooLong,
}

pub type Result<T> = std::result::Result<T, PrimitiveError>;

pub fn write_u16(out: &mut Vec<u8>, v: u16) {
    let mut buf = [0u8; 2];
    BigEndian::write_u16(&mut buf, v);
    out.extend_from_slice(&buf);
}

pub fn write_u32(out: &mut Vec<u8>, v: u32) {
    let mut buf = [0u8; 4];
    BigEndian::write_u32(&mut buf, v);
    out.extend_from_slice(&buf);
}

pub fn write_i32(out: &mut Vec<u8>, v: i32) {
    write_u32(out, v as u32)
}

pub fn write_u64(out: &mut Vec<u8>, v: u64) {
    let mut buf = [0u8; 8];
    BigEndian::write_u64(&mut buf, v);
    out.extend_from_slice(&buf);
}

pub fn write_bytes(out: &mut Vec<u8>, v: &[u8]) {
    write_u32(out, v.len() as u32);
    out.extend_from_slice(v);
}

pub fn write_string(out: &mut Vec<u8>, v: &str) {
    write_bytes(out, v.as_bytes())
}

fn take<'a>(src: &mut &'a [u8], n: usize) -> Result<&'a [u8]> {
    if src.len() < n {
        return Err(PrimitiveError::Truncated);
    }
    let (head, tail) = src.split_at(n);
    *src = tail;
    Ok(head)
}

pub fn read_u16(src: &mut &[u8]) -> Result<u16> {
    Ok(BigEndian::read_u16(take(src, 2)?))
}

pub fn read_u32(src: &mut &[u8]) -> Result<u32> {
    Ok(BigEndian::read_u32(take(src, 4)?))
}

pub fn read_i32(src: &mut &[u8]) -> Result<i32> {
    Ok(read_u32(src)? as i32)
}

pub fn read_u64(src: &mut &[u8]) -> Result<u64> {
    Ok(BigEndian::read_u64(take(src, 8)?))
}

pub fn read_bytes(src: &mut &[u8], max_len: usize) -> Result<Vec<u8>> {
    let len = read_u32(src)? as usize;
    if len > max_len {
        return Err(PrimitiveError::TooLong);
    }
    Ok(take(src, len)?.to_vec())
}

pub fn read_string(src: &mut &[u8], max_len: usize) -> Result<String> {
    let bytes = read_bytes(src, max_len)?;
    String::from_utf8(bytes).map_err(|_| PrimitiveError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_primitives() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 42);
        write_string(&mut buf, "hello");
        write_i32(&mut buf, -7);

        let mut cursor: &[u8] = &buf;
        assert_eq!(read_u32(&mut cursor).unwrap(), 42);
        assert_eq!(read_string(&mut cursor, 16).unwrap(), "hello");
        assert_eq!(read_i32(&mut cursor).unwrap(), -7);
        assert!(cursor.is_empty());
    }

    #[test]
    fn string_over_max_len_is_rejected() {
        let mut buf = Vec::new();
        write_string(&mut buf, "too long for the cap");
        let mut cursor: &[u8] = &buf;
        assert_eq!(read_string(&mut cursor, 4), Err(PrimitiveError::TooLong));
    }

    #[test]
    fn truncated_input_is_rejected() {
        let mut cursor: &[u8] = &[0, 0];
        assert_eq!(read_u32(&mut cursor), Err(PrimitiveError::Truncated));
    }
}
