//! Wire framing utilities
//!
//! Length-prefixed frames carrying RPC payloads over a reliable stream.

use crate::error::ChordError;
use anyhow::Result;
use bytes::{Buf, BufMut, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Maximum accepted frame payload length.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Read a complete length-prefixed frame from the stream
pub async fn read_frame<R: AsyncReadExt + Unpin>(reader: &mut R) -> Result<Vec<u8>> {
    // Read the length prefix (4 bytes)
    let mut length_buf = [0u8; 4];
    reader.read_exact(&mut length_buf).await?;
    let length = u32::from_be_bytes(length_buf) as usize;

    if length == 0 || length > MAX_FRAME_LEN {
        return Err(ChordError::protocol_error_with_source(
            "Invalid frame length",
            format!("{} bytes", length),
        )
        .into());
    }

    // Read the frame payload
    let mut payload = vec![0u8; length];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

/// Write a length-prefixed frame to the stream
pub async fn write_frame<W: AsyncWriteExt + Unpin>(writer: &mut W, payload: &[u8]) -> Result<()> {
    if payload.is_empty() || payload.len() > MAX_FRAME_LEN {
        return Err(ChordError::protocol_error_with_source(
            "Invalid frame length",
            format!("{} bytes", payload.len()),
        )
        .into());
    }

    writer.write_all(&(payload.len() as u32).to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read a length-prefixed frame from the buffer, if complete
pub fn decode_frame(buf: &mut BytesMut) -> Result<Option<Vec<u8>>> {
    if buf.len() < 4 {
        return Ok(None);
    }

    let length = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    if length == 0 || length > MAX_FRAME_LEN {
        return Err(ChordError::protocol_error_with_source(
            "Invalid frame length",
            format!("{} bytes", length),
        )
        .into());
    }

    if buf.len() < 4 + length {
        return Ok(None);
    }

    let payload = buf[4..4 + length].to_vec();
    buf.advance(4 + length);

    Ok(Some(payload))
}

/// Write a length-prefixed frame to the buffer
pub fn encode_frame(buf: &mut BytesMut, payload: &[u8]) {
    buf.put_u32(payload.len() as u32);
    buf.put_slice(payload);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_frame() {
        let mut buf = BytesMut::new();
        let payload = b"hello";
        encode_frame(&mut buf, payload);

        let result = decode_frame(&mut buf).unwrap().unwrap();
        assert_eq!(result, payload);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_frame_incomplete() {
        let mut buf = BytesMut::new();
        buf.put_u32(10); // Length prefix says 10 bytes
        buf.put_slice(b"hello"); // But only 5 bytes available

        let result = decode_frame(&mut buf).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_decode_frame_short_prefix() {
        let mut buf = BytesMut::new();
        buf.put_slice(&[0, 0]);
        assert!(decode_frame(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_decode_frame_rejects_oversized() {
        let mut buf = BytesMut::new();
        buf.put_u32((MAX_FRAME_LEN + 1) as u32);
        assert!(decode_frame(&mut buf).is_err());
    }

    #[test]
    fn test_decode_frame_rejects_empty() {
        let mut buf = BytesMut::new();
        buf.put_u32(0);
        assert!(decode_frame(&mut buf).is_err());
    }

    #[tokio::test]
    async fn test_read_write_frame_round_trip() {
        let payload = br#"{"method":"ping"}"#.to_vec();
        let mut stream = Vec::new();
        write_frame(&mut stream, &payload).await.unwrap();

        let mut reader = std::io::Cursor::new(stream);
        let result = read_frame(&mut reader).await.unwrap();
        assert_eq!(result, payload);
    }

    #[tokio::test]
    async fn test_read_frame_rejects_oversized() {
        let mut stream = Vec::new();
        stream.extend_from_slice(&((MAX_FRAME_LEN + 1) as u32).to_be_bytes());
        stream.extend_from_slice(&[0u8; 16]);

        let mut reader = std::io::Cursor::new(stream);
        assert!(read_frame(&mut reader).await.is_err());
    }

    #[tokio::test]
    async fn test_read_frame_truncated_payload() {
        let mut stream = Vec::new();
        stream.extend_from_slice(&8u32.to_be_bytes());
        stream.extend_from_slice(b"abc");

        let mut reader = std::io::Cursor::new(stream);
        assert!(read_frame(&mut reader).await.is_err());
    }

    #[tokio::test]
    async fn test_write_frame_rejects_empty() {
        let mut stream = Vec::new();
        assert!(write_frame(&mut stream, b"").await.is_err());
    }
}
