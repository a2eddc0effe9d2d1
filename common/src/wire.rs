//! Length-prefixed framing of [`Record`]s over a plain TCP stream.
//!
//! Every record is sent as a 4-byte big-endian length prefix followed by
//! that many bytes of encoded body. Any short read, bad length, or socket
//! error fails the session (spec §4.1) — the caller is responsible for
//! rolling back whatever state it owns.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::message::{DecodeError, Record};
use crate::MAX_RECORD_LEN;

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("connection closed")]
    Closed,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("record length {0} exceeds maximum {MAX_RECORD_LEN}")]
    TooLarge(usize),
    #[error("malformed record: {0}")]
    Decode(#[from] DecodeError),
}

/// Reads one length-prefixed record from `stream`.
pub async fn read_record<S>(stream: &mut S) -> Result<Record, WireError>
where
    S: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match stream.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Err(WireError::Closed),
        Err(e) => return Err(WireError::Io(e)),
    }
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_RECORD_LEN {
        return Err(WireError::TooLarge(len));
    }

    let mut body = vec![0u8; len];
    stream.read_exact(&mut body).await?;

    let mut cursor: &[u8] = &body;
    let record = Record::decode(&mut cursor)?;
    Ok(record)
}

/// Writes one length-prefixed record to `stream` and flushes it.
pub async fn write_record<S>(stream: &mut S, record: &Record) -> Result<(), WireError>
where
    S: AsyncWrite + Unpin,
{
    let mut body = Vec::new();
    record.encode(&mut body);
    if body.len() > MAX_RECORD_LEN {
        return Err(WireError::TooLarge(body.len()));
    }

    let mut framed = Vec::with_capacity(4 + body.len());
    framed.extend_from_slice(&(body.len() as u32).to_be_bytes());
    framed.extend_from_slice(&body);

    stream.write_all(&framed).await?;
    stream.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageKind;

    #[tokio::test]
    async fn round_trips_over_an_in_memory_duplex() {
        let (mut client, mut server) = tokio::io::duplex(4096);

        let rec = Record::ok_response("hi");
        let sent = rec.clone();
        let writer = tokio::spawn(async move { write_record(&mut client, &sent).await });

        let received = read_record(&mut server).await.unwrap();
        writer.await.unwrap().unwrap();

        assert_eq!(received, rec);
    }

    #[tokio::test]
    async fn closed_stream_yields_closed_error() {
        let (client, mut server) = tokio::io::duplex(4096);
        drop(client);
        let err = read_record(&mut server).await.unwrap_err();
        assert!(matches!(err, WireError::Closed));
    }

    #[tokio::test]
    async fn oversized_length_prefix_is_rejected() {
        let (mut client, mut server) = tokio::io::duplex(8);
        let huge = (MAX_RECORD_LEN as u32 + 1).to_be_bytes();
        let _ = client.write_all(&huge).await;
        let err = read_record(&mut server).await.unwrap_err();
        assert!(matches!(err, WireError::TooLarge(_)));
        let _ = MessageKind::Ack;
    }
}
