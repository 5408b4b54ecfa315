//! Frame encoding and decoding for the validator socket.
//!
//! A frame is a 4-byte big-endian payload length followed by exactly one
//! encoded [`shared_types::Message`].

use crate::errors::StreamError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Frame header size in bytes (length prefix).
pub const FRAME_HEADER_SIZE: usize = 4;

/// Write one frame and flush it.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8], max: usize) -> Result<(), StreamError>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > max || payload.len() > u32::MAX as usize {
        return Err(StreamError::FrameTooLarge {
            length: payload.len(),
            max,
        });
    }

    let mut buf = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buf.extend_from_slice(payload);

    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame's payload.
///
/// A clean EOF before the header surfaces as an `Io` error like any other
/// connection loss.
pub async fn read_frame<R>(reader: &mut R, max: usize) -> Result<Vec<u8>, StreamError>
where
    R: AsyncRead + Unpin,
{
    let length = reader.read_u32().await? as usize;
    if length > max {
        return Err(StreamError::FrameTooLarge { length, max });
    }

    let mut payload = vec![0u8; length];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}
