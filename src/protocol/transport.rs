use std::io;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::frame::Frame;
use crate::protocol::utils;
use crate::protocol::{RequestEnvelope, ResponseEnvelope};

/// Writes one length-prefixed, MessagePack-encoded value to `writer` and flushes
/// the stream, matching spec §4.2's "streams must be flushed after the request
/// header" requirement.
pub async fn write_value<W, T>(writer: &mut W, value: &T) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
    T: serde::Serialize,
{
    let bytes = utils::serialize_to_vec(value)?;
    let mut framed = BytesMut::new();
    Frame::write(&bytes, &mut framed);
    writer.write_all(&framed).await?;
    writer.flush().await
}

/// Reads exactly one length-prefixed, MessagePack-encoded value from `reader`.
/// A stream that ends before a full frame arrives is reported as
/// [`io::ErrorKind::UnexpectedEof`] (spec §6: "a short/corrupt stream is a
/// transport failure").
pub async fn read_value<R, T>(reader: &mut R) -> io::Result<T>
where
    R: AsyncRead + Unpin,
    T: serde::de::DeserializeOwned,
{
    let mut header = [0u8; Frame::HEADER_SIZE];
    reader.read_exact(&mut header).await?;
    let len = u64::from_be_bytes(header) as usize;

    let mut item = vec![0u8; len];
    reader.read_exact(&mut item).await?;

    utils::deserialize_from_slice(&item)
}

pub async fn write_request<W: AsyncWrite + Unpin>(
    writer: &mut W,
    request: &RequestEnvelope,
) -> io::Result<()> {
    write_value(writer, request).await
}

pub async fn read_request<R: AsyncRead + Unpin>(reader: &mut R) -> io::Result<RequestEnvelope> {
    read_value(reader).await
}

pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &ResponseEnvelope,
) -> io::Result<()> {
    write_value(writer, response).await
}

pub async fn read_response<R: AsyncRead + Unpin>(reader: &mut R) -> io::Result<ResponseEnvelope> {
    read_value(reader).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ResponseStatus, Value};

    #[tokio::test]
    async fn round_trips_a_request_over_an_in_memory_pipe() {
        let (mut client, mut server) = tokio::io::duplex(4096);

        let request = RequestEnvelope::new("echo", vec![Value::new("hi")]);
        write_request(&mut client, &request).await.unwrap();

        let received = read_request(&mut server).await.unwrap();
        assert_eq!(received.method, "echo");
    }

    #[tokio::test]
    async fn round_trips_a_response_over_an_in_memory_pipe() {
        let (mut client, mut server) = tokio::io::duplex(4096);

        let response = ResponseEnvelope {
            id: 1,
            origin_id: 2,
            status: ResponseStatus::Ok,
            payload: Value::new("hi"),
        };
        write_response(&mut server, &response).await.unwrap();

        let received = read_response(&mut client).await.unwrap();
        assert_eq!(received.origin_id, 2);
        assert!(received.status.is_ok());
    }

    #[tokio::test]
    async fn reports_short_stream_as_unexpected_eof() {
        let (mut client, server) = tokio::io::duplex(4096);
        drop(server);

        let err = read_request(&mut client).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
