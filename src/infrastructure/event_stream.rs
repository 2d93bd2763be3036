// Chunked JSON event streaming
use crate::infrastructure::http_response::brotli_compress;
use axum::body::Body;
use axum::http::{header, HeaderMap, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use serde::Serialize;

pub const EVENT_STREAM_CONTENT_TYPE: &str = "application/x-ndjson-frames";
pub const FRAME_ENCODING_HEADER: &str = "x-frame-encoding";

/// Frame compression is opt-in: browsers always advertise `br` for the
/// response body but cannot decode individually compressed frames.
pub fn wants_compressed_frames(headers: &HeaderMap) -> bool {
    headers
        .get(FRAME_ENCODING_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().eq_ignore_ascii_case("br"))
        .unwrap_or(false)
}

/// Create a chunked streaming response of length-prefixed JSON frames
pub fn chunked_json_stream<S, T>(stream: S, compress: bool) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + Sync + 'static,
{
    let byte_stream = stream.then(move |event| async move { encode_frame(&event, compress).await });

    // Frames are compressed individually, so no Content-Encoding here
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, EVENT_STREAM_CONTENT_TYPE)
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(byte_stream))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// One frame: u32 big-endian payload length, then the (optionally Brotli
/// compressed) JSON payload.
pub async fn encode_frame<T: Serialize>(event: &T, compress: bool) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(event)?;
    let payload = if compress { brotli_compress(json).await? } else { json };

    let length = u32::try_from(payload.len())
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidData, "frame exceeds u32 length"))?;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Streaming response fed by a receiver; ends when the sender side closes
pub fn stream_from_receiver<T>(mut rx: tokio::sync::mpsc::Receiver<T>, compress: bool) -> impl IntoResponse
where
    T: Serialize + Send + Sync + 'static,
{
    let stream = async_stream::stream! {
        while let Some(event) = rx.recv().await {
            yield event;
        }
    };

    match chunked_json_stream(stream, compress) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Split a buffered stream body back into JSON payloads
#[cfg(test)]
pub fn decode_frames(mut bytes: &[u8]) -> Vec<serde_json::Value> {
    let mut frames = Vec::new();
    while bytes.len() >= 4 {
        let length = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        frames.push(serde_json::from_slice(&bytes[4..4 + length]).unwrap());
        bytes = &bytes[4 + length..];
    }
    frames
}
