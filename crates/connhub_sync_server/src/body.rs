//! Request body adapters.

use axum::body::Body;
use bytes::Bytes;
use futures::StreamExt;
use std::io;
use std::time::Duration;
use tokio::io::AsyncBufRead;
use tokio_util::io::StreamReader;

/// Turns a request body into a buffered reader with an idle timeout.
///
/// Each wait for the next chunk is bounded by `idle`; a stall surfaces as an
/// [`io::ErrorKind::TimedOut`] read error and ends the stream.
pub fn body_reader(body: Body, idle: Duration) -> impl AsyncBufRead + Unpin + Send {
    let chunks = futures::stream::unfold(Some(body.into_data_stream()), move |state| async move {
        let mut data = state?;
        match tokio::time::timeout(idle, data.next()).await {
            Ok(Some(Ok(bytes))) => Some((Ok::<Bytes, io::Error>(bytes), Some(data))),
            Ok(Some(Err(e))) => Some((Err(io::Error::other(e)), None)),
            Ok(None) => None,
            Err(_) => Some((
                Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("no body data for {}ms", idle.as_millis()),
                )),
                None,
            )),
        }
    });
    StreamReader::new(Box::pin(chunks))
}
