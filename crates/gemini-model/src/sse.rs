//! Incremental decoding of `text/event-stream` bodies.

#[cfg(test)]
use std::collections::VecDeque;

use bytes::Bytes;
use reqwest::Response;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Transport,
    InvalidPayload,
}

/// A source of raw body chunks.
pub enum ByteSource {
    Http(Response),
    #[cfg(test)]
    Scripted(VecDeque<Bytes>),
}

impl ByteSource {
    pub fn from_response(response: Response) -> Self {
        ByteSource::Http(response)
    }

    #[cfg(test)]
    pub fn from_chunks(chunks: VecDeque<Bytes>) -> Self {
        ByteSource::Scripted(chunks)
    }

    async fn next(&mut self) -> Result<Option<Bytes>, Error> {
        match self {
            ByteSource::Http(response) => {
                response.chunk().await.map_err(|_| Error::Transport)
            }
            #[cfg(test)]
            ByteSource::Scripted(chunks) => Ok(chunks.pop_front()),
        }
    }
}

/// A type for reading server-sent events from a chunk stream.
///
/// Only the `data` field is meaningful for this API. Comment lines and
/// other fields are skipped, and an event spreading its payload over
/// several `data:` lines has them joined with a newline, per the
/// event-stream format. Both LF and CRLF terminators occur in the wild.
///
/// The buffer holds raw bytes and events are decoded as UTF-8 only once
/// complete, so a multi-byte character split across two body chunks is
/// not a decode error.
pub struct EventReader {
    buf: Vec<u8>,
    source: ByteSource,
}

impl EventReader {
    #[inline]
    pub fn new(source: ByteSource) -> Self {
        Self {
            buf: Vec::new(),
            source,
        }
    }

    pub async fn next_event(&mut self) -> Result<Option<String>, Error> {
        loop {
            // There may already be a complete event in the buffer.
            if let Some(event) = self.take_event()? {
                return Ok(Some(event));
            }

            let Some(bytes) = self.source.next().await? else {
                // End of body. A trailing block without its terminator
                // is dropped.
                return Ok(None);
            };
            self.buf.extend_from_slice(&bytes);
        }
    }

    /// Takes the next data-carrying event off the buffer, if a complete
    /// one is present.
    fn take_event(&mut self) -> Result<Option<String>, Error> {
        loop {
            let lf = find(&self.buf, b"\n\n");
            let crlf = find(&self.buf, b"\r\n\r\n");
            let (end, terminator) = match (lf, crlf) {
                (Some(lf), Some(crlf)) if crlf < lf => (crlf, 4),
                (Some(lf), _) => (lf, 2),
                (None, Some(crlf)) => (crlf, 4),
                (None, None) => return Ok(None),
            };

            let Ok(block) = str::from_utf8(&self.buf[..end]) else {
                return Err(Error::InvalidPayload);
            };

            let mut data: Option<String> = None;
            for line in block.lines() {
                let Some(value) = line.strip_prefix("data:") else {
                    continue;
                };
                let value = value.strip_prefix(' ').unwrap_or(value);
                match &mut data {
                    Some(data) => {
                        data.push('\n');
                        data.push_str(value);
                    }
                    None => data = Some(value.to_owned()),
                }
            }

            self.buf.drain(..end + terminator);

            // An event without a data field (e.g. a keep-alive comment)
            // is skipped.
            if data.is_some() {
                return Ok(data);
            }
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(chunks: Vec<Bytes>) -> EventReader {
        EventReader::new(ByteSource::from_chunks(chunks.into()))
    }

    #[tokio::test]
    async fn test_normal_events() {
        let mut events = reader(vec![
            Bytes::from_static(b"data: hola\n\n"),
            Bytes::from_static(b"data: chau\n\n"),
        ]);
        assert_eq!(events.next_event().await.unwrap().unwrap(), "hola");
        assert_eq!(events.next_event().await.unwrap().unwrap(), "chau");
        assert_eq!(events.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_quirk_streaming() {
        let mut events = reader(vec![
            Bytes::from_static(b"data:"),
            Bytes::from_static(b" hola\n"),
            Bytes::from_static(b"\n"),
        ]);
        assert_eq!(events.next_event().await.unwrap().unwrap(), "hola");
        assert_eq!(events.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_crlf_terminators() {
        let mut events = reader(vec![Bytes::from_static(
            b"data: uno\r\n\r\ndata: dos\r\n\r\n",
        )]);
        assert_eq!(events.next_event().await.unwrap().unwrap(), "uno");
        assert_eq!(events.next_event().await.unwrap().unwrap(), "dos");
        assert_eq!(events.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_multi_line_data() {
        let mut events = reader(vec![Bytes::from_static(
            b"data: {\ndata: \"x\": 1}\n\n",
        )]);
        assert_eq!(
            events.next_event().await.unwrap().unwrap(),
            "{\n\"x\": 1}"
        );
    }

    #[tokio::test]
    async fn test_skips_comments_and_other_fields() {
        let mut events = reader(vec![Bytes::from_static(
            b": keep-alive\n\nevent: ping\nid: 7\n\ndata: hola\n\n",
        )]);
        assert_eq!(events.next_event().await.unwrap().unwrap(), "hola");
        assert_eq!(events.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_utf8_split_across_chunks() {
        // "¿" is two bytes; split them across chunk boundaries.
        let payload = "data: ¿qué tal?\n\n".as_bytes();
        let mut events = reader(vec![
            Bytes::copy_from_slice(&payload[..7]),
            Bytes::copy_from_slice(&payload[7..]),
        ]);
        assert_eq!(
            events.next_event().await.unwrap().unwrap(),
            "¿qué tal?"
        );
    }

    #[tokio::test]
    async fn test_unterminated_block_dropped() {
        let mut events = reader(vec![Bytes::from_static(b"data: hola\n")]);
        assert_eq!(events.next_event().await.unwrap(), None);
    }
}
