//! `tokio-util` decoder adapter over [`FrameParser`].
//!
//! [`VipaFrameCodec`] lets a byte stream (a serial port wrapped in an async
//! reader, a capture file, an in-memory pipe) be consumed with
//! [`FramedRead`](tokio_util::codec::FramedRead). It performs no I/O itself:
//! every chunk handed to [`Decoder::decode`] is moved into the parser and
//! completed payloads come back out one at a time.
//!
//! Protocol faults surface as [`io::ErrorKind::InvalidData`] errors whose
//! inner error is the [`FrameFault`].

use std::io;

use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;

use crate::{
    frame::FrameFault,
    parser::{DrainMode, FrameParser, Outcome},
    status::StatusCode,
};

/// A payload decoded from the stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseFrame {
    /// Payload bytes, status word excluded.
    pub payload: Bytes,
    /// Status word reported with the payload.
    pub status: StatusCode,
    /// `PCB` of the terminating packet.
    pub pcb: u8,
}

/// Decoder yielding one [`ResponseFrame`] per completed payload.
#[derive(Debug)]
pub struct VipaFrameCodec {
    parser: FrameParser,
    mode: DrainMode,
}

impl VipaFrameCodec {
    /// Decode frame by frame with `parser`.
    #[must_use]
    pub fn new(parser: FrameParser) -> Self {
        Self {
            parser,
            mode: DrainMode::Frames,
        }
    }

    /// Treat the whole stream as one chained response.
    #[must_use]
    pub fn chained_response(mut self) -> Self {
        self.mode = DrainMode::ChainedResponse;
        self
    }

    /// Borrow the underlying parser.
    #[must_use]
    pub fn parser(&self) -> &FrameParser { &self.parser }
}

impl Default for VipaFrameCodec {
    fn default() -> Self { Self::new(FrameParser::new()) }
}

impl Decoder for VipaFrameCodec {
    type Item = ResponseFrame;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if !src.is_empty() {
            let chunk = src.split();
            self.parser
                .append(&chunk, None)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        }
        match self.parser.next_outcome(self.mode) {
            None => Ok(None),
            Some(Outcome::Delivered(payload)) => Ok(Some(ResponseFrame {
                payload: Bytes::copy_from_slice(payload.bytes()),
                status: payload.status(),
                pcb: payload.pcb(),
            })),
            Some(Outcome::Rejected(fault)) => Err(invalid_data(fault)),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        let report = self.parser.sanity_report();
        if report.discarded_bytes == 0 && report.discarded_fragments == 0 {
            return Ok(None);
        }
        tracing::debug!(
            discarded_bytes = report.discarded_bytes,
            discarded_fragments = report.discarded_fragments,
            level = %report.level,
            "stream ended inside a frame"
        );
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "stream ended with {} buffered bytes and {} stored fragments",
                report.discarded_bytes, report.discarded_fragments
            ),
        ))
    }
}

fn invalid_data(fault: FrameFault) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, fault)
}

#[cfg(test)]
mod tests {
    use std::io;

    use bytes::BytesMut;
    use tokio_util::codec::Decoder;
    use vipaframe_testing::response;

    use super::VipaFrameCodec;
    use crate::{frame::FrameFault, status::StatusCode};

    #[test]
    fn yields_frames_one_at_a_time() {
        let mut codec = VipaFrameCodec::default();
        let mut src = BytesMut::new();
        src.extend_from_slice(&response(&[0x01], 0x90, 0x00));
        src.extend_from_slice(&response(&[0x02], 0x90, 0x00));

        let first = codec.decode(&mut src).expect("decode").expect("first frame");
        assert_eq!(first.payload.as_ref(), &[0x01]);
        assert!(src.is_empty());
        let second = codec.decode(&mut src).expect("decode").expect("second frame");
        assert_eq!(second.payload.as_ref(), &[0x02]);
        assert_eq!(second.status, StatusCode::SUCCESS);
        assert!(codec.decode(&mut src).expect("decode").is_none());
    }

    #[test]
    fn faults_become_invalid_data() {
        let mut codec = VipaFrameCodec::default();
        let mut frame = response(&[0x01], 0x90, 0x00);
        frame[0] = 0x09;
        let mut src = BytesMut::from(frame.as_slice());

        let err = codec.decode(&mut src).expect_err("rejected");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        let fault = err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<FrameFault>())
            .expect("frame fault");
        assert_eq!(fault, &FrameFault::InvalidNad { nad: 0x09 });
    }

    #[test]
    fn eof_inside_a_frame_is_reported() {
        let mut codec = VipaFrameCodec::default();
        let frame = response(&[0x01, 0x02], 0x90, 0x00);
        let mut src = BytesMut::from(&frame[..5]);

        let err = codec.decode_eof(&mut src).expect_err("truncated");
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(codec.parser().pending_len(), 0);
    }

    #[test]
    fn clean_eof_yields_none() {
        let mut codec = VipaFrameCodec::default();
        let mut src = BytesMut::new();
        assert!(codec.decode_eof(&mut src).expect("clean eof").is_none());
    }
}
