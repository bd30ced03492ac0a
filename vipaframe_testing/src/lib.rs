//! Utilities for exercising a [`FrameParser`](vipaframe::FrameParser) in
//! integration tests.
//!
//! Packet builders produce correctly checksummed link traffic, recording
//! handlers capture what a drain call delivered, and the logging fixture
//! serialises access to the global `logtest` logger.
//!
//! ```rust
//! use vipaframe::{DrainMode, FrameParser};
//! use vipaframe_testing::{recording_tagless, response};
//!
//! let parser = FrameParser::new();
//! parser.append(&response(&[0x2A], 0x90, 0x00), None).unwrap();
//!
//! let (mut handler, calls) = recording_tagless();
//! parser.read_and_execute(&mut handler, DrainMode::Frames);
//! assert_eq!(calls.take()[0].payload, vec![0x2A]);
//! ```

pub mod frames;
pub mod handlers;
pub mod logging;

pub use frames::{chained_command, chained_response, nested_tlv, packet, response};
pub use handlers::{Recorded, Recording, recording_contactless, recording_tagless, recording_tags};
pub use logging::{LoggerHandle, logger};
