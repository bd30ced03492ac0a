#![doc(html_root_url = "https://docs.rs/vipaframe/latest")]
//! Transport framing for a payment-terminal serial link.
//!
//! Bytes received from the link are buffered by a [`FrameParser`], validated
//! as `NAD PCB LEN … LRC` packets, reassembled when a message spans several
//! chained packets, and handed to a [`ResponseHandler`] together with the
//! packet's [`StatusCode`]. The crate performs no I/O; [`VipaFrameCodec`]
//! adapts the parser to `tokio-util` for callers reading from an async
//! stream.

pub mod accumulator;
pub mod byte_order;
pub mod chain;
pub mod codec;
pub mod config;
pub mod error;
pub mod frame;
pub mod handler;
pub mod hex;
pub mod metrics;
pub mod parser;
pub mod pool;
pub mod registry;
pub mod status;
pub mod tlv;


pub use codec::{ResponseFrame, VipaFrameCodec};
pub use config::ParserConfig;
pub use error::AppendError;
pub use frame::{ErrorLevel, FrameFault};
pub use handler::ResponseHandler;
pub use parser::{DrainMode, FrameParser, Outcome, Payload, SanityReport};
pub use pool::{BufferPool, PooledBuffer};
pub use registry::PortErrorRegistry;
pub use status::StatusCode;
pub use tlv::{BerTlvDecoder, NESTED_TAGS, TagDecoder, Tlv, TlvError};
