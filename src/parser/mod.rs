//! The dispatch loop turning received chunks into handler calls.
//!
//! [`FrameParser`] owns one byte accumulator, one fragment store and the
//! current [`ErrorLevel`], all behind a single mutex. [`FrameParser::append`]
//! and the drain operations both take that mutex; handlers are only called
//! once it has been released, with data already copied out of the buffer.
//!
//! ```
//! use vipaframe::{FrameParser, ResponseHandler, StatusCode};
//!
//! let parser = FrameParser::new();
//! parser.append(&[0x01, 0x00, 0x03], None).unwrap();
//! parser.append(&[0x2A, 0x90, 0x00, 0xB8], None).unwrap();
//!
//! let mut received = Vec::new();
//! let mut handler = ResponseHandler::tagless(|payload, _, status, _| {
//!     received.push((payload.to_vec(), status));
//! });
//! parser.read_and_execute(&mut handler, Default::default());
//! drop(handler);
//!
//! assert_eq!(received, vec![(vec![0x2A], StatusCode::SUCCESS)]);
//! assert!(parser.sanity_check());
//! ```

mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use self::state::{ParserState, Step, StepContext};
use crate::{
    config::ParserConfig,
    error::AppendError,
    frame::{ErrorLevel, FrameFault},
    handler::ResponseHandler,
    hex::HexSpan,
    metrics,
    pool::{BufferPool, PooledBuffer},
    registry::PortErrorRegistry,
    status::StatusCode,
    tlv::{BerTlvDecoder, TagDecoder, Tlv},
};

/// How the buffered bytes are interpreted by a drain call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrainMode {
    /// Frame-by-frame; chained commands are absorbed packet by packet.
    #[default]
    Frames,
    /// The buffer holds a chained response to be walked as a whole.
    ChainedResponse,
}

/// A complete payload ready for delivery.
#[derive(Debug)]
pub struct Payload {
    storage: PooledBuffer,
    start: usize,
    len: usize,
    status: StatusCode,
    pcb: u8,
}

impl Payload {
    pub(crate) fn new(
        storage: PooledBuffer,
        start: usize,
        len: usize,
        status: StatusCode,
        pcb: u8,
    ) -> Self {
        Self {
            storage,
            start,
            len,
            status,
            pcb,
        }
    }

    /// Payload bytes, status word excluded.
    #[must_use]
    pub fn bytes(&self) -> &[u8] { &self.storage[self.start..self.start + self.len] }

    /// Number of payload bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.len }

    /// Whether the payload carries no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Status word reported with the payload.
    #[must_use]
    pub fn status(&self) -> StatusCode { self.status }

    /// `PCB` of the terminating packet.
    #[must_use]
    pub fn pcb(&self) -> u8 { self.pcb }
}

/// What a drain step produced.
#[derive(Debug)]
pub enum Outcome {
    /// A complete payload.
    Delivered(Payload),
    /// The buffered bytes were rejected and discarded.
    Rejected(FrameFault),
}

/// State observed by [`FrameParser::sanity_report`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SanityReport {
    /// Whether nothing needed resetting.
    pub was_clean: bool,
    /// Error level at the time of the call. The reset leaves it in place.
    pub level: ErrorLevel,
    /// Buffered bytes released.
    pub discarded_bytes: usize,
    /// Stored chain fragments released.
    pub discarded_fragments: usize,
}

/// Framing and reassembly engine for one serial connection.
pub struct FrameParser {
    pool: Arc<BufferPool>,
    port: Option<String>,
    registry: Arc<PortErrorRegistry>,
    decoder: Box<dyn TagDecoder>,
    nested_tags: Vec<u32>,
    max_packet_len: u8,
    state: Mutex<ParserState>,
}

impl FrameParser {
    /// Unbound parser with default settings.
    #[must_use]
    pub fn new() -> Self { Self::with_config(ParserConfig::default()) }

    /// Parser configured from `config`, counting errors in the process-wide
    /// registry.
    #[must_use]
    pub fn with_config(config: ParserConfig) -> Self {
        Self::with_registry(config, PortErrorRegistry::global())
    }

    /// Parser configured from `config`, counting errors in `registry`.
    ///
    /// A bound port is registered with a zero count straight away.
    #[must_use]
    pub fn with_registry(config: ParserConfig, registry: Arc<PortErrorRegistry>) -> Self {
        let port = config.bound_port().map(str::to_owned);
        if let Some(port) = port.as_deref() {
            registry.register(port);
        }
        let pool = BufferPool::new();
        Self {
            state: Mutex::new(ParserState::new(Arc::clone(&pool))),
            pool,
            port,
            registry,
            decoder: Box::new(BerTlvDecoder),
            nested_tags: config.nested_tags,
            max_packet_len: config.max_packet_len,
        }
    }

    /// Replace the TLV decoder.
    #[must_use]
    pub fn with_decoder(mut self, decoder: impl TagDecoder + 'static) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    /// Rent storage from `pool` instead of a private one.
    ///
    /// Anything already buffered is discarded.
    #[must_use]
    pub fn with_pool(mut self, pool: Arc<BufferPool>) -> Self {
        self.state = Mutex::new(ParserState::new(Arc::clone(&pool)));
        self.pool = pool;
        self
    }

    /// Port this parser is bound to.
    #[must_use]
    pub fn port(&self) -> Option<&str> { self.port.as_deref() }

    /// Pool backing the buffers of this parser.
    #[must_use]
    pub fn pool(&self) -> &Arc<BufferPool> { &self.pool }

    /// Current error level.
    #[must_use]
    pub fn error_level(&self) -> ErrorLevel { self.lock_state().level }

    /// Number of received bytes not yet dispatched.
    #[must_use]
    pub fn pending_len(&self) -> usize { self.lock_state().buffer.len() }

    /// Number of chain fragments waiting for their terminating packet.
    #[must_use]
    pub fn pending_fragments(&self) -> usize { self.lock_state().fragments.len() }

    /// Buffer a received chunk.
    ///
    /// Only the first `declared_len` bytes are taken when given; `None` or
    /// `Some(0)` take the whole chunk. Empty chunks are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AppendError::LengthExceedsChunk`] when `declared_len` is
    /// larger than the chunk. Nothing is buffered in that case.
    pub fn append(&self, chunk: &[u8], declared_len: Option<usize>) -> Result<(), AppendError> {
        let len = match declared_len {
            Some(declared) if declared > chunk.len() => {
                return Err(AppendError::LengthExceedsChunk {
                    declared,
                    actual: chunk.len(),
                });
            }
            None | Some(0) => chunk.len(),
            Some(declared) => declared,
        };
        if len == 0 {
            return Ok(());
        }
        self.lock_state().buffer.append(&chunk[..len]);
        Ok(())
    }

    /// Advance the framing machine until a payload completes, a fault is
    /// found, or more bytes are needed.
    ///
    /// Rejections are counted against the bound port. Returns `None` when
    /// nothing further can be produced from the buffered bytes.
    pub fn next_outcome(&self, mode: DrainMode) -> Option<Outcome> {
        let ctx = StepContext {
            pool: &self.pool,
            port: self.port_label(),
            max_packet_len: self.max_packet_len,
            mode,
        };
        let mut state = self.lock_state();
        loop {
            let step = state.step(&ctx);
            match step {
                Step::Absorbed => {}
                Step::Idle | Step::Pending => return None,
                Step::Ready(payload) => {
                    metrics::inc_dispatched();
                    return Some(Outcome::Delivered(payload));
                }
                Step::Rejected(fault) => {
                    drop(state);
                    self.record_fault(&fault);
                    return Some(Outcome::Rejected(fault));
                }
            }
        }
    }

    /// Drain the buffer, calling `handler` once per completed payload.
    ///
    /// A rejected frame notifies a [`ResponseHandler::Tags`] handler with
    /// absent tags and [`StatusCode::FAILURE`] and ends the call. Payloads are
    /// TLV-decoded only for tag-based handlers and only when the status is
    /// [`StatusCode::SUCCESS`]. Returns the number of payloads delivered.
    pub fn read_and_execute(&self, handler: &mut ResponseHandler<'_>, mode: DrainMode) -> usize {
        let mut delivered = 0;
        while let Some(outcome) = self.next_outcome(mode) {
            match outcome {
                Outcome::Delivered(payload) => {
                    let tags = if handler.wants_tags() {
                        self.decode(&payload)
                    } else {
                        None
                    };
                    handler.deliver(tags, payload.bytes(), payload.status(), payload.pcb());
                    delivered += 1;
                }
                Outcome::Rejected(_) => {
                    handler.fail();
                    break;
                }
            }
        }
        delivered
    }

    /// Release buffered bytes and stored fragments, reporting what was found.
    ///
    /// The error level is not touched: it stays available through
    /// [`FrameParser::error_level`] and only a successfully dispatched frame
    /// clears it. A parser whose last frame was rejected therefore keeps
    /// reporting itself as not clean.
    pub fn sanity_report(&self) -> SanityReport {
        let mut state = self.lock_state();
        let was_clean = state.is_clean();
        let level = state.level;
        let (discarded_bytes, discarded_fragments) = state.reset(self.port_label());
        SanityReport {
            was_clean,
            level,
            discarded_bytes,
            discarded_fragments,
        }
    }

    /// Release pending bytes and fragments; returns whether the parser was
    /// already clean (nothing buffered, nothing stored, level
    /// [`ErrorLevel::None`]).
    pub fn sanity_check(&self) -> bool { self.sanity_report().was_clean }

    fn decode(&self, payload: &Payload) -> Option<Vec<Tlv>> {
        if !payload.status().is_success() {
            return None;
        }
        match self.decoder.decode(payload.bytes(), &self.nested_tags) {
            Ok(tags) => {
                debug!(
                    port = self.port_label(),
                    bytes = %HexSpan(payload.bytes()),
                    "decoded payload"
                );
                Some(tags)
            }
            Err(e) => {
                warn!(port = self.port_label(), error = %e, "payload is not a valid TLV stream");
                None
            }
        }
    }

    fn record_fault(&self, fault: &FrameFault) {
        metrics::inc_frame_errors(fault.level());
        if let Some(port) = self.port.as_deref() {
            let total = self.registry.record(port);
            debug!(port, total, "read error recorded");
        }
    }

    fn port_label(&self) -> &str { self.port.as_deref().unwrap_or_default() }

    fn lock_state(&self) -> MutexGuard<'_, ParserState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FrameParser {
    fn default() -> Self { Self::new() }
}

impl std::fmt::Debug for FrameParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameParser")
            .field("port", &self.port)
            .field("max_packet_len", &self.max_packet_len)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
