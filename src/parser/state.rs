//! Mutable parser state and the single-step framing machine.
//!
//! Everything here runs with the parser's mutex held. Nothing in this module
//! calls handler code.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::{DrainMode, Payload};
use crate::{
    accumulator::ByteAccumulator,
    chain::{Fragment, FragmentStore, is_padding, reassemble_response},
    frame::{ErrorLevel, FrameFault, FrameKind, HEADER_LEN, validate},
    hex::HexSpan,
    metrics,
    pool::BufferPool,
};

/// Result of one step over the buffered bytes.
#[derive(Debug)]
pub(super) enum Step {
    /// Nothing buffered.
    Idle,
    /// The buffered bytes need more data before they can be framed.
    Pending,
    /// A chain fragment was stored; stepping again may make more progress.
    Absorbed,
    /// A complete payload is ready for a handler.
    Ready(Payload),
    /// The buffered bytes were rejected and discarded.
    Rejected(FrameFault),
}

/// Fixed inputs for a step.
pub(super) struct StepContext<'a> {
    pub pool: &'a Arc<BufferPool>,
    pub port: &'a str,
    pub max_packet_len: u8,
    pub mode: DrainMode,
}

/// Buffer, fragment store and error level guarded by the parser mutex.
#[derive(Debug)]
pub(super) struct ParserState {
    pub buffer: ByteAccumulator,
    pub fragments: FragmentStore,
    pub level: ErrorLevel,
}

impl ParserState {
    pub fn new(pool: Arc<BufferPool>) -> Self {
        Self {
            buffer: ByteAccumulator::new(pool),
            fragments: FragmentStore::new(),
            level: ErrorLevel::None,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.buffer.is_empty() && self.fragments.is_empty() && self.level == ErrorLevel::None
    }

    /// Examine the head of the buffer and act on it.
    pub fn step(&mut self, ctx: &StepContext<'_>) -> Step {
        let buf = self.buffer.as_slice();
        if buf.is_empty() {
            return Step::Idle;
        }
        if is_padding(buf) {
            debug!(port = ctx.port, len = buf.len(), "discarding zero padding");
            self.buffer.release();
            return Step::Idle;
        }

        let resuming = ctx.mode == DrainMode::ChainedResponse;
        match validate(buf, resuming, ctx.max_packet_len) {
            Ok(FrameKind::ChainFragment(header)) => {
                let body = &buf[HEADER_LEN..HEADER_LEN + header.body_len()];
                info!(port = ctx.port, bytes = %HexSpan(body), "chain fragment absorbed");
                self.fragments.push(Fragment::copy_from(ctx.pool, body));
                self.buffer.consume(header.frame_len());
                self.level = ErrorLevel::CombinedBytesMismatch;
                metrics::inc_chain_fragments();
                Step::Absorbed
            }
            Ok(FrameKind::Single { header, status }) => {
                let data = &buf[HEADER_LEN..HEADER_LEN + header.data_len()];
                let (storage, len) = self.fragments.assemble(ctx.pool, data);
                self.buffer.consume(header.frame_len());
                self.level = ErrorLevel::None;
                Step::Ready(Payload::new(storage, 0, len, status, header.pcb()))
            }
            Ok(FrameKind::ChainResponse) => match reassemble_response(ctx.pool, buf, ctx.port) {
                Ok(response) => {
                    info!(
                        port = ctx.port,
                        frames = response.frames(),
                        bytes = %HexSpan(response.payload()),
                        "chained response reassembled"
                    );
                    let (status, pcb) = (response.status(), response.pcb());
                    let (storage, start, len) = response.into_parts();
                    self.fragments.push(Fragment::from_storage(storage, start, len));
                    let (storage, len) = self.fragments.assemble(ctx.pool, &[]);
                    self.buffer.release();
                    self.level = ErrorLevel::None;
                    Step::Ready(Payload::new(storage, 0, len, status, pcb))
                }
                Err(fault) => self.hold_or_reject(ctx, fault),
            },
            Err(fault) => self.hold_or_reject(ctx, fault),
        }
    }

    fn hold_or_reject(&mut self, ctx: &StepContext<'_>, fault: FrameFault) -> Step {
        if !fault.is_pending() {
            return self.reject(ctx, fault);
        }
        self.level = fault.level();
        match fault {
            FrameFault::DeclaredLengthExceedsData {
                declared,
                available,
            } => info!(
                port = ctx.port,
                expected_len = declared,
                calculated_len = available,
                "waiting for the rest of the frame"
            ),
            _ => debug!(port = ctx.port, reason = %fault, "waiting for more bytes"),
        }
        Step::Pending
    }

    /// Drop the buffered bytes and any partial chain after a protocol fault.
    fn reject(&mut self, ctx: &StepContext<'_>, fault: FrameFault) -> Step {
        self.level = fault.level();
        error!(
            port = ctx.port,
            level = %self.level,
            error = %fault,
            bytes = %HexSpan(self.buffer.as_slice()),
            "frame rejected"
        );
        self.buffer.release();
        let dropped = self.fragments.take();
        if !dropped.is_empty() {
            warn!(port = ctx.port, count = dropped.len(), "partial chain abandoned");
        }
        Step::Rejected(fault)
    }

    /// Release the buffer and stored fragments, logging anything discarded.
    ///
    /// The error level is left for the caller to inspect. Returns the number
    /// of buffered bytes and stored fragments dropped.
    pub fn reset(&mut self, port: &str) -> (usize, usize) {
        let bytes = self.buffer.len();
        self.buffer.release();
        let fragments = self.fragments.take();
        if !fragments.is_empty() {
            warn!(port, count = fragments.len(), "sanity check found stored fragments");
            for fragment in &fragments {
                error!(port, bytes = %HexSpan(fragment.as_slice()), "discarding stored fragment");
            }
        }
        (bytes, fragments.len())
    }
}
