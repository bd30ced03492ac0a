//! Handlers that record every call for later assertions.

use std::sync::{Arc, Mutex};

use vipaframe::{ResponseHandler, StatusCode, Tlv};

/// One handler invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recorded {
    /// Decoded tags, when the handler shape receives them.
    pub tags: Option<Vec<Tlv>>,
    /// Raw payload, filled for tagless handlers only.
    pub payload: Vec<u8>,
    /// Status word passed to the handler.
    pub status: StatusCode,
    /// `PCB` byte, filled for contactless handlers only.
    pub pcb: Option<u8>,
    /// Cancellation flag.
    pub cancelled: bool,
}

/// Shared list of recorded calls.
#[derive(Clone, Debug, Default)]
pub struct Recording(Arc<Mutex<Vec<Recorded>>>);

impl Recording {
    fn push(&self, call: Recorded) { self.0.lock().expect("recording poisoned").push(call); }

    /// Remove and return everything recorded so far.
    #[must_use]
    pub fn take(&self) -> Vec<Recorded> {
        std::mem::take(&mut *self.0.lock().expect("recording poisoned"))
    }

    /// Number of calls recorded so far.
    #[must_use]
    pub fn len(&self) -> usize { self.0.lock().expect("recording poisoned").len() }

    /// Whether no call has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// A [`ResponseHandler::Tags`] handler and its recording.
#[must_use]
pub fn recording_tags() -> (ResponseHandler<'static>, Recording) {
    let calls = Recording::default();
    let sink = calls.clone();
    let handler = ResponseHandler::tags(move |tags, status, cancelled| {
        sink.push(Recorded {
            tags,
            payload: Vec::new(),
            status,
            pcb: None,
            cancelled,
        });
    });
    (handler, calls)
}

/// A [`ResponseHandler::Contactless`] handler and its recording.
#[must_use]
pub fn recording_contactless() -> (ResponseHandler<'static>, Recording) {
    let calls = Recording::default();
    let sink = calls.clone();
    let handler = ResponseHandler::contactless(move |tags, status, pcb, cancelled| {
        sink.push(Recorded {
            tags,
            payload: Vec::new(),
            status,
            pcb: Some(pcb),
            cancelled,
        });
    });
    (handler, calls)
}

/// A [`ResponseHandler::Tagless`] handler and its recording.
#[must_use]
pub fn recording_tagless() -> (ResponseHandler<'static>, Recording) {
    let calls = Recording::default();
    let sink = calls.clone();
    let handler = ResponseHandler::tagless(move |payload, len, status, cancelled| {
        assert_eq!(payload.len(), len, "length argument matches payload");
        sink.push(Recorded {
            tags: None,
            payload: payload.to_vec(),
            status,
            pcb: None,
            cancelled,
        });
    });
    (handler, calls)
}
