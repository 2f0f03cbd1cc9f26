use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::{Channel, Sender};
use heapless::String;

use crate::event::Event;
use crate::service::Request;

pub const MAX_LINE_LEN: usize = 512;
pub const LINE_CAPACITY: usize = 8;
pub const REQUEST_CAPACITY: usize = 4;
pub const EVENT_CAPACITY: usize = 8;

/// One line from the AT channel, without its line ending.
pub type Line = String<MAX_LINE_LEN>;

/// Channels shared by the [`Runner`](super::runner::Runner), the
/// [`Control`](super::control::Control) handle and the line ingress.
pub struct State {
    pub(crate) lines: Channel<NoopRawMutex, Line, LINE_CAPACITY>,
    pub(crate) requests: Channel<NoopRawMutex, Request, REQUEST_CAPACITY>,
    pub(crate) events: Channel<NoopRawMutex, Event, EVENT_CAPACITY>,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    pub const fn new() -> Self {
        Self {
            lines: Channel::new(),
            requests: Channel::new(),
            events: Channel::new(),
        }
    }

    /// Where the AT ingress delivers every line it reads, empty lines
    /// included. Multi-line toolkit notifications are assembled from these.
    pub fn lines(&self) -> Sender<'_, NoopRawMutex, Line, LINE_CAPACITY> {
        self.lines.sender()
    }
}
