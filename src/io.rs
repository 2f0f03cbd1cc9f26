//! Side effects of the state machines.
//!
//! The machines never talk to the AT channel directly. They describe what
//! should happen through [`Io`], and the runner (or a test) carries it out.

use embassy_time::Duration;
use heapless::{Deque, Vec};

use crate::command::Command;
use crate::error::Error;
use crate::event::Event;

pub const OUTBOX_COMMANDS: usize = 16;
pub const OUTBOX_EVENTS: usize = 8;

/// One-shot timers. Arming a timer that is already armed restarts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerId {
    /// Forces a menu fetch when a session abort was not confirmed
    StkAbortFallback,
    /// Starts a toolkit session once a new SIM settled
    StkSimSettle,
    /// Re-sends the failed SMS readiness probe
    SmsProbeRetry,
    /// Reports a suspend as done
    SuspendFlush,
}

impl TimerId {
    pub const COUNT: usize = 4;
    pub const ALL: [TimerId; Self::COUNT] = [
        Self::StkAbortFallback,
        Self::StkSimSettle,
        Self::SmsProbeRetry,
        Self::SuspendFlush,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::StkAbortFallback => 0,
            Self::StkSimSettle => 1,
            Self::SmsProbeRetry => 2,
            Self::SuspendFlush => 3,
        }
    }
}

/// Tag routing the outcome of a [`Io::chat`] back to the machine that asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Completion {
    StkMenuFetch,
    /// `+VTS` of a key tone, the next tone follows its outcome
    KeyTone,
    SmsFormatProbe,
    SmsStorageProbe,
    BandQuery,
    BandSet,
    SuspendSignalQualityOff,
    WakeSignalQualityOn,
    ExtendedVersion,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub command: Command,
    pub completion: Option<Completion>,
    /// Re-send on failure
    pub retry: bool,
}

/// Queueing a command or an event fails with [`Error::QueueFull`] when there
/// is no room left for it.
pub trait Io {
    /// Queue a command, ignoring its outcome.
    fn send(&mut self, command: Command) -> Result<(), Error>;

    /// Queue a command that is re-sent until it succeeds or the attempts run
    /// out.
    fn send_retry(&mut self, command: Command) -> Result<(), Error>;

    /// Queue a command and report its outcome tagged with `completion`.
    fn chat(&mut self, command: Command, completion: Completion) -> Result<(), Error>;

    /// The next raw line continues a multi-line notification.
    fn request_next_line(&mut self);

    /// Stop a dial attempt that has not reached the network yet.
    fn abort_dial(&mut self);

    fn start_timer(&mut self, timer: TimerId, after: Duration);

    fn emit(&mut self, event: Event) -> Result<(), Error>;
}

/// Buffering [`Io`] drained by the runner after every dispatch.
#[derive(Debug, Default)]
pub struct Outbox {
    commands: Deque<Outgoing, OUTBOX_COMMANDS>,
    events: Deque<Event, OUTBOX_EVENTS>,
    timers: Vec<(TimerId, Duration), { TimerId::COUNT }>,
    abort_dial: bool,
    line_requests: u32,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pop_command(&mut self) -> Option<Outgoing> {
        self.commands.pop_front()
    }

    pub fn pop_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    /// Timers armed since the last call, in arming order.
    pub fn take_timers(&mut self) -> Vec<(TimerId, Duration), { TimerId::COUNT }> {
        core::mem::take(&mut self.timers)
    }

    pub fn take_abort_dial(&mut self) -> bool {
        core::mem::take(&mut self.abort_dial)
    }

    /// Continuation lines requested so far.
    pub fn line_requests(&self) -> u32 {
        self.line_requests
    }

    pub fn commands(&self) -> impl Iterator<Item = &Outgoing> {
        self.commands.iter()
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn timers(&self) -> &[(TimerId, Duration)] {
        &self.timers
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.events.is_empty() && self.timers.is_empty() && !self.abort_dial
    }

    fn queue(&mut self, outgoing: Outgoing) -> Result<(), Error> {
        self.commands.push_back(outgoing).map_err(|_| {
            error!("Command queue full, dropping command");
            Error::QueueFull
        })
    }
}

impl Io for Outbox {
    fn send(&mut self, command: Command) -> Result<(), Error> {
        self.queue(Outgoing {
            command,
            completion: None,
            retry: false,
        })
    }

    fn send_retry(&mut self, command: Command) -> Result<(), Error> {
        self.queue(Outgoing {
            command,
            completion: None,
            retry: true,
        })
    }

    fn chat(&mut self, command: Command, completion: Completion) -> Result<(), Error> {
        self.queue(Outgoing {
            command,
            completion: Some(completion),
            retry: false,
        })
    }

    fn request_next_line(&mut self) {
        self.line_requests += 1;
    }

    fn abort_dial(&mut self) {
        self.abort_dial = true;
    }

    fn start_timer(&mut self, timer: TimerId, after: Duration) {
        self.timers.retain(|(t, _)| *t != timer);
        self.timers.push((timer, after)).ok();
    }

    fn emit(&mut self, event: Event) -> Result<(), Error> {
        self.events.push_back(event).map_err(|_| {
            error!("Event queue full, dropping event");
            Error::QueueFull
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::call_control::HangUp;

    #[test]
    fn rearming_a_timer_replaces_it() {
        let mut outbox = Outbox::new();
        outbox.start_timer(TimerId::StkAbortFallback, Duration::from_secs(1));
        outbox.start_timer(TimerId::SmsProbeRetry, Duration::from_secs(1));
        outbox.start_timer(TimerId::StkAbortFallback, Duration::from_secs(2));
        assert_eq!(
            outbox.timers(),
            &[
                (TimerId::SmsProbeRetry, Duration::from_secs(1)),
                (TimerId::StkAbortFallback, Duration::from_secs(2))
            ]
        );
        assert_eq!(outbox.take_timers().len(), 2);
        assert!(outbox.timers().is_empty());
    }

    #[test]
    fn commands_drain_in_order() {
        let mut outbox = Outbox::new();
        outbox.send(HangUp.into()).unwrap();
        outbox.chat(HangUp.into(), Completion::BandSet).unwrap();
        assert_eq!(outbox.pop_command().unwrap().completion, None);
        assert_eq!(
            outbox.pop_command().unwrap().completion,
            Some(Completion::BandSet)
        );
        assert!(outbox.is_empty());
    }

    #[test]
    fn overflow_is_reported_and_keeps_queued_items() {
        let mut outbox = Outbox::new();
        for _ in 0..OUTBOX_COMMANDS {
            outbox.send(HangUp.into()).unwrap();
        }
        assert_eq!(outbox.send(HangUp.into()), Err(Error::QueueFull));
        assert_eq!(
            outbox.chat(HangUp.into(), Completion::BandSet),
            Err(Error::QueueFull)
        );
        assert_eq!(outbox.commands().count(), OUTBOX_COMMANDS);
        assert!(outbox.commands().all(|c| c.completion.is_none()));

        // Room again once drained
        outbox.pop_command();
        assert_eq!(outbox.send_retry(HangUp.into()), Ok(()));

        for _ in 0..OUTBOX_EVENTS {
            outbox.emit(Event::SmsReady).unwrap();
        }
        assert_eq!(outbox.emit(Event::WakeDone), Err(Error::QueueFull));
        assert_eq!(outbox.events().count(), OUTBOX_EVENTS);
        assert!(!outbox.events().any(|e| *e == Event::WakeDone));
    }

    #[test]
    fn timer_indices_are_unique() {
        for (i, timer) in TimerId::ALL.iter().enumerate() {
            assert_eq!(timer.index(), i);
        }
    }
}
