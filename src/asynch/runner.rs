use core::pin::pin;

use atat::asynch::AtatClient;
use embassy_futures::select::{select, select3, Either, Either3};
use embassy_time::{Duration, Instant, Timer};

use super::state::State;
use crate::call::CallRegistry;
use crate::command::{Command, Reply};
use crate::config::ModemConfig;
use crate::error::Error;
use crate::event::Event;
use crate::io::{Outbox, Outgoing, TimerId};
use crate::module_timing::retry_delay;
use crate::service::ModemService;

/// Deadlines of the armed one-shot timers.
struct TimerTable {
    deadlines: [Option<Instant>; TimerId::COUNT],
}

impl TimerTable {
    const fn new() -> Self {
        Self {
            deadlines: [None; TimerId::COUNT],
        }
    }

    fn arm(&mut self, timer: TimerId, after: Duration) {
        self.deadlines[timer.index()] = Some(Instant::now() + after);
    }

    fn next(&self) -> Option<(TimerId, Instant)> {
        TimerId::ALL
            .iter()
            .filter_map(|&timer| self.deadlines[timer.index()].map(|at| (timer, at)))
            .min_by_key(|&(_, at)| at)
    }

    async fn expired(&mut self) -> TimerId {
        match self.next() {
            Some((timer, at)) => {
                Timer::at(at).await;
                self.deadlines[timer.index()] = None;
                timer
            }
            None => core::future::pending().await,
        }
    }
}

/// Keep the first failure until the next flush hands it to the host.
fn note_failure(failure: &mut Option<Error>, result: Result<(), Error>) {
    if let Err(e) = result {
        warn!("Not carried out: {:?}", e);
        failure.get_or_insert(e);
    }
}

/// Background runner of the modem integration.
///
/// You must call `.run()` in a background task for the modem to operate.
pub struct Runner<'d, AT: AtatClient, C: ModemConfig, R: CallRegistry> {
    at: AT,
    state: &'d State,
    service: ModemService<C, R>,
    timers: TimerTable,
    failure: Option<Error>,
}

impl<'d, AT: AtatClient, C: ModemConfig, R: CallRegistry> Runner<'d, AT, C, R> {
    pub(crate) fn new(at: AT, state: &'d State, registry: R) -> Self {
        Self {
            at,
            state,
            service: ModemService::new(registry),
            timers: TimerTable::new(),
            failure: None,
        }
    }

    pub fn service(&self) -> &ModemService<C, R> {
        &self.service
    }

    pub async fn run(&mut self) -> ! {
        let mut io = Outbox::new();
        let started = self.service.start(&mut io);
        note_failure(&mut self.failure, started);
        self.flush(&mut io).await;

        loop {
            let next = select3(
                self.state.lines.receive(),
                self.state.requests.receive(),
                self.timers.expired(),
            )
            .await;
            let result = match next {
                Either3::First(line) => self.service.handle_line(&line, &mut io),
                Either3::Second(request) => self.service.handle_request(request, &mut io),
                Either3::Third(timer) => {
                    trace!("Timer {:?} expired", timer);
                    self.service.handle_timer(timer, &mut io)
                }
            };
            note_failure(&mut self.failure, result);
            self.flush(&mut io).await;
        }
    }

    /// Carry out everything the state machines asked for, including what
    /// command outcomes trigger in turn.
    async fn flush(&mut self, io: &mut Outbox) {
        loop {
            for (timer, after) in io.take_timers() {
                self.timers.arm(timer, after);
            }
            if let Some(e) = self.failure.take() {
                self.state.events.send(Event::Error(e)).await;
            }
            if io.take_abort_dial() {
                self.state.events.send(Event::AbortDial).await;
            }
            while let Some(event) = io.pop_event() {
                self.state.events.send(event).await;
            }

            let Some(outgoing) = io.pop_command() else {
                break;
            };
            let result = self.exchange(&outgoing, io).await;
            if let Err(e) = &result {
                debug!("Command failed: {:?}", e);
            }
            if let Some(completion) = outgoing.completion {
                let handled = self.service.handle_completion(completion, result, io);
                note_failure(&mut self.failure, handled);
            }
        }
    }

    async fn exchange(&mut self, outgoing: &Outgoing, io: &mut Outbox) -> Result<Reply, Error> {
        let attempts = if outgoing.retry { C::RETRY_ATTEMPTS } else { 1 };

        let mut attempt = 1;
        let result = loop {
            let result = self.send(&outgoing.command, io).await;
            if result.is_ok() || attempt >= attempts {
                break result;
            }
            attempt += 1;
            Timer::after(retry_delay()).await;
        };

        // Notifications sent ahead of the final result code belong to it
        while let Ok(line) = self.state.lines.try_receive() {
            let handled = self.service.handle_line(&line, io);
            note_failure(&mut self.failure, handled);
        }
        result
    }

    /// Send one command, handling lines that arrive while it is in flight.
    async fn send(&mut self, command: &Command, io: &mut Outbox) -> Result<Reply, Error> {
        let Self {
            at,
            state,
            service,
            failure,
            ..
        } = self;
        let mut response = pin!(at.send(command));
        loop {
            match select(&mut response, state.lines.receive()).await {
                Either::First(result) => return result.map_err(Error::from),
                Either::Second(line) => note_failure(failure, service.handle_line(&line, io)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earliest_timer_fires_first() {
        let mut timers = TimerTable::new();
        assert_eq!(timers.next(), None);

        timers.arm(TimerId::SmsProbeRetry, Duration::from_secs(1));
        timers.arm(TimerId::SuspendFlush, Duration::from_millis(500));
        assert_eq!(timers.next().map(|(t, _)| t), Some(TimerId::SuspendFlush));

        // Re-arming moves the deadline
        timers.arm(TimerId::SuspendFlush, Duration::from_secs(5));
        assert_eq!(timers.next().map(|(t, _)| t), Some(TimerId::SmsProbeRetry));
    }

    #[test]
    fn expired_timer_is_disarmed() {
        let mut timers = TimerTable::new();
        timers.arm(TimerId::StkAbortFallback, Duration::from_millis(1));
        let fired = embassy_futures::block_on(timers.expired());
        assert_eq!(fired, TimerId::StkAbortFallback);
        assert_eq!(timers.next(), None);
    }

    #[test]
    fn first_failure_is_kept() {
        let mut failure = None;
        note_failure(&mut failure, Ok(()));
        assert_eq!(failure, None);
        note_failure(&mut failure, Err(Error::QueueFull));
        note_failure(&mut failure, Err(Error::Unsupported));
        assert_eq!(failure, Some(Error::QueueFull));
    }
}
