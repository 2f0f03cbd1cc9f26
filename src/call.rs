//! Call state tracking on top of `*MCAM:` notifications.
//!
//! The modem ignores `ATH` while a dial attempt is still in the calling
//! phase, so a local hang-up that arrives early is held back until the call
//! reaches alerting or pre-connected. If the remote side answers first, the
//! local hang-up still wins.

use heapless::{Deque, String};

use crate::command::{
    call_control::{
        types::CallStatus, urc::CallMonitor, HangUp, PlayKeyTone, SendDtmf,
        SetCallWaiting, SetCallingLineIdentification, SetCellularResultCodes,
    },
    types::Reporting,
};
use crate::error::Error;
use crate::io::{Completion, Io};

/// Key tone length in 10 ms units
const KEY_TONE_DURATION: u8 = 25;

/// Tones waiting to be played, across all calls
pub const MAX_TONES: usize = 32;

/// Lifecycle state of a call, as kept by the host's call registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CallState {
    Idle,
    Dialing,
    Alerting,
    Connected,
    Incoming,
    Hold,
    Missed,
    HangupLocal,
    HangupRemote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CallKind {
    Voice,
    Data,
    Fax,
    /// Packet data call. Its teardown is owned by the data session, not by
    /// call monitoring.
    Ip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CallRecord {
    pub state: CallState,
    pub kind: CallKind,
}

/// Calls owned by the host, looked up by modem call identifier.
pub trait CallRegistry {
    fn call(&self, id: u32) -> Option<CallRecord>;

    fn set_state(&mut self, id: u32, state: CallState);

    /// The remote side hung up or the attempt never connected.
    fn hangup_remote(&mut self, id: u32);

    /// Abort a dial attempt that is not the one being tracked here.
    fn abort_dial(&mut self, id: u32);
}

#[derive(Debug)]
pub struct CallStateTracker {
    /// Call the outgoing dial attempt belongs to
    calling_id: u32,
    /// Set once `calling_id` was seen alerting or pre-connected
    alerting_id: u32,
    /// Set when a hang-up was requested before alerting
    aborting_id: u32,
    need_clip_set: bool,
    /// Cleared on SIM changes until `*MRDY: 3` is seen again
    saw_all_commands_ready: bool,
    /// Call and tone, played one at a time
    tones: Deque<(u32, char), MAX_TONES>,
    tone_in_flight: bool,
}

impl Default for CallStateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl CallStateTracker {
    pub fn new() -> Self {
        Self {
            calling_id: 0,
            alerting_id: 0,
            aborting_id: 0,
            need_clip_set: false,
            saw_all_commands_ready: true,
            tones: Deque::new(),
            tone_in_flight: false,
        }
    }

    pub fn calling_id(&self) -> u32 {
        self.calling_id
    }

    pub fn alerting_id(&self) -> u32 {
        self.alerting_id
    }

    pub fn aborting_id(&self) -> u32 {
        self.aborting_id
    }

    pub fn on_call_monitor<R: CallRegistry>(
        &mut self,
        notification: &CallMonitor,
        registry: &mut R,
        io: &mut impl Io,
    ) -> Result<(), Error> {
        let id = notification.id;
        let status = notification.status;
        let call = registry.call(id);
        let state = call.map(|c| c.state);
        let dialing = matches!(state, Some(CallState::Dialing | CallState::Alerting));
        let data_call = matches!(call, Some(CallRecord { kind: CallKind::Ip, .. }));

        trace!("Call {} status {:?}", id, status);

        match status {
            CallStatus::Connected if dialing => {
                if self.aborting_id == id {
                    debug!("Call {} answered while hanging up, hanging up", id);
                    self.do_abort_dial(io)?;
                    registry.set_state(id, CallState::HangupLocal);
                } else {
                    registry.set_state(id, CallState::Connected);
                }
            }
            CallStatus::Disconnect if !data_call && dialing => {
                registry.hangup_remote(id);
            }
            CallStatus::Disconnect
                if !data_call && matches!(state, Some(CallState::Connected | CallState::Hold)) =>
            {
                registry.hangup_remote(id);
            }
            CallStatus::Disconnect if state == Some(CallState::Incoming) => {
                registry.set_state(id, CallState::Missed);
                registry.hangup_remote(id);
            }
            CallStatus::Alerting | CallStatus::PreConnected if id == self.calling_id => {
                let mut aborting = false;
                if self.aborting_id != 0 && self.calling_id == self.aborting_id {
                    self.do_abort_dial(io)?;
                    aborting = true;
                } else if self.aborting_id == 0 {
                    self.alerting_id = self.calling_id;
                }

                if !aborting && state == Some(CallState::Dialing) {
                    registry.set_state(id, CallState::Alerting);
                }
            }
            CallStatus::Calling if dialing => {
                self.calling_id = id;
            }
            _ => {}
        }

        if self.calling_id == id && !status.is_dialing_phase() {
            self.calling_id = 0;
            self.alerting_id = 0;
            self.aborting_id = 0;
        }
        Ok(())
    }

    /// Hang up a dial attempt, now if the modem accepts it, otherwise as soon
    /// as the call reaches alerting.
    pub fn request_abort_dial<R: CallRegistry>(
        &mut self,
        id: u32,
        registry: &mut R,
        io: &mut impl Io,
    ) -> Result<(), Error> {
        io.abort_dial();
        if id != self.calling_id {
            registry.abort_dial(id);
            return Ok(());
        }

        if self.calling_id == self.alerting_id {
            self.do_abort_dial(io)
        } else {
            debug!("Deferring hang-up of call {} until it alerts", id);
            self.aborting_id = self.calling_id;
            Ok(())
        }
    }

    fn do_abort_dial(&mut self, io: &mut impl Io) -> Result<(), Error> {
        self.calling_id = 0;
        self.alerting_id = 0;
        self.aborting_id = 0;
        io.send(HangUp.into())
    }

    /// Re-arm call reporting after a modem reset. Caller id and call waiting
    /// are held back until all commands are ready, the modem blocks on them
    /// otherwise.
    pub fn reset_modem(&mut self, io: &mut impl Io) -> Result<(), Error> {
        self.tones.clear();
        self.tone_in_flight = false;
        io.send(
            SetCellularResultCodes {
                mode: Reporting::Enabled,
            }
            .into(),
        )?;
        self.need_clip_set = true;
        if self.saw_all_commands_ready {
            self.all_commands_ready(io)?;
        }
        Ok(())
    }

    pub fn all_commands_ready(&mut self, io: &mut impl Io) -> Result<(), Error> {
        self.saw_all_commands_ready = true;
        if self.need_clip_set {
            self.need_clip_set = false;
            io.send_retry(
                SetCallingLineIdentification {
                    mode: Reporting::Enabled,
                }
                .into(),
            )?;
            io.send_retry(
                SetCallWaiting {
                    mode: Reporting::Enabled,
                }
                .into(),
            )?;
        }
        Ok(())
    }

    pub fn sim_changed(&mut self) {
        self.saw_all_commands_ready = false;
    }

    /// Play DTMF tones on a connected voice call. Each tone is also played on
    /// the local speaker, `+VTS` alone stays silent on this modem.
    ///
    /// Tones are queued and sent one after the other, each once the previous
    /// `+VTS` completed. Tones beyond [`MAX_TONES`] waiting are dropped with
    /// [`Error::QueueFull`]. Calls of other kinds return
    /// [`Error::Unsupported`] and take the generic tone path.
    pub fn send_tones<R: CallRegistry>(
        &mut self,
        id: u32,
        tones: &str,
        registry: &R,
        io: &mut impl Io,
    ) -> Result<(), Error> {
        let Some(call) = registry.call(id) else {
            return Ok(());
        };
        if call.kind != CallKind::Voice {
            return Err(Error::Unsupported);
        }
        if call.state != CallState::Connected {
            return Ok(());
        }

        let mut queued = Ok(());
        for tone in tones.chars() {
            if self.tones.push_back((id, tone)).is_err() {
                warn!("Tone queue full, dropping tones of call {}", id);
                queued = Err(Error::QueueFull);
                break;
            }
        }
        if !self.tone_in_flight {
            self.next_tone(registry, io)?;
        }
        queued
    }

    /// The `+VTS` of the previous tone completed.
    pub fn on_tone_sent<R: CallRegistry>(
        &mut self,
        registry: &R,
        io: &mut impl Io,
    ) -> Result<(), Error> {
        self.tone_in_flight = false;
        self.next_tone(registry, io)
    }

    fn next_tone<R: CallRegistry>(&mut self, registry: &R, io: &mut impl Io) -> Result<(), Error> {
        while let Some((id, c)) = self.tones.pop_front() {
            let connected = registry
                .call(id)
                .is_some_and(|call| call.state == CallState::Connected);
            if !connected {
                debug!("Call {} no longer connected, dropping tone", id);
                continue;
            }

            let mut tone = String::new();
            tone.push(c).ok();
            io.send(
                PlayKeyTone {
                    tone: tone.clone(),
                    duration: KEY_TONE_DURATION,
                }
                .into(),
            )?;
            io.chat(SendDtmf { tone }.into(), Completion::KeyTone)?;
            self.tone_in_flight = true;
            break;
        }
        Ok(())
    }
}
