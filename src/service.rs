//! Routing of modem lines, host requests, command outcomes and timers onto
//! the state machines.

use core::marker::PhantomData;

use heapless::{String, Vec};

use crate::band::{BandMode, BandSelection};
use crate::call::{CallRegistry, CallStateTracker, MAX_TONES};
use crate::cell_broadcast::{CellBroadcast, MAX_CHANNELS};
use crate::codec::truncated;
use crate::command::{
    call_control::SetCallMonitoring,
    general::{
        types::{AudioOutput, AudioProcessing, Echo, FeatureState, ModemFeature},
        GetExtendedVersion, SetAudioOutput, SetAudioProcessing, SetEcho, SetModemConfiguration,
        SetSignalQualityReporting,
    },
    network_service::types::RegistrationState,
    types::Reporting,
    Reply, Urc,
};
use crate::config::ModemConfig;
use crate::error::Error;
use crate::event::{Event, MAX_VERSION_LEN};
use crate::io::{Completion, Io, TimerId};
use crate::readiness::{ReadinessCoordinator, ReadinessStage, SmsProbe};
use crate::stk::{
    response::{Envelope, TerminalResponse},
    StkSession,
};

pub const MAX_BAND_NAME_LEN: usize = 32;

/// Something the host wants done.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Hang up a dial attempt
    AbortDial(u32),
    SendTones {
        id: u32,
        tones: String<MAX_TONES>,
    },
    /// Re-arm call reporting after a modem reset
    ResetModem,
    BeginSession,
    EndSession,
    TerminalResponse(TerminalResponse),
    Envelope(Envelope),
    RequestSmsReady,
    Suspend,
    Wake,
    RequestBand,
    RequestBands,
    SetBand {
        mode: BandMode,
        name: String<MAX_BAND_NAME_LEN>,
    },
    SetCellBroadcastChannels(Vec<u16, MAX_CHANNELS>),
    SetRegistrationState(RegistrationState),
    RequestExtendedVersion,
    SetAudioOutput(AudioOutput),
    SetNoiseSuppression(bool),
    SetEchoCancellation(bool),
}

fn feature_state(on: bool) -> FeatureState {
    if on {
        FeatureState::On
    } else {
        FeatureState::Off
    }
}

/// The vendor integration as a whole. Owns the host's call registry and
/// every state machine; all of them are driven through an [`Io`].
pub struct ModemService<C: ModemConfig, R: CallRegistry> {
    calls: CallStateTracker,
    stk: StkSession,
    readiness: ReadinessCoordinator,
    band: BandSelection,
    cell_broadcast: CellBroadcast,
    registry: R,
    _config: PhantomData<C>,
}

impl<C: ModemConfig, R: CallRegistry> ModemService<C, R> {
    pub fn new(registry: R) -> Self {
        Self {
            calls: CallStateTracker::new(),
            stk: StkSession::new(C::codec(), C::LANGUAGE),
            readiness: ReadinessCoordinator::new(C::SMS_READY_ATTEMPTS),
            band: BandSelection::new(),
            cell_broadcast: CellBroadcast::new(),
            registry,
            _config: PhantomData,
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    pub fn calls(&self) -> &CallStateTracker {
        &self.calls
    }

    pub fn stk(&self) -> &StkSession {
        &self.stk
    }

    pub fn readiness(&self) -> &ReadinessCoordinator {
        &self.readiness
    }

    pub fn cell_broadcast(&self) -> &CellBroadcast {
        &self.cell_broadcast
    }

    /// Commands sent once the AT channel is open.
    pub fn start(&mut self, io: &mut impl Io) -> Result<(), Error> {
        io.send(
            SetCallMonitoring {
                mode: Reporting::Enabled,
            }
            .into(),
        )?;
        io.send(
            SetEcho {
                enabled: Echo::Enable,
            }
            .into(),
        )
    }

    /// Vendor setup after a modem reset.
    pub fn reset(&mut self, io: &mut impl Io) -> Result<(), Error> {
        // Has to precede *MCAM
        io.send(
            SetModemConfiguration {
                feature: ModemFeature::UnsolicitedEvents,
                state: FeatureState::On,
            }
            .into(),
        )?;
        io.send(
            SetModemConfiguration {
                feature: ModemFeature::MarkReadOnList,
                state: FeatureState::On,
            }
            .into(),
        )?;
        io.send(
            SetCallMonitoring {
                mode: Reporting::Enabled,
            }
            .into(),
        )?;
        io.send(
            SetSignalQualityReporting {
                mode: Reporting::Enabled,
            }
            .into(),
        )?;
        io.send(
            SetAudioProcessing {
                block: AudioProcessing::NoiseSuppression,
                state: FeatureState::On,
            }
            .into(),
        )?;
        io.send(
            SetAudioProcessing {
                block: AudioProcessing::EchoCancellation,
                state: FeatureState::On,
            }
            .into(),
        )?;
        self.calls.reset_modem(io)
    }

    /// A line from the AT channel. While a toolkit notification is being
    /// assembled, any line that is not a notification of another family is
    /// taken as its next line.
    pub fn handle_line(&mut self, line: &str, io: &mut impl Io) -> Result<(), Error> {
        let line = line.trim_end_matches(['\r', '\n']);
        let urc = Urc::from_line(line);

        if self.stk.awaiting_line() {
            let interrupted = match &urc {
                Some(Urc::Stk(stk)) => !self.stk.continues_with(stk),
                Some(_) => true,
                None => false,
            };
            if !interrupted {
                return self.stk.feed_line(line, io);
            }
            self.stk.abandon_assembly();
        }

        match urc {
            Some(urc) => self.handle_urc(urc, io),
            None => {
                trace!("Ignoring line {}", line);
                Ok(())
            }
        }
    }

    pub fn handle_urc(&mut self, urc: Urc, io: &mut impl Io) -> Result<(), Error> {
        match urc {
            Urc::CallMonitor(monitor) => {
                self.calls
                    .on_call_monitor(&monitor, &mut self.registry, io)
            }
            Urc::Readiness(readiness) => {
                match self.readiness.on_readiness(readiness, io)? {
                    Some(ReadinessStage::AllCommandsReady) => self.calls.all_commands_ready(io)?,
                    Some(ReadinessStage::SimInserted) => {
                        self.calls.sim_changed();
                        self.stk.sim_inserted(io);
                    }
                    Some(ReadinessStage::SimRemoved) => {
                        self.calls.sim_changed();
                        self.stk.sim_removed();
                    }
                    _ => {}
                }
                Ok(())
            }
            Urc::SignalQuality(quality) => io.emit(Event::SignalQuality {
                rssi: quality.rssi,
                max: crate::command::general::urc::SignalQuality::MAX,
            }),
            Urc::NetworkTime(Some(time)) => io.emit(Event::NetworkTime(time)),
            Urc::NetworkTime(None) => {
                debug!("Unparsable network time");
                Ok(())
            }
            Urc::SmsMemoryFull(_) => io.emit(Event::SmsMemoryFull),
            Urc::Stk(stk) => self.stk.handle_urc(stk, io),
        }
    }

    /// Requests without a vendor path return [`Error::Unsupported`], the
    /// host then takes its generic path.
    pub fn handle_request(&mut self, request: Request, io: &mut impl Io) -> Result<(), Error> {
        match request {
            Request::AbortDial(id) => self.calls.request_abort_dial(id, &mut self.registry, io),
            Request::SendTones { id, tones } => {
                self.calls.send_tones(id, &tones, &self.registry, io)
            }
            Request::ResetModem => self.reset(io),
            Request::BeginSession => self.stk.begin(io),
            Request::EndSession => {
                self.stk.end();
                Ok(())
            }
            Request::TerminalResponse(response) => self.stk.send_terminal_response(response, io),
            Request::Envelope(envelope) => self.stk.send_envelope(envelope, io),
            Request::RequestSmsReady => self.readiness.request_sms_ready(io),
            Request::Suspend => self.readiness.suspend(&self.cell_broadcast, io),
            Request::Wake => self.readiness.wake(&self.cell_broadcast, io),
            Request::RequestBand => self.band.request_band(io),
            Request::RequestBands => self.band.request_bands(io),
            Request::SetBand { mode, name } => self.band.set_band(mode, &name, io),
            Request::SetCellBroadcastChannels(channels) => {
                self.cell_broadcast.set_channels(&channels, io)
            }
            Request::SetRegistrationState(state) => {
                self.cell_broadcast.set_registration(state);
                Ok(())
            }
            Request::RequestExtendedVersion => {
                io.chat(GetExtendedVersion.into(), Completion::ExtendedVersion)
            }
            Request::SetAudioOutput(output) => io.send(SetAudioOutput { output }.into()),
            Request::SetNoiseSuppression(on) => io.send(
                SetAudioProcessing {
                    block: AudioProcessing::NoiseSuppression,
                    state: feature_state(on),
                }
                .into(),
            ),
            Request::SetEchoCancellation(on) => io.send(
                SetAudioProcessing {
                    block: AudioProcessing::EchoCancellation,
                    state: feature_state(on),
                }
                .into(),
            ),
        }
    }

    /// Outcome of a command sent with [`Io::chat`].
    pub fn handle_completion(
        &mut self,
        completion: Completion,
        result: Result<Reply, Error>,
        io: &mut impl Io,
    ) -> Result<(), Error> {
        match completion {
            Completion::StkMenuFetch => self.stk.on_menu_fetched(result.map(|_| ()), io),
            Completion::SmsFormatProbe => {
                self.readiness
                    .on_probe(SmsProbe::Format, result.is_ok(), io)
            }
            Completion::SmsStorageProbe => {
                self.readiness
                    .on_probe(SmsProbe::Storage, result.is_ok(), io)
            }
            Completion::BandQuery => self.band.on_band_query(result, io),
            Completion::BandSet => self.band.on_band_set(result.map(|_| ()), io),
            Completion::SuspendSignalQualityOff => {
                self.readiness.on_signal_quality_off(io);
                Ok(())
            }
            Completion::WakeSignalQualityOn => self.readiness.on_signal_quality_on(io),
            Completion::ExtendedVersion => {
                let version = match result {
                    Ok(Reply::Version(version)) => extended_version(&version.text),
                    _ => String::new(),
                };
                io.emit(Event::ExtendedVersion(version))
            }
            Completion::KeyTone => {
                if let Err(e) = result {
                    warn!("Key tone failed: {:?}", e);
                }
                self.calls.on_tone_sent(&self.registry, io)
            }
        }
    }

    pub fn handle_timer(&mut self, timer: TimerId, io: &mut impl Io) -> Result<(), Error> {
        match timer {
            TimerId::StkAbortFallback => self.stk.on_abort_fallback(io),
            TimerId::StkSimSettle => self.stk.begin(io),
            TimerId::SmsProbeRetry => self.readiness.on_probe_retry(io),
            TimerId::SuspendFlush => self.readiness.on_suspend_flush(io),
        }
    }
}

/// `*MVERS` text as shown to the user: one component per line. Some
/// firmwares lead with a bare release name ahead of the `name: value`
/// lines, which is dropped.
fn extended_version(text: &str) -> String<MAX_VERSION_LEN> {
    let mut value: String<MAX_VERSION_LEN> = String::new();
    for c in text.trim().chars() {
        if value.push(if c == '/' { '\n' } else { c }).is_err() {
            break;
        }
    }

    if let Some(newline) = value.find('\n') {
        let release_only =
            value.starts_with('R') && value.find(':').is_some_and(|colon| colon > newline);
        if release_only {
            return truncated(&value[newline + 1..]);
        }
    }
    value
}
