//! `*MRDY:` readiness stages, the SMS readiness handshake and the
//! suspend/wake sequence.

use crate::cell_broadcast::CellBroadcast;
use crate::command::{
    general::{urc::Readiness, SetSignalQualityReporting},
    network_service::{
        types::RegistrationUrc, SetGprsRegistrationStatus, SetNetworkRegistrationStatus,
    },
    sms::{types::MessageFormat, SetMessageFormat, SetPreferredStorage},
    types::Reporting,
};
use crate::error::Error;
use crate::event::Event;
use crate::io::{Completion, Io, TimerId};
use crate::module_timing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadinessStage {
    ModuleReady,
    EmergencyCallsPossible,
    /// Every AT command may be used, including the phonebook and caller id
    AllCommandsReady,
    SimInserted,
    SimRemoved,
    NoNetworkService,
    EmergencyCallsOnly,
}

impl ReadinessStage {
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            1 => Self::ModuleReady,
            2 => Self::EmergencyCallsPossible,
            3 => Self::AllCommandsReady,
            4 => Self::SimInserted,
            5 => Self::SimRemoved,
            6 => Self::NoNetworkService,
            7 => Self::EmergencyCallsOnly,
            _ => return None,
        })
    }
}

/// The two commands polled until the SMS subsystem accepts them. `+CMGF`
/// may succeed while `+CPMS` still fails with "SIM busy", so both are
/// polled in turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SmsProbe {
    Format,
    Storage,
}

#[derive(Debug)]
pub struct ReadinessCoordinator {
    stage: Option<ReadinessStage>,
    max_attempts: u8,
    /// Non-zero while the SMS handshake runs
    sms_attempts: u8,
    probe: SmsProbe,
}

impl ReadinessCoordinator {
    pub fn new(max_attempts: u8) -> Self {
        Self {
            stage: None,
            max_attempts,
            sms_attempts: 0,
            probe: SmsProbe::Format,
        }
    }

    /// Last stage reported, `None` until the first report.
    pub fn stage(&self) -> Option<ReadinessStage> {
        self.stage
    }

    pub fn sms_attempts(&self) -> u8 {
        self.sms_attempts
    }

    /// Unknown stages are ignored and return `None`.
    pub fn on_readiness(
        &mut self,
        readiness: Readiness,
        io: &mut impl Io,
    ) -> Result<Option<ReadinessStage>, Error> {
        let Some(stage) = ReadinessStage::from_code(readiness.stage) else {
            debug!("Ignoring readiness stage {}", readiness.stage);
            return Ok(None);
        };

        info!("Modem readiness: {:?}", stage);
        self.stage = Some(stage);
        if stage == ReadinessStage::AllCommandsReady {
            io.emit(Event::ForceWakeup)?;
        }
        io.emit(Event::Readiness(stage))?;
        Ok(Some(stage))
    }

    /// Start the SMS readiness handshake. A handshake already running gets
    /// its attempts replenished instead.
    pub fn request_sms_ready(&mut self, io: &mut impl Io) -> Result<(), Error> {
        if self.sms_attempts > 0 {
            self.sms_attempts = self.max_attempts;
            return Ok(());
        }
        self.sms_attempts = self.max_attempts;
        self.probe = SmsProbe::Format;
        self.send_probe(io)
    }

    fn send_probe(&self, io: &mut impl Io) -> Result<(), Error> {
        match self.probe {
            SmsProbe::Format => io.chat(
                SetMessageFormat {
                    format: MessageFormat::Pdu,
                }
                .into(),
                Completion::SmsFormatProbe,
            ),
            SmsProbe::Storage => {
                io.chat(SetPreferredStorage::sim().into(), Completion::SmsStorageProbe)
            }
        }
    }

    pub fn on_probe(&mut self, probe: SmsProbe, ok: bool, io: &mut impl Io) -> Result<(), Error> {
        if ok {
            return match probe {
                SmsProbe::Format => {
                    self.probe = SmsProbe::Storage;
                    self.send_probe(io)
                }
                SmsProbe::Storage => {
                    self.sms_attempts = 0;
                    io.emit(Event::SmsReady)
                }
            };
        }

        self.sms_attempts = self.sms_attempts.saturating_sub(1);
        if self.sms_attempts > 0 {
            self.probe = probe;
            io.start_timer(TimerId::SmsProbeRetry, module_timing::sms_probe_retry());
        } else {
            warn!("SMS subsystem not ready, giving up");
        }
        Ok(())
    }

    pub fn on_probe_retry(&mut self, io: &mut impl Io) -> Result<(), Error> {
        if self.sms_attempts > 0 {
            self.send_probe(io)?;
        }
        Ok(())
    }

    /// Quiet the notifications that would wake the host while it sleeps.
    pub fn suspend(&self, cell_broadcast: &CellBroadcast, io: &mut impl Io) -> Result<(), Error> {
        io.send(
            SetNetworkRegistrationStatus {
                n: RegistrationUrc::Enabled,
            }
            .into(),
        )?;
        io.send(
            SetGprsRegistrationStatus {
                n: RegistrationUrc::Enabled,
            }
            .into(),
        )?;
        cell_broadcast.suspend(io)?;
        io.chat(
            SetSignalQualityReporting {
                mode: Reporting::Disabled,
            }
            .into(),
            Completion::SuspendSignalQualityOff,
        )
    }

    pub fn on_signal_quality_off(&self, io: &mut impl Io) {
        io.start_timer(TimerId::SuspendFlush, module_timing::suspend_flush());
    }

    pub fn on_suspend_flush(&self, io: &mut impl Io) -> Result<(), Error> {
        io.emit(Event::SuspendDone)
    }

    pub fn wake(&self, cell_broadcast: &CellBroadcast, io: &mut impl Io) -> Result<(), Error> {
        io.send(
            SetNetworkRegistrationStatus {
                n: RegistrationUrc::EnabledWithLocation,
            }
            .into(),
        )?;
        io.send(
            SetGprsRegistrationStatus {
                n: RegistrationUrc::EnabledWithLocation,
            }
            .into(),
        )?;
        cell_broadcast.resume(io)?;
        io.chat(
            SetSignalQualityReporting {
                mode: Reporting::Enabled,
            }
            .into(),
            Completion::WakeSignalQualityOn,
        )
    }

    pub fn on_signal_quality_on(&self, io: &mut impl Io) -> Result<(), Error> {
        io.emit(Event::WakeDone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::network_service::types::RegistrationState;
    use crate::io::Outbox;
    use crate::test_helpers::sent;

    const ATTEMPTS: u8 = 15;

    #[test]
    fn stage_codes() {
        assert_eq!(ReadinessStage::from_code(3), Some(ReadinessStage::AllCommandsReady));
        assert_eq!(ReadinessStage::from_code(7), Some(ReadinessStage::EmergencyCallsOnly));
        assert_eq!(ReadinessStage::from_code(0), None);
        assert_eq!(ReadinessStage::from_code(8), None);
    }

    #[test]
    fn all_commands_ready_forces_wakeup_first() {
        let mut readiness = ReadinessCoordinator::new(ATTEMPTS);
        let mut io = Outbox::new();
        readiness.on_readiness(Readiness { stage: 3 }, &mut io).unwrap();
        assert_eq!(io.pop_event(), Some(Event::ForceWakeup));
        assert_eq!(
            io.pop_event(),
            Some(Event::Readiness(ReadinessStage::AllCommandsReady))
        );

        assert_eq!(readiness.on_readiness(Readiness { stage: 9 }, &mut io), Ok(None));
        assert!(io.is_empty());
        assert_eq!(readiness.stage(), Some(ReadinessStage::AllCommandsReady));
    }

    #[test]
    fn sms_handshake_polls_format_then_storage() {
        let mut readiness = ReadinessCoordinator::new(ATTEMPTS);
        let mut io = Outbox::new();

        readiness.request_sms_ready(&mut io).unwrap();
        assert_eq!(sent(&mut io), ["AT+CMGF=0"]);

        readiness.on_probe(SmsProbe::Format, true, &mut io).unwrap();
        assert_eq!(sent(&mut io), ["AT+CPMS=\"SM\""]);

        readiness.on_probe(SmsProbe::Storage, false, &mut io).unwrap();
        assert_eq!(io.take_timers().len(), 1);
        readiness.on_probe_retry(&mut io).unwrap();
        assert_eq!(sent(&mut io), ["AT+CPMS=\"SM\""]);

        readiness.on_probe(SmsProbe::Storage, true, &mut io).unwrap();
        assert_eq!(io.pop_event(), Some(Event::SmsReady));
        assert_eq!(readiness.sms_attempts(), 0);
    }

    #[test]
    fn sms_handshake_gives_up_after_bounded_attempts() {
        let mut readiness = ReadinessCoordinator::new(ATTEMPTS);
        let mut io = Outbox::new();
        let mut probes = 0;
        let mut retries = 0;

        readiness.request_sms_ready(&mut io).unwrap();
        loop {
            probes += sent(&mut io).len();
            readiness.on_probe(SmsProbe::Format, false, &mut io).unwrap();
            let timers = io.take_timers();
            if timers.is_empty() {
                break;
            }
            assert_eq!(
                timers.as_slice(),
                &[(TimerId::SmsProbeRetry, module_timing::sms_probe_retry())]
            );
            retries += 1;
            readiness.on_probe_retry(&mut io).unwrap();
        }

        assert_eq!(probes, 15);
        assert_eq!(retries, 14);
        assert!(io.pop_event().is_none());

        // A stray retry after giving up sends nothing
        readiness.on_probe_retry(&mut io).unwrap();
        assert!(sent(&mut io).is_empty());
    }

    #[test]
    fn repeated_request_extends_running_handshake() {
        let mut readiness = ReadinessCoordinator::new(ATTEMPTS);
        let mut io = Outbox::new();
        readiness.request_sms_ready(&mut io).unwrap();
        readiness.on_probe(SmsProbe::Format, false, &mut io).unwrap();
        assert_eq!(readiness.sms_attempts(), ATTEMPTS - 1);

        sent(&mut io);
        readiness.request_sms_ready(&mut io).unwrap();
        assert_eq!(readiness.sms_attempts(), ATTEMPTS);
        assert!(sent(&mut io).is_empty());
    }

    #[test]
    fn suspend_and_wake() {
        let readiness = ReadinessCoordinator::new(ATTEMPTS);
        let mut cb = CellBroadcast::new();
        let mut io = Outbox::new();
        cb.set_registration(RegistrationState::Home);
        cb.set_channels(&[50], &mut io).unwrap();
        sent(&mut io);

        readiness.suspend(&cb, &mut io).unwrap();
        assert_eq!(
            sent(&mut io),
            ["AT+CREG=1", "AT+CGREG=1", "AT+CSCB=1,\"50\"", "AT*MCSQ=0"]
        );
        readiness.on_signal_quality_off(&mut io);
        assert_eq!(
            io.take_timers().as_slice(),
            &[(TimerId::SuspendFlush, module_timing::suspend_flush())]
        );
        readiness.on_suspend_flush(&mut io).unwrap();
        assert_eq!(io.pop_event(), Some(Event::SuspendDone));

        readiness.wake(&cb, &mut io).unwrap();
        assert_eq!(
            sent(&mut io),
            ["AT+CREG=2", "AT+CGREG=2", "AT+CSCB=0,\"50\"", "AT*MCSQ=1"]
        );
        readiness.on_signal_quality_on(&mut io).unwrap();
        assert_eq!(io.pop_event(), Some(Event::WakeDone));
    }
}
