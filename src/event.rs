//! Events reported to the host.

use heapless::String;

use crate::band::BandEvent;
use crate::command::general::urc::NetworkTime;
use crate::error::Error;
use crate::readiness::ReadinessStage;
use crate::stk::StkEvent;

pub const MAX_VERSION_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Abort the dial request still queued on the AT channel.
    AbortDial,
    /// A readiness stage was reported by the modem.
    Readiness(ReadinessStage),
    /// All commands are ready, wake up anything waiting on the modem.
    ForceWakeup,
    /// The SMS subsystem answered both readiness probes.
    SmsReady,
    SuspendDone,
    WakeDone,
    SignalQuality {
        rssi: u32,
        max: u32,
    },
    /// Message storage on the SIM is full
    SmsMemoryFull,
    NetworkTime(NetworkTime),
    Stk(StkEvent),
    Band(BandEvent),
    ExtendedVersion(String<MAX_VERSION_LEN>),
    /// A request or notification could not be carried out in full
    Error(Error),
}

impl From<StkEvent> for Event {
    fn from(event: StkEvent) -> Self {
        Self::Stk(event)
    }
}

impl From<BandEvent> for Event {
    fn from(event: BandEvent) -> Self {
        Self::Band(event)
    }
}
