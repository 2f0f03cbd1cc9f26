//! AT commands and notifications of the greenphone baseband.
//!
//! The dialect is standard 27.007 plus a family of vendor `*M...` commands for
//! call monitoring, readiness reporting and the on-chip SIM toolkit.

pub mod band;
pub mod call_control;
pub mod cell_broadcast;
pub mod general;
pub mod network_service;
pub mod sms;
pub mod stk;
pub mod tokens;
pub mod types;

use core::fmt;

use atat::{atat_derive::AtatResp, AtatCmd, AtatUrc};

use band::{responses::SelectedBand, GetBand, SetBand};
use call_control::{
    urc::CallMonitor, HangUp, PlayKeyTone, SendDtmf, SetCallMonitoring, SetCallWaiting,
    SetCallingLineIdentification, SetCellularResultCodes,
};
use cell_broadcast::SetCellBroadcast;
use general::{
    responses::ExtendedVersion,
    urc::{NetworkTime, Readiness, SignalQuality, SmsMemoryFull},
    GetExtendedVersion, SetAudioOutput, SetAudioProcessing, SetEcho, SetModemConfiguration,
    SetSignalQualityReporting,
};
use network_service::{SetGprsRegistrationStatus, SetNetworkRegistrationStatus};
use sms::{SetMessageFormat, SetPreferredStorage};
use stk::{urc::StkUrc, GetMainMenu, SelectMenuItem, SendTerminalResponse};

#[derive(Debug, Clone, PartialEq, AtatResp)]
pub struct NoResponse;

/// Write `value` into `buf`, truncating if it does not fit. Returns the
/// number of bytes written.
pub(crate) fn write_display(buf: &mut [u8], value: &impl fmt::Display) -> usize {
    struct Cursor<'a> {
        buf: &'a mut [u8],
        len: usize,
    }

    impl fmt::Write for Cursor<'_> {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            let room = self.buf.len() - self.len;
            let n = s.len().min(room);
            self.buf[self.len..self.len + n].copy_from_slice(&s.as_bytes()[..n]);
            self.len += n;
            if n < s.len() {
                Err(fmt::Error)
            } else {
                Ok(())
            }
        }
    }

    let mut cursor = Cursor { buf, len: 0 };
    if fmt::Write::write_fmt(&mut cursor, format_args!("{}\r\n", value)).is_err() {
        error!("AT command truncated to {} bytes", cursor.len);
    }
    cursor.len
}

/// Reply to a [`Command`]
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Empty,
    Band(SelectedBand),
    Version(ExtendedVersion),
}

impl atat::AtatResp for Reply {}

macro_rules! commands {
    ($($variant:ident($ty:ty) => $reply:expr),* $(,)?) => {
        /// Every command the state machines issue.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Command {
            $($variant($ty)),*
        }

        $(
            impl From<$ty> for Command {
                fn from(cmd: $ty) -> Self {
                    Command::$variant(cmd)
                }
            }
        )*

        impl AtatCmd for Command {
            type Response = Reply;

            const MAX_LEN: usize = SendTerminalResponse::MAX_LEN;

            fn write(&self, buf: &mut [u8]) -> usize {
                match self {
                    $(Command::$variant(cmd) => cmd.write(buf)),*
                }
            }

            fn parse(
                &self,
                resp: Result<&[u8], atat::InternalError>,
            ) -> Result<Self::Response, atat::Error> {
                match self {
                    $(Command::$variant(cmd) => cmd.parse(resp).map($reply)),*
                }
            }
        }
    };
}

commands! {
    HangUp(HangUp) => |_| Reply::Empty,
    SetCallMonitoring(SetCallMonitoring) => |_| Reply::Empty,
    SetCellularResultCodes(SetCellularResultCodes) => |_| Reply::Empty,
    SetCallingLineIdentification(SetCallingLineIdentification) => |_| Reply::Empty,
    SetCallWaiting(SetCallWaiting) => |_| Reply::Empty,
    PlayKeyTone(PlayKeyTone) => |_| Reply::Empty,
    SendDtmf(SendDtmf) => |_| Reply::Empty,
    SetEcho(SetEcho) => |_| Reply::Empty,
    SetModemConfiguration(SetModemConfiguration) => |_| Reply::Empty,
    SetSignalQualityReporting(SetSignalQualityReporting) => |_| Reply::Empty,
    SetAudioProcessing(SetAudioProcessing) => |_| Reply::Empty,
    SetAudioOutput(SetAudioOutput) => |_| Reply::Empty,
    GetExtendedVersion(GetExtendedVersion) => Reply::Version,
    SetNetworkRegistrationStatus(SetNetworkRegistrationStatus) => |_| Reply::Empty,
    SetGprsRegistrationStatus(SetGprsRegistrationStatus) => |_| Reply::Empty,
    SetMessageFormat(SetMessageFormat) => |_| Reply::Empty,
    SetPreferredStorage(SetPreferredStorage) => |_| Reply::Empty,
    GetMainMenu(GetMainMenu) => |_| Reply::Empty,
    SendTerminalResponse(SendTerminalResponse) => |_| Reply::Empty,
    SelectMenuItem(SelectMenuItem) => |_| Reply::Empty,
    GetBand(GetBand) => Reply::Band,
    SetBand(SetBand) => |_| Reply::Empty,
    SetCellBroadcast(SetCellBroadcast) => |_| Reply::Empty,
}

/// Unsolicited notifications, matched on their exact prefix.
#[derive(Debug, Clone, PartialEq)]
pub enum Urc {
    CallMonitor(CallMonitor),
    Readiness(Readiness),
    SignalQuality(SignalQuality),
    /// `None` when the time stamp could not be parsed
    NetworkTime(Option<NetworkTime>),
    SmsMemoryFull(SmsMemoryFull),
    Stk(StkUrc),
}

impl Urc {
    pub fn from_line(line: &str) -> Option<Self> {
        let urc = if line.starts_with(CallMonitor::PREFIX) {
            Self::CallMonitor(CallMonitor::parse(line))
        } else if line.starts_with(Readiness::PREFIX) {
            Self::Readiness(Readiness::parse(line))
        } else if line.starts_with(SignalQuality::PREFIX) {
            Self::SignalQuality(SignalQuality::parse(line))
        } else if line.starts_with(NetworkTime::PREFIX) {
            Self::NetworkTime(NetworkTime::parse(line))
        } else if line.starts_with(SmsMemoryFull::PREFIX) {
            Self::SmsMemoryFull(SmsMemoryFull)
        } else {
            Self::Stk(StkUrc::parse(line)?)
        };
        Some(urc)
    }
}

impl AtatUrc for Urc {
    type Response = Urc;

    fn parse(resp: &[u8]) -> Option<Self::Response> {
        Urc::from_line(core::str::from_utf8(resp).ok()?.trim_end())
    }
}
