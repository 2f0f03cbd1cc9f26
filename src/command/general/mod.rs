//! ### General and modem configuration
pub mod responses;
pub mod types;
pub mod urc;

use atat::{atat_derive::AtatCmd, AtatCmd};

use super::{types::Reporting, NoResponse};
use responses::ExtendedVersion;
use types::{AudioOutput, AudioProcessing, Echo, FeatureState, ModemFeature};

/// Command echo E
#[derive(Debug, Clone, PartialEq, AtatCmd)]
#[at_cmd("E", NoResponse, value_sep = false)]
pub struct SetEcho {
    #[at_arg(position = 0)]
    pub enabled: Echo,
}

/// Modem configuration *MCNFG
#[derive(Debug, Clone, PartialEq, AtatCmd)]
#[at_cmd("*MCNFG", NoResponse)]
pub struct SetModemConfiguration {
    #[at_arg(position = 0)]
    pub feature: ModemFeature,
    #[at_arg(position = 1)]
    pub state: FeatureState,
}

/// Echo cancellation and noise suppression *MECNS
#[derive(Debug, Clone, PartialEq, AtatCmd)]
#[at_cmd("*MECNS", NoResponse)]
pub struct SetAudioProcessing {
    #[at_arg(position = 0)]
    pub block: AudioProcessing,
    #[at_arg(position = 1)]
    pub state: FeatureState,
}

/// Voice channel selection *MVCHN
#[derive(Debug, Clone, PartialEq, AtatCmd)]
#[at_cmd("*MVCHN", NoResponse)]
pub struct SetAudioOutput {
    #[at_arg(position = 0)]
    pub output: AudioOutput,
}

/// Signal quality reporting *MCSQ
///
/// Enables the unsolicited `*MCSQ:` signal strength report.
#[derive(Debug, Clone, PartialEq, AtatCmd)]
#[at_cmd("*MCSQ", NoResponse)]
pub struct SetSignalQualityReporting {
    #[at_arg(position = 0)]
    pub mode: Reporting,
}

/// Extended version *MVERS
///
/// Firmware and hardware revision string. The reply is free text and not a
/// `*MVERS:` information response, so it is parsed by hand.
#[derive(Debug, Clone, PartialEq)]
pub struct GetExtendedVersion;

impl AtatCmd for GetExtendedVersion {
    type Response = ExtendedVersion;

    const MAX_LEN: usize = 10;

    fn write(&self, buf: &mut [u8]) -> usize {
        const CMD: &[u8] = b"AT*MVERS\r\n";
        let len = CMD.len().min(buf.len());
        buf[..len].copy_from_slice(&CMD[..len]);
        len
    }

    fn parse(
        &self,
        resp: Result<&[u8], atat::InternalError>,
    ) -> Result<Self::Response, atat::Error> {
        match resp {
            Ok(bytes) => ExtendedVersion::parse(bytes).ok_or(atat::Error::Parse),
            Err(e) => Err(e.into()),
        }
    }
}
