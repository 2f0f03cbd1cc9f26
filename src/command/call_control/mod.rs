//! ### Call control
pub mod types;
pub mod urc;

use atat::atat_derive::AtatCmd;
use heapless::String;

use super::{types::Reporting, NoResponse};

/// Hook control H
///
/// Ends the active call, rejects an incoming one or tears down a dial attempt
/// that already reached the network.
#[derive(Debug, Clone, PartialEq, AtatCmd)]
#[at_cmd("H", NoResponse, value_sep = false)]
pub struct HangUp;

/// Call monitoring *MCAM
///
/// Enables the `*MCAM:` call state notifications the call tracker is driven
/// by.
#[derive(Debug, Clone, PartialEq, AtatCmd)]
#[at_cmd("*MCAM", NoResponse)]
pub struct SetCallMonitoring {
    #[at_arg(position = 0)]
    pub mode: Reporting,
}

/// Cellular result codes +CRC
#[derive(Debug, Clone, PartialEq, AtatCmd)]
#[at_cmd("+CRC", NoResponse)]
pub struct SetCellularResultCodes {
    #[at_arg(position = 0)]
    pub mode: Reporting,
}

/// Calling line identification presentation +CLIP
///
/// **NOTE**: blocks for a long time when issued before the modem reports all
/// commands ready.
#[derive(Debug, Clone, PartialEq, AtatCmd)]
#[at_cmd("+CLIP", NoResponse)]
pub struct SetCallingLineIdentification {
    #[at_arg(position = 0)]
    pub mode: Reporting,
}

/// Call waiting +CCWA
#[derive(Debug, Clone, PartialEq, AtatCmd)]
#[at_cmd("+CCWA", NoResponse)]
pub struct SetCallWaiting {
    #[at_arg(position = 0)]
    pub mode: Reporting,
}

/// Local key tone *MKEYTONE
///
/// Plays the DTMF feedback tone on the handset for `duration` (in 10 ms
/// units).
#[derive(Debug, Clone, PartialEq, AtatCmd)]
#[at_cmd("*MKEYTONE", NoResponse)]
pub struct PlayKeyTone {
    #[at_arg(position = 0, len = 4)]
    pub tone: String<4>,
    #[at_arg(position = 1)]
    pub duration: u8,
}

/// DTMF and tone generation +VTS
#[derive(Debug, Clone, PartialEq, AtatCmd)]
#[at_cmd("+VTS", NoResponse)]
pub struct SendDtmf {
    #[at_arg(position = 0, len = 4)]
    pub tone: String<4>,
}
