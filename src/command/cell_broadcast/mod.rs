//! ### Cell broadcast
pub mod types;

use core::fmt::Write;

use atat::atat_derive::AtatCmd;
use heapless::String;

use super::NoResponse;
use types::CellBroadcastMode;

/// Select cell broadcast message types +CSCB
#[derive(Debug, Clone, PartialEq, AtatCmd)]
#[at_cmd("+CSCB", NoResponse)]
pub struct SetCellBroadcast {
    #[at_arg(position = 0)]
    pub mode: CellBroadcastMode,
    /// Comma separated message identifiers
    #[at_arg(position = 1, len = 96)]
    pub channels: String<96>,
}

impl SetCellBroadcast {
    pub fn new(mode: CellBroadcastMode, channels: &[u16]) -> Self {
        let mut list = String::new();
        for (i, channel) in channels.iter().enumerate() {
            let sep = if i == 0 { "" } else { "," };
            if write!(list, "{}{}", sep, channel).is_err() {
                warn!("Cell broadcast channel list truncated");
                break;
            }
        }
        Self {
            mode,
            channels: list,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::wire;

    #[test]
    fn serializes_channel_list() {
        assert_eq!(
            wire(&SetCellBroadcast::new(CellBroadcastMode::Accept, &[50, 4370])),
            "AT+CSCB=0,\"50,4370\"\r\n"
        );
        assert_eq!(
            wire(&SetCellBroadcast::new(CellBroadcastMode::Reject, &[50])),
            "AT+CSCB=1,\"50\"\r\n"
        );
    }
}
