//! Argument and parameter types used by Cell Broadcast Commands

use atat::atat_derive::AtatEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
pub enum CellBroadcastMode {
    /// 0: the listed message identifiers are accepted
    Accept = 0,
    /// 1: the listed message identifiers are not accepted
    Reject = 1,
}
