//! Argument types shared between command groups

use atat::atat_derive::AtatEnum;

/// Enables or disables an unsolicited report or supplementary feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
pub enum Reporting {
    Disabled = 0,
    Enabled = 1,
}
