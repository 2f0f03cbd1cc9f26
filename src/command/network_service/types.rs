//! Argument and parameter types used by Network Service Commands

use atat::atat_derive::AtatEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
pub enum RegistrationUrc {
    /// 0: network registration URC disabled
    Disabled = 0,
    /// 1: network registration URC enabled
    Enabled = 1,
    /// 2: network registration and location information URC enabled
    EnabledWithLocation = 2,
}

/// Registration state as tracked by the host's network registration service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistrationState {
    NotRegistered,
    Home,
    Searching,
    Denied,
    Unknown,
    Roaming,
}

impl RegistrationState {
    /// Home, roaming and unknown count as registered for cell broadcast.
    pub fn is_registered(self) -> bool {
        matches!(self, Self::Home | Self::Roaming | Self::Unknown)
    }
}
