//! Argument and parameter types used by Call Control Commands and URCs

/// Call status reported by `*MCAM:`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CallStatus {
    Idle,
    Calling,
    PreConnected,
    Connected,
    Hold,
    Waiting,
    Alerting,
    Busy,
    Disconnect,
    Unknown(u32),
}

impl From<u32> for CallStatus {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Calling,
            2 => Self::PreConnected,
            3 => Self::Connected,
            4 => Self::Hold,
            5 => Self::Waiting,
            6 => Self::Alerting,
            7 => Self::Busy,
            8 => Self::Disconnect,
            other => Self::Unknown(other),
        }
    }
}

impl CallStatus {
    /// Calling, pre-connected or alerting: the dial attempt is still in
    /// progress.
    pub fn is_dialing_phase(self) -> bool {
        matches!(self, Self::Calling | Self::PreConnected | Self::Alerting)
    }
}
