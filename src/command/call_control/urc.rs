//! Unsolicited responses for Call Control Commands
use super::types::CallStatus;
use crate::command::tokens::Tokens;

/// `*MCAM: <id>,<status>,<type>`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CallMonitor {
    pub id: u32,
    pub status: CallStatus,
    /// Vendor call type code, informational only
    pub call_type: u32,
}

impl CallMonitor {
    pub const PREFIX: &'static str = "*MCAM:";

    pub fn parse(line: &str) -> Self {
        let mut t = Tokens::after(line, Self::PREFIX);
        Self {
            id: t.number(),
            status: CallStatus::from(t.number()),
            call_type: t.number(),
        }
    }
}
