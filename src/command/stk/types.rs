//! Argument and parameter types used by SIM Toolkit Commands and URCs

use serde::{Deserialize, Serialize};

/// Icon attached to a proactive command or menu item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Icon {
    pub id: u32,
    /// The icon replaces the text instead of decorating it
    pub self_explanatory: bool,
}

/// Vendor code identifying which proactive command a `*MTRES` answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseKind {
    DisplayText,
    GetInkey,
    GetInput,
    PlayTone,
    SelectItem,
    SendSs,
    SendUssd,
    SetupCall,
    SetupMenu,
    Refresh,
    SendDtmf,
    LaunchBrowser,
    SetupIdleModeText,
    ProvideLocalInformation,
    /// Open, close, send data and receive data
    Channel,
}

impl ResponseKind {
    const TABLE: [(ResponseKind, u8); 15] = [
        (Self::DisplayText, 0),
        (Self::GetInkey, 1),
        (Self::GetInput, 2),
        (Self::PlayTone, 3),
        (Self::SelectItem, 4),
        (Self::SendSs, 5),
        (Self::SendUssd, 6),
        (Self::SetupCall, 7),
        (Self::SetupMenu, 8),
        (Self::Refresh, 10),
        (Self::SendDtmf, 12),
        (Self::LaunchBrowser, 13),
        (Self::SetupIdleModeText, 14),
        (Self::ProvideLocalInformation, 15),
        (Self::Channel, 16),
    ];

    pub fn code(self) -> u8 {
        Self::TABLE
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|&(_, code)| code)
            .unwrap_or_default()
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|&&(_, c)| c == code)
            .map(|&(kind, _)| kind)
    }

    #[cfg(test)]
    pub fn all() -> impl Iterator<Item = ResponseKind> {
        Self::TABLE.iter().map(|&(kind, _)| kind)
    }
}

/// Family of the two menu notifications sharing one multi-line layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuFamily {
    /// `*MTSMENU:`, the SIM's main menu
    SetupMenu,
    /// `*MTITEM:`, a one-off item selection
    SelectItem,
}

/// Service requested by `*MTCHEVT:`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelService {
    Open,
    SendData,
    ReceiveData,
    Close,
    Unknown(u32),
}

impl From<u32> for ChannelService {
    fn from(value: u32) -> Self {
        match value {
            1 => Self::Open,
            2 => Self::SendData,
            3 => Self::ReceiveData,
            4 => Self::Close,
            other => Self::Unknown(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_kind_table_is_bijective() {
        for kind in ResponseKind::all() {
            assert_eq!(ResponseKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ResponseKind::all().count(), 15);
    }

    #[test]
    fn response_kind_codes() {
        assert_eq!(ResponseKind::DisplayText.code(), 0);
        assert_eq!(ResponseKind::SetupMenu.code(), 8);
        assert_eq!(ResponseKind::Refresh.code(), 10);
        assert_eq!(ResponseKind::Channel.code(), 16);
        assert_eq!(ResponseKind::from_code(9), None);
        assert_eq!(ResponseKind::from_code(11), None);
        assert_eq!(ResponseKind::from_code(17), None);
    }
}
