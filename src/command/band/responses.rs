//! Responses for Band Selection Commands
use atat::AtatResp;

use crate::command::tokens::Tokens;

/// `*MBSEL: <band>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedBand {
    /// `None` when the reply carried no `*MBSEL:` line
    pub band: Option<u8>,
}

impl AtatResp for SelectedBand {}

impl SelectedBand {
    pub const PREFIX: &'static str = "*MBSEL:";

    pub(crate) fn parse(bytes: &[u8]) -> Self {
        let band = core::str::from_utf8(bytes)
            .ok()
            .and_then(|text| {
                text.lines()
                    .map(str::trim)
                    .find(|line| line.starts_with(Self::PREFIX))
            })
            .map(|line| Tokens::after(line, Self::PREFIX).byte());
        Self { band }
    }
}
