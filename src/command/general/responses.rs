//! Responses for General Commands
use atat::AtatResp;
use heapless::String;

use crate::codec::truncated;

/// Free text firmware description returned by `AT*MVERS`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedVersion {
    pub text: String<128>,
}

impl AtatResp for ExtendedVersion {}

impl ExtendedVersion {
    pub(crate) fn parse(bytes: &[u8]) -> Option<Self> {
        let text = core::str::from_utf8(bytes).ok()?;
        Some(Self {
            text: truncated(text.trim()),
        })
    }
}
