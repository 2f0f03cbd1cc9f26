//! Host answers to proactive commands, and envelopes sent to the SIM.

use serde::{Deserialize, Serialize};

use super::command::{InputMode, StkCommand};
use crate::codec::{Codec, Text, MAX_RAW_LEN};
use crate::command::stk::{SelectMenuItem, SendTerminalResponse, Trailing};
use crate::error::Error;
use crate::hex::encode_ucs2_hex;

/// General result of a terminal response, 3GPP TS 31.111 codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TerminalResult {
    Success = 0x00,
    PartialComprehension = 0x01,
    MissingInformation = 0x02,
    RefreshPerformed = 0x03,
    IconNotDisplayed = 0x04,
    ModifiedByCallControl = 0x05,
    LimitedService = 0x06,
    WithModification = 0x07,
    SessionTerminated = 0x10,
    BackwardMove = 0x11,
    NoResponseFromUser = 0x12,
    HelpInformationRequested = 0x13,
    UssdOrSsTerminatedByUser = 0x14,
    MeUnableToProcess = 0x20,
    NetworkUnableToProcess = 0x21,
    UserDidNotAccept = 0x22,
    UserClearedDownCall = 0x23,
    BeyondMeCapabilities = 0x30,
    TypeNotUnderstood = 0x31,
    DataNotUnderstood = 0x32,
    NumberNotUnderstood = 0x33,
    SsReturnError = 0x34,
    SmsRpError = 0x35,
    RequiredValuesMissing = 0x36,
    UssdReturnError = 0x37,
    CallControlPermanentProblem = 0x39,
    BearerIndependentProtocolError = 0x3A,
}

impl TerminalResult {
    pub fn code(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalResponse {
    /// The command being answered, as it was emitted
    pub command: StkCommand,
    pub result: TerminalResult,
    pub cause: Option<u8>,
    /// Input text for GetInkey and GetInput
    pub text: Text,
    /// Chosen item for SelectItem
    pub menu_item: u8,
}

impl TerminalResponse {
    pub fn new(command: StkCommand, result: TerminalResult) -> Self {
        Self {
            command,
            result,
            cause: None,
            text: Text::new(),
            menu_item: 0,
        }
    }

    /// Encode as `*MTRES`. Commands without a vendor response kind return
    /// [`Error::Unsupported`].
    pub fn to_command(&self, codec: &Codec) -> Result<SendTerminalResponse, Error> {
        let kind = self.command.response_kind().ok_or(Error::Unsupported)?;
        let success = self.result == TerminalResult::Success;

        let trailing = match &self.command {
            StkCommand::SelectItem(_)
                if success || self.result == TerminalResult::HelpInformationRequested =>
            {
                Trailing::MenuItem(self.menu_item)
            }
            StkCommand::GetInkey(cmd) if success => self.input(cmd.mode, codec),
            StkCommand::GetInput(cmd) if success => self.input(cmd.mode, codec),
            StkCommand::OpenChannel(channel) => Trailing::Channel(channel.channel_id()),
            _ => Trailing::None,
        };

        Ok(SendTerminalResponse {
            kind,
            result: self.result.code(),
            cause: self.cause,
            trailing,
        })
    }

    fn input(&self, mode: InputMode, codec: &Codec) -> Trailing {
        let text = match mode {
            InputMode::YesNo if self.text == "Yes" => "YES".try_into().unwrap_or_default(),
            InputMode::YesNo => "NO".try_into().unwrap_or_default(),
            InputMode::Ucs2 => encode_ucs2_hex::<MAX_RAW_LEN>(&self.text),
            _ => codec.quote(&self.text),
        };
        Trailing::Quoted(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnvelopeKind {
    MenuSelection,
    CallControl,
    MoShortMessageControl,
    EventDownload,
    TimerExpiration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub kind: EnvelopeKind,
    pub menu_item: u8,
    pub request_help: bool,
}

impl Envelope {
    pub fn menu_selection(menu_item: u8, request_help: bool) -> Self {
        Self {
            kind: EnvelopeKind::MenuSelection,
            menu_item,
            request_help,
        }
    }

    /// Only menu selections have a vendor encoding, anything else returns
    /// [`Error::Unsupported`].
    pub fn to_command(&self) -> Result<SelectMenuItem, Error> {
        match self.kind {
            EnvelopeKind::MenuSelection => Ok(SelectMenuItem {
                item: self.menu_item,
                help: self.request_help,
            }),
            _ => Err(Error::Unsupported),
        }
    }
}
