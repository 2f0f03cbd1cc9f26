//! Proactive commands as handed to the host.

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::codec::Text;
use crate::command::stk::types::{Icon, ResponseKind};

pub const MAX_MENU_ITEMS: usize = 16;
pub const MAX_LABEL_LEN: usize = 48;
/// Dial strings, SS and USSD strings, DTMF sequences
pub const MAX_NUMBER_LEN: usize = 64;
pub const MAX_URL_LEN: usize = 128;
pub const MAX_AT_COMMAND_LEN: usize = 128;

pub type Label = String<MAX_LABEL_LEN>;
pub type Number = String<MAX_NUMBER_LEN>;

/// Offset of channel ids in the destination device field
pub const CHANNEL_DEVICE_BASE: u8 = 0x20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: u32,
    pub label: Label,
    pub icon: Option<Icon>,
    pub has_help: bool,
    pub next_action: Option<u32>,
}

/// Body of both SetupMenu and SelectItem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub title: Text,
    pub items: Vec<MenuItem, MAX_MENU_ITEMS>,
    pub has_help: bool,
    pub icon: Option<Icon>,
}

/// What kind of answer an input request expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputMode {
    YesNo,
    Digits,
    SmsAlphabet,
    Ucs2,
}

impl InputMode {
    pub fn from_key_type(key_type: u32) -> Self {
        match key_type {
            0 => Self::YesNo,
            1 => Self::Digits,
            3 => Self::Ucs2,
            _ => Self::SmsAlphabet,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayText {
    pub text: Text,
    pub high_priority: bool,
    pub clear_after_delay: bool,
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetInkey {
    pub text: Text,
    pub mode: InputMode,
    pub has_help: bool,
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetInput {
    pub text: Text,
    pub default_text: Text,
    pub mode: InputMode,
    pub echo: bool,
    pub min_length: u32,
    pub max_length: u32,
    pub has_help: bool,
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tone {
    Dial,
    Busy,
    Congestion,
    RadioAck,
    Dropped,
    Error,
    CallWaiting,
    Ringing,
    GeneralBeep,
    PositiveBeep,
    NegativeBeep,
}

impl Tone {
    /// The modem reports the handset beeps as 10 to 12, the standard numbers
    /// them 16 to 18. Both are accepted, anything unknown is a general beep.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Dial,
            2 => Self::Busy,
            3 => Self::Congestion,
            4 => Self::RadioAck,
            5 => Self::Dropped,
            6 => Self::Error,
            7 => Self::CallWaiting,
            8 => Self::Ringing,
            11 | 17 => Self::PositiveBeep,
            12 | 18 => Self::NegativeBeep,
            _ => Self::GeneralBeep,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayTone {
    pub text: Text,
    pub tone: Tone,
    pub duration: u32,
    pub icon: Option<Icon>,
}

/// Body of the send SMS, SS, USSD and DTMF commands. `payload` is empty for
/// SMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessage {
    pub text: Text,
    pub payload: Number,
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupCall {
    pub qualifier: u32,
    pub text: Text,
    pub number: Number,
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefreshType {
    InitAndFullFileChange,
    FileChange,
    InitAndFileChange,
    Initialization,
    Reset,
    Unknown(u32),
}

impl From<u32> for RefreshType {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::InitAndFullFileChange,
            1 => Self::FileChange,
            2 => Self::InitAndFileChange,
            3 => Self::Initialization,
            4 => Self::Reset,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdleModeText {
    pub text: Text,
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BrowserLaunchMode {
    IfNotAlreadyLaunched,
    UseExisting,
    CloseExistingAndLaunch,
    Unknown(u32),
}

impl From<u32> for BrowserLaunchMode {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::IfNotAlreadyLaunched,
            2 => Self::UseExisting,
            3 => Self::CloseExistingAndLaunch,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchBrowser {
    pub mode: BrowserLaunchMode,
    pub url: String<MAX_URL_LEN>,
    pub text: Text,
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunAtCommand {
    pub text: Text,
    pub command: Option<String<MAX_AT_COMMAND_LEN>>,
    pub icon: Option<Icon>,
}

/// Body of the open, close, send data and receive data commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel id offset by [`CHANNEL_DEVICE_BASE`]
    pub destination_device: u8,
    pub text: Text,
    pub icon: Option<Icon>,
}

impl Channel {
    /// Channel id for `*MTRES`, 0 when the device is not a channel.
    pub fn channel_id(&self) -> u8 {
        match self.destination_device {
            d @ 0x21..=0x2F => d - CHANNEL_DEVICE_BASE,
            _ => 0,
        }
    }
}

/// A proactive command assembled from one or more notification lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StkCommand {
    DisplayText(DisplayText),
    GetInkey(GetInkey),
    GetInput(GetInput),
    PlayTone(PlayTone),
    SelectItem(Menu),
    SetupMenu(Menu),
    SendSms(SendMessage),
    SendSs(SendMessage),
    SendUssd(SendMessage),
    SendDtmf(SendMessage),
    SetupCall(SetupCall),
    Refresh(RefreshType),
    SetupIdleModeText(IdleModeText),
    /// ISO 639 code, when the SIM sent one
    LanguageNotification(Option<String<8>>),
    LaunchBrowser(LaunchBrowser),
    RunAtCommand(RunAtCommand),
    ProvideLocalInformation,
    OpenChannel(Channel),
    CloseChannel(Channel),
    ReceiveData(Channel),
    SendData(Channel),
}

impl StkCommand {
    /// `*MTRES` kind answering this command. Commands the modem answers on
    /// its own have none.
    pub fn response_kind(&self) -> Option<ResponseKind> {
        Some(match self {
            Self::DisplayText(_) => ResponseKind::DisplayText,
            Self::GetInkey(_) => ResponseKind::GetInkey,
            Self::GetInput(_) => ResponseKind::GetInput,
            Self::PlayTone(_) => ResponseKind::PlayTone,
            Self::SelectItem(_) => ResponseKind::SelectItem,
            Self::SendSs(_) => ResponseKind::SendSs,
            Self::SendUssd(_) => ResponseKind::SendUssd,
            Self::SetupCall(_) => ResponseKind::SetupCall,
            Self::SetupMenu(_) => ResponseKind::SetupMenu,
            Self::Refresh(_) => ResponseKind::Refresh,
            Self::SendDtmf(_) => ResponseKind::SendDtmf,
            Self::LaunchBrowser(_) => ResponseKind::LaunchBrowser,
            Self::SetupIdleModeText(_) => ResponseKind::SetupIdleModeText,
            Self::ProvideLocalInformation => ResponseKind::ProvideLocalInformation,
            Self::OpenChannel(_)
            | Self::CloseChannel(_)
            | Self::ReceiveData(_)
            | Self::SendData(_) => ResponseKind::Channel,
            Self::SendSms(_) | Self::LanguageNotification(_) | Self::RunAtCommand(_) => {
                return None
            }
        })
    }

    pub fn is_setup_menu(&self) -> bool {
        matches!(self, Self::SetupMenu(_))
    }
}

/// Outcome of call control by the SIM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlResult {
    Allowed,
    NotAllowed,
    AllowedWithModifications,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlKind {
    Call,
    Sms,
}

/// Call or SMS control performed by the SIM, reported outside the proactive
/// command cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlEvent {
    pub result: ControlResult,
    pub kind: ControlKind,
    pub text: Text,
}
