//! Unsolicited responses for SIM Toolkit Commands
//!
//! Only the first line of a notification is parsed here. Quoted fields keep
//! their escapes; the session decodes them with the channel's codec once it
//! knows the unicode flag of the notification.
use super::types::{ChannelService, Icon, MenuFamily};
use crate::command::tokens::{Quoted, Tokens};

fn icon(t: &mut Tokens) -> Option<Icon> {
    if t.number() == 0 {
        return None;
    }
    Some(Icon {
        self_explanatory: t.flag(),
        id: t.number(),
    })
}

/// `*MTSMENU:` / `*MTITEM:` `"<title>",<unicode>,<items>,<help>[,<icon>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuHeader {
    pub family: MenuFamily,
    pub title: Quoted,
    pub unicode: bool,
    pub items: u32,
    pub has_help: bool,
    pub icon: Option<Icon>,
}

impl MenuHeader {
    pub const SETUP_MENU: &'static str = "*MTSMENU:";
    pub const SELECT_ITEM: &'static str = "*MTITEM:";

    pub fn parse(line: &str, family: MenuFamily) -> Self {
        let prefix = match family {
            MenuFamily::SetupMenu => Self::SETUP_MENU,
            MenuFamily::SelectItem => Self::SELECT_ITEM,
        };
        let mut t = Tokens::after(line, prefix);
        Self {
            family,
            title: t.string(),
            unicode: t.flag(),
            items: t.number(),
            has_help: t.flag(),
            icon: icon(&mut t),
        }
    }
}

/// One item line following a menu header,
/// `<id>:"<label>"[,<icon exists>,<self explanatory>,<icon id>[,<has next action>,<next action>]]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemLine {
    pub id: u32,
    pub label: Quoted,
    pub icon: Option<Icon>,
    pub next_action: Option<u32>,
}

impl MenuItemLine {
    pub fn parse(line: &str) -> Self {
        let (id, rest) = line.split_once(':').unwrap_or(("", line));
        let id = id
            .bytes()
            .filter(u8::is_ascii_digit)
            .fold(0u32, |acc, d| acc.wrapping_mul(10).wrapping_add(u32::from(d - b'0')));

        let mut t = Tokens::new(rest);
        let label = t.string();
        let mut icon = None;
        let mut next_action = None;
        if t.has_more() {
            // The icon exists flag is not reliable, the id fields are always sent.
            t.number();
            icon = Some(Icon {
                self_explanatory: t.flag(),
                id: t.number(),
            });
            if t.has_more() && t.number() != 0 {
                next_action = Some(t.number());
            }
        }
        Self {
            id,
            label,
            icon,
            next_action,
        }
    }
}

/// `*MTDISP: <high priority>,<clear after delay>,<unicode>[,<icon>]`, the
/// text follows on the next line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTextHeader {
    pub high_priority: bool,
    pub clear_after_delay: bool,
    pub unicode: bool,
    pub icon: Option<Icon>,
}

impl DisplayTextHeader {
    pub const PREFIX: &'static str = "*MTDISP:";

    pub fn parse(line: &str) -> Self {
        let mut t = Tokens::after(line, Self::PREFIX);
        Self {
            high_priority: t.flag(),
            clear_after_delay: t.flag(),
            unicode: t.flag(),
            icon: icon(&mut t),
        }
    }
}

/// `*MTKEY: <key type>,<unicode>,<help>[,<icon>]`, the prompt follows on the
/// next line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetInkeyHeader {
    pub key_type: u32,
    pub unicode: bool,
    pub has_help: bool,
    pub icon: Option<Icon>,
}

impl GetInkeyHeader {
    pub const PREFIX: &'static str = "*MTKEY:";

    pub fn parse(line: &str) -> Self {
        let mut t = Tokens::after(line, Self::PREFIX);
        Self {
            key_type: t.number(),
            unicode: t.flag(),
            has_help: t.flag(),
            icon: icon(&mut t),
        }
    }
}

/// `*MTGIN: <key type>,<unicode>,<echo>,<min>,<max>,<help>[,<icon>]`, the
/// prompt and the default text follow on the next two lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetInputHeader {
    pub key_type: u32,
    pub unicode: bool,
    pub echo: bool,
    pub min_length: u32,
    pub max_length: u32,
    pub has_help: bool,
    pub icon: Option<Icon>,
}

impl GetInputHeader {
    pub const PREFIX: &'static str = "*MTGIN:";

    pub fn parse(line: &str) -> Self {
        let mut t = Tokens::after(line, Self::PREFIX);
        Self {
            key_type: t.number(),
            unicode: t.flag(),
            echo: t.flag(),
            min_length: t.number(),
            max_length: t.number(),
            has_help: t.flag(),
            icon: icon(&mut t),
        }
    }
}

/// `*MTTONE: "<text>",<unicode>,<tone>,<duration>[,<icon>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayTone {
    pub text: Quoted,
    pub unicode: bool,
    pub tone: u32,
    pub duration: u32,
    pub icon: Option<Icon>,
}

impl PlayTone {
    pub const PREFIX: &'static str = "*MTTONE:";

    pub fn parse(line: &str) -> Self {
        let mut t = Tokens::after(line, Self::PREFIX);
        Self {
            text: t.string(),
            unicode: t.flag(),
            tone: t.number(),
            duration: t.number(),
            icon: icon(&mut t),
        }
    }
}

/// `*MTRSH: <type>`, types 0 to 2 are followed by a line listing the
/// changed files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refresh {
    pub refresh_type: u32,
}

impl Refresh {
    pub const PREFIX: &'static str = "*MTRSH:";

    pub fn parse(line: &str) -> Self {
        Self {
            refresh_type: Tokens::after(line, Self::PREFIX).number(),
        }
    }

    pub fn has_file_list(&self) -> bool {
        self.refresh_type <= 2
    }
}

/// `*MTSMS: "<text>",<unicode>[,<icon>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendSms {
    pub text: Quoted,
    pub unicode: bool,
    pub icon: Option<Icon>,
}

impl SendSms {
    pub const PREFIX: &'static str = "*MTSMS:";

    pub fn parse(line: &str) -> Self {
        let mut t = Tokens::after(line, Self::PREFIX);
        Self {
            text: t.string(),
            unicode: t.flag(),
            icon: icon(&mut t),
        }
    }
}

/// Kind of string carried by [`SendString`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendStringKind {
    /// `*MTSS:`
    SupplementaryService,
    /// `*MTUSSD:`
    Ussd,
    /// `*MTDTMF:`
    Dtmf,
}

/// `*MTSS:` / `*MTUSSD:` / `*MTDTMF:` `"<text>",<unicode>,"<string>"[,<icon>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendString {
    pub kind: SendStringKind,
    pub text: Quoted,
    pub unicode: bool,
    pub payload: Quoted,
    pub icon: Option<Icon>,
}

impl SendString {
    pub const SS: &'static str = "*MTSS:";
    pub const USSD: &'static str = "*MTUSSD:";
    pub const DTMF: &'static str = "*MTDTMF:";

    pub fn parse(line: &str, kind: SendStringKind) -> Self {
        let prefix = match kind {
            SendStringKind::SupplementaryService => Self::SS,
            SendStringKind::Ussd => Self::USSD,
            SendStringKind::Dtmf => Self::DTMF,
        };
        let mut t = Tokens::after(line, prefix);
        Self {
            kind,
            text: t.string(),
            unicode: t.flag(),
            payload: t.string(),
            icon: icon(&mut t),
        }
    }
}

/// `*MTCALL: <qualifier>,"<text>",<unicode>,"<number>",<phase>[,<icon>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupCall {
    pub qualifier: u32,
    pub text: Quoted,
    pub unicode: bool,
    pub number: Quoted,
    pub icon: Option<Icon>,
}

impl SetupCall {
    pub const PREFIX: &'static str = "*MTCALL:";

    pub fn parse(line: &str) -> Self {
        let mut t = Tokens::after(line, Self::PREFIX);
        let qualifier = t.number();
        let text = t.string();
        let unicode = t.flag();
        let number = t.string();
        // call phase
        t.number();
        Self {
            qualifier,
            text,
            unicode,
            number,
            icon: icon(&mut t),
        }
    }
}

/// `*MTITXT: <unicode>[,<icon>]`, the text follows on the next line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleModeTextHeader {
    pub unicode: bool,
    pub icon: Option<Icon>,
}

impl IdleModeTextHeader {
    pub const PREFIX: &'static str = "*MTITXT:";

    pub fn parse(line: &str) -> Self {
        let mut t = Tokens::after(line, Self::PREFIX);
        Self {
            unicode: t.flag(),
            icon: icon(&mut t),
        }
    }
}

/// `*MTLANG:`, the SIM asks for the handset language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageQuery;

impl LanguageQuery {
    pub const PREFIX: &'static str = "*MTLANG:";
}

/// `*MTLANGNT: "<language>"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageNotification {
    pub language: Quoted,
}

impl LanguageNotification {
    pub const PREFIX: &'static str = "*MTLANGNT:";

    pub fn parse(line: &str) -> Self {
        Self {
            language: Tokens::after(line, Self::PREFIX).string(),
        }
    }
}

/// `*MTLBR: <mode>,"<url>"`, followed by a proxy line and an alpha line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchBrowserHeader {
    pub mode: u32,
    pub url: Quoted,
}

impl LaunchBrowserHeader {
    pub const PREFIX: &'static str = "*MTLBR:";

    pub fn parse(line: &str) -> Self {
        let mut t = Tokens::after(line, Self::PREFIX);
        Self {
            mode: t.number(),
            url: t.string(),
        }
    }
}

/// Third line of a launch browser notification, `<unicode>,"<alpha>"[,<icon>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserAlphaLine {
    pub unicode: bool,
    pub alpha: Quoted,
    pub icon: Option<Icon>,
}

impl BrowserAlphaLine {
    pub fn parse(line: &str) -> Self {
        let mut t = Tokens::new(line);
        Self {
            unicode: t.flag(),
            alpha: t.string(),
            icon: icon(&mut t),
        }
    }
}

/// `*MTRUNAT: "<alpha>",<unicode>,"<command>"[,<icon>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunAtCommand {
    pub alpha: Quoted,
    pub unicode: bool,
    pub command: Quoted,
    pub icon: Option<Icon>,
}

impl RunAtCommand {
    pub const PREFIX: &'static str = "*MTRUNAT:";

    pub fn parse(line: &str) -> Self {
        let mut t = Tokens::after(line, Self::PREFIX);
        Self {
            alpha: t.string(),
            unicode: t.flag(),
            command: t.string(),
            icon: icon(&mut t),
        }
    }
}

/// `*MTCHEVT: <channel>,<service>,"<text>",<unicode>[,<icon>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEvent {
    pub channel: u32,
    pub service: ChannelService,
    pub text: Quoted,
    pub unicode: bool,
    pub icon: Option<Icon>,
}

impl ChannelEvent {
    pub const PREFIX: &'static str = "*MTCHEVT:";

    pub fn parse(line: &str) -> Self {
        let mut t = Tokens::after(line, Self::PREFIX);
        Self {
            channel: t.number(),
            service: ChannelService::from(t.number()),
            text: t.string(),
            unicode: t.flag(),
            icon: icon(&mut t),
        }
    }
}

/// `*MTSTKCC: <result mode>,...,"<alpha>"`
///
/// Result mode 4 reports an error: `4,<error>,<type>,"<alpha>"`. Any other
/// mode carries the original and the resulting request type:
/// `<mode>,<old type>,<new type>,"<alpha>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallControl {
    pub result_mode: u32,
    pub error_code: Option<u32>,
    pub old_type: u32,
    pub new_type: u32,
    pub alpha: Quoted,
}

impl CallControl {
    pub const PREFIX: &'static str = "*MTSTKCC:";
    pub const ERROR_MODE: u32 = 4;

    pub fn parse(line: &str) -> Self {
        let mut t = Tokens::after(line, Self::PREFIX);
        let result_mode = t.number();
        let (error_code, old_type, new_type) = if result_mode == Self::ERROR_MODE {
            let error_code = t.number();
            let old_type = t.number();
            (Some(error_code), old_type, old_type)
        } else {
            (None, t.number(), t.number())
        };
        Self {
            result_mode,
            error_code,
            old_type,
            new_type,
            alpha: t.string(),
        }
    }
}

/// `*MSTKEV`, the SIM ended the toolkit session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEnded;

impl SessionEnded {
    pub const PREFIX: &'static str = "*MSTKEV:";
}

/// First line of any SIM toolkit notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StkUrc {
    Menu(MenuHeader),
    SessionEnded,
    DisplayText(DisplayTextHeader),
    GetInkey(GetInkeyHeader),
    GetInput(GetInputHeader),
    PlayTone(PlayTone),
    Refresh(Refresh),
    SendSms(SendSms),
    SendString(SendString),
    SetupCall(SetupCall),
    IdleModeText(IdleModeTextHeader),
    LanguageQuery,
    LanguageNotification(LanguageNotification),
    LaunchBrowser(LaunchBrowserHeader),
    RunAtCommand(RunAtCommand),
    ChannelEvent(ChannelEvent),
    CallControl(CallControl),
}

impl StkUrc {
    pub fn parse(line: &str) -> Option<Self> {
        let urc = if line.starts_with(MenuHeader::SETUP_MENU) {
            Self::Menu(MenuHeader::parse(line, MenuFamily::SetupMenu))
        } else if line.starts_with(MenuHeader::SELECT_ITEM) {
            Self::Menu(MenuHeader::parse(line, MenuFamily::SelectItem))
        } else if line.starts_with(SessionEnded::PREFIX) {
            Self::SessionEnded
        } else if line.starts_with(DisplayTextHeader::PREFIX) {
            Self::DisplayText(DisplayTextHeader::parse(line))
        } else if line.starts_with(GetInkeyHeader::PREFIX) {
            Self::GetInkey(GetInkeyHeader::parse(line))
        } else if line.starts_with(GetInputHeader::PREFIX) {
            Self::GetInput(GetInputHeader::parse(line))
        } else if line.starts_with(PlayTone::PREFIX) {
            Self::PlayTone(PlayTone::parse(line))
        } else if line.starts_with(Refresh::PREFIX) {
            Self::Refresh(Refresh::parse(line))
        } else if line.starts_with(SendSms::PREFIX) {
            Self::SendSms(SendSms::parse(line))
        } else if line.starts_with(SendString::SS) {
            Self::SendString(SendString::parse(line, SendStringKind::SupplementaryService))
        } else if line.starts_with(SendString::USSD) {
            Self::SendString(SendString::parse(line, SendStringKind::Ussd))
        } else if line.starts_with(SendString::DTMF) {
            Self::SendString(SendString::parse(line, SendStringKind::Dtmf))
        } else if line.starts_with(SetupCall::PREFIX) {
            Self::SetupCall(SetupCall::parse(line))
        } else if line.starts_with(IdleModeTextHeader::PREFIX) {
            Self::IdleModeText(IdleModeTextHeader::parse(line))
        } else if line.starts_with(LanguageQuery::PREFIX) {
            Self::LanguageQuery
        } else if line.starts_with(LanguageNotification::PREFIX) {
            Self::LanguageNotification(LanguageNotification::parse(line))
        } else if line.starts_with(LaunchBrowserHeader::PREFIX) {
            Self::LaunchBrowser(LaunchBrowserHeader::parse(line))
        } else if line.starts_with(RunAtCommand::PREFIX) {
            Self::RunAtCommand(RunAtCommand::parse(line))
        } else if line.starts_with(ChannelEvent::PREFIX) {
            Self::ChannelEvent(ChannelEvent::parse(line))
        } else if line.starts_with(CallControl::PREFIX) {
            Self::CallControl(CallControl::parse(line))
        } else {
            return None;
        };
        Some(urc)
    }

    /// Menu family of a menu notification, used to tell a continuation of an
    /// interrupted menu from a fresh one.
    pub fn menu_family(&self) -> Option<MenuFamily> {
        match self {
            Self::Menu(header) => Some(header.family),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_menu_header() {
        let h = MenuHeader::parse("*MTSMENU: \"Main\",0,3,1", MenuFamily::SetupMenu);
        assert_eq!(h.title, "Main");
        assert!(!h.unicode);
        assert_eq!(h.items, 3);
        assert!(h.has_help);
        assert_eq!(h.icon, None);

        let h = MenuHeader::parse("*MTITEM: \"Pick\",1,2,0,1,1,7", MenuFamily::SelectItem);
        assert!(h.unicode);
        assert_eq!(
            h.icon,
            Some(Icon {
                id: 7,
                self_explanatory: true
            })
        );
    }

    #[test]
    fn parses_menu_items() {
        let item = MenuItemLine::parse("12:\"Games\"");
        assert_eq!(item.id, 12);
        assert_eq!(item.label, "Games");
        assert_eq!(item.icon, None);
        assert_eq!(item.next_action, None);

        let item = MenuItemLine::parse("3:\"Call\",1,0,4,1,16");
        assert_eq!(
            item.icon,
            Some(Icon {
                id: 4,
                self_explanatory: false
            })
        );
        assert_eq!(item.next_action, Some(16));

        let item = MenuItemLine::parse("3:\"Call\",1,0,4,0,16");
        assert_eq!(item.next_action, None);
    }

    #[test]
    fn parses_call_control_encodings() {
        let cc = CallControl::parse("*MTSTKCC: 2,1,1,\"Redirected\"");
        assert_eq!(cc.result_mode, 2);
        assert_eq!(cc.error_code, None);
        assert_eq!(cc.new_type, 1);
        assert_eq!(cc.alpha, "Redirected");

        let cc = CallControl::parse("*MTSTKCC: 4,5,4,\"x\"");
        assert_eq!(cc.error_code, Some(5));
        assert_eq!(cc.old_type, 4);
        assert_eq!(cc.new_type, 4);
    }

    #[test]
    fn prefixes_do_not_shadow_each_other() {
        assert!(matches!(
            StkUrc::parse("*MTLANGNT: \"de\""),
            Some(StkUrc::LanguageNotification(_))
        ));
        assert_eq!(StkUrc::parse("*MTLANG:"), Some(StkUrc::LanguageQuery));
        assert!(matches!(
            StkUrc::parse("*MTITXT: 0"),
            Some(StkUrc::IdleModeText(_))
        ));
        assert!(matches!(
            StkUrc::parse("*MTITEM: \"x\",0,0,0"),
            Some(StkUrc::Menu(_))
        ));
        assert_eq!(StkUrc::parse("1:\"Item\""), None);
    }

    #[test]
    fn parses_channel_event() {
        let ev = ChannelEvent::parse("*MTCHEVT: 2,1,\"Open\",0");
        assert_eq!(ev.channel, 2);
        assert_eq!(ev.service, ChannelService::Open);
        assert_eq!(ev.text, "Open");
    }
}
