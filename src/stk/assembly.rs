//! Multi-line proactive commands.
//!
//! Several notifications carry their payload on the lines that follow the
//! header. The header is parsed up front and kept in [`Pending`] together
//! with everything decoded so far; each following line advances it by one
//! step.

use heapless::Vec;

use super::command::{
    BrowserLaunchMode, DisplayText, GetInkey, GetInput, IdleModeText, InputMode, LaunchBrowser,
    Menu, MenuItem, StkCommand, MAX_MENU_ITEMS,
};
use crate::codec::{truncated, Codec, Text};
use crate::command::stk::types::MenuFamily;
use crate::command::stk::urc::{
    BrowserAlphaLine, DisplayTextHeader, GetInkeyHeader, GetInputHeader, IdleModeTextHeader,
    LaunchBrowserHeader, MenuHeader, MenuItemLine, StkUrc,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Pending {
    Menu {
        header: MenuHeader,
        items: Vec<MenuItem, MAX_MENU_ITEMS>,
        remaining: u32,
    },
    /// Item lines of a refused menu, discarded
    SkipMenu {
        family: MenuFamily,
        remaining: u32,
    },
    DisplayText(DisplayTextHeader),
    GetInkey(GetInkeyHeader),
    GetInputPrompt(GetInputHeader),
    GetInputDefault(GetInputHeader, Text),
    /// Changed file list of a refresh, discarded
    RefreshFiles,
    IdleModeText(IdleModeTextHeader),
    BrowserProxy(LaunchBrowserHeader),
    BrowserAlpha(LaunchBrowserHeader),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Step {
    Next(Pending),
    Done(StkCommand),
    Discard,
}

impl Pending {
    /// Whether `urc` belongs to the notification family being assembled.
    pub fn same_family(&self, urc: &StkUrc) -> bool {
        match self {
            Self::Menu { header, .. } => urc.menu_family() == Some(header.family),
            Self::SkipMenu { family, .. } => urc.menu_family() == Some(*family),
            Self::DisplayText(_) => matches!(urc, StkUrc::DisplayText(_)),
            Self::GetInkey(_) => matches!(urc, StkUrc::GetInkey(_)),
            Self::GetInputPrompt(_) | Self::GetInputDefault(..) => {
                matches!(urc, StkUrc::GetInput(_))
            }
            Self::RefreshFiles => matches!(urc, StkUrc::Refresh(_)),
            Self::IdleModeText(_) => matches!(urc, StkUrc::IdleModeText(_)),
            Self::BrowserProxy(_) | Self::BrowserAlpha(_) => matches!(urc, StkUrc::LaunchBrowser(_)),
        }
    }

    pub fn advance(self, line: &str, codec: &Codec) -> Step {
        match self {
            Self::Menu {
                header,
                mut items,
                remaining,
            } => {
                // Larger menus are refused before assembly starts
                items.push(menu_item(line, &header, codec)).ok();
                match remaining.saturating_sub(1) {
                    0 => Step::Done(menu(&header, items, codec)),
                    remaining => Step::Next(Self::Menu {
                        header,
                        items,
                        remaining,
                    }),
                }
            }
            Self::SkipMenu { family, remaining } => match remaining.saturating_sub(1) {
                0 => Step::Discard,
                remaining => Step::Next(Self::SkipMenu { family, remaining }),
            },
            Self::DisplayText(header) => Step::Done(StkCommand::DisplayText(DisplayText {
                text: codec.decode(line.as_bytes(), header.unicode),
                high_priority: header.high_priority,
                clear_after_delay: header.clear_after_delay,
                icon: header.icon,
            })),
            Self::GetInkey(header) => Step::Done(StkCommand::GetInkey(GetInkey {
                text: codec.decode(line.as_bytes(), header.unicode),
                mode: InputMode::from_key_type(header.key_type),
                has_help: header.has_help,
                icon: header.icon,
            })),
            Self::GetInputPrompt(header) => {
                let prompt = codec.decode(line.as_bytes(), header.unicode);
                Step::Next(Self::GetInputDefault(header, prompt))
            }
            Self::GetInputDefault(header, prompt) => Step::Done(StkCommand::GetInput(GetInput {
                text: prompt,
                default_text: codec.decode(line.as_bytes(), header.unicode),
                mode: InputMode::from_key_type(header.key_type),
                echo: header.echo,
                min_length: header.min_length,
                max_length: header.max_length,
                has_help: header.has_help,
                icon: header.icon,
            })),
            Self::RefreshFiles => Step::Discard,
            Self::IdleModeText(header) => {
                Step::Done(StkCommand::SetupIdleModeText(IdleModeText {
                    text: codec.decode(line.as_bytes(), header.unicode),
                    icon: header.icon,
                }))
            }
            // proxy
            Self::BrowserProxy(header) => Step::Next(Self::BrowserAlpha(header)),
            Self::BrowserAlpha(header) => {
                let alpha = BrowserAlphaLine::parse(line);
                Step::Done(StkCommand::LaunchBrowser(LaunchBrowser {
                    mode: BrowserLaunchMode::from(header.mode),
                    url: truncated(&codec.plain(&header.url)),
                    text: codec.decode_quoted(&alpha.alpha, alpha.unicode),
                    icon: alpha.icon,
                }))
            }
        }
    }
}

fn menu_item(line: &str, header: &MenuHeader, codec: &Codec) -> MenuItem {
    let item = MenuItemLine::parse(line);
    MenuItem {
        id: item.id,
        label: truncated(&codec.decode_quoted(&item.label, header.unicode)),
        icon: item.icon,
        has_help: header.has_help,
        next_action: item.next_action,
    }
}

/// Build the menu command once all items are in.
pub(crate) fn menu(
    header: &MenuHeader,
    items: Vec<MenuItem, MAX_MENU_ITEMS>,
    codec: &Codec,
) -> StkCommand {
    let menu = Menu {
        title: codec.decode_quoted(&header.title, header.unicode),
        items,
        has_help: header.has_help,
        icon: header.icon,
    };
    match header.family {
        MenuFamily::SetupMenu => StkCommand::SetupMenu(menu),
        MenuFamily::SelectItem => StkCommand::SelectItem(menu),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Charset, EscapeMode};

    const CODEC: Codec = Codec::new(EscapeMode::Octal, Charset::Gsm);

    fn header(line: &str) -> StkUrc {
        StkUrc::parse(line).unwrap()
    }

    fn done(step: Step) -> StkCommand {
        match step {
            Step::Done(cmd) => cmd,
            other => panic!("unexpected step {:?}", other),
        }
    }

    fn next(step: Step) -> Pending {
        match step {
            Step::Next(pending) => pending,
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn get_input_reads_prompt_then_default() {
        let StkUrc::GetInput(h) = header("*MTGIN: 2,0,1,1,4,0") else {
            panic!()
        };
        let pending = next(Pending::GetInputPrompt(h).advance("PIN?", &CODEC));
        let StkCommand::GetInput(cmd) = done(pending.advance("1234", &CODEC)) else {
            panic!()
        };
        assert_eq!(cmd.text, "PIN?");
        assert_eq!(cmd.default_text, "1234");
        assert_eq!(cmd.mode, InputMode::SmsAlphabet);
        assert!(cmd.echo);
        assert_eq!((cmd.min_length, cmd.max_length), (1, 4));
    }

    #[test]
    fn unicode_display_text() {
        let StkUrc::DisplayText(h) = header("*MTDISP: 1,0,1") else {
            panic!()
        };
        let StkCommand::DisplayText(cmd) = done(Pending::DisplayText(h).advance("00480069", &CODEC))
        else {
            panic!()
        };
        assert_eq!(cmd.text, "Hi");
        assert!(cmd.high_priority);
        assert!(!cmd.clear_after_delay);
    }

    #[test]
    fn browser_skips_proxy_line() {
        let StkUrc::LaunchBrowser(h) = header("*MTLBR: 2,\"http://x.org/\"") else {
            panic!()
        };
        let pending = next(Pending::BrowserProxy(h).advance("\"proxy\"", &CODEC));
        let StkCommand::LaunchBrowser(cmd) = done(pending.advance("0,\"Go\",1,0,7", &CODEC)) else {
            panic!()
        };
        assert_eq!(cmd.url, "http://x.org/");
        assert_eq!(cmd.mode, BrowserLaunchMode::UseExisting);
        assert_eq!(cmd.text, "Go");
        assert_eq!(cmd.icon.map(|i| i.id), Some(7));
    }

    #[test]
    fn family_matching() {
        let StkUrc::Menu(h) = header("*MTSMENU: \"Main\",0,2,0") else {
            panic!()
        };
        let pending = Pending::Menu {
            header: h,
            items: Vec::new(),
            remaining: 2,
        };
        assert!(pending.same_family(&header("*MTSMENU: \"Other\",0,1,0")));
        assert!(!pending.same_family(&header("*MTITEM: \"Pick\",0,1,0")));
        assert!(!pending.same_family(&header("*MTDISP: 0,0,0")));
        assert!(Pending::RefreshFiles.same_family(&header("*MTRSH: 1")));

        let skipping = Pending::SkipMenu {
            family: MenuFamily::SelectItem,
            remaining: 20,
        };
        assert!(skipping.same_family(&header("*MTITEM: \"Pick\",0,20,1")));
        assert!(!skipping.same_family(&header("*MTSMENU: \"Main\",0,2,0")));
    }

    #[test]
    fn skipped_menu_consumes_every_item_line() {
        let mut pending = Pending::SkipMenu {
            family: MenuFamily::SelectItem,
            remaining: 3,
        };
        for _ in 0..2 {
            pending = next(pending.advance("1,\"x\",0,0,0", &CODEC));
        }
        assert_eq!(pending.advance("3,\"x\",0,0,0", &CODEC), Step::Discard);
    }
}
