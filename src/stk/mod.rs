//! SIM toolkit session.
//!
//! The chipset runs the toolkit protocol itself. This module turns its
//! `*MT...` notifications into [`StkCommand`]s for the host and maps the
//! host's answers back onto `*MTRES` and `*MTMENU`.
//!
//! The SIM's main menu is cached once fetched, so a new session can show it
//! without another round trip. A session that is still waiting for an answer
//! is aborted before a new one begins.

mod assembly;
pub mod command;
pub mod response;

use heapless::{String, Vec};

use crate::codec::{truncated, Codec};
use crate::command::stk::{
    types::{ChannelService, MenuFamily, ResponseKind},
    urc::{CallControl, MenuHeader, SendStringKind, StkUrc},
    GetMainMenu, SendTerminalResponse, Trailing,
};
use crate::error::Error;
use crate::io::{Completion, Io, TimerId};
use crate::module_timing;
use assembly::{Pending, Step};
use command::{
    Channel, ControlEvent, ControlKind, ControlResult, PlayTone, SendMessage, SetupCall,
    StkCommand, Tone, CHANNEL_DEVICE_BASE, MAX_MENU_ITEMS,
};
use response::{Envelope, TerminalResponse, TerminalResult};

/// Request type of `*MTSTKCC` that refers to a short message
const CONTROL_TYPE_SMS: u32 = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum StkEvent {
    /// A proactive command for the host
    Command(StkCommand),
    /// The main menu could not be fetched. The SIM has no toolkit or is not
    /// ready yet.
    BeginFailed,
    Control(ControlEvent),
    /// A terminal response this modem has no encoding for
    ResponseNotHandled(TerminalResponse),
    /// An envelope this modem has no encoding for
    EnvelopeNotHandled(Envelope),
    /// A menu with more items than fit in [`command::Menu`] was refused
    MenuRefused { items: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionPhase {
    Idle,
    /// A session abort was sent, waiting for `*MSTKEV` or the fallback timer
    AwaitingAbortAck,
    AwaitingMenuFetch,
    HaveMainMenu,
    /// A command was emitted and the host owes a terminal response
    AwaitingSubCommand,
}

#[derive(Debug)]
pub struct StkSession {
    codec: Codec,
    language: String<2>,
    last_command: Option<StkCommand>,
    main_menu: Option<StkCommand>,
    pending_response: Option<ResponseKind>,
    fetching_main_menu: bool,
    phase: SessionPhase,
    assembly: Option<Pending>,
}

impl StkSession {
    /// `language` is the ISO 639 code reported to the SIM, only its first two
    /// characters are used.
    pub fn new(codec: Codec, language: &str) -> Self {
        let language = if language.len() >= 2 {
            truncated(language)
        } else {
            truncated("en")
        };
        Self {
            codec,
            language,
            last_command: None,
            main_menu: None,
            pending_response: None,
            fetching_main_menu: false,
            phase: SessionPhase::Idle,
            assembly: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn pending_response(&self) -> Option<ResponseKind> {
        self.pending_response
    }

    pub fn last_command(&self) -> Option<&StkCommand> {
        self.last_command.as_ref()
    }

    pub fn main_menu(&self) -> Option<&StkCommand> {
        self.main_menu.as_ref()
    }

    pub fn begin(&mut self, io: &mut impl Io) -> Result<(), Error> {
        if let Some(menu) = self.last_command.as_ref().filter(|c| c.is_setup_menu()) {
            // Just fetched, hand it out again
            io.emit(StkEvent::Command(menu.clone()).into())?;
            self.phase = SessionPhase::HaveMainMenu;
            return Ok(());
        }

        self.last_command = None;
        let kind = match (self.pending_response.take(), self.main_menu.clone()) {
            (Some(kind), _) => kind,
            // Possibly stuck in a sub menu left over from an earlier host
            (None, None) => ResponseKind::SelectItem,
            (None, Some(menu)) => return self.emit_command(menu, io),
        };

        debug!("Aborting toolkit session, kind {}", kind.code());
        self.phase = SessionPhase::AwaitingAbortAck;
        io.start_timer(TimerId::StkAbortFallback, module_timing::stk_abort_fallback());
        io.send(SendTerminalResponse::abort(kind).into())
    }

    /// The next [`StkSession::begin`] fetches the menu again.
    pub fn end(&mut self) {
        self.last_command = None;
    }

    /// Fallback timer of an unconfirmed session abort.
    pub fn on_abort_fallback(&mut self, io: &mut impl Io) -> Result<(), Error> {
        if !self.last_command.as_ref().is_some_and(StkCommand::is_setup_menu) {
            self.fetch_menu(io)?;
        }
        Ok(())
    }

    fn fetch_menu(&mut self, io: &mut impl Io) -> Result<(), Error> {
        // A fetch may already be underway after a session abort
        if self.fetching_main_menu {
            return Ok(());
        }
        self.last_command = None;
        self.pending_response = None;
        self.phase = SessionPhase::AwaitingMenuFetch;
        io.chat(GetMainMenu.into(), Completion::StkMenuFetch)?;
        self.fetching_main_menu = true;
        Ok(())
    }

    /// Outcome of `AT*MTMENU?`. The menu itself arrives as a notification
    /// before the final result code.
    pub fn on_menu_fetched(&mut self, result: Result<(), Error>, io: &mut impl Io) -> Result<(), Error> {
        self.fetching_main_menu = false;
        let fetched = self
            .last_command
            .as_ref()
            .is_some_and(StkCommand::is_setup_menu);
        if result.is_err() || !fetched {
            warn!("Main menu fetch failed");
            self.phase = SessionPhase::Idle;
            io.emit(StkEvent::BeginFailed.into())?;
        }
        Ok(())
    }

    pub fn sim_inserted(&mut self, io: &mut impl Io) {
        self.last_command = None;
        self.main_menu = None;
        self.phase = SessionPhase::Idle;
        io.start_timer(TimerId::StkSimSettle, module_timing::stk_sim_settle());
    }

    pub fn sim_removed(&mut self) {
        self.last_command = None;
        self.main_menu = None;
        self.pending_response = None;
        self.phase = SessionPhase::Idle;
    }

    fn session_ended(&mut self, io: &mut impl Io) -> Result<(), Error> {
        match self.main_menu.clone() {
            Some(menu) => self.emit_command(menu, io),
            None => self.fetch_menu(io),
        }
    }

    /// Whether the next raw line continues a multi-line notification.
    pub fn awaiting_line(&self) -> bool {
        self.assembly.is_some()
    }

    /// Whether `urc`, arriving while a line is awaited, belongs to the
    /// notification being assembled.
    pub fn continues_with(&self, urc: &StkUrc) -> bool {
        self.assembly
            .as_ref()
            .is_some_and(|pending| pending.same_family(urc))
    }

    pub fn abandon_assembly(&mut self) {
        if self.assembly.take().is_some() {
            warn!("Incomplete toolkit notification abandoned");
        }
    }

    fn expect_line(&mut self, pending: Pending, io: &mut impl Io) {
        self.assembly = Some(pending);
        io.request_next_line();
    }

    /// Continuation line of a multi-line notification.
    pub fn feed_line(&mut self, line: &str, io: &mut impl Io) -> Result<(), Error> {
        let Some(pending) = self.assembly.take() else {
            return Ok(());
        };
        match pending.advance(line, &self.codec) {
            Step::Next(pending) => {
                self.expect_line(pending, io);
                Ok(())
            }
            Step::Done(cmd) => self.finish(cmd, io),
            Step::Discard => Ok(()),
        }
    }

    fn finish(&mut self, cmd: StkCommand, io: &mut impl Io) -> Result<(), Error> {
        match cmd {
            StkCommand::SetupMenu(_) => {
                self.main_menu = Some(cmd.clone());
                self.emit_command(cmd, io)?;
                io.send(SendTerminalResponse::ack(ResponseKind::SetupMenu).into())
            }
            StkCommand::SetupIdleModeText(_) => {
                self.emit_command_no_response(cmd, io)?;
                io.send(SendTerminalResponse::ack(ResponseKind::SetupIdleModeText).into())
            }
            cmd => self.emit_command(cmd, io),
        }
    }

    /// Menus with more than [`MAX_MENU_ITEMS`] items are answered with
    /// "beyond capabilities". Their item lines are still consumed.
    fn refuse_menu(&mut self, header: MenuHeader, io: &mut impl Io) -> Result<(), Error> {
        warn!("Refusing menu with {} items", header.items);
        let kind = match header.family {
            MenuFamily::SetupMenu => ResponseKind::SetupMenu,
            MenuFamily::SelectItem => ResponseKind::SelectItem,
        };
        self.expect_line(
            Pending::SkipMenu {
                family: header.family,
                remaining: header.items,
            },
            io,
        );
        io.send(
            SendTerminalResponse {
                kind,
                result: TerminalResult::BeyondMeCapabilities.code(),
                cause: None,
                trailing: Trailing::None,
            }
            .into(),
        )?;
        io.emit(StkEvent::MenuRefused { items: header.items }.into())
    }

    /// Hand a command to the host, which owes a terminal response for it.
    fn emit_command(&mut self, cmd: StkCommand, io: &mut impl Io) -> Result<(), Error> {
        self.pending_response = cmd.response_kind();
        self.phase = if cmd.is_setup_menu() {
            SessionPhase::HaveMainMenu
        } else {
            SessionPhase::AwaitingSubCommand
        };
        self.last_command = Some(cmd.clone());
        io.emit(StkEvent::Command(cmd).into())
    }

    fn emit_command_no_response(&mut self, cmd: StkCommand, io: &mut impl Io) -> Result<(), Error> {
        self.pending_response = None;
        self.last_command = Some(cmd.clone());
        io.emit(StkEvent::Command(cmd).into())
    }

    pub fn handle_urc(&mut self, urc: StkUrc, io: &mut impl Io) -> Result<(), Error> {
        let codec = self.codec;
        match urc {
            StkUrc::Menu(header) if header.items as usize > MAX_MENU_ITEMS => {
                self.refuse_menu(header, io)
            }
            StkUrc::Menu(header) => {
                if header.items == 0 {
                    let cmd = assembly::menu(&header, Vec::new(), &codec);
                    self.finish(cmd, io)
                } else {
                    let remaining = header.items;
                    self.expect_line(
                        Pending::Menu {
                            header,
                            items: Vec::new(),
                            remaining,
                        },
                        io,
                    );
                    Ok(())
                }
            }
            StkUrc::SessionEnded => self.session_ended(io),
            StkUrc::DisplayText(header) => {
                self.expect_line(Pending::DisplayText(header), io);
                Ok(())
            }
            StkUrc::GetInkey(header) => {
                self.expect_line(Pending::GetInkey(header), io);
                Ok(())
            }
            StkUrc::GetInput(header) => {
                self.expect_line(Pending::GetInputPrompt(header), io);
                Ok(())
            }
            StkUrc::PlayTone(tone) => {
                let cmd = StkCommand::PlayTone(PlayTone {
                    text: codec.decode_quoted(&tone.text, tone.unicode),
                    tone: Tone::from_code(tone.tone),
                    duration: tone.duration,
                    icon: tone.icon,
                });
                self.emit_command(cmd, io)
            }
            StkUrc::Refresh(refresh) => {
                if refresh.has_file_list() {
                    self.expect_line(Pending::RefreshFiles, io);
                }
                self.emit_command_no_response(StkCommand::Refresh(refresh.refresh_type.into()), io)?;
                io.send(SendTerminalResponse::ack(ResponseKind::Refresh).into())
            }
            StkUrc::SendSms(sms) => {
                let cmd = StkCommand::SendSms(SendMessage {
                    text: codec.decode_quoted(&sms.text, sms.unicode),
                    payload: String::new(),
                    icon: sms.icon,
                });
                self.emit_command_no_response(cmd, io)
            }
            StkUrc::SendString(send) => {
                let message = SendMessage {
                    text: codec.decode_quoted(&send.text, send.unicode),
                    payload: truncated(&codec.plain(&send.payload)),
                    icon: send.icon,
                };
                let cmd = match send.kind {
                    SendStringKind::SupplementaryService => StkCommand::SendSs(message),
                    SendStringKind::Ussd => StkCommand::SendUssd(message),
                    SendStringKind::Dtmf => StkCommand::SendDtmf(message),
                };
                self.emit_command_no_response(cmd, io)
            }
            StkUrc::SetupCall(call) => {
                let cmd = StkCommand::SetupCall(SetupCall {
                    qualifier: call.qualifier,
                    text: codec.decode_quoted(&call.text, call.unicode),
                    number: truncated(&codec.plain(&call.number)),
                    icon: call.icon,
                });
                self.emit_command(cmd, io)
            }
            StkUrc::IdleModeText(header) => {
                self.expect_line(Pending::IdleModeText(header), io);
                Ok(())
            }
            StkUrc::LanguageQuery => {
                let reply = SendTerminalResponse {
                    kind: ResponseKind::ProvideLocalInformation,
                    result: 0,
                    cause: None,
                    trailing: Trailing::Quoted(codec.quote(&self.language)),
                };
                io.send(reply.into())
            }
            StkUrc::LanguageNotification(notification) => {
                let language = codec.plain(&notification.language);
                let language = (!language.is_empty()).then(|| truncated(&language));
                self.emit_command_no_response(StkCommand::LanguageNotification(language), io)
            }
            StkUrc::LaunchBrowser(header) => {
                self.expect_line(Pending::BrowserProxy(header), io);
                Ok(())
            }
            StkUrc::RunAtCommand(run) => {
                let command = codec.plain(&run.command);
                let cmd = StkCommand::RunAtCommand(command::RunAtCommand {
                    text: codec.decode_quoted(&run.alpha, run.unicode),
                    command: (!command.is_empty()).then(|| truncated(&command)),
                    icon: run.icon,
                });
                self.emit_command_no_response(cmd, io)
            }
            StkUrc::ChannelEvent(event) => {
                let channel = Channel {
                    destination_device: (event.channel as u8).wrapping_add(CHANNEL_DEVICE_BASE),
                    text: codec.decode_quoted(&event.text, event.unicode),
                    icon: event.icon,
                };
                let cmd = match event.service {
                    ChannelService::Open => {
                        return self.emit_command(StkCommand::OpenChannel(channel), io);
                    }
                    ChannelService::SendData => StkCommand::SendData(channel),
                    ChannelService::ReceiveData => StkCommand::ReceiveData(channel),
                    ChannelService::Close => StkCommand::CloseChannel(channel),
                    ChannelService::Unknown(service) => {
                        debug!("Ignoring channel event with service {}", service);
                        return Ok(());
                    }
                };
                self.emit_command_no_response(cmd, io)?;
                let ack = SendTerminalResponse {
                    kind: ResponseKind::Channel,
                    result: 0,
                    cause: None,
                    trailing: Trailing::Channel(event.channel as u8),
                };
                io.send(ack.into())
            }
            StkUrc::CallControl(control) => {
                io.emit(StkEvent::Control(self.control_event(&control)).into())
            }
        }
    }

    fn control_event(&self, control: &CallControl) -> ControlEvent {
        let result = match (control.error_code, control.result_mode) {
            (Some(5), _) => ControlResult::AllowedWithModifications,
            (Some(_), _) => ControlResult::NotAllowed,
            (None, 1) => ControlResult::NotAllowed,
            (None, 2) => ControlResult::AllowedWithModifications,
            (None, _) => ControlResult::Allowed,
        };
        ControlEvent {
            result,
            kind: if control.old_type == CONTROL_TYPE_SMS {
                ControlKind::Sms
            } else {
                ControlKind::Call
            },
            text: self.codec.decode_quoted(&control.alpha, false),
        }
    }

    /// Answer the outstanding command. Responses this modem cannot encode are
    /// handed back as [`StkEvent::ResponseNotHandled`].
    pub fn send_terminal_response(
        &mut self,
        response: TerminalResponse,
        io: &mut impl Io,
    ) -> Result<(), Error> {
        match response.to_command(&self.codec) {
            Ok(cmd) => {
                if self.pending_response == Some(cmd.kind) {
                    self.pending_response = None;
                    if self.phase == SessionPhase::AwaitingSubCommand {
                        self.phase = SessionPhase::Idle;
                    }
                }
                io.send(cmd.into())
            }
            Err(_) => io.emit(StkEvent::ResponseNotHandled(response).into()),
        }
    }

    pub fn send_envelope(&mut self, envelope: Envelope, io: &mut impl Io) -> Result<(), Error> {
        match envelope.to_command() {
            Ok(cmd) => io.send(cmd.into()),
            Err(_) => io.emit(StkEvent::EnvelopeNotHandled(envelope).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Charset, EscapeMode};
    use crate::event::Event;
    use crate::io::Outbox;
    use crate::stk::command::InputMode;
    use crate::test_helpers::{sent, stk_commands};

    fn session() -> StkSession {
        StkSession::new(Codec::new(EscapeMode::Octal, Charset::Gsm), "en_US")
    }

    fn feed(stk: &mut StkSession, io: &mut Outbox, line: &str) {
        if stk.awaiting_line() {
            stk.feed_line(line, io).unwrap();
        } else {
            stk.handle_urc(StkUrc::parse(line).unwrap(), io).unwrap();
        }
    }

    fn main_menu(stk: &mut StkSession, io: &mut Outbox) {
        feed(stk, io, "*MTSMENU: \"Main\",0,2,0");
        feed(stk, io, "1:\"News\"");
        feed(stk, io, "2:\"Games\",1,0,5,1,3");
    }

    #[test]
    fn menu_assembly_requests_one_line_per_item() {
        let max = MAX_MENU_ITEMS as u32;
        for n in [0, 1, 2, 4, max] {
            let mut stk = session();
            let mut io = Outbox::new();
            feed(&mut stk, &mut io, &format!("*MTITEM: \"Pick\",0,{},1", n));
            for i in 1..=n {
                assert!(stk.awaiting_line());
                feed(&mut stk, &mut io, &format!("{}:\"Item {}\"", i, i));
            }
            assert!(!stk.awaiting_line());
            assert_eq!(io.line_requests(), n);

            let commands = stk_commands(&mut io);
            let [StkCommand::SelectItem(menu)] = commands.as_slice() else {
                panic!("expected one menu, got {:?}", commands);
            };
            let ids: std::vec::Vec<u32> = menu.items.iter().map(|item| item.id).collect();
            assert_eq!(ids, (1..=n).collect::<std::vec::Vec<_>>());
            assert!(menu.items.iter().all(|item| item.has_help));
            assert_eq!(stk.pending_response(), Some(ResponseKind::SelectItem));
            assert!(sent(&mut io).is_empty());
        }

        // Larger menus are refused once, after all of their lines are consumed
        for n in [max + 1, 20] {
            let mut stk = session();
            let mut io = Outbox::new();
            feed(&mut stk, &mut io, &format!("*MTITEM: \"Pick\",0,{},1", n));
            assert_eq!(sent(&mut io), ["AT*MTRES=4,30"]);
            assert_eq!(
                io.pop_event(),
                Some(Event::Stk(StkEvent::MenuRefused { items: n }))
            );
            for i in 1..=n {
                assert!(stk.awaiting_line());
                feed(&mut stk, &mut io, &format!("{}:\"Item {}\"", i, i));
            }
            assert!(!stk.awaiting_line());
            assert_eq!(io.line_requests(), n);
            assert!(stk_commands(&mut io).is_empty());
            assert!(sent(&mut io).is_empty());
            assert_eq!(stk.pending_response(), None);
        }
    }

    #[test]
    fn refused_main_menu_is_not_cached() {
        let mut stk = session();
        let mut io = Outbox::new();
        feed(&mut stk, &mut io, "*MTSMENU: \"Main\",0,17,0");
        for i in 1..=17 {
            feed(&mut stk, &mut io, &format!("{}:\"Item {}\"", i, i));
        }
        assert_eq!(sent(&mut io), ["AT*MTRES=8,30"]);
        assert!(stk.main_menu().is_none());
        assert_eq!(stk.phase(), SessionPhase::Idle);
    }

    #[test]
    fn setup_menu_is_cached_and_acknowledged() {
        let mut stk = session();
        let mut io = Outbox::new();
        main_menu(&mut stk, &mut io);

        assert_eq!(sent(&mut io), ["AT*MTRES=8,0"]);
        let commands = stk_commands(&mut io);
        let [StkCommand::SetupMenu(menu)] = commands.as_slice() else {
            panic!("expected the main menu, got {:?}", commands);
        };
        assert_eq!(menu.title, "Main");
        assert_eq!(menu.items[0].label, "News");
        assert_eq!(menu.items[1].icon.map(|i| i.id), Some(5));
        assert_eq!(menu.items[1].next_action, Some(3));
        assert!(stk.main_menu().is_some());
        assert_eq!(stk.phase(), SessionPhase::HaveMainMenu);
    }

    #[test]
    fn begin_replays_just_fetched_menu() {
        let mut stk = session();
        let mut io = Outbox::new();
        main_menu(&mut stk, &mut io);
        let fetched = stk_commands(&mut io);
        sent(&mut io);

        stk.begin(&mut io).unwrap();
        assert!(sent(&mut io).is_empty());
        assert!(io.timers().is_empty());
        assert_eq!(stk_commands(&mut io), fetched);
    }

    #[test]
    fn begin_aborts_owed_response_then_fetches_menu() {
        let mut stk = session();
        let mut io = Outbox::new();
        feed(&mut stk, &mut io, "*MTGIN: 1,0,0,1,4,0");
        feed(&mut stk, &mut io, "Code");
        feed(&mut stk, &mut io, "");
        assert_eq!(stk.pending_response(), Some(ResponseKind::GetInput));
        stk_commands(&mut io);

        stk.begin(&mut io).unwrap();
        assert_eq!(sent(&mut io), ["AT*MTRES=2,10"]);
        assert_eq!(stk.pending_response(), None);
        assert_eq!(stk.phase(), SessionPhase::AwaitingAbortAck);
        assert_eq!(
            io.take_timers().as_slice(),
            &[(TimerId::StkAbortFallback, module_timing::stk_abort_fallback())]
        );

        stk.on_abort_fallback(&mut io).unwrap();
        assert_eq!(sent(&mut io), ["AT*MTMENU?"]);
        assert_eq!(stk.phase(), SessionPhase::AwaitingMenuFetch);

        // A second trigger while the fetch is underway is absorbed
        feed(&mut stk, &mut io, "*MSTKEV: 1");
        assert!(sent(&mut io).is_empty());
    }

    #[test]
    fn begin_without_cached_menu_aborts_sub_menu() {
        let mut stk = session();
        let mut io = Outbox::new();
        stk.begin(&mut io).unwrap();
        assert_eq!(sent(&mut io), ["AT*MTRES=4,10"]);
    }

    #[test]
    fn begin_with_cached_menu_replays_it() {
        let mut stk = session();
        let mut io = Outbox::new();
        main_menu(&mut stk, &mut io);
        let menu = stk_commands(&mut io);
        sent(&mut io);

        stk.end();
        stk.send_envelope(Envelope::menu_selection(1, false), &mut io).unwrap();
        assert_eq!(sent(&mut io), ["AT*MTMENU=1"]);
        feed(&mut stk, &mut io, "*MTDISP: 0,1,0");
        feed(&mut stk, &mut io, "Hello");
        let display = stk_commands(&mut io);
        let response = TerminalResponse::new(display[0].clone(), TerminalResult::Success);
        stk.send_terminal_response(response, &mut io).unwrap();
        assert_eq!(sent(&mut io), ["AT*MTRES=0,0"]);
        assert_eq!(stk.pending_response(), None);

        stk.begin(&mut io).unwrap();
        assert!(sent(&mut io).is_empty());
        assert_eq!(stk_commands(&mut io), menu);
        assert_eq!(stk.pending_response(), Some(ResponseKind::SetupMenu));
    }

    #[test]
    fn menu_fetch_failure_reports_begin_failed() {
        let mut stk = session();
        let mut io = Outbox::new();
        feed(&mut stk, &mut io, "*MSTKEV: 1");
        assert_eq!(sent(&mut io), ["AT*MTMENU?"]);

        stk.on_menu_fetched(Ok(()), &mut io).unwrap();
        assert_eq!(
            io.pop_event(),
            Some(Event::Stk(StkEvent::BeginFailed))
        );

        feed(&mut stk, &mut io, "*MSTKEV: 1");
        main_menu(&mut stk, &mut io);
        stk.on_menu_fetched(Ok(()), &mut io).unwrap();
        assert!(!io.events().any(|e| *e == Event::Stk(StkEvent::BeginFailed)));
    }

    #[test]
    fn sim_insertion_restarts_session_after_settling() {
        let mut stk = session();
        let mut io = Outbox::new();
        main_menu(&mut stk, &mut io);

        assert_eq!(stk.phase(), SessionPhase::HaveMainMenu);

        stk.sim_inserted(&mut io);
        assert!(stk.main_menu().is_none());
        assert!(stk.last_command().is_none());
        assert_eq!(stk.phase(), SessionPhase::Idle);
        assert_eq!(
            io.timers(),
            &[(TimerId::StkSimSettle, module_timing::stk_sim_settle())]
        );
    }

    #[test]
    fn sim_removal_forgets_owed_response() {
        let mut stk = session();
        let mut io = Outbox::new();
        feed(&mut stk, &mut io, "*MTCALL: 0,\"Call?\",0,\"+123\",0");
        assert_eq!(stk.pending_response(), Some(ResponseKind::SetupCall));
        stk.sim_removed();
        assert_eq!(stk.pending_response(), None);
        assert!(io.timers().is_empty());
    }

    #[test]
    fn refresh_acknowledges_and_discards_file_list() {
        let mut stk = session();
        let mut io = Outbox::new();
        feed(&mut stk, &mut io, "*MTRSH: 1");
        assert_eq!(sent(&mut io), ["AT*MTRES=10,0"]);
        assert!(stk.awaiting_line());
        feed(&mut stk, &mut io, "3F00,7F20");
        assert!(!stk.awaiting_line());
        assert_eq!(
            stk_commands(&mut io),
            [StkCommand::Refresh(command::RefreshType::FileChange)]
        );

        feed(&mut stk, &mut io, "*MTRSH: 4");
        assert!(!stk.awaiting_line());
        assert_eq!(stk.pending_response(), None);
    }

    #[test]
    fn idle_mode_text_is_acknowledged() {
        let mut stk = session();
        let mut io = Outbox::new();
        feed(&mut stk, &mut io, "*MTITXT: 0");
        feed(&mut stk, &mut io, "Operator");
        assert_eq!(sent(&mut io), ["AT*MTRES=14,0"]);
        assert_eq!(stk.pending_response(), None);
    }

    #[test]
    fn language_query_answers_two_letter_code() {
        let mut stk = session();
        let mut io = Outbox::new();
        feed(&mut stk, &mut io, "*MTLANG:");
        assert_eq!(sent(&mut io), ["AT*MTRES=15,0,,\"en\""]);
    }

    #[test]
    fn channel_events() {
        let mut stk = session();
        let mut io = Outbox::new();
        feed(&mut stk, &mut io, "*MTCHEVT: 2,1,\"Open\",0");
        assert!(sent(&mut io).is_empty());
        assert_eq!(stk.pending_response(), Some(ResponseKind::Channel));
        let open = stk_commands(&mut io);
        let response = TerminalResponse::new(open[0].clone(), TerminalResult::Success);
        stk.send_terminal_response(response, &mut io).unwrap();
        assert_eq!(sent(&mut io), ["AT*MTRES=16,0,2"]);

        feed(&mut stk, &mut io, "*MTCHEVT: 2,4,\"\",0");
        assert_eq!(sent(&mut io), ["AT*MTRES=16,0,2"]);
        let commands = stk_commands(&mut io);
        let [StkCommand::CloseChannel(channel)] = commands.as_slice() else {
            panic!()
        };
        assert_eq!(channel.destination_device, 0x22);

        feed(&mut stk, &mut io, "*MTCHEVT: 2,9,\"\",0");
        assert!(sent(&mut io).is_empty());
        assert!(stk_commands(&mut io).is_empty());
    }

    #[test]
    fn send_strings_are_fire_and_forget() {
        let mut stk = session();
        let mut io = Outbox::new();
        feed(&mut stk, &mut io, "*MTUSSD: \"Balance\",0,\"*100#\"");
        let commands = stk_commands(&mut io);
        let [StkCommand::SendUssd(message)] = commands.as_slice() else {
            panic!()
        };
        assert_eq!(message.payload, "*100#");
        assert_eq!(stk.pending_response(), None);
    }

    #[test]
    fn get_inkey_yes_no_round_trip() {
        let mut stk = session();
        let mut io = Outbox::new();
        feed(&mut stk, &mut io, "*MTKEY: 0,0,0");
        feed(&mut stk, &mut io, "Continue?");
        let commands = stk_commands(&mut io);
        let StkCommand::GetInkey(inkey) = &commands[0] else {
            panic!()
        };
        assert_eq!(inkey.mode, InputMode::YesNo);

        let mut response = TerminalResponse::new(commands[0].clone(), TerminalResult::Success);
        response.text = "Yes".try_into().unwrap();
        stk.send_terminal_response(response, &mut io).unwrap();
        assert_eq!(sent(&mut io), ["AT*MTRES=1,0,,\"YES\""]);
    }

    #[test]
    fn unsupported_answers_go_back_to_the_host() {
        let mut stk = session();
        let mut io = Outbox::new();
        let response =
            TerminalResponse::new(StkCommand::LanguageNotification(None), TerminalResult::Success);
        stk.send_terminal_response(response.clone(), &mut io).unwrap();
        assert_eq!(
            io.pop_event(),
            Some(Event::Stk(StkEvent::ResponseNotHandled(response)))
        );
        assert!(sent(&mut io).is_empty());
    }

    #[test]
    fn call_control_results() {
        let cases = [
            ("*MTSTKCC: 0,0,0,\"\"", ControlResult::Allowed, ControlKind::Call),
            ("*MTSTKCC: 1,4,4,\"\"", ControlResult::NotAllowed, ControlKind::Sms),
            ("*MTSTKCC: 2,0,1,\"\"", ControlResult::AllowedWithModifications, ControlKind::Call),
            ("*MTSTKCC: 4,5,4,\"\"", ControlResult::AllowedWithModifications, ControlKind::Sms),
            ("*MTSTKCC: 4,1,0,\"Barred\"", ControlResult::NotAllowed, ControlKind::Call),
        ];
        for (line, result, kind) in cases {
            let mut stk = session();
            let mut io = Outbox::new();
            feed(&mut stk, &mut io, line);
            let Some(Event::Stk(StkEvent::Control(event))) = io.pop_event() else {
                panic!("no control event for {}", line);
            };
            assert_eq!((event.result, event.kind), (result, kind), "{}", line);
        }
    }
}
