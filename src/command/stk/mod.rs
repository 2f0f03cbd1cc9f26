//! ### SIM Toolkit
//!
//! The chipset runs the toolkit protocol itself and exposes proactive
//! commands as `*MT...:` notifications. Terminal responses and menu
//! selections are answered with `*MTRES` and `*MTMENU`.
pub mod types;
pub mod urc;

use core::fmt;

use atat::{atat_derive::AtatCmd, AtatCmd};
use heapless::String;

use super::{write_display, NoResponse};
use crate::codec::MAX_RAW_LEN;
use types::ResponseKind;

/// Fetch main menu *MTMENU?
///
/// The SIM answers with a `*MTSMENU:` notification sequence.
#[derive(Debug, Clone, PartialEq, AtatCmd)]
#[at_cmd("*MTMENU?", NoResponse)]
pub struct GetMainMenu;

/// Result code of a terminal response that ends the session
pub const SESSION_TERMINATED: u8 = 0x10;

/// Parameters following the result and cause of a terminal response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trailing {
    None,
    /// Selected menu item
    MenuItem(u8),
    /// Quoted string, already escaped
    Quoted(String<MAX_RAW_LEN>),
    /// Channel id, written in place of the cause
    Channel(u8),
}

/// Terminal response *MTRES
///
/// `AT*MTRES=<kind>,<result>[,<cause>][,<trailing>]` with result and cause in
/// lowercase hex. Without a cause the cause slot is left empty before any
/// trailing parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTerminalResponse {
    pub kind: ResponseKind,
    pub result: u8,
    pub cause: Option<u8>,
    pub trailing: Trailing,
}

impl SendTerminalResponse {
    /// Fixed-code acknowledgement of a notification that needs no host answer
    pub fn ack(kind: ResponseKind) -> Self {
        Self {
            kind,
            result: 0,
            cause: None,
            trailing: Trailing::None,
        }
    }

    /// Abort whatever command of `kind` is outstanding
    pub fn abort(kind: ResponseKind) -> Self {
        Self {
            kind,
            result: SESSION_TERMINATED,
            cause: None,
            trailing: Trailing::None,
        }
    }
}

impl fmt::Display for SendTerminalResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT*MTRES={},{:x}", self.kind.code(), self.result)?;
        let empty_cause = match self.cause {
            Some(cause) => {
                write!(f, ",{:x}", cause)?;
                false
            }
            None => true,
        };
        let reserve = if empty_cause { "," } else { "" };
        match &self.trailing {
            Trailing::None => Ok(()),
            Trailing::MenuItem(item) => write!(f, "{},,{}", reserve, item),
            Trailing::Quoted(text) => write!(f, "{},\"{}\"", reserve, text),
            Trailing::Channel(id) => write!(f, ",{}", id),
        }
    }
}

impl AtatCmd for SendTerminalResponse {
    type Response = NoResponse;

    const MAX_LEN: usize = MAX_RAW_LEN + 32;

    fn write(&self, buf: &mut [u8]) -> usize {
        write_display(buf, self)
    }

    fn parse(
        &self,
        resp: Result<&[u8], atat::InternalError>,
    ) -> Result<Self::Response, atat::Error> {
        match resp {
            Ok(_) => Ok(NoResponse),
            Err(e) => Err(e.into()),
        }
    }
}

/// Menu selection envelope *MTMENU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectMenuItem {
    pub item: u8,
    pub help: bool,
}

impl fmt::Display for SelectMenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT*MTMENU={}", self.item)?;
        if self.help {
            f.write_str(",1")?;
        }
        Ok(())
    }
}

impl AtatCmd for SelectMenuItem {
    type Response = NoResponse;

    const MAX_LEN: usize = 24;

    fn write(&self, buf: &mut [u8]) -> usize {
        write_display(buf, self)
    }

    fn parse(
        &self,
        resp: Result<&[u8], atat::InternalError>,
    ) -> Result<Self::Response, atat::Error> {
        match resp {
            Ok(_) => Ok(NoResponse),
            Err(e) => Err(e.into()),
        }
    }
}
