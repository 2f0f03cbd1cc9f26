use std::collections::BTreeMap;
use std::string::String;
use std::vec::Vec;

use atat::AtatCmd;

use crate::call::{CallKind, CallRecord, CallRegistry, CallState};
use crate::event::Event;
use crate::io::Outbox;
use crate::stk::{command::StkCommand, StkEvent};

/// The bytes a command puts on the wire.
pub fn wire<C: AtatCmd>(cmd: &C) -> String {
    let mut buf = std::vec![0u8; C::MAX_LEN];
    let len = cmd.write(&mut buf);
    String::from_utf8(buf[..len].to_vec()).unwrap()
}

/// Drain the queued commands, without line endings.
pub fn sent(io: &mut Outbox) -> Vec<String> {
    core::iter::from_fn(|| io.pop_command())
        .map(|outgoing| wire(&outgoing.command).trim_end().to_string())
        .collect()
}

/// Drain the queued events, keeping the toolkit commands.
pub fn stk_commands(io: &mut Outbox) -> Vec<StkCommand> {
    core::iter::from_fn(|| io.pop_event())
        .filter_map(|event| match event {
            Event::Stk(StkEvent::Command(cmd)) => Some(cmd),
            _ => None,
        })
        .collect()
}

/// Call registry recording what the tracker asked of it.
#[derive(Debug, Default)]
pub struct MockCalls {
    calls: BTreeMap<u32, CallRecord>,
    aborted: Vec<u32>,
    remote_hangups: Vec<u32>,
}

impl MockCalls {
    pub fn add(&mut self, id: u32, state: CallState, kind: CallKind) {
        self.calls.insert(id, CallRecord { state, kind });
    }

    pub fn state(&self, id: u32) -> Option<CallState> {
        self.calls.get(&id).map(|call| call.state)
    }

    pub fn aborted(&self) -> &[u32] {
        &self.aborted
    }

    pub fn remote_hangups(&self) -> &[u32] {
        &self.remote_hangups
    }
}

impl CallRegistry for MockCalls {
    fn call(&self, id: u32) -> Option<CallRecord> {
        self.calls.get(&id).copied()
    }

    fn set_state(&mut self, id: u32, state: CallState) {
        if let Some(call) = self.calls.get_mut(&id) {
            call.state = state;
        }
    }

    fn hangup_remote(&mut self, id: u32) {
        self.remote_hangups.push(id);
    }

    fn abort_dial(&mut self, id: u32) {
        self.aborted.push(id);
    }
}
