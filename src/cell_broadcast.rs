//! Cell broadcast channel list.
//!
//! `AT+CSCB=0` adds to the active list instead of replacing it, and
//! `AT+CSCB=1` only removes one channel per command, so a change removes the
//! old channels one by one before adding the new list.

use heapless::Vec;

use crate::command::cell_broadcast::{types::CellBroadcastMode, SetCellBroadcast};
use crate::command::network_service::types::RegistrationState;
use crate::error::Error;
use crate::io::Io;

pub const MAX_CHANNELS: usize = 8;

/// Cell location broadcasts, switched off while suspended
pub const CELL_LOCATION_CHANNEL: u16 = 50;

#[derive(Debug)]
pub struct CellBroadcast {
    channels: Vec<u16, MAX_CHANNELS>,
    registration: RegistrationState,
}

impl Default for CellBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

impl CellBroadcast {
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
            registration: RegistrationState::NotRegistered,
        }
    }

    pub fn channels(&self) -> &[u16] {
        &self.channels
    }

    pub fn set_registration(&mut self, state: RegistrationState) {
        self.registration = state;
    }

    pub fn is_registered(&self) -> bool {
        self.registration.is_registered()
    }

    pub fn set_channels(&mut self, channels: &[u16], io: &mut impl Io) -> Result<(), Error> {
        for &channel in self.channels.iter() {
            io.send(SetCellBroadcast::new(CellBroadcastMode::Reject, &[channel]).into())?;
        }

        self.channels.clear();
        for &channel in channels {
            if self.channels.push(channel).is_err() {
                warn!("Too many cell broadcast channels, ignoring {}", channel);
            }
        }

        if !self.channels.is_empty() {
            io.send(SetCellBroadcast::new(CellBroadcastMode::Accept, &self.channels).into())?;
        }
        Ok(())
    }

    fn location_active(&self) -> bool {
        self.is_registered() && self.channels.contains(&CELL_LOCATION_CHANNEL)
    }

    /// Stop cell location broadcasts, the others stay on.
    pub fn suspend(&self, io: &mut impl Io) -> Result<(), Error> {
        if self.location_active() {
            io.send(
                SetCellBroadcast::new(CellBroadcastMode::Reject, &[CELL_LOCATION_CHANNEL]).into(),
            )?;
        }
        Ok(())
    }

    pub fn resume(&self, io: &mut impl Io) -> Result<(), Error> {
        if self.location_active() {
            io.send(SetCellBroadcast::new(CellBroadcastMode::Accept, &self.channels).into())?;
        }
        Ok(())
    }
}
