#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod band;
pub mod call;
pub mod cell_broadcast;
pub mod codec;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod hex;
pub mod io;
mod module_timing;
pub mod readiness;
pub mod service;
pub mod stk;

pub mod asynch;

#[cfg(test)]
mod test_helpers;
