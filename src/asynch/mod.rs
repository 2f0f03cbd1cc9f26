pub mod control;
pub mod runner;
pub mod state;

use atat::asynch::AtatClient;

use crate::call::CallRegistry;
use crate::config::ModemConfig;
use control::Control;
use runner::Runner;
use state::State;

/// Split the integration into the host's [`Control`] handle and the
/// [`Runner`] that drives the AT channel. Lines read from the channel go to
/// [`State::lines`].
pub fn new<'a, AT: AtatClient, C: ModemConfig, R: CallRegistry>(
    state: &'a State,
    at: AT,
    _config: C,
    registry: R,
) -> (Control<'a>, Runner<'a, AT, C, R>) {
    (Control::new(state), Runner::new(at, state, registry))
}
