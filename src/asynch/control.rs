use heapless::Vec;

use super::state::State;
use crate::band::BandMode;
use crate::cell_broadcast::MAX_CHANNELS;
use crate::codec::truncated;
use crate::command::{general::types::AudioOutput, network_service::types::RegistrationState};
use crate::event::Event;
use crate::service::Request;
use crate::stk::response::{Envelope, TerminalResponse};

/// Host side handle. Requests are queued to the [`Runner`](super::runner::Runner),
/// their outcomes come back as [`Event`]s.
#[derive(Clone, Copy)]
pub struct Control<'a> {
    state: &'a State,
}

impl<'a> Control<'a> {
    pub(crate) fn new(state: &'a State) -> Self {
        Self { state }
    }

    async fn request(&self, request: Request) {
        self.state.requests.send(request).await
    }

    pub async fn next_event(&self) -> Event {
        self.state.events.receive().await
    }

    pub fn try_next_event(&self) -> Option<Event> {
        self.state.events.try_receive().ok()
    }

    pub async fn abort_dial(&self, id: u32) {
        self.request(Request::AbortDial(id)).await
    }

    /// Tones that do not fit are dropped.
    pub async fn send_tones(&self, id: u32, tones: &str) {
        self.request(Request::SendTones {
            id,
            tones: truncated(tones),
        })
        .await
    }

    pub async fn reset_modem(&self) {
        self.request(Request::ResetModem).await
    }

    pub async fn begin_session(&self) {
        self.request(Request::BeginSession).await
    }

    pub async fn end_session(&self) {
        self.request(Request::EndSession).await
    }

    pub async fn send_terminal_response(&self, response: TerminalResponse) {
        self.request(Request::TerminalResponse(response)).await
    }

    pub async fn send_envelope(&self, envelope: Envelope) {
        self.request(Request::Envelope(envelope)).await
    }

    /// Answered with [`Event::SmsReady`] once the SMS subsystem is up.
    pub async fn request_sms_ready(&self) {
        self.request(Request::RequestSmsReady).await
    }

    pub async fn suspend(&self) {
        self.request(Request::Suspend).await
    }

    pub async fn wake(&self) {
        self.request(Request::Wake).await
    }

    pub async fn request_band(&self) {
        self.request(Request::RequestBand).await
    }

    pub async fn request_bands(&self) {
        self.request(Request::RequestBands).await
    }

    pub async fn set_band(&self, mode: BandMode, name: &str) {
        self.request(Request::SetBand {
            mode,
            name: truncated(name),
        })
        .await
    }

    /// Channels beyond [`MAX_CHANNELS`] are dropped.
    pub async fn set_cell_broadcast_channels(&self, channels: &[u16]) {
        let channels: Vec<u16, MAX_CHANNELS> = channels.iter().copied().take(MAX_CHANNELS).collect();
        self.request(Request::SetCellBroadcastChannels(channels))
            .await
    }

    pub async fn set_registration_state(&self, state: RegistrationState) {
        self.request(Request::SetRegistrationState(state)).await
    }

    pub async fn request_extended_version(&self) {
        self.request(Request::RequestExtendedVersion).await
    }

    pub async fn set_audio_output(&self, output: AudioOutput) {
        self.request(Request::SetAudioOutput(output)).await
    }

    pub async fn set_noise_suppression(&self, on: bool) {
        self.request(Request::SetNoiseSuppression(on)).await
    }

    pub async fn set_echo_cancellation(&self, on: bool) {
        self.request(Request::SetEchoCancellation(on)).await
    }
}
