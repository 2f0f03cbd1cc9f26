use crate::codec::{Charset, Codec, EscapeMode};

/// Compile time settings of the modem integration.
pub trait ModemConfig {
    /// Escape style of quoted strings on the AT channel. This chipset uses
    /// octal escapes.
    const ESCAPES: EscapeMode = EscapeMode::Octal;

    /// Character set of phonebook entries, also used for 8-bit SIM toolkit
    /// text and call control alpha identifiers.
    const PHONEBOOK_CHARSET: Charset = Charset::Gsm;

    /// ISO 639 language code reported when the SIM asks for the handset
    /// language.
    const LANGUAGE: &'static str = "en";

    /// Number of probes made before the SMS readiness handshake gives up.
    const SMS_READY_ATTEMPTS: u8 = 15;

    /// Number of times a command sent with `send_retry` is attempted.
    const RETRY_ATTEMPTS: u8 = 15;

    fn codec() -> Codec {
        Codec::new(Self::ESCAPES, Self::PHONEBOOK_CHARSET)
    }
}

/// Settings for a stock greenphone.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConfig;

impl ModemConfig for DefaultConfig {}
