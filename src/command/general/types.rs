//! Argument and parameter types used by General Commands and Responses

use atat::atat_derive::AtatEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
pub enum Echo {
    Disable = 0,
    Enable = 1,
}

/// Setting changed by `*MCNFG`
#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
pub enum ModemFeature {
    /// New SMS, SMS memory full and phonebook ready notifications. Has to be
    /// on before `*MCAM` takes effect.
    UnsolicitedEvents = 1,
    /// Listing messages with `+CMGL` marks unread ones as read
    MarkReadOnList = 2,
}

/// Audio processing block selected by `*MECNS`
#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
pub enum AudioProcessing {
    EchoCancellation = 1,
    NoiseSuppression = 2,
}

/// Voice channel selected by `*MVCHN`
#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioOutput {
    Handset = 0,
    /// Wired or bluetooth headset
    Headset = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
pub enum FeatureState {
    Off = 0,
    On = 1,
}
