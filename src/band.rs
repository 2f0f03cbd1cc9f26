//! Radio band selection by name.

use crate::command::{
    band::{responses::SelectedBand, GetBand, SetBand},
    Reply,
};
use crate::error::Error;
use crate::event::Event;
use crate::io::{Completion, Io};

/// Band code selecting automatic band selection
pub const AUTOMATIC: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Band {
    pub name: &'static str,
    pub code: u8,
}

/// Bands that can be selected manually, in the order they are listed.
pub const BANDS: &[Band] = &[
    Band {
        name: "GSM & EGSM",
        code: 0,
    },
    Band {
        name: "GSM 1800",
        code: 1,
    },
    Band {
        name: "Dualband 900/1800",
        code: 2,
    },
    Band {
        name: "PCS 1900",
        code: 3,
    },
    Band {
        name: "GSM 850",
        code: 5,
    },
    Band {
        name: "Dualband 1900/850",
        code: 6,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BandMode {
    Automatic,
    Manual,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BandEvent {
    /// `name` is empty in automatic mode
    Current {
        mode: BandMode,
        name: &'static str,
    },
    Bands(&'static [Band]),
    SetResult(Result<(), Error>),
}

fn by_code(code: u8) -> Option<&'static Band> {
    BANDS.iter().find(|band| band.code == code)
}

fn by_name(name: &str) -> Option<&'static Band> {
    BANDS.iter().find(|band| band.name == name)
}

#[derive(Debug, Default)]
pub struct BandSelection;

impl BandSelection {
    pub fn new() -> Self {
        Self
    }

    pub fn request_band(&self, io: &mut impl Io) -> Result<(), Error> {
        io.chat(GetBand.into(), Completion::BandQuery)
    }

    /// A failed query or a reply without a band reads as automatic.
    pub fn on_band_query(&self, result: Result<Reply, Error>, io: &mut impl Io) -> Result<(), Error> {
        let code = match result {
            Ok(Reply::Band(SelectedBand { band: Some(code) })) => code,
            _ => AUTOMATIC,
        };

        let current = match by_code(code) {
            Some(band) => BandEvent::Current {
                mode: BandMode::Manual,
                name: band.name,
            },
            None => BandEvent::Current {
                mode: BandMode::Automatic,
                name: "",
            },
        };
        io.emit(current.into())
    }

    pub fn request_bands(&self, io: &mut impl Io) -> Result<(), Error> {
        io.emit(BandEvent::Bands(BANDS).into())
    }

    /// Unknown names fail with [`Error::OperationNotSupported`] without
    /// touching the modem.
    pub fn set_band(&self, mode: BandMode, name: &str, io: &mut impl Io) -> Result<(), Error> {
        let code = match mode {
            BandMode::Automatic => AUTOMATIC,
            BandMode::Manual => match by_name(name) {
                Some(band) => band.code,
                None => {
                    warn!("Unknown band {}", name);
                    return io.emit(BandEvent::SetResult(Err(Error::OperationNotSupported)).into());
                }
            },
        };
        io.chat(SetBand { band: code }.into(), Completion::BandSet)
    }

    pub fn on_band_set(&self, result: Result<(), Error>, io: &mut impl Io) -> Result<(), Error> {
        io.emit(Event::Band(BandEvent::SetResult(result)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::Outbox;
    use crate::test_helpers::sent;

    fn current(io: &mut Outbox) -> (BandMode, &'static str) {
        match io.pop_event() {
            Some(Event::Band(BandEvent::Current { mode, name })) => (mode, name),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn names_map_to_codes_and_back() {
        let bands = BandSelection::new();
        let mut io = Outbox::new();

        for band in BANDS {
            bands.set_band(BandMode::Manual, band.name, &mut io).unwrap();
            assert_eq!(sent(&mut io), [format!("AT*MBSEL={}", band.code)]);

            bands.on_band_query(
                Ok(Reply::Band(SelectedBand {
                    band: Some(band.code),
                })),
                &mut io,
            ).unwrap();
            assert_eq!(current(&mut io), (BandMode::Manual, band.name));
        }
    }

    #[test]
    fn automatic_selection() {
        let bands = BandSelection::new();
        let mut io = Outbox::new();

        bands.set_band(BandMode::Automatic, "ignored", &mut io).unwrap();
        assert_eq!(sent(&mut io), ["AT*MBSEL=4"]);

        bands.on_band_query(Ok(Reply::Band(SelectedBand { band: Some(4) })), &mut io).unwrap();
        assert_eq!(current(&mut io), (BandMode::Automatic, ""));

        bands.on_band_query(Ok(Reply::Band(SelectedBand { band: None })), &mut io).unwrap();
        assert_eq!(current(&mut io), (BandMode::Automatic, ""));

        bands.on_band_query(Err(Error::Atat(atat::Error::Timeout)), &mut io).unwrap();
        assert_eq!(current(&mut io), (BandMode::Automatic, ""));
    }

    #[test]
    fn unknown_band_is_rejected_locally() {
        let bands = BandSelection::new();
        let mut io = Outbox::new();
        bands.set_band(BandMode::Manual, "LTE 20", &mut io).unwrap();
        assert!(sent(&mut io).is_empty());
        assert_eq!(
            io.pop_event(),
            Some(Event::Band(BandEvent::SetResult(Err(
                Error::OperationNotSupported
            ))))
        );
    }

    #[test]
    fn set_result_reports_modem_outcome() {
        let bands = BandSelection::new();
        let mut io = Outbox::new();
        bands.on_band_set(Ok(()), &mut io).unwrap();
        bands.on_band_set(Err(Error::Atat(atat::Error::Error)), &mut io).unwrap();
        assert_eq!(
            io.pop_event(),
            Some(Event::Band(BandEvent::SetResult(Ok(()))))
        );
        assert_eq!(
            io.pop_event(),
            Some(Event::Band(BandEvent::SetResult(Err(Error::Atat(
                atat::Error::Error
            )))))
        );
    }

    #[test]
    fn lists_all_bands() {
        let bands = BandSelection::new();
        let mut io = Outbox::new();
        bands.request_bands(&mut io).unwrap();
        let Some(Event::Band(BandEvent::Bands(list))) = io.pop_event() else {
            panic!("no band list");
        };
        assert_eq!(list.len(), 6);
        assert_eq!(list[0].name, "GSM & EGSM");
        assert!(list.iter().all(|band| band.code != AUTOMATIC));
    }
}
