//! ### Band selection
pub mod responses;

use atat::{atat_derive::AtatCmd, AtatCmd};

use super::NoResponse;
use responses::SelectedBand;

/// Read band selection *MBSEL?
#[derive(Debug, Clone, PartialEq)]
pub struct GetBand;

impl AtatCmd for GetBand {
    type Response = SelectedBand;

    const MAX_LEN: usize = 11;

    fn write(&self, buf: &mut [u8]) -> usize {
        const CMD: &[u8] = b"AT*MBSEL?\r\n";
        let len = CMD.len().min(buf.len());
        buf[..len].copy_from_slice(&CMD[..len]);
        len
    }

    fn parse(
        &self,
        resp: Result<&[u8], atat::InternalError>,
    ) -> Result<Self::Response, atat::Error> {
        match resp {
            Ok(bytes) => Ok(SelectedBand::parse(bytes)),
            Err(e) => Err(e.into()),
        }
    }
}

/// Band selection *MBSEL
///
/// `band` is a vendor band code, 4 selects automatic band selection.
#[derive(Debug, Clone, PartialEq, AtatCmd)]
#[at_cmd("*MBSEL", NoResponse)]
pub struct SetBand {
    #[at_arg(position = 0)]
    pub band: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::wire;

    #[test]
    fn serializes_band_commands() {
        assert_eq!(wire(&GetBand), "AT*MBSEL?\r\n");
        assert_eq!(wire(&SetBand { band: 5 }), "AT*MBSEL=5\r\n");
    }

    #[test]
    fn parses_band_reply() {
        assert_eq!(GetBand.parse(Ok(&b"*MBSEL: 2"[..])).unwrap().band, Some(2));
        assert_eq!(GetBand.parse(Ok(&b""[..])).unwrap().band, None);
    }
}
