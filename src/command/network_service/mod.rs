//! ### Network service
pub mod types;

use atat::atat_derive::AtatCmd;

use super::NoResponse;
use types::RegistrationUrc;

/// Network registration status +CREG
///
/// Selects how much the unsolicited `+CREG:` report carries. Location
/// information wakes the host on every cell change, so it is dropped while
/// suspended.
#[derive(Debug, Clone, PartialEq, AtatCmd)]
#[at_cmd("+CREG", NoResponse)]
pub struct SetNetworkRegistrationStatus {
    #[at_arg(position = 0)]
    pub n: RegistrationUrc,
}

/// GPRS network registration status +CGREG
#[derive(Debug, Clone, PartialEq, AtatCmd)]
#[at_cmd("+CGREG", NoResponse)]
pub struct SetGprsRegistrationStatus {
    #[at_arg(position = 0)]
    pub n: RegistrationUrc,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::wire;

    #[test]
    fn serializes_registration_reporting() {
        assert_eq!(
            wire(&SetNetworkRegistrationStatus {
                n: RegistrationUrc::Enabled
            }),
            "AT+CREG=1\r\n"
        );
        assert_eq!(
            wire(&SetGprsRegistrationStatus {
                n: RegistrationUrc::EnabledWithLocation
            }),
            "AT+CGREG=2\r\n"
        );
    }
}
