//! ### Short Messages Service
//!
//! Only the two probes of the SMS readiness handshake are needed here; message
//! transfer is handled by the host's generic SMS stack.
pub mod types;

use atat::atat_derive::AtatCmd;
use heapless::String;

use super::NoResponse;
use types::MessageFormat;

/// Message format +CMGF
#[derive(Debug, Clone, PartialEq, AtatCmd)]
#[at_cmd("+CMGF", NoResponse)]
pub struct SetMessageFormat {
    #[at_arg(position = 0)]
    pub format: MessageFormat,
}

/// Preferred message storage +CPMS
#[derive(Debug, Clone, PartialEq, AtatCmd)]
#[at_cmd("+CPMS", NoResponse)]
pub struct SetPreferredStorage {
    /// Memory used for reading and deleting, e.g. `"SM"` for the SIM
    #[at_arg(position = 0, len = 2)]
    pub storage: String<2>,
}

impl SetPreferredStorage {
    pub fn sim() -> Self {
        Self {
            storage: String::try_from("SM").unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::wire;

    #[test]
    fn serializes_sms_probes() {
        assert_eq!(
            wire(&SetMessageFormat {
                format: MessageFormat::Pdu
            }),
            "AT+CMGF=0\r\n"
        );
        assert_eq!(wire(&SetPreferredStorage::sim()), "AT+CPMS=\"SM\"\r\n");
    }
}
