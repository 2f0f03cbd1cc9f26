#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The AT channel reported an error or an unparsable response.
    Atat(atat::Error),

    /// The request names something this modem has no encoding for, e.g. an
    /// unknown band name.
    OperationNotSupported,

    /// No vendor encoding exists; the caller should take its generic path.
    Unsupported,

    /// A command or event did not fit the outbox and was dropped.
    QueueFull,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter<'_>) {
        match self {
            Self::Atat(e) => defmt::write!(f, "Atat({:?})", e),
            Self::OperationNotSupported => defmt::write!(f, "OperationNotSupported"),
            Self::Unsupported => defmt::write!(f, "Unsupported"),
            Self::QueueFull => defmt::write!(f, "QueueFull"),
        }
    }
}

impl From<atat::Error> for Error {
    fn from(e: atat::Error) -> Self {
        Self::Atat(e)
    }
}
