//! Unsolicited responses for General Commands
use crate::command::tokens::Tokens;

/// `*MRDY: <stage>`, the staged hardware readiness report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Readiness {
    pub stage: u32,
}

impl Readiness {
    pub const PREFIX: &'static str = "*MRDY:";

    pub fn parse(line: &str) -> Self {
        Self {
            stage: Tokens::after(line, Self::PREFIX).number(),
        }
    }
}

/// `*MCSQ: <rssi>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalQuality {
    pub rssi: u32,
}

impl SignalQuality {
    pub const PREFIX: &'static str = "*MCSQ:";
    /// Full scale of `rssi`
    pub const MAX: u32 = 31;

    pub fn parse(line: &str) -> Self {
        Self {
            rssi: Tokens::after(line, Self::PREFIX).number(),
        }
    }
}

/// Network time and zone, `*MTZ: 2,"MM/dd/yyyy, HH:mm:ss±zz",<dst>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetworkTime {
    /// Seconds since the unix epoch, UTC
    pub utc: i64,
    /// Offset of local time from UTC in minutes
    pub zone_minutes: i32,
    /// Daylight saving adjustment in minutes
    pub dst_minutes: i32,
}

impl NetworkTime {
    pub const PREFIX: &'static str = "*MTZ: 2,";

    /// `None` when the date or the zone suffix is malformed.
    pub fn parse(line: &str) -> Option<Self> {
        let mut t = Tokens::after(line, Self::PREFIX);
        let time = t.string();
        let dst_minutes = t.number() as i32 * 60;

        // Zone is a signed count of quarter hours at the very end.
        let zone_at = time.rfind(|c: char| c == '+' || c == '-')?;
        let (local, zone) = time.split_at(zone_at);
        let quarters: i32 = zone.trim_start_matches('+').parse().ok()?;
        let zone_minutes = quarters * 15;

        let mut fields = local
            .split(|c: char| !c.is_ascii_digit())
            .filter(|f| !f.is_empty())
            .map(|f| f.parse::<i64>());
        let mut next = || fields.next()?.ok();
        let (month, day, year) = (next()?, next()?, next()?);
        let (hour, minute, second) = (next()?, next()?, next()?);
        if !(1..=12).contains(&month)
            || !(1..=31).contains(&day)
            || hour > 23
            || minute > 59
            || second > 60
        {
            return None;
        }

        let local_secs =
            days_from_civil(year, month, day) * 86_400 + hour * 3_600 + minute * 60 + second;
        Some(Self {
            utc: local_secs - i64::from(zone_minutes) * 60,
            zone_minutes,
            dst_minutes,
        })
    }
}

/// Days since 1970-01-01 of a proleptic Gregorian date.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let yoe = year - era * 400;
    let mp = (month + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// `+CMS ERROR: 322`, SMS storage on the SIM is full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SmsMemoryFull;

impl SmsMemoryFull {
    pub const PREFIX: &'static str = "+CMS ERROR: 322";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_readiness_and_signal() {
        assert_eq!(Readiness::parse("*MRDY: 3").stage, 3);
        assert_eq!(Readiness::parse("*MRDY:").stage, 0);
        assert_eq!(SignalQuality::parse("*MCSQ: 17").rssi, 17);
    }

    #[test]
    fn civil_days() {
        assert_eq!(days_from_civil(1970, 1, 1), 0);
        assert_eq!(days_from_civil(2000, 3, 1), 11_017);
    }

    #[test]
    fn parses_network_time() {
        let t = NetworkTime::parse("*MTZ: 2,\"01/02/1970, 01:00:00+08\",1").unwrap();
        assert_eq!(t.zone_minutes, 120);
        assert_eq!(t.dst_minutes, 60);
        // 1970-01-02 01:00 local at UTC+2 is 1970-01-01 23:00 UTC
        assert_eq!(t.utc, 23 * 3_600);
    }

    #[test]
    fn negative_zone() {
        let t = NetworkTime::parse("*MTZ: 2,\"01/01/1970, 00:00:00-20\",0").unwrap();
        assert_eq!(t.zone_minutes, -300);
        assert_eq!(t.utc, 5 * 3_600);
    }

    #[test]
    fn malformed_network_time_is_ignored() {
        assert_eq!(NetworkTime::parse("*MTZ: 2,\"garbage\",0"), None);
        assert_eq!(NetworkTime::parse("*MTZ: 2,\"13/01/2008, 00:00:00+00\",0"), None);
    }
}
