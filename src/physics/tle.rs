//! Two-line element sets, loaded through satkit.

use crate::errors::{SimError, SimResult};
use hifitime::{Duration, Epoch};
use std::fmt;

const LINE_LENGTH: usize = 69;

/// A checked element set and its epoch on the hifitime scale the rest of the
/// simulation runs on.
#[derive(Clone)]
pub struct Tle {
    elements: satkit::TLE,
    epoch: Epoch,
}

impl fmt::Debug for Tle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tle")
            .field("epoch", &self.epoch)
            .field("eccentricity", &self.elements.eccen)
            .field("mean_motion", &self.elements.mean_motion)
            .finish()
    }
}

impl Tle {
    pub fn parse(line1: &str, line2: &str) -> SimResult<Self> {
        let line1 = line1.trim_end().to_string();
        let line2 = line2.trim_end().to_string();

        check_line(&line1, '1')?;
        check_line(&line2, '2')?;
        if line1[2..7] != line2[2..7] {
            return Err(SimError::configuration(format!(
                "TLE lines describe different satellites ({} vs {})",
                line1[2..7].trim(),
                line2[2..7].trim()
            )));
        }

        let elements = satkit::TLE::load_2line(&line1, &line2)
            .map_err(|e| SimError::configuration(format!("TLE rejected: {e}")))?;

        if !(elements.mean_motion.is_finite() && elements.mean_motion > 0.0) {
            return Err(SimError::configuration("TLE mean motion must be positive"));
        }
        if !(0.0..1.0).contains(&elements.eccen) {
            return Err(SimError::configuration(format!(
                "TLE eccentricity {} is not elliptical",
                elements.eccen
            )));
        }

        let (year, month, day, hour, minute, second) = elements.epoch.as_datetime();
        let epoch = Epoch::from_gregorian_utc(
            year as i32,
            month as u8,
            day as u8,
            hour as u8,
            minute as u8,
            0,
            0,
        ) + Duration::from_seconds(second as f64);

        Ok(Self { elements, epoch })
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// The satkit element set, as SGP4 consumes it.
    pub fn elements(&self) -> &satkit::TLE {
        &self.elements
    }
}

fn check_line(line: &str, number: char) -> SimResult<()> {
    if !line.is_ascii() || line.len() != LINE_LENGTH {
        return Err(SimError::configuration(format!(
            "TLE line {number} must be {LINE_LENGTH} ASCII characters, got {}",
            line.len()
        )));
    }
    if !line.starts_with(number) {
        return Err(SimError::configuration(format!(
            "TLE line {number} must start with '{number}'"
        )));
    }

    let expected = checksum(&line[..68]);
    let found = line[68..]
        .parse::<u32>()
        .map_err(|_| SimError::configuration(format!("TLE line {number} checksum is not a digit")))?;
    if expected != found {
        return Err(SimError::configuration(format!(
            "TLE line {number} checksum mismatch: expected {expected}, found {found}"
        )));
    }
    Ok(())
}

/// Modulo-10 sum of digits, with '-' counting as one.
fn checksum(body: &str) -> u32 {
    body.chars()
        .map(|c| match c {
            '-' => 1,
            c => c.to_digit(10).unwrap_or(0),
        })
        .sum::<u32>()
        % 10
}
