use crate::constants::{MJD_J2000, SECONDS_PER_DAY, TWO_PI};
use hifitime::Epoch;

/// Sidereal-time source used to rotate between the inertial and Earth-fixed frames.
pub trait SiderealTime: Send + Sync {
    /// Greenwich sidereal angle (rad, in `[0, 2π)`) at the given Modified Julian Date.
    fn sidereal_angle(&self, mjd: f64) -> f64;
}

/// IAU-1982 Greenwich Mean Sidereal Time, treating UTC as UT1.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanSiderealTime;

impl SiderealTime for MeanSiderealTime {
    fn sidereal_angle(&self, mjd: f64) -> f64 {
        let t = (mjd - MJD_J2000) / 36525.0;
        let gmst_seconds = 67310.54841
            + (876600.0 * 3600.0 + 8640184.812866) * t
            + 0.093104 * t * t
            - 6.2e-6 * t * t * t;

        let angle = gmst_seconds.rem_euclid(SECONDS_PER_DAY) / SECONDS_PER_DAY * TWO_PI;
        angle.rem_euclid(TWO_PI)
    }
}

/// Modified Julian Date (UTC) of `epoch` offset by `elapsed_seconds`.
pub fn mjd_at(epoch: Epoch, elapsed_seconds: f64) -> f64 {
    epoch.to_mjd_utc_days() + elapsed_seconds / SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::EARTH_ANGULAR_VELOCITY;
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    #[test_case(MJD_J2000, 280.46061837; "J2000 noon")]
    #[test_case(58847.0, 98.1505262; "2019-12-30 midnight")]
    fn gmst_reference_values(mjd: f64, expected_deg: f64) {
        let angle = MeanSiderealTime.sidereal_angle(mjd);
        assert_abs_diff_eq!(angle.to_degrees(), expected_deg, epsilon = 1e-6);
    }

    #[test]
    fn one_solar_day_advances_about_one_degree() {
        let a = MeanSiderealTime.sidereal_angle(58847.0);
        let b = MeanSiderealTime.sidereal_angle(58848.0);
        let advance = (b - a).rem_euclid(TWO_PI).to_degrees();
        assert_abs_diff_eq!(advance, 0.9856, epsilon = 1e-3);
    }

    #[test]
    fn rate_matches_earth_rotation() {
        let a = MeanSiderealTime.sidereal_angle(58847.0);
        let b = MeanSiderealTime.sidereal_angle(58847.0 + 3600.0 / SECONDS_PER_DAY);
        let rate = (b - a).rem_euclid(TWO_PI) / 3600.0;
        assert_abs_diff_eq!(rate, EARTH_ANGULAR_VELOCITY, epsilon = 1e-10);
    }

    #[test]
    fn mjd_from_epoch() {
        let epoch = Epoch::from_gregorian_utc(2019, 12, 30, 0, 0, 0, 0);
        assert_abs_diff_eq!(mjd_at(epoch, 0.0), 58847.0, epsilon = 1e-9);
        assert_abs_diff_eq!(mjd_at(epoch, 43_200.0), 58847.5, epsilon = 1e-9);
    }
}
