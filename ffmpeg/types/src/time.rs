use std::time::Duration;

/**
    A rational number, used for time bases and frame rates.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    pub fn to_f64(self) -> f64 {
        if self.den == 0 {
            0.0
        } else {
            self.num as f64 / self.den as f64
        }
    }

    /**
        Convert a tick count expressed in this time base into a duration.

        Negative tick counts clamp to zero.
    */
    pub fn ticks_to_duration(self, ticks: i64) -> Duration {
        if ticks <= 0 || self.den == 0 || self.num <= 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(ticks as f64 * self.num as f64 / self.den as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ntsc_rate_as_float() {
        let rate = Rational::new(30000, 1001);
        assert!((rate.to_f64() - 29.97).abs() < 0.01);
    }

    #[test]
    fn zero_denominator_is_zero() {
        assert_eq!(Rational::new(1, 0).to_f64(), 0.0);
    }

    #[test]
    fn ticks_convert_to_duration() {
        let tb = Rational::new(1, 90000);
        assert_eq!(tb.ticks_to_duration(90000), Duration::from_secs(1));
        assert_eq!(tb.ticks_to_duration(-5), Duration::ZERO);
    }
}
