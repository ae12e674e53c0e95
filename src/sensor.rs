use rand::Rng;

/// Standard gravity as reported by a resting accelerometer on its vertical axis
pub const GRAVITY: f64 = 9.8;

/// Inclusive physical range an axis is clamped to
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

pub const ACCEL_XY_RANGE: AxisRange = AxisRange::new(-3.0, 3.0);
pub const ACCEL_Z_RANGE: AxisRange = AxisRange::new(8.0, 11.0);
pub const GYRO_RANGE: AxisRange = AxisRange::new(-40.0, 40.0);

// Half-widths of the uniform jitter applied per sensor tick
const ACCEL_XY_STEP: f64 = 0.3;
const ACCEL_Z_STEP: f64 = 0.25;
const GYRO_STEP: f64 = 4.0;

/// One sample of the simulated six-axis motion sensor.
///
/// Accelerometer axes are in m/s², gyroscope axes in °/s.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorReading {
    pub accel_x: f64,
    pub accel_y: f64,
    pub accel_z: f64,
    pub gyro_x: f64,
    pub gyro_y: f64,
    pub gyro_z: f64,
}

impl Default for SensorReading {
    fn default() -> Self {
        Self::baseline()
    }
}

impl SensorReading {
    /// Reading of a device lying still
    pub const fn baseline() -> Self {
        Self {
            accel_x: 0.0,
            accel_y: 0.0,
            accel_z: GRAVITY,
            gyro_x: 0.0,
            gyro_y: 0.0,
            gyro_z: 0.0,
        }
    }

    /// Next sample of a bounded random walk starting at `self`.
    ///
    /// The vertical accelerometer axis is re-centred on gravity each step
    /// instead of wandering, every other axis drifts from its previous value.
    pub fn perturb<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        Self {
            accel_x: step(rng, self.accel_x, ACCEL_XY_STEP, ACCEL_XY_RANGE),
            accel_y: step(rng, self.accel_y, ACCEL_XY_STEP, ACCEL_XY_RANGE),
            accel_z: step(rng, GRAVITY, ACCEL_Z_STEP, ACCEL_Z_RANGE),
            gyro_x: step(rng, self.gyro_x, GYRO_STEP, GYRO_RANGE),
            gyro_y: step(rng, self.gyro_y, GYRO_STEP, GYRO_RANGE),
            gyro_z: step(rng, self.gyro_z, GYRO_STEP, GYRO_RANGE),
        }
    }

    pub fn within_bounds(&self) -> bool {
        ACCEL_XY_RANGE.contains(self.accel_x)
            && ACCEL_XY_RANGE.contains(self.accel_y)
            && ACCEL_Z_RANGE.contains(self.accel_z)
            && GYRO_RANGE.contains(self.gyro_x)
            && GYRO_RANGE.contains(self.gyro_y)
            && GYRO_RANGE.contains(self.gyro_z)
    }

    /// Axis labels paired with their values, in display order
    pub fn axes(&self) -> [(&'static str, f64); 6] {
        [
            ("accel X", self.accel_x),
            ("accel Y", self.accel_y),
            ("accel Z", self.accel_z),
            ("gyro X", self.gyro_x),
            ("gyro Y", self.gyro_y),
            ("gyro Z", self.gyro_z),
        ]
    }
}

fn step<R: Rng + ?Sized>(rng: &mut R, from: f64, half_width: f64, range: AxisRange) -> f64 {
    let jitter = rng.gen_range(-half_width..=half_width);
    round_to_hundredths(range.clamp(from + jitter))
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
