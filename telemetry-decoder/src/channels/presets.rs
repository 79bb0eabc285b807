//! Built-in channel tables of the known logger firmwares

use super::registry::{ChannelDef, ChannelRegistry};

/// Raw counts per rad/s of the gyroscope
const GYRO_COUNTS_PER_RAD_S: f64 = 6548.0;
/// Raw counts per m/s^2 of the accelerometer
const ACCEL_COUNTS_PER_M_S2: f64 = 417.0;
/// Raw counts per gauss of the magnetometer
const MAG_COUNTS_PER_GAUSS: f64 = 6842.0;
const INTERIOR_TEMP_COUNTS_PER_C: f64 = 256.0;
/// Interior temperature sensor reads zero at 25 C
const INTERIOR_TEMP_ZERO_C: f64 = 25.0;
const EXTERIOR_TEMP_COUNTS_PER_C: f64 = 100.0;

impl ChannelRegistry {
    /// Channel table of the escape-framed flight logger (ids 0-11)
    pub fn flight_logger() -> Self {
        let defs = vec![
            ChannelDef::new(0, "Gyro X (rad/s)", 1.0 / GYRO_COUNTS_PER_RAD_S, 0.0),
            ChannelDef::new(1, "Gyro Y (rad/s)", 1.0 / GYRO_COUNTS_PER_RAD_S, 0.0),
            ChannelDef::new(2, "Gyro Z (rad/s)", 1.0 / GYRO_COUNTS_PER_RAD_S, 0.0),
            ChannelDef::new(3, "Accel X (m/s^2)", 1.0 / ACCEL_COUNTS_PER_M_S2, 0.0),
            ChannelDef::new(4, "Accel Y (m/s^2)", 1.0 / ACCEL_COUNTS_PER_M_S2, 0.0),
            ChannelDef::new(5, "Accel Z (m/s^2)", 1.0 / ACCEL_COUNTS_PER_M_S2, 0.0),
            ChannelDef::new(6, "Mag X (gauss)", 1.0 / MAG_COUNTS_PER_GAUSS, 0.0),
            ChannelDef::new(7, "Mag Y (gauss)", 1.0 / MAG_COUNTS_PER_GAUSS, 0.0),
            ChannelDef::new(8, "Mag Z (gauss)", 1.0 / MAG_COUNTS_PER_GAUSS, 0.0),
            ChannelDef::new(9, "Pressure (Pa)", 1.0, 0.0),
            ChannelDef::new(
                10,
                "Interior Temperature (C)",
                1.0 / INTERIOR_TEMP_COUNTS_PER_C,
                INTERIOR_TEMP_ZERO_C,
            ),
            ChannelDef::new(
                11,
                "Exterior Temperature (C)",
                1.0 / EXTERIOR_TEMP_COUNTS_PER_C,
                0.0,
            ),
        ];

        defs.into_iter().collect()
    }

    /// Channel table of the fixed-stride legacy logger
    pub fn legacy_logger() -> Self {
        let defs = vec![
            ChannelDef::new(1, "GyroX (degrees)", 1.0, 0.0),
            ChannelDef::new(2, "Air Pressure (psi)", 1.0, 0.0),
        ];

        defs.into_iter().collect()
    }
}
