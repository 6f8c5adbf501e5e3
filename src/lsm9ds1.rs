use crate::traits::{AccelRange, ImuBus, ImuSensor, Sample};
use nalgebra::Vector3;

const CTRL_REG1_G: u8 = 0x10;
const OUT_TEMP_L: u8 = 0x15;
const OUT_X_L_G: u8 = 0x18;
const CTRL_REG6_XL: u8 = 0x20;
const OUT_X_L_XL: u8 = 0x28;

const STANDARD_GRAVITY: f64 = 9.80665;

// 952 Hz output data rate, the highest the accel/gyro die offers.
const ODR_952HZ: u8 = 0b110;

/// Gyroscope full-scale settings of the LSM9DS1 (deg/s).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Lsm9ds1GyroRange {
    #[default]
    Dps245,
    Dps500,
    Dps2000,
}

/// Driver for the accel/gyro die of the ST LSM9DS1 over any [`ImuBus`].
///
/// The magnetometer lives behind a separate bus address and is not
/// needed for dead reckoning, so this driver does not touch it.
/// Samples are little-endian 16-bit counts, converted here to m/s^2
/// and deg/s.
#[derive(Debug)]
pub struct Lsm9ds1<B> {
    bus: B,
    accel_range: AccelRange,
    gyro_range: Lsm9ds1GyroRange,
}

impl<B: ImuBus> Lsm9ds1<B> {
    pub fn new(bus: B) -> Self {
        let mut lsm = Lsm9ds1 {
            bus,
            accel_range: AccelRange::default(),
            gyro_range: Lsm9ds1GyroRange::default(),
        };
        lsm.apply_accel_config();
        lsm.apply_gyro_config();
        lsm
    }

    pub fn set_gyro_range(&mut self, range: Lsm9ds1GyroRange) {
        self.gyro_range = range;
        self.apply_gyro_config();
    }

    /// Die temperature in degrees celsius.
    pub fn temperature(&mut self) -> f64 {
        let mut buf = [0u8; 2];
        self.bus.read(OUT_TEMP_L, &mut buf);
        let raw = i16::from_le_bytes(buf);
        25.0 + f64::from(raw) / 16.0
    }

    fn apply_accel_config(&mut self) {
        // FS_XL sits in bits 4:3 of CTRL_REG6_XL. The encoding is not
        // monotonic in g: 0b01 selects ±16 g, not ±4 g.
        let fs_xl: u8 = match self.accel_range {
            AccelRange::G2 => 0b00,
            AccelRange::G16 => 0b01,
            AccelRange::G4 => 0b10,
            AccelRange::G8 => 0b11,
        };
        self.bus.write(CTRL_REG6_XL, (ODR_952HZ << 5) | (fs_xl << 3));
    }

    fn apply_gyro_config(&mut self) {
        let fs_g: u8 = match self.gyro_range {
            Lsm9ds1GyroRange::Dps245 => 0b00,
            Lsm9ds1GyroRange::Dps500 => 0b01,
            Lsm9ds1GyroRange::Dps2000 => 0b11,
        };
        self.bus.write(CTRL_REG1_G, (ODR_952HZ << 5) | (fs_g << 3));
    }

    fn accel_sensitivity(&self) -> f64 {
        // mg per LSB, from the datasheet.
        match self.accel_range {
            AccelRange::G2 => 0.061,
            AccelRange::G4 => 0.122,
            AccelRange::G8 => 0.244,
            AccelRange::G16 => 0.732,
        }
    }

    fn gyro_sensitivity(&self) -> f64 {
        // mdps per LSB.
        match self.gyro_range {
            Lsm9ds1GyroRange::Dps245 => 8.75,
            Lsm9ds1GyroRange::Dps500 => 17.50,
            Lsm9ds1GyroRange::Dps2000 => 70.0,
        }
    }

    fn read_triple(&mut self, reg: u8) -> [i16; 3] {
        let mut buf = [0u8; 6];
        self.bus.read(reg, &mut buf);
        [
            i16::from_le_bytes([buf[0], buf[1]]),
            i16::from_le_bytes([buf[2], buf[3]]),
            i16::from_le_bytes([buf[4], buf[5]]),
        ]
    }
}

impl<B: ImuBus> ImuSensor for Lsm9ds1<B> {
    fn read_acceleration(&mut self) -> Sample {
        let [x, y, z] = self.read_triple(OUT_X_L_XL);
        // mg/LSB -> g -> m/s^2
        let scale = self.accel_sensitivity() * 1e-3 * STANDARD_GRAVITY;
        Vector3::new(f64::from(x), f64::from(y), f64::from(z)) * scale
    }

    fn read_gyro(&mut self) -> Sample {
        let [x, y, z] = self.read_triple(OUT_X_L_G);
        let scale = self.gyro_sensitivity() * 1e-3;
        Vector3::new(f64::from(x), f64::from(y), f64::from(z)) * scale
    }

    fn set_accel_range(&mut self, range: AccelRange) {
        self.accel_range = range;
        self.apply_accel_config();
    }
}

// Tests live in `tests/reckon_test.rs` to share coverage across backends.
