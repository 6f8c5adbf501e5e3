use crate::traits::{AccelRange, ImuBus, ImuSensor, Sample};
use nalgebra::Vector3;

const PWR_MGMT_1: u8 = 0x6B;
const GYRO_CONFIG: u8 = 0x1B;
const ACCEL_CONFIG: u8 = 0x1C;
const ACCEL_XOUT_H: u8 = 0x3B;
const TEMP_OUT_H: u8 = 0x41;
const GYRO_XOUT_H: u8 = 0x43;

const STANDARD_GRAVITY: f64 = 9.80665;

/// Gyroscope full-scale settings of the MPU6050 (deg/s).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Mpu6050GyroRange {
    #[default]
    Dps250,
    Dps500,
    Dps1000,
    Dps2000,
}

/// Driver for the InvenSense MPU6050 6-DoF IMU over any [`ImuBus`].
///
/// The chip ships in sleep mode; construction wakes it and applies the
/// default ±2 g / ±250 deg/s ranges. Samples are big-endian 16-bit
/// counts, converted here to m/s^2 and deg/s.
#[derive(Debug)]
pub struct Mpu6050<B> {
    bus: B,
    accel_range: AccelRange,
    gyro_range: Mpu6050GyroRange,
}

impl<B: ImuBus> Mpu6050<B> {
    pub fn new(mut bus: B) -> Self {
        // Clear the SLEEP bit, otherwise every data register reads 0.
        bus.write(PWR_MGMT_1, 0x00);
        let mut mpu = Mpu6050 {
            bus,
            accel_range: AccelRange::default(),
            gyro_range: Mpu6050GyroRange::default(),
        };
        mpu.apply_accel_config();
        mpu.apply_gyro_config();
        mpu
    }

    pub fn set_gyro_range(&mut self, range: Mpu6050GyroRange) {
        self.gyro_range = range;
        self.apply_gyro_config();
    }

    /// Die temperature in degrees celsius.
    pub fn temperature(&mut self) -> f64 {
        let mut buf = [0u8; 2];
        self.bus.read(TEMP_OUT_H, &mut buf);
        let raw = i16::from_be_bytes(buf);
        f64::from(raw) / 340.0 + 36.53
    }

    fn apply_accel_config(&mut self) {
        // AFS_SEL sits in bits 4:3 of ACCEL_CONFIG.
        let afs_sel: u8 = match self.accel_range {
            AccelRange::G2 => 0b00,
            AccelRange::G4 => 0b01,
            AccelRange::G8 => 0b10,
            AccelRange::G16 => 0b11,
        };
        self.bus.write(ACCEL_CONFIG, afs_sel << 3);
    }

    fn apply_gyro_config(&mut self) {
        let fs_sel: u8 = match self.gyro_range {
            Mpu6050GyroRange::Dps250 => 0b00,
            Mpu6050GyroRange::Dps500 => 0b01,
            Mpu6050GyroRange::Dps1000 => 0b10,
            Mpu6050GyroRange::Dps2000 => 0b11,
        };
        self.bus.write(GYRO_CONFIG, fs_sel << 3);
    }

    fn accel_sensitivity(&self) -> f64 {
        // LSB per g, from the register map datasheet.
        match self.accel_range {
            AccelRange::G2 => 16384.0,
            AccelRange::G4 => 8192.0,
            AccelRange::G8 => 4096.0,
            AccelRange::G16 => 2048.0,
        }
    }

    fn gyro_sensitivity(&self) -> f64 {
        // LSB per deg/s.
        match self.gyro_range {
            Mpu6050GyroRange::Dps250 => 131.0,
            Mpu6050GyroRange::Dps500 => 65.5,
            Mpu6050GyroRange::Dps1000 => 32.8,
            Mpu6050GyroRange::Dps2000 => 16.4,
        }
    }

    fn read_triple(&mut self, reg: u8) -> [i16; 3] {
        let mut buf = [0u8; 6];
        self.bus.read(reg, &mut buf);
        [
            i16::from_be_bytes([buf[0], buf[1]]),
            i16::from_be_bytes([buf[2], buf[3]]),
            i16::from_be_bytes([buf[4], buf[5]]),
        ]
    }
}

impl<B: ImuBus> ImuSensor for Mpu6050<B> {
    fn read_acceleration(&mut self) -> Sample {
        let [x, y, z] = self.read_triple(ACCEL_XOUT_H);
        let scale = STANDARD_GRAVITY / self.accel_sensitivity();
        Vector3::new(f64::from(x), f64::from(y), f64::from(z)) * scale
    }

    fn read_gyro(&mut self) -> Sample {
        let [x, y, z] = self.read_triple(GYRO_XOUT_H);
        let scale = 1.0 / self.gyro_sensitivity();
        Vector3::new(f64::from(x), f64::from(y), f64::from(z)) * scale
    }

    fn set_accel_range(&mut self, range: AccelRange) {
        self.accel_range = range;
        self.apply_accel_config();
    }
}

// Tests live in `tests/reckon_test.rs` to share coverage across backends.
