use nalgebra::Vector3;

/// A tri-axis sensor reading. Acceleration is in m/s^2, gyro in deg/s.
pub type Sample = Vector3<f64>;

/// Accelerometer full-scale setting shared by both supported chips.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum AccelRange {
    #[default]
    G2,
    G4,
    G8,
    G16,
}

/// Raw register transport for an IMU chip.
///
/// Implementations wrap an I2C or SPI bus; the chip backends own the
/// register maps and unit conversion and only ask the bus to move
/// bytes.
pub trait ImuBus {
    /// Burst-reads `buf.len()` bytes starting at register `reg`.
    fn read(&mut self, reg: u8, buf: &mut [u8]);
    /// Writes one byte to register `reg`.
    fn write(&mut self, reg: u8, value: u8);
}

/// Capability interface over an inertial measurement unit.
///
/// Consumers of acceleration data (the reckoner, the session) depend
/// only on this trait, never on a concrete chip.
pub trait ImuSensor {
    /// Current acceleration in m/s^2.
    fn read_acceleration(&mut self) -> Sample;
    /// Current angular rate in deg/s.
    fn read_gyro(&mut self) -> Sample;
    /// Reconfigures the accelerometer full-scale range.
    fn set_accel_range(&mut self, range: AccelRange);
}
