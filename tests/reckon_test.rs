#![cfg(test)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use approx::assert_relative_eq;
use dead_reckon::{
    AccelRange, DeadReckoner, ImuBus, ImuSensor, Lsm9ds1, Lsm9ds1GyroRange, Mpu6050,
    Mpu6050GyroRange, ReckonError, Session,
};
use nalgebra::Vector3;
use rstest::rstest;

type SensorBox = Box<dyn ImuSensor>;

const STANDARD_GRAVITY: f64 = 9.80665;

// Data register addresses, duplicated from the datasheets so the tests
// stay independent of the drivers under test.
const MPU_ACCEL_XOUT_H: u8 = 0x3B;
const MPU_GYRO_XOUT_H: u8 = 0x43;
const MPU_TEMP_OUT_H: u8 = 0x41;
const MPU_PWR_MGMT_1: u8 = 0x6B;
const LSM_OUT_X_L_XL: u8 = 0x28;
const LSM_OUT_X_L_G: u8 = 0x18;
const LSM_OUT_TEMP_L: u8 = 0x15;

/// In-memory register file standing in for an I2C bus.
#[derive(Default, Clone)]
struct FakeBus {
    regs: Rc<RefCell<HashMap<u8, Vec<u8>>>>,
    writes: Rc<RefCell<Vec<(u8, u8)>>>,
}

impl FakeBus {
    fn set_be_triple(&self, reg: u8, counts: [i16; 3]) {
        let bytes: Vec<u8> = counts.iter().flat_map(|c| c.to_be_bytes()).collect();
        self.regs.borrow_mut().insert(reg, bytes);
    }

    fn set_le_triple(&self, reg: u8, counts: [i16; 3]) {
        let bytes: Vec<u8> = counts.iter().flat_map(|c| c.to_le_bytes()).collect();
        self.regs.borrow_mut().insert(reg, bytes);
    }

    fn set_bytes(&self, reg: u8, bytes: &[u8]) {
        self.regs.borrow_mut().insert(reg, bytes.to_vec());
    }
}

impl ImuBus for FakeBus {
    fn read(&mut self, reg: u8, buf: &mut [u8]) {
        let regs = self.regs.borrow();
        let stored = regs.get(&reg).map(Vec::as_slice).unwrap_or(&[]);
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = stored.get(i).copied().unwrap_or(0);
        }
    }

    fn write(&mut self, reg: u8, value: u8) {
        self.writes.borrow_mut().push((reg, value));
    }
}

fn mpu_one_g_x() -> SensorBox {
    let bus = FakeBus::default();
    // +1 g on X at the default ±2 g range (16384 LSB/g).
    bus.set_be_triple(MPU_ACCEL_XOUT_H, [16384, 0, 0]);
    Box::new(Mpu6050::new(bus))
}

fn lsm_one_g_x() -> SensorBox {
    let bus = FakeBus::default();
    // 0.061 mg/LSB at ±2 g; 16393 counts is 999.97 mg.
    bus.set_le_triple(LSM_OUT_X_L_XL, [16393, 0, 0]);
    Box::new(Lsm9ds1::new(bus))
}

#[rstest]
#[case::mpu6050(mpu_one_g_x())]
#[case::lsm9ds1(lsm_one_g_x())]
fn test_full_scale_counts_read_as_one_g(#[case] mut sensor: SensorBox) {
    let accel = sensor.read_acceleration();
    assert_relative_eq!(accel.x, STANDARD_GRAVITY, epsilon = 1e-2);
    assert_relative_eq!(accel.y, 0.0);
    assert_relative_eq!(accel.z, 0.0);
}

#[rstest]
#[case::mpu6050(mpu_one_g_x())]
#[case::lsm9ds1(lsm_one_g_x())]
fn test_wider_range_scales_same_counts_up(#[case] mut sensor: SensorBox) {
    let at_2g = sensor.read_acceleration().x;
    sensor.set_accel_range(AccelRange::G4);
    let at_4g = sensor.read_acceleration().x;
    // Same raw counts mean twice the acceleration at twice the range.
    assert_relative_eq!(at_4g, 2.0 * at_2g, epsilon = 1e-9);
}

#[rstest]
#[case::mpu6050(mpu_one_g_x())]
#[case::lsm9ds1(lsm_one_g_x())]
fn test_session_end_to_end(#[case] sensor: SensorBox) {
    struct BoxedSensor(SensorBox);
    impl ImuSensor for BoxedSensor {
        fn read_acceleration(&mut self) -> dead_reckon::Sample {
            self.0.read_acceleration()
        }
        fn read_gyro(&mut self) -> dead_reckon::Sample {
            self.0.read_gyro()
        }
        fn set_accel_range(&mut self, range: AccelRange) {
            self.0.set_accel_range(range);
        }
    }

    let mut session = Session::new(BoxedSensor(sensor), 0.0);

    // One second of ~1 g along X.
    let snap = session.poll(1.0);
    assert_relative_eq!(snap.position.x, 0.5 * STANDARD_GRAVITY, epsilon = 1e-2);
    assert_relative_eq!(snap.velocity.x, 0.0);

    // A clock glitch is skipped, not fatal.
    let glitch = session.poll(0.5);
    assert_eq!(glitch.position, snap.position);
    assert_eq!(session.skipped_samples(), 1);

    // Recovery: the next valid poll integrates from t=1.0.
    let recovered = session.poll(2.0);
    assert!(recovered.position.x > snap.position.x);

    session.reset(3.0);
    assert_eq!(session.snapshot().position, Vector3::zeros());
}

#[test]
fn test_mpu6050_wakes_chip_on_construction() {
    let bus = FakeBus::default();
    let writes = bus.writes.clone();
    let _mpu = Mpu6050::new(bus);
    // The first bus write must clear the SLEEP bit in PWR_MGMT_1.
    assert_eq!(writes.borrow().first(), Some(&(MPU_PWR_MGMT_1, 0x00)));
}

#[test]
fn test_mpu6050_gyro_and_temperature_conversion() {
    let bus = FakeBus::default();
    bus.set_be_triple(MPU_GYRO_XOUT_H, [131, -262, 0]);
    bus.set_bytes(MPU_TEMP_OUT_H, &340i16.to_be_bytes());
    let mut mpu = Mpu6050::new(bus);

    let gyro = mpu.read_gyro();
    assert_relative_eq!(gyro.x, 1.0, epsilon = 1e-9);
    assert_relative_eq!(gyro.y, -2.0, epsilon = 1e-9);

    mpu.set_gyro_range(Mpu6050GyroRange::Dps2000);
    let gyro = mpu.read_gyro();
    assert_relative_eq!(gyro.x, 131.0 / 16.4, epsilon = 1e-9);

    assert_relative_eq!(mpu.temperature(), 37.53, epsilon = 1e-9);
}

#[test]
fn test_lsm9ds1_gyro_and_temperature_conversion() {
    let bus = FakeBus::default();
    // 8.75 mdps/LSB at the default ±245 deg/s range.
    bus.set_le_triple(LSM_OUT_X_L_G, [800, 0, -400]);
    bus.set_bytes(LSM_OUT_TEMP_L, &32i16.to_le_bytes());
    let mut lsm = Lsm9ds1::new(bus);

    let gyro = lsm.read_gyro();
    assert_relative_eq!(gyro.x, 7.0, epsilon = 1e-9);
    assert_relative_eq!(gyro.z, -3.5, epsilon = 1e-9);

    lsm.set_gyro_range(Lsm9ds1GyroRange::Dps2000);
    let gyro = lsm.read_gyro();
    assert_relative_eq!(gyro.x, 800.0 * 70.0e-3, epsilon = 1e-9);

    assert_relative_eq!(lsm.temperature(), 27.0, epsilon = 1e-9);
}

#[test]
fn test_push_then_coast_leaves_position_fixed() {
    let mut reckoner = DeadReckoner::new(0.0);

    let state = reckoner.step(Vector3::new(1.0, 0.0, -9.8), 1.0).unwrap();
    assert_relative_eq!(state.position.x, 0.5, epsilon = 1e-12);
    assert_relative_eq!(state.position.y, 0.0);
    assert_relative_eq!(state.position.z, -4.9, epsilon = 1e-12);

    // With velocity integration disabled, a quiet interval does not
    // move the estimate.
    let state = reckoner.step(Vector3::zeros(), 2.0).unwrap();
    assert_relative_eq!(state.position.x, 0.5, epsilon = 1e-12);
    assert_relative_eq!(state.position.z, -4.9, epsilon = 1e-12);
}

#[test]
fn test_error_reports_offending_timestamps() {
    let mut reckoner = DeadReckoner::new(4.0);
    let err = reckoner.step(Vector3::zeros(), 3.0).unwrap_err();
    assert_eq!(
        err,
        ReckonError::InvalidTimestamp {
            last: 4.0,
            now: 3.0
        }
    );
    assert_eq!(
        err.to_string(),
        "non-monotonic timestamp: now=3 is earlier than last=4"
    );
}
