#![no_std]
#![doc = include_str!("../README.md")]

mod lsm9ds1;
mod mpu6050;
mod reckoner;
mod session;
mod traits;

pub use lsm9ds1::{Lsm9ds1, Lsm9ds1GyroRange};
pub use mpu6050::{Mpu6050, Mpu6050GyroRange};
pub use reckoner::{DeadReckoner, ReckonError, ReckonerParams, ReckonerState};
pub use session::{Session, Snapshot};
pub use traits::{AccelRange, ImuBus, ImuSensor, Sample};
