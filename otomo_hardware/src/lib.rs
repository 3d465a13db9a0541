#![cfg_attr(not(test), no_std)]

//! embedded-hal adapters for the drive train: H-bridge motor outputs and
//! single-channel wheel pulse sensors.

pub mod motors;

pub use motors::{
    encoder::PinPulseInput,
    hbridge::{BridgeError, HBridge},
    MotorEffort, OpenLoopDrive, PulseInput,
};
