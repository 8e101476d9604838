//! Hardware-independent core library for siesta-rs
//!
//! This crate contains all platform-agnostic logic for the siesta low-power
//! sensor node: the checksummed shutdown-health record store, the RTC
//! register codec and calendar arithmetic, the wake scheduling state
//! machine, and telemetry payload formatting.
//!
//! It is `#![no_std]` so it compiles on both embedded targets (ESP32-S3)
//! and desktop hosts (for the simulator and tests).

#![no_std]

pub mod config;
pub mod persist;
pub mod rtc;
pub mod telemetry;
pub mod wake;
