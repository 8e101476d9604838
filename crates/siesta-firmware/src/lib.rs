//! ESP32-S3 firmware-specific modules for siesta-rs
//!
//! This crate contains hardware-specific code that cannot compile on desktop
//! targets: the RTC-fast-memory record slot, the wall clock and deep-sleep
//! executor, Wi-Fi bring-up and the HTTP/SNTP network plumbing, and concrete
//! sensor drivers.

#![no_std]

pub mod health_slot;
pub mod net;
pub mod sensors;
pub mod system_clock;
pub mod wifi_secrets;
