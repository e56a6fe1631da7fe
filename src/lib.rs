//! Bridges a USB HID code scanner to an MQTT broker.
//!
//! The scanner enumerates as a keyboard. Every keystroke arrives as an input report whose third
//! byte is the keycode; the keycodes are translated to characters and collected until the scanner
//! sends Enter, and the completed scan is published on a fixed topic.
//!
//! The scanner and the broker connection fail independently. A scanner that is unplugged is
//! looked for again once per second, a broken broker connection is re-established right away,
//! and neither side waits for the other.

pub mod assembler;
pub mod broker;
pub mod config;
pub mod constants;
pub mod devices;
pub mod error;
pub mod keycode;
pub mod locator;
pub mod server;
pub mod supervisor;
pub mod tools;
