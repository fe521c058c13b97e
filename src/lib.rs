#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Hsv`**: Integer color (hue `0..=239`, saturation and value `0..=255`)
//! - **`Rgb24`**: Packed strip color, blue in the high byte and red in the low byte
//! - **`ColorAnimator`**: Steps the displayed color toward the target one unit per channel per tick
//! - **`LedStrip`**: Trait to implement for your strip hardware
//! - **`ClockedStrip`**: Two-wire (data + clock) strip driver built on `embedded-hal` pins
//! - **`Command`**: The `S hhhhhh` serial command grammar
//! - **`FrameScanner`**: Finds `Wx|`-framed commands in a UART byte stream
//! - **`RadioQueue`**: Trait to implement for your radio packet queue
//! - **`SyncPacket`**: The seven byte color broadcast
//! - **`Node`**: Ties everything together and runs one main-loop pass per `service` call
//! - **`TimeSource`**: Trait to implement for your timing system
//!
//! A node starts as a peer that follows whatever color a coordinator broadcasts.
//! The first framed UART command turns it into the coordinator for good.

#[macro_use]
mod fmt;

pub mod time;
pub mod colors;
pub mod strip;
pub mod animation;
pub mod command;
pub mod framing;
pub mod radio;
pub mod node;

pub use animation::ColorAnimator;
pub use colors::{HUE_MAX, Hsv, Rgb24, hsv_to_rgb};
pub use command::{COMMAND_LEN, Command, CommandBuffer, LineReader};
pub use framing::{FrameScanner, ScanState};
pub use node::{Node, NodeConfig, Role, ServiceReport};
pub use radio::{BroadcastOutcome, Broadcaster, PacketError, RadioQueue, SyncPacket};
pub use strip::{ClockedStrip, DEFAULT_STRIP_LENGTH, LedStrip, RgbFrame, StripError};
pub use time::{Millis, MillisDuration, TimeDuration, TimeInstant, TimeSource};
