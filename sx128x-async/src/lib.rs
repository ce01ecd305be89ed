//! An asynchronous, `no_std` driver for the Semtech SX1280/SX1281 2.4 GHz
//! LoRa transceivers.
//!
//! The low-level [`SX128x`] struct wraps the SPI command protocol: every
//! command is an opcode followed by its parameters, the BUSY pin must be low
//! before a command is sent, and the first MISO byte of every transfer is the
//! radio [`Status`](op::Status). Waiting on BUSY is bounded by a
//! [`PollConfig`](sensor_bus_async::PollConfig).
//!
//! [`radio::LoraRadio`] builds a send/receive interface on top of it.
//!
//! # Usage
//!
//! ```ignore
//! let mut radio = LoraRadio::new(spi, (nrst, busy, dio1), Delay);
//! radio.init(&LoraConfig::default()).await?;
//! radio.send(b"hello").await?;
//! ```

#![no_std]

pub mod conf;
pub mod op;
pub mod radio;
pub mod reg;

mod sx;
pub use sx::*;
