//! The reporting loop shared by every sensor node firmware.
//!
//! A node sleeps until a timer or an external interrupt wakes it, samples one
//! sensor, formats the reading as a line of text and sends it over a UART or
//! a LoRa link. Board bring-up and interrupt wiring stay in the firmware; the
//! interrupt handler only calls [`WakeSignal::wake`].
//!
//! # Usage
//!
//! ```ignore
//! static WAKE: WakeSignal = WakeSignal::new();
//!
//! // In the RTC interrupt handler:
//! WAKE.wake(WakeReason::Timer);
//!
//! // In main:
//! let mut sensor = Hts221::new(i2c, Delay, hts221_async::Config::default());
//! sensor.init().await?;
//! let mut node = Node::new(sensor, UartSink::new(uart), NodeConfig::default());
//! node.start().await?;
//! node.run(&WAKE).await
//! ```

#![no_std]

pub mod adapters;
pub mod node;
pub mod report;
pub mod sensor;
pub mod sink;
pub mod wake;

pub use node::{Node, NodeConfig, NodeError, REPORT_CAPACITY};
pub use report::{ClimateReport, LinkReport, MotionReport, WakeReport};
pub use sensor::Sensor;
pub use sink::{RadioSink, Sink, UartSink};
pub use wake::{WakeReason, WakeSignal};
