//! The sleep, sample, report loop.

use core::fmt::{Debug, Write as _};

use heapless::String;
use log::{debug, error, trace, warn};

use crate::sensor::Sensor;
use crate::sink::Sink;
use crate::wake::{WakeReason, WakeSignal};

/// Longest report line, including the trailing `\r\n`.
pub const REPORT_CAPACITY: usize = 128;

const LINE_END: &str = "\r\n";

/// Node behaviour.
#[derive(Debug, Clone, Copy)]
pub struct NodeConfig {
    /// Line sent once by [`Node::start`].
    pub banner: &'static str,
    /// Send an `ERROR ...` line when a round fails.
    pub report_failures: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            banner: "sensor-node ready",
            report_failures: true,
        }
    }
}

impl NodeConfig {
    pub fn set_banner(mut self, banner: &'static str) -> Self {
        self.banner = banner;
        self
    }

    pub fn set_report_failures(mut self, report_failures: bool) -> Self {
        self.report_failures = report_failures;
        self
    }
}

/// A failed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeError<SE, KE> {
    /// The sensor could not be read.
    Sensor(SE),
    /// The report could not be sent.
    Sink(KE),
    /// The report does not fit [`REPORT_CAPACITY`].
    Format,
}

/// One sensor reporting to one sink.
pub struct Node<S, K> {
    sensor: S,
    sink: K,
    config: NodeConfig,
    samples: u32,
    failures: u32,
}

impl<S: Sensor, K: Sink> Node<S, K> {
    pub fn new(sensor: S, sink: K, config: NodeConfig) -> Self {
        Self {
            sensor,
            sink,
            config,
            samples: 0,
            failures: 0,
        }
    }

    /// Sends the banner line.
    pub async fn start(&mut self) -> Result<(), NodeError<S::Error, K::Error>> {
        let mut line: String<REPORT_CAPACITY> = String::new();
        write!(line, "{}{LINE_END}", self.config.banner).map_err(|_| NodeError::Format)?;
        self.sink
            .send(line.as_bytes())
            .await
            .map_err(NodeError::Sink)
    }

    /// Sleeps until woken, then samples and sends one report.
    pub async fn run_once(
        &mut self,
        wake: &WakeSignal,
    ) -> Result<WakeReason, NodeError<S::Error, K::Error>> {
        let reason = wake.sleep().await;
        trace!("node: woken by {reason:?}");
        match self.report().await {
            Ok(()) => {
                self.samples = self.samples.wrapping_add(1);
                Ok(reason)
            }
            Err(err) => {
                self.failures = self.failures.wrapping_add(1);
                Err(err)
            }
        }
    }

    /// Runs forever. Failed rounds are logged and, if configured, reported
    /// over the sink; the loop always goes back to sleep.
    pub async fn run(&mut self, wake: &WakeSignal) -> ! {
        loop {
            if let Err(err) = self.run_once(wake).await {
                error!("node: round failed: {err:?}");
                if self.config.report_failures {
                    self.report_failure(&err).await;
                }
            }
            let missed = wake.missed();
            if missed > 0 {
                debug!("node: {missed} wake-ups missed so far");
            }
        }
    }

    /// Rounds that produced and sent a report.
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Rounds that failed.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn sensor(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn release(self) -> (S, K) {
        (self.sensor, self.sink)
    }

    async fn report(&mut self) -> Result<(), NodeError<S::Error, K::Error>> {
        let reading = self.sensor.sample().await.map_err(NodeError::Sensor)?;
        let mut line: String<REPORT_CAPACITY> = String::new();
        write!(line, "{reading}{LINE_END}").map_err(|_| NodeError::Format)?;
        trace!("node: report {line}");
        self.sink
            .send(line.as_bytes())
            .await
            .map_err(NodeError::Sink)
    }

    async fn report_failure(&mut self, err: &NodeError<S::Error, K::Error>) {
        let kind = match err {
            NodeError::Sensor(_) => "sensor",
            NodeError::Sink(_) => "sink",
            NodeError::Format => "format",
        };
        let mut line: String<REPORT_CAPACITY> = String::new();
        if write!(line, "ERROR {kind}{LINE_END}").is_err() {
            return;
        }
        if let Err(err) = self.sink.send(line.as_bytes()).await {
            warn!("node: failure report not sent: {err:?}");
        }
    }
}
