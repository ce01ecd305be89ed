use core::fmt;

use as3933_async::As3933;
use embassy_futures::select::select;
use embassy_futures::{block_on, yield_now};
use hal_fakes::{
    AutoIncrement, FakeDelay, FakeError, FakeI2c, FakePin, FakeSpi, FakeUart, Framing, Response,
};
use hdc2080_async::{Hdc2080, MeasurementMode};
use hts221_async::Hts221;
use lis3dhh_async::Lis3dhh;
use sensor_node::adapters::LinkMonitor;
use sensor_node::{
    Node, NodeConfig, NodeError, RadioSink, Sensor, Sink, UartSink, WakeReason, WakeReport,
    WakeSignal,
};
use sht31_async::{crc8, Address, Sht31};
use sx128x_async::radio::LoraRadio;

/// A sensor that hands out scripted readings.
struct Scripted {
    readings: Vec<Result<Line, u8>>,
}

struct Line(&'static str);

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Sensor for Scripted {
    type Reading = Line;
    type Error = u8;

    async fn sample(&mut self) -> Result<Line, u8> {
        self.readings.remove(0)
    }
}

/// A sensor that never answers.
struct Broken;

impl Sensor for Broken {
    type Reading = Line;
    type Error = u8;

    async fn sample(&mut self) -> Result<Line, u8> {
        Err(3)
    }
}

type Radio = LoraRadio<FakeSpi, FakePin, FakePin, FakePin, FakeDelay>;

/// A radio whose DIO1 line is already raised.
fn radio(spi: &FakeSpi) -> Radio {
    LoraRadio::new(
        spi.clone(),
        (FakePin::high(), FakePin::low(), FakePin::high()),
        FakeDelay::new(),
    )
}

/// Runs `node` for a few scheduler turns.
fn run_briefly<S: Sensor, K: Sink>(node: &mut Node<S, K>, wake: &WakeSignal) {
    block_on(select(node.run(wake), async {
        for _ in 0..10 {
            yield_now().await;
        }
    }));
}

fn node(readings: Vec<Result<Line, u8>>) -> (FakeUart, Node<Scripted, UartSink<FakeUart>>) {
    let uart = FakeUart::new();
    let node = Node::new(
        Scripted { readings },
        UartSink::new(uart.clone()),
        NodeConfig::default(),
    );
    (uart, node)
}

#[test]
fn wake_ups_keep_the_latest_reason() {
    let wake = WakeSignal::new();
    assert!(!wake.pending());

    wake.wake(WakeReason::Timer);
    wake.wake(WakeReason::External);

    assert!(wake.pending());
    assert_eq!(wake.missed(), 1);
    assert_eq!(block_on(wake.sleep()), WakeReason::External);
    assert!(!wake.pending());

    wake.wake(WakeReason::Timer);
    assert_eq!(block_on(wake.sleep()), WakeReason::Timer);
    assert_eq!(wake.missed(), 1);
}

#[test]
fn start_sends_the_banner() {
    let (uart, mut node) = node(vec![]);

    block_on(node.start()).unwrap();

    assert_eq!(uart.text(), "sensor-node ready\r\n");
    assert_eq!(uart.flushes(), 1);
}

#[test]
fn each_wake_up_sends_one_line() {
    let (uart, mut node) = node(vec![Ok(Line("T=21.00 C")), Ok(Line("T=21.50 C"))]);
    let wake = WakeSignal::new();

    wake.wake(WakeReason::Timer);
    assert_eq!(block_on(node.run_once(&wake)), Ok(WakeReason::Timer));
    wake.wake(WakeReason::External);
    assert_eq!(block_on(node.run_once(&wake)), Ok(WakeReason::External));

    assert_eq!(uart.text(), "T=21.00 C\r\nT=21.50 C\r\n");
    assert_eq!(uart.flushes(), 2);
    assert_eq!(node.samples(), 2);
    assert_eq!(node.failures(), 0);
}

#[test]
fn failed_rounds_are_counted() {
    let (uart, mut node) = node(vec![Err(7), Ok(Line("T=21.00 C"))]);
    let wake = WakeSignal::new();

    wake.wake(WakeReason::Timer);
    assert_eq!(block_on(node.run_once(&wake)), Err(NodeError::Sensor(7)));
    assert_eq!(uart.text(), "");

    uart.fail_next();
    wake.wake(WakeReason::Timer);
    assert_eq!(
        block_on(node.run_once(&wake)),
        Err(NodeError::Sink(FakeError::Bus))
    );

    assert_eq!(node.samples(), 0);
    assert_eq!(node.failures(), 2);
}

#[test]
fn oversized_reports_are_rejected() {
    let long = "X".repeat(200).leak();
    let (uart, mut node) = node(vec![Ok(Line(long))]);
    let wake = WakeSignal::new();

    wake.wake(WakeReason::Timer);

    assert_eq!(block_on(node.run_once(&wake)), Err(NodeError::Format));
    assert_eq!(uart.text(), "");
}

#[test]
fn uart_sink_flushes_every_line() {
    let uart = FakeUart::new();
    let mut sink = UartSink::new(uart.clone());

    block_on(sink.send(b"abc")).unwrap();
    block_on(sink.send(b"def")).unwrap();

    assert_eq!(uart.bytes(), b"abcdef");
    assert_eq!(uart.flushes(), 2);
}

#[test]
fn sht31_reports_climate() {
    let i2c = FakeI2c::new().with_command_device(0x44);
    let word = |v: u16| {
        let [msb, lsb] = v.to_be_bytes();
        vec![msb, lsb, crc8(&[msb, lsb])]
    };
    i2c.push_response(0x44, Response::Data([word(0x6666), word(0xCCCC)].concat()));
    let sht = Sht31::new(i2c, Address::Low, FakeDelay::new(), Default::default());
    let uart = FakeUart::new();
    let mut node = Node::new(sht, UartSink::new(uart.clone()), NodeConfig::default());
    let wake = WakeSignal::new();

    wake.wake(WakeReason::Timer);
    block_on(node.run_once(&wake)).unwrap();

    assert_eq!(uart.text(), "T=25.00 C RH=80.00 %\r\n");
}

#[test]
fn as3933_reports_rssi_and_rearms() {
    let spi = FakeSpi::registers(Framing::ModeBits);
    // RSSI1, RSSI3, RSSI2, false wake-up counter.
    spi.set_regs(10, &[0xEC, 0x00, 0x03, 0x02]);
    let mut rx = As3933::new(spi.clone(), FakeDelay::new(), Default::default());

    let report = block_on(rx.sample()).unwrap();

    assert_eq!(
        report,
        WakeReport {
            rssi: [12, 3, 0],
            false_wakeups: 2,
        }
    );
    assert_eq!(spi.commands(), vec![0x00]);
}

#[test]
fn run_reports_failures_over_the_sink() {
    let uart = FakeUart::new();
    let mut node = Node::new(Broken, UartSink::new(uart.clone()), NodeConfig::default());
    let wake = WakeSignal::new();

    wake.wake(WakeReason::Timer);
    run_briefly(&mut node, &wake);

    assert_eq!(uart.text(), "ERROR sensor\r\n");
    assert_eq!(node.failures(), 1);
}

#[test]
fn run_keeps_quiet_when_failure_reports_are_off() {
    let uart = FakeUart::new();
    let config = NodeConfig::default().set_report_failures(false);
    let mut node = Node::new(Broken, UartSink::new(uart.clone()), config);
    let wake = WakeSignal::new();

    wake.wake(WakeReason::Timer);
    run_briefly(&mut node, &wake);

    assert_eq!(uart.text(), "");
    assert_eq!(node.failures(), 1);
}

#[test]
fn run_sends_readings_until_idle() {
    let (uart, mut node) = node(vec![Ok(Line("T=21.00 C"))]);
    let wake = WakeSignal::new();

    wake.wake(WakeReason::External);
    run_briefly(&mut node, &wake);

    assert_eq!(uart.text(), "T=21.00 C\r\n");
    assert_eq!(node.samples(), 1);
}

#[test]
fn radio_sink_sends_one_packet_per_line() {
    let spi = FakeSpi::scripted();
    for _ in 0..4 {
        spi.push_response(&[]);
    }
    // IRQ status: TX done.
    spi.push_response(&[0, 0, 0x00, 0x01]);
    let mut node = Node::new(
        Scripted { readings: vec![] },
        RadioSink::new(radio(&spi)),
        NodeConfig::default().set_banner("hello"),
    );

    block_on(node.start()).unwrap();

    let t = spi.transactions();
    assert_eq!(t[1], [&[0x1A, 0x00][..], &b"hello\r\n"[..]].concat());
    assert_eq!(t[3][0], 0x83);
}

#[test]
fn radio_sink_reports_a_modem_timeout() {
    let spi = FakeSpi::scripted();
    for _ in 0..4 {
        spi.push_response(&[]);
    }
    // IRQ status: RX/TX timeout.
    spi.push_response(&[0, 0, 0x40, 0x00]);
    let mut sink = RadioSink::new(radio(&spi));

    assert!(matches!(
        block_on(sink.send(b"x")),
        Err(sx128x_async::SxError::Timeout)
    ));
}

#[test]
fn link_monitor_counts_packets() {
    let spi = FakeSpi::scripted();
    for _ in 0..3 {
        spi.push_response(&[]);
    }
    // RX done, then 3 bytes at 0x80, then RSSI -80 dBm and SNR 10 dB.
    spi.push_response(&[0, 0, 0x00, 0x02]);
    spi.push_response(&[]);
    spi.push_response(&[0, 0, 3, 0x80]);
    spi.push_response(&[0, 0, 0, b'a', b'b', b'c']);
    spi.push_response(&[0, 0, 0xA0, 0x28, 0, 0, 0]);
    // Second round: RX timeout.
    for _ in 0..3 {
        spi.push_response(&[]);
    }
    spi.push_response(&[0, 0, 0x40, 0x00]);
    let uart = FakeUart::new();
    let mut node = Node::new(
        LinkMonitor::new(radio(&spi)),
        UartSink::new(uart.clone()),
        NodeConfig::default(),
    );
    let wake = WakeSignal::new();
    assert!(node.sensor().last_payload().is_empty());

    wake.wake(WakeReason::Timer);
    block_on(node.run_once(&wake)).unwrap();
    wake.wake(WakeReason::Timer);
    block_on(node.run_once(&wake)).unwrap();

    assert_eq!(
        uart.text(),
        "PKT=1 RSSI=-80.0 dBm SNR=10.0 dB\r\nPKT=1 NO SIGNAL\r\n"
    );
    assert_eq!(node.sensor().last_payload(), b"abc");
}

#[test]
fn hts221_reports_climate() {
    const ADDR: u8 = 0x5F;
    let i2c = FakeI2c::new().with_register_device(ADDR, AutoIncrement::WithFlag(0x80));
    i2c.set_reg(ADDR, 0x0F, 0xBC);
    i2c.set_regs(
        ADDR,
        0x30,
        &[
            0x40, 0x9C, 0xA0, 0x18, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x10, 0x27, 0x00, 0x00,
            0xDC, 0x05,
        ],
    );
    i2c.on_write(ADDR, |regs, register, value| {
        if register == 0x21 {
            if value & 0x01 != 0 {
                regs[0x27] = 0x03;
            }
            regs[0x21] = value & !0x81;
        }
    });
    // Humidity 5000, temperature 750.
    i2c.set_regs(ADDR, 0x28, &[0x88, 0x13, 0xEE, 0x02]);
    let mut hts = Hts221::new(i2c, FakeDelay::new(), Default::default());
    block_on(hts.init()).unwrap();
    let uart = FakeUart::new();
    let mut node = Node::new(hts, UartSink::new(uart.clone()), NodeConfig::default());
    let wake = WakeSignal::new();

    wake.wake(WakeReason::External);
    block_on(node.run_once(&wake)).unwrap();

    assert_eq!(uart.text(), "T=27.50 C RH=55.00 %\r\n");
}

#[test]
fn hdc2080_temperature_only_omits_humidity() {
    const ADDR: u8 = 0x40;
    let i2c = FakeI2c::new().with_register_device(ADDR, AutoIncrement::Always);
    i2c.set_regs(ADDR, 0xFC, &[0x49, 0x54, 0xD0, 0x07]);
    i2c.on_write(ADDR, |regs, register, value| match register {
        0x0E if value & 0x80 != 0 => regs[0x0E] = 0,
        0x0F if value & 0x01 != 0 => {
            regs[0x0F] &= !0x01;
            regs[0x04] |= 0x80;
        }
        _ => {}
    });
    i2c.set_regs(ADDR, 0x00, &[0x00, 0x40]);
    let config = hdc2080_async::Config::default().set_mode(MeasurementMode::TemperatureOnly);
    let mut hdc = Hdc2080::new(i2c, hdc2080_async::Address::Low, FakeDelay::new(), config);
    block_on(hdc.init()).unwrap();

    let report = block_on(hdc.sample()).unwrap();

    assert_eq!(report.humidity, None);
    assert_eq!(report.to_string(), "T=1.25 C");
}

#[test]
fn lis3dhh_reports_motion() {
    let spi = FakeSpi::registers(Framing::MsbRead);
    spi.set_reg(0x0F, 0x11);
    spi.set_regs(0x25, &[0x00, 0x01]);
    spi.set_reg(0x27, 0x08);
    // x = 1000, y = -1000, z = 13158 LSB.
    spi.set_regs(0x28, &[0xE8, 0x03, 0x18, 0xFC, 0x66, 0x33]);
    let mut accel = Lis3dhh::new(spi, FakeDelay::new(), Default::default());

    let report = block_on(accel.sample()).unwrap();

    assert_eq!(report.to_string(), "X=0.076 Y=-0.076 Z=1.000 g T=26.0 C");
}
