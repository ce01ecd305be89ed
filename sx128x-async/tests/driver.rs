use embassy_futures::block_on;
use embassy_time::Duration;
use hal_fakes::{FakeDelay, FakePin, FakeSpi};
use sensor_bus_async::PollConfig;
use sx128x_async::conf::Config;
use sx128x_async::op::{CircuitMode, CommandStatus, RampTime};
use sx128x_async::radio::{LoraConfig, LoraRadio, Received};
use sx128x_async::{SxError, SX128x};

type Device = SX128x<FakeSpi, FakePin, FakePin, FakePin, FakeDelay>;
type Radio = LoraRadio<FakeSpi, FakePin, FakePin, FakePin, FakeDelay>;

struct Bench {
    spi: FakeSpi,
    nrst: FakePin,
    busy: FakePin,
    dio1: FakePin,
    delay: FakeDelay,
}

impl Bench {
    fn new() -> Self {
        Self {
            spi: FakeSpi::scripted(),
            nrst: FakePin::high(),
            busy: FakePin::low(),
            dio1: FakePin::low(),
            delay: FakeDelay::new(),
        }
    }

    fn device(&self) -> Device {
        SX128x::new(
            self.spi.clone(),
            (self.nrst.clone(), self.busy.clone(), self.dio1.clone()),
            self.delay.clone(),
        )
    }

    fn radio(&self) -> Radio {
        LoraRadio::from_device(self.device())
    }

    /// Queues `count` transactions that return only zeros.
    fn skip(&self, count: usize) {
        for _ in 0..count {
            self.spi.push_response(&[]);
        }
    }

    fn opcodes(&self) -> Vec<u8> {
        self.spi.transactions().iter().map(|t| t[0]).collect()
    }
}

#[test]
fn init_runs_the_lora_sequence() {
    let bench = Bench::new();
    bench.skip(11);
    bench.spi.push_response(&[0, 0, 0, 0, 0x0A]);
    bench.skip(1);
    bench.spi.push_response(&[0, 0, 0, 0, 0x05]);
    let mut device = bench.device();

    block_on(device.init(&Config::default())).unwrap();

    assert_eq!(bench.nrst.history(), vec![false, true]);
    assert_eq!(bench.delay.total_us(), 100);
    assert_eq!(
        bench.opcodes(),
        vec![0x80, 0x96, 0x8A, 0x86, 0x8F, 0x8B, 0x18, 0x18, 0x8C, 0x8E, 0x8D, 0x19, 0x18, 0x19, 0x18]
    );
    let t = bench.spi.transactions();
    assert_eq!(t[2], vec![0x8A, 0x01]);
    assert_eq!(t[3], vec![0x86, 0xB8, 0x9D, 0x89]);
    assert_eq!(t[5], vec![0x8B, 0x70, 0x18, 0x01]);
    assert_eq!(t[6], vec![0x18, 0x09, 0x25, 0x37]);
    assert_eq!(t[7], vec![0x18, 0x09, 0x3C, 0x01]);
    assert_eq!(t[8], vec![0x8C, 0x0C, 0x00, 0xFF, 0x20, 0x40, 0x00, 0x00]);
    assert_eq!(t[9], vec![0x8E, 0x12, 0x80]);
    assert_eq!(t[10], vec![0x8D, 0x40, 0x63, 0x40, 0x63, 0, 0, 0, 0]);
    // Sync word 0x12, lower nibbles kept.
    assert_eq!(t[11], vec![0x19, 0x09, 0x44, 0x00, 0x00]);
    assert_eq!(t[12], vec![0x18, 0x09, 0x44, 0x1A]);
    assert_eq!(t[14], vec![0x18, 0x09, 0x45, 0x25]);
}

#[test]
fn radio_init_applies_the_lora_config() {
    let bench = Bench::new();
    let mut radio = bench.radio();

    block_on(radio.init(&LoraConfig::default())).unwrap();

    let t = bench.spi.transactions();
    assert_eq!(t.len(), 17);
    assert_eq!(t[5], vec![0x8B, 0x90, 0x18, 0x02]);
    assert_eq!(t[9], vec![0x8E, 31, 0x80]);
    assert_eq!(t[15][..3], [0x19, 0x01, 0x53]);
    assert_eq!(t[16][0], 0xC0);

    bench.spi.clear_log();
    let config = LoraConfig {
        power_dbm: 0,
        ramp_time: RampTime::Ramp20u,
        ..LoraConfig::default()
    };
    block_on(radio.init(&config)).unwrap();

    assert_eq!(bench.spi.transactions()[9], vec![0x8E, 18, 0xE0]);
}

#[test]
fn busy_wait_is_bounded() {
    let bench = Bench::new();
    bench.busy.set_level(true);
    let mut device = bench
        .device()
        .with_busy_poll(PollConfig::new(3, Duration::from_micros(10)));

    let result = block_on(device.get_status());

    assert!(matches!(result, Err(SxError::Busy)));
    assert!(bench.spi.transactions().is_empty());
    assert_eq!(bench.delay.calls(), 3);
}

#[test]
fn commands_wait_for_busy_to_drop() {
    let bench = Bench::new();
    bench.busy.script(&[true, true, false]);
    bench.spi.push_response(&[0b010_001_00]);
    let mut device = bench.device();

    let status = block_on(device.get_status()).unwrap();

    assert_eq!(status.circuit_mode(), Some(CircuitMode::StbyRc));
    assert_eq!(status.command_status(), Some(CommandStatus::Processed));
    assert_eq!(bench.delay.calls(), 2);
    assert_eq!(bench.spi.transactions(), vec![vec![0xC0]]);
}

#[test]
fn register_helpers() {
    let bench = Bench::new();
    bench.spi.push_response(&[0, 0, 0, 0, 0xA9, 0xB5]);
    bench.spi.push_response(&[0, 0, 0, 0, 0x25]);
    let mut device = bench.device();

    assert_eq!(block_on(device.firmware_version()).unwrap(), 0xA9B5);
    block_on(device.set_high_sensitivity(true)).unwrap();

    let t = bench.spi.transactions();
    assert_eq!(t[0], vec![0x19, 0x01, 0x53, 0x00, 0x00, 0x00]);
    assert_eq!(t[1], vec![0x19, 0x08, 0x91, 0x00, 0x00]);
    assert_eq!(t[2], vec![0x18, 0x08, 0x91, 0xE5]);
}

#[test]
fn send_waits_for_tx_done() {
    let bench = Bench::new();
    bench.dio1.script(&[false, true]);
    bench.skip(4);
    bench.spi.push_response(&[0, 0, 0x00, 0x01]);
    let mut radio = bench.radio();

    block_on(radio.send(b"hi")).unwrap();

    let t = bench.spi.transactions();
    assert_eq!(t[0], vec![0x97, 0xFF, 0xFF]);
    assert_eq!(t[1], vec![0x1A, 0x00, b'h', b'i']);
    assert_eq!(t[2], vec![0x8C, 0x0C, 0x00, 0x02, 0x20, 0x40, 0x00, 0x00]);
    assert_eq!(t[3], vec![0x83, 0x02, 0x07, 0xD0]);
    assert_eq!(t[4], vec![0x15, 0x00, 0x00, 0x00]);
    assert_eq!(t[5], vec![0x97, 0xFF, 0xFF]);
    assert_eq!(t.len(), 6);
}

#[test]
fn send_reports_a_modem_timeout() {
    let bench = Bench::new();
    bench.dio1.set_level(true);
    bench.skip(4);
    bench.spi.push_response(&[0, 0, 0x40, 0x00]);
    let mut radio = bench.radio();

    assert!(matches!(block_on(radio.send(b"x")), Err(SxError::Timeout)));
}

#[test]
fn send_gives_up_when_dio1_stays_low() {
    let bench = Bench::new();
    let mut radio = bench.radio();
    let config = LoraConfig {
        done_poll: PollConfig::new(2, Duration::from_millis(10)),
        ..LoraConfig::default()
    };
    block_on(radio.init(&config)).unwrap();
    bench.spi.clear_log();
    let calls_before = bench.delay.calls();

    assert!(matches!(block_on(radio.send(b"x")), Err(SxError::Timeout)));
    assert_eq!(bench.delay.calls() - calls_before, 2);
    // No IRQ status read after giving up.
    assert_eq!(bench.opcodes(), vec![0x97, 0x1A, 0x8C, 0x83]);
}

#[test]
fn send_rejects_oversized_payloads() {
    let bench = Bench::new();
    let mut radio = bench.radio();

    let payload = [0u8; 256];
    assert!(matches!(
        block_on(radio.send(&payload)),
        Err(SxError::PayloadTooLarge)
    ));
    assert!(bench.spi.transactions().is_empty());
}

#[test]
fn receive_reads_the_packet() {
    let bench = Bench::new();
    bench.dio1.set_level(true);
    bench.skip(3);
    bench.spi.push_response(&[0, 0, 0x00, 0x02]);
    bench.skip(1);
    bench.spi.push_response(&[0, 0, 3, 0x80]);
    bench.spi.push_response(&[0, 0, 0, b'a', b'b', b'c']);
    bench.spi.push_response(&[0, 0, 0xA0, 0x28, 0, 0, 0]);
    let mut radio = bench.radio();
    let mut buf = [0u8; 16];

    let received = block_on(radio.receive(&mut buf)).unwrap();

    assert_eq!(
        received,
        Some(Received {
            len: 3,
            rssi: -80.0,
            snr: 10.0
        })
    );
    assert_eq!(&buf[..3], b"abc");
    let t = bench.spi.transactions();
    assert_eq!(t[1], vec![0x8C, 0x0C, 0x00, 0xFF, 0x20, 0x40, 0x00, 0x00]);
    assert_eq!(t[2], vec![0x82, 0x02, 0x13, 0x88]);
    assert_eq!(t[6], vec![0x1B, 0x80, 0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn receive_timeout_and_crc_error_yield_nothing() {
    let bench = Bench::new();
    bench.dio1.set_level(true);
    let mut radio = bench.radio();
    let mut buf = [0u8; 16];

    bench.skip(3);
    bench.spi.push_response(&[0, 0, 0x40, 0x00]);
    assert_eq!(block_on(radio.receive(&mut buf)).unwrap(), None);

    bench.skip(2);
    bench.spi.push_response(&[]);
    bench.spi.push_response(&[0, 0, 0x00, 0x42]);
    assert_eq!(block_on(radio.receive(&mut buf)).unwrap(), None);
}

#[test]
fn receive_rejects_a_short_buffer() {
    let bench = Bench::new();
    bench.dio1.set_level(true);
    bench.skip(3);
    bench.spi.push_response(&[0, 0, 0x00, 0x02]);
    bench.skip(1);
    bench.spi.push_response(&[0, 0, 3, 0x00]);
    let mut radio = bench.radio();
    let mut buf = [0u8; 2];

    assert!(matches!(
        block_on(radio.receive(&mut buf)),
        Err(SxError::PayloadTooLarge)
    ));
}

#[test]
fn sleep_and_wake() {
    let bench = Bench::new();
    let mut radio = bench.radio();

    block_on(radio.sleep()).unwrap();
    block_on(radio.wake()).unwrap();

    assert_eq!(
        bench.spi.transactions(),
        vec![vec![0x84, 0x01], vec![0xC0], vec![0x80, 0x00]]
    );
}

#[test]
fn spi_errors_are_reported() {
    let bench = Bench::new();
    bench.spi.fail_next();
    let mut device = bench.device();

    assert!(matches!(
        block_on(device.set_fs()),
        Err(SxError::Spi(_))
    ));
}
