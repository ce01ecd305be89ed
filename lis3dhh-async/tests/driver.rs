use embassy_futures::block_on;
use hal_fakes::{FakeDelay, FakeSpi, Framing};
use lis3dhh_async::{
    Config, Error, FifoConfig, FifoMode, InterruptRouting, Lis3dhh, RawAcceleration, SelfTest,
};
use sensor_bus_async::PollConfig;

fn sensor() -> FakeSpi {
    let fake = FakeSpi::registers(Framing::MsbRead);
    fake.set_reg(0x0F, 0x11);
    fake.set_reg(0x23, 0x01);
    fake.on_write(|regs, register, value| {
        if register == 0x20 {
            regs[0x20] = value & !0x0C;
        }
    });
    fake
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn init_writes_the_configuration() {
    let fake = sensor();
    let config = Config::default()
        .set_int1(
            InterruptRouting {
                data_ready: true,
                ..Default::default()
            },
            true,
        )
        .set_fifo(Some(FifoConfig {
            mode: FifoMode::Fifo,
            threshold: 16,
            high_speed_spi: true,
        }));
    let mut accel = Lis3dhh::new(fake.clone(), FakeDelay::new(), config);

    block_on(accel.init()).unwrap();

    assert_eq!(fake.reg(0x20), 0xC1);
    assert_eq!(fake.reg(0x21), 0x80);
    assert_eq!(fake.reg(0x22), 0x00);
    assert_eq!(fake.reg(0x23), 0x07);
    assert_eq!(fake.reg(0x24), 0x01);
    assert_eq!(fake.reg(0x2E), 0x30);
    assert_eq!(fake.transactions()[0], vec![0x8F, 0x00]);
}

#[test]
fn init_rejects_a_foreign_device() {
    let fake = sensor();
    fake.set_reg(0x0F, 0x33);
    let mut accel = Lis3dhh::new(fake, FakeDelay::new(), Config::default());

    assert_eq!(block_on(accel.init()), Err(Error::InvalidDevice(0x33)));
}

#[test]
fn acceleration_waits_for_data() {
    let fake = sensor();
    fake.set_reg(0x27, 0x08);
    // x = 1000, y = -1000, z = 13158 LSB.
    fake.set_regs(0x28, &[0xE8, 0x03, 0x18, 0xFC, 0x66, 0x33]);
    let mut accel = Lis3dhh::new(fake.clone(), FakeDelay::new(), Config::default());

    let a = block_on(accel.acceleration()).unwrap();

    assert!(close(a.x, 0.076));
    assert!(close(a.y, -0.076));
    assert!((a.z - 1.0).abs() < 1e-3);
    assert_eq!(fake.last_transaction().unwrap(), vec![0xA8, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn data_wait_is_bounded() {
    let fake = sensor();
    let delay = FakeDelay::new();
    let config = Config::default().set_poll(PollConfig::default().with_attempts(2));
    let mut accel = Lis3dhh::new(fake, delay.clone(), config);

    assert_eq!(block_on(accel.acceleration()), Err(Error::Timeout));
    assert_eq!(delay.calls(), 2);
}

#[test]
fn reset_and_reboot_wait_for_self_clearing_bits() {
    let fake = sensor();
    fake.set_reg(0x20, 0xC1);
    let mut accel = Lis3dhh::new(fake.clone(), FakeDelay::new(), Config::default());

    block_on(accel.reset()).unwrap();
    block_on(accel.reboot()).unwrap();

    assert_eq!(fake.reg(0x20), 0xC1);
    let writes: Vec<_> = fake
        .transactions()
        .into_iter()
        .filter(|t| t[0] == 0x20)
        .collect();
    assert_eq!(writes, vec![vec![0x20, 0xC5], vec![0x20, 0xC9]]);
}

#[test]
fn stuck_reset_times_out() {
    let fake = FakeSpi::registers(hal_fakes::Framing::MsbRead);
    let config = Config::default().set_poll(PollConfig::default().with_attempts(1));
    let mut accel = Lis3dhh::new(fake, FakeDelay::new(), config);

    assert_eq!(block_on(accel.reset()), Err(Error::Timeout));
}

#[test]
fn power_mode_and_self_test_keep_other_bits() {
    let fake = sensor();
    fake.set_reg(0x20, 0xC1);
    let mut accel = Lis3dhh::new(fake.clone(), FakeDelay::new(), Config::default());

    block_on(accel.set_enabled(false)).unwrap();
    block_on(accel.set_self_test(SelfTest::Negative)).unwrap();

    assert_eq!(fake.reg(0x20), 0x41);
    assert_eq!(fake.reg(0x23), 0x21);
}

#[test]
fn temperature_and_fifo() {
    let fake = sensor();
    fake.set_regs(0x25, &[0x00, 0x01]);
    fake.set_reg(0x2F, 0x83);
    fake.set_regs(0x28, &[0x01, 0x00, 0x02, 0x00, 0x03, 0x00]);
    let mut accel = Lis3dhh::new(fake, FakeDelay::new(), Config::default());

    assert_eq!(block_on(accel.temperature()).unwrap(), 26.0);

    let status = block_on(accel.fifo_status()).unwrap();
    assert!(status.threshold_reached);
    assert_eq!(status.samples, 3);

    let mut samples = [RawAcceleration::default(); 2];
    assert_eq!(block_on(accel.read_fifo(&mut samples)).unwrap(), 2);
    assert_eq!(samples[1], RawAcceleration { x: 1, y: 2, z: 3 });
}
