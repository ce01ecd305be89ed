use embassy_futures::block_on;
use hal_fakes::{AutoIncrement, FakeDelay, FakeError, FakeI2c};
use hts221_async::{Config, Error, Hts221, OutputDataRate, HTS221_I2C_ADDR};
use sensor_bus_async::PollConfig;

const ADDR: u8 = HTS221_I2C_ADDR;

const TABLE: [u8; 16] = [
    0x40, 0x9C, 0xA0, 0x18, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x10, 0x27, 0x00, 0x00, 0xDC, 0x05,
];

/// An HTS221 that finishes a one-shot conversion as soon as it is started.
fn sensor() -> FakeI2c {
    let fake = FakeI2c::new().with_register_device(ADDR, AutoIncrement::WithFlag(0x80));
    fake.set_reg(ADDR, 0x0F, 0xBC);
    fake.set_regs(ADDR, 0x30, &TABLE);
    fake.on_write(ADDR, |regs, register, value| {
        if register == 0x21 {
            if value & 0x01 != 0 {
                regs[0x27] = 0x03;
            }
            regs[0x21] = value & !0x81;
        }
    });
    fake
}

#[test]
fn init_configures_the_sensor() {
    let fake = sensor();
    let mut hts = Hts221::new(fake.clone(), FakeDelay::new(), Config::default());

    block_on(hts.init()).unwrap();

    assert_eq!(fake.reg(ADDR, 0x10), 0x1B);
    assert_eq!(fake.reg(ADDR, 0x20), 0x84);
    assert_eq!(fake.reg(ADDR, 0x22), 0x00);
    assert_eq!(block_on(hts.calibration()).unwrap().t1_degc, 35.0);
}

#[test]
fn init_rejects_a_foreign_device() {
    let fake = sensor();
    fake.set_reg(ADDR, 0x0F, 0x33);
    let mut hts = Hts221::new(fake, FakeDelay::new(), Config::default());

    assert_eq!(block_on(hts.init()), Err(Error::InvalidDevice(0x33)));
}

#[test]
fn init_rejects_a_blank_calibration() {
    let fake = sensor();
    fake.set_regs(ADDR, 0x30, &[0; 16]);
    let mut hts = Hts221::new(fake, FakeDelay::new(), Config::default());

    assert_eq!(block_on(hts.init()), Err(Error::InvalidCalibration));
}

#[test]
fn one_shot_measurement() {
    let fake = sensor();
    // Humidity 5000, temperature 750.
    fake.set_regs(ADDR, 0x28, &[0x88, 0x13, 0xEE, 0x02]);
    let mut hts = Hts221::new(fake.clone(), FakeDelay::new(), Config::default());
    block_on(hts.init()).unwrap();

    let sample = block_on(hts.measure()).unwrap();

    assert_eq!(sample.humidity, 55.0);
    assert_eq!(sample.temperature, 27.5);
    assert_eq!(fake.reg(ADDR, 0x21) & 0x01, 0);
}

#[test]
fn continuous_mode_does_not_trigger() {
    let fake = sensor();
    fake.set_reg(ADDR, 0x27, 0x03);
    let config = Config::default().set_data_rate(OutputDataRate::Hz1);
    let mut hts = Hts221::new(fake.clone(), FakeDelay::new(), config);
    block_on(hts.init()).unwrap();
    fake.clear_log();

    block_on(hts.measure()).unwrap();

    assert!(fake.writes_to(ADDR).iter().all(|frame| frame[0] != 0x21));
    assert_eq!(fake.reg(ADDR, 0x20), 0x85);
}

#[test]
fn missing_data_times_out() {
    let fake = sensor();
    let delay = FakeDelay::new();
    let config = Config::default()
        .set_data_rate(OutputDataRate::Hz7)
        .set_poll(PollConfig::default().with_attempts(5));
    let mut hts = Hts221::new(fake, delay.clone(), config);
    block_on(hts.init()).unwrap();

    assert_eq!(block_on(hts.measure()), Err(Error::Timeout));
    assert_eq!(delay.calls(), 5);
}

#[test]
fn heater_and_power_down_keep_other_bits() {
    let fake = sensor();
    let mut hts = Hts221::new(fake.clone(), FakeDelay::new(), Config::default());
    block_on(hts.init()).unwrap();

    block_on(hts.set_heater(true)).unwrap();
    assert_eq!(fake.reg(ADDR, 0x21), 0x02);
    block_on(hts.power_down()).unwrap();
    assert_eq!(fake.reg(ADDR, 0x20), 0x04);
}

#[test]
fn reboot_waits_for_boot_to_clear() {
    let fake = sensor();
    let mut hts = Hts221::new(fake.clone(), FakeDelay::new(), Config::default());

    block_on(hts.reboot()).unwrap();

    assert_eq!(fake.reg(ADDR, 0x21) & 0x80, 0);
}

#[test]
fn bus_errors_are_wrapped() {
    let fake = sensor();
    let mut hts = Hts221::new(fake.clone(), FakeDelay::new(), Config::default());

    fake.fail_next(FakeError::Bus);
    assert_eq!(block_on(hts.status()), Err(Error::Bus(FakeError::Bus)));
}
