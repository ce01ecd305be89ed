use as3933_async::{As3933, Channel, Channels, ClockSource, Config, Error};
use embassy_futures::block_on;
use hal_fakes::{FakeDelay, FakeSpi, Framing};
use sensor_bus_async::PollConfig;

/// An AS3933 whose RC oscillator calibration succeeds with `taps`.
fn receiver(cal_result: u8) -> FakeSpi {
    let fake = FakeSpi::registers(Framing::ModeBits);
    fake.on_command(move |regs, code| match code {
        0x04 => {
            regs[..20].fill(0);
            regs[7] = 0x2B;
        }
        0x02 => regs[14] = cal_result,
        _ => {}
    });
    fake
}

fn driver(fake: &FakeSpi, config: Config) -> As3933<FakeSpi, FakeDelay> {
    As3933::new(fake.clone(), FakeDelay::new(), config)
}

#[test]
fn init_presets_configures_and_calibrates() {
    let fake = receiver(0x40 | 0x15);
    let mut rx = driver(&fake, Config::default().set_tuning([3, 4, 5]));

    block_on(rx.init()).unwrap();

    assert_eq!(fake.commands(), vec![0x04, 0x02, 0x00]);
    assert_eq!(fake.transactions()[0], vec![0xC4]);
    assert_eq!(fake.transactions()[1], vec![0x00, 0x0E, 0x02, 0x00, 0x00, 0x00]);
    assert_eq!(fake.reg(5), 0x96);
    assert_eq!(fake.reg(6), 0x69);
    assert_eq!(fake.reg(7), 0x2B);
    assert_eq!([fake.reg(17), fake.reg(18), fake.reg(19)], [3, 4, 5]);
}

#[test]
fn crystal_clock_skips_calibration() {
    let fake = receiver(0x00);
    let mut rx = driver(&fake, Config::default().set_clock(ClockSource::Crystal));

    block_on(rx.init()).unwrap();

    assert_eq!(fake.commands(), vec![0x04, 0x00]);
    assert_eq!(fake.reg(1) & 0x01, 0x01);
}

#[test]
fn failed_calibration_is_reported() {
    let fake = receiver(0x80);
    let mut rx = driver(&fake, Config::default());

    assert_eq!(block_on(rx.init()), Err(Error::Calibration));
}

#[test]
fn calibration_wait_is_bounded() {
    let fake = receiver(0x00);
    let delay = FakeDelay::new();
    let config = Config::default().set_poll(PollConfig::default().with_attempts(3));
    let mut rx = As3933::new(fake, delay.clone(), config);

    assert_eq!(block_on(rx.calibrate_rc_oscillator()), Err(Error::Timeout));
    assert_eq!(delay.calls(), 3);
}

#[test]
fn calibration_returns_the_taps() {
    let fake = receiver(0x40 | 0x21);
    let mut rx = driver(&fake, Config::default());

    assert_eq!(block_on(rx.calibrate_rc_oscillator()), Ok(0x21));
}

#[test]
fn invalid_configuration_touches_nothing() {
    let fake = receiver(0x40);
    let mut rx = driver(&fake, Config::default().set_bit_duration(40));

    assert_eq!(block_on(rx.init()), Err(Error::InvalidConfig));
    assert!(fake.transactions().is_empty());
}

#[test]
fn rssi_registers_are_out_of_order() {
    let fake = receiver(0x40);
    fake.set_regs(10, &[0x25, 0x03, 0x11]);
    let mut rx = driver(&fake, Config::default());

    let rssi = block_on(rx.rssi()).unwrap();

    assert_eq!((rssi.ch1, rssi.ch2, rssi.ch3), (5, 17, 3));
    assert_eq!(fake.last_transaction().unwrap(), vec![0x4A, 0, 0, 0]);
}

#[test]
fn channel_and_tuning_updates() {
    let fake = receiver(0x40);
    fake.set_reg(0, 0x8E);
    let mut rx = driver(&fake, Config::default());

    block_on(rx.set_channels(Channels {
        ch1: true,
        ch2: false,
        ch3: false,
    }))
    .unwrap();
    block_on(rx.set_tuning_capacitance(Channel::Ch3, 12)).unwrap();

    assert_eq!(fake.reg(0), 0x82);
    assert_eq!(fake.reg(19), 12);
    assert_eq!(
        block_on(rx.set_tuning_capacitance(Channel::Ch1, 32)),
        Err(Error::InvalidConfig)
    );
}

#[test]
fn lc_oscillator_routing() {
    let fake = receiver(0x40);
    let mut rx = driver(&fake, Config::default());

    block_on(rx.route_lc_oscillator(Some(Channel::Ch2))).unwrap();
    assert_eq!(fake.reg(16), 0x82);
    block_on(rx.route_lc_oscillator(None)).unwrap();
    assert_eq!(fake.reg(16), 0x00);
}

#[test]
fn wake_handling_commands() {
    let fake = receiver(0x40);
    fake.set_reg(13, 7);
    let mut rx = driver(&fake, Config::default());

    assert_eq!(block_on(rx.false_wakeups()), Ok(7));
    block_on(rx.clear_false_wakeups()).unwrap();
    block_on(rx.reset_rssi()).unwrap();
    block_on(rx.clear_wake()).unwrap();

    assert_eq!(fake.commands(), vec![0x03, 0x01, 0x00]);
}
