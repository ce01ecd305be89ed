use std::rc::Rc;

use embassy_futures::block_on;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::rwlock::RwLock;
use embedded_hal_async::i2c::I2c;
use embedded_hal_async::spi::SpiDevice;
use hal_fakes::{AutoIncrement, FakeDelay, FakeError, FakeI2c, FakePin, FakeSpiBus, I2cEvent};
use sensor_bus_async::i2c::SharedI2c;
use sensor_bus_async::spi::{ChipSelect, DeviceError, SharedSpiDevice};

#[test]
fn i2c_handles_share_one_bus() {
    let fake = FakeI2c::new()
        .with_register_device(0x40, AutoIncrement::Always)
        .with_register_device(0x44, AutoIncrement::Always);
    fake.set_reg(0x40, 0x0F, 0xD0);
    fake.set_reg(0x44, 0x01, 0x55);

    let bus = Rc::new(RwLock::<NoopRawMutex, _>::new(fake.clone()));
    let mut first = SharedI2c::new(bus.clone());
    let mut second = first.clone();

    let mut a = [0u8; 1];
    let mut b = [0u8; 1];
    block_on(first.write_read(0x40, &[0x0F], &mut a)).unwrap();
    block_on(second.write_read(0x44, &[0x01], &mut b)).unwrap();

    assert_eq!(a, [0xD0]);
    assert_eq!(b, [0x55]);
    assert_eq!(fake.log().len(), 4);
}

#[test]
fn i2c_errors_are_passed_through() {
    let fake = FakeI2c::new();
    let bus = Rc::new(RwLock::<NoopRawMutex, _>::new(fake.clone()));
    let mut i2c = SharedI2c::new(bus);

    assert_eq!(block_on(i2c.write(0x10, &[0x00])), Err(FakeError::Nack));
    assert!(fake.log().is_empty());
}

#[test]
fn spi_cs_frames_each_transaction() {
    let fake = FakeSpiBus::new();
    fake.push_miso(&[0x00, 0x11]);
    let cs = FakePin::low();
    let bus = Rc::new(RwLock::<NoopRawMutex, _>::new(fake.clone()));

    let mut device = SharedSpiDevice::new(bus, cs.clone(), FakeDelay::new()).unwrap();
    assert_eq!(cs.history(), vec![true]);

    let mut buf = [0u8; 1];
    block_on(device.transaction(&mut [
        embedded_hal::spi::Operation::Write(&[0x8F]),
        embedded_hal::spi::Operation::Read(&mut buf),
    ]))
    .unwrap();

    assert_eq!(buf, [0x11]);
    assert_eq!(fake.written(), vec![0x8F, 0x00]);
    assert_eq!(cs.history(), vec![true, false, true]);
    assert_eq!(fake.flushes(), 1);
}

#[test]
fn spi_active_high_cs_is_inverted() {
    let cs = FakePin::high();
    let bus = Rc::new(RwLock::<NoopRawMutex, _>::new(FakeSpiBus::new()));
    let mut device =
        SharedSpiDevice::with_polarity(bus, cs.clone(), FakeDelay::new(), ChipSelect::ActiveHigh)
            .unwrap();

    block_on(device.write(&[0xC4])).unwrap();

    assert_eq!(cs.history(), vec![false, true, false]);
}

#[test]
fn spi_cs_is_released_after_a_bus_error() {
    let fake = FakeSpiBus::new();
    let cs = FakePin::low();
    let bus = Rc::new(RwLock::<NoopRawMutex, _>::new(fake.clone()));
    let mut device = SharedSpiDevice::new(bus, cs.clone(), FakeDelay::new()).unwrap();

    fake.fail_next();
    let result = block_on(device.write(&[0x01, 0x02]));

    assert_eq!(result, Err(DeviceError::Spi(FakeError::Bus)));
    assert!(cs.level());
    assert!(fake.written().is_empty());
}

#[test]
fn spi_delay_operations_use_the_device_delay() {
    let delay = FakeDelay::new();
    let bus = Rc::new(RwLock::<NoopRawMutex, _>::new(FakeSpiBus::new()));
    let mut device = SharedSpiDevice::new(bus, FakePin::low(), delay.clone()).unwrap();

    block_on(device.transaction(&mut [embedded_hal::spi::Operation::DelayNs(1_500)])).unwrap();

    assert_eq!(delay.total_ns(), 1_500);
}

#[test]
fn i2c_log_records_frames() {
    let fake = FakeI2c::new().with_register_device(0x5F, AutoIncrement::Always);
    let bus = Rc::new(RwLock::<NoopRawMutex, _>::new(fake.clone()));
    let mut i2c = SharedI2c::new(bus);

    block_on(i2c.write(0x5F, &[0x20, 0x85])).unwrap();

    assert_eq!(
        fake.log(),
        vec![I2cEvent::Write {
            address: 0x5F,
            bytes: vec![0x20, 0x85]
        }]
    );
    assert_eq!(fake.reg(0x5F, 0x20), 0x85);
}
