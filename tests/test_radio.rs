mod common;

use cc1100::{
    Deadline, Error, MarcState, PaTable, Radio, RadioConfig, Register, RegisterMap, State, Strobe,
    TestSettings,
};
use common::{NoDelay, SimChip, SimState};

#[test]
fn strobes_rejected_before_reset() {
    let mut sim = SimChip::new();
    let mut radio = Radio::new(&mut sim);

    assert_eq!(radio.start_rx(), Err(Error::NotConfigured));
    assert_eq!(radio.strobe(Strobe::Srx), Err(Error::NotConfigured));
    assert_eq!(radio.strobe(Strobe::Snop), Err(Error::NotConfigured));
    assert_eq!(radio.strobe(Strobe::Sres), Err(Error::NotConfigured));
    assert_eq!(radio.idle(), Err(Error::NotConfigured));
    assert_eq!(radio.state(), State::Uninitialized);
    drop(radio);

    assert_eq!(sim.transactions(), 0);
    assert_eq!(sim.state, SimState::Idle);
}

#[test]
fn sequencing_out_of_order_is_rejected() {
    let mut sim = SimChip::new();
    let mut delay = NoDelay::default();
    let mut radio = Radio::new(&mut sim);
    let config = RadioConfig::default();

    assert_eq!(radio.configure(&config), Err(Error::NotConfigured));
    assert_eq!(
        radio.await_ready(&mut delay, Deadline::default()),
        Err(Error::NotConfigured)
    );

    radio.reset().unwrap();
    assert_eq!(radio.state(), State::Resetting);
    assert_eq!(radio.configure(&config), Err(Error::NotConfigured));
    assert_eq!(radio.start_tx(), Err(Error::NotConfigured));

    radio.await_ready(&mut delay, Deadline::default()).unwrap();
    assert_eq!(radio.state(), State::Configuring);
    assert_eq!(radio.start_rx(), Err(Error::NotConfigured));
    assert_eq!(radio.calibrate(), Err(Error::NotConfigured));
}

#[test]
fn full_configuration_then_rx() {
    let mut sim = SimChip::new();
    let mut delay = NoDelay::default();
    let mut radio = Radio::new(&mut sim);
    let config = RadioConfig::default();

    radio.reset().unwrap();
    radio.await_ready(&mut delay, config.ready_deadline).unwrap();
    radio.configure(&config).unwrap();
    assert_eq!(radio.state(), State::Ready);

    radio.start_rx().unwrap();
    assert_eq!(radio.state(), State::Rx);
    assert_eq!(radio.marc_state().unwrap(), MarcState::Rx);

    for (register, value) in RegisterMap::DEFAULT.iter() {
        assert_eq!(radio.device_mut().read_register(register).unwrap(), value);
    }
    drop(radio);

    assert_eq!(sim.state, SimState::Rx);
    assert_eq!(sim.pa_table, [0xC0; 8]);
    for (register, value) in RegisterMap::DEFAULT.iter() {
        assert_eq!(sim.registers[register.address() as usize], value);
    }
}

#[test]
fn configuration_writes_in_address_order_before_patable() {
    let mut sim = SimChip::new();
    let mut delay = NoDelay::default();
    let mut radio = Radio::new(&mut sim);
    let config = RadioConfig {
        verify: false,
        ..RadioConfig::default()
    };

    radio.initialize(&mut delay, &config).unwrap();
    drop(radio);

    let writes: Vec<u8> = sim
        .headers
        .iter()
        .copied()
        .skip_while(|&header| header != 0x00)
        .collect();
    let expected: Vec<u8> = (0x00..=0x26).chain([0x7E]).collect();
    assert_eq!(writes, expected);
}

#[test]
fn rx_tx_idle_cycle() {
    let mut sim = SimChip::new();
    let mut delay = NoDelay::default();
    let mut radio = Radio::new(&mut sim);

    radio.initialize(&mut delay, &RadioConfig::default()).unwrap();

    radio.start_rx().unwrap();
    radio.idle().unwrap();
    assert_eq!(radio.state(), State::Idle);

    radio.device_mut().write_tx_fifo(&[0x02, 0xAB, 0xCD]).unwrap();
    radio.start_tx().unwrap();
    assert_eq!(radio.state(), State::Tx);
    radio.idle().unwrap();
    radio.flush_tx().unwrap();
    radio.flush_rx().unwrap();
    radio.calibrate().unwrap();
    assert_eq!(radio.state(), State::Idle);
    drop(radio);

    assert_eq!(sim.state, SimState::Idle);
    assert!(sim.tx_fifo.is_empty());
}

#[test]
fn verification_reports_first_mismatch() {
    let mut sim = SimChip::new();
    sim.stuck = vec![Register::Mdmcfg2.address(), Register::Agcctrl0.address()];
    let mut delay = NoDelay::default();
    let mut radio = Radio::new(&mut sim);

    assert_eq!(
        radio.initialize(&mut delay, &RadioConfig::default()),
        Err(Error::ConfigurationVerificationFailed {
            register: Register::Mdmcfg2,
            expected: 0x03,
            actual: 0x00,
        })
    );
    assert_eq!(radio.state(), State::Configuring);
    assert_eq!(radio.start_rx(), Err(Error::NotConfigured));
}

#[test]
fn test_settings_and_custom_tables() {
    let mut sim = SimChip::new();
    let mut delay = NoDelay::default();
    let mut radio = Radio::new(&mut sim);
    let pa_table = PaTable::new([0x60, 0xC0, 0, 0, 0, 0, 0, 0]);
    let config = RadioConfig {
        registers: RegisterMap::DEFAULT.with(Register::Channr, 0x07),
        test_settings: Some(TestSettings::RECOMMENDED),
        pa_table,
        ..RadioConfig::default()
    };

    radio.initialize(&mut delay, &config).unwrap();
    assert_eq!(radio.device_mut().read_pa_table().unwrap(), pa_table);
    drop(radio);

    assert_eq!(sim.registers[Register::Channr.address() as usize], 0x07);
    assert_eq!(sim.registers[Register::Fstest.address() as usize], 0x59);
    assert_eq!(sim.registers[Register::Test2.address() as usize], 0x81);
    assert_eq!(sim.registers[Register::Test1.address() as usize], 0x35);
    assert_eq!(sim.registers[Register::Test0.address() as usize], 0x0B);
}

#[test]
fn reset_timeout_leaves_radio_resetting() {
    let mut sim = SimChip::new();
    sim.busy_after_reset = u32::MAX;
    let mut delay = NoDelay::default();
    let mut radio = Radio::new(&mut sim);
    let config = RadioConfig {
        ready_deadline: Deadline::new(3, 100),
        ..RadioConfig::default()
    };

    assert_eq!(
        radio.initialize(&mut delay, &config),
        Err(Error::BusTimeout)
    );
    assert_eq!(radio.state(), State::Resetting);
    assert_eq!(radio.start_rx(), Err(Error::NotConfigured));
}

#[test]
fn sres_strobe_restarts_sequence() {
    let mut sim = SimChip::new();
    let mut delay = NoDelay::default();
    let mut radio = Radio::new(&mut sim);

    radio.initialize(&mut delay, &RadioConfig::default()).unwrap();
    radio.start_rx().unwrap();

    radio.strobe(Strobe::Sres).unwrap();
    assert_eq!(radio.state(), State::Resetting);
    assert_eq!(radio.start_rx(), Err(Error::NotConfigured));
    drop(radio);

    assert_eq!(sim.state, SimState::Idle);
}
