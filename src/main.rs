//! hidrelay - BLE-to-USB HID relay for nRF52840.
//!
//! A phone or PC connects over BLE and writes text key commands to the
//! relay service; the device types them on the USB host as a keyboard
//! and an absolute pointer.
//!
//! ## Tasks
//!
//! - `softdevice_task` - SoftDevice event pump, feeds USB VBUS state
//! - `ble_task`        - advertising, GATT server, subscription tracking
//! - `input_task`      - inbox → parser → keyboard state → USB reports
//! - `dispatcher_task` - application events (blink, reset, recovery, clears)
//! - `usb_task`        - USB device stack
//! - `hid_writer_task` - one per HID interface, releases its ready gate
//! - `button_task`     - reset button
//! - `link_led_task`   - breathing / solid link indicator

#![no_std]
#![no_main]

mod ble;
mod ui;
mod usb;

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Level, Output, OutputDrive, Pin};
use embassy_nrf::interrupt::{self, InterruptExt, Priority};
use embassy_nrf::pwm::SimplePwm;
use embassy_nrf::usb::vbus_detect::SoftwareVbusDetect;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::Delay;
use nrf_softdevice::{raw, SocEvent, Softdevice};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use hidrelay::config::{
    BLE_ATT_MTU, BLE_DEVICE_NAME, EVENT_QUEUE_CAPACITY, REPORT_SEND_TIMEOUT_MS,
};
use hidrelay::dispatch::Dispatcher;
use hidrelay::error::Error;
use hidrelay::hid::Interface;
use hidrelay::relay::Relay;
use hidrelay::transport::{Gates, Transport};

use ble::relay_service::Server;
use ble::{ErrorNotice, Inbox};
use ui::status_led::StatusLed;
use usb::hid_device::{ReportWriter, UsbConsole, UsbDriver, UsbReportSink};

type UsbRelay = Relay<'static, CriticalSectionRawMutex, UsbReportSink, EVENT_QUEUE_CAPACITY>;

static GATES: Gates = Gates::new();
static RELAY: UsbRelay = Relay::new(Transport::new(
    &GATES,
    UsbReportSink,
    REPORT_SEND_TIMEOUT_MS,
));
static INBOX: Inbox = Channel::new();
static ERROR_NOTICE: ErrorNotice = Signal::new();
static VBUS: StaticCell<SoftwareVbusDetect> = StaticCell::new();
static SERVER: StaticCell<Server> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("hidrelay starting");

    if let Err(e) = init(spawner) {
        defmt::panic!("Initialisation failed: {}", e);
    }

    info!("hidrelay running");
}

fn init(spawner: Spawner) -> Result<(), Error> {
    // Interrupt priorities 0, 1 and 4 belong to the SoftDevice.
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(config);
    interrupt::USBD.set_priority(Priority::P2);

    let sd = Softdevice::enable(&softdevice_config());
    let server = SERVER.init(ble::init_server(sd)?);
    enable_usb_power_events()?;
    let sd: &'static Softdevice = sd;

    let vbus: &'static SoftwareVbusDetect = VBUS.init(SoftwareVbusDetect::new(false, false));
    let usb = usb::hid_device::init(p.USBD, vbus);

    let status_led = StatusLed::new(Output::new(p.P0_13, Level::High, OutputDrive::Standard));
    let link_pwm = SimplePwm::new_1ch(p.PWM0, p.P0_16);

    defmt::unwrap!(spawner.spawn(softdevice_task(sd, vbus)));
    defmt::unwrap!(spawner.spawn(usb_task(usb.device)));
    defmt::unwrap!(spawner.spawn(hid_writer_task(usb.keyboard_writer, Interface::Keyboard)));
    defmt::unwrap!(spawner.spawn(hid_writer_task(usb.pointer_writer, Interface::Pointer)));
    defmt::unwrap!(spawner.spawn(dispatcher_task(status_led, usb.console)));
    defmt::unwrap!(spawner.spawn(input_task()));
    defmt::unwrap!(spawner.spawn(ble_task(sd, server)));
    defmt::unwrap!(spawner.spawn(button_task(p.P0_11.degrade())));
    defmt::unwrap!(spawner.spawn(link_led_task(link_pwm)));

    Ok(())
}

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t {
            att_mtu: BLE_ATT_MTU,
        }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: BLE_DEVICE_NAME.as_ptr() as _,
            current_len: BLE_DEVICE_NAME.len() as u16,
            max_len: BLE_DEVICE_NAME.len() as u16,
            write_perm: unsafe { core::mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

/// Ask the SoftDevice for USB power events; it owns the POWER peripheral.
fn enable_usb_power_events() -> Result<(), Error> {
    let ret = unsafe {
        raw::sd_power_usbdetected_enable(1)
            | raw::sd_power_usbpwrrdy_enable(1)
            | raw::sd_power_usbremoved_enable(1)
    };
    if ret == raw::NRF_SUCCESS {
        Ok(())
    } else {
        Err(Error::UsbNotAvailable)
    }
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice, vbus: &'static SoftwareVbusDetect) -> ! {
    sd.run_with_callback(|event| match event {
        SocEvent::PowerUsbDetected => vbus.detected(true),
        SocEvent::PowerUsbRemoved => vbus.detected(false),
        SocEvent::PowerUsbPowerReady => vbus.ready(),
        _ => {}
    })
    .await
}

#[embassy_executor::task]
async fn ble_task(sd: &'static Softdevice, server: &'static Server) -> ! {
    ble::peripheral_loop(sd, server, &INBOX, &ERROR_NOTICE, |event| {
        RELAY.link_changed(event)
    })
    .await
}

#[embassy_executor::task]
async fn input_task() -> ! {
    let mut delay = Delay;

    loop {
        let message = INBOX.receive().await;
        let outcome = match RELAY.handle_message(&message, &mut delay).await {
            Ok(outcome) => outcome,
            Err(e) => defmt::panic!("Event queue fault: {}", e),
        };

        if let Some(e) = outcome.last_drop {
            warn!("{} report(s) dropped, last: {}", outcome.dropped, e);
        }
        if outcome.flushed_events > 0 {
            warn!("Event queue full, dropped {} events", outcome.flushed_events);
        }
        if outcome.unrecognized > 0 {
            warn!("{} unrecognized key release(s)", outcome.unrecognized);
            if RELAY.is_subscribed() {
                ERROR_NOTICE.signal(());
            }
        }
    }
}

#[embassy_executor::task]
async fn dispatcher_task(status_led: StatusLed<Output<'static>>, console: UsbConsole) -> ! {
    let mut dispatcher = Dispatcher::new(&RELAY, status_led, console, Delay);

    loop {
        let drained = dispatcher.run_once().await;
        if let Some(e) = drained.last_error {
            warn!("{} of {} events failed, last: {}", drained.failed, drained.handled, e);
        }
    }
}

#[embassy_executor::task]
async fn usb_task(device: embassy_usb::UsbDevice<'static, UsbDriver>) -> ! {
    usb::hid_device::run_usb_device(device).await
}

#[embassy_executor::task(pool_size = 2)]
async fn hid_writer_task(writer: ReportWriter, interface: Interface) -> ! {
    usb::hid_device::hid_writer_task(writer, interface, &GATES).await
}

#[embassy_executor::task]
async fn button_task(pin: embassy_nrf::gpio::AnyPin) -> ! {
    ui::buttons::reset_button_task(pin, |event| RELAY.post(event)).await
}

#[embassy_executor::task]
async fn link_led_task(pwm: SimplePwm<'static, embassy_nrf::peripherals::PWM0>) -> ! {
    ui::status_led::link_led_task(pwm, || RELAY.is_subscribed()).await
}
