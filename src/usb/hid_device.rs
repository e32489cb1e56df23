//! USB composite device - keyboard + absolute pointer + CDC-ACM console.
//!
//! Initialises the Embassy USB stack on the nRF52840 hardware USB
//! peripheral and exposes two HID endpoints plus a serial console.

use defmt::{info, warn};
use embassy_nrf::usb::vbus_detect::SoftwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::{self, bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{with_timeout, Duration};
use embassy_usb::class::cdc_acm::{CdcAcmClass, State as CdcState};
use embassy_usb::class::hid::{Config as HidConfig, HidWriter, State};
use embassy_usb::{Builder, Config, UsbDevice};
use static_cell::StaticCell;

use hidrelay::config;
use hidrelay::dispatch::Console;
use hidrelay::error::Error;
use hidrelay::hid::keyboard::KEYBOARD_REPORT_DESCRIPTOR;
use hidrelay::hid::pointer::POINTER_REPORT_DESCRIPTOR;
use hidrelay::hid::{HidReport, Interface, MAX_REPORT_SIZE};
use hidrelay::transport::{Gates, ReportSink};

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
});

/// VBUS state is fed from SoftDevice power events; the SoftDevice owns
/// the POWER peripheral.
pub type UsbDriver = Driver<'static, peripherals::USBD, &'static SoftwareVbusDetect>;

/// HID endpoint packet size.
const HID_PACKET_SIZE: usize = 8;

/// CDC-ACM bulk packet size.
const CDC_PACKET_SIZE: u16 = 64;

pub type ReportWriter = HidWriter<'static, UsbDriver, HID_PACKET_SIZE>;

static KB_STATE: StaticCell<State> = StaticCell::new();
static POINTER_STATE: StaticCell<State> = StaticCell::new();
static CDC_STATE: StaticCell<CdcState> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();

/// One outstanding report per interface; the ready gate guarantees the
/// slot is empty whenever a report is submitted.
static KEYBOARD_SLOT: Channel<CriticalSectionRawMutex, HidReport, 1> = Channel::new();
static POINTER_SLOT: Channel<CriticalSectionRawMutex, HidReport, 1> = Channel::new();

fn slot(interface: Interface) -> &'static Channel<CriticalSectionRawMutex, HidReport, 1> {
    match interface {
        Interface::Keyboard => &KEYBOARD_SLOT,
        Interface::Pointer => &POINTER_SLOT,
    }
}

/// Hands reports to the writer task of their interface.
pub struct UsbReportSink;

impl ReportSink for UsbReportSink {
    fn submit(&self, report: HidReport) -> Result<(), Error> {
        slot(report.interface())
            .try_send(report)
            .map_err(|_| Error::ChannelBusy)
    }
}

/// Build result containing the USB device runner, HID writers and console.
pub struct UsbRelayDevice {
    pub device: UsbDevice<'static, UsbDriver>,
    pub keyboard_writer: ReportWriter,
    pub pointer_writer: ReportWriter,
    pub console: UsbConsole,
}

/// Initialise the USB stack and create the composite device.
///
/// Must be called exactly once.  All static buffers are consumed here.
pub fn init(usbd: peripherals::USBD, vbus: &'static SoftwareVbusDetect) -> UsbRelayDevice {
    let driver = Driver::new(usbd, Irqs, vbus);

    // USB device-level configuration.
    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = 100; // mA
    usb_config.max_packet_size_0 = 64;

    // CDC-ACM needs an interface association descriptor.
    usb_config.device_class = 0xEF;
    usb_config.device_sub_class = 0x02;
    usb_config.device_protocol = 0x01;
    usb_config.composite_with_iads = true;

    // Allocate static descriptor buffers.
    let config_desc = USB_CONFIG_DESC.init([0u8; 256]);
    let bos_desc = USB_BOS_DESC.init([0u8; 256]);
    let msos_desc = USB_MSOS_DESC.init([0u8; 256]);
    let ctrl_buf = USB_CTRL_BUF.init([0u8; 128]);

    let mut builder = Builder::new(
        driver,
        usb_config,
        config_desc,
        bos_desc,
        msos_desc,
        ctrl_buf,
    );

    let kb_state = KB_STATE.init(State::new());
    let kb_config = HidConfig {
        report_descriptor: KEYBOARD_REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: HID_PACKET_SIZE as u16,
    };
    let keyboard_writer = HidWriter::new(&mut builder, kb_state, kb_config);

    let pointer_state = POINTER_STATE.init(State::new());
    let pointer_config = HidConfig {
        report_descriptor: POINTER_REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: HID_PACKET_SIZE as u16,
    };
    let pointer_writer = HidWriter::new(&mut builder, pointer_state, pointer_config);

    let cdc_state = CDC_STATE.init(CdcState::new());
    let console = UsbConsole {
        class: CdcAcmClass::new(&mut builder, cdc_state, CDC_PACKET_SIZE),
    };

    let device = builder.build();

    info!("USB composite device initialised (keyboard + pointer + console)");

    UsbRelayDevice {
        device,
        keyboard_writer,
        pointer_writer,
        console,
    }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
///
/// This handles USB enumeration, suspend/resume, and endpoint servicing.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    device.run().await
}

/// Report writer for one HID interface.
///
/// Takes each submitted report from the interface's slot, writes it to the
/// endpoint and then signals transmit-complete, also when the write failed,
/// so the gate never stays closed.
pub async fn hid_writer_task(
    mut writer: ReportWriter,
    interface: Interface,
    gates: &'static Gates,
) -> ! {
    info!("HID writer task started: {}", interface);

    let rx = slot(interface);
    let mut buf = [0u8; MAX_REPORT_SIZE];

    loop {
        let report = rx.receive().await;
        let n = report.serialize(&mut buf);
        if writer.write(&buf[..n]).await.is_err() {
            warn!("{} report lost: {}", interface, Error::Usb);
        }
        gates.transmit_complete(interface);
    }
}

/// CDC-ACM diagnostic console.
pub struct UsbConsole {
    class: CdcAcmClass<'static, UsbDriver>,
}

impl Console for UsbConsole {
    async fn write_str(&mut self, text: &str) {
        // Nobody is listening without DTR; a write would block forever.
        if !self.class.dtr() {
            return;
        }
        let timeout = Duration::from_millis(config::REPORT_SEND_TIMEOUT_MS as u64);
        for chunk in text.as_bytes().chunks(CDC_PACKET_SIZE as usize) {
            match with_timeout(timeout, self.class.write_packet(chunk)).await {
                Ok(Ok(())) => {}
                _ => {
                    warn!("Console write dropped");
                    return;
                }
            }
        }
    }
}
