//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **Advertiser** - advertises the relay service and waits for a
//!    sender to connect (one link at a time).
//! 2. **Relay service** - RX characteristic receives command messages,
//!    TX characteristic carries `ERR` notifications back.
//! 3. **Connection observer** - feeds TX subscription changes and
//!    disconnects into `Relay::link_changed`.
//!
//! Received messages are copied into the [`Inbox`] channel; parsing and
//! report generation happen in the input task, never in the SoftDevice
//! event callback.

pub mod relay_service;

use defmt::{info, warn};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::Vec;
use nrf_softdevice::ble::advertisement_builder::{
    Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload, ServiceList,
};
use nrf_softdevice::ble::{gatt_server, peripheral, Connection};
use nrf_softdevice::Softdevice;

use hidrelay::config::{
    BLE_ADV_INTERVAL, BLE_DEVICE_NAME, INBOX_DEPTH, MAX_MESSAGE_LEN, RELAY_SERVICE_UUID,
};
use hidrelay::error::{BleError, Error};
use hidrelay::relay::LinkEvent;
use relay_service::{RelayServiceEvent, Server, ServerEvent, TX_LEN};

/// One inbound command message, as written to RX.
pub type Message = Vec<u8, MAX_MESSAGE_LEN>;

/// Messages waiting for the input task.
pub type Inbox = Channel<CriticalSectionRawMutex, Message, INBOX_DEPTH>;

/// Raised by the input task when a message held an unrecognized key release.
pub type ErrorNotice = Signal<CriticalSectionRawMutex, ()>;

/// Status line notified on TX after an unrecognized key.
pub const ERR_NOTICE: &[u8] = b"ERR\n";

static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .full_name(BLE_DEVICE_NAME)
    .build();

static SCAN_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .services_128(ServiceList::Complete, &[RELAY_SERVICE_UUID.to_le_bytes()])
    .build();

/// Register the GATT server.  Must run before the SoftDevice task starts.
pub fn init_server(sd: &mut Softdevice) -> Result<Server, Error> {
    Server::new(sd).map_err(|_| Error::Ble(BleError::RegisterFailed))
}

/// Advertise, serve one connection, repeat.
///
/// `on_link` receives every CCCD change and one `Disconnected` per link,
/// whether or not the sender ever subscribed.
pub async fn peripheral_loop<F>(
    sd: &'static Softdevice,
    server: &'static Server,
    inbox: &'static Inbox,
    error_notice: &'static ErrorNotice,
    on_link: F,
) -> !
where
    F: Fn(LinkEvent) -> Result<(), Error>,
{
    let config = peripheral::Config {
        interval: BLE_ADV_INTERVAL,
        ..Default::default()
    };

    loop {
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &ADV_DATA,
            scan_data: &SCAN_DATA,
        };

        let conn = match peripheral::advertise_connectable(sd, adv, &config).await {
            Ok(conn) => conn,
            Err(_) => {
                warn!("BLE advertising failed: {}", Error::Ble(BleError::AdvertiseFailed));
                continue;
            }
        };
        info!("BLE sender connected");
        error_notice.reset();

        let serve = gatt_server::run(&conn, server, |e| match e {
            ServerEvent::Relay(RelayServiceEvent::RxWrite(message)) => {
                if inbox.try_send(message).is_err() {
                    warn!("Inbox full, message dropped");
                }
            }
            ServerEvent::Relay(RelayServiceEvent::TxCccdWrite { notifications }) => {
                info!("TX notifications: {}", notifications);
                observe(&on_link, LinkEvent::Subscription(notifications));
            }
        });

        match select(serve, notify_errors(&conn, server, error_notice)).await {
            Either::First(_) => info!("BLE sender disconnected"),
            Either::Second(never) => match never {},
        }
        observe(&on_link, LinkEvent::Disconnected);
    }
}

fn observe<F: Fn(LinkEvent) -> Result<(), Error>>(on_link: &F, event: LinkEvent) {
    if let Err(e) = on_link(event) {
        defmt::panic!("Event queue fault: {}", e);
    }
}

/// Forward raised error notices to TX while the link is up.
async fn notify_errors(
    conn: &Connection,
    server: &Server,
    error_notice: &ErrorNotice,
) -> core::convert::Infallible {
    let mut value: Vec<u8, TX_LEN> = Vec::new();
    // ERR_NOTICE always fits TX_LEN.
    let _ = value.extend_from_slice(ERR_NOTICE);

    loop {
        error_notice.wait().await;
        if server.relay.tx_notify(conn, &value).is_err() {
            warn!("TX notify failed: {}", Error::Ble(BleError::NotifyFailed));
        }
    }
}
