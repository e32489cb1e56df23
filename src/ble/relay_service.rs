//! Relay GATT service.
//!
//! ```text
//! Service  597f1290-5b99-477d-9261-f0ed801fc566
//!   RX     597f1291-...  write / write-without-response  (commands in)
//!   TX     597f1292-...  read / notify                    (status out)
//! ```
//!
//! Enabling notifications on TX is how a sender announces itself; the
//! CCCD state is what the relay calls "subscribed".

use heapless::Vec;

use hidrelay::config::MAX_MESSAGE_LEN;

/// Longest status line sent on TX.
pub const TX_LEN: usize = 8;

#[nrf_softdevice::gatt_service(uuid = "597f1290-5b99-477d-9261-f0ed801fc566")]
pub struct RelayService {
    #[characteristic(
        uuid = "597f1291-5b99-477d-9261-f0ed801fc566",
        write,
        write_without_response
    )]
    pub rx: Vec<u8, MAX_MESSAGE_LEN>,

    #[characteristic(uuid = "597f1292-5b99-477d-9261-f0ed801fc566", read, notify)]
    pub tx: Vec<u8, TX_LEN>,
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub relay: RelayService,
}
