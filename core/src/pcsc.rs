//! PC/SC support for desfire-uid library.
//! Can be enabled by turning `pcsc` feature on.
//!
//! ## What is PC/SC?
//! PC/SC (Personal Computer/Smart Card) is an abstraction layer for communicating with Smart Cards
//! from Windows. Using this layer, applications can connect to any devices that supports PC/SC,
//! without depending on their driver implementation. Windows and macOS supports PC/SC by themselves,
//! Linux also supports by installing pcsc-lite shared library.
//!
//! Refer the documentation of pcsc-rust for the supported platforms:
//! <https://github.com/bluetech/pcsc-rust>
//!
//! ## Usage
//! ```rust,no_run
//! use desfire_uid::handle_card_present;
//! use desfire_uid::pcsc::Context;
//!
//! let ctx = Context::try_new().unwrap();
//! let device = ctx.open(None).unwrap();
//!
//! while device.wait_for_card(&ctx, None).unwrap() {
//!     let outcome = handle_card_present(&device.card(&ctx));
//!     println!("{:?}", outcome.identifier());
//! }
//! ```

use std::cell::Cell;
use std::ffi::{CStr, CString};
use std::time::Duration;

use pcsc::{Protocols, ReaderState, Scope, ShareMode, State, MAX_BUFFER_SIZE};

use crate::nfc::{Card, Command, Transmit};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error occurred while communicating with PC/SC: {0}")]
    PcscError(#[from] pcsc::Error),

    #[error("Reader not found on PC/SC service")]
    ReaderNotFound,
}

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// PC/SC context.
pub struct Context {
    ctx: pcsc::Context,
}

impl Context {
    /// Creates a PC/SC context in user scope.
    pub fn try_new() -> Result<Self> {
        Ok(Self {
            ctx: pcsc::Context::establish(Scope::User)?,
        })
    }

    /// Lists the names of readers known to the PC/SC service.
    pub fn readers(&self) -> Result<Vec<CString>> {
        let mut buf = [0u8; 2048];

        Ok(self
            .ctx
            .list_readers(&mut buf)?
            .map(CStr::to_owned)
            .collect())
    }

    /// Finds a reader whose name contains `filter`, then opens them.
    /// Takes the first reader if no filter is given.
    pub fn open(&self, filter: Option<&str>) -> Result<Device> {
        self.readers()?
            .into_iter()
            .find(|name| match filter {
                Some(filter) => name.to_string_lossy().contains(filter),
                None => true,
            })
            .map(Device::new)
            .ok_or(Error::ReaderNotFound)
    }
}

/// PC/SC device handle.
pub struct Device {
    reader: CString,
    state: Cell<State>,
}

impl Device {
    fn new(reader: CString) -> Self {
        debug!("Using device: {}", reader.to_string_lossy());

        Self {
            reader,
            state: Cell::new(State::UNAWARE),
        }
    }

    /// Name of the reader.
    pub fn name(&self) -> String {
        self.reader.to_string_lossy().into_owned()
    }

    /// Blocks until a card is put on the reader.
    ///
    /// A card already on the reader when the device is first watched counts as put. Returns
    /// `false` if no card came within the timeout.
    pub fn wait_for_card(&self, ctx: &Context, timeout: Option<Duration>) -> Result<bool> {
        debug!("Waiting for a card");

        loop {
            let was_present = self.state.get().contains(State::PRESENT);
            let mut states = [ReaderState::new(self.reader.clone(), self.state.get())];

            match ctx.ctx.get_status_change(timeout, &mut states) {
                Ok(()) => {}
                Err(pcsc::Error::Timeout) => return Ok(false),
                Err(e) => return Err(e.into()),
            }

            let mut state = states[0].event_state();
            state.remove(State::CHANGED);
            self.state.set(state);

            if !was_present && state.contains(State::PRESENT) && !state.contains(State::MUTE) {
                debug!("Card added");
                return Ok(true);
            }
        }
    }

    /// A handle to the card on the reader, to be connected.
    pub fn card<'a>(&'a self, ctx: &'a Context) -> PcscCardHandle<'a> {
        PcscCardHandle {
            ctx: &ctx.ctx,
            reader: &self.reader,
        }
    }
}

/// A card on the reader, not connected yet.
pub struct PcscCardHandle<'a> {
    ctx: &'a pcsc::Context,
    reader: &'a CStr,
}

impl<'a> Card for PcscCardHandle<'a> {
    type Connection = PcscCard;

    fn connect(&self) -> Result<PcscCard> {
        let card = self
            .ctx
            .connect(self.reader, ShareMode::Shared, Protocols::ANY)?;
        debug!("Connected to your card");

        Ok(PcscCard::new(card))
    }
}

/// A card to be communicated through PC/SC.
/// The connection is closed when dropped.
pub struct PcscCard {
    card: pcsc::Card,
}

impl PcscCard {
    fn new(card: pcsc::Card) -> Self {
        Self { card }
    }

    /// Transmits an APDU command to the card, then receives a response from them.
    pub fn transmit(&self, tx: &[u8]) -> Result<Vec<u8>> {
        debug!("TX: {}", hex::encode(tx));

        let mut rx = [0u8; MAX_BUFFER_SIZE];
        let rx = self.card.transmit(tx, &mut rx)?;

        debug!("RX: {}", hex::encode(rx));

        Ok(Vec::from(rx))
    }
}

impl Transmit for PcscCard {
    type Error = Error;

    fn transmit(&self, command: &Command) -> Result<Vec<u8>> {
        PcscCard::transmit(self, command.as_bytes())
    }
}

impl Drop for PcscCard {
    fn drop(&mut self) {
        debug!("Disconnecting from your card");
    }
}
