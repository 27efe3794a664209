//! Scripted card for unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::nfc::{Card, Command, Transmit};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MockError {
    #[error("Connection to the card was lost")]
    ConnectionLost,

    #[error("Card is not reachable")]
    Unreachable,

    #[error("No more responses are scripted")]
    Exhausted,
}

/// What happened to the card, shared between the card and its connections.
#[derive(Debug, Default)]
pub struct Log {
    pub connects: usize,
    pub releases: usize,
    pub sent: Vec<Command>,
}

type Script = VecDeque<Result<Vec<u8>, MockError>>;

/// A card answering each transmitted command with the next scripted response.
#[derive(Default)]
pub struct MockCard {
    script: Rc<RefCell<Script>>,
    log: Rc<RefCell<Log>>,
    unreachable: bool,
}

impl MockCard {
    pub fn new<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Result<Vec<u8>, MockError>>,
    {
        Self {
            script: Rc::new(RefCell::new(responses.into_iter().collect())),
            ..Default::default()
        }
    }

    /// A card answering every command successfully.
    pub fn answering<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        Self::new(responses.into_iter().map(Ok))
    }

    /// A card that fails on connecting.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }

    pub fn log(&self) -> std::cell::Ref<'_, Log> {
        self.log.borrow()
    }
}

impl Card for MockCard {
    type Connection = MockConnection;

    fn connect(&self) -> Result<Self::Connection, MockError> {
        if self.unreachable {
            return Err(MockError::Unreachable);
        }

        self.log.borrow_mut().connects += 1;

        Ok(MockConnection {
            script: Rc::clone(&self.script),
            log: Rc::clone(&self.log),
        })
    }
}

pub struct MockConnection {
    script: Rc<RefCell<Script>>,
    log: Rc<RefCell<Log>>,
}

impl Transmit for MockConnection {
    type Error = MockError;

    fn transmit(&self, command: &Command) -> Result<Vec<u8>, Self::Error> {
        self.log.borrow_mut().sent.push(*command);
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(MockError::Exhausted))
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.log.borrow_mut().releases += 1;
    }
}
