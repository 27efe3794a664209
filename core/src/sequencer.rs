//! Sequencing the commands to read the version data and the UID out of the card.
//!
//! The card hands its version data out in three frames. Each frame but the last one ends with
//! [`CONTINUATION_MARKER`](crate::response::CONTINUATION_MARKER), asking for the next one:
//!
//! | Stage           | Command    | Next stage with marker | Next stage without marker |
//! |-----------------|------------|------------------------|---------------------------|
//! | `AwaitHardware` | `HARDWARE` | `AwaitSoftware`        | `Done`                    |
//! | `AwaitSoftware` | `SOFTWARE` | `AwaitUid`             | `Done`                    |
//! | `AwaitUid`      | `UID`      | `Done`                 | `Done`                    |
//!
//! The UID is extracted from the response to `UID` only.

use crate::hex::Hex;
use crate::nfc::{self, Command, Transmit};
use crate::response::{extract_identifier, has_continuation, status_word, Identifier};

/// Where the sequence stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Stage {
    #[default]
    AwaitHardware,
    AwaitSoftware,
    AwaitUid,
    Done,
}

impl Stage {
    /// The command to be sent in this stage, if any.
    pub fn command(self) -> Option<Command> {
        match self {
            Stage::AwaitHardware => Some(nfc::HARDWARE),
            Stage::AwaitSoftware => Some(nfc::SOFTWARE),
            Stage::AwaitUid => Some(nfc::UID),
            Stage::Done => None,
        }
    }

    fn next(self, continuation: bool) -> Self {
        match (self, continuation) {
            (Stage::AwaitHardware, true) => Stage::AwaitSoftware,
            (Stage::AwaitSoftware, true) => Stage::AwaitUid,
            _ => Stage::Done,
        }
    }
}

/// A command sent to the card and what was learned from its response.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ExchangeStep {
    /// The stage the command was sent in.
    pub stage: Stage,
    pub command: Command,
    /// The raw response, including the status trailer.
    pub response: Vec<u8>,
    /// Whether the card asked for another command.
    pub continuation: bool,
    /// The UID carried by the response. Only looked for in [`Stage::AwaitUid`].
    pub identifier: Option<Identifier>,
}

/// How a sequence ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SequenceOutcome<E> {
    /// All frames were read and the last one carried the UID.
    Success(Identifier),

    /// The card had no more frames before the UID was reached. Holds the last response.
    StoppedEarly(Vec<u8>),

    /// All frames were read but the last one was too short to carry the UID.
    /// Holds the last response.
    ExtractionFailed(Vec<u8>),

    /// The transport failed; no further command was sent.
    TransportError(E),
}

impl<E> SequenceOutcome<E> {
    pub fn is_success(&self) -> bool {
        matches!(self, SequenceOutcome::Success(_))
    }

    pub fn identifier(&self) -> Option<&Identifier> {
        match self {
            SequenceOutcome::Success(uid) => Some(uid),
            _ => None,
        }
    }

    /// The last response received, when the sequence ended without the UID.
    pub fn response(&self) -> Option<&[u8]> {
        match self {
            SequenceOutcome::StoppedEarly(response) | SequenceOutcome::ExtractionFailed(response) => {
                Some(response)
            }
            _ => None,
        }
    }

    pub fn map_err<F, O>(self, op: O) -> SequenceOutcome<F>
    where
        O: FnOnce(E) -> F,
    {
        match self {
            SequenceOutcome::Success(uid) => SequenceOutcome::Success(uid),
            SequenceOutcome::StoppedEarly(response) => SequenceOutcome::StoppedEarly(response),
            SequenceOutcome::ExtractionFailed(response) => {
                SequenceOutcome::ExtractionFailed(response)
            }
            SequenceOutcome::TransportError(e) => SequenceOutcome::TransportError(op(e)),
        }
    }
}

/// A state machine deciding which command goes next, without doing any I/O by itself.
///
/// ```
/// use desfire_uid::sequencer::{Sequencer, Stage};
/// use desfire_uid::SequenceOutcome;
///
/// let mut sequencer = Sequencer::new();
/// assert_eq!(Some(desfire_uid::nfc::HARDWARE), sequencer.command());
///
/// sequencer.advance(vec![0x04, 0x01, 0x91, 0x00]);
/// assert_eq!(Stage::Done, sequencer.stage());
/// assert_eq!(
///     SequenceOutcome::<()>::StoppedEarly(vec![0x04, 0x01, 0x91, 0x00]),
///     sequencer.finish(),
/// );
/// ```
#[derive(Debug, Default)]
pub struct Sequencer {
    stage: Stage,
    last: Option<ExchangeStep>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    /// The command to be sent next, or `None` once the sequence is done.
    pub fn command(&self) -> Option<Command> {
        self.stage.command()
    }

    /// The step made by the most recent response.
    pub fn last_step(&self) -> Option<&ExchangeStep> {
        self.last.as_ref()
    }

    /// Feeds the response to the command returned by [`Sequencer::command`].
    /// Once the sequence is done, the response is discarded and `None` is returned.
    pub fn advance(&mut self, response: Vec<u8>) -> Option<&ExchangeStep> {
        let stage = self.stage;
        let command = stage.command()?;

        let continuation = has_continuation(&response);
        let identifier = match stage {
            Stage::AwaitUid => extract_identifier(&response),
            _ => None,
        };

        self.stage = stage.next(continuation);

        debug!(
            "{:?} -> {:?}: {} (SW: {:02x?})",
            stage,
            self.stage,
            Hex(&response),
            status_word(&response),
        );

        Some(self.last.insert(ExchangeStep {
            stage,
            command,
            response,
            continuation,
            identifier,
        }))
    }

    /// Ends the sequence. A sequence ended before reaching [`Stage::Done`] is considered stopped
    /// early.
    pub fn finish<E>(self) -> SequenceOutcome<E> {
        let done = self.is_done();

        match self.last {
            Some(ExchangeStep {
                stage: Stage::AwaitUid,
                identifier: Some(uid),
                ..
            }) if done => SequenceOutcome::Success(uid),
            Some(ExchangeStep {
                stage: Stage::AwaitUid,
                response,
                ..
            }) if done => SequenceOutcome::ExtractionFailed(response),
            Some(ExchangeStep { response, .. }) => SequenceOutcome::StoppedEarly(response),
            None => SequenceOutcome::StoppedEarly(Vec::new()),
        }
    }
}

/// Runs the whole sequence through the delegate.
pub fn run<T>(transmit: &T) -> SequenceOutcome<T::Error>
where
    T: Transmit + ?Sized,
{
    run_with(transmit, |_| {})
}

/// Runs the whole sequence through the delegate, passing each step to the observer as soon as the
/// response is analysed.
pub fn run_with<T, F>(transmit: &T, mut observer: F) -> SequenceOutcome<T::Error>
where
    T: Transmit + ?Sized,
    F: FnMut(&ExchangeStep),
{
    let mut sequencer = Sequencer::new();

    while let Some(command) = sequencer.command() {
        let response = match transmit.transmit(&command) {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to transmit a command in {:?}", sequencer.stage());
                return SequenceOutcome::TransportError(e);
            }
        };

        if let Some(step) = sequencer.advance(response) {
            observer(step);
        }
    }

    sequencer.finish()
}
