//! Handling a card presented to the reader, from connecting to releasing the connection.

use crate::nfc::{Card, CardError, Transmit};
use crate::sequencer::{self, ExchangeStep, SequenceOutcome};

/// A connection to a card, held for one sequence.
///
/// The session owns the connection, so nothing else can transmit to the card while the sequence
/// runs. Dropping the session releases the connection.
pub struct CardSession<T>
where
    T: Transmit,
{
    connection: T,
}

impl<T> CardSession<T>
where
    T: Transmit,
{
    /// Opens a session by connecting to the card.
    pub fn open<C>(card: &C) -> Result<Self, T::Error>
    where
        C: Card<Connection = T> + ?Sized,
    {
        let connection = card.connect()?;
        debug!("Connected to the card");

        Ok(Self { connection })
    }

    /// Runs the sequence on the connection.
    pub fn run(&self) -> SequenceOutcome<T::Error> {
        sequencer::run(&self.connection)
    }

    /// Runs the sequence on the connection, passing each step to the observer.
    pub fn run_with<F>(&self, observer: F) -> SequenceOutcome<T::Error>
    where
        F: FnMut(&ExchangeStep),
    {
        sequencer::run_with(&self.connection, observer)
    }
}

impl<T> Drop for CardSession<T>
where
    T: Transmit,
{
    fn drop(&mut self) {
        debug!("Connection closed");
    }
}

/// Connects to the card, reads the UID, then releases the connection.
pub fn handle_card_present<C>(card: &C) -> SequenceOutcome<CardError<C>>
where
    C: Card,
{
    handle_card_present_with(card, |_| {})
}

/// Same as [`handle_card_present`], passing each step to the observer as it completes.
///
/// Exactly one outcome is returned. A card that cannot be connected ends up in
/// [`SequenceOutcome::TransportError`] without any command sent.
pub fn handle_card_present_with<C, F>(card: &C, observer: F) -> SequenceOutcome<CardError<C>>
where
    C: Card,
    F: FnMut(&ExchangeStep),
{
    let outcome = match CardSession::open(card) {
        Ok(session) => session.run_with(observer),
        Err(e) => {
            warn!("Failed to connect to the card");
            return SequenceOutcome::TransportError(e);
        }
    };

    match &outcome {
        SequenceOutcome::Success(uid) => info!("Card UID: {}", uid),
        SequenceOutcome::StoppedEarly(_) => info!("The card had no more info"),
        SequenceOutcome::ExtractionFailed(_) => info!("Failed to extract the card UID"),
        SequenceOutcome::TransportError(_) => warn!("Failed to execute a command"),
    }

    outcome
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;
    use crate::nfc::{HARDWARE, SOFTWARE};
    use crate::response::Identifier;
    use crate::test_support::{MockCard, MockError};

    #[test]
    fn test_success_releases_once() {
        let card = MockCard::answering([
            hex!("04 01 01 01 00 18 05 91 AF").to_vec(),
            hex!("04 01 01 01 04 18 05 91 AF").to_vec(),
            hex!("04 52 1A 9A 32 6F 80 BA 44 50 91 00").to_vec(),
        ]);

        let outcome = handle_card_present(&card);

        assert_eq!(
            SequenceOutcome::Success(Identifier::from(hex!("52 1A 9A 32 6F 80 BA"))),
            outcome,
        );
        assert_eq!(1, card.log().connects);
        assert_eq!(1, card.log().releases);
    }

    #[test]
    fn test_stopped_early_releases_once() {
        let card = MockCard::answering([hex!("91 00").to_vec()]);

        let outcome = handle_card_present(&card);

        assert_eq!(SequenceOutcome::StoppedEarly(hex!("91 00").to_vec()), outcome);
        assert_eq!(vec![HARDWARE], card.log().sent);
        assert_eq!(1, card.log().releases);
    }

    #[test]
    fn test_extraction_failed_releases_once() {
        let card = MockCard::answering([
            hex!("00 91 AF").to_vec(),
            hex!("00 91 AF").to_vec(),
            hex!("00 91 AF").to_vec(),
        ]);

        let outcome = handle_card_present(&card);

        assert_eq!(SequenceOutcome::ExtractionFailed(hex!("00 91 AF").to_vec()), outcome);
        assert_eq!(1, card.log().releases);
    }

    #[test]
    fn test_transport_error_releases_once() {
        let card = MockCard::new([
            Ok(hex!("04 01 01 01 00 18 05 91 AF").to_vec()),
            Err(MockError::ConnectionLost),
        ]);

        let outcome = handle_card_present(&card);

        assert_eq!(SequenceOutcome::TransportError(MockError::ConnectionLost), outcome);
        assert_eq!(vec![HARDWARE, SOFTWARE], card.log().sent);
        assert_eq!(1, card.log().releases);
    }

    #[test]
    fn test_unreachable_card() {
        let card = MockCard::unreachable();

        let outcome = handle_card_present(&card);

        assert_eq!(SequenceOutcome::TransportError(MockError::Unreachable), outcome);
        assert!(card.log().sent.is_empty());
        assert_eq!(0, card.log().releases);
    }

    #[test]
    fn test_observer_receives_steps() {
        let card = MockCard::answering([hex!("04 01 91 AF").to_vec(), hex!("04 01 91 00").to_vec()]);
        let mut stages = Vec::new();

        handle_card_present_with(&card, |step| stages.push(step.stage));

        assert_eq!(
            vec![
                crate::Stage::AwaitHardware,
                crate::Stage::AwaitSoftware,
            ],
            stages,
        );
    }

    #[test]
    fn test_session_holds_connection_until_dropped() {
        let card = MockCard::answering([hex!("91 00").to_vec()]);

        let session = CardSession::open(&card).unwrap();
        assert!(!session.run().is_success());
        assert_eq!(0, card.log().releases);

        drop(session);
        assert_eq!(1, card.log().releases);
    }
}
