use std::fmt::Display;

use desfire_uid::hex::Hex;
use desfire_uid::{ExchangeStep, SequenceOutcome, Stage};

/// Lines describing a step as it completes.
pub fn step_lines(step: &ExchangeStep) -> Vec<String> {
    let response = Hex(&step.response);
    let mut lines = vec![match step.stage {
        Stage::AwaitHardware => format!("Ok. Hardware info: {}", response),
        Stage::AwaitSoftware => format!("Ok. Software info: {}", response),
        _ => format!("Ok. Card info: {}. Extract UID...", response),
    }];

    if step.continuation && step.stage != Stage::AwaitUid {
        lines.push("There is more info. Processing...".to_string());
    }

    lines
}

/// Lines describing how the sequence ended.
pub fn outcome_lines<E>(outcome: &SequenceOutcome<E>) -> Vec<String>
where
    E: Display,
{
    match outcome {
        SequenceOutcome::Success(uid) => vec![
            format!("Ok. Card UID: {}", uid),
            "Connection closed.".to_string(),
        ],
        SequenceOutcome::StoppedEarly(_) => vec![
            "No more info. Strange...".to_string(),
            "Connection closed.".to_string(),
        ],
        SequenceOutcome::ExtractionFailed(_) => vec![
            "Failed to extract card uid.".to_string(),
            "Connection closed.".to_string(),
        ],
        SequenceOutcome::TransportError(e) => vec![format!("Failed to execute command: {}", e)],
    }
}

/// An outcome in a machine-readable form.
#[derive(Debug, PartialEq, Eq, serde::Serialize)]
pub struct Report {
    pub outcome: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<'a, E> From<&'a SequenceOutcome<E>> for Report
where
    E: Display,
{
    fn from(outcome: &'a SequenceOutcome<E>) -> Self {
        let (name, error) = match outcome {
            SequenceOutcome::Success(_) => ("success", None),
            SequenceOutcome::StoppedEarly(_) => ("stopped_early", None),
            SequenceOutcome::ExtractionFailed(_) => ("extraction_failed", None),
            SequenceOutcome::TransportError(e) => ("transport_error", Some(e.to_string())),
        };

        Self {
            outcome: name,
            uid: outcome.identifier().map(hex::encode),
            response: outcome.response().map(hex::encode),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use desfire_uid::nfc::HARDWARE;
    use desfire_uid::Identifier;

    use super::*;

    fn step(stage: Stage, response: Vec<u8>, continuation: bool) -> ExchangeStep {
        ExchangeStep {
            stage,
            command: stage.command().unwrap_or(HARDWARE),
            response,
            continuation,
            identifier: None,
        }
    }

    #[test]
    fn test_step_lines() {
        assert_eq!(
            vec![
                "Ok. Hardware info: 04 01 91 af ".to_string(),
                "There is more info. Processing...".to_string(),
            ],
            step_lines(&step(Stage::AwaitHardware, vec![0x04, 0x01, 0x91, 0xAF], true)),
        );
        assert_eq!(
            vec!["Ok. Software info: 04 91 00 ".to_string()],
            step_lines(&step(Stage::AwaitSoftware, vec![0x04, 0x91, 0x00], false)),
        );
        assert_eq!(
            vec!["Ok. Card info: 04 91 af . Extract UID...".to_string()],
            step_lines(&step(Stage::AwaitUid, vec![0x04, 0x91, 0xAF], true)),
        );
    }

    #[test]
    fn test_outcome_lines() {
        let uid = Identifier::from([0x04, 0x52, 0x1A, 0x9A, 0x32, 0x6F, 0x80]);

        assert_eq!(
            vec!["Ok. Card UID: 04 52 1a 9a 32 6f 80 ", "Connection closed."],
            outcome_lines(&SequenceOutcome::<String>::Success(uid)),
        );
        assert_eq!(
            vec!["No more info. Strange...", "Connection closed."],
            outcome_lines(&SequenceOutcome::<String>::StoppedEarly(vec![0x91, 0x00])),
        );
        assert_eq!(
            vec!["Failed to execute command: card removed"],
            outcome_lines(&SequenceOutcome::TransportError("card removed")),
        );
    }

    #[test]
    fn test_report() {
        let uid = Identifier::from([0x04, 0x52, 0x1A, 0x9A, 0x32, 0x6F, 0x80]);

        assert_eq!(
            r#"{"outcome":"success","uid":"04521a9a326f80"}"#,
            serde_json::to_string(&Report::from(&SequenceOutcome::<String>::Success(uid)))
                .unwrap(),
        );
        assert_eq!(
            r#"{"outcome":"extraction_failed","response":"049100"}"#,
            serde_json::to_string(&Report::from(
                &SequenceOutcome::<String>::ExtractionFailed(vec![0x04, 0x91, 0x00])
            ))
            .unwrap(),
        );
        assert_eq!(
            Report {
                outcome: "transport_error",
                uid: None,
                response: None,
                error: Some("card removed".to_string()),
            },
            Report::from(&SequenceOutcome::TransportError("card removed")),
        );
    }
}
