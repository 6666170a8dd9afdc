use std::{fmt, time::Duration};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Compress,
    Decompress,
}

impl Phase {
    /// Noun used in report lines, e.g. "timeout expired (compression)".
    pub fn noun(self) -> &'static str {
        match self {
            Phase::Compress => "compression",
            Phase::Decompress => "decompression",
        }
    }
}

/// Where a presentation error was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// The test case file itself, before the program is invoked.
    Input,
    Output(Phase),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum PresentationReason {
    InvalidBase64,
    TooLarge(usize),
    UnreadableFile(String),
    MissingPayload,
}

impl fmt::Display for PresentationReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use PresentationReason::*;
        match self {
            InvalidBase64 => write!(f, "invalid base64"),
            TooLarge(size) => write!(f, "too large ({})", size),
            UnreadableFile(e) => write!(f, "failed to read file: {}", e),
            MissingPayload => write!(f, "missing payload token"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "verdict")]
pub enum Verdict {
    Success {
        compressed_size: usize,
        score: f64,
    },
    TimeLimitExceeded {
        phase: Phase,
    },
    /// `exit_code` is `None` when the program could not be launched or its pipes failed.
    RuntimeError {
        phase: Phase,
        exit_code: Option<i32>,
    },
    PresentationError {
        stage: Stage,
        reason: PresentationReason,
    },
    WrongAnswer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum JudgeCode {
    OK,
    TL,
    RE,
    PE,
    WA,
}

impl Verdict {
    pub fn judge(&self) -> JudgeCode {
        match self {
            Verdict::Success { .. } => JudgeCode::OK,
            Verdict::TimeLimitExceeded { .. } => JudgeCode::TL,
            Verdict::RuntimeError { .. } => JudgeCode::RE,
            Verdict::PresentationError { .. } => JudgeCode::PE,
            Verdict::WrongAnswer => JudgeCode::WA,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::Success { .. })
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            Verdict::Success { score, .. } => Some(*score),
            _ => None,
        }
    }
}

/// `1000 * 2n / (n + c)`: 1000 at parity, approaching 2000 as the output shrinks.
pub fn score(original_size: usize, compressed_size: usize) -> f64 {
    let (n, c) = (original_size as f64, compressed_size as f64);
    if n + c == 0.0 {
        // empty in, empty out: treat as parity
        return 1000.0;
    }
    1000.0 * (2.0 * n) / (n + c)
}

/// Outcome of one test case, in the shape the reporter consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseOutcome {
    /// 1-based position in discovery order.
    pub index: usize,
    pub name: String,
    pub original_size: Option<usize>,
    /// Known once the compression output has been validated.
    pub compressed_size: Option<usize>,
    pub verdict: Verdict,
    #[serde(serialize_with = "serialize_millis")]
    pub execution_time: Duration,
}

fn serialize_millis<S>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(d.as_millis() as u64)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn score_at_parity_is_exactly_1000() {
        assert_eq!(score(1, 1), 1000.0);
        assert_eq!(score(12345, 12345), 1000.0);
        assert_eq!(score(0, 0), 1000.0);
    }

    #[test]
    fn score_is_bounded() {
        assert_eq!(score(100, 0), 2000.0);
        assert_eq!(score(100, 300), 500.0);
        assert!(score(1, crate::codec::MAX_PAYLOAD_SIZE) > 0.0);
        assert!(score(3000, 1000) > 1000.0 && score(3000, 1000) < 2000.0);
    }

    #[test]
    fn judge_codes() {
        let v = Verdict::Success {
            compressed_size: 3,
            score: 1000.0,
        };
        assert_eq!(v.judge(), JudgeCode::OK);
        assert_eq!(v.score(), Some(1000.0));

        let v = Verdict::RuntimeError {
            phase: Phase::Decompress,
            exit_code: Some(1),
        };
        assert_eq!(v.judge(), JudgeCode::RE);
        assert_eq!(v.score(), None);
        assert_eq!(Verdict::WrongAnswer.judge().to_string(), "WA");
    }

    #[test]
    fn phase_tags() {
        assert_eq!(Phase::Compress.to_string(), "compress");
        assert_eq!(Phase::Decompress.to_string(), "decompress");
        assert_eq!(Phase::Decompress.noun(), "decompression");
    }

    #[test]
    fn verdict_serializes_with_tag() {
        let v = Verdict::TimeLimitExceeded {
            phase: Phase::Compress,
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "verdict": "time_limit_exceeded", "phase": "compress" })
        );
    }
}
