//! Rendering of per-case lines and the run summary.

use std::io::{self, Write};

use colored::Colorize;
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::style::{self, judge_message};
use crate::testing::{CaseOutcome, JudgeCode, Phase, PresentationReason, Stage, Verdict};

/// Derived once from the ordered outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    pub num_total: usize,
    pub num_passed: usize,
    pub total_score: f64,
    /// Divided by the number of all cases, not just the passing ones.
    pub average_score: f64,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[CaseOutcome]) -> Self {
        let (num_passed, total_score) = outcomes
            .iter()
            .filter_map(|o| o.verdict.score())
            .fold((0, 0.0), |(n, sum), score| (n + 1, sum + score));

        let num_total = outcomes.len();
        let average_score = if num_total == 0 {
            0.0
        } else {
            total_score / num_total as f64
        };
        Self {
            num_total,
            num_passed,
            total_score,
            average_score,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.num_passed == self.num_total
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub cases: Vec<CaseOutcome>,
    pub summary: RunSummary,
}

impl BenchReport {
    pub fn new(cases: Vec<CaseOutcome>) -> Self {
        let summary = RunSummary::from_outcomes(&cases);
        Self { cases, summary }
    }
}

#[derive(Debug, Clone)]
pub struct Reporter {
    name_width: usize,
}

impl Reporter {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let longest = names
            .into_iter()
            .map(|name| name.chars().count())
            .max()
            .unwrap_or(0);
        Self {
            name_width: longest.max(4),
        }
    }

    pub fn header(&self, num_tests: usize) -> String {
        let bar = "=".repeat(22);
        format!(
            "{}\n{}",
            format!("{} Running {} tests {}", bar, num_tests, bar).yellow(),
            format!(
                "Idx  {:<w$} {:>7}   Compression   Decompression ",
                "Name",
                "Size",
                w = self.name_width
            )
            .yellow(),
        )
    }

    pub fn line(&self, o: &CaseOutcome) -> String {
        let size = o
            .original_size
            .map_or_else(|| "?".to_owned(), |n| n.to_string());
        let prefix = format!(
            "{} {:<w$} {}   ",
            format!("{:>4}", o.index).yellow(),
            o.name,
            format!("{:>7}", size).cyan(),
            w = self.name_width,
        );

        let compressed_ok = |size: usize| {
            format!(
                "{} {}    ",
                "OK".green(),
                format!("{:>7}", size).cyan()
            )
        };

        let rest = match &o.verdict {
            Verdict::Success {
                compressed_size,
                score,
            } => format!(
                "{}{} {}",
                compressed_ok(*compressed_size),
                "OK".green(),
                format!("{:9.3}", score).cyan()
            ),
            Verdict::TimeLimitExceeded { phase } => self::after_compression(
                *phase,
                o.compressed_size,
                judge_message(JudgeCode::TL, format!("timeout expired ({})", phase.noun())),
                compressed_ok,
            ),
            Verdict::RuntimeError { phase, exit_code } => {
                let detail = match exit_code {
                    Some(code) => format!("exitcode={}", code),
                    None => "failed to launch".to_owned(),
                };
                self::after_compression(
                    *phase,
                    o.compressed_size,
                    judge_message(JudgeCode::RE, format!("{} ({})", detail, phase.noun())),
                    compressed_ok,
                )
            }
            Verdict::PresentationError { stage, reason } => {
                judge_message(JudgeCode::PE, self::presentation_detail(*stage, reason)).to_string()
            }
            Verdict::WrongAnswer => format!(
                "{}{}",
                o.compressed_size.map(compressed_ok).unwrap_or_default(),
                judge_message(JudgeCode::WA, "wrong decompressed block")
            ),
        };
        prefix + &rest
    }

    pub fn summary(&self, outcomes: &[CaseOutcome], summary: &RunSummary) -> String {
        let passed_color = if summary.all_passed() {
            colored::Color::Green
        } else {
            colored::Color::Red
        };

        let mut lines = Vec::with_capacity(4);
        if !summary.all_passed() {
            let breakdown = JudgeCode::iter()
                .filter(|&judge| judge != JudgeCode::OK)
                .filter_map(|judge| {
                    let cnt = outcomes.iter().filter(|o| o.verdict.judge() == judge).count();
                    (cnt > 0).then(|| {
                        format!(
                            "{}{}{}",
                            style::judge_icon(judge),
                            "x".dimmed(),
                            cnt.to_string().bold()
                        )
                    })
                })
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!("{} {}", "Failures:      ".yellow(), breakdown));
        }
        lines.push(format!(
            "{}{}",
            "Passed tests:   ".yellow(),
            format!("{}/{}", summary.num_passed, summary.num_total).color(passed_color)
        ));
        lines.push(format!(
            "{}{}",
            "Average points: ".yellow(),
            format!("{:.3}", summary.average_score).cyan()
        ));
        lines.push(format!(
            "{}{}",
            "Total points:   ".yellow(),
            format!("{:.3}", summary.total_score).cyan()
        ));
        lines.join("\n")
    }

    pub fn write_lines(&self, w: &mut impl Write, report: &BenchReport) -> io::Result<()> {
        for o in &report.cases {
            writeln!(w, "{}", self.line(o))?;
        }
        writeln!(w, "{}", self.summary(&report.cases, &report.summary))
    }
}

/// Failures in the compress phase replace the compression column;
/// failures in the decompress phase follow a successful compression column.
fn after_compression(
    phase: Phase,
    compressed_size: Option<usize>,
    msg: colored::ColoredString,
    compressed_ok: impl Fn(usize) -> String,
) -> String {
    match (phase, compressed_size) {
        (Phase::Decompress, Some(size)) => format!("{}{}", compressed_ok(size), msg),
        _ => msg.to_string(),
    }
}

fn presentation_detail(stage: Stage, reason: &PresentationReason) -> String {
    use PresentationReason::*;
    match (stage, reason) {
        (Stage::Input, InvalidBase64) => "invalid base64 in file".to_owned(),
        (Stage::Input, TooLarge(size)) => format!("original input too large ({})", size),
        (Stage::Input, MissingPayload) => "missing payload token in file".to_owned(),
        (Stage::Input, reason) => reason.to_string(),
        (Stage::Output(phase), InvalidBase64) => {
            format!("invalid base64 ({} output)", phase.noun())
        }
        (Stage::Output(_), TooLarge(size)) => format!("too big output ({})", size),
        (Stage::Output(phase), reason) => format!("{} ({} output)", reason, phase.noun()),
    }
}
