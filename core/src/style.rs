use colored::{Color, ColoredString, Colorize};

use crate::testing::JudgeCode;

pub trait ColorTheme {
    fn color(&self) -> Color;
}

impl ColorTheme for JudgeCode {
    fn color(&self) -> Color {
        use JudgeCode::*;
        match self {
            OK => Color::Green,
            WA => Color::Yellow,
            TL => Color::Red,
            RE => Color::Magenta,
            PE => Color::BrightRed,
        }
    }
}

pub fn judge_icon(judge: JudgeCode) -> ColoredString {
    format!(" {} ", judge)
        .on_color(judge.color())
        .bold()
        .color(Color::BrightWhite)
}

/// Two-letter code followed by a message, e.g. `TL timeout expired (compression)`.
pub fn judge_message(judge: JudgeCode, msg: impl AsRef<str>) -> ColoredString {
    let color = match judge {
        JudgeCode::OK => Color::Green,
        _ => Color::Red,
    };
    format!("{} {}", judge, msg.as_ref()).color(color)
}
