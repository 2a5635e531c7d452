//! G-code line and parameter types

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a line contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineKind {
    /// Empty line
    Blank,
    /// Comment-only line
    Comment,
    /// `G` command
    G,
    /// `M` command
    M,
    /// `T` tool selection
    T,
    /// Anything else (firmware macros such as `BED_MESH_CALIBRATE`), kept verbatim
    Unknown,
}

impl LineKind {
    /// Command letter for coded lines
    pub fn letter(&self) -> Option<char> {
        match self {
            Self::G => Some('G'),
            Self::M => Some('M'),
            Self::T => Some('T'),
            _ => None,
        }
    }
}

/// Value carried by a parameter word
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    /// Word without a number, e.g. the `X` in `G28 X`
    None,
    /// Integer value, e.g. `S210`
    Int(i64),
    /// Real value, e.g. `X10.5`
    Float(f64),
}

impl ParamValue {
    /// Numeric value, widening integers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::None => None,
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", format_float(*v)),
        }
    }
}

/// Format a float so that it parses back to the same value and never reads
/// as an integer.
pub fn format_float(value: f64) -> String {
    let text = format!("{}", value);
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

/// One parameter word of a coded line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GcodeParam {
    /// Upper-case parameter letter
    pub letter: char,
    /// Parameter value
    pub value: ParamValue,
}

impl fmt::Display for GcodeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter, self.value)
    }
}

/// A single instruction record
///
/// Comment text is stored exactly as it follows the `;`, so writing and
/// re-reading a line is lossless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcodeLine {
    /// 1-based position in the document, 0 until numbered
    pub line_number: usize,
    /// What the line contains
    pub kind: LineKind,
    /// Command number for `G`/`M`/`T` lines
    pub code: u32,
    /// Parameter words in order
    pub params: Vec<GcodeParam>,
    /// Verbatim text of `Unknown` lines
    pub text: Option<String>,
    /// Trailing or standalone comment without the `;`
    pub comment: Option<String>,
}

impl GcodeLine {
    fn coded(kind: LineKind, code: u32) -> Self {
        Self {
            line_number: 0,
            kind,
            code,
            params: Vec::new(),
            text: None,
            comment: None,
        }
    }

    /// Create a `G` line
    pub fn g(code: u32) -> Self {
        Self::coded(LineKind::G, code)
    }

    /// Create an `M` line
    pub fn m(code: u32) -> Self {
        Self::coded(LineKind::M, code)
    }

    /// Create a `T` line
    pub fn t(tool: u32) -> Self {
        Self::coded(LineKind::T, tool)
    }

    /// Create a comment-only line
    pub fn comment(text: impl Into<String>) -> Self {
        Self {
            comment: Some(text.into()),
            ..Self::coded(LineKind::Comment, 0)
        }
    }

    /// Create a blank line
    pub fn blank() -> Self {
        Self::coded(LineKind::Blank, 0)
    }

    /// Create a verbatim line the codec does not interpret
    pub fn unknown(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::coded(LineKind::Unknown, 0)
        }
    }

    /// Append a real-valued parameter
    pub fn with_float(mut self, letter: char, value: f64) -> Self {
        self.params.push(GcodeParam {
            letter: letter.to_ascii_uppercase(),
            value: ParamValue::Float(value),
        });
        self
    }

    /// Append an integer parameter
    pub fn with_int(mut self, letter: char, value: i64) -> Self {
        self.params.push(GcodeParam {
            letter: letter.to_ascii_uppercase(),
            value: ParamValue::Int(value),
        });
        self
    }

    /// Append a bare parameter letter
    pub fn with_flag(mut self, letter: char) -> Self {
        self.params.push(GcodeParam {
            letter: letter.to_ascii_uppercase(),
            value: ParamValue::None,
        });
        self
    }

    /// Attach a trailing comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Look up a parameter by letter
    pub fn param(&self, letter: char) -> Option<&ParamValue> {
        let letter = letter.to_ascii_uppercase();
        self.params
            .iter()
            .find(|p| p.letter == letter)
            .map(|p| &p.value)
    }

    /// True for `G`/`M`/`T` lines with the given letter and code
    pub fn is(&self, letter: char, code: u32) -> bool {
        self.kind.letter() == Some(letter.to_ascii_uppercase()) && self.code == code
    }

    /// Command part of the line, without comment
    fn command_text(&self) -> Option<String> {
        if let Some(letter) = self.kind.letter() {
            let mut out = format!("{}{}", letter, self.code);
            for param in &self.params {
                out.push(' ');
                out.push_str(&param.to_string());
            }
            Some(out)
        } else if self.kind == LineKind::Unknown {
            self.text.clone()
        } else {
            None
        }
    }
}

impl fmt::Display for GcodeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.command_text(), &self.comment) {
            (Some(cmd), Some(comment)) => write!(f, "{} ;{}", cmd, comment),
            (Some(cmd), None) => write!(f, "{}", cmd),
            (None, Some(comment)) => write!(f, ";{}", comment),
            (None, None) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float_keeps_decimal_point() {
        assert_eq!(format_float(10.0), "10.0");
        assert_eq!(format_float(-0.5), "-0.5");
        assert_eq!(format_float(0.123), "0.123");
    }

    #[test]
    fn test_display_coded_line() {
        let line = GcodeLine::g(1)
            .with_float('x', 10.0)
            .with_float('Y', 2.25)
            .with_int('F', 1800)
            .with_comment("perimeter");
        assert_eq!(line.to_string(), "G1 X10.0 Y2.25 F1800 ;perimeter");
        assert!(line.is('g', 1));
        assert_eq!(line.param('x'), Some(&ParamValue::Float(10.0)));
    }

    #[test]
    fn test_display_other_lines() {
        assert_eq!(GcodeLine::comment("LAYER:0").to_string(), ";LAYER:0");
        assert_eq!(GcodeLine::blank().to_string(), "");
        assert_eq!(GcodeLine::g(28).with_flag('X').to_string(), "G28 X");
        assert_eq!(GcodeLine::t(1).to_string(), "T1");
        assert_eq!(
            GcodeLine::unknown("BED_MESH_CALIBRATE").to_string(),
            "BED_MESH_CALIBRATE"
        );
    }
}
