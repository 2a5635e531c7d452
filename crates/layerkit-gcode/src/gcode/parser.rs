//! G-code text parser

use layerkit_core::ParseError;
use regex::Regex;
use std::sync::OnceLock;

use super::document::GcodeFile;
use super::line::{GcodeLine, GcodeParam, ParamValue};

fn command_regex() -> &'static Regex {
    static COMMAND_REGEX: OnceLock<Regex> = OnceLock::new();
    COMMAND_REGEX.get_or_init(|| Regex::new(r"^([GgMmTt])(\d+)$").expect("invalid regex pattern"))
}

fn param_regex() -> &'static Regex {
    static PARAM_REGEX: OnceLock<Regex> = OnceLock::new();
    PARAM_REGEX.get_or_init(|| {
        Regex::new(r"^([A-Za-z])(?:([-+]?\d+)|([-+]?(?:\d+\.\d*|\.\d+|\d+)(?:[eE][-+]?\d+)?))?$")
            .expect("invalid regex pattern")
    })
}

/// Stateless G-code line parser
#[derive(Debug, Default, Clone, Copy)]
pub struct GcodeParser;

impl GcodeParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a single line. `line_number` is 1-based and used for errors.
    pub fn parse_line(&self, text: &str, line_number: usize) -> Result<GcodeLine, ParseError> {
        let (code_part, comment) = match text.find(';') {
            Some(pos) => (&text[..pos], Some(text[pos + 1..].to_string())),
            None => (text, None),
        };
        let code_part = code_part.trim();

        let mut line = if code_part.is_empty() {
            match comment {
                Some(_) => GcodeLine::comment(String::new()),
                None => GcodeLine::blank(),
            }
        } else {
            self.parse_command(code_part, line_number)?
        };
        line.comment = comment;
        line.line_number = line_number;
        Ok(line)
    }

    fn parse_command(&self, code_part: &str, line_number: usize) -> Result<GcodeLine, ParseError> {
        let mut tokens = code_part.split_whitespace();
        let first = tokens.next().unwrap_or_default();

        // Words like TURN_OFF_HEATERS are firmware macros, not T commands
        let mut chars = first.chars();
        let coded_letter = chars
            .next()
            .is_some_and(|c| matches!(c.to_ascii_uppercase(), 'G' | 'M' | 'T'));
        let macro_word = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !coded_letter || macro_word {
            return Ok(GcodeLine::unknown(code_part));
        }

        let caps = command_regex().captures(first).ok_or_else(|| {
            ParseError::new(line_number, format!("malformed command word '{}'", first))
        })?;
        let code: u32 = caps[2]
            .parse()
            .map_err(|_| ParseError::new(line_number, format!("command number out of range in '{}'", first)))?;
        let mut line = match caps[1].to_ascii_uppercase().as_str() {
            "G" => GcodeLine::g(code),
            "M" => GcodeLine::m(code),
            _ => GcodeLine::t(code),
        };

        for token in tokens {
            line.params.push(parse_param(token, line_number)?);
        }
        Ok(line)
    }

    /// Parse a whole document
    pub fn parse_str(&self, text: &str) -> Result<GcodeFile, ParseError> {
        let lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| self.parse_line(line, i + 1))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(GcodeFile::from_lines(lines))
    }
}

fn parse_param(token: &str, line_number: usize) -> Result<GcodeParam, ParseError> {
    let caps = param_regex()
        .captures(token)
        .ok_or_else(|| ParseError::new(line_number, format!("malformed parameter '{}'", token)))?;
    let letter = caps[1]
        .chars()
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();
    let value = if let Some(int) = caps.get(2) {
        int.as_str()
            .parse()
            .map(ParamValue::Int)
            .map_err(|_| ParseError::new(line_number, format!("integer out of range in '{}'", token)))?
    } else if let Some(real) = caps.get(3) {
        real.as_str()
            .parse()
            .map(ParamValue::Float)
            .map_err(|_| ParseError::new(line_number, format!("malformed number in '{}'", token)))?
    } else {
        ParamValue::None
    };
    Ok(GcodeParam { letter, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcode::line::LineKind;

    #[test]
    fn test_parse_motion() {
        let line = GcodeParser::new()
            .parse_line("G1 X10.5 Y-3 E0.25 F1800 ; infill", 4)
            .unwrap();
        assert!(line.is('G', 1));
        assert_eq!(line.line_number, 4);
        assert_eq!(line.param('X'), Some(&ParamValue::Float(10.5)));
        assert_eq!(line.param('Y'), Some(&ParamValue::Int(-3)));
        assert_eq!(line.param('F'), Some(&ParamValue::Int(1800)));
        assert_eq!(line.comment.as_deref(), Some(" infill"));
    }

    #[test]
    fn test_parse_comment_blank_unknown() {
        let parser = GcodeParser::new();
        let comment = parser.parse_line(";LAYER:2", 1).unwrap();
        assert_eq!(comment.kind, LineKind::Comment);
        assert_eq!(comment.comment.as_deref(), Some("LAYER:2"));

        assert_eq!(parser.parse_line("   ", 2).unwrap().kind, LineKind::Blank);

        let unknown = parser.parse_line("BED_MESH_CALIBRATE", 3).unwrap();
        assert_eq!(unknown.kind, LineKind::Unknown);
        assert_eq!(unknown.text.as_deref(), Some("BED_MESH_CALIBRATE"));
    }

    #[test]
    fn test_bare_flag() {
        let line = GcodeParser::new().parse_line("g28 x y", 1).unwrap();
        assert!(line.is('G', 28));
        assert_eq!(line.param('X'), Some(&ParamValue::None));
    }

    #[test]
    fn test_malformed_reports_line() {
        let parser = GcodeParser::new();
        let err = parser.parse_line("G1 X1.0 Yfoo", 12).unwrap_err();
        assert_eq!(err.line, 12);
        assert!(err.reason.contains("Yfoo"));

        let err = parser.parse_line("G1.5 X1", 3).unwrap_err();
        assert_eq!(err.line, 3);

        let macro_line = parser.parse_line("TURN_OFF_HEATERS", 4).unwrap();
        assert_eq!(macro_line.kind, LineKind::Unknown);

        let err = parser
            .parse_str("G28\nG1 X1\nM104 S2x0\n")
            .unwrap_err();
        assert_eq!(err.line, 3);
    }
}
