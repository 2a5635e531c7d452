//! Generated G-code document
//!
//! A [`GcodeFile`] is an ordered, replayable sequence of lines. Layers are
//! delimited by marker comments emitted by the assemblers:
//! `;LAYER:<n>` opens layer `n`, and `;FOOTER` closes the last layer.
//! Lines before the first marker form the header.

use super::line::{GcodeLine, LineKind};
use serde::{Deserialize, Serialize};

/// Comment prefix opening a layer
pub const LAYER_MARKER: &str = "LAYER:";

/// Comment closing the layer sequence
pub const FOOTER_MARKER: &str = "FOOTER";

/// Where one manufacturing layer sits in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSpan {
    /// Layer index as written in the marker
    pub index: usize,
    /// First line (the marker), as a position in `lines`
    pub start: usize,
    /// One past the last line of the layer
    pub end: usize,
}

/// Complete instruction stream returned by a generation call
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GcodeFile {
    lines: Vec<GcodeLine>,
    layers: Vec<LayerSpan>,
}

impl GcodeFile {
    /// Build a document, numbering lines from 1 and locating layer markers
    pub fn from_lines(mut lines: Vec<GcodeLine>) -> Self {
        for (i, line) in lines.iter_mut().enumerate() {
            line.line_number = i + 1;
        }
        let layers = find_layers(&lines);
        Self { lines, layers }
    }

    /// Every line in emission order
    pub fn lines(&self) -> &[GcodeLine] {
        &self.lines
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when the document has no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Layer spans in order
    pub fn layer_spans(&self) -> &[LayerSpan] {
        &self.layers
    }

    /// Number of layers
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Lines of each layer, in order
    pub fn layers(&self) -> impl Iterator<Item = (usize, &[GcodeLine])> {
        self.layers
            .iter()
            .map(move |span| (span.index, &self.lines[span.start..span.end]))
    }

    /// Lines before the first layer
    pub fn header(&self) -> &[GcodeLine] {
        let end = self.layers.first().map_or(self.footer_start(), |s| s.start);
        &self.lines[..end]
    }

    /// Lines after the last layer, starting at the footer marker
    pub fn footer(&self) -> &[GcodeLine] {
        &self.lines[self.footer_start()..]
    }

    /// Consume the document, returning its lines
    pub fn into_lines(self) -> Vec<GcodeLine> {
        self.lines
    }

    fn footer_start(&self) -> usize {
        self.lines
            .iter()
            .position(is_footer_marker)
            .unwrap_or(self.lines.len())
    }
}

fn layer_marker_index(line: &GcodeLine) -> Option<usize> {
    if line.kind != LineKind::Comment {
        return None;
    }
    line.comment
        .as_deref()
        .and_then(|c| c.strip_prefix(LAYER_MARKER))
        .and_then(|n| n.trim().parse().ok())
}

fn is_footer_marker(line: &GcodeLine) -> bool {
    line.kind == LineKind::Comment && line.comment.as_deref() == Some(FOOTER_MARKER)
}

fn find_layers(lines: &[GcodeLine]) -> Vec<LayerSpan> {
    let mut layers: Vec<LayerSpan> = Vec::new();
    for (pos, line) in lines.iter().enumerate() {
        if let Some(index) = layer_marker_index(line) {
            if let Some(open) = layers.last_mut() {
                if open.end == usize::MAX {
                    open.end = pos;
                }
            }
            layers.push(LayerSpan {
                index,
                start: pos,
                end: usize::MAX,
            });
        } else if is_footer_marker(line) {
            if let Some(open) = layers.last_mut() {
                if open.end == usize::MAX {
                    open.end = pos;
                }
            }
        }
    }
    if let Some(open) = layers.last_mut() {
        if open.end == usize::MAX {
            open.end = lines.len();
        }
    }
    layers
}
