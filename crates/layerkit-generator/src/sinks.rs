//! Streaming outputs of a generation call
//!
//! All sinks run on the calling thread in emission order. Any sink may
//! return [`SinkControl::Stop`] to cancel the call.

use layerkit_core::{ProgressSink, Sink, SinkControl};
use layerkit_gcode::GcodeLine;

/// Summary of one emitted layer
#[derive(Debug, Clone, PartialEq)]
pub struct PrintLayerData {
    pub part_index: usize,
    /// Layer index within the part, as planned
    pub layer_index: usize,
    /// Layer number in the output document
    pub document_layer: usize,
    pub z: f64,
    /// Layer height from the part's effective settings
    pub layer_height_mm: f64,
    /// Position of the layer's first line in the document
    pub first_line: usize,
    pub line_count: usize,
    /// The layer's lines as they appear in the document
    pub lines: Vec<GcodeLine>,
}

/// Optional callbacks receiving output as it is produced
#[derive(Default)]
pub struct GenerationSinks<'a> {
    pub line: Option<Sink<'a, GcodeLine>>,
    pub layer: Option<Sink<'a, PrintLayerData>>,
    pub progress: Option<ProgressSink<'a>>,
}

impl<'a> GenerationSinks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_line(mut self, sink: impl FnMut(&GcodeLine) -> SinkControl + 'a) -> Self {
        self.line = Some(Box::new(sink));
        self
    }

    pub fn on_layer(mut self, sink: impl FnMut(&PrintLayerData) -> SinkControl + 'a) -> Self {
        self.layer = Some(Box::new(sink));
        self
    }

    pub fn on_progress(mut self, sink: impl FnMut(&str) -> SinkControl + 'a) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    pub(crate) fn line(&mut self, line: &GcodeLine) -> SinkControl {
        self.line.as_mut().map_or(SinkControl::Continue, |sink| sink(line))
    }

    pub(crate) fn layer(&mut self, data: &PrintLayerData) -> SinkControl {
        self.layer.as_mut().map_or(SinkControl::Continue, |sink| sink(data))
    }

    pub(crate) fn progress(&mut self, message: &str) -> SinkControl {
        self.progress
            .as_mut()
            .map_or(SinkControl::Continue, |sink| sink(message))
    }
}

impl std::fmt::Debug for GenerationSinks<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationSinks")
            .field("line", &self.line.is_some())
            .field("layer", &self.layer.is_some())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}
