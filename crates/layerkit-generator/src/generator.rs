//! Generator contract and the print generator
//!
//! A generation call takes an ordered list of parts, one global settings
//! value and optional sinks, and returns a complete G-code document or an
//! error. No partial document is ever returned.
//!
//! Steps, in order:
//! 1. Intake: part cardinality and per-part settings acceptance
//! 2. Global settings validation
//! 3. Dialect selection
//! 4. Per part: effective settings, planning, assembly into the document
//!
//! Every line is handed to the line sink before it is appended, and any sink
//! returning [`SinkControl::Stop`] ends the call with
//! [`GenerationError::Cancelled`].

use crate::part::PrintPart;
use crate::planner::{PlanError, PlannedLayer, ToolpathPlanner};
use crate::sinks::{GenerationSinks, PrintLayerData};
use layerkit_core::{CancelFlag, ConfigurationError, GenerationError, ValidationReport};
use layerkit_gcode::{GcodeFile, GcodeIoError, GcodeLine};
use layerkit_settings::{select_assembler, ProcessSettings};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Produces G-code documents from parts and process settings
pub trait Generator<S: ProcessSettings> {
    /// Part geometry accepted by this generator
    type Model;

    /// Whether more than one part may be passed to a single call
    fn accepts_parts(&self) -> bool;

    /// Whether parts may carry their own setting overrides
    fn accepts_part_settings(&self) -> bool;

    fn generate_gcode(
        &self,
        parts: &[PrintPart<Self::Model>],
        global: &S,
        sinks: GenerationSinks<'_>,
    ) -> Result<GcodeFile, GenerationError>;

    /// Write a generated document to disk
    fn save_gcode(&self, path: &Path, file: &GcodeFile) -> Result<(), GcodeIoError> {
        layerkit_gcode::save_gcode(path, file)
    }

    /// Read a document back from disk
    fn load_gcode(&self, path: &Path) -> Result<GcodeFile, GcodeIoError> {
        layerkit_gcode::load_gcode(path)
    }
}

/// Print generator options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Accept more than one part per call
    pub accepts_parts: bool,
    /// Accept per-part setting overrides
    pub accepts_part_settings: bool,
    /// Report progress every this many layers; 0 disables layer progress
    pub progress_interval: usize,
    /// Reject settings that validate with warnings
    pub warnings_as_errors: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            accepts_parts: true,
            accepts_part_settings: true,
            progress_interval: 10,
            warnings_as_errors: false,
        }
    }
}

/// Generator driving a [`ToolpathPlanner`] and the dialect assembler chosen
/// by the settings type.
pub struct PrintGenerator<S, P> {
    planner: P,
    config: GeneratorConfig,
    cancel: CancelFlag,
    _settings: PhantomData<fn() -> S>,
}

impl<S: ProcessSettings, P: ToolpathPlanner<S>> PrintGenerator<S, P> {
    pub fn new(planner: P) -> Self {
        Self::with_config(planner, GeneratorConfig::default())
    }

    pub fn with_config(planner: P, config: GeneratorConfig) -> Self {
        Self {
            planner,
            config,
            cancel: Arc::new(AtomicBool::new(false)),
            _settings: PhantomData,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn planner(&self) -> &P {
        &self.planner
    }

    /// Flag that cancels generation when set from any thread.
    ///
    /// The flag is polled before planning starts and between layers. A flag
    /// raised before a call cancels that call. Every call clears the flag
    /// when it returns, whatever its outcome.
    pub fn cancel_handle(&self) -> CancelFlag {
        Arc::clone(&self.cancel)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn check_intake(&self, parts: &[PrintPart<P::Model>]) -> Result<(), ConfigurationError> {
        if parts.is_empty() {
            return Err(ConfigurationError::NoParts);
        }
        if !self.config.accepts_parts && parts.len() > 1 {
            return Err(ConfigurationError::UnsupportedPartCount { count: parts.len() });
        }
        if !self.config.accepts_part_settings {
            if let Some(part_index) = parts.iter().position(PrintPart::has_overrides) {
                return Err(ConfigurationError::PartSettingsNotSupported { part_index });
            }
        }
        Ok(())
    }

    fn check_settings(&self, report: &ValidationReport) -> Result<(), ConfigurationError> {
        let rejected = report.has_errors() || (self.config.warnings_as_errors && report.has_warnings());
        if rejected {
            return Err(ConfigurationError::InvalidSettings(report.summary()));
        }
        for (field, result) in report.issues() {
            tracing::warn!("Setting {}: {}", field, result);
        }
        Ok(())
    }

    fn effective_settings(&self, part_index: usize, part: &PrintPart<P::Model>, global: &S) -> Result<S, GenerationError> {
        let wrap = |source: ConfigurationError| ConfigurationError::PartOverride {
            part_index,
            source: Box::new(source),
        };
        if !part.has_overrides() {
            return Ok(global.clone());
        }
        let effective = part.overrides.resolve(global).map_err(wrap)?;
        self.check_settings(&effective.validate()).map_err(wrap)?;
        Ok(effective)
    }

    fn run(
        &self,
        parts: &[PrintPart<P::Model>],
        global: &S,
        sinks: GenerationSinks<'_>,
    ) -> Result<GcodeFile, GenerationError> {
        self.check_intake(parts)?;
        self.check_settings(&global.validate())?;
        if self.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        let factory = select_assembler(global)?;
        let mut assembler = factory();
        let mut out = Emitter::new(sinks);

        tracing::info!(
            "Generating {} part(s) with '{}' ({})",
            parts.len(),
            global.identifier(),
            assembler.dialect()
        );
        out.progress(&format!("Starting {} part(s)", parts.len()))?;

        assembler.begin(&global.job_parameters(), &mut out.pending);
        out.flush()?;

        let mut document_layer = 0usize;
        for (part_index, part) in parts.iter().enumerate() {
            let settings = self.effective_settings(part_index, part, global)?;
            out.progress(&format!("Part {}/{}", part_index + 1, parts.len()))?;

            assembler.begin_part(part_index, &settings.job_parameters(), &mut out.pending);
            out.flush()?;

            let range = settings.layer_range_filter();
            if range.is_empty() {
                tracing::debug!("Part {}: layer range {} is empty", part_index, range);
                continue;
            }

            let failed = |err: PlanError, fallback: Option<usize>| GenerationError::PartFailed {
                part_index,
                layer_index: err.layer_index.or(fallback),
                reason: err.reason,
            };
            let layers = self
                .planner
                .plan_part(part_index, &part.model, &settings)
                .map_err(|e| failed(e, None))?;

            let mut next_layer = 0usize;
            for planned in layers {
                if self.is_cancelled() {
                    tracing::info!("Generation cancelled at part {} layer {}", part_index, next_layer);
                    return Err(GenerationError::Cancelled);
                }
                let layer = planned.map_err(|e| failed(e, Some(next_layer)))?;
                next_layer = layer.index + 1;
                if !range.contains(layer.index) {
                    continue;
                }
                if let Some(reason) = non_finite(&layer) {
                    return Err(failed(PlanError::at_layer(layer.index, reason), None));
                }

                let first_line = out.lines.len();
                assembler.begin_layer(document_layer, layer.z, &mut out.pending);
                out.flush()?;
                for command in &layer.commands {
                    assembler.append(command, &mut out.pending);
                    out.flush()?;
                }

                let data = PrintLayerData {
                    part_index,
                    layer_index: layer.index,
                    document_layer,
                    z: layer.z,
                    layer_height_mm: settings.layer_height_mm(),
                    first_line,
                    line_count: out.lines.len() - first_line,
                    lines: out.lines[first_line..].to_vec(),
                };
                if out.sinks.layer(&data).is_stop() {
                    return Err(GenerationError::Cancelled);
                }

                document_layer += 1;
                let interval = self.config.progress_interval;
                if interval > 0 && document_layer % interval == 0 {
                    out.progress(&format!("Generated {} layers", document_layer))?;
                }
            }
        }

        assembler.end(&mut out.pending);
        out.flush()?;
        out.progress(&format!(
            "Finished: {} layers, {} lines",
            document_layer,
            out.lines.len()
        ))?;
        tracing::info!("Generated {} layers, {} lines", document_layer, out.lines.len());

        Ok(GcodeFile::from_lines(out.lines))
    }
}

impl<S: ProcessSettings, P: ToolpathPlanner<S>> Generator<S> for PrintGenerator<S, P> {
    type Model = P::Model;

    fn accepts_parts(&self) -> bool {
        self.config.accepts_parts
    }

    fn accepts_part_settings(&self) -> bool {
        self.config.accepts_part_settings
    }

    fn generate_gcode(
        &self,
        parts: &[PrintPart<Self::Model>],
        global: &S,
        sinks: GenerationSinks<'_>,
    ) -> Result<GcodeFile, GenerationError> {
        let result = self.run(parts, global, sinks);
        self.cancel.store(false, Ordering::Relaxed);
        result
    }
}

/// Describes the first NaN or infinite value in a planned layer
fn non_finite(layer: &PlannedLayer) -> Option<String> {
    if !layer.z.is_finite() {
        return Some(format!("layer z is {}", layer.z));
    }
    layer
        .commands
        .iter()
        .find(|c| !c.is_finite())
        .map(|c| format!("non-finite value in {:?}", c))
}

/// Moves assembled lines through the line sink into the document
struct Emitter<'a> {
    sinks: GenerationSinks<'a>,
    pending: Vec<GcodeLine>,
    lines: Vec<GcodeLine>,
}

impl<'a> Emitter<'a> {
    fn new(sinks: GenerationSinks<'a>) -> Self {
        Self {
            sinks,
            pending: Vec::new(),
            lines: Vec::new(),
        }
    }

    fn flush(&mut self) -> Result<(), GenerationError> {
        for mut line in self.pending.drain(..) {
            line.line_number = self.lines.len() + 1;
            if self.sinks.line(&line).is_stop() {
                return Err(GenerationError::Cancelled);
            }
            self.lines.push(line);
        }
        Ok(())
    }

    fn progress(&mut self, message: &str) -> Result<(), GenerationError> {
        tracing::debug!("{}", message);
        if self.sinks.progress(message).is_stop() {
            return Err(GenerationError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{LayerStream, PlannedLayer};
    use layerkit_gcode::ToolpathCommand;
    use layerkit_settings::{GenericRepRapSettings, SettingsOverride, SingleMaterialFffSettings};
    use std::cell::Cell;

    /// Plans `model` layers of one extrusion each
    #[derive(Default)]
    struct Stack {
        calls: Cell<usize>,
    }

    impl<S: ProcessSettings> ToolpathPlanner<S> for Stack {
        type Model = usize;

        fn plan_part<'a>(
            &'a self,
            _part_index: usize,
            model: &'a usize,
            settings: &'a S,
        ) -> Result<LayerStream<'a>, PlanError> {
            self.calls.set(self.calls.get() + 1);
            let height = settings.layer_height_mm();
            Ok(Box::new((0..*model).map(move |i| {
                Ok::<_, PlanError>(PlannedLayer::new(i, height * (i + 1) as f64).with_commands(vec![
                    ToolpathCommand::Extrude {
                        x: 10.0,
                        y: 10.0,
                        filament_mm: 0.5,
                        speed: 1200.0,
                    },
                ]))
            })))
        }
    }

    #[test]
    fn test_intake_rejections() {
        let config = GeneratorConfig {
            accepts_parts: false,
            accepts_part_settings: false,
            ..GeneratorConfig::default()
        };
        let generator = PrintGenerator::<GenericRepRapSettings, _>::with_config(Stack::default(), config);
        let global = GenericRepRapSettings::default();

        let err = generator.generate_gcode(&[], &global, GenerationSinks::new()).unwrap_err();
        assert_eq!(err, GenerationError::Configuration(ConfigurationError::NoParts));

        let parts = vec![PrintPart::new(1), PrintPart::new(1)];
        let err = generator.generate_gcode(&parts, &global, GenerationSinks::new()).unwrap_err();
        assert_eq!(
            err,
            GenerationError::Configuration(ConfigurationError::UnsupportedPartCount { count: 2 })
        );

        let parts = vec![PrintPart::with_overrides(1, SettingsOverride::new().with("shells", 3u32))];
        let err = generator.generate_gcode(&parts, &global, GenerationSinks::new()).unwrap_err();
        assert_eq!(
            err,
            GenerationError::Configuration(ConfigurationError::PartSettingsNotSupported { part_index: 0 })
        );
        assert_eq!(generator.planner().calls.get(), 0);
    }

    #[test]
    fn test_missing_dialect_is_configuration_error() {
        let generator = PrintGenerator::<SingleMaterialFffSettings, _>::new(Stack::default());
        let err = generator
            .generate_gcode(&[PrintPart::new(2)], &SingleMaterialFffSettings::default(), GenerationSinks::new())
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Configuration(ConfigurationError::MissingDialect { .. })
        ));
        assert_eq!(generator.planner().calls.get(), 0);
    }

    #[test]
    fn test_document_has_one_span_per_layer() {
        let generator = PrintGenerator::<GenericRepRapSettings, _>::new(Stack::default());
        let file = generator
            .generate_gcode(&[PrintPart::new(4)], &GenericRepRapSettings::default(), GenerationSinks::new())
            .unwrap();
        assert_eq!(file.layer_count(), 4);
        assert!(!file.header().is_empty());
        assert!(!file.footer().is_empty());
        let numbers: Vec<usize> = file.lines().iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, (1..=file.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_cancel_raised_before_call_is_honoured_once() {
        let generator = PrintGenerator::<GenericRepRapSettings, _>::new(Stack::default());
        let global = GenericRepRapSettings::default();
        generator.cancel_handle().store(true, Ordering::Relaxed);

        let result = generator.generate_gcode(&[PrintPart::new(2)], &global, GenerationSinks::new());
        assert_eq!(result.unwrap_err(), GenerationError::Cancelled);
        assert_eq!(generator.planner().calls.get(), 0);
        assert!(!generator.cancel_handle().load(Ordering::Relaxed));

        let result = generator.generate_gcode(&[PrintPart::new(2)], &global, GenerationSinks::new());
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_defaults() {
        let config: GeneratorConfig = serde_json::from_str(r#"{"progress_interval": 5}"#).unwrap();
        assert_eq!(config.progress_interval, 5);
        assert!(config.accepts_parts);
        assert!(config.accepts_part_settings);
        assert!(!config.warnings_as_errors);
    }
}
