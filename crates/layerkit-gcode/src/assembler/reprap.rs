//! RepRap dialect
//!
//! Absolute extrusion (`M82`), millimetre units, firmware-agnostic start and
//! end sequences. Retraction is done with plain `G1 E` moves.

use super::{feed, round3, Dialect, GcodeAssembler, JobParameters, ToolpathCommand};
use crate::gcode::{GcodeLine, FOOTER_MARKER, LAYER_MARKER};

#[derive(Debug, Clone, Default)]
pub struct RepRapAssembler {
    job: JobParameters,
    /// Absolute filament position as last written
    extruder_mm: f64,
    retracted: bool,
    /// Filament pulled back by the pending retraction
    retracted_mm: f64,
    z: f64,
}

impl RepRapAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factory() -> Box<dyn GcodeAssembler> {
        Box::new(Self::new())
    }

    /// Absolute extruder position after the lines emitted so far
    pub fn extruder_position(&self) -> f64 {
        self.extruder_mm
    }

    pub fn is_retracted(&self) -> bool {
        self.retracted
    }

    pub(super) fn configure(&mut self, job: &JobParameters) {
        self.job = job.clone();
        self.extruder_mm = 0.0;
        self.retracted = false;
        self.retracted_mm = 0.0;
        self.z = 0.0;
    }

    /// Adopt a part's parameters mid-print, heating to any changed
    /// temperature before the part starts.
    pub(super) fn switch_job(&mut self, part_index: usize, job: &JobParameters, out: &mut Vec<GcodeLine>) {
        if job.has_heated_bed && job.bed_temp_c != self.job.bed_temp_c {
            let code = if job.bed_temp_c > 0 { 190 } else { 140 };
            out.push(
                GcodeLine::m(code)
                    .with_int('S', i64::from(job.bed_temp_c))
                    .with_comment(format!(" part {}", part_index)),
            );
        }
        if job.extruder_temp_c != self.job.extruder_temp_c {
            out.push(
                GcodeLine::m(109)
                    .with_int('S', i64::from(job.extruder_temp_c))
                    .with_comment(format!(" part {}", part_index)),
            );
        }
        self.job = job.clone();
    }

    fn heated_bed(&self) -> bool {
        self.job.has_heated_bed && self.job.bed_temp_c > 0
    }

    /// Identification comments, units, modes and non-blocking heater starts
    pub(super) fn emit_preamble(&self, dialect: Dialect, out: &mut Vec<GcodeLine>) {
        out.push(GcodeLine::comment(format!(" generated by layerkit ({})", dialect)));
        out.push(GcodeLine::comment(format!(" profile: {}", self.job.profile_name)));
        out.push(GcodeLine::comment(format!(" material: {}", self.job.material_name)));
        out.push(GcodeLine::comment(format!(
            " layer height: {}",
            self.job.layer_height_mm
        )));
        out.push(GcodeLine::g(21).with_comment(" millimetres"));
        out.push(GcodeLine::g(90).with_comment(" absolute positioning"));
        out.push(GcodeLine::m(82).with_comment(" absolute extrusion"));
        out.push(GcodeLine::m(107));
        if self.heated_bed() {
            out.push(GcodeLine::m(140).with_int('S', i64::from(self.job.bed_temp_c)));
        }
        out.push(GcodeLine::m(104).with_int('S', i64::from(self.job.extruder_temp_c)));
    }

    pub(super) fn emit_home(&self, out: &mut Vec<GcodeLine>) {
        out.push(GcodeLine::g(28).with_comment(" home all axes"));
    }

    /// Block until heaters are at temperature, then zero the extruder
    pub(super) fn emit_heat_and_prime(&self, out: &mut Vec<GcodeLine>) {
        if self.heated_bed() {
            out.push(GcodeLine::m(190).with_int('S', i64::from(self.job.bed_temp_c)));
        }
        out.push(GcodeLine::m(109).with_int('S', i64::from(self.job.extruder_temp_c)));
        out.push(GcodeLine::g(92).with_int('E', 0));
    }

    /// Footer marker and heaters off
    pub(super) fn emit_shutdown(&self, out: &mut Vec<GcodeLine>) {
        out.push(GcodeLine::comment(FOOTER_MARKER));
        out.push(GcodeLine::m(104).with_int('S', 0));
        if self.job.has_heated_bed {
            out.push(GcodeLine::m(140).with_int('S', 0));
        }
    }

    pub(super) fn emit_motors_off(&self, out: &mut Vec<GcodeLine>) {
        out.push(GcodeLine::m(84).with_comment(" motors off"));
    }

    fn machine_xy(&self, x: f64, y: f64) -> (f64, f64) {
        let (ox, oy) = self.job.origin_offset;
        (round3(x - ox), round3(y - oy))
    }

    fn retract(&mut self, out: &mut Vec<GcodeLine>) {
        if !self.job.enable_retraction || self.retracted {
            return;
        }
        self.retracted_mm = self.job.retract_distance_mm;
        self.extruder_mm -= self.retracted_mm;
        self.retracted = true;
        out.push(
            GcodeLine::g(1)
                .with_float('E', round3(self.extruder_mm))
                .with_int('F', feed(self.job.retract_speed_mmm)),
        );
    }

    fn unretract(&mut self, out: &mut Vec<GcodeLine>) {
        if !self.retracted {
            return;
        }
        self.extruder_mm += self.retracted_mm;
        self.retracted = false;
        out.push(
            GcodeLine::g(1)
                .with_float('E', round3(self.extruder_mm))
                .with_int('F', feed(self.job.retract_speed_mmm)),
        );
    }
}

impl GcodeAssembler for RepRapAssembler {
    fn dialect(&self) -> Dialect {
        Dialect::RepRap
    }

    fn begin(&mut self, job: &JobParameters, out: &mut Vec<GcodeLine>) {
        self.configure(job);
        self.emit_preamble(Dialect::RepRap, out);
        self.emit_home(out);
        self.emit_heat_and_prime(out);
    }

    fn begin_part(&mut self, part_index: usize, job: &JobParameters, out: &mut Vec<GcodeLine>) {
        self.switch_job(part_index, job, out);
    }

    fn begin_layer(&mut self, index: usize, z: f64, out: &mut Vec<GcodeLine>) {
        out.push(GcodeLine::comment(format!("{}{}", LAYER_MARKER, index)));
        self.z = round3(z);
        out.push(
            GcodeLine::g(0)
                .with_float('Z', self.z)
                .with_int('F', feed(self.job.z_travel_speed_mmm)),
        );
    }

    fn append(&mut self, command: &ToolpathCommand, out: &mut Vec<GcodeLine>) {
        match command {
            ToolpathCommand::Travel { x, y, z, speed } => {
                let (mx, my) = self.machine_xy(*x, *y);
                let mut line = GcodeLine::g(0).with_float('X', mx).with_float('Y', my);
                if let Some(z) = z {
                    self.z = round3(*z);
                    line = line.with_float('Z', self.z);
                }
                out.push(line.with_int('F', feed(*speed)));
            }
            ToolpathCommand::Extrude {
                x,
                y,
                filament_mm,
                speed,
            } => {
                self.unretract(out);
                self.extruder_mm += filament_mm;
                let (mx, my) = self.machine_xy(*x, *y);
                out.push(
                    GcodeLine::g(1)
                        .with_float('X', mx)
                        .with_float('Y', my)
                        .with_float('E', round3(self.extruder_mm))
                        .with_int('F', feed(*speed)),
                );
            }
            ToolpathCommand::Retract => self.retract(out),
            ToolpathCommand::Unretract => self.unretract(out),
            ToolpathCommand::SetExtruderTemp { celsius, wait } => {
                let code = if *wait { 109 } else { 104 };
                out.push(GcodeLine::m(code).with_int('S', i64::from(*celsius)));
            }
            ToolpathCommand::SetBedTemp { celsius, wait } => {
                let code = if *wait { 190 } else { 140 };
                out.push(GcodeLine::m(code).with_int('S', i64::from(*celsius)));
            }
            ToolpathCommand::SetFan { fraction } => {
                let fraction = fraction.clamp(0.0, 1.0);
                if fraction <= 0.0 {
                    out.push(GcodeLine::m(107));
                } else {
                    out.push(GcodeLine::m(106).with_float('S', round3(fraction)));
                }
            }
            ToolpathCommand::Dwell { ms } => {
                out.push(GcodeLine::g(4).with_int('P', i64::from(*ms)));
            }
            ToolpathCommand::Comment(text) => out.push(GcodeLine::comment(format!(" {}", text))),
        }
    }

    fn end(&mut self, out: &mut Vec<GcodeLine>) {
        self.emit_shutdown(out);
        self.emit_motors_off(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcode::ParamValue;

    fn job() -> JobParameters {
        JobParameters {
            has_heated_bed: true,
            bed_temp_c: 60,
            origin_offset: (100.0, 100.0),
            ..JobParameters::default()
        }
    }

    fn codes(lines: &[GcodeLine]) -> Vec<String> {
        lines
            .iter()
            .filter_map(|l| l.kind.letter().map(|c| format!("{}{}", c, l.code)))
            .collect()
    }

    #[test]
    fn test_start_sequence_order() {
        let mut asm = RepRapAssembler::new();
        let mut out = Vec::new();
        asm.begin(&job(), &mut out);
        assert_eq!(
            codes(&out),
            vec!["G21", "G90", "M82", "M107", "M140", "M104", "G28", "M190", "M109", "G92"]
        );
    }

    #[test]
    fn test_cold_bed_skips_bed_heating() {
        let mut asm = RepRapAssembler::new();
        let mut out = Vec::new();
        asm.begin(&JobParameters::default(), &mut out);
        let codes = codes(&out);
        assert!(!codes.contains(&"M140".to_string()));
        assert!(!codes.contains(&"M190".to_string()));
    }

    #[test]
    fn test_origin_offset_and_absolute_extrusion() {
        let mut asm = RepRapAssembler::new();
        let mut out = Vec::new();
        asm.begin(&job(), &mut out);
        out.clear();

        asm.begin_layer(0, 0.2, &mut out);
        assert_eq!(out[0].comment.as_deref(), Some("LAYER:0"));

        asm.append(
            &ToolpathCommand::Extrude {
                x: 110.0,
                y: 95.5,
                filament_mm: 0.5,
                speed: 1800.0,
            },
            &mut out,
        );
        asm.append(
            &ToolpathCommand::Extrude {
                x: 120.0,
                y: 95.5,
                filament_mm: 0.25,
                speed: 1800.0,
            },
            &mut out,
        );
        let last = out.last().unwrap();
        assert_eq!(last.param('X'), Some(&ParamValue::Float(20.0)));
        assert_eq!(last.param('Y'), Some(&ParamValue::Float(-4.5)));
        assert_eq!(last.param('E'), Some(&ParamValue::Float(0.75)));
        assert_eq!(last.param('F'), Some(&ParamValue::Int(1800)));
    }

    #[test]
    fn test_retract_then_auto_unretract() {
        let mut asm = RepRapAssembler::new();
        let mut out = Vec::new();
        asm.begin(&JobParameters::default(), &mut out);
        out.clear();

        asm.append(&ToolpathCommand::Retract, &mut out);
        asm.append(&ToolpathCommand::Retract, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].param('E'), Some(&ParamValue::Float(-1.3)));
        assert!(asm.is_retracted());

        asm.append(
            &ToolpathCommand::Extrude {
                x: 1.0,
                y: 1.0,
                filament_mm: 0.1,
                speed: 600.0,
            },
            &mut out,
        );
        assert_eq!(out.len(), 3);
        assert_eq!(out[1].param('E'), Some(&ParamValue::Float(0.0)));
        assert!((asm.extruder_position() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_part_job_changes_temperature_and_retraction() {
        let mut asm = RepRapAssembler::new();
        let mut out = Vec::new();
        asm.begin(&job(), &mut out);

        out.clear();
        asm.begin_part(0, &job(), &mut out);
        assert!(out.is_empty());

        asm.append(&ToolpathCommand::Retract, &mut out);
        assert_eq!(out[0].param('E'), Some(&ParamValue::Float(-1.3)));

        let hotter = JobParameters {
            extruder_temp_c: 250,
            bed_temp_c: 70,
            retract_distance_mm: 5.0,
            ..job()
        };
        out.clear();
        asm.begin_part(1, &hotter, &mut out);
        assert_eq!(out[0].to_string(), "M190 S70 ; part 1");
        assert_eq!(out[1].to_string(), "M109 S250 ; part 1");

        // the pending retraction is undone by the amount it pulled back
        out.clear();
        asm.append(&ToolpathCommand::Unretract, &mut out);
        assert_eq!(out[0].param('E'), Some(&ParamValue::Float(0.0)));
        asm.append(&ToolpathCommand::Retract, &mut out);
        assert_eq!(out[1].param('E'), Some(&ParamValue::Float(-5.0)));
    }

    #[test]
    fn test_retraction_disabled() {
        let mut asm = RepRapAssembler::new();
        let mut out = Vec::new();
        let job = JobParameters {
            enable_retraction: false,
            ..JobParameters::default()
        };
        asm.begin(&job, &mut out);
        out.clear();
        asm.append(&ToolpathCommand::Retract, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_fan_and_footer() {
        let mut asm = RepRapAssembler::new();
        let mut out = Vec::new();
        asm.begin(&job(), &mut out);
        out.clear();
        asm.append(&ToolpathCommand::SetFan { fraction: 0.5 }, &mut out);
        asm.append(&ToolpathCommand::SetFan { fraction: 0.0 }, &mut out);
        assert_eq!(out[0].to_string(), "M106 S0.5");
        assert_eq!(out[1].to_string(), "M107");

        out.clear();
        asm.end(&mut out);
        assert_eq!(out[0].comment.as_deref(), Some(FOOTER_MARKER));
        assert_eq!(codes(&out), vec!["M104", "M140", "M84"]);
    }
}
