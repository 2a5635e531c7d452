//! Marlin dialect
//!
//! RepRap output plus bed probing (`G29`) when auto-leveling is enabled,
//! 8-bit fan duty cycles, and an explicit fan-off in the end sequence.

use super::{Dialect, GcodeAssembler, JobParameters, RepRapAssembler, ToolpathCommand};
use crate::gcode::GcodeLine;

#[derive(Debug, Clone, Default)]
pub struct MarlinAssembler {
    inner: RepRapAssembler,
    auto_bed_leveling: bool,
}

impl MarlinAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factory() -> Box<dyn GcodeAssembler> {
        Box::new(Self::new())
    }
}

impl GcodeAssembler for MarlinAssembler {
    fn dialect(&self) -> Dialect {
        Dialect::Marlin
    }

    fn begin(&mut self, job: &JobParameters, out: &mut Vec<GcodeLine>) {
        self.auto_bed_leveling = job.auto_bed_leveling;
        self.inner.configure(job);
        self.inner.emit_preamble(Dialect::Marlin, out);
        self.inner.emit_home(out);
        if self.auto_bed_leveling {
            out.push(GcodeLine::g(29).with_comment(" auto bed leveling"));
        }
        self.inner.emit_heat_and_prime(out);
    }

    fn begin_part(&mut self, part_index: usize, job: &JobParameters, out: &mut Vec<GcodeLine>) {
        self.inner.switch_job(part_index, job, out);
    }

    fn begin_layer(&mut self, index: usize, z: f64, out: &mut Vec<GcodeLine>) {
        self.inner.begin_layer(index, z, out);
    }

    fn append(&mut self, command: &ToolpathCommand, out: &mut Vec<GcodeLine>) {
        match command {
            ToolpathCommand::SetFan { fraction } if *fraction > 0.0 => {
                let duty = (fraction.clamp(0.0, 1.0) * 255.0).round() as i64;
                out.push(GcodeLine::m(106).with_int('S', duty));
            }
            other => self.inner.append(other, out),
        }
    }

    fn end(&mut self, out: &mut Vec<GcodeLine>) {
        self.inner.emit_shutdown(out);
        out.push(GcodeLine::m(107));
        self.inner.emit_motors_off(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(lines: &[GcodeLine]) -> Vec<String> {
        lines
            .iter()
            .filter_map(|l| l.kind.letter().map(|c| format!("{}{}", c, l.code)))
            .collect()
    }

    #[test]
    fn test_probe_after_homing_when_enabled() {
        let mut asm = MarlinAssembler::new();
        let mut out = Vec::new();
        let job = JobParameters {
            auto_bed_leveling: true,
            ..JobParameters::default()
        };
        asm.begin(&job, &mut out);
        let codes = codes(&out);
        let home = codes.iter().position(|c| c == "G28").unwrap();
        assert_eq!(codes[home + 1], "G29");
    }

    #[test]
    fn test_no_probe_when_disabled() {
        let mut asm = MarlinAssembler::new();
        let mut out = Vec::new();
        asm.begin(&JobParameters::default(), &mut out);
        assert!(!codes(&out).contains(&"G29".to_string()));
    }

    #[test]
    fn test_fan_duty_and_footer() {
        let mut asm = MarlinAssembler::new();
        let mut out = Vec::new();
        asm.begin(&JobParameters::default(), &mut out);
        out.clear();
        asm.append(&ToolpathCommand::SetFan { fraction: 1.0 }, &mut out);
        asm.append(&ToolpathCommand::SetFan { fraction: 0.0 }, &mut out);
        assert_eq!(out[0].to_string(), "M106 S255");
        assert_eq!(out[1].to_string(), "M107");

        out.clear();
        asm.end(&mut out);
        assert_eq!(codes(&out), vec!["M104", "M107", "M84"]);
    }
}
