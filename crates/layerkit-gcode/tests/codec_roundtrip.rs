//! Text codec round-trip tests.

use proptest::prelude::*;

use layerkit_gcode::{
    load_gcode, save_gcode, to_gcode_string, GcodeAssembler, GcodeFile, GcodeIoError, GcodeLine,
    GcodeParser, JobParameters, LineKind, MarlinAssembler, RepRapAssembler, ToolpathCommand,
};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_comment() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[A-Za-z0-9 :.,_=-]{0,24}")
}

fn arb_param() -> impl Strategy<Value = (char, u8, i64, f64)> {
    (
        proptest::char::range('A', 'Z'),
        0u8..3,
        -100_000i64..100_000,
        -1.0e6f64..1.0e6,
    )
}

fn arb_coded() -> impl Strategy<Value = GcodeLine> {
    (
        0u8..3,
        0u32..1000,
        proptest::collection::vec(arb_param(), 0..6),
        arb_comment(),
    )
        .prop_map(|(kind, code, params, comment)| {
            let mut line = match kind {
                0 => GcodeLine::g(code),
                1 => GcodeLine::m(code),
                _ => GcodeLine::t(code),
            };
            for (letter, which, int, real) in params {
                line = match which {
                    0 => line.with_flag(letter),
                    1 => line.with_int(letter, int),
                    _ => line.with_float(letter, real),
                };
            }
            line.comment = comment;
            line
        })
}

fn arb_line() -> impl Strategy<Value = GcodeLine> {
    prop_oneof![
        4 => arb_coded(),
        1 => "[A-Za-z0-9 :.,_=-]{0,24}".prop_map(|c: String| GcodeLine::comment(c)),
        1 => Just(GcodeLine::blank()),
    ]
}

proptest! {
    #[test]
    fn written_documents_parse_back_identically(lines in proptest::collection::vec(arb_line(), 0..40)) {
        let file = GcodeFile::from_lines(lines);
        let text = to_gcode_string(&file);
        let parsed = GcodeParser::new().parse_str(&text).unwrap();
        prop_assert_eq!(parsed, file);
    }
}

// ---------------------------------------------------------------------------
// File persistence
// ---------------------------------------------------------------------------

fn assembled(assembler: &mut dyn GcodeAssembler) -> GcodeFile {
    let job = JobParameters {
        has_heated_bed: true,
        bed_temp_c: 60,
        auto_bed_leveling: true,
        origin_offset: (90.0, 90.0),
        ..JobParameters::default()
    };
    let mut out = Vec::new();
    assembler.begin(&job, &mut out);
    for layer in 0..3usize {
        let z = 0.2 * (layer as f64 + 1.0);
        assembler.begin_layer(layer, z, &mut out);
        assembler.append(
            &ToolpathCommand::Travel {
                x: 80.0,
                y: 80.0,
                z: None,
                speed: 9000.0,
            },
            &mut out,
        );
        assembler.append(
            &ToolpathCommand::Extrude {
                x: 100.0 + 1.0 / 3.0,
                y: 80.0,
                filament_mm: 0.731,
                speed: 1800.0,
            },
            &mut out,
        );
        assembler.append(&ToolpathCommand::Retract, &mut out);
        assembler.append(&ToolpathCommand::SetFan { fraction: 0.35 }, &mut out);
    }
    assembler.end(&mut out);
    GcodeFile::from_lines(out)
}

#[test]
fn test_save_load_roundtrip_for_each_dialect() {
    let dir = tempfile::tempdir().unwrap();
    let mut assemblers: Vec<Box<dyn GcodeAssembler>> =
        vec![RepRapAssembler::factory(), MarlinAssembler::factory()];
    for (i, assembler) in assemblers.iter_mut().enumerate() {
        let file = assembled(assembler.as_mut());
        let path = dir.path().join(format!("part{}.gcode", i));
        save_gcode(&path, &file).unwrap();
        let loaded = load_gcode(&path).unwrap();
        assert_eq!(loaded, file);
        assert_eq!(loaded.layer_count(), 3);
        assert_eq!(loaded.footer()[0].kind, LineKind::Comment);
    }
}

#[test]
fn test_load_reports_path_and_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.gcode");
    std::fs::write(&path, "G28\n;LAYER:0\nG1 X1 Y#\n").unwrap();
    let err = load_gcode(&path).unwrap_err();
    assert_eq!(err.line(), Some(3));
    assert!(err.to_string().contains("broken.gcode"));

    let missing = dir.path().join("missing.gcode");
    assert!(matches!(
        load_gcode(&missing),
        Err(GcodeIoError::Io { .. })
    ));
}

#[test]
fn test_firmware_macros_survive() {
    let text = "G28\nBED_MESH_CALIBRATE PROFILE=default\n;LAYER:0\nG1 X1.0 E0.5\n";
    let file = GcodeParser::new().parse_str(text).unwrap();
    assert_eq!(file.lines()[1].kind, LineKind::Unknown);
    assert_eq!(to_gcode_string(&file), text);
}
