//! Batch builds and written outputs.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use shc::{build_files, render, write_record, BuildConfig, BuildError, ErrorCode};
use std::path::PathBuf;

const QUAD: &str = "\
struct VsIn { float2 pos; float2 uv; };
struct VsOut { float4 pos : sv_position; float2 uv; };
struct PsOut { float4 color : sv_target0; };
texture2d image(0);
vertex VsOut main(VsIn input) {
    VsOut o;
    o.pos = float4(input.pos, 0.0, 1.0);
    o.uv = input.uv;
    return o;
}
fragment PsOut main(VsOut input) {
    PsOut o;
    o.color = sample(image, input.uv);
    return o;
}
";

fn write_sources(dir: &tempfile::TempDir, files: &[(&str, &str)]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|(name, source)| {
            let path = dir.path().join(name);
            std::fs::write(&path, source).unwrap();
            path
        })
        .collect()
}

#[test]
fn test_failing_file_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let broken = "compute(1, 1, 1) void main() {\n    float x = ;\n}\n";
    let mut paths = write_sources(&dir, &[("quad.shader", QUAD), ("broken.shader", broken)]);
    paths.push(dir.path().join("missing.shader"));

    let outcomes = build_files(&paths, &BuildConfig::default());
    let names: Vec<PathBuf> = outcomes.iter().map(|o| o.path.clone()).collect();
    assert_eq!(names, paths);

    let record = outcomes[0].result.as_ref().unwrap();
    assert_eq!(record.name, "quad");
    assert_eq!(record.outputs.len(), 6);

    let Err(BuildError::Compile(error)) = &outcomes[1].result else {
        panic!("expected a compile error, got {:?}", outcomes[1].result);
    };
    assert_eq!(error.code, ErrorCode::E1002);
    assert_eq!(error.file(), Some(paths[1].as_path()));
    let report = render(error, &outcomes[1].source);
    assert!(report.contains("E1002"), "{report}");
    assert!(report.contains("broken.shader"), "{report}");

    assert!(matches!(outcomes[2].result, Err(BuildError::Read { .. })));
}

#[test]
fn test_written_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_sources(&dir, &[("quad.shader", QUAD)]);
    let config = BuildConfig {
        output_dir: dir.path().join("out"),
        ..BuildConfig::default()
    };
    let outcome = build_files(&paths, &config).remove(0);
    let record = outcome.result.unwrap();
    let written = write_record(&record, &config).unwrap();
    assert_eq!(
        written,
        vec![
            config.output_dir.join("quad.shbin"),
            config.output_dir.join("quad.reflect.json"),
        ]
    );

    let shbin = std::fs::read(&written[0]).unwrap();
    assert_eq!(shbin, record.to_shbin());
    assert!(shbin.ends_with(&record.blob));

    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&written[1]).unwrap()).unwrap();
    assert_eq!(manifest["name"], "quad");
    assert_eq!(manifest["outputs"].as_array().map(Vec::len), Some(6));
    let reflection = &manifest["reflection"];
    assert_eq!(reflection["vertex_format"]["stride"], 16);
    assert_eq!(reflection["textures"][0]["name"], "image");
    assert_eq!(reflection["textures"][0]["stages"], serde_json::json!(["fragment"]));
    assert_eq!(reflection["render_targets"][0]["field"], "color");
}

#[test]
fn test_no_reflect_writes_only_the_binary() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_sources(&dir, &[("quad.shader", QUAD)]);
    let config = BuildConfig {
        output_dir: dir.path().to_path_buf(),
        reflect: false,
        parallel: false,
        ..BuildConfig::default()
    };
    let record = build_files(&paths, &config).remove(0).result.unwrap();
    let written = write_record(&record, &config).unwrap();
    assert_eq!(written, vec![dir.path().join("quad.shbin")]);
    assert!(!dir.path().join("quad.reflect.json").exists());
}
