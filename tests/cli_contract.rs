use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use image::{Rgba, RgbaImage};
use tempfile::tempdir;

fn run_ebtext(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ebtext"))
        .current_dir(cwd)
        .env_remove("EBTEXT_LOG")
        .args(args)
        .output()
        .expect("ebtext command should run")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write_png(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().expect("png has a parent")).expect("theme dir should create");
    RgbaImage::from_pixel(width, height, Rgba([16, 16, 48, 255]))
        .save(path)
        .expect("png should write");
}

/// Theme bitmaps without any fonts.
fn write_theme_bitmaps(res: &Path, theme: &str) {
    let dir = res.join(theme);
    write_png(&dir.join("dialog.png"), 604, 256);
    write_png(&dir.join("arrowbig.png"), 24, 16);
    write_png(&dir.join("arrowsm.png"), 24, 16);
    write_png(&dir.join("arrownone.png"), 24, 16);
}

/// Complete `plain` theme with the checked-in fixture face as the dialogue font.
fn write_plain_resources(res: &Path) {
    write_theme_bitmaps(res, "plain");
    let font = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fonts/DejaVuSansMono.ttf");
    fs::copy(font, res.join("dialogue.otf")).expect("fixture font should copy");
}

#[test]
fn help_lists_subcommands() {
    let dir = tempdir().expect("tempdir should create");
    let output = run_ebtext(dir.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["render", "wrap", "check"] {
        assert!(stdout.contains(command), "help should mention {command}: {stdout}");
    }
}

#[test]
fn version_includes_git_revision_slot() {
    let dir = tempdir().expect("tempdir should create");
    let output = run_ebtext(dir.path(), &["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("ebtext "), "unexpected version: {stdout}");
    assert!(stdout.contains('(') && stdout.contains(')'));
}

#[test]
fn missing_theme_bitmap_is_a_resource_failure() {
    let dir = tempdir().expect("tempdir should create");
    let output = run_ebtext(dir.path(), &["check", "--res", "res"]);

    assert_eq!(output.status.code(), Some(3));
    let stderr = stderr(&output);
    assert!(stderr.contains("RESOURCE_LOAD_FAILURE"), "stderr: {stderr}");
    assert!(stderr.contains("dialog.png"), "stderr: {stderr}");
}

#[test]
fn missing_font_is_reported_after_bitmaps_load() {
    let dir = tempdir().expect("tempdir should create");
    write_theme_bitmaps(&dir.path().join("res"), "plain");

    let output = run_ebtext(dir.path(), &["wrap", "hello", "--res", "res"]);

    assert_eq!(output.status.code(), Some(3));
    let stderr = stderr(&output);
    assert!(stderr.contains("RESOURCE_LOAD_FAILURE"), "stderr: {stderr}");
    assert!(stderr.contains("font"), "stderr: {stderr}");
    assert!(stderr.contains("dialogue.otf"), "stderr: {stderr}");
}

#[test]
fn render_refuses_to_write_over_a_directory() {
    let dir = tempdir().expect("tempdir should create");
    fs::create_dir(dir.path().join("out")).expect("out dir should create");

    let output = run_ebtext(dir.path(), &["render", "hello", "-o", "out"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("is a directory"));
}

#[test]
fn unknown_config_field_is_rejected_with_location() {
    let dir = tempdir().expect("tempdir should create");
    fs::write(
        dir.path().join("ebtext.yaml"),
        "layout:\n  width: 604\n  colour: blue\n",
    )
    .expect("config should write");

    let output = run_ebtext(dir.path(), &["check", "--config", "ebtext.yaml"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr(&output);
    assert!(stderr.contains("failed to parse yaml"), "stderr: {stderr}");
    assert!(stderr.contains("line 3"), "stderr: {stderr}");
}

#[test]
fn theme_names_cannot_escape_the_resource_root() {
    let dir = tempdir().expect("tempdir should create");
    let output = run_ebtext(dir.path(), &["check", "--theme", "../plain"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("invalid config"));
}

#[test]
fn text_and_input_file_conflict() {
    let dir = tempdir().expect("tempdir should create");
    let output = run_ebtext(dir.path(), &["wrap", "hello", "--input", "dialogue.txt"]);

    assert_eq!(output.status.code(), Some(2), "clap usage errors exit 2");
}

#[test]
fn render_writes_a_looping_gif() {
    let dir = tempdir().expect("tempdir should create");
    write_plain_resources(&dir.path().join("res"));

    let output = run_ebtext(
        dir.path(),
        &["render", "Hello world!\nSecond speaker", "-o", "out.gif", "--res", "res"],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Wrote out.gif"), "stdout: {stdout}");
    assert!(stdout.contains("(35 frames, 0 scrolls"), "stdout: {stdout}");

    let bytes = fs::read(dir.path().join("out.gif")).expect("gif should exist");
    assert!(bytes.starts_with(b"GIF89a"));
}

#[test]
fn wrap_json_reports_an_empty_speaker_line() {
    let dir = tempdir().expect("tempdir should create");
    write_plain_resources(&dir.path().join("res"));

    let output = run_ebtext(dir.path(), &["wrap", "", "--json", "--res", "res"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("wrap --json should print json");
    assert_eq!(report["lines"], serde_json::json!([""]));
    assert_eq!(report["glyphs"], 0);
    assert_eq!(report["line_breaks"], 0);
}
