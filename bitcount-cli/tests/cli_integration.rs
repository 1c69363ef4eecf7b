use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const DECODER_OUTPUT: &str = "\
HM software: Decoder Version [16.20]
 CABAC_BITS__SKIP_FLAG : 1 2 3 4 5 6 7 100 ( 10)
 CABAC_BITS__GT1_FLAG : 1 2 3 4 5 6 7 300 ( 30)
 NAL_UNIT_TOTAL_BODY : 1 2 3 4 5 6 7 500 ( 50)
 SLICE_HEADER_BITS :  -  -  1  2  3  40 ( 4)
 32 CUs: 40 10 20 5 5
";

// Helper function to get the path to the compiled binary
fn bitcount_cmd() -> Command {
    Command::cargo_bin("hevc-bitcount").expect("Failed to find hevc-bitcount binary")
}

#[test]
fn test_help_lists_run_options() -> Result<(), Box<dyn Error>> {
    bitcount_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--bitrates"))
        .stdout(contains("classify"));
    Ok(())
}

#[test]
fn test_classify_json_output() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("bits.txt");
    fs::write(&file, DECODER_OUTPUT)?;

    let output = bitcount_cmd()
        .arg("classify")
        .arg(&file)
        .arg("--json")
        .output()?;
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["buckets"]["prediction"], 100);
    assert_eq!(value["buckets"]["residual"], 300);
    assert_eq!(value["buckets"]["other"], 40);
    assert_eq!(value["excluded_lines"], 1);
    assert_eq!(value["ignored_lines"], 1);
    assert_eq!(value["coding_units"]["32"]["intra"], 20);
    Ok(())
}

#[test]
fn test_classify_text_output() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("bits.txt");
    fs::write(&file, DECODER_OUTPUT)?;

    bitcount_cmd()
        .arg("classify")
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("Prediction:"))
        .stdout(contains("CODING UNITS"));
    Ok(())
}

#[test]
fn test_classify_missing_file_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    bitcount_cmd()
        .arg("classify")
        .arg(dir.path().join("absent.txt"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Failed to read decoder output"));
    Ok(())
}

#[test]
fn test_invalid_bitrate_is_rejected() -> Result<(), Box<dyn Error>> {
    bitcount_cmd()
        .args(["run", "--bitrates", "500k,fast"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Invalid --bitrates value"));
    Ok(())
}

#[test]
fn test_non_existent_input() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    bitcount_cmd()
        .arg("--input")
        .arg("surely/this/does/not/exist/input.mp4")
        .arg("--work-dir")
        .arg(work_dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Invalid input path"));
    Ok(())
}

#[test]
fn test_unknown_format_is_a_usage_error() -> Result<(), Box<dyn Error>> {
    bitcount_cmd()
        .args(["--format", "xml"])
        .assert()
        .failure()
        .stderr(contains("xml"));
    Ok(())
}

#[test]
fn test_missing_ffmpeg_is_fatal() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let source = dir.path().join("clip.mp4");
    fs::write(&source, "dummy content")?;

    bitcount_cmd()
        .env("HEVC_BITCOUNT_FFMPEG", dir.path().join("no-such-ffmpeg"))
        .arg("--input")
        .arg(&source)
        .arg("--bitrates")
        .arg("500k")
        .arg("--work-dir")
        .arg(dir.path())
        .arg("--format")
        .arg("tsv")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Failed to start no-such-ffmpeg"));
    Ok(())
}

#[cfg(unix)]
const FAKE_FFMPEG: &str = r#"#!/bin/sh
case "$*" in
  *pass=2*)
    printf 'mp4' > recoded.mp4
    printf 'log' > x265_2pass.log
    cat >&2 <<'OUT'
  Stream #0:0: Video: h264, yuv420p, 1280x720, 25 fps, 25 tbr
encoded 100 frames in 5.00s (20.00 fps), 480.00 kb/s, Avg QP:30.12, Global PSNR: 40.500
OUT
    ;;
  *pass=1*)
    printf 'log' > x265_2pass.log
    printf 'tree' > x265_2pass.log.cutree
    ;;
  *hevc_mp4toannexb*)
    head -c 250000 /dev/zero > recoded.h265
    ;;
esac
exit 0
"#;

#[cfg(unix)]
fn write_script(path: &Path, body: &str) -> Result<(), Box<dyn Error>> {
    use std::os::unix::fs::PermissionsExt;
    fs::write(path, body)?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_full_run_with_stand_in_tools() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let source = dir.path().join("clip.mp4");
    fs::write(&source, "dummy content")?;
    let work_dir = dir.path().join("work");

    let ffmpeg = dir.path().join("fake-ffmpeg");
    write_script(&ffmpeg, FAKE_FFMPEG)?;

    let decoder = dir.path().join("fake-decoder");
    write_script(
        &decoder,
        &format!("#!/bin/sh\ncat <<'OUT'\n{DECODER_OUTPUT}OUT\n"),
    )?;

    let output = bitcount_cmd()
        .arg("--input")
        .arg(&source)
        .arg("--bitrates")
        .arg("500k,250k")
        .arg("--work-dir")
        .arg(&work_dir)
        .arg("--ffmpeg")
        .arg(&ffmpeg)
        .arg("--decoder")
        .arg(&decoder)
        .arg("--keep-recoded")
        .arg("--format")
        .arg("tsv")
        .output()?;
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("bitrate\ttarget_kbps\tkbps\t"));
    assert!(lines[1].starts_with("500k\t500.00\t500.00\t"));
    assert!(lines[2].starts_with("250k\t250.00\t500.00\t"));

    for name in [
        "recoded.mp4",
        "recoded.h265",
        "x265_2pass.log",
        "x265_2pass.log.cutree",
    ] {
        assert!(!work_dir.join(name).exists(), "{name} was left behind");
    }
    assert!(work_dir.join("500k_recoded.mp4").exists());
    assert!(work_dir.join("250k_recoded.mp4").exists());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_relative_decoder_path_with_separate_work_dir() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("clip.mp4"), "dummy content")?;
    fs::create_dir(dir.path().join("bin"))?;

    let ffmpeg = dir.path().join("fake-ffmpeg");
    write_script(&ffmpeg, FAKE_FFMPEG)?;
    write_script(
        &dir.path().join("bin").join("TAppDecoder"),
        &format!("#!/bin/sh\ncat <<'OUT'\n{DECODER_OUTPUT}OUT\n"),
    )?;

    let output = bitcount_cmd()
        .current_dir(dir.path())
        .args(["--input", "clip.mp4", "--bitrates", "500k"])
        .args(["--work-dir", "work", "--decoder", "./bin/TAppDecoder"])
        .arg("--ffmpeg")
        .arg(&ffmpeg)
        .args(["--format", "tsv"])
        .output()?;
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("500k\t500.00\t500.00\t"));
    assert!(!dir.path().join("work").join("recoded.h265").exists());
    Ok(())
}

#[test]
fn test_verbose_flag_before_classify() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("bits.txt");
    fs::write(&file, DECODER_OUTPUT)?;

    bitcount_cmd()
        .arg("-v")
        .arg("classify")
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("Prediction:"));
    Ok(())
}
