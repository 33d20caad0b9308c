use std::fs;
use std::path::PathBuf;

use shield_camera::{FrameSize, Pattern, PatternSensor, PixelFormat, Sensor};
use shield_tv::{TvError, TvOutput, TvType};
use tv_shield::config::{OutputSettings, SourceSettings};
use tv_shield::{load_settings, setup, ConfigError, Settings};

const SHIELD_TOML: &str = r#"
[sensor]
pixformat = "RGB565"
framesize = "QQVGA"

[sensor.source]
kind = "v4l"
device = "/dev/video2"
interval = [1, 15]

[tv]
type = "shield"
channel = 8
triple_buffer = true

[tv.display]
fit = true

[tv.output]
kind = "framebuffer"
path = "/dev/fb1"
"#;

#[test]
fn parses_toml_settings() {
    let settings = Settings::from_toml_str(SHIELD_TOML).unwrap();
    assert_eq!(settings.sensor.pixformat, PixelFormat::Rgb565);
    assert_eq!(settings.sensor.framesize, FrameSize::Qqvga);
    assert_eq!(
        settings.sensor.source,
        SourceSettings::V4l {
            device: "/dev/video2".to_string(),
            interval: (1, 15),
        }
    );
    assert_eq!(settings.tv.tv_type, TvType::Shield);
    assert_eq!(settings.tv.channel.get(), 8);
    assert!(settings.tv.triple_buffer);
    assert!(settings.tv.display.fit);
    assert_eq!(
        settings.tv.output,
        OutputSettings::Framebuffer {
            path: PathBuf::from("/dev/fb1")
        }
    );

    let setup = settings.stream_setup();
    assert_eq!(setup.framesize, FrameSize::Qqvga);
    assert!(setup.tv.triple_buffer);
}

#[test]
fn tv_section_defaults() {
    let settings = Settings::from_toml_str(
        r#"
[sensor]
pixformat = "grayscale"
framesize = "qvga"
"#,
    )
    .unwrap();
    assert_eq!(settings.sensor.source, SourceSettings::default());
    assert_eq!(settings.tv.channel.get(), 8);
    assert_eq!(settings.tv.tv_type, TvType::Shield);
    assert_eq!(settings.tv.output, OutputSettings::Null);
    assert!(!settings.tv.triple_buffer);
}

#[test]
fn rejects_bad_values() {
    let bad_channel = SHIELD_TOML.replace("channel = 8", "channel = 9");
    assert!(matches!(
        Settings::from_toml_str(&bad_channel),
        Err(ConfigError::Toml(_))
    ));
    let bad_size = SHIELD_TOML.replace("QQVGA", "8K");
    assert!(Settings::from_toml_str(&bad_size).is_err());
    let bad_format = SHIELD_TOML.replace("RGB565", "BAYER");
    assert!(Settings::from_toml_str(&bad_format).is_err());
}

#[test]
fn json_files_are_read_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(
        &path,
        r#"{
            "sensor": {
                "pixformat": "JPEG",
                "framesize": "QVGA",
                "source": { "kind": "pattern", "pattern": "color_bars" }
            },
            "tv": {
                "channel": 3,
                "output": { "kind": "snapshots", "dir": "captures" }
            }
        }"#,
    )
    .unwrap();

    let settings = load_settings(&path).unwrap();
    assert_eq!(settings.sensor.pixformat, PixelFormat::Jpeg);
    assert_eq!(
        settings.sensor.source,
        SourceSettings::Pattern {
            pattern: Pattern::ColorBars
        }
    );
    assert_eq!(settings.tv.channel.get(), 3);
    assert_eq!(
        settings.tv.output,
        OutputSettings::Snapshots {
            dir: PathBuf::from("captures"),
            every: 30
        }
    );
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_settings(dir.path().join("settings.toml")),
        Err(ConfigError::Read { .. })
    ));
}

#[test]
fn unknown_extensions_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["settings.yaml", "settings"] {
        let path = dir.path().join(name);
        fs::write(&path, SHIELD_TOML).unwrap();
        assert!(matches!(
            load_settings(&path),
            Err(ConfigError::UnknownExtension(p)) if p == path
        ));
    }

    let path = dir.path().join("SETTINGS.TOML");
    fs::write(&path, SHIELD_TOML).unwrap();
    assert!(load_settings(&path).is_ok());
}

#[test]
fn unusable_display_scales_are_rejected() {
    for scale in ["inf", "nan", "0.0", "-1.5"] {
        let toml = SHIELD_TOML.replace("fit = true", &format!("x_scale = {}", scale));
        assert!(matches!(
            Settings::from_toml_str(&toml),
            Err(ConfigError::Display(TvError::InvalidScale { .. }))
        ));
    }
    let toml = SHIELD_TOML.replace("fit = true", "x_scale = 2.0\ny_scale = 0.5");
    let settings = Settings::from_toml_str(&toml).unwrap();
    assert_eq!(settings.tv.display.x_scale, 2.0);
    assert_eq!(settings.tv.display.y_scale, 0.5);
}

#[test]
fn settings_open_working_collaborators() {
    let dir = tempfile::tempdir().unwrap();
    let fb = dir.path().join("fb");
    let path = dir.path().join("settings.toml");
    fs::write(
        &path,
        format!(
            r#"
[sensor]
pixformat = "GRAYSCALE"
framesize = "QQQVGA"

[sensor.source]
kind = "pattern"
pattern = "gradient"

[tv]
channel = 2

[tv.output]
kind = "framebuffer"
path = "{}"
"#,
            fb.display()
        ),
    )
    .unwrap();

    let settings = load_settings(&path).unwrap();
    let mut sensor = settings.sensor.open().unwrap();
    let mut tv = settings.tv.open().unwrap();
    setup(sensor.as_mut(), &mut tv, &settings.stream_setup()).unwrap();
    assert_eq!(tv.channel_number().map(|c| c.get()), Some(2));

    let frame = sensor.snapshot().unwrap();
    assert_eq!((frame.width(), frame.height()), (80, 60));
    tv.display(&frame).unwrap();
    assert!(fs::metadata(&fb).unwrap().len() > 0);
}

#[test]
fn empty_stills_directory_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::from_toml_str(&format!(
        r#"
[sensor]
pixformat = "RGB565"
framesize = "QQVGA"

[sensor.source]
kind = "stills"
dir = "{}"
"#,
        dir.path().display()
    ))
    .unwrap();
    assert!(settings.sensor.open().is_err());
}

#[test]
fn disabled_tv_still_streams() {
    let settings = Settings::from_toml_str(
        r#"
[sensor]
pixformat = "RGB565"
framesize = "QQQQVGA"

[tv]
type = "none"
"#,
    )
    .unwrap();
    assert_eq!(settings.tv.tv_type, TvType::None);
    let mut tv = settings.tv.open().unwrap();
    let mut sensor = PatternSensor::new(Pattern::Gradient);
    setup(&mut sensor, &mut tv, &settings.stream_setup()).unwrap();
    let frame = sensor.snapshot().unwrap();
    tv.display(&frame).unwrap();
    assert_eq!(tv.frames_displayed(), 0);
}
