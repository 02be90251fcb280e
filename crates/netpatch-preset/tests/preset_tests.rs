//! Preset Tests (netpatch-preset)
//!
//! Loading preset files from disk and format selection.

use netpatch_core::SubscriptionRequest;
use netpatch_preset::{load_preset, parse_preset, PresetError, PresetFormat};
use std::io::Write;
use std::path::Path;

fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const XML_PRESET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<preset>
  <device>
    <name>Mixer</name>
    <txchannel><name>Main L</name></txchannel>
    <rxchannel>
      <name>In 1</name>
      <subscribed_device>Stage</subscribed_device>
      <subscribed_channel>Vocal</subscribed_channel>
    </rxchannel>
  </device>
</preset>"#;

#[test]
fn test_format_from_path() {
    assert_eq!(
        PresetFormat::from_path(Path::new("show.XML")).unwrap(),
        PresetFormat::Xml
    );
    assert_eq!(
        PresetFormat::from_path(Path::new("show.toml")).unwrap(),
        PresetFormat::Toml
    );
    assert!(matches!(
        PresetFormat::from_path(Path::new("show.yaml")),
        Err(PresetError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_format_from_str() {
    assert_eq!("json".parse::<PresetFormat>().unwrap(), PresetFormat::Json);
    assert!("csv".parse::<PresetFormat>().is_err());
}

#[test]
fn test_parse_preset_dispatches_on_format() {
    let requests = parse_preset(XML_PRESET, PresetFormat::Xml).unwrap();
    assert_eq!(
        requests,
        vec![SubscriptionRequest::new("Mixer", "In 1", "Stage", "Vocal")]
    );

    // The same text is not a valid TOML document
    assert!(matches!(
        parse_preset(XML_PRESET, PresetFormat::Toml),
        Err(PresetError::Toml(_))
    ));
}

#[tokio::test]
async fn test_load_xml_preset_by_extension() {
    let file = write_temp(".xml", XML_PRESET);

    let requests = load_preset(file.path(), None).await.unwrap();

    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].tx_channel_name, "Vocal");
}

#[tokio::test]
async fn test_load_with_explicit_format_overrides_extension() {
    let file = write_temp(
        ".preset",
        r#"{"subscription": [{"rx_device": "Amp", "rx_channel": "Left", "tx_device": "Mixer", "tx_channel": "Main L"}]}"#,
    );

    let requests = load_preset(file.path(), Some(PresetFormat::Json))
        .await
        .unwrap();
    assert_eq!(
        requests,
        vec![SubscriptionRequest::new("Amp", "Left", "Mixer", "Main L")]
    );

    assert!(matches!(
        load_preset(file.path(), None).await,
        Err(PresetError::UnsupportedFormat(_))
    ));
}

#[tokio::test]
async fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_preset(&dir.path().join("absent.xml"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, PresetError::Io(_)));
}
