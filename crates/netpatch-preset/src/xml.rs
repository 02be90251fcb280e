//! Controller XML presets
//!
//! ```xml
//! <preset>
//!   <device>
//!     <name>Mixer</name>
//!     <rxchannel>
//!       <name>In 1</name>
//!       <subscribed_device>Stage</subscribed_device>
//!       <subscribed_channel>Vocal</subscribed_channel>
//!     </rxchannel>
//!   </device>
//! </preset>
//! ```
//!
//! Only receive channels carrying both `subscribed_device` and
//! `subscribed_channel` produce requests; the rest are unsubscribed. Names
//! are taken exactly as written, whitespace included.

use netpatch_core::SubscriptionRequest;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::{PresetError, Result};

#[derive(Debug, Default)]
struct DeviceEntry {
    name: Option<String>,
    rx_channels: Vec<RxChannelEntry>,
}

#[derive(Debug, Default)]
struct RxChannelEntry {
    name: Option<String>,
    subscribed_device: Option<String>,
    subscribed_channel: Option<String>,
}

fn xml_error(reader: &Reader<&[u8]>, err: quick_xml::Error) -> PresetError {
    PresetError::Xml(format!("at byte {}: {}", reader.buffer_position(), err))
}

/// Collect `<device>` and `<rxchannel>` elements below the document root
fn read_devices(text: &str) -> Result<Vec<DeviceEntry>> {
    let mut reader = Reader::from_str(text);
    let mut path: Vec<String> = Vec::new();
    let mut content = String::new();
    let mut devices = Vec::new();
    let mut device: Option<DeviceEntry> = None;
    let mut channel: Option<RxChannelEntry> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                content.clear();

                let segments: Vec<&str> = path.iter().map(String::as_str).collect();
                match segments.as_slice() {
                    [_, "device"] => device = Some(DeviceEntry::default()),
                    [_, "device", "rxchannel"] => channel = Some(RxChannelEntry::default()),
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                let unescaped = e.unescape().map_err(|err| xml_error(&reader, err))?;
                content.push_str(&unescaped);
            }
            Ok(Event::CData(e)) => {
                content.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(Event::End(_)) => {
                let value = std::mem::take(&mut content);
                let segments: Vec<&str> = path.iter().map(String::as_str).collect();
                match segments.as_slice() {
                    [_, "device", "name"] => {
                        if let Some(d) = device.as_mut() {
                            d.name = Some(value);
                        }
                    }
                    [_, "device", "rxchannel", field] => {
                        if let Some(c) = channel.as_mut() {
                            match *field {
                                "name" => c.name = Some(value),
                                "subscribed_device" => c.subscribed_device = Some(value),
                                "subscribed_channel" => c.subscribed_channel = Some(value),
                                _ => {}
                            }
                        }
                    }
                    [_, "device", "rxchannel"] => {
                        if let (Some(d), Some(c)) = (device.as_mut(), channel.take()) {
                            d.rx_channels.push(c);
                        }
                    }
                    [_, "device"] => devices.extend(device.take()),
                    _ => {}
                }
                path.pop();
            }
            Ok(Event::Eof) => break,
            // Self-closing elements carry no names
            Ok(_) => {}
            Err(err) => return Err(xml_error(&reader, err)),
        }
    }

    if let Some(open) = path.last() {
        return Err(PresetError::Xml(format!(
            "unexpected end of document inside <{}>",
            open
        )));
    }

    Ok(devices)
}

/// Non-blank value, kept as written
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Extract subscription requests from a controller XML preset, in document
/// order
pub fn parse_xml(text: &str) -> Result<Vec<SubscriptionRequest>> {
    let mut requests = Vec::new();

    for (device_index, device) in read_devices(text)?.into_iter().enumerate() {
        let device_name = present(device.name);

        for (channel_index, channel) in device.rx_channels.into_iter().enumerate() {
            let (Some(tx_device), Some(tx_channel)) = (
                present(channel.subscribed_device),
                present(channel.subscribed_channel),
            ) else {
                continue;
            };

            let rx_device = device_name.clone().ok_or(PresetError::UnnamedDevice {
                index: device_index + 1,
            })?;
            let rx_channel = present(channel.name).ok_or_else(|| PresetError::UnnamedChannel {
                device: rx_device.clone(),
                index: channel_index + 1,
            })?;

            requests.push(SubscriptionRequest::new(
                rx_device,
                rx_channel,
                tx_device,
                tx_channel,
            ));
        }

        if device_name.is_none() {
            debug!("Skipping unnamed device #{} without subscriptions", device_index + 1);
        }
    }

    debug!("Parsed {} subscription(s) from XML preset", requests.len());
    Ok(requests)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preset() {
        let text = r#"<?xml version="1.0" encoding="UTF-8"?>
<preset version="2.1.0">
  <name>Show A</name>
  <device>
    <name>Mixer</name>
    <rxchannel danteId="1">
      <name>In 1</name>
      <subscribed_device>Stage</subscribed_device>
      <subscribed_channel>Vocal</subscribed_channel>
    </rxchannel>
    <rxchannel danteId="2">
      <name>In 2</name>
    </rxchannel>
    <rxchannel danteId="3">
      <name>In 3</name>
      <subscribed_device>Stage</subscribed_device>
      <subscribed_channel>Out 3</subscribed_channel>
    </rxchannel>
  </device>
  <device>
    <name>Amp</name>
    <rxchannel>
      <name>Left</name>
      <subscribed_device>Mixer</subscribed_device>
      <subscribed_channel>Main L</subscribed_channel>
    </rxchannel>
  </device>
</preset>"#;

        let requests = parse_xml(text).unwrap();

        assert_eq!(
            requests,
            vec![
                SubscriptionRequest::new("Mixer", "In 1", "Stage", "Vocal"),
                SubscriptionRequest::new("Mixer", "In 3", "Stage", "Out 3"),
                SubscriptionRequest::new("Amp", "Left", "Mixer", "Main L"),
            ]
        );
    }

    #[test]
    fn test_empty_subscription_fields_are_unsubscribed() {
        let text = r#"<preset><device><name>Mixer</name>
            <rxchannel><name>In 1</name><subscribed_device/><subscribed_channel>Out 1</subscribed_channel></rxchannel>
            <rxchannel><name>In 2</name><subscribed_device>Stage</subscribed_device><subscribed_channel></subscribed_channel></rxchannel>
        </device></preset>"#;

        assert!(parse_xml(text).unwrap().is_empty());
    }

    #[test]
    fn test_unnamed_device_with_subscription_is_rejected() {
        let text = r#"<preset><device>
            <rxchannel><name>In 1</name><subscribed_device>Stage</subscribed_device><subscribed_channel>Out 1</subscribed_channel></rxchannel>
        </device></preset>"#;
        assert!(matches!(
            parse_xml(text),
            Err(PresetError::UnnamedDevice { index: 1 })
        ));
    }

    #[test]
    fn test_unnamed_device_without_subscriptions_is_skipped() {
        let text = r#"<preset>
  <device>
    <name>Mixer</name>
    <rxchannel>
      <name>In 1</name>
      <subscribed_device>Stage</subscribed_device>
      <subscribed_channel>Out 1</subscribed_channel>
    </rxchannel>
  </device>
  <device>
    <rxchannel><name>In 1</name></rxchannel>
  </device>
</preset>"#;

        assert_eq!(
            parse_xml(text).unwrap(),
            vec![SubscriptionRequest::new("Mixer", "In 1", "Stage", "Out 1")]
        );
    }

    #[test]
    fn test_names_keep_surrounding_whitespace() {
        let text = r#"<preset><device><name>Mixer </name>
            <rxchannel>
              <name> In 1</name>
              <subscribed_device>Stage</subscribed_device>
              <subscribed_channel>Out 1  </subscribed_channel>
            </rxchannel>
        </device></preset>"#;

        assert_eq!(
            parse_xml(text).unwrap(),
            vec![SubscriptionRequest::new("Mixer ", " In 1", "Stage", "Out 1  ")]
        );
    }

    #[test]
    fn test_escaped_names() {
        let text = r#"<preset><device><name>Rack &amp; Stage</name>
            <rxchannel><name>In 1</name><subscribed_device>FOH</subscribed_device><subscribed_channel><![CDATA[L<R]]></subscribed_channel></rxchannel>
        </device></preset>"#;

        assert_eq!(
            parse_xml(text).unwrap(),
            vec![SubscriptionRequest::new("Rack & Stage", "In 1", "FOH", "L<R")]
        );
    }

    #[test]
    fn test_truncated_document() {
        assert!(matches!(
            parse_xml("<preset><device><name>Mixer</name>"),
            Err(PresetError::Xml(_))
        ));
    }

    #[test]
    fn test_subscribed_channel_without_name_is_rejected() {
        let text = r#"<preset><device><name>Mixer</name>
            <rxchannel><subscribed_device>Stage</subscribed_device><subscribed_channel>Out 1</subscribed_channel></rxchannel>
        </device></preset>"#;

        match parse_xml(text) {
            Err(PresetError::UnnamedChannel { device, index }) => {
                assert_eq!(device, "Mixer");
                assert_eq!(index, 1);
            }
            other => panic!("Expected UnnamedChannel, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            parse_xml("<preset><device><name>Mixer</device>"),
            Err(PresetError::Xml(_))
        ));
    }
}
