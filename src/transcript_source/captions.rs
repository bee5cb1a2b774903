//! Caption document parsing (TTML and YouTube json3).

use crate::error::{GuideError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

/// Caption formats we know how to parse, in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionFormat {
    Ttml,
    Json3,
}

impl CaptionFormat {
    pub const PREFERRED: [CaptionFormat; 2] = [CaptionFormat::Ttml, CaptionFormat::Json3];

    /// The `ext` value yt-dlp reports for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            CaptionFormat::Ttml => "ttml",
            CaptionFormat::Json3 => "json3",
        }
    }

    /// Parse a caption document of this format.
    pub fn parse(&self, body: &str) -> Result<Vec<String>> {
        match self {
            CaptionFormat::Ttml => parse_ttml(body),
            CaptionFormat::Json3 => parse_json3(body),
        }
    }
}

/// Collapse runs of whitespace into single spaces.
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract the text of every `<p>` element of a TTML document.
pub fn parse_ttml(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut lines = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"p" => {
                current = Some(String::new());
            }
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"br" => {
                if let Some(text) = current.as_mut() {
                    text.push(' ');
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(text) = current.as_mut() {
                    let decoded = t
                        .unescape()
                        .map(|c| c.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned());
                    text.push_str(&decoded);
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"p" => {
                if let Some(text) = current.take() {
                    let text = normalize(&text);
                    if !text.is_empty() {
                        lines.push(text);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(GuideError::TranscriptUnavailable(format!(
                    "invalid TTML near byte {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(lines)
}

#[derive(Debug, Deserialize)]
struct Json3Document {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(default)]
    segs: Vec<Json3Segment>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Extract caption lines from a YouTube json3 document.
pub fn parse_json3(body: &str) -> Result<Vec<String>> {
    let doc: Json3Document = serde_json::from_str(body).map_err(|e| {
        GuideError::TranscriptUnavailable(format!("invalid json3 captions: {}", e))
    })?;

    Ok(doc
        .events
        .iter()
        .map(|event| {
            let joined: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            normalize(&joined)
        })
        .filter(|line| !line.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ttml() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<tt xml:lang="en" xmlns="http://www.w3.org/ns/ttml">
  <body>
    <div>
      <p begin="00:00:00.160" end="00:00:02.000">Good morning,<br/>church.</p>
      <p begin="00:00:02.000" end="00:00:04.000"><span>Let&apos;s</span> pray.</p>
      <p begin="00:00:04.000" end="00:00:05.000">   </p>
      <p begin="00:00:05.000" end="00:00:07.000">Romans &amp; Galatians</p>
    </div>
  </body>
</tt>"#;

        let lines = parse_ttml(xml).unwrap();
        assert_eq!(
            lines,
            vec!["Good morning, church.", "Let's pray.", "Romans & Galatians"]
        );
    }

    #[test]
    fn test_parse_ttml_prefixed_namespace() {
        let xml = r#"<tt:tt xmlns:tt="http://www.w3.org/ns/ttml"><tt:body><tt:p>Amen.</tt:p></tt:body></tt:tt>"#;
        assert_eq!(parse_ttml(xml).unwrap(), vec!["Amen."]);
    }

    #[test]
    fn test_parse_ttml_rejects_garbage() {
        assert!(parse_ttml("<tt><p>unclosed</tt>").is_err());
    }

    #[test]
    fn test_parse_json3() {
        let body = r#"{"events":[
            {"tStartMs":0,"segs":[{"utf8":"Good "},{"utf8":"morning"}]},
            {"tStartMs":1200,"segs":[{"utf8":"\n"}]},
            {"tStartMs":1500},
            {"tStartMs":2000,"segs":[{"utf8":"church."}]}
        ]}"#;
        assert_eq!(parse_json3(body).unwrap(), vec!["Good morning", "church."]);
    }
}
