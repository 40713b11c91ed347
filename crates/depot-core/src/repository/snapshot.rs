//! `maven-metadata.xml` snapshot lookup.
//!
//! The document is controlled by whoever runs the repository, so anything
//! unexpected (missing elements, markup where text should be, broken XML)
//! means "no information" rather than an error.
//!
//! ```xml
//! <metadata>
//!   <versioning>
//!     <snapshot>
//!       <timestamp>20220617.013635</timestamp>
//!       <buildNumber>12</buildNumber>
//!     </snapshot>
//!   </versioning>
//! </metadata>
//! ```

use quick_xml::events::Event;
use quick_xml::Reader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotVersion {
    pub timestamp: String,
    pub build_number: String,
}

impl SnapshotVersion {
    /// `2.1-20220617.013635-12` for base version `2.1`.
    pub fn file_version(&self, base_version: &str) -> String {
        format!("{}-{}-{}", base_version, self.timestamp, self.build_number)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Timestamp,
    BuildNumber,
}

/// Extracts the first `<snapshot>`'s `<timestamp>` and `<buildNumber>`.
pub fn parse_snapshot_metadata(xml: &[u8]) -> Option<SnapshotVersion> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut snapshot_depth: Option<usize> = None;
    let mut depth = 0usize;
    // Field currently open and whether it already produced text.
    let mut open: Option<(Field, bool)> = None;
    let mut timestamp: Option<String> = None;
    let mut build_number: Option<String> = None;

    loop {
        buf.clear();
        let event = match reader.read_event_into(&mut buf) {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!(error = %e, "invalid maven-metadata.xml");
                return None;
            }
        };
        match event {
            Event::Start(e) => {
                depth += 1;
                let name = e.local_name();
                match (snapshot_depth, name.as_ref()) {
                    (None, b"snapshot") => snapshot_depth = Some(depth),
                    (Some(_), _) if open.is_some() => {
                        // Markup inside <timestamp>/<buildNumber> is not a text value.
                        return None;
                    }
                    (Some(_), b"timestamp") if timestamp.is_none() => {
                        open = Some((Field::Timestamp, false));
                    }
                    (Some(_), b"buildNumber") if build_number.is_none() => {
                        open = Some((Field::BuildNumber, false));
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if open.is_some() {
                    return None;
                }
                let name = e.local_name();
                match (snapshot_depth, name.as_ref()) {
                    (None, b"snapshot") => return None,
                    (Some(_), b"timestamp") if timestamp.is_none() => return None,
                    (Some(_), b"buildNumber") if build_number.is_none() => return None,
                    _ => {}
                }
            }
            Event::Text(t) => {
                if let Some((field, seen)) = open.as_mut() {
                    if *seen {
                        continue;
                    }
                    let value = match t.unescape() {
                        Ok(v) => v.trim().to_string(),
                        Err(_) => return None,
                    };
                    if value.is_empty() {
                        continue;
                    }
                    *seen = true;
                    match field {
                        Field::Timestamp => timestamp = Some(value),
                        Field::BuildNumber => build_number = Some(value),
                    }
                }
            }
            Event::End(_) => {
                if let Some((_, seen)) = open.take() {
                    if !seen {
                        return None;
                    }
                }
                if snapshot_depth == Some(depth) {
                    // First <snapshot> closed; later ones are ignored.
                    break;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Some(SnapshotVersion {
        timestamp: timestamp?,
        build_number: build_number?,
    })
}
