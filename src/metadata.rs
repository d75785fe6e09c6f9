/*
 *  metadata.rs
 *
 *  tft-coverart - now playing on a 240x240 TFT
 *  (c) 2020-26 Stuart Hunter
 *
 *  moOde currentsong parser and playback source classifier
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors reading or parsing the now-playing record.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("I/O error reading now-playing record: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed record at line {line}: {content:?} (expected key=value)")]
    MalformedLine { line: usize, content: String },
}

/// Where the current playback originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Library,
    Radio,
    Bluetooth,
    Airplay,
    Spotify,
    Squeeze,
    Input,
}

impl Source {
    /// Library and radio carry real track tags; everything else is a renderer
    /// with only a raw identifier in `file`.
    pub fn has_track_tags(&self) -> bool {
        matches!(self, Source::Library | Source::Radio)
    }

    /// Classify from the `file` field. First match wins.
    pub fn classify(file: &str) -> Source {
        if file.contains("http://") || file.contains("https://") {
            return Source::Radio;
        }
        SENTINELS
            .iter()
            .find(|(marker, _)| file.contains(marker))
            .map(|(_, source)| *source)
            .unwrap_or(Source::Library)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Source::Library => "library",
            Source::Radio => "radio",
            Source::Bluetooth => "bluetooth",
            Source::Airplay => "airplay",
            Source::Spotify => "spotify",
            Source::Squeeze => "squeeze",
            Source::Input => "input",
        };
        f.write_str(s)
    }
}

const SENTINELS: [(&str, Source); 5] = [
    ("Bluetooth Active", Source::Bluetooth),
    ("Airplay Active", Source::Airplay),
    ("Spotify Active", Source::Spotify),
    ("Squeezelite Active", Source::Squeeze),
    ("Input Active", Source::Input),
];

/// One tick's view of what is playing.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub artist: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
    pub file: Option<String>,
    pub cover_url: Option<String>,
    pub source: Source,
}

impl PlaybackSnapshot {
    /// Parse a newline separated `key=value` record.
    pub fn parse(record: &str) -> Result<Self, MetadataError> {
        let mut snapshot = PlaybackSnapshot {
            artist: None,
            album: None,
            title: None,
            file: None,
            cover_url: None,
            source: Source::Library,
        };

        for (idx, raw) in record.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| MetadataError::MalformedLine {
                line: idx + 1,
                content: line.to_string(),
            })?;
            let value = value.to_string();
            match key {
                "artist" => snapshot.artist = Some(value),
                "album" => snapshot.album = Some(value),
                "title" => snapshot.title = Some(value),
                "file" => snapshot.file = Some(value),
                "coverurl" => snapshot.cover_url = Some(percent_decode(&value)),
                _ => {}
            }
        }

        if let Some(file) = snapshot.file.as_deref() {
            snapshot.source = Source::classify(file);
        }

        if snapshot.source == Source::Radio {
            snapshot.split_radio_title();
        }

        Ok(snapshot)
    }

    /// Streams often put "Artist - Title" in the title tag.
    fn split_radio_title(&mut self) {
        let Some(title) = self.title.as_deref() else {
            return;
        };
        if let Some((artist, title)) = title.split_once(" - ") {
            let (artist, title) = (artist.to_string(), title.to_string());
            self.artist = Some(artist);
            self.title = Some(title);
        }
    }

    /// Key the cover cache on: coverurl then file, missing parts empty.
    pub fn cover_key(&self) -> String {
        let mut key = self.cover_url.clone().unwrap_or_default();
        key.push_str(self.file.as_deref().unwrap_or(""));
        key
    }
}

/// Read and parse the record the player writes on every track/state change.
pub fn read_snapshot(path: &Path) -> Result<PlaybackSnapshot, MetadataError> {
    let record = std::fs::read_to_string(path)?;
    PlaybackSnapshot::parse(&record)
}

fn percent_decode(value: &str) -> String {
    let bytes = urlencoding::decode_binary(value.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_record() {
        let snap = PlaybackSnapshot::parse("file=Rock/A/B/01.flac\nartist=A\nalbum=B\ntitle=C\n").unwrap();
        assert_eq!(snap.source, Source::Library);
        assert_eq!(snap.artist.as_deref(), Some("A"));
        assert_eq!(snap.album.as_deref(), Some("B"));
        assert_eq!(snap.title.as_deref(), Some("C"));
        assert!(snap.cover_url.is_none());
    }

    #[test]
    fn test_radio_title_split_on_first_separator() {
        let snap = PlaybackSnapshot::parse("file=http://stream\ntitle=Station - Song - Live").unwrap();
        assert_eq!(snap.source, Source::Radio);
        assert_eq!(snap.artist.as_deref(), Some("Station"));
        assert_eq!(snap.title.as_deref(), Some("Song - Live"));
    }

    #[test]
    fn test_radio_title_without_separator() {
        let snap = PlaybackSnapshot::parse("file=https://stream\ntitle=Just-A-Station").unwrap();
        assert_eq!(snap.source, Source::Radio);
        assert!(snap.artist.is_none());
        assert_eq!(snap.title.as_deref(), Some("Just-A-Station"));
    }

    #[test]
    fn test_library_title_is_never_split() {
        let snap = PlaybackSnapshot::parse("file=a.mp3\ntitle=X - Y").unwrap();
        assert!(snap.artist.is_none());
        assert_eq!(snap.title.as_deref(), Some("X - Y"));
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(Source::classify("Bluetooth Active"), Source::Bluetooth);
        assert_eq!(Source::classify("Airplay Active"), Source::Airplay);
        assert_eq!(Source::classify("Spotify Active"), Source::Spotify);
        assert_eq!(Source::classify("Squeezelite Active"), Source::Squeeze);
        assert_eq!(Source::classify("Input Active"), Source::Input);
        assert_eq!(Source::classify("NAS/Music/track.flac"), Source::Library);
        // url wins over any sentinel text
        assert_eq!(Source::classify("http://host/Bluetooth Active"), Source::Radio);
    }

    #[test]
    fn test_malformed_line_is_reported() {
        let err = PlaybackSnapshot::parse("file=a.mp3\ngarbage\ntitle=x").unwrap_err();
        match err {
            MetadataError::MalformedLine { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "garbage");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_value_keeps_later_equals() {
        let snap = PlaybackSnapshot::parse("file=a.mp3\ntitle=1+1=2").unwrap();
        assert_eq!(snap.title.as_deref(), Some("1+1=2"));
    }

    #[test]
    fn test_coverurl_percent_decoded() {
        let snap = PlaybackSnapshot::parse("file=a.mp3\ncoverurl=imagesw%2Fradio-logos%2FFIP%20Jazz.jpg").unwrap();
        assert_eq!(snap.cover_url.as_deref(), Some("imagesw/radio-logos/FIP Jazz.jpg"));
    }

    #[test]
    fn test_cover_key_concatenates() {
        let snap = PlaybackSnapshot::parse("file=a.mp3\ncoverurl=c.jpg").unwrap();
        assert_eq!(snap.cover_key(), "c.jpga.mp3");
        let snap = PlaybackSnapshot::parse("title=only").unwrap();
        assert_eq!(snap.cover_key(), "");
    }

    #[test]
    fn test_missing_file_is_library() {
        let snap = PlaybackSnapshot::parse("title=x").unwrap();
        assert_eq!(snap.source, Source::Library);
        assert!(snap.file.is_none());
    }
}
