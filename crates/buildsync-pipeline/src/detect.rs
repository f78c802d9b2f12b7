//! Canonical serialization and change detection.

use std::io;

use buildsync_fetch::{ItemId, Payload};
use buildsync_manifest::{Manifest, PathScheme};
use buildsync_verify::ContentHash;
use serde::Serialize;
use serde_json::Serializer;
use serde_json::ser::{Formatter, PrettyFormatter};

/// Canonical bytes of `payload`: two-space indented JSON, keys in the order the
/// catalog sent them, every non-ASCII character escaped as `\uXXXX`.
///
/// This is byte for byte the form of the files already in the mirror, so their
/// digests and [`DEFAULT_SENTINELS`](crate::DEFAULT_SENTINELS) stay comparable.
pub fn canonicalize(payload: &Payload) -> serde_json::Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(256);
    let mut serializer = Serializer::with_formatter(&mut bytes, MirrorFormatter::default());
    payload.as_value().serialize(&mut serializer)?;
    Ok(bytes)
}

/// Pretty layout plus ASCII-only strings and exponent-style floats.
#[derive(Default)]
struct MirrorFormatter(PrettyFormatter<'static>);

impl Formatter for MirrorFormatter {
    fn begin_array<W: ?Sized + io::Write>(&mut self, w: &mut W) -> io::Result<()> { self.0.begin_array(w) }

    fn end_array<W: ?Sized + io::Write>(&mut self, w: &mut W) -> io::Result<()> { self.0.end_array(w) }

    fn begin_array_value<W: ?Sized + io::Write>(&mut self, w: &mut W, first: bool) -> io::Result<()> {
        self.0.begin_array_value(w, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, w: &mut W) -> io::Result<()> { self.0.end_array_value(w) }

    fn begin_object<W: ?Sized + io::Write>(&mut self, w: &mut W) -> io::Result<()> { self.0.begin_object(w) }

    fn end_object<W: ?Sized + io::Write>(&mut self, w: &mut W) -> io::Result<()> { self.0.end_object(w) }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, w: &mut W, first: bool) -> io::Result<()> {
        self.0.begin_object_key(w, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, w: &mut W) -> io::Result<()> {
        self.0.begin_object_value(w)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, w: &mut W) -> io::Result<()> { self.0.end_object_value(w) }

    // Quotes, backslashes and control characters never reach this point.
    fn write_string_fragment<W: ?Sized + io::Write>(&mut self, w: &mut W, fragment: &str) -> io::Result<()> {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            if c.is_ascii() && c != '\x7f' {
                continue;
            }
            w.write_all(&fragment.as_bytes()[start..i])?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(w, "\\u{unit:04x}")?;
            }
            start = i + c.len_utf8();
        }
        w.write_all(&fragment.as_bytes()[start..])
    }

    fn write_f64<W: ?Sized + io::Write>(&mut self, w: &mut W, value: f64) -> io::Result<()> {
        w.write_all(float_repr(value).as_bytes())
    }
}

/// Shortest round-trip digits; positional for exponents in `-4..16`, else `1e+16` style.
fn float_repr(value: f64) -> String {
    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if (-4..16).contains(&exponent) {
        let positional = value.to_string();
        if positional.contains('.') { positional } else { format!("{positional}.0") }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    }
}

/// Whether an item's fresh content differs from what the manifest records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    UpToDate,
    NeedsWrite,
}

/// A payload ready for the writer: its canonical bytes, their hash and the decision.
#[derive(Debug, Clone)]
pub struct Detection {
    pub bytes:    Vec<u8>,
    pub hash:     ContentHash,
    pub decision: Decision,
}

/// Compares fresh payloads against the manifest. Pure: touches neither disk nor manifest.
pub struct ChangeDetector<'a> {
    manifest: &'a Manifest,
    scheme:   &'a PathScheme,
}

impl<'a> ChangeDetector<'a> {
    pub fn new(manifest: &'a Manifest, scheme: &'a PathScheme) -> Self { Self { manifest, scheme } }

    pub fn check(&self, id: ItemId, payload: &Payload) -> serde_json::Result<Detection> {
        let bytes = canonicalize(payload)?;
        let hash = ContentHash::of(&bytes);
        let decision = match self.manifest.lookup(id, self.scheme) {
            Some(known) if known == hash => Decision::UpToDate,
            _ => Decision::NeedsWrite,
        };
        Ok(Detection {
            bytes,
            hash,
            decision,
        })
    }
}
