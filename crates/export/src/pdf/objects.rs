//! PDF object model
//!
//! The handful of object kinds a report document needs: numbers, names,
//! strings, arrays, dictionaries, streams and indirect references. Objects
//! serialize straight into a byte buffer, so serialization itself cannot fail.

use std::collections::BTreeMap;
use std::io::Write;

/// A PDF object
#[derive(Debug, Clone, PartialEq)]
pub enum PdfObject {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    /// Literal string, already encoded (WinAnsi for text)
    String(Vec<u8>),
    Name(String),
    Array(Vec<PdfObject>),
    Dictionary(PdfDictionary),
    Stream(PdfStream),
    /// Indirect reference to an object with generation 0
    Reference(u32),
}

impl PdfObject {
    pub fn name(s: impl Into<String>) -> Self {
        PdfObject::Name(s.into())
    }

    /// Literal string from text, encoded as WinAnsi
    pub fn text(s: &str) -> Self {
        PdfObject::String(super::fonts::encode_win_ansi(s))
    }

    /// Serialize this object into `out`
    pub fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            PdfObject::Boolean(b) => out.extend_from_slice(if *b { b"true" } else { b"false" }),
            PdfObject::Integer(n) => {
                let _ = write!(out, "{}", n);
            }
            PdfObject::Real(n) => out.extend_from_slice(format_real(*n).as_bytes()),
            PdfObject::String(data) => write_literal_string(data, out),
            PdfObject::Name(name) => write_name(name, out),
            PdfObject::Array(items) => {
                out.push(b'[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(b' ');
                    }
                    item.write_to(out);
                }
                out.push(b']');
            }
            PdfObject::Dictionary(dict) => dict.write_to(out),
            PdfObject::Stream(stream) => {
                stream.dict.write_to(out);
                out.extend_from_slice(b"\nstream\n");
                out.extend_from_slice(&stream.data);
                out.extend_from_slice(b"\nendstream");
            }
            PdfObject::Reference(num) => {
                let _ = write!(out, "{} 0 R", num);
            }
        }
    }

    /// Serialize into a fresh buffer
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out);
        out
    }
}

/// A dictionary with deterministic (sorted) key order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfDictionary {
    entries: BTreeMap<String, PdfObject>,
}

impl PdfDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dictionary with a `/Type` entry
    pub fn typed(type_name: &str) -> Self {
        let mut dict = Self::new();
        dict.insert("Type", PdfObject::name(type_name));
        dict
    }

    pub fn insert(&mut self, key: impl Into<String>, value: PdfObject) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&PdfObject> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"<<");
        for (key, value) in &self.entries {
            out.push(b' ');
            write_name(key, out);
            out.push(b' ');
            value.write_to(out);
        }
        out.extend_from_slice(b" >>");
    }
}

/// A stream: dictionary plus raw bytes
#[derive(Debug, Clone, PartialEq)]
pub struct PdfStream {
    pub dict: PdfDictionary,
    pub data: Vec<u8>,
    /// Whether `data` already carries a filter
    pub compressed: bool,
}

impl PdfStream {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            dict: PdfDictionary::new(),
            data,
            compressed: false,
        }
    }
}

/// Real numbers keep at most four decimals, integers print bare
pub(crate) fn format_real(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        let s = format!("{:.4}", n);
        let s = s.trim_end_matches('0').trim_end_matches('.');
        if s == "-0" {
            "0".to_string()
        } else {
            s.to_string()
        }
    }
}

/// Literal string with `(`, `)` and `\` escaped and non-printables in octal
pub(crate) fn write_literal_string(data: &[u8], out: &mut Vec<u8>) {
    out.push(b'(');
    for &byte in data {
        match byte {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(byte);
            }
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\t' => out.extend_from_slice(b"\\t"),
            0x20..=0x7E => out.push(byte),
            _ => {
                let _ = write!(out, "\\{:03o}", byte);
            }
        }
    }
    out.push(b')');
}

fn write_name(name: &str, out: &mut Vec<u8>) {
    out.push(b'/');
    for byte in name.bytes() {
        match byte {
            b'#' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%' => {
                let _ = write!(out, "#{:02X}", byte);
            }
            0x21..=0x7E => out.push(byte),
            _ => {
                let _ = write!(out, "#{:02X}", byte);
            }
        }
    }
}
