//! JSON encoding of output records.
//!
//! Records are written on one line with `", "` and `": "` separators and raw
//! UTF-8 text, the layout earlier releases of the crawler produced.

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};

use crate::Result;

/// Single-line formatter with a space after every `,` and `:`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Serializes `value` into `writer`.
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: Serialize + ?Sized,
{
    let mut serializer = Serializer::with_formatter(writer, SpacedFormatter);
    value.serialize(&mut serializer)?;
    Ok(())
}

/// Serializes `value` into a string.
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    let mut buf = Vec::new();
    to_writer(&mut buf, value)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_spacing() {
        let value = json!({"a": 1, "b": [1, 2], "c": {}, "d": []});
        assert_eq!(to_string(&value).unwrap(), r#"{"a": 1, "b": [1, 2], "c": {}, "d": []}"#);
    }

    #[test]
    fn test_raw_utf8() {
        let value = json!({"push_tag": "推"});
        assert_eq!(to_string(&value).unwrap(), r#"{"push_tag": "推"}"#);
    }

    #[test]
    fn test_output_is_valid_json() {
        let value = json!({"nested": {"list": [{"x": "a, b: c"}]}});
        let text = to_string(&value).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, value);
    }
}
