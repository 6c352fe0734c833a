//! Invocation response returned to the trigger.

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;

/// `{statusCode, body}` pair; `body` is itself a JSON document in string form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    pub fn json<T>(status_code: u16, body: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        Ok(Self {
            status_code,
            body: to_spaced_json(body)?,
        })
    }

    /// `{"message": "<text>"}` body.
    pub fn message(status_code: u16, text: &str) -> Result<Self, serde_json::Error> {
        Self::json(status_code, &serde_json::json!({ "message": text }))
    }

    /// Body serialized without separator spacing.
    pub fn compact_json<T>(status_code: u16, body: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        Ok(Self {
            status_code,
            body: serde_json::to_string(body)?,
        })
    }

    /// `{"message":"<text>"}` body.
    pub fn compact_message(status_code: u16, text: &str) -> Result<Self, serde_json::Error> {
        Self::compact_json(status_code, &serde_json::json!({ "message": text }))
    }
}

/// Serialize with `", "` and `": "` separators, the layout consumers of the
/// response body already expect.
pub fn to_spaced_json<T>(value: &T) -> Result<String, serde_json::Error>
where
    T: Serialize + ?Sized,
{
    let mut serializer = serde_json::Serializer::with_formatter(Vec::new(), SpacedFormatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(serializer.into_inner()).map_err(serde::ser::Error::custom)
}

struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}
