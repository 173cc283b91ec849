//! Multipart form parsing
//!
//! Collects every field of a request up front, then hands out typed values.
//! Unparsable values are [`OperationError::MalformedParameter`]; an
//! unreadable body is a bad request.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;

use crate::document::{OperationError, Rect, Rgb};
use crate::error::{AppError, Result};

/// An uploaded file
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Bytes,
}

impl Upload {
    /// File name without directories or extension, for download names
    pub fn stem(&self) -> &str {
        std::path::Path::new(&self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("document")
    }
}

/// All fields of a multipart request
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, Vec<Upload>>,
}

fn malformed(message: String) -> AppError {
    OperationError::malformed(message).into()
}

impl FormData {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            tracing::error!("Failed to read multipart field: {}", e);
            AppError::BadRequest(format!("Failed to read upload: {}", e))
        })? {
            let name = field.name().unwrap_or("").to_string();
            let filename = field.file_name().map(|s| s.to_string());

            match filename {
                Some(filename) => {
                    let bytes = field.bytes().await.map_err(|e| {
                        AppError::BadRequest(format!("Failed to read file data: {}", e))
                    })?;
                    tracing::debug!("Received file field '{}': {} ({} bytes)", name, filename, bytes.len());
                    form.files.entry(name).or_default().push(Upload { filename, bytes });
                }
                None => {
                    let value = field.text().await.map_err(|e| {
                        AppError::BadRequest(format!("Failed to read field '{}': {}", name, e))
                    })?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Trimmed text value; blank values count as absent
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn required(&self, name: &str) -> Result<&str> {
        self.text(name)
            .ok_or_else(|| malformed(format!("missing required field '{}'", name)))
    }

    /// Raw value, kept verbatim (replacement text may be blank)
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Required free text, kept verbatim; blank values count as missing
    pub fn required_raw(&self, name: &str) -> Result<&str> {
        self.raw(name)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| malformed(format!("missing required field '{}'", name)))
    }

    pub fn text_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.text(name).unwrap_or(default)
    }

    pub fn file(&self, name: &str) -> Result<&Upload> {
        self.files
            .get(name)
            .and_then(|files| files.first())
            .ok_or_else(|| malformed(format!("missing required file '{}'", name)))
    }

    pub fn files(&self, name: &str) -> &[Upload] {
        self.files.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    fn parse<T: std::str::FromStr>(&self, name: &str, kind: &str) -> Result<Option<T>> {
        match self.text(name) {
            None => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| malformed(format!("'{}' must be {}, got {:?}", name, kind, value))),
        }
    }

    pub fn opt_int(&self, name: &str) -> Result<Option<i64>> {
        self.parse(name, "an integer")
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        self.opt_int(name)?
            .ok_or_else(|| malformed(format!("missing required field '{}'", name)))
    }

    pub fn int_or(&self, name: &str, default: i64) -> Result<i64> {
        Ok(self.opt_int(name)?.unwrap_or(default))
    }

    pub fn opt_float(&self, name: &str) -> Result<Option<f32>> {
        match self.parse::<f32>(name, "a number")? {
            Some(v) if !v.is_finite() => Err(malformed(format!("'{}' must be finite", name))),
            other => Ok(other),
        }
    }

    pub fn float(&self, name: &str) -> Result<f32> {
        self.opt_float(name)?
            .ok_or_else(|| malformed(format!("missing required field '{}'", name)))
    }

    pub fn float_or(&self, name: &str, default: f32) -> Result<f32> {
        Ok(self.opt_float(name)?.unwrap_or(default))
    }

    /// Boolean field, false when absent
    pub fn flag(&self, name: &str) -> Result<bool> {
        match self.text(name).map(str::to_ascii_lowercase).as_deref() {
            None => Ok(false),
            Some("true" | "1" | "yes" | "on") => Ok(true),
            Some("false" | "0" | "no" | "off") => Ok(false),
            Some(other) => Err(malformed(format!("'{}' must be a boolean, got {:?}", name, other))),
        }
    }

    /// Color from `<prefix>_r`, `<prefix>_g` and `<prefix>_b`
    pub fn color(&self, prefix: &str, default: Rgb) -> Result<Rgb> {
        let [r, g, b] = default.components();
        Ok(Rgb::new(
            self.float_or(&format!("{}_r", prefix), r)?,
            self.float_or(&format!("{}_g", prefix), g)?,
            self.float_or(&format!("{}_b", prefix), b)?,
        )?)
    }
}

/// Comma separated integers, e.g. `"1, 3,4"`
///
/// One trailing comma is tolerated; any other empty item is malformed.
pub fn parse_int_list(value: &str) -> Result<Vec<i64>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(Vec::new());
    }
    value
        .strip_suffix(',')
        .unwrap_or(value)
        .split(',')
        .map(|s| {
            s.trim()
                .parse::<i64>()
                .map_err(|_| malformed(format!("expected a comma separated list of integers, got {:?}", value)))
        })
        .collect()
}

/// Comma separated strings; blanks are dropped
pub fn parse_str_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `x0,y0,x1,y1`
pub fn parse_rect(value: &str) -> Result<Rect> {
    let coords = value
        .split(',')
        .map(|s| s.trim().parse::<f32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| malformed(format!("rect must be four numbers x0,y0,x1,y1, got {:?}", value)))?;
    Ok(Rect::from_coords(&coords)?)
}
