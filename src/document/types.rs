//! Core document types
//!
//! Geometry, styling and result records shared by the service, the engine
//! and the HTTP layer. All coordinates are in displayed page space: origin
//! at the top-left corner, y growing downward, page rotation applied.

use std::path::PathBuf;

use serde::Serialize;

use super::error::{OperationError, Result};

/// A point in displayed page space
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in displayed page space
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "[f32; 4]")]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Build from `[x0, y0, x1, y1]`
    pub fn from_coords(coords: &[f32]) -> Result<Self> {
        match coords {
            [x0, y0, x1, y1] => Ok(Self::new(*x0, *y0, *x1, *y1)),
            _ => Err(OperationError::malformed("rect must contain 4 values")),
        }
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).abs()
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).abs()
    }

    /// Same rectangle with `x0 <= x1` and `y0 <= y1`
    pub fn normalized(&self) -> Self {
        Self {
            x0: self.x0.min(self.x1),
            y0: self.y0.min(self.y1),
            x1: self.x0.max(self.x1),
            y1: self.y0.max(self.y1),
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        let r = self.normalized();
        point.x >= r.x0 && point.x <= r.x1 && point.y >= r.y0 && point.y <= r.y1
    }

    pub fn center(&self) -> Point {
        Point::new((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }
}

impl From<Rect> for [f32; 4] {
    fn from(rect: Rect) -> Self {
        [rect.x0, rect.y0, rect.x1, rect.y1]
    }
}

/// RGB color with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb {
    r: f32,
    g: f32,
    b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Rgb = Rgb { r: 1.0, g: 1.0, b: 1.0 };

    /// Create a color, rejecting components outside `[0, 1]`
    pub fn new(r: f32, g: f32, b: f32) -> Result<Self> {
        for (name, value) in [("r", r), ("g", g), ("b", b)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(OperationError::malformed(format!(
                    "color component {} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(Self { r, g, b })
    }

    pub fn components(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// Horizontal alignment inside a text box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TryFrom<i64> for TextAlign {
    type Error = OperationError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Self::Left),
            1 => Ok(Self::Center),
            2 => Ok(Self::Right),
            3 => Ok(Self::Justify),
            other => Err(OperationError::malformed(format!(
                "align must be 0 (left), 1 (center), 2 (right) or 3 (justify), got {}",
                other
            ))),
        }
    }
}

/// Font, size and fill color for inserted text
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_name: String,
    pub font_size: f32,
    pub color: Rgb,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_name: "helv".to_string(),
            font_size: 12.0,
            color: Rgb::BLACK,
        }
    }
}

/// Outcome of inserting text into a box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextboxFit {
    /// Height left below the last line; negative when the text did not fit
    pub spare_height: f32,
}

impl TextboxFit {
    pub fn fits(&self) -> bool {
        self.spare_height >= 0.0
    }
}

/// Where an inserted image goes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImagePlacement {
    /// Top-left corner; the image keeps its natural size
    At(Point),
    /// Fit inside the box keeping the aspect ratio
    Fit(Rect),
}

/// Per-page geometry
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    /// 0-based page index
    pub page_number: usize,
    pub width: f32,
    pub height: f32,
    /// Rotation in degrees (0, 90, 180, 270)
    pub rotation: u16,
}

/// Document information dictionary fields; empty when absent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentMetadata {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub creator: String,
}

/// Metadata read result
#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub pages: Vec<PageInfo>,
    pub metadata: DocumentMetadata,
}

/// Search parameters
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    pub whole_word: bool,
    /// Per-page cap on located rects; 0 means unbounded
    pub max_hits: usize,
    /// Attach the text band around each match
    pub include_context: bool,
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    pub page: usize,
    pub text: String,
    pub rect: Rect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Search result
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub query: String,
    pub match_count: usize,
    pub matches: Vec<MatchRecord>,
    pub page_count: usize,
}

/// Result of an operation that writes an output document
#[derive(Debug, Clone, Serialize)]
pub struct EditSummary {
    pub message: String,
    pub output_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_count: Option<usize>,
}

impl EditSummary {
    pub fn new(message: impl Into<String>, output_path: PathBuf) -> Self {
        Self {
            message: message.into(),
            output_path,
            removed_count: None,
            replaced_count: None,
        }
    }

    pub fn with_removed(mut self, count: usize) -> Self {
        self.removed_count = Some(count);
        self
    }

    pub fn with_replaced(mut self, count: usize) -> Self {
        self.replaced_count = Some(count);
        self
    }
}

/// Uniform operation outcome
///
/// Serializes as `{"success": true, ...payload}` or
/// `{"success": false, "error": "..."}`. The typed error stays available
/// through [`OperationResult::into_result`].
#[derive(Debug, Serialize)]
pub struct OperationResult<T = EditSummary> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip)]
    failure: Option<OperationError>,
}

impl<T> OperationResult<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
            failure: None,
        }
    }

    pub fn failure(err: OperationError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            data: None,
            failure: Some(err),
        }
    }

    /// The typed failure, if any
    pub fn failure_ref(&self) -> Option<&OperationError> {
        self.failure.as_ref()
    }

    /// Convert back into a `Result`
    pub fn into_result(self) -> Result<T> {
        match (self.data, self.failure) {
            (Some(data), None) => Ok(data),
            (_, Some(err)) => Err(err),
            (None, None) => Err(OperationError::Engine(
                "operation produced no result".to_string(),
            )),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(err),
        }
    }
}
