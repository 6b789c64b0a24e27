use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }
}

/// RGBA color, (de)serialised as `#rrggbb` or `#rrggbbaa`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const AXIS: Color = Color::rgb(0xcc, 0xcc, 0xcc);
    pub const LABEL: Color = Color::rgb(0x66, 0x66, 0x66);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: 1.0 }
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
            return Err(anyhow!("Invalid color: {}", hex));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| anyhow!("Invalid color: {}", hex))
        };
        let color = Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?);
        if digits.len() == 8 {
            return Ok(color.with_alpha(channel(6..8)? as f32 / 255.0));
        }
        Ok(color)
    }

    /// hue in degrees, saturation and lightness in percent
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let s = (saturation / 100.0).clamp(0.0, 1.0);
        let l = (lightness / 100.0).clamp(0.0, 1.0);
        let h = hue.rem_euclid(360.0) / 60.0;

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;
        let to_byte = |c: f64| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::rgb(to_byte(r), to_byte(g), to_byte(b))
    }

    pub fn to_hex(&self) -> String {
        if self.alpha < 1.0 {
            let alpha = (self.alpha * 255.0).round() as u8;
            return format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, alpha);
        }
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl TryFrom<String> for Color {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Color::from_hex(&value)
    }
}

/// Abstract 2-D drawing capability addressed in pixels of a fixed-size canvas
pub trait DrawSurface: Send {
    /// Canvas size as (width, height)
    fn size(&self) -> (f64, f64);

    fn clear(&mut self, rect: Rect, color: Color);

    fn stroke_path(&mut self, points: &[Point], color: Color, line_width: f64);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color);

    fn draw_text(&mut self, text: &str, at: Point, color: Color);

    fn bounds(&self) -> Rect {
        let (width, height) = self.size();
        Rect::new(0.0, 0.0, width, height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear { rect: Rect, color: Color },
    StrokePath { points: Vec<Point>, color: Color, line_width: f64 },
    FillRect { rect: Rect, color: Color },
    FillCircle { center: Point, radius: f64, color: Color },
    Text { text: String, at: Point, color: Color },
}

#[derive(Default)]
struct Recording {
    commands: Vec<DrawCommand>,
    frames: u64,
}

/// Surface that records draw commands instead of rasterising them.
///
/// A clear covering the whole canvas replaces the visible content, so
/// `commands()` always describes what is currently on screen. Clones share
/// the same recording.
#[derive(Clone)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    recording: Arc<Mutex<Recording>>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            recording: Arc::new(Mutex::new(Recording::default())),
        }
    }

    pub fn commands(&self) -> Vec<DrawCommand> {
        self.lock().commands.clone()
    }

    /// Number of full-canvas clears seen so far
    pub fn frames(&self) -> u64 {
        self.lock().frames
    }

    pub fn count(&self, predicate: impl Fn(&DrawCommand) -> bool) -> usize {
        self.lock().commands.iter().filter(|c| predicate(c)).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recording> {
        self.recording
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&mut self, command: DrawCommand) {
        self.lock().commands.push(command);
    }
}

impl DrawSurface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self, rect: Rect, color: Color) {
        let full = rect.contains_rect(&self.bounds());
        let mut recording = self.lock();
        if full {
            recording.commands.clear();
            recording.frames += 1;
        }
        recording.commands.push(DrawCommand::Clear { rect, color });
    }

    fn stroke_path(&mut self, points: &[Point], color: Color, line_width: f64) {
        self.push(DrawCommand::StrokePath {
            points: points.to_vec(),
            color,
            line_width,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push(DrawCommand::FillRect { rect, color });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        self.push(DrawCommand::FillCircle { center, radius, color });
    }

    fn draw_text(&mut self, text: &str, at: Point, color: Color) {
        self.push(DrawCommand::Text {
            text: text.to_string(),
            at,
            color,
        });
    }
}
