//! Value types shared across the object model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Free-form user data attached to most objects
///
/// Key order is kept for output but ignored when comparing.
pub type Metadata = Map<String, Value>;

/// RGBA display colour of an item, each channel in `0..=1`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: f64,
    /// Green
    pub g: f64,
    /// Blue
    pub b: f64,
    /// Alpha
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Color {
    /// Pink
    pub const PINK: Color = Color::rgb(1.0, 0.42, 0.78);
    /// Red
    pub const RED: Color = Color::rgb(1.0, 0.13, 0.13);
    /// Orange
    pub const ORANGE: Color = Color::rgb(1.0, 0.55, 0.13);
    /// Yellow
    pub const YELLOW: Color = Color::rgb(1.0, 0.87, 0.13);
    /// Green
    pub const GREEN: Color = Color::rgb(0.13, 0.87, 0.13);
    /// Cyan
    pub const CYAN: Color = Color::rgb(0.13, 0.87, 0.87);
    /// Blue
    pub const BLUE: Color = Color::rgb(0.13, 0.55, 1.0);
    /// Purple
    pub const PURPLE: Color = Color::rgb(0.55, 0.13, 1.0);
    /// Magenta
    pub const MAGENTA: Color = Color::rgb(0.87, 0.13, 0.87);
    /// Black
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    /// White
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    /// Create a colour with an explicit alpha
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque colour
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// Named marker colour as written on the wire
///
/// Unrecognized names survive a round trip through [`MarkerColor::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum MarkerColor {
    /// `PINK`
    Pink,
    /// `RED`
    Red,
    /// `ORANGE`
    Orange,
    /// `YELLOW`
    Yellow,
    /// `GREEN`
    #[default]
    Green,
    /// `CYAN`
    Cyan,
    /// `BLUE`
    Blue,
    /// `PURPLE`
    Purple,
    /// `MAGENTA`
    Magenta,
    /// `BLACK`
    Black,
    /// `WHITE`
    White,
    /// Any other name
    Custom(String),
}

impl MarkerColor {
    /// Wire name
    pub fn as_str(&self) -> &str {
        match self {
            MarkerColor::Pink => "PINK",
            MarkerColor::Red => "RED",
            MarkerColor::Orange => "ORANGE",
            MarkerColor::Yellow => "YELLOW",
            MarkerColor::Green => "GREEN",
            MarkerColor::Cyan => "CYAN",
            MarkerColor::Blue => "BLUE",
            MarkerColor::Purple => "PURPLE",
            MarkerColor::Magenta => "MAGENTA",
            MarkerColor::Black => "BLACK",
            MarkerColor::White => "WHITE",
            MarkerColor::Custom(name) => name,
        }
    }

    /// Display colour; custom names render green
    pub fn to_color(&self) -> Color {
        match self {
            MarkerColor::Pink => Color::PINK,
            MarkerColor::Red => Color::RED,
            MarkerColor::Orange => Color::ORANGE,
            MarkerColor::Yellow => Color::YELLOW,
            MarkerColor::Green | MarkerColor::Custom(_) => Color::GREEN,
            MarkerColor::Cyan => Color::CYAN,
            MarkerColor::Blue => Color::BLUE,
            MarkerColor::Purple => Color::PURPLE,
            MarkerColor::Magenta => Color::MAGENTA,
            MarkerColor::Black => Color::BLACK,
            MarkerColor::White => Color::WHITE,
        }
    }
}

impl From<&str> for MarkerColor {
    fn from(name: &str) -> Self {
        match name {
            "PINK" => MarkerColor::Pink,
            "RED" => MarkerColor::Red,
            "ORANGE" => MarkerColor::Orange,
            "YELLOW" => MarkerColor::Yellow,
            "GREEN" => MarkerColor::Green,
            "CYAN" => MarkerColor::Cyan,
            "BLUE" => MarkerColor::Blue,
            "PURPLE" => MarkerColor::Purple,
            "MAGENTA" => MarkerColor::Magenta,
            "BLACK" => MarkerColor::Black,
            "WHITE" => MarkerColor::White,
            other => MarkerColor::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 2D point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2d {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Vec2d {
    /// Create a point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle describing the image extent of media
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Box2d {
    /// Lower-left corner
    pub min: Vec2d,
    /// Upper-right corner
    pub max: Vec2d,
}

impl Box2d {
    /// Create a box from its corners
    pub const fn new(min: Vec2d, max: Vec2d) -> Self {
        Self { min, max }
    }

    /// The smallest box covering both
    pub fn union(&self, other: &Box2d) -> Box2d {
        Box2d {
            min: Vec2d::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Vec2d::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Whether `point` lies inside or on the edge
    pub fn contains(&self, point: &Vec2d) -> bool {
        self.min.x <= point.x && point.x <= self.max.x && self.min.y <= point.y && point.y <= self.max.y
    }

    /// Whether the two boxes overlap
    pub fn intersects(&self, other: &Box2d) -> bool {
        !(other.max.x < self.min.x
            || other.min.x > self.max.x
            || other.max.y < self.min.y
            || other.min.y > self.max.y)
    }
}

/// Fold an iterator of optional bounds into their union
pub(crate) fn union_bounds(bounds: impl IntoIterator<Item = Option<Box2d>>) -> Option<Box2d> {
    bounds
        .into_iter()
        .flatten()
        .reduce(|acc, next| acc.union(&next))
}
