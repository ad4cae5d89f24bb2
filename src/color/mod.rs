//! Color values, parsing, and HSL conversion.
//!
//! Nothing in this module fails: unparseable input degrades to
//! [`Color::NEUTRAL`] so that bad user-pasted data can never abort a frame.

pub mod harmony;

pub use harmony::{derive_palette, ColorPalette, HarmonyMode, Material, PaletteBase};

use palette::{Hsl, IntoColor, Srgb};

// ============================================================================
// Color
// ============================================================================

/// An sRGB color with 8-bit channels and a floating point alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in `[0, 1]`.
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl Color {
    /// The documented fallback for any color that fails to parse.
    pub const NEUTRAL: Self = Self::rgb(128, 128, 128);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0.0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Builds a color from hue in degrees and saturation/lightness in percent.
    ///
    /// Saturation and lightness are clamped to `[0, 100]` and the hue wraps,
    /// so every input yields a valid color. Non-finite components fall back
    /// to the neutral gray.
    pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        if !(h.is_finite() && s.is_finite() && l.is_finite()) {
            return Self::NEUTRAL;
        }
        let hsl = Hsl::new(
            h.rem_euclid(360.0) as f32,
            (s.clamp(0.0, 100.0) / 100.0) as f32,
            (l.clamp(0.0, 100.0) / 100.0) as f32,
        );
        let rgb: Srgb = hsl.into_color();
        Self::rgb(to_channel(rgb.red), to_channel(rgb.green), to_channel(rgb.blue))
    }

    /// Same as [`from_hsl`](Self::from_hsl) with an explicit alpha.
    pub fn from_hsla(h: f64, s: f64, l: f64, a: f64) -> Self {
        Self::from_hsl(h, s, l).with_alpha(a)
    }

    /// Returns `(hue°, saturation%, lightness%)` without intermediate rounding.
    pub fn to_hsl(&self) -> (f64, f64, f64) {
        let rgb = Srgb::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        );
        let hsl: Hsl = rgb.into_color();
        let saturation = hsl.saturation as f64 * 100.0;
        let hue = if saturation > 0.0 {
            hsl.hue.into_positive_degrees() as f64
        } else {
            0.0
        };
        (hue, saturation, hsl.lightness as f64 * 100.0)
    }

    /// Parses `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()`, `hsl()`,
    /// `hsla()`, or `transparent`.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("transparent") {
            return Some(Self::TRANSPARENT);
        }
        if let Some(hex) = input.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = input.to_ascii_lowercase();
        if let Some(args) = function_args(&lower, "rgba").or_else(|| function_args(&lower, "rgb")) {
            return parse_rgb_args(&args);
        }
        if let Some(args) = function_args(&lower, "hsla").or_else(|| function_args(&lower, "hsl")) {
            return parse_hsl_args(&args);
        }
        None
    }

    /// Parses a color, degrading to [`Color::NEUTRAL`] on failure.
    pub fn parse_or_neutral(input: &str) -> Self {
        Self::parse(input).unwrap_or_else(|| {
            tracing::warn!(input, "unparseable color, using neutral gray");
            Self::NEUTRAL
        })
    }

    /// Formats as lowercase `#rrggbb` (alpha is dropped).
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Returns a copy with the given alpha, clamped to `[0, 1]`.
    pub fn with_alpha(self, alpha: f64) -> Self {
        let a = if alpha.is_finite() { alpha.clamp(0.0, 1.0) as f32 } else { 1.0 };
        Self { a, ..self }
    }

    /// Returns a copy with alpha multiplied by `factor`.
    pub fn fade(self, factor: f64) -> Self {
        self.with_alpha(self.a as f64 * factor)
    }

    /// Linear blend toward `other` by `amount` in `[0, 1]`.
    pub fn mix(&self, other: &Color, amount: f64) -> Self {
        let t = if amount.is_finite() { amount.clamp(0.0, 1.0) } else { 0.0 };
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Self {
            r: lerp(self.r, other.r),
            g: lerp(self.g, other.g),
            b: lerp(self.b, other.b),
            a: (self.a as f64 + (other.a as f64 - self.a as f64) * t) as f32,
        }
    }

    /// Rotates the hue by `degrees`, preserving alpha.
    pub fn rotate_hue(&self, degrees: f64) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h + degrees, s, l).with_alpha(self.a as f64)
    }

    /// Shifts lightness by `delta` percentage points, preserving alpha.
    pub fn lighten(&self, delta: f64) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h, s, l + delta).with_alpha(self.a as f64)
    }

    /// Relative luminance per WCAG.
    pub fn luminance(&self) -> f64 {
        let linear = |c: u8| {
            let c = c as f64 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }

    /// WCAG contrast ratio between two colors, in `[1, 21]`.
    pub fn contrast_ratio(&self, other: &Color) -> f64 {
        let (a, b) = (self.luminance(), other.luminance());
        (a.max(b) + 0.05) / (a.min(b) + 0.05)
    }

    pub fn is_dark(&self) -> bool {
        self.luminance() < 0.5
    }
}

// ============================================================================
// Free Functions
// ============================================================================

/// Converts a hex string to `(hue°, saturation%, lightness%)`.
///
/// Invalid input returns the HSL of [`Color::NEUTRAL`].
pub fn hex_to_hsl(hex: &str) -> (f64, f64, f64) {
    let trimmed = hex.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    parse_hex(digits)
        .unwrap_or_else(|| {
            tracing::warn!(hex, "invalid hex color, using neutral gray");
            Color::NEUTRAL
        })
        .to_hsl()
}

/// Converts hue/saturation/lightness to a `#rrggbb` string.
pub fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    Color::from_hsl(h, s, l).to_hex()
}

/// Shifts every RGB channel toward white (`delta > 0`) or black
/// (`delta < 0`). `delta` is clamped to `[-1, 1]`.
pub fn adjust_color(hex: &str, delta: f64) -> String {
    let color = Color::parse_or_neutral(hex);
    let delta = if delta.is_finite() { delta.clamp(-1.0, 1.0) } else { 0.0 };
    let shift = |c: u8| {
        let c = c as f64;
        let out = if delta >= 0.0 {
            c + (255.0 - c) * delta
        } else {
            c * (1.0 + delta)
        };
        out.round().clamp(0.0, 255.0) as u8
    };
    Color::rgb(shift(color.r), shift(color.g), shift(color.b)).to_hex()
}

// ============================================================================
// Parsing Helpers
// ============================================================================

fn to_channel(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn parse_hex(digits: &str) -> Option<Color> {
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    let nibble = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).ok().map(|n| n * 17);
    match digits.len() {
        3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)? as f32 / 255.0)),
        _ => None,
    }
}

fn function_args(input: &str, name: &str) -> Option<Vec<String>> {
    let rest = input.strip_prefix(name)?.trim_start();
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    Some(
        inner
            .split(|c| c == ',' || c == '/' || c == ' ')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn parse_component(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim_end_matches(['%', 'd', 'e', 'g']).parse().ok()?;
    value.is_finite().then_some(value)
}

fn parse_alpha(args: &[String], index: usize) -> Option<f32> {
    match args.get(index) {
        None => Some(1.0),
        Some(raw) if raw.ends_with('%') => Some((parse_component(raw)? / 100.0).clamp(0.0, 1.0) as f32),
        Some(raw) => Some(parse_component(raw)?.clamp(0.0, 1.0) as f32),
    }
}

fn parse_rgb_args(args: &[String]) -> Option<Color> {
    if args.len() < 3 {
        return None;
    }
    let channel = |raw: &String| -> Option<u8> {
        let v = parse_component(raw)?;
        let v = if raw.ends_with('%') { v * 2.55 } else { v };
        Some(v.round().clamp(0.0, 255.0) as u8)
    };
    Some(Color::rgba(
        channel(&args[0])?,
        channel(&args[1])?,
        channel(&args[2])?,
        parse_alpha(args, 3)?,
    ))
}

fn parse_hsl_args(args: &[String]) -> Option<Color> {
    if args.len() < 3 {
        return None;
    }
    let h = parse_component(&args[0])?;
    let s = parse_component(&args[1])?;
    let l = parse_component(&args[2])?;
    let a = parse_alpha(args, 3)?;
    Some(Color::from_hsl(h, s, l).with_alpha(a as f64))
}

// ============================================================================
// Tests
// ============================================================================
