//! Palette derivation from a single hue or brand color.

use super::Color;

/// Named colors derived for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorPalette {
    pub primary: Color,
    /// Lighter companion, used for gradient starts and secondary layers.
    pub secondary: Color,
    /// Darker or contrasting tone, used for strokes and facets.
    pub accent: Color,
    /// Glow and specular color.
    pub highlight: Color,
}

impl Default for ColorPalette {
    fn default() -> Self {
        derive_palette(PaletteBase::Hue(210.0), 0.8, 0.6, 0.5, HarmonyMode::Monochrome)
    }
}

/// The seed of a palette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaletteBase<'a> {
    /// Abstract hue in degrees.
    Hue(f64),
    /// Brand color; its hue and lightness drive the palette.
    Hex(&'a str),
}

/// Surface materials with their own saturation and lightness response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {
    Crystal,
    Platinum,
    Gold,
    Carbon,
    Prismatic,
}

impl Material {
    pub const ALL: [Material; 5] = [
        Material::Crystal,
        Material::Platinum,
        Material::Gold,
        Material::Carbon,
        Material::Prismatic,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "crystal" => Some(Material::Crystal),
            "platinum" => Some(Material::Platinum),
            "gold" => Some(Material::Gold),
            "carbon" => Some(Material::Carbon),
            "prismatic" => Some(Material::Prismatic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Material::Crystal => "crystal",
            Material::Platinum => "platinum",
            Material::Gold => "gold",
            Material::Carbon => "carbon",
            Material::Prismatic => "prismatic",
        }
    }

    /// `(hue shift°, saturation multiplier, lightness multiplier)`.
    pub fn response(&self) -> (f64, f64, f64) {
        match self {
            Material::Crystal => (0.0, 0.3, 1.4),
            Material::Platinum => (-20.0, 0.2, 1.2),
            Material::Gold => (15.0, 0.8, 1.1),
            Material::Carbon => (-40.0, 1.2, 0.8),
            Material::Prismatic => (30.0, 1.5, 1.0),
        }
    }
}

/// Hue derivation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HarmonyMode {
    #[default]
    Monochrome,
    Analogous,
    Complementary,
    Triadic,
    SplitComplementary,
    Tetradic,
    /// Primary is the base color itself; companions keep its hue.
    ThemeLocked,
    MaterialLocked(Material),
}

impl HarmonyMode {
    /// Parses a mode name. Unrecognized names fall back to monochrome.
    ///
    /// Material modes are written `material:<name>` or just the material name.
    pub fn parse(name: &str) -> Self {
        let name = name.trim().to_ascii_lowercase();
        let mode = match name.as_str() {
            "monochrome" | "monochromatic" => Some(HarmonyMode::Monochrome),
            "analogous" => Some(HarmonyMode::Analogous),
            "complementary" => Some(HarmonyMode::Complementary),
            "triadic" => Some(HarmonyMode::Triadic),
            "split-complementary" | "split" => Some(HarmonyMode::SplitComplementary),
            "tetradic" => Some(HarmonyMode::Tetradic),
            "theme" | "theme-locked" => Some(HarmonyMode::ThemeLocked),
            other => Material::parse(other.strip_prefix("material:").unwrap_or(other))
                .map(HarmonyMode::MaterialLocked),
        };
        mode.unwrap_or_else(|| {
            tracing::debug!(mode = name.as_str(), "unknown harmony mode, using monochrome");
            HarmonyMode::Monochrome
        })
    }

    /// Hue offsets for `[primary, secondary, accent, highlight]`.
    pub fn hue_offsets(&self) -> [f64; 4] {
        match self {
            HarmonyMode::Monochrome | HarmonyMode::ThemeLocked => [0.0; 4],
            HarmonyMode::Analogous => [0.0, 30.0, -30.0, 15.0],
            HarmonyMode::Complementary => [0.0, 180.0, 15.0, 180.0],
            HarmonyMode::Triadic => [0.0, 120.0, 240.0, 0.0],
            HarmonyMode::SplitComplementary => [0.0, 150.0, 210.0, 0.0],
            HarmonyMode::Tetradic => [0.0, 90.0, 180.0, 270.0],
            HarmonyMode::MaterialLocked(material) => [material.response().0; 4],
        }
    }
}

/// Derives a four-color palette.
///
/// `saturation`, `sophistication`, and `warmth` are unit scalars. For a
/// [`PaletteBase::Hue`] base, saturation sets the base saturation directly and
/// warmth lifts the base lightness; for a [`PaletteBase::Hex`] base the
/// color's own saturation is scaled instead. Every channel is clamped, so
/// the function is total.
///
/// ```
/// use brandmark_renderer::color::{derive_palette, HarmonyMode, PaletteBase};
///
/// let palette = derive_palette(PaletteBase::Hue(210.0), 0.8, 0.6, 0.5, HarmonyMode::Complementary);
/// let (hue, _, _) = palette.secondary.to_hsl();
/// assert!((hue - 30.0).abs() <= 1.0);
/// ```
pub fn derive_palette(
    base: PaletteBase<'_>,
    saturation: f64,
    sophistication: f64,
    warmth: f64,
    mode: HarmonyMode,
) -> ColorPalette {
    let unit = |v: f64, fallback: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { fallback };
    let saturation = unit(saturation, 0.8);
    let sophistication = unit(sophistication, 0.5);
    let warmth = unit(warmth, 0.5);

    let (hue, base_s, base_l, base_color) = match base {
        PaletteBase::Hue(h) => {
            let h = if h.is_finite() { h } else { 0.0 };
            (h, saturation * 100.0, 40.0 + warmth * 20.0, None)
        }
        PaletteBase::Hex(hex) => {
            let color = Color::parse_or_neutral(hex);
            let (h, s, l) = color.to_hsl();
            (h, s * (0.5 + saturation * 0.5), l, Some(color))
        }
    };

    let richness = 0.5 + 0.5 * sophistication;
    let (sat_mult, light_mult) = match mode {
        HarmonyMode::MaterialLocked(material) => {
            let (_, s, l) = material.response();
            (s, l)
        }
        _ => (1.0, 1.0),
    };
    let s = base_s * richness * sat_mult;
    let l = base_l * light_mult;
    let [o_primary, o_secondary, o_accent, o_highlight] = mode.hue_offsets();

    let primary = match (mode, base_color) {
        (HarmonyMode::ThemeLocked, Some(color)) => color,
        _ => Color::from_hsl(hue + o_primary, s, l),
    };

    ColorPalette {
        primary,
        secondary: Color::from_hsl(hue + o_secondary, s * 0.8, l + 15.0),
        accent: Color::from_hsl(hue + o_accent, s * 1.2, l - 15.0),
        highlight: Color::from_hsl(
            hue + o_highlight + 15.0 * warmth,
            s * 0.5,
            (l + 25.0 + warmth * 10.0).min(92.0),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hue_of(color: Color) -> f64 {
        color.to_hsl().0
    }

    fn hue_distance(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[test]
    fn complementary_secondary_is_opposite() {
        let palette = derive_palette(PaletteBase::Hue(210.0), 0.8, 0.6, 0.5, HarmonyMode::Complementary);
        assert!(hue_distance(hue_of(palette.secondary), 30.0) <= 1.0);
        assert!(hue_distance(hue_of(palette.primary), 210.0) <= 1.0);
    }

    #[test]
    fn offset_tables_apply_to_secondary() {
        let cases = [
            (HarmonyMode::Analogous, 240.0),
            (HarmonyMode::Triadic, 330.0),
            (HarmonyMode::SplitComplementary, 0.0),
            (HarmonyMode::Tetradic, 300.0),
        ];
        for (mode, expected) in cases {
            let palette = derive_palette(PaletteBase::Hue(210.0), 0.9, 0.8, 0.5, mode);
            assert!(
                hue_distance(hue_of(palette.secondary), expected) <= 1.0,
                "{mode:?}: {}",
                hue_of(palette.secondary)
            );
        }
    }

    #[test]
    fn unknown_mode_falls_back_to_monochrome() {
        assert_eq!(HarmonyMode::parse("psychedelic"), HarmonyMode::Monochrome);
        assert_eq!(HarmonyMode::parse("material:gold"), HarmonyMode::MaterialLocked(Material::Gold));
        assert_eq!(HarmonyMode::parse("Carbon"), HarmonyMode::MaterialLocked(Material::Carbon));
        assert_eq!(HarmonyMode::parse("split-complementary"), HarmonyMode::SplitComplementary);
    }

    #[test]
    fn theme_locked_uses_base_verbatim() {
        let palette = derive_palette(PaletteBase::Hex("#3b82f6"), 0.8, 0.6, 0.5, HarmonyMode::ThemeLocked);
        assert_eq!(palette.primary.to_hex(), "#3b82f6");
        assert!(hue_distance(hue_of(palette.secondary), hue_of(palette.primary)) <= 2.0);
    }

    #[test]
    fn extreme_inputs_stay_valid() {
        for mode in [
            HarmonyMode::Monochrome,
            HarmonyMode::Complementary,
            HarmonyMode::MaterialLocked(Material::Crystal),
            HarmonyMode::MaterialLocked(Material::Carbon),
        ] {
            for &(s, soph, warmth) in &[(5.0, 5.0, 5.0), (-1.0, -1.0, -1.0), (f64::NAN, f64::INFINITY, 0.5)] {
                let p = derive_palette(PaletteBase::Hue(f64::NAN), s, soph, warmth, mode);
                for color in [p.primary, p.secondary, p.accent, p.highlight] {
                    let (h, sat, light) = color.to_hsl();
                    assert!(h.is_finite());
                    assert!((0.0..=100.0).contains(&sat));
                    assert!((0.0..=100.0).contains(&light));
                }
            }
        }
    }

    #[test]
    fn invalid_hex_base_uses_neutral() {
        let p = derive_palette(PaletteBase::Hex("zzz"), 0.8, 0.6, 0.5, HarmonyMode::ThemeLocked);
        assert_eq!(p.primary, Color::NEUTRAL);
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = derive_palette(PaletteBase::Hue(42.0), 0.7, 0.3, 0.9, HarmonyMode::Triadic);
        let b = derive_palette(PaletteBase::Hue(42.0), 0.7, 0.3, 0.9, HarmonyMode::Triadic);
        assert_eq!(a, b);
    }

    #[test]
    fn materials_shift_lightness() {
        let crystal = derive_palette(PaletteBase::Hue(200.0), 0.8, 0.6, 0.5, HarmonyMode::MaterialLocked(Material::Crystal));
        let carbon = derive_palette(PaletteBase::Hue(200.0), 0.8, 0.6, 0.5, HarmonyMode::MaterialLocked(Material::Carbon));
        assert!(crystal.primary.to_hsl().2 > carbon.primary.to_hsl().2);
    }
}
