//! brandmark-renderer: parametric procedural logo rendering
//!
//! This crate renders logo marks from parametric presets. A preset declares
//! its tunables as a schema, and its draw function turns a resolved
//! parameter set plus an animation time into drawing calls on any
//! [`RenderContext`](surface::RenderContext): a raster pixmap, an SVG
//! document, or a recording used in tests.
//!
//! # Example
//!
//! ```
//! use brandmark_renderer::{Studio, Configurable};
//!
//! let mut studio = Studio::new();
//! studio.select("quantum-field").unwrap();
//! studio.set_param("energyLevels", 5.0);
//!
//! // Raster frame, cached until a parameter changes
//! let image = studio.render_image(128, 128, 0.5).unwrap();
//! assert_eq!(image.width(), 128);
//!
//! // Vector frame
//! let svg = studio.render_svg(128.0, 128.0, 0.5).unwrap();
//! assert!(svg.starts_with("<svg"));
//! ```
//!
//! # Structured Payloads
//!
//! Parameter sets move in and out as [`BrandPreset`] JSON with the
//! [`Configurable`] trait:
//!
//! ```
//! use brandmark_renderer::{BrandPreset, Configurable, Studio};
//!
//! let mut studio = Studio::new();
//! let pasted = BrandPreset::from_json(
//!     r##"{ "name": "Night", "preset": "dynamic-diamond", "params": { "backgroundColor": "#101018" } }"##,
//! ).unwrap();
//! studio.apply_profile(&pasted).unwrap();
//!
//! let exported = studio.export_profile("Night");
//! let json = exported.to_json().unwrap();
//! assert!(json.contains("\"dynamic-diamond\""));
//! ```

pub mod color;
pub mod compositing;
pub mod error;
pub mod geometry;
pub mod overlay;
pub mod params;
pub mod preset;
pub mod rng;
pub mod surface;

mod profile;
mod studio;

pub use color::{derive_palette, Color, ColorPalette, HarmonyMode, Material, PaletteBase};
pub use error::{EngineError, ImportError, TemplateError};
pub use params::{ParamMap, ParamValue, ParameterDefinition, ParameterSchema, ResolvedParams};
pub use preset::{CustomPreset, Preset, PresetMetadata, PresetRegistry, TemplateDocument};
pub use profile::BrandPreset;
pub use studio::{CacheKey, Configurable, Studio};
pub use surface::{PixmapContext, RecordingContext, RenderContext, SvgContext};
