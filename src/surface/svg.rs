//! Vector surface emitting SVG markup.
//!
//! Geometry is written in device coordinates, so the output needs no
//! transform attributes. Gradients, clip paths, and blur filters are collected
//! into a single `<defs>` block.

use std::fmt::Write as _;

use super::{clean_dash, GradientStop, LineCap, LineJoin, Paint, RenderContext, Tracker};
use crate::color::Color;
use crate::geometry::PathCommand;

pub struct SvgContext {
    width: f64,
    height: f64,
    tracker: Tracker<String>,
    defs: String,
    body: String,
    next_id: usize,
}

impl SvgContext {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: if width.is_finite() { width.max(0.0) } else { 0.0 },
            height: if height.is_finite() { height.max(0.0) } else { 0.0 },
            tracker: Tracker::default(),
            defs: String::new(),
            body: String::new(),
            next_id: 0,
        }
    }

    /// Completes the document.
    pub fn finish(self) -> String {
        let mut out = String::with_capacity(self.defs.len() + self.body.len() + 256);
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = num(self.width),
            h = num(self.height),
        );
        if !self.defs.is_empty() {
            out.push_str("<defs>");
            out.push_str(&self.defs);
            out.push_str("</defs>");
        }
        out.push_str(&self.body);
        out.push_str("</svg>");
        out
    }

    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    /// Writes the paint to defs if needed and returns `(value, opacity)` for
    /// a fill or stroke attribute.
    fn paint_ref(&mut self, paint: &Paint) -> (String, f64) {
        match paint {
            Paint::Solid(color) => (color.to_hex(), color.a as f64),
            Paint::Linear { start, end, stops } => {
                let id = self.id("g");
                let _ = write!(
                    self.defs,
                    r#"<linearGradient id="{id}" gradientUnits="userSpaceOnUse" x1="{}" y1="{}" x2="{}" y2="{}">"#,
                    num(start.x),
                    num(start.y),
                    num(end.x),
                    num(end.y),
                );
                write_stops(&mut self.defs, stops, |t| t);
                self.defs.push_str("</linearGradient>");
                (format!("url(#{id})"), 1.0)
            }
            Paint::Radial {
                center,
                inner_radius,
                outer_radius,
                stops,
            } => {
                if !(outer_radius.is_finite() && *outer_radius > 0.0) {
                    let fallback = paint.fallback_color();
                    return (fallback.to_hex(), fallback.a as f64);
                }
                let inner = inner_radius.clamp(0.0, *outer_radius) / outer_radius;
                let id = self.id("g");
                let _ = write!(
                    self.defs,
                    r#"<radialGradient id="{id}" gradientUnits="userSpaceOnUse" cx="{}" cy="{}" r="{}">"#,
                    num(center.x),
                    num(center.y),
                    num(*outer_radius),
                );
                write_stops(&mut self.defs, stops, |t| inner + t * (1.0 - inner));
                self.defs.push_str("</radialGradient>");
                (format!("url(#{id})"), 1.0)
            }
        }
    }

    fn blur_ref(&mut self) -> Option<String> {
        let blur = self.tracker.state.blur * self.tracker.state.transform.mean_scale();
        if blur <= 0.0 {
            return None;
        }
        let id = self.id("f");
        let _ = write!(
            self.defs,
            r#"<filter id="{id}" x="-50%" y="-50%" width="200%" height="200%"><feGaussianBlur stdDeviation="{}"/></filter>"#,
            num(blur / 2.0),
        );
        Some(id)
    }

    fn emit(&mut self, commands: &[PathCommand], stroke: bool) {
        let d = path_data(commands);
        if d.is_empty() {
            return;
        }
        let alpha = self.tracker.state.alpha;
        let paint = if stroke {
            self.tracker.state.stroke.clone()
        } else {
            self.tracker.state.fill.clone()
        };
        let (value, paint_opacity) = self.paint_ref(&paint);
        let filter = self.blur_ref();

        let mut element = format!(r#"<path d="{d}""#);
        if stroke {
            let width = self.tracker.device_line_width();
            let _ = write!(element, r#" fill="none" stroke="{value}" stroke-width="{}""#, num(width));
            if paint_opacity < 1.0 {
                let _ = write!(element, r#" stroke-opacity="{}""#, num(paint_opacity));
            }
            let state = &self.tracker.state;
            if state.cap != LineCap::Butt {
                let _ = write!(element, r#" stroke-linecap="{}""#, cap_name(state.cap));
            }
            if state.join != LineJoin::Miter {
                let _ = write!(element, r#" stroke-linejoin="{}""#, join_name(state.join));
            }
            let dash = self.tracker.device_dash();
            if !dash.is_empty() {
                let list: Vec<String> = dash.iter().map(|d| num(*d)).collect();
                let _ = write!(element, r#" stroke-dasharray="{}""#, list.join(" "));
            }
        } else {
            let _ = write!(element, r#" fill="{value}""#);
            if paint_opacity < 1.0 {
                let _ = write!(element, r#" fill-opacity="{}""#, num(paint_opacity));
            }
        }
        if alpha < 1.0 {
            let _ = write!(element, r#" opacity="{}""#, num(alpha));
        }
        if let Some(clip) = &self.tracker.state.clip {
            let _ = write!(element, r#" clip-path="url(#{clip})""#);
        }
        if let Some(filter) = filter {
            let _ = write!(element, r#" filter="url(#{filter})""#);
        }
        element.push_str("/>");
        self.body.push_str(&element);
    }
}

impl RenderContext for SvgContext {
    fn save(&mut self) {
        self.tracker.save();
    }

    fn restore(&mut self) {
        self.tracker.restore();
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.tracker.set_alpha(alpha);
    }

    fn global_alpha(&self) -> f64 {
        self.tracker.state.alpha
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.tracker.translate(dx, dy);
    }

    fn rotate(&mut self, radians: f64) {
        self.tracker.rotate(radians);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.tracker.scale(sx, sy);
    }

    fn begin_path(&mut self) {
        self.tracker.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.tracker.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.tracker.line_to(x, y);
    }

    fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.tracker.quad_to(cx, cy, x, y);
    }

    fn cubic_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.tracker.cubic_to(c1x, c1y, c2x, c2y, x, y);
    }

    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64) {
        self.tracker.arc(cx, cy, radius, start, end);
    }

    fn close_path(&mut self) {
        self.tracker.close_path();
    }

    fn set_fill(&mut self, paint: Paint) {
        self.tracker.state.fill = self.tracker.state.transform.apply_paint(&paint);
    }

    fn set_stroke(&mut self, paint: Paint) {
        self.tracker.state.stroke = self.tracker.state.transform.apply_paint(&paint);
    }

    fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width >= 0.0 {
            self.tracker.state.line_width = width;
        }
    }

    fn set_line_dash(&mut self, pattern: &[f64]) {
        self.tracker.state.dash = clean_dash(pattern);
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.tracker.state.cap = cap;
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.tracker.state.join = join;
    }

    fn set_blur(&mut self, radius: f64) {
        self.tracker.state.blur = if radius.is_finite() { radius.max(0.0) } else { 0.0 };
    }

    fn fill(&mut self) {
        let path = self.tracker.path.clone();
        self.emit(&path, false);
    }

    fn stroke(&mut self) {
        if self.tracker.device_line_width() <= 0.0 {
            return;
        }
        let path = self.tracker.path.clone();
        self.emit(&path, true);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let rect = self.tracker.rect_path(x, y, width, height);
        self.emit(&rect, false);
    }

    fn clip(&mut self) {
        let id = self.id("c");
        let _ = write!(self.defs, r#"<clipPath id="{id}""#);
        // Nested clips intersect through the clip path's own clip-path.
        if let Some(parent) = &self.tracker.state.clip {
            let _ = write!(self.defs, r#" clip-path="url(#{parent})""#);
        }
        let _ = write!(self.defs, r#"><path d="{}"/></clipPath>"#, path_data(&self.tracker.path));
        self.tracker.state.clip = Some(id);
    }
}

fn write_stops(out: &mut String, stops: &[GradientStop], remap: impl Fn(f64) -> f64) {
    for stop in stops {
        let Color { a, .. } = stop.color;
        let _ = write!(
            out,
            r#"<stop offset="{}" stop-color="{}""#,
            num(remap(stop.offset.clamp(0.0, 1.0))),
            stop.color.to_hex()
        );
        if a < 1.0 {
            let _ = write!(out, r#" stop-opacity="{}""#, num(a as f64));
        }
        out.push_str("/>");
    }
}

fn path_data(commands: &[PathCommand]) -> String {
    let mut d = String::new();
    for command in commands {
        if !d.is_empty() {
            d.push(' ');
        }
        let _ = match *command {
            PathCommand::MoveTo(p) => write!(d, "M{} {}", num(p.x), num(p.y)),
            PathCommand::LineTo(p) => write!(d, "L{} {}", num(p.x), num(p.y)),
            PathCommand::QuadTo(c, p) => write!(d, "Q{} {} {} {}", num(c.x), num(c.y), num(p.x), num(p.y)),
            PathCommand::CubicTo(c1, c2, p) => write!(
                d,
                "C{} {} {} {} {} {}",
                num(c1.x),
                num(c1.y),
                num(c2.x),
                num(c2.y),
                num(p.x),
                num(p.y)
            ),
            PathCommand::Close => write!(d, "Z"),
        };
    }
    d
}

/// Compact decimal formatting with at most three fractional digits.
fn num(value: f64) -> String {
    let s = format!("{value:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn cap_name(cap: LineCap) -> &'static str {
    match cap {
        LineCap::Butt => "butt",
        LineCap::Round => "round",
        LineCap::Square => "square",
    }
}

fn join_name(join: LineJoin) -> &'static str {
    match join {
        LineJoin::Miter => "miter",
        LineJoin::Round => "round",
        LineJoin::Bevel => "bevel",
    }
}
