//! A surface that records calls instead of drawing.

use super::{LineCap, LineJoin, Paint, RenderContext};

/// One recorded call, with arguments as given (user coordinates).
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Save,
    Restore,
    SetGlobalAlpha(f64),
    Translate(f64, f64),
    Rotate(f64),
    Scale(f64, f64),
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    QuadTo(f64, f64, f64, f64),
    CubicTo(f64, f64, f64, f64, f64, f64),
    Arc {
        cx: f64,
        cy: f64,
        radius: f64,
        start: f64,
        end: f64,
    },
    ClosePath,
    SetFill(Paint),
    SetStroke(Paint),
    SetLineWidth(f64),
    SetLineDash(Vec<f64>),
    SetLineCap(LineCap),
    SetLineJoin(LineJoin),
    SetBlur(f64),
    Fill,
    Stroke,
    FillRect(f64, f64, f64, f64),
    Clip,
}

impl DrawCall {
    /// True for calls that put pixels on a surface.
    pub fn is_paint(&self) -> bool {
        matches!(self, DrawCall::Fill | DrawCall::Stroke | DrawCall::FillRect(..))
    }
}

/// Records every call. Tracks global alpha and save depth so callers reading
/// [`RenderContext::global_alpha`] see the same values as on a real surface.
#[derive(Debug)]
pub struct RecordingContext {
    calls: Vec<DrawCall>,
    alpha: f64,
    alpha_stack: Vec<f64>,
    /// Global alpha at the moment of each paint call, in call order.
    paint_alphas: Vec<f64>,
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            alpha: 1.0,
            alpha_stack: Vec::new(),
            paint_alphas: Vec::new(),
        }
    }
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn count(&self, predicate: impl Fn(&DrawCall) -> bool) -> usize {
        self.calls.iter().filter(|c| predicate(c)).count()
    }

    /// Number of fill, stroke, and rectangle paints.
    pub fn paint_count(&self) -> usize {
        self.count(DrawCall::is_paint)
    }

    pub fn paint_alphas(&self) -> &[f64] {
        &self.paint_alphas
    }

    /// Current save depth.
    pub fn depth(&self) -> usize {
        self.alpha_stack.len()
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    fn push(&mut self, call: DrawCall) {
        if call.is_paint() {
            self.paint_alphas.push(self.alpha);
        }
        self.calls.push(call);
    }
}

impl RenderContext for RecordingContext {
    fn save(&mut self) {
        self.alpha_stack.push(self.alpha);
        self.push(DrawCall::Save);
    }

    fn restore(&mut self) {
        if let Some(alpha) = self.alpha_stack.pop() {
            self.alpha = alpha;
        }
        self.push(DrawCall::Restore);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.alpha = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 1.0 };
        self.push(DrawCall::SetGlobalAlpha(alpha));
    }

    fn global_alpha(&self) -> f64 {
        self.alpha
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.push(DrawCall::Translate(dx, dy));
    }

    fn rotate(&mut self, radians: f64) {
        self.push(DrawCall::Rotate(radians));
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.push(DrawCall::Scale(sx, sy));
    }

    fn begin_path(&mut self) {
        self.push(DrawCall::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.push(DrawCall::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.push(DrawCall::LineTo(x, y));
    }

    fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.push(DrawCall::QuadTo(cx, cy, x, y));
    }

    fn cubic_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.push(DrawCall::CubicTo(c1x, c1y, c2x, c2y, x, y));
    }

    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64) {
        self.push(DrawCall::Arc {
            cx,
            cy,
            radius,
            start,
            end,
        });
    }

    fn close_path(&mut self) {
        self.push(DrawCall::ClosePath);
    }

    fn set_fill(&mut self, paint: Paint) {
        self.push(DrawCall::SetFill(paint));
    }

    fn set_stroke(&mut self, paint: Paint) {
        self.push(DrawCall::SetStroke(paint));
    }

    fn set_line_width(&mut self, width: f64) {
        self.push(DrawCall::SetLineWidth(width));
    }

    fn set_line_dash(&mut self, pattern: &[f64]) {
        self.push(DrawCall::SetLineDash(pattern.to_vec()));
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.push(DrawCall::SetLineCap(cap));
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.push(DrawCall::SetLineJoin(join));
    }

    fn set_blur(&mut self, radius: f64) {
        self.push(DrawCall::SetBlur(radius));
    }

    fn fill(&mut self) {
        self.push(DrawCall::Fill);
    }

    fn stroke(&mut self) {
        self.push(DrawCall::Stroke);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.push(DrawCall::FillRect(x, y, width, height));
    }

    fn clip(&mut self) {
        self.push(DrawCall::Clip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Scoped;

    #[test]
    fn records_in_order() {
        let mut ctx = RecordingContext::new();
        ctx.begin_path();
        ctx.rect(0.0, 0.0, 2.0, 2.0);
        ctx.fill();
        assert_eq!(ctx.calls()[0], DrawCall::BeginPath);
        assert_eq!(ctx.calls()[1], DrawCall::MoveTo(0.0, 0.0));
        assert_eq!(ctx.calls().last(), Some(&DrawCall::Fill));
        assert_eq!(ctx.paint_count(), 1);
    }

    #[test]
    fn scoped_guard_balances_state() {
        let mut ctx = RecordingContext::new();
        {
            let mut scoped = Scoped::new(&mut ctx);
            scoped.set_global_alpha(0.25);
            scoped.fill();
        }
        assert_eq!(ctx.depth(), 0);
        assert_eq!(ctx.global_alpha(), 1.0);
        assert_eq!(ctx.paint_alphas(), &[0.25]);
        assert_eq!(ctx.count(|c| *c == DrawCall::Save), ctx.count(|c| *c == DrawCall::Restore));
    }

    #[test]
    fn scoped_guard_restores_on_unwind() {
        let mut ctx = RecordingContext::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut scoped = Scoped::new(&mut ctx);
            scoped.set_global_alpha(0.1);
            panic!("draw failed");
        }));
        assert!(result.is_err());
        assert_eq!(ctx.depth(), 0);
        assert_eq!(ctx.global_alpha(), 1.0);
    }

    #[test]
    fn clear_resets() {
        let mut ctx = RecordingContext::new();
        ctx.save();
        ctx.fill();
        ctx.clear();
        assert!(ctx.is_empty());
        assert_eq!(ctx.depth(), 0);
        assert_eq!(ctx.global_alpha(), 1.0);
    }
}
