//! Ordered multi-pass rendering.
//!
//! A preset queues its passes on a [`Compositor`] in whatever order is
//! convenient; [`Compositor::run`] executes them by [`Pass`] rank so that
//! shadows always land first and highlights always land last. Every pass runs
//! inside its own [`Scoped`] guard.

use std::fmt;

use tracing::debug;

use crate::surface::{RenderContext, Scoped};

/// Compositing pass kinds, in paint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pass {
    Shadow,
    Glow,
    Fill,
    Texture,
    Stroke,
    Highlight,
}

impl Pass {
    pub const ALL: [Pass; 6] = [
        Pass::Shadow,
        Pass::Glow,
        Pass::Fill,
        Pass::Texture,
        Pass::Stroke,
        Pass::Highlight,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|pass| pass.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Pass::Shadow => "shadow",
            Pass::Glow => "glow",
            Pass::Fill => "fill",
            Pass::Texture => "texture",
            Pass::Stroke => "stroke",
            Pass::Highlight => "highlight",
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Step<'a> = Box<dyn FnOnce(&mut dyn RenderContext) + 'a>;

/// Collects passes for one frame and paints them in rank order.
#[derive(Default)]
pub struct Compositor<'a> {
    steps: Vec<(Pass, Step<'a>)>,
    skipped: usize,
}

impl<'a> Compositor<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an unconditional pass.
    pub fn add(&mut self, pass: Pass, draw: impl FnOnce(&mut dyn RenderContext) + 'a) -> &mut Self {
        self.steps.push((pass, Box::new(draw)));
        self
    }

    /// Queues a pass driven by `strength`. The pass is dropped when the
    /// strength does not exceed `threshold` (non-finite strengths included).
    pub fn add_if(
        &mut self,
        pass: Pass,
        strength: f64,
        threshold: f64,
        draw: impl FnOnce(&mut dyn RenderContext) + 'a,
    ) -> &mut Self {
        if strength > threshold {
            self.add(pass, draw)
        } else {
            debug!(%pass, strength, threshold, "skipping pass");
            self.skipped += 1;
            self
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Passes dropped by [`Compositor::add_if`].
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Paints every queued pass and returns how many ran.
    ///
    /// Passes of the same kind keep their insertion order.
    pub fn run(mut self, ctx: &mut dyn RenderContext) -> usize {
        self.steps.sort_by_key(|(pass, _)| *pass);
        let count = self.steps.len();
        for (_, draw) in self.steps {
            let mut scoped = Scoped::new(ctx);
            draw(&mut *scoped);
        }
        count
    }
}

/// Alpha for the `index`-th concentric layer, outermost first.
pub fn layer_alpha(index: usize) -> f64 {
    (1.0 - 0.2 * index as f64).max(0.1)
}
