//! Named off-screen layers composited onto one visible surface.

use std::sync::Arc;

use tracing::trace;

use crate::render::canvas::{Canvas, DrawCmd, Surface, TextMeasure};

/// The four layers, in compositing order (bottom first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Grid, header fill and weekend shading.
    Background,
    /// Bar fills and selection outlines.
    Tasks,
    /// Completion overlays.
    Progress,
    /// Header and bar labels.
    Text,
}

impl LayerKind {
    pub const ORDER: [LayerKind; 4] = [
        LayerKind::Background,
        LayerKind::Tasks,
        LayerKind::Progress,
        LayerKind::Text,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Background => "background",
            LayerKind::Tasks => "tasks",
            LayerKind::Progress => "progress",
            LayerKind::Text => "text",
        }
    }

    fn index(self) -> usize {
        match self {
            LayerKind::Background => 0,
            LayerKind::Tasks => 1,
            LayerKind::Progress => 2,
            LayerKind::Text => 3,
        }
    }
}

/// Versions of the inputs a layer was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerStamp {
    pub view: u64,
    pub tasks: u64,
    pub selection: u64,
}

impl LayerStamp {
    /// Keep only the inputs `kind` actually depends on.
    pub fn for_layer(self, kind: LayerKind) -> Self {
        match kind {
            LayerKind::Background => Self {
                view: self.view,
                ..Self::default()
            },
            LayerKind::Tasks => self,
            LayerKind::Progress | LayerKind::Text => Self {
                selection: 0,
                ..self
            },
        }
    }
}

#[derive(Debug)]
pub struct RenderLayer {
    kind: LayerKind,
    surface: Surface,
    dirty: bool,
    drawn_from: Option<LayerStamp>,
}

impl RenderLayer {
    fn new(kind: LayerKind, width: f32, height: f32, measure: Arc<dyn TextMeasure>) -> Self {
        Self {
            kind,
            surface: Surface::new(width, height, measure),
            dirty: true,
            drawn_from: None,
        }
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn width(&self) -> f32 {
        self.surface.width()
    }

    pub fn height(&self) -> f32 {
        self.surface.height()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Mark dirty if `stamp` differs from what the layer was drawn from.
    pub fn sync(&mut self, stamp: LayerStamp) -> bool {
        let stamp = stamp.for_layer(self.kind);
        if self.drawn_from != Some(stamp) {
            self.dirty = true;
            self.drawn_from = Some(stamp);
        }
        self.dirty
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Clear the backing surface and hand it out for drawing.
    pub fn begin_draw(&mut self) -> &mut Surface {
        self.surface.clear();
        &mut self.surface
    }
}

/// Owns the layers and the visible surface they are composited onto.
///
/// The visible surface keeps one slot per layer; compositing replaces the
/// slots of dirty layers and leaves the others as they were.
pub struct LayerCompositor {
    layers: Vec<RenderLayer>,
    visible: Vec<Vec<DrawCmd>>,
    width: f32,
    height: f32,
    measure: Arc<dyn TextMeasure>,
}

impl std::fmt::Debug for LayerCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerCompositor")
            .field("layers", &self.layers)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl LayerCompositor {
    pub fn new(measure: Arc<dyn TextMeasure>) -> Self {
        let mut compositor = Self {
            layers: Vec::with_capacity(LayerKind::ORDER.len()),
            visible: vec![Vec::new(); LayerKind::ORDER.len()],
            width: 0.0,
            height: 0.0,
            measure,
        };
        for kind in LayerKind::ORDER {
            compositor.create_layer(kind);
        }
        compositor
    }

    /// Create (or recreate, empty and dirty) the layer of `kind`.
    pub fn create_layer(&mut self, kind: LayerKind) -> &mut RenderLayer {
        let layer = RenderLayer::new(kind, self.width, self.height, self.measure.clone());
        let idx = kind.index();
        if idx < self.layers.len() {
            self.layers[idx] = layer;
        } else {
            self.layers.push(layer);
        }
        &mut self.layers[idx]
    }

    pub fn layer(&self, kind: LayerKind) -> &RenderLayer {
        &self.layers[kind.index()]
    }

    pub fn layer_mut(&mut self, kind: LayerKind) -> &mut RenderLayer {
        &mut self.layers[kind.index()]
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Resize every layer. Contents are lost, so everything becomes dirty.
    pub fn resize_all(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        for layer in &mut self.layers {
            layer.surface.resize(width, height);
        }
        for slot in &mut self.visible {
            slot.clear();
        }
        self.mark_all_dirty();
    }

    pub fn mark_all_dirty(&mut self) {
        for layer in &mut self.layers {
            layer.mark_dirty();
        }
    }

    pub fn any_dirty(&self) -> bool {
        self.layers.iter().any(RenderLayer::is_dirty)
    }

    /// Blit every dirty layer onto the visible surface and clear its flag.
    /// Returns how many layers were composited.
    pub fn render_all(&mut self) -> usize {
        let mut composited = 0;
        for (layer, slot) in self.layers.iter_mut().zip(self.visible.iter_mut()) {
            if !layer.dirty {
                continue;
            }
            slot.clear();
            slot.extend_from_slice(layer.surface.commands());
            layer.dirty = false;
            composited += 1;
            trace!(layer = layer.name(), commands = slot.len(), "composited layer");
        }
        composited
    }

    /// Draw the visible surface, bottom layer first.
    pub fn present(&self, target: &mut dyn Canvas) {
        for cmd in self.visible.iter().flatten() {
            cmd.replay(target);
        }
    }

    /// The visible surface as one flat command list.
    pub fn visible_commands(&self) -> impl Iterator<Item = &DrawCmd> {
        self.visible.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::canvas::{FixedWidthMeasure, Rect, Rgba};

    fn compositor() -> LayerCompositor {
        let mut c = LayerCompositor::new(Arc::new(FixedWidthMeasure::default()));
        c.resize_all(100.0, 50.0);
        c
    }

    fn paint(c: &mut LayerCompositor, kind: LayerKind, shade: u8) {
        c.layer_mut(kind)
            .begin_draw()
            .fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Rgba::rgb(shade, 0, 0));
    }

    #[test]
    fn layers_exist_in_fixed_order() {
        let c = compositor();
        let names: Vec<_> = LayerKind::ORDER.iter().map(|k| c.layer(*k).name()).collect();
        assert_eq!(names, ["background", "tasks", "progress", "text"]);
        assert_eq!(c.layer(LayerKind::Text).width(), 100.0);
    }

    #[test]
    fn render_all_skips_clean_layers() {
        let mut c = compositor();
        for (i, kind) in LayerKind::ORDER.into_iter().enumerate() {
            paint(&mut c, kind, i as u8);
        }
        assert_eq!(c.render_all(), 4);
        assert_eq!(c.render_all(), 0);
        assert!(!c.any_dirty());

        paint(&mut c, LayerKind::Tasks, 99);
        c.layer_mut(LayerKind::Tasks).mark_dirty();
        assert_eq!(c.render_all(), 1);

        // Clean layers keep their last blitted content, order is preserved.
        let shades: Vec<u8> = c
            .visible_commands()
            .map(|cmd| match cmd {
                DrawCmd::FillRect { color, .. } => color.r,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(shades, [0, 99, 2, 3]);
    }

    #[test]
    fn resize_marks_everything_dirty() {
        let mut c = compositor();
        c.render_all();
        c.resize_all(200.0, 80.0);
        assert!(LayerKind::ORDER.iter().all(|k| c.layer(*k).is_dirty()));
        assert_eq!(c.visible_commands().count(), 0);
    }

    #[test]
    fn stamps_only_track_layer_inputs() {
        let mut c = compositor();
        let stamp = LayerStamp {
            view: 1,
            tasks: 1,
            selection: 1,
        };
        for kind in LayerKind::ORDER {
            c.layer_mut(kind).sync(stamp);
        }
        c.render_all();

        let selection_changed = LayerStamp {
            selection: 2,
            ..stamp
        };
        let dirty: Vec<_> = LayerKind::ORDER
            .into_iter()
            .filter(|k| c.layer_mut(*k).sync(selection_changed))
            .collect();
        assert_eq!(dirty, [LayerKind::Tasks]);
    }
}
