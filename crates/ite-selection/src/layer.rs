use ite_types::SelectionRect;

/// What the selection controller needs from the page it runs in
pub trait SelectionHost {
    /// Put the full-viewport pointer-capture layer on top of the page
    fn install_layer(&mut self);

    /// Remove the layer and everything attached to it
    fn teardown_layer(&mut self);

    /// Attach or detach the move/up listeners of an active drag
    fn set_drag_tracking(&mut self, enabled: bool);

    fn set_text_selection(&mut self, enabled: bool);

    /// Draw the drag rectangle
    fn show_rect(&mut self, rect: SelectionRect);

    /// Bounding box of the drag rectangle as laid out, if one is shown
    fn rendered_bounds(&self) -> Option<SelectionRect>;

    fn device_pixel_ratio(&self) -> f64;
}

/// In-memory capture layer.
///
/// Layout snaps the drawn rectangle to the device pixel grid, which is why the
/// rendered bounds can differ from the raw pointer rectangle.
#[derive(Debug, Clone)]
pub struct OverlayLayer {
    ratio: f64,
    installed: bool,
    drag_tracking: bool,
    text_selection: bool,
    rect: Option<SelectionRect>,
    installs: usize,
    teardowns: usize,
}

impl OverlayLayer {
    pub fn new(ratio: f64) -> Self {
        Self {
            ratio,
            installed: false,
            drag_tracking: false,
            text_selection: true,
            rect: None,
            installs: 0,
            teardowns: 0,
        }
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f64) {
        self.ratio = ratio;
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn is_drag_tracking(&self) -> bool {
        self.drag_tracking
    }

    pub fn text_selection_enabled(&self) -> bool {
        self.text_selection
    }

    pub fn installs(&self) -> usize {
        self.installs
    }

    pub fn teardowns(&self) -> usize {
        self.teardowns
    }

    fn snap(&self, value: f64) -> f64 {
        if self.ratio.is_finite() && self.ratio > 0.0 {
            (value * self.ratio).round() / self.ratio
        } else {
            value.round()
        }
    }
}

impl Default for OverlayLayer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SelectionHost for OverlayLayer {
    fn install_layer(&mut self) {
        self.installed = true;
        self.rect = None;
        self.installs += 1;
    }

    fn teardown_layer(&mut self) {
        self.installed = false;
        self.drag_tracking = false;
        self.rect = None;
        self.teardowns += 1;
    }

    fn set_drag_tracking(&mut self, enabled: bool) {
        self.drag_tracking = enabled;
    }

    fn set_text_selection(&mut self, enabled: bool) {
        self.text_selection = enabled;
    }

    fn show_rect(&mut self, rect: SelectionRect) {
        self.rect = Some(rect);
    }

    fn rendered_bounds(&self) -> Option<SelectionRect> {
        let rect = self.rect?;
        let left = self.snap(rect.x);
        let top = self.snap(rect.y);
        let right = self.snap(rect.x + rect.width);
        let bottom = self.snap(rect.y + rect.height);

        Some(SelectionRect::new(left, top, right - left, bottom - top))
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.ratio
    }
}
