use ite_types::{CaptureArea, Point, SelectionRect};

use crate::layer::SelectionHost;

/// Scale a CSS-pixel rectangle into device pixels.
///
/// A missing or nonsensical ratio counts as 1.
pub fn to_device_space(rect: SelectionRect, ratio: f64) -> CaptureArea {
    let ratio = if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        1.0
    };

    CaptureArea {
        x: rect.x * ratio,
        y: rect.y * ratio,
        width: rect.width * ratio,
        height: rect.height * ratio,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionState {
    Idle,
    /// Layer installed, waiting for pointer-down
    Selecting,
    Dragging { anchor: Point },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerOutcome {
    /// Event arrived in a state that does not use it
    Ignored,
    Updated(SelectionRect),
    /// Gesture ended without a request (too small or cancelled)
    Abandoned,
    Submitted(CaptureArea),
}

/// Drag-to-select state machine: `Idle -> Selecting -> Idle`
pub struct SelectionController<H: SelectionHost> {
    host: H,
    state: SelectionState,
    min_size: f64,
}

impl<H: SelectionHost> SelectionController<H> {
    pub fn new(host: H, min_size: f64) -> Self {
        Self {
            host,
            state: SelectionState::Idle,
            min_size,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_selecting(&self) -> bool {
        self.state != SelectionState::Idle
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Returns `false` when a selection is already running
    pub fn start(&mut self) -> bool {
        if self.is_selecting() {
            tracing::debug!("Selection already active, ignoring start");
            return false;
        }

        self.host.install_layer();
        self.host.set_text_selection(false);
        self.state = SelectionState::Selecting;
        true
    }

    pub fn pointer_down(&mut self, at: Point) -> PointerOutcome {
        if !self.is_selecting() {
            return PointerOutcome::Ignored;
        }

        let rect = SelectionRect::from_corners(at, at);
        self.host.show_rect(rect);
        self.host.set_drag_tracking(true);
        self.state = SelectionState::Dragging { anchor: at };
        PointerOutcome::Updated(rect)
    }

    pub fn pointer_move(&mut self, at: Point) -> PointerOutcome {
        let SelectionState::Dragging { anchor } = self.state else {
            return PointerOutcome::Ignored;
        };

        let rect = SelectionRect::from_corners(anchor, at);
        self.host.show_rect(rect);
        PointerOutcome::Updated(rect)
    }

    /// Finish the drag using the rectangle as rendered
    pub fn pointer_up(&mut self) -> PointerOutcome {
        let SelectionState::Dragging { .. } = self.state else {
            return PointerOutcome::Ignored;
        };

        let rendered = self.host.rendered_bounds();
        let ratio = self.host.device_pixel_ratio();
        self.finish();

        match rendered {
            Some(rect) if rect.meets_minimum(self.min_size) => {
                let area = to_device_space(rect, ratio);
                tracing::debug!("Selection {:?} -> device area {:?}", rect, area);
                PointerOutcome::Submitted(area)
            }
            rect => {
                tracing::debug!("Selection {:?} below minimum, abandoned", rect);
                PointerOutcome::Abandoned
            }
        }
    }

    /// Abandon the current gesture, if any
    pub fn cancel(&mut self) -> PointerOutcome {
        if !self.is_selecting() {
            return PointerOutcome::Ignored;
        }

        self.finish();
        PointerOutcome::Abandoned
    }

    fn finish(&mut self) {
        self.host.set_drag_tracking(false);
        self.host.teardown_layer();
        self.host.set_text_selection(true);
        self.state = SelectionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::OverlayLayer;

    fn controller(ratio: f64) -> SelectionController<OverlayLayer> {
        SelectionController::new(OverlayLayer::new(ratio), 10.0)
    }

    fn drag(ctl: &mut SelectionController<OverlayLayer>, from: (f64, f64), to: (f64, f64)) -> PointerOutcome {
        ctl.pointer_down(Point::new(from.0, from.1));
        ctl.pointer_move(Point::new(to.0, to.1));
        ctl.pointer_up()
    }

    #[test]
    fn test_start_installs_layer_and_blocks_text_selection() {
        let mut ctl = controller(1.0);
        assert!(ctl.start());

        assert!(ctl.host().is_installed());
        assert!(!ctl.host().text_selection_enabled());
        assert_eq!(ctl.state(), SelectionState::Selecting);
    }

    #[test]
    fn test_second_start_is_noop() {
        let mut ctl = controller(1.0);
        assert!(ctl.start());
        assert!(!ctl.start());
        assert_eq!(ctl.host().installs(), 1);
    }

    #[test]
    fn test_drag_submits_device_area() {
        let mut ctl = controller(2.0);
        ctl.start();

        let outcome = drag(&mut ctl, (120.0, 80.0), (20.0, 30.0));

        assert_eq!(
            outcome,
            PointerOutcome::Submitted(CaptureArea::new(40.0, 60.0, 200.0, 100.0))
        );
        assert_eq!(ctl.state(), SelectionState::Idle);
        assert!(!ctl.host().is_installed());
        assert!(ctl.host().text_selection_enabled());
    }

    #[test]
    fn test_small_selection_is_abandoned() {
        for (from, to) in [
            ((0.0, 0.0), (9.0, 200.0)),
            ((0.0, 0.0), (200.0, 9.0)),
            ((50.0, 50.0), (50.0, 50.0)),
        ] {
            let mut ctl = controller(1.0);
            ctl.start();

            assert_eq!(drag(&mut ctl, from, to), PointerOutcome::Abandoned);
            assert_eq!(ctl.host().teardowns(), 1);
            assert!(!ctl.host().is_installed());
        }
    }

    #[test]
    fn test_move_depends_only_on_anchor_and_pointer() {
        let mut ctl = controller(1.0);
        ctl.start();
        ctl.pointer_down(Point::new(100.0, 100.0));

        for i in 0..50 {
            let f = i as f64 * 3.7;
            ctl.pointer_move(Point::new(f, 200.0 - f));
        }
        let last = ctl.pointer_move(Point::new(160.0, 40.0));

        assert_eq!(
            last,
            PointerOutcome::Updated(SelectionRect::new(100.0, 40.0, 60.0, 60.0))
        );
    }

    #[test]
    fn test_pointer_events_outside_drag_are_ignored() {
        let mut ctl = controller(1.0);
        assert_eq!(ctl.pointer_down(Point::new(1.0, 1.0)), PointerOutcome::Ignored);

        ctl.start();
        assert_eq!(ctl.pointer_move(Point::new(5.0, 5.0)), PointerOutcome::Ignored);
        assert_eq!(ctl.pointer_up(), PointerOutcome::Ignored);
        assert!(ctl.host().is_installed());
    }

    #[test]
    fn test_restart_begins_clean() {
        let mut ctl = controller(1.0);
        ctl.start();
        drag(&mut ctl, (0.0, 0.0), (50.0, 50.0));

        assert!(ctl.start());
        assert_eq!(ctl.state(), SelectionState::Selecting);
        assert_eq!(ctl.host().rendered_bounds(), None);
        assert!(!ctl.host().is_drag_tracking());
        assert_eq!((ctl.host().installs(), ctl.host().teardowns()), (2, 1));
    }

    #[test]
    fn test_cancel_tears_down_once() {
        let mut ctl = controller(1.0);
        ctl.start();
        ctl.pointer_down(Point::new(0.0, 0.0));

        assert_eq!(ctl.cancel(), PointerOutcome::Abandoned);
        assert_eq!(ctl.cancel(), PointerOutcome::Ignored);
        assert_eq!(ctl.host().teardowns(), 1);
    }

    #[test]
    fn test_rendered_bounds_are_used() {
        let mut ctl = controller(1.0);
        ctl.start();

        let outcome = drag(&mut ctl, (10.4, 10.4), (30.6, 30.6));

        // Layout rounds to whole pixels at ratio 1
        assert_eq!(
            outcome,
            PointerOutcome::Submitted(CaptureArea::new(10.0, 10.0, 21.0, 21.0))
        );
    }

    #[test]
    fn test_to_device_space_scales_every_field() {
        let rect = SelectionRect::new(10.0, 20.0, 30.0, 40.0);

        assert_eq!(
            to_device_space(rect, 1.5),
            CaptureArea::new(15.0, 30.0, 45.0, 60.0)
        );
        assert_eq!(to_device_space(rect, 0.0), CaptureArea::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(
            to_device_space(rect, f64::NAN),
            CaptureArea::new(10.0, 20.0, 30.0, 40.0)
        );
    }

    #[test]
    fn test_device_area_positive_for_valid_rects() {
        for ratio in [0.5, 1.0, 1.25, 2.0, 3.0] {
            for size in [10.0, 11.0, 640.0] {
                let area = to_device_space(SelectionRect::new(0.0, 0.0, size, size), ratio);
                assert!(area.has_positive_size());
                assert_eq!(area.width, size * ratio);
            }
        }
    }
}
