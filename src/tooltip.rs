//! Tooltip presentation: Hidden → Loading → Shown state machine with a watch
//! channel for reactive subscribers, screen placement with viewport flipping,
//! and the host overlay seam.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Offset from the anchor (pointer) to the tooltip box.
const ANCHOR_OFFSET: f64 = 15.0;
/// Estimated box size used for overflow flipping.
const EST_WIDTH: f64 = 200.0;
const EST_HEIGHT: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// All visual states of the tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TooltipView {
    Hidden,
    Loading { word: String },
    Shown { word: String, translation: String },
}

impl TooltipView {
    /// Returns whether transitioning from `self` to `next` is valid.
    pub fn can_transition_to(&self, next: &TooltipView) -> bool {
        use TooltipView::*;
        matches!(
            (self, next),
            (Hidden, Loading { .. })
                | (Loading { .. }, Shown { .. })
                | (Loading { .. }, Loading { .. }) // re-armed for a new word
                | (Shown { .. }, Loading { .. }) // replaced in place, no hidden frame
                | (Shown { .. }, Shown { .. })
                // Hiding is always valid
                | (_, Hidden)
        )
    }
}

impl std::fmt::Display for TooltipView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TooltipView::Hidden => write!(f, "Hidden"),
            TooltipView::Loading { word } => write!(f, "Loading({word})"),
            TooltipView::Shown { word, .. } => write!(f, "Shown({word})"),
        }
    }
}

/// Host overlay seam. The overlay element is owned by the host adapter and
/// must stay pointer-transparent at all times; `fade_out` only makes it
/// invisible and non-interactive, it never removes it from the document.
pub trait TooltipSurface: Send + Sync {
    /// Current viewport size, (width, height).
    fn viewport(&self) -> (f64, f64);
    /// Paint the loading hint at a position.
    fn paint_loading(&self, word: &str, at: Point);
    /// Paint a finished translation at a position.
    fn paint_result(&self, word: &str, translation: &str, at: Point);
    /// Start the fade to invisible.
    fn fade_out(&self);
}

/// Owns the tooltip's visual state and placement. Purely visual, idempotent;
/// the hover controller decides what to show, the presenter decides where and
/// whether the transition is legal.
pub struct TooltipPresenter {
    view: RwLock<TooltipView>,
    surface: Arc<dyn TooltipSurface>,
    view_tx: watch::Sender<TooltipView>,
    view_rx: watch::Receiver<TooltipView>,
}

impl TooltipPresenter {
    pub fn new(surface: Arc<dyn TooltipSurface>) -> Self {
        let (view_tx, view_rx) = watch::channel(TooltipView::Hidden);
        Self {
            view: RwLock::new(TooltipView::Hidden),
            surface,
            view_tx,
            view_rx,
        }
    }

    /// Current view (non-blocking read).
    pub fn current(&self) -> TooltipView {
        self.view.read().clone()
    }

    /// Subscribe to view changes.
    pub fn subscribe(&self) -> watch::Receiver<TooltipView> {
        self.view_rx.clone()
    }

    pub fn show_loading(&self, word: &str, x: f64, y: f64) {
        let at = self.place(x, y);
        let next = TooltipView::Loading {
            word: word.to_string(),
        };
        if self.transition(next) {
            self.surface.paint_loading(word, at);
        }
    }

    pub fn show_result(&self, word: &str, translation: &str, x: f64, y: f64) {
        let at = self.place(x, y);
        let next = TooltipView::Shown {
            word: word.to_string(),
            translation: translation.to_string(),
        };
        if self.transition(next) {
            self.surface.paint_result(word, translation, at);
        }
    }

    pub fn hide(&self) {
        if *self.view.read() == TooltipView::Hidden {
            return;
        }
        if self.transition(TooltipView::Hidden) {
            self.surface.fade_out();
        }
    }

    /// Attempt a view transition. Invalid transitions are refused and logged.
    fn transition(&self, next: TooltipView) -> bool {
        let mut view = self.view.write();
        if !view.can_transition_to(&next) {
            warn!(from = %*view, to = %next, "invalid tooltip transition");
            return false;
        }
        debug!(from = %*view, to = %next, "tooltip_transition");
        *view = next.clone();
        let _ = self.view_tx.send(next);
        true
    }

    /// Anchor plus fixed offset; flipped to the opposite side of the anchor
    /// when the box would overflow the right or bottom viewport edge, then
    /// clamped to the origin.
    fn place(&self, x: f64, y: f64) -> Point {
        let (viewport_w, viewport_h) = self.surface.viewport();
        let mut px = x + ANCHOR_OFFSET;
        let mut py = y + ANCHOR_OFFSET;
        if px + EST_WIDTH > viewport_w {
            px = x - EST_WIDTH;
        }
        if py + EST_HEIGHT > viewport_h {
            py = y - EST_HEIGHT;
        }
        Point {
            x: px.max(0.0),
            y: py.max(0.0),
        }
    }
}
