//! Hover controller: turns raw pointer movement into a debounced,
//! deduplicated, race-suppressed translation lookup driving the tooltip.
//! One worker loop owns all session state; the remote lookup is the only
//! suspension point and runs as a spawned task so pointer handling never
//! blocks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::locate::{TextProbe, WordLocator};
use crate::metrics::{metric_names, LookupIds, MetricsRegistry};
use crate::staleness::{GenerationGuard, LookupGeneration};
use crate::tooltip::TooltipPresenter;
use crate::translate::TranslationService;

/// Pointer events delivered by the host's global listeners.
/// Submission is non-blocking; the host thread is never held up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Moved { x: f64, y: f64 },
    Left,
}

/// Controller states, tracked for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverState {
    Idle,
    PendingLookup(String),
    Resolved(String),
}

impl std::fmt::Display for HoverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HoverState::Idle => write!(f, "Idle"),
            HoverState::PendingLookup(word) => write!(f, "PendingLookup({word})"),
            HoverState::Resolved(word) => write!(f, "Resolved({word})"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HoverConfig {
    /// Idle time after the last pointer move before the locator runs.
    pub debounce_window: Duration,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            debounce_window: Duration::from_millis(200),
        }
    }
}

/// The coordinates of a burst of pointer moves, kept in the single debounce
/// slot until the deadline fires.
struct PointerSample {
    x: f64,
    y: f64,
    armed_at: Instant,
}

/// A completed lookup flowing back into the controller loop.
struct LookupOutcome {
    word: String,
    x: f64,
    y: f64,
    translated: Option<String>,
    guard: GenerationGuard,
    ids: LookupIds,
}

pub(crate) struct HoverController {
    config: HoverConfig,
    probe: Arc<dyn TextProbe>,
    locator: WordLocator,
    presenter: Arc<TooltipPresenter>,
    service: Arc<TranslationService>,
    generation: LookupGeneration,
    metrics: Arc<MetricsRegistry>,
    state: HoverState,
    last_word: String,
    target_lang: String,
}

impl HoverController {
    pub(crate) fn new(
        config: HoverConfig,
        probe: Arc<dyn TextProbe>,
        presenter: Arc<TooltipPresenter>,
        service: Arc<TranslationService>,
        metrics: Arc<MetricsRegistry>,
        target_lang: String,
    ) -> Self {
        Self {
            config,
            probe,
            locator: WordLocator::new(),
            presenter,
            service,
            generation: LookupGeneration::new(),
            metrics,
            state: HoverState::Idle,
            last_word: String::new(),
            target_lang,
        }
    }

    /// Controller loop. Exits when the handle is dropped or shutdown fires.
    pub(crate) async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<PointerEvent>,
        mut lang_rx: watch::Receiver<String>,
        shutdown: CancellationToken,
    ) {
        // Completed lookups are funneled back into this loop so all session
        // state stays single-writer.
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<LookupOutcome>();

        // Single-slot debounce: at most one armed deadline, re-armed on
        // every pointer move.
        let mut pending: Option<PointerSample> = None;
        let mut deadline = Instant::now();

        info!(
            debounce_ms = self.config.debounce_window.as_millis() as u64,
            target_lang = %self.target_lang,
            "hover loop started"
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,

                event = events.recv() => match event {
                    Some(PointerEvent::Moved { x, y }) => {
                        match pending.as_mut() {
                            Some(sample) => {
                                sample.x = x;
                                sample.y = y;
                            }
                            None => {
                                pending = Some(PointerSample {
                                    x,
                                    y,
                                    armed_at: Instant::now(),
                                });
                            }
                        }
                        deadline = Instant::now() + self.config.debounce_window;
                    }
                    Some(PointerEvent::Left) => {
                        pending = None;
                        self.on_pointer_left();
                    }
                    None => break,
                },

                _ = lang_rx.changed() => {
                    let lang = lang_rx.borrow_and_update().clone();
                    self.on_language_changed(lang);
                }

                Some(outcome) = done_rx.recv() => {
                    self.on_lookup_done(outcome);
                }

                _ = tokio::time::sleep_until(deadline), if pending.is_some() => {
                    let sample = pending.take().expect("armed debounce slot");
                    self.metrics.record(
                        metric_names::DEBOUNCE_WAIT,
                        sample.armed_at.elapsed().as_micros() as f64,
                    );
                    self.on_debounce_fire(sample.x, sample.y, &done_tx);
                }
            }
        }

        info!("hover loop exiting");
    }

    /// Debounce fired: locate the word under the captured coordinates and
    /// decide whether a lookup is needed.
    fn on_debounce_fire(
        &mut self,
        x: f64,
        y: f64,
        done_tx: &mpsc::UnboundedSender<LookupOutcome>,
    ) {
        let span = self.metrics.span(metric_names::LOCATE_DONE);
        let located = self.locator.locate(self.probe.as_ref(), x, y);
        span.finish();

        let word = match located {
            None => {
                self.presenter.hide();
                self.last_word.clear();
                self.set_state(HoverState::Idle);
                return;
            }
            // Same word as the last lookup: no-op, avoids tooltip flicker
            // while hovering within one word.
            Some(word) if word == self.last_word => return,
            Some(word) => word,
        };

        self.last_word = word.clone();
        self.presenter.show_loading(&word, x, y);
        self.set_state(HoverState::PendingLookup(word.clone()));

        let guard = self.generation.advance();
        let ids = LookupIds::new(guard.issued());
        debug!(
            request_id = %ids.request_id,
            word = %word,
            target_lang = %self.target_lang,
            "lookup_spawned"
        );

        let service = Arc::clone(&self.service);
        let target_lang = self.target_lang.clone();
        let done_tx = done_tx.clone();
        tokio::spawn(async move {
            let translated = service.translate(&ids, &word, &target_lang).await;
            let _ = done_tx.send(LookupOutcome {
                word,
                x,
                y,
                translated,
                guard,
                ids,
            });
        });
    }

    /// A lookup finished. Stale results (a newer lookup was issued, or the
    /// pointer has moved on to a different word) are discarded silently.
    fn on_lookup_done(&mut self, outcome: LookupOutcome) {
        if !outcome.guard.is_current() || outcome.word != self.last_word {
            debug!(
                request_id = %outcome.ids.request_id,
                word = %outcome.word,
                "stale lookup discarded"
            );
            return;
        }

        let span = self.metrics.span(metric_names::RENDER_DONE);
        match outcome.translated {
            Some(translation) => {
                self.presenter
                    .show_result(&outcome.word, &translation, outcome.x, outcome.y);
                self.set_state(HoverState::Resolved(outcome.word));
            }
            None => {
                // No usable translation. The word stays recorded so hovering
                // it again does not re-issue the failed lookup.
                self.presenter.hide();
                self.set_state(HoverState::Idle);
            }
        }
        span.finish();
    }

    fn on_pointer_left(&mut self) {
        self.presenter.hide();
        self.last_word.clear();
        self.set_state(HoverState::Idle);
    }

    /// The cache was already cleared synchronously by the notifier; the loop
    /// only updates its session language and forgets the last word so the
    /// same word re-translates under the new language.
    fn on_language_changed(&mut self, lang: String) {
        info!(from = %self.target_lang, to = %lang, "target_language_changed");
        self.target_lang = lang;
        self.last_word.clear();
    }

    fn set_state(&mut self, next: HoverState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "hover_state");
            self.state = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_debounce_window_is_200ms() {
        assert_eq!(
            HoverConfig::default().debounce_window,
            Duration::from_millis(200)
        );
    }

    #[test]
    fn state_display_names_the_word() {
        assert_eq!(HoverState::Idle.to_string(), "Idle");
        assert_eq!(
            HoverState::PendingLookup("hello".to_string()).to_string(),
            "PendingLookup(hello)"
        );
        assert_eq!(
            HoverState::Resolved("hello".to_string()).to_string(),
            "Resolved(hello)"
        );
    }
}
