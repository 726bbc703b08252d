//! hoverglot: pointer-hover word translation engine.
//! Word location from a platform hit-test, debounced and deduplicated
//! lookups with a process-lifetime cache and staleness suppression, and a
//! tooltip state machine. Platform collaborators (the host document, the
//! settings store, the translation endpoint) are traits, so any conforming
//! host can embed the engine.

pub mod hover;
pub mod locate;
pub mod metrics;
pub mod settings;
pub mod staleness;
pub mod tooltip;
pub mod translate;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use hover::{HoverConfig, HoverState, PointerEvent};
pub use locate::{TextHit, TextProbe};
pub use settings::{SettingsStore, DEFAULT_TARGET_LANG, SOURCE_LANG};
pub use tooltip::{Point, TooltipSurface, TooltipView};
pub use translate::{LookupBackend, LookupError};

use hover::HoverController;
use metrics::MetricsRegistry;
use tooltip::TooltipPresenter;
use translate::cache::TranslationCache;
use translate::TranslationService;

/// Initialize tracing for embedders that have no subscriber of their own.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hoverglot=debug".parse().unwrap()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();
}

/// Builds the pipeline and spawns the controller loop.
pub struct HoverEngine;

impl HoverEngine {
    /// Wire cache, translation service, presenter and controller, and spawn
    /// the controller loop onto the current Tokio runtime. The returned
    /// handle is the host's only interface to the engine.
    pub fn spawn(
        config: HoverConfig,
        probe: Arc<dyn TextProbe>,
        surface: Arc<dyn TooltipSurface>,
        backend: Arc<dyn LookupBackend>,
        target_lang: impl Into<String>,
    ) -> HoverHandle {
        let target_lang = target_lang.into();
        let metrics = Arc::new(MetricsRegistry::new());
        let cache = Arc::new(TranslationCache::new());
        let service = Arc::new(TranslationService::new(
            backend,
            Arc::clone(&cache),
            Arc::clone(&metrics),
            SOURCE_LANG,
        ));
        let presenter = Arc::new(TooltipPresenter::new(surface));

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (lang_tx, lang_rx) = watch::channel(target_lang.clone());
        let shutdown = CancellationToken::new();

        let controller = HoverController::new(
            config,
            probe,
            Arc::clone(&presenter),
            service,
            Arc::clone(&metrics),
            target_lang,
        );
        tokio::spawn(controller.run(event_rx, lang_rx, shutdown.clone()));
        info!("hover engine spawned");

        HoverHandle {
            events: event_tx,
            lang_tx,
            presenter,
            cache,
            metrics,
            shutdown,
        }
    }

    /// Like [`HoverEngine::spawn`], but reads the initial target language
    /// from the settings store first, falling back to the default silently.
    pub async fn spawn_with_settings(
        config: HoverConfig,
        probe: Arc<dyn TextProbe>,
        surface: Arc<dyn TooltipSurface>,
        backend: Arc<dyn LookupBackend>,
        store: &dyn SettingsStore,
    ) -> HoverHandle {
        let target_lang = settings::resolve_target_lang(store).await;
        Self::spawn(config, probe, surface, backend, target_lang)
    }
}

/// Host-facing handle: pointer event submission, language updates, and
/// observability accessors. Dropping the handle stops the controller loop.
pub struct HoverHandle {
    events: mpsc::UnboundedSender<PointerEvent>,
    lang_tx: watch::Sender<String>,
    presenter: Arc<TooltipPresenter>,
    cache: Arc<TranslationCache>,
    metrics: Arc<MetricsRegistry>,
    shutdown: CancellationToken,
}

impl HoverHandle {
    /// Submit a pointer move. Never blocks.
    pub fn pointer_moved(&self, x: f64, y: f64) {
        let _ = self.events.send(PointerEvent::Moved { x, y });
    }

    /// The pointer left the tracked surface: the tooltip hides
    /// unconditionally.
    pub fn pointer_left(&self) {
        let _ = self.events.send(PointerEvent::Left);
    }

    /// Update the target language. Clears the translation cache
    /// synchronously before the controller observes the change, so no
    /// stale-language entry can ever be served. A no-op if unchanged.
    pub fn set_target_lang(&self, lang: impl Into<String>) {
        let lang = lang.into();
        if *self.lang_tx.borrow() == lang {
            return;
        }
        self.cache.clear();
        let _ = self.lang_tx.send(lang);
    }

    pub fn target_lang(&self) -> String {
        self.lang_tx.borrow().clone()
    }

    /// Current tooltip view.
    pub fn tooltip_view(&self) -> TooltipView {
        self.presenter.current()
    }

    /// Subscribe to tooltip view changes.
    pub fn tooltip_views(&self) -> watch::Receiver<TooltipView> {
        self.presenter.subscribe()
    }

    pub fn cache(&self) -> &Arc<TranslationCache> {
        &self.cache
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Stop the controller loop.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
