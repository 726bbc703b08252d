//! End-to-end pipeline tests: pointer events through debounce, locate,
//! lookup and tooltip presentation, with scripted collaborators and a
//! paused clock for deterministic timing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use hoverglot::translate::{LookupError, LookupRequest};
use hoverglot::{
    HoverConfig, HoverEngine, HoverHandle, LookupBackend, Point, SettingsStore, TextHit,
    TextProbe, TooltipSurface, TooltipView,
};

/// Probe scripted with words at fixed coordinates; records every call.
#[derive(Default)]
struct ScriptedProbe {
    hits: Mutex<HashMap<(i64, i64), TextHit>>,
    calls: Mutex<Vec<(f64, f64)>>,
}

impl ScriptedProbe {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn place_text(&self, x: f64, y: f64, content: &str, offset: usize) {
        self.hits.lock().insert(
            (x as i64, y as i64),
            TextHit {
                content: content.to_string(),
                offset,
            },
        );
    }

    fn calls(&self) -> Vec<(f64, f64)> {
        self.calls.lock().clone()
    }
}

impl TextProbe for ScriptedProbe {
    fn text_at(&self, x: f64, y: f64) -> Option<TextHit> {
        self.calls.lock().push((x, y));
        self.hits.lock().get(&(x as i64, y as i64)).cloned()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SurfaceCall {
    Loading(String),
    Result(String, String),
    FadeOut,
}

struct RecordingSurface {
    calls: Mutex<Vec<SurfaceCall>>,
}

impl RecordingSurface {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().clone()
    }
}

impl TooltipSurface for RecordingSurface {
    fn viewport(&self) -> (f64, f64) {
        (1280.0, 720.0)
    }

    fn paint_loading(&self, word: &str, _at: Point) {
        self.calls.lock().push(SurfaceCall::Loading(word.to_string()));
    }

    fn paint_result(&self, word: &str, translation: &str, _at: Point) {
        self.calls
            .lock()
            .push(SurfaceCall::Result(word.to_string(), translation.to_string()));
    }

    fn fade_out(&self) {
        self.calls.lock().push(SurfaceCall::FadeOut);
    }
}

/// Backend scripted per word; unknown words fail like the network would.
#[derive(Default)]
struct ScriptedBackend {
    translations: Mutex<HashMap<String, String>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn translates(self: &Arc<Self>, word: &str, translation: &str) -> Arc<Self> {
        self.translations
            .lock()
            .insert(word.to_string(), translation.to_string());
        Arc::clone(self)
    }

    fn delayed(self: &Arc<Self>, word: &str, delay: Duration) -> Arc<Self> {
        self.delays.lock().insert(word.to_string(), delay);
        Arc::clone(self)
    }

    fn calls_for(&self, word: &str) -> usize {
        self.calls.lock().iter().filter(|w| *w == word).count()
    }
}

#[async_trait]
impl LookupBackend for ScriptedBackend {
    async fn lookup(&self, request: &LookupRequest) -> Result<String, LookupError> {
        self.calls.lock().push(request.word.clone());
        let delay = self.delays.lock().get(&request.word).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.translations
            .lock()
            .get(&request.word)
            .cloned()
            .ok_or_else(|| LookupError::Network("connection reset".to_string()))
    }
}

fn engine(
    probe: &Arc<ScriptedProbe>,
    surface: &Arc<RecordingSurface>,
    backend: &Arc<ScriptedBackend>,
) -> HoverHandle {
    HoverEngine::spawn(
        HoverConfig::default(),
        Arc::clone(probe) as Arc<dyn TextProbe>,
        Arc::clone(surface) as Arc<dyn TooltipSurface>,
        Arc::clone(backend) as Arc<dyn LookupBackend>,
        "es",
    )
}

async fn settle() {
    // One debounce window plus slack; the paused clock advances instantly.
    tokio::time::sleep(Duration::from_millis(300)).await;
}

#[tokio::test(start_paused = true)]
async fn hover_pause_shows_translation() {
    let probe = ScriptedProbe::new();
    let surface = RecordingSurface::new();
    let backend = ScriptedBackend::new().translates("hello", "hola");
    probe.place_text(50.0, 50.0, "hello world", 2);

    let handle = engine(&probe, &surface, &backend);
    handle.pointer_moved(50.0, 50.0);
    settle().await;

    assert_eq!(
        handle.tooltip_view(),
        TooltipView::Shown {
            word: "hello".to_string(),
            translation: "hola".to_string(),
        }
    );
    assert_eq!(
        surface.calls(),
        vec![
            SurfaceCall::Loading("hello".to_string()),
            SurfaceCall::Result("hello".to_string(), "hola".to_string()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn debounce_coalesces_a_burst_to_the_last_sample() {
    let probe = ScriptedProbe::new();
    let surface = RecordingSurface::new();
    let backend = ScriptedBackend::new().translates("world", "mundo");
    probe.place_text(30.0, 10.0, "hello world", 8);

    let handle = engine(&probe, &surface, &backend);
    for (x, y) in [(10.0, 10.0), (20.0, 10.0), (30.0, 10.0)] {
        handle.pointer_moved(x, y);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    settle().await;

    // The locator ran exactly once, at the burst's final coordinates.
    assert_eq!(probe.calls(), vec![(30.0, 10.0)]);
    assert_eq!(
        handle.tooltip_view(),
        TooltipView::Shown {
            word: "world".to_string(),
            translation: "mundo".to_string(),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn hovering_the_same_word_again_is_a_noop() {
    let probe = ScriptedProbe::new();
    let surface = RecordingSurface::new();
    let backend = ScriptedBackend::new().translates("hello", "hola");
    probe.place_text(50.0, 50.0, "hello", 1);
    probe.place_text(54.0, 50.0, "hello", 3);

    let handle = engine(&probe, &surface, &backend);
    handle.pointer_moved(50.0, 50.0);
    settle().await;
    handle.pointer_moved(54.0, 50.0);
    settle().await;

    assert_eq!(backend.calls_for("hello"), 1);
    // No second loading frame, no flicker.
    assert_eq!(
        surface.calls(),
        vec![
            SurfaceCall::Loading("hello".to_string()),
            SurfaceCall::Result("hello".to_string(), "hola".to_string()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn leaving_words_hides_the_tooltip() {
    let probe = ScriptedProbe::new();
    let surface = RecordingSurface::new();
    let backend = ScriptedBackend::new().translates("hello", "hola");
    probe.place_text(50.0, 50.0, "hello", 1);
    // (200, 200) has no scripted hit: not over text.

    let handle = engine(&probe, &surface, &backend);
    handle.pointer_moved(50.0, 50.0);
    settle().await;
    handle.pointer_moved(200.0, 200.0);
    settle().await;

    assert_eq!(handle.tooltip_view(), TooltipView::Hidden);
    assert_eq!(surface.calls().last(), Some(&SurfaceCall::FadeOut));
}

#[tokio::test(start_paused = true)]
async fn failed_lookup_fades_from_loading_to_hidden() {
    let probe = ScriptedProbe::new();
    let surface = RecordingSurface::new();
    // Backend has no entry for "hello": lookup fails like a dead network.
    let backend = ScriptedBackend::new();
    probe.place_text(50.0, 50.0, "hello", 1);

    let handle = engine(&probe, &surface, &backend);
    handle.pointer_moved(50.0, 50.0);
    settle().await;

    assert_eq!(handle.tooltip_view(), TooltipView::Hidden);
    assert_eq!(
        surface.calls(),
        vec![
            SurfaceCall::Loading("hello".to_string()),
            SurfaceCall::FadeOut,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn echoed_translation_shows_nothing() {
    let probe = ScriptedProbe::new();
    let surface = RecordingSurface::new();
    let backend = ScriptedBackend::new().translates("hello", "Hello");
    probe.place_text(50.0, 50.0, "hello", 1);

    let handle = engine(&probe, &surface, &backend);
    handle.pointer_moved(50.0, 50.0);
    settle().await;

    assert_eq!(handle.tooltip_view(), TooltipView::Hidden);
    assert!(handle.cache().is_empty());
}

#[tokio::test(start_paused = true)]
async fn stale_lookup_is_discarded() {
    let probe = ScriptedProbe::new();
    let surface = RecordingSurface::new();
    let backend = ScriptedBackend::new()
        .translates("slow", "lento")
        .delayed("slow", Duration::from_millis(500))
        .translates("fast", "rapido");
    probe.place_text(10.0, 10.0, "slow", 1);
    probe.place_text(400.0, 10.0, "fast", 1);

    let handle = engine(&probe, &surface, &backend);
    handle.pointer_moved(10.0, 10.0);
    tokio::time::sleep(Duration::from_millis(300)).await;
    // The "slow" lookup is in flight; move on to "fast".
    handle.pointer_moved(400.0, 10.0);
    tokio::time::sleep(Duration::from_millis(600)).await;

    // The late "slow" result arrived after "fast" and must not win.
    assert_eq!(
        handle.tooltip_view(),
        TooltipView::Shown {
            word: "fast".to_string(),
            translation: "rapido".to_string(),
        }
    );
    assert!(!surface
        .calls()
        .contains(&SurfaceCall::Result("slow".to_string(), "lento".to_string())));
}

#[tokio::test(start_paused = true)]
async fn language_change_clears_the_cache_and_retranslates() {
    let probe = ScriptedProbe::new();
    let surface = RecordingSurface::new();
    let backend = ScriptedBackend::new().translates("hello", "hola");
    probe.place_text(50.0, 50.0, "hello", 1);

    let handle = engine(&probe, &surface, &backend);
    handle.pointer_moved(50.0, 50.0);
    settle().await;
    assert_eq!(handle.cache().get("hello", "es").as_deref(), Some("hola"));

    handle.set_target_lang("fr");
    assert_eq!(handle.cache().get("hello", "es"), None);
    assert!(handle.cache().is_empty());
    assert_eq!(handle.target_lang(), "fr");

    // The same word re-translates under the new language.
    backend.translates("hello", "bonjour");
    settle().await;
    handle.pointer_moved(50.0, 50.0);
    settle().await;
    assert_eq!(backend.calls_for("hello"), 2);
    assert_eq!(
        handle.cache().get("hello", "fr").as_deref(),
        Some("bonjour")
    );
}

#[tokio::test(start_paused = true)]
async fn pointer_leave_hides_unconditionally() {
    let probe = ScriptedProbe::new();
    let surface = RecordingSurface::new();
    let backend = ScriptedBackend::new().translates("hello", "hola");
    probe.place_text(50.0, 50.0, "hello", 1);

    let handle = engine(&probe, &surface, &backend);
    handle.pointer_moved(50.0, 50.0);
    settle().await;
    handle.pointer_left();
    settle().await;
    assert_eq!(handle.tooltip_view(), TooltipView::Hidden);

    // Re-entering the same word shows it again, served from cache.
    handle.pointer_moved(50.0, 50.0);
    settle().await;
    assert_eq!(backend.calls_for("hello"), 1);
    assert!(matches!(handle.tooltip_view(), TooltipView::Shown { .. }));
}

#[tokio::test(start_paused = true)]
async fn startup_language_defaults_when_store_is_empty() {
    struct EmptyStore;

    #[async_trait]
    impl SettingsStore for EmptyStore {
        async fn read_target_lang(
            &self,
        ) -> Result<Option<String>, hoverglot::settings::SettingsError> {
            Ok(None)
        }
    }

    let probe = ScriptedProbe::new();
    let surface = RecordingSurface::new();
    let backend = ScriptedBackend::new();
    let handle = HoverEngine::spawn_with_settings(
        HoverConfig::default(),
        probe as Arc<dyn TextProbe>,
        surface as Arc<dyn TooltipSurface>,
        backend as Arc<dyn LookupBackend>,
        &EmptyStore,
    )
    .await;

    assert_eq!(handle.target_lang(), "es");
}

#[tokio::test(start_paused = true)]
async fn pipeline_timings_are_recorded() {
    let probe = ScriptedProbe::new();
    let surface = RecordingSurface::new();
    let backend = ScriptedBackend::new().translates("hello", "hola");
    probe.place_text(50.0, 50.0, "hello", 1);

    let handle = engine(&probe, &surface, &backend);
    handle.pointer_moved(50.0, 50.0);
    settle().await;

    let summary = handle.metrics().summary();
    for name in ["debounce_wait", "t_locate_done", "t_lookup_done", "t_render_done"] {
        assert!(
            summary.get(name).map(|m| m.count >= 1).unwrap_or(false),
            "missing metric {name}"
        );
    }
}
