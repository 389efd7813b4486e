use readguard_capture::{
    setup_anti_screenshot, AttemptCallback, CaptureConfig, CaptureController, CapturePhase,
    InputEvent, InputGuard, KeyChord, ReadingSurface, SurfaceEvent, Verdict,
    DEFAULT_WARNING_TEXT,
};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

#[derive(Default)]
struct FakeSurface {
    blurred: AtomicBool,
    blur_calls: AtomicUsize,
}

impl FakeSurface {
    fn is_blurred(&self) -> bool {
        self.blurred.load(Ordering::SeqCst)
    }
}

impl ReadingSurface for FakeSurface {
    fn apply_blur(&self) {
        self.blurred.store(true, Ordering::SeqCst);
        self.blur_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn remove_blur(&self) {
        self.blurred.store(false, Ordering::SeqCst);
    }
}

const HIDDEN: SurfaceEvent = SurfaceEvent::VisibilityChanged { hidden: true };
const SHOWN: SurfaceEvent = SurfaceEvent::VisibilityChanged { hidden: false };
const BLUR: SurfaceEvent = SurfaceEvent::FocusChanged { focused: false };
const FOCUS: SurfaceEvent = SurfaceEvent::FocusChanged { focused: true };

fn controller() -> (Arc<FakeSurface>, CaptureController) {
    let surface = Arc::new(FakeSurface::default());
    let controller = CaptureController::new(surface.clone(), &CaptureConfig::default());
    (surface, controller)
}

// ── State machine ────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn hide_blurs_and_counts_once() {
    let (surface, controller) = controller();
    assert_eq!(controller.phase(), CapturePhase::Visible);

    controller.handle_event(HIDDEN);
    assert_eq!(controller.phase(), CapturePhase::Blurred);
    assert!(surface.is_blurred());
    assert_eq!(controller.attempts(), 1);

    // Already blurred: no double count.
    controller.handle_event(BLUR);
    controller.handle_event(HIDDEN);
    assert_eq!(controller.attempts(), 1);
    assert_eq!(surface.blur_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn reveal_waits_for_delay() {
    let (surface, controller) = controller();
    controller.handle_event(HIDDEN);
    controller.handle_event(SHOWN);

    assert_eq!(controller.phase(), CapturePhase::Blurred);
    sleep(Duration::from_millis(499)).await;
    assert_eq!(controller.phase(), CapturePhase::Blurred);
    assert!(surface.is_blurred());

    sleep(Duration::from_millis(2)).await;
    assert_eq!(controller.phase(), CapturePhase::Visible);
    assert!(!surface.is_blurred());
}

#[tokio::test(start_paused = true)]
async fn hide_during_delay_cancels_unblur() {
    let (surface, controller) = controller();
    controller.handle_event(HIDDEN);
    controller.handle_event(FOCUS);
    sleep(Duration::from_millis(300)).await;

    controller.handle_event(HIDDEN);
    sleep(Duration::from_secs(5)).await;
    assert_eq!(controller.phase(), CapturePhase::Blurred);
    assert!(surface.is_blurred());
    assert_eq!(controller.attempts(), 1);

    controller.handle_event(SHOWN);
    sleep(Duration::from_millis(501)).await;
    assert_eq!(controller.phase(), CapturePhase::Visible);
}

#[tokio::test(start_paused = true)]
async fn each_round_trip_counts() {
    let (_surface, controller) = controller();
    for _ in 0..3 {
        controller.handle_event(BLUR);
        controller.handle_event(FOCUS);
        sleep(Duration::from_millis(600)).await;
    }
    assert_eq!(controller.attempts(), 3);

    controller.reset_attempts();
    assert_eq!(controller.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn configurable_delay() {
    let surface = Arc::new(FakeSurface::default());
    let config = CaptureConfig {
        unblur_delay_ms: 50,
        ..Default::default()
    };
    let controller = CaptureController::new(surface.clone(), &config);
    controller.handle_event(HIDDEN);
    controller.handle_event(SHOWN);
    sleep(Duration::from_millis(51)).await;
    assert!(!surface.is_blurred());
}

// ── Event pump ───────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn setup_pumps_events_and_reports_attempts() {
    let surface = Arc::new(FakeSurface::default());
    let seen = Arc::new(AtomicU32::new(0));
    let seen_cb = seen.clone();
    let callback: AttemptCallback = Arc::new(move |total| seen_cb.store(total, Ordering::SeqCst));

    let (tx, rx) = mpsc::channel(8);
    let handle = setup_anti_screenshot(surface.clone(), rx, Some(callback));

    tx.send(HIDDEN).await.unwrap();
    sleep(Duration::from_millis(1)).await;
    assert_eq!(handle.phase(), CapturePhase::Blurred);
    assert_eq!(seen.load(Ordering::SeqCst), 1);

    tx.send(SHOWN).await.unwrap();
    sleep(Duration::from_millis(600)).await;
    assert_eq!(handle.phase(), CapturePhase::Visible);
    assert_eq!(handle.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn cleanup_unblurs_and_stops_listening() {
    let surface = Arc::new(FakeSurface::default());
    let (tx, rx) = mpsc::channel(8);
    let handle = setup_anti_screenshot(surface.clone(), rx, None);
    let controller = handle.controller().clone();

    tx.send(HIDDEN).await.unwrap();
    sleep(Duration::from_millis(1)).await;
    assert!(surface.is_blurred());

    handle.cleanup();
    assert!(!surface.is_blurred());
    assert_eq!(controller.phase(), CapturePhase::Visible);

    // The pump is gone; further events are never delivered.
    let _ = tx.send(HIDDEN).await;
    sleep(Duration::from_millis(10)).await;
    assert!(!surface.is_blurred());
}

#[tokio::test(start_paused = true)]
async fn drop_cancels_pending_unblur() {
    let surface = Arc::new(FakeSurface::default());
    let (tx, rx) = mpsc::channel(8);
    let handle = setup_anti_screenshot(surface.clone(), rx, None);
    let controller = handle.controller().clone();

    tx.send(HIDDEN).await.unwrap();
    tx.send(SHOWN).await.unwrap();
    sleep(Duration::from_millis(100)).await;
    drop(handle);

    assert_eq!(controller.phase(), CapturePhase::Visible);
    sleep(Duration::from_secs(1)).await;
    assert_eq!(controller.phase(), CapturePhase::Visible);
}

// ── Input guard ──────────────────────────────────────────────────

#[test]
fn copy_replaces_clipboard_and_counts() {
    let guard = InputGuard::new(&CaptureConfig::default()).unwrap();
    assert_eq!(
        guard.handle(&InputEvent::Copy),
        Verdict::ReplaceClipboard(DEFAULT_WARNING_TEXT.to_string())
    );
    assert_eq!(
        guard.handle(&InputEvent::Cut),
        Verdict::ReplaceClipboard(DEFAULT_WARNING_TEXT.to_string())
    );
    assert_eq!(guard.attempts().get(), 2);
}

#[test]
fn menus_drag_and_print_are_suppressed() {
    let guard = InputGuard::new(&CaptureConfig::default()).unwrap();
    assert_eq!(guard.handle(&InputEvent::ContextMenu), Verdict::Suppress);
    assert_eq!(guard.handle(&InputEvent::DragStart), Verdict::Suppress);
    assert_eq!(guard.handle(&InputEvent::BeforePrint), Verdict::Suppress);
    assert_eq!(guard.attempts().get(), 1);
}

#[test]
fn default_shortcut_blocklist() {
    let guard = InputGuard::new(&CaptureConfig::default()).unwrap();
    for blocked in [
        "Ctrl+C",
        "Cmd+A",
        "Ctrl+S",
        "Meta+P",
        "Ctrl+U",
        "Ctrl+X",
        "F12",
        "Ctrl+Shift+I",
        "Ctrl+Shift+J",
        "Cmd+Shift+C",
        "PrintScreen",
    ] {
        let chord: KeyChord = blocked.parse().unwrap();
        assert_eq!(
            guard.handle(&InputEvent::KeyDown(chord)),
            Verdict::Suppress,
            "{blocked} should be suppressed"
        );
    }
    for allowed in ["Ctrl+F", "Shift+C", "ArrowDown", "Ctrl+Shift+K", "F5"] {
        let chord: KeyChord = allowed.parse().unwrap();
        assert_eq!(guard.handle(&InputEvent::KeyDown(chord)), Verdict::Allow);
    }
}

#[test]
fn custom_blocklist_and_warning() {
    let config = CaptureConfig {
        warning_text: "nope".into(),
        blocked_shortcuts: vec!["Alt+F4".into()],
        ..Default::default()
    };
    let guard = InputGuard::new(&config).unwrap();
    assert_eq!(
        guard.handle(&InputEvent::KeyDown(KeyChord::new("F4").with_alt())),
        Verdict::Suppress
    );
    assert_eq!(
        guard.handle(&InputEvent::KeyDown(KeyChord::new("C").with_primary())),
        Verdict::Allow
    );
    assert_eq!(
        guard.handle(&InputEvent::Copy),
        Verdict::ReplaceClipboard("nope".into())
    );
}

#[test]
fn devtools_chords_are_blocked_but_not_counted() {
    let guard = InputGuard::new(&CaptureConfig::default()).unwrap();
    for chord in ["Ctrl+Shift+C", "Cmd+Shift+C", "Ctrl+Shift+I"] {
        let chord: KeyChord = chord.parse().unwrap();
        assert_eq!(guard.handle(&InputEvent::KeyDown(chord)), Verdict::Suppress);
    }
    assert_eq!(guard.attempts().get(), 0);

    guard.handle(&InputEvent::KeyDown("Ctrl+C".parse().unwrap()));
    guard.handle(&InputEvent::KeyDown("Cmd+P".parse().unwrap()));
    assert_eq!(guard.attempts().get(), 2);
}

#[tokio::test(start_paused = true)]
async fn guard_and_controller_share_counter() {
    let (_surface, controller) = controller();
    let guard = InputGuard::new(&CaptureConfig::default())
        .unwrap()
        .with_counter(controller.counter());

    controller.handle_event(HIDDEN);
    guard.handle(&InputEvent::KeyDown(KeyChord::new("PrintScreen")));
    guard.handle(&InputEvent::BeforePrint);
    assert_eq!(controller.attempts(), 3);
}

// Property-based tests
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn chord_display_parses_back(
            primary in any::<bool>(),
            shift in any::<bool>(),
            alt in any::<bool>(),
            key in "[A-Z0-9]|F[1-9]|F1[0-2]|PrintScreen|ArrowUp",
        ) {
            let chord = KeyChord { primary, shift, alt, key };
            let reparsed: KeyChord = chord.to_string().parse().unwrap();
            prop_assert_eq!(reparsed, chord);
        }
    }
}
