//! Browser boundary: binds a [`Session`] to an `<audio>`/`<video>` element,
//! drives it from `requestAnimationFrame`, forwards normalized gestures and
//! reports events back to page-supplied JS callbacks.
//!
//! One session is live at a time. Starting a new one tears the previous one
//! down, and teardown always cancels the outstanding animation frame.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::{Array, Function, Reflect};
use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlMediaElement, window};

use crate::calls::{CallCatalog, CallMode};
use crate::chart::Chart;
use crate::clock::ClockSource;
use crate::config::SessionConfig;
use crate::error::EngineError;
use crate::feedback::FeedbackKind;
use crate::gesture::Gesture;
use crate::instrument::Instrument;
use crate::session::{CallOutcome, GestureOutcome, Session, SessionEvent, TickOutcome};

// --- Clock -------------------------------------------------------------------

/// Playback position of a media element. Read-only: the engine never seeks.
struct MediaClock {
    media: HtmlMediaElement,
}

impl ClockSource for MediaClock {
    fn position_ms(&self) -> Option<f64> {
        // HAVE_NOTHING: no metadata yet, position is meaningless.
        if self.media.ready_state() == 0 {
            return None;
        }
        Some(self.media.current_time() * 1000.0)
    }

    fn has_ended(&self) -> bool {
        self.media.ended()
    }
}

// --- JS callbacks --------------------------------------------------------------

/// Optional callbacks read off the hooks object passed to `start_session`:
/// `onScore(total, combo)`, `onFeedback(kind)`, `onCall(id, text, icon, scoreLeft)`,
/// `onEnd(summaryJson)`, plus `vibrate: false` to disable haptics.
#[derive(Clone, Default)]
struct JsHooks {
    on_score: Option<Function>,
    on_feedback: Option<Function>,
    on_call: Option<Function>,
    on_end: Option<Function>,
    vibrate: bool,
}

impl JsHooks {
    fn from_js(hooks: &JsValue) -> Self {
        let func = |name: &str| -> Option<Function> {
            Reflect::get(hooks, &JsValue::from_str(name)).ok().and_then(|v| v.dyn_into::<Function>().ok())
        };
        let vibrate = Reflect::get(hooks, &JsValue::from_str("vibrate"))
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(true);
        Self {
            on_score: func("onScore"),
            on_feedback: func("onFeedback"),
            on_call: func("onCall"),
            on_end: func("onEnd"),
            vibrate,
        }
    }

    fn dispatch(&self, events: Vec<SessionEvent>) {
        for event in events {
            let result = match event {
                SessionEvent::ScoreChanged { total_score, combo } => self.on_score.as_ref().map(|f| {
                    f.call2(&JsValue::NULL, &JsValue::from_f64(total_score as f64), &JsValue::from(combo))
                }),
                SessionEvent::Feedback(kind) => {
                    if self.vibrate {
                        vibrate(kind);
                    }
                    self.on_feedback.as_ref().map(|f| f.call1(&JsValue::NULL, &JsValue::from_str(kind.as_str())))
                }
                SessionEvent::CallFired { call, remaining_score } => self.on_call.as_ref().map(|f| {
                    let args = Array::of4(
                        &JsValue::from_str(&call.id),
                        &JsValue::from_str(&call.text),
                        &JsValue::from_str(&call.icon),
                        &JsValue::from_f64(remaining_score as f64),
                    );
                    f.apply(&JsValue::NULL, &args)
                }),
                SessionEvent::Ended(summary) => self.on_end.as_ref().map(|f| {
                    let json = serde_json::to_string(&summary).unwrap_or_default();
                    f.call1(&JsValue::NULL, &JsValue::from_str(&json))
                }),
            };
            if let Some(Err(err)) = result {
                warn!("session callback threw: {err:?}");
            }
        }
    }
}

fn vibrate(kind: FeedbackKind) {
    let Some(nav) = window().map(|w| w.navigator()) else { return };
    match kind.vibration_pattern() {
        [single] => {
            nav.vibrate_with_duration(*single);
        }
        pattern => {
            let arr: Array = pattern.iter().map(|ms| JsValue::from(*ms)).collect();
            nav.vibrate_with_pattern(&arr);
        }
    }
}

// --- Frame loop ----------------------------------------------------------------

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Self-rescheduling `requestAnimationFrame` callback with an explicit cancel.
struct FrameLoop {
    callback: FrameCallback,
    handle: Rc<Cell<Option<i32>>>,
}

impl FrameLoop {
    fn start() -> Result<Self, JsValue> {
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let handle: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
        let f = callback.clone();
        let h = handle.clone();
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
            h.set(None);
            let Some(outcome) = run_frame() else { return };
            if outcome == TickOutcome::Ended || outcome == TickOutcome::Stopped {
                return;
            }
            // Cancelled from a callback during this frame: nothing left to schedule.
            if let Some(cb) = f.borrow().as_ref() {
                h.set(request_frame(cb).ok());
            }
        }) as Box<dyn FnMut(f64)>));
        let frame = Self { callback, handle };
        frame.resume()?;
        Ok(frame)
    }

    fn is_scheduled(&self) -> bool {
        self.handle.get().is_some()
    }

    fn resume(&self) -> Result<(), JsValue> {
        if self.is_scheduled() {
            return Ok(());
        }
        if let Some(cb) = self.callback.borrow().as_ref() {
            self.handle.set(Some(request_frame(cb)?));
        }
        Ok(())
    }

    fn cancel(&self) {
        if let (Some(id), Some(w)) = (self.handle.take(), window()) {
            let _ = w.cancel_animation_frame(id);
        }
        // Breaks the closure <-> Rc cycle so the callback is freed.
        self.callback.borrow_mut().take();
    }
}

fn request_frame(cb: &Closure<dyn FnMut(f64)>) -> Result<i32, JsValue> {
    let w = window().ok_or_else(|| JsValue::from_str("no window"))?;
    w.request_animation_frame(cb.as_ref().unchecked_ref())
}

// --- Active session --------------------------------------------------------------

struct ActiveSession {
    session: Session,
    clock: MediaClock,
    hooks: JsHooks,
    frame: FrameLoop,
}

thread_local! {
    static ACTIVE: RefCell<Option<ActiveSession>> = const { RefCell::new(None) };
}

/// Ticks the live session and dispatches what it produced. Callbacks run after
/// the session borrow is released so they may call back into this module.
fn run_frame() -> Option<TickOutcome> {
    let (outcome, events, hooks) = ACTIVE.with(|cell| {
        let mut slot = cell.borrow_mut();
        let active = slot.as_mut()?;
        let outcome = active.session.tick(&active.clock);
        Some((outcome, active.session.drain_events(), active.hooks.clone()))
    })?;
    hooks.dispatch(events);
    Some(outcome)
}

/// Runs `f` against the live session, then dispatches queued events.
fn with_session<R>(f: impl FnOnce(&mut Session) -> R) -> Option<R> {
    let (result, events, hooks) = ACTIVE.with(|cell| {
        let mut slot = cell.borrow_mut();
        let active = slot.as_mut()?;
        let result = f(&mut active.session);
        Some((result, active.session.drain_events(), active.hooks.clone()))
    })?;
    hooks.dispatch(events);
    Some(result)
}

fn read_session<R>(f: impl FnOnce(&Session) -> R) -> Option<R> {
    ACTIVE.with(|cell| cell.borrow().as_ref().map(|a| f(&a.session)))
}

fn js_err(err: EngineError) -> JsValue {
    warn!("session rejected: {err}");
    JsValue::from_str(&err.to_string())
}

// --- Exports ---------------------------------------------------------------------

/// Starts a session for the media element with id `media_id`.
///
/// `config_json` and `calls_json` may be omitted to use the defaults.
#[wasm_bindgen]
pub fn start_session(
    media_id: &str,
    chart_json: &str,
    instrument: &str,
    config_json: Option<String>,
    calls_json: Option<String>,
    hooks: JsValue,
) -> Result<(), JsValue> {
    let chart = Chart::from_json(chart_json).map_err(js_err)?;
    let instrument: Instrument = instrument.parse().map_err(js_err)?;
    let config = match config_json {
        Some(json) => SessionConfig::from_json(&json).map_err(js_err)?,
        None => SessionConfig::default(),
    };
    let catalog = match calls_json {
        Some(json) => CallCatalog::from_json(&json).map_err(js_err)?,
        None => CallCatalog::default(),
    };

    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win.document().ok_or_else(|| JsValue::from_str("no document"))?;
    let media: HtmlMediaElement = doc
        .get_element_by_id(media_id)
        .ok_or_else(|| JsValue::from_str("no media element"))?
        .dyn_into()?;

    stop_session();
    let session = Session::new(&chart, config, instrument, catalog);
    let frame = FrameLoop::start()?;
    ACTIVE.with(|cell| {
        cell.replace(Some(ActiveSession {
            session,
            clock: MediaClock { media },
            hooks: JsHooks::from_js(&hooks),
            frame,
        }))
    });
    Ok(())
}

/// Tears the live session down and cancels its frame callback. No-op when idle.
#[wasm_bindgen]
pub fn stop_session() {
    let previous = ACTIVE.with(|cell| cell.borrow_mut().take());
    if let Some(active) = previous {
        active.frame.cancel();
    }
}

/// Rewinds the session state (the page seeks its own media element) and
/// resumes sampling if the track had ended.
#[wasm_bindgen]
pub fn restart_session() -> Result<(), JsValue> {
    let Some((resumed, events, hooks)) = ACTIVE.with(|cell| {
        let mut slot = cell.borrow_mut();
        let active = slot.as_mut()?;
        active.session.restart();
        Some((active.frame.resume(), active.session.drain_events(), active.hooks.clone()))
    }) else {
        return Ok(());
    };
    hooks.dispatch(events);
    resumed
}

/// True while an animation frame is queued for the live session.
#[wasm_bindgen]
pub fn frame_scheduled() -> bool {
    ACTIVE.with(|cell| cell.borrow().as_ref().is_some_and(|a| a.frame.is_scheduled()))
}

/// Tap at canvas coordinates. Returns the judgment name, or nothing.
#[wasm_bindgen]
pub fn tap(x: f64, y: f64) -> Option<String> {
    gesture(Gesture::tap(x, y))
}

/// Drag from (x0, y0) to (x1, y1). Returns the judgment name, `"call"`, or nothing.
#[wasm_bindgen]
pub fn swipe(x0: f64, y0: f64, x1: f64, y1: f64) -> Option<String> {
    gesture(Gesture::swipe((x0, y0), (x1, y1)))
}

fn gesture(g: Gesture) -> Option<String> {
    match with_session(|s| s.handle_gesture(g))? {
        GestureOutcome::Hit(hit) => Some(hit.judgment.as_str().to_owned()),
        GestureOutcome::Call(_) => Some("call".to_owned()),
        GestureOutcome::Ignored => None,
    }
}

/// Fires a named call (single-button instruments). False when rejected.
#[wasm_bindgen]
pub fn activate_call(id: &str) -> bool {
    matches!(with_session(|s| s.activate_call(id)), Some(CallOutcome::Fired(_)))
}

/// Notes to draw this frame as a JSON array of
/// `{id, lane, kind, timeUntilHit, progress}`.
#[wasm_bindgen]
pub fn visible_notes_json() -> String {
    read_session(|s| {
        let notes: Vec<_> = s.visible_notes().collect();
        serde_json::to_string(&notes).ok()
    })
    .flatten()
    .unwrap_or_else(|| "[]".to_owned())
}

/// Lane columns to draw (0 when idle).
#[wasm_bindgen]
pub fn lane_count() -> u8 {
    read_session(Session::lane_count).unwrap_or(0)
}

/// How far ahead of the hit line notes appear, in ms (0 when idle).
#[wasm_bindgen]
pub fn approach_time_ms() -> f64 {
    read_session(|s| s.config().approach_time_ms).unwrap_or(0.0)
}

/// True when the page should show call buttons wired to [`activate_call`]
/// instead of relying on swipe-up.
#[wasm_bindgen]
pub fn explicit_calls() -> bool {
    read_session(|s| s.instrument().call_mode() == CallMode::Explicit).unwrap_or(false)
}

/// The session's call catalog as `[{id, text, icon, cost}]`.
#[wasm_bindgen]
pub fn calls_json() -> String {
    read_session(|s| serde_json::to_string(s.catalog().calls()).ok())
        .flatten()
        .unwrap_or_else(|| "[]".to_owned())
}

/// Current tally as JSON, `null` when no session is live.
#[wasm_bindgen]
pub fn summary_json() -> String {
    read_session(|s| serde_json::to_string(&s.summary()).ok())
        .flatten()
        .unwrap_or_else(|| "null".to_owned())
}

/// Spendable score of the live session (0 when idle).
#[wasm_bindgen]
pub fn current_score() -> f64 {
    read_session(|s| s.score() as f64).unwrap_or(0.0)
}

#[wasm_bindgen]
pub fn session_active() -> bool {
    read_session(|_| ()).is_some()
}
