// Browser-side checks for the wasm boundary. Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use fansa_band::web;
use js_sys::{Object, Promise, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn mount_audio(id: &str) {
    let doc = web_sys::window().unwrap().document().unwrap();
    if doc.get_element_by_id(id).is_none() {
        let el = doc.create_element("audio").unwrap();
        el.set_id(id);
        doc.body().unwrap().append_child(&el).unwrap();
    }
    let _: web_sys::HtmlMediaElement = doc.get_element_by_id(id).unwrap().dyn_into().unwrap();
}

#[wasm_bindgen_test]
fn start_and_stop_session() {
    mount_audio("fb-audio");
    web::start_session("fb-audio", r#"[{"time": 1000, "type": "normal"}]"#, "guitar", None, None, wasm_bindgen::JsValue::NULL)
        .unwrap();
    assert!(web::session_active());
    assert!(web::frame_scheduled());
    assert_eq!(web::lane_count(), 4);
    assert!(!web::explicit_calls());
    // Nothing has been sampled yet, so no note is in reach.
    assert_eq!(web::tap(10.0, 10.0), None);
    assert_eq!(web::current_score(), 0.0);
    assert!(web::summary_json().contains("\"pending\":1"));
    web::stop_session();
    assert!(!web::session_active());
    assert_eq!(web::visible_notes_json(), "[]");
}

#[wasm_bindgen_test]
fn rejects_bad_input() {
    mount_audio("fb-audio-2");
    assert!(web::start_session("fb-audio-2", "not json", "guitar", None, None, wasm_bindgen::JsValue::NULL).is_err());
    assert!(web::start_session("fb-audio-2", "[]", "kazoo", None, None, wasm_bindgen::JsValue::NULL).is_err());
    assert!(web::start_session("missing", "[]", "guitar", None, None, wasm_bindgen::JsValue::NULL).is_err());
    assert!(
        web::start_session(
            "fb-audio-2",
            "[]",
            "vocal",
            Some(r#"{"windows": {"perfect": 200}}"#.to_owned()),
            None,
            wasm_bindgen::JsValue::NULL
        )
        .is_err()
    );
}

#[wasm_bindgen_test]
fn explicit_call_needs_score() {
    mount_audio("fb-audio-3");
    web::start_session(
        "fb-audio-3",
        "[]",
        "tambourine",
        None,
        Some(r#"[{"id": "oi", "text": "Oi!", "icon": "📣", "cost": 300}]"#.to_owned()),
        wasm_bindgen::JsValue::NULL,
    )
    .unwrap();
    assert!(web::explicit_calls());
    assert!(web::calls_json().contains("\"id\":\"oi\""));
    assert!(!web::activate_call("oi"));
    web::stop_session();
}

async fn next_frames(n: u32) {
    for _ in 0..n {
        let promise = Promise::new(&mut |resolve, _| {
            web_sys::window().unwrap().request_animation_frame(&resolve).unwrap();
        });
        JsFuture::from(promise).await.unwrap();
    }
}

/// Hooks object whose callbacks bump counters. `onScore` optionally tears the
/// session down from inside the callback.
fn counting_hooks(scores: Rc<Cell<u32>>, ends: Rc<Cell<u32>>, stop_on_score: bool) -> JsValue {
    let hooks = Object::new();
    let on_score = Closure::<dyn FnMut()>::new(move || {
        scores.set(scores.get() + 1);
        if stop_on_score {
            web::stop_session();
        }
    });
    let on_end = Closure::<dyn FnMut()>::new(move || ends.set(ends.get() + 1));
    Reflect::set(&hooks, &"onScore".into(), &on_score.into_js_value()).unwrap();
    Reflect::set(&hooks, &"onEnd".into(), &on_end.into_js_value()).unwrap();
    Reflect::set(&hooks, &"vibrate".into(), &JsValue::FALSE).unwrap();
    hooks.into()
}

/// 8 kHz 8-bit mono silence as a data URL.
fn silent_wav(samples: u32) -> String {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + samples).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&8000u32.to_le_bytes());
    bytes.extend_from_slice(&8000u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&8u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&samples.to_le_bytes());
    bytes.extend(std::iter::repeat_n(128u8, samples as usize));
    let binary: String = bytes.iter().map(|&b| b as char).collect();
    let encoded = web_sys::window().unwrap().btoa(&binary).unwrap();
    format!("data:audio/wav;base64,{encoded}")
}

#[wasm_bindgen_test]
async fn stop_from_callback_leaves_nothing_scheduled() {
    mount_audio("fb-audio-4");
    let scores = Rc::new(Cell::new(0));
    let ends = Rc::new(Cell::new(0));
    web::start_session(
        "fb-audio-4",
        r#"[{"time": 1000}]"#,
        "drums",
        None,
        None,
        counting_hooks(scores.clone(), ends.clone(), true),
    )
    .unwrap();
    next_frames(2).await;
    assert!(web::frame_scheduled());

    // Restart reports the cleared score; the hook stops the session from inside it.
    web::restart_session().unwrap();
    assert_eq!(scores.get(), 1);
    assert!(!web::session_active());
    assert!(!web::frame_scheduled());

    next_frames(5).await;
    assert_eq!(scores.get(), 1);
    assert_eq!(ends.get(), 0);
    assert!(!web::session_active());
}

#[wasm_bindgen_test]
async fn loop_stops_at_end_and_restart_resumes_it() {
    mount_audio("fb-audio-5");
    let doc = web_sys::window().unwrap().document().unwrap();
    let media: web_sys::HtmlMediaElement = doc.get_element_by_id("fb-audio-5").unwrap().dyn_into().unwrap();
    media.set_muted(true);
    media.set_src(&silent_wav(800));

    let scores = Rc::new(Cell::new(0));
    let ends = Rc::new(Cell::new(0));
    web::start_session(
        "fb-audio-5",
        r#"[{"time": 5000}]"#,
        "guitar",
        None,
        None,
        counting_hooks(scores.clone(), ends.clone(), false),
    )
    .unwrap();
    JsFuture::from(media.play().unwrap()).await.unwrap();

    for _ in 0..600 {
        if ends.get() > 0 {
            break;
        }
        next_frames(1).await;
    }
    assert_eq!(ends.get(), 1);
    assert!(web::session_active());
    assert!(!web::frame_scheduled());

    next_frames(3).await;
    assert_eq!(ends.get(), 1);
    assert!(web::summary_json().contains("\"pending\":1"));

    web::restart_session().unwrap();
    assert!(web::frame_scheduled());
    assert_eq!(scores.get(), 1);
    web::stop_session();
    assert!(!web::frame_scheduled());
}
