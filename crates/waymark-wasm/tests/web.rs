//! WASM integration tests for waymark-wasm
//!
//! These tests run in a headless browser environment using wasm-pack test.
//! Run with: wasm-pack test --headless --chrome

#![cfg(target_arch = "wasm32")]

use js_sys::{Array, Function, Reflect, RegExp};
use serde_json::json;
use wasm_bindgen::prelude::*;
use wasm_bindgen_test::*;
use waymark_core::{History, PathMatcher, RouteState};
use waymark_wasm::convert::{js_to_json, routes_from_js, to_js};
use waymark_wasm::regexp::JsRegExp;
use waymark_wasm::{BrowserHistory, WaymarkRouter};
use web_sys::HtmlAnchorElement;

wasm_bindgen_test_configure!(run_in_browser);

// =============================================================================
// Utilities
// =============================================================================

fn entry(pattern: JsValue, handler: JsValue) -> JsValue {
    let pair = Array::new();
    pair.push(&pattern);
    if !handler.is_undefined() {
        pair.push(&handler);
    }
    pair.into()
}

fn blog_table() -> Array {
    let table = Array::new();
    table.push(&entry(
        JsValue::from_str("/"),
        Function::new_no_args("return { page: 'home' }").into(),
    ));
    table.push(&entry(JsValue::from_str("/blog"), JsValue::from_str("blog")));
    table.push(&entry(
        JsValue::from_str("/blog/post/*"),
        Function::new_with_args("id", "return { page: 'post', id }").into(),
    ));
    table.push(&entry(
        RegExp::new(r"^blog\/post\/(\d+)\/(\d+)$", "").into(),
        Function::new_with_args("year, month", "return { year, month }").into(),
    ));
    table
}

fn get(value: &JsValue, key: &str) -> JsValue {
    Reflect::get(value, &JsValue::from_str(key)).unwrap()
}

/// Cancel link navigation after the router's listener had its turn
fn with_navigation_blocked(f: impl FnOnce()) {
    let window = web_sys::window().unwrap();
    let stop = Function::new_with_args("e", "e.preventDefault()");
    window
        .add_event_listener_with_callback("click", &stop)
        .unwrap();
    f();
    window
        .remove_event_listener_with_callback("click", &stop)
        .unwrap();
}

fn route_of(router: &WaymarkRouter) -> RouteState {
    serde_wasm_bindgen::from_value(router.route().unwrap()).unwrap()
}

fn single(pattern: JsValue, handler: JsValue) -> Array {
    let table = Array::new();
    table.push(&entry(pattern, handler));
    table
}

/// Blog table plus `/broken/*`, whose handler throws
fn table_with_throwing_handler() -> Array {
    let table = blog_table();
    table.push(&entry(
        JsValue::from_str("/broken/*"),
        Function::new_with_args("id", "throw new Error('cannot load ' + id)").into(),
    ));
    table
}

fn error_message(error: &JsValue) -> String {
    error
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .unwrap_or_default()
}

// =============================================================================
// Route table conversion
// =============================================================================

#[wasm_bindgen_test]
fn test_routes_from_js() {
    let routes = routes_from_js(&blog_table()).unwrap();
    assert_eq!(routes.len(), 4);

    let post = waymark_core::resolve("/blog/post/hello", &routes).unwrap();
    assert_eq!(post.matched, json!({"page": "post", "id": "hello"}));

    let dated = waymark_core::resolve("/blog/post/2019/05", &routes).unwrap();
    assert_eq!(dated.params, vec!["2019", "05"]);
    assert_eq!(dated.matched, json!({"year": "2019", "month": "05"}));

    assert_eq!(waymark_core::resolve("/blog", &routes).unwrap().matched, json!("blog"));
}

#[wasm_bindgen_test]
fn test_route_without_handler() {
    let table = Array::new();
    table.push(&entry(JsValue::from_str("/plain"), JsValue::UNDEFINED));

    let routes = routes_from_js(&table).unwrap();
    assert_eq!(waymark_core::resolve("/plain", &routes).unwrap().matched, json!(true));
}

#[wasm_bindgen_test]
fn test_case_insensitive_regexp_flag() {
    let table = Array::new();
    table.push(&entry(RegExp::new("^about$", "i").into(), JsValue::UNDEFINED));

    let routes = routes_from_js(&table).unwrap();
    assert!(waymark_core::resolve("/ABOUT", &routes).unwrap().is_match());
}

#[wasm_bindgen_test]
fn test_regexp_keys_keep_js_syntax() {
    let table = Array::new();
    table.push(&entry(
        RegExp::new(r"^(?=blog)blog\/(\w+)$", "").into(),
        JsValue::UNDEFINED,
    ));
    table.push(&entry(RegExp::new(r"^(\w+)\/\1$", "").into(), JsValue::UNDEFINED));
    table.push(&entry(
        RegExp::new(r"^archive\/(?<year>\d{4})$", "").into(),
        JsValue::UNDEFINED,
    ));

    let routes = routes_from_js(&table).unwrap();

    let lookahead = waymark_core::resolve("/blog/x", &routes).unwrap();
    assert_eq!(lookahead.params, vec!["x"]);

    let repeated = waymark_core::resolve("/echo/echo", &routes).unwrap();
    assert_eq!(repeated.params, vec!["echo"]);
    assert!(!waymark_core::resolve("/echo/other", &routes).unwrap().is_match());

    let named = waymark_core::resolve("/archive/2019", &routes).unwrap();
    assert_eq!(named.params, vec!["2019"]);
}

#[wasm_bindgen_test]
fn test_regexp_flags_are_honoured() {
    // Sticky keys anchor at the start of the path
    let sticky = JsRegExp::new(&RegExp::new("blog", "y"));
    assert!(sticky.captures("blog/x").is_some());
    assert!(sticky.captures("x/blog").is_none());

    // Global keys match every path, whatever the previous match left behind
    let global = JsRegExp::new(&RegExp::new(r"(\d+)", "g"));
    assert_eq!(global.captures("a/12"), Some(vec!["12".to_string()]));
    assert_eq!(global.captures("7"), Some(vec!["7".to_string()]));

    let dot_all = JsRegExp::new(&RegExp::new("^a.b$", "s"));
    assert!(dot_all.captures("a\nb").is_some());

    let multiline = JsRegExp::new(&RegExp::new("^b$", "m"));
    assert!(multiline.captures("a\nb").is_some());
}

#[wasm_bindgen_test]
fn test_regexp_capture_count() {
    let re = JsRegExp::new(&RegExp::new(r"^(a)(?:b)(c)?$", ""));
    assert_eq!(re.capture_count(), 2);
    assert_eq!(re.captures("ab"), Some(vec!["a".to_string(), String::new()]));
    assert_eq!(re.as_str(), r"^(a)(?:b)(c)?$");
}

#[wasm_bindgen_test]
fn test_values_without_json_form_are_rejected() {
    assert!(js_to_json(&js_sys::Date::new_0().into()).is_err());
    assert!(js_to_json(&Function::new_no_args("").into()).is_err());
    assert_eq!(js_to_json(&JsValue::UNDEFINED).unwrap(), json!(null));
    assert_eq!(
        js_to_json(&js_sys::JSON::parse(r#"{"a": [1, "b"]}"#).unwrap()).unwrap(),
        json!({"a": [1, "b"]})
    );

    // A static payload is checked when the table is built
    let table = single(JsValue::from_str("/when"), js_sys::Date::new_0().into());
    assert!(routes_from_js(&table).is_err());
}

#[wasm_bindgen_test]
fn test_invalid_table_entries() {
    let table = Array::new();
    table.push(&JsValue::from_str("/not-a-pair"));
    assert!(routes_from_js(&table).is_err());

    let table = Array::new();
    table.push(&entry(JsValue::from_f64(1.0), JsValue::UNDEFINED));
    assert!(routes_from_js(&table).is_err());
}

#[wasm_bindgen_test]
fn test_to_js_produces_plain_objects() {
    let value = to_js(&json!({"path": "/a", "params": ["x"]})).unwrap();
    assert_eq!(get(&value, "path").as_string(), Some("/a".to_string()));
    assert!(Array::is_array(&get(&value, "params")));
}

// =============================================================================
// Browser history
// =============================================================================

#[wasm_bindgen_test]
fn test_browser_history_push() {
    let history = BrowserHistory::new().unwrap();
    assert!(!history.origin().is_empty());

    history.push("/waymark/pushed").unwrap();
    assert_eq!(history.pathname(), "/waymark/pushed");
}

// =============================================================================
// Router
// =============================================================================

#[wasm_bindgen_test]
fn test_router_navigate() {
    let router = WaymarkRouter::new(blog_table(), JsValue::UNDEFINED).unwrap();
    let history = BrowserHistory::new().unwrap();

    router.navigate("/blog/post/hello").unwrap();

    assert_eq!(history.pathname(), "/blog/post/hello");
    let route = route_of(&router);
    assert_eq!(route.params, vec!["hello"]);
    assert_eq!(route.matched, json!({"page": "post", "id": "hello"}));
}

#[wasm_bindgen_test]
fn test_throwing_handler_aborts_navigation() {
    let history = BrowserHistory::new().unwrap();
    history.push("/").unwrap();
    let router = WaymarkRouter::new(table_with_throwing_handler(), JsValue::UNDEFINED).unwrap();
    router.navigate("/blog").unwrap();

    let err = router.navigate("/broken/7").unwrap_err();

    assert!(error_message(&err).contains("cannot load 7"), "{:?}", err);
    assert_eq!(history.pathname(), "/blog");
    assert_eq!(route_of(&router).path, "/blog");

    // Same through the store
    let err = router
        .dispatch(&waymark_wasm::router_navigate(), JsValue::from_str("/broken/8"))
        .unwrap_err();
    assert!(error_message(&err).contains("cannot load 8"), "{:?}", err);
    assert_eq!(route_of(&router).path, "/blog");
}

#[wasm_bindgen_test]
fn test_handler_returning_non_json_aborts_navigation() {
    let table = single(
        JsValue::from_str("/now"),
        Function::new_no_args("return new Date()").into(),
    );
    let history = BrowserHistory::new().unwrap();
    history.push("/").unwrap();
    let router = WaymarkRouter::new(table, JsValue::UNDEFINED).unwrap();

    assert!(router.navigate("/now").is_err());
    assert_eq!(history.pathname(), "/");
}

#[wasm_bindgen_test]
fn test_throwing_handler_fails_construction() {
    BrowserHistory::new().unwrap().push("/broken/initial").unwrap();

    let err = WaymarkRouter::new(table_with_throwing_handler(), JsValue::UNDEFINED).unwrap_err();

    assert!(error_message(&err).contains("cannot load initial"), "{:?}", err);
}

#[wasm_bindgen_test]
fn test_router_on_change() {
    let router = WaymarkRouter::new(blog_table(), JsValue::UNDEFINED).unwrap();
    let sink = Array::new();
    let push = Function::new_with_args("sink, route", "sink.push(route.path)")
        .bind1(&JsValue::NULL, &sink);

    router.on_change(push);
    router.navigate("/blog").unwrap();
    router.navigate("/nope").unwrap();

    assert_eq!(sink.length(), 2);
    assert_eq!(sink.get(1).as_string(), Some("/nope".to_string()));
    assert_eq!(route_of(&router).matched, json!(false));
}

#[wasm_bindgen_test]
fn test_router_state_exposes_route_key() {
    let router = WaymarkRouter::new(blog_table(), JsValue::UNDEFINED).unwrap();
    router.navigate("/").unwrap();

    let state = router.state().unwrap();
    assert_eq!(waymark_wasm::router_key(), "route");
    let route = get(&state, &waymark_wasm::router_key());
    assert_eq!(get(&route, "path").as_string(), Some("/".to_string()));
}

#[wasm_bindgen_test]
fn test_link_click_is_intercepted() {
    let router = WaymarkRouter::new(blog_table(), JsValue::UNDEFINED).unwrap();
    let document = web_sys::window().unwrap().document().unwrap();
    let body = document.body().unwrap();

    let anchor: HtmlAnchorElement = document.create_element("a").unwrap().unchecked_into();
    anchor.set_href("/blog/post/clicked");
    body.append_child(&anchor).unwrap();

    anchor.click();

    assert_eq!(route_of(&router).path, "/blog/post/clicked");
    body.remove_child(&anchor).unwrap();
}

#[wasm_bindgen_test]
fn test_opted_out_link_is_ignored() {
    let router = WaymarkRouter::new(blog_table(), JsValue::UNDEFINED).unwrap();
    router.navigate("/").unwrap();
    let document = web_sys::window().unwrap().document().unwrap();
    let body = document.body().unwrap();

    let anchor: HtmlAnchorElement = document.create_element("a").unwrap().unchecked_into();
    anchor.set_href("/blog");
    anchor.set_attribute("data-ignore-router", "").unwrap();
    body.append_child(&anchor).unwrap();

    with_navigation_blocked(|| anchor.click());

    assert_eq!(route_of(&router).path, "/");
    body.remove_child(&anchor).unwrap();
}

#[wasm_bindgen_test]
fn test_destroy_stops_interception() {
    let mut router = WaymarkRouter::new(blog_table(), JsValue::UNDEFINED).unwrap();
    router.navigate("/").unwrap();
    router.destroy();

    let document = web_sys::window().unwrap().document().unwrap();
    let body = document.body().unwrap();
    let anchor: HtmlAnchorElement = document.create_element("a").unwrap().unchecked_into();
    anchor.set_href("/blog");
    body.append_child(&anchor).unwrap();

    with_navigation_blocked(|| anchor.click());

    assert_eq!(route_of(&router).path, "/");
    body.remove_child(&anchor).unwrap();
}
