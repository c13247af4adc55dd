//! Conversion between JS values and router types

use js_sys::{Array, Function, Object, RegExp};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use waymark_core::{Route, RoutePattern};
use web_sys::console;

use crate::regexp::JsRegExp;

/// Build routes from `[[pattern, handler?], ...]`
///
/// `pattern` is a path template string or a `RegExp`; `handler` is a
/// function receiving the params as arguments, or any static value.
pub fn routes_from_js(table: &Array) -> Result<Vec<Route>, JsValue> {
    table
        .iter()
        .enumerate()
        .map(|(i, entry)| route_from_js(i, &entry))
        .collect()
}

fn route_from_js(index: usize, entry: &JsValue) -> Result<Route, JsValue> {
    if !Array::is_array(entry) {
        return Err(JsValue::from_str(&format!(
            "route #{} must be a [pattern, handler] array",
            index
        )));
    }
    let entry: &Array = entry.unchecked_ref();
    let key = entry.get(0);
    let handler = entry.get(1);

    let route = if let Some(re) = key.dyn_ref::<RegExp>() {
        Route::from_pattern(RoutePattern::custom(JsRegExp::new(re)))
    } else if let Some(template) = key.as_string() {
        Route::new(&template).map_err(|e| JsValue::from_str(&e.to_string()))?
    } else {
        return Err(JsValue::from_str(&format!(
            "route #{} pattern must be a string or RegExp",
            index
        )));
    };

    if handler.is_undefined() {
        return Ok(route);
    }

    match handler.dyn_into::<Function>() {
        Ok(func) => Ok(route.try_handler(move |params| call_handler(&func, params))),
        Err(value) => {
            let payload = js_to_json(&value).map_err(|e| {
                JsValue::from_str(&format!("route #{} payload: {}", index, describe(&e)))
            })?;
            Ok(route.payload(payload))
        }
    }
}

fn call_handler(func: &Function, params: &[String]) -> Result<Value, String> {
    let args: Array = params.iter().map(|p| JsValue::from_str(p)).collect();
    let result = func.apply(&JsValue::NULL, &args).map_err(|e| {
        console::error_2(&JsValue::from_str("waymark: route handler threw"), &e);
        describe(&e)
    })?;
    js_to_json(&result).map_err(|e| describe(&e))
}

/// Convert a JS value to JSON
///
/// `undefined` becomes `null`. Functions, symbols and class instances such
/// as `Date` have no JSON form and are rejected.
pub fn js_to_json(value: &JsValue) -> Result<Value, JsValue> {
    if value.is_undefined() {
        return Ok(Value::Null);
    }
    if !is_plain(value) {
        return Err(JsValue::from_str(
            "only plain objects, arrays and primitives can be stored",
        ));
    }
    serde_wasm_bindgen::from_value(value.clone())
        .map_err(|e| JsValue::from_str(&format!("value has no JSON form: {}", e)))
}

/// Objects whose prototype is `Object.prototype` or `null`
fn is_plain(value: &JsValue) -> bool {
    if !value.is_object() || Array::is_array(value) {
        return true;
    }
    let proto = Object::get_prototype_of(value);
    proto.is_null() || Object::get_prototype_of(&proto).is_null()
}

/// Message of a thrown value
pub fn describe(error: &JsValue) -> String {
    if let Some(error) = error.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    error.as_string().unwrap_or_else(|| format!("{:?}", error))
}

/// Convert to plain JS objects rather than `Map`s
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

/// Router errors surface in JS as `Error` objects
pub fn to_js_error(error: waymark_core::Error) -> JsValue {
    js_sys::Error::new(&error.to_string()).into()
}
