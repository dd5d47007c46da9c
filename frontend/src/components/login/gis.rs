//! Thin bindings to the Google Identity Services script
//! (`google.accounts.id`), loaded by `index.html`.

use js_sys::{Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};

fn get(target: &JsValue, key: &str) -> Result<JsValue, String> {
    Reflect::get(target, &JsValue::from_str(key))
        .map_err(|e| format!("{:?}", e))
        .and_then(|value| {
            if value.is_undefined() || value.is_null() {
                Err(format!("{} is not available", key))
            } else {
                Ok(value)
            }
        })
}

fn id_api() -> Result<JsValue, String> {
    let window = web_sys::window().ok_or_else(|| "no window".to_string())?;
    let google = get(&window, "google")?;
    let accounts = get(&google, "accounts")?;
    get(&accounts, "id")
}

fn call(target: &JsValue, method: &str, arg: &JsValue) -> Result<(), String> {
    let function: Function = get(target, method)?
        .dyn_into()
        .map_err(|_| format!("{} is not a function", method))?;
    function
        .call1(target, arg)
        .map(|_| ())
        .map_err(|e| format!("{:?}", e))
}

/// True once the script has loaded.
pub fn available() -> bool {
    id_api().is_ok()
}

/// Registers `callback`, which receives `{ credential }` after sign-in.
pub fn initialize(client_id: &str, callback: &Function) -> Result<(), String> {
    let id = id_api()?;
    let config = Object::new();
    let set = |key: &str, value: &JsValue| {
        Reflect::set(&config, &JsValue::from_str(key), value)
            .map(|_| ())
            .map_err(|e| format!("{:?}", e))
    };
    set("client_id", &JsValue::from_str(client_id))?;
    set("callback", callback.as_ref())?;
    set("auto_select", &JsValue::FALSE)?;
    set("cancel_on_tap_outside", &JsValue::TRUE)?;
    call(&id, "initialize", &config)
}

pub fn prompt() -> Result<(), String> {
    call(&id_api()?, "prompt", &JsValue::UNDEFINED)
}

/// `credential` field of the sign-in response.
pub fn credential_of(response: &JsValue) -> Option<String> {
    get(response, "credential").ok()?.as_string()
}
