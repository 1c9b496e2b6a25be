// Console logging helpers shared by the session and the components.

#[cfg(target_arch = "wasm32")]
pub fn clog(msg: &str) {
    web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(msg));
}

#[cfg(target_arch = "wasm32")]
pub fn cwarn(msg: &str) {
    web_sys::console::warn_1(&wasm_bindgen::JsValue::from_str(msg));
}

#[cfg(target_arch = "wasm32")]
pub fn cerror(msg: &str) {
    web_sys::console::error_1(&wasm_bindgen::JsValue::from_str(msg));
}

// Host builds (unit tests) never reach into JS.
#[cfg(not(target_arch = "wasm32"))]
pub fn clog(msg: &str) {
    let _ = msg;
}

#[cfg(not(target_arch = "wasm32"))]
pub fn cwarn(msg: &str) {
    eprintln!("warn: {msg}");
}

#[cfg(not(target_arch = "wasm32"))]
pub fn cerror(msg: &str) {
    eprintln!("error: {msg}");
}

/// Reads a raw string from `localStorage`, `None` when storage is unavailable.
pub fn storage_get(key: &str) -> Option<String> {
    if !cfg!(target_arch = "wasm32") {
        return None;
    }
    let win = web_sys::window()?;
    let store = win.local_storage().ok().flatten()?;
    store.get_item(key).ok().flatten()
}
