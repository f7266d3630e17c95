use js_sys::{Function, Promise, Reflect};
use sb_compiler::sync::RuleHost;
use sb_core::types::RuleUpdate;
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Rule host backed by `chrome.declarativeNetRequest` dynamic rules.
pub struct ChromeRuleHost;

impl RuleHost for ChromeRuleHost {
    async fn update_dynamic_rules(&mut self, update: &RuleUpdate) -> Result<(), String> {
        let api = declarative_net_request().map_err(js_error_message)?;
        let update_fn: Function = Reflect::get(&api, &"updateDynamicRules".into())
            .map_err(js_error_message)?
            .dyn_into()
            .map_err(|_| "declarativeNetRequest.updateDynamicRules is not a function".to_string())?;

        let options = to_js(update)?;
        let pending: Promise = update_fn
            .call1(&api, &options)
            .map_err(js_error_message)?
            .dyn_into()
            .map_err(|_| "updateDynamicRules did not return a promise".to_string())?;

        JsFuture::from(pending).await.map(|_| ()).map_err(js_error_message)
    }
}

fn declarative_net_request() -> Result<JsValue, JsValue> {
    let chrome = Reflect::get(&js_sys::global(), &"chrome".into())?;
    if chrome.is_undefined() {
        return Err(JsValue::from_str("chrome extension API unavailable"));
    }
    let api = Reflect::get(&chrome, &"declarativeNetRequest".into())?;
    if api.is_undefined() {
        return Err(JsValue::from_str("declarativeNetRequest permission missing"));
    }
    Ok(api)
}

/// Convert a serializable value to a plain JS object via JSON.
pub fn to_js<T: Serialize>(value: &T) -> Result<JsValue, String> {
    let json = serde_json::to_string(value).map_err(|e| e.to_string())?;
    js_sys::JSON::parse(&json).map_err(js_error_message)
}

/// Best-effort message from a thrown JS value.
pub fn js_error_message(value: JsValue) -> String {
    Reflect::get(&value, &"message".into())
        .ok()
        .and_then(|message| message.as_string())
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}
