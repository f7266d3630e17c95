//! WebAssembly bindings for SiteBlock
//!
//! The background service worker forwards `updateRules` messages to
//! [`handle_message`]; the popup and options page manage the list through
//! [`PatternList`].

mod host;
mod logger;
mod storage;

use std::cell::RefCell;

use js_sys::{Array, Promise};
use log::LevelFilter;
use sb_compiler::{build_update, SyncConfig, Synchronizer};
use sb_core::protocol::{Message, Response};
use sb_core::store::{AddOutcome, DefaultList, PatternStore};
use sb_core::{is_url_blocked, pattern_for_url};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

pub use host::ChromeRuleHost;
pub use storage::LocalStorageBackend;

use host::{js_error_message, to_js};

thread_local! {
    /// Most recent `handle_message` promise. Each request waits on it.
    static PENDING: RefCell<Option<Promise>> = const { RefCell::new(None) };
}

#[wasm_bindgen]
pub fn init_logging(verbose: bool) {
    logger::install(if verbose { LevelFilter::Debug } else { LevelFilter::Info });
}

/// Handle a UI message and resolve to its response object.
///
/// Requests are queued: a message starts only after the previous one has
/// settled, so the rules installed last always belong to the newest list.
/// The promise never rejects; failures resolve to `{status: "error"}`.
#[wasm_bindgen]
pub fn handle_message(message: JsValue, extension_id: String) -> Promise {
    let previous = PENDING.with(|pending| pending.borrow_mut().take());

    let promise = future_to_promise(async move {
        if let Some(previous) = previous {
            let _ = JsFuture::from(previous).await;
        }
        let response = respond(message, extension_id).await;
        to_js(&response).map_err(|e| JsValue::from_str(&e))
    });

    PENDING.with(|pending| *pending.borrow_mut() = Some(promise.clone()));
    promise
}

async fn respond(message: JsValue, extension_id: String) -> Response {
    // `JSON.stringify(undefined)` yields `undefined`, not a string.
    let json = match js_sys::JSON::stringify(&message) {
        Ok(json) => match json.as_string() {
            Some(json) => json,
            None => return Response::error("Invalid message: expected an object"),
        },
        Err(e) => return Response::error(js_error_message(e)),
    };
    let message = match Message::parse(&json) {
        Ok(message) => message,
        Err(response) => return response,
    };

    let mut synchronizer = Synchronizer::new(ChromeRuleHost, SyncConfig::new(extension_id));
    let response = synchronizer.handle(message).await;
    if let Response::Error { error } = &response {
        log::error!("Error updating dynamic rules: {}", error);
    }
    response
}

/// The `updateDynamicRules` argument for a pattern list, without installing it.
#[wasm_bindgen]
pub fn build_rule_update(sites: JsValue, extension_id: String) -> Result<JsValue, JsValue> {
    let sites = strings_from_js(&sites)?;
    let update = build_update(&sites, &SyncConfig::new(extension_id))
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_js(&update).map_err(|e| JsValue::from_str(&e))
}

#[wasm_bindgen]
pub fn pattern_for_url_js(url: &str) -> Option<String> {
    pattern_for_url(url)
}

#[wasm_bindgen]
pub fn is_url_blocked_js(url: &str, sites: JsValue) -> Result<bool, JsValue> {
    let sites = strings_from_js(&sites)?;
    Ok(is_url_blocked(url, &sites))
}

/// The blocked-site list as seen by a UI surface, persisted in localStorage.
#[wasm_bindgen]
pub struct PatternList {
    store: PatternStore<LocalStorageBackend>,
}

#[wasm_bindgen]
impl PatternList {
    /// Load the stored list. `defaults_json` is the bundled
    /// `{"blocked": [...]}` document; without it the built-in list is used.
    #[wasm_bindgen(constructor)]
    pub fn new(defaults_json: Option<String>) -> Result<PatternList, JsValue> {
        let defaults = match defaults_json {
            Some(json) => DefaultList::from_json(&json),
            None => DefaultList::bundled(),
        }
        .map_err(store_error)?;

        let store = PatternStore::load(LocalStorageBackend::new(), defaults).map_err(store_error)?;
        Ok(PatternList { store })
    }

    /// True when this load found no stored list and wrote the defaults.
    /// The caller should then call [`PatternList::install_rules`].
    pub fn seeded(&self) -> bool {
        self.store.seeded()
    }

    /// Queue an `updateRules` request for the current list through
    /// [`handle_message`]. Resolves to the response object.
    pub fn install_rules(&self, extension_id: String) -> Promise {
        let message = Message::UpdateRules { sites: self.store.patterns().to_vec() };
        match to_js(&message) {
            Ok(message) => handle_message(message, extension_id),
            Err(e) => Promise::resolve(&to_js(&Response::error(e)).unwrap_or(JsValue::UNDEFINED)),
        }
    }

    pub fn sites(&self) -> Array {
        self.store.patterns().iter().map(|p| JsValue::from_str(p)).collect()
    }

    pub fn reload(&mut self) -> Result<Array, JsValue> {
        self.store.reload().map_err(store_error)?;
        Ok(self.sites())
    }

    /// Add a pattern. Resolves to "added", "duplicate" or "empty".
    pub fn add(&mut self, pattern: &str) -> Result<String, JsValue> {
        let outcome = self.store.add(pattern).map_err(store_error)?;
        Ok(outcome_name(outcome).to_string())
    }

    /// Add the `*://host/*` pattern for a page URL.
    pub fn add_url(&mut self, url: &str) -> Result<String, JsValue> {
        let pattern = pattern_for_url(url)
            .ok_or_else(|| JsValue::from_str(&format!("Invalid URL: {}", url)))?;
        self.add(&pattern)
    }

    /// Remove the pattern at `index`, returning it.
    pub fn remove(&mut self, index: usize) -> Result<String, JsValue> {
        self.store.remove(index).map_err(store_error)
    }

    /// Whether the coarse check would send `url` to the blocked page.
    pub fn blocks(&self, url: &str) -> bool {
        is_url_blocked(url, self.store.patterns())
    }
}

fn outcome_name(outcome: AddOutcome) -> &'static str {
    match outcome {
        AddOutcome::Added => "added",
        AddOutcome::Duplicate => "duplicate",
        AddOutcome::Empty => "empty",
    }
}

fn store_error(e: sb_core::StoreError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn strings_from_js(value: &JsValue) -> Result<Vec<String>, JsValue> {
    if !Array::is_array(value) {
        return Err(JsValue::from_str("Sites must be an array of strings"));
    }
    Array::from(value)
        .iter()
        .map(|item| {
            item.as_string()
                .ok_or_else(|| JsValue::from_str("Sites must be an array of strings"))
        })
        .collect()
}
