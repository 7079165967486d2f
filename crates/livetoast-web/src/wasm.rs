#![forbid(unsafe_code)]

use wasm_bindgen::prelude::*;

use crate::{StepHost, StepResult, WebHostError};

/// JS-facing toast host.
///
/// Every call takes and returns JSON strings so the page never has to mirror
/// Rust types:
///
/// ```js
/// const host = new LiveToastHost();
/// host.handle(JSON.stringify({ type: "init", dataset: el.dataset }));
/// const step = JSON.parse(host.handle(JSON.stringify({ type: "sync", wrappers })));
/// const { ops, events } = JSON.parse(host.takeOutputs());
/// ```
#[wasm_bindgen]
pub struct LiveToastHost {
    inner: StepHost,
}

#[wasm_bindgen]
impl LiveToastHost {
    #[wasm_bindgen(constructor)]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            inner: StepHost::new(),
        }
    }

    /// Handle one JSON message and return the step result as JSON.
    pub fn handle(&mut self, message: &str) -> Result<String, JsValue> {
        let result: StepResult = self.inner.handle_json(message).map_err(to_js)?;
        serde_json::to_string(&result).map_err(|err| to_js(WebHostError::from(err)))
    }

    /// Drain captured outputs as JSON.
    #[wasm_bindgen(js_name = takeOutputs)]
    pub fn take_outputs(&mut self) -> Result<String, JsValue> {
        self.inner.take_outputs().to_json().map_err(to_js)
    }

    /// Explicit teardown for JS callers.
    pub fn destroy(&mut self) {
        self.inner = StepHost::new();
    }
}

fn to_js(err: WebHostError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
