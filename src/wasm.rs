//! Browser bindings
//!
//! Inputs arrive as a project JSON string; results go back as plain JS
//! objects. `optimize` returns a Promise and yields to the event loop with
//! `setTimeout(0)` between generations so the page stays responsive while
//! `stop()` can still be delivered.

use std::cell::RefCell;

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::collision::get_collisions;
use crate::error::PlanError;
use crate::optimizer::{ActiveStop, StopHandle, optimize as run_optimizer};
use crate::project::Project;

thread_local! {
    /// Cancellation flag of the newest optimization in flight
    static CURRENT_STOP: RefCell<ActiveStop> = RefCell::new(ActiveStop::default());
}

fn js_error(e: PlanError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(|e| js_error(e.into()))?;
    js_sys::JSON::parse(&json)
}

/// Resolves on the next macrotask
fn next_tick() -> JsFuture {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window().is_some_and(|window| {
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, 0)
                .is_ok()
        });
        if !scheduled {
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    JsFuture::from(promise)
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Robopath engine loaded");
}

/// `TimePrediction` for the project's sequence
#[wasm_bindgen(js_name = computeTimeline)]
pub fn compute_timeline(project_json: &str) -> Result<JsValue, JsValue> {
    let project = Project::from_json(project_json).map_err(js_error)?;
    let prediction = project.timeline().map_err(js_error)?;
    to_js(&prediction)
}

/// Merged collision markers for the project's sequence
#[wasm_bindgen(js_name = getCollisions)]
pub fn collisions(project_json: &str) -> Result<JsValue, JsValue> {
    let project = Project::from_json(project_json).map_err(js_error)?;
    let prediction = project.timeline().map_err(js_error)?;
    let markers = get_collisions(&prediction, &project.lines, &project.shapes, &project.settings)
        .map_err(js_error)?;
    to_js(&markers)
}

/// Optimize the project's lines; `on_update` receives one report per generation
#[wasm_bindgen]
pub async fn optimize(project_json: String, on_update: js_sys::Function) -> Result<JsValue, JsValue> {
    let project = Project::from_json(&project_json).map_err(js_error)?;
    let stop = StopHandle::new();
    let optimizer = project.optimizer().map_err(js_error)?.with_stop_handle(stop.clone());
    CURRENT_STOP.with(|current| current.borrow_mut().claim(stop.clone()));

    let result = run_optimizer(
        optimizer,
        |report| match to_js(report) {
            Ok(value) => {
                if let Err(e) = on_update.call1(&JsValue::NULL, &value) {
                    log::warn!("onUpdate threw: {:?}", e);
                }
            }
            Err(e) => log::warn!("Could not encode progress report: {:?}", e),
        },
        || async {
            let _ = next_tick().await;
        },
    )
    .await;

    CURRENT_STOP.with(|current| current.borrow_mut().release(&stop));
    to_js(&result)
}

/// Ask the running optimization to finish after its current generation
#[wasm_bindgen]
pub fn stop() {
    CURRENT_STOP.with(|current| current.borrow().stop());
}
