use crate::engine::{FrameCallback, FrameHandle, FrameScheduler};
use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use std::future::Future;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

#[rustfmt::skip]
use web_sys::{
    Document,
    Window,
    CanvasRenderingContext2d,
    HtmlCanvasElement,
    Response,
};

// ==================== Constants ====================
// Constants related to HTML elements
mod html {
    pub const CANVAS_ID: &str = "canvas";
    pub const CONTEXT_2D: &str = "2d";
}

// straight to the console, ignores the log level filter
macro_rules! log {
    ($($t:tt)*) => {
        web_sys::console::log_1(&format!($($t)*).into());
    }
}

pub fn context() -> Result<CanvasRenderingContext2d> {
    canvas()?
        .get_context(html::CONTEXT_2D)
        // Because return is Result<Option<Object>,JsValue>
        // - we map error(JsValue) to Error (anyhow)
        // - take the inner Option and map the None case to a value
        .map_err(|js_value| anyhow!("Error getting context : {:#?}", js_value))?
        .ok_or_else(|| anyhow!("No 2d context found"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|element| {
            anyhow!(
                "Error converting {:#?} to CanvasRenderingContext2d",
                element
            )
        })
}

pub fn canvas() -> Result<HtmlCanvasElement> {
    document()?
        .get_element_by_id(html::CANVAS_ID)
        .ok_or_else(|| anyhow!("No Canvas Element found with ID : '{:#?}'", html::CANVAS_ID))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|element| anyhow!("Error converting {:#?} to HtmlCanvasElement", element))
}

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| anyhow!("Window not found"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| anyhow!("No Document Found"))
}

/// Viewport size in whole pixels
pub fn inner_size(window: &Window) -> Result<(u32, u32)> {
    let dimension = |value: Result<JsValue, JsValue>, name: &str| -> Result<u32> {
        value
            .map_err(|err| anyhow!("Could not read {} : {:#?}", name, err))?
            .as_f64()
            .map(|pixels| pixels.max(0.0) as u32)
            .ok_or_else(|| anyhow!("{} is not a number", name))
    };
    Ok((
        dimension(window.inner_width(), "innerWidth")?,
        dimension(window.inner_height(), "innerHeight")?,
    ))
}

pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

pub async fn fetch_json<T>(json_path: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let resp_value = fetch_with_str(json_path).await?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|element| anyhow!("error converting [{:#?}] to Response", element))?;
    if !resp.ok() {
        return Err(anyhow!("fetching [{}] returned status {}", json_path, resp.status()));
    }
    let json = resp
        .json()
        .map_err(|err| anyhow!("Could not get JSON from response [{:#?}]", err))?;

    let json_value = JsFuture::from(json)
        .await
        .map_err(|err| anyhow!("error fetching [{:#?}]", err))?;

    serde_wasm_bindgen::from_value(json_value)
        .map_err(|err| anyhow!("error converting response : {:#?}", err))
}

async fn fetch_with_str(resource: &str) -> Result<JsValue> {
    let resp = window()?.fetch_with_str(resource);

    JsFuture::from(resp)
        .await
        .map_err(|err| anyhow!("error fetching : {:#?}", err))
}

// ==================== Animation Frames ====================
// TABLE:
// ┌──────────────────────────────────────────────────────────────────────────┐
// │                 request_frame -> callback -> request_frame               │
// ├──────────────────────┬───────────────────────────────────────────────────┤
// │ request_frame        │ wraps the Rust FnOnce in a one-shot JS closure    │
// │                      │ and hands it to window.requestAnimationFrame      │
// ├──────────────────────┼───────────────────────────────────────────────────┤
// │ browser paints       │ calls the closure once with a DOMHighResTimeStamp │
// │                      │ the closure frees itself after running            │
// ├──────────────────────┼───────────────────────────────────────────────────┤
// │ cancel_frame         │ window.cancelAnimationFrame(id)                   │
// └──────────────────────┴───────────────────────────────────────────────────┘
// - a cancelled closure is never called, so it is never freed (one per
//   destroy)
pub struct AnimationFrameScheduler {
    window: Window,
}

impl AnimationFrameScheduler {
    pub fn new() -> Result<Self> {
        Ok(AnimationFrameScheduler { window: window()? })
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Result<FrameHandle> {
        let closure = Closure::once_into_js(move |timestamp: f64| callback(timestamp));
        self.window
            .request_animation_frame(closure.unchecked_ref())
            .map(FrameHandle)
            .map_err(|err| anyhow!("Cannot request animation frame {:#?}", err))
    }

    fn cancel_frame(&self, handle: FrameHandle) -> Result<()> {
        self.window
            .cancel_animation_frame(handle.0)
            .map_err(|err| anyhow!("Cannot cancel animation frame {:#?}", err))
    }
}
