// ==================== Imports ====================
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

#[macro_use]
mod browser;
pub mod config;
pub mod engine;
pub mod game;
pub mod logging;
pub mod router;
pub mod shell;
pub mod system;
pub mod types;

pub use browser::AnimationFrameScheduler;
pub use config::{GameConfig, LoopConfig};
pub use engine::{CanvasSurface, FrameScheduler, ManualScheduler, Surface};
pub use game::{LoopManager, RunState};
pub use logging::{EventLog, FacadeLog, MemoryLog};
pub use system::{GameSystem, SystemRegistry};

// TABLE:
// ┌──────────────────────────────────────────────────────────────────────────┐
// │                           Module Map                                     │
// ├───────────────────┬──────────────────────────────────────────────────────┤
// │ lib.rs            │ wasm entry, wires everything together                │
// │ game.rs           │ LoopManager : run state + update/render per frame    │
// │ engine/           │ Surface, FrameScheduler, FrameClock, InputState      │
// │ system.rs         │ GameSystem trait + priority ordered registry         │
// │ config.rs         │ serde config with the starter defaults               │
// │ logging.rs        │ console logger + EventLog sink                       │
// │ types.rs          │ shared enums/data for game code                      │
// │ router.rs         │ routes + history                                     │
// │ shell.rs          │ parent frame messages + DOM listeners                │
// │ browser.rs        │ web_sys helpers + requestAnimationFrame scheduler    │
// └───────────────────┴──────────────────────────────────────────────────────┘

const CONFIG_PATH: &str = "game.json";

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - installs panic hook + logging
/// - starts the router, its back/forward sync and the parent message listener
/// - loads config, then starts the loop manager on the page canvas
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();
    logging::init_logging(logging::LoggingConfig::default());

    let initial = router::BrowserHistory::current_path()
        .ok()
        .and_then(|path| path.parse::<router::Route>().ok())
        .unwrap_or(router::Route::Home);
    let router = Rc::new(RefCell::new(router::Router::new(
        router::BrowserHistory,
        initial,
    )));
    shell::listen_for_history(router.clone())
        .and_then(|_| shell::listen_for_navigation(router))
        .map_err(|err| JsValue::from_str(&format!("{:#}", err)))?;

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    browser::spawn_local(async move {
        let config = match GameConfig::fetch(CONFIG_PATH).await {
            Ok(config) => config,
            Err(err) => {
                log::info!("using default config ({:#})", err);
                GameConfig::default()
            }
        };
        if let Err(err) = start(config) {
            log!("Could not start game loop : {:#}", err);
        }
    });

    Ok(())
}

fn start(config: GameConfig) -> anyhow::Result<()> {
    let mut surface = CanvasSurface::from_document()?;
    let canvas = surface.canvas();
    if canvas.width() == 0 || canvas.height() == 0 {
        surface.set_size(engine::Size::new(
            config.canvas.default_width,
            config.canvas.default_height,
        ));
    }

    let manager = Rc::new(LoopManager::new(
        Box::new(surface),
        Rc::new(AnimationFrameScheduler::new()?),
        Rc::new(FacadeLog),
        config.loop_config,
    ));
    shell::attach_input(manager)?;
    Ok(())
}
