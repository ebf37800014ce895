use crate::browser;
use crate::game::LoopManager;
use crate::router::{BrowserHistory, History, Route, Router};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{EventTarget, KeyboardEvent, MessageEvent, MouseEvent};

/// Messages an embedding parent page can post to us
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ShellMessage {
    // any JSON, a target that is not a string is rejected by handle_message
    #[serde(rename = "NAVIGATE")]
    Navigate {
        #[serde(default)]
        to: Value,
    },
    #[serde(other)]
    Other,
}

/// Applies a parent message to the router. Navigation failures are logged,
/// never returned.
pub fn handle_message<H: History>(router: &mut Router<H>, message: ShellMessage) -> Option<Route> {
    match message {
        ShellMessage::Navigate { to } => {
            let Some(path) = to.as_str() else {
                log::warn!("[shell] navigation failed : target {} is not a path", to);
                return None;
            };
            log::info!("[shell] navigating to : {}", path);
            match router.push(path) {
                Ok(route) => Some(route),
                Err(err) => {
                    log::warn!("[shell] navigation failed : {}", err);
                    None
                }
            }
        }
        ShellMessage::Other => None,
    }
}

/// Listens for `message` events from the parent frame for the lifetime of
/// the page
pub fn listen_for_navigation<H: History + 'static>(router: Rc<RefCell<Router<H>>>) -> Result<()> {
    let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
        match serde_wasm_bindgen::from_value::<ShellMessage>(event.data()) {
            Ok(message) => {
                handle_message(&mut router.borrow_mut(), message);
            }
            Err(err) => log::debug!("[shell] ignoring message : {}", err),
        }
    });
    browser::window()?
        .add_event_listener_with_callback("message", on_message.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Could not listen for messages : {:#?}", err))?;
    // listener lives as long as the page
    on_message.forget();
    Ok(())
}

/// Moves the router to `path` after the browser changed it on its own.
/// Unknown paths are logged and leave the router where it was.
pub fn sync_to_path<H: History>(router: &mut Router<H>, path: &str) -> Option<Route> {
    match path.parse::<Route>() {
        Ok(route) => {
            router.sync(route);
            Some(route)
        }
        Err(err) => {
            log::warn!("[shell] history change ignored : {}", err);
            None
        }
    }
}

/// Keeps the router in step with back/forward navigation
pub fn listen_for_history<H: History + 'static>(router: Rc<RefCell<Router<H>>>) -> Result<()> {
    let on_pop_state = Closure::<dyn FnMut()>::new(move || match BrowserHistory::current_path() {
        Ok(path) => {
            sync_to_path(&mut router.borrow_mut(), &path);
        }
        Err(err) => log::warn!("[shell] history change ignored : {:#}", err),
    });
    let window = browser::window()?;
    listen(&window, "popstate", on_pop_state.as_ref())?;
    on_pop_state.forget();
    Ok(())
}

/// Forwards canvas pointer events and window key/resize events to the
/// loop manager
pub fn attach_input(manager: Rc<LoopManager>) -> Result<()> {
    let canvas = browser::canvas()?;
    let window = browser::window()?;

    let target = manager.clone();
    let on_down = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
        target.handle_pointer_down_with_button(
            event.offset_x().into(),
            event.offset_y().into(),
            event.button(),
        );
    });
    let target = manager.clone();
    let on_up = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
        target.handle_pointer_up(event.offset_x().into(), event.offset_y().into());
    });
    let target = manager.clone();
    let on_move = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
        target.handle_pointer_move(event.offset_x().into(), event.offset_y().into());
    });
    let target = manager.clone();
    let on_key_down = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
        target.handle_key_down(&event.key());
    });
    let target = manager.clone();
    let on_key_up = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
        target.handle_key_up(&event.key());
    });
    let target = manager;
    let resize_window = window.clone();
    let on_resize = Closure::<dyn FnMut()>::new(move || match browser::inner_size(&resize_window) {
        Ok((width, height)) => target.resize(width, height),
        Err(err) => log::warn!("[shell] resize ignored : {:#}", err),
    });

    listen(&canvas, "mousedown", on_down.as_ref())?;
    listen(&canvas, "mouseup", on_up.as_ref())?;
    listen(&canvas, "mousemove", on_move.as_ref())?;
    listen(&window, "keydown", on_key_down.as_ref())?;
    listen(&window, "keyup", on_key_up.as_ref())?;
    listen(&window, "resize", on_resize.as_ref())?;

    on_down.forget();
    on_up.forget();
    on_move.forget();
    on_key_down.forget();
    on_key_up.forget();
    on_resize.forget();
    Ok(())
}

fn listen(target: &EventTarget, kind: &str, callback: &JsValue) -> Result<()> {
    target
        .add_event_listener_with_callback(kind, callback.unchecked_ref())
        .map_err(|err| anyhow!("Could not listen for {} : {:#?}", kind, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::MemoryHistory;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> ShellMessage {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn navigate_message_changes_route() {
        let mut router = Router::new(MemoryHistory::default(), Route::Home);
        let message = parse(json!({ "type": "NAVIGATE", "to": "/game" }));

        assert_eq!(handle_message(&mut router, message), Some(Route::Game));
        assert_eq!(router.history().entries(), vec!["/game"]);
    }

    #[test]
    fn failed_navigation_is_swallowed() {
        let mut router = Router::new(MemoryHistory::default(), Route::Home);
        let message = parse(json!({ "type": "NAVIGATE", "to": "/nowhere" }));

        assert_eq!(handle_message(&mut router, message), None);
        assert_eq!(router.current(), Route::Home);
    }

    #[test]
    fn other_message_types_are_ignored() {
        let mut router = Router::new(MemoryHistory::default(), Route::Home);
        let message = parse(json!({ "type": "RESIZE", "width": 10 }));

        assert_eq!(message, ShellMessage::Other);
        assert_eq!(handle_message(&mut router, message), None);
        assert!(router.history().entries().is_empty());
    }

    #[test]
    fn navigate_with_a_non_string_target_is_rejected() {
        let mut router = Router::new(MemoryHistory::default(), Route::Home);

        for target in [json!({ "type": "NAVIGATE", "to": 42 }), json!({ "type": "NAVIGATE" })] {
            let message = parse(target);
            assert!(matches!(message, ShellMessage::Navigate { .. }));
            assert_eq!(handle_message(&mut router, message), None);
        }
        assert_eq!(router.current(), Route::Home);
        assert!(router.history().entries().is_empty());
    }

    #[test]
    fn back_navigation_resyncs_so_navigate_is_not_dropped() {
        let mut router = Router::new(MemoryHistory::default(), Route::Home);
        let navigate = || parse(json!({ "type": "NAVIGATE", "to": "/game" }));

        assert_eq!(handle_message(&mut router, navigate()), Some(Route::Game));
        assert_eq!(sync_to_path(&mut router, "/"), Some(Route::Home));
        assert_eq!(handle_message(&mut router, navigate()), Some(Route::Game));
        assert_eq!(router.history().entries(), vec!["/game", "/game"]);

        assert_eq!(sync_to_path(&mut router, "/elsewhere"), None);
        assert_eq!(router.current(), Route::Game);
    }
}
