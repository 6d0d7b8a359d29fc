//! Browser terminal session
//!
//! Mounts xterm.js into the page, wires its key events and the window
//! resize event into a [`Dispatcher`], and tears all of it down again.
//!
//! All state lives in thread-locals: the page is single-threaded and every
//! callback runs on the event loop.

#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::config::TerminalConfig;
use crate::dispatcher::Dispatcher;
use crate::platform::{KeyEvent, PlatformError, PlatformResult};
use crate::platform::web::{XTerm, XTermDisposable, XTermFitAddon, XTermView};

/// Everything a mounted terminal holds on to
struct Session {
    dispatcher: Dispatcher<XTermView>,
    key_subscription: XTermDisposable,
    _key_callback: Closure<dyn FnMut(JsValue)>,
    resize_callback: Closure<dyn FnMut()>,
}

thread_local! {
    static SESSION: RefCell<Option<Session>> = RefCell::new(None);
}

/// Build the xterm.js options object from the configuration
pub fn xterm_options(config: &TerminalConfig) -> Result<JsValue, JsValue> {
    js_sys::JSON::parse(&config.xterm_options().to_string())
}

/// Initialize the terminal. Replaces any terminal already mounted.
///
/// On failure nothing is left behind: the widget is disposed and no
/// listener stays attached.
pub fn init(config: TerminalConfig) -> PlatformResult<()> {
    dispose();

    let options = xterm_options(&config).map_err(init_failed("xterm options"))?;
    let terminal = XTerm::new(&options).map_err(init_failed("xterm.js Terminal"))?;
    let fit_addon = match XTermFitAddon::new_fit() {
        Ok(addon) => addon,
        Err(e) => {
            terminal.dispose();
            return Err(init_failed("xterm-addon-fit")(e));
        }
    };
    let dispatcher = Dispatcher::with_config(XTermView::new(terminal, fit_addon), &config);

    let key_callback = Closure::wrap(Box::new(move |event: JsValue| {
        let key_event = match key_event_from_js(&event) {
            Ok(e) => e,
            Err(e) => {
                crate::console_log!("[terminal] bad key event: {:?}", e);
                return;
            }
        };
        SESSION.with(|s| {
            if let Some(session) = s.borrow_mut().as_mut() {
                session.dispatcher.handle_key(&key_event);
            }
        });
    }) as Box<dyn FnMut(_)>);
    let key_subscription = dispatcher
        .view()
        .xterm()
        .on_key(key_callback.as_ref().unchecked_ref());

    let resize_callback = Closure::wrap(Box::new(move || {
        SESSION.with(|s| {
            if let Some(session) = s.borrow_mut().as_mut() {
                session.dispatcher.resize();
            }
        });
    }) as Box<dyn FnMut()>);

    let command_count = dispatcher.table().len();
    SESSION.with(|s| {
        *s.borrow_mut() = Some(Session {
            dispatcher,
            key_subscription,
            _key_callback: key_callback,
            resize_callback,
        });
    });

    if let Err(e) = attach(&config) {
        dispose();
        crate::console_log!("[terminal] {}", e);
        return Err(e);
    }

    crate::console_log!(
        "[terminal] mounted into #{} ({} commands)",
        config.container_id,
        command_count
    );
    Ok(())
}

/// Open the stored session in the page, wire the resize listener and prompt
fn attach(config: &TerminalConfig) -> PlatformResult<()> {
    let container = mount_point(config).map_err(init_failed("mount point"))?;
    let window = web_sys::window().ok_or_else(|| PlatformError::InitFailed("no window".into()))?;

    SESSION.with(|s| {
        let mut slot = s.borrow_mut();
        let session = slot
            .as_mut()
            .ok_or_else(|| PlatformError::InitFailed("session missing".into()))?;

        let view = session.dispatcher.view();
        view.xterm().open(&container);
        // Add fit addon to auto-resize
        view.xterm().load_addon(view.fit_addon());
        session.dispatcher.resize();

        load_web_links_addon(session.dispatcher.view().xterm())
            .map_err(init_failed("xterm-addon-web-links"))?;

        window
            .add_event_listener_with_callback(
                "resize",
                session.resize_callback.as_ref().unchecked_ref(),
            )
            .map_err(init_failed("resize listener"))?;

        session.dispatcher.start();
        session.dispatcher.view().xterm().focus();
        Ok(())
    })
}

fn init_failed(step: &'static str) -> impl Fn(JsValue) -> PlatformError {
    move |e| PlatformError::InitFailed(format!("{}: {:?}", step, e))
}

/// Tear down the mounted terminal, if any
pub fn dispose() {
    let Some(session) = SESSION.with(|s| s.borrow_mut().take()) else {
        return;
    };

    if let Some(window) = web_sys::window() {
        let _ = window.remove_event_listener_with_callback(
            "resize",
            session.resize_callback.as_ref().unchecked_ref(),
        );
    }
    session.key_subscription.dispose_listener();
    session.dispatcher.into_view().dispose();

    crate::console_log!("[terminal] disposed");
}

/// Is a terminal currently mounted?
pub fn is_mounted() -> bool {
    SESSION.with(|s| s.borrow().is_some())
}

/// Clear a halted session and prompt again
pub fn reset() {
    SESSION.with(|s| {
        if let Some(session) = s.borrow_mut().as_mut() {
            session.dispatcher.reset();
        }
    });
}

/// Find the container element, creating a full-page one if the page has none
fn mount_point(config: &TerminalConfig) -> Result<web_sys::HtmlElement, JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    if let Some(existing) = document.get_element_by_id(&config.container_id) {
        return Ok(existing.dyn_into()?);
    }

    let container = document.create_element("div")?;
    container.set_id(&config.container_id);

    // Style the container to fill the screen
    let html_container: web_sys::HtmlElement = container.dyn_into()?;
    let style = html_container.style();
    style.set_property("position", "fixed")?;
    style.set_property("top", "0")?;
    style.set_property("left", "0")?;
    style.set_property("width", "100%")?;
    style.set_property("height", "100%")?;
    style.set_property("background", &config.theme.background)?;

    document
        .body()
        .ok_or("no body")?
        .append_child(&html_container)?;

    Ok(html_container)
}

/// Load xterm-addon-web-links when the page provides it
fn load_web_links_addon(terminal: &XTerm) -> Result<(), JsValue> {
    let ctor = js_sys::Reflect::get(&js_sys::global(), &"WebLinksAddon".into())?;
    if let Some(ctor) = ctor.dyn_ref::<js_sys::Function>() {
        let addon = js_sys::Reflect::construct(ctor, &js_sys::Array::new())?;
        terminal.load_addon(&addon);
    }
    Ok(())
}

/// Convert an xterm.js `onKey` payload (`{ key, domEvent }`)
pub fn key_event_from_js(event: &JsValue) -> Result<KeyEvent, JsValue> {
    let dom_event: web_sys::KeyboardEvent =
        js_sys::Reflect::get(event, &"domEvent".into())?.unchecked_into();
    let key = js_sys::Reflect::get(event, &"key".into())?
        .as_string()
        .unwrap_or_default();

    Ok(KeyEvent {
        key,
        key_code: dom_event.key_code(),
        ctrl: dom_event.ctrl_key(),
        alt: dom_event.alt_key(),
        shift: dom_event.shift_key(),
        meta: dom_event.meta_key(),
    })
}
