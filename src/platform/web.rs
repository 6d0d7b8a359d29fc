//! Browser Platform Implementation
//!
//! Direct wasm_bindgen bindings to xterm.js loaded via script tag, and the
//! [`TerminalView`] built on them:
//! - xterm.js `Terminal` for rendering and scrollback
//! - `FitAddon` for resizing to the container
//! - Blob + object URL + anchor click for file downloads

use super::{PlatformError, PlatformResult, TerminalView};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

// Direct bindings to xterm.js globals (loaded via script tag)
#[wasm_bindgen]
extern "C" {
    /// The xterm.js Terminal class (global `Terminal`)
    #[wasm_bindgen(js_name = Terminal)]
    pub type XTerm;

    #[wasm_bindgen(constructor, js_class = "Terminal", catch)]
    pub fn new(options: &JsValue) -> Result<XTerm, JsValue>;

    #[wasm_bindgen(method)]
    pub fn open(this: &XTerm, element: &web_sys::HtmlElement);

    #[wasm_bindgen(method)]
    pub fn write(this: &XTerm, data: &str);

    #[wasm_bindgen(method)]
    pub fn writeln(this: &XTerm, data: &str);

    #[wasm_bindgen(method)]
    pub fn clear(this: &XTerm);

    #[wasm_bindgen(method)]
    pub fn focus(this: &XTerm);

    #[wasm_bindgen(method)]
    pub fn dispose(this: &XTerm);

    #[wasm_bindgen(method, js_name = loadAddon)]
    pub fn load_addon(this: &XTerm, addon: &JsValue);

    #[wasm_bindgen(method, js_name = onKey)]
    pub fn on_key(this: &XTerm, callback: &js_sys::Function) -> XTermDisposable;

    #[wasm_bindgen(method, getter)]
    pub fn buffer(this: &XTerm) -> XTermBufferNamespace;

    /// `terminal.buffer`
    pub type XTermBufferNamespace;

    #[wasm_bindgen(method, getter)]
    pub fn active(this: &XTermBufferNamespace) -> XTermBuffer;

    /// `terminal.buffer.active`
    pub type XTermBuffer;

    #[wasm_bindgen(method, getter)]
    pub fn length(this: &XTermBuffer) -> u32;

    #[wasm_bindgen(method, js_name = getLine)]
    pub fn get_line(this: &XTermBuffer, y: u32) -> Option<XTermBufferLine>;

    pub type XTermBufferLine;

    #[wasm_bindgen(method, js_name = translateToString)]
    pub fn translate_to_string(this: &XTermBufferLine, trim_right: bool) -> String;

    /// Handle returned by xterm.js event subscriptions
    pub type XTermDisposable;

    #[wasm_bindgen(method, js_name = dispose)]
    pub fn dispose_listener(this: &XTermDisposable);

    /// The xterm-addon-fit FitAddon class (global `FitAddon`)
    #[wasm_bindgen(js_name = FitAddon)]
    pub type XTermFitAddon;

    #[wasm_bindgen(constructor, js_class = "FitAddon", catch)]
    pub fn new_fit() -> Result<XTermFitAddon, JsValue>;

    #[wasm_bindgen(method)]
    pub fn fit(this: &XTermFitAddon);
}

/// Terminal view over an xterm.js instance
pub struct XTermView {
    term: XTerm,
    fit_addon: XTermFitAddon,
}

impl XTermView {
    pub fn new(term: XTerm, fit_addon: XTermFitAddon) -> Self {
        Self { term, fit_addon }
    }

    pub fn xterm(&self) -> &XTerm {
        &self.term
    }

    pub fn fit_addon(&self) -> &XTermFitAddon {
        &self.fit_addon
    }

    /// Release the widget. The view is unusable afterwards.
    pub fn dispose(self) {
        self.term.dispose();
    }
}

impl TerminalView for XTermView {
    fn write(&mut self, text: &str) {
        self.term.write(text);
    }

    fn writeln(&mut self, text: &str) {
        // xterm.js does not translate bare \n, so break lines ourselves
        for line in text.split('\n') {
            self.term.writeln(line);
        }
    }

    fn clear(&mut self) {
        self.term.clear();
    }

    fn fit(&mut self) {
        self.fit_addon.fit();
    }

    fn line_count(&self) -> usize {
        self.term.buffer().active().length() as usize
    }

    fn line(&self, index: usize) -> Option<String> {
        self.term
            .buffer()
            .active()
            .get_line(index as u32)
            .map(|line| line.translate_to_string(true))
    }

    fn save_file(&mut self, name: &str, mime: &str, contents: &str) -> PlatformResult<()> {
        download_text(name, mime, contents)
            .map_err(|e| PlatformError::Io(format!("Failed to save {}: {:?}", name, e)))
    }
}

impl From<PlatformError> for JsValue {
    fn from(err: PlatformError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Offer `contents` as a browser download named `name`
fn download_text(name: &str, mime: &str, contents: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let body = document.body().ok_or("no body")?;

    let parts = js_sys::Array::of1(&JsValue::from_str(contents));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(mime);
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let anchor: web_sys::HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(name);

    body.append_child(&anchor)?;
    anchor.click();
    body.remove_child(&anchor)?;

    web_sys::Url::revoke_object_url(&url)
}
