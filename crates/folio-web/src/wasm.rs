#![forbid(unsafe_code)]

use folio_core::{
    HostCommand, HostError, KeyInput, KeyPhase, MessageKind, Modifiers, PageEvent, PageHost,
    Target, normalize_dom_key_code,
};
use folio_page::{LazyImageAttrs, Page, PageConfig, PageSnapshot};
use folio_viewer::MediaEntryAttrs;
use js_sys::{Array, JSON, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Document, Element, HtmlElement, HtmlFormElement, IntersectionObserver, Window};

use crate::markup;

/// Portfolio page controller bound to the live document.
///
/// JS glue owns the DOM listeners: it installs one per name returned by
/// `start()` and forwards each event to `input()`. Deferred images are watched
/// by an `IntersectionObserver` the glue passes in as `options.observer`; the
/// page unobserves each image once it has loaded.
#[wasm_bindgen]
pub struct FolioWeb {
    page: Page,
    host: DomHost,
    started: bool,
}

#[wasm_bindgen]
impl FolioWeb {
    /// Scan the document and build the page. `options` is a [`PageConfig`]
    /// object; unknown keys are ignored.
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<JsValue>) -> Result<FolioWeb, JsValue> {
        let config = parse_config(options.as_ref())?;
        let observer = options
            .as_ref()
            .and_then(|o| Reflect::get(o, &JsValue::from_str("observer")).ok())
            .and_then(|v| v.dyn_into::<IntersectionObserver>().ok());

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let (host, snapshot) = DomHost::scan(window, document, observer)?;
        let page = Page::new(config, &snapshot);
        Ok(Self {
            page,
            host,
            started: false,
        })
    }

    /// Run startup (year placeholder) and return the event kinds to listen
    /// for. Later calls only return the kinds.
    pub fn start(&mut self, year: i32) -> Array {
        if !self.started {
            self.page.start(year, &mut self.host);
            self.started = true;
        }
        self.page
            .listeners()
            .names()
            .into_iter()
            .map(JsValue::from_str)
            .collect()
    }

    /// Forward a DOM-derived event. Returns whether the page handled it, so
    /// glue can `preventDefault()`.
    pub fn input(&mut self, event: JsValue) -> Result<bool, JsValue> {
        let event = parse_page_event(&event)?;
        Ok(self.page.handle(event, &mut self.host))
    }

    #[wasm_bindgen(js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.page.viewer().is_open()
    }

    /// Close anything open and drop DOM references.
    pub fn destroy(&mut self) {
        self.page.teardown(&mut self.host);
        self.host.release();
    }
}

fn parse_config(options: Option<&JsValue>) -> Result<PageConfig, JsValue> {
    let Some(options) = options.filter(|o| o.is_object()) else {
        return Ok(PageConfig::default());
    };
    let json: String = JSON::stringify(options)?.into();
    PageConfig::from_json_str(&json).map_err(|e| JsValue::from_str(&e.to_string()))
}

// ---- DOM host ----

struct DomHost {
    window: Window,
    document: Document,
    lightbox: Option<Element>,
    content: Option<Element>,
    nav_toggle: Option<Element>,
    nav_menu: Option<Element>,
    form: Option<HtmlFormElement>,
    status: Option<Element>,
    year: Option<Element>,
    media: Vec<Element>,
    lazy: Vec<Element>,
    observer: Option<IntersectionObserver>,
}

impl DomHost {
    fn scan(
        window: Window,
        document: Document,
        observer: Option<IntersectionObserver>,
    ) -> Result<(Self, PageSnapshot), JsValue> {
        let media = query_all(&document, markup::MEDIA_ENTRY)?;
        let lazy = query_all(&document, markup::LAZY_IMAGE)?;
        let lightbox = document.query_selector(markup::LIGHTBOX)?;
        let content = match &lightbox {
            Some(lb) => lb.query_selector(markup::LIGHTBOX_CONTENT)?,
            None => None,
        };
        let form = document
            .query_selector(markup::CONTACT_FORM)?
            .and_then(|f| f.dyn_into::<HtmlFormElement>().ok());
        let status = match &form {
            Some(f) => f.query_selector(markup::FORM_STATUS)?,
            None => None,
        };

        let snapshot = PageSnapshot {
            media: media
                .iter()
                .map(|el| MediaEntryAttrs {
                    kind: el.get_attribute(markup::MEDIA_TYPE_ATTR),
                    src: el.get_attribute(markup::MEDIA_SRC_ATTR),
                    title: el
                        .get_attribute(markup::MEDIA_TITLE_ATTR)
                        .or_else(|| el.get_attribute("title")),
                })
                .collect(),
            lazy_images: lazy
                .iter()
                .map(|el| LazyImageAttrs {
                    data_src: el.get_attribute(markup::LAZY_SRC_ATTR),
                })
                .collect(),
            has_year: document.query_selector(markup::YEAR)?.is_some(),
        };

        let host = Self {
            lightbox,
            content,
            nav_toggle: document.query_selector(markup::NAV_TOGGLE)?,
            nav_menu: document.query_selector(markup::NAV_MENU)?,
            form,
            status,
            year: document.query_selector(markup::YEAR)?,
            media,
            lazy,
            observer,
            window,
            document,
        };
        Ok((host, snapshot))
    }

    fn release(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
        self.media.clear();
        self.lazy.clear();
        self.lightbox = None;
        self.content = None;
        self.nav_toggle = None;
        self.nav_menu = None;
        self.form = None;
        self.status = None;
        self.year = None;
    }

    fn focus(&self, target: Target) -> Result<(), HostError> {
        let element = match target {
            Target::MediaEntry { index } => self.media.get(index).cloned(),
            other => match markup::control_selector(other) {
                Some(selector) => self.document.query_selector(selector).map_err(js_err)?,
                None => None,
            },
        };
        let element = element.ok_or(HostError::MissingElement("focus target"))?;
        element
            .dyn_ref::<HtmlElement>()
            .ok_or(HostError::Unsupported("focus on non-HTML element"))?
            .focus()
            .map_err(js_err)
    }

    fn copy_to_clipboard(&self, text: &str) {
        let promise = self.window.navigator().clipboard().write_text(text);
        spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                tracing::debug!(error = ?err, "clipboard write rejected");
            }
        });
    }
}

impl PageHost for DomHost {
    fn apply(&mut self, command: HostCommand) -> Result<(), HostError> {
        match command {
            HostCommand::MountSurface { html } => {
                required(&self.content, "lightbox content")?.set_inner_html(&html);
            }
            HostCommand::ClearSurface => {
                required(&self.content, "lightbox content")?.set_inner_html("");
            }
            HostCommand::ShowSurface => {
                let lightbox = required(&self.lightbox, "lightbox")?;
                lightbox.class_list().add_1(markup::OPEN_CLASS).map_err(js_err)?;
                lightbox.set_attribute("aria-hidden", "false").map_err(js_err)?;
            }
            HostCommand::HideSurface => {
                let lightbox = required(&self.lightbox, "lightbox")?;
                lightbox.class_list().remove_1(markup::OPEN_CLASS).map_err(js_err)?;
                lightbox.set_attribute("aria-hidden", "true").map_err(js_err)?;
            }
            HostCommand::LockScroll => {
                let body = self.document.body().ok_or(HostError::MissingElement("body"))?;
                body.style().set_property("overflow", "hidden").map_err(js_err)?;
            }
            HostCommand::UnlockScroll => {
                let body = self.document.body().ok_or(HostError::MissingElement("body"))?;
                body.style().remove_property("overflow").map_err(js_err)?;
            }
            HostCommand::Focus { target } => self.focus(target)?,
            HostCommand::SetNavExpanded { expanded } => {
                required(&self.nav_toggle, "nav toggle")?
                    .set_attribute("aria-expanded", if expanded { "true" } else { "false" })
                    .map_err(js_err)?;
                if let Some(menu) = &self.nav_menu {
                    menu.class_list()
                        .toggle_with_force(markup::OPEN_CLASS, expanded)
                        .map_err(js_err)?;
                }
            }
            HostCommand::ShowFormMessage { kind, text } => {
                let status = required(&self.status, "form status")?;
                let (add, remove) = match kind {
                    MessageKind::Error => (markup::ERROR_CLASS, markup::SUCCESS_CLASS),
                    MessageKind::Success => (markup::SUCCESS_CLASS, markup::ERROR_CLASS),
                };
                status.class_list().remove_1(remove).map_err(js_err)?;
                status.class_list().add_1(add).map_err(js_err)?;
                status.set_text_content(Some(&text));
            }
            HostCommand::ClearFormMessage => {
                if let Some(status) = &self.status {
                    status
                        .class_list()
                        .remove_2(markup::ERROR_CLASS, markup::SUCCESS_CLASS)
                        .map_err(js_err)?;
                    status.set_text_content(None);
                }
            }
            HostCommand::ResetForm => {
                self.form
                    .as_ref()
                    .ok_or(HostError::MissingElement("contact form"))?
                    .reset();
            }
            HostCommand::CopyToClipboard { text } => self.copy_to_clipboard(&text),
            HostCommand::OpenMail { href } => {
                self.window.location().set_href(&href).map_err(js_err)?;
            }
            HostCommand::LoadImage { index, src } => {
                let img = self
                    .lazy
                    .get(index)
                    .ok_or(HostError::MissingElement("lazy image"))?;
                img.set_attribute("src", &src).map_err(js_err)?;
                img.remove_attribute(markup::LAZY_SRC_ATTR).map_err(js_err)?;
            }
            HostCommand::UnobserveImage { index } => {
                if let (Some(observer), Some(img)) = (&self.observer, self.lazy.get(index)) {
                    observer.unobserve(img);
                }
            }
            HostCommand::SetYear { year } => {
                required(&self.year, "year placeholder")?.set_text_content(Some(&year.to_string()));
            }
        }
        Ok(())
    }
}

fn required<'a>(
    element: &'a Option<Element>,
    what: &'static str,
) -> Result<&'a Element, HostError> {
    element.as_ref().ok_or(HostError::MissingElement(what))
}

fn js_err(err: JsValue) -> HostError {
    HostError::Rejected(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

fn query_all(document: &Document, selector: &str) -> Result<Vec<Element>, JsValue> {
    let list = document.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

// ---- JS event parsing ----

fn parse_page_event(event: &JsValue) -> Result<PageEvent, JsValue> {
    let kind = get_string(event, "kind")?;
    match kind.as_str() {
        "key" => parse_key_event(event),
        "activate" => Ok(PageEvent::Activate {
            target: parse_target_field(event)?.unwrap_or(Target::Other),
        }),
        "submit" => parse_submit_event(event),
        "proximity" => parse_proximity_event(event),
        other => Err(JsValue::from_str(&format!("unknown input kind: {other}"))),
    }
}

fn parse_key_event(event: &JsValue) -> Result<PageEvent, JsValue> {
    let phase = match get_string_opt(event, "phase")?.as_deref() {
        None | Some("down" | "keydown") => KeyPhase::Down,
        Some("up" | "keyup") => KeyPhase::Up,
        Some(other) => return Err(JsValue::from_str(&format!("invalid key phase: {other}"))),
    };
    let dom_key = get_string(event, "key")?;
    let dom_code = get_string_opt(event, "code")?.unwrap_or_default();
    let repeat = get_bool(event, "repeat")?.unwrap_or(false);
    let mods = parse_mods(event)?;
    let code = normalize_dom_key_code(&dom_key, &dom_code, mods);

    Ok(PageEvent::Key {
        key: KeyInput {
            phase,
            code,
            mods,
            repeat,
        },
        target: parse_target_field(event)?,
    })
}

fn parse_submit_event(event: &JsValue) -> Result<PageEvent, JsValue> {
    let fields_val = Reflect::get(event, &JsValue::from_str("fields"))?;
    if !fields_val.is_object() {
        return Err(JsValue::from_str("submit event missing fields object"));
    }
    let mut fields = std::collections::BTreeMap::new();
    for entry in Object::entries(fields_val.unchecked_ref::<Object>()).iter() {
        let pair = Array::from(&entry);
        let Some(name) = pair.get(0).as_string() else {
            continue;
        };
        fields.insert(name, pair.get(1).as_string().unwrap_or_default());
    }
    Ok(PageEvent::Submit { fields })
}

fn parse_proximity_event(event: &JsValue) -> Result<PageEvent, JsValue> {
    let image = get_index(event, "image")?
        .ok_or_else(|| JsValue::from_str("proximity event missing image index"))?;
    let distance = get_number(event, "distance")?
        .ok_or_else(|| JsValue::from_str("proximity event missing distance"))?;
    // Negative distances mean the image is already inside the viewport.
    let distance_px = distance.max(0.0).round() as u32;
    Ok(PageEvent::Proximity { image, distance_px })
}

fn parse_target_field(event: &JsValue) -> Result<Option<Target>, JsValue> {
    let Some(name) = get_string_opt(event, "target")? else {
        return Ok(None);
    };
    let index = get_index(event, "index")?;
    Ok(Some(markup::parse_target(&name, index)))
}

fn parse_mods(event: &JsValue) -> Result<Modifiers, JsValue> {
    // Compact encoding: `mods: number` bitset.
    if let Some(n) = get_number(event, "mods")? {
        let bits = u8::try_from(number_to_i64_exact(n, "mods")?)
            .map_err(|_| JsValue::from_str("mods out of range (expected 0..=255)"))?;
        return Ok(Modifiers::from_bits_truncate_u8(bits));
    }

    // Fallback: DOM-like boolean flags.
    let mut mods = Modifiers::empty();
    if get_bool_any(event, &["shift", "shiftKey"])? {
        mods |= Modifiers::SHIFT;
    }
    if get_bool_any(event, &["ctrl", "ctrlKey"])? {
        mods |= Modifiers::CTRL;
    }
    if get_bool_any(event, &["alt", "altKey"])? {
        mods |= Modifiers::ALT;
    }
    if get_bool_any(event, &["meta", "metaKey", "super"])? {
        mods |= Modifiers::SUPER;
    }
    Ok(mods)
}

fn get_string(obj: &JsValue, key: &str) -> Result<String, JsValue> {
    get_string_opt(obj, key)?
        .ok_or_else(|| JsValue::from_str(&format!("missing required string field: {key}")))
}

fn get_string_opt(obj: &JsValue, key: &str) -> Result<Option<String>, JsValue> {
    let v = Reflect::get(obj, &JsValue::from_str(key))?;
    if v.is_null() || v.is_undefined() {
        return Ok(None);
    }
    v.as_string()
        .map(Some)
        .ok_or_else(|| JsValue::from_str(&format!("field {key} must be a string")))
}

fn get_bool(obj: &JsValue, key: &str) -> Result<Option<bool>, JsValue> {
    let v = Reflect::get(obj, &JsValue::from_str(key))?;
    if v.is_null() || v.is_undefined() {
        return Ok(None);
    }
    Ok(Some(v.as_bool().ok_or_else(|| {
        JsValue::from_str(&format!("field {key} must be a boolean"))
    })?))
}

fn get_bool_any(obj: &JsValue, keys: &[&str]) -> Result<bool, JsValue> {
    for key in keys {
        if let Some(v) = get_bool(obj, key)? {
            return Ok(v);
        }
    }
    Ok(false)
}

fn get_number(obj: &JsValue, key: &str) -> Result<Option<f64>, JsValue> {
    let v = Reflect::get(obj, &JsValue::from_str(key))?;
    if v.is_null() || v.is_undefined() {
        return Ok(None);
    }
    v.as_f64()
        .map(Some)
        .ok_or_else(|| JsValue::from_str(&format!("field {key} must be a number")))
}

fn get_index(obj: &JsValue, key: &str) -> Result<Option<usize>, JsValue> {
    let Some(n) = get_number(obj, key)? else {
        return Ok(None);
    };
    let n = number_to_i64_exact(n, key)?;
    usize::try_from(n)
        .map(Some)
        .map_err(|_| JsValue::from_str(&format!("field {key} must not be negative")))
}

fn number_to_i64_exact(n: f64, key: &str) -> Result<i64, JsValue> {
    if !n.is_finite() || n.fract() != 0.0 {
        return Err(JsValue::from_str(&format!("field {key} must be an integer")));
    }
    if n < i64::MIN as f64 || n > i64::MAX as f64 {
        return Err(JsValue::from_str(&format!("field {key} out of range")));
    }
    Ok(n as i64)
}
