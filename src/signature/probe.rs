use serde::{Deserialize, Serialize};

// ============================================================================
// In-page inspection scripts
// ============================================================================
//
// The scripts only collect. Filtering (interactable predicate, length
// ceilings, dedup, keyword flags) happens in Rust on the returned schema.

/// Read-only probes the prober evaluates in the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageProbe {
    /// Inputs, buttons and short text nodes for fingerprinting the form step
    FormSignature,
    /// Text of `p, span, div, small, label` nodes for inline validation errors
    VisibleTexts,
}

impl PageProbe {
    pub fn script(&self) -> &'static str {
        match self {
            PageProbe::FormSignature => SIGNATURE_SCRIPT,
            PageProbe::VisibleTexts => VISIBLE_TEXTS_SCRIPT,
        }
    }
}

const SIGNATURE_SCRIPT: &str = r#"() => {
  const state = (el) => {
    const s = window.getComputedStyle(el);
    const r = el.getBoundingClientRect();
    return {
      visible: s.display !== 'none' && s.visibility !== 'hidden' && s.opacity !== '0',
      disabled: !!el.disabled,
      width: r.width,
      height: r.height,
      ariaHidden: el.hasAttribute('aria-hidden'),
      tabIndex: el.tabIndex,
    };
  };
  const inputs = Array.from(document.querySelectorAll('input, select, textarea')).map(el => ({
    tag: el.tagName,
    type: el.type || '',
    name: el.name || '',
    id: el.id || '',
    placeholder: el.placeholder || '',
    maxLength: typeof el.maxLength === 'number' ? el.maxLength : -1,
    pattern: el.pattern || '',
    inputMode: el.getAttribute('inputmode') || '',
    autocomplete: el.autocomplete || '',
    ...state(el),
  }));
  const buttons = Array.from(document.querySelectorAll('button')).map(el => ({
    text: el.innerText || '',
    ...state(el),
  }));
  const texts = Array.from(document.querySelectorAll('h1, h2, h3, h4, h5, h6, label, p, span, div'))
    .map(el => ({ text: el.innerText || '', ...state(el) }));
  return { inputs, buttons, texts };
}"#;

const VISIBLE_TEXTS_SCRIPT: &str = r#"() => {
  return Array.from(document.querySelectorAll('p, span, div, small, label')).map(el => {
    const s = window.getComputedStyle(el);
    const r = el.getBoundingClientRect();
    return {
      text: el.innerText || '',
      visible: s.display !== 'none' && s.visibility !== 'hidden' && s.opacity !== '0',
      disabled: false,
      width: r.width,
      height: r.height,
      ariaHidden: el.hasAttribute('aria-hidden'),
      tabIndex: el.tabIndex,
    };
  });
}"#;

// ============================================================================
// Raw probe output schema
// ============================================================================

/// Rendering state shared by every probed element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementState {
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub aria_hidden: bool,
    #[serde(default)]
    pub tab_index: i32,
}

impl ElementState {
    /// A plainly rendered, enabled element.
    pub fn shown() -> Self {
        ElementState {
            visible: true,
            disabled: false,
            width: 120.0,
            height: 24.0,
            aria_hidden: false,
            tab_index: 0,
        }
    }

    /// A hidden element (e.g. an inactive step kept in the DOM).
    pub fn hidden() -> Self {
        ElementState {
            visible: false,
            width: 0.0,
            height: 0.0,
            ..Self::shown()
        }
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Visible, enabled, non-zero size, not `aria-hidden`, not tab-excluded.
    pub fn is_interactable(&self) -> bool {
        self.visible
            && !self.disabled
            && self.has_area()
            && !self.aria_hidden
            && self.tab_index != -1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInput {
    pub tag: String,
    #[serde(rename = "type", default)]
    pub input_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default = "no_max_length")]
    pub max_length: i64,
    #[serde(default)]
    pub pattern: String,
    #[serde(default)]
    pub input_mode: String,
    #[serde(default)]
    pub autocomplete: String,
    #[serde(flatten)]
    pub state: ElementState,
}

fn no_max_length() -> i64 {
    -1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawText {
    #[serde(default)]
    pub text: String,
    #[serde(flatten)]
    pub state: ElementState,
}

/// Output of `PageProbe::FormSignature`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSignatureProbe {
    #[serde(default)]
    pub inputs: Vec<RawInput>,
    #[serde(default)]
    pub buttons: Vec<RawText>,
    #[serde(default)]
    pub texts: Vec<RawText>,
}
