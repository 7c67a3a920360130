use std::collections::{BTreeMap, HashSet};

use form_prober::browser::driver::{FormDriver, Locator};
use form_prober::error::DriverError;
use form_prober::signature::probe::{ElementState, PageProbe, RawInput, RawSignatureProbe, RawText};
use serde_json::Value;

// ============================================================================
// Scripted page model
// ============================================================================

/// What the mock browser currently renders.
#[derive(Debug, Clone, Default)]
pub struct PageState {
    pub url: String,
    /// Selectors that resolve to a visible element
    pub visible: HashSet<String>,
    /// Selectors that resolve to a disabled element
    pub disabled: HashSet<String>,
    /// Visible short texts returned by the inline-error scan
    pub texts: Vec<String>,
    pub signature: RawSignatureProbe,
}

impl PageState {
    pub fn new(url: &str, signature: RawSignatureProbe) -> Self {
        PageState {
            url: url.to_string(),
            signature,
            ..Default::default()
        }
    }

    pub fn at(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    pub fn showing(mut self, selector: &str) -> Self {
        self.visible.insert(selector.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.texts.push(text.to_string());
        self
    }

    pub fn with_disabled(mut self, selector: &str) -> Self {
        self.disabled.insert(selector.to_string());
        self
    }

    pub fn with_signature(mut self, signature: RawSignatureProbe) -> Self {
        self.signature = signature;
        self
    }
}

/// Field values at submit time, keyed by locator.
pub type Submitted = BTreeMap<String, String>;

type Reaction = Box<dyn Fn(&Submitted, &PageState) -> PageState>;

/// In-memory `FormDriver` whose page reacts to submit clicks with a closure.
pub struct MockDriver {
    entry: PageState,
    pub current: PageState,
    submit: Locator,
    reaction: Reaction,
    missing: HashSet<String>,
    values: Submitted,

    /// Values present at every submit click, in order
    pub submissions: Vec<Submitted>,
    /// Every (locator, value) passed to `fill`
    pub fills: Vec<(String, String)>,
    pub clears: Vec<String>,
    pub checks: Vec<String>,
    pub selects: Vec<(String, String)>,

    pub navigations: usize,
    pub closed: bool,
    pub fail_navigation: bool,
    pub fail_evaluate: bool,
}

impl MockDriver {
    /// A page at `url` whose submit click changes nothing.
    pub fn new(url: &str, signature: RawSignatureProbe) -> Self {
        let entry = PageState::new(url, signature);
        MockDriver {
            current: entry.clone(),
            entry,
            submit: Locator::new(SUBMIT),
            reaction: Box::new(|_, page| page.clone()),
            missing: HashSet::new(),
            values: BTreeMap::new(),
            submissions: vec![],
            fills: vec![],
            clears: vec![],
            checks: vec![],
            selects: vec![],
            navigations: 0,
            closed: false,
            fail_navigation: false,
            fail_evaluate: false,
        }
    }

    pub fn on_submit(mut self, reaction: impl Fn(&Submitted, &PageState) -> PageState + 'static) -> Self {
        self.reaction = Box::new(reaction);
        self
    }

    /// Replace the page every navigation lands on.
    pub fn starting_at(mut self, entry: PageState) -> Self {
        self.current = entry.clone();
        self.entry = entry;
        self
    }

    /// Make `selector` resolve to no element.
    pub fn without(mut self, selector: &str) -> Self {
        self.missing.insert(selector.to_string());
        self
    }

    /// Jump straight to a rendered state, as if a submit already happened.
    pub fn render(&mut self, page: PageState) {
        self.current = page;
    }

    pub fn filled_locators(&self) -> HashSet<String> {
        self.fills.iter().map(|(l, _)| l.clone()).collect()
    }

    fn resolve(&self, locator: &Locator) -> Result<(), DriverError> {
        if self.missing.contains(locator.as_str()) {
            return Err(DriverError::ElementNotFound {
                locator: locator.to_string(),
            });
        }
        Ok(())
    }
}

pub const SUBMIT: &str = "button[type=submit]";

impl FormDriver for MockDriver {
    fn navigate(&mut self, url: &str, _timeout_ms: u64) -> Result<(), DriverError> {
        if self.fail_navigation {
            return Err(DriverError::SessionProtocol {
                command: "navigate".into(),
                error: "net::ERR_CONNECTION_REFUSED".into(),
            });
        }
        self.navigations += 1;
        self.values.clear();
        self.current = self.entry.clone().at(url);
        Ok(())
    }

    fn fill(&mut self, locator: &Locator, value: &str) -> Result<(), DriverError> {
        self.resolve(locator)?;
        self.fills.push((locator.to_string(), value.to_string()));
        self.values.insert(locator.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&mut self, locator: &Locator) -> Result<(), DriverError> {
        self.resolve(locator)?;
        self.clears.push(locator.to_string());
        self.values.insert(locator.to_string(), String::new());
        Ok(())
    }

    fn click(&mut self, locator: &Locator) -> Result<(), DriverError> {
        self.resolve(locator)?;
        if *locator == self.submit {
            self.submissions.push(self.values.clone());
            self.current = (self.reaction)(&self.values, &self.current);
        }
        Ok(())
    }

    fn select(&mut self, locator: &Locator, label: &str) -> Result<(), DriverError> {
        self.resolve(locator)?;
        self.selects.push((locator.to_string(), label.to_string()));
        self.values.insert(locator.to_string(), label.to_string());
        Ok(())
    }

    fn check(&mut self, locator: &Locator) -> Result<(), DriverError> {
        self.resolve(locator)?;
        self.checks.push(locator.to_string());
        self.values.insert(locator.to_string(), "checked".into());
        Ok(())
    }

    fn current_url(&mut self) -> Result<String, DriverError> {
        Ok(self.current.url.clone())
    }

    fn is_visible(&mut self, locator: &Locator) -> Result<bool, DriverError> {
        Ok(self.current.visible.contains(locator.as_str()))
    }

    fn is_enabled(&mut self, locator: &Locator) -> Result<bool, DriverError> {
        self.resolve(locator)?;
        Ok(!self.current.disabled.contains(locator.as_str()))
    }

    fn evaluate(&mut self, script: &str) -> Result<Value, DriverError> {
        if self.fail_evaluate {
            return Err(DriverError::Timeout {
                command: "evaluate".into(),
                ms: 5000,
            });
        }

        if script == PageProbe::FormSignature.script() {
            return serde_json::to_value(&self.current.signature).map_err(|e| {
                DriverError::JsonSerialize {
                    context: "mock signature".into(),
                    source: e,
                }
            });
        }

        if script == PageProbe::VisibleTexts.script() {
            let texts: Vec<RawText> = self.current.texts.iter().map(|t| shown_text(t)).collect();
            return serde_json::to_value(&texts).map_err(|e| DriverError::JsonSerialize {
                context: "mock texts".into(),
                source: e,
            });
        }

        Ok(Value::Null)
    }

    fn wait(&mut self, _ms: u64) -> Result<(), DriverError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.closed = true;
        Ok(())
    }
}

// ============================================================================
// Raw probe builders
// ============================================================================

pub fn input(name: &str, input_type: &str) -> RawInput {
    RawInput {
        tag: "INPUT".into(),
        input_type: input_type.into(),
        name: name.into(),
        id: String::new(),
        placeholder: String::new(),
        max_length: -1,
        pattern: String::new(),
        input_mode: String::new(),
        autocomplete: String::new(),
        state: ElementState::shown(),
    }
}

pub fn hidden_input(name: &str, input_type: &str) -> RawInput {
    RawInput {
        state: ElementState::hidden(),
        ..input(name, input_type)
    }
}

pub fn shown_text(text: &str) -> RawText {
    RawText {
        text: text.into(),
        state: ElementState::shown(),
    }
}

pub fn hidden_text(text: &str) -> RawText {
    RawText {
        text: text.into(),
        state: ElementState::hidden(),
    }
}

/// One rendered step: the given inputs, buttons and visible texts.
pub fn step(inputs: Vec<RawInput>, buttons: &[&str], texts: &[&str]) -> RawSignatureProbe {
    RawSignatureProbe {
        inputs,
        buttons: buttons.iter().map(|b| shown_text(b)).collect(),
        texts: texts.iter().map(|t| shown_text(t)).collect(),
    }
}

/// A single-step registration form.
pub fn registration_step() -> RawSignatureProbe {
    step(
        vec![
            input("name", "text"),
            input("email", "email"),
            input("password", "password"),
            input("password_confirmation", "password"),
        ],
        &["Register"],
        &["Create your account"],
    )
}

/// The OTP step that follows a registration form.
pub fn otp_step() -> RawSignatureProbe {
    step(
        (1..=6).map(|i| input(&format!("otp{}", i), "text")).collect(),
        &["Verify"],
        &["Enter the 6-digit code sent to your email"],
    )
}
