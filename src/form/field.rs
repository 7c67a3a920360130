use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::browser::driver::Locator;
use crate::error::ConfigError;

/// Value kind of a logical field. Picks the fill strategy and the default matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Text,
    Alpha,
    Numeric,
    Email,
    Password,
    PasswordConfirm,
    Date,
    Radio,
    Select,
    /// Multi-slot input such as one box per OTP digit
    Composite,
}

impl ValueKind {
    pub fn key(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Alpha => "alpha",
            ValueKind::Numeric => "numeric",
            ValueKind::Email => "email",
            ValueKind::Password => "password",
            ValueKind::PasswordConfirm => "password_confirm",
            ValueKind::Date => "date",
            ValueKind::Radio => "radio",
            ValueKind::Select => "select",
            ValueKind::Composite => "composite",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Declarative description of one logical form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,

    /// Element locator; unused for composite fields, which use `slots`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<Locator>,

    pub kind: ValueKind,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Field whose resolved value this one mirrors (e.g. confirm password)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,

    /// Known-valid value used while other fields are under test
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Matrix key to test with, when it differs from `kind`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<String>,

    /// Radio option values
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    /// Per-character slots of a composite field, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<Locator>,
}

fn default_true() -> bool {
    true
}

impl FieldSpec {
    pub fn new(name: &str, locator: &str, kind: ValueKind) -> Self {
        FieldSpec {
            name: name.to_string(),
            locator: Some(Locator::new(locator)),
            kind,
            enabled: true,
            depends_on: None,
            default: None,
            matrix: None,
            options: vec![],
            slots: vec![],
        }
    }

    pub fn composite(name: &str, slots: &[&str]) -> Self {
        FieldSpec {
            locator: None,
            slots: slots.iter().map(|s| Locator::new(*s)).collect(),
            ..FieldSpec::new(name, "", ValueKind::Composite)
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn depends_on(mut self, target: &str) -> Self {
        self.depends_on = Some(target.to_string());
        self
    }

    pub fn with_default(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }

    /// Test with the cases under `key` instead of the kind's own.
    pub fn with_matrix(mut self, key: &str) -> Self {
        self.matrix = Some(key.to_string());
        self
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }

    pub fn matrix_key(&self) -> &str {
        self.matrix.as_deref().unwrap_or(self.kind.key())
    }
}

// ============================================================================
// FieldRegistry: validated, dependency-ordered field set
// ============================================================================

#[derive(Debug, Clone)]
pub struct FieldRegistry {
    fields: Vec<FieldSpec>,
    /// Indices of enabled fields, dependencies before dependents
    fill_order: Vec<usize>,
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

impl FieldRegistry {
    /// Validate the field set and compute its fill order.
    ///
    /// Rejects duplicate names, unknown or disabled dependency targets,
    /// missing locators and dependency cycles.
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, ConfigError> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        for (i, field) in fields.iter().enumerate() {
            if index.insert(field.name.as_str(), i).is_some() {
                return Err(ConfigError::DuplicateField(field.name.clone()));
            }
        }

        let mut deps: Vec<Option<usize>> = Vec::with_capacity(fields.len());
        for field in &fields {
            match field.kind {
                ValueKind::Composite if field.slots.is_empty() => {
                    return Err(ConfigError::EmptySlots(field.name.clone()));
                }
                ValueKind::Composite => {}
                _ if field.locator.is_none() => {
                    return Err(ConfigError::MissingLocator(field.name.clone()));
                }
                _ => {}
            }

            let dep = match &field.depends_on {
                None => None,
                Some(target) => {
                    let &t = index.get(target.as_str()).ok_or_else(|| {
                        ConfigError::UnknownDependency {
                            field: field.name.clone(),
                            target: target.clone(),
                        }
                    })?;
                    if field.enabled && !fields[t].enabled {
                        return Err(ConfigError::DisabledDependency {
                            field: field.name.clone(),
                            target: target.clone(),
                        });
                    }
                    Some(t)
                }
            };
            deps.push(dep);
        }

        let mut marks = vec![Mark::Unvisited; fields.len()];
        let mut order = Vec::with_capacity(fields.len());
        for start in 0..fields.len() {
            visit(start, &deps, &fields, &mut marks, &mut order)?;
        }

        let fill_order = order.into_iter().filter(|&i| fields[i].enabled).collect();

        Ok(FieldRegistry { fields, fill_order })
    }

    /// All fields in configuration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn enabled(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.enabled)
    }

    pub fn disabled(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| !f.enabled)
    }

    /// Reject filter names that match no configured field.
    pub fn check_filter(&self, filter: &[String]) -> Result<(), ConfigError> {
        match filter.iter().find(|name| self.get(name).is_none()) {
            Some(unknown) => Err(ConfigError::UnknownField(unknown.clone())),
            None => Ok(()),
        }
    }

    /// Enabled fields, each after the field it depends on.
    pub fn fill_order(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fill_order.iter().map(|&i| &self.fields[i])
    }
}

/// Depth-first post-order walk along `depends_on` edges.
fn visit(
    i: usize,
    deps: &[Option<usize>],
    fields: &[FieldSpec],
    marks: &mut [Mark],
    order: &mut Vec<usize>,
) -> Result<(), ConfigError> {
    match marks[i] {
        Mark::Done => return Ok(()),
        Mark::InProgress => {
            // Walk the chain again to report the cycle members
            let mut cycle = vec![fields[i].name.clone()];
            let mut cur = deps[i];
            while let Some(c) = cur {
                cycle.push(fields[c].name.clone());
                if c == i {
                    break;
                }
                cur = deps[c];
            }
            return Err(ConfigError::DependencyCycle(cycle));
        }
        Mark::Unvisited => {}
    }

    marks[i] = Mark::InProgress;
    if let Some(d) = deps[i] {
        visit(d, deps, fields, marks, order)?;
    }
    marks[i] = Mark::Done;
    order.push(i);
    Ok(())
}
