use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reserved literal meaning "synthesize a fresh unique value at execution time".
pub const UNIQUE_SENTINEL: &str = "__UNIQUE__";
/// Reserved literal meaning "use the resolved value of the field this one depends on".
pub const SAME_AS_DEPENDENCY_SENTINEL: &str = "__SAME__";

/// A candidate input: a literal, or a marker resolved per iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CandidateValue {
    Literal(String),
    /// Fresh value per attempt, for fields whose acceptance depends on uniqueness
    Unique,
    /// Mirror the dependency's value in this iteration
    SameAsDependency,
}

impl CandidateValue {
    pub fn literal(s: &str) -> Self {
        CandidateValue::Literal(s.to_string())
    }
}

impl From<String> for CandidateValue {
    fn from(s: String) -> Self {
        match s.as_str() {
            UNIQUE_SENTINEL => CandidateValue::Unique,
            SAME_AS_DEPENDENCY_SENTINEL => CandidateValue::SameAsDependency,
            _ => CandidateValue::Literal(s),
        }
    }
}

impl From<CandidateValue> for String {
    fn from(v: CandidateValue) -> Self {
        match v {
            CandidateValue::Literal(s) => s,
            CandidateValue::Unique => UNIQUE_SENTINEL.to_string(),
            CandidateValue::SameAsDependency => SAME_AS_DEPENDENCY_SENTINEL.to_string(),
        }
    }
}

/// One (candidate, expected validity, label) entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub value: CandidateValue,
    /// Whether a well-behaved form should accept this value
    pub expected: bool,
    pub label: String,
}

impl TestCase {
    pub fn new(value: &str, expected: bool, label: &str) -> Self {
        TestCase {
            value: CandidateValue::from(value.to_string()),
            expected,
            label: label.to_string(),
        }
    }
}

/// Ordered test cases per matrix key (a value kind, or a per-field override).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestMatrix(BTreeMap<String, Vec<TestCase>>);

impl TestMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, cases: Vec<TestCase>) {
        self.0.insert(key.to_string(), cases);
    }

    pub fn cases(&self, key: &str) -> &[TestCase] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First case expected to be accepted, used as the field's default.
    pub fn first_valid(&self, key: &str) -> Option<&TestCase> {
        self.cases(key).iter().find(|c| c.expected)
    }

    /// Overlay `other` on top of `self`, key by key.
    pub fn merged(mut self, other: TestMatrix) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Built-in catalogue of curated valid / invalid values.
    pub fn default_catalogue() -> Self {
        let mut m = TestMatrix::new();

        m.insert(
            "text",
            vec![
                TestCase::new("123 Main Street, Bangalore", true, "Valid Text"),
                TestCase::new("", false, "Empty Text"),
            ],
        );

        m.insert(
            "alpha",
            vec![
                TestCase::new("John Doe", true, "Valid Name"),
                TestCase::new("Mary Ann Smith", true, "Name with Space"),
                TestCase::new("John123", false, "Alphanumeric Name"),
                TestCase::new("@John", false, "Name with Special Characters"),
                TestCase::new("", false, "Empty Name"),
            ],
        );

        m.insert(
            "numeric",
            vec![
                TestCase::new("9876543210", true, "Valid Number"),
                TestCase::new("12345", false, "Short Number"),
                TestCase::new("abcd123", false, "Alphanumeric Number"),
                TestCase::new("@123", false, "Special Characters Number"),
            ],
        );

        m.insert(
            "email",
            vec![
                TestCase::new(UNIQUE_SENTINEL, true, "Valid Email"),
                TestCase::new("invalid@", false, "Invalid Email (incomplete)"),
                TestCase::new("@test.com", false, "Invalid Email (no username)"),
                TestCase::new("invalidemail.com", false, "Invalid Email (no @)"),
                TestCase::new("", false, "Empty Email"),
            ],
        );

        m.insert(
            "password",
            vec![
                TestCase::new("Strong@123", true, "Strong Password"),
                TestCase::new("password", false, "Weak Password"),
                TestCase::new("12345", false, "Short Password"),
                TestCase::new("1234546789012345678901234567890", false, "Very Long Password"),
                TestCase::new("", false, "Empty Password"),
            ],
        );

        m.insert(
            "password_confirm",
            vec![
                TestCase::new(SAME_AS_DEPENDENCY_SENTINEL, true, "Matching Password"),
                TestCase::new("Wrong@123", false, "Non-matching Password"),
                TestCase::new("", false, "Empty Confirm Password"),
                TestCase::new("Strong@12", false, "Almost Matching Password"),
            ],
        );

        m.insert(
            "date",
            vec![
                TestCase::new("1999-01-01", true, "Valid Date"),
                TestCase::new("2050-01-01", false, "Future Date"),
                TestCase::new("15-05-2000", false, "Invalid Format Date"),
                TestCase::new("", false, "Empty Date"),
            ],
        );

        // Per-field sets, selected through `FieldSpec::matrix`

        m.insert(
            "age",
            vec![
                TestCase::new("25", true, "Valid Adult Age"),
                TestCase::new("15", false, "Underage"),
                TestCase::new("150", false, "Invalid High Age"),
                TestCase::new("-5", false, "Negative Age"),
                TestCase::new("0", false, "Zero Age"),
                TestCase::new("twenty", false, "Alphabetic Age"),
                TestCase::new("", false, "Empty Age"),
            ],
        );

        m.insert(
            "phone",
            vec![
                TestCase::new("9876543210", true, "Valid Phone"),
                TestCase::new("12345abcde", false, "Alphanumeric Phone"),
                TestCase::new("12345", false, "Short Phone"),
                TestCase::new("12345678901234567890", false, "Long Phone"),
                TestCase::new("98765-43210", false, "Phone with Special Chars"),
                TestCase::new("", false, "Empty Phone"),
            ],
        );

        m.insert(
            "dob",
            vec![
                TestCase::new("2000-05-15", true, "Valid DOB"),
                TestCase::new("2000-01-01", true, "Adult DOB"),
                TestCase::new("15-05-2000", false, "Invalid Format DOB"),
                TestCase::new("2012-01-01", false, "Underage DOB"),
                TestCase::new("1875-01-01", false, "Very Old DOB"),
                TestCase::new("2050-01-01", false, "Future DOB"),
                TestCase::new("", false, "Empty DOB"),
            ],
        );

        m.insert(
            "composite",
            vec![
                TestCase::new("123456", true, "Valid 6-digit OTP"),
                TestCase::new("123", false, "Short OTP"),
                TestCase::new("1234567", false, "Long OTP"),
                TestCase::new("abcdef", false, "Alphabetic OTP"),
                TestCase::new("a1b2c3", false, "Alphanumeric OTP"),
                TestCase::new("!@#$%^", false, "Special Characters OTP"),
                TestCase::new("", false, "Empty OTP"),
            ],
        );

        m
    }
}
