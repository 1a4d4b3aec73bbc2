use serde::{Deserialize, Serialize};

use super::enums::TestKind;

/// A test type and the parameters printed for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDefinition {
    pub id: TestKind,
    pub name: String,
    pub parameters: Vec<Parameter>,
}

/// One reportable line of a test.
///
/// Parameters with `is_input == false` are never edited on the form; their
/// `fixed_value` is injected when the report is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub unit: String,
    pub normal_range: String,
    #[serde(default = "default_is_input")]
    pub is_input: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_value: Option<String>,
}

fn default_is_input() -> bool {
    true
}

impl Parameter {
    pub fn input(name: &str, unit: &str, normal_range: &str) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            normal_range: normal_range.into(),
            is_input: true,
            fixed_value: None,
        }
    }

    pub fn fixed(name: &str, unit: &str, normal_range: &str, value: &str) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            normal_range: normal_range.into(),
            is_input: false,
            fixed_value: Some(value.into()),
        }
    }
}

impl TestDefinition {
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Parameters the user must fill in.
    pub fn input_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.is_input)
    }

    /// Parameters whose value is injected at assembly time.
    pub fn fixed_parameters(&self) -> impl Iterator<Item = (&Parameter, &str)> {
        self.parameters
            .iter()
            .filter(|p| !p.is_input)
            .filter_map(|p| p.fixed_value.as_deref().map(|v| (p, v)))
    }
}
