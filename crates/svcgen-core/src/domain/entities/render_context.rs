//! Variable substitution for template paths, file contents and graph
//! templates.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::domain::entities::{descriptor::ProjectDescriptor, request::ServiceRequest};

/// Variables available to templates as `{{NAME}}` placeholders.
///
/// Standard variables derived from the project name:
///
/// | Variable | Example (`billingApi`) |
/// |----------|------------------------|
/// | `PROJECT_NAME` | `billingApi` |
/// | `PROJECT_NAME_SNAKE` | `billing_api` |
/// | `PROJECT_NAME_KEBAB` | `billing-api` |
/// | `PROJECT_NAME_PASCAL` | `BillingApi` |
/// | `YEAR` | current year |
///
/// Single-brace tokens such as `{projectRoot}` belong to the build tool and
/// are never touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    project_name: String,
    variables: BTreeMap<String, String>,
}

impl RenderContext {
    pub fn new(project_name: impl Into<String>) -> Self {
        let name = project_name.into();
        let mut vars = BTreeMap::new();

        vars.insert("PROJECT_NAME".to_string(), name.clone());
        vars.insert("PROJECT_NAME_SNAKE".to_string(), to_snake_case(&name));
        vars.insert("PROJECT_NAME_KEBAB".to_string(), to_kebab_case(&name));
        vars.insert("PROJECT_NAME_PASCAL".to_string(), to_pascal_case(&name));
        vars.insert("YEAR".to_string(), chrono::Utc::now().year().to_string());

        Self {
            project_name: name,
            variables: vars,
        }
    }

    /// Context handed to the materializer for a registered project.
    ///
    /// Request fields are added first so the computed variables always win.
    pub fn for_project(request: &ServiceRequest, descriptor: &ProjectDescriptor) -> Self {
        let mut ctx = Self::new(request.name.as_str());
        for (key, value) in &request.fields {
            if !ctx.variables.contains_key(key) {
                ctx.variables.insert(key.clone(), value.clone());
            }
        }
        ctx.with_variable("VARIANT", request.variant.as_str())
            .with_variable("PROJECT_KIND", descriptor.kind.as_str())
            .with_variable("PROJECT_ROOT", descriptor.root.as_str())
            .with_variable("SOURCE_ROOT", descriptor.source_root.as_str())
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace every `{{KEY}}` with its value. Unknown placeholders stay as-is.
    ///
    /// One left-to-right pass over `template`: substituted values are copied
    /// verbatim and never scanned for placeholders themselves.
    pub fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            let value = tail[2..]
                .find("}}")
                .and_then(|close| self.get(&tail[2..2 + close]).map(|v| (v, close)));
            match value {
                Some((value, close)) => {
                    out.push_str(value);
                    rest = &tail[close + 4..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }

        out.push_str(rest);
        out
    }
}

fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

fn to_kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

fn to_pascal_case(s: &str) -> String {
    split_words(s)
        .into_iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// Split on `_`, `-`, whitespace, camelCase transitions and acronym
/// boundaries (`HTTPServer` → `http`, `server`).
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' || c == '-' || c == '.' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        if let Some(&next) = chars.peek() {
            let lower_to_upper = (c.is_lowercase() || c.is_ascii_digit()) && next.is_uppercase();
            let acronym_end = c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(char::is_lowercase);
            if lower_to_upper || acronym_end {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}
