//! Build-tool targets and the graph they form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{entities::render_context::RenderContext, error::DomainError};

/// One named task: an executor, its options, and the targets it runs after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSpec {
    /// Empty for command-only targets written by other tooling.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub executor: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl TargetSpec {
    pub fn new(executor: impl Into<String>) -> Self {
        Self {
            executor: executor.into(),
            options: BTreeMap::new(),
            depends_on: Vec::new(),
        }
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn depends_on(mut self, target: impl Into<String>) -> Self {
        self.depends_on.push(target.into());
        self
    }

    /// The `commands` option as strings, empty when absent.
    pub fn commands(&self) -> Vec<&str> {
        self.options
            .get("commands")
            .and_then(Value::as_array)
            .map(|cmds| cmds.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    fn instantiate(&self, ctx: &RenderContext) -> Self {
        Self {
            executor: ctx.render(&self.executor),
            options: self
                .options
                .iter()
                .map(|(k, v)| (k.clone(), render_value(v, ctx)))
                .collect(),
            depends_on: self.depends_on.iter().map(|d| ctx.render(d)).collect(),
        }
    }
}

fn render_value(value: &Value, ctx: &RenderContext) -> Value {
    match value {
        Value::String(s) => Value::String(ctx.render(s)),
        Value::Array(items) => Value::Array(items.iter().map(|v| render_value(v, ctx)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), render_value(v, ctx)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Target name → spec, ordered by name.
///
/// Invariants checked by [`validate`](Self::validate): every `dependsOn`
/// entry names a target in the graph, and the dependency relation is acyclic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetGraph(BTreeMap<String, TargetSpec>);

impl TargetGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, spec: TargetSpec) -> Option<TargetSpec> {
        self.0.insert(name.into(), spec)
    }

    pub fn with_target(mut self, name: impl Into<String>, spec: TargetSpec) -> Self {
        self.insert(name, spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TargetSpec> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TargetSpec)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Substitute `{{VAR}}` placeholders in every string of the graph.
    pub fn instantiate(&self, ctx: &RenderContext) -> Self {
        Self(
            self.0
                .iter()
                .map(|(name, spec)| (name.clone(), spec.instantiate(ctx)))
                .collect(),
        )
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        for (name, spec) in &self.0 {
            if let Some(missing) = spec.depends_on.iter().find(|d| !self.0.contains_key(*d)) {
                return Err(DomainError::DanglingDependency {
                    target: name.clone(),
                    dependency: missing.clone(),
                });
            }
        }

        if let Some(cycle) = self.find_cycle() {
            return Err(DomainError::DependencyCycle { cycle });
        }

        Ok(())
    }

    /// Depth-first search with three colors. Returns the first cycle found,
    /// with the starting target repeated at the end.
    fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        fn visit<'a>(
            graph: &'a BTreeMap<String, TargetSpec>,
            node: &'a str,
            marks: &mut BTreeMap<&'a str, Mark>,
            stack: &mut Vec<&'a str>,
        ) -> Option<Vec<String>> {
            marks.insert(node, Mark::InProgress);
            stack.push(node);

            if let Some(spec) = graph.get(node) {
                for dep in &spec.depends_on {
                    match marks.get(dep.as_str()).copied().unwrap_or(Mark::Unvisited) {
                        Mark::InProgress => {
                            let start = stack.iter().position(|n| *n == dep.as_str())?;
                            let mut cycle: Vec<String> =
                                stack[start..].iter().map(|s| s.to_string()).collect();
                            cycle.push(dep.clone());
                            return Some(cycle);
                        }
                        Mark::Unvisited if graph.contains_key(dep) => {
                            if let Some(cycle) = visit(graph, dep, marks, stack) {
                                return Some(cycle);
                            }
                        }
                        _ => {}
                    }
                }
            }

            stack.pop();
            marks.insert(node, Mark::Done);
            None
        }

        let mut marks = BTreeMap::new();
        let mut stack = Vec::new();
        for name in self.0.keys() {
            if marks.get(name.as_str()).copied().unwrap_or(Mark::Unvisited) == Mark::Unvisited {
                if let Some(cycle) = visit(&self.0, name, &mut marks, &mut stack) {
                    return Some(cycle);
                }
            }
        }
        None
    }
}

impl FromIterator<(String, TargetSpec)> for TargetGraph {
    fn from_iter<I: IntoIterator<Item = (String, TargetSpec)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
