//! Projection of documents: the body of a project stage.
//!
//! A [ProjectSpec] lists field paths with an inclusion (`1`) or exclusion
//! (`0`) flag. The mode is inferred from the non-`_id` entries:
//!
//! - **Inclusion**: the result holds only the listed fields, in spec order,
//!   plus `_id` unless it is excluded. Listed fields the source lacks are omitted.
//! - **Exclusion**: the result holds every field except the listed ones.
//!
//! Mixing both flags on non-`_id` fields is [ErrorKind::InvalidSpec].

use indexmap::IndexMap;
use std::fmt::Display;

use crate::collection::Document;
use crate::common::{is_path_covered_by, validate_field_path, Value, DOC_ID, FIELD_SEPARATOR};
use crate::errors::{ErrorKind, ViewError, ViewResult};

/// Projection mode inferred from a [ProjectSpec].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Inclusion,
    Exclusion,
}

/// Ordered field path to flag mapping of a project stage.
///
/// # Examples
///
/// ```rust,ignore
/// use docview::projection::{project, ProjectSpec};
///
/// let spec = ProjectSpec::new().include("name").include("price").exclude("_id");
/// let projected = project(&listing, &spec)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectSpec {
    fields: Vec<(String, bool)>,
}

impl ProjectSpec {
    pub fn new() -> Self {
        ProjectSpec { fields: Vec::new() }
    }

    /// Marks a field path as included. Repeating a path replaces its flag.
    pub fn include(self, field_name: &str) -> Self {
        self.with(field_name, true)
    }

    /// Marks a field path as excluded. Repeating a path replaces its flag.
    pub fn exclude(self, field_name: &str) -> Self {
        self.with(field_name, false)
    }

    fn with(mut self, field_name: &str, included: bool) -> Self {
        match self.fields.iter_mut().find(|(name, _)| name == field_name) {
            Some(entry) => entry.1 = included,
            None => self.fields.push((field_name.to_string(), included)),
        }
        self
    }

    pub fn fields(&self) -> &[(String, bool)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Infers the projection mode, validating every path on the way.
    ///
    /// A spec listing only `_id` takes its mode from the `_id` flag. An empty
    /// spec reports [ProjectionMode::Exclusion] (it removes nothing).
    pub fn mode(&self) -> ViewResult<ProjectionMode> {
        let mut mode = None;
        for (field_name, included) in &self.fields {
            validate_field_path(field_name)?;
            if field_name == DOC_ID {
                continue;
            }
            match mode {
                None => mode = Some(*included),
                Some(current) if current != *included => {
                    log::error!("Cannot mix inclusion and exclusion in projection {}", self);
                    return Err(ViewError::new(
                        "Cannot mix inclusion and exclusion in a projection",
                        ErrorKind::InvalidSpec,
                    ));
                }
                _ => {}
            }
        }

        let included = mode.or_else(|| self.id_flag()).unwrap_or(false);
        Ok(if included {
            ProjectionMode::Inclusion
        } else {
            ProjectionMode::Exclusion
        })
    }

    pub fn validate(&self) -> ViewResult<()> {
        self.mode().map(|_| ())
    }

    /// Field paths this spec removes from the documents flowing through it.
    ///
    /// In exclusion mode these are the listed paths. In inclusion mode the
    /// removed set is open ended, so callers check coverage with
    /// [ProjectSpec::keeps] instead.
    pub fn excluded_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, included)| !included)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Returns `true` if the field path can still be present after this projection.
    pub fn keeps(&self, field_name: &str) -> bool {
        let mode = match self.mode() {
            Ok(mode) => mode,
            Err(_) => return false,
        };
        if self.fields.is_empty() {
            return true;
        }

        let covered = |name: &str| is_path_covered_by(field_name, name);
        match mode {
            ProjectionMode::Inclusion => {
                if covered(DOC_ID) {
                    return self.id_flag() != Some(false);
                }
                // an included descendant keeps its ancestors alive
                self.fields.iter().any(|(name, included)| {
                    *included && (covered(name) || is_path_covered_by(name, field_name))
                })
            }
            ProjectionMode::Exclusion => !self
                .fields
                .iter()
                .any(|(name, included)| !*included && covered(name)),
        }
    }

    fn id_flag(&self) -> Option<bool> {
        self.fields
            .iter()
            .find(|(name, _)| name == DOC_ID)
            .map(|(_, included)| *included)
    }

    /// Parses the JSON form of a project stage body.
    ///
    /// Flags may be `1`/`0` or `true`/`false`.
    pub fn from_json(json: &serde_json::Value) -> ViewResult<ProjectSpec> {
        let object = json.as_object().ok_or_else(|| {
            log::error!("Project spec must be an object, found {}", json);
            ViewError::new("Project spec must be an object", ErrorKind::InvalidSpec)
        })?;

        let mut spec = ProjectSpec::new();
        for (field_name, flag) in object {
            let included = match flag {
                serde_json::Value::Bool(b) => *b,
                serde_json::Value::Number(n) if n.as_f64() == Some(1.0) => true,
                serde_json::Value::Number(n) if n.as_f64() == Some(0.0) => false,
                other => {
                    log::error!("Invalid projection flag {} for field {}", other, field_name);
                    return Err(ViewError::new(
                        &format!("Invalid projection flag {} for field {}", other, field_name),
                        ErrorKind::InvalidSpec,
                    ));
                }
            };
            spec = spec.with(field_name, included);
        }
        spec.validate()?;
        Ok(spec)
    }
}

impl Display for ProjectSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (name, included)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, if *included { 1 } else { 0 })?;
        }
        write!(f, "}}")
    }
}

/// Applies a projection to one document.
pub fn project(document: &Document, spec: &ProjectSpec) -> ViewResult<Document> {
    if spec.is_empty() {
        return Ok(document.clone());
    }

    match spec.mode()? {
        ProjectionMode::Inclusion => Ok(include(document, spec)),
        ProjectionMode::Exclusion => {
            let mut projected = document.clone();
            for field_name in spec.excluded_fields() {
                projected.remove(field_name)?;
            }
            Ok(projected)
        }
    }
}

fn include(document: &Document, spec: &ProjectSpec) -> Document {
    let mut tree = PathTree::default();
    if spec.id_flag().is_none() {
        tree.insert(&[DOC_ID]);
    }
    for (field_name, included) in &spec.fields {
        if *included {
            let segments: Vec<&str> = field_name.split(FIELD_SEPARATOR).collect();
            tree.insert(&segments);
        }
    }
    tree.select(document)
}

/// Included paths merged by common prefix, in first-seen order.
#[derive(Default)]
struct PathTree {
    children: IndexMap<String, PathNode>,
}

enum PathNode {
    Whole,
    Nested(PathTree),
}

impl PathTree {
    fn insert(&mut self, segments: &[&str]) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };

        if rest.is_empty() {
            self.children.insert(first.to_string(), PathNode::Whole);
            return;
        }

        let node = self
            .children
            .entry(first.to_string())
            .or_insert_with(|| PathNode::Nested(PathTree::default()));
        // an ancestor already included whole covers the nested path
        if let PathNode::Nested(subtree) = node {
            subtree.insert(rest);
        }
    }

    fn select(&self, document: &Document) -> Document {
        let mut selected = Vec::with_capacity(self.children.len());
        for (key, node) in &self.children {
            let Some(value) = document.entry(key) else {
                continue;
            };
            let value = match node {
                PathNode::Whole => Some(value.clone()),
                PathNode::Nested(subtree) => subtree.select_value(value),
            };
            if let Some(value) = value {
                selected.push((key.clone(), value));
            }
        }
        selected.into_iter().collect()
    }

    // nested selections that end up empty are omitted, like absent fields
    fn select_value(&self, value: &Value) -> Option<Value> {
        match value {
            Value::Document(doc) => {
                let selected = self.select(doc);
                (!selected.is_empty()).then_some(Value::Document(selected))
            }
            Value::Array(items) => {
                let selected: Vec<Value> = items
                    .iter()
                    .filter_map(|item| self.select_value(item))
                    .collect();
                (!selected.is_empty()).then_some(Value::Array(selected))
            }
            _ => None,
        }
    }
}
