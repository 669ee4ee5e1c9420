use std::fmt::Display;

use crate::errors::{ErrorKind, ViewError, ViewResult};
use crate::pipeline::PipelineDefinition;

/// What a view is: its name, the collection it reads and the pipeline it runs.
///
/// The JSON form mirrors a `createView(name, source, pipeline)` call:
///
/// ```json
/// {
///   "name": "topRatedApartments",
///   "source": "listingsAndReviews",
///   "pipeline": [
///     { "$match": { "property_type": "Apartment", "accommodates": { "$gt": 4 } } },
///     { "$project": { "_id": 0, "name": 1, "price": 1 } },
///     { "$sort": { "price": -1 } }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ViewDefinition {
    name: String,
    source: String,
    pipeline: PipelineDefinition,
}

impl ViewDefinition {
    /// Creates a definition. The view and source names must not be empty.
    pub fn new(name: &str, source: &str, pipeline: PipelineDefinition) -> ViewResult<Self> {
        if name.is_empty() {
            log::error!("View name cannot be empty");
            return Err(ViewError::new("View name cannot be empty", ErrorKind::InvalidSpec));
        }
        if source.is_empty() {
            log::error!("Source collection of view {} cannot be empty", name);
            return Err(ViewError::new(
                &format!("Source collection of view {} cannot be empty", name),
                ErrorKind::InvalidSpec,
            ));
        }

        Ok(ViewDefinition {
            name: name.to_string(),
            source: source.to_string(),
            pipeline,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn pipeline(&self) -> &PipelineDefinition {
        &self.pipeline
    }

    /// Parses `{"name": .., "source": .., "pipeline": [..]}`. A missing
    /// pipeline means no stages.
    pub fn from_json(json: &serde_json::Value) -> ViewResult<Self> {
        let object = json.as_object().ok_or_else(|| {
            log::error!("View definition must be an object, found {}", json);
            ViewError::new("View definition must be an object", ErrorKind::InvalidSpec)
        })?;

        let name = required_text(object, "name")?;
        let source = required_text(object, "source")?;

        let pipeline = match object.get("pipeline") {
            Some(pipeline) => PipelineDefinition::from_json(pipeline).map_err(|err| {
                ViewError::new_with_cause(
                    &format!("Invalid pipeline for view {}", name),
                    ErrorKind::InvalidSpec,
                    err,
                )
            })?,
            None => PipelineDefinition::empty(),
        };
        ViewDefinition::new(name, source, pipeline)
    }

    pub fn from_json_str(json: &str) -> ViewResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(|err| {
            log::error!("Failed to parse view definition: {}", err);
            ViewError::from(err)
        })?;
        ViewDefinition::from_json(&value)
    }
}

fn required_text<'a>(
    object: &'a serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> ViewResult<&'a str> {
    object.get(key).and_then(|v| v.as_str()).ok_or_else(|| {
        log::error!("View definition requires a string {}", key);
        ViewError::new(
            &format!("View definition requires a string {}", key),
            ErrorKind::InvalidSpec,
        )
    })
}

impl Display for ViewDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} on {} {}", self.name, self.source, self.pipeline)
    }
}
