use itertools::Itertools;
use std::fmt::Display;
use std::ops::Deref;
use std::sync::Arc;

use crate::errors::{ErrorKind, ViewError, ViewResult};
use crate::projection::ProjectSpec;

use super::Stage;

/// A field used by a match or sort stage after an earlier project stage
/// already removed it. Such a field always evaluates as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedFieldUsage {
    /// Position of the stage using the field.
    pub stage_index: usize,
    /// Tag of the stage using the field.
    pub stage_tag: &'static str,
    /// Position of the project stage that removed it.
    pub project_index: usize,
    pub field_name: String,
}

impl Display for RemovedFieldUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "field {} used by {} stage #{} was removed by project stage #{}",
            self.field_name, self.stage_tag, self.stage_index, self.project_index
        )
    }
}

/// Ordered, immutable sequence of pipeline stages.
///
/// Stages run strictly in the given order; they are never reordered. Every
/// stage is validated on construction, and cloning shares the stage list.
///
/// # Examples
///
/// ```rust,ignore
/// use docview::filter::{field, MatchSpec};
/// use docview::pipeline::{PipelineDefinition, Stage};
/// use docview::projection::ProjectSpec;
/// use docview::sort::SortSpec;
/// use docview::SortOrder;
///
/// let pipeline = PipelineDefinition::new(vec![
///     Stage::Match(MatchSpec::new().and(field("accommodates").gt(4))),
///     Stage::Project(ProjectSpec::new().exclude("_id").include("name").include("price")),
///     Stage::Sort(SortSpec::by("price", SortOrder::Descending)),
/// ])?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineDefinition {
    stages: Arc<[Stage]>,
}

impl PipelineDefinition {
    /// Creates a pipeline, validating every stage.
    pub fn new(stages: Vec<Stage>) -> ViewResult<Self> {
        for (index, stage) in stages.iter().enumerate() {
            stage.validate().map_err(|err| {
                ViewError::new_with_cause(
                    &format!("Invalid {} stage #{}", stage.tag(), index),
                    ErrorKind::InvalidSpec,
                    err,
                )
            })?;
        }
        Ok(PipelineDefinition {
            stages: stages.into(),
        })
    }

    /// A pipeline without stages; it returns the source collection as scanned.
    pub fn empty() -> Self {
        PipelineDefinition {
            stages: Arc::from(Vec::new()),
        }
    }

    /// Parses a JSON array of stage objects.
    pub fn from_json(json: &serde_json::Value) -> ViewResult<Self> {
        let items = json.as_array().ok_or_else(|| {
            log::error!("Pipeline must be an array of stages, found {}", json);
            ViewError::new("Pipeline must be an array of stages", ErrorKind::InvalidSpec)
        })?;

        let stages = items
            .iter()
            .map(Stage::from_json)
            .collect::<ViewResult<Vec<_>>>()?;
        PipelineDefinition::new(stages)
    }

    pub fn from_json_str(json: &str) -> ViewResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(|err| {
            log::error!("Failed to parse pipeline json: {}", err);
            ViewError::from(err)
        })?;
        PipelineDefinition::from_json(&value)
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Lists the fields match and sort stages read after an earlier project
    /// stage removed them.
    pub fn removed_field_usages(&self) -> Vec<RemovedFieldUsage> {
        let mut projections: Vec<(usize, &ProjectSpec)> = Vec::new();
        let mut usages = Vec::new();

        for (index, stage) in self.stages.iter().enumerate() {
            let fields: Vec<&str> = match stage {
                Stage::Project(spec) => {
                    projections.push((index, spec));
                    continue;
                }
                Stage::Match(spec) => spec.fields(),
                Stage::Sort(spec) => spec.fields().iter().map(|(name, _)| name.as_str()).collect(),
            };

            for field_name in fields.into_iter().unique() {
                let remover = projections.iter().find(|(_, spec)| !spec.keeps(field_name));
                if let Some((project_index, _)) = remover {
                    usages.push(RemovedFieldUsage {
                        stage_index: index,
                        stage_tag: stage.tag(),
                        project_index: *project_index,
                        field_name: field_name.to_string(),
                    });
                }
            }
        }
        usages
    }
}

impl Deref for PipelineDefinition {
    type Target = [Stage];

    fn deref(&self) -> &Self::Target {
        &self.stages
    }
}

impl Display for PipelineDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.stages.iter().join(", "))
    }
}
