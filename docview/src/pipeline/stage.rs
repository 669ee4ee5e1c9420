use std::fmt::Display;

use crate::common::{OPERATOR_PREFIX, STAGE_MATCH, STAGE_PROJECT, STAGE_SORT};
use crate::errors::{ErrorKind, ViewError, ViewResult};
use crate::filter::MatchSpec;
use crate::projection::ProjectSpec;
use crate::sort::SortSpec;

/// One step of an aggregation pipeline.
///
/// Each variant carries the spec its evaluator needs, so stage semantics are
/// checked once when the pipeline is built rather than on every scan.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Keeps the documents matching the spec.
    Match(MatchSpec),
    /// Reshapes every surviving document.
    Project(ProjectSpec),
    /// Reorders the whole result set.
    Sort(SortSpec),
}

impl Stage {
    /// Tag of the stage as written in a pipeline (`match`, `project`, `sort`).
    pub fn tag(&self) -> &'static str {
        match self {
            Stage::Match(_) => STAGE_MATCH,
            Stage::Project(_) => STAGE_PROJECT,
            Stage::Sort(_) => STAGE_SORT,
        }
    }

    pub fn validate(&self) -> ViewResult<()> {
        match self {
            Stage::Match(spec) => spec.validate(),
            Stage::Project(spec) => spec.validate(),
            Stage::Sort(spec) => spec.validate(),
        }
    }

    /// Parses a stage object such as `{"$match": {..}}`.
    ///
    /// The tag may be written with or without the `$` prefix.
    pub fn from_json(json: &serde_json::Value) -> ViewResult<Stage> {
        let object = match json.as_object() {
            Some(object) if object.len() == 1 => object,
            _ => {
                log::error!("Pipeline stage must be an object with a single tag, found {}", json);
                return Err(ViewError::new(
                    "Pipeline stage must be an object with a single tag",
                    ErrorKind::InvalidSpec,
                ));
            }
        };

        let Some((tag, body)) = object.iter().next() else {
            return Err(ViewError::new("Empty pipeline stage", ErrorKind::InvalidSpec));
        };

        let stage = match tag.strip_prefix(OPERATOR_PREFIX).unwrap_or(tag) {
            STAGE_MATCH => MatchSpec::from_json(body).map(Stage::Match),
            STAGE_PROJECT => ProjectSpec::from_json(body).map(Stage::Project),
            STAGE_SORT => SortSpec::from_json(body).map(Stage::Sort),
            _ => {
                log::error!("Unknown pipeline stage {}", tag);
                return Err(ViewError::new(
                    &format!("Unknown pipeline stage {}", tag),
                    ErrorKind::InvalidSpec,
                ));
            }
        };

        stage.map_err(|err| {
            ViewError::new_with_cause(
                &format!("Invalid {} stage", tag),
                ErrorKind::InvalidSpec,
                err,
            )
        })
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Match(spec) => write!(f, "$match {}", spec),
            Stage::Project(spec) => write!(f, "$project {}", spec),
            Stage::Sort(spec) => write!(f, "$sort {}", spec),
        }
    }
}

impl From<MatchSpec> for Stage {
    fn from(spec: MatchSpec) -> Self {
        Stage::Match(spec)
    }
}

impl From<ProjectSpec> for Stage {
    fn from(spec: ProjectSpec) -> Self {
        Stage::Project(spec)
    }
}

impl From<SortSpec> for Stage {
    fn from(spec: SortSpec) -> Self {
        Stage::Sort(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::field;
    use serde_json::json;

    #[test]
    fn test_from_json_accepts_both_tag_spellings() {
        let dollar = Stage::from_json(&json!({"$match": {"accommodates": {"$gt": 4}}})).unwrap();
        let bare = Stage::from_json(&json!({"match": {"accommodates": {"$gt": 4}}})).unwrap();
        assert_eq!(dollar, bare);
        assert_eq!(dollar, Stage::Match(MatchSpec::new().and(field("accommodates").gt(4))));
        assert_eq!(dollar.tag(), "match");
    }

    #[test]
    fn test_from_json_project_and_sort() {
        let project = Stage::from_json(&json!({"$project": {"_id": 0, "name": 1}})).unwrap();
        assert_eq!(project.tag(), "project");
        assert_eq!(project.to_string(), "$project {_id: 0, name: 1}");

        let sort = Stage::from_json(&json!({"$sort": {"price": -1}})).unwrap();
        assert_eq!(sort.tag(), "sort");
    }

    #[test]
    fn test_unknown_tag_is_invalid_spec() {
        let err = Stage::from_json(&json!({"$group": {"_id": "$market"}})).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidSpec);
    }

    #[test]
    fn test_malformed_stage_objects() {
        for invalid in [json!({}), json!({"$match": {}, "$sort": {"a": 1}}), json!("$match")] {
            let err = Stage::from_json(&invalid).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidSpec);
        }
    }

    #[test]
    fn test_invalid_body_keeps_cause() {
        let err = Stage::from_json(&json!({"$sort": {"price": 0}})).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidSpec);
        assert!(err.cause().is_some());
        assert_eq!(err.message(), "Invalid $sort stage");
    }
}
