use crate::collection::Document;
use crate::errors::{ErrorKind, ViewError, ViewResult};
use crate::projection::project;
use crate::sort::sort;
use crate::store::{RecordStore, RecordStoreProvider};

use super::{PipelineDefinition, Stage};

/// Runs a pipeline against the current contents of a source collection.
///
/// The collection is scanned once; every stage then runs over the result of
/// the previous one, in pipeline order. The first failing stage aborts the
/// run and no partial result is returned.
pub fn run(
    store: &RecordStore,
    collection: &str,
    pipeline: &PipelineDefinition,
) -> ViewResult<Vec<Document>> {
    let documents = store.scan(collection).map_err(|err| {
        log::error!("Failed to scan collection {}: {}", collection, err);
        ViewError::new_with_cause(
            &format!("Failed to scan collection {}", collection),
            err.kind().clone(),
            err,
        )
    })?;
    log::debug!("Scanned {} documents from {}", documents.len(), collection);
    execute(documents, pipeline)
}

/// Runs a pipeline over an in-memory set of documents.
pub fn execute(documents: Vec<Document>, pipeline: &PipelineDefinition) -> ViewResult<Vec<Document>> {
    let mut documents = documents;
    for (index, stage) in pipeline.iter().enumerate() {
        documents = apply_stage(documents, stage).map_err(|err| {
            log::error!("Pipeline stage #{} {} failed: {}", index, stage, err);
            ViewError::new_with_cause(
                &format!("Pipeline stage #{} ({}) failed", index, stage.tag()),
                stage_error_kind(&err),
                err,
            )
        })?;
        log::debug!("Stage #{} {} produced {} documents", index, stage.tag(), documents.len());
    }
    Ok(documents)
}

fn apply_stage(documents: Vec<Document>, stage: &Stage) -> ViewResult<Vec<Document>> {
    match stage {
        Stage::Match(spec) => {
            let mut matched = Vec::with_capacity(documents.len());
            for document in documents {
                if spec.matches(&document)? {
                    matched.push(document);
                }
            }
            Ok(matched)
        }
        Stage::Project(spec) => documents
            .iter()
            .map(|document| project(document, spec))
            .collect(),
        Stage::Sort(spec) => sort(documents, spec),
    }
}

// field path errors inside a stage surface as a bad spec
fn stage_error_kind(err: &ViewError) -> ErrorKind {
    match err.kind() {
        ErrorKind::InvalidFieldName => ErrorKind::InvalidSpec,
        kind => kind.clone(),
    }
}
