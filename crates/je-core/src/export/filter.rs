//! Extension point over finished documents

use super::document::ExportDocument;
use crate::types::SelectionCriteria;

/// Hook that may rewrite a document before it is returned.
///
/// Filters run in registration order and their output is used verbatim.
/// Closures taking `(ExportDocument, &SelectionCriteria)` implement it.
pub trait ExportFilter: Send + Sync {
    fn apply(&self, document: ExportDocument, selection: &SelectionCriteria) -> ExportDocument;
}

impl<F> ExportFilter for F
where
    F: Fn(ExportDocument, &SelectionCriteria) -> ExportDocument + Send + Sync,
{
    fn apply(&self, document: ExportDocument, selection: &SelectionCriteria) -> ExportDocument {
        self(document, selection)
    }
}
