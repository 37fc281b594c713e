//! Official Documents
//!
//! CRUD over the `cong_van` table plus the list screen's filter. The filter
//! runs either server-side through [`DocumentService::search`], so counts
//! cover every page, or client-side over rows already fetched.

use chrono::NaiveDate;
use od_common::{
    CurrentUser, DocumentDirection, DocumentStatus, NewOfficialDocument, OfficialDocument,
    UpdateOfficialDocument,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::api::{DataApiClient, Page, Query, Stamped};
use crate::error::{ClientError, ClientResult};

/// Backing table for official documents.
pub const DOCUMENTS_TABLE: &str = "cong_van";

/// Data access for official documents.
#[derive(Clone)]
pub struct DocumentService {
    api: DataApiClient,
}

impl DocumentService {
    pub const fn new(api: DataApiClient) -> Self {
        Self { api }
    }

    /// One page of documents, newest first.
    pub async fn list(&self, page: usize, per_page: usize) -> ClientResult<Page<OfficialDocument>> {
        let query = Query::new()
            .select("*")
            .order("created_at", false)
            .page(page, per_page);
        self.api.select_page(DOCUMENTS_TABLE, &query).await
    }

    /// One page of incoming or outgoing documents, newest first.
    pub async fn list_by_direction(
        &self,
        direction: DocumentDirection,
        page: usize,
        per_page: usize,
    ) -> ClientResult<Page<OfficialDocument>> {
        let query = Query::new()
            .select("*")
            .eq("direction", direction.as_str())
            .order("created_at", false)
            .page(page, per_page);
        self.api.select_page(DOCUMENTS_TABLE, &query).await
    }

    /// One page of documents matching `filter`, evaluated by the backend so
    /// the count covers every page.
    pub async fn search(
        &self,
        filter: &DocumentFilter,
        page: usize,
        per_page: usize,
    ) -> ClientResult<Page<OfficialDocument>> {
        let query = filter
            .to_query()
            .order("created_at", false)
            .page(page, per_page);
        self.api.select_page(DOCUMENTS_TABLE, &query).await
    }

    pub async fn get(&self, id: Uuid) -> ClientResult<OfficialDocument> {
        let query = Query::new().select("*").eq("id", id);
        let mut rows: Vec<OfficialDocument> = self.api.select(DOCUMENTS_TABLE, &query).await?;
        rows.pop()
            .ok_or_else(|| ClientError::NotFound(format!("document {id}")))
    }

    /// Register a document on behalf of `user`.
    ///
    /// The creator is always the signed-in user; the payload cannot set it.
    pub async fn create(
        &self,
        user: Option<&CurrentUser>,
        payload: &NewOfficialDocument,
    ) -> ClientResult<OfficialDocument> {
        let user = user.ok_or(ClientError::NotAuthenticated)?;
        payload.validate()?;

        let body = Stamped {
            payload,
            created_by: &user.id,
        };
        let doc: OfficialDocument = self.api.insert(DOCUMENTS_TABLE, &body).await?;
        info!(id = %doc.id, number = %doc.document_number, user = %user.id, "Document created");
        Ok(doc)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateOfficialDocument,
    ) -> ClientResult<OfficialDocument> {
        payload.validate()?;

        let mut rows: Vec<OfficialDocument> = self
            .api
            .update(DOCUMENTS_TABLE, &Query::new().eq("id", id), payload)
            .await?;
        let doc = rows
            .pop()
            .ok_or_else(|| ClientError::NotFound(format!("document {id}")))?;
        info!(id = %doc.id, "Document updated");
        Ok(doc)
    }

    pub async fn delete(&self, id: Uuid) -> ClientResult<()> {
        self.api
            .delete(DOCUMENTS_TABLE, &Query::new().eq("id", id))
            .await?;
        info!(%id, "Document deleted");
        Ok(())
    }
}

const SEARCH_COLUMNS: &[&str] = &["document_number", "summary", "issuing_agency"];

/// List screen filter. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFilter {
    /// Case-insensitive substring of number, summary or issuing agency.
    pub search: Option<String>,
    pub direction: Option<DocumentDirection>,
    pub status: Option<DocumentStatus>,
    /// Inclusive lower bound on the issued date.
    pub issued_from: Option<NaiveDate>,
    /// Inclusive upper bound on the issued date.
    pub issued_to: Option<NaiveDate>,
}

impl DocumentFilter {
    pub fn matches(&self, doc: &OfficialDocument) -> bool {
        if let Some(needle) = normalized(self.search.as_deref()) {
            let hit = [
                Some(doc.document_number.as_str()),
                Some(doc.summary.as_str()),
                doc.issuing_agency.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if self.direction.is_some_and(|d| d != doc.direction) {
            return false;
        }
        if self.status.is_some_and(|s| s != doc.status) {
            return false;
        }

        // A date bound excludes documents with no issued date.
        if self.issued_from.is_some() || self.issued_to.is_some() {
            let Some(issued) = doc.issued_date else {
                return false;
            };
            if self.issued_from.is_some_and(|from| issued < from) {
                return false;
            }
            if self.issued_to.is_some_and(|to| issued > to) {
                return false;
            }
        }

        true
    }

    /// The same filter as backend query parameters.
    pub fn to_query(&self) -> Query {
        let mut query = Query::new().select("*");
        if let Some(needle) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.any_ilike(SEARCH_COLUMNS, needle);
        }
        if let Some(direction) = self.direction {
            query = query.eq("direction", direction.as_str());
        }
        if let Some(status) = self.status {
            query = query.eq("status", status.as_str());
        }
        if let Some(from) = self.issued_from {
            query = query.gte("issued_date", from);
        }
        if let Some(to) = self.issued_to {
            query = query.lte("issued_date", to);
        }
        query
    }

    /// Matching documents, in input order.
    pub fn apply<'a>(&self, docs: &'a [OfficialDocument]) -> Vec<&'a OfficialDocument> {
        docs.iter().filter(|d| self.matches(d)).collect()
    }
}

/// Trimmed, lowercased search text; `None` when blank.
pub(crate) fn normalized(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}
