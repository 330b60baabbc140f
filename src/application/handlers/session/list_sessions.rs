//! ListSessionsHandler - Query handler for filtered, paginated listings.

use std::sync::Arc;

use crate::domain::foundation::AuthenticatedUser;
use crate::domain::session::{
    Page, PageMeta, PageRequest, Session, SessionError, SessionFilter, SessionSort,
};
use crate::ports::SessionRepository;

/// Query for a page of sessions.
#[derive(Debug, Clone)]
pub struct ListSessionsQuery {
    pub actor: AuthenticatedUser,
    pub filter: SessionFilter,
    pub sort: SessionSort,
    pub page: PageRequest,
}

/// Handler for listing sessions.
pub struct ListSessionsHandler {
    repository: Arc<dyn SessionRepository>,
}

impl ListSessionsHandler {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: ListSessionsQuery) -> Result<Page<Session>, SessionError> {
        // 1. Narrow the filter to what the caller may see
        let filter = query.filter.narrow_for(&query.actor)?;

        // 2. Fetch the page and the total
        let items = self
            .repository
            .find_all(&filter, &query.sort, &query.page)
            .await?;
        let total = self.repository.count(&filter).await?;

        Ok(Page {
            items,
            meta: PageMeta::new(&query.page, total),
        })
    }
}
