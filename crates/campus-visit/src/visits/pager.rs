use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::VisitApplication;
use super::error::VisitError;
use super::filter::VisitFilter;
use super::store::VisitStore;

pub const DEFAULT_MAX_PAGE_SIZE: u64 = 100;

/// Query-string shape of a page request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default)]
    pub current_page: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
    #[serde(default)]
    pub visit_unit: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

impl PageQuery {
    pub fn filter(&self) -> VisitFilter {
        VisitFilter {
            visit_unit: self.visit_unit.clone(),
            contact_name: self.contact_name.clone(),
            contact_phone: self.contact_phone.clone(),
        }
    }
}

/// One bounded page plus metadata for the whole filtered set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitPage {
    pub total: u64,
    pub pages: u64,
    pub apply_list: Vec<VisitApplication>,
}

/// Filtered, paginated view over non-deleted applications.
pub struct FilteredPager<S: ?Sized> {
    store: Arc<S>,
    max_page_size: u64,
}

impl<S> FilteredPager<S>
where
    S: VisitStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_max_page_size(store, DEFAULT_MAX_PAGE_SIZE)
    }

    pub fn with_max_page_size(store: Arc<S>, max_page_size: u64) -> Self {
        Self {
            store,
            max_page_size: max_page_size.max(1),
        }
    }

    pub fn query(&self, query: &PageQuery) -> Result<VisitPage, VisitError> {
        let page_number = query
            .current_page
            .ok_or_else(|| VisitError::invalid("currentPage is required"))?;
        let page_size = query
            .page_size
            .ok_or_else(|| VisitError::invalid("pageSize is required"))?;
        self.get_page(page_number, page_size, &query.filter())
    }

    pub fn get_page(
        &self,
        page_number: i64,
        page_size: i64,
        filter: &VisitFilter,
    ) -> Result<VisitPage, VisitError> {
        let page_number = u64::try_from(page_number)
            .ok()
            .filter(|number| *number >= 1)
            .ok_or_else(|| VisitError::invalid("currentPage must be at least 1"))?;
        let page_size = u64::try_from(page_size)
            .ok()
            .filter(|size| *size >= 1)
            .ok_or_else(|| VisitError::invalid("pageSize must be at least 1"))?;
        if page_size > self.max_page_size {
            return Err(VisitError::invalid(format!(
                "pageSize must not exceed {}",
                self.max_page_size
            )));
        }
        let offset = (page_number - 1)
            .checked_mul(page_size)
            .ok_or_else(|| VisitError::invalid("currentPage is too large"))?;

        let predicates = filter.predicates();
        let total = self.store.count(&predicates)?;
        let pages = page_count(total, page_size);

        let apply_list = if offset >= total {
            Vec::new()
        } else {
            self.store.list(&predicates, offset, page_size)?
        };

        debug!(
            page_number,
            page_size,
            total,
            pages,
            returned = apply_list.len(),
            "visit page served"
        );
        Ok(VisitPage {
            total,
            pages,
            apply_list,
        })
    }
}

pub(crate) fn page_count(total: u64, page_size: u64) -> u64 {
    if total % page_size == 0 {
        total / page_size
    } else {
        total / page_size + 1
    }
}
