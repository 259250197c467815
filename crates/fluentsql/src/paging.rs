//! Page requests, pages and the count/bounded statement pair behind them.

use crate::client::DataAccess;
use crate::error::{SqlError, SqlResult};
use crate::row::Row;
use crate::statement::{Rendered, Statement};
use serde::Serialize;

/// A 1-based page number and a page size, both at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PageRequest {
    page: u64,
    size: u64,
}

impl PageRequest {
    pub fn new(page: u64, size: u64) -> SqlResult<Self> {
        if page == 0 {
            return Err(SqlError::build("page number must be at least 1"));
        }
        if size == 0 {
            return Err(SqlError::build("page size must be at least 1"));
        }
        Ok(Self { page, size })
    }

    pub fn first(size: u64) -> SqlResult<Self> {
        Self::new(1, size)
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Rows skipped before this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.size)
    }

    pub fn next(&self) -> Self {
        Self {
            page: self.page + 1,
            size: self.size,
        }
    }
}

/// One page of results plus the totals of the whole result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub page: u64,
    pub size: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_elements: u64, request: PageRequest) -> Self {
        Self {
            content,
            total_elements,
            total_pages: total_pages(total_elements, request.size),
            page: request.page,
            size: request.size,
        }
    }

    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Convert the content, keeping the totals.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            page: self.page,
            size: self.size,
        }
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }
}

/// `ceil(total / size)`, and 0 for an empty result.
pub fn total_pages(total_elements: u64, size: u64) -> u64 {
    if total_elements == 0 || size == 0 {
        0
    } else {
        total_elements.div_ceil(size)
    }
}

/// The two statements a page is read with.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub count: Rendered,
    pub bounded: Rendered,
}

/// Derive the count and bounded statements for `request`.
///
/// The bounded statement is the unbounded base with the collaborator's
/// LIMIT/OFFSET syntax appended; both keep the base parameters.
pub fn plan<S, D>(statement: &S, request: PageRequest, access: &D) -> SqlResult<PagePlan>
where
    S: Statement + ?Sized,
    D: DataAccess + ?Sized,
{
    let count = statement.render_count()?;
    let base = statement.render_unbounded()?;
    let bounded = Rendered::new(
        access.paginate(&base.sql, request.size, request.offset()),
        base.params,
    );
    Ok(PagePlan { count, bounded })
}

/// Total from the rows of a count query: 0 for no row or NULL.
pub fn read_total(rows: &[Row]) -> SqlResult<u64> {
    let Some(row) = rows.first() else {
        return Ok(0);
    };
    if row.is_empty() {
        return Ok(0);
    }
    let total: Option<i64> = row.try_get_at(0)?;
    match total {
        None => Ok(0),
        Some(n) => u64::try_from(n)
            .map_err(|_| SqlError::decode(row.columns()[0].clone(), format!("negative count {}", n))),
    }
}
