//! Listing query builder — turns the public filter parameters into a SQL
//! predicate over active jobs, plus sort order and pagination.
//!
//! Filters are conjunctive: every supplied field narrows the result set,
//! omitted or "all" fields are ignored. The remote-mode rules are applied
//! after the plain filters and overwrite them when they touch the same
//! column (last writer wins).

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::errors::AppError;
use crate::models::job::JobRow;

/// Query parameters accepted by `GET /api/jobs`. Field names mirror the
/// public API (`type`, `datePosted`), not Rust conventions.
#[derive(Debug, Default, Deserialize)]
pub struct JobQuery {
    pub category: Option<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
    #[serde(rename = "type")]
    pub employment_type: Option<String>,
    pub remote: Option<String>,
    pub search: Option<String>,
    #[serde(rename = "datePosted")]
    pub date_posted: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationMatch {
    /// Case-insensitive substring match against the location column.
    Contains(String),
    /// The hybrid remote-mode: location mentions "hybrid" or "remote".
    HybridOrRemote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmploymentMatch {
    Is(String),
    IsNot(String),
}

/// The composed filter. One optional constraint per column, so a later
/// rule replaces an earlier one instead of stacking a contradiction.
#[derive(Debug, Default, PartialEq)]
pub struct JobPredicate {
    pub category: Option<String>,
    pub location: Option<LocationMatch>,
    pub experience: Option<String>,
    pub employment: Option<EmploymentMatch>,
    pub posted_after: Option<DateTime<Utc>>,
    pub search: Option<String>,
}

/// Filter values are ignored when absent, blank, or the "all" sentinel the
/// frontend sends for an untouched dropdown.
fn supplied(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "all")
}

impl JobPredicate {
    pub fn from_query(query: &JobQuery, now: DateTime<Utc>) -> Self {
        let mut pred = JobPredicate::default();

        if let Some(category) = supplied(&query.category) {
            pred.category = Some(category.to_string());
        }
        if let Some(location) = supplied(&query.location) {
            pred.location = Some(LocationMatch::Contains(location.to_string()));
        }
        if let Some(experience) = supplied(&query.experience) {
            pred.experience = Some(experience.to_string());
        }
        if let Some(employment) = supplied(&query.employment_type) {
            pred.employment = Some(EmploymentMatch::Is(employment.to_string()));
        }

        // Remote-mode rules run after the plain filters so they win on the
        // columns they share with `type` and `location`.
        match supplied(&query.remote) {
            Some("remote") => pred.employment = Some(EmploymentMatch::Is("Remote".to_string())),
            Some("hybrid") => pred.location = Some(LocationMatch::HybridOrRemote),
            Some("onsite") => pred.employment = Some(EmploymentMatch::IsNot("Remote".to_string())),
            _ => {}
        }

        if let Some(bucket) = query
            .date_posted
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty() && *v != "any")
        {
            pred.posted_after = posted_cutoff(bucket, now);
        }

        if let Some(search) = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            pred.search = Some(search.to_string());
        }

        pred
    }
}

/// Maps a symbolic age bucket to the earliest acceptable `posted_date`.
/// Unknown buckets impose no constraint.
pub fn posted_cutoff(bucket: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let age = match bucket {
        "24h" => Duration::hours(24),
        "3d" => Duration::days(3),
        "1w" => Duration::days(7),
        "2w" => Duration::days(14),
        "1m" => Duration::days(30),
        _ => return None,
    };
    Some(now - age)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Newest,
    Oldest,
    SalaryHigh,
    SalaryLow,
}

impl SortKey {
    /// Unknown or missing keys fall back to newest-first.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("oldest") => SortKey::Oldest,
            Some("salary-high") => SortKey::SalaryHigh,
            Some("salary-low") => SortKey::SalaryLow,
            _ => SortKey::Newest,
        }
    }

    /// ORDER BY clause body. `salary_range` is a free-text column, so the
    /// salary sorts order lexicographically on that string. Kept for
    /// compatibility with the existing API.
    pub fn order_by(&self) -> &'static str {
        match self {
            SortKey::Newest => "posted_date DESC",
            SortKey::Oldest => "posted_date ASC",
            SortKey::SalaryHigh => "salary_range DESC",
            SortKey::SalaryLow => "salary_range ASC",
        }
    }
}

/// 1-indexed pagination. The limit is capped so a single request cannot
/// drag the whole table across the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 100;

    pub fn from_query(page: Option<u32>, limit: Option<u32>) -> Self {
        Page {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

/// Expression mirrored by the GIN index in the schema; keep the two in sync
/// or the planner falls back to a sequential scan.
const SEARCH_VECTOR: &str = "to_tsvector('english', title || ' ' || description || ' ' || company)";

/// Escapes LIKE wildcards in user input, then wraps it for substring match.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_where(qb: &mut QueryBuilder<'_, Postgres>, pred: &JobPredicate) {
    qb.push(" WHERE is_active = TRUE");

    if let Some(category) = &pred.category {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    match &pred.location {
        Some(LocationMatch::Contains(needle)) => {
            qb.push(" AND location ILIKE ").push_bind(like_pattern(needle));
        }
        Some(LocationMatch::HybridOrRemote) => {
            qb.push(" AND (location ILIKE '%hybrid%' OR location ILIKE '%remote%')");
        }
        None => {}
    }
    if let Some(experience) = &pred.experience {
        qb.push(" AND experience_level = ").push_bind(experience.clone());
    }
    match &pred.employment {
        Some(EmploymentMatch::Is(value)) => {
            qb.push(" AND employment_type = ").push_bind(value.clone());
        }
        Some(EmploymentMatch::IsNot(value)) => {
            qb.push(" AND employment_type <> ").push_bind(value.clone());
        }
        None => {}
    }
    if let Some(cutoff) = pred.posted_after {
        qb.push(" AND posted_date >= ").push_bind(cutoff);
    }
    if let Some(search) = &pred.search {
        qb.push(" AND ")
            .push(SEARCH_VECTOR)
            .push(" @@ websearch_to_tsquery('english', ")
            .push_bind(search.clone())
            .push(")");
    }
}

pub fn select_jobs(
    pred: &JobPredicate,
    sort: SortKey,
    page: &Page,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT * FROM jobs");
    push_where(&mut qb, pred);
    qb.push(" ORDER BY ").push(sort.order_by());
    qb.push(" LIMIT ").push_bind(page.limit as i64);
    qb.push(" OFFSET ").push_bind(page.offset());
    qb
}

pub fn count_jobs(pred: &JobPredicate) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM jobs");
    push_where(&mut qb, pred);
    qb
}

/// Runs the full listing pipeline: predicate, page of rows, pre-pagination
/// total. Read-only.
pub async fn fetch_page(
    pool: &PgPool,
    query: &JobQuery,
) -> Result<(Vec<JobRow>, i64, Page), AppError> {
    let pred = JobPredicate::from_query(query, Utc::now());
    let sort = SortKey::parse(query.sort.as_deref());
    let page = Page::from_query(query.page, query.limit);

    let mut select = select_jobs(&pred, sort, &page);
    let jobs = select
        .build_query_as::<JobRow>()
        .fetch_all(pool)
        .await?;
    let mut count = count_jobs(&pred);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    Ok((jobs, total, page))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2024-06-15T12:00:00Z".parse().unwrap()
    }

    fn query(pairs: &[(&str, &str)]) -> JobQuery {
        let mut q = JobQuery::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "category" => q.category = value,
                "location" => q.location = value,
                "experience" => q.experience = value,
                "type" => q.employment_type = value,
                "remote" => q.remote = value,
                "search" => q.search = value,
                "datePosted" => q.date_posted = value,
                "sort" => q.sort = value,
                other => panic!("unknown key {other}"),
            }
        }
        q
    }

    #[test]
    fn test_empty_query_only_requires_active() {
        let pred = JobPredicate::from_query(&JobQuery::default(), now());
        assert_eq!(pred, JobPredicate::default());
    }

    #[test]
    fn test_all_sentinel_is_ignored() {
        let q = query(&[
            ("category", "all"),
            ("location", "all"),
            ("experience", "all"),
            ("type", "all"),
            ("remote", "all"),
        ]);
        assert_eq!(JobPredicate::from_query(&q, now()), JobPredicate::default());
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let q = query(&[("category", "  "), ("search", "")]);
        assert_eq!(JobPredicate::from_query(&q, now()), JobPredicate::default());
    }

    #[test]
    fn test_each_filter_lands_on_its_column() {
        let q = query(&[
            ("category", "Engineering"),
            ("location", "Berlin"),
            ("experience", "Senior"),
            ("type", "Full-time"),
            ("search", "rust backend"),
        ]);
        let pred = JobPredicate::from_query(&q, now());
        assert_eq!(pred.category.as_deref(), Some("Engineering"));
        assert_eq!(
            pred.location,
            Some(LocationMatch::Contains("Berlin".to_string()))
        );
        assert_eq!(pred.experience.as_deref(), Some("Senior"));
        assert_eq!(
            pred.employment,
            Some(EmploymentMatch::Is("Full-time".to_string()))
        );
        assert_eq!(pred.search.as_deref(), Some("rust backend"));
    }

    #[test]
    fn test_remote_mode_overrides_employment_type() {
        let q = query(&[("type", "Full-time"), ("remote", "remote")]);
        let pred = JobPredicate::from_query(&q, now());
        assert_eq!(
            pred.employment,
            Some(EmploymentMatch::Is("Remote".to_string()))
        );
    }

    #[test]
    fn test_hybrid_mode_replaces_location_filter() {
        let q = query(&[("location", "Berlin"), ("remote", "hybrid")]);
        let pred = JobPredicate::from_query(&q, now());
        assert_eq!(pred.location, Some(LocationMatch::HybridOrRemote));
    }

    #[test]
    fn test_onsite_excludes_remote_even_when_type_requests_it() {
        let q = query(&[("type", "Remote"), ("remote", "onsite")]);
        let pred = JobPredicate::from_query(&q, now());
        assert_eq!(
            pred.employment,
            Some(EmploymentMatch::IsNot("Remote".to_string()))
        );
    }

    #[test]
    fn test_unknown_remote_mode_leaves_plain_filters() {
        let q = query(&[("type", "Contract"), ("remote", "flexible")]);
        let pred = JobPredicate::from_query(&q, now());
        assert_eq!(
            pred.employment,
            Some(EmploymentMatch::Is("Contract".to_string()))
        );
    }

    #[test]
    fn test_posted_cutoff_buckets() {
        let now = now();
        assert_eq!(posted_cutoff("24h", now), Some(now - Duration::hours(24)));
        assert_eq!(posted_cutoff("3d", now), Some(now - Duration::days(3)));
        assert_eq!(posted_cutoff("1w", now), Some(now - Duration::days(7)));
        assert_eq!(posted_cutoff("2w", now), Some(now - Duration::days(14)));
        assert_eq!(posted_cutoff("1m", now), Some(now - Duration::days(30)));
    }

    #[test]
    fn test_posted_cutoff_unknown_bucket_is_unconstrained() {
        assert_eq!(posted_cutoff("6m", now()), None);
        assert_eq!(posted_cutoff("any", now()), None);
    }

    #[test]
    fn test_date_posted_any_is_ignored() {
        let q = query(&[("datePosted", "any")]);
        assert_eq!(
            JobPredicate::from_query(&q, now()).posted_after,
            None
        );
    }

    #[test]
    fn test_date_posted_week_bucket() {
        let q = query(&[("datePosted", "1w")]);
        assert_eq!(
            JobPredicate::from_query(&q, now()).posted_after,
            Some(now() - Duration::days(7))
        );
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!(SortKey::parse(Some("newest")), SortKey::Newest);
        assert_eq!(SortKey::parse(Some("oldest")), SortKey::Oldest);
        assert_eq!(SortKey::parse(Some("salary-high")), SortKey::SalaryHigh);
        assert_eq!(SortKey::parse(Some("salary-low")), SortKey::SalaryLow);
        assert_eq!(SortKey::parse(None), SortKey::Newest);
        assert_eq!(SortKey::parse(Some("relevance")), SortKey::Newest);
    }

    #[test]
    fn test_salary_sort_is_lexicographic_on_the_text_column() {
        assert_eq!(SortKey::SalaryHigh.order_by(), "salary_range DESC");
        assert_eq!(SortKey::SalaryLow.order_by(), "salary_range ASC");
    }

    #[test]
    fn test_page_defaults() {
        let page = Page::from_query(None, None);
        assert_eq!(page, Page { page: 1, limit: 10 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_page_offset_is_one_indexed() {
        let page = Page::from_query(Some(3), Some(20));
        assert_eq!(page.offset(), 40);
    }

    #[test]
    fn test_page_zero_is_clamped_to_first() {
        let page = Page::from_query(Some(0), None);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_limit_is_capped() {
        let page = Page::from_query(None, Some(10_000));
        assert_eq!(page.limit, Page::MAX_LIMIT);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("Berlin"), "%Berlin%");
    }

    #[test]
    fn test_select_sql_contains_every_supplied_predicate() {
        let q = query(&[
            ("category", "Engineering"),
            ("location", "Berlin"),
            ("experience", "Senior"),
            ("type", "Full-time"),
            ("search", "rust"),
            ("datePosted", "1w"),
        ]);
        let pred = JobPredicate::from_query(&q, now());
        let mut qb = select_jobs(&pred, SortKey::Newest, &Page::from_query(None, None));
        let sql = qb.sql();
        assert!(sql.contains("WHERE is_active = TRUE"));
        assert!(sql.contains("AND category ="));
        assert!(sql.contains("AND location ILIKE"));
        assert!(sql.contains("AND experience_level ="));
        assert!(sql.contains("AND employment_type ="));
        assert!(sql.contains("AND posted_date >="));
        assert!(sql.contains("websearch_to_tsquery"));
        assert!(sql.contains("ORDER BY posted_date DESC"));
        assert!(sql.contains("LIMIT"));
        assert!(sql.contains("OFFSET"));
    }

    #[test]
    fn test_select_sql_omits_unsupplied_predicates() {
        let mut qb = select_jobs(
            &JobPredicate::default(),
            SortKey::Newest,
            &Page::from_query(None, None),
        );
        let sql = qb.sql();
        assert!(sql.contains("WHERE is_active = TRUE"));
        assert!(!sql.contains("AND category"));
        assert!(!sql.contains("ILIKE"));
        assert!(!sql.contains("websearch_to_tsquery"));
    }

    #[test]
    fn test_hybrid_sql_matches_either_keyword() {
        let q = query(&[("remote", "hybrid")]);
        let pred = JobPredicate::from_query(&q, now());
        let mut qb = count_jobs(&pred);
        let sql = qb.sql();
        assert!(sql.contains("location ILIKE '%hybrid%' OR location ILIKE '%remote%'"));
    }

    #[test]
    fn test_onsite_sql_uses_inequality() {
        let q = query(&[("remote", "onsite")]);
        let pred = JobPredicate::from_query(&q, now());
        let mut qb = count_jobs(&pred);
        assert!(qb.sql().contains("employment_type <>"));
    }

    #[test]
    fn test_count_sql_has_no_ordering_or_pagination() {
        let mut qb = count_jobs(&JobPredicate::default());
        let sql = qb.sql();
        assert!(sql.starts_with("SELECT COUNT(*) FROM jobs"));
        assert!(!sql.contains("ORDER BY"));
        assert!(!sql.contains("LIMIT"));
    }
}
