//! Paginated, filtered, sorted views over submissions and payouts.
//!
//! Every snapshot is cloned out of the store in a single consistent read.
//! The caller pages the snapshot it holds, so a full sweep never sees an
//! item twice and never skips one, no matter what mutations land between
//! page fetches. `list_*` is one snapshot plus one page.

use crate::application::auth::{Action, Actor, authorize};
use crate::application::engine::Engine;
use crate::domain::payout::PayoutRequest;
use crate::domain::submission::{Submission, SubmissionStatus};
use crate::error::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Filter predicates shared by both entity types. Status names use the
/// lowercase wire form (`pending`, `in_review`, `requested`, …).
#[derive(Debug, Clone, Default)]
pub struct Filter {
    /// Empty means "any status".
    pub statuses: Vec<String>,
    pub account_id: Option<Uuid>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl Filter {
    pub fn by_statuses<S: Into<String>>(statuses: impl IntoIterator<Item = S>) -> Self {
        Self {
            statuses: statuses.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn for_account(account_id: Uuid) -> Self {
        Self {
            account_id: Some(account_id),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    CreatedAt,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sort {
    pub key: SortKey,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

/// One page of results plus the filtered, un-paginated count.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total_count: usize,
}

/// Entities the query layer can filter and sort uniformly.
pub trait Queryable: Clone {
    fn id(&self) -> Uuid;
    fn account_id(&self) -> Uuid;
    fn status_name(&self) -> &'static str;
    fn created_at(&self) -> DateTime<Utc>;
}

impl Queryable for Submission {
    fn id(&self) -> Uuid {
        self.id
    }
    fn account_id(&self) -> Uuid {
        self.account_id
    }
    fn status_name(&self) -> &'static str {
        self.status.as_str()
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

impl Queryable for PayoutRequest {
    fn id(&self) -> Uuid {
        self.id
    }
    fn account_id(&self) -> Uuid {
        self.account_id
    }
    fn status_name(&self) -> &'static str {
        self.status.as_str()
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.requested_at
    }
}

/// A consistent, owned view of the matching set, taken at one point in
/// time. Paging the same snapshot is stable by construction.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    items: Vec<T>,
}

impl<T: Queryable> Snapshot<T> {
    fn build(mut items: Vec<T>, filter: &Filter, sort: Sort) -> Self {
        items.retain(|item| {
            (filter.statuses.is_empty()
                || filter.statuses.iter().any(|s| s == item.status_name()))
                && filter.account_id.is_none_or(|a| a == item.account_id())
                && filter.created_after.is_none_or(|t| item.created_at() >= t)
                && filter.created_before.is_none_or(|t| item.created_at() <= t)
        });
        // Stable tie-break by id keeps pagination deterministic.
        items.sort_by(|a, b| {
            let ordering = match sort.key {
                SortKey::CreatedAt => a.created_at().cmp(&b.created_at()),
                SortKey::Status => a.status_name().cmp(b.status_name()),
            };
            let ordering = match sort.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            };
            ordering.then_with(|| a.id().cmp(&b.id()))
        });
        Self { items }
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn page(&self, page: Page) -> Vec<T> {
        self.items
            .iter()
            .skip(page.offset)
            .take(page.limit)
            .cloned()
            .collect()
    }

    pub fn listing(&self, page: Option<Page>) -> Listing<T> {
        let items = match page {
            Some(page) => self.page(page),
            None => self.items.clone(),
        };
        Listing {
            items,
            total_count: self.total(),
        }
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl Engine {
    /// Takes a consistent snapshot of submissions matching `filter`.
    pub async fn snapshot_submissions(
        &self,
        actor: &Actor,
        filter: Filter,
        sort: Sort,
    ) -> Result<Snapshot<Submission>> {
        authorize(actor, Action::ListEntities, filter.account_id)?;
        let items = self.submissions.all().await?;
        Ok(Snapshot::build(items, &filter, sort))
    }

    /// Takes a consistent snapshot of payout requests matching `filter`.
    pub async fn snapshot_payouts(
        &self,
        actor: &Actor,
        filter: Filter,
        sort: Sort,
    ) -> Result<Snapshot<PayoutRequest>> {
        authorize(actor, Action::ListEntities, filter.account_id)?;
        let items = self.payouts.all().await?;
        Ok(Snapshot::build(items, &filter, sort))
    }

    pub async fn list_submissions(
        &self,
        actor: &Actor,
        filter: Filter,
        sort: Sort,
        page: Option<Page>,
    ) -> Result<Listing<Submission>> {
        Ok(self
            .snapshot_submissions(actor, filter, sort)
            .await?
            .listing(page))
    }

    pub async fn list_payouts(
        &self,
        actor: &Actor,
        filter: Filter,
        sort: Sort,
        page: Option<Page>,
    ) -> Result<Listing<PayoutRequest>> {
        Ok(self
            .snapshot_payouts(actor, filter, sort)
            .await?
            .listing(page))
    }

    /// The admin review queue: pending and in-review submissions, oldest
    /// submitted first.
    pub async fn review_queue(&self, actor: &Actor) -> Result<Snapshot<Submission>> {
        self.snapshot_submissions(
            actor,
            Filter::by_statuses([
                SubmissionStatus::Pending.as_str(),
                SubmissionStatus::InReview.as_str(),
            ]),
            Sort::default(),
        )
        .await
    }
}
