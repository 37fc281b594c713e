//! Rewards and discipline decisions.

use chrono::Datelike;
use od_common::{
    CurrentUser, DecisionKind, NewRewardDecision, RewardDecision, UpdateRewardDecision,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::api::{DataApiClient, Page, Query, Stamped};
use crate::documents::normalized;
use crate::error::{ClientError, ClientResult};

/// Backing table for reward and discipline decisions.
pub const REWARDS_TABLE: &str = "rewards";

/// Data access for reward and discipline decisions.
#[derive(Clone)]
pub struct RewardService {
    api: DataApiClient,
}

impl RewardService {
    pub const fn new(api: DataApiClient) -> Self {
        Self { api }
    }

    /// One page of decisions, most recent decision date first.
    pub async fn list(&self, page: usize, per_page: usize) -> ClientResult<Page<RewardDecision>> {
        let query = Query::new()
            .select("*")
            .order("decision_date", false)
            .order("created_at", false)
            .page(page, per_page);
        self.api.select_page(REWARDS_TABLE, &query).await
    }

    /// One page of decisions of a single kind.
    pub async fn list_by_kind(
        &self,
        kind: DecisionKind,
        page: usize,
        per_page: usize,
    ) -> ClientResult<Page<RewardDecision>> {
        let query = Query::new()
            .select("*")
            .eq("kind", kind.as_str())
            .order("decision_date", false)
            .order("created_at", false)
            .page(page, per_page);
        self.api.select_page(REWARDS_TABLE, &query).await
    }

    /// One page of decisions matching `filter`, evaluated by the backend.
    pub async fn search(
        &self,
        filter: &RewardFilter,
        page: usize,
        per_page: usize,
    ) -> ClientResult<Page<RewardDecision>> {
        let query = filter
            .to_query()
            .order("decision_date", false)
            .order("created_at", false)
            .page(page, per_page);
        self.api.select_page(REWARDS_TABLE, &query).await
    }

    pub async fn get(&self, id: Uuid) -> ClientResult<RewardDecision> {
        let query = Query::new().select("*").eq("id", id);
        let mut rows: Vec<RewardDecision> = self.api.select(REWARDS_TABLE, &query).await?;
        rows.pop()
            .ok_or_else(|| ClientError::NotFound(format!("decision {id}")))
    }

    pub async fn create(
        &self,
        user: Option<&CurrentUser>,
        payload: &NewRewardDecision,
    ) -> ClientResult<RewardDecision> {
        let user = user.ok_or(ClientError::NotAuthenticated)?;
        payload.validate()?;

        let body = Stamped {
            payload,
            created_by: &user.id,
        };
        let decision: RewardDecision = self.api.insert(REWARDS_TABLE, &body).await?;
        info!(
            id = %decision.id,
            kind = decision.kind.as_str(),
            number = %decision.decision_number,
            "Decision created"
        );
        Ok(decision)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateRewardDecision,
    ) -> ClientResult<RewardDecision> {
        payload.validate()?;

        let mut rows: Vec<RewardDecision> = self
            .api
            .update(REWARDS_TABLE, &Query::new().eq("id", id), payload)
            .await?;
        let decision = rows
            .pop()
            .ok_or_else(|| ClientError::NotFound(format!("decision {id}")))?;
        info!(id = %decision.id, "Decision updated");
        Ok(decision)
    }

    pub async fn delete(&self, id: Uuid) -> ClientResult<()> {
        self.api
            .delete(REWARDS_TABLE, &Query::new().eq("id", id))
            .await?;
        info!(%id, "Decision deleted");
        Ok(())
    }
}

/// List screen filter. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardFilter {
    /// Case-insensitive substring of subject name, decision number or reason.
    pub search: Option<String>,
    pub kind: Option<DecisionKind>,
    /// Calendar year of the decision date.
    pub year: Option<i32>,
    /// Unit name, compared case-insensitively as a whole.
    pub unit: Option<String>,
}

impl RewardFilter {
    pub fn matches(&self, decision: &RewardDecision) -> bool {
        if let Some(needle) = normalized(self.search.as_deref()) {
            let hit = [
                Some(decision.subject_name.as_str()),
                Some(decision.decision_number.as_str()),
                decision.reason.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if self.kind.is_some_and(|k| k != decision.kind) {
            return false;
        }
        if self.year.is_some_and(|y| y != decision.decision_date.year()) {
            return false;
        }
        if let Some(unit) = normalized(self.unit.as_deref()) {
            let same = decision
                .unit
                .as_deref()
                .is_some_and(|u| u.trim().to_lowercase() == unit);
            if !same {
                return false;
            }
        }

        true
    }

    /// The same filter as backend query parameters.
    pub fn to_query(&self) -> Query {
        let mut query = Query::new().select("*");
        if let Some(needle) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.any_ilike(&["subject_name", "decision_number", "reason"], needle);
        }
        if let Some(kind) = self.kind {
            query = query.eq("kind", kind.as_str());
        }
        if let Some(year) = self.year {
            query = query
                .gte("decision_date", format!("{year:04}-01-01"))
                .lte("decision_date", format!("{year:04}-12-31"));
        }
        if let Some(unit) = self.unit.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.ilike_exact("unit", unit);
        }
        query
    }

    pub fn apply<'a>(&self, decisions: &'a [RewardDecision]) -> Vec<&'a RewardDecision> {
        decisions.iter().filter(|d| self.matches(d)).collect()
    }
}

/// Header figures for the decisions screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RewardSummary {
    pub total: usize,
    pub rewards: usize,
    pub disciplines: usize,
    /// Sum of reward amounts in VND. Discipline amounts are not counted.
    pub total_amount: i64,
}

pub fn summarize<'a>(decisions: impl IntoIterator<Item = &'a RewardDecision>) -> RewardSummary {
    decisions
        .into_iter()
        .fold(RewardSummary::default(), |mut acc, d| {
            acc.total += 1;
            match d.kind {
                DecisionKind::Reward => {
                    acc.rewards += 1;
                    acc.total_amount = acc.total_amount.saturating_add(d.amount.unwrap_or(0));
                }
                DecisionKind::Discipline => acc.disciplines += 1,
            }
            acc
        })
}

/// Distinct decision years, newest first, for the year picker.
pub fn decision_years(decisions: &[RewardDecision]) -> Vec<i32> {
    let mut years: Vec<i32> = decisions.iter().map(|d| d.decision_date.year()).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}
