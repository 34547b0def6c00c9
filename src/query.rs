//! Read-side queries over a state snapshot: search, filtering and the
//! pipeline report the dashboard and reports pages render.

use serde::Serialize;

use crate::models::{Activity, ActivityKind, Contact, ContactStatus, Deal, DealStage};
use crate::state::CrmState;

/// Case-insensitive substring match on name, email or company.
/// An empty query matches every contact.
pub fn search_contacts<'a>(contacts: &'a [Contact], text: &str) -> Vec<&'a Contact> {
    let needle = text.to_lowercase();
    contacts
        .iter()
        .filter(|contact| {
            contact.name.to_lowercase().contains(&needle)
                || contact.email.to_lowercase().contains(&needle)
                || contact.company.to_lowercase().contains(&needle)
        })
        .collect()
}

/// The next `limit` pending activities, soonest due first.
pub fn upcoming_activities(activities: &[Activity], limit: usize) -> Vec<&Activity> {
    let mut pending: Vec<&Activity> = activities.iter().filter(|a| !a.completed).collect();
    pending.sort_by_key(|a| a.due_date);
    pending.truncate(limit);
    pending
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActivityFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl ActivityFilter {
    fn matches(&self, activity: &Activity) -> bool {
        match self {
            ActivityFilter::All => true,
            ActivityFilter::Pending => !activity.completed,
            ActivityFilter::Completed => activity.completed,
        }
    }
}

/// Activities matching `filter`, pending before completed, then by due date.
pub fn filter_activities(activities: &[Activity], filter: ActivityFilter) -> Vec<&Activity> {
    let mut matched: Vec<&Activity> = activities.iter().filter(|a| filter.matches(a)).collect();
    matched.sort_by_key(|a| (a.completed, a.due_date));
    matched
}

/// Every pipeline stage in order, with the deals currently in it.
/// Stages without deals are present with an empty list.
pub fn deals_by_stage(deals: &[Deal]) -> Vec<(DealStage, Vec<&Deal>)> {
    DealStage::ALL
        .into_iter()
        .map(|stage| (stage, deals.iter().filter(|d| d.stage == stage).collect()))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSummary {
    pub stage: DealStage,
    pub count: usize,
    pub value: i64,
}

/// Aggregates rendered by the dashboard and the reports page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub stages: Vec<StageSummary>,
    pub contacts_by_status: Vec<(ContactStatus, usize)>,
    pub activities_by_kind: Vec<(ActivityKind, usize)>,
    pub completed_activities: usize,
    pub pending_activities: usize,
}

impl PipelineReport {
    pub fn build(state: &CrmState) -> Self {
        let stages = DealStage::ALL
            .into_iter()
            .map(|stage| {
                let in_stage = state.deals.iter().filter(|d| d.stage == stage);
                StageSummary {
                    stage,
                    count: in_stage.clone().count(),
                    value: in_stage.map(|d| d.value).fold(0, i64::wrapping_add),
                }
            })
            .collect();

        let contacts_by_status = ContactStatus::ALL
            .into_iter()
            .map(|status| {
                let count = state.contacts.iter().filter(|c| c.status == status).count();
                (status, count)
            })
            .collect();

        let activities_by_kind = ActivityKind::ALL
            .into_iter()
            .map(|kind| {
                let count = state.activities.iter().filter(|a| a.kind == kind).count();
                (kind, count)
            })
            .collect();

        let completed_activities = state.activities.iter().filter(|a| a.completed).count();

        PipelineReport {
            stages,
            contacts_by_status,
            activities_by_kind,
            completed_activities,
            pending_activities: state.activities.len() - completed_activities,
        }
    }

    pub fn stage(&self, stage: DealStage) -> Option<&StageSummary> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    /// Deals across all stages.
    pub fn total_deals(&self) -> usize {
        self.stages.iter().map(|s| s.count).sum()
    }
}
