//! Release plan persistence interface.
//!
//! The validation core never touches storage; this is the seam hosts plug
//! their document store into. [`MemoryStore`] backs tests and embedders that
//! keep plans in process.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::error::ReleaseError;
use crate::parse::types::{ReleasePlan, ReleasePlanStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("release plan {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Rejected(#[from] ReleaseError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListReleasePlanOption {
    /// 1-based. Paging applies only when both page values are positive.
    pub page_num: usize,
    pub page_size: usize,
    /// Sort by index, newest first.
    pub is_sort: bool,
    pub excluded_fields: Vec<String>,
    pub status: Option<ReleasePlanStatus>,
}

pub trait ReleasePlanStore {
    /// Store `plan` under a new id and the next index; returns the id.
    fn create(&mut self, plan: ReleasePlan) -> Result<String, StoreError>;
    fn get_by_id(&self, id: &str) -> Result<ReleasePlan, StoreError>;
    fn update_by_id(&mut self, id: &str, plan: ReleasePlan) -> Result<(), StoreError>;
    fn delete_by_id(&mut self, id: &str) -> Result<(), StoreError>;
    /// Matching plans for the requested page, and the total match count.
    fn list_by_options(
        &self,
        opt: &ListReleasePlanOption,
    ) -> Result<(Vec<ReleasePlan>, usize), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    plans: BTreeMap<String, ReleasePlan>,
    last_index: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

fn exclude_fields(plan: &mut ReleasePlan, fields: &[String]) {
    for field in fields {
        match field.as_str() {
            "jobs" => plan.jobs.clear(),
            "approval" => plan.approval = None,
            "description" => plan.description.clear(),
            _ => {}
        }
    }
}

impl ReleasePlanStore for MemoryStore {
    fn create(&mut self, mut plan: ReleasePlan) -> Result<String, StoreError> {
        self.last_index += 1;
        plan.index = self.last_index;
        plan.id = format!("{:024x}", plan.index);
        let id = plan.id.clone();
        self.plans.insert(id.clone(), plan);
        Ok(id)
    }

    fn get_by_id(&self, id: &str) -> Result<ReleasePlan, StoreError> {
        self.plans
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn update_by_id(&mut self, id: &str, mut plan: ReleasePlan) -> Result<(), StoreError> {
        let current = self
            .plans
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if plan.status != current.status && !current.status.can_transition_to(plan.status) {
            return Err(ReleaseError::InvalidTransition {
                from: current.status,
                to: plan.status,
            }
            .into());
        }
        plan.id = current.id.clone();
        plan.index = current.index;
        *current = plan;
        Ok(())
    }

    fn delete_by_id(&mut self, id: &str) -> Result<(), StoreError> {
        self.plans
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn list_by_options(
        &self,
        opt: &ListReleasePlanOption,
    ) -> Result<(Vec<ReleasePlan>, usize), StoreError> {
        let mut matched: Vec<&ReleasePlan> = self
            .plans
            .values()
            .filter(|p| opt.status.is_none_or(|s| p.status == s))
            .collect();
        let total = matched.len();

        if opt.is_sort {
            matched.sort_by(|a, b| b.index.cmp(&a.index));
        } else {
            matched.sort_by_key(|p| p.index);
        }

        let page: Box<dyn Iterator<Item = &ReleasePlan>> = if opt.page_num > 0 && opt.page_size > 0 {
            Box::new(
                matched
                    .into_iter()
                    .skip((opt.page_num - 1).saturating_mul(opt.page_size))
                    .take(opt.page_size),
            )
        } else {
            Box::new(matched.into_iter())
        };

        let plans = page
            .map(|p| {
                let mut plan = p.clone();
                exclude_fields(&mut plan, &opt.excluded_fields);
                plan
            })
            .collect();
        Ok((plans, total))
    }
}
