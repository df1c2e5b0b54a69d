use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::identity::VisitorIdentityStore;
use super::storage::ClientStorage;
use crate::config::ASSIGNMENTS_KEY;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExperimentError {
    #[error("experiment '{0}' has no variants")]
    NoVariants(String),
    #[error("experiment '{experiment}' lists variant '{variant}' more than once")]
    DuplicateVariant { experiment: String, variant: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Experiment {
    id: String,
    variants: Vec<String>,
}

impl Experiment {
    pub fn new<I, V>(id: impl Into<String>, variants: I) -> Result<Self, ExperimentError>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let id = id.into();
        let variants: Vec<String> = variants.into_iter().map(Into::into).collect();
        if variants.is_empty() {
            return Err(ExperimentError::NoVariants(id));
        }
        let mut seen = HashSet::new();
        for variant in &variants {
            if !seen.insert(variant.as_str()) {
                return Err(ExperimentError::DuplicateVariant {
                    experiment: id.clone(),
                    variant: variant.clone(),
                });
            }
        }
        Ok(Self { id, variants })
    }

    // For experiments defined as literals in the code; callers guarantee a
    // non-empty list without duplicates.
    pub(crate) fn from_static(id: &'static str, variants: &[&'static str]) -> Self {
        Self {
            id: id.to_string(),
            variants: variants.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    #[cfg(test)]
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub fn contains(&self, variant_id: &str) -> bool {
        self.variants.iter().any(|v| v == variant_id)
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        // Single-variant experiments never touch the rng.
        if self.variants.len() == 1 {
            return self.variants[0].clone();
        }
        let index = rng.gen_range(0..self.variants.len());
        self.variants[index].clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorAssignment {
    pub experiment_id: String,
    pub visitor_id: String,
    pub variant_id: String,
    pub assigned_at: DateTime<Utc>,
}

type AssignmentMap = BTreeMap<String, VisitorAssignment>;

pub struct VariantResolver<'a, S: ClientStorage + ?Sized> {
    storage: &'a S,
}

impl<'a, S: ClientStorage + ?Sized> VariantResolver<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    pub fn assign(&self, experiment: &Experiment) -> String {
        self.assign_with(experiment, &mut rand::thread_rng())
    }

    pub fn assign_with<R: Rng + ?Sized>(&self, experiment: &Experiment, rng: &mut R) -> String {
        let visitor_id = VisitorIdentityStore::new(self.storage).visitor_id();
        let mut assignments = self.load();

        if let Some(existing) = assignments.get(experiment.id()) {
            if existing.visitor_id != visitor_id {
                log::info!(
                    "Re-bucketing {}: stored assignment belongs to another visitor",
                    experiment.id()
                );
            } else if !experiment.contains(&existing.variant_id) {
                log::info!(
                    "Re-bucketing {}: stored variant '{}' is no longer in the experiment",
                    experiment.id(),
                    existing.variant_id
                );
            } else {
                return existing.variant_id.clone();
            }
        }

        let variant_id = experiment.draw(rng);
        assignments.insert(
            experiment.id().to_string(),
            VisitorAssignment {
                experiment_id: experiment.id().to_string(),
                visitor_id,
                variant_id: variant_id.clone(),
                assigned_at: Utc::now(),
            },
        );
        self.store(&assignments);
        variant_id
    }

    #[cfg(test)]
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(ASSIGNMENTS_KEY) {
            log::warn!("Could not clear experiment assignments: {}", e);
        }
    }

    fn load(&self) -> AssignmentMap {
        match self.storage.get(ASSIGNMENTS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("Discarding unreadable experiment assignments: {}", e);
                AssignmentMap::new()
            }),
            Ok(None) => AssignmentMap::new(),
            Err(e) => {
                log::warn!("Could not read experiment assignments: {}", e);
                AssignmentMap::new()
            }
        }
    }

    fn store(&self, assignments: &AssignmentMap) {
        let raw = match serde_json::to_string(assignments) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Could not encode experiment assignments: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(ASSIGNMENTS_KEY, &raw) {
            log::warn!("Could not persist experiment assignment: {}", e);
        }
    }
}
