use std::collections::BTreeMap;

use tracing::debug;

use super::types::{Facet, FacetKind, FilterOption, FilterSelection};
use crate::sequences::{Project, Sequence, SequenceStatus};

/// Holds facet definitions and the active filter set.
///
/// The active set never contains a facet with zero selected values; a
/// facet missing from the map imposes no constraint.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    facets: Vec<Facet>,
    active: BTreeMap<FacetKind, Vec<String>>,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterEngine {
    pub fn new() -> Self {
        let mut status = Facet::empty(FacetKind::Status);
        status.options = SequenceStatus::ALL
            .iter()
            .map(|s| FilterOption {
                name: s.label().to_string(),
                value: s.as_str().to_string(),
            })
            .collect();

        Self {
            facets: vec![
                Facet::empty(FacetKind::Service),
                Facet::empty(FacetKind::Stage),
                Facet::empty(FacetKind::Sequence),
                status,
            ],
            active: BTreeMap::new(),
        }
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    pub fn facet(&self, kind: FacetKind) -> Option<&Facet> {
        self.facets.iter().find(|f| f.kind == kind)
    }

    pub fn active_filters(&self) -> &BTreeMap<FacetKind, Vec<String>> {
        &self.active
    }

    fn set_options(&mut self, kind: FacetKind, options: Vec<FilterOption>) {
        if let Some(facet) = self.facets.iter_mut().find(|f| f.kind == kind) {
            facet.options = options;
        }
    }

    /// Recompute Service, Stage and Sequence options. Status never changes.
    pub fn rebuild_facets(&mut self, project: &Project, sequences: &[Sequence]) {
        let services = project
            .services
            .iter()
            .map(|s| FilterOption::same(&s.service_name))
            .collect();
        let stages = project
            .stages
            .iter()
            .map(|s| FilterOption::same(&s.stage_name))
            .collect();
        self.set_options(FacetKind::Service, services);
        self.set_options(FacetKind::Stage, stages);
        self.update_sequence_facet(sequences);

        debug!(
            event = "core.filter.facets_rebuilt",
            project = project.name(),
            services = project.services.len(),
            stages = project.stages.len()
        );
    }

    /// Distinct sequence names in order of first appearance.
    pub fn update_sequence_facet(&mut self, sequences: &[Sequence]) {
        let mut names: Vec<&str> = Vec::new();
        for seq in sequences {
            if !names.contains(&seq.name.as_str()) {
                names.push(&seq.name);
            }
        }
        let options = names.into_iter().map(FilterOption::same).collect();
        self.set_options(FacetKind::Sequence, options);
    }

    /// Replace the active filter set.
    ///
    /// Selections are grouped by facet. Facets absent from `selections`
    /// lose any prior constraint; unknown facet names are dropped.
    pub fn set_active_filters(&mut self, selections: &[FilterSelection]) {
        let mut active: BTreeMap<FacetKind, Vec<String>> = BTreeMap::new();
        for selection in selections {
            let Some(kind) = FacetKind::from_name(&selection.facet) else {
                debug!(
                    event = "core.filter.unknown_facet_ignored",
                    facet = %selection.facet
                );
                continue;
            };
            if selection.value.is_empty() {
                continue;
            }
            let values = active.entry(kind).or_default();
            if !values.contains(&selection.value) {
                values.push(selection.value.clone());
            }
        }

        debug!(
            event = "core.filter.active_filters_changed",
            facet_count = active.len()
        );
        self.active = active;
    }

    pub fn clear_filters(&mut self) {
        self.active.clear();
    }

    /// Whether `sequence` passes every active facet.
    pub fn matches(&self, sequence: &Sequence) -> bool {
        self.active.iter().all(|(kind, values)| match kind {
            FacetKind::Service => values.contains(&sequence.service),
            // A sequence must have visited every selected stage.
            FacetKind::Stage => values.iter().all(|v| sequence.has_stage(v)),
            FacetKind::Sequence => values.contains(&sequence.name),
            FacetKind::Status => {
                let status = sequence.status();
                values.iter().any(|v| v == status.as_str())
            }
        })
    }

    /// Subsequence of `sequences` passing the active filters, order preserved.
    pub fn apply<'a>(&self, sequences: &'a [Sequence]) -> Vec<&'a Sequence> {
        sequences.iter().filter(|s| self.matches(s)).collect()
    }
}
