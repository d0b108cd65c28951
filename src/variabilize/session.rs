//! Shared KVM index allocation across several variabilized groups

use tracing::info;

use super::{ServerDescriptor, VariabilizationResult, Variabilizer};

/// Runs the variabilizer over successive server groups with one running
/// index, so entries from different groups never share a KVM key.
#[derive(Debug, Clone)]
pub struct VariabilizationSession {
    variabilizer: Variabilizer,
    next_index: Option<u32>,
}

impl VariabilizationSession {
    pub fn new(variabilizer: Variabilizer, starting_index: u32) -> Self {
        Self {
            variabilizer,
            next_index: Some(starting_index),
        }
    }

    /// Index the next allocated entry will receive, `None` once every `u32`
    /// index has been handed out
    pub fn next_index(&self) -> Option<u32> {
        self.next_index
    }

    pub fn variabilizer(&self) -> &Variabilizer {
        &self.variabilizer
    }

    /// Variabilize one group and advance the running index past its entries
    pub fn variabilize(&mut self, servers: &[ServerDescriptor]) -> VariabilizationResult {
        let (result, next_index) = self.variabilizer.variabilize_from(servers, self.next_index);

        info!(
            first_index = ?self.next_index,
            allocated = result.kvm_entries.len(),
            has_variabilization = result.has_variabilization,
            "Variabilized server group"
        );

        self.next_index = next_index;
        result
    }
}
