use super::atomic_model::AtomicRelaxationModel;
use std::collections::HashMap;
use std::sync::Arc;

/// Atomic relaxation models keyed by atomic number.
#[derive(Debug, Default, Clone)]
pub struct ModelCache {
    models: HashMap<u32, Arc<AtomicRelaxationModel>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, atomic_number: u32, model: Arc<AtomicRelaxationModel>) {
        self.models.insert(atomic_number, model);
    }

    pub fn get(&self, atomic_number: u32) -> Option<&Arc<AtomicRelaxationModel>> {
        self.models.get(&atomic_number)
    }

    pub fn contains(&self, atomic_number: u32) -> bool {
        self.models.contains_key(&atomic_number)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Cached atomic numbers in ascending order.
    pub fn atomic_numbers(&self) -> Vec<u32> {
        let mut numbers: Vec<u32> = self.models.keys().copied().collect();
        numbers.sort_unstable();
        numbers
    }
}
