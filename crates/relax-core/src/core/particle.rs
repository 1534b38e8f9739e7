use nalgebra::{Point3, Unit, Vector3};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleType {
    Photon,
    Electron,
}

impl fmt::Display for ParticleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ParticleType::Photon => "Photon",
                ParticleType::Electron => "Electron",
            }
        )
    }
}

/// The phase-space state of a tracked particle.
///
/// Energies are in MeV. The direction is always a unit vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleState {
    pub particle_type: ParticleType,
    pub position: Point3<f64>,
    pub direction: Unit<Vector3<f64>>,
    pub energy: f64,
    pub weight: f64,
    pub history_number: u64,
    pub generation: u32,
}

impl ParticleState {
    pub fn new(particle_type: ParticleType, history_number: u64) -> Self {
        Self {
            particle_type,
            position: Point3::origin(),
            direction: Vector3::z_axis(),
            energy: 0.0,
            weight: 1.0,
            history_number,
            generation: 0,
        }
    }

    pub fn with_position(mut self, position: Point3<f64>) -> Self {
        self.position = position;
        self
    }

    pub fn with_direction(mut self, direction: Vector3<f64>) -> Self {
        self.direction = Unit::new_normalize(direction);
        self
    }

    pub fn with_energy(mut self, energy: f64) -> Self {
        self.energy = energy;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Creates a secondary particle born from `parent`.
    ///
    /// The secondary inherits the parent's position, weight and history number
    /// and sits one generation below it.
    pub fn secondary(
        parent: &ParticleState,
        particle_type: ParticleType,
        energy: f64,
        direction: Unit<Vector3<f64>>,
    ) -> Self {
        Self {
            particle_type,
            position: parent.position,
            direction,
            energy,
            weight: parent.weight,
            history_number: parent.history_number,
            generation: parent.generation + 1,
        }
    }
}

/// A collection of particles waiting to be transported.
///
/// The relaxation cascade only ever appends to a bank. Each worker owns its
/// own bank; banks from different workers are merged with [`ParticleBank::append`].
#[derive(Debug, Default, Clone)]
pub struct ParticleBank {
    particles: Vec<ParticleState>,
}

impl ParticleBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, particle: ParticleState) {
        self.particles.push(particle);
    }

    pub fn pop(&mut self) -> Option<ParticleState> {
        self.particles.pop()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParticleState> {
        self.particles.iter()
    }

    pub fn count_of(&self, particle_type: ParticleType) -> usize {
        self.particles
            .iter()
            .filter(|p| p.particle_type == particle_type)
            .count()
    }

    /// Moves every particle of `other` to the end of this bank.
    pub fn append(&mut self, other: &mut ParticleBank) {
        self.particles.append(&mut other.particles);
    }

    pub fn into_vec(self) -> Vec<ParticleState> {
        self.particles
    }
}
