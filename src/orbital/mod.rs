pub mod diagnostics;

pub use diagnostics::{
    angular_momentum, center_of_mass, energy_series, kinetic_energy, linear_momentum,
    max_relative_energy_error, potential_energy, relative_energy_drift, total_energy,
};
