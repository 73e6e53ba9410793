// This file is part of Nitrogen.
//
// Nitrogen is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// Nitrogen is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with Nitrogen.  If not, see <http://www.gnu.org/licenses/>.
use thiserror::Error;

/// Failures surfaced while binding kernels, validating inputs, or running
/// the precompute passes. None of these are retried.
#[derive(Debug, Error)]
pub enum AtmosphereError {
    #[error("failed to resolve kernel entry point {entry_point}: {reason}")]
    KernelResolution {
        entry_point: &'static str,
        reason: String,
    },

    #[error("invalid atmosphere configuration: {0}")]
    Initialization(String),

    #[error("precompute pass {pass} failed: {reason}")]
    Precompute { pass: &'static str, reason: String },
}

pub type Result<T, E = AtmosphereError> = std::result::Result<T, E>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_errors_name_the_failing_piece() {
        let err = AtmosphereError::KernelResolution {
            entry_point: "calculate_transmittance",
            reason: "not exported".to_owned(),
        };
        assert!(err.to_string().contains("calculate_transmittance"));
        let err = AtmosphereError::Precompute {
            pass: "multiple-scattering",
            reason: "device lost".to_owned(),
        };
        assert!(err.to_string().contains("multiple-scattering"));
    }
}
