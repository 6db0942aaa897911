//! Relative poses of the secondary cameras of a rig.

use nalgebra::{Matrix3, RowVector3, Vector3};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(thiserror::Error, Debug)]
pub enum RigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("relative pose {index} is not a rotation (orthonormality error {error:.3e})")]
    NotARotation { index: usize, error: f64 },
}

/// Pose of a secondary camera relative to the main camera of a rig.
///
/// Serialized row-major, the way the three `Rotate` rows are shown to users.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RelativePoseRows", into = "RelativePoseRows")]
pub struct RelativePose {
    pub rotation: Matrix3<f64>,
    pub center: Vector3<f64>,
}

#[derive(Serialize, Deserialize)]
struct RelativePoseRows {
    rotation: [[f64; 3]; 3],
    center: [f64; 3],
}

impl From<RelativePoseRows> for RelativePose {
    fn from(rows: RelativePoseRows) -> Self {
        let [m1, m2, m3] = rows.rotation;
        RelativePose::from_rows(m1, m2, m3, rows.center)
    }
}

impl From<RelativePose> for RelativePoseRows {
    fn from(pose: RelativePose) -> Self {
        let (rotation, center) = pose.to_rows();
        RelativePoseRows { rotation, center }
    }
}

impl Default for RelativePose {
    fn default() -> Self {
        Self {
            rotation: Matrix3::identity(),
            center: Vector3::zeros(),
        }
    }
}

impl RelativePose {
    /// Build from the three rotation rows and the center, as stored in the
    /// relative pose parameters.
    pub fn from_rows(m1: [f64; 3], m2: [f64; 3], m3: [f64; 3], center: [f64; 3]) -> Self {
        Self {
            rotation: Matrix3::from_rows(&[
                RowVector3::from(m1),
                RowVector3::from(m2),
                RowVector3::from(m3),
            ]),
            center: Vector3::from(center),
        }
    }

    /// Rotation rows and center, the inverse of [`RelativePose::from_rows`].
    pub fn to_rows(&self) -> ([[f64; 3]; 3], [f64; 3]) {
        let row = |r: usize| {
            let v = self.rotation.row(r);
            [v[0], v[1], v[2]]
        };
        ([row(0), row(1), row(2)], self.center.into())
    }

    /// An all-zero rotation is the untouched parameter default.
    pub fn is_unset(&self) -> bool {
        self.rotation.iter().all(|v| *v == 0.0)
    }

    /// Frobenius norm of `RᵀR - I`.
    pub fn orthonormality_error(&self) -> f64 {
        (self.rotation.transpose() * self.rotation - Matrix3::identity()).norm()
    }
}

/// Rig calibration file: relative poses of cameras `1..n` to camera 0.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RigCalibration {
    pub poses: Vec<RelativePose>,
}

impl RigCalibration {
    const ROTATION_TOLERANCE: f64 = 1e-6;

    /// Load a JSON rig calibration from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, RigError> {
        let raw = fs::read_to_string(path)?;
        let rig: Self = serde_json::from_str(&raw)?;
        rig.validate()?;
        Ok(rig)
    }

    /// Write this calibration to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), RigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Every pose must hold a proper rotation.
    pub fn validate(&self) -> Result<(), RigError> {
        for (index, pose) in self.poses.iter().enumerate() {
            let error = pose.orthonormality_error();
            if error > Self::ROTATION_TOLERANCE || pose.rotation.determinant() <= 0.0 {
                return Err(RigError::NotARotation { index, error });
            }
        }
        Ok(())
    }

    /// Number of cameras in the rig, main camera included.
    pub fn camera_count(&self) -> usize {
        self.poses.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Rotation3;

    #[test]
    fn rows_round_trip_exactly() {
        let m1 = [0.0, -1.0, 0.0];
        let m2 = [1.0, 0.0, 0.0];
        let m3 = [0.0, 0.0, 1.0];
        let center = [0.25, -3.5, 12.0];
        let pose = RelativePose::from_rows(m1, m2, m3, center);
        assert_eq!(pose.rotation[(0, 1)], -1.0);
        assert_eq!(pose.to_rows(), ([m1, m2, m3], center));
    }

    #[test]
    fn parameter_defaults_are_unset() {
        let zero = [0.0; 3];
        assert!(RelativePose::from_rows(zero, zero, zero, zero).is_unset());
        assert!(!RelativePose::default().is_unset());
    }

    #[test]
    fn json_is_row_major() {
        let pose = RelativePose::from_rows(
            [1.0, 2.0, 3.0],
            [4.0, 5.0, 6.0],
            [7.0, 8.0, 9.0],
            [0.0; 3],
        );
        let json = serde_json::to_value(pose).expect("serialize");
        assert_eq!(json["rotation"][0], serde_json::json!([1.0, 2.0, 3.0]));
    }

    #[test]
    fn validate_rejects_scaled_rotation() {
        let rotation = Rotation3::from_euler_angles(0.1, 0.2, 0.3).into_inner();
        let good = RelativePose {
            rotation,
            center: Vector3::new(1.0, 0.0, 0.0),
        };
        assert_relative_eq!(good.orthonormality_error(), 0.0, epsilon = 1e-12);

        let rig = RigCalibration {
            poses: vec![
                good,
                RelativePose {
                    rotation: rotation * 2.0,
                    ..good
                },
            ],
        };
        assert!(matches!(
            rig.validate(),
            Err(RigError::NotARotation { index: 1, .. })
        ));
    }
}
