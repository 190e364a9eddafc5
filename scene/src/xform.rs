//! Prim transforms.
//!
//! A prim's local transform is read from its `xformOp:translate`,
//! `xformOp:orient` and `xformOp:scale` attributes and composed as
//! translation * rotation * scale. World transforms multiply local
//! transforms from the pseudo-root down.

use cgmath::{InnerSpace, Matrix3, Matrix4, Quaternion, SquareMatrix, Vector3, Vector4};

use crate::prim::{Prim, PrimId};
use crate::stage::Stage;

pub const TRANSLATE: &str = "xformOp:translate";
pub const ORIENT: &str = "xformOp:orient";
pub const SCALE: &str = "xformOp:scale";

const EPSILON: f32 = 1e-6;

/// Translation, rotation and scale of a transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Pose {
    /// The local pose authored on `prim`, identity where nothing is authored.
    pub fn local(prim: &Prim) -> Self {
        let defaults = Self::default();
        Self {
            position: prim.get_vec3(TRANSLATE).unwrap_or(defaults.position),
            rotation: prim.get_quat(ORIENT).unwrap_or(defaults.rotation),
            scale: prim.get_vec3(SCALE).unwrap_or(defaults.scale),
        }
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        let translation = Matrix4::from_translation(self.position);
        let rotation = Matrix4::from(self.rotation);
        let scale = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);

        translation * rotation * scale
    }

    /// Splits an affine transform without shear back into its parts.
    pub fn from_matrix(matrix: &Matrix4<f32>) -> Self {
        let scale = Vector3::new(
            matrix.x.truncate().magnitude(),
            matrix.y.truncate().magnitude(),
            matrix.z.truncate().magnitude(),
        );

        // Zero scale leaves no rotation to recover on that axis
        let axis = |column: Vector4<f32>, length: f32, fallback: Vector3<f32>| {
            if length > EPSILON {
                column.truncate() / length
            } else {
                fallback
            }
        };
        let rotation = Matrix3::from_cols(
            axis(matrix.x, scale.x, Vector3::unit_x()),
            axis(matrix.y, scale.y, Vector3::unit_y()),
            axis(matrix.z, scale.z, Vector3::unit_z()),
        );

        Self {
            position: matrix.w.truncate(),
            rotation: Quaternion::from(rotation).normalize(),
            scale,
        }
    }
}

impl Stage {
    /// World transform of a prim. Unknown ids give the identity.
    pub fn world_transform(&self, id: PrimId) -> Matrix4<f32> {
        // Walk up to the pseudo-root, then compose root to prim
        let mut chain = Vec::new();
        let mut next = Some(id);
        while let Some(id) = next {
            let Some(prim) = self.get_prim(id) else {
                break;
            };
            chain.push(prim);
            next = prim.parent();
        }

        chain
            .iter()
            .rev()
            .fold(Matrix4::identity(), |world, prim| world * Pose::local(prim).to_matrix())
    }

    /// Transform of `id` relative to `frame`, or the world transform when
    /// `frame` is `None`.
    pub fn relative_transform(&self, id: PrimId, frame: Option<PrimId>) -> Matrix4<f32> {
        let world = self.world_transform(id);
        match frame.and_then(|frame| self.world_transform(frame).invert()) {
            Some(inverse) => inverse * world,
            None => world,
        }
    }
}
