use crate::config::AugmentationConfig;
use crate::core::geometry::{Transform, TransformError};
use crate::core::grid::{Grid, GridElement, GridMut, Residency};
use crate::core::random::set_random_seed;
use nalgebra::{Point3, Vector3};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum AugmentError {
    #[error("Failed to apply augmentation transform: {source}")]
    Transform {
        #[from]
        source: TransformError,
    },
}

/// Mean of the coordinate rows, or the origin for an empty grid.
pub fn centroid<T: GridElement, R: Residency>(
    coords: &Grid<'_, T, 2, R>,
) -> Result<Point3<f64>, TransformError> {
    let shape = coords.shape();
    if shape[1] != 3 {
        return Err(TransformError::NotCoordinateRows { shape });
    }
    if shape[0] == 0 {
        return Ok(Point3::origin());
    }
    let sum = coords
        .as_slice()
        .chunks_exact(3)
        .fold(Vector3::zeros(), |acc, row| {
            acc + Vector3::new(row[0].to_f64(), row[1].to_f64(), row[2].to_f64())
        });
    Ok(Point3::from(sum / shape[0] as f64))
}

/// Randomly rotates and translates `coords` in place.
///
/// When the config carries a seed the process-wide engine is reseeded first, so the same
/// config and input always give the same output. The returned transform maps the augmented
/// coordinates back with `backward`.
#[instrument(skip_all, name = "augment_workflow", fields(rows = coords.len()))]
pub fn augment_coordinates<T: GridElement, R: Residency>(
    coords: &mut GridMut<'_, T, 2, R>,
    config: &AugmentationConfig,
) -> Result<Transform, AugmentError> {
    let shape = coords.shape();
    if shape[1] != 3 {
        return Err(TransformError::NotCoordinateRows { shape }.into());
    }

    if let Some(seed) = config.seed {
        set_random_seed(seed);
    }

    let center = match config.center {
        Some(center) => center,
        None => centroid(&coords.as_grid())?,
    };
    let transform = Transform::random(center, config.random_translation, config.random_rotation);
    transform.forward_in_place(coords, true)?;

    info!(
        "Augmented {} coordinate rows about ({:.3}, {:.3}, {:.3}).",
        shape[0], center.x, center.y, center.z
    );
    Ok(transform)
}
