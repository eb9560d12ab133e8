//! Every grid instantiation a binding layer registers.
//!
//! Names follow the `Grid{N}{f|d}[CUDA]` / `MGrid{N}{f|d}` convention, for dimension counts
//! `1..=MAX_GRID_DIMS`.

use super::MAX_GRID_DIMS;
use super::element::GridElement;
use super::managed::ManagedGrid;
use super::residency::{Device, Host, Residency};
use super::view::Grid;

macro_rules! grid_aliases {
    ($($n:literal: $gf:ident, $gd:ident, $gfc:ident, $gdc:ident, $mf:ident, $md:ident;)*) => {
        $(
            pub type $gf<'a> = Grid<'a, f32, $n, Host>;
            pub type $gd<'a> = Grid<'a, f64, $n, Host>;
            pub type $gfc<'a> = Grid<'a, f32, $n, Device>;
            pub type $gdc<'a> = Grid<'a, f64, $n, Device>;
            pub type $mf = ManagedGrid<f32, $n>;
            pub type $md = ManagedGrid<f64, $n>;
        )*
    };
}

grid_aliases! {
    1: Grid1f, Grid1d, Grid1fCUDA, Grid1dCUDA, MGrid1f, MGrid1d;
    2: Grid2f, Grid2d, Grid2fCUDA, Grid2dCUDA, MGrid2f, MGrid2d;
    3: Grid3f, Grid3d, Grid3fCUDA, Grid3dCUDA, MGrid3f, MGrid3d;
    4: Grid4f, Grid4d, Grid4fCUDA, Grid4dCUDA, MGrid4f, MGrid4d;
    5: Grid5f, Grid5d, Grid5fCUDA, Grid5dCUDA, MGrid5f, MGrid5d;
    6: Grid6f, Grid6d, Grid6fCUDA, Grid6dCUDA, MGrid6f, MGrid6d;
}

/// One registrable grid type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridTypeInfo {
    pub name: String,
    pub ndim: usize,
    pub element: &'static str,
    pub device: bool,
    pub owning: bool,
}

fn view_type<T: GridElement, R: Residency>(ndim: usize) -> GridTypeInfo {
    GridTypeInfo {
        name: format!("Grid{ndim}{}{}", T::SUFFIX, R::BINDING_SUFFIX),
        ndim,
        element: T::NAME,
        device: R::IS_DEVICE,
        owning: false,
    }
}

fn managed_type<T: GridElement>(ndim: usize) -> GridTypeInfo {
    GridTypeInfo {
        name: format!("MGrid{ndim}{}", T::SUFFIX),
        ndim,
        element: T::NAME,
        device: false,
        owning: true,
    }
}

/// Enumerates every (dimension, element, residency, ownership) combination, in registration
/// order.
pub fn supported_grid_types() -> Vec<GridTypeInfo> {
    (1..=MAX_GRID_DIMS)
        .flat_map(|ndim| {
            [
                view_type::<f32, Device>(ndim),
                view_type::<f64, Device>(ndim),
                view_type::<f32, Host>(ndim),
                view_type::<f64, Host>(ndim),
                managed_type::<f32>(ndim),
                managed_type::<f64>(ndim),
            ]
        })
        .collect()
}
