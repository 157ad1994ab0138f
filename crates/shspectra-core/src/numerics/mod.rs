pub mod legendre;
pub mod stats;

pub use legendre::{
    AssociatedLegendreApi, AssociatedLegendreInput, LegendreError, legendre_packed,
    legendre_packed_ortho,
};
pub use stats::standard_normal_quantile;
