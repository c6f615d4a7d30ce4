//! Shared primitive aliases used by the heterogen data model.

use nalgebra::Point3;
use smol_str::SmolStr;

/// Cartesian coordinate in ångströms.
pub type Point = Point3<f64>;

/// Immutable textual identifier of an atom within one heterogen (e.g., `"FE"`, `"C1"`).
///
/// Keys are the stable identity used by bonds; positional indices are not.
pub type AtomKey = SmolStr;
