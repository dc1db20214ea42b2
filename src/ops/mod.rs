//! Operation grammar, registry and pixel kernels.

/// Pixel kernels backing each operation.
pub mod kernels;
/// Parameter grammar (`1.5`, `200x100`, `200x100@center`).
pub mod params;
/// Static name -> operation table.
pub mod registry;
