//! Component trait

/// Marker trait for components
///
/// Any `'static` plain data type can be stored; the bound mirrors what the
/// scene needs to hand components across the script and physics bridges.
pub trait Component: 'static + Send + Sync {}
