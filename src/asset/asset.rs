use std::any::Any;

/**
 * Resource produced by an [`crate::AssetLoader`], like a tileset.
 */
pub trait Asset: Any + Send + Sync + 'static {}
impl<A: Send + Sync + 'static> Asset for A {}
