//! Model resolution and state/item assembly.
//!
//! [`model_resolver`] merges parent chains into flat models, [`predicate`]
//! decides which states a blockstate rule covers, and the two assemblers
//! turn both into the per-id tables the renderer reads.

pub mod chain;
pub mod item_assembler;
pub mod model_resolver;
pub mod predicate;
pub mod state_assembler;

pub use item_assembler::{ItemAssembler, ItemModel, ItemOverride, ItemProperties};
pub use model_resolver::{ModelKind, ModelResolver, ModelSource, ResolvedModel};
pub use predicate::StatePredicate;
pub use state_assembler::{BlockStateModel, GeometryCache, StateAssembler, StateGeometry};
