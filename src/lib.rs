//! # Block Model Compiler
//!
//! Compiles Minecraft-style block and item model definitions into
//! direction-culled, atlas-mapped vertex geometry.
//!
//! ## Overview
//!
//! A load runs in one pass over one or more resource packs:
//!
//! 1. model documents are merged with their parent chains,
//! 2. every referenced texture is packed into atlas pages, which are handed
//!    to the rendering thread,
//! 3. each model is compiled once per placement orientation,
//! 4. blockstate and item documents assign that geometry to numeric ids.
//!
//! At mesh time, [`mesher::emit`] expands a compiled geometry into a
//! [`VertexBuffer`], applying cull flags, ambient occlusion and light.
//!
//! ## Quick Start
//!
//! ```ignore
//! use block_model_compiler::{CompilerConfig, EmitContext, ResourceManager, VertexBuffer};
//! use block_model_compiler::upload::{HeadlessUploader, RenderResourceOwner};
//!
//! let mut manager = ResourceManager::new(CompilerConfig::default());
//! manager.add_pack("path/to/pack")?;
//!
//! let (owner, queue) = RenderResourceOwner::new(HeadlessUploader);
//! std::thread::spawn(move || owner.run());
//! manager.build(&my_state_palette, &my_item_palette, &queue)?;
//!
//! let stone = manager.state_model(1)?.expect("stone is covered");
//! let mut buffer = VertexBuffer::default();
//! let ctx = EmitContext::at([4.0, 64.0, 9.0]).with_cull_flags(0b000001);
//! let end = stone.choose(seed).unwrap().emit(&ctx, &mut buffer, 0);
//! ```

pub mod atlas;
pub mod error;
pub mod manager;
pub mod mesher;
pub mod resolver;
pub mod resource_pack;
pub mod types;
pub mod upload;

pub use atlas::{AtlasBuilder, TextureAtlas};
pub use error::{CompileError, Result};
pub use manager::{CompilerConfig, ResourceManager};
pub use mesher::{compile, emit, CompiledGeometry, EmitContext, ExtraVertexFormat, LightSamples, VertexBuffer};
pub use resolver::{BlockStateModel, ItemModel, StateGeometry};
pub use resource_pack::{FileTables, Model};
pub use types::{
    BlockStatePalette, CullDirection, Direction, ItemPalette, ItemTable, Orientation, RenderType, ResourceLocation,
    StatePalette,
};
pub use upload::{AtlasUploader, RenderResourceOwner, UploadQueue};
