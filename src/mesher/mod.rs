//! Geometry compilation and mesh emission.
//!
//! [`compiler`] turns a resolved model at one orientation into a
//! [`CompiledGeometry`]; [`emitter`] expands that into a [`VertexBuffer`]
//! every time a region is meshed, applying cull flags, AO and light.

pub mod ao;
pub mod buffer;
pub mod compiler;
pub mod cube;
pub mod emitter;
pub mod geometry;
pub mod item;
pub mod lighting;

pub use buffer::VertexBuffer;
pub use compiler::compile;
pub use cube::{cube_vertex_count, emit_cube};
pub use emitter::{emit, emit_collider, emit_with_collider, EmitContext};
pub use geometry::{CompiledGeometry, GeometryBucket, GeometryBuilder};
pub use item::{GeneratedElementCache, GeneratedKey, ItemGeometry};
pub use lighting::{ExtraVertexFormat, LightSamples};
