//! Shared types used throughout the library.

mod direction;
pub mod rotation;
mod transform;

pub use direction::{Axis, CullDirection, Direction};
pub use transform::{rescale_factor, ElementRotation, Orientation};

use std::collections::HashMap;
use std::fmt;

/// Namespace used when an identifier does not name one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// A namespaced asset identifier, e.g. `minecraft:block/stone`.
///
/// Both halves are lowercased on construction, backslashes in the path are
/// turned into forward slashes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceLocation {
    pub namespace: String,
    pub path: String,
}

impl ResourceLocation {
    pub fn new(namespace: impl AsRef<str>, path: impl AsRef<str>) -> Self {
        Self {
            namespace: namespace.as_ref().to_lowercase(),
            path: path.as_ref().replace('\\', "/").to_lowercase(),
        }
    }

    /// Parse `namespace:path`, falling back to the default namespace.
    pub fn parse(s: &str) -> Self {
        match s.split_once(':') {
            Some((namespace, path)) => Self::new(namespace, path),
            None => Self::new(DEFAULT_NAMESPACE, s),
        }
    }

    /// Same namespace, different path.
    pub fn with_path(&self, path: impl AsRef<str>) -> Self {
        Self::new(&self.namespace, path)
    }

    /// The reserved identifier substituted for textures that cannot be found.
    pub fn missing_texture() -> Self {
        Self::new("builtin", "missing")
    }

    /// Reserved solid white texture.
    pub fn blank_texture() -> Self {
        Self::new("builtin", "blank")
    }

    /// Reserved fully transparent texture.
    pub fn empty_texture() -> Self {
        Self::new("builtin", "empty")
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl From<&str> for ResourceLocation {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// Property table of one block state, e.g. `{"facing": "north"}`.
pub type StateProperties = HashMap<String, String>;

/// How a block's geometry is blended when drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderType {
    #[default]
    Solid,
    Cutout,
    CutoutMipped,
    Translucent,
    /// Drawn by a different pipeline, no static geometry.
    Entity,
}

/// Per-position jitter applied to some plants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OffsetType {
    #[default]
    None,
    XZ,
    XYZ,
}

/// Block-state lookup provided by the host.
///
/// The compiler never enumerates states itself; it asks the palette which
/// numeric ids belong to a block and what their properties are.
pub trait BlockStatePalette: Sync {
    /// All blocks known to the palette.
    fn block_ids(&self) -> Vec<ResourceLocation>;

    /// Numeric state ids belonging to a block.
    fn state_ids(&self, block: &ResourceLocation) -> Vec<u32>;

    /// Property table of one state.
    fn properties(&self, state_id: u32) -> Option<&StateProperties>;

    fn render_type(&self, _block: &ResourceLocation) -> RenderType {
        RenderType::Solid
    }

    fn offset_type(&self, _block: &ResourceLocation) -> OffsetType {
        OffsetType::None
    }
}

/// Item lookup provided by the host.
pub trait ItemPalette: Sync {
    /// Every numeric item id with its identifier.
    fn items(&self) -> Vec<(u32, ResourceLocation)>;

    /// Whether the item's layers take a dynamic tint.
    fn is_tintable(&self, _item: &ResourceLocation) -> bool {
        false
    }
}

/// In-memory block-state palette.
#[derive(Debug, Default, Clone)]
pub struct StatePalette {
    blocks: Vec<ResourceLocation>,
    states: HashMap<ResourceLocation, Vec<u32>>,
    properties: HashMap<u32, StateProperties>,
    render_types: HashMap<ResourceLocation, RenderType>,
    offset_types: HashMap<ResourceLocation, OffsetType>,
}

impl StatePalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one state of a block.
    pub fn add_state(&mut self, block: ResourceLocation, state_id: u32, properties: StateProperties) {
        let states = self.states.entry(block.clone()).or_default();
        if states.is_empty() {
            self.blocks.push(block);
        }
        states.push(state_id);
        self.properties.insert(state_id, properties);
    }

    pub fn set_render_type(&mut self, block: ResourceLocation, render_type: RenderType) {
        self.render_types.insert(block, render_type);
    }

    pub fn set_offset_type(&mut self, block: ResourceLocation, offset_type: OffsetType) {
        self.offset_types.insert(block, offset_type);
    }
}

impl BlockStatePalette for StatePalette {
    fn block_ids(&self) -> Vec<ResourceLocation> {
        self.blocks.clone()
    }

    fn state_ids(&self, block: &ResourceLocation) -> Vec<u32> {
        self.states.get(block).cloned().unwrap_or_default()
    }

    fn properties(&self, state_id: u32) -> Option<&StateProperties> {
        self.properties.get(&state_id)
    }

    fn render_type(&self, block: &ResourceLocation) -> RenderType {
        self.render_types.get(block).copied().unwrap_or_default()
    }

    fn offset_type(&self, block: &ResourceLocation) -> OffsetType {
        self.offset_types.get(block).copied().unwrap_or_default()
    }
}

/// In-memory item palette.
#[derive(Debug, Default, Clone)]
pub struct ItemTable {
    items: Vec<(u32, ResourceLocation)>,
    tintable: Vec<ResourceLocation>,
}

impl ItemTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, id: u32, item: ResourceLocation, tintable: bool) {
        if tintable {
            self.tintable.push(item.clone());
        }
        self.items.push((id, item));
    }
}

impl ItemPalette for ItemTable {
    fn items(&self) -> Vec<(u32, ResourceLocation)> {
        self.items.clone()
    }

    fn is_tintable(&self, item: &ResourceLocation) -> bool {
        self.tintable.contains(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resource_location() {
        assert_eq!(
            ResourceLocation::parse("minecraft:block/stone"),
            ResourceLocation::new("minecraft", "block/stone")
        );
        assert_eq!(
            ResourceLocation::parse("mymod:block/custom"),
            ResourceLocation::new("mymod", "block/custom")
        );
        assert_eq!(
            ResourceLocation::parse("Block\\Stone"),
            ResourceLocation::new("minecraft", "block/stone")
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ResourceLocation::parse("block/dirt").to_string(), "minecraft:block/dirt");
    }

    #[test]
    fn test_state_palette_groups_states() {
        let mut palette = StatePalette::new();
        let lever = ResourceLocation::parse("lever");
        palette.add_state(lever.clone(), 4, StateProperties::new());
        palette.add_state(lever.clone(), 5, StateProperties::new());
        assert_eq!(palette.block_ids(), vec![lever.clone()]);
        assert_eq!(palette.state_ids(&lever), vec![4, 5]);
        assert_eq!(palette.render_type(&lever), RenderType::Solid);
    }
}
