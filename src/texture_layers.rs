//! Named image slots composited by the menu
//!
//! Each [`TextureLayer`] holds at most one image. The store owns the texture,
//! so rebinding a layer or clearing the store releases the previous image
//! exactly once.

use crate::error::MenuError;
use crate::video::VideoDriver;
use log::{debug, warn};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureLayer {
    Background,
    Overlay,
    Header,
    Footer,
}

impl TextureLayer {
    pub const ALL: [TextureLayer; 4] = [
        TextureLayer::Background,
        TextureLayer::Overlay,
        TextureLayer::Header,
        TextureLayer::Footer,
    ];

    fn index(self) -> usize {
        match self {
            TextureLayer::Background => 0,
            TextureLayer::Overlay => 1,
            TextureLayer::Header => 2,
            TextureLayer::Footer => 3,
        }
    }

    /// Parses the layer names used by menu scripts
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "background" => Some(TextureLayer::Background),
            "overlay" => Some(TextureLayer::Overlay),
            "header" => Some(TextureLayer::Header),
            "footer" => Some(TextureLayer::Footer),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TextureLayer::Background => "background",
            TextureLayer::Overlay => "overlay",
            TextureLayer::Header => "header",
            TextureLayer::Footer => "footer",
        }
    }
}

pub struct TextureLayerStore<T> {
    slots: [Option<T>; 4],
}

impl<T> TextureLayerStore<T> {
    pub fn new() -> Self {
        TextureLayerStore {
            slots: [None, None, None, None],
        }
    }

    /// Binds the image at `path` to `layer`
    ///
    /// Any previous binding is released first, even when the new path turns
    /// out to be unusable. Returns `true` only if the new image was loaded.
    pub fn set_texture<D>(&mut self, driver: &mut D, layer: TextureLayer, path: &str) -> bool
    where
        D: VideoDriver<Texture = T>,
    {
        if self.slots[layer.index()].take().is_some() {
            debug!("Released {} texture", layer.name());
        }

        if path.is_empty() || !Path::new(path).exists() {
            warn!("No image for {} layer at \"{}\"", layer.name(), path);
            return false;
        }

        match driver.load_texture(Path::new(path)) {
            Ok(texture) => {
                self.slots[layer.index()] = Some(texture);
                debug!("Bound {} to {} layer", path, layer.name());
                true
            }
            Err(reason) => {
                let err = MenuError::TextureLoad {
                    path: path.into(),
                    reason,
                };
                warn!("{}", err);
                false
            }
        }
    }

    pub fn get(&self, layer: TextureLayer) -> Option<&T> {
        self.slots[layer.index()].as_ref()
    }

    pub fn is_bound(&self, layer: TextureLayer) -> bool {
        self.slots[layer.index()].is_some()
    }

    /// Releases every binding. Safe to call more than once.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.take();
        }
    }
}

impl<T> Default for TextureLayerStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
