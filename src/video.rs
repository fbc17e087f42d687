//! Video driver abstraction
//!
//! The menu draws through [`VideoDriver`] instead of an SDL2 canvas directly,
//! so the compositor can run against the real window ([`crate::sdl_video::SdlVideo`])
//! or against a recording driver in tests.

use sdl2::pixels::Color;
use sdl2::rect::Rect;
use std::path::Path;

pub trait VideoDriver {
    /// Owned texture handle. Dropping it releases the image.
    type Texture;

    /// Current drawable size in pixels (width, height)
    fn screen_size(&self) -> (u32, u32);

    /// Clears the frame to `clear`
    fn begin_scene(&mut self, clear: Color) -> Result<(), String>;

    fn fill_rect(&mut self, color: Color, rect: Rect) -> Result<(), String>;

    fn draw_rect(&mut self, color: Color, rect: Rect) -> Result<(), String>;

    /// Draws the full source image stretched into `dest`
    fn draw_image(&mut self, texture: &Self::Texture, dest: Rect) -> Result<(), String>;

    /// Presents the frame
    fn end_scene(&mut self);

    fn load_texture(&mut self, path: &Path) -> Result<Self::Texture, String>;

    /// Original (unscaled) size of a texture
    fn texture_size(&self, texture: &Self::Texture) -> (u32, u32);
}
