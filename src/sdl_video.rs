//! SDL2 implementation of the video driver

use crate::video::VideoDriver;
use sdl2::image::LoadTexture;
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::{BlendMode, Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use std::path::Path;

/// Window canvas plus the texture creator that owns its textures
///
/// Textures borrow the creator, so they can never outlive the renderer and
/// are destroyed when dropped.
pub struct SdlVideo<'a> {
    canvas: Canvas<Window>,
    texture_creator: &'a TextureCreator<WindowContext>,
}

impl<'a> SdlVideo<'a> {
    pub fn new(mut canvas: Canvas<Window>, texture_creator: &'a TextureCreator<WindowContext>) -> Self {
        // Cloud puffs and widget backgrounds use alpha
        canvas.set_blend_mode(BlendMode::Blend);
        SdlVideo {
            canvas,
            texture_creator,
        }
    }
}

impl<'a> VideoDriver for SdlVideo<'a> {
    type Texture = Texture<'a>;

    fn screen_size(&self) -> (u32, u32) {
        self.canvas
            .output_size()
            .unwrap_or_else(|_| self.canvas.window().size())
    }

    fn begin_scene(&mut self, clear: Color) -> Result<(), String> {
        self.canvas.set_draw_color(clear);
        self.canvas.clear();
        Ok(())
    }

    fn fill_rect(&mut self, color: Color, rect: Rect) -> Result<(), String> {
        self.canvas.set_draw_color(color);
        self.canvas.fill_rect(rect)
    }

    fn draw_rect(&mut self, color: Color, rect: Rect) -> Result<(), String> {
        self.canvas.set_draw_color(color);
        self.canvas.draw_rect(rect)
    }

    fn draw_image(&mut self, texture: &Texture<'a>, dest: Rect) -> Result<(), String> {
        self.canvas.copy(texture, None, dest)
    }

    fn end_scene(&mut self) {
        self.canvas.present();
    }

    fn load_texture(&mut self, path: &Path) -> Result<Texture<'a>, String> {
        self.texture_creator
            .load_texture(path)
            .map_err(|e| format!("Failed to load {}: {}", path.display(), e))
    }

    fn texture_size(&self, texture: &Texture<'a>) -> (u32, u32) {
        let query = texture.query();
        (query.width, query.height)
    }
}
