//! Per-frame draw sequence of the main menu
//!
//! Order: clear, clouds or static background, overlay, header, footer, the
//! caller's UI pass, present, then pacing. Which texture layers take part in a
//! frame is decided by [`LAYER_RULES`], not by the draw code.

use crate::clouds::CloudBackdrop;
use crate::frame_limiter::{Clock, FrameRateLimiter, IDLE_SLEEP_MS};
use crate::texture_layers::{TextureLayer, TextureLayerStore};
use crate::video::VideoDriver;
use log::debug;
use sdl2::pixels::Color;
use sdl2::rect::Rect;

/// Sky blue every frame starts from
pub const CLEAR_COLOR: Color = Color::RGB(140, 186, 250);

/// Flat fill used when clouds are off and no background image is bound
pub const FLAT_BACKGROUND_COLOR: Color = Color::RGB(80, 58, 37);

/// Height in pixels reserved for the form when placing the footer
const FOOTER_RESERVED_HEIGHT: i32 = 320;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerCondition {
    Always,
    CloudsDisabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Stretched over the whole viewport
    Fullscreen,
    /// Half the viewport wide, in the space above the form
    Header,
    /// Full viewport width, bottom aligned
    Footer,
}

#[derive(Debug, Clone, Copy)]
pub struct LayerRule {
    pub layer: TextureLayer,
    pub condition: LayerCondition,
    pub placement: Placement,
    /// Drawn instead of the image when the layer is empty
    pub fallback: Option<Color>,
}

/// Draw order and enablement of the texture layers
pub const LAYER_RULES: [LayerRule; 4] = [
    LayerRule {
        layer: TextureLayer::Background,
        condition: LayerCondition::CloudsDisabled,
        placement: Placement::Fullscreen,
        fallback: Some(FLAT_BACKGROUND_COLOR),
    },
    LayerRule {
        layer: TextureLayer::Overlay,
        condition: LayerCondition::CloudsDisabled,
        placement: Placement::Fullscreen,
        fallback: None,
    },
    LayerRule {
        layer: TextureLayer::Header,
        condition: LayerCondition::Always,
        placement: Placement::Header,
        fallback: None,
    },
    LayerRule {
        layer: TextureLayer::Footer,
        condition: LayerCondition::Always,
        placement: Placement::Footer,
        fallback: None,
    },
];

impl LayerRule {
    pub fn applies(&self, clouds_enabled: bool) -> bool {
        match self.condition {
            LayerCondition::Always => true,
            LayerCondition::CloudsDisabled => !clouds_enabled,
        }
    }

    /// Destination rectangle for an image of `image` size, or `None` if it
    /// should not be drawn on this screen
    pub fn place(&self, screen: (u32, u32), image: (u32, u32)) -> Option<Rect> {
        match self.placement {
            Placement::Fullscreen => Some(fullscreen_rect(screen)),
            Placement::Header => header_rect(screen, image),
            Placement::Footer => footer_rect(screen, image),
        }
    }
}

pub fn fullscreen_rect(screen: (u32, u32)) -> Rect {
    Rect::new(0, 0, screen.0, screen.1)
}

fn scaled_size(image: (u32, u32), target_width: f32) -> Option<(i32, i32)> {
    if image.0 == 0 {
        return None;
    }
    let mult = target_width / image.0 as f32;
    Some(((image.0 as f32 * mult) as i32, (image.1 as f32 * mult) as i32))
}

/// Header placement: scaled to half the screen width and drawn only if it fits
/// in the space above the lower 32/60 of the screen
pub fn header_rect(screen: (u32, u32), image: (u32, u32)) -> Option<Rect> {
    let (width, height) = screen;
    let (sw, sh) = scaled_size(image, width as f32 / 2.0)?;

    let free_space = ((height as f32 - height as f32 * 32.0 / 60.0) / 2.0) as i32;
    if sh > free_space || sw <= 0 || sh <= 0 {
        return None;
    }

    let x = width as i32 / 2 - sw / 2;
    let y = ((free_space / 2 - sh / 2) as f32 * 0.95) as i32;
    Some(Rect::new(x, y, sw as u32, sh as u32))
}

/// Footer placement: scaled to the full screen width, bottom aligned, drawn
/// only if it fits below the area reserved for the form
pub fn footer_rect(screen: (u32, u32), image: (u32, u32)) -> Option<Rect> {
    let (width, height) = screen;
    let (fw, fh) = scaled_size(image, width as f32)?;

    let free_space = (height as i32 - FOOTER_RESERVED_HEIGHT) / 2;
    if fh > free_space || fw <= 0 || fh <= 0 {
        return None;
    }

    let x = width as i32 / 2 - fw / 2;
    let y = height as i32 - fh;
    Some(Rect::new(x, y, fw as u32, fh as u32))
}

/// What a composed frame did, for logging and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub clouds: bool,
    pub slept_ms: u32,
}

pub struct FrameCompositor {
    limiter: FrameRateLimiter,
}

impl FrameCompositor {
    pub fn new(limiter: FrameRateLimiter) -> Self {
        FrameCompositor { limiter }
    }

    /// Follows a changed `fps_max` setting from the next frame on
    pub fn set_fps_max(&mut self, fps_max: f32) {
        if fps_max != self.limiter.fps_max() {
            debug!("Frame cap changed to {} fps", fps_max);
            self.limiter = FrameRateLimiter::new(fps_max);
        }
    }

    /// Draws the texture layers that apply to this frame
    pub fn draw_layers<D: VideoDriver>(
        &self,
        driver: &mut D,
        layers: &TextureLayerStore<D::Texture>,
        clouds_enabled: bool,
    ) -> Result<(), String> {
        let screen = driver.screen_size();

        for rule in LAYER_RULES.iter().filter(|r| r.applies(clouds_enabled)) {
            match layers.get(rule.layer) {
                Some(texture) => {
                    let image = driver.texture_size(texture);
                    if let Some(dest) = rule.place(screen, image) {
                        driver.draw_image(texture, dest)?;
                    }
                }
                None => {
                    if let Some(color) = rule.fallback {
                        driver.fill_rect(color, fullscreen_rect(screen))?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Composes and presents one frame, then paces the loop
    ///
    /// # Parameters
    ///
    /// - `driver`: Video backend the frame is drawn on
    /// - `layers`: Bound background images
    /// - `clouds`: `Some` when the cloud backdrop is enabled
    /// - `clock`: Time source for cloud animation and pacing
    /// - `draw_ui`: Runs after all texture layers, right before the frame is presented
    ///
    /// # Returns
    ///
    /// Whether clouds were drawn and how long the loop slept. Errors come from
    /// the driver or from `draw_ui`.
    ///
    /// # Example
    ///
    /// ```rust
    /// let report = compositor.compose(&mut driver, &layers, None, &clock, |driver| form.render(driver))?;
    /// assert_eq!(report.slept_ms, IDLE_SLEEP_MS);
    /// ```
    pub fn compose<D, F>(
        &self,
        driver: &mut D,
        layers: &TextureLayerStore<D::Texture>,
        mut clouds: Option<&mut CloudBackdrop>,
        clock: &dyn Clock,
        draw_ui: F,
    ) -> Result<FrameReport, String>
    where
        D: VideoDriver,
        F: FnOnce(&mut D) -> Result<(), String>,
    {
        let clouds_enabled = clouds.is_some();
        driver.begin_scene(CLEAR_COLOR)?;

        if let Some(backdrop) = clouds.as_deref_mut() {
            backdrop.pre_process(clock, driver)?;
        }

        self.draw_layers(driver, layers, clouds_enabled)?;
        draw_ui(driver)?;
        driver.end_scene();

        let slept_ms = match clouds {
            Some(backdrop) => backdrop.post_process(clock, &self.limiter),
            None => {
                clock.sleep_ms(IDLE_SLEEP_MS);
                IDLE_SLEEP_MS
            }
        };

        Ok(FrameReport {
            clouds: clouds_enabled,
            slept_ms,
        })
    }
}
