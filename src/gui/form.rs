//! Script-driven widget form
//!
//! Draws the labels and buttons of the current form description centred on
//! the screen and turns clicks into [`FormEvent`](super::FormEvent)s for the
//! menu script.

use super::formspec::{self, FormSpec, Widget};
use super::text_dest::TextDest;
use crate::input_system::MenuAction;
use crate::text::{draw_simple_text, text_width, GLYPH_HEIGHT};
use crate::video::VideoDriver;
use log::debug;
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use std::collections::BTreeMap;

/// Event sent when Escape is pressed on a form that may not close
pub const QUIT_EVENT: &str = "MenuQuit";

/// Form size assumed when the description has no `size[]`
const DEFAULT_FORM_SIZE: (f32, f32) = (8.0, 5.0);

/// Configuration for form appearance
#[derive(Debug, Clone)]
pub struct FormStyle {
    /// Upper bound for the size of one form unit in pixels
    pub max_unit_px: u32,

    pub background_color: Color,

    pub border_color: Color,

    pub label_color: Color,

    pub button_color: Color,

    pub button_text_color: Color,

    /// Button fill under the mouse pointer
    pub highlight_color: Color,

    pub text_scale: u32,
}

impl Default for FormStyle {
    fn default() -> Self {
        FormStyle {
            max_unit_px: 64,
            background_color: Color::RGBA(30, 30, 40, 200),
            border_color: Color::RGB(100, 100, 120),
            label_color: Color::RGB(220, 220, 240),
            button_color: Color::RGB(60, 60, 75),
            button_text_color: Color::RGB(255, 255, 255),
            highlight_color: Color::RGB(80, 100, 140),
            text_scale: 2,
        }
    }
}

/// Pixel placement of a form on a given screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormLayout {
    pub origin: (i32, i32),
    pub unit: f32,
    pub bounds: Rect,
}

impl FormLayout {
    pub fn rect(&self, pos: (f32, f32), size: (f32, f32)) -> Rect {
        let (x, y) = self.point(pos);
        Rect::new(
            x,
            y,
            ((size.0 * self.unit) as u32).max(1),
            ((size.1 * self.unit) as u32).max(1),
        )
    }

    pub fn point(&self, pos: (f32, f32)) -> (i32, i32) {
        (
            self.origin.0.saturating_add((pos.0 * self.unit) as i32),
            self.origin.1.saturating_add((pos.1 * self.unit) as i32),
        )
    }
}

pub struct WidgetForm {
    source: String,
    spec: FormSpec,
    style: FormStyle,
    hovered: Option<usize>,
    allow_close: bool,
    active: bool,
}

impl WidgetForm {
    pub fn new() -> Self {
        WidgetForm {
            source: String::new(),
            spec: FormSpec::default(),
            style: FormStyle::default(),
            hovered: None,
            allow_close: true,
            active: true,
        }
    }

    /// Whether Escape closes the form instead of reporting `MenuQuit`
    pub fn allow_close(&mut self, allow: bool) {
        self.allow_close = allow;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Replaces the form description. Re-parses only when it changed.
    pub fn set_form_source(&mut self, source: &str) {
        if source == self.source {
            return;
        }
        self.source = source.to_string();
        self.spec = formspec::parse(source);
        self.hovered = None;
        debug!("Form updated: {} widgets", self.spec.widgets.len());
    }

    pub fn form_source(&self) -> &str {
        &self.source
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.spec.widgets
    }

    /// Closes the form. It stops drawing and handling input.
    pub fn quit_menu(&mut self) {
        self.active = false;
        self.hovered = None;
    }

    pub fn layout(&self, screen: (u32, u32)) -> FormLayout {
        let (fw, fh) = self.spec.size.unwrap_or(DEFAULT_FORM_SIZE);
        let fw = fw.max(1.0);
        let fh = fh.max(1.0);

        let unit = (self.style.max_unit_px as f32)
            .min(screen.0 as f32 / fw)
            .min(screen.1 as f32 / fh);
        let width = (fw * unit) as u32;
        let height = (fh * unit) as u32;
        let origin = (
            (screen.0 as i32 - width as i32) / 2,
            (screen.1 as i32 - height as i32) / 2,
        );

        FormLayout {
            origin,
            unit,
            bounds: Rect::new(origin.0, origin.1, width.max(1), height.max(1)),
        }
    }

    /// Index of the button under (x, y)
    fn button_at(&self, layout: &FormLayout, x: i32, y: i32) -> Option<usize> {
        self.spec.widgets.iter().position(|w| match w {
            Widget::Button { pos, size, .. } => layout.rect(*pos, *size).contains_point((x, y)),
            Widget::Label { .. } => false,
        })
    }

    /// Feeds one input action to the form
    ///
    /// Returns `true` if the form consumed it.
    pub fn handle_action(&mut self, action: &MenuAction, screen: (u32, u32), dest: &mut TextDest) -> bool {
        if !self.active {
            return false;
        }
        let layout = self.layout(screen);

        match action {
            MenuAction::MouseMove(x, y) => {
                self.hovered = self.button_at(&layout, *x, *y);
                false
            }
            MenuAction::Click(x, y) => {
                let Some(index) = self.button_at(&layout, *x, *y) else {
                    return false;
                };
                if let Widget::Button {
                    name, label, exit, ..
                } = &self.spec.widgets[index]
                {
                    let mut fields = BTreeMap::new();
                    fields.insert(name.clone(), label.clone());
                    if *exit {
                        fields.insert("quit".to_string(), "true".to_string());
                    }
                    dest.got_fields(fields);
                    if *exit && self.allow_close {
                        self.quit_menu();
                    }
                }
                true
            }
            MenuAction::Confirm => {
                let mut fields = BTreeMap::new();
                fields.insert("key_enter".to_string(), "true".to_string());
                dest.got_fields(fields);
                true
            }
            MenuAction::Escape => {
                if self.allow_close {
                    self.quit_menu();
                } else {
                    dest.got_text(QUIT_EVENT);
                }
                true
            }
            MenuAction::Quit => false,
        }
    }

    pub fn render<D: VideoDriver>(&self, driver: &mut D) -> Result<(), String> {
        if !self.active || self.spec.widgets.is_empty() {
            return Ok(());
        }
        let layout = self.layout(driver.screen_size());
        let scale = self.style.text_scale;
        let text_height = (GLYPH_HEIGHT * scale) as i32;

        // 1. Form background and border
        driver.fill_rect(self.style.background_color, layout.bounds)?;
        driver.draw_rect(self.style.border_color, layout.bounds)?;

        // 2. Widgets in declaration order
        for (i, widget) in self.spec.widgets.iter().enumerate() {
            match widget {
                Widget::Label { pos, text } => {
                    let (x, y) = layout.point(*pos);
                    draw_simple_text(driver, text, x, y, self.style.label_color, scale)?;
                }
                Widget::Button {
                    pos, size, label, ..
                } => {
                    let rect = layout.rect(*pos, *size);
                    let fill = if self.hovered == Some(i) {
                        self.style.highlight_color
                    } else {
                        self.style.button_color
                    };
                    driver.fill_rect(fill, rect)?;
                    driver.draw_rect(self.style.border_color, rect)?;

                    let label_width = text_width(label, scale) as i32;
                    let x = rect.x() + (rect.width() as i32 - label_width) / 2;
                    let y = rect.y() + (rect.height() as i32 - text_height) / 2;
                    draw_simple_text(driver, label, x, y, self.style.button_text_color, scale)?;
                }
            }
        }

        Ok(())
    }
}

impl Default for WidgetForm {
    fn default() -> Self {
        Self::new()
    }
}
