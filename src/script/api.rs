//! `engine.*` functions exposed to menu scripts
//!
//! The functions are registered inside an `mlua` scope for the duration of a
//! single call into the script, borrowing the host mutably. Scripts must call
//! them through the `engine` table rather than keep references across calls.

use crate::sound::SimpleSoundSpec;
use crate::texture_layers::TextureLayer;
use log::warn;
use mlua::{Scope, Table, Value};
use std::cell::RefCell;

/// What a menu script may do to the screen around it
pub trait MenuHost {
    /// Binds an image to a texture layer. `false` if it could not be loaded.
    fn set_background(&mut self, layer: TextureLayer, path: &str) -> bool;

    fn set_clouds(&mut self, enabled: bool);

    /// Appends `text` to the version label in the top-left corner
    fn set_topleft_text(&mut self, text: &str);

    fn update_formspec(&mut self, source: &str);

    fn download_file(&mut self, url: &str, target: &str) -> bool;

    fn play_sound(&mut self, spec: &SimpleSoundSpec, looped: bool) -> i32;

    fn stop_sound(&mut self, handle: i32);

    /// Asks the menu loop to exit after the current frame
    fn close(&mut self);

    fn setting_get(&self, key: &str) -> Option<String>;

    fn setting_set(&mut self, key: &str, value: &str) -> bool;
}

fn sound_spec(value: Value) -> mlua::Result<SimpleSoundSpec> {
    match value {
        Value::String(name) => Ok(SimpleSoundSpec::new(&name.to_str()?)),
        Value::Table(table) => {
            let name: String = table.get("name")?;
            let gain: Option<f32> = table.get("gain")?;
            Ok(SimpleSoundSpec {
                name,
                gain: gain.unwrap_or(1.0),
            })
        }
        other => Err(mlua::Error::external(format!(
            "sound spec must be a string or table, got {}",
            other.type_name()
        ))),
    }
}

/// Installs the host-backed functions into `engine`
pub(super) fn install<'scope, 'env>(
    scope: &'scope Scope<'scope, 'env>,
    engine: &Table,
    host: &'env RefCell<&mut dyn MenuHost>,
    script_dir: &'env str,
) -> mlua::Result<()>
where
    'env: 'scope,
{
    engine.set(
        "set_background",
        scope.create_function(move |_, (layer, path): (String, String)| {
            match TextureLayer::from_name(&layer) {
                Some(layer) => Ok(host.borrow_mut().set_background(layer, &path)),
                None => {
                    warn!("Script used unknown texture layer \"{}\"", layer);
                    Ok(false)
                }
            }
        })?,
    )?;

    engine.set(
        "set_clouds",
        scope.create_function(move |_, enabled: bool| {
            host.borrow_mut().set_clouds(enabled);
            Ok(())
        })?,
    )?;

    engine.set(
        "set_topleft_text",
        scope.create_function(move |_, text: Option<String>| {
            host.borrow_mut().set_topleft_text(text.as_deref().unwrap_or(""));
            Ok(())
        })?,
    )?;

    engine.set(
        "update_formspec",
        scope.create_function(move |_, source: String| {
            host.borrow_mut().update_formspec(&source);
            Ok(())
        })?,
    )?;

    engine.set(
        "download_file",
        scope.create_function(move |_, (url, target): (String, String)| {
            Ok(host.borrow_mut().download_file(&url, &target))
        })?,
    )?;

    engine.set(
        "sound_play",
        scope.create_function(move |_, (spec, looped): (Value, Option<bool>)| {
            let spec = sound_spec(spec)?;
            Ok(host.borrow_mut().play_sound(&spec, looped.unwrap_or(false)))
        })?,
    )?;

    engine.set(
        "sound_stop",
        scope.create_function(move |_, handle: i32| {
            host.borrow_mut().stop_sound(handle);
            Ok(())
        })?,
    )?;

    engine.set(
        "close",
        scope.create_function(move |_, ()| {
            host.borrow_mut().close();
            Ok(())
        })?,
    )?;

    engine.set(
        "setting_get",
        scope.create_function(move |_, key: String| Ok(host.borrow().setting_get(&key)))?,
    )?;

    engine.set(
        "setting_set",
        scope.create_function(move |_, (key, value): (String, Value)| {
            let value = match value {
                Value::String(s) => s.to_str()?.to_string(),
                Value::Boolean(b) => b.to_string(),
                Value::Integer(i) => i.to_string(),
                Value::Number(n) => n.to_string(),
                other => {
                    return Err(mlua::Error::external(format!(
                        "cannot store a {} as setting \"{}\"",
                        other.type_name(),
                        key
                    )));
                }
            };
            Ok(host.borrow_mut().setting_set(&key, &value))
        })?,
    )?;

    engine.set(
        "get_scriptdir",
        scope.create_function(move |_, ()| Ok(script_dir.to_string()))?,
    )?;

    Ok(())
}
