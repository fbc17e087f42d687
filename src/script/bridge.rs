//! Owner of the Lua state that runs the menu script

use super::api::{self, MenuHost};
use crate::error::MenuError;
use crate::settings::MenuSettings;
use log::{error, info, warn};
use mlua::{Function, Lua, Table, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub struct MainMenuScript {
    lua: Lua,
    script_dir: PathBuf,
    /// Last runtime error, kept for display
    last_error: Option<String>,
}

impl MainMenuScript {
    pub fn new() -> Result<Self, MenuError> {
        let lua = Lua::new();
        let engine = lua.create_table()?;
        lua.globals().set("engine", engine)?;

        info!("Main menu scripting initialised ({})", lua_version(&lua));
        Ok(MainMenuScript {
            lua,
            script_dir: PathBuf::new(),
            last_error: None,
        })
    }

    fn engine(&self) -> mlua::Result<Table> {
        self.lua.globals().get("engine")
    }

    pub fn script_dir(&self) -> &Path {
        &self.script_dir
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Makes an error from an earlier session visible to the script as
    /// `engine.errormessage`
    pub fn set_error_message(&self, message: &str) -> Result<(), MenuError> {
        self.engine()?.set("errormessage", message)?;
        Ok(())
    }

    /// Runs `body` with the `engine.*` host functions bound to `host`
    fn with_host<R>(
        &self,
        host: &mut dyn MenuHost,
        body: impl FnOnce(&Lua) -> mlua::Result<R>,
    ) -> mlua::Result<R> {
        let engine = self.engine()?;
        let host = RefCell::new(host);
        let script_dir = self.script_dir.to_string_lossy().to_string();

        self.lua.scope(|scope| {
            api::install(scope, &engine, &host, &script_dir)?;
            body(&self.lua)
        })
    }

    /// Loads and runs a script file as chunk `name`
    pub fn load_mod(&mut self, host: &mut dyn MenuHost, path: &Path, name: &str) -> Result<(), MenuError> {
        let load_error = |reason: String| MenuError::ScriptLoad {
            path: path.to_path_buf(),
            reason,
        };

        let source = fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        self.with_host(host, |lua| {
            lua.load(source.as_str())
                .set_name(format!("@{}", path.display()))
                .exec()
        })
        .map_err(|e| load_error(e.to_string()))?;

        info!("Loaded menu script {} as {}", path.display(), name);
        Ok(())
    }

    /// Loads the configured menu script, falling back to the builtin one
    ///
    /// Fails with [`MenuError::NoMenuScript`] only if neither can be run.
    pub fn load_menu_script(&mut self, host: &mut dyn MenuHost, settings: &MenuSettings) -> Result<(), MenuError> {
        if let Some(custom) = settings.custom_menu_script() {
            self.script_dir = parent_dir(&custom);
            match self.load_mod(host, &custom, "__custommenu") {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!("{}", e);
                    warn!("Custom menu failed, falling back to builtin menu");
                    self.last_error = Some(e.to_string());
                }
            }
        }

        let builtin = settings.builtin_menu_script();
        self.script_dir = parent_dir(&builtin);
        match self.load_mod(host, &builtin, "__builtinmenu") {
            Ok(()) => Ok(()),
            Err(e) => {
                error!("{}", e);
                error!("Unable to load builtin menu");
                Err(MenuError::NoMenuScript)
            }
        }
    }

    /// Calls `engine.<handler>(arg)` if the script defines it. Errors are
    /// logged and kept as the displayable error message.
    fn dispatch(&mut self, host: &mut dyn MenuHost, handler: &str, arg: Value) -> bool {
        let result = self.with_host(host, |_| {
            let engine = self.engine()?;
            match engine.get::<Option<Function>>(handler)? {
                Some(func) => func.call::<()>(arg).map(|_| true),
                None => {
                    warn!("Menu script has no engine.{}", handler);
                    Ok(false)
                }
            }
        });

        match result {
            Ok(handled) => handled,
            Err(e) => {
                let err = MenuError::ScriptRuntime(e.to_string());
                error!("MAINMENU ERROR: {}", err);
                self.last_error = Some(err.to_string());
                false
            }
        }
    }

    /// Forwards pressed-button field values to `engine.button_handler`
    pub fn handle_buttons(&mut self, host: &mut dyn MenuHost, fields: &BTreeMap<String, String>) -> bool {
        let table = match self.lua.create_table_from(fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))) {
            Ok(table) => table,
            Err(e) => {
                error!("Cannot pass form fields to script: {}", e);
                return false;
            }
        };
        self.dispatch(host, "button_handler", Value::Table(table))
    }

    /// Forwards a free-form event to `engine.event_handler`
    pub fn handle_event(&mut self, host: &mut dyn MenuHost, event: &str) -> bool {
        let text = match self.lua.create_string(event) {
            Ok(text) => text,
            Err(e) => {
                error!("Cannot pass event to script: {}", e);
                return false;
            }
        };
        self.dispatch(host, "event_handler", Value::String(text))
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn lua_version(lua: &Lua) -> String {
    lua.globals()
        .get::<String>("_VERSION")
        .unwrap_or_else(|_| "Lua".to_string())
}
