//! Main menu shell
//!
//! [`MenuShell`] owns every part of the menu screen: texture layers, cloud
//! backdrop, widget form, script bridge and sound manager. It runs the
//! per-frame loop and tears everything down in a fixed order.
//!
//! The parts a script may touch live in [`ShellHost`], which is lent to the
//! script bridge for the duration of each callback.

use crate::clouds::CloudBackdrop;
use crate::compositor::FrameCompositor;
use crate::error::MenuError;
use crate::frame_limiter::{Clock, FrameRateLimiter};
use crate::gui::{FormEvent, TextDest, WidgetForm};
use crate::input_system::{InputSource, MenuAction};
use crate::net;
use crate::script::{MainMenuScript, MenuHost};
use crate::settings::MenuSettings;
use crate::sound::{SimpleSoundSpec, SoundSlot};
use crate::text::{draw_simple_text, GLYPH_HEIGHT, TopLeftText};
use crate::texture_layers::{TextureLayer, TextureLayerStore};
use crate::video::VideoDriver;
use log::{debug, info, trace, warn};
use sdl2::pixels::Color;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

const ERROR_TEXT_COLOR: Color = Color::RGB(255, 80, 80);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    Constructing,
    ScriptLoaded,
    Running,
    TornDown,
}

/// Screen state reachable from menu scripts
pub struct ShellHost<D: VideoDriver> {
    driver: D,
    textures: TextureLayerStore<D::Texture>,
    clouds_enabled: bool,
    topleft: TopLeftText,
    form: WidgetForm,
    /// `None` once torn down
    sound: Option<SoundSlot>,
    settings: MenuSettings,
    settings_dirty: bool,
    kill: bool,
}

impl<D: VideoDriver> ShellHost<D> {
    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn textures(&self) -> &TextureLayerStore<D::Texture> {
        &self.textures
    }

    pub fn clouds_enabled(&self) -> bool {
        self.clouds_enabled
    }

    pub fn topleft(&self) -> &TopLeftText {
        &self.topleft
    }

    pub fn form(&self) -> &WidgetForm {
        &self.form
    }

    pub fn settings(&self) -> &MenuSettings {
        &self.settings
    }

    /// Whether a script changed a setting since startup
    pub fn settings_dirty(&self) -> bool {
        self.settings_dirty
    }

    /// Whether the menu was asked to close
    pub fn quit_requested(&self) -> bool {
        self.kill
    }
}

impl<D: VideoDriver> MenuHost for ShellHost<D> {
    fn set_background(&mut self, layer: TextureLayer, path: &str) -> bool {
        self.textures.set_texture(&mut self.driver, layer, path)
    }

    fn set_clouds(&mut self, enabled: bool) {
        if enabled != self.clouds_enabled {
            debug!("Clouds {}", if enabled { "enabled" } else { "disabled" });
        }
        self.clouds_enabled = enabled;
    }

    fn set_topleft_text(&mut self, text: &str) {
        self.topleft.set_suffix(text);
    }

    fn update_formspec(&mut self, source: &str) {
        self.form.set_form_source(source);
    }

    fn download_file(&mut self, url: &str, target: &str) -> bool {
        net::download_file(url, Path::new(target), &self.settings.version_label)
    }

    fn play_sound(&mut self, spec: &SimpleSoundSpec, looped: bool) -> i32 {
        match &self.sound {
            Some(slot) => slot.get().play_sound(spec, looped),
            None => -1,
        }
    }

    fn stop_sound(&mut self, handle: i32) {
        if let Some(slot) = &self.sound {
            slot.get().stop_sound(handle);
        }
    }

    fn close(&mut self) {
        info!("Main menu close requested");
        self.kill = true;
    }

    fn setting_get(&self, key: &str) -> Option<String> {
        self.settings.get(key)
    }

    fn setting_set(&mut self, key: &str, value: &str) -> bool {
        match self.settings.set(key, value) {
            Ok(()) => {
                self.settings_dirty = true;
                true
            }
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }
}

pub struct MenuShell<D: VideoDriver> {
    host: ShellHost<D>,
    script: Option<MainMenuScript>,
    text_dest: TextDest,
    compositor: FrameCompositor,
    clouds: Option<CloudBackdrop>,
    clock: Rc<dyn Clock>,
    state: ShellState,
}

impl<D: VideoDriver> MenuShell<D> {
    /// Builds the menu and loads its script
    ///
    /// # Parameters
    ///
    /// - `driver`: Video backend that owns the window
    /// - `settings`: Loaded settings. Scripts may change them later
    /// - `sound`: Owned sound manager, or the shared silent one
    /// - `clock`: Time source for cloud animation and frame pacing
    /// - `pending_error`: Error left over from an earlier session, handed to
    ///   the script as `engine.errormessage`
    ///
    /// # Returns
    ///
    /// A shell in the `ScriptLoaded` state. Fails only if no menu script can
    /// be loaded; anything built so far is released before returning.
    ///
    /// # Example
    ///
    /// ```rust
    /// let clock: Rc<dyn Clock> = Rc::new(SystemClock::new());
    /// let mut shell = MenuShell::new(driver, settings, sound, clock, None)?;
    /// shell.run(&mut input)?;
    /// ```
    pub fn new(
        driver: D,
        settings: MenuSettings,
        sound: SoundSlot,
        clock: Rc<dyn Clock>,
        pending_error: Option<&str>,
    ) -> Result<Self, MenuError> {
        let mut form = WidgetForm::new();
        form.allow_close(false);

        let host = ShellHost {
            driver,
            textures: TextureLayerStore::new(),
            clouds_enabled: settings.enable_clouds,
            topleft: TopLeftText::new(&settings.version_label),
            form,
            sound: Some(sound),
            settings,
            settings_dirty: false,
            kill: false,
        };

        // Built before anything can fail so that Drop cleans up partial state
        let mut shell = MenuShell {
            compositor: FrameCompositor::new(FrameRateLimiter::new(host.settings.fps_max)),
            host,
            script: None,
            text_dest: TextDest::new(),
            clouds: None,
            clock,
            state: ShellState::Constructing,
        };

        let mut script = MainMenuScript::new()?;
        if let Some(message) = pending_error {
            script.set_error_message(message)?;
        }

        let settings = shell.host.settings.clone();
        script.load_menu_script(&mut shell.host, &settings)?;
        shell.script = Some(script);
        shell.state = ShellState::ScriptLoaded;

        info!("Main menu ready");
        Ok(shell)
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    pub fn host(&self) -> &ShellHost<D> {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut ShellHost<D> {
        &mut self.host
    }

    pub fn script(&self) -> Option<&MainMenuScript> {
        self.script.as_ref()
    }

    pub fn clouds(&self) -> Option<&CloudBackdrop> {
        self.clouds.as_ref()
    }

    /// Latest script error, shown on screen until the script is replaced
    pub fn error_message(&self) -> Option<&str> {
        self.script.as_ref().and_then(|s| s.last_error())
    }

    pub fn set_texture(&mut self, layer: TextureLayer, path: &str) -> bool {
        self.host.set_background(layer, path)
    }

    pub fn set_clouds_enabled(&mut self, enabled: bool) {
        self.host.set_clouds(enabled);
    }

    pub fn set_topleft_text(&mut self, text: &str) {
        self.host.set_topleft_text(text);
    }

    pub fn play_sound(&mut self, spec: &SimpleSoundSpec, looped: bool) -> i32 {
        self.host.play_sound(spec, looped)
    }

    pub fn stop_sound(&mut self, handle: i32) {
        self.host.stop_sound(handle);
    }

    pub fn download_file(&mut self, url: &str, target: &str) -> bool {
        self.host.download_file(url, target)
    }

    /// Forwards pressed-button fields to the script
    pub fn on_form_fields(&mut self, fields: &BTreeMap<String, String>) {
        if let Some(script) = self.script.as_mut() {
            script.handle_buttons(&mut self.host, fields);
        }
    }

    /// Forwards a free-form event to the script
    pub fn on_event(&mut self, text: &str) {
        if let Some(script) = self.script.as_mut() {
            script.handle_event(&mut self.host, text);
        }
    }

    /// Creates the cloud backdrop and enters the running state
    pub fn start(&mut self) {
        if self.state != ShellState::ScriptLoaded {
            return;
        }
        self.clouds = Some(CloudBackdrop::init(self.clock.as_ref()));
        self.state = ShellState::Running;
        debug!("Main menu running");
    }

    /// Handles one frame's input and draws the frame
    ///
    /// Returns `false` once the menu should stop.
    pub fn run_frame(&mut self, actions: &[MenuAction]) -> Result<bool, MenuError> {
        match self.state {
            ShellState::TornDown | ShellState::Constructing => return Ok(false),
            ShellState::ScriptLoaded => self.start(),
            ShellState::Running => {}
        }

        let screen = self.host.driver.screen_size();
        for action in actions {
            if *action == MenuAction::Quit {
                info!("Window closed");
                self.host.kill = true;
                continue;
            }
            self.host.form.handle_action(action, screen, &mut self.text_dest);
        }

        for event in self.text_dest.drain() {
            match event {
                FormEvent::Fields(fields) => self.on_form_fields(&fields),
                FormEvent::Text(text) => self.on_event(&text),
            }
        }

        if self.host.kill {
            return Ok(false);
        }

        self.draw_frame()?;
        Ok(!self.host.kill)
    }

    fn draw_frame(&mut self) -> Result<(), MenuError> {
        self.compositor.set_fps_max(self.host.settings.fps_max);
        let error = self.script.as_ref().and_then(|s| s.last_error());
        let ShellHost {
            driver,
            textures,
            clouds_enabled,
            topleft,
            form,
            ..
        } = &mut self.host;
        let clouds = if *clouds_enabled { self.clouds.as_mut() } else { None };

        let report = self
            .compositor
            .compose(driver, textures, clouds, self.clock.as_ref(), |driver| {
                topleft.render(driver)?;
                form.render(driver)?;
                if let Some(message) = error {
                    draw_error_text(driver, message)?;
                }
                Ok(())
            })
            .map_err(MenuError::Video)?;

        trace!("Frame done (clouds: {}, slept {}ms)", report.clouds, report.slept_ms);
        Ok(())
    }

    /// Runs frames until the window is closed or the script closes the menu
    pub fn run(&mut self, input: &mut dyn InputSource) -> Result<(), MenuError> {
        self.start();
        info!("Entering main menu loop");

        loop {
            let actions = input.poll_actions();
            if !self.run_frame(&actions)? {
                break;
            }
        }

        info!("Leaving main menu loop");
        Ok(())
    }

    /// Releases the form, script, owned sound manager, texture bindings and
    /// clouds, in that order. Later calls do nothing.
    pub fn teardown(&mut self) {
        if self.state == ShellState::TornDown {
            return;
        }

        self.host.form.quit_menu();
        self.text_dest.drain();

        if self.script.take().is_some() {
            debug!("Released menu script");
        }

        if let Some(slot) = self.host.sound.take() {
            if slot.is_owned() {
                debug!("Released sound manager");
            }
        }

        self.host.textures.clear();
        self.host.topleft.clear();

        if self.clouds.take().is_some() {
            debug!("Released cloud backdrop");
        }

        self.state = ShellState::TornDown;
        info!("Main menu torn down");
    }
}

impl<D: VideoDriver> Drop for MenuShell<D> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Draws `message` along the bottom edge
fn draw_error_text<D: VideoDriver>(driver: &mut D, message: &str) -> Result<(), String> {
    let (w, h) = driver.screen_size();
    let x = (w as f32 * 0.02) as i32 + 4;
    let y = h as i32 - (h as f32 * 0.02) as i32 - (GLYPH_HEIGHT * 2) as i32;
    draw_simple_text(driver, message, x, y, ERROR_TEXT_COLOR, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::{CLEAR_COLOR, FLAT_BACKGROUND_COLOR};
    use crate::frame_limiter::testing::ManualClock;
    use crate::frame_limiter::IDLE_SLEEP_MS;
    use crate::sound::{SoundManager, DUMMY_SOUND_MANAGER};
    use crate::video::testing::{DrawCall, RecordingDriver};
    use sdl2::rect::Rect;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::fs;

    const MENU_SCRIPT: &str = r#"
        engine.set_topleft_text(" test")
        engine.update_formspec("size[8,5]button[1,2;3,1;btn_flat;Flat]button_exit[4,2;3,1;btn_quit;Quit]")
        engine.set_background("header", engine.get_scriptdir() .. "/header.png")
        function engine.button_handler(fields)
            if fields.btn_flat then engine.set_clouds(false) end
            if fields.quit then engine.close() end
        end
        function engine.event_handler(event)
            if event == "MenuQuit" then engine.close() end
        end
    "#;

    struct Fixture {
        dir: tempfile::TempDir,
        clock: Rc<ManualClock>,
    }

    impl Fixture {
        fn new(script: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let builtin = dir.path().join("share/builtin");
            fs::create_dir_all(&builtin).unwrap();
            fs::write(builtin.join("mainmenu.lua"), script).unwrap();
            fs::write(builtin.join("header.png"), b"png").unwrap();
            Fixture {
                dir,
                clock: Rc::new(ManualClock::at(1_000)),
            }
        }

        fn settings(&self) -> MenuSettings {
            MenuSettings {
                path_share: self.dir.path().join("share"),
                path_user: self.dir.path().join("user"),
                version_label: "voxel-menu test".to_string(),
                ..Default::default()
            }
        }

        fn shell(&self, sound: SoundSlot) -> MenuShell<RecordingDriver> {
            let clock: Rc<dyn Clock> = self.clock.clone();
            MenuShell::new(RecordingDriver::new(1024, 768), self.settings(), sound, clock, None).unwrap()
        }
    }

    fn shared_sound() -> SoundSlot {
        SoundSlot::new(None, &DUMMY_SOUND_MANAGER)
    }

    #[derive(Default)]
    struct CountingSound {
        played: Rc<Cell<i32>>,
        stopped: Rc<RefCell<Vec<i32>>>,
        dropped: Rc<Cell<bool>>,
    }

    impl SoundManager for CountingSound {
        fn play_sound(&self, _spec: &SimpleSoundSpec, _looped: bool) -> i32 {
            self.played.set(self.played.get() + 1);
            self.played.get()
        }

        fn stop_sound(&self, handle: i32) {
            self.stopped.borrow_mut().push(handle);
        }
    }

    impl Drop for CountingSound {
        fn drop(&mut self) {
            self.dropped.set(true);
        }
    }

    struct ScriptedInput {
        frames: VecDeque<Vec<MenuAction>>,
        polls: Rc<RefCell<usize>>,
    }

    impl InputSource for ScriptedInput {
        fn poll_actions(&mut self) -> Vec<MenuAction> {
            *self.polls.borrow_mut() += 1;
            self.frames.pop_front().unwrap_or_else(|| vec![MenuAction::Quit])
        }
    }

    #[test]
    fn test_construction_loads_script() {
        let fixture = Fixture::new(MENU_SCRIPT);
        let shell = fixture.shell(shared_sound());

        assert_eq!(shell.state(), ShellState::ScriptLoaded);
        assert_eq!(shell.host().topleft().text(), "voxel-menu test test");
        assert_eq!(shell.host().form().widgets().len(), 2);
        assert!(shell.host().textures().is_bound(TextureLayer::Header));
        assert!(shell.clouds().is_none());
        assert!(shell.error_message().is_none());
    }

    #[test]
    fn test_missing_scripts_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let settings = MenuSettings {
            path_share: dir.path().join("share"),
            ..Default::default()
        };
        let clock: Rc<dyn Clock> = Rc::new(ManualClock::at(0));
        let result = MenuShell::new(RecordingDriver::new(640, 480), settings, shared_sound(), clock, None);
        assert!(matches!(result, Err(MenuError::NoMenuScript)));
    }

    #[test]
    fn test_partial_construction_releases_owned_sound() {
        let dir = tempfile::tempdir().unwrap();
        let settings = MenuSettings {
            path_share: dir.path().join("share"),
            ..Default::default()
        };
        let dropped = Rc::new(Cell::new(false));
        let sound = CountingSound {
            played: Default::default(),
            stopped: Default::default(),
            dropped: Rc::clone(&dropped),
        };
        let clock: Rc<dyn Clock> = Rc::new(ManualClock::at(0));

        let result = MenuShell::new(
            RecordingDriver::new(640, 480),
            settings,
            SoundSlot::new(Some(Box::new(sound)), &DUMMY_SOUND_MANAGER),
            clock,
            None,
        );
        assert!(result.is_err());
        assert!(dropped.get());
    }

    #[test]
    fn test_first_frame_starts_clouds_and_draws_header() {
        let fixture = Fixture::new(MENU_SCRIPT);
        let mut shell = fixture.shell(shared_sound());

        assert!(shell.run_frame(&[]).unwrap());
        assert_eq!(shell.state(), ShellState::Running);
        assert!(shell.clouds().is_some());

        let calls = &shell.host().driver().calls;
        assert_eq!(calls.first(), Some(&DrawCall::Begin(CLEAR_COLOR)));
        assert_eq!(calls.last(), Some(&DrawCall::End));
        assert!(!calls.contains(&DrawCall::Fill(FLAT_BACKGROUND_COLOR, Rect::new(0, 0, 1024, 768))));

        let images = shell.host().driver().images();
        assert_eq!(images.len(), 1);
        assert!(images[0].0.ends_with("header.png"));
        assert_eq!(images[0].1, Rect::new(256, 54, 512, 64));
    }

    #[test]
    fn test_button_disables_clouds() {
        let fixture = Fixture::new(MENU_SCRIPT);
        let mut shell = fixture.shell(shared_sound());
        shell.run_frame(&[]).unwrap();

        // btn_flat spans x 320..512, y 352..416 on 1024x768
        assert!(shell.run_frame(&[MenuAction::Click(400, 380)]).unwrap());
        assert!(!shell.host().clouds_enabled());

        shell.host_mut().driver.calls.clear();
        fixture.clock.sleeps.borrow_mut().clear();
        shell.run_frame(&[]).unwrap();

        assert!(shell.host().driver().calls.contains(&DrawCall::Fill(
            FLAT_BACKGROUND_COLOR,
            Rect::new(0, 0, 1024, 768)
        )));
        assert_eq!(*fixture.clock.sleeps.borrow(), vec![IDLE_SLEEP_MS]);
    }

    #[test]
    fn test_cloud_frames_are_paced() {
        let fixture = Fixture::new(MENU_SCRIPT);
        let mut shell = fixture.shell(shared_sound());
        shell.run_frame(&[]).unwrap();

        fixture.clock.sleeps.borrow_mut().clear();
        fixture.clock.set(fixture.clock.now.get() + 5);
        shell.run_frame(&[]).unwrap();

        // 60 fps cap; the manual clock does not move while drawing
        assert_eq!(*fixture.clock.sleeps.borrow(), vec![16]);
        assert_eq!(shell.clouds().unwrap().dtime(), 0.021);
    }

    #[test]
    fn test_script_fps_change_reaches_limiter() {
        let fixture = Fixture::new(
            r#"
            engine.update_formspec("size[8,5]button[1,2;3,1;btn_slow;Slow]")
            function engine.button_handler(fields)
                if fields.btn_slow then engine.setting_set("fps_max", 30) end
            end
            "#,
        );
        let mut shell = fixture.shell(shared_sound());
        shell.run_frame(&[]).unwrap();

        fixture.clock.sleeps.borrow_mut().clear();
        shell.run_frame(&[MenuAction::Click(400, 380)]).unwrap();
        assert_eq!(shell.host().settings().fps_max, 30.0);
        assert_eq!(*fixture.clock.sleeps.borrow(), vec![33]);
    }

    #[test]
    fn test_escape_asks_script_to_quit() {
        let fixture = Fixture::new(MENU_SCRIPT);
        let mut shell = fixture.shell(shared_sound());
        shell.run_frame(&[]).unwrap();

        assert!(!shell.run_frame(&[MenuAction::Escape]).unwrap());
        assert!(shell.host().quit_requested());
        assert!(shell.host().form().is_active());
    }

    #[test]
    fn test_run_stops_on_window_close() {
        let fixture = Fixture::new(MENU_SCRIPT);
        let mut shell = fixture.shell(shared_sound());
        let polls = Rc::new(RefCell::new(0));
        let mut input = ScriptedInput {
            frames: VecDeque::from(vec![vec![], vec![MenuAction::MouseMove(10, 10)]]),
            polls: Rc::clone(&polls),
        };

        shell.run(&mut input).unwrap();
        assert_eq!(*polls.borrow(), 3);
        assert_eq!(shell.state(), ShellState::Running);
    }

    #[test]
    fn test_script_error_is_displayed() {
        let fixture = Fixture::new(
            r#"
            engine.update_formspec("size[8,5]button[1,2;3,1;btn_bad;Bad]")
            function engine.button_handler(fields) error("broken handler") end
            "#,
        );
        let mut shell = fixture.shell(shared_sound());
        shell.run_frame(&[]).unwrap();

        assert!(shell.run_frame(&[MenuAction::Click(400, 380)]).unwrap());
        assert!(shell.error_message().unwrap().contains("broken handler"));
        assert!(shell
            .host()
            .driver()
            .calls
            .iter()
            .any(|c| matches!(c, DrawCall::Fill(color, _) if *color == ERROR_TEXT_COLOR)));
    }

    #[test]
    fn test_pending_error_reaches_script() {
        let fixture = Fixture::new(r#"engine.set_topleft_text(" " .. (engine.errormessage or "none"))"#);
        let clock: Rc<dyn Clock> = fixture.clock.clone();
        let shell = MenuShell::new(
            RecordingDriver::new(800, 600),
            fixture.settings(),
            shared_sound(),
            clock,
            Some("lost connection"),
        )
        .unwrap();

        assert_eq!(shell.host().topleft().text(), "voxel-menu test lost connection");
    }

    #[test]
    fn test_settings_changes_mark_dirty() {
        let fixture = Fixture::new(
            r#"
            engine.setting_set("last_tab", "online")
            assert(engine.setting_set("fps_max", "fast") == false)
            "#,
        );
        let shell = fixture.shell(shared_sound());

        assert!(shell.host().settings_dirty());
        assert_eq!(shell.host().settings().get("last_tab").as_deref(), Some("online"));
        assert_eq!(shell.host().settings().fps_max, 60.0);
    }

    #[test]
    fn test_teardown_releases_everything_once() {
        let fixture = Fixture::new(MENU_SCRIPT);
        let played = Rc::new(Cell::new(0));
        let dropped = Rc::new(Cell::new(false));
        let sound = CountingSound {
            played: Rc::clone(&played),
            stopped: Default::default(),
            dropped: Rc::clone(&dropped),
        };
        let mut shell = fixture.shell(SoundSlot::new(Some(Box::new(sound)), &DUMMY_SOUND_MANAGER));
        shell.run_frame(&[]).unwrap();

        assert_eq!(shell.play_sound(&SimpleSoundSpec::new("click"), false), 1);

        shell.teardown();
        assert_eq!(shell.state(), ShellState::TornDown);
        assert!(dropped.get());
        assert!(shell.script().is_none());
        assert!(shell.clouds().is_none());
        assert!(!shell.host().form().is_active());
        assert!(!shell.host().textures().is_bound(TextureLayer::Header));
        assert_eq!(shell.host().driver().released_count(), 1);
        assert_eq!(shell.host().topleft().text(), "");

        shell.teardown();
        assert_eq!(shell.host().driver().released_count(), 1);
        assert_eq!(shell.play_sound(&SimpleSoundSpec::new("click"), false), -1);
        assert_eq!(played.get(), 1);
        assert!(!shell.run_frame(&[]).unwrap());
    }

    #[test]
    fn test_shipped_builtin_menu() {
        let settings = MenuSettings {
            path_share: Path::new(env!("CARGO_MANIFEST_DIR")).join("share"),
            path_user: std::env::temp_dir(),
            ..Default::default()
        };
        let clock: Rc<dyn Clock> = Rc::new(ManualClock::at(0));
        let mut shell =
            MenuShell::new(RecordingDriver::new(1024, 768), settings, shared_sound(), clock, None).unwrap();
        assert_eq!(shell.host().form().widgets().len(), 4);
        assert!(shell.host().clouds_enabled());

        // size[8,6] centred at 64px per unit: Settings button spans y 368..432
        shell.run_frame(&[MenuAction::Click(500, 400)]).unwrap();
        assert!(shell.host().form().form_source().contains("btn_clouds"));

        // Clouds toggle spans y 288..352
        shell.run_frame(&[MenuAction::Click(500, 300)]).unwrap();
        assert!(!shell.host().clouds_enabled());
        assert!(shell.host().settings_dirty());
        assert!(!shell.host().settings().enable_clouds);

        // Escape on a sub page returns to the main page instead of quitting
        assert!(shell.run_frame(&[MenuAction::Escape]).unwrap());
        assert!(shell.host().form().form_source().contains("btn_play"));
        assert!(!shell.run_frame(&[MenuAction::Escape]).unwrap());
    }

    #[test]
    fn test_top_left_text_drawn_before_form() {
        let fixture = Fixture::new(MENU_SCRIPT);
        let mut shell = fixture.shell(shared_sound());
        shell.run_frame(&[]).unwrap();

        let calls = &shell.host().driver().calls;
        let first_fill = |color: Color| {
            calls
                .iter()
                .position(|call| matches!(call, DrawCall::Fill(fill, _) if *fill == color))
        };
        let text = first_fill(Color::RGB(255, 255, 255)).unwrap();
        let form = first_fill(crate::gui::form::FormStyle::default().background_color).unwrap();
        assert!(text < form);
    }

    #[test]
    fn test_shell_operations_reach_host() {
        let fixture = Fixture::new(MENU_SCRIPT);
        let stopped = Rc::new(RefCell::new(Vec::new()));
        let sound = CountingSound {
            played: Default::default(),
            stopped: Rc::clone(&stopped),
            dropped: Default::default(),
        };
        let mut shell = fixture.shell(SoundSlot::new(Some(Box::new(sound)), &DUMMY_SOUND_MANAGER));
        shell.run_frame(&[]).unwrap();

        shell.set_topleft_text(" - offline");
        assert_eq!(shell.host().topleft().text(), "voxel-menu test - offline");

        let handle = shell.play_sound(&SimpleSoundSpec::new("menu_play"), true);
        shell.stop_sound(handle);
        assert_eq!(*stopped.borrow(), vec![handle]);

        shell.set_clouds_enabled(false);
        assert!(!shell.host().clouds_enabled());
        shell.host_mut().driver.calls.clear();
        shell.run_frame(&[]).unwrap();
        assert!(shell.host().driver().calls.contains(&DrawCall::Fill(
            FLAT_BACKGROUND_COLOR,
            Rect::new(0, 0, 1024, 768)
        )));

        let target = fixture.dir.path().join("user/unreachable.bin");
        assert!(!shell.download_file("http://127.0.0.1:1/menu.zip", &target.to_string_lossy()));
        assert!(!target.exists());
    }

    #[test]
    fn test_builtin_menu_escapes_error_message() {
        let settings = MenuSettings {
            path_share: Path::new(env!("CARGO_MANIFEST_DIR")).join("share"),
            path_user: std::env::temp_dir(),
            ..Default::default()
        };
        let clock: Rc<dyn Clock> = Rc::new(ManualClock::at(0));
        let shell = MenuShell::new(
            RecordingDriver::new(1024, 768),
            settings,
            shared_sound(),
            clock,
            Some(r"bad]state;x,y\z"),
        )
        .unwrap();

        // Four menu widgets plus one label holding the whole message
        let widgets = shell.host().form().widgets();
        assert_eq!(widgets.len(), 5);
        assert!(matches!(
            &widgets[4],
            crate::gui::formspec::Widget::Label { text, .. } if text == r"Error: bad]state;x,y\z"
        ));
    }

    #[test]
    fn test_rebinding_through_shell_releases_previous() {
        let fixture = Fixture::new(MENU_SCRIPT);
        let mut shell = fixture.shell(shared_sound());
        let header = fixture.dir.path().join("share/builtin/header.png");
        let header = header.to_string_lossy().to_string();

        for _ in 0..3 {
            assert!(shell.set_texture(TextureLayer::Header, &header));
        }
        assert_eq!(shell.host().driver().released_count(), 3);

        assert!(!shell.set_texture(TextureLayer::Header, ""));
        assert_eq!(shell.host().driver().released_count(), 4);
        assert!(!shell.host().textures().is_bound(TextureLayer::Header));
    }
}
