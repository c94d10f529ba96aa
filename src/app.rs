//! This module define main app logic

use crate::{
    config::SnowflakeConfig,
    koch::{Depth, Snowflake},
    view::*,
};
use eframe::{egui, epi};
use std::sync::Arc;

/// Current settings and the snowflake generated from them. A regeneration
/// replaces the whole `Arc`, so a renderer holding the old one keeps a
/// consistent value.
#[derive(Debug)]
pub struct SnowflakeState {
    config: SnowflakeConfig,
    snowflake: Arc<Snowflake>,
}

impl SnowflakeState {
    pub fn new(config: SnowflakeConfig) -> Self {
        let snowflake = Arc::new(Snowflake::new(config.depth, config.size));
        Self { config, snowflake }
    }

    pub fn config(&self) -> &SnowflakeConfig {
        &self.config
    }

    pub fn snowflake(&self) -> Arc<Snowflake> {
        self.snowflake.clone()
    }

    /// Regenerates the snowflake if `depth` differs from the current one.
    pub fn set_depth(&mut self, depth: Depth) {
        if self.config.depth == depth {
            return;
        }
        tracing::info!(from = %self.config.depth, to = %depth, "depth changed");
        self.config.depth = depth;
        self.snowflake = Arc::new(Snowflake::new(depth, self.config.size));
    }

    pub fn step_depth(&mut self, up: bool) {
        let depth = self.config.depth;
        let next = if up { depth.next() } else { depth.prev() };
        if let Some(depth) = next {
            self.set_depth(depth);
        }
    }

    /// Applies a typed character: `'0'..='5'` select a depth, `'+'`/`'-'` step it.
    /// Returns whether the key was recognized.
    pub fn handle_key(&mut self, key: char) -> bool {
        match key {
            '+' | '=' => self.step_depth(true),
            '-' => self.step_depth(false),
            _ => match Depth::from_key(key) {
                Some(depth) => self.set_depth(depth),
                None => return false,
            },
        }
        true
    }
}

impl Default for SnowflakeState {
    fn default() -> Self {
        Self::new(SnowflakeConfig::default())
    }
}

pub struct SnowflakeApp {
    selected: usize,
    state: SnowflakeState,
    views: Vec<Box<dyn View>>,
}

impl SnowflakeApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = restore_config(cc);
        tracing::info!(depth = %config.depth, size = config.size, "starting snowflake viewer");

        Self {
            selected: Default::default(),
            state: SnowflakeState::new(config),
            views: vec![
                Box::new(KochSnowFlake::<true>::new(cc)),
                Box::new(KochSnowFlake::<false>::new(cc)),
            ],
        }
    }

    fn handle_input(&mut self, ctx: &egui::Context) -> bool {
        let (keys, quit) = {
            let input = ctx.input();
            let keys: Vec<char> = input
                .events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Text(text) => Some(text.chars()),
                    _ => None,
                })
                .flatten()
                .collect();
            (keys, input.key_pressed(egui::Key::Escape))
        };
        if !ctx.wants_keyboard_input() {
            for key in keys {
                self.state.handle_key(key);
            }
        }
        quit
    }
}

#[cfg(feature = "persistence")]
fn restore_config(cc: &eframe::CreationContext<'_>) -> SnowflakeConfig {
    cc.storage
        .and_then(|storage| epi::get_value(storage, epi::APP_KEY))
        .unwrap_or_default()
}

#[cfg(not(feature = "persistence"))]
fn restore_config(_cc: &eframe::CreationContext<'_>) -> SnowflakeConfig {
    SnowflakeConfig::default()
}

impl epi::App for SnowflakeApp {
    /// Called by the frame work to save state before shutdown.
    /// Note that you must enable the `persistence` feature for this to work.
    #[cfg(feature = "persistence")]
    fn save(&mut self, storage: &mut dyn epi::Storage) {
        epi::set_value(storage, epi::APP_KEY, self.state.config());
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        if self.handle_input(ctx) {
            frame.quit();
        }
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                egui::widgets::global_dark_light_mode_switch(ui);

                ui.menu_button("File", |ui| {
                    if ui.button("Quit").clicked() {
                        frame.quit();
                    }
                });
                for i in 0..self.views.len() {
                    if ui
                        .selectable_label(i == self.selected, self.views[i].name())
                        .clicked()
                    {
                        self.selected = i
                    }
                }
                ui.separator();
                ui.label(format!("Depth {}", self.state.config().depth));
            });
        });
        let state = &mut self.state;
        let view = &mut self.views[self.selected];
        egui::CentralPanel::default().show(ctx, |ui| view.ui(ui, state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_select_depth() {
        let mut state = SnowflakeState::default();
        assert!(state.handle_key('2'));
        assert_eq!(state.config().depth.get(), 2);
        assert_eq!(state.snowflake().depth().get(), 2);
        assert!(state.handle_key('0'));
        assert_eq!(state.snowflake().vertex_count(), 3);
        assert!(!state.handle_key('9'));
        assert!(!state.handle_key('q'));
        assert_eq!(state.config().depth.get(), 0);
    }

    #[test]
    fn step_is_bounded() {
        let mut state = SnowflakeState::default();
        state.handle_key('0');
        state.handle_key('-');
        assert_eq!(state.config().depth, Depth::ZERO);
        for _ in 0..20 {
            state.handle_key('+');
        }
        assert_eq!(state.config().depth, Depth::MAX);
    }

    #[test]
    fn regeneration_swaps_snowflake() {
        let mut state = SnowflakeState::default();
        let before = state.snowflake();
        state.set_depth(Depth::DEFAULT);
        assert!(Arc::ptr_eq(&before, &state.snowflake()));
        state.handle_key('1');
        let after = state.snowflake();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.depth(), Depth::DEFAULT);
        assert_eq!(after.vertex_count(), 12);
    }
}
