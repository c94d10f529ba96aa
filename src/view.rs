mod koch_snowflake;

use crate::app::SnowflakeState;
use eframe::egui::Ui;
pub use koch_snowflake::KochSnowFlake;

pub trait View {
    fn name(&self) -> &'static str;
    fn ui(&mut self, ui: &mut Ui, state: &mut SnowflakeState);
}
