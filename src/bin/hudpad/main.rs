//! hudpad - interactive terminal pad for the procedural sound engine
//!
//! Run with: cargo run --bin hudpad

mod app;
mod ui;

use app::HudPad;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    HudPad::new().intensity_step(0.05).run()
}
