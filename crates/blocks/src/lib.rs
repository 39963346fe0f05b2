mod drag;
mod drop_target;
mod editor;
mod handle;
mod palette;
mod prompt;

pub use drop_target::*;
pub use editor::*;
pub use handle::*;
pub use palette::*;

use gpui::App;

pub fn init(cx: &mut App) {
    editor::init(cx);
}
