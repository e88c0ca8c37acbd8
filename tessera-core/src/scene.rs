//! The "Hello World" screen
//!
//! A title label at the top of the screen and a centered button. Clicking
//! the button replaces the title text.

use tessera_ui::{Align, Event, EventCode, Ui, UiError, WidgetId};

pub const TITLE_TEXT: &str = "Hello, World!";
pub const BUTTON_TEXT: &str = "Click Me";
pub const PRESSED_TEXT: &str = "Button Pressed!";

/// Distance of the title from the top edge
pub const TITLE_Y_OFFSET: i32 = 20;

/// Handles of the scene widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Scene {
    pub title: WidgetId,
    pub button: WidgetId,
    pub button_label: WidgetId,
}

/// Create the scene widgets on the active screen
pub fn build(ui: &mut Ui<'_>) -> Result<Scene, UiError> {
    let screen = ui.screen();

    let title = ui.create_label(screen, TITLE_TEXT)?;
    ui.align(title, Align::TopMid, 0, TITLE_Y_OFFSET)?;

    let button = ui.create_button(screen)?;
    ui.align(button, Align::Center, 0, 0)?;

    let button_label = ui.create_label(button, BUTTON_TEXT)?;
    ui.align(button_label, Align::Center, 0, 0)?;

    ui.add_event_cb(button, on_button_clicked, EventCode::Clicked, Some(title))?;

    Ok(Scene {
        title,
        button,
        button_label,
    })
}

fn on_button_clicked(event: &mut Event<'_>) {
    if let Some(title) = event.user_data() {
        let _ = event.set_text(title, PRESSED_TEXT);
    }
}
