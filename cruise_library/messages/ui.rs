//! On-screen buttons
//!
//! Four buttons: two labels, the current speed readout and the setpoint
//! entry. The operator clicks the entry and types a new target in km/h.

use serde::{Deserialize, Serialize};
use std::ops::BitOr;

pub const SPEED_LABEL_ID: u8 = 0;
pub const SPEED_READOUT_ID: u8 = 1;
pub const TARGET_LABEL_ID: u8 = 2;
pub const TARGET_ENTRY_ID: u8 = 3;

/// Prompt shown above the setpoint text field
pub const TARGET_ENTRY_CAPTION: &str = "Target speed in km/h";

/// Initialise the text field with the button text, allow 10 characters
pub const TARGET_ENTRY_TYPE_IN: u8 = 128 + 10;

/// Button style bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ButtonStyle(pub u8);

impl ButtonStyle {
    pub const CLICK: ButtonStyle = ButtonStyle(8);
    pub const DARK: ButtonStyle = ButtonStyle(32);

    pub fn contains(self, other: ButtonStyle) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ButtonStyle {
    type Output = ButtonStyle;

    fn bitor(self, rhs: ButtonStyle) -> ButtonStyle {
        ButtonStyle(self.0 | rhs.0)
    }
}

/// Position and size on the 200x200 screen grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ButtonRect {
    pub left: u8,
    pub top: u8,
    pub width: u8,
    pub height: u8,
}

impl ButtonRect {
    pub const fn new(left: u8, top: u8, width: u8, height: u8) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Create or redraw one button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiDraw {
    pub click_id: u8,
    pub rect: ButtonRect,
    pub style: ButtonStyle,
    /// 0 = not editable
    pub type_in: u8,
    /// Prompt for editable buttons
    pub caption: Option<String>,
    pub text: String,
}

impl UiDraw {
    fn label(click_id: u8, rect: ButtonRect, text: &str) -> Self {
        Self {
            click_id,
            rect,
            style: ButtonStyle::DARK,
            type_in: 0,
            caption: None,
            text: text.to_string(),
        }
    }

    pub fn speed_label() -> Self {
        Self::label(SPEED_LABEL_ID, ButtonRect::new(50, 50, 10, 5), "Speed:")
    }

    /// Current speed in whole km/h, `None` before the first sample
    pub fn speed_readout(kmh: Option<i64>) -> Self {
        let text = match kmh {
            Some(v) => v.to_string(),
            None => "-".to_string(),
        };
        Self::label(SPEED_READOUT_ID, ButtonRect::new(60, 50, 5, 5), &text)
    }

    pub fn target_label() -> Self {
        Self::label(TARGET_LABEL_ID, ButtonRect::new(50, 55, 10, 5), "Target:")
    }

    /// Clickable setpoint entry showing the stored target
    pub fn target_entry(setpoint_kmh: i32) -> Self {
        Self {
            click_id: TARGET_ENTRY_ID,
            rect: ButtonRect::new(60, 55, 5, 5),
            style: ButtonStyle::DARK | ButtonStyle::CLICK,
            type_in: TARGET_ENTRY_TYPE_IN,
            caption: Some(TARGET_ENTRY_CAPTION.to_string()),
            text: setpoint_kmh.to_string(),
        }
    }

    /// Full layout drawn once per session
    pub fn initial_layout(setpoint_kmh: i32) -> Vec<UiDraw> {
        vec![
            Self::speed_label(),
            Self::speed_readout(None),
            Self::target_label(),
            Self::target_entry(setpoint_kmh),
        ]
    }
}
