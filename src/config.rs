use x11::{keysym, xlib};

use crate::actions::Action;
use crate::layouts::LAYOUTS;
use crate::monitor::ClientbarMode;

pub const TAGS: [&str; 9] = ["1", "2", "3", "4", "5", "6", "7", "8", "9"];
pub const TAG_MASK: u32 = (1 << TAGS.len()) - 1;

pub const FONT: &str = "monospace:size=12";

/* appearance */
pub const BORDER_PX: i32 = 0; /* border pixel of tiled windows */
pub const FLOAT_BORDER_PX: i32 = 1; /* border pixel of floating windows */
pub const SNAP: i32 = 32; /* snap region */
pub const SHOW_TAGBAR: bool = true;
pub const TAGS_ON_TOP: bool = true;
/* switch to a tag if it's not enabled and a new window opens there */
pub const FOLLOW_NEW_WINDOWS: bool = true;
/* viewing an already-viewed tagset reverts to the previous tagset */
pub const VIEW_TAG_TOGGLES: bool = true;
/* don't display tags with no clients assigned to them unless viewed */
pub const HIDE_INACTIVE_TAGS: bool = true;
/* respect size hints in tiled resizes */
pub const RESIZE_HINTS: bool = false;
/* move clients that aren't floating, marked or stack-top off screen */
pub const HIDE_BURIED_WINDOWS: bool = true;
pub const SHOW_CLIENTBAR: ClientbarMode = ClientbarMode::Auto;

/* layout(s) */
pub const MARKED_WIDTH: f32 = 0.55; /* width of the marked clients area [0.05..0.95] */

/* default layout per tag: entry 0 is the all-tag view, entry i is
 * tags[i - 1], referring into LAYOUTS by index */
pub const DEF_LAYOUTS: [usize; 1 + TAGS.len()] = [0; 1 + TAGS.len()];

pub struct Rule {
    pub class: Option<&'static str>,
    pub instance: Option<&'static str>,
    pub title: Option<&'static str>,
    pub tags: u32,
    pub is_floating: bool,
    pub monitor: i32,
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            class: Some("Gimp"),
            instance: None,
            title: None,
            tags: 0,
            is_floating: true,
            monitor: -1,
        },
        Rule {
            class: Some("Chromium"),
            instance: None,
            title: None,
            tags: 1 << 1,
            is_floating: false,
            monitor: -1,
        },
        Rule {
            class: Some("mpv"),
            instance: None,
            title: None,
            tags: 1 << 1,
            is_floating: true,
            monitor: -1,
        },
    ]
}

pub const MODKEY: u32 = xlib::Mod4Mask;

pub const TERM_CMD: &[&str] = &["alacritty"];
pub const MENU_CMD: &[&str] = &["dmenu_run"];

pub struct KeyBinding {
    pub mask: u32,
    pub keysym: u32,
    pub action: Action,
}

pub fn keys() -> Vec<KeyBinding> {
    let mut keys = vec![
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_r,
            action: Action::Spawn(MENU_CMD),
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_Return,
            action: Action::Spawn(TERM_CMD),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_d,
            action: Action::CycleStackareaSelection(1),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_a,
            action: Action::CycleStackareaSelection(-1),
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_d,
            action: Action::PushClientRight,
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_a,
            action: Action::PushClientLeft,
        },
        KeyBinding {
            mask: MODKEY | xlib::ControlMask,
            keysym: keysym::XK_d,
            action: Action::CycleFocus(1),
        },
        KeyBinding {
            mask: MODKEY | xlib::ControlMask,
            keysym: keysym::XK_a,
            action: Action::CycleFocus(-1),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_w,
            action: Action::CycleView(1),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_s,
            action: Action::CycleView(-1),
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_w,
            action: Action::ShiftTag(1),
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_s,
            action: Action::ShiftTag(-1),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_Tab,
            action: Action::ViewTag(0), /* previous tagset */
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_0,
            action: Action::ViewTag(!0), /* all tags */
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_0,
            action: Action::TagClient(!0),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_e,
            action: Action::ToggleMark,
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_h,
            action: Action::HideWindow,
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_space,
            action: Action::ToggleFloating,
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_f,
            action: Action::ToggleFullscreen,
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_Escape,
            action: Action::KillClient,
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_Right,
            action: Action::AdjustMarkedWidth(0.05),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_Left,
            action: Action::AdjustMarkedWidth(-0.05),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_z,
            action: Action::SetLayout(Some(&LAYOUTS[0])),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_x,
            action: Action::SetLayout(Some(&LAYOUTS[1])),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_c,
            action: Action::SetLayout(Some(&LAYOUTS[2])),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_v,
            action: Action::SetLayout(Some(&LAYOUTS[3])),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_space,
            action: Action::SetLayout(None),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_comma,
            action: Action::CycleFocusMonitor(-1),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_period,
            action: Action::CycleFocusMonitor(1),
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_comma,
            action: Action::SendToMonitor(-1),
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_period,
            action: Action::SendToMonitor(1),
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_q,
            action: Action::Quit,
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_t,
            action: Action::ToggleTagbar,
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_t,
            action: Action::SetClientbarMode(-1),
        },
    ];

    const TAG_KEYS: [u32; 9] = [
        keysym::XK_1,
        keysym::XK_2,
        keysym::XK_3,
        keysym::XK_4,
        keysym::XK_5,
        keysym::XK_6,
        keysym::XK_7,
        keysym::XK_8,
        keysym::XK_9,
    ];
    for (tag, &key) in TAG_KEYS.iter().enumerate() {
        keys.push(KeyBinding {
            mask: MODKEY,
            keysym: key,
            action: Action::ViewTag(1 << tag),
        });
        keys.push(KeyBinding {
            mask: MODKEY | xlib::ControlMask,
            keysym: key,
            action: Action::ToggleTagView(1 << tag),
        });
        keys.push(KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: key,
            action: Action::TagClient(1 << tag),
        });
        keys.push(KeyBinding {
            mask: MODKEY | xlib::ControlMask | xlib::ShiftMask,
            keysym: key,
            action: Action::ToggleTag(1 << tag),
        });
    }

    keys
}

/// Where a button press landed, resolved against the bar geometry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Click {
    TagBar,
    ClientBar,
    LayoutSymbol,
    StatusText,
    WinTitle,
    ClientWin,
    RootWin,
}

pub struct ButtonBinding {
    pub click: Click,
    pub mask: u32,
    pub button: u32,
    pub action: Action,
}

pub fn buttons() -> Vec<ButtonBinding> {
    vec![
        ButtonBinding {
            click: Click::LayoutSymbol,
            mask: 0,
            button: xlib::Button1,
            action: Action::SetLayout(None),
        },
        ButtonBinding {
            click: Click::LayoutSymbol,
            mask: 0,
            button: xlib::Button3,
            action: Action::SetLayout(Some(&LAYOUTS[2])),
        },
        ButtonBinding {
            click: Click::WinTitle,
            mask: 0,
            button: xlib::Button2,
            action: Action::ToggleMark,
        },
        ButtonBinding {
            click: Click::StatusText,
            mask: 0,
            button: xlib::Button2,
            action: Action::Spawn(TERM_CMD),
        },
        ButtonBinding {
            click: Click::ClientWin,
            mask: MODKEY,
            button: xlib::Button1,
            action: Action::DragWindow,
        },
        ButtonBinding {
            click: Click::ClientWin,
            mask: MODKEY,
            button: xlib::Button2,
            action: Action::ToggleFloating,
        },
        ButtonBinding {
            click: Click::ClientWin,
            mask: MODKEY,
            button: xlib::Button3,
            action: Action::ResizeWithMouse,
        },
        ButtonBinding {
            click: Click::TagBar,
            mask: 0,
            button: xlib::Button1,
            action: Action::ViewTag(0),
        },
        ButtonBinding {
            click: Click::TagBar,
            mask: 0,
            button: xlib::Button3,
            action: Action::ToggleTagView(0),
        },
        ButtonBinding {
            click: Click::TagBar,
            mask: MODKEY,
            button: xlib::Button1,
            action: Action::TagClient(0),
        },
        ButtonBinding {
            click: Click::TagBar,
            mask: MODKEY,
            button: xlib::Button3,
            action: Action::ToggleTag(0),
        },
        ButtonBinding {
            click: Click::ClientBar,
            mask: 0,
            button: xlib::Button1,
            action: Action::FocusClient(0),
        },
        ButtonBinding {
            click: Click::ClientBar,
            mask: 0,
            button: xlib::Button3,
            action: Action::ToggleHidden(0),
        },
    ]
}
