use crate::client::ClientHandle;
use crate::config;
use crate::layouts::{Layout, LAYOUTS};
use crate::xwrapper::Window;

pub const MAX_TABS: usize = 50;

/// Pertag slot 0 is the all-tag view; slot i (i >= 1) is tag i-1.
pub const PERTAG_SLOTS: usize = config::TAGS.len() + 1;

/// Display modes of the client (tab) bar.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClientbarMode {
    Never,
    Auto,
    Always,
}

impl ClientbarMode {
    pub fn next(self) -> Self {
        match self {
            ClientbarMode::Never => ClientbarMode::Auto,
            ClientbarMode::Auto => ClientbarMode::Always,
            ClientbarMode::Always => ClientbarMode::Never,
        }
    }

    pub fn from_index(i: i32) -> Option<Self> {
        match i {
            0 => Some(ClientbarMode::Never),
            1 => Some(ClientbarMode::Auto),
            2 => Some(ClientbarMode::Always),
            _ => None,
        }
    }
}

/// Per-tag persisted layout configuration, recalled on every view
/// change and written back by single-tag edits.
#[derive(Debug, Clone)]
pub struct Pertag {
    pub curtag: usize,
    pub prevtag: usize,
    pub marked_widths: [f32; PERTAG_SLOTS],
    pub selected_layouts: [usize; PERTAG_SLOTS],
    pub layoutidxs: [[&'static Layout; 2]; PERTAG_SLOTS],
    pub show_tagbars: [bool; PERTAG_SLOTS],
}

#[derive(Debug, Clone)]
pub struct Monitor {
    pub layout_symbol: String,
    /// Master-area fraction used for marked clients, in [0.05, 0.95].
    pub marked_width: f32,
    /// Count of marked, tag-visible clients this arrangement; derived
    /// by update_onscreen.
    pub num_marked_win: i32,
    pub num: i32,
    pub tagbar_pos: i32,
    pub clientbar_pos: i32,
    pub mon_x: i32,
    pub mon_y: i32,
    pub mon_width: i32,
    pub mon_height: i32,
    pub winarea_x: i32,
    pub winarea_y: i32,
    pub winarea_width: i32,
    pub winarea_height: i32,
    pub selected_tags: usize,
    pub selected_layout: usize,
    pub tagset: [u32; 2],
    pub show_tagbar: bool,
    pub show_clientbar: ClientbarMode,
    pub tags_on_top: bool,
    /// Order-list: tiling order. Floating clients precede marked tiled
    /// clients precede the rest.
    pub clients: Vec<ClientHandle>,
    /// Focus-stack: LIFO focus history, index 0 is the top.
    pub stack: Vec<ClientHandle>,
    pub sel: Option<ClientHandle>,
    pub tagbar_win: Window,
    pub clientbar_win: Window,
    pub num_client_tabs: usize,
    pub client_tab_widths: [i32; MAX_TABS],
    pub layout: [&'static Layout; 2],
    pub pertag: Pertag,
}

impl Monitor {
    pub fn new(num: i32) -> Self {
        let nlayouts = LAYOUTS.len();
        let primary = &LAYOUTS[config::DEF_LAYOUTS[0] % nlayouts];
        let secondary = &LAYOUTS[1 % nlayouts];
        let mut pertag = Pertag {
            curtag: 1,
            prevtag: 1,
            marked_widths: [config::MARKED_WIDTH; PERTAG_SLOTS],
            selected_layouts: [0; PERTAG_SLOTS],
            layoutidxs: [[primary, secondary]; PERTAG_SLOTS],
            show_tagbars: [config::SHOW_TAGBAR; PERTAG_SLOTS],
        };
        for (i, slot) in pertag.layoutidxs.iter_mut().enumerate() {
            slot[0] = &LAYOUTS[config::DEF_LAYOUTS[i % config::DEF_LAYOUTS.len()] % nlayouts];
        }
        Monitor {
            layout_symbol: primary.symbol.to_string(),
            marked_width: config::MARKED_WIDTH,
            num_marked_win: 0,
            num,
            tagbar_pos: 0,
            clientbar_pos: 0,
            mon_x: 0,
            mon_y: 0,
            mon_width: 0,
            mon_height: 0,
            winarea_x: 0,
            winarea_y: 0,
            winarea_width: 0,
            winarea_height: 0,
            selected_tags: 0,
            selected_layout: 0,
            tagset: [1, 1],
            show_tagbar: config::SHOW_TAGBAR,
            show_clientbar: config::SHOW_CLIENTBAR,
            tags_on_top: config::TAGS_ON_TOP,
            clients: Vec::new(),
            stack: Vec::new(),
            sel: None,
            tagbar_win: Window(0),
            clientbar_win: Window(0),
            num_client_tabs: 0,
            client_tab_widths: [0; MAX_TABS],
            layout: [primary, secondary],
            pertag,
        }
    }

    pub fn cur_layout(&self) -> &'static Layout {
        self.layout[self.selected_layout]
    }

    pub fn is_floating_layout(&self) -> bool {
        self.cur_layout().is_floating()
    }

    /// Area of the intersection between a rectangle and this monitor's
    /// work-area.
    pub fn intersect_area(&self, x: i32, y: i32, w: i32, h: i32) -> i32 {
        ((x + w).min(self.winarea_x + self.winarea_width) - x.max(self.winarea_x)).max(0)
            * ((y + h).min(self.winarea_y + self.winarea_height) - y.max(self.winarea_y)).max(0)
    }

    /// Reloads marked width, layout selection and both layout slots
    /// from the current pertag slot. Returns true when the persisted
    /// tag-bar visibility differs from the live one, in which case the
    /// caller must toggle the tag bar.
    pub fn load_pertag(&mut self) -> bool {
        let t = self.pertag.curtag;
        self.marked_width = self.pertag.marked_widths[t];
        self.selected_layout = self.pertag.selected_layouts[t];
        self.layout[self.selected_layout] = self.pertag.layoutidxs[t][self.selected_layout];
        self.layout[self.selected_layout ^ 1] =
            self.pertag.layoutidxs[t][self.selected_layout ^ 1];
        self.show_tagbar != self.pertag.show_tagbars[t]
    }

    /// Views the given tagset. Returns true when the tag bar must be
    /// toggled to match the new pertag slot.
    pub fn view_tags(&mut self, ui: u32, view_tag_toggles: bool) -> bool {
        let masked = ui & config::TAG_MASK;
        if masked != 0 && masked != self.tagset[self.selected_tags] {
            self.selected_tags ^= 1;
            self.pertag.prevtag = self.pertag.curtag;
            self.tagset[self.selected_tags] = masked;
            self.pertag.curtag = if ui == !0 {
                0
            } else {
                masked.trailing_zeros() as usize + 1
            };
        } else if view_tag_toggles {
            self.selected_tags ^= 1;
            std::mem::swap(&mut self.pertag.curtag, &mut self.pertag.prevtag);
        }
        self.load_pertag()
    }

    /// XORs the given tagset into the current view; a no-op when the
    /// result would be empty. Returns whether the view changed and
    /// whether the tag bar must be toggled.
    pub fn toggle_view(&mut self, ui: u32) -> Option<bool> {
        let newtagset = self.tagset[self.selected_tags] ^ (ui & config::TAG_MASK);
        if newtagset == 0 {
            return None;
        }
        if newtagset == config::TAG_MASK {
            self.pertag.prevtag = self.pertag.curtag;
            self.pertag.curtag = 0;
        } else if self.pertag.curtag == 0 || newtagset & (1 << (self.pertag.curtag - 1)) == 0 {
            self.pertag.prevtag = self.pertag.curtag;
            self.pertag.curtag = newtagset.trailing_zeros() as usize + 1;
        }
        self.tagset[self.selected_tags] = newtagset;
        Some(self.load_pertag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_switches_and_loads_pertag() {
        let mut m = Monitor::new(0);
        m.pertag.marked_widths[3] = 0.8;
        m.view_tags(1 << 2, true);
        assert_eq!(m.tagset[m.selected_tags], 1 << 2);
        assert_eq!(m.pertag.curtag, 3);
        assert_eq!(m.pertag.prevtag, 1);
        assert!((m.marked_width - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn viewing_same_tag_twice_returns_to_previous_view() {
        let mut m = Monitor::new(0);
        m.view_tags(1 << 4, true);
        let before = (m.selected_tags, m.pertag.curtag, m.pertag.prevtag);
        m.view_tags(1 << 4, true);
        assert_eq!(m.tagset[m.selected_tags], 1);
        assert_eq!(m.pertag.curtag, before.2);
        assert_eq!(m.pertag.prevtag, before.1);
        m.view_tags(1 << 4, true);
        assert_eq!((m.selected_tags, m.pertag.curtag, m.pertag.prevtag), before);
    }

    #[test]
    fn view_all_tags_selects_slot_zero() {
        let mut m = Monitor::new(0);
        m.view_tags(!0, true);
        assert_eq!(m.pertag.curtag, 0);
        assert_eq!(m.tagset[m.selected_tags], config::TAG_MASK);
    }

    #[test]
    fn toggle_view_refuses_empty_result() {
        let mut m = Monitor::new(0);
        assert!(m.toggle_view(1).is_none());
        assert_eq!(m.tagset[m.selected_tags], 1);
        assert!(m.toggle_view(1 << 1).is_some());
        assert_eq!(m.tagset[m.selected_tags], 0b11);
    }

    #[test]
    fn single_tag_edits_persist_per_tag() {
        let mut m = Monitor::new(0);
        m.marked_width = 0.7;
        m.pertag.marked_widths[m.pertag.curtag] = 0.7;
        m.view_tags(1 << 5, true);
        assert!((m.marked_width - config::MARKED_WIDTH).abs() < f32::EPSILON);
        m.view_tags(1 << 0, true);
        assert!((m.marked_width - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn clientbar_mode_cycles_all_modes() {
        let mut mode = ClientbarMode::Never;
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(mode);
            mode = mode.next();
        }
        assert_eq!(mode, ClientbarMode::Never);
        assert_eq!(seen.len(), 3);
        assert_eq!(ClientbarMode::from_index(2), Some(ClientbarMode::Always));
        assert_eq!(ClientbarMode::from_index(3), None);
    }

    #[test]
    fn intersect_area_is_clamped() {
        let mut m = Monitor::new(0);
        m.winarea_x = 0;
        m.winarea_y = 0;
        m.winarea_width = 100;
        m.winarea_height = 100;
        assert_eq!(m.intersect_area(50, 50, 100, 100), 2500);
        assert_eq!(m.intersect_area(200, 200, 10, 10), 0);
    }
}
