use std::collections::HashMap;

use crate::monitor::Monitor;
use crate::xwrapper::Window;

/// Arena key for a managed client; the X window id is stable for the
/// lifetime of the window, so it doubles as the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientHandle(pub x11::xlib::XID);

impl From<Window> for ClientHandle {
    fn from(w: Window) -> Self {
        ClientHandle(w.0)
    }
}

pub const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone)]
pub struct Client {
    pub name: String,
    pub mina: f32,
    pub maxa: f32,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub oldx: i32,
    pub oldy: i32,
    pub oldw: i32,
    pub oldh: i32,
    pub basew: i32,
    pub baseh: i32,
    pub incw: i32,
    pub inch: i32,
    pub maxw: i32,
    pub maxh: i32,
    pub minw: i32,
    pub minh: i32,
    pub bw: i32,
    pub oldbw: i32,
    pub tags: u32,
    pub is_fixed: bool,
    pub is_floating: bool,
    pub was_floating: bool,
    pub is_urgent: bool,
    pub never_focus: bool,
    pub old_state: bool,
    pub is_fullscreen: bool,
    pub minimized: bool,
    pub onscreen: bool,
    pub marked: bool,
    pub monitor_idx: usize,
    pub win: Window,
}

impl Client {
    pub fn new(win: Window, monitor_idx: usize) -> Self {
        Client {
            name: String::new(),
            mina: 0.0,
            maxa: 0.0,
            x: 0,
            y: 0,
            w: 0,
            h: 0,
            oldx: 0,
            oldy: 0,
            oldw: 0,
            oldh: 0,
            basew: 0,
            baseh: 0,
            incw: 0,
            inch: 0,
            maxw: 0,
            maxh: 0,
            minw: 0,
            minh: 0,
            bw: 0,
            oldbw: 0,
            tags: 0,
            is_fixed: false,
            is_floating: false,
            was_floating: false,
            is_urgent: false,
            never_focus: false,
            old_state: false,
            is_fullscreen: false,
            minimized: false,
            onscreen: true,
            marked: false,
            monitor_idx,
            win,
        }
    }

    /// Outer width including both borders.
    pub fn width(&self) -> i32 {
        self.w + 2 * self.bw
    }

    /// Outer height including both borders.
    pub fn height(&self) -> i32 {
        self.h + 2 * self.bw
    }

    /// A client is visible when its tags intersect the monitor's
    /// currently viewed tagset.
    pub fn is_visible_on(&self, m: &Monitor) -> bool {
        (self.tags & m.tagset[m.selected_tags]) != 0
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
        if self.name.len() > MAX_NAME_LEN {
            let mut end = MAX_NAME_LEN;
            while !self.name.is_char_boundary(end) {
                end -= 1;
            }
            self.name.truncate(end);
        }
    }

    fn tiled_on(&self, m: &Monitor) -> bool {
        !self.is_floating && self.is_visible_on(m) && !self.minimized
    }
}

/// First order-list position at or after `start` holding a tiled
/// (non-floating, tag-visible, not minimized) client.
pub fn next_tiled(
    order: &[ClientHandle],
    arena: &HashMap<ClientHandle, Client>,
    m: &Monitor,
    start: usize,
) -> Option<usize> {
    (start..order.len()).find(|&i| arena.get(&order[i]).map_or(false, |c| c.tiled_on(m)))
}

/// Last order-list position before `end` holding a tiled client.
pub fn prev_tiled(
    order: &[ClientHandle],
    arena: &HashMap<ClientHandle, Client>,
    m: &Monitor,
    end: usize,
) -> Option<usize> {
    (0..end.min(order.len()))
        .rev()
        .find(|&i| arena.get(&order[i]).map_or(false, |c| c.tiled_on(m)))
}

/// Insertion position honoring the order-list band discipline:
/// floating clients first, then marked tiled clients, then the rest,
/// with a newcomer entering at the head of its own band.
pub fn attach_index(
    order: &[ClientHandle],
    arena: &HashMap<ClientHandle, Client>,
    newcomer: &Client,
) -> usize {
    if newcomer.is_floating {
        return 0;
    }
    let mut i = 0;
    while i < order.len() && arena.get(&order[i]).map_or(false, |c| c.is_floating) {
        i += 1;
    }
    if !newcomer.marked {
        while i < order.len() && arena.get(&order[i]).map_or(false, |c| c.marked) {
            i += 1;
        }
    }
    i
}

/// Applies size hints and containment to a proposed rectangle.
///
/// Returns whether the result differs from the client's current
/// geometry, plus the constrained rectangle. `interact` clips against
/// the full screen instead of the monitor work-area; `apply_hints` is
/// the caller-evaluated `resizehints || floating || floating layout`
/// condition that gates the ICCCM branch.
#[allow(clippy::too_many_arguments)]
pub fn apply_size_hints(
    c: &Client,
    mut x: i32,
    mut y: i32,
    mut w: i32,
    mut h: i32,
    interact: bool,
    screen_w: i32,
    screen_h: i32,
    winarea: (i32, i32, i32, i32),
    bar_h: i32,
    apply_hints: bool,
) -> (bool, i32, i32, i32, i32) {
    w = w.max(1);
    h = h.max(1);
    if interact {
        if x > screen_w {
            x = screen_w - (w + 2 * c.bw);
        }
        if y > screen_h {
            y = screen_h - (h + 2 * c.bw);
        }
        if x + w + 2 * c.bw < 0 {
            x = 0;
        }
        if y + h + 2 * c.bw < 0 {
            y = 0;
        }
    } else {
        let (wx, wy, ww, wh) = winarea;
        if x >= wx + ww {
            x = wx + ww - (w + 2 * c.bw);
        }
        if y >= wy + wh {
            y = wy + wh - (h + 2 * c.bw);
        }
        if x + w + 2 * c.bw <= wx {
            x = wx;
        }
        if y + h + 2 * c.bw <= wy {
            y = wy;
        }
    }
    if h < bar_h {
        h = bar_h;
    }
    if w < bar_h {
        w = bar_h;
    }
    if apply_hints {
        // see last two sentences in ICCCM 4.1.2.3
        let baseismin = c.basew == c.minw && c.baseh == c.minh;
        if !baseismin {
            w -= c.basew;
            h -= c.baseh;
        }
        if c.mina > 0.0 && c.maxa > 0.0 {
            if c.maxa < w as f32 / h as f32 {
                w = (h as f32 * c.maxa + 0.5) as i32;
            } else if c.mina < h as f32 / w as f32 {
                h = (w as f32 * c.mina + 0.5) as i32;
            }
        }
        if baseismin {
            // increment calculation requires the base subtracted
            w -= c.basew;
            h -= c.baseh;
        }
        if c.incw > 0 {
            w -= w % c.incw;
        }
        if c.inch > 0 {
            h -= h % c.inch;
        }
        w = (w + c.basew).max(c.minw);
        h = (h + c.baseh).max(c.minh);
        if c.maxw > 0 {
            w = w.min(c.maxw);
        }
        if c.maxh > 0 {
            h = h.min(c.maxh);
        }
    }
    let changed = x != c.x || y != c.y || w != c.w || h != c.h;
    (changed, x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::Monitor;

    fn test_client(win: u64) -> Client {
        let mut c = Client::new(Window(win), 0);
        c.tags = 1;
        c
    }

    fn test_monitor() -> Monitor {
        let mut m = Monitor::new(0);
        m.winarea_x = 0;
        m.winarea_y = 20;
        m.winarea_width = 1920;
        m.winarea_height = 1060;
        m
    }

    const WA: (i32, i32, i32, i32) = (0, 20, 1920, 1060);

    #[test]
    fn hints_floor_minimum_size() {
        let c = test_client(1);
        let (_, _, _, w, h) = apply_size_hints(&c, 0, 20, -5, 0, false, 1920, 1080, WA, 18, false);
        assert!(w >= 18);
        assert!(h >= 18);
    }

    #[test]
    fn hints_quantize_by_increments_after_base() {
        let mut c = test_client(1);
        c.basew = 10;
        c.baseh = 10;
        c.minw = 20;
        c.minh = 20;
        c.incw = 7;
        c.inch = 7;
        let (_, _, _, w, h) =
            apply_size_hints(&c, 0, 20, 100, 100, false, 1920, 1080, WA, 18, true);
        // base removed, remainder of 90 mod 7 dropped, base restored
        assert_eq!(w, 10 + 90 - 90 % 7);
        assert_eq!(h, 10 + 90 - 90 % 7);
    }

    #[test]
    fn hints_respect_min_and_max() {
        let mut c = test_client(1);
        c.minw = 200;
        c.minh = 150;
        c.maxw = 400;
        c.maxh = 300;
        let (_, _, _, w, h) = apply_size_hints(&c, 0, 20, 50, 50, false, 1920, 1080, WA, 18, true);
        assert_eq!((w, h), (200, 150));
        let (_, _, _, w, h) =
            apply_size_hints(&c, 0, 20, 900, 900, false, 1920, 1080, WA, 18, true);
        assert_eq!((w, h), (400, 300));
    }

    #[test]
    fn hints_aspect_clamps_width() {
        let mut c = test_client(1);
        c.mina = 0.5;
        c.maxa = 1.0;
        let (_, _, _, w, h) =
            apply_size_hints(&c, 0, 20, 800, 400, false, 1920, 1080, WA, 18, true);
        // maxa 1.0 < 800/400, so width collapses to height
        assert_eq!(w, 400);
        assert_eq!(h, 400);
    }

    #[test]
    fn hints_report_unchanged_geometry() {
        let mut c = test_client(1);
        c.x = 10;
        c.y = 30;
        c.w = 300;
        c.h = 200;
        let (changed, ..) =
            apply_size_hints(&c, 10, 30, 300, 200, false, 1920, 1080, WA, 18, false);
        assert!(!changed);
        let (changed, ..) =
            apply_size_hints(&c, 11, 30, 300, 200, false, 1920, 1080, WA, 18, false);
        assert!(changed);
    }

    #[test]
    fn containment_pulls_offscreen_client_back() {
        let mut c = test_client(1);
        c.w = 300;
        c.h = 200;
        let (_, x, y, ..) =
            apply_size_hints(&c, 5000, 5000, 300, 200, false, 1920, 1080, WA, 18, false);
        assert!(x < 1920);
        assert!(y < 20 + 1060);
    }

    fn arena_of(clients: Vec<Client>) -> (Vec<ClientHandle>, HashMap<ClientHandle, Client>) {
        let mut order = Vec::new();
        let mut arena = HashMap::new();
        for c in clients {
            let h = ClientHandle::from(c.win);
            order.push(h);
            arena.insert(h, c);
        }
        (order, arena)
    }

    #[test]
    fn attach_keeps_band_order() {
        let mut floating = test_client(1);
        floating.is_floating = true;
        let mut marked = test_client(2);
        marked.marked = true;
        let plain = test_client(3);
        let (order, arena) = arena_of(vec![floating, marked, plain]);

        let newcomer = test_client(4);
        assert_eq!(attach_index(&order, &arena, &newcomer), 2);

        let mut newcomer = test_client(5);
        newcomer.marked = true;
        assert_eq!(attach_index(&order, &arena, &newcomer), 1);

        let mut newcomer = test_client(6);
        newcomer.is_floating = true;
        assert_eq!(attach_index(&order, &arena, &newcomer), 0);
    }

    #[test]
    fn tiled_iteration_skips_floating_and_minimized() {
        let m = test_monitor();
        let mut floating = test_client(1);
        floating.is_floating = true;
        let mut hidden = test_client(2);
        hidden.minimized = true;
        let tiled_a = test_client(3);
        let tiled_b = test_client(4);
        let (order, arena) = arena_of(vec![floating, hidden, tiled_a, tiled_b]);

        assert_eq!(next_tiled(&order, &arena, &m, 0), Some(2));
        assert_eq!(next_tiled(&order, &arena, &m, 3), Some(3));
        assert_eq!(next_tiled(&order, &arena, &m, 4), None);
        assert_eq!(prev_tiled(&order, &arena, &m, 3), Some(2));
        assert_eq!(prev_tiled(&order, &arena, &m, 2), None);
    }

    #[test]
    fn name_is_bounded() {
        let mut c = test_client(1);
        c.set_name(&"x".repeat(400));
        assert_eq!(c.name.len(), MAX_NAME_LEN);
    }
}
