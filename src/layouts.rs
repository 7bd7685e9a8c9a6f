use crate::client::next_tiled;
use crate::state::Deckwm;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayoutKind {
    Deck,
    Monocle,
    Tile,
    Floating,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Layout {
    pub symbol: &'static str,
    pub kind: LayoutKind,
}

impl Layout {
    /// Floating layouts have no arrange pass; clients keep whatever
    /// geometry they have.
    pub fn is_floating(&self) -> bool {
        self.kind == LayoutKind::Floating
    }
}

pub static LAYOUTS: [Layout; 4] = [
    Layout {
        symbol: "D  ",
        kind: LayoutKind::Deck,
    },
    Layout {
        symbol: "[M]",
        kind: LayoutKind::Monocle,
    },
    Layout {
        symbol: "[]=",
        kind: LayoutKind::Tile,
    },
    Layout {
        symbol: "><>",
        kind: LayoutKind::Floating,
    },
];

/// Width of the master column given the tiled client count, the count
/// of marked clients and the marked-area fraction.
pub fn master_width(winarea_width: i32, n: usize, num_marked: i32, marked_width: f32) -> i32 {
    if n as i32 > num_marked {
        if num_marked > 0 {
            (winarea_width as f32 * marked_width).round() as i32
        } else {
            0
        }
    } else {
        winarea_width
    }
}

/// Height of the next row when `remaining` rows still have to share
/// `avail` pixels: sequential floor division, the last row absorbs the
/// remainder.
pub fn row_height(avail: i32, remaining: usize) -> i32 {
    avail / remaining.max(1) as i32
}

pub fn arrange_layout(wm: &mut Deckwm, mon_idx: usize) {
    match wm.mons[mon_idx].cur_layout().kind {
        LayoutKind::Deck => arrange_deck(wm, mon_idx),
        LayoutKind::Monocle => arrange_monocle(wm, mon_idx),
        LayoutKind::Tile => arrange_tile(wm, mon_idx),
        LayoutKind::Floating => {}
    }
}

fn tiled_handles(wm: &Deckwm, mon_idx: usize) -> Vec<crate::client::ClientHandle> {
    let m = &wm.mons[mon_idx];
    let mut out = Vec::new();
    let mut i = 0;
    while let Some(pos) = next_tiled(&m.clients, &wm.clients, m, i) {
        out.push(m.clients[pos]);
        i = pos + 1;
    }
    out
}

fn arrange_tile(wm: &mut Deckwm, mon_idx: usize) {
    let tiled = tiled_handles(wm, mon_idx);
    let n = tiled.len();
    if n == 0 {
        return;
    }
    let m = &wm.mons[mon_idx];
    let (wx, wy, ww, wh) = (m.winarea_x, m.winarea_y, m.winarea_width, m.winarea_height);
    let nmarked = m.num_marked_win;
    let mw = master_width(ww, n, nmarked, m.marked_width);

    let mut my = 0;
    let mut ty = 0;
    for (i, &handle) in tiled.iter().enumerate() {
        let bw = wm.clients[&handle].bw;
        if (i as i32) < nmarked {
            let h = row_height(wh - my, n.min(nmarked as usize) - i);
            wm.resize(handle, wx, wy + my, mw - 2 * bw, h - 2 * bw, false);
            my += wm.clients[&handle].height();
        } else {
            let h = row_height(wh - ty, n - i);
            wm.resize(handle, wx + mw, wy + ty, ww - mw - 2 * bw, h - 2 * bw, false);
            ty += wm.clients[&handle].height();
        }
    }
}

fn arrange_deck(wm: &mut Deckwm, mon_idx: usize) {
    let tiled = tiled_handles(wm, mon_idx);
    let n = tiled.len();
    if n == 0 {
        return;
    }
    let m = &wm.mons[mon_idx];
    let (wx, wy, ww, wh) = (m.winarea_x, m.winarea_y, m.winarea_width, m.winarea_height);
    let nmarked = m.num_marked_win;
    let stacked = n as i32 - nmarked;
    let mw = master_width(ww, n, nmarked, m.marked_width);
    if stacked > 0 {
        wm.set_layout_symbol(mon_idx, &format!("D {}", stacked));
    }

    let mut my = 0;
    for (i, &handle) in tiled.iter().enumerate() {
        let bw = wm.clients[&handle].bw;
        if (i as i32) < nmarked {
            let h = row_height(wh - my, n.min(nmarked as usize) - i);
            wm.resize(handle, wx, wy + my, mw - 2 * bw, h - 2 * bw, false);
            my += wm.clients[&handle].height();
        } else {
            wm.resize(handle, wx + mw, wy, ww - mw - 2 * bw, wh - 2 * bw, false);
        }
    }
}

fn arrange_monocle(wm: &mut Deckwm, mon_idx: usize) {
    let visible = {
        let m = &wm.mons[mon_idx];
        m.clients
            .iter()
            .filter(|h| wm.clients.get(h).map_or(false, |c| c.is_visible_on(m)))
            .count()
    };
    if visible > 0 {
        wm.set_layout_symbol(mon_idx, &format!("[{}]", visible));
    }
    let tiled = tiled_handles(wm, mon_idx);
    let m = &wm.mons[mon_idx];
    let (wx, wy, ww, wh) = (m.winarea_x, m.winarea_y, m.winarea_width, m.winarea_height);
    for &handle in &tiled {
        let bw = wm.clients[&handle].bw;
        wm.resize(handle, wx, wy, ww - 2 * bw, wh - 2 * bw, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_spans_work_area_without_marked_overflow() {
        // all clients marked: master column takes the full width
        assert_eq!(master_width(1000, 2, 2, 0.55), 1000);
        // marked and stacked clients split by the fraction
        assert_eq!(master_width(1000, 3, 1, 0.55), 550);
        // no marked clients: no master column
        assert_eq!(master_width(1000, 3, 0, 0.55), 0);
    }

    #[test]
    fn rows_cover_the_column_within_a_pixel() {
        // sequential floor division: simulate the per-client loop
        let wh = 1003;
        let n = 3;
        let mut used = 0;
        let mut heights = Vec::new();
        for i in 0..n {
            let h = row_height(wh - used, n - i);
            heights.push(h);
            used += h;
        }
        assert_eq!(used, wh);
        assert_eq!(*heights.last().unwrap(), wh - heights[0] - heights[1]);
        for h in heights {
            assert!((h - wh / n as i32).abs() <= 1);
        }
    }

    #[test]
    fn row_height_guards_empty_remainder() {
        assert_eq!(row_height(100, 0), 100);
    }
}
