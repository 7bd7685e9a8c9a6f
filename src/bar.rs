use x11::xlib;

use crate::client::ClientHandle;
use crate::colour::Scheme;
use crate::config;
use crate::monitor::MAX_TABS;
use crate::state::Deckwm;

/// Scheme for a client-bar tab, evaluated in priority order.
pub fn tab_scheme(selected: bool, urgent: bool, minimized: bool, onscreen: bool) -> Scheme {
    if selected {
        Scheme::Selected
    } else if urgent {
        Scheme::Urgent
    } else if minimized {
        Scheme::Minimized
    } else if onscreen {
        Scheme::Visible
    } else {
        Scheme::Normal
    }
}

/// Shrinks tab widths so that all tabs plus the layout-symbol cell fit
/// into `area_w`: the widest tabs give way first, sharing the leftover
/// space equally.
pub fn clamp_tab_widths(widths: &mut [i32], view_info_w: i32, area_w: i32) {
    let n = widths.len();
    if n == 0 {
        return;
    }
    let total: i32 = view_info_w + widths.iter().sum::<i32>();
    let maxsize = if total > area_w {
        let mut sorted = widths.to_vec();
        sorted.sort_unstable();
        let mut tot = view_info_w;
        let mut i = 0;
        while i < n {
            if tot + (n - i) as i32 * sorted[i] > area_w {
                break;
            }
            tot += sorted[i];
            i += 1;
        }
        if i == n {
            area_w
        } else {
            (area_w - tot) / (n - i) as i32
        }
    } else {
        area_w
    };
    for w in widths.iter_mut() {
        *w = (*w).min(maxsize);
    }
}

impl Deckwm {
    /// Cell width of a string: text width plus side padding.
    pub fn textw(&self, text: &str) -> i32 {
        self.xwrapper.text_width(text) as i32 + self.lr_padding
    }

    pub fn draw_bars(&mut self) {
        for i in 0..self.mons.len() {
            self.draw_tagbar(i);
            self.draw_clientbar(i);
        }
    }

    /// Reads the status area from the root WM_NAME and refreshes every
    /// tag bar.
    pub fn update_statusarea(&mut self) {
        let mut text = self
            .xwrapper
            .get_text_prop(self.root, xlib::XA_WM_NAME)
            .unwrap_or_else(|| format!("deckwm-{}", env!("CARGO_PKG_VERSION")));
        if text.len() > 255 {
            let mut end = 255;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            text.truncate(end);
        }
        self.status_text = text;
        for i in 0..self.mons.len() {
            self.draw_tagbar(i);
        }
    }

    /// The small square that marks tag occupancy / selection state.
    fn draw_indicator(&mut self, scheme: Scheme, x: i32, filled: bool, empty: bool) {
        let dx = (self.xwrapper.font_height() as i32 + 2) / 4;
        if filled {
            self.xwrapper.rect(scheme, x + 1, 1, dx + 1, dx + 1, true);
        } else if empty {
            self.xwrapper.rect(scheme, x + 1, 1, dx, dx, false);
        }
    }

    pub fn draw_tagbar(&mut self, mon_idx: usize) {
        if mon_idx >= self.mons.len() || self.mons[mon_idx].tagbar_win == crate::xwrapper::Window(0)
        {
            return;
        }
        let bh = self.bar_height;
        let (occ, urg, tagset, ww, barwin) = {
            let m = &self.mons[mon_idx];
            let mut occ = 0u32;
            let mut urg = 0u32;
            for h in &m.clients {
                if let Some(c) = self.clients.get(h) {
                    occ |= c.tags;
                    if c.is_urgent {
                        urg |= c.tags;
                    }
                }
            }
            (occ, urg, m.tagset[m.selected_tags], m.winarea_width, m.tagbar_win)
        };
        let is_selmon = mon_idx == self.selected_monitor;
        let sel_tags = self.mons[mon_idx]
            .sel
            .and_then(|s| self.clients.get(&s))
            .map(|c| c.tags);

        let mut x = 0;
        for (i, tag) in config::TAGS.iter().enumerate() {
            let bit = 1 << i;
            if config::HIDE_INACTIVE_TAGS && occ & bit == 0 && tagset & bit == 0 {
                continue;
            }
            let w = self.textw(tag);
            let sel_has_tag = is_selmon && sel_tags.map_or(false, |t| t & bit != 0);
            let scheme = if urg & bit != 0 {
                Scheme::Urgent
            } else if tagset & bit != 0 {
                if sel_has_tag {
                    Scheme::Selected
                } else {
                    Scheme::Visible
                }
            } else {
                Scheme::Normal
            };
            self.xwrapper.text(scheme, x, 0, w, bh, Some(tag));
            self.draw_indicator(scheme, x, sel_has_tag, occ & bit != 0);
            x += w;
        }

        let stext = self.status_text.clone();
        let mut w = self.textw(&stext);
        let mut sx = ww - w;
        if sx < x {
            sx = x;
            w = ww - x;
        }
        self.xwrapper.text(Scheme::Normal, sx, 0, w, bh, Some(&stext));

        let mid_w = sx - x;
        if mid_w > bh {
            let sel = self.mons[mon_idx].sel.and_then(|s| self.clients.get(&s));
            match sel {
                Some(c) => {
                    let (name, fixed, floating) = (c.name.clone(), c.is_fixed, c.is_floating);
                    let scheme = if is_selmon {
                        Scheme::Selected
                    } else {
                        Scheme::Normal
                    };
                    self.xwrapper.text(scheme, x, 0, mid_w, bh, Some(&name));
                    self.draw_indicator(scheme, x, fixed, floating);
                }
                None => {
                    self.xwrapper.text(Scheme::Normal, x, 0, mid_w, bh, None);
                }
            }
        }
        self.xwrapper.map_drawable(barwin, 0, 0, ww as u32, bh as u32);
    }

    pub fn draw_clientbar(&mut self, mon_idx: usize) {
        if mon_idx >= self.mons.len()
            || self.mons[mon_idx].clientbar_win == crate::xwrapper::Window(0)
        {
            return;
        }
        let th = self.tab_height;
        let symbol = self.mons[mon_idx].layout_symbol.clone();
        let view_info_w = self.textw(&symbol);
        let (visible, ww, barwin) = {
            let m = &self.mons[mon_idx];
            let visible: Vec<ClientHandle> = m
                .clients
                .iter()
                .filter(|h| self.clients.get(h).map_or(false, |c| c.is_visible_on(m)))
                .take(MAX_TABS)
                .copied()
                .collect();
            (visible, m.winarea_width, m.clientbar_win)
        };
        let mut widths: Vec<i32> = visible
            .iter()
            .map(|h| self.textw(&self.clients[h].name))
            .collect();
        clamp_tab_widths(&mut widths, view_info_w, ww);
        {
            let m = &mut self.mons[mon_idx];
            m.num_client_tabs = widths.len();
            for (i, &w) in widths.iter().enumerate() {
                m.client_tab_widths[i] = w;
            }
        }

        let sel = self.mons[mon_idx].sel;
        let selmon_sel = self.mons[self.selected_monitor].sel;
        let mut x = 0;
        for (i, &h) in visible.iter().enumerate() {
            let (name, scheme, marked) = {
                let c = &self.clients[&h];
                (
                    c.name.clone(),
                    tab_scheme(sel == Some(h), c.is_urgent, c.minimized, c.onscreen),
                    c.marked,
                )
            };
            let w = widths[i];
            self.xwrapper.text(scheme, x, 0, w, th, Some(&name));
            if marked {
                self.draw_indicator(scheme, x, selmon_sel == Some(h), true);
            }
            x += w;
        }

        // clear the gap between the last tab and the layout symbol
        let fill_w = ww - view_info_w - x;
        self.xwrapper.text(Scheme::Normal, x, 0, fill_w, th, None);
        self.xwrapper
            .text(Scheme::Normal, x + fill_w, 0, view_info_w, th, Some(&symbol));
        self.xwrapper.map_drawable(barwin, 0, 0, ww as u32, th as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_that_fit_keep_their_widths() {
        let mut widths = vec![100, 120, 80];
        clamp_tab_widths(&mut widths, 50, 1000);
        assert_eq!(widths, vec![100, 120, 80]);
    }

    #[test]
    fn overflowing_tabs_share_the_leftover_equally() {
        let mut widths = vec![100, 200, 300, 400];
        clamp_tab_widths(&mut widths, 50, 600);
        assert_eq!(widths, vec![100, 150, 150, 150]);
        let total: i32 = 50 + widths.iter().sum::<i32>();
        assert!(total <= 600);
    }

    #[test]
    fn uniformly_huge_tabs_split_the_bar() {
        let mut widths = vec![500, 500, 500];
        clamp_tab_widths(&mut widths, 60, 360);
        assert_eq!(widths, vec![100, 100, 100]);
    }

    #[test]
    fn no_tabs_is_a_no_op() {
        let mut widths: Vec<i32> = vec![];
        clamp_tab_widths(&mut widths, 60, 360);
        assert!(widths.is_empty());
    }

    #[test]
    fn tab_scheme_priority_order() {
        assert_eq!(tab_scheme(true, true, true, true), Scheme::Selected);
        assert_eq!(tab_scheme(false, true, true, true), Scheme::Urgent);
        assert_eq!(tab_scheme(false, false, true, true), Scheme::Minimized);
        assert_eq!(tab_scheme(false, false, false, true), Scheme::Visible);
        assert_eq!(tab_scheme(false, false, false, false), Scheme::Normal);
    }
}
