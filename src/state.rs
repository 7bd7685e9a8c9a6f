use std::collections::HashMap;
use std::ffi::CString;
use std::os::raw::c_int;

use x11::xlib;

use crate::client::{apply_size_hints, attach_index, Client, ClientHandle};
use crate::colour::Scheme;
use crate::config;
use crate::config::Click;
use crate::error::DeckwmError;
use crate::layouts::{self, LayoutKind};
use crate::monitor::{ClientbarMode, Monitor};
use crate::xwrapper::{
    Atom, CursorId, KeySpecification, Net, Window, XWrapper, ICONIC_STATE, NORMAL_STATE, WM,
};

#[derive(PartialEq, Copy, Clone)]
pub enum CursorType {
    Normal,
    Resize,
    Move,
    Last,
}

/// Process-wide core state: the display backend, the monitor list, the
/// client arena and everything the handlers share.
pub struct Deckwm {
    pub status_text: String,
    pub screen: c_int,
    pub screen_width: i32,
    pub screen_height: i32,
    /// Tag bar height; also the minimum window dimension.
    pub bar_height: i32,
    /// Client (tab) bar height.
    pub tab_height: i32,
    /// Horizontal text padding; TEXTW(s) = text width + this.
    pub lr_padding: i32,
    pub numlock_mask: u32,
    pub running: bool,
    pub cursor: [CursorId; CursorType::Last as usize],
    pub xwrapper: XWrapper,
    pub mons: Vec<Monitor>,
    pub selected_monitor: usize,
    /// Monitor the pointer was last seen on, for root MotionNotify.
    pub motion_mon: Option<usize>,
    pub root: Window,
    pub clients: HashMap<ClientHandle, Client>,
}

impl Deckwm {
    pub fn new() -> Result<Deckwm, DeckwmError> {
        let mut xwrapper = XWrapper::connect()?;
        unsafe {
            let locale = CString::new("").unwrap();
            if libc::setlocale(libc::LC_CTYPE, locale.as_ptr()).is_null()
                || xlib::XSupportsLocale() == 0
            {
                log::warn!("no locale support");
            }
        }
        xwrapper.check_for_other_wm()?;
        xwrapper.set_default_error_handler();

        let mut wm = Deckwm {
            status_text: String::new(),
            screen: 0,
            screen_width: 0,
            screen_height: 0,
            bar_height: 0,
            tab_height: 0,
            lr_padding: 0,
            numlock_mask: 0,
            running: true,
            cursor: [CursorId(0); CursorType::Last as usize],
            xwrapper,
            mons: Vec::new(),
            selected_monitor: 0,
            motion_mon: None,
            root: Window(0),
            clients: HashMap::new(),
        };
        wm.setup()?;
        Ok(wm)
    }

    fn setup(&mut self) -> Result<(), DeckwmError> {
        self.screen = self.xwrapper.default_screen();
        self.screen_width = self.xwrapper.display_width(self.screen);
        self.screen_height = self.xwrapper.display_height(self.screen);
        self.root = self.xwrapper.root_window(self.screen);

        if !self.xwrapper.fontset_create(&[config::FONT]) {
            return Err(DeckwmError::FontLoad(config::FONT.to_string()));
        }
        let font_h = self.xwrapper.font_height() as i32;
        self.bar_height = font_h + 2;
        self.tab_height = self.bar_height;
        self.lr_padding = font_h;
        self.xwrapper
            .resize_drawable(self.screen_width as u32, self.bar_height as u32);

        self.update_geometry();

        self.cursor[CursorType::Normal as usize] = self.xwrapper.create_font_cursor(68);
        self.cursor[CursorType::Resize as usize] = self.xwrapper.create_font_cursor(120);
        self.cursor[CursorType::Move as usize] = self.xwrapper.create_font_cursor(52);

        self.init_bars();
        self.update_statusarea();

        self.xwrapper.set_supported_atoms(self.root);
        self.xwrapper
            .delete_property(self.root, self.xwrapper.atoms.get(Atom::Net(Net::ClientList)));

        unsafe {
            let mut wa: xlib::XSetWindowAttributes = std::mem::zeroed();
            wa.cursor = self.cursor[CursorType::Normal as usize].0;
            wa.event_mask = xlib::SubstructureRedirectMask
                | xlib::SubstructureNotifyMask
                | xlib::ButtonPressMask
                | xlib::PointerMotionMask
                | xlib::EnterWindowMask
                | xlib::LeaveWindowMask
                | xlib::StructureNotifyMask
                | xlib::PropertyChangeMask;
            self.xwrapper.change_window_attributes(
                self.root,
                (xlib::CWEventMask | xlib::CWCursor) as u64,
                &mut wa,
            );
            self.xwrapper.select_input(self.root, wa.event_mask);
        }

        self.grab_shortcut_keys();
        self.focus(None);
        Ok(())
    }

    /// Creates the two bar windows for any monitor that lacks them.
    pub fn init_bars(&mut self) {
        for i in 0..self.mons.len() {
            if self.mons[i].tagbar_win != Window(0) {
                continue;
            }
            let (wx, ww, tagbar_pos, clientbar_pos) = {
                let m = &self.mons[i];
                (m.winarea_x, m.winarea_width, m.tagbar_pos, m.clientbar_pos)
            };
            unsafe {
                let mut wa: xlib::XSetWindowAttributes = std::mem::zeroed();
                wa.override_redirect = 1;
                wa.background_pixmap = xlib::ParentRelative as u64;
                wa.event_mask = xlib::ButtonPressMask | xlib::ExposureMask;
                let valuemask =
                    (xlib::CWOverrideRedirect | xlib::CWBackPixmap | xlib::CWEventMask) as u64;
                let tagbar = self.xwrapper.create_window(
                    self.root,
                    wx,
                    tagbar_pos,
                    ww as u32,
                    self.bar_height as u32,
                    valuemask,
                    &mut wa,
                );
                let clientbar = self.xwrapper.create_window(
                    self.root,
                    wx,
                    clientbar_pos,
                    ww as u32,
                    self.tab_height as u32,
                    valuemask,
                    &mut wa,
                );
                let normal = self.cursor[CursorType::Normal as usize];
                self.xwrapper.define_cursor(tagbar, normal);
                self.xwrapper.define_cursor(clientbar, normal);
                self.xwrapper.map_raised(tagbar);
                self.xwrapper.map_raised(clientbar);
                let m = &mut self.mons[i];
                m.tagbar_win = tagbar;
                m.clientbar_win = clientbar;
            }
        }
    }

    pub fn grab_shortcut_keys(&mut self) {
        self.numlock_mask = self.xwrapper.get_numlock_mask();
        let specs: Vec<KeySpecification> = config::keys()
            .iter()
            .map(|k| KeySpecification {
                mask: k.mask,
                keysym: k.keysym,
            })
            .collect();
        self.xwrapper.grab_keys(self.root, self.numlock_mask, &specs);
    }

    pub fn grab_buttons(&mut self, handle: ClientHandle, focused: bool) {
        self.numlock_mask = self.xwrapper.get_numlock_mask();
        let win = match self.clients.get(&handle) {
            Some(c) => c.win,
            None => return,
        };
        self.xwrapper.ungrab_all_buttons(win);
        if focused {
            let modifiers = [
                0,
                xlib::LockMask,
                self.numlock_mask,
                self.numlock_mask | xlib::LockMask,
            ];
            for b in config::buttons() {
                if b.click == Click::ClientWin {
                    for &m in &modifiers {
                        self.xwrapper.grab_button(win, b.button, b.mask | m);
                    }
                }
            }
        } else {
            self.xwrapper
                .grab_button(win, xlib::AnyButton as u32, xlib::AnyModifier);
        }
    }

    /* monitor resolution */

    pub fn rect_to_monitor(&self, x: i32, y: i32, w: i32, h: i32) -> usize {
        let mut r = self.selected_monitor;
        let mut area = 0;
        for (i, m) in self.mons.iter().enumerate() {
            let a = m.intersect_area(x, y, w, h);
            if a > area {
                area = a;
                r = i;
            }
        }
        r
    }

    pub fn window_to_monitor(&self, w: xlib::Window) -> usize {
        if Window(w) == self.root {
            if let Some((x, y)) = self.xwrapper.query_pointer_position() {
                return self.rect_to_monitor(x, y, 1, 1);
            }
        }
        for (i, m) in self.mons.iter().enumerate() {
            if m.tagbar_win == Window(w) || m.clientbar_win == Window(w) {
                return i;
            }
        }
        if let Some(handle) = self.window_to_client_handle(w) {
            if let Some(c) = self.clients.get(&handle) {
                return c.monitor_idx;
            }
        }
        self.selected_monitor
    }

    pub fn window_to_client_handle(&self, w: xlib::Window) -> Option<ClientHandle> {
        let handle = ClientHandle::from(Window(w));
        self.clients.contains_key(&handle).then_some(handle)
    }

    pub fn direction_to_monitor(&self, dir: i32) -> usize {
        let n = self.mons.len();
        if dir > 0 {
            (self.selected_monitor + 1) % n
        } else {
            (self.selected_monitor + n - 1) % n
        }
    }

    /* list discipline */

    pub fn attach(&mut self, handle: ClientHandle) {
        let (mon_idx, idx) = {
            let c = &self.clients[&handle];
            let m = &self.mons[c.monitor_idx];
            (c.monitor_idx, attach_index(&m.clients, &self.clients, c))
        };
        self.mons[mon_idx].clients.insert(idx, handle);
    }

    pub fn detach(&mut self, handle: ClientHandle) {
        if let Some(c) = self.clients.get(&handle) {
            self.mons[c.monitor_idx].clients.retain(|&h| h != handle);
        }
    }

    pub fn stack_attach(&mut self, handle: ClientHandle) {
        if let Some(c) = self.clients.get(&handle) {
            self.mons[c.monitor_idx].stack.insert(0, handle);
        }
    }

    /// Removes a client from its monitor's focus stack; when it was the
    /// selection, the topmost visible non-minimized stack entry takes
    /// over.
    pub fn stack_detach(&mut self, handle: ClientHandle) {
        let mon_idx = match self.clients.get(&handle) {
            Some(c) => c.monitor_idx,
            None => return,
        };
        self.mons[mon_idx].stack.retain(|&h| h != handle);
        if self.mons[mon_idx].sel == Some(handle) {
            let m = &self.mons[mon_idx];
            let next = m.stack.iter().copied().find(|h| {
                self.clients
                    .get(h)
                    .map_or(false, |c| c.is_visible_on(m) && !c.minimized)
            });
            self.mons[mon_idx].sel = next;
        }
    }

    /// Brings a client to the head of the order-list and focuses it.
    pub fn pop(&mut self, handle: ClientHandle) {
        let mon_idx = match self.clients.get(&handle) {
            Some(c) => c.monitor_idx,
            None => return,
        };
        self.detach(handle);
        self.attach(handle);
        self.focus(Some(handle));
        self.arrange(Some(mon_idx));
    }

    /* arrangement */

    pub fn arrange(&mut self, mon_idx: Option<usize>) {
        match mon_idx {
            Some(i) => {
                self.update_onscreen(i);
                self.update_visibility(i);
                self.update_bar_positions(i);
                let symbol = self.mons[i].cur_layout().symbol.to_string();
                self.set_layout_symbol(i, &symbol);
                layouts::arrange_layout(self, i);
            }
            None => {
                for i in 0..self.mons.len() {
                    self.arrange(Some(i));
                }
            }
        }
    }

    pub fn set_layout_symbol(&mut self, mon_idx: usize, symbol: &str) {
        let mut s = symbol.to_string();
        if s.len() > 15 {
            let mut end = 15;
            while !s.is_char_boundary(end) {
                end -= 1;
            }
            s.truncate(end);
        }
        self.mons[mon_idx].layout_symbol = s;
    }

    /// Recomputes the layout-derived `onscreen` flag and the marked
    /// client count.
    pub fn update_onscreen(&mut self, mon_idx: usize) {
        let kind = self.mons[mon_idx].cur_layout().kind;
        let tagset = {
            let m = &self.mons[mon_idx];
            m.tagset[m.selected_tags]
        };
        let sel = self.mons[mon_idx].sel;
        let order = self.mons[mon_idx].clients.clone();
        let mut nmarked = 0;
        for &h in &order {
            let c = match self.clients.get_mut(&h) {
                Some(c) => c,
                None => continue,
            };
            let vis = c.tags & tagset != 0;
            c.onscreen = match kind {
                LayoutKind::Floating | LayoutKind::Tile => vis && !c.minimized,
                LayoutKind::Monocle => {
                    vis && !c.minimized && (c.is_floating || Some(h) == sel)
                }
                LayoutKind::Deck => {
                    vis && !c.minimized && (c.is_floating || c.marked || Some(h) == sel)
                }
            };
            if vis && c.marked {
                nmarked += 1;
            }
        }
        // with no suitable selection, the top visible stack entry
        // becomes the presented one
        let needs_top = match kind {
            LayoutKind::Monocle => sel
                .and_then(|s| self.clients.get(&s))
                .map_or(true, |c| c.is_floating),
            LayoutKind::Deck => sel
                .and_then(|s| self.clients.get(&s))
                .map_or(true, |c| c.marked || c.is_floating),
            _ => false,
        };
        if needs_top {
            let stack = self.mons[mon_idx].stack.clone();
            let top = stack.iter().copied().find(|h| {
                self.clients.get(h).map_or(false, |c| {
                    c.tags & tagset != 0 && !c.onscreen && !c.minimized
                })
            });
            if let Some(h) = top {
                if let Some(c) = self.clients.get_mut(&h) {
                    c.onscreen = true;
                }
            }
        }
        self.mons[mon_idx].num_marked_win = nmarked;
    }

    /// Presents or parks windows according to `onscreen`, walking the
    /// focus stack top-down for shown clients and bottom-up for hidden
    /// ones so z-order survives the transition.
    pub fn update_visibility(&mut self, mon_idx: usize) {
        let stack = self.mons[mon_idx].stack.clone();
        let shows = |wm: &Deckwm, h: ClientHandle| -> bool {
            let m = &wm.mons[mon_idx];
            wm.clients.get(&h).map_or(false, |c| {
                c.is_visible_on(m)
                    && (c.onscreen || (!config::HIDE_BURIED_WINDOWS && !c.minimized))
            })
        };
        for &h in &stack {
            if !shows(self, h) {
                continue;
            }
            let (win, x, y, w, hh, refloat) = {
                let c = &self.clients[&h];
                let m = &self.mons[mon_idx];
                (
                    c.win,
                    c.x,
                    c.y,
                    c.w,
                    c.h,
                    (m.is_floating_layout() || c.is_floating) && !c.is_fullscreen,
                )
            };
            self.xwrapper.move_window(win, x, y);
            if refloat {
                self.resize(h, x, y, w, hh, false);
            }
            self.xwrapper.set_client_state(win, NORMAL_STATE);
        }
        for &h in stack.iter().rev() {
            if shows(self, h) {
                continue;
            }
            if let Some(c) = self.clients.get(&h) {
                let (win, width, y) = (c.win, c.width(), c.y);
                self.xwrapper.move_window(win, -2 * width, y);
                self.xwrapper.set_client_state(win, ICONIC_STATE);
            }
        }
    }

    /// Recomputes the work-area from bar visibility and parks hidden
    /// bars off screen.
    pub fn update_bar_positions(&mut self, mon_idx: usize) {
        let bh = self.bar_height;
        let th = self.tab_height;
        let (nvis, nhid) = {
            let m = &self.mons[mon_idx];
            let mut nvis = 0;
            let mut nhid = 0;
            for h in &m.clients {
                if let Some(c) = self.clients.get(h) {
                    if c.is_visible_on(m) {
                        nvis += 1;
                        if c.minimized {
                            nhid += 1;
                        }
                    }
                }
            }
            (nvis, nhid)
        };
        let m = &mut self.mons[mon_idx];
        m.winarea_y = m.mon_y;
        m.winarea_height = m.mon_height;
        if m.show_tagbar {
            m.winarea_height -= bh;
            m.tagbar_pos = if m.tags_on_top {
                m.winarea_y
            } else {
                m.winarea_y + m.winarea_height
            };
            if m.tags_on_top {
                m.winarea_y += bh;
            }
        } else {
            m.tagbar_pos = -bh;
        }

        let kind = m.cur_layout().kind;
        let show_tabs = match m.show_clientbar {
            ClientbarMode::Always => true,
            ClientbarMode::Never => false,
            ClientbarMode::Auto => {
                nhid > 0
                    || (nvis > 1 && kind == LayoutKind::Monocle)
                    || (nvis > 1 + m.num_marked_win && kind == LayoutKind::Deck)
            }
        };
        if show_tabs {
            m.winarea_height -= th;
            m.clientbar_pos = if m.tags_on_top {
                m.winarea_y + m.winarea_height
            } else {
                m.winarea_y
            };
            if !m.tags_on_top {
                m.winarea_y += th;
            }
        } else {
            m.clientbar_pos = -th;
        }
        let (win, x, pos, w) = (m.clientbar_win, m.winarea_x, m.clientbar_pos, m.winarea_width);
        if win != Window(0) {
            self.xwrapper.move_resize_window(win, x, pos, w, th);
        }
    }

    /* geometry */

    /// Resizes a client, running the size-hint solver first.
    pub fn resize(&mut self, handle: ClientHandle, x: i32, y: i32, w: i32, h: i32, interact: bool) {
        let (changed, x, y, w, h) = {
            let c = match self.clients.get(&handle) {
                Some(c) => c,
                None => return,
            };
            let m = &self.mons[c.monitor_idx];
            let apply_hints = config::RESIZE_HINTS || c.is_floating || m.is_floating_layout();
            apply_size_hints(
                c,
                x,
                y,
                w,
                h,
                interact,
                self.screen_width,
                self.screen_height,
                (m.winarea_x, m.winarea_y, m.winarea_width, m.winarea_height),
                self.bar_height,
                apply_hints,
            )
        };
        if changed {
            self.resize_client(handle, x, y, w, h);
        }
    }

    /// Resizes a client without consulting size hints.
    pub fn resize_client(&mut self, handle: ClientHandle, x: i32, y: i32, w: i32, h: i32) {
        let (win, bw) = {
            let c = match self.clients.get_mut(&handle) {
                Some(c) => c,
                None => return,
            };
            c.oldx = c.x;
            c.x = x;
            c.oldy = c.y;
            c.y = y;
            c.oldw = c.w;
            c.w = w;
            c.oldh = c.h;
            c.h = h;
            (c.win, c.bw)
        };
        self.xwrapper.configure_window(win, x, y, w, h, bw);
        self.configure(handle);
        self.xwrapper.sync(false);
    }

    /// Reports the client's geometry back to it with a synthetic
    /// ConfigureNotify.
    pub fn configure(&self, handle: ClientHandle) {
        if let Some(c) = self.clients.get(&handle) {
            self.xwrapper
                .send_configure_notify(c.win, c.x, c.y, c.w, c.h, c.bw);
        }
    }

    /* focus */

    pub fn focus(&mut self, handle: Option<ClientHandle>) {
        let mut target = handle;
        let visible = target.and_then(|h| self.clients.get(&h)).map_or(false, |c| {
            c.is_visible_on(&self.mons[c.monitor_idx])
        });
        if target.is_none() || !visible {
            let m = &self.mons[self.selected_monitor];
            target = m.stack.iter().copied().find(|h| {
                self.clients
                    .get(h)
                    .map_or(false, |c| c.is_visible_on(m) && !c.minimized)
            });
        }
        let prev = self.mons[self.selected_monitor].sel;
        if let Some(p) = prev {
            if Some(p) != target {
                self.unfocus(p);
            }
        }
        if let Some(h) = target {
            let mon_idx = self.clients[&h].monitor_idx;
            if mon_idx != self.selected_monitor {
                self.selected_monitor = mon_idx;
            }
            if self.clients[&h].is_urgent {
                self.clear_urgent(h);
            }
            self.stack_detach(h);
            self.stack_attach(h);
            self.grab_buttons(h, true);
            let (win, never_focus) = {
                let c = &self.clients[&h];
                (c.win, c.never_focus)
            };
            self.xwrapper.set_window_border(win, Scheme::Selected);
            if !never_focus {
                self.xwrapper.set_input_focus(win);
                self.xwrapper.set_window_prop(
                    self.root,
                    self.xwrapper.atoms.get(Atom::Net(Net::ActiveWindow)),
                    win,
                );
            }
            self.xwrapper
                .send_event(win, self.xwrapper.atoms.get(Atom::Wm(WM::TakeFocus)));
        } else {
            self.focus_root();
        }
        self.mons[self.selected_monitor].sel = target;
        self.draw_bars();
        self.arrange(Some(self.selected_monitor));
    }

    pub fn unfocus(&mut self, handle: ClientHandle) {
        let win = match self.clients.get(&handle) {
            Some(c) => c.win,
            None => return,
        };
        self.grab_buttons(handle, false);
        self.xwrapper.set_window_border(win, Scheme::Normal);
    }

    pub fn focus_root(&self) {
        self.xwrapper.set_input_focus(self.root);
        self.xwrapper
            .delete_property(self.root, self.xwrapper.atoms.get(Atom::Net(Net::ActiveWindow)));
    }

    pub fn clear_urgent(&mut self, handle: ClientHandle) {
        if let Some(c) = self.clients.get_mut(&handle) {
            c.is_urgent = false;
            let win = c.win;
            self.xwrapper.clear_urgency_hint(win);
        }
    }

    /// Orders the monitor's windows back-to-front: floating selection
    /// raised, tiled clients stacked below the tag bar in focus order.
    pub fn restack(&mut self, mon_idx: usize) {
        self.draw_tagbar(mon_idx);
        self.draw_clientbar(mon_idx);
        let sel = match self.mons[mon_idx].sel {
            Some(s) => s,
            None => return,
        };
        {
            let m = &self.mons[mon_idx];
            if let Some(c) = self.clients.get(&sel) {
                if c.is_floating || m.is_floating_layout() {
                    self.xwrapper.raise_window(c.win);
                }
            }
        }
        let m = &self.mons[mon_idx];
        if !m.is_floating_layout() {
            let mut chain = vec![m.tagbar_win];
            for &h in &m.stack {
                if let Some(c) = self.clients.get(&h) {
                    if !c.is_floating && c.is_visible_on(m) {
                        chain.push(c.win);
                    }
                }
            }
            self.xwrapper.stack_below_chain(&chain);
        }
        self.xwrapper.sync(false);
        while self
            .xwrapper
            .check_mask_event(xlib::EnterWindowMask)
            .is_some()
        {}
    }

    /* tag views */

    pub fn view_tag(&mut self, ui: u32) {
        let mon_idx = self.selected_monitor;
        let toggle = self.mons[mon_idx].view_tags(ui, config::VIEW_TAG_TOGGLES);
        if toggle {
            self.toggle_tagbar(mon_idx);
        }
        self.focus(None);
        self.arrange(Some(mon_idx));
    }

    pub fn toggle_tag_view(&mut self, ui: u32) {
        let mon_idx = self.selected_monitor;
        match self.mons[mon_idx].toggle_view(ui) {
            Some(toggle) => {
                if toggle {
                    self.toggle_tagbar(mon_idx);
                }
                self.focus(None);
                self.arrange(Some(mon_idx));
            }
            None => {}
        }
    }

    pub fn toggle_tagbar(&mut self, mon_idx: usize) {
        {
            let m = &mut self.mons[mon_idx];
            m.show_tagbar = !m.show_tagbar;
            let t = m.pertag.curtag;
            m.pertag.show_tagbars[t] = m.show_tagbar;
        }
        self.update_bar_positions(mon_idx);
        let (win, x, pos, w) = {
            let m = &self.mons[mon_idx];
            (m.tagbar_win, m.winarea_x, m.tagbar_pos, m.winarea_width)
        };
        self.xwrapper
            .move_resize_window(win, x, pos, w, self.bar_height);
        self.arrange(Some(mon_idx));
    }

    /* monitors */

    pub fn send_client_to_monitor(&mut self, handle: ClientHandle, target: usize) {
        if self
            .clients
            .get(&handle)
            .map_or(true, |c| c.monitor_idx == target)
        {
            return;
        }
        self.unfocus(handle);
        self.focus_root();
        self.detach(handle);
        self.stack_detach(handle);
        {
            let tags = {
                let m = &self.mons[target];
                m.tagset[m.selected_tags]
            };
            let c = self.clients.get_mut(&handle).unwrap();
            c.monitor_idx = target;
            c.tags = tags;
        }
        self.attach(handle);
        self.stack_attach(handle);
        self.focus(None);
        self.arrange(None);
    }

    pub(crate) fn monitor_cleanup(&mut self, mon_idx: usize) {
        let m = self.mons.remove(mon_idx);
        if m.tagbar_win != Window(0) {
            self.xwrapper.unmap_window(m.tagbar_win);
            self.xwrapper.destroy_window(m.tagbar_win);
            self.xwrapper.unmap_window(m.clientbar_win);
            self.xwrapper.destroy_window(m.clientbar_win);
        }
        for c in self.clients.values_mut() {
            if c.monitor_idx > mon_idx {
                c.monitor_idx -= 1;
            }
        }
        if self.selected_monitor > mon_idx {
            self.selected_monitor -= 1;
        }
        for (i, m) in self.mons.iter_mut().enumerate() {
            m.num = i as i32;
        }
    }

    /// Reconciles the monitor list against the multi-head layout.
    /// Returns whether anything moved.
    pub fn update_geometry(&mut self) -> bool {
        let mut dirty = false;
        match self.xwrapper.xinerama_screens() {
            Some(unique) => {
                let n = self.mons.len();
                let nn = unique.len();
                if n <= nn {
                    for _ in 0..nn - n {
                        let num = self.mons.len() as i32;
                        self.mons.push(Monitor::new(num));
                    }
                    for (i, &(x, y, w, h)) in unique.iter().enumerate() {
                        let changed = i >= n || {
                            let m = &self.mons[i];
                            x != m.mon_x || y != m.mon_y || w != m.mon_width || h != m.mon_height
                        };
                        if changed {
                            dirty = true;
                            {
                                let m = &mut self.mons[i];
                                m.num = i as i32;
                                m.mon_x = x;
                                m.winarea_x = x;
                                m.mon_y = y;
                                m.winarea_y = y;
                                m.mon_width = w;
                                m.winarea_width = w;
                                m.mon_height = h;
                                m.winarea_height = h;
                            }
                            self.update_bar_positions(i);
                        }
                    }
                } else {
                    // migrate clients off removed monitors to the head
                    while self.mons.len() > nn {
                        let last = self.mons.len() - 1;
                        let handles = self.mons[last].clients.clone();
                        for h in handles {
                            dirty = true;
                            self.detach(h);
                            self.stack_detach(h);
                            if let Some(c) = self.clients.get_mut(&h) {
                                c.monitor_idx = 0;
                            }
                            self.attach(h);
                            self.stack_attach(h);
                        }
                        if self.selected_monitor == last {
                            self.selected_monitor = 0;
                        }
                        self.monitor_cleanup(last);
                    }
                }
            }
            None => {
                if self.mons.is_empty() {
                    self.mons.push(Monitor::new(0));
                }
                if self.mons[0].mon_width != self.screen_width
                    || self.mons[0].mon_height != self.screen_height
                {
                    dirty = true;
                    {
                        let m = &mut self.mons[0];
                        m.mon_width = self.screen_width;
                        m.winarea_width = self.screen_width;
                        m.mon_height = self.screen_height;
                        m.winarea_height = self.screen_height;
                    }
                    self.update_bar_positions(0);
                }
            }
        }
        if dirty {
            self.selected_monitor = 0;
            self.selected_monitor = self.window_to_monitor(self.root.0);
        }
        dirty
    }

    /* client property readers */

    pub fn update_title(&mut self, handle: ClientHandle) {
        let win = match self.clients.get(&handle) {
            Some(c) => c.win,
            None => return,
        };
        let name = self
            .xwrapper
            .get_text_prop(win, self.xwrapper.atoms.get(Atom::Net(Net::WMName)))
            .or_else(|| self.xwrapper.get_text_prop(win, xlib::XA_WM_NAME))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "broken".to_string());
        if let Some(c) = self.clients.get_mut(&handle) {
            c.set_name(&name);
        }
    }

    pub fn update_size_hints(&mut self, handle: ClientHandle) {
        let win = match self.clients.get(&handle) {
            Some(c) => c.win,
            None => return,
        };
        let size = self.xwrapper.get_wm_normal_hints(win);
        let c = match self.clients.get_mut(&handle) {
            Some(c) => c,
            None => return,
        };
        let (flags, size) = match size {
            Some(s) => (s.flags, s),
            None => (xlib::PSize, unsafe { std::mem::zeroed() }),
        };
        if flags & xlib::PBaseSize != 0 {
            c.basew = size.base_width;
            c.baseh = size.base_height;
        } else if flags & xlib::PMinSize != 0 {
            c.basew = size.min_width;
            c.baseh = size.min_height;
        } else {
            c.basew = 0;
            c.baseh = 0;
        }
        if flags & xlib::PResizeInc != 0 {
            c.incw = size.width_inc;
            c.inch = size.height_inc;
        } else {
            c.incw = 0;
            c.inch = 0;
        }
        if flags & xlib::PMaxSize != 0 {
            c.maxw = size.max_width;
            c.maxh = size.max_height;
        } else {
            c.maxw = 0;
            c.maxh = 0;
        }
        if flags & xlib::PMinSize != 0 {
            c.minw = size.min_width;
            c.minh = size.min_height;
        } else if flags & xlib::PBaseSize != 0 {
            c.minw = size.base_width;
            c.minh = size.base_height;
        } else {
            c.minw = 0;
            c.minh = 0;
        }
        if flags & xlib::PAspect != 0 {
            c.mina = size.min_aspect.y as f32 / size.min_aspect.x as f32;
            c.maxa = size.max_aspect.x as f32 / size.max_aspect.y as f32;
        } else {
            c.mina = 0.0;
            c.maxa = 0.0;
        }
        c.is_fixed =
            c.maxw > 0 && c.minw > 0 && c.maxh > 0 && c.minh > 0 && c.maxw == c.minw && c.maxh == c.minh;
    }

    pub fn update_wm_hints(&mut self, handle: ClientHandle) {
        let win = match self.clients.get(&handle) {
            Some(c) => c.win,
            None => return,
        };
        if let Some(hints) = self.xwrapper.get_wm_hints(win) {
            let is_sel = self.mons[self.selected_monitor].sel == Some(handle);
            if is_sel && hints.urgent {
                self.xwrapper.clear_urgency_hint(win);
            } else if let Some(c) = self.clients.get_mut(&handle) {
                c.is_urgent = hints.urgent;
            }
            if let Some(c) = self.clients.get_mut(&handle) {
                c.never_focus = hints.input.map_or(false, |input| !input);
            }
        }
    }

    pub fn update_window_type(&mut self, handle: ClientHandle) {
        let win = match self.clients.get(&handle) {
            Some(c) => c.win,
            None => return,
        };
        let state = self
            .xwrapper
            .get_atom_prop(win, self.xwrapper.atoms.get(Atom::Net(Net::WMState)));
        let wtype = self
            .xwrapper
            .get_atom_prop(win, self.xwrapper.atoms.get(Atom::Net(Net::WMWindowType)));
        if state == Some(self.xwrapper.atoms.get(Atom::Net(Net::WMFullscreen))) {
            self.set_fullscreen(handle, true);
        }
        if wtype == Some(self.xwrapper.atoms.get(Atom::Net(Net::WMWindowTypeDialog))) {
            if let Some(c) = self.clients.get_mut(&handle) {
                c.is_floating = true;
            }
        }
    }

    pub fn set_fullscreen(&mut self, handle: ClientHandle, fullscreen: bool) {
        let win = match self.clients.get(&handle) {
            Some(c) => c.win,
            None => return,
        };
        let net_wm_state = self.xwrapper.atoms.get(Atom::Net(Net::WMState));
        if fullscreen {
            let atom = self.xwrapper.atoms.get(Atom::Net(Net::WMFullscreen));
            self.xwrapper.change_property(
                win,
                net_wm_state,
                xlib::XA_ATOM,
                32,
                xlib::PropModeReplace,
                &atom as *const xlib::Atom as *const u8,
                1,
            );
            let (mx, my, mw, mh) = {
                let mon_idx = self.clients[&handle].monitor_idx;
                let c = self.clients.get_mut(&handle).unwrap();
                c.is_fullscreen = true;
                c.old_state = c.is_floating;
                c.oldbw = c.bw;
                c.bw = 0;
                c.is_floating = true;
                let m = &self.mons[mon_idx];
                (m.mon_x, m.mon_y, m.mon_width, m.mon_height)
            };
            self.resize_client(handle, mx, my, mw, mh);
            self.xwrapper.raise_window(win);
        } else {
            self.xwrapper.change_property(
                win,
                net_wm_state,
                xlib::XA_ATOM,
                32,
                xlib::PropModeReplace,
                std::ptr::null(),
                0,
            );
            let (rect, mon_idx) = {
                let c = self.clients.get_mut(&handle).unwrap();
                c.is_fullscreen = false;
                c.is_floating = c.old_state;
                c.bw = c.oldbw;
                ((c.oldx, c.oldy, c.oldw, c.oldh), c.monitor_idx)
            };
            self.resize_client(handle, rect.0, rect.1, rect.2, rect.3);
            self.arrange(Some(mon_idx));
        }
    }

    /// Rewrites _NET_CLIENT_LIST from the monitors' order-lists.
    pub fn update_client_list(&mut self) {
        let prop = self.xwrapper.atoms.get(Atom::Net(Net::ClientList));
        self.xwrapper.delete_property(self.root, prop);
        for m in &self.mons {
            for h in &m.clients {
                if let Some(c) = self.clients.get(h) {
                    self.xwrapper.append_window_prop(self.root, prop, c.win);
                }
            }
        }
    }
}
