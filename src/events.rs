use x11::xlib;

use crate::actions::Action;
use crate::config::{self, Click};
use crate::state::{CursorType, Deckwm};
use crate::xwrapper::{Atom, Net, Window, WITHDRAWN_STATE};

const MOUSE_MASK: i64 =
    xlib::ButtonPressMask | xlib::ButtonReleaseMask | xlib::PointerMotionMask;

/// Single dispatch point for the blocking loop and for the nested
/// pointer-grab loops, which delegate non-pointer events back here.
pub fn handle_event(wm: &mut Deckwm, ev: &mut xlib::XEvent) {
    match ev.get_type() {
        xlib::ButtonPress => button_press(wm, unsafe { &ev.button }),
        xlib::ClientMessage => client_message(wm, unsafe { &ev.client_message }),
        xlib::ConfigureNotify => configure_notify(wm, unsafe { &ev.configure }),
        xlib::ConfigureRequest => configure_request(wm, unsafe { &ev.configure_request }),
        xlib::DestroyNotify => destroy_notify(wm, unsafe { &ev.destroy_window }),
        xlib::EnterNotify => enter_notify(wm, unsafe { &ev.crossing }),
        xlib::Expose => expose(wm, unsafe { &ev.expose }),
        xlib::FocusIn => focus_in(wm, unsafe { &ev.focus_change }),
        xlib::KeyPress => key_press(wm, unsafe { &ev.key }),
        xlib::MappingNotify => mapping_notify(wm, unsafe { &mut ev.mapping }),
        xlib::MapRequest => map_request(wm, unsafe { &ev.map_request }),
        xlib::MotionNotify => motion_notify(wm, unsafe { &ev.motion }),
        xlib::PropertyNotify => property_notify(wm, unsafe { &ev.property }),
        xlib::UnmapNotify => unmap_notify(wm, unsafe { &ev.unmap }),
        _ => {}
    }
}

fn button_press(wm: &mut Deckwm, ev: &xlib::XButtonPressedEvent) {
    let mut click = Click::RootWin;
    let mut arg: u32 = 0;

    // focus the monitor under the press if it is foreign
    let m_idx = wm.window_to_monitor(ev.window);
    if m_idx != wm.selected_monitor {
        if let Some(sel) = wm.mons[wm.selected_monitor].sel {
            wm.unfocus(sel);
        }
        wm.focus_root();
        wm.selected_monitor = m_idx;
        wm.focus(None);
    }
    let m_idx = wm.selected_monitor;

    if Window(ev.window) == wm.mons[m_idx].tagbar_win {
        let (occ, tagset, ww) = {
            let m = &wm.mons[m_idx];
            let occ = m
                .clients
                .iter()
                .filter_map(|h| wm.clients.get(h))
                .fold(0u32, |occ, c| occ | c.tags);
            (occ, m.tagset[m.selected_tags], m.winarea_width)
        };
        let shown =
            |i: usize| !config::HIDE_INACTIVE_TAGS || occ & (1 << i) != 0 || tagset & (1 << i) != 0;
        let mut i = 0;
        let mut x = 0;
        loop {
            if shown(i) {
                x += wm.textw(config::TAGS[i]);
            }
            if ev.x >= x {
                i += 1;
                if i >= config::TAGS.len() {
                    break;
                }
            } else {
                break;
            }
        }
        if i < config::TAGS.len() {
            click = Click::TagBar;
            arg = 1 << i;
        } else if ev.x > ww - wm.textw(&wm.status_text) {
            click = Click::StatusText;
        } else {
            click = Click::WinTitle;
        }
    } else if Window(ev.window) == wm.mons[m_idx].clientbar_win {
        let symbol = wm.mons[m_idx].layout_symbol.clone();
        let ww = wm.mons[m_idx].winarea_width;
        if ev.x > ww - wm.textw(&symbol) {
            click = Click::LayoutSymbol;
        } else {
            let (visible, widths, ntabs) = {
                let m = &wm.mons[m_idx];
                let visible: Vec<_> = m
                    .clients
                    .iter()
                    .filter(|h| wm.clients.get(h).map_or(false, |c| c.is_visible_on(m)))
                    .copied()
                    .collect();
                (visible, m.client_tab_widths, m.num_client_tabs)
            };
            let mut i = 0usize;
            let mut x = 0;
            let mut hit = false;
            for _ in &visible {
                x += widths[i.min(widths.len() - 1)];
                if ev.x > x {
                    i += 1;
                } else {
                    hit = true;
                    break;
                }
                if i >= ntabs {
                    break;
                }
            }
            if hit {
                click = Click::ClientBar;
                arg = i as u32;
            }
        }
    } else if let Some(h) = wm.window_to_client_handle(ev.window) {
        wm.focus(Some(h));
        click = Click::ClientWin;
    }

    for b in config::buttons() {
        if b.click == click
            && b.button == ev.button
            && wm.xwrapper.clean_mask(wm.numlock_mask, b.mask)
                == wm.xwrapper.clean_mask(wm.numlock_mask, ev.state)
        {
            let action = if click == Click::TagBar || click == Click::ClientBar {
                b.action.with_resolved_arg(arg)
            } else {
                b.action.clone()
            };
            action.execute(wm);
        }
    }

    // replay the grabbed press into the client
    if wm.window_to_client_handle(ev.window).is_some() {
        wm.xwrapper.allow_events(xlib::ReplayPointer);
    }
}

fn client_message(wm: &mut Deckwm, cme: &xlib::XClientMessageEvent) {
    let h = match wm.window_to_client_handle(cme.window) {
        Some(h) => h,
        None => return,
    };
    let net_wm_state = wm.xwrapper.atoms.get(Atom::Net(Net::WMState));
    let net_active = wm.xwrapper.atoms.get(Atom::Net(Net::ActiveWindow));
    let fullscreen = wm.xwrapper.atoms.get(Atom::Net(Net::WMFullscreen));
    if cme.message_type == net_wm_state {
        if cme.data.get_long(1) as xlib::Atom == fullscreen
            || cme.data.get_long(2) as xlib::Atom == fullscreen
        {
            // 1 = _NET_WM_STATE_ADD, 2 = _NET_WM_STATE_TOGGLE
            let action = cme.data.get_long(0);
            let enable = action == 1 || (action == 2 && !wm.clients[&h].is_fullscreen);
            wm.set_fullscreen(h, enable);
        }
    } else if cme.message_type == net_active {
        let (mon_idx, tags, visible) = {
            let c = &wm.clients[&h];
            let m = &wm.mons[c.monitor_idx];
            (c.monitor_idx, c.tags, c.is_visible_on(m))
        };
        if !visible {
            let m = &mut wm.mons[mon_idx];
            m.selected_tags ^= 1;
            m.tagset[m.selected_tags] = tags;
        }
        wm.pop(h);
    }
}

/// Root resizes (resolution changes) trigger a full multi-head
/// reconciliation.
fn configure_notify(wm: &mut Deckwm, ev: &xlib::XConfigureEvent) {
    if Window(ev.window) != wm.root {
        return;
    }
    let dirty = wm.screen_width != ev.width || wm.screen_height != ev.height;
    wm.screen_width = ev.width;
    wm.screen_height = ev.height;
    if wm.update_geometry() || dirty {
        wm.xwrapper
            .resize_drawable(wm.screen_width as u32, wm.bar_height as u32);
        wm.init_bars();
        for i in 0..wm.mons.len() {
            let (win, x, pos, w) = {
                let m = &wm.mons[i];
                (m.tagbar_win, m.winarea_x, m.tagbar_pos, m.winarea_width)
            };
            if win != Window(0) {
                wm.xwrapper.move_resize_window(win, x, pos, w, wm.bar_height);
            }
        }
        wm.focus(None);
        wm.arrange(None);
    }
}

fn configure_request(wm: &mut Deckwm, ev: &xlib::XConfigureRequestEvent) {
    if let Some(h) = wm.window_to_client_handle(ev.window) {
        if ev.value_mask & xlib::CWBorderWidth as u64 != 0 {
            if let Some(c) = wm.clients.get_mut(&h) {
                c.bw = ev.border_width;
            }
        } else {
            let floating_layout = wm.mons[wm.selected_monitor].is_floating_layout();
            let is_floating = wm.clients[&h].is_floating;
            if is_floating || floating_layout {
                let visible_rect = {
                    let mon_idx = wm.clients[&h].monitor_idx;
                    let m = &wm.mons[mon_idx];
                    let (mx, my, mw, mh) = (m.mon_x, m.mon_y, m.mon_width, m.mon_height);
                    let c = wm.clients.get_mut(&h).unwrap();
                    if ev.value_mask & xlib::CWX as u64 != 0 {
                        c.oldx = c.x;
                        c.x = mx + ev.x;
                    }
                    if ev.value_mask & xlib::CWY as u64 != 0 {
                        c.oldy = c.y;
                        c.y = my + ev.y;
                    }
                    if ev.value_mask & xlib::CWWidth as u64 != 0 {
                        c.oldw = c.w;
                        c.w = ev.width;
                    }
                    if ev.value_mask & xlib::CWHeight as u64 != 0 {
                        c.oldh = c.h;
                        c.h = ev.height;
                    }
                    if c.x + c.w > mx + mw && c.is_floating {
                        c.x = mx + (mw / 2 - c.width() / 2); /* center horizontally */
                    }
                    if c.y + c.h > my + mh && c.is_floating {
                        c.y = my + (mh / 2 - c.height() / 2); /* center vertically */
                    }
                    (c.x, c.y, c.w, c.h)
                };
                if ev.value_mask & (xlib::CWX | xlib::CWY) as u64 != 0
                    && ev.value_mask & (xlib::CWWidth | xlib::CWHeight) as u64 == 0
                {
                    wm.configure(h);
                }
                let (visible, win) = {
                    let c = &wm.clients[&h];
                    let m = &wm.mons[c.monitor_idx];
                    (c.is_visible_on(m), c.win)
                };
                if visible {
                    wm.xwrapper.move_resize_window(
                        win,
                        visible_rect.0,
                        visible_rect.1,
                        visible_rect.2,
                        visible_rect.3,
                    );
                }
            } else {
                wm.configure(h);
            }
        }
    } else {
        wm.xwrapper.configure_window_passthrough(ev);
    }
    wm.xwrapper.sync(false);
}

fn destroy_notify(wm: &mut Deckwm, ev: &xlib::XDestroyWindowEvent) {
    if let Some(h) = wm.window_to_client_handle(ev.window) {
        wm.unmanage(h, true);
    }
}

fn enter_notify(wm: &mut Deckwm, ev: &xlib::XCrossingEvent) {
    if (ev.mode != xlib::NotifyNormal || ev.detail == xlib::NotifyInferior)
        && Window(ev.window) != wm.root
    {
        return;
    }
    let h = wm.window_to_client_handle(ev.window);
    let m = match h {
        Some(h) => wm.clients[&h].monitor_idx,
        None => wm.window_to_monitor(ev.window),
    };
    if m != wm.selected_monitor {
        if let Some(sel) = wm.mons[wm.selected_monitor].sel {
            wm.unfocus(sel);
        }
        wm.focus_root();
        wm.selected_monitor = m;
    } else if h.is_none() || h == wm.mons[wm.selected_monitor].sel {
        return;
    }
    wm.focus(h);
}

fn expose(wm: &mut Deckwm, ev: &xlib::XExposeEvent) {
    if ev.count == 0 {
        let m = wm.window_to_monitor(ev.window);
        wm.draw_tagbar(m);
        wm.draw_clientbar(m);
    }
}

/// Some clients steal the input focus; hand it back to the selection.
fn focus_in(wm: &mut Deckwm, ev: &xlib::XFocusChangeEvent) {
    if let Some(sel) = wm.mons[wm.selected_monitor].sel {
        if wm.clients.get(&sel).map_or(false, |c| c.win.0 != ev.window) {
            wm.focus(Some(sel));
        }
    }
}

fn key_press(wm: &mut Deckwm, ev: &xlib::XKeyEvent) {
    let keysym = wm.xwrapper.keycode_to_keysym(ev.keycode) as u32;
    for key in config::keys() {
        if keysym == key.keysym
            && wm.xwrapper.clean_mask(wm.numlock_mask, key.mask)
                == wm.xwrapper.clean_mask(wm.numlock_mask, ev.state)
        {
            key.action.execute(wm);
        }
    }
}

fn mapping_notify(wm: &mut Deckwm, ev: &mut xlib::XMappingEvent) {
    wm.xwrapper.refresh_keyboard_mapping(ev);
    if ev.request == xlib::MappingKeyboard {
        wm.grab_shortcut_keys();
    }
}

fn map_request(wm: &mut Deckwm, ev: &xlib::XMapRequestEvent) {
    let wa = match wm.xwrapper.get_window_attributes(Window(ev.window)) {
        Some(wa) => wa,
        None => return,
    };
    if wa.override_redirect != 0 {
        return;
    }
    if wm.window_to_client_handle(ev.window).is_none() {
        wm.manage(Window(ev.window), &wa);
    }
}

/// Focus follows the pointer across monitor boundaries.
fn motion_notify(wm: &mut Deckwm, ev: &xlib::XMotionEvent) {
    if Window(ev.window) != wm.root {
        return;
    }
    let m = wm.rect_to_monitor(ev.x_root, ev.y_root, 1, 1);
    if wm.motion_mon.map_or(false, |prev| prev != m) && m != wm.selected_monitor {
        if let Some(sel) = wm.mons[wm.selected_monitor].sel {
            wm.unfocus(sel);
        }
        wm.focus_root();
        wm.selected_monitor = m;
        wm.focus(None);
    }
    wm.motion_mon = Some(m);
}

fn property_notify(wm: &mut Deckwm, ev: &xlib::XPropertyEvent) {
    if Window(ev.window) == wm.root && ev.atom == xlib::XA_WM_NAME {
        wm.update_statusarea();
        return;
    }
    if ev.state == xlib::PropertyDelete {
        return;
    }
    let h = match wm.window_to_client_handle(ev.window) {
        Some(h) => h,
        None => return,
    };
    if ev.atom == xlib::XA_WM_TRANSIENT_FOR {
        let (is_floating, win, mon_idx) = {
            let c = &wm.clients[&h];
            (c.is_floating, c.win, c.monitor_idx)
        };
        if !is_floating {
            let trans_managed = wm
                .xwrapper
                .get_transient_for_hint(win)
                .and_then(|t| wm.window_to_client_handle(t.0))
                .is_some();
            if trans_managed {
                wm.clients.get_mut(&h).unwrap().is_floating = true;
                wm.arrange(Some(mon_idx));
            }
        }
    } else if ev.atom == xlib::XA_WM_NORMAL_HINTS {
        wm.update_size_hints(h);
    } else if ev.atom == xlib::XA_WM_HINTS {
        wm.update_wm_hints(h);
        wm.draw_bars();
    }
    if ev.atom == xlib::XA_WM_NAME
        || ev.atom == wm.xwrapper.atoms.get(Atom::Net(Net::WMName))
    {
        wm.update_title(h);
        let mon_idx = wm.clients[&h].monitor_idx;
        if wm.mons[mon_idx].sel == Some(h) {
            wm.draw_tagbar(mon_idx);
        }
        wm.draw_clientbar(mon_idx);
    }
    if ev.atom == wm.xwrapper.atoms.get(Atom::Net(Net::WMWindowType)) {
        wm.update_window_type(h);
    }
}

fn unmap_notify(wm: &mut Deckwm, ev: &xlib::XUnmapEvent) {
    if let Some(h) = wm.window_to_client_handle(ev.window) {
        if ev.send_event != 0 {
            let win = wm.clients[&h].win;
            wm.xwrapper.set_client_state(win, WITHDRAWN_STATE);
        } else {
            wm.unmanage(h, false);
        }
    }
}

/// Pointer-grab loop: moves the selected window with the mouse,
/// snapping to the work-area edges and unfloating-on-drag under a
/// tiled layout. Crossing a monitor boundary reassigns the client.
pub fn drag_window(wm: &mut Deckwm) {
    let mon_idx = wm.selected_monitor;
    let sel = match wm.mons[mon_idx].sel {
        Some(s) => s,
        None => return,
    };
    if wm.clients[&sel].is_fullscreen {
        return; /* moving fullscreen windows by mouse isn't supported */
    }
    wm.restack(mon_idx);
    if !wm
        .xwrapper
        .grab_pointer(MOUSE_MASK, wm.cursor[CursorType::Move as usize])
    {
        return;
    }
    let (px, py) = match wm.xwrapper.query_pointer_position() {
        Some(p) => p,
        None => {
            wm.xwrapper.ungrab_pointer();
            return;
        }
    };
    let ocx = wm.clients[&sel].x;
    let ocy = wm.clients[&sel].y;

    loop {
        let mut ev = wm
            .xwrapper
            .mask_event(MOUSE_MASK | xlib::ExposureMask | xlib::SubstructureRedirectMask);
        match ev.get_type() {
            xlib::ConfigureRequest | xlib::Expose | xlib::MapRequest => handle_event(wm, &mut ev),
            xlib::MotionNotify => {
                let mev = unsafe { ev.motion };
                let mut nx = ocx + (mev.x - px);
                let mut ny = ocy + (mev.y - py);
                let (wx, wy, ww, wh, floating_layout) = {
                    let m = &wm.mons[wm.selected_monitor];
                    (
                        m.winarea_x,
                        m.winarea_y,
                        m.winarea_width,
                        m.winarea_height,
                        m.is_floating_layout(),
                    )
                };
                let (cw, ch, width, height, cx, cy, floating) = {
                    let c = &wm.clients[&sel];
                    (c.w, c.h, c.width(), c.height(), c.x, c.y, c.is_floating)
                };
                if nx >= wx && nx <= wx + ww && ny >= wy && ny <= wy + wh {
                    if (wx - nx).abs() < config::SNAP {
                        nx = wx;
                    } else if ((wx + ww) - (nx + width)).abs() < config::SNAP {
                        nx = wx + ww - width;
                    }
                    if (wy - ny).abs() < config::SNAP {
                        ny = wy;
                    } else if ((wy + wh) - (ny + height)).abs() < config::SNAP {
                        ny = wy + wh - height;
                    }
                    if !floating
                        && !floating_layout
                        && ((nx - cx).abs() > config::SNAP || (ny - cy).abs() > config::SNAP)
                    {
                        Action::ToggleFloating.execute(wm);
                    }
                }
                let floating_now = wm.clients.get(&sel).map_or(false, |c| c.is_floating);
                if floating_layout || floating_now {
                    wm.resize(sel, nx, ny, cw, ch, true);
                }
            }
            xlib::ButtonRelease => break,
            _ => {}
        }
    }
    wm.xwrapper.ungrab_pointer();
    let (x, y, w, h) = {
        let c = &wm.clients[&sel];
        (c.x, c.y, c.w, c.h)
    };
    let m = wm.rect_to_monitor(x, y, w, h);
    if m != wm.selected_monitor {
        wm.send_client_to_monitor(sel, m);
        wm.selected_monitor = m;
        wm.focus(None);
    }
}

/// Pointer-grab loop: resizes the selected window from its bottom-right
/// corner, unfloating-on-drag under a tiled layout.
pub fn resize_with_mouse(wm: &mut Deckwm) {
    let mon_idx = wm.selected_monitor;
    let sel = match wm.mons[mon_idx].sel {
        Some(s) => s,
        None => return,
    };
    if wm.clients[&sel].is_fullscreen {
        return; /* resizing fullscreen windows by mouse isn't supported */
    }
    wm.restack(mon_idx);
    if !wm
        .xwrapper
        .grab_pointer(MOUSE_MASK, wm.cursor[CursorType::Resize as usize])
    {
        return;
    }
    let (ocx, ocy, win) = {
        let c = &wm.clients[&sel];
        (c.x, c.y, c.win)
    };
    {
        let c = &wm.clients[&sel];
        wm.xwrapper
            .warp_pointer(win, c.w + c.bw - 1, c.h + c.bw - 1);
    }

    loop {
        let mut ev = wm
            .xwrapper
            .mask_event(MOUSE_MASK | xlib::ExposureMask | xlib::SubstructureRedirectMask);
        match ev.get_type() {
            xlib::ConfigureRequest | xlib::Expose | xlib::MapRequest => handle_event(wm, &mut ev),
            xlib::MotionNotify => {
                let mev = unsafe { ev.motion };
                let (bw, cx, cy, cw, ch, floating) = {
                    let c = &wm.clients[&sel];
                    (c.bw, c.x, c.y, c.w, c.h, c.is_floating)
                };
                let nw = (mev.x - ocx - 2 * bw + 1).max(1);
                let nh = (mev.y - ocy - 2 * bw + 1).max(1);
                let (wx, wy, ww, wh, floating_layout, cwx, cwy) = {
                    let m = &wm.mons[wm.selected_monitor];
                    let cm = &wm.mons[wm.clients[&sel].monitor_idx];
                    (
                        m.winarea_x,
                        m.winarea_y,
                        m.winarea_width,
                        m.winarea_height,
                        m.is_floating_layout(),
                        cm.winarea_x,
                        cm.winarea_y,
                    )
                };
                if cwx + nw >= wx
                    && cwx + nw <= wx + ww
                    && cwy + nh >= wy
                    && cwy + nh <= wy + wh
                    && !floating
                    && !floating_layout
                    && ((nw - cw).abs() > config::SNAP || (nh - ch).abs() > config::SNAP)
                {
                    Action::ToggleFloating.execute(wm);
                }
                let floating_now = wm.clients.get(&sel).map_or(false, |c| c.is_floating);
                if floating_layout || floating_now {
                    wm.resize(sel, cx, cy, nw, nh, true);
                }
            }
            xlib::ButtonRelease => break,
            _ => {}
        }
    }
    {
        let c = &wm.clients[&sel];
        wm.xwrapper
            .warp_pointer(c.win, c.w + c.bw - 1, c.h + c.bw - 1);
    }
    wm.xwrapper.ungrab_pointer();
    while wm
        .xwrapper
        .check_mask_event(xlib::EnterWindowMask)
        .is_some()
    {}
    let (x, y, w, h) = {
        let c = &wm.clients[&sel];
        (c.x, c.y, c.w, c.h)
    };
    let m = wm.rect_to_monitor(x, y, w, h);
    if m != wm.selected_monitor {
        wm.send_client_to_monitor(sel, m);
        wm.selected_monitor = m;
        wm.focus(None);
    }
}
