use std::ffi::CString;
use std::os::raw::c_char;

use x11::xlib;

use crate::client::ClientHandle;
use crate::config;
use crate::events;
use crate::layouts::{Layout, LayoutKind};
use crate::monitor::ClientbarMode;
use crate::state::Deckwm;
use crate::xwrapper::{Atom, WM};

/// The user-invocable command surface. Every command operates on core
/// state only and is a silent no-op without a target.
#[derive(Clone, Debug)]
pub enum Action {
    Spawn(&'static [&'static str]),
    ViewTag(u32),
    ToggleTagView(u32),
    CycleView(i32),
    ShiftTag(i32),
    TagClient(u32),
    ToggleTag(u32),
    SetLayout(Option<&'static Layout>),
    AdjustMarkedWidth(f32),
    SetMarkedWidth(f32),
    CycleFocus(i32),
    CycleStackareaSelection(i32),
    PushClientLeft,
    PushClientRight,
    FocusClient(i32),
    ToggleFloating,
    ToggleFullscreen,
    ToggleMark,
    HideWindow,
    ToggleHidden(i32),
    KillClient,
    ToggleTagbar,
    SetClientbarMode(i32),
    CycleFocusMonitor(i32),
    SendToMonitor(i32),
    DragWindow,
    ResizeWithMouse,
    Quit,
}

impl Action {
    /// Bar clicks carry a resolved tag mask or tab index; bindings with
    /// a zero payload receive it in place of their own argument.
    pub fn with_resolved_arg(&self, ui: u32) -> Action {
        match *self {
            Action::ViewTag(0) => Action::ViewTag(ui),
            Action::ToggleTagView(0) => Action::ToggleTagView(ui),
            Action::TagClient(0) => Action::TagClient(ui),
            Action::ToggleTag(0) => Action::ToggleTag(ui),
            Action::FocusClient(0) => Action::FocusClient(ui as i32),
            Action::ToggleHidden(0) => Action::ToggleHidden(ui as i32),
            ref other => other.clone(),
        }
    }

    pub fn execute(&self, wm: &mut Deckwm) {
        match *self {
            Action::Spawn(cmd) => spawn(wm, cmd),
            Action::ViewTag(ui) => wm.view_tag(ui),
            Action::ToggleTagView(ui) => wm.toggle_tag_view(ui),
            Action::CycleView(dir) => cycle_view(wm, dir),
            Action::ShiftTag(dir) => shift_tag(wm, dir),
            Action::TagClient(ui) => tag_client(wm, ui),
            Action::ToggleTag(ui) => toggle_tag(wm, ui),
            Action::SetLayout(layout) => set_layout(wm, layout),
            Action::AdjustMarkedWidth(delta) => {
                let cur = wm.mons[wm.selected_monitor].marked_width;
                set_marked_width(wm, cur + delta);
            }
            Action::SetMarkedWidth(f) => set_marked_width(wm, f),
            Action::CycleFocus(dir) => cycle_focus(wm, dir),
            Action::CycleStackareaSelection(dir) => cycle_stackarea_selection(wm, dir),
            Action::PushClientLeft => push_client_left(wm),
            Action::PushClientRight => push_client_right(wm),
            Action::FocusClient(i) => focus_client(wm, i),
            Action::ToggleFloating => toggle_floating(wm),
            Action::ToggleFullscreen => {
                let sel = wm.mons[wm.selected_monitor].sel;
                if let Some(h) = sel {
                    let fullscreen = wm.clients[&h].is_fullscreen;
                    wm.set_fullscreen(h, !fullscreen);
                }
            }
            Action::ToggleMark => toggle_mark(wm),
            Action::HideWindow => hide_window(wm),
            Action::ToggleHidden(i) => toggle_hidden(wm, i),
            Action::KillClient => kill_client(wm),
            Action::ToggleTagbar => wm.toggle_tagbar(wm.selected_monitor),
            Action::SetClientbarMode(arg) => set_clientbar_mode(wm, arg),
            Action::CycleFocusMonitor(dir) => cycle_focus_monitor(wm, dir),
            Action::SendToMonitor(dir) => {
                if wm.mons.len() > 1 {
                    if let Some(sel) = wm.mons[wm.selected_monitor].sel {
                        let target = wm.direction_to_monitor(dir);
                        wm.send_client_to_monitor(sel, target);
                    }
                }
            }
            Action::DragWindow => events::drag_window(wm),
            Action::ResizeWithMouse => events::resize_with_mouse(wm),
            Action::Quit => wm.running = false,
        }
    }
}

fn occupied_tags(wm: &Deckwm, mon_idx: usize) -> u32 {
    wm.mons[mon_idx]
        .clients
        .iter()
        .filter_map(|h| wm.clients.get(h))
        .fold(0, |occ, c| occ | c.tags)
}

fn first_viewed_tag(wm: &Deckwm, mon_idx: usize) -> i32 {
    let m = &wm.mons[mon_idx];
    let curtags = m.tagset[m.selected_tags];
    (0..config::TAGS.len() as i32)
        .find(|i| curtags & (1 << i) != 0)
        .unwrap_or(0)
}

/// Steps the view one occupied tag in the given direction.
fn cycle_view(wm: &mut Deckwm, dir: i32) {
    let mon_idx = wm.selected_monitor;
    let occ = occupied_tags(wm, mon_idx);
    if occ == 0 || dir == 0 {
        return;
    }
    let ntags = config::TAGS.len() as i32;
    let mut seltag = first_viewed_tag(wm, mon_idx);
    loop {
        seltag = (seltag + dir).rem_euclid(ntags);
        if occ & (1 << seltag) != 0 {
            break;
        }
    }
    wm.view_tag(1 << seltag);
}

/// Retags the selected client one tag over.
fn shift_tag(wm: &mut Deckwm, dir: i32) {
    let mon_idx = wm.selected_monitor;
    if occupied_tags(wm, mon_idx) == 0 {
        return;
    }
    let ntags = config::TAGS.len() as i32;
    let seltag = (first_viewed_tag(wm, mon_idx) + dir).rem_euclid(ntags);
    tag_client(wm, 1 << seltag);
}

fn tag_client(wm: &mut Deckwm, ui: u32) {
    let mon_idx = wm.selected_monitor;
    let sel = match wm.mons[mon_idx].sel {
        Some(s) => s,
        None => return,
    };
    if ui & config::TAG_MASK == 0 {
        return;
    }
    if let Some(c) = wm.clients.get_mut(&sel) {
        c.tags = ui & config::TAG_MASK;
        wm.focus(None);
        wm.arrange(Some(mon_idx));
    }
}

fn toggle_tag(wm: &mut Deckwm, ui: u32) {
    let mon_idx = wm.selected_monitor;
    let sel = match wm.mons[mon_idx].sel {
        Some(s) => s,
        None => return,
    };
    let newtags = wm.clients[&sel].tags ^ (ui & config::TAG_MASK);
    if newtags != 0 {
        wm.clients.get_mut(&sel).unwrap().tags = newtags;
        wm.focus(None);
        wm.arrange(Some(mon_idx));
    }
}

fn set_layout(wm: &mut Deckwm, layout: Option<&'static Layout>) {
    let mon_idx = wm.selected_monitor;
    let same = layout.map_or(false, |l| std::ptr::eq(l, wm.mons[mon_idx].cur_layout()));
    {
        let m = &mut wm.mons[mon_idx];
        let t = m.pertag.curtag;
        if layout.is_none() || !same {
            m.pertag.selected_layouts[t] ^= 1;
            m.selected_layout = m.pertag.selected_layouts[t];
        }
        if let Some(l) = layout {
            m.pertag.layoutidxs[t][m.selected_layout] = l;
        }
        m.layout[m.selected_layout] = m.pertag.layoutidxs[t][m.selected_layout];
    }
    let symbol = wm.mons[mon_idx].cur_layout().symbol.to_string();
    wm.set_layout_symbol(mon_idx, &symbol);
    wm.arrange(Some(mon_idx));
    wm.draw_tagbar(mon_idx);
}

fn set_marked_width(wm: &mut Deckwm, f: f32) {
    let mon_idx = wm.selected_monitor;
    if wm.mons[mon_idx].is_floating_layout() || !(0.05..=0.95).contains(&f) {
        return;
    }
    {
        let m = &mut wm.mons[mon_idx];
        m.marked_width = f;
        let t = m.pertag.curtag;
        m.pertag.marked_widths[t] = f;
    }
    wm.arrange(Some(mon_idx));
}

fn visible_clients(wm: &Deckwm, mon_idx: usize, skip_minimized: bool) -> Vec<ClientHandle> {
    let m = &wm.mons[mon_idx];
    m.clients
        .iter()
        .filter(|h| {
            wm.clients.get(h).map_or(false, |c| {
                c.is_visible_on(m) && (!skip_minimized || !c.minimized)
            })
        })
        .copied()
        .collect()
}

fn cycle_focus(wm: &mut Deckwm, dir: i32) {
    let mon_idx = wm.selected_monitor;
    let sel = match wm.mons[mon_idx].sel {
        Some(s) => s,
        None => return,
    };
    let visible = visible_clients(wm, mon_idx, true);
    if visible.is_empty() {
        return;
    }
    let target = match visible.iter().position(|&h| h == sel) {
        Some(p) => visible[(p as i32 + dir).rem_euclid(visible.len() as i32) as usize],
        None => visible[0],
    };
    wm.focus(Some(target));
    wm.restack(mon_idx);
}

/// Under the deck layout, cycles through the buried stack-column
/// clients; elsewhere it behaves like cycle_focus.
fn cycle_stackarea_selection(wm: &mut Deckwm, dir: i32) {
    let mon_idx = wm.selected_monitor;
    if wm.mons[mon_idx].cur_layout().kind != LayoutKind::Deck {
        cycle_focus(wm, dir);
        return;
    }
    let order = wm.mons[mon_idx].clients.clone();
    let cur_pos = match order.iter().position(|h| {
        wm.clients
            .get(h)
            .map_or(false, |c| c.onscreen && !c.marked)
    }) {
        Some(p) => p,
        None => return,
    };
    let is_candidate = |h: &&ClientHandle| {
        let m = &wm.mons[mon_idx];
        wm.clients.get(h).map_or(false, |c| {
            c.is_visible_on(m) && !c.onscreen && !c.minimized
        })
    };
    let target = if dir > 0 {
        order[cur_pos + 1..]
            .iter()
            .find(is_candidate)
            .or_else(|| order.iter().find(is_candidate))
    } else {
        order[..cur_pos]
            .iter()
            .filter(is_candidate)
            .last()
            .or_else(|| order[cur_pos..].iter().filter(is_candidate).last())
    };
    if let Some(&h) = target {
        wm.focus(Some(h));
        wm.restack(mon_idx);
    }
}

fn tiled_positions(wm: &Deckwm, mon_idx: usize) -> Vec<usize> {
    let m = &wm.mons[mon_idx];
    (0..m.clients.len())
        .filter(|&i| {
            wm.clients.get(&m.clients[i]).map_or(false, |c| {
                !c.is_floating && c.is_visible_on(m) && !c.minimized
            })
        })
        .collect()
}

/// Shifts the selected tiled client one step toward the list head,
/// wrapping past the first tiled position to the end.
fn push_client_left(wm: &mut Deckwm) {
    let mon_idx = wm.selected_monitor;
    let sel = match wm.mons[mon_idx].sel {
        Some(s) => s,
        None => return,
    };
    if wm.clients[&sel].is_floating {
        return;
    }
    let order = wm.mons[mon_idx].clients.clone();
    let pos = match order.iter().position(|&h| h == sel) {
        Some(p) => p,
        None => return,
    };
    let tiled = tiled_positions(wm, mon_idx);
    let prev = tiled.iter().rev().find(|&&i| i < pos).copied();
    {
        let m = &mut wm.mons[mon_idx];
        m.clients.retain(|&h| h != sel);
        match prev {
            Some(prev_pos) => {
                // prev_pos is stable: it precedes the removed entry
                m.clients.insert(prev_pos, sel);
            }
            None => m.clients.push(sel),
        }
    }
    wm.focus(Some(sel));
    wm.arrange(Some(mon_idx));
}

/// Shifts the selected tiled client one step toward the list tail,
/// wrapping past the last tiled position to the head of its band.
fn push_client_right(wm: &mut Deckwm) {
    let mon_idx = wm.selected_monitor;
    let sel = match wm.mons[mon_idx].sel {
        Some(s) => s,
        None => return,
    };
    if wm.clients[&sel].is_floating {
        return;
    }
    let order = wm.mons[mon_idx].clients.clone();
    let pos = match order.iter().position(|&h| h == sel) {
        Some(p) => p,
        None => return,
    };
    let tiled = tiled_positions(wm, mon_idx);
    let next = tiled.iter().find(|&&i| i > pos).map(|&i| order[i]);
    match next {
        Some(next_handle) => {
            let m = &mut wm.mons[mon_idx];
            m.clients.retain(|&h| h != sel);
            let npos = m.clients.iter().position(|&h| h == next_handle).unwrap();
            m.clients.insert(npos + 1, sel);
        }
        None => {
            wm.detach(sel);
            wm.attach(sel);
        }
    }
    wm.focus(Some(sel));
    wm.arrange(Some(mon_idx));
}

/// Focuses the i-th tag-visible client, unhiding it if necessary.
fn focus_client(wm: &mut Deckwm, i: i32) {
    let mon_idx = wm.selected_monitor;
    let target = visible_clients(wm, mon_idx, false)
        .get(i.max(0) as usize)
        .copied();
    if let Some(h) = target {
        if wm.clients[&h].minimized {
            wm.clients.get_mut(&h).unwrap().minimized = false;
            wm.arrange(Some(mon_idx));
        }
        wm.focus(Some(h));
        wm.restack(mon_idx);
    }
}

fn toggle_floating(wm: &mut Deckwm) {
    let mon_idx = wm.selected_monitor;
    let sel = match wm.mons[mon_idx].sel {
        Some(s) => s,
        None => return,
    };
    if wm.clients[&sel].is_fullscreen {
        return; /* no floating toggle for fullscreen windows */
    }
    let (floating, rect) = {
        let c = wm.clients.get_mut(&sel).unwrap();
        c.was_floating = c.is_floating;
        c.is_floating = !c.is_floating || c.is_fixed;
        c.bw = if c.is_floating {
            config::FLOAT_BORDER_PX
        } else {
            config::BORDER_PX
        };
        (c.is_floating, (c.x, c.y, c.w, c.h))
    };
    if floating {
        wm.resize(sel, rect.0, rect.1, rect.2, rect.3, false);
    }
    wm.arrange(Some(mon_idx));
}

fn toggle_mark(wm: &mut Deckwm) {
    let mon_idx = wm.selected_monitor;
    if wm.mons[mon_idx].is_floating_layout() {
        return;
    }
    let sel = match wm.mons[mon_idx].sel {
        Some(s) => s,
        None => return,
    };
    if wm.clients[&sel].is_floating {
        return;
    }
    {
        let c = wm.clients.get_mut(&sel).unwrap();
        c.marked = !c.marked;
    }
    wm.pop(sel);
}

fn hide_window(wm: &mut Deckwm) {
    let mon_idx = wm.selected_monitor;
    let sel = match wm.mons[mon_idx].sel {
        Some(s) => s,
        None => return,
    };
    wm.clients.get_mut(&sel).unwrap().minimized = true;
    wm.mons[mon_idx].sel = None;
    wm.unfocus(sel);
    wm.focus_root();
    wm.arrange(Some(mon_idx));
}

fn toggle_hidden(wm: &mut Deckwm, i: i32) {
    let mon_idx = wm.selected_monitor;
    let target = visible_clients(wm, mon_idx, false)
        .get(i.max(0) as usize)
        .copied();
    let h = match target {
        Some(h) => h,
        None => return,
    };
    if wm.clients[&h].minimized {
        focus_client(wm, i); /* automatically unhides */
    } else {
        wm.clients.get_mut(&h).unwrap().minimized = true;
        if wm.mons[mon_idx].sel == Some(h) {
            wm.mons[mon_idx].sel = None;
            wm.unfocus(h);
            wm.focus_root();
        }
        wm.arrange(Some(mon_idx));
    }
}

/// Asks the client to close via WM_DELETE_WINDOW, killing it outright
/// when the protocol is not supported.
fn kill_client(wm: &mut Deckwm) {
    let sel = match wm.mons[wm.selected_monitor].sel {
        Some(s) => s,
        None => return,
    };
    let win = wm.clients[&sel].win;
    let delete = wm.xwrapper.atoms.get(Atom::Wm(WM::Delete));
    if !wm.xwrapper.send_event(win, delete) {
        wm.xwrapper.grab_server();
        wm.xwrapper.set_dummy_error_handler();
        wm.xwrapper.set_close_down_mode(xlib::DestroyAll);
        wm.xwrapper.kill_client(win);
        wm.xwrapper.sync(false);
        wm.xwrapper.set_default_error_handler();
        wm.xwrapper.ungrab_server();
    }
}

/// A negative argument cycles to the next mode; a valid mode index
/// selects it directly; anything else is ignored.
fn set_clientbar_mode(wm: &mut Deckwm, arg: i32) {
    let mon_idx = wm.selected_monitor;
    {
        let m = &mut wm.mons[mon_idx];
        m.show_clientbar = if arg < 0 {
            m.show_clientbar.next()
        } else {
            match ClientbarMode::from_index(arg) {
                Some(mode) => mode,
                None => return,
            }
        };
    }
    wm.arrange(Some(mon_idx));
}

fn cycle_focus_monitor(wm: &mut Deckwm, dir: i32) {
    if wm.mons.len() <= 1 {
        return;
    }
    let target = wm.direction_to_monitor(dir);
    if target == wm.selected_monitor {
        return;
    }
    if let Some(sel) = wm.mons[wm.selected_monitor].sel {
        wm.unfocus(sel);
    }
    wm.selected_monitor = target;
    wm.focus(None);
}

/// Forks off a child that closes the display connection, detaches from
/// the session and execs the command.
pub fn spawn(wm: &Deckwm, cmd: &[&str]) {
    unsafe {
        if libc::fork() == 0 {
            libc::close(wm.xwrapper.connection_number());
            libc::setsid();
            let args: Vec<CString> = cmd
                .iter()
                .map(|s| CString::new(*s).expect("command contains NUL"))
                .collect();
            let mut argv: Vec<*const c_char> = args.iter().map(|s| s.as_ptr()).collect();
            argv.push(std::ptr::null());
            libc::execvp(argv[0], argv.as_ptr());
            eprintln!("deckwm: execvp {} failed", cmd[0]);
            libc::_exit(0);
        }
    }
}
