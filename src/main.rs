use std::fs::{create_dir_all, File, OpenOptions};
use std::io::Write as _;
use std::panic;
use std::path::PathBuf;
use std::sync::LazyLock;

use simplelog::{CombinedLogger, Config, LevelFilter, WriteLogger};
use x11::xlib;

mod actions;
mod bar;
mod client;
mod colour;
mod config;
mod error;
mod events;
mod layouts;
mod monitor;
mod state;
mod xwrapper;

use actions::Action;
use client::{Client, ClientHandle};
use colour::Scheme;
use state::Deckwm;
use xwrapper::{Window, ICONIC_STATE, NORMAL_STATE, WITHDRAWN_STATE};

static DATA_PATH: LazyLock<PathBuf> = LazyLock::new(|| {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("deckwm")
});
static LOG_PATH: LazyLock<PathBuf> = LazyLock::new(|| DATA_PATH.join("deckwm.log"));

impl Deckwm {
    /// Applies the configured window rules to a freshly managed client:
    /// the first match decides floating, every match unions its tags
    /// in, and a valid monitor nomination moves the client.
    fn apply_rules(&self, c: &mut Client) {
        c.is_floating = false;
        c.tags = 0;
        let (instance, class) = self.xwrapper.get_class_hint(c.win);
        let class = class.unwrap_or_else(|| "broken".to_string());
        let instance = instance.unwrap_or_else(|| "broken".to_string());

        let mut first_match = true;
        for r in config::rules() {
            let title_ok = r.title.map_or(true, |t| c.name.contains(t));
            let class_ok = r.class.map_or(true, |cl| class.contains(cl));
            let instance_ok = r.instance.map_or(true, |inst| instance.contains(inst));
            if title_ok && class_ok && instance_ok {
                if first_match {
                    c.is_floating = r.is_floating;
                    first_match = false;
                }
                c.tags |= r.tags;
                if r.monitor >= 0 && (r.monitor as usize) < self.mons.len() {
                    c.monitor_idx = r.monitor as usize;
                }
                log::info!(
                    "rule matched '{}' (class {:?}): tags={:b} floating={} monitor={}",
                    c.name,
                    class,
                    c.tags,
                    c.is_floating,
                    c.monitor_idx
                );
            }
        }
        let masked = c.tags & config::TAG_MASK;
        c.tags = if masked != 0 {
            masked
        } else {
            let m = &self.mons[c.monitor_idx];
            m.tagset[m.selected_tags]
        };
    }

    /// Begins managing a window.
    pub fn manage(&mut self, win: Window, wa: &xlib::XWindowAttributes) {
        let handle = ClientHandle::from(win);
        let mut c = Client::new(win, self.selected_monitor);

        let name = self
            .xwrapper
            .get_text_prop(win, self.xwrapper.atoms.get(xwrapper::Atom::Net(xwrapper::Net::WMName)))
            .or_else(|| self.xwrapper.get_text_prop(win, xlib::XA_WM_NAME))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "broken".to_string());
        c.set_name(&name);

        let trans = self.xwrapper.get_transient_for_hint(win);
        let trans_handle = trans.and_then(|t| self.window_to_client_handle(t.0));
        if let Some(t) = trans_handle {
            let tc = &self.clients[&t];
            c.monitor_idx = tc.monitor_idx;
            c.tags = tc.tags;
        } else {
            self.apply_rules(&mut c);
        }

        c.x = wa.x;
        c.oldx = wa.x;
        c.y = wa.y;
        c.oldy = wa.y;
        c.w = wa.width;
        c.oldw = wa.width;
        c.h = wa.height;
        c.oldh = wa.height;
        c.oldbw = wa.border_width;

        {
            let m = &self.mons[c.monitor_idx];
            if c.x + c.width() > m.mon_x + m.mon_width {
                c.x = m.mon_x + m.mon_width - c.width();
            }
            if c.y + c.height() > m.mon_y + m.mon_height {
                c.y = m.mon_y + m.mon_height - c.height();
            }
            c.x = c.x.max(m.mon_x);
            // only fix the y-offset when the client center could cover a bar
            let covers_bar = m.tagbar_pos == m.mon_y
                && c.x + c.w / 2 >= m.winarea_x
                && c.x + c.w / 2 < m.winarea_x + m.winarea_width;
            c.y = c.y.max(if covers_bar { self.bar_height } else { m.mon_y });
        }
        c.bw = if c.is_floating || trans.is_some() {
            config::FLOAT_BORDER_PX
        } else {
            config::BORDER_PX
        };

        self.xwrapper.set_border_width(win, c.bw);
        self.xwrapper.set_window_border(win, Scheme::Normal);
        self.clients.insert(handle, c);
        self.configure(handle); /* propagates border width if the size doesn't change */
        self.update_window_type(handle);
        self.update_size_hints(handle);
        self.update_wm_hints(handle);
        self.xwrapper.select_input(
            win,
            xlib::EnterWindowMask
                | xlib::FocusChangeMask
                | xlib::PropertyChangeMask
                | xlib::StructureNotifyMask,
        );
        self.grab_buttons(handle, false);
        {
            let c = self.clients.get_mut(&handle).unwrap();
            c.was_floating = false;
            if !c.is_floating {
                c.is_floating = trans.is_some() || c.is_fixed;
                c.old_state = c.is_floating;
            }
        }
        if self.clients[&handle].is_floating {
            self.xwrapper.raise_window(win);
        }
        self.attach(handle);
        self.stack_attach(handle);
        self.xwrapper.append_window_prop(
            self.root,
            self.xwrapper.atoms.get(xwrapper::Atom::Net(xwrapper::Net::ClientList)),
            win,
        );
        {
            // some windows require an off-screen move before mapping
            let c = &self.clients[&handle];
            self.xwrapper
                .move_resize_window(win, c.x + 2 * self.screen_width, c.y, c.w, c.h);
        }
        self.xwrapper.set_client_state(win, NORMAL_STATE);

        let mon_idx = self.clients[&handle].monitor_idx;
        if mon_idx == self.selected_monitor {
            if let Some(prev) = self.mons[self.selected_monitor].sel {
                if prev != handle {
                    self.unfocus(prev);
                }
            }
        }
        self.mons[mon_idx].sel = Some(handle);
        self.arrange(Some(mon_idx));
        self.xwrapper.map_window(win);

        let (tags, visible) = {
            let c = &self.clients[&handle];
            let m = &self.mons[mon_idx];
            (c.tags, c.tags & m.tagset[m.selected_tags] != 0)
        };
        if config::FOLLOW_NEW_WINDOWS && !visible {
            self.view_tag(tags);
        }
        self.restack(self.selected_monitor);
        self.focus(Some(handle));
        log::info!("managing window {:#x} '{}'", win.0, name);
    }

    /// Stops managing a client; `destroyed` skips the property and
    /// border restoration a live window would need.
    pub fn unmanage(&mut self, handle: ClientHandle, destroyed: bool) {
        let (mon_idx, win, oldbw) = match self.clients.get(&handle) {
            Some(c) => (c.monitor_idx, c.win, c.oldbw),
            None => return,
        };
        self.detach(handle);
        self.stack_detach(handle);
        if !destroyed {
            // server grab makes the restore atomic against the client
            self.xwrapper.grab_server();
            self.xwrapper.set_dummy_error_handler();
            self.xwrapper.set_border_width(win, oldbw);
            self.xwrapper.ungrab_all_buttons(win);
            self.xwrapper.set_client_state(win, WITHDRAWN_STATE);
            self.xwrapper.sync(false);
            self.xwrapper.set_default_error_handler();
            self.xwrapper.ungrab_server();
        }
        self.clients.remove(&handle);
        self.focus(None);
        self.update_client_list();
        self.arrange(Some(mon_idx));
    }

    /// Adopts pre-existing windows: viewable or iconic ones first,
    /// their transients second.
    pub fn scan(&mut self) {
        let wins = match self.xwrapper.query_tree(self.root) {
            Some(w) => w,
            None => return,
        };
        for &win in &wins {
            let wa = match self.xwrapper.get_window_attributes(win) {
                Some(wa) => wa,
                None => continue,
            };
            if wa.override_redirect != 0 || self.xwrapper.get_transient_for_hint(win).is_some() {
                continue;
            }
            if wa.map_state == xlib::IsViewable
                || self.xwrapper.get_wm_state(win) == Some(ICONIC_STATE)
            {
                self.manage(win, &wa);
            }
        }
        for &win in &wins {
            // now the transients
            let wa = match self.xwrapper.get_window_attributes(win) {
                Some(wa) => wa,
                None => continue,
            };
            if self.xwrapper.get_transient_for_hint(win).is_some()
                && (wa.map_state == xlib::IsViewable
                    || self.xwrapper.get_wm_state(win) == Some(ICONIC_STATE))
            {
                self.manage(win, &wa);
            }
        }
    }

    pub fn run(&mut self) {
        self.xwrapper.sync(false);
        while self.running {
            match self.xwrapper.next_event() {
                Some(mut ev) => events::handle_event(self, &mut ev),
                None => break,
            }
        }
    }

    pub fn cleanup(&mut self) {
        Action::ViewTag(!0).execute(self);
        for i in 0..self.mons.len() {
            while let Some(&h) = self.mons[i].stack.first() {
                self.unmanage(h, false);
            }
        }
        self.xwrapper.ungrab_all_keys(self.root);
        while !self.mons.is_empty() {
            let last = self.mons.len() - 1;
            self.monitor_cleanup(last);
        }
        for cursor in self.cursor {
            self.xwrapper.free_cursor(cursor);
        }
        self.xwrapper.sync(false);
        self.focus_root();
    }
}

extern "C" fn sigchld(_: libc::c_int) {
    unsafe {
        let handler = sigchld as extern "C" fn(libc::c_int);
        libc::signal(libc::SIGCHLD, handler as libc::sighandler_t);
        while libc::waitpid(-1, std::ptr::null_mut(), libc::WNOHANG) > 0 {}
    }
}

/// Reaps spawned children without blocking the event loop.
fn setup_sigchld() {
    unsafe {
        let handler = sigchld as extern "C" fn(libc::c_int);
        if libc::signal(libc::SIGCHLD, handler as libc::sighandler_t) == libc::SIG_ERR {
            panic!("can't install SIGCHLD handler");
        }
    }
}

/// Writes panic information to stderr and to the log file, so crashes
/// of a display-less session are still diagnosable.
fn setup_panic_hook() {
    let log_path = LOG_PATH.clone();
    panic::set_hook(Box::new(move |panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            format!("panic occurred: {}", s)
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            format!("panic occurred: {}", s)
        } else {
            "panic occurred: unknown payload".to_string()
        };
        let location = panic_info
            .location()
            .map(|l| format!(" at {}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| " at unknown location".to_string());
        let full = format!("PANIC: {}{}", msg, location);
        eprintln!("{}", full);
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&log_path) {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let _ = writeln!(file, "[{}] [ERROR] {}", timestamp, full);
            let _ = file.flush();
        }
    }));
}

fn setup_logger() {
    if let Err(e) = create_dir_all(&*DATA_PATH) {
        eprintln!("deckwm: failed to create log directory: {}", e);
    }
    CombinedLogger::init(vec![WriteLogger::new(
        LevelFilter::Info,
        Config::default(),
        File::create(&*LOG_PATH)
            .unwrap_or_else(|e| panic!("failed to create log file at {:?}: {}", &*LOG_PATH, e)),
    )])
    .expect("failed to initialize logger");
}

fn main() {
    setup_logger();
    setup_panic_hook();
    setup_sigchld();
    log::info!("starting deckwm-{}", env!("CARGO_PKG_VERSION"));

    match Deckwm::new() {
        Ok(mut wm) => {
            wm.scan();
            wm.run();
            wm.cleanup();
            log::info!("clean shutdown");
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("deckwm: {}", e);
            std::process::exit(1);
        }
    }
}
