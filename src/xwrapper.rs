use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_long, c_uchar, c_uint, c_ulong};
use std::ptr::null_mut;

use x11::xft::XftDraw;
use x11::{xft, xinerama, xlib};

use crate::colour::{Scheme, SchemePart, ALL_SCHEMES, PART_COUNT, SCHEME_COUNT};
use crate::error::DeckwmError;

fn die(s: &str) {
    eprintln!("deckwm: {}", s);
    std::process::exit(1);
}

// From <X11/Xproto.h>
pub const X_SET_INPUT_FOCUS: u8 = 42;
pub const X_POLY_TEXT8: u8 = 74;
pub const X_POLY_FILL_RECTANGLE: u8 = 69;
pub const X_POLY_SEGMENT: u8 = 66;
pub const X_CONFIGURE_WINDOW: u8 = 12;
pub const X_GRAB_BUTTON: u8 = 28;
pub const X_GRAB_KEY: u8 = 33;
pub const X_COPY_AREA: u8 = 62;

// ICCCM WM_STATE values
pub const WITHDRAWN_STATE: i64 = 0;
pub const NORMAL_STATE: i64 = 1;
pub const ICONIC_STATE: i64 = 3;

static mut X_ERROR_OCCURRED: bool = false;

/// Swallows everything; installed around operations that race against
/// external window destruction (kill, unmanage).
unsafe extern "C" fn x_error_dummy(
    _dpy: *mut xlib::Display,
    _ee: *mut xlib::XErrorEvent,
) -> c_int {
    0
}

unsafe extern "C" fn x_error_start(
    _dpy: *mut xlib::Display,
    _ee: *mut xlib::XErrorEvent,
) -> c_int {
    unsafe {
        X_ERROR_OCCURRED = true;
    }
    0
}

/// There's no way to check accesses to destroyed windows, thus those
/// cases are ignored (especially on UnmapNotify's). Everything else is
/// fatal.
unsafe extern "C" fn x_error(_dpy: *mut xlib::Display, ee: *mut xlib::XErrorEvent) -> c_int {
    let ee = unsafe { &*ee };
    if ee.error_code == xlib::BadWindow
        || (ee.request_code == X_SET_INPUT_FOCUS && ee.error_code == xlib::BadMatch)
        || (ee.request_code == X_POLY_TEXT8 && ee.error_code == xlib::BadDrawable)
        || (ee.request_code == X_POLY_FILL_RECTANGLE && ee.error_code == xlib::BadDrawable)
        || (ee.request_code == X_POLY_SEGMENT && ee.error_code == xlib::BadDrawable)
        || (ee.request_code == X_CONFIGURE_WINDOW && ee.error_code == xlib::BadMatch)
        || (ee.request_code == X_GRAB_BUTTON && ee.error_code == xlib::BadAccess)
        || (ee.request_code == X_GRAB_KEY && ee.error_code == xlib::BadAccess)
        || (ee.request_code == X_COPY_AREA && ee.error_code == xlib::BadDrawable)
    {
        return 0;
    }
    log::error!(
        "fatal X error: request code={}, error code={}",
        ee.request_code,
        ee.error_code
    );
    die(&format!(
        "fatal X error: request code={}, error code={}",
        ee.request_code, ee.error_code
    ));
    0
}

#[derive(PartialEq, Copy, Clone)]
pub enum Net {
    Supported,
    WMName,
    WMState,
    WMFullscreen,
    ActiveWindow,
    WMWindowType,
    WMWindowTypeDialog,
    ClientList,
    Last,
}

#[derive(PartialEq, Copy, Clone)]
pub enum WM {
    Protocols,
    Delete,
    State,
    TakeFocus,
    Last,
}

pub enum Atom {
    Net(Net),
    Wm(WM),
}

pub struct Atoms {
    wmatom: [xlib::Atom; WM::Last as usize],
    netatom: [xlib::Atom; Net::Last as usize],
}

impl Atoms {
    pub fn new(dpy: *mut xlib::Display) -> Self {
        let mut atoms = Self {
            wmatom: [0; WM::Last as usize],
            netatom: [0; Net::Last as usize],
        };
        let intern = |name: &str| -> xlib::Atom {
            let c_str = CString::new(name).expect("atom name contains NUL");
            unsafe { xlib::XInternAtom(dpy, c_str.as_ptr(), 0) }
        };
        atoms.wmatom[WM::Protocols as usize] = intern("WM_PROTOCOLS");
        atoms.wmatom[WM::Delete as usize] = intern("WM_DELETE_WINDOW");
        atoms.wmatom[WM::State as usize] = intern("WM_STATE");
        atoms.wmatom[WM::TakeFocus as usize] = intern("WM_TAKE_FOCUS");
        atoms.netatom[Net::ActiveWindow as usize] = intern("_NET_ACTIVE_WINDOW");
        atoms.netatom[Net::Supported as usize] = intern("_NET_SUPPORTED");
        atoms.netatom[Net::WMName as usize] = intern("_NET_WM_NAME");
        atoms.netatom[Net::WMState as usize] = intern("_NET_WM_STATE");
        atoms.netatom[Net::WMFullscreen as usize] = intern("_NET_WM_STATE_FULLSCREEN");
        atoms.netatom[Net::WMWindowType as usize] = intern("_NET_WM_WINDOW_TYPE");
        atoms.netatom[Net::WMWindowTypeDialog as usize] = intern("_NET_WM_WINDOW_TYPE_DIALOG");
        atoms.netatom[Net::ClientList as usize] = intern("_NET_CLIENT_LIST");
        atoms
    }

    pub fn get(&self, atom: Atom) -> xlib::Atom {
        match atom {
            Atom::Net(net) => self.netatom[net as usize],
            Atom::Wm(wm) => self.wmatom[wm as usize],
        }
    }

    pub fn net_atom_ptr(&self) -> *const xlib::Atom {
        self.netatom.as_ptr()
    }
}

pub struct Font {
    dpy: *mut xlib::Display,
    pub h: c_uint,
    pub xfont: *mut xft::XftFont,
}

impl Drop for Font {
    fn drop(&mut self) {
        unsafe {
            if !self.xfont.is_null() {
                xft::XftFontClose(self.dpy, self.xfont);
            }
        }
    }
}

// Newtype wrappers keep raw XIDs from mixing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window(pub xlib::Window);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorId(pub c_ulong);

pub struct KeySpecification {
    pub mask: u32,
    pub keysym: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct WmHints {
    pub urgent: bool,
    pub input: Option<bool>,
}

pub struct XWrapper {
    dpy: *mut xlib::Display,
    pub screen: c_int,
    root: xlib::Window,
    drawable: xlib::Drawable,
    gc: xlib::GC,
    xftdraw: *mut XftDraw,
    pub fonts: Vec<Font>,
    colors: [[xft::XftColor; PART_COUNT]; SCHEME_COUNT],
    pub atoms: Atoms,
}

impl XWrapper {
    pub fn connect() -> Result<Self, DeckwmError> {
        unsafe {
            let dpy = xlib::XOpenDisplay(null_mut());
            if dpy.is_null() {
                return Err(DeckwmError::DisplayOpen);
            }
            let screen = xlib::XDefaultScreen(dpy);
            let root = xlib::XRootWindow(dpy, screen);
            let w = xlib::XDisplayWidth(dpy, screen) as u32;
            let h = xlib::XDisplayHeight(dpy, screen) as u32;

            let drawable =
                xlib::XCreatePixmap(dpy, root, w, h, xlib::XDefaultDepth(dpy, screen) as u32);
            let gc = xlib::XCreateGC(dpy, root, 0, null_mut());
            xlib::XSetLineAttributes(dpy, gc, 1, xlib::LineSolid, xlib::CapButt, xlib::JoinMiter);

            let xftdraw = xft::XftDrawCreate(
                dpy,
                drawable,
                xlib::XDefaultVisual(dpy, screen),
                xlib::XDefaultColormap(dpy, screen),
            );
            if xftdraw.is_null() {
                return Err(DeckwmError::ColorAlloc);
            }

            let atoms = Atoms::new(dpy);
            let mut wrapper = Self {
                dpy,
                screen,
                root,
                drawable,
                gc,
                xftdraw,
                fonts: Vec::new(),
                colors: [[std::mem::zeroed(); PART_COUNT]; SCHEME_COUNT],
                atoms,
            };
            wrapper.init_schemes()?;
            Ok(wrapper)
        }
    }

    fn init_schemes(&mut self) -> Result<(), DeckwmError> {
        for (si, scheme) in ALL_SCHEMES.iter().enumerate() {
            for (pi, rgba) in scheme.rgba().iter().enumerate() {
                let mut clr = unsafe { std::mem::zeroed() };
                let ok = unsafe {
                    xft::XftColorAllocValue(
                        self.dpy,
                        xlib::XDefaultVisual(self.dpy, self.screen),
                        xlib::XDefaultColormap(self.dpy, self.screen),
                        &x11::xrender::XRenderColor {
                            red: rgba[0] as u16 * 0x101,
                            green: rgba[1] as u16 * 0x101,
                            blue: rgba[2] as u16 * 0x101,
                            alpha: rgba[3] as u16 * 0x101,
                        },
                        &mut clr,
                    )
                };
                if ok == 0 {
                    return Err(DeckwmError::ColorAlloc);
                }
                self.colors[si][pi] = clr;
            }
        }
        Ok(())
    }

    pub fn scheme_pixel(&self, scheme: Scheme, part: SchemePart) -> c_ulong {
        self.colors[scheme as usize][part as usize].pixel
    }

    /* fonts */

    pub fn fontset_create(&mut self, font_names: &[&str]) -> bool {
        let mut success = true;
        for font_name in font_names {
            if !self.xfont_create(font_name) {
                success = false;
            }
        }
        success && !self.fonts.is_empty()
    }

    fn xfont_create(&mut self, font_name: &str) -> bool {
        unsafe {
            let _fc = fontconfig::Fontconfig::new();
            let cstr = match CString::new(font_name) {
                Ok(s) => s,
                Err(_) => {
                    log::error!("invalid font name '{}': contains NUL", font_name);
                    return false;
                }
            };
            let xfont = xft::XftFontOpenName(self.dpy, self.screen, cstr.as_ptr());
            if xfont.is_null() {
                log::error!("cannot load font from name: '{}'", font_name);
                return false;
            }
            let h = ((*xfont).ascent + (*xfont).descent) as c_uint;
            self.fonts.push(Font {
                dpy: self.dpy,
                h,
                xfont,
            });
            true
        }
    }

    pub fn font_height(&self) -> u32 {
        self.fonts.first().map_or(0, |f| f.h)
    }

    pub fn text_width(&self, text: &str) -> u32 {
        if self.fonts.is_empty() || text.is_empty() {
            return 0;
        }
        unsafe {
            let mut ext = std::mem::zeroed();
            xft::XftTextExtentsUtf8(
                self.dpy,
                self.fonts[0].xfont,
                text.as_ptr(),
                text.len() as i32,
                &mut ext,
            );
            ext.xOff as u32
        }
    }

    /* drawing into the shared drawable */

    /// Rectangle in the scheme's foreground color. Outlined rectangles
    /// are inset by one pixel on the far edges like XDrawRectangle
    /// expects.
    pub fn rect(&mut self, scheme: Scheme, x: i32, y: i32, w: i32, h: i32, filled: bool) {
        if w <= 0 || h <= 0 {
            return;
        }
        unsafe {
            xlib::XSetForeground(self.dpy, self.gc, self.scheme_pixel(scheme, SchemePart::Fg));
            if filled {
                xlib::XFillRectangle(self.dpy, self.drawable, self.gc, x, y, w as u32, h as u32);
            } else {
                xlib::XDrawRectangle(
                    self.dpy,
                    self.drawable,
                    self.gc,
                    x,
                    y,
                    (w - 1).max(0) as u32,
                    (h - 1).max(0) as u32,
                );
            }
        }
    }

    /// Fills the cell with the scheme's background and draws the text
    /// vertically centered, shortened with trailing dots when it does
    /// not fit. `None` clears the cell only.
    pub fn text(&mut self, scheme: Scheme, x: i32, y: i32, w: i32, h: i32, text: Option<&str>) {
        if w <= 0 || h <= 0 {
            return;
        }
        unsafe {
            xlib::XSetForeground(self.dpy, self.gc, self.scheme_pixel(scheme, SchemePart::Bg));
            xlib::XFillRectangle(self.dpy, self.drawable, self.gc, x, y, w as u32, h as u32);
        }
        let text = match text {
            Some(t) if !t.is_empty() && !self.fonts.is_empty() => t,
            _ => return,
        };
        let font_h = self.font_height() as i32;
        let buf = match self.fit_text(text, w - font_h) {
            Some(b) => b,
            None => return,
        };
        unsafe {
            let clr = &mut self.colors[scheme as usize][SchemePart::Fg as usize];
            let xfont = self.fonts[0].xfont;
            let ty = y + (h - font_h) / 2 + (*xfont).ascent;
            let tx = x + h / 2;
            xft::XftDrawStringUtf8(
                self.xftdraw,
                clr,
                xfont,
                tx,
                ty,
                buf.as_ptr(),
                buf.len() as i32,
            );
        }
    }

    fn fit_text(&self, text: &str, max_w: i32) -> Option<String> {
        if max_w <= 0 {
            return None;
        }
        let mut end = text.len();
        while end > 0 && self.text_width(&text[..end]) as i32 > max_w {
            end = text[..end]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
        if end == 0 {
            return None;
        }
        let mut buf = text[..end].to_string();
        if end < text.len() {
            let dots = buf.chars().count().min(3);
            for _ in 0..dots {
                buf.pop();
            }
            for _ in 0..dots {
                buf.push('.');
            }
        }
        Some(buf)
    }

    pub fn map_drawable(&mut self, win: Window, x: i32, y: i32, w: u32, h: u32) {
        unsafe {
            xlib::XCopyArea(self.dpy, self.drawable, win.0, self.gc, x, y, w, h, x, y);
            xlib::XSync(self.dpy, 0);
        }
    }

    pub fn resize_drawable(&mut self, w: u32, h: u32) {
        unsafe {
            if !self.xftdraw.is_null() {
                xft::XftDrawDestroy(self.xftdraw);
            }
            xlib::XFreePixmap(self.dpy, self.drawable);
            self.drawable = xlib::XCreatePixmap(
                self.dpy,
                self.root,
                w,
                h,
                xlib::XDefaultDepth(self.dpy, self.screen) as u32,
            );
            self.xftdraw = xft::XftDrawCreate(
                self.dpy,
                self.drawable,
                xlib::XDefaultVisual(self.dpy, self.screen),
                xlib::XDefaultColormap(self.dpy, self.screen),
            );
        }
    }

    /* error handlers */

    fn set_error_handler(
        &self,
        handler: Option<unsafe extern "C" fn(*mut xlib::Display, *mut xlib::XErrorEvent) -> c_int>,
    ) {
        unsafe {
            xlib::XSetErrorHandler(handler);
        }
    }

    pub fn check_for_other_wm(&mut self) -> Result<(), DeckwmError> {
        unsafe {
            X_ERROR_OCCURRED = false;
            self.set_error_handler(Some(x_error_start));
            // only one client may select SubstructureRedirect on the root
            xlib::XSelectInput(self.dpy, self.root, xlib::SubstructureRedirectMask);
            self.sync(false);
            if X_ERROR_OCCURRED {
                return Err(DeckwmError::OtherWmRunning);
            }
        }
        Ok(())
    }

    pub fn set_default_error_handler(&self) {
        self.set_error_handler(Some(x_error));
    }

    pub fn set_dummy_error_handler(&self) {
        self.set_error_handler(Some(x_error_dummy));
    }

    /* screen queries */

    pub fn default_screen(&self) -> i32 {
        unsafe { xlib::XDefaultScreen(self.dpy) }
    }

    pub fn root_window(&self, screen: i32) -> Window {
        unsafe { Window(xlib::XRootWindow(self.dpy, screen)) }
    }

    pub fn display_width(&self, screen: i32) -> i32 {
        unsafe { xlib::XDisplayWidth(self.dpy, screen) }
    }

    pub fn display_height(&self, screen: i32) -> i32 {
        unsafe { xlib::XDisplayHeight(self.dpy, screen) }
    }

    pub fn default_depth(&self, screen: i32) -> c_int {
        unsafe { xlib::XDefaultDepth(self.dpy, screen) }
    }

    pub fn default_visual(&self, screen: i32) -> *mut xlib::Visual {
        unsafe { xlib::XDefaultVisual(self.dpy, screen) }
    }

    pub fn connection_number(&self) -> c_int {
        unsafe { xlib::XConnectionNumber(self.dpy) }
    }

    /// Unique Xinerama screen rectangles, or None without the
    /// extension.
    pub fn xinerama_screens(&self) -> Option<Vec<(i32, i32, i32, i32)>> {
        unsafe {
            if xinerama::XineramaIsActive(self.dpy) == 0 {
                return None;
            }
            let mut n: c_int = 0;
            let info = xinerama::XineramaQueryScreens(self.dpy, &mut n);
            if info.is_null() {
                return None;
            }
            let mut unique: Vec<(i32, i32, i32, i32)> = Vec::with_capacity(n as usize);
            for i in 0..n as usize {
                let s = &*info.add(i);
                let rect = (
                    s.x_org as i32,
                    s.y_org as i32,
                    s.width as i32,
                    s.height as i32,
                );
                if !unique.contains(&rect) {
                    unique.push(rect);
                }
            }
            xlib::XFree(info as *mut _);
            Some(unique)
        }
    }

    /* window management */

    pub fn create_window(
        &self,
        parent: Window,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        valuemask: u64,
        attributes: &mut xlib::XSetWindowAttributes,
    ) -> Window {
        unsafe {
            Window(xlib::XCreateWindow(
                self.dpy,
                parent.0,
                x,
                y,
                width,
                height,
                0,
                self.default_depth(self.screen),
                xlib::CopyFromParent as u32,
                self.default_visual(self.screen),
                valuemask,
                attributes,
            ))
        }
    }

    pub fn destroy_window(&self, win: Window) {
        unsafe {
            xlib::XDestroyWindow(self.dpy, win.0);
        }
    }

    pub fn map_window(&self, win: Window) {
        unsafe { xlib::XMapWindow(self.dpy, win.0) };
    }

    pub fn map_raised(&self, win: Window) {
        unsafe { xlib::XMapRaised(self.dpy, win.0) };
    }

    pub fn unmap_window(&self, win: Window) {
        unsafe { xlib::XUnmapWindow(self.dpy, win.0) };
    }

    pub fn raise_window(&self, win: Window) {
        unsafe { xlib::XRaiseWindow(self.dpy, win.0) };
    }

    pub fn move_window(&self, win: Window, x: i32, y: i32) {
        unsafe {
            xlib::XMoveWindow(self.dpy, win.0, x, y);
        }
    }

    pub fn move_resize_window(&self, win: Window, x: i32, y: i32, w: i32, h: i32) {
        unsafe {
            xlib::XMoveResizeWindow(self.dpy, win.0, x, y, w.max(1) as u32, h.max(1) as u32);
        }
    }

    pub fn configure_window(&self, win: Window, x: i32, y: i32, w: i32, h: i32, bw: i32) {
        unsafe {
            let mut wc: xlib::XWindowChanges = std::mem::zeroed();
            wc.x = x;
            wc.y = y;
            wc.width = w;
            wc.height = h;
            wc.border_width = bw;
            let mask = xlib::CWX | xlib::CWY | xlib::CWWidth | xlib::CWHeight | xlib::CWBorderWidth;
            xlib::XConfigureWindow(self.dpy, win.0, mask as u32, &mut wc);
        }
    }

    pub fn set_border_width(&self, win: Window, bw: i32) {
        unsafe {
            let mut wc: xlib::XWindowChanges = std::mem::zeroed();
            wc.border_width = bw;
            xlib::XConfigureWindow(self.dpy, win.0, xlib::CWBorderWidth as u32, &mut wc);
        }
    }

    /// Pass-through configure for windows we don't manage.
    pub fn configure_window_passthrough(&self, ev: &xlib::XConfigureRequestEvent) {
        unsafe {
            let mut wc: xlib::XWindowChanges = std::mem::zeroed();
            wc.x = ev.x;
            wc.y = ev.y;
            wc.width = ev.width;
            wc.height = ev.height;
            wc.border_width = ev.border_width;
            wc.sibling = ev.above;
            wc.stack_mode = ev.detail;
            xlib::XConfigureWindow(self.dpy, ev.window, ev.value_mask as u32, &mut wc);
        }
    }

    /// Restack `windows` back-to-front: each entry is configured below
    /// its predecessor.
    pub fn stack_below_chain(&self, windows: &[Window]) {
        unsafe {
            let mut wc: xlib::XWindowChanges = std::mem::zeroed();
            wc.stack_mode = xlib::Below;
            let changes = (xlib::CWSibling | xlib::CWStackMode) as u32;
            for pair in windows.windows(2) {
                wc.sibling = pair[0].0;
                xlib::XConfigureWindow(self.dpy, pair[1].0, changes, &mut wc);
            }
        }
    }

    pub fn set_window_border(&self, win: Window, scheme: Scheme) {
        unsafe {
            xlib::XSetWindowBorder(self.dpy, win.0, self.scheme_pixel(scheme, SchemePart::Border));
        }
    }

    pub fn define_cursor(&self, win: Window, cursor: CursorId) {
        unsafe {
            xlib::XDefineCursor(self.dpy, win.0, cursor.0);
        }
    }

    pub fn change_window_attributes(
        &self,
        win: Window,
        valuemask: u64,
        attributes: &mut xlib::XSetWindowAttributes,
    ) {
        unsafe {
            xlib::XChangeWindowAttributes(self.dpy, win.0, valuemask, attributes);
        }
    }

    pub fn get_window_attributes(&self, win: Window) -> Option<xlib::XWindowAttributes> {
        unsafe {
            let mut wa: xlib::XWindowAttributes = std::mem::zeroed();
            if xlib::XGetWindowAttributes(self.dpy, win.0, &mut wa) != 0 {
                Some(wa)
            } else {
                None
            }
        }
    }

    pub fn query_tree(&self, win: Window) -> Option<Vec<Window>> {
        unsafe {
            let mut root_return: xlib::Window = 0;
            let mut parent_return: xlib::Window = 0;
            let mut children: *mut xlib::Window = null_mut();
            let mut nchildren: u32 = 0;
            if xlib::XQueryTree(
                self.dpy,
                win.0,
                &mut root_return,
                &mut parent_return,
                &mut children,
                &mut nchildren,
            ) == 0
            {
                return None;
            }
            let wins = if nchildren > 0 {
                std::slice::from_raw_parts(children, nchildren as usize)
                    .iter()
                    .map(|&w| Window(w))
                    .collect()
            } else {
                Vec::new()
            };
            if !children.is_null() {
                xlib::XFree(children as *mut _);
            }
            Some(wins)
        }
    }

    /* properties */

    pub fn change_property(
        &self,
        win: Window,
        property: xlib::Atom,
        type_: xlib::Atom,
        format: i32,
        mode: i32,
        data: *const c_uchar,
        nelements: i32,
    ) {
        unsafe {
            xlib::XChangeProperty(self.dpy, win.0, property, type_, format, mode, data, nelements);
        }
    }

    pub fn delete_property(&self, win: Window, property: xlib::Atom) {
        unsafe {
            xlib::XDeleteProperty(self.dpy, win.0, property);
        }
    }

    pub fn set_window_prop(&self, win: Window, property: xlib::Atom, value: Window) {
        let data = value.0;
        self.change_property(
            win,
            property,
            xlib::XA_WINDOW,
            32,
            xlib::PropModeReplace,
            &data as *const c_ulong as *const c_uchar,
            1,
        );
    }

    pub fn append_window_prop(&self, win: Window, property: xlib::Atom, value: Window) {
        let data = value.0;
        self.change_property(
            win,
            property,
            xlib::XA_WINDOW,
            32,
            xlib::PropModeAppend,
            &data as *const c_ulong as *const c_uchar,
            1,
        );
    }

    pub fn set_supported_atoms(&self, root: Window) {
        self.change_property(
            root,
            self.atoms.get(Atom::Net(Net::Supported)),
            xlib::XA_ATOM,
            32,
            xlib::PropModeReplace,
            self.atoms.net_atom_ptr() as *const c_uchar,
            Net::Last as i32,
        );
    }

    /// ICCCM WM_STATE (NormalState / IconicState / WithdrawnState).
    pub fn set_client_state(&self, win: Window, state: i64) {
        let wm_state = self.atoms.get(Atom::Wm(WM::State));
        let data: [c_long; 2] = [state as c_long, 0];
        self.change_property(
            win,
            wm_state,
            wm_state,
            32,
            xlib::PropModeReplace,
            data.as_ptr() as *const c_uchar,
            2,
        );
    }

    pub fn get_wm_state(&self, win: Window) -> Option<i64> {
        let wm_state = self.atoms.get(Atom::Wm(WM::State));
        unsafe {
            let mut real: xlib::Atom = 0;
            let mut format: c_int = 0;
            let mut n: c_ulong = 0;
            let mut extra: c_ulong = 0;
            let mut p: *mut c_uchar = null_mut();
            if xlib::XGetWindowProperty(
                self.dpy,
                win.0,
                wm_state,
                0,
                2,
                0,
                wm_state,
                &mut real,
                &mut format,
                &mut n,
                &mut extra,
                &mut p,
            ) != xlib::Success as i32
            {
                return None;
            }
            let result = if n != 0 && !p.is_null() {
                Some(*(p as *const c_long) as i64)
            } else {
                None
            };
            if !p.is_null() {
                xlib::XFree(p as *mut _);
            }
            result
        }
    }

    pub fn get_atom_prop(&self, win: Window, prop: xlib::Atom) -> Option<xlib::Atom> {
        unsafe {
            let mut da: xlib::Atom = 0;
            let mut di: c_int = 0;
            let mut dl: c_ulong = 0;
            let mut dl2: c_ulong = 0;
            let mut p: *mut c_uchar = null_mut();
            if xlib::XGetWindowProperty(
                self.dpy,
                win.0,
                prop,
                0,
                std::mem::size_of::<xlib::Atom>() as c_long,
                0,
                xlib::XA_ATOM,
                &mut da,
                &mut di,
                &mut dl,
                &mut dl2,
                &mut p,
            ) != xlib::Success as i32
                || p.is_null()
            {
                return None;
            }
            let atom = *(p as *const xlib::Atom);
            xlib::XFree(p as *mut _);
            if atom == 0 {
                None
            } else {
                Some(atom)
            }
        }
    }

    /// All atoms listed in a property (e.g. _NET_WM_STATE).
    pub fn get_atom_props(&self, win: Window, prop: xlib::Atom) -> Vec<xlib::Atom> {
        unsafe {
            let mut da: xlib::Atom = 0;
            let mut di: c_int = 0;
            let mut nitems: c_ulong = 0;
            let mut dl: c_ulong = 0;
            let mut p: *mut c_uchar = null_mut();
            if xlib::XGetWindowProperty(
                self.dpy,
                win.0,
                prop,
                0,
                c_long::MAX,
                0,
                xlib::XA_ATOM,
                &mut da,
                &mut di,
                &mut nitems,
                &mut dl,
                &mut p,
            ) != xlib::Success as i32
                || p.is_null()
            {
                return Vec::new();
            }
            let atoms =
                std::slice::from_raw_parts(p as *const xlib::Atom, nitems as usize).to_vec();
            xlib::XFree(p as *mut _);
            atoms
        }
    }

    pub fn get_text_prop(&self, win: Window, atom: xlib::Atom) -> Option<String> {
        unsafe {
            let mut text_prop: xlib::XTextProperty = std::mem::zeroed();
            if xlib::XGetTextProperty(self.dpy, win.0, &mut text_prop, atom) == 0
                || text_prop.nitems == 0
                || text_prop.value.is_null()
            {
                return None;
            }
            let result = if text_prop.encoding == xlib::XA_STRING {
                Some(
                    CStr::from_ptr(text_prop.value as *const c_char)
                        .to_string_lossy()
                        .into_owned(),
                )
            } else {
                let mut list: *mut *mut c_char = null_mut();
                let mut count: c_int = 0;
                if xlib::Xutf8TextPropertyToTextList(
                    self.dpy,
                    &mut text_prop,
                    &mut list,
                    &mut count,
                ) == xlib::Success as i32
                    && count > 0
                    && !list.is_null()
                    && !(*list).is_null()
                {
                    let s = CStr::from_ptr(*list).to_string_lossy().into_owned();
                    xlib::XFreeStringList(list);
                    Some(s)
                } else {
                    None
                }
            };
            xlib::XFree(text_prop.value as *mut _);
            result
        }
    }

    /* hints */

    pub fn get_transient_for_hint(&self, win: Window) -> Option<Window> {
        unsafe {
            let mut trans: xlib::Window = 0;
            if xlib::XGetTransientForHint(self.dpy, win.0, &mut trans) != 0 && trans != 0 {
                Some(Window(trans))
            } else {
                None
            }
        }
    }

    pub fn get_wm_normal_hints(&self, win: Window) -> Option<xlib::XSizeHints> {
        unsafe {
            let mut hints: xlib::XSizeHints = std::mem::zeroed();
            let mut supplied: c_long = 0;
            if xlib::XGetWMNormalHints(self.dpy, win.0, &mut hints, &mut supplied) == 0 {
                None
            } else {
                Some(hints)
            }
        }
    }

    pub fn get_wm_hints(&self, win: Window) -> Option<WmHints> {
        unsafe {
            let wmh = xlib::XGetWMHints(self.dpy, win.0);
            if wmh.is_null() {
                return None;
            }
            let hints = WmHints {
                urgent: (*wmh).flags & xlib::XUrgencyHint != 0,
                input: if (*wmh).flags & xlib::InputHint != 0 {
                    Some((*wmh).input != 0)
                } else {
                    None
                },
            };
            xlib::XFree(wmh as *mut _);
            Some(hints)
        }
    }

    /// Clears the urgency bit on the window's WM hints.
    pub fn clear_urgency_hint(&self, win: Window) {
        unsafe {
            let wmh = xlib::XGetWMHints(self.dpy, win.0);
            if wmh.is_null() {
                return;
            }
            (*wmh).flags &= !xlib::XUrgencyHint;
            xlib::XSetWMHints(self.dpy, win.0, wmh);
            xlib::XFree(wmh as *mut _);
        }
    }

    pub fn get_class_hint(&self, win: Window) -> (Option<String>, Option<String>) {
        unsafe {
            let mut ch: xlib::XClassHint = std::mem::zeroed();
            if xlib::XGetClassHint(self.dpy, win.0, &mut ch) == 0 {
                return (None, None);
            }
            let instance = if ch.res_name.is_null() {
                None
            } else {
                let s = CStr::from_ptr(ch.res_name).to_string_lossy().into_owned();
                xlib::XFree(ch.res_name as *mut _);
                Some(s)
            };
            let class = if ch.res_class.is_null() {
                None
            } else {
                let s = CStr::from_ptr(ch.res_class).to_string_lossy().into_owned();
                xlib::XFree(ch.res_class as *mut _);
                Some(s)
            };
            (instance, class)
        }
    }

    /* protocols & client messages */

    pub fn get_wm_protocols(&self, win: Window) -> Vec<xlib::Atom> {
        unsafe {
            let mut protocols: *mut xlib::Atom = null_mut();
            let mut count: c_int = 0;
            if xlib::XGetWMProtocols(self.dpy, win.0, &mut protocols, &mut count) != 0
                && count > 0
                && !protocols.is_null()
            {
                let out = std::slice::from_raw_parts(protocols, count as usize).to_vec();
                xlib::XFree(protocols as *mut _);
                out
            } else {
                Vec::new()
            }
        }
    }

    /// Sends `proto` through WM_PROTOCOLS if the client advertises it.
    pub fn send_event(&self, win: Window, proto: xlib::Atom) -> bool {
        if !self.get_wm_protocols(win).contains(&proto) {
            return false;
        }
        unsafe {
            let mut ev: xlib::XEvent = std::mem::zeroed();
            ev.client_message.type_ = xlib::ClientMessage;
            ev.client_message.window = win.0;
            ev.client_message.message_type = self.atoms.get(Atom::Wm(WM::Protocols));
            ev.client_message.format = 32;
            ev.client_message.data.set_long(0, proto as c_long);
            ev.client_message.data.set_long(1, xlib::CurrentTime as c_long);
            xlib::XSendEvent(self.dpy, win.0, 0, xlib::NoEventMask, &mut ev);
        }
        true
    }

    /// Synthesizes a ConfigureNotify reporting the client's geometry.
    pub fn send_configure_notify(&self, win: Window, x: i32, y: i32, w: i32, h: i32, bw: i32) {
        unsafe {
            let mut ev: xlib::XEvent = std::mem::zeroed();
            ev.configure.type_ = xlib::ConfigureNotify;
            ev.configure.display = self.dpy;
            ev.configure.event = win.0;
            ev.configure.window = win.0;
            ev.configure.x = x;
            ev.configure.y = y;
            ev.configure.width = w;
            ev.configure.height = h;
            ev.configure.border_width = bw;
            ev.configure.above = 0;
            ev.configure.override_redirect = 0;
            xlib::XSendEvent(self.dpy, win.0, 0, xlib::StructureNotifyMask, &mut ev);
        }
    }

    /* input */

    pub fn select_input(&self, win: Window, mask: i64) {
        unsafe {
            xlib::XSelectInput(self.dpy, win.0, mask);
        }
    }

    pub fn set_input_focus(&self, win: Window) {
        unsafe {
            xlib::XSetInputFocus(self.dpy, win.0, xlib::RevertToPointerRoot, xlib::CurrentTime);
        }
    }

    pub fn grab_keys(&self, win: Window, numlockmask: u32, keys: &[KeySpecification]) {
        unsafe {
            xlib::XUngrabKey(self.dpy, xlib::AnyKey, xlib::AnyModifier, win.0);
            let modifiers = [0, xlib::LockMask, numlockmask, numlockmask | xlib::LockMask];
            for key in keys {
                let code = xlib::XKeysymToKeycode(self.dpy, key.keysym as u64);
                if code == 0 {
                    continue;
                }
                for &m in &modifiers {
                    xlib::XGrabKey(
                        self.dpy,
                        code as c_int,
                        key.mask | m,
                        win.0,
                        1,
                        xlib::GrabModeAsync,
                        xlib::GrabModeAsync,
                    );
                }
            }
        }
    }

    pub fn ungrab_all_keys(&self, win: Window) {
        unsafe {
            xlib::XUngrabKey(self.dpy, xlib::AnyKey, xlib::AnyModifier, win.0);
        }
    }

    pub fn grab_button(&self, win: Window, button: u32, mask: u32) {
        unsafe {
            xlib::XGrabButton(
                self.dpy,
                button,
                mask,
                win.0,
                0,
                (xlib::ButtonPressMask | xlib::ButtonReleaseMask) as c_uint,
                xlib::GrabModeAsync,
                xlib::GrabModeSync,
                0,
                0,
            );
        }
    }

    pub fn ungrab_all_buttons(&self, win: Window) {
        unsafe {
            xlib::XUngrabButton(self.dpy, xlib::AnyButton as u32, xlib::AnyModifier, win.0);
        }
    }

    pub fn grab_pointer(&self, mask: i64, cursor: CursorId) -> bool {
        unsafe {
            xlib::XGrabPointer(
                self.dpy,
                self.root,
                0,
                mask as c_uint,
                xlib::GrabModeAsync,
                xlib::GrabModeAsync,
                0,
                cursor.0,
                xlib::CurrentTime,
            ) == xlib::GrabSuccess
        }
    }

    pub fn ungrab_pointer(&self) {
        unsafe {
            xlib::XUngrabPointer(self.dpy, xlib::CurrentTime);
        }
    }

    pub fn warp_pointer(&self, win: Window, x: i32, y: i32) {
        unsafe {
            xlib::XWarpPointer(self.dpy, 0, win.0, 0, 0, 0, 0, x, y);
        }
    }

    pub fn allow_events(&self, mode: i32) {
        unsafe {
            xlib::XAllowEvents(self.dpy, mode, xlib::CurrentTime);
        }
    }

    pub fn query_pointer_position(&self) -> Option<(i32, i32)> {
        unsafe {
            let mut root_return: xlib::Window = 0;
            let mut child_return: xlib::Window = 0;
            let mut x = 0;
            let mut y = 0;
            let mut win_x = 0;
            let mut win_y = 0;
            let mut mask = 0;
            if xlib::XQueryPointer(
                self.dpy,
                self.root,
                &mut root_return,
                &mut child_return,
                &mut x,
                &mut y,
                &mut win_x,
                &mut win_y,
                &mut mask,
            ) != 0
            {
                Some((x, y))
            } else {
                None
            }
        }
    }

    pub fn get_numlock_mask(&self) -> u32 {
        unsafe {
            let mut numlockmask = 0;
            let modmap = xlib::XGetModifierMapping(self.dpy);
            if modmap.is_null() {
                return 0;
            }
            let max_keypermod = (*modmap).max_keypermod;
            let numlock_code = xlib::XKeysymToKeycode(self.dpy, x11::keysym::XK_Num_Lock as u64);
            for i in 0..8 {
                for j in 0..max_keypermod {
                    let code = *(*modmap)
                        .modifiermap
                        .offset((i * max_keypermod + j) as isize);
                    if code != 0 && code == numlock_code {
                        numlockmask = 1 << i;
                    }
                }
            }
            xlib::XFreeModifiermap(modmap);
            numlockmask
        }
    }

    pub fn clean_mask(&self, numlockmask: u32, mask: u32) -> u32 {
        mask & !(numlockmask | xlib::LockMask)
            & (xlib::ShiftMask
                | xlib::ControlMask
                | xlib::Mod1Mask
                | xlib::Mod2Mask
                | xlib::Mod3Mask
                | xlib::Mod4Mask
                | xlib::Mod5Mask)
    }

    pub fn keycode_to_keysym(&self, keycode: u32) -> u64 {
        unsafe { xlib::XKeycodeToKeysym(self.dpy, keycode as u8, 0) }
    }

    pub fn refresh_keyboard_mapping(&self, ev: &mut xlib::XMappingEvent) {
        unsafe {
            xlib::XRefreshKeyboardMapping(ev);
        }
    }

    /* cursors */

    pub fn create_font_cursor(&self, shape: u32) -> CursorId {
        CursorId(unsafe { xlib::XCreateFontCursor(self.dpy, shape) })
    }

    pub fn free_cursor(&self, cursor: CursorId) {
        unsafe {
            xlib::XFreeCursor(self.dpy, cursor.0);
        }
    }

    /* server control & event delivery */

    pub fn grab_server(&self) {
        unsafe { xlib::XGrabServer(self.dpy) };
    }

    pub fn ungrab_server(&self) {
        unsafe { xlib::XUngrabServer(self.dpy) };
    }

    pub fn set_close_down_mode(&self, mode: i32) {
        unsafe { xlib::XSetCloseDownMode(self.dpy, mode) };
    }

    pub fn kill_client(&self, win: Window) {
        unsafe { xlib::XKillClient(self.dpy, win.0) };
    }

    pub fn sync(&self, discard: bool) {
        unsafe { xlib::XSync(self.dpy, discard as i32) };
    }

    /// Blocking read of the next event.
    pub fn next_event(&self) -> Option<xlib::XEvent> {
        unsafe {
            let mut ev: xlib::XEvent = std::mem::zeroed();
            if xlib::XNextEvent(self.dpy, &mut ev) == 0 {
                Some(ev)
            } else {
                None
            }
        }
    }

    /// Blocking read of the next event matching `mask`.
    pub fn mask_event(&self, mask: i64) -> xlib::XEvent {
        unsafe {
            let mut ev: xlib::XEvent = std::mem::zeroed();
            xlib::XMaskEvent(self.dpy, mask, &mut ev);
            ev
        }
    }

    /// Non-blocking read of a pending event matching `mask`.
    pub fn check_mask_event(&self, mask: i64) -> Option<xlib::XEvent> {
        unsafe {
            let mut ev: xlib::XEvent = std::mem::zeroed();
            if xlib::XCheckMaskEvent(self.dpy, mask, &mut ev) != 0 {
                Some(ev)
            } else {
                None
            }
        }
    }
}

impl Drop for XWrapper {
    fn drop(&mut self) {
        unsafe {
            self.fonts.clear();
            if !self.xftdraw.is_null() {
                xft::XftDrawDestroy(self.xftdraw);
            }
            xlib::XFreePixmap(self.dpy, self.drawable);
            xlib::XFreeGC(self.dpy, self.gc);
            xlib::XCloseDisplay(self.dpy);
        }
    }
}
