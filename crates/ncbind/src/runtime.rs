//! Process boot and the typed per-layout context.
//!
//! [`Runtime::boot`] runs the whole startup sequence once:
//!
//! 1. read [`Config`] from the environment
//! 2. discover the ABI facts (cached for the process, failures included)
//! 3. follow the native locale's codeset unless the encoding is pinned
//! 4. build the representation set for those facts
//! 5. install the process-wide character factory
//! 6. load the main and panel libraries
//! 7. resolve the typed function tables
//!
//! The result is erased behind the compiled [`LayoutKind`]; callers get the
//! typed [`Context`] back through [`Runtime::visit`] or
//! [`Runtime::context`].

use std::any::Any;
use std::ffi::c_short;
use std::fmt;
use std::sync::Arc;

use libloading::Library;
use ncbind_abi::{
    AbiFactSet, Layout, LayoutKind, LayoutVisitor, Registry, RepresentationSet, resolve_with,
};
use ncbind_core::{Config, Error, Result, check_status, info};
use ncbind_marshal::{CharFactory, Marshal, install};
use ncbind_sys::{NativeLoader, NativePtr, PANEL, SystemLoader, WINDOW, resolve};

use crate::acs::AcsMap;
use crate::handle::{Deallocator, HandleRegistry};
use crate::panel::Panel;
use crate::screen::Screen;
use crate::table::FunctionTables;
use crate::window::{Window, native_len};

/// Everything needed to call the native library with layout `L`.
pub struct Context<L: Layout> {
    set: Arc<RepresentationSet>,
    factory: CharFactory<L>,
    tables: FunctionTables<L>,
    windows: HandleRegistry<WINDOW>,
    panels: HandleRegistry<PANEL>,
    // Declared last: the tables above point into these libraries.
    main: Library,
    _panel: Library,
}

impl<L: Layout> Context<L> {
    fn load(set: Arc<RepresentationSet>, config: &Config) -> Result<Self> {
        if !set.is::<L>() {
            return Err(Error::CorruptAbi(format!(
                "representation set is {}, context requested {}",
                set.kind().as_str(),
                L::KIND.as_str()
            )));
        }
        let names = &set.facts().libraries;
        let main = SystemLoader.load_module(&names.main)?;
        let panel = SystemLoader.load_module(&names.panel)?;
        // SAFETY: discovery matched these libraries to the facts `set` was
        // built from, and `set.is::<L>()` holds. The libraries are stored in
        // the context next to the tables.
        let tables = unsafe { FunctionTables::resolve(&main, &names.main, &panel, &names.panel) }?;
        info!(
            layout = L::KIND.as_str(),
            main = %names.main,
            panel = %names.panel,
            "native function tables resolved"
        );
        Ok(Self {
            factory: CharFactory::new(config),
            tables,
            windows: HandleRegistry::new(),
            panels: HandleRegistry::new(),
            main,
            _panel: panel,
            set,
        })
    }

    #[must_use]
    pub fn facts(&self) -> &AbiFactSet {
        self.set.facts()
    }

    #[must_use]
    pub fn representations(&self) -> &RepresentationSet {
        &self.set
    }

    #[must_use]
    pub fn factory(&self) -> &CharFactory<L> {
        &self.factory
    }

    #[must_use]
    pub fn marshal(&self) -> &Marshal<L> {
        self.factory.marshal()
    }

    #[must_use]
    pub fn tables(&self) -> &FunctionTables<L> {
        &self.tables
    }

    pub(crate) fn windows(&self) -> &HandleRegistry<WINDOW> {
        &self.windows
    }

    pub(crate) fn panels(&self) -> &HandleRegistry<PANEL> {
        &self.panels
    }

    // ── Session ─────────────────────────────────────────────────────────

    /// Start the curses session (`initscr`).
    pub fn init_screen(&self) -> Result<Screen<'_, L>> {
        Screen::init(self)
    }

    // ── Windows and panels ──────────────────────────────────────────────

    /// Create a window with `newwin`.
    pub fn new_window(&self, rows: usize, cols: usize, y: usize, x: usize) -> Result<Window<'_, L>> {
        // SAFETY: `newwin` takes plain integers.
        let raw = unsafe {
            (self.tables.core.newwin)(
                native_len(rows)?,
                native_len(cols)?,
                native_len(y)?,
                native_len(x)?,
            )
        };
        let ptr = NativePtr::new(raw).ok_or(Error::NativeCall {
            function: "newwin",
            result: 0,
        })?;
        Ok(self.wrap_window(ptr))
    }

    /// Wrap a native window, sharing the existing handle if it is already
    /// owned.
    pub fn wrap_window(&self, ptr: NativePtr<WINDOW>) -> Window<'_, L> {
        let handle = self
            .windows
            .wrap(ptr, "delwin", Deallocator::Unary(self.tables.core.delwin));
        Window::new(self, handle)
    }

    /// Put `window` in a new panel on top of the stack.
    pub fn new_panel<'ctx>(&'ctx self, window: Window<'ctx, L>) -> Result<Panel<'ctx, L>> {
        Panel::create(self, window)
    }

    /// Recompute the virtual screen from the panel stack.
    pub fn update_panels(&self) {
        // SAFETY: no arguments; panel state belongs to the native library.
        unsafe { (self.tables.panel.update_panels)() }
    }

    /// Flush the virtual screen to the terminal.
    pub fn doupdate(&self) -> Result<()> {
        // SAFETY: no arguments.
        check_status("doupdate", unsafe { (self.tables.core.doupdate)() }).map(drop)
    }

    // ── Alternate character set ─────────────────────────────────────────

    /// The single-byte line-drawing table (`acs_map`).
    pub fn acs_map(&self) -> Result<AcsMap<'_, L::Small>> {
        let names = &self.set.facts().libraries;
        // SAFETY: `acs_map` is a `chtype[128]` of the loaded layout, kept
        // alive by `self.main`.
        unsafe {
            let table = resolve::<*const L::Small>(&self.main, &names.main, "acs_map")?;
            AcsMap::from_raw(table, "acs_map")
        }
    }

    /// The wide line-drawing table (`_nc_wacs`); unset before `initscr`.
    pub fn wide_acs_map(&self) -> Result<AcsMap<'_, L::Wide>> {
        let names = &self.set.facts().libraries;
        // SAFETY: `_nc_wacs` is a `cchar_t *` variable of the loaded layout;
        // once set it points to 128 cells owned by the library.
        unsafe {
            let variable = resolve::<*const *const L::Wide>(&self.main, &names.main, "_nc_wacs")?;
            AcsMap::from_raw(variable.read(), "_nc_wacs")
        }
    }

    // ── Colors ──────────────────────────────────────────────────────────

    pub fn start_color(&self) -> Result<()> {
        // SAFETY: no arguments.
        check_status("start_color", unsafe { (self.tables.core.start_color)() }).map(drop)
    }

    /// Define color pair `pair` as `fg` on `bg`.
    pub fn init_pair(&self, pair: u16, fg: i16, bg: i16) -> Result<()> {
        let pair = c_short::try_from(pair).map_err(|_| Error::InvalidLength {
            requested: i64::from(pair),
            max: c_short::MAX as usize,
        })?;
        // SAFETY: plain integers.
        check_status("init_pair", unsafe {
            (self.tables.core.init_pair)(pair, fg, bg)
        })
        .map(drop)
    }

    /// Name of a key code, decoded under the active encoding.
    pub fn key_name(&self, key: i32) -> Result<Option<String>> {
        // SAFETY: `keyname` returns NULL or a static NUL-terminated string.
        let raw = unsafe { (self.tables.core.keyname)(key) };
        if raw.is_null() {
            return Ok(None);
        }
        // SAFETY: checked non-null above; the string is static.
        let bytes = unsafe { std::ffi::CStr::from_ptr(raw) }.to_bytes();
        self.marshal().decode_multibyte(bytes).map(Some)
    }
}

impl<L: Layout> fmt::Debug for Context<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("layout", &L::KIND)
            .field("config", &self.set.facts().config_name)
            .field("windows", &self.windows)
            .field("panels", &self.panels)
            .finish_non_exhaustive()
    }
}

/// Generic operation run against the booted context.
pub trait ContextVisitor {
    type Output;

    fn visit<L: Layout>(self, context: &Context<L>) -> Self::Output;
}

/// The booted binding, erased over the compiled layout.
pub struct Runtime {
    kind: LayoutKind,
    context: Arc<dyn Any + Send + Sync>,
}

impl Runtime {
    /// Boot with configuration read from the environment.
    pub fn boot() -> Result<Self> {
        Self::boot_with(Config::from_env())
    }

    pub fn boot_with(config: Config) -> Result<Self> {
        let config = config.validated();
        let facts = resolve_with(&SystemLoader, &config)?;
        let config = reconcile_locale(&SystemLoader, config)?;
        let set = Registry::global().build(facts)?;
        install(&set, &config);
        let kind = set.kind();
        let context = kind.visit(LoadContext {
            set,
            config: &config,
        })?;
        info!(layout = kind.as_str(), config = facts.config_name, "ncbind runtime booted");
        Ok(Self { kind, context })
    }

    #[must_use]
    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    /// The typed context, if `L` is the booted layout.
    #[must_use]
    pub fn context<L: Layout>(&self) -> Option<&Context<L>> {
        self.context.downcast_ref::<Context<L>>()
    }

    /// Run `visitor` against the typed context of the booted layout.
    pub fn visit<V: ContextVisitor>(&self, visitor: V) -> Result<V::Output> {
        self.kind.visit(Dispatch {
            runtime: self,
            visitor,
        })
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime").field("kind", &self.kind).finish()
    }
}

/// `config` with its encoding matched to the locale `loader` selected for
/// the native library.
fn reconcile_locale<N: NativeLoader>(loader: &N, config: Config) -> Result<Config> {
    let locale = loader.set_locale()?;
    let guessed = config.encoding;
    let config = config.with_native_locale(&locale);
    if config.encoding != guessed {
        info!(
            locale = %locale,
            from = guessed.name(),
            to = config.encoding.name(),
            "text encoding follows native locale"
        );
    }
    Ok(config)
}

struct LoadContext<'a> {
    set: Arc<RepresentationSet>,
    config: &'a Config,
}

impl LayoutVisitor for LoadContext<'_> {
    type Output = Result<Arc<dyn Any + Send + Sync>>;

    fn visit<L: Layout>(self) -> Self::Output {
        let context: Arc<dyn Any + Send + Sync> = Arc::new(Context::<L>::load(self.set, self.config)?);
        Ok(context)
    }
}

struct Dispatch<'a, V> {
    runtime: &'a Runtime,
    visitor: V,
}

impl<V: ContextVisitor> LayoutVisitor for Dispatch<'_, V> {
    type Output = Result<V::Output>;

    fn visit<L: Layout>(self) -> Self::Output {
        let context = self.runtime.context::<L>().ok_or_else(|| {
            Error::CorruptAbi(format!(
                "runtime context does not hold layout {}",
                L::KIND.as_str()
            ))
        })?;
        Ok(self.visitor.visit(context))
    }
}
