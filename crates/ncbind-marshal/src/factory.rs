//! Character and string factories.
//!
//! [`CharFactory<L>`] is the typed construction path: generic code that knows
//! its layout calls it directly and gets concrete representations back.
//! Code that must not know the layout goes through [`DynCharFactory`], built
//! once per process by [`install`] and read lock-free afterwards.

use std::any::Any;
use std::fmt::Debug;
use std::sync::OnceLock;

use ncbind_abi::{Layout, LayoutKind, LayoutVisitor, NCursesChar, RepresentationSet};
use ncbind_core::{Attrs, Config, Error, Result, debug, warn};

use crate::marshal::{Marshal, Terminator};
use crate::string::NativeString;

// ── Typed factory ───────────────────────────────────────────────────────

/// Typed construction of representation values for layout `L`.
pub struct CharFactory<L> {
    marshal: Marshal<L>,
    max_cells: usize,
}

impl<L> Clone for CharFactory<L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for CharFactory<L> {}

impl<L> Debug for CharFactory<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharFactory")
            .field("marshal", &self.marshal)
            .field("max_cells", &self.max_cells)
            .finish()
    }
}

impl<L: Layout> CharFactory<L> {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            marshal: Marshal::new(config.encoding),
            max_cells: config.max_string_cells,
        }
    }

    #[must_use]
    pub fn marshal(&self) -> &Marshal<L> {
        &self.marshal
    }

    #[must_use]
    pub fn max_cells(&self) -> usize {
        self.max_cells
    }

    pub fn get_char(&self, ch: char, attrs: Attrs, pair: u16) -> Result<L::Wide> {
        self.marshal.encode_char(ch, attrs, pair)
    }

    pub fn get_small_char(&self, ch: char, attrs: Attrs, pair: u16) -> L::Small {
        self.marshal.encode_small_char(ch, attrs, pair)
    }

    /// A single-byte value carrying only attributes and a color pair, as
    /// passed to the attribute-setting native calls.
    pub fn get_attribute(&self, attrs: Attrs, pair: u16) -> L::Small {
        self.marshal.encode_small_char('\0', attrs, pair)
    }

    pub fn get_string(&self, text: &str, attrs: Attrs, pair: u16) -> Result<NativeString<L::Wide>> {
        self.check_cells(text.chars().count())?;
        let cells = self
            .marshal
            .encode_string(text, attrs, pair, Terminator::Append)?;
        Ok(NativeString::from_cells(cells))
    }

    pub fn get_small_string(
        &self,
        text: &str,
        attrs: Attrs,
        pair: u16,
    ) -> Result<NativeString<L::Small>> {
        self.check_cells(text.chars().count())?;
        let cells = self
            .marshal
            .encode_small_string(text, attrs, pair, Terminator::Append)?;
        Ok(NativeString::from_cells(cells))
    }

    /// Zeroed wide-cell buffer for a native call that fills up to `length`
    /// cells.
    pub fn get_empty_string(&self, length: i32) -> Result<NativeString<L::Wide>> {
        Ok(NativeString::zeroed(self.checked_length(length)?))
    }

    pub fn get_empty_small_string(&self, length: i32) -> Result<NativeString<L::Small>> {
        Ok(NativeString::zeroed(self.checked_length(length)?))
    }

    /// Zeroed wide-string (`wchar_t*`) buffer of `length` slots.
    pub fn get_empty_wide_str(&self, length: i32) -> Result<NativeString<L::Slot>> {
        Ok(NativeString::zeroed(self.checked_length(length)?))
    }

    fn checked_length(&self, length: i32) -> Result<usize> {
        let invalid = || Error::InvalidLength {
            requested: i64::from(length),
            max: self.max_cells,
        };
        let cells = usize::try_from(length).map_err(|_| invalid())?;
        if cells > self.max_cells {
            return Err(invalid());
        }
        Ok(cells)
    }

    fn check_cells(&self, cells: usize) -> Result<()> {
        if cells > self.max_cells {
            return Err(Error::InvalidLength {
                requested: i64::try_from(cells).unwrap_or(i64::MAX),
                max: self.max_cells,
            });
        }
        Ok(())
    }
}

// ── Erased values ───────────────────────────────────────────────────────

/// A representation value whose concrete type is hidden.
pub trait CellValue: Debug + Send + Sync {
    /// Decode into (character, attributes, pair).
    fn decode(&self) -> Result<(char, Attrs, u16)>;
    fn attrs(&self) -> Attrs;
    fn color_pair(&self) -> u16;
    /// `true` for the single-byte representation.
    fn is_single_byte(&self) -> bool;
    /// Downcast support; the concrete type is `L::Small` or `L::Wide`.
    fn as_any(&self) -> &dyn Any;
}

/// A native string whose cell type is hidden.
pub trait CellString: Debug + Send + Sync {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn capacity(&self) -> usize;
    fn text(&self) -> Result<String>;
    fn cell(&self, index: usize) -> Option<Box<dyn CellValue>>;
    /// Downcast support; the concrete type is `NativeString<L::Small>` or
    /// `NativeString<L::Wide>`.
    fn as_any(&self) -> &dyn Any;
}

struct WideValue<L: Layout> {
    cell: L::Wide,
    marshal: Marshal<L>,
}

struct SmallValue<L: Layout> {
    cell: L::Small,
    marshal: Marshal<L>,
}

struct WideString<L: Layout> {
    string: NativeString<L::Wide>,
    marshal: Marshal<L>,
}

struct SmallString<L: Layout> {
    string: NativeString<L::Small>,
    marshal: Marshal<L>,
}

macro_rules! erased_debug {
    ($($ty:ident => $field:ident),*) => {
        $(
            impl<L: Layout> Debug for $ty<L> {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.debug_struct(stringify!($ty))
                        .field(stringify!($field), &self.$field)
                        .finish()
                }
            }
        )*
    };
}

erased_debug!(WideValue => cell, SmallValue => cell, WideString => string, SmallString => string);

impl<L: Layout> CellValue for WideValue<L> {
    fn decode(&self) -> Result<(char, Attrs, u16)> {
        self.marshal.decode_char(&self.cell)
    }

    fn attrs(&self) -> Attrs {
        self.cell.attrs()
    }

    fn color_pair(&self) -> u16 {
        self.cell.color_pair()
    }

    fn is_single_byte(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any {
        &self.cell
    }
}

impl<L: Layout> CellValue for SmallValue<L> {
    fn decode(&self) -> Result<(char, Attrs, u16)> {
        self.marshal.decode_small_char(&self.cell)
    }

    fn attrs(&self) -> Attrs {
        self.cell.attrs()
    }

    fn color_pair(&self) -> u16 {
        self.cell.color_pair()
    }

    fn is_single_byte(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        &self.cell
    }
}

impl<L: Layout> CellString for WideString<L> {
    fn len(&self) -> usize {
        self.string.len()
    }

    fn capacity(&self) -> usize {
        self.string.capacity()
    }

    fn text(&self) -> Result<String> {
        let cells = self.string.raw();
        Ok(self.marshal.decode_string(cells, cells.len())?.text)
    }

    fn cell(&self, index: usize) -> Option<Box<dyn CellValue>> {
        let cell = *self.string.as_slice().get(index)?;
        Some(Box::new(WideValue {
            cell,
            marshal: self.marshal,
        }))
    }

    fn as_any(&self) -> &dyn Any {
        &self.string
    }
}

impl<L: Layout> CellString for SmallString<L> {
    fn len(&self) -> usize {
        self.string.len()
    }

    fn capacity(&self) -> usize {
        self.string.capacity()
    }

    fn text(&self) -> Result<String> {
        let cells = self.string.raw();
        Ok(self.marshal.decode_small_string(cells, cells.len())?.text)
    }

    fn cell(&self, index: usize) -> Option<Box<dyn CellValue>> {
        let cell = *self.string.as_slice().get(index)?;
        Some(Box::new(SmallValue {
            cell,
            marshal: self.marshal,
        }))
    }

    fn as_any(&self) -> &dyn Any {
        &self.string
    }
}

// ── Erased factory ──────────────────────────────────────────────────────

/// Layout-independent construction path.
pub trait DynCharFactory: Debug + Send + Sync {
    fn layout(&self) -> LayoutKind;
    fn get_char(&self, ch: char, attrs: Attrs, pair: u16) -> Result<Box<dyn CellValue>>;
    fn get_small_char(&self, ch: char, attrs: Attrs, pair: u16) -> Box<dyn CellValue>;
    fn get_attribute(&self, attrs: Attrs, pair: u16) -> Box<dyn CellValue>;
    fn get_string(&self, text: &str, attrs: Attrs, pair: u16) -> Result<Box<dyn CellString>>;
    fn get_small_string(&self, text: &str, attrs: Attrs, pair: u16)
    -> Result<Box<dyn CellString>>;
    fn get_empty_string(&self, length: i32) -> Result<Box<dyn CellString>>;
}

impl<L: Layout> DynCharFactory for CharFactory<L> {
    fn layout(&self) -> LayoutKind {
        L::KIND
    }

    fn get_char(&self, ch: char, attrs: Attrs, pair: u16) -> Result<Box<dyn CellValue>> {
        Ok(Box::new(WideValue {
            cell: CharFactory::get_char(self, ch, attrs, pair)?,
            marshal: self.marshal,
        }))
    }

    fn get_small_char(&self, ch: char, attrs: Attrs, pair: u16) -> Box<dyn CellValue> {
        Box::new(SmallValue {
            cell: CharFactory::get_small_char(self, ch, attrs, pair),
            marshal: self.marshal,
        })
    }

    fn get_attribute(&self, attrs: Attrs, pair: u16) -> Box<dyn CellValue> {
        Box::new(SmallValue {
            cell: CharFactory::get_attribute(self, attrs, pair),
            marshal: self.marshal,
        })
    }

    fn get_string(&self, text: &str, attrs: Attrs, pair: u16) -> Result<Box<dyn CellString>> {
        Ok(Box::new(WideString {
            string: CharFactory::get_string(self, text, attrs, pair)?,
            marshal: self.marshal,
        }))
    }

    fn get_small_string(
        &self,
        text: &str,
        attrs: Attrs,
        pair: u16,
    ) -> Result<Box<dyn CellString>> {
        Ok(Box::new(SmallString {
            string: CharFactory::get_small_string(self, text, attrs, pair)?,
            marshal: self.marshal,
        }))
    }

    fn get_empty_string(&self, length: i32) -> Result<Box<dyn CellString>> {
        Ok(Box::new(WideString {
            string: CharFactory::get_empty_string(self, length)?,
            marshal: self.marshal,
        }))
    }
}

struct BuildFactory<'a> {
    config: &'a Config,
}

impl LayoutVisitor for BuildFactory<'_> {
    type Output = Box<dyn DynCharFactory>;

    fn visit<L: Layout>(self) -> Self::Output {
        Box::new(CharFactory::<L>::new(self.config))
    }
}

/// Build an erased factory for `kind` without installing it.
#[must_use]
pub fn erased(kind: LayoutKind, config: &Config) -> Box<dyn DynCharFactory> {
    kind.visit(BuildFactory { config })
}

static FACTORY: OnceLock<Box<dyn DynCharFactory>> = OnceLock::new();

/// Install the process-wide factory for the resolved representations.
///
/// The first call wins; later calls return the installed factory and log if
/// they asked for a different layout.
pub fn install(set: &RepresentationSet, config: &Config) -> &'static dyn DynCharFactory {
    let installed: &'static dyn DynCharFactory = &**FACTORY.get_or_init(|| {
        debug!(layout = set.kind().as_str(), "installing character factory");
        erased(set.kind(), config)
    });
    if installed.layout() != set.kind() {
        warn!(
            installed = installed.layout().as_str(),
            requested = set.kind().as_str(),
            "character factory already installed for another layout"
        );
    }
    installed
}

/// The installed factory.
pub fn factory() -> Result<&'static dyn DynCharFactory> {
    FACTORY
        .get()
        .map(|installed| &**installed)
        .ok_or(Error::NotInitialized("character factory"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncbind_abi::{CChar, Chtype, Chtype32Wchar16, Chtype32Wchar32, SingleByteChar};

    fn config(max: usize) -> Config {
        Config::default().with_max_string_cells(max)
    }

    #[test]
    fn typed_values_match_marshal() {
        let factory = CharFactory::<Chtype32Wchar32>::new(&config(64));
        let small = factory.get_small_char('a', Attrs::NORMAL, 0);
        assert_eq!(small.raw(), 0x61);
        let attr = factory.get_attribute(Attrs::REVERSE, 2);
        assert_eq!(attr.encoded_byte(), 0);
        assert_eq!(attr.attrs(), Attrs::REVERSE);
        assert_eq!(attr.color_pair(), 2);
    }

    #[test]
    fn empty_string_lengths_are_validated() {
        let factory = CharFactory::<Chtype32Wchar32>::new(&config(16));
        assert_eq!(factory.get_empty_string(16).unwrap().capacity(), 16);
        assert_eq!(factory.get_empty_string(0).unwrap().capacity(), 0);
        assert_eq!(
            factory.get_empty_string(-1).unwrap_err(),
            Error::InvalidLength {
                requested: -1,
                max: 16
            }
        );
        assert!(factory.get_empty_string(17).unwrap_err().is_caller_input());
        assert!(factory.get_empty_small_string(-5).is_err());
        assert!(factory.get_empty_wide_str(100).is_err());
    }

    #[test]
    fn oversized_text_is_invalid_length() {
        let factory = CharFactory::<Chtype32Wchar32>::new(&config(3));
        assert!(factory.get_string("abc", Attrs::NORMAL, 0).is_ok());
        assert!(matches!(
            factory.get_string("abcd", Attrs::NORMAL, 0),
            Err(Error::InvalidLength { requested: 4, max: 3 })
        ));
        assert!(factory.get_small_string("abcd", Attrs::NORMAL, 0).is_err());
    }

    #[test]
    fn erased_factory_hides_layout() {
        let factory = erased(LayoutKind::Chtype32Wchar16, &config(64));
        assert_eq!(factory.layout(), LayoutKind::Chtype32Wchar16);

        let value = factory.get_char('\u{263A}', Attrs::BOLD, 4).unwrap();
        assert_eq!(value.decode(), Ok(('\u{263A}', Attrs::BOLD, 4)));
        assert!(!value.is_single_byte());
        assert!(value.as_any().downcast_ref::<CChar<u32, u16>>().is_some());

        let small = factory.get_small_char('z', Attrs::NORMAL, 1);
        assert!(small.is_single_byte());
        assert!(small.as_any().downcast_ref::<Chtype<u32>>().is_some());
    }

    #[test]
    fn erased_strings_decode() {
        let factory = erased(LayoutKind::Chtype64Wchar32, &config(64));
        let string = factory.get_string("héllo", Attrs::UNDERLINE, 2).unwrap();
        assert_eq!(string.len(), 5);
        assert_eq!(string.text().unwrap(), "héllo");
        let cell = string.cell(1).unwrap();
        assert_eq!(cell.decode(), Ok(('é', Attrs::UNDERLINE, 2)));
        assert!(string.cell(5).is_none());

        let empty = factory.get_empty_string(8).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.capacity(), 8);
        assert_eq!(empty.text().unwrap(), "");
    }

    #[test]
    fn typed_and_erased_agree_bitwise() {
        let typed = CharFactory::<Chtype32Wchar32>::new(&config(64));
        let erased = erased(LayoutKind::Chtype32Wchar32, &config(64));
        let a = typed.get_char('x', Attrs::DIM, 9).unwrap();
        let b = erased.get_char('x', Attrs::DIM, 9).unwrap();
        assert_eq!(b.as_any().downcast_ref::<CChar<u32, u32>>(), Some(&a));
    }
}
