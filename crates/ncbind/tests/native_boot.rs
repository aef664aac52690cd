//! Boot against whatever curses build the host has.
//!
//! Booting never starts a session, so this runs without a terminal. Hosts
//! without a wide curses library must fail with a fatal discovery error.

use ncbind::prelude::*;
use ncbind::{LayoutKind, NativeChar, factory};

struct Probe;

impl ContextVisitor for Probe {
    type Output = (LayoutKind, usize);

    fn visit<L: Layout>(self, ctx: &Context<L>) -> Self::Output {
        let facts = ctx.facts();
        (L::KIND, facts.wide_char_slot_width)
    }
}

#[test]
fn boot_resolves_tables_or_fails_fatally() {
    let runtime = match Runtime::boot() {
        Ok(runtime) => runtime,
        Err(err) => {
            assert!(err.is_fatal(), "unexpected boot error: {err}");
            return;
        }
    };

    let (kind, slot_width) = runtime.visit(Probe).unwrap();
    assert_eq!(kind, runtime.kind());
    assert_eq!(slot_width, kind.wchar_width());

    let installed = factory().unwrap();
    assert_eq!(installed.layout(), kind);
    let value = installed.get_char('x', Attrs::BOLD, 2).unwrap();
    assert_eq!(value.decode().unwrap(), ('x', Attrs::BOLD, 2));
}

#[test]
fn typed_context_matches_only_the_booted_layout() {
    let Ok(runtime) = Runtime::boot() else {
        return;
    };

    struct Check<'a>(&'a Runtime);

    impl ncbind::abi::LayoutVisitor for Check<'_> {
        type Output = bool;

        fn visit<L: Layout>(self) -> bool {
            self.0.context::<L>().is_some_and(|ctx| {
                let cells = ctx.marshal().encode_string("ok", Attrs::NORMAL, 0, Default::default());
                cells.is_ok_and(|c| c.last().is_some_and(NativeChar::is_terminator))
            })
        }
    }

    for kind in LayoutKind::ALL {
        assert_eq!(kind.visit(Check(&runtime)), kind == runtime.kind());
    }
}

#[test]
fn acs_tables_resolve_before_the_session() {
    let Ok(runtime) = Runtime::boot() else {
        return;
    };

    struct Acs;

    impl ContextVisitor for Acs {
        type Output = ();

        fn visit<L: Layout>(self, ctx: &Context<L>) {
            if let Ok(map) = ctx.acs_map() {
                assert!(map.get(ncbind::acs::HLINE).is_ok());
                assert!(map.get('\u{80}').unwrap_err().is_caller_input());
            }
            // `_nc_wacs` stays NULL until `initscr` fills it.
            match ctx.wide_acs_map() {
                Ok(_) | Err(Error::NotInitialized(_)) | Err(Error::ProbeFailed { .. }) => {}
                Err(other) => panic!("unexpected wide ACS error: {other}"),
            }
        }
    }

    runtime.visit(Acs).unwrap();
}
