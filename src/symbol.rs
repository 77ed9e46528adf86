use lasso::{Spur, ThreadedRodeo};
use std::fmt;
use std::sync::LazyLock;

/// Thread-safe store of interned atom names.
///
/// Guarantees:
/// - Same string always produces the same key
/// - Keys resolve back to the original string for the life of the process
pub struct SymbolStore {
    rodeo: ThreadedRodeo,
}

impl SymbolStore {
    /// Create a new empty symbol store.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Intern a name, returning its key.
    pub fn intern(&self, name: &str) -> Spur {
        self.rodeo.get_or_intern(name)
    }

    /// Resolve a key back to its name.
    pub fn resolve(&self, key: Spur) -> Option<&str> {
        self.rodeo.try_resolve(&key)
    }

    /// Check if a name has already been interned.
    pub fn contains(&self, name: &str) -> bool {
        self.rodeo.contains(name)
    }

    /// Number of interned names.
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for SymbolStore {
    fn default() -> Self {
        Self::new()
    }
}

static SYMBOLS: LazyLock<SymbolStore> = LazyLock::new(SymbolStore::new);

/// The process-wide atom table shared by every engine.
pub fn symbols() -> &'static SymbolStore {
    &SYMBOLS
}

/// An interned atom name.
///
/// Equality and hashing are by key. Ordering by name lives in
/// [`crate::compare`] because key order is interning order.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atom(Spur);

impl Atom {
    pub fn new(name: &str) -> Self {
        Atom(symbols().intern(name))
    }

    pub fn name(self) -> &'static str {
        symbols().resolve(self.0).unwrap_or("")
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({})", self.name())
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

macro_rules! known_atoms {
    ($($field:ident => $name:literal),* $(,)?) => {
        /// Atoms the engine dispatches on, interned once.
        pub struct Known {
            $(pub $field: Atom,)*
        }

        impl Known {
            fn new() -> Self {
                Self {
                    $($field: Atom::new($name),)*
                }
            }
        }
    };
}

known_atoms! {
    comma => ",",
    semicolon => ";",
    if_then => "->",
    neck => ":-",
    query => "?-",
    dot => ".",
    nil => "[]",
    curly => "{}",
    truth => "true",
    fail => "fail",
    call => "call",
    caret => "^",
    minus => "-",
    slash => "/",
    witness => "$witness",
    lt => "<",
    eq => "=",
    gt => ">",
    end_of_file => "end_of_file",
}

static KNOWN: LazyLock<Known> = LazyLock::new(Known::new);

pub fn known() -> &'static Known {
    &KNOWN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_same_name_twice() {
        let store = SymbolStore::new();
        let a = store.intern("foo");
        let b = store.intern("foo");
        assert_eq!(a, b, "Same name should intern to the same key");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn intern_distinct_names() {
        let store = SymbolStore::new();
        assert_ne!(store.intern("foo"), store.intern("bar"));
        assert!(store.contains("bar"));
        assert!(!store.contains("baz"));
    }

    #[test]
    fn atom_round_trips_name() {
        let atom = Atom::new("hello world");
        assert_eq!(atom.name(), "hello world");
        assert_eq!(atom, Atom::new("hello world"));
    }

    #[test]
    fn known_atoms_match_fresh_interning() {
        assert_eq!(known().comma, Atom::new(","));
        assert_eq!(known().nil.name(), "[]");
    }

    #[test]
    fn concurrent_interning_agrees() {
        use std::thread;

        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| Atom::new("shared_name")))
            .collect();
        let atoms: Vec<Atom> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(atoms.iter().all(|a| *a == atoms[0]));
    }
}
