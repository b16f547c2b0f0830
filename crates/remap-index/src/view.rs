use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Read access to one index, or to a main index layered over a library index.
///
/// Every query asks `main` first and only falls back to `libraries` when `main` has no
/// answer (absent, empty or `false`). Library facts are incomplete (references from library
/// code into the main artifact are never indexed), so results are never unioned.
pub enum View<'a, T> {
    Single(&'a T),
    Combined { main: &'a T, libraries: &'a T },
}

impl<T> Clone for View<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for View<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for View<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Single(index) => f.debug_tuple("Single").field(index).finish(),
            View::Combined { main, libraries } => f
                .debug_struct("Combined")
                .field("main", main)
                .field("libraries", libraries)
                .finish(),
        }
    }
}

impl<'a, T> From<&'a T> for View<'a, T> {
    fn from(index: &'a T) -> Self {
        View::Single(index)
    }
}

impl<'a, T> View<'a, T> {
    pub fn main(self) -> &'a T {
        match self {
            View::Single(index) => index,
            View::Combined { main, .. } => main,
        }
    }

    pub fn libraries(self) -> Option<&'a T> {
        match self {
            View::Single(_) => None,
            View::Combined { libraries, .. } => Some(libraries),
        }
    }

    pub fn is_combined(self) -> bool {
        matches!(self, View::Combined { .. })
    }

    /// Main first, then libraries.
    pub fn layers(self) -> impl Iterator<Item = &'a T> + 'a {
        std::iter::once(self.main()).chain(self.libraries())
    }

    pub fn map<U>(self, f: impl Fn(&'a T) -> &'a U) -> View<'a, U> {
        match self {
            View::Single(index) => View::Single(f(index)),
            View::Combined { main, libraries } => View::Combined {
                main: f(main),
                libraries: f(libraries),
            },
        }
    }

    pub(crate) fn first<R>(self, f: impl Fn(&'a T) -> Option<R>) -> Option<R> {
        match self {
            View::Single(index) => f(index),
            View::Combined { main, libraries } => f(main).or_else(|| f(libraries)),
        }
    }

    pub(crate) fn any(self, f: impl Fn(&'a T) -> bool) -> bool {
        self.layers().any(f)
    }

    pub(crate) fn first_slice<U>(self, f: impl Fn(&'a T) -> &'a [U]) -> &'a [U] {
        match self {
            View::Single(index) => f(index),
            View::Combined { main, libraries } => {
                let found = f(main);
                if found.is_empty() {
                    f(libraries)
                } else {
                    found
                }
            }
        }
    }

    pub(crate) fn first_set<U>(
        self,
        f: impl Fn(&'a T) -> Option<&'a BTreeSet<U>>,
    ) -> std::iter::Flatten<std::option::IntoIter<&'a BTreeSet<U>>>
    where
        U: 'a,
    {
        self.first(|index| f(index).filter(|set| !set.is_empty()))
            .into_iter()
            .flatten()
    }

    pub(crate) fn map_view<K, V>(
        self,
        f: impl Fn(&'a T) -> &'a BTreeMap<K, V>,
    ) -> MapView<'a, K, V> {
        MapView {
            main: f(self.main()),
            libraries: self.libraries().map(f),
        }
    }
}

/// Read-only view over a map, with `main` entries shadowing library entries on key collision.
pub struct MapView<'a, K, V> {
    main: &'a BTreeMap<K, V>,
    libraries: Option<&'a BTreeMap<K, V>>,
}

impl<K, V> Clone for MapView<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for MapView<'_, K, V> {}

impl<'a, K: Ord, V> MapView<'a, K, V> {
    pub fn get(self, key: &K) -> Option<&'a V> {
        self.main
            .get(key)
            .or_else(|| self.libraries.and_then(|libraries| libraries.get(key)))
    }

    pub fn contains_key(self, key: &K) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(self) -> impl Iterator<Item = (&'a K, &'a V)> + 'a {
        let main = self.main;
        let shadowed = self
            .libraries
            .into_iter()
            .flat_map(|libraries| libraries.iter())
            .filter(move |(key, _)| !main.contains_key(*key));
        main.iter().chain(shadowed)
    }

    pub fn keys(self) -> impl Iterator<Item = &'a K> + 'a {
        self.iter().map(|(key, _)| key)
    }

    pub fn len(self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(self) -> bool {
        self.main.is_empty() && self.libraries.map_or(true, BTreeMap::is_empty)
    }
}
