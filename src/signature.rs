use alloc::vec::Vec;

use crate::key::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Accepted either positionally or by name
    Positional,
    /// Accepted by name only
    Named,
}

/// Declared parameter of a callable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    name: &'static str,
    kind: ParamKind,
    marker: Option<Key>,
}

impl Param {
    #[inline]
    #[must_use]
    pub const fn positional(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Positional,
            marker: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn named(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Named,
            marker: None,
        }
    }

    /// Marks the parameter as a dependency resolved by `key`, see [`crate::Injector::scan`]
    #[inline]
    #[must_use]
    pub const fn inject(mut self, key: Key) -> Self {
        self.marker = Some(key);
        self
    }

    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ParamKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub const fn marker(&self) -> Option<Key> {
        self.marker
    }
}

/// Ordered parameters of a callable.
///
/// Named-only parameters don't take a position,
/// so positions count [`ParamKind::Positional`] parameters only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { params: Vec::new() }
    }

    #[inline]
    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    #[inline]
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|param| param.name == name)
    }

    /// Position of a parameter accepted positionally
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positional().position(|param| param.name == name)
    }

    pub(crate) fn positional(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().filter(|param| param.kind == ParamKind::Positional)
    }

    /// Parameters carrying a dependency marker, with their keys
    pub fn markers(&self) -> impl Iterator<Item = (&'static str, Key)> + '_ {
        self.params
            .iter()
            .filter_map(|param| param.marker.map(|key| (param.name, key)))
    }
}

impl FromIterator<Param> for Signature {
    fn from_iter<I: IntoIterator<Item = Param>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}
