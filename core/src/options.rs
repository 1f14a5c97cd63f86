//! Option flags that tune how examples are compared and reported.
//!
//! Every flag is a distinct power-of-two bit. The builtin flags are
//! registered in a fixed order when the registry is first touched, so their
//! bits are stable across runs; additional flags can be registered by name
//! at any time and receive the next free bit.

use std::collections::BTreeMap;

use bitflags::bitflags;
use hashbrown::HashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use thiserror::Error;

bitflags! {
    /// A set of option flags.
    ///
    /// Bits beyond the named constants belong to flags registered at runtime
    /// through [`register_optionflag`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct OptionFlags: u32 {
        const DONT_ACCEPT_TRUE_FOR_1 = 1 << 0;
        const DONT_ACCEPT_BLANKLINE = 1 << 1;
        const NORMALIZE_WHITESPACE = 1 << 2;
        const ELLIPSIS = 1 << 3;
        const SKIP = 1 << 4;
        const IGNORE_EXCEPTION_DETAIL = 1 << 5;

        const COMPARISON_FLAGS = Self::DONT_ACCEPT_TRUE_FOR_1.bits()
            | Self::DONT_ACCEPT_BLANKLINE.bits()
            | Self::NORMALIZE_WHITESPACE.bits()
            | Self::ELLIPSIS.bits()
            | Self::SKIP.bits()
            | Self::IGNORE_EXCEPTION_DETAIL.bits();

        const REPORT_UDIFF = 1 << 6;
        const REPORT_CDIFF = 1 << 7;
        const REPORT_NDIFF = 1 << 8;
        const REPORT_ONLY_FIRST_FAILURE = 1 << 9;
        const FAIL_FAST = 1 << 10;

        const REPORTING_FLAGS = Self::REPORT_UDIFF.bits()
            | Self::REPORT_CDIFF.bits()
            | Self::REPORT_NDIFF.bits()
            | Self::REPORT_ONLY_FIRST_FAILURE.bits()
            | Self::FAIL_FAST.bits();
    }
}

impl Default for OptionFlags {
    fn default() -> Self {
        OptionFlags::empty()
    }
}

impl OptionFlags {
    /// Apply per-example overrides: `true` sets the flag, `false` clears it.
    pub fn with_overrides(self, overrides: &BTreeMap<OptionFlags, bool>) -> OptionFlags {
        overrides
            .iter()
            .fold(self, |flags, (&flag, &enabled)| {
                if enabled { flags | flag } else { flags - flag }
            })
    }
}

/// Builtin flags in registration order. The position of each entry is the
/// bit it receives.
const BUILTIN_FLAGS: [(&str, OptionFlags); 11] = [
    ("DONT_ACCEPT_TRUE_FOR_1", OptionFlags::DONT_ACCEPT_TRUE_FOR_1),
    ("DONT_ACCEPT_BLANKLINE", OptionFlags::DONT_ACCEPT_BLANKLINE),
    ("NORMALIZE_WHITESPACE", OptionFlags::NORMALIZE_WHITESPACE),
    ("ELLIPSIS", OptionFlags::ELLIPSIS),
    ("SKIP", OptionFlags::SKIP),
    ("IGNORE_EXCEPTION_DETAIL", OptionFlags::IGNORE_EXCEPTION_DETAIL),
    ("REPORT_UDIFF", OptionFlags::REPORT_UDIFF),
    ("REPORT_CDIFF", OptionFlags::REPORT_CDIFF),
    ("REPORT_NDIFF", OptionFlags::REPORT_NDIFF),
    ("REPORT_ONLY_FIRST_FAILURE", OptionFlags::REPORT_ONLY_FIRST_FAILURE),
    ("FAIL_FAST", OptionFlags::FAIL_FAST),
];

/// Raised when every bit of [`OptionFlags`] is already taken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot register option flag `{name}`: all {capacity} bits are taken")]
pub struct RegistryFull {
    pub name: String,
    pub capacity: u32,
}

#[derive(Default)]
struct Registry {
    by_name: HashMap<String, OptionFlags>,
}

impl Registry {
    fn register(&mut self, name: &str) -> Result<OptionFlags, RegistryFull> {
        if let Some(&flag) = self.by_name.get(name) {
            return Ok(flag);
        }
        let next = self.by_name.len() as u32;
        let bit = 1u32.checked_shl(next).ok_or_else(|| RegistryFull {
            name: name.to_string(),
            capacity: u32::BITS,
        })?;
        let flag = OptionFlags::from_bits_retain(bit);
        self.by_name.insert(name.to_string(), flag);
        Ok(flag)
    }
}

static REGISTRY: Lazy<RwLock<Registry>> = Lazy::new(|| {
    let mut registry = Registry::default();
    for (name, flag) in BUILTIN_FLAGS {
        let registered = registry.register(name);
        debug_assert_eq!(registered, Ok(flag), "builtin flag `{name}` out of order");
    }
    RwLock::new(registry)
});

/// Register a flag by name, returning its bit.
///
/// Registering a name that is already known returns the existing bit.
pub fn register_optionflag(name: &str) -> Result<OptionFlags, RegistryFull> {
    if let Some(flag) = optionflag_by_name(name) {
        return Ok(flag);
    }
    REGISTRY.write().register(name)
}

/// Look up a registered flag.
pub fn optionflag_by_name(name: &str) -> Option<OptionFlags> {
    REGISTRY.read().by_name.get(name).copied()
}

/// All registered flags, ordered by bit.
pub fn registered_optionflags() -> Vec<(String, OptionFlags)> {
    let registry = REGISTRY.read();
    let mut flags: Vec<_> = registry
        .by_name
        .iter()
        .map(|(name, flag)| (name.clone(), *flag))
        .collect();
    flags.sort_by_key(|(_, flag)| flag.bits());
    flags
}
