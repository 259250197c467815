//! Parameter-binding disciplines for builders.

use super::clause::Fragment;
use crate::params::{self, BoundValue, ParameterSet, Placeholder};
use std::collections::{BTreeMap, BTreeSet};

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Named {}
    impl Sealed for super::Indexed {}
}

/// `:identifier` placeholders, values bound by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Named;

/// `?` placeholders, values bound by position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Indexed;

/// How a builder writes placeholders and hands its parameters to the executor.
pub trait BindMode: sealed::Sealed + Copy + Default + Send + Sync + 'static {
    /// Whether values are bound by name.
    const NAMED: bool;

    /// Check that a clause fragment uses only this mode's placeholders, and for
    /// positional mode that every `?` has exactly one value.
    fn check_fragment(fragment: &Fragment) -> Result<(), String>;

    /// Assemble the final parameter set.
    fn collect(named: &BTreeMap<String, BoundValue>, positional: Vec<BoundValue>) -> ParameterSet;
}

impl BindMode for Named {
    const NAMED: bool = true;

    fn check_fragment(fragment: &Fragment) -> Result<(), String> {
        let positional = params::count_positional(&fragment.sql);
        if positional > 0 || !fragment.values.is_empty() {
            return Err(format!(
                "'{}': positional parameters are not allowed in a named statement",
                fragment.sql
            ));
        }
        Ok(())
    }

    fn collect(named: &BTreeMap<String, BoundValue>, _positional: Vec<BoundValue>) -> ParameterSet {
        ParameterSet::Named(named.clone())
    }
}

impl BindMode for Indexed {
    const NAMED: bool = false;

    fn check_fragment(fragment: &Fragment) -> Result<(), String> {
        let mut positional = 0;
        for span in params::scan_placeholders(&fragment.sql) {
            match span.placeholder {
                Placeholder::Positional => positional += 1,
                Placeholder::Named(name) => {
                    return Err(format!(
                        "'{}': named parameter ':{}' is not allowed in an indexed statement",
                        fragment.sql, name
                    ));
                }
            }
        }
        if positional != fragment.values.len() {
            return Err(format!(
                "'{}' has {} '?', but {} values provided",
                fragment.sql,
                positional,
                fragment.values.len()
            ));
        }
        Ok(())
    }

    fn collect(_named: &BTreeMap<String, BoundValue>, positional: Vec<BoundValue>) -> ParameterSet {
        ParameterSet::Indexed(positional)
    }
}

/// Placeholder for a generated column parameter.
///
/// Named mode binds the value under the column name (dots become underscores)
/// and returns no positional values; positional mode returns `?` and the value.
/// A name already present in `named` or `reserved` gets the first free
/// `_1`, `_2`, ... suffix, so repeated columns never share a parameter.
pub(crate) fn column_param<M: BindMode>(
    column: &str,
    value: BoundValue,
    named: &mut BTreeMap<String, BoundValue>,
    reserved: &BTreeSet<String>,
) -> (String, Vec<BoundValue>) {
    if M::NAMED {
        let base = column.replace('.', "_");
        let mut name = base.clone();
        let mut suffix = 1;
        while named.contains_key(&name) || reserved.contains(&name) {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        let placeholder = format!(":{}", name);
        named.insert(name, value);
        (placeholder, Vec::new())
    } else {
        ("?".to_string(), vec![value])
    }
}
