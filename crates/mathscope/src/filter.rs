//! Removal of symbols that cannot evaluate because of unmet dependencies.

use crate::graph::UnmetDependencies;
use mathscope_types::SymbolError;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Symbols that survived [`remove_unmet`], plus errors for those that did not.
#[derive(Debug, Clone)]
pub struct Filtered<'a, T: Clone> {
    pub symbols: Cow<'a, BTreeMap<String, T>>,
    pub errors: BTreeMap<String, SymbolError>,
}

impl<T: Clone> Filtered<'_, T> {
    /// True when nothing was removed and the input was passed through.
    pub fn is_unchanged(&self) -> bool {
        matches!(self.symbols, Cow::Borrowed(_))
    }
}

/// Drop every symbol listed in `unmet`.
///
/// With no unmet dependencies the input is borrowed back untouched, which
/// lets the caller skip rebuilding the child map. Otherwise each removed
/// symbol gets an [`SymbolError::UnmetDependency`] naming the undefined
/// symbol it depends on.
pub fn remove_unmet<'a, T: Clone>(
    symbols: &'a BTreeMap<String, T>,
    unmet: &UnmetDependencies,
) -> Filtered<'a, T> {
    if unmet.is_empty() {
        return Filtered {
            symbols: Cow::Borrowed(symbols),
            errors: BTreeMap::new(),
        };
    }

    let mut safe = BTreeMap::new();
    let mut errors = BTreeMap::new();
    for (name, value) in symbols {
        match unmet.get(name) {
            Some(missing) => {
                errors.insert(
                    name.clone(),
                    SymbolError::UnmetDependency {
                        missing: missing.clone(),
                    },
                );
            }
            None => {
                safe.insert(name.clone(), value.clone());
            }
        }
    }
    Filtered {
        symbols: Cow::Owned(safe),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(names: &[&str]) -> BTreeMap<String, String> {
        names
            .iter()
            .map(|n| (n.to_string(), format!("{n} = 1")))
            .collect()
    }

    #[test]
    fn test_fast_path_borrows_input() {
        let input = symbols(&["a", "b"]);
        let filtered = remove_unmet(&input, &UnmetDependencies::new());
        assert!(filtered.is_unchanged());
        assert!(filtered.errors.is_empty());
        assert_eq!(*filtered.symbols, input);
    }

    #[test]
    fn test_unmet_symbols_become_errors() {
        let input = symbols(&["a", "b", "c"]);
        let mut unmet = UnmetDependencies::new();
        unmet.insert("a".into(), "zz".into());
        unmet.insert("b".into(), "zz".into());

        let filtered = remove_unmet(&input, &unmet);
        assert!(!filtered.is_unchanged());
        assert_eq!(
            filtered.symbols.keys().collect::<Vec<_>>(),
            vec!["c"]
        );
        assert_eq!(
            filtered.errors["a"],
            SymbolError::UnmetDependency {
                missing: "zz".into()
            }
        );
        assert_eq!(
            filtered.errors["b"].to_string(),
            "Eval Error: Depends on undefined symbol zz"
        );
    }

    #[test]
    fn test_placeholder_names_do_not_produce_errors() {
        let input = symbols(&["a"]);
        let mut unmet = UnmetDependencies::new();
        unmet.insert("a".into(), "b".into());
        let filtered = remove_unmet(&input, &unmet);
        assert_eq!(filtered.errors.len(), 1);
        assert!(filtered.symbols.is_empty());
    }
}
