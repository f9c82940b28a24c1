//! Roll data and `@reference` substitution.
//!
//! Formulas may reference values by path, e.g. `1d20 + @mod` or
//! `@damage.dice`. References are substituted textually before parsing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DiceError, DiceResult};

/// A value reachable from a formula reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    /// A number.
    Number(i64),
    /// A formula fragment, inserted verbatim.
    Formula(String),
    /// A nested map of values.
    Map(BTreeMap<String, DataValue>),
}

impl From<i64> for DataValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        Self::Formula(s.to_string())
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        Self::Formula(s)
    }
}

/// Named values available to formula references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollData {
    values: BTreeMap<String, DataValue>,
}

impl RollData {
    /// Empty roll data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`RollData::set`].
    pub fn with(mut self, path: &str, value: impl Into<DataValue>) -> Self {
        self.set(path, value);
        self
    }

    /// Set the value at a dotted path, creating intermediate maps.
    ///
    /// A non-map value in the way of the path is replaced by a map.
    pub fn set(&mut self, path: &str, value: impl Into<DataValue>) {
        let mut parts = path.split('.').peekable();
        let mut map = &mut self.values;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                map.insert(part.to_string(), value.into());
                return;
            }
            let entry = map
                .entry(part.to_string())
                .or_insert_with(|| DataValue::Map(BTreeMap::new()));
            if !matches!(entry, DataValue::Map(_)) {
                *entry = DataValue::Map(BTreeMap::new());
            }
            let DataValue::Map(next) = entry else {
                return;
            };
            map = next;
        }
    }

    /// Look up a dotted path.
    pub fn get(&self, path: &str) -> Option<&DataValue> {
        let mut parts = path.split('.');
        let mut value = self.values.get(parts.next()?)?;
        for part in parts {
            match value {
                DataValue::Map(map) => value = map.get(part)?,
                _ => return None,
            }
        }
        Some(value)
    }

    /// Look up a number at a dotted path.
    pub fn number(&self, path: &str) -> Option<i64> {
        match self.get(path)? {
            DataValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Remove the value at a dotted path.
    pub fn remove(&mut self, path: &str) -> Option<DataValue> {
        match path.rsplit_once('.') {
            None => self.values.remove(path),
            Some((parent, leaf)) => {
                let mut map = &mut self.values;
                for part in parent.split('.') {
                    match map.get_mut(part)? {
                        DataValue::Map(next) => map = next,
                        _ => return None,
                    }
                }
                map.remove(leaf)
            }
        }
    }
}

/// Returns true if `formula` contains a reference to `path` or anything under it.
pub fn references(formula: &str, path: &str) -> bool {
    reference_spans(formula).into_iter().any(|(_, name)| {
        name == path || name.strip_prefix(path).is_some_and(|rest| rest.starts_with('.'))
    })
}

/// Replace every `@path` in `formula` with its value from `data`.
///
/// Numbers are inserted as-is (negative numbers keep their sign). Formula
/// fragments are inserted verbatim. Maps and missing values are errors.
pub fn replace_formula_data(formula: &str, data: &RollData) -> DiceResult<String> {
    let mut out = String::with_capacity(formula.len());
    let mut last = 0;
    for (start, name) in reference_spans(formula) {
        out.push_str(&formula[last..start]);
        match data.get(name) {
            Some(DataValue::Number(n)) => out.push_str(&n.to_string()),
            Some(DataValue::Formula(f)) => out.push_str(f),
            Some(DataValue::Map(_)) | None => {
                return Err(DiceError::UnresolvedReference(name.to_string()));
            }
        }
        last = start + 1 + name.len();
    }
    out.push_str(&formula[last..]);
    Ok(out)
}

/// Byte offset of each `@` and the reference name after it.
fn reference_spans(formula: &str) -> Vec<(usize, &str)> {
    let mut spans = Vec::new();
    for (start, _) in formula.match_indices('@') {
        let rest = &formula[start + 1..];
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
            .unwrap_or(rest.len());
        let name = rest[..len].trim_end_matches('.');
        spans.push((start, name));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> RollData {
        RollData::new()
            .with("mod", 5)
            .with("skill.rank", 2)
            .with("attribute", -1)
            .with("damage.dice", "1d8")
    }

    #[test]
    fn nested_paths() {
        let data = data();
        assert_eq!(data.number("skill.rank"), Some(2));
        assert_eq!(data.get("damage.dice"), Some(&DataValue::Formula("1d8".into())));
        assert!(matches!(data.get("skill"), Some(DataValue::Map(_))));
        assert_eq!(data.get("skill.rank.deeper"), None);
    }

    #[test]
    fn replaces_numbers_and_formulas() {
        let out = replace_formula_data("1d20 + @mod + @attribute", &data()).unwrap();
        assert_eq!(out, "1d20 + 5 + -1");
        assert_eq!(replace_formula_data("@damage.dice", &data()).unwrap(), "1d8");
    }

    #[test]
    fn trailing_dot_is_not_part_of_reference() {
        assert_eq!(replace_formula_data("@mod.", &data()).unwrap(), "5.");
    }

    #[test]
    fn missing_reference_is_an_error() {
        assert_eq!(
            replace_formula_data("1d6 + @damage.total", &data()),
            Err(DiceError::UnresolvedReference("damage.total".into()))
        );
        assert_eq!(
            replace_formula_data("@skill", &data()),
            Err(DiceError::UnresolvedReference("skill".into()))
        );
    }

    #[test]
    fn formula_without_references_is_unchanged() {
        assert_eq!(replace_formula_data("2d6 + 3", &data()).unwrap(), "2d6 + 3");
    }

    #[test]
    fn detects_references_by_prefix() {
        assert!(references("@damage.dice + 2", "damage"));
        assert!(references("@damage", "damage"));
        assert!(!references("@damages", "damage"));
        assert!(!references("1d8", "damage"));
    }

    #[test]
    fn overwrite_scalar_with_map() {
        let mut data = RollData::new().with("damage", 4);
        data.set("damage.dice", "1d6");
        assert_eq!(data.number("damage"), None);
        assert_eq!(data.get("damage.dice"), Some(&DataValue::Formula("1d6".into())));
    }

    #[test]
    fn remove_nested() {
        let mut data = data();
        assert_eq!(data.remove("skill.rank"), Some(DataValue::Number(2)));
        assert_eq!(data.number("skill.rank"), None);
        assert_eq!(data.remove("nope.none"), None);
    }
}
