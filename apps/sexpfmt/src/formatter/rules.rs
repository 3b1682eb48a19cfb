//! Indentation rule table keyed by the head symbol of a list form.
//!
//! - `block:N`: once the form's body starts on its own line after the first
//!   `N` arguments, body lines get two-space indentation; otherwise the
//!   default list alignment applies.
//! - `inner:D`: lines in the form `D` levels below the keyed form get
//!   two-space indentation. `inner:D:I` restricts this to the `I`th element
//!   at that level.
//!
//! Keys are symbols (`defn`, `clojure.core/defn`) or, prefixed with `re:`,
//! regular expressions matched against the symbol's name.

use crate::error::SetupError;
use regex::Regex;
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentRule {
    Block(usize),
    Inner { depth: usize, index: Option<usize> },
}

impl FromStr for IndentRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').map(str::trim).collect();
        let num = |p: &str| {
            p.parse::<usize>()
                .map_err(|_| format!("`{p}` is not a non-negative integer"))
        };
        match parts.as_slice() {
            ["block", n] => Ok(IndentRule::Block(num(n)?)),
            ["inner", d] => Ok(IndentRule::Inner {
                depth: num(d)?,
                index: None,
            }),
            ["inner", d, i] => Ok(IndentRule::Inner {
                depth: num(d)?,
                index: Some(num(i)?),
            }),
            _ => Err("expected `block:N`, `inner:D` or `inner:D:I`".to_string()),
        }
    }
}

const INNER_0: IndentRule = IndentRule::Inner {
    depth: 0,
    index: None,
};
const INNER_1: IndentRule = IndentRule::Inner {
    depth: 1,
    index: None,
};
const BLOCK_0: IndentRule = IndentRule::Block(0);
const BLOCK_1: IndentRule = IndentRule::Block(1);
const BLOCK_2: IndentRule = IndentRule::Block(2);

const DEFAULT_SYMBOLS: &[(&str, &[IndentRule])] = &[
    ("binding", &[BLOCK_1]),
    ("case", &[BLOCK_1]),
    ("catch", &[BLOCK_2]),
    ("comment", &[BLOCK_0]),
    ("cond", &[BLOCK_0]),
    ("cond->", &[BLOCK_1]),
    ("cond->>", &[BLOCK_1]),
    ("condp", &[BLOCK_2]),
    ("def", &[INNER_0]),
    ("defmacro", &[INNER_0]),
    ("defmethod", &[INNER_0]),
    ("defmulti", &[INNER_0]),
    ("defn", &[INNER_0]),
    ("defn-", &[INNER_0]),
    ("defonce", &[INNER_0]),
    ("defprotocol", &[BLOCK_1, INNER_1]),
    ("defrecord", &[BLOCK_2, INNER_1]),
    ("deftest", &[INNER_0]),
    ("deftype", &[BLOCK_2, INNER_1]),
    ("do", &[BLOCK_0]),
    ("doseq", &[BLOCK_1]),
    ("dotimes", &[BLOCK_1]),
    ("doto", &[BLOCK_1]),
    ("extend", &[BLOCK_1]),
    ("extend-protocol", &[BLOCK_1, INNER_1]),
    ("extend-type", &[BLOCK_1, INNER_1]),
    ("finally", &[BLOCK_0]),
    ("fn", &[INNER_0]),
    ("for", &[BLOCK_1]),
    ("future", &[BLOCK_0]),
    ("if", &[BLOCK_1]),
    ("if-let", &[BLOCK_1]),
    ("if-not", &[BLOCK_1]),
    ("if-some", &[BLOCK_1]),
    ("let", &[BLOCK_1]),
    (
        "letfn",
        &[
            BLOCK_1,
            IndentRule::Inner {
                depth: 2,
                index: Some(0),
            },
        ],
    ),
    ("locking", &[BLOCK_1]),
    ("loop", &[BLOCK_1]),
    ("ns", &[BLOCK_1]),
    ("proxy", &[BLOCK_2, INNER_1]),
    ("reify", &[INNER_0, INNER_1]),
    ("struct-map", &[BLOCK_1]),
    ("testing", &[BLOCK_1]),
    ("try", &[BLOCK_0]),
    ("when", &[BLOCK_1]),
    ("when-first", &[BLOCK_1]),
    ("when-let", &[BLOCK_1]),
    ("when-not", &[BLOCK_1]),
    ("when-some", &[BLOCK_1]),
    ("while", &[BLOCK_1]),
    ("with-local-vars", &[BLOCK_1]),
    ("with-open", &[BLOCK_1]),
    ("with-out-str", &[BLOCK_0]),
    ("with-redefs", &[BLOCK_1]),
];

const DEFAULT_PATTERNS: &[(&str, &[IndentRule])] = &[("^def", &[INNER_0]), ("^with-", &[INNER_0])];

const PATTERN_PREFIX: &str = "re:";

#[derive(Debug, Clone, Default)]
pub struct IndentTable {
    symbols: BTreeMap<String, Vec<IndentRule>>,
    patterns: Vec<(Regex, Vec<IndentRule>)>,
}

impl IndentTable {
    /// The built-in rules for core forms.
    pub fn defaults() -> Self {
        let mut table = IndentTable::default();
        for (sym, rules) in DEFAULT_SYMBOLS {
            table.symbols.insert((*sym).to_string(), rules.to_vec());
        }
        for (pat, rules) in DEFAULT_PATTERNS {
            if let Ok(re) = Regex::new(pat) {
                table.patterns.push((re, rules.to_vec()));
            }
        }
        table
    }

    /// Build a table from config entries only (`[indents]`).
    pub fn from_config(entries: &BTreeMap<String, Vec<String>>) -> Result<Self, SetupError> {
        let mut table = IndentTable::default();
        table.extend_from_config(entries)?;
        Ok(table)
    }

    /// Merge config entries over this table (`[extra-indents]`). An entry
    /// replaces all rules previously registered for the same key.
    pub fn extend_from_config(
        &mut self,
        entries: &BTreeMap<String, Vec<String>>,
    ) -> Result<(), SetupError> {
        for (key, raw_rules) in entries {
            let rules = raw_rules
                .iter()
                .map(|raw| {
                    raw.parse::<IndentRule>()
                        .map_err(|reason| SetupError::IndentRule {
                            key: key.clone(),
                            rule: raw.clone(),
                            reason,
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            self.insert(key, rules)?;
        }
        Ok(())
    }

    pub fn insert(&mut self, key: &str, rules: Vec<IndentRule>) -> Result<(), SetupError> {
        match key.strip_prefix(PATTERN_PREFIX) {
            Some(pat) => {
                let re = Regex::new(pat).map_err(|e| SetupError::IndentRule {
                    key: key.to_string(),
                    rule: pat.to_string(),
                    reason: e.to_string(),
                })?;
                match self.patterns.iter_mut().find(|(r, _)| r.as_str() == pat) {
                    Some(slot) => slot.1 = rules,
                    None => self.patterns.push((re, rules)),
                }
            }
            None => {
                self.symbols.insert(key.to_string(), rules);
            }
        }
        Ok(())
    }

    /// Rules for a head symbol. Lookup order: exact symbol, alias-resolved
    /// qualified symbol, bare name, then the first matching pattern.
    pub fn lookup(&self, symbol: &str, aliases: &BTreeMap<String, String>) -> &[IndentRule] {
        if let Some(rules) = self.symbols.get(symbol) {
            return rules;
        }
        let name = match split_qualified(symbol) {
            Some((ns, name)) => {
                if let Some(full) = aliases.get(ns) {
                    if let Some(rules) = self.symbols.get(&format!("{full}/{name}")) {
                        return rules;
                    }
                }
                if let Some(rules) = self.symbols.get(name) {
                    return rules;
                }
                name
            }
            None => symbol,
        };
        self.patterns
            .iter()
            .find(|(re, _)| re.is_match(name))
            .map(|(_, rules)| rules.as_slice())
            .unwrap_or(&[])
    }
}

fn split_qualified(symbol: &str) -> Option<(&str, &str)> {
    let (ns, name) = symbol.split_once('/')?;
    if ns.is_empty() || name.is_empty() {
        None
    } else {
        Some((ns, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliases(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_rule_strings() {
        assert_eq!("block:1".parse::<IndentRule>(), Ok(IndentRule::Block(1)));
        assert_eq!(
            "inner:2:0".parse::<IndentRule>(),
            Ok(IndentRule::Inner {
                depth: 2,
                index: Some(0)
            })
        );
        assert!("block".parse::<IndentRule>().is_err());
        assert!("inner:x".parse::<IndentRule>().is_err());
    }

    #[test]
    fn test_lookup_order() {
        let mut table = IndentTable::defaults();
        table
            .insert("schema.core/defn", vec![IndentRule::Block(3)])
            .unwrap();
        let none = aliases(&[]);
        let s = aliases(&[("s", "schema.core")]);

        assert_eq!(table.lookup("let", &none), &[IndentRule::Block(1)]);
        // alias resolution wins over the bare name
        assert_eq!(table.lookup("s/defn", &s), &[IndentRule::Block(3)]);
        // unknown alias falls back to the bare name
        assert_eq!(table.lookup("x/let", &none), &[IndentRule::Block(1)]);
        // pattern on the name
        assert_eq!(table.lookup("defwidget", &none), &[INNER_0]);
        assert_eq!(table.lookup("with-db", &none), &[INNER_0]);
        assert!(table.lookup("map", &none).is_empty());
        assert!(table.lookup("/", &none).is_empty());
    }

    #[test]
    fn test_config_entries_replace_and_extend() {
        let mut entries = BTreeMap::new();
        entries.insert("my-macro".to_string(), vec!["block:0".to_string()]);
        entries.insert("re:^go-".to_string(), vec!["inner:0".to_string()]);
        let table = IndentTable::from_config(&entries).unwrap();
        assert!(table.lookup("let", &BTreeMap::new()).is_empty());
        assert_eq!(table.lookup("go-loop", &BTreeMap::new()), &[INNER_0]);

        let mut table = IndentTable::defaults();
        table.extend_from_config(&entries).unwrap();
        assert_eq!(table.lookup("let", &BTreeMap::new()), &[BLOCK_1]);
        assert_eq!(table.lookup("my-macro", &BTreeMap::new()), &[BLOCK_0]);
    }

    #[test]
    fn test_bad_config_entry_is_setup_error() {
        let mut entries = BTreeMap::new();
        entries.insert("x".to_string(), vec!["sideways:1".to_string()]);
        let err = IndentTable::from_config(&entries).unwrap_err();
        assert!(matches!(err, SetupError::IndentRule { ref key, .. } if key == "x"));
    }
}
