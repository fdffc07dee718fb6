//! Response field selection.
//!
//! Every read and mutation endpoint accepts a `fields` query parameter. It is
//! either the name of a configured level (`BASIC`, `DEFAULT`, `FULL`) or an
//! explicit field list:
//!
//! ```text
//! entryNumber,quantity,product(code),deliveryPointOfService.name
//! ```
//!
//! Nested fields use parentheses or dots. A field without children keeps its
//! whole subtree. Selections apply to each element of an array, and fields
//! missing from a response are ignored, so one list can serve entry,
//! entry-list and modification responses alike.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Built-in `BASIC` field list.
pub const DEFAULT_BASIC_FIELDS: &str =
    "orderEntries(entryNumber,quantity),entryNumber,quantity,statusCode,quantityAdded";

/// Built-in `DEFAULT` field list.
pub const DEFAULT_DEFAULT_FIELDS: &str = "orderEntries(entryNumber,quantity,product(code),deliveryPointOfService(name)),\
     entryNumber,quantity,product(code),deliveryPointOfService(name),\
     statusCode,quantityAdded,deliveryModeChanged,\
     entry(entryNumber,quantity,product(code),deliveryPointOfService(name))";

/// Built-in `FULL` field list.
pub const DEFAULT_FULL_FIELDS: &str = "orderEntries,entryNumber,quantity,product,deliveryPointOfService,\
     entryGroupNumbers,statusCode,quantityAdded,deliveryModeChanged,entry";

/// Deepest field path a list may select, counting dotted segments and
/// parenthesized levels alike.
pub const MAX_FIELD_DEPTH: usize = 16;

/// Longest field list accepted, in bytes.
pub const MAX_FIELDS_LENGTH: usize = 2048;

/// Errors parsing a field list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldsError {
    #[error("empty field name at position {0}")]
    EmptyName(usize),
    #[error("unbalanced parentheses at position {0}")]
    Unbalanced(usize),
    #[error("field nesting deeper than {max} at position {0}", max = MAX_FIELD_DEPTH)]
    TooDeep(usize),
    #[error("field list longer than {0} bytes")]
    TooLong(usize),
}

/// Query parameters shared by all cart entry endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct FieldsQuery {
    /// Field level or explicit field list.
    pub fields: Option<String>,
}

/// A parsed field selection.
///
/// A node without children selects everything below it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTree {
    children: BTreeMap<String, FieldTree>,
}

impl FieldTree {
    /// Parse a field list.
    ///
    /// # Errors
    ///
    /// Returns `FieldsError` if a name is empty, parentheses are unbalanced,
    /// or the list exceeds `MAX_FIELDS_LENGTH` or `MAX_FIELD_DEPTH`.
    pub fn parse(input: &str) -> Result<Self, FieldsError> {
        if input.len() > MAX_FIELDS_LENGTH {
            return Err(FieldsError::TooLong(MAX_FIELDS_LENGTH));
        }
        let mut parser = Parser {
            chars: input.chars().collect(),
            pos: 0,
        };
        parser.parse_list(0)
    }

    /// Whether this selection keeps every field.
    #[must_use]
    pub fn is_everything(&self) -> bool {
        self.children.is_empty()
    }

    /// Keep only the selected fields of `value`.
    #[must_use]
    pub fn project(&self, value: Value) -> Value {
        if self.is_everything() {
            return value;
        }
        match value {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .filter_map(|(key, value)| {
                        self.children
                            .get(&key)
                            .map(|child| (key, child.project(value)))
                    })
                    .collect(),
            ),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|item| self.project(item)).collect())
            }
            scalar => scalar,
        }
    }

    fn insert(&mut self, path: &str, subtree: Self) {
        let mut node = self;
        let mut segments = path.split('.').map(str::trim).peekable();
        while let Some(segment) = segments.next() {
            let child = node.children.entry(segment.to_string()).or_default();
            if segments.peek().is_none() {
                child.merge(subtree);
                return;
            }
            node = child;
        }
    }

    fn merge(&mut self, other: Self) {
        for (name, subtree) in other.children {
            self.children.entry(name).or_default().merge(subtree);
        }
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    /// Parse a comma separated list whose parent sits at `depth`.
    fn parse_list(&mut self, depth: usize) -> Result<FieldTree, FieldsError> {
        let nested = depth > 0;
        let mut tree = FieldTree::default();
        loop {
            let start = self.pos;
            let name = self.take_name();
            if name.is_empty() || name.split('.').any(|segment| segment.trim().is_empty()) {
                return Err(FieldsError::EmptyName(start));
            }
            let name_depth = depth + name.split('.').count();
            if name_depth > MAX_FIELD_DEPTH {
                return Err(FieldsError::TooDeep(start));
            }

            let subtree = if self.peek() == Some('(') {
                self.pos += 1;
                self.parse_list(name_depth)?
            } else {
                FieldTree::default()
            };
            tree.insert(&name, subtree);

            self.skip_whitespace();
            let at = self.pos;
            match self.bump() {
                Some(',') => {}
                Some(')') if nested => return Ok(tree),
                None if !nested => return Ok(tree),
                _ => return Err(FieldsError::Unbalanced(at)),
            }
        }
    }

    fn take_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, ',' | '(' | ')') {
                break;
            }
            self.pos += 1;
        }
        self.chars[start..self.pos]
            .iter()
            .collect::<String>()
            .trim()
            .to_string()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }
}

/// Configured field levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSets {
    pub basic: FieldTree,
    pub default: FieldTree,
    pub full: FieldTree,
}

impl FieldSets {
    /// Parse the three level lists.
    ///
    /// # Errors
    ///
    /// Returns the first `FieldsError` encountered.
    pub fn from_lists(basic: &str, default: &str, full: &str) -> Result<Self, FieldsError> {
        Ok(Self {
            basic: FieldTree::parse(basic)?,
            default: FieldTree::parse(default)?,
            full: FieldTree::parse(full)?,
        })
    }

    /// The built-in levels.
    ///
    /// The built-in lists always parse. A broken list trips a debug assertion
    /// and selects every field in release builds.
    #[must_use]
    pub fn builtin() -> Self {
        let sets = Self::from_lists(
            DEFAULT_BASIC_FIELDS,
            DEFAULT_DEFAULT_FIELDS,
            DEFAULT_FULL_FIELDS,
        );
        debug_assert!(sets.is_ok(), "built-in field lists must parse: {sets:?}");
        sets.unwrap_or_default()
    }

    /// Resolve a `fields` query value. Absent or blank means `DEFAULT`.
    ///
    /// # Errors
    ///
    /// Returns `FieldsError` if an explicit list cannot be parsed.
    pub fn resolve(&self, fields: Option<&str>) -> Result<Cow<'_, FieldTree>, FieldsError> {
        match fields.map(str::trim) {
            None | Some("" | "DEFAULT") => Ok(Cow::Borrowed(&self.default)),
            Some("BASIC") => Ok(Cow::Borrowed(&self.basic)),
            Some("FULL") => Ok(Cow::Borrowed(&self.full)),
            Some(list) => FieldTree::parse(list).map(Cow::Owned),
        }
    }
}
