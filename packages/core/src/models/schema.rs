//! Schema Definitions
//!
//! Schema classes describe the generic side of the mapping: every value node
//! is tagged with the [`ClassKey`] of a [`SchemaClass`], and the mapper walks
//! a class's declared properties (including inherited ones) when writing.
//!
//! ## Class Kinds
//!
//! - **Primitive**: literal leaves (`CharacterString`, `Date`, `Real`...)
//! - **Code list**: literal leaves holding an integer code, resolved
//!   against the class's [`CodeListEntry`] table
//! - **Composite**: classes with declared properties and an optional
//!   superclass
//!
//! ## Example Class
//!
//! ```json
//! {
//!   "name": "CI_ResponsibleParty",
//!   "standard": "ISO 19115",
//!   "isPrimitive": false,
//!   "isCodelist": false,
//!   "properties": [
//!     { "name": "individualName",
//!       "typeClass": { "standard": "ISO 19103", "name": "CharacterString" },
//!       "minOccurs": 0, "maxOccurs": 1 },
//!     { "name": "role",
//!       "typeClass": { "standard": "ISO 19115", "name": "CI_RoleCode" },
//!       "minOccurs": 1, "maxOccurs": 1 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// `(standard, class name)` identity of a schema class
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassKey {
    pub standard: String,
    pub name: String,
}

impl ClassKey {
    pub fn new(standard: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            standard: standard.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ClassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.standard, self.name)
    }
}

/// A named schema dialect
///
/// `compatible_standards` is the ordered list probed on the write side when
/// this standard is the main standard of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standard {
    pub name: String,
    pub compatible_standards: Vec<String>,
}

/// Member of a code list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeListEntry {
    pub name: String,
    pub code: i32,
}

/// A property declared by a composite class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaProperty {
    pub name: String,
    pub type_class: ClassKey,
    #[serde(default)]
    pub min_occurs: u32,
    /// `None` means unbounded
    #[serde(default)]
    pub max_occurs: Option<u32>,
}

impl SchemaProperty {
    pub fn is_multi_valued(&self) -> bool {
        self.max_occurs.map_or(true, |max| max > 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaClass {
    pub name: String,
    pub standard: String,
    #[serde(default)]
    pub is_primitive: bool,
    #[serde(default)]
    pub is_codelist: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<ClassKey>,
    #[serde(default)]
    pub properties: Vec<SchemaProperty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub codelist: Vec<CodeListEntry>,
}

impl SchemaClass {
    pub fn composite(standard: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            standard: standard.to_string(),
            is_primitive: false,
            is_codelist: false,
            superclass: None,
            properties: Vec::new(),
            codelist: Vec::new(),
        }
    }

    pub fn primitive(standard: &str, name: &str) -> Self {
        Self {
            is_primitive: true,
            ..Self::composite(standard, name)
        }
    }

    /// Code list class; entries are numbered from 1 in declaration order
    pub fn code_list(standard: &str, name: &str, members: &[&str]) -> Self {
        Self {
            is_codelist: true,
            codelist: members
                .iter()
                .enumerate()
                .map(|(i, member)| CodeListEntry {
                    name: member.to_string(),
                    code: i as i32 + 1,
                })
                .collect(),
            ..Self::composite(standard, name)
        }
    }

    pub fn extends(mut self, standard: &str, name: &str) -> Self {
        self.superclass = Some(ClassKey::new(standard, name));
        self
    }

    /// Declare an optional single-valued property
    pub fn property(self, name: &str, type_standard: &str, type_name: &str) -> Self {
        self.property_with(name, type_standard, type_name, 0, Some(1))
    }

    /// Declare an optional unbounded property
    pub fn many(self, name: &str, type_standard: &str, type_name: &str) -> Self {
        self.property_with(name, type_standard, type_name, 0, None)
    }

    pub fn property_with(
        mut self,
        name: &str,
        type_standard: &str,
        type_name: &str,
        min_occurs: u32,
        max_occurs: Option<u32>,
    ) -> Self {
        self.properties.push(SchemaProperty {
            name: name.to_string(),
            type_class: ClassKey::new(type_standard, type_name),
            min_occurs,
            max_occurs,
        });
        self
    }

    pub fn key(&self) -> ClassKey {
        ClassKey::new(&self.standard, &self.name)
    }

    pub fn code_for(&self, code: i32) -> Option<&CodeListEntry> {
        self.codelist.iter().find(|entry| entry.code == code)
    }

    /// Exact member lookup, then a case-insensitive match on the short name
    ///
    /// Short names drop any `List.` qualifier (`CI_RoleCode.author` → `author`).
    pub fn entry_named(&self, name: &str) -> Option<&CodeListEntry> {
        if let Some(entry) = self.codelist.iter().find(|entry| entry.name == name) {
            return Some(entry);
        }
        let short = name.rsplit('.').next().unwrap_or(name);
        self.codelist
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(short))
    }
}

impl Standard {
    pub fn new(name: &str, compatible_standards: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            compatible_standards: compatible_standards.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// All standards and schema classes known to the mapper
#[derive(Debug, Clone, Default)]
pub struct SchemaRepository {
    standards: HashMap<String, Standard>,
    classes: HashMap<ClassKey, Arc<SchemaClass>>,
}

impl SchemaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: SchemaClass) {
        self.classes.insert(class.key(), Arc::new(class));
    }

    pub fn insert_standard(&mut self, standard: Standard) {
        self.standards.insert(standard.name.clone(), standard);
    }

    pub fn standard(&self, name: &str) -> Option<&Standard> {
        self.standards.get(name)
    }

    pub fn standards(&self) -> impl Iterator<Item = &Standard> {
        self.standards.values()
    }

    /// True if classes of `other` may be used by records of `main`
    pub fn is_compatible(&self, main: &str, other: &str) -> bool {
        main == other
            || self
                .standard(main)
                .map_or(false, |s| s.compatible_standards.iter().any(|c| c == other))
    }

    /// Merge classes from a JSON array of [`SchemaClass`] definitions
    pub fn extend_from_json(&mut self, json: &str) -> Result<usize, serde_json::Error> {
        let classes: Vec<SchemaClass> = serde_json::from_str(json)?;
        let count = classes.len();
        for class in classes {
            self.insert(class);
        }
        Ok(count)
    }

    pub fn get(&self, key: &ClassKey) -> Option<Arc<SchemaClass>> {
        self.classes.get(key).cloned()
    }

    pub fn class(&self, standard: &str, name: &str) -> Option<Arc<SchemaClass>> {
        self.get(&ClassKey::new(standard, name))
    }

    /// First class named `name` in the given standards, in order
    pub fn find_in_standards<S: AsRef<str>>(
        &self,
        name: &str,
        standards: &[S],
    ) -> Option<Arc<SchemaClass>> {
        standards
            .iter()
            .find_map(|standard| self.class(standard.as_ref(), name))
    }

    /// Any code list class with this name, whatever its standard
    pub fn find_code_list(&self, name: &str) -> Option<Arc<SchemaClass>> {
        self.classes
            .values()
            .find(|class| class.is_codelist && class.name == name)
            .cloned()
    }

    /// Declared properties of `class` and its superclasses, root-most first
    ///
    /// Each property is paired with the class that declares it.
    pub fn all_properties(
        &self,
        class: &Arc<SchemaClass>,
    ) -> Vec<(Arc<SchemaClass>, SchemaProperty)> {
        let mut chain = vec![class.clone()];
        let mut visited: HashSet<ClassKey> = HashSet::from([class.key()]);
        let mut current = class.clone();
        while let Some(parent_key) = current.superclass.clone() {
            if !visited.insert(parent_key.clone()) {
                tracing::warn!("Superclass cycle at {} while walking {}", parent_key, class.key());
                break;
            }
            match self.get(&parent_key) {
                Some(parent) => {
                    chain.push(parent.clone());
                    current = parent;
                }
                None => {
                    tracing::warn!("Unknown superclass {} of {}", parent_key, current.key());
                    break;
                }
            }
        }

        chain
            .iter()
            .rev()
            .flat_map(|owner| {
                owner
                    .properties
                    .iter()
                    .map(move |property| (owner.clone(), property.clone()))
            })
            .collect()
    }

    /// True if `class` is `ancestor` or inherits from it
    pub fn is_subclass_of(&self, class: &ClassKey, ancestor: &ClassKey) -> bool {
        let mut visited = HashSet::new();
        let mut current = Some(class.clone());
        while let Some(key) = current {
            if &key == ancestor {
                return true;
            }
            if !visited.insert(key.clone()) {
                return false;
            }
            current = self.get(&key).and_then(|c| c.superclass.clone());
        }
        false
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
