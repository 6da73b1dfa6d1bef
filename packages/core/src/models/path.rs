//! Value Tree Paths
//!
//! A [`Path`] is the schema lineage of a value node: the root segment names
//! the record's root class, every following segment names the owning class
//! and the property that leads to the node.
//!
//! ```text
//! ISO 19115:MD_Metadata                           (root)
//! ISO 19115:MD_Metadata:contact                   (MD_Metadata.contact)
//! ISO 19115:MD_Metadata:contact:CI_ResponsibleParty:role
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathSegment {
    pub standard: String,
    pub class_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// Path of a record's root node
    pub fn root(standard: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment {
                standard: standard.into(),
                class_name: class_name.into(),
                property: None,
            }],
        }
    }

    /// Path reached from this one through `owner_class.property`
    pub fn child(
        &self,
        owner_standard: impl Into<String>,
        owner_class: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment {
            standard: owner_standard.into(),
            class_name: owner_class.into(),
            property: Some(property.into()),
        });
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Property name of the last step (`None` for the root)
    pub fn property(&self) -> Option<&str> {
        self.segments.last().and_then(|s| s.property.as_deref())
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.len() == 1
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut owner: Option<&str> = None;
        for (i, segment) in self.segments.iter().enumerate() {
            let class_name = segment.class_name.as_str();
            if i == 0 {
                write!(f, "{}:{}", segment.standard, class_name)?;
            } else if owner != Some(class_name) {
                write!(f, ":{}", class_name)?;
            }
            if let Some(property) = &segment.property {
                write!(f, ":{}", property)?;
            }
            owner = Some(class_name);
        }
        Ok(())
    }
}
