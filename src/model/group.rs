use super::{Condition, FieldDefinition};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Arrangement hint for a group's children. Not interpreted by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Vertical,
    Horizontal,
    Inline,
    Grid {
        columns: u32,
    },
}

/// A container of fields and nested groups. Transparent to name flattening.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDefinition {
    pub fields: IndexMap<String, FormNode>,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub collapsible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_when: Option<Condition>,
}

impl GroupDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<String>, field: FieldDefinition) -> Self {
        self.fields.insert(key.into(), FormNode::Field(field));
        self
    }

    pub fn group(mut self, key: impl Into<String>, group: GroupDefinition) -> Self {
        self.fields.insert(key.into(), FormNode::Group(group));
        self
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn collapsible(mut self) -> Self {
        self.collapsible = true;
        self
    }

    pub fn step(mut self, step: u32) -> Self {
        self.step = Some(step);
        self
    }

    pub fn show_when(mut self, condition: Condition) -> Self {
        self.show_when = Some(condition);
        self
    }
}

/// A node of a form definition tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FormNode {
    Field(FieldDefinition),
    Group(GroupDefinition),
}

impl From<FieldDefinition> for FormNode {
    fn from(field: FieldDefinition) -> Self {
        FormNode::Field(field)
    }
}

impl From<GroupDefinition> for FormNode {
    fn from(group: GroupDefinition) -> Self {
        FormNode::Group(group)
    }
}

/// The root of a form: an ordered map of keys to fields and groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormDefinition {
    pub nodes: IndexMap<String, FormNode>,
}

impl FormDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<String>, field: FieldDefinition) -> Self {
        self.nodes.insert(key.into(), FormNode::Field(field));
        self
    }

    pub fn group(mut self, key: impl Into<String>, group: GroupDefinition) -> Self {
        self.nodes.insert(key.into(), FormNode::Group(group));
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<K: Into<String>, N: Into<FormNode>> FromIterator<(K, N)> for FormDefinition {
    fn from_iter<I: IntoIterator<Item = (K, N)>>(iter: I) -> Self {
        Self {
            nodes: iter
                .into_iter()
                .map(|(key, node)| (key.into(), node.into()))
                .collect(),
        }
    }
}
