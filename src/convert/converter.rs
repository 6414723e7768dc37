use anyhow::Result;
use serde_json::{Map, Value};

use super::hcl::{self, ProviderBlock};
use super::schema::{AllowList, SchemaSelector, Variant};
use super::state::StateInstance;

/// One output field: a plain attribute or a list of nested blocks
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Attribute(Value),
    Blocks(Vec<Record>),
}

/// Filtered attributes of one resource, in allow-list order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn push(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.push((key.into(), value));
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A resource stanza ready to render
#[derive(Debug, Clone, PartialEq)]
pub struct Stanza {
    pub resource_type: String,
    pub name: String,
    pub record: Record,
}

/// Everything that goes into one declaration file
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub provider: ProviderBlock,
    pub stanzas: Vec<Stanza>,
}

impl Document {
    pub fn render(&self) -> String {
        let mut out = hcl::render_provider(&self.provider);

        for stanza in &self.stanzas {
            out.push('\n');
            out.push_str(&hcl::render_resource(
                &stanza.resource_type,
                &stanza.name,
                &stanza.record,
            ));
        }

        out
    }
}

/// Rewrite captured state into one declaration file of the given variant
pub fn convert(
    instances: &[StateInstance],
    selector: &SchemaSelector,
    variant: Variant,
    provider: ProviderBlock,
) -> Result<String> {
    Ok(build_document(instances, selector, variant, provider)?.render())
}

/// Build the stanzas for every instance, grouped by type in first-seen order
///
/// Fails with `ConvertError::SchemaMismatch` when an instance type has no
/// allow-list for `variant`.
pub fn build_document(
    instances: &[StateInstance],
    selector: &SchemaSelector,
    variant: Variant,
    provider: ProviderBlock,
) -> Result<Document> {
    let mut groups: Vec<(&str, Vec<&StateInstance>)> = Vec::new();

    for instance in instances {
        match groups
            .iter_mut()
            .find(|(resource_type, _)| *resource_type == instance.resource_type)
        {
            Some((_, members)) => members.push(instance),
            None => groups.push((instance.resource_type.as_str(), vec![instance])),
        }
    }

    let mut stanzas = Vec::with_capacity(instances.len());

    for (resource_type, members) in groups {
        let allow_list = selector.resolve(resource_type, variant)?;

        for instance in members {
            stanzas.push(Stanza {
                resource_type: instance.resource_type.clone(),
                name: instance.name.clone(),
                record: filter_record(&instance.attributes, allow_list),
            });
        }
    }

    Ok(Document { provider, stanzas })
}

/// Copy only allow-listed, populated fields
pub fn filter_record(attributes: &Map<String, Value>, allow_list: &AllowList) -> Record {
    let mut record = Record::default();

    for field in allow_list.fields() {
        let Some(value) = attributes.get(&field.key) else {
            continue;
        };

        if is_empty(value) {
            continue;
        }

        let output = match &field.nested {
            Some(nested) => match filter_blocks(value, nested) {
                Some(blocks) => FieldValue::Blocks(blocks),
                None => continue,
            },
            None => FieldValue::Attribute(value.clone()),
        };

        record.push(field.output_key(), output);
    }

    record
}

/// Filter a block-typed value, keeping element order and count
///
/// State stores blocks as lists of objects; a bare object is treated as a
/// single block. Non-object elements do not fit a block and are skipped.
fn filter_blocks(value: &Value, allow_list: &AllowList) -> Option<Vec<Record>> {
    let blocks: Vec<Record> = match value {
        Value::Array(elements) => elements
            .iter()
            .filter_map(Value::as_object)
            .map(|element| filter_record(element, allow_list))
            .collect(),
        Value::Object(element) => vec![filter_record(element, allow_list)],
        _ => Vec::new(),
    };

    if blocks.is_empty() { None } else { Some(blocks) }
}

/// Absent-equivalent values: null, empty string, empty list, empty object
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
