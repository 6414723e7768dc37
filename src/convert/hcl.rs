//! Declaration file rendering
//!
//! Emits `provider` and `resource` stanzas in the IaC tool's block syntax.
//! Object-valued record fields become nested blocks, everything else is an
//! `key = value` attribute.

use serde_json::Value;

use super::converter::{FieldValue, Record};

const INDENT: &str = "  ";

/// A `provider "<name>" { ... }` stanza
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderBlock {
    pub name: String,
    pub params: Vec<(String, Value)>,
}

impl ProviderBlock {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Attach provider parameters, sorted by key for consistent output
    pub fn with_params<I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.params = params.into_iter().collect();
        self.params.sort_by(|(a, _), (b, _)| a.cmp(b));
        self
    }
}

pub fn render_provider(provider: &ProviderBlock) -> String {
    if provider.params.is_empty() {
        return format!("provider \"{}\" {{}}\n", escape_hcl_string(&provider.name));
    }

    let mut hcl = format!("provider \"{}\" {{\n", escape_hcl_string(&provider.name));
    for (key, value) in &provider.params {
        hcl.push_str(INDENT);
        hcl.push_str(&format_hcl_parameter(key, value));
        hcl.push('\n');
    }
    hcl.push_str("}\n");
    hcl
}

/// Placeholder stanza the IaC tool fills in during import
pub fn render_empty_resource(resource_type: &str, name: &str) -> String {
    format!(
        "resource \"{}\" \"{}\" {{}}\n",
        escape_hcl_string(resource_type),
        escape_hcl_string(name)
    )
}

pub fn render_resource(resource_type: &str, name: &str, record: &Record) -> String {
    if record.is_empty() {
        return render_empty_resource(resource_type, name);
    }

    let mut hcl = format!(
        "resource \"{}\" \"{}\" {{\n",
        escape_hcl_string(resource_type),
        escape_hcl_string(name)
    );
    render_body(&mut hcl, record, 1);
    hcl.push_str("}\n");
    hcl
}

fn render_body(hcl: &mut String, record: &Record, depth: usize) {
    let indent = INDENT.repeat(depth);

    for (key, value) in record.fields() {
        match value {
            FieldValue::Attribute(v) => {
                hcl.push_str(&indent);
                hcl.push_str(&format_hcl_parameter(key, v));
                hcl.push('\n');
            }
            FieldValue::Blocks(blocks) => {
                for block in blocks {
                    if block.is_empty() {
                        hcl.push_str(&format!("{}{} {{}}\n", indent, key));
                        continue;
                    }

                    hcl.push_str(&format!("{}{} {{\n", indent, key));
                    render_body(hcl, block, depth + 1);
                    hcl.push_str(&format!("{}}}\n", indent));
                }
            }
        }
    }
}

/// Format a single HCL attribute based on its value type
fn format_hcl_parameter(key: &str, value: &Value) -> String {
    format!("{} = {}", format_hcl_key(key), format_hcl_value(value))
}

/// Format a value for HCL
fn format_hcl_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", escape_hcl_string(s)),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_hcl_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(obj) => {
            let items: Vec<String> = obj
                .iter()
                .map(|(k, v)| format!("{} = {}", format_hcl_key(k), format_hcl_value(v)))
                .collect();
            format!("{{ {} }}", items.join(", "))
        }
        Value::Null => "null".to_string(),
    }
}

/// Bare identifier when possible, quoted otherwise
fn format_hcl_key(key: &str) -> String {
    let is_identifier = key
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if is_identifier {
        key.to_string()
    } else {
        format!("\"{}\"", escape_hcl_string(key))
    }
}

/// Escape special characters in HCL strings, including template sequences
fn escape_hcl_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .replace("${", "$${")
        .replace("%{", "%%{")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_provider_with_params() {
        let provider = ProviderBlock::new("onelogin").with_params(vec![
            ("url".to_string(), json!("https://api.eu.onelogin.com")),
            ("client_id".to_string(), json!("abc")),
        ]);

        assert_eq!(
            render_provider(&provider),
            "provider \"onelogin\" {\n  client_id = \"abc\"\n  url = \"https://api.eu.onelogin.com\"\n}\n"
        );
    }

    #[test]
    fn test_render_resource_nested_blocks() {
        let mut condition = Record::default();
        condition.push("source", FieldValue::Attribute(json!("has_role")));
        condition.push("value", FieldValue::Attribute(json!("admin")));

        let mut rule = Record::default();
        rule.push("name", FieldValue::Attribute(json!("admins")));
        rule.push("conditions", FieldValue::Blocks(vec![condition]));

        let mut record = Record::default();
        record.push("name", FieldValue::Attribute(json!("My \"App\"")));
        record.push("visible", FieldValue::Attribute(json!(false)));
        record.push("provisioning", FieldValue::Blocks(vec![Record::default()]));
        record.push("rules", FieldValue::Blocks(vec![rule]));

        let hcl = render_resource("onelogin_apps", "my_app-1", &record);

        assert_eq!(
            hcl,
            "resource \"onelogin_apps\" \"my_app-1\" {\n\
             \x20 name = \"My \\\"App\\\"\"\n\
             \x20 visible = false\n\
             \x20 provisioning {}\n\
             \x20 rules {\n\
             \x20   name = \"admins\"\n\
             \x20   conditions {\n\
             \x20     source = \"has_role\"\n\
             \x20     value = \"admin\"\n\
             \x20   }\n\
             \x20 }\n\
             }\n"
        );
    }

    #[test]
    fn test_format_hcl_value_lists_and_maps() {
        assert_eq!(format_hcl_value(&json!(["a", 1, true])), "[\"a\", 1, true]");
        assert_eq!(
            format_hcl_value(&json!({"plain": 1, "needs quote": "x"})),
            "{ \"needs quote\" = \"x\", plain = 1 }"
        );
    }

    #[test]
    fn test_escape_hcl_string() {
        assert_eq!(escape_hcl_string("simple"), "simple");
        assert_eq!(escape_hcl_string("with\"quotes"), "with\\\"quotes");
        assert_eq!(escape_hcl_string("with\\backslash"), "with\\\\backslash");
        assert_eq!(escape_hcl_string("with\nnewline"), "with\\nnewline");
        assert_eq!(escape_hcl_string("${user.email}"), "$${user.email}");
        assert_eq!(escape_hcl_string("%{if}"), "%%{if}");
    }
}
