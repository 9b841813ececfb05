use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const MCP_SERVERS_KEY: &str = "mcpServers";

const MASK: &str = "***";
const BEARER_PREFIX: &str = "Authorization: Bearer ";

/// Claude Desktop が MCP サーバーを起動する方法
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerEntry {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
    /// インストーラーが扱わないフィールド（そのまま保持）
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServerEntry {
    /// トークンを `***` に置き換えたコピー（表示用）
    pub fn redacted(&self) -> Self {
        let args = self.args.as_ref().map(|args| {
            args.iter()
                .map(|arg| {
                    if arg.starts_with(BEARER_PREFIX) {
                        format!("{}{}", BEARER_PREFIX, MASK)
                    } else {
                        arg.clone()
                    }
                })
                .collect()
        });
        let env = self.env.as_ref().map(|env| {
            env.iter()
                .map(|(key, value)| {
                    if key.to_ascii_uppercase().contains("TOKEN") {
                        (key.clone(), MASK.to_string())
                    } else {
                        (key.clone(), value.clone())
                    }
                })
                .collect()
        });
        Self {
            command: self.command.clone(),
            args,
            env,
            extra: self.extra.clone(),
        }
    }
}

/// claude_desktop_config.json 全体
///
/// 順序付き JSON マップとして保持する。インストーラーが扱わないキー
/// （他のサーバー、`theme` など）は位置も含めてそのまま書き戻す。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaudeConfig {
    document: Map<String, Value>,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        let mut document = Map::new();
        document.insert(MCP_SERVERS_KEY.to_string(), Value::Object(Map::new()));
        Self { document }
    }
}

impl ClaudeConfig {
    pub fn from_document(document: Map<String, Value>) -> Self {
        Self { document }
    }

    fn servers(&self) -> Option<&Map<String, Value>> {
        self.document.get(MCP_SERVERS_KEY)?.as_object()
    }

    pub fn contains_server(&self, name: &str) -> bool {
        self.servers()
            .and_then(|servers| servers.get(name))
            .is_some_and(|value| !value.is_null())
    }

    /// 未登録なら `None`、エントリとして読めなければ `Some(Err)`
    pub fn server_entry(&self, name: &str) -> Option<Result<ServerEntry, serde_json::Error>> {
        let value = self.servers()?.get(name)?;
        if value.is_null() {
            return None;
        }
        Some(ServerEntry::deserialize(value))
    }

    pub fn set_server(&mut self, name: &str, entry: &ServerEntry) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(entry)?;
        let mut servers = match self.document.get_mut(MCP_SERVERS_KEY).map(Value::take) {
            Some(Value::Object(servers)) => servers,
            Some(Value::Null) | None => Map::new(),
            Some(other) => {
                tracing::warn!(found = %other, "mcpServers is not an object, replacing it");
                Map::new()
            }
        };
        servers.insert(name.to_string(), value);
        self.document
            .insert(MCP_SERVERS_KEY.to_string(), Value::Object(servers));
        Ok(())
    }

    /// 削除したかどうかを返す
    pub fn remove_server(&mut self, name: &str) -> bool {
        self.document
            .get_mut(MCP_SERVERS_KEY)
            .and_then(Value::as_object_mut)
            .and_then(|servers| servers.shift_remove(name))
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> ClaudeConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn default_has_empty_servers() {
        let value = serde_json::to_value(ClaudeConfig::default()).unwrap();
        assert_eq!(value, json!({ "mcpServers": {} }));
    }

    #[test]
    fn set_server_keeps_siblings_and_order() {
        let mut cfg = config(json!({
            "theme": "dark",
            "mcpServers": { "other": { "command": "other-cmd", "disabled": true } },
            "globalShortcut": "Ctrl+Space"
        }));
        let entry = ServerEntry {
            command: "npx".to_string(),
            args: Some(vec!["demo".to_string()]),
            env: None,
            extra: Map::new(),
        };
        cfg.set_server("Demo", &entry).unwrap();

        let value = serde_json::to_value(&cfg).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["theme", "mcpServers", "globalShortcut"]);
        assert_eq!(
            value["mcpServers"]["other"],
            json!({ "command": "other-cmd", "disabled": true })
        );
        assert_eq!(value["mcpServers"]["Demo"], json!({ "command": "npx", "args": ["demo"] }));
    }

    #[test]
    fn set_server_replaces_non_object_servers() {
        let mut cfg = config(json!({ "mcpServers": [1, 2] }));
        let entry = ServerEntry {
            command: "node".to_string(),
            args: None,
            env: None,
            extra: Map::new(),
        };
        cfg.set_server("Demo", &entry).unwrap();
        assert!(cfg.contains_server("Demo"));
    }

    #[test]
    fn missing_servers_key_is_empty() {
        let mut cfg = config(json!({ "theme": "light" }));
        assert!(!cfg.contains_server("Demo"));
        assert!(cfg.server_entry("Demo").is_none());
        assert!(!cfg.remove_server("Demo"));
        assert_eq!(serde_json::to_value(&cfg).unwrap(), json!({ "theme": "light" }));
    }

    #[test]
    fn remove_server_keeps_others() {
        let mut cfg = config(json!({
            "mcpServers": { "a": { "command": "a" }, "Demo": { "command": "b" }, "c": { "command": "c" } }
        }));
        assert!(cfg.remove_server("Demo"));
        let names: Vec<&String> = cfg.servers().unwrap().keys().collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn unreadable_entry_is_reported() {
        let cfg = config(json!({ "mcpServers": { "Demo": { "args": 3 } } }));
        assert!(cfg.contains_server("Demo"));
        assert!(matches!(cfg.server_entry("Demo"), Some(Err(_))));
    }

    #[test]
    fn redacted_masks_tokens() {
        let entry = ServerEntry {
            command: "npx".to_string(),
            args: Some(vec![
                "mcp-remote".to_string(),
                "--header".to_string(),
                "Authorization: Bearer secret".to_string(),
            ]),
            env: Some(BTreeMap::from([
                ("BEARER_TOKEN".to_string(), "secret".to_string()),
                ("LOG_LEVEL".to_string(), "debug".to_string()),
            ])),
            extra: Map::new(),
        };
        let redacted = entry.redacted();
        let args = redacted.args.unwrap();
        assert_eq!(args[2], "Authorization: Bearer ***");
        let env = redacted.env.unwrap();
        assert_eq!(env["BEARER_TOKEN"], "***");
        assert_eq!(env["LOG_LEVEL"], "debug");
    }
}
