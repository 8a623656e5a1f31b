use crate::utils::error::RecordError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// 查找用的 join key 欄位
pub const JOIN_KEY_FIELD: &str = "recipientAccountId";
/// 補上的欄位
pub const LOOKUP_FIELD: &str = "lookup_target_pipeline";
pub const DEFAULT_PIPELINE: &str = "default_gis";

/// 一筆稽核記錄。欄位不固定，除了 join key 之外全部原樣保留。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditRecord {
    pub data: Map<String, Value>,
}

impl AuditRecord {
    /// 解析單行 NDJSON；空白行與非 object 的 JSON 都視為解碼失敗
    pub fn from_line(line: &[u8]) -> std::result::Result<Self, RecordError> {
        match serde_json::from_slice::<Value>(line).map_err(RecordError::Decode)? {
            Value::Object(data) => Ok(Self { data }),
            other => Err(RecordError::NotAnObject(json_kind(&other))),
        }
    }

    /// 只有非空字串才算有 key，其餘一律視為沒有
    pub fn join_key(&self) -> Option<&str> {
        match self.data.get(JOIN_KEY_FIELD) {
            Some(Value::String(key)) if !key.is_empty() => Some(key.as_str()),
            _ => None,
        }
    }

    pub fn set_lookup_target_pipeline(&mut self, pipeline: &str) {
        self.data
            .insert(LOOKUP_FIELD.to_string(), Value::String(pipeline.to_string()));
    }

    pub fn lookup_target_pipeline(&self) -> Option<&str> {
        self.data.get(LOOKUP_FIELD).and_then(Value::as_str)
    }

    /// 序列化成一行（含換行）並覆寫 `buf`
    pub fn write_line(&self, buf: &mut Vec<u8>) -> std::result::Result<(), RecordError> {
        buf.clear();
        serde_json::to_writer(&mut *buf, &self.data).map_err(RecordError::Encode)?;
        buf.push(b'\n');
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingEntry {
    pub account_name: String,
    pub business_unit: String,
    pub segment: String,
    pub target_pipeline: String,
}

/// 帳號 ID → 路由資訊。載入後唯讀。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RoutingTable {
    entries: HashMap<String, RoutingEntry>,
}

impl RoutingTable {
    pub fn new(entries: HashMap<String, RoutingEntry>) -> Self {
        Self { entries }
    }

    pub fn get(&self, account_id: &str) -> Option<&RoutingEntry> {
        self.entries.get(account_id)
    }

    /// 找不到或沒有 key 都回傳預設 pipeline
    pub fn resolve(&self, join_key: Option<&str>) -> Lookup<'_> {
        match join_key.and_then(|key| self.entries.get(key)) {
            Some(entry) => Lookup::Matched(entry),
            None => Lookup::Default,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 排序過的帳號 ID，讓固定 seed 的產生器結果可重現
    pub fn account_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Matched(&'a RoutingEntry),
    Default,
}

impl<'a> Lookup<'a> {
    pub fn target_pipeline(&self) -> &'a str {
        match *self {
            Lookup::Matched(entry) => &entry.target_pipeline,
            Lookup::Default => DEFAULT_PIPELINE,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Lookup::Matched(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> RoutingTable {
        let mut entries = HashMap::new();
        entries.insert(
            "111111111111".to_string(),
            RoutingEntry {
                target_pipeline: "pipeline-a".to_string(),
                ..Default::default()
            },
        );
        RoutingTable::new(entries)
    }

    #[test]
    fn test_join_key_requires_non_empty_string() {
        let cases = vec![
            (json!({"recipientAccountId": "111111111111"}), Some("111111111111")),
            (json!({"recipientAccountId": ""}), None),
            (json!({"recipientAccountId": 111111111111u64}), None),
            (json!({"recipientAccountId": null}), None),
            (json!({"recipientAccountId": ["111111111111"]}), None),
            (json!({}), None),
        ];

        for (value, expected) in cases {
            let record = AuditRecord::from_line(value.to_string().as_bytes()).unwrap();
            assert_eq!(record.join_key(), expected, "record: {}", value);
        }
    }

    #[test]
    fn test_from_line_rejects_non_objects() {
        for line in ["[1,2]", "42", "\"text\"", "null"] {
            let err = AuditRecord::from_line(line.as_bytes()).unwrap_err();
            assert!(matches!(err, RecordError::NotAnObject(_)), "line: {}", line);
        }
        assert!(matches!(
            AuditRecord::from_line(b"{\"a\":"),
            Err(RecordError::Decode(_))
        ));
        assert!(matches!(
            AuditRecord::from_line(b""),
            Err(RecordError::Decode(_))
        ));
    }

    #[test]
    fn test_resolve_merges_absent_and_unknown_keys() {
        let table = table();
        assert_eq!(
            table.resolve(Some("111111111111")).target_pipeline(),
            "pipeline-a"
        );
        assert_eq!(table.resolve(Some("222222222222")), Lookup::Default);
        assert_eq!(table.resolve(None), Lookup::Default);
        assert_eq!(Lookup::Default.target_pipeline(), DEFAULT_PIPELINE);
    }

    #[test]
    fn test_write_line_keeps_field_order_and_appends_lookup() {
        let mut record =
            AuditRecord::from_line(br#"{"b":1,"a":{"z":true,"y":[{"k":"v"}]},"recipientAccountId":"x"}"#)
                .unwrap();
        record.set_lookup_target_pipeline("default_gis");

        let mut buf = Vec::new();
        record.write_line(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "{\"b\":1,\"a\":{\"z\":true,\"y\":[{\"k\":\"v\"}]},\"recipientAccountId\":\"x\",\"lookup_target_pipeline\":\"default_gis\"}\n"
        );
    }

    #[test]
    fn test_set_lookup_overwrites_existing_value() {
        let mut record =
            AuditRecord::from_line(br#"{"lookup_target_pipeline":"stale","x":1}"#).unwrap();
        record.set_lookup_target_pipeline("pipeline-a");
        assert_eq!(record.lookup_target_pipeline(), Some("pipeline-a"));
        assert_eq!(record.data.len(), 2);
    }

    #[test]
    fn test_routing_entry_missing_fields_default_to_empty() {
        let entry: RoutingEntry = serde_json::from_str(r#"{"target_pipeline":"p"}"#).unwrap();
        assert_eq!(entry.target_pipeline, "p");
        assert_eq!(entry.account_name, "");
    }

    #[test]
    fn test_account_ids_are_sorted() {
        let mut entries = HashMap::new();
        for id in ["3", "1", "2"] {
            entries.insert(id.to_string(), RoutingEntry::default());
        }
        assert_eq!(RoutingTable::new(entries).account_ids(), vec!["1", "2", "3"]);
    }
}
