//! 宽松反序列化工具
//!
//! 后端对数值字段的编码不一致（`12` / `"12"` / `"1500.00"`），
//! 布尔字段也可能是 `0/1`。以下函数用于 `#[serde(deserialize_with = ...)]`。

use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// 必填 ID：数字或数字字符串
pub fn id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_i64(&value).ok_or_else(|| D::Error::custom(format!("invalid id: {}", value)))
}

/// 可选 ID：null、空串或无法解析时为 `None`
pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_i64))
}

/// 金额：数字或十进制字符串，无法解析时为 0
pub fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_f64).unwrap_or(0.0))
}

pub fn optional_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_f64))
}

/// 布尔强制转换：`true/false`、非零数字、`"true"`/`"1"`；其余为 false
pub fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => matches!(s.trim(), "true" | "1"),
        _ => false,
    })
}

/// null 视为空字符串，数字转为字符串
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

/// 解析失败时返回 `None` 而不是报错
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// 列表：非数组视为空列表，无法解析的元素被跳过
pub fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(decode_list(value.unwrap_or(Value::Null)).0)
}

/// 将任意 JSON 解码为列表
///
/// 返回解码成功的元素与被跳过的元素数量。非数组输入得到空列表。
pub fn decode_list<T: DeserializeOwned>(value: Value) -> (Vec<T>, usize) {
    let Value::Array(items) = value else {
        return (Vec::new(), 0);
    };
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    let skipped = total - decoded.len();
    (decoded, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "id")]
        id: i64,
        #[serde(default, deserialize_with = "optional_id")]
        group_id: Option<i64>,
        #[serde(default, deserialize_with = "amount")]
        balance: f64,
        #[serde(default, deserialize_with = "truthy")]
        active: bool,
        #[serde(default, deserialize_with = "string")]
        note: String,
    }

    #[test]
    fn accepts_mixed_encodings() {
        let s: Sample = serde_json::from_value(json!({
            "id": "15",
            "group_id": 3.0,
            "balance": "1500.50",
            "active": 1,
            "note": null
        }))
        .unwrap();
        assert_eq!(s.id, 15);
        assert_eq!(s.group_id, Some(3));
        assert_eq!(s.balance, 1500.5);
        assert!(s.active);
        assert_eq!(s.note, "");
    }

    #[test]
    fn missing_optionals_use_defaults() {
        let s: Sample = serde_json::from_value(json!({ "id": 1 })).unwrap();
        assert_eq!(s.group_id, None);
        assert_eq!(s.balance, 0.0);
        assert!(!s.active);
    }

    #[test]
    fn invalid_required_id_is_an_error() {
        assert!(serde_json::from_value::<Sample>(json!({ "id": "abc" })).is_err());
        assert!(serde_json::from_value::<Sample>(json!({ "id": 1.5 })).is_err());
    }

    #[test]
    fn list_decoding_skips_bad_items() {
        let (ok, skipped): (Vec<Sample>, usize) =
            decode_list(json!([{ "id": 1 }, { "id": "bad" }, { "id": 3 }]));
        assert_eq!(ok.len(), 2);
        assert_eq!(skipped, 1);

        let (empty, skipped): (Vec<Sample>, usize) = decode_list(json!({ "error": "x" }));
        assert!(empty.is_empty());
        assert_eq!(skipped, 0);
    }

    #[test]
    fn truthy_strings() {
        let yes: Sample = serde_json::from_value(json!({ "id": 1, "active": "true" })).unwrap();
        let no: Sample = serde_json::from_value(json!({ "id": 1, "active": "no" })).unwrap();
        assert!(yes.active);
        assert!(!no.active);
    }
}
