use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::classification::{contains_national_id, mask_national_id};

/// Decoded claims of the acting user's token.
pub type ActorToken = JsonMap<String, JsonValue>;

/// Fallback `trxId` for requests that were never stamped.
pub const MISSING_TRX_ID: &str = "missing trxId in req";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionCategory {
    Auth,
    #[default]
    Trans,
    Http,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Success,
    Failure,
}

/// Request and outcome details carried under `additionalInfo`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
}

/// One audit entry, as handed to the logger.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub trx_category: TransactionCategory,
    pub trx_id: String,
    pub trx_name: String,
    pub trx_module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub trx_status: TransactionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_taken_in_millis: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_token: Option<ActorToken>,
    pub additional_info: AdditionalInfo,
}

/// Masks top-level claims that contain a national identifier.
///
/// Only the leading characters are hidden so the claim stays recognizable.
pub fn mask_actor_token(token: &ActorToken) -> ActorToken {
    token
        .iter()
        .map(|(claim, value)| {
            let value = match value {
                JsonValue::String(text) if contains_national_id(text) => {
                    JsonValue::String(mask_national_id(text))
                }
                other => other.clone(),
            };
            (claim.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        mask_actor_token, AdditionalInfo, AuditRecord, TransactionCategory, TransactionStatus,
    };

    #[test]
    fn serializes_with_wire_names() {
        let record = AuditRecord {
            trx_category: TransactionCategory::Http,
            trx_id: "id-1".into(),
            trx_name: "claim".into(),
            trx_module: "INBOX".into(),
            filename: None,
            trx_status: TransactionStatus::Failure,
            time_taken_in_millis: Some(5),
            user_token: None,
            additional_info: AdditionalInfo {
                src_ip: Some("10.0.0.1".into()),
                status_code: Some(500),
                ..AdditionalInfo::default()
            },
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "trxCategory": "HTTP",
                "trxId": "id-1",
                "trxName": "claim",
                "trxModule": "INBOX",
                "trxStatus": "FAILURE",
                "timeTakenInMillis": 5,
                "additionalInfo": {"srcIp": "10.0.0.1", "statusCode": 500}
            })
        );
    }

    #[test]
    fn masks_embedded_national_ids_only() {
        let token = json!({"sub": "sg:S2805507B", "name": "alice", "aud": 3})
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(
            serde_json::Value::Object(mask_actor_token(&token)),
            json!({"sub": "*****805507B", "name": "alice", "aud": 3})
        );
    }
}
