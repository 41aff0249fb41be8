use serde::{Deserialize, Deserializer, Serialize};

// ==================== USER ====================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "t_id", deserialize_with = "string_or_number")]
    pub t_id: String,
    pub balance: f64,
    pub total_earned: f64,
    pub earn_per_tap: f64,
    #[serde(rename = "referalLink", default, skip_serializing_if = "Option::is_none")]
    pub referal_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Remaining tap budget, when the backend hands one out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount: Option<u32>,
}

// Telegram ids arrive as numbers from some backends and as strings from others.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Uint(n) => n.to_string(),
    })
}

// ==================== UPDATE ====================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub user_id: String,
    pub balance: f64,
    pub total_earned: f64,
}

impl UserUpdate {
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            user_id: profile.t_id.clone(),
            balance: profile.balance,
            total_earned: profile.total_earned,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_accepts_numeric_telegram_id() {
        let raw = r#"{"t_id": 123456, "balance": 10, "totalEarned": 12, "earnPerTap": 2}"#;
        let profile: UserProfile = serde_json::from_str(raw).expect("profile should parse");
        assert_eq!(profile.t_id, "123456");
        assert_eq!(profile.total_earned, 12.0);
        assert!(profile.referal_link.is_none());
        assert!(profile.mount.is_none());
    }

    #[test]
    fn profile_reads_referral_link_spelling() {
        let raw = r#"{"t_id": "abc", "balance": 0, "totalEarned": 0, "earnPerTap": 1,
                      "referalLink": "https://t.me/bot?start=abc", "mount": 7}"#;
        let profile: UserProfile = serde_json::from_str(raw).expect("profile should parse");
        assert_eq!(profile.referal_link.as_deref(), Some("https://t.me/bot?start=abc"));
        assert_eq!(profile.mount, Some(7));
    }

    #[test]
    fn update_serializes_camel_case() {
        let update = UserUpdate {
            user_id: "42".to_string(),
            balance: 102.0,
            total_earned: 102.0,
        };
        let value = serde_json::to_value(&update).expect("serialize");
        assert_eq!(value["userId"], "42");
        assert_eq!(value["totalEarned"], 102.0);
        assert!(value.get("total_earned").is_none());
    }
}
