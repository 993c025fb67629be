use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::date;
use crate::member::Member;
use crate::serde_helper;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroupRecord {
    #[serde(deserialize_with = "serde_helper::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub name: String,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub description: String,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub created_by: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    /// 服务端不返回，由成员列表计算
    pub member_count: usize,
}

impl From<GroupRecord> for Group {
    fn from(g: GroupRecord) -> Self {
        Self {
            id: g.id,
            name: g.name,
            description: g.description,
            created_by: g.created_by,
            created_at: g
                .created_at
                .as_deref()
                .and_then(date::parse_datetime)
                .unwrap_or_else(date::now),
            member_count: 0,
        }
    }
}

impl Group {
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty() || self.name.to_lowercase().contains(&query)
    }
}

/// 根据成员列表填充每个小组的 `member_count`
pub fn with_member_counts(mut groups: Vec<Group>, members: &[Member]) -> Vec<Group> {
    for group in &mut groups {
        group.member_count = members
            .iter()
            .filter(|m| m.group_id == Some(group.id))
            .count();
    }
    groups
}

/// 按 ID 查找小组名称
pub fn group_name(groups: &[Group], id: Option<i64>) -> String {
    id.and_then(|id| groups.iter().find(|g| g.id == id))
        .map(|g| g.name.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateGroupPayload {
    pub name: String,
    pub description: String,
    pub created_by: String,
}

impl CreateGroupPayload {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Group name is required".to_string());
        }
        Ok(())
    }
}
