//! Core types for the persona system.
//!
//! A persona is a synthetic user profile used as the generation context for
//! notes. Personas are created whole and deleted whole; they are never edited
//! in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────
// Persona
// ─────────────────────────────────────────────────────────────────

/// A stored persona profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    /// Unique, time-based, immutable identifier.
    pub id: String,

    /// Display name.
    pub nickname: String,

    pub age: String,

    pub gender: String,

    pub job: String,

    /// Free-form markdown biography. The first line doubles as a summary.
    pub bio: String,

    pub created_at: DateTime<Utc>,
}

impl Persona {
    /// First line of the biography, as shown on a persona card.
    pub fn summary(&self) -> &str {
        self.bio.lines().next().unwrap_or("").trim()
    }
}

// ─────────────────────────────────────────────────────────────────
// Persona Request
// ─────────────────────────────────────────────────────────────────

/// Default reference tags offered by the persona form, one per line.
pub const DEFAULT_REFERENCE_TAGS: &str = "KPOP\n徒步\n露营\n户外装备\n羽毛球\n篮球\n乒乓球\n职场穿搭\n宠物\n宠物护理\n宠物用品\n宠物日常\n综艺\n解压\n短剧\nASMR\n网络游戏\n王者荣耀\nLOL\n潮玩\n泡泡玛特\n探店\n美食\n一人食\n护肤\n彩妆\n护发\n染发\n个人提升\n旅游出行\n特种兵旅行\n语言学习\n二次元\n动漫\ncoser\n产品测评\nAI技术\nAI作图\n育儿\n家庭\n教育\n养生\n健康\n收纳\n家庭清洁\n购物\n送礼\n买房\n买车\n房贷\n车贷\n甄嬛传\n装修\n花艺\n钓鱼\n美容\n儿童健康\n海淘\n体检\n夫妻关系\n亲子游\n婆媳关系\n手游\n游戏直播\nJPOP\n孕产护理\n婴幼儿喂养\n婴幼儿用品\n舞蹈\n珠宝\n健身计划\n户外运动\n球星\n运动装备\n电竞\n电竞比赛\n英雄联盟\nKPL\nLPL\nCNCS\n无畏契约\n兼职\n恋爱关系\n穷游\n在职考公";

/// Parameters for generating a new persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaRequest {
    /// Who the content is aimed at, e.g. "下班后自学提升".
    pub target_audience: String,

    /// Number of reference accounts to sample.
    #[serde(default = "default_num_id")]
    pub num_id: u32,

    /// Number of posts sampled per reference account.
    #[serde(default = "default_num_content")]
    pub num_content: u32,

    /// Audience category, e.g. "初入职场毕业生".
    pub audience_category: String,

    /// Newline-separated interest tags. Blank means [`DEFAULT_REFERENCE_TAGS`].
    #[serde(default)]
    pub reference_tags: String,
}

fn default_num_id() -> u32 {
    60
}

fn default_num_content() -> u32 {
    5
}

impl PersonaRequest {
    pub fn new(target_audience: impl Into<String>, audience_category: impl Into<String>) -> Self {
        Self {
            target_audience: target_audience.into(),
            num_id: default_num_id(),
            num_content: default_num_content(),
            audience_category: audience_category.into(),
            reference_tags: String::new(),
        }
    }

    /// Check required fields before any generation attempt.
    pub fn validate(&self) -> Result<()> {
        if self.target_audience.trim().is_empty() {
            return Err(Error::invalid_request("target_audience", "must not be blank"));
        }
        if self.audience_category.trim().is_empty() {
            return Err(Error::invalid_request("audience_category", "must not be blank"));
        }
        if self.num_id == 0 {
            return Err(Error::invalid_request("num_id", "must be at least 1"));
        }
        if self.num_content == 0 {
            return Err(Error::invalid_request("num_content", "must be at least 1"));
        }
        Ok(())
    }

    /// Non-empty tags, falling back to the default list.
    pub fn tags(&self) -> Vec<&str> {
        let source = if self.reference_tags.trim().is_empty() {
            DEFAULT_REFERENCE_TAGS
        } else {
            &self.reference_tags
        };
        source
            .lines()
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona(bio: &str) -> Persona {
        Persona {
            id: "1".to_string(),
            nickname: "阿北".to_string(),
            age: "35".to_string(),
            gender: "男性".to_string(),
            job: "乡村养老照护者".to_string(),
            bio: bio.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_is_first_line() {
        assert_eq!(persona("# 一、基础画像信息\n\n阿北，35岁").summary(), "# 一、基础画像信息");
        assert_eq!(persona("").summary(), "");
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(persona("bio")).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("nickname").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_request_validation() {
        assert!(PersonaRequest::new("下班后自学提升", "初入职场毕业生").validate().is_ok());

        let err = PersonaRequest::new("  ", "初入职场毕业生").validate().unwrap_err();
        assert!(matches!(err, Error::InvalidRequest { field: "target_audience", .. }));

        let err = PersonaRequest::new("a", "\n").validate().unwrap_err();
        assert!(matches!(err, Error::InvalidRequest { field: "audience_category", .. }));

        let mut request = PersonaRequest::new("a", "b");
        request.num_content = 0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_request_defaults_from_json() {
        let request: PersonaRequest =
            serde_json::from_str(r#"{"targetAudience":"a","audienceCategory":"b"}"#).unwrap();
        assert_eq!(request.num_id, 60);
        assert_eq!(request.num_content, 5);
        assert_eq!(request.tags().first(), Some(&"KPOP"));
    }

    #[test]
    fn test_custom_tags() {
        let mut request = PersonaRequest::new("a", "b");
        request.reference_tags = "徒步\n\n  露营  \n".to_string();
        assert_eq!(request.tags(), vec!["徒步", "露营"]);
    }
}
