//! Persona generation port and the fixed-output stub backend.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use crate::error::Result;

use super::types::{Persona, PersonaRequest};

/// Turns a validated request into a new persona carrying `id`.
#[async_trait]
pub trait PersonaGenerator: Send + Sync {
    async fn generate(&self, request: &PersonaRequest, id: String) -> Result<Persona>;
}

const STUB_BIO: &str = "# 一、基础画像信息\n\n阿北，35岁男性，目前主要致力于在乡村照顾父母和维持家庭生活。拥有稳定的家庭结构，有孩子（双胞胎），同时也养有宠物。具备一定的数字技术应用能力，能熟练运用AI等新技术进行创作。\n\n生活重心围绕家庭、传统节日氛围营造以及乡村生活质量的提升。热衷于分享家庭生活的温馨时刻，尤其是关于子女成长、节日团圆的点滴。同时也表现出对传统文化（如生肖、山海经等）与现代科技结合的浓厚兴趣。";

/// Waits `latency`, then returns the same persona for every request.
#[derive(Debug, Clone)]
pub struct StubPersonaGenerator {
    latency: Duration,
}

impl StubPersonaGenerator {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl PersonaGenerator for StubPersonaGenerator {
    async fn generate(&self, request: &PersonaRequest, id: String) -> Result<Persona> {
        request.validate()?;
        debug!(
            target_audience = %request.target_audience,
            audience_category = %request.audience_category,
            num_id = request.num_id,
            num_content = request.num_content,
            tags = request.tags().len(),
            "Generating persona"
        );

        tokio::time::sleep(self.latency).await;

        let persona = Persona {
            id,
            nickname: "阿北".to_string(),
            age: "35".to_string(),
            gender: "男性".to_string(),
            job: "乡村养老照护者".to_string(),
            bio: STUB_BIO.to_string(),
            created_at: Utc::now(),
        };
        info!(persona_id = %persona.id, nickname = %persona.nickname, "Persona generated");
        Ok(persona)
    }
}
