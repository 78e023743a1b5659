//! Note generation port and the fixed-literal backend.
//!
//! [`FixedNoteGenerator`] stands in for a real content backend: it waits a
//! fixed latency and returns the same body for every persona, varying only
//! the id and the nickname-prefixed title.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::error::Result;
use crate::persona::Persona;

use super::types::{GenerationParams, Note, NoteKind};

pub const FIXED_TITLE: &str = "纠结折叠屏，但游戏体验让我动心";

pub const FIXED_COVER_TITLE: &str = "折叠屏打游戏啥体验？";

pub const FIXED_BODY: &str = "好纠结，荣耀Magic V5要出了，听说是全球最薄折叠屏，这点真的让我很心动，尤其是游戏玩家的体验可能会很特别，虽然我从来没用过折叠屏，但感觉可以试试。\n\n期待在折叠屏的大屏上打游戏的体验，续航表现据说很不错，希望玩游戏时电量能支撑更久。内心已经偏向入手了，就是不知道这款折叠屏手机的价格如何，会不会超出预算？\n\n有点纠结，真的很期待这款折叠屏手机，大家怎么看？它会成为一款值得入手的游戏神器吗？\n\n#荣耀MagicV5 #全球最薄折叠屏 #最强AI智能体手机 #折叠机皇 #王者荣耀";

pub const FIXED_IMAGE_URL: &str = "https://images.unsplash.com/photo-1511707171634-5f897ff02aa9?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80";

/// Produces one note per persona for a single generation event.
///
/// Implementations must return exactly `personas.len()` notes, each with an
/// id derived from `base_id` and the persona id.
#[async_trait]
pub trait NoteGenerator: Send + Sync {
    async fn generate(
        &self,
        personas: &[Persona],
        params: &GenerationParams,
        base_id: &str,
    ) -> Result<Vec<Note>>;
}

/// Fixed-literal generator with a simulated latency.
#[derive(Debug, Clone)]
pub struct FixedNoteGenerator {
    latency: Duration,
}

impl FixedNoteGenerator {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl NoteGenerator for FixedNoteGenerator {
    async fn generate(
        &self,
        personas: &[Persona],
        params: &GenerationParams,
        base_id: &str,
    ) -> Result<Vec<Note>> {
        debug!(
            kind = %params.kind,
            personas = personas.len(),
            latency_ms = self.latency.as_millis() as u64,
            "Simulating generation"
        );
        tokio::time::sleep(self.latency).await;

        let created_at = Utc::now();
        let image_url = match params.kind {
            NoteKind::Image => Some(FIXED_IMAGE_URL.to_string()),
            NoteKind::Poster => None,
        };

        let mut nickname_counts: HashMap<&str, usize> = HashMap::new();
        for persona in personas {
            *nickname_counts.entry(persona.nickname.as_str()).or_default() += 1;
        }

        Ok(personas
            .iter()
            .map(|persona| Note {
                id: format!("{}-{}", base_id, persona.id),
                kind: params.kind,
                title: note_title(
                    persona,
                    nickname_counts.get(persona.nickname.as_str()).copied().unwrap_or(0) > 1,
                ),
                body: FIXED_BODY.to_string(),
                cover_title: FIXED_COVER_TITLE.to_string(),
                image_url: image_url.clone(),
                persona_ids: BTreeSet::from([persona.id.clone()]),
                created_at,
            })
            .collect())
    }
}

/// Nickname-prefixed title; the persona id is added when the nickname is
/// shared with another persona in the same batch.
fn note_title(persona: &Persona, shared_nickname: bool) -> String {
    if shared_nickname {
        format!("{}({})：{}", persona.nickname, persona.id, FIXED_TITLE)
    } else {
        format!("{}：{}", persona.nickname, FIXED_TITLE)
    }
}
