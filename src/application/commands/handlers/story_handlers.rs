//! Story Command Handlers - 故事脚本生成与场景可视化
//!
//! 故事管线：检索接地的结构化生成 -> 严格脚本校验 -> 引用 URL 附加 ->
//! 会话入库。可视化管线：对叙事场景逐个生成图像，单张失败不阻断。

use std::sync::Arc;

use futures_util::FutureExt;
use serde_json::json;

use crate::application::batch::run_batch;
use crate::application::commands::story_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AspectRatio, ContentPart, GenerationGatewayPort, ImageRequest, SessionStorePort,
    StructuredRequest,
};
use crate::domain::story::{Scene, StoryRequest, StoryScript};
use crate::infrastructure::events::EventPublisher;

/// 事实核验允许引用的新闻媒体域名
pub const TRUSTED_NEWS_DOMAINS: [&str; 3] = ["detik.com", "cnnindonesia.com", "kompas.com"];

/// 构造故事生成的系统指令
///
/// 叙事规则、来源核验场景的固定格式与可信域名白名单全部在
/// 系统指令里约束，而不是依赖响应 schema
fn build_system_instruction(request: &StoryRequest) -> String {
    format!(
        "Anda adalah sutradara film dokumenter dan jurnalis investigasi. \
Tugas Anda membuat naskah storytelling edukatif sinematik berdasarkan topik yang diberikan.\n\
\n\
ATURAN WAJIB:\n\
1. Gunakan Google Search untuk memverifikasi fakta dari topik sebelum menulis naskah.\n\
2. Sumber berita HANYA boleh dari: {domains}.\n\
3. User meminta {narrative} scene cerita. Anda WAJIB menghasilkan TOTAL {total} scene: \
{narrative} scene cerita bernomor 1 sampai {narrative}, DITAMBAH 1 scene terakhir \
(scene nomor {total}) yang merupakan scene verifikasi sumber.\n\
4. Scene verifikasi sumber WAJIB memiliki field tone berisi persis \"SOURCE_VERIFICATION\" \
dan narasinya WAJIB mengikuti format: \
\"MEDIA: [nama media] | JUDUL BERITA: [judul artikel] | RINGKASAN: [ringkasan singkat] | VALIDASI: [status validasi fakta]\".\n\
5. Semua scene cerita (selain scene verifikasi) memakai tone emosional bebas sesuai alur.\n\
6. Setiap scene WAJIB memiliki dua structured prompt visual (structuredPrompt1 dan structuredPrompt2) \
sebagai alternatif komposisi kamera yang berbeda untuk adegan yang sama.\n\
7. Seluruh prompt visual ditulis dalam bahasa Inggris dan konsisten dengan gaya visual: \"{style}\".\n\
8. Narasi ditulis dalam bahasa {language}, gaya dokumenter sinematik, padat dan menggugah.\n\
9. Hasilkan tepat 5 hashtags yang relevan.\n\
10. Hasilkan tiktokCover dan youtubeCover berupa prompt gambar sampul dalam bahasa Inggris, \
konsisten dengan gaya visual yang sama.\n\
11. Jawab HANYA dengan JSON sesuai schema, tanpa teks lain.",
        domains = TRUSTED_NEWS_DOMAINS.join(", "),
        narrative = request.requested_scenes,
        total = request.total_scenes(),
        style = request.visual_style,
        language = request.language,
    )
}

fn build_user_prompt(request: &StoryRequest) -> String {
    format!(
        "Lakukan verifikasi fakta lalu buatkan naskah storytelling tentang: \"{}\". \
Jumlah scene cerita: {}. Total scene termasuk verifikasi sumber: {}.",
        request.title,
        request.requested_scenes,
        request.total_scenes(),
    )
}

/// 故事脚本的响应 schema（provider 无关的 JSON Schema 子集）
fn story_response_schema() -> serde_json::Value {
    let structured_prompt = json!({
        "type": "OBJECT",
        "properties": {
            "subject": { "type": "STRING" },
            "action": { "type": "STRING" },
            "environment": { "type": "STRING" },
            "cameraMovement": { "type": "STRING" },
            "lighting": { "type": "STRING" },
            "visualStyleTags": { "type": "STRING" }
        },
        "required": ["subject", "action", "environment", "cameraMovement", "lighting", "visualStyleTags"]
    });

    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "numScenes": { "type": "INTEGER" },
            "visualStyle": { "type": "STRING" },
            "language": { "type": "STRING" },
            "scenes": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "number": { "type": "INTEGER" },
                        "narration": { "type": "STRING" },
                        "tone": { "type": "STRING" },
                        "structuredPrompt1": structured_prompt,
                        "structuredPrompt2": structured_prompt
                    },
                    "required": ["number", "narration", "tone", "structuredPrompt1", "structuredPrompt2"]
                }
            },
            "tiktokCover": { "type": "STRING" },
            "youtubeCover": { "type": "STRING" },
            "hashtags": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "minItems": 5,
                "maxItems": 5
            }
        },
        "required": ["title", "numScenes", "visualStyle", "language", "scenes", "tiktokCover", "youtubeCover", "hashtags"]
    })
}

/// GenerateStory Handler - 生成 N+1 结构故事脚本
pub struct GenerateStoryHandler {
    gateway: Arc<dyn GenerationGatewayPort>,
    sessions: Arc<dyn SessionStorePort>,
    event_publisher: Arc<EventPublisher>,
}

impl GenerateStoryHandler {
    pub fn new(
        gateway: Arc<dyn GenerationGatewayPort>,
        sessions: Arc<dyn SessionStorePort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            gateway,
            sessions,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: GenerateStoryCommand,
    ) -> Result<StoryScript, ApplicationError> {
        if !self.sessions.is_valid(&cmd.session_id) {
            return Err(ApplicationError::not_found("Session", &cmd.session_id));
        }

        let request = StoryRequest::new(
            cmd.title.clone(),
            cmd.requested_scenes,
            cmd.visual_style.clone(),
            cmd.language.clone(),
        )?;

        match self.run_pipeline(&cmd.session_id, &request).await {
            Ok(script) => {
                self.event_publisher.publish_story_ready(
                    &cmd.session_id,
                    &script.title,
                    script.scenes.len(),
                );
                Ok(script)
            }
            Err(e) => {
                self.event_publisher
                    .publish_story_failed(&cmd.session_id, &e.to_string());
                Err(e)
            }
        }
    }

    async fn run_pipeline(
        &self,
        session_id: &str,
        request: &StoryRequest,
    ) -> Result<StoryScript, ApplicationError> {
        let reply = self
            .gateway
            .generate_structured(StructuredRequest {
                parts: vec![ContentPart::Text(build_user_prompt(request))],
                system_instruction: Some(build_system_instruction(request)),
                response_schema: story_response_schema(),
                grounded: true,
            })
            .await?;

        let mut script: StoryScript = serde_json::from_value(reply.json).map_err(|e| {
            ApplicationError::contract(format!("Story reply does not match schema: {}", e))
        })?;

        // 契约校验在反序列化之后、入库之前；回显的叙事场景数
        // 必须等于请求值，否则 N+1 校验会基于错误的基数
        if script.num_scenes != request.requested_scenes {
            return Err(ApplicationError::contract(format!(
                "Scene count echo mismatch: requested {}, reply claims {}",
                request.requested_scenes, script.num_scenes
            )));
        }
        script.validate()?;
        script.append_citations(&reply.citations);

        self.sessions.set_script(session_id, script.clone())?;

        tracing::info!(
            session_id = %session_id,
            title = %script.title,
            scenes = script.scenes.len(),
            citations = reply.citations.len(),
            "Story script generated"
        );

        Ok(script)
    }
}

fn find_scene<'a>(script: &'a StoryScript, number: u32) -> Result<&'a Scene, ApplicationError> {
    script
        .scenes
        .iter()
        .find(|s| s.number == number)
        .ok_or_else(|| ApplicationError::not_found("Scene", number.to_string()))
}

/// VisualizeScene Handler - 可视化单个场景的指定提示词变体
pub struct VisualizeSceneHandler {
    gateway: Arc<dyn GenerationGatewayPort>,
    sessions: Arc<dyn SessionStorePort>,
    event_publisher: Arc<EventPublisher>,
}

impl VisualizeSceneHandler {
    pub fn new(
        gateway: Arc<dyn GenerationGatewayPort>,
        sessions: Arc<dyn SessionStorePort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            gateway,
            sessions,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: VisualizeSceneCommand,
    ) -> Result<VisualizeSceneResponse, ApplicationError> {
        let script = self
            .sessions
            .get_script(&cmd.session_id)?
            .ok_or_else(|| ApplicationError::invalid_state("Session has no story script"))?;

        let scene = find_scene(&script, cmd.scene_number)?;
        if scene.tone.is_source_verification() {
            return Err(ApplicationError::validation(
                "Source verification scene cannot be visualized",
            ));
        }

        let prompt = match cmd.variant {
            PromptVariant::A => scene.prompt_a.consolidate(),
            PromptVariant::B => scene.prompt_b.consolidate(),
        };

        let image = self
            .gateway
            .generate_image(ImageRequest {
                prompt,
                aspect_ratio: cmd.aspect_ratio,
                reference_image: None,
            })
            .await?;

        let key = format!("scene-{}-{}", cmd.scene_number, cmd.variant.as_str());
        self.sessions.insert_image(&cmd.session_id, &key, image)?;
        self.event_publisher
            .publish_image_ready(&cmd.session_id, &key);

        tracing::info!(
            session_id = %cmd.session_id,
            key = %key,
            "Scene image generated"
        );

        Ok(VisualizeSceneResponse { key })
    }
}

/// VisualizeStory Handler - 按序可视化全部叙事场景（变体 A，9:16）
pub struct VisualizeStoryHandler {
    gateway: Arc<dyn GenerationGatewayPort>,
    sessions: Arc<dyn SessionStorePort>,
    event_publisher: Arc<EventPublisher>,
}

impl VisualizeStoryHandler {
    pub fn new(
        gateway: Arc<dyn GenerationGatewayPort>,
        sessions: Arc<dyn SessionStorePort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            gateway,
            sessions,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: VisualizeStoryCommand,
    ) -> Result<VisualizeStoryResponse, ApplicationError> {
        let script = self
            .sessions
            .get_script(&cmd.session_id)?
            .ok_or_else(|| ApplicationError::invalid_state("Session has no story script"))?;

        // 只有叙事场景参与批量可视化，来源核验场景没有画面
        let items: Vec<(u32, String)> = script
            .narrative_scenes()
            .map(|s| (s.number, s.prompt_a.consolidate()))
            .collect();
        let labels: Vec<String> = items
            .iter()
            .map(|(number, _)| format!("scene-{}-a", number))
            .collect();

        let outcome = run_batch(
            &labels,
            |i| {
                let prompt = items[i].1.clone();
                let key = labels[i].clone();
                let session_id = cmd.session_id.clone();
                async move {
                    let image = self
                        .gateway
                        .generate_image(ImageRequest {
                            prompt,
                            aspect_ratio: AspectRatio::Vertical,
                            reference_image: None,
                        })
                        .await
                        .map_err(|e| e.to_string())?;
                    self.sessions
                        .insert_image(&session_id, &key, image)
                        .map_err(|e| e.to_string())?;
                    self.event_publisher.publish_image_ready(&session_id, &key);
                    Ok(key)
                }
                .boxed()
            },
            |done, total| {
                self.event_publisher
                    .publish_batch_progress(&cmd.session_id, done, total);
            },
        )
        .await;

        for failure in &outcome.failures {
            self.event_publisher
                .publish_image_failed(&cmd.session_id, &failure.label, &failure.error);
        }

        tracing::info!(
            session_id = %cmd.session_id,
            generated = outcome.successes.len(),
            failed = outcome.failures.len(),
            "Story visualization batch finished"
        );

        Ok(VisualizeStoryResponse {
            generated: outcome.successes.into_iter().map(|(key, _)| key).collect(),
            failed: outcome.failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::GatewayError;
    use crate::domain::story::{StructuredPrompt, Tone};
    use crate::infrastructure::adapters::gemini::FakeGeminiClient;
    use crate::infrastructure::memory::InMemorySessionStore;

    fn request() -> StoryRequest {
        StoryRequest::new(
            "Banjir bandang di Sumatera".to_string(),
            6,
            "cinematic documentary".to_string(),
            "Indonesia".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_system_instruction_states_total_scene_contract() {
        let instruction = build_system_instruction(&request());
        // 6 个叙事场景 + 1 个核验场景
        assert!(instruction.contains("TOTAL 7 scene"));
        assert!(instruction.contains("scene nomor 7"));
        assert!(instruction.contains("SOURCE_VERIFICATION"));
    }

    #[test]
    fn test_system_instruction_lists_trusted_domains() {
        let instruction = build_system_instruction(&request());
        for domain in TRUSTED_NEWS_DOMAINS {
            assert!(instruction.contains(domain));
        }
    }

    #[test]
    fn test_system_instruction_carries_verification_narration_format() {
        let instruction = build_system_instruction(&request());
        assert!(instruction.contains("MEDIA:"));
        assert!(instruction.contains("JUDUL BERITA:"));
        assert!(instruction.contains("RINGKASAN:"));
        assert!(instruction.contains("VALIDASI:"));
    }

    #[test]
    fn test_user_prompt_contains_title_and_counts() {
        let prompt = build_user_prompt(&request());
        assert!(prompt.contains("Banjir bandang di Sumatera"));
        assert!(prompt.contains("Jumlah scene cerita: 6"));
        assert!(prompt.contains("verifikasi sumber: 7"));
    }

    #[test]
    fn test_response_schema_uses_provider_field_names() {
        let schema = story_response_schema();
        let scene_props = &schema["properties"]["scenes"]["items"]["properties"];
        assert!(scene_props.get("structuredPrompt1").is_some());
        assert!(scene_props.get("structuredPrompt2").is_some());
        let prompt_props = &scene_props["structuredPrompt1"]["properties"];
        assert!(prompt_props.get("cameraMovement").is_some());
        assert!(prompt_props.get("visualStyleTags").is_some());
    }

    #[test]
    fn test_response_schema_requires_all_top_level_fields() {
        let schema = story_response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        for field in [
            "title",
            "numScenes",
            "visualStyle",
            "language",
            "scenes",
            "tiktokCover",
            "youtubeCover",
            "hashtags",
        ] {
            assert!(required.contains(&field), "missing required field {}", field);
        }
    }

    fn prompt() -> StructuredPrompt {
        StructuredPrompt {
            subject: "s".into(),
            action: "a".into(),
            environment: "e".into(),
            camera_movement: "c".into(),
            lighting: "l".into(),
            visual_style_tags: "v".into(),
        }
    }

    fn scene(number: u32, tone: &str) -> Scene {
        Scene {
            number,
            narration: format!("narration {}", number),
            tone: Tone::new(tone),
            prompt_a: prompt(),
            prompt_b: prompt(),
        }
    }

    fn two_scene_script() -> StoryScript {
        StoryScript {
            title: "Test".into(),
            num_scenes: 2,
            visual_style: "Cinematic".into(),
            language: "id".into(),
            scenes: vec![
                scene(1, "dramatic"),
                scene(2, "calm"),
                scene(3, "SOURCE_VERIFICATION"),
            ],
            tiktok_cover: "tk".into(),
            youtube_cover: "yt".into(),
            hashtags: vec!["#1".into(), "#2".into(), "#3".into(), "#4".into(), "#5".into()],
        }
    }

    #[tokio::test]
    async fn test_generate_story_appends_citations_and_stores_script() {
        let gateway = Arc::new(FakeGeminiClient::new(24000));
        let sessions: Arc<dyn SessionStorePort> =
            Arc::new(InMemorySessionStore::new("Kore"));
        let publisher = Arc::new(EventPublisher::new());
        let handler =
            GenerateStoryHandler::new(gateway.clone(), sessions.clone(), publisher);

        let session_id = sessions.open();
        gateway.push_structured(Ok(crate::application::ports::StructuredReply {
            json: serde_json::to_value(two_scene_script()).unwrap(),
            citations: vec!["https://detik.com/x".to_string()],
        }));

        let script = handler
            .handle(GenerateStoryCommand {
                session_id: session_id.clone(),
                title: "Test".to_string(),
                requested_scenes: 2,
                visual_style: "Cinematic".to_string(),
                language: "id".to_string(),
            })
            .await
            .unwrap();

        assert!(script.scenes[2]
            .narration
            .ends_with("REFERENSI URL: https://detik.com/x"));
        let stored = sessions.get_script(&session_id).unwrap().unwrap();
        assert_eq!(stored.scenes.len(), 3);
    }

    #[tokio::test]
    async fn test_generate_story_rejects_scene_count_echo_mismatch() {
        let gateway = Arc::new(FakeGeminiClient::new(24000));
        let sessions: Arc<dyn SessionStorePort> =
            Arc::new(InMemorySessionStore::new("Kore"));
        let publisher = Arc::new(EventPublisher::new());
        let handler = GenerateStoryHandler::new(gateway.clone(), sessions.clone(), publisher);

        let session_id = sessions.open();
        gateway.push_structured(Ok(crate::application::ports::StructuredReply {
            json: serde_json::to_value(two_scene_script()).unwrap(),
            citations: Vec::new(),
        }));

        // 回显 numScenes=2，但请求的是 5
        let result = handler
            .handle(GenerateStoryCommand {
                session_id,
                title: "Test".to_string(),
                requested_scenes: 5,
                visual_style: "Cinematic".to_string(),
                language: "id".to_string(),
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::ContractViolation(_))));
    }

    #[tokio::test]
    async fn test_visualize_story_tolerates_single_failure() {
        let gateway = Arc::new(FakeGeminiClient::new(24000));
        let sessions: Arc<dyn SessionStorePort> =
            Arc::new(InMemorySessionStore::new("Kore"));
        let publisher = Arc::new(EventPublisher::new());
        let handler =
            VisualizeStoryHandler::new(gateway.clone(), sessions.clone(), publisher);

        let session_id = sessions.open();
        sessions.set_script(&session_id, two_scene_script()).unwrap();
        // 第一张失败，第二张回落到默认占位图
        gateway.push_image(Err(GatewayError::NoImageReturned));

        let response = handler
            .handle(VisualizeStoryCommand {
                session_id: session_id.clone(),
            })
            .await
            .unwrap();

        assert_eq!(response.generated, vec!["scene-2-a".to_string()]);
        assert_eq!(response.failed.len(), 1);
        assert_eq!(response.failed[0].label, "scene-1-a");
        // 失败条目没有产物入库，成功条目有
        assert!(sessions.get_image(&session_id, "scene-1-a").unwrap().is_none());
        assert!(sessions.get_image(&session_id, "scene-2-a").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_visualize_scene_rejects_verification_scene() {
        let gateway = Arc::new(FakeGeminiClient::new(24000));
        let sessions: Arc<dyn SessionStorePort> =
            Arc::new(InMemorySessionStore::new("Kore"));
        let publisher = Arc::new(EventPublisher::new());
        let handler = VisualizeSceneHandler::new(gateway, sessions.clone(), publisher);

        let session_id = sessions.open();
        sessions.set_script(&session_id, two_scene_script()).unwrap();

        let result = handler
            .handle(VisualizeSceneCommand {
                session_id,
                scene_number: 3,
                variant: PromptVariant::A,
                aspect_ratio: AspectRatio::Vertical,
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
    }
}
