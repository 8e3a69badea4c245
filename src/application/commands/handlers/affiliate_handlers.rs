//! Affiliate Command Handlers - 带货素材清单与场景图生成
//!
//! 两段式管线：先生成结构化素材清单（summary/caption/assets），
//! 再按清单顺序逐个生成场景图。商品参考图贯穿两段：清单阶段作为
//! 多模态输入，生成阶段作为每张图的风格锚定。

use std::sync::Arc;

use futures_util::FutureExt;
use serde_json::json;

use crate::application::batch::run_batch;
use crate::application::commands::affiliate_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AspectRatio, ContentPart, GenerationGatewayPort, ImageRequest, InlineImage, SessionStorePort,
    StructuredRequest,
};
use crate::domain::affiliate::{AffiliateBrief, AffiliateRequest};
use crate::infrastructure::events::EventPublisher;

fn build_system_instruction(request: &AffiliateRequest) -> String {
    format!(
        "Anda adalah content creator affiliate profesional spesialis konten UGC \
(user-generated content) untuk TikTok dan Shopee.\n\
\n\
ATURAN WAJIB:\n\
1. Buat konsep konten affiliate untuk produk yang diberikan, gaya: \"{style}\".\n\
2. Hasilkan TEPAT {scenes} asset scene. Setiap asset memiliki label unik \
(contoh: \"hook\", \"masalah\", \"solusi\", \"cta\"), satu image prompt, dan satu video prompt.\n\
3. Jika ada foto produk atau foto model terlampir, seluruh prompt WAJIB konsisten \
dengan tampilan produk dan model tersebut.\n\
4. Image prompt dan video prompt ditulis dalam bahasa Inggris, detail dan sinematik, \
gaya UGC natural (bukan iklan studio).\n\
5. Summary berisi strategi konten singkat dalam bahasa Indonesia. \
Caption siap-posting dalam bahasa Indonesia dengan hashtags.\n\
6. Jawab HANYA dengan JSON sesuai schema, tanpa teks lain.",
        style = request.style,
        scenes = request.requested_scenes,
    )
}

fn build_user_prompt(request: &AffiliateRequest) -> String {
    let mut prompt = format!(
        "Produk: \"{}\". Jumlah scene: {}.",
        request.product_name, request.requested_scenes
    );
    if !request.custom_instructions.trim().is_empty() {
        prompt.push_str(&format!(
            " Instruksi tambahan: {}",
            request.custom_instructions
        ));
    }
    prompt
}

/// 素材清单的响应 schema
fn brief_response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING" },
            "caption": { "type": "STRING" },
            "assets": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "label": { "type": "STRING" },
                        "imagePrompt": { "type": "STRING" },
                        "videoPrompt": { "type": "STRING" }
                    },
                    "required": ["label", "imagePrompt", "videoPrompt"]
                }
            }
        },
        "required": ["summary", "caption", "assets"]
    })
}

/// GenerateAffiliate Handler - 素材清单 + 顺序场景图批处理
pub struct GenerateAffiliateHandler {
    gateway: Arc<dyn GenerationGatewayPort>,
    sessions: Arc<dyn SessionStorePort>,
    event_publisher: Arc<EventPublisher>,
}

impl GenerateAffiliateHandler {
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
        cmd: GenerateAffiliateCommand,
    ) -> Result<GenerateAffiliateResponse, ApplicationError> {
        if !self.sessions.is_valid(&cmd.session_id) {
            return Err(ApplicationError::not_found("Session", &cmd.session_id));
        }

        let request = AffiliateRequest::new(
            cmd.product_name.clone(),
            cmd.custom_instructions.clone(),
            cmd.style.clone(),
            cmd.requested_scenes,
        )?;

        let brief = match self
            .generate_brief(&request, cmd.product_image.as_ref(), cmd.model_image.as_ref())
            .await
        {
            Ok(brief) => {
                self.event_publisher
                    .publish_brief_ready(&cmd.session_id, brief.assets.len());
                brief
            }
            Err(e) => {
                self.event_publisher
                    .publish_brief_failed(&cmd.session_id, &e.to_string());
                return Err(e);
            }
        };

        let labels: Vec<String> = brief.assets.iter().map(|a| a.label.clone()).collect();
        let outcome = run_batch(
            &labels,
            |i| {
                let prompt = brief.assets[i].image_prompt.clone();
                let key = labels[i].clone();
                let session_id = cmd.session_id.clone();
                let reference_image = cmd.product_image.clone();
                async move {
                    let image = self
                        .gateway
                        .generate_image(ImageRequest {
                            prompt,
                            aspect_ratio: AspectRatio::Vertical,
                            reference_image,
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
            product = %cmd.product_name,
            generated = outcome.successes.len(),
            failed = outcome.failures.len(),
            "Affiliate pipeline finished"
        );

        Ok(GenerateAffiliateResponse {
            brief,
            generated: outcome.successes.into_iter().map(|(key, _)| key).collect(),
            failed: outcome.failures,
        })
    }

    async fn generate_brief(
        &self,
        request: &AffiliateRequest,
        product_image: Option<&InlineImage>,
        model_image: Option<&InlineImage>,
    ) -> Result<AffiliateBrief, ApplicationError> {
        let mut parts = vec![ContentPart::Text(build_user_prompt(request))];
        if let Some(image) = product_image {
            parts.push(ContentPart::Image(image.clone()));
        }
        if let Some(image) = model_image {
            parts.push(ContentPart::Image(image.clone()));
        }

        let reply = self
            .gateway
            .generate_structured(StructuredRequest {
                parts,
                system_instruction: Some(build_system_instruction(request)),
                response_schema: brief_response_schema(),
                grounded: false,
            })
            .await?;

        let brief: AffiliateBrief = serde_json::from_value(reply.json).map_err(|e| {
            ApplicationError::contract(format!("Brief reply does not match schema: {}", e))
        })?;

        brief.validate()?;
        if brief.assets.len() != request.requested_scenes as usize {
            return Err(ApplicationError::contract(format!(
                "Asset count mismatch: requested {}, reply contains {}",
                request.requested_scenes,
                brief.assets.len()
            )));
        }

        Ok(brief)
    }
}
