//! Story Context - Aggregate Root
//!
//! 不变量:
//! - 成功脚本恰好包含 num_scenes + 1 个场景（N+1 规则）
//! - 只有最后一个场景允许 SOURCE_VERIFICATION 基调
//! - 场景编号从 1 开始且连续
//! - hashtags 恰好 5 条

use serde::{Deserialize, Serialize};

use super::errors::StoryError;
use super::value_objects::{StructuredPrompt, Tone};

/// 故事生成请求
///
/// 管线的不可变输入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryRequest {
    pub title: String,
    pub requested_scenes: u32,
    pub visual_style: String,
    pub language: String,
}

impl StoryRequest {
    pub fn new(
        title: impl Into<String>,
        requested_scenes: u32,
        visual_style: impl Into<String>,
        language: impl Into<String>,
    ) -> Result<Self, StoryError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(StoryError::InvalidTitle(title));
        }
        if requested_scenes == 0 {
            return Err(StoryError::InvalidSceneCount(requested_scenes));
        }
        Ok(Self {
            title,
            requested_scenes,
            visual_style: visual_style.into(),
            language: language.into(),
        })
    }

    /// 含溯源场景的总场景数（N+1）
    pub fn total_scenes(&self) -> u32 {
        self.requested_scenes + 1
    }
}

/// 单个叙事场景
///
/// 非溯源场景携带两个备选结构化提示词
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub number: u32,
    pub narration: String,
    pub tone: Tone,
    #[serde(rename = "structuredPrompt1")]
    pub prompt_a: StructuredPrompt,
    #[serde(rename = "structuredPrompt2")]
    pub prompt_b: StructuredPrompt,
}

impl Scene {
    pub fn is_source_verification(&self) -> bool {
        self.tone.is_source_verification()
    }
}

/// 故事脚本聚合根
///
/// 对应生成端返回的完整结构化结果。`num_scenes` 回显用户请求的叙事
/// 场景数，不是 `scenes` 的长度。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryScript {
    pub title: String,
    pub num_scenes: u32,
    pub visual_style: String,
    pub language: String,
    pub scenes: Vec<Scene>,
    pub tiktok_cover: String,
    pub youtube_cover: String,
    pub hashtags: Vec<String>,
}

impl StoryScript {
    /// 反序列化之后立即执行的结构校验
    ///
    /// 生成端仅通过指令承诺 N+1 与基调哨兵，schema 并不约束数组长度，
    /// 这里显式拒绝违约响应而不是静默信任。
    pub fn validate(&self) -> Result<(), StoryError> {
        let expected = self.num_scenes as usize + 1;
        if self.scenes.len() != expected {
            return Err(StoryError::SceneCountMismatch {
                expected,
                actual: self.scenes.len(),
            });
        }

        for (index, scene) in self.scenes.iter().enumerate() {
            if scene.number != index as u32 + 1 {
                return Err(StoryError::NonDenseNumbering {
                    index,
                    number: scene.number,
                });
            }

            let is_last = index + 1 == self.scenes.len();
            if is_last && !scene.is_source_verification() {
                return Err(StoryError::MissingVerificationScene);
            }
            if !is_last && scene.is_source_verification() {
                return Err(StoryError::MisplacedVerificationScene(scene.number));
            }
        }

        if self.hashtags.len() != 5 {
            return Err(StoryError::HashtagCount(self.hashtags.len()));
        }

        Ok(())
    }

    /// 溯源场景（校验通过后恒为最后一个）
    pub fn verification_scene(&self) -> Option<&Scene> {
        self.scenes.last().filter(|s| s.is_source_verification())
    }

    /// 需要可视化的叙事场景（不含溯源场景）
    pub fn narrative_scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.iter().filter(|s| !s.is_source_verification())
    }

    /// 把检索到的引用 URI 追加到最后一个场景的旁白
    ///
    /// 文本拼接而非新增字段，空引用列表不做任何修改
    pub fn append_citations(&mut self, uris: &[String]) {
        if uris.is_empty() {
            return;
        }
        if let Some(last) = self.scenes.last_mut() {
            last.narration
                .push_str(&format!(" REFERENSI URL: {}", uris.join(", ")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::story::SOURCE_VERIFICATION_TONE;

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

    fn script(num_scenes: u32, scenes: Vec<Scene>) -> StoryScript {
        StoryScript {
            title: "Test".into(),
            num_scenes,
            visual_style: "Cinematic".into(),
            language: "id".into(),
            scenes,
            tiktok_cover: "tiktok cover prompt".into(),
            youtube_cover: "youtube cover prompt".into(),
            hashtags: vec![
                "#a".into(),
                "#b".into(),
                "#c".into(),
                "#d".into(),
                "#e".into(),
            ],
        }
    }

    #[test]
    fn test_request_rejects_empty_title() {
        assert!(StoryRequest::new("  ", 2, "Cinematic", "id").is_err());
    }

    #[test]
    fn test_request_rejects_zero_scenes() {
        assert!(StoryRequest::new("Test", 0, "Cinematic", "id").is_err());
    }

    #[test]
    fn test_total_scenes_is_n_plus_one() {
        let req = StoryRequest::new("Test", 2, "Cinematic", "id").unwrap();
        assert_eq!(req.total_scenes(), 3);
    }

    #[test]
    fn test_valid_script_passes() {
        let s = script(
            2,
            vec![
                scene(1, "dramatic"),
                scene(2, "hopeful"),
                scene(3, SOURCE_VERIFICATION_TONE),
            ],
        );
        assert!(s.validate().is_ok());
        assert_eq!(s.scenes.len(), 3);
        assert!(s.scenes[2].is_source_verification());
        assert_eq!(s.narrative_scenes().count(), 2);
    }

    #[test]
    fn test_scene_count_mismatch_rejected() {
        let s = script(2, vec![scene(1, "dramatic"), scene(2, SOURCE_VERIFICATION_TONE)]);
        match s.validate() {
            Err(StoryError::SceneCountMismatch { expected, actual }) => {
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_missing_verification_tone_rejected() {
        let s = script(
            1,
            vec![scene(1, "dramatic"), scene(2, "calm")],
        );
        assert!(matches!(
            s.validate(),
            Err(StoryError::MissingVerificationScene)
        ));
    }

    #[test]
    fn test_misplaced_verification_tone_rejected() {
        let s = script(
            2,
            vec![
                scene(1, SOURCE_VERIFICATION_TONE),
                scene(2, "calm"),
                scene(3, SOURCE_VERIFICATION_TONE),
            ],
        );
        assert!(matches!(
            s.validate(),
            Err(StoryError::MisplacedVerificationScene(1))
        ));
    }

    #[test]
    fn test_non_dense_numbering_rejected() {
        let s = script(
            1,
            vec![scene(1, "dramatic"), scene(5, SOURCE_VERIFICATION_TONE)],
        );
        assert!(matches!(
            s.validate(),
            Err(StoryError::NonDenseNumbering { index: 1, number: 5 })
        ));
    }

    #[test]
    fn test_hashtag_count_rejected() {
        let mut s = script(1, vec![scene(1, "dramatic"), scene(2, SOURCE_VERIFICATION_TONE)]);
        s.hashtags.pop();
        assert!(matches!(s.validate(), Err(StoryError::HashtagCount(4))));
    }

    #[test]
    fn test_append_citations_mutates_last_narration() {
        let mut s = script(1, vec![scene(1, "dramatic"), scene(2, SOURCE_VERIFICATION_TONE)]);
        s.append_citations(&[
            "https://detik.com/a".to_string(),
            "https://kompas.com/b".to_string(),
        ]);
        assert!(s.scenes[1]
            .narration
            .ends_with("REFERENSI URL: https://detik.com/a, https://kompas.com/b"));
        // 其他场景不受影响
        assert_eq!(s.scenes[0].narration, "narration 1");
    }

    #[test]
    fn test_append_citations_empty_is_noop() {
        let mut s = script(1, vec![scene(1, "dramatic"), scene(2, SOURCE_VERIFICATION_TONE)]);
        let before = s.scenes[1].narration.clone();
        s.append_citations(&[]);
        assert_eq!(s.scenes[1].narration, before);
    }

    #[test]
    fn test_deserializes_provider_field_names() {
        let json = serde_json::json!({
            "title": "Test",
            "numScenes": 1,
            "visualStyle": "Cinematic",
            "language": "id",
            "scenes": [
                {
                    "number": 1,
                    "narration": "n1",
                    "tone": "dramatic",
                    "structuredPrompt1": serde_json::to_value(prompt()).unwrap(),
                    "structuredPrompt2": serde_json::to_value(prompt()).unwrap()
                },
                {
                    "number": 2,
                    "narration": "MEDIA: detik.com | JUDUL BERITA: x | RINGKASAN: y | VALIDASI: z",
                    "tone": "SOURCE_VERIFICATION",
                    "structuredPrompt1": serde_json::to_value(prompt()).unwrap(),
                    "structuredPrompt2": serde_json::to_value(prompt()).unwrap()
                }
            ],
            "tiktokCover": "tk",
            "youtubeCover": "yt",
            "hashtags": ["#1", "#2", "#3", "#4", "#5"]
        });
        let script: StoryScript = serde_json::from_value(json).unwrap();
        assert!(script.validate().is_ok());
        assert_eq!(script.tiktok_cover, "tk");
    }
}
