use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct VoiceStyle {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
}

pub const LANGUAGES: &[Language] = &[
    Language { code: "en", name: "English" },
    Language { code: "es", name: "Spanish" },
    Language { code: "fr", name: "French" },
    Language { code: "de", name: "German" },
    Language { code: "it", name: "Italian" },
    Language { code: "pt", name: "Portuguese" },
    Language { code: "ru", name: "Russian" },
    Language { code: "ja", name: "Japanese" },
    Language { code: "ko", name: "Korean" },
    Language { code: "zh", name: "Chinese" },
];

pub const STYLES: &[VoiceStyle] = &[
    VoiceStyle { id: 1, name: "Neutral", description: "Standard neutral voice" },
    VoiceStyle { id: 2, name: "Cheerful", description: "Happy and energetic" },
    VoiceStyle { id: 3, name: "Serious", description: "Formal and professional" },
    VoiceStyle { id: 4, name: "Calm", description: "Relaxed and soothing" },
];
