//! # Prompt Templates and Canonical Replies
//!
//! Thai-language templates used by the resolution pipeline. The engine
//! produces semantic content only; the delivery boundary owns any
//! localization suffix (e.g. a trailing " ค่ะ").

/// The generation prompt when the user's name is known.
///
/// Placeholders: `{name}`, `{max_words}`, `{utterance}`
pub const GENERATION_USER_PROMPT_WITH_NAME: &str =
    "ผู้ถามชื่อ คุณ{name} ตอบสั้นๆไม่เกิน {max_words} คำ เกี่ยวกับ '{utterance}'";

/// The generation prompt when no name has been learned yet.
///
/// Placeholders: `{max_words}`, `{utterance}`
pub const GENERATION_USER_PROMPT: &str =
    "ตอบสั้นๆไม่เกิน {max_words} คำ เกี่ยวกับ '{utterance}'";

/// Reply template when the user asks for their stored name.
pub const NAME_RECALL_REPLY: &str = "ชื่อของคุณคือ {name}";

/// Reply when the user asks for their name but none is stored.
pub const NAME_UNKNOWN_REPLY: &str = "ขอโทษค่ะ ฉันไม่ทราบชื่อของคุณ";

/// Reply template after a successful self-introduction.
pub const NAME_THANKS_REPLY: &str = "ขอบคุณที่แนะนำตัวค่ะ {name}";

/// Reply when an introduction was detected but no name could be extracted.
pub const NAME_ASK_AGAIN_REPLY: &str = "ไม่สามารถระบุชื่อได้ กรุณาระบุชื่อของคุณค่ะ";

/// Reply for an utterance that is empty after normalization.
pub const EMPTY_UTTERANCE_REPLY: &str = "ขอโทษค่ะ ไม่เข้าใจคำถาม กรุณาลองใหม่";

/// User-visible reply when the embedding collaborator fails.
pub const ENCODING_FAILURE_REPLY: &str = "ขอโทษค่ะ ตอนนี้ยังไม่เข้าใจคำถาม กรุณาลองใหม่อีกครั้ง";

/// User-visible reply when the knowledge store is unreachable.
pub const STORE_FAILURE_REPLY: &str = "ขอโทษค่ะ ระบบขัดข้อง กรุณาลองใหม่ภายหลัง";

/// User-visible reply when the generative fallback fails.
pub const GENERATION_FAILURE_REPLY: &str = "ขอโทษด้วย ฉันไม่สามารถให้คำตอบนี้ได้";

/// Canonical phrasings of "what is my name", matched semantically with the
/// name-query threshold.
pub const NAME_QUERY_PHRASES: &[&str] = &["ชื่ออะไร", "ผมชื่ออะไร", "ชื่อของฉัน"];

/// Polite sentence endings stripped during normalization. Longer endings come
/// first so that stripping "นะ" cannot leave a "จ้ะ" residue behind.
pub const POLITE_ENDINGS: &[&str] = &["นะจ้ะ", "ครับ", "ค่ะ", "น้ะ", "นะ"];

/// Builds the generation prompt for the fallback model.
pub fn generation_prompt(name: Option<&str>, utterance: &str, max_words: usize) -> String {
    let max_words = max_words.to_string();
    match name {
        Some(name) => GENERATION_USER_PROMPT_WITH_NAME
            .replace("{name}", name)
            .replace("{max_words}", &max_words)
            .replace("{utterance}", utterance),
        None => GENERATION_USER_PROMPT
            .replace("{max_words}", &max_words)
            .replace("{utterance}", utterance),
    }
}

/// Builds the reply that recalls the user's stored name.
pub fn name_recall_reply(name: &str) -> String {
    NAME_RECALL_REPLY.replace("{name}", name)
}

/// Builds the reply that thanks the user for introducing themselves.
pub fn name_thanks_reply(name: &str) -> String {
    NAME_THANKS_REPLY.replace("{name}", name)
}
