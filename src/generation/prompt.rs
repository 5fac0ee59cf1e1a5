//! Prompt templates for quiz explanations.

/// Persona given to the model as the system message.
pub const SYSTEM_PROMPT: &str = "당신은 피싱/스캠 예방 전문가 \"탐정 안속아\"입니다. MZ세대에게 친근하게 설명하는 것이 특기입니다.";

/// Build the user prompt for one quiz item.
///
/// Scam items get the numbered `scam_points` in their given order; legitimate
/// items ignore them. `content` is embedded verbatim.
pub fn build_prompt(content: &str, is_scam: bool, scam_points: &[String]) -> String {
    if is_scam {
        let points = scam_points
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}. {}", i + 1, p))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "다음 메시지는 사기입니다. MZ세대가 이해하기 쉽게 왜 사기인지 설명해주세요.\n\n\
             메시지: \"{content}\"\n\n\
             사기 판별 포인트:\n\
             {points}\n\n\
             위 포인트를 바탕으로 친근하고 이해하기 쉬운 말투로 설명해주세요. 이모지는 사용하지 마세요."
        )
    } else {
        format!(
            "다음 메시지는 정상적인 메시지입니다. MZ세대가 이해하기 쉽게 왜 안전한지 설명해주세요.\n\n\
             메시지: \"{content}\"\n\n\
             이 메시지가 안전한 이유를 친근하고 이해하기 쉬운 말투로 설명해주세요. 이모지는 사용하지 마세요."
        )
    }
}
