use crate::model::settings::Language;

const KOREAN: &str = "
# 저는 번역 애플리케이션의 백엔드 AI입니다. 다음 텍스트를 한국어로 번역해야 합니다.
- 번역투 대신 가능한 자연스러운 한국어로 번역하세요.
- 순수한 번역 텍스트만 제공하며 마크다운 형식으로 변경하지 마세요.
- 번역된 텍스트는 원래의 문단을 가능한 유지하며, 원문에 없는 줄바꿈(\n)을 추가하지 마세요.
- 번역문 이외의 추가적인 코멘트나 설명을 제외하고, 번역된 텍스트만 제공하세요.
";

const ENGLISH: &str = "
# I am the backend AI of a translation application. Please translate the following text into English.
- Provide only the pure translation text.
- The translated text should maintain the original format and line breaks, without arbitrarily changing to Markdown format.
- Provide only the translated text, excluding any additional explanations.
- Translate the entire content without omitting any part of the original text.
";

const JAPANESE: &str = "
# 私は翻訳アプリケーションのバックエンドAIです。次のテキストを日本語に翻訳してください。
- 純粋な翻訳テキストのみを提供してください。
- 翻訳されたテキストは元の形式と改行を維持し、任意にMarkdown形式に変更しないでください。
- 追加の説明を除き、翻訳されたテキストのみを提供してください。
- 原文の内容を全て含め、何も省略せずに翻訳してください。
";

pub fn template(language: Language) -> &'static str {
    match language {
        Language::Korean => KOREAN,
        Language::English => ENGLISH,
        Language::Japanese => JAPANESE,
    }
}

/// Instruction (override or language template), a blank line, then one name per line.
pub fn build_prompt(language: Language, custom_prompt: Option<&str>, names: &[String]) -> String {
    let instruction = match custom_prompt.map(str::trim) {
        Some(p) if !p.is_empty() => p,
        _ => template(language),
    };

    let mut p = String::with_capacity(instruction.len() + names.len() * 32);
    p.push_str(instruction);
    p.push_str("\n\n");
    p.push_str(&names.join("\n"));
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_the_template() {
        let names = vec!["a.txt".to_string(), "b.txt".to_string()];
        let p = build_prompt(Language::English, None, &names);
        assert!(p.starts_with(ENGLISH));
        assert!(p.ends_with("\n\na.txt\nb.txt"));
    }

    #[test]
    fn korean_template_names_a_real_line_break() {
        assert!(KOREAN.contains("줄바꿈(\n)을"));
        assert!(!KOREAN.contains('\\'));
    }

    #[test]
    fn custom_prompt_replaces_template() {
        let names = vec!["x".to_string()];
        let p = build_prompt(Language::Korean, Some("Translate to French."), &names);
        assert_eq!(p, "Translate to French.\n\nx");
    }

    #[test]
    fn blank_custom_prompt_falls_back() {
        let names = vec!["x".to_string()];
        let p = build_prompt(Language::Japanese, Some("  "), &names);
        assert!(p.starts_with(JAPANESE));
    }
}
