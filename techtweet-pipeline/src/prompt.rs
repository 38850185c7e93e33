//! Instruction text sent to the completion model.
//!
//! Headline titles are embedded verbatim; they are not sanitized.
use serde::{Deserialize, Serialize};
use techtweet_news::Headline;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    /// Expert-developer framing with categorized technical hashtags.
    #[default]
    Professional,
    /// Summary plus a question or call to action and a hashtag burst.
    Engaging,
}

/// Build the prompt for `day` of `cycle`, from a headline when there is one.
pub fn build_prompt(day: u32, cycle: u32, style: PromptStyle, headline: Option<&Headline>) -> String {
    match headline {
        None => fallback_prompt(day, cycle),
        Some(h) => match style {
            PromptStyle::Professional => professional_prompt(day, cycle, &h.title),
            PromptStyle::Engaging => engaging_prompt(day, cycle, &h.title),
        },
    }
}

fn fallback_prompt(day: u32, cycle: u32) -> String {
    format!(
        "Day {day} of {cycle}: Generate a tweet about software development, tips and tricks, \
         or something new in tech. Keep it under 280 characters, use emojis if appropriate, \
         and make it engaging."
    )
}

fn professional_prompt(day: u32, cycle: u32, title: &str) -> String {
    format!(
        r#"Day {day} of {cycle}: Create a professional technical tweet about programming languages and development, inspired by: "{title}".

Requirements:
1. Focus on technical depth and professional insights about programming languages (Python, JavaScript, Java, C++, C#, etc.)
2. Include specific technical details, best practices, or advanced concepts
3. Add relevant technical hashtags:
   - Language-specific: #Python #JavaScript #Java #Cpp #CSharp
   - Technical: #SoftwareEngineering #WebDev #BackendDev #FrontendDev
   - Advanced: #SystemDesign #Architecture #CleanCode #DevOps
4. Use professional emojis (💻 🛠️ ⚡ 🔧)
5. Keep it under 280 characters
6. Make it sound like an expert developer sharing knowledge
7. Include a technical tip or best practice if relevant

Don't include the source or date."#
    )
}

fn engaging_prompt(day: u32, cycle: u32, title: &str) -> String {
    format!(
        r#"Day {day} of {cycle}: Create an engaging tweet about this tech headline: "{title}".
Include:
1. A brief, interesting summary or key takeaway
2. A thought-provoking question or call-to-action
3. 8-10 relevant hashtags (like #TechNews #Coding #Programming #AI #WebDev)
4. Appropriate emojis
5. Keep it under 280 characters
6. Write it as an expert developer would
Don't include the source or date."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headline(title: &str) -> Headline {
        Headline {
            title: title.to_string(),
            image_url: None,
            published_at: None,
        }
    }

    #[test]
    fn fallback_names_the_day() {
        let p = build_prompt(17, 100, PromptStyle::Professional, None);
        assert!(p.starts_with("Day 17 of 100: Generate a tweet about software development"));
        assert!(p.contains("280 characters"));
    }

    #[test]
    fn professional_embeds_title_verbatim() {
        let title = r#"Python 3.13 drops the GIL "experimentally""#;
        let p = build_prompt(3, 100, PromptStyle::Professional, Some(&headline(title)));
        assert!(p.starts_with("Day 3 of 100:"));
        assert!(p.contains(title));
        assert!(p.contains("expert developer"));
        assert!(p.contains("#SystemDesign"));
        assert!(p.ends_with("Don't include the source or date."));
    }

    #[test]
    fn engaging_asks_for_hashtag_burst() {
        let p = build_prompt(9, 30, PromptStyle::Engaging, Some(&headline("WebGPU lands")));
        assert!(p.starts_with("Day 9 of 30:"));
        assert!(p.contains("\"WebGPU lands\""));
        assert!(p.contains("8-10 relevant hashtags"));
        assert!(p.contains("call-to-action"));
        assert!(p.contains("expert developer"));
        assert!(p.ends_with("Don't include the source or date."));
    }

    #[test]
    fn every_headline_style_keeps_the_shared_contract() {
        let h = headline("Rust in the kernel");
        for style in [PromptStyle::Professional, PromptStyle::Engaging] {
            let p = build_prompt(1, 100, style, Some(&h));
            assert!(p.contains("\"Rust in the kernel\""), "{style:?}");
            assert!(p.contains("280 characters"), "{style:?}");
            assert!(p.contains("expert developer"), "{style:?}");
            assert!(p.contains("hashtags"), "{style:?}");
            assert!(p.contains("emojis"), "{style:?}");
        }
    }
}
