/// Short-form video script prompt

const SCRIPT_TEMPLATE: &str = "\
You are a professional TikTok/Instagram content strategist and scriptwriter. \
Using the refined idea, return a complete short-form video script with this structure:

[Hook - 3 sec]
Style: (speaking / non-speaking / high-energy / slow-pace / time-lapse)
Visuals: (describe the visuals)
B-roll: (describe exact b-roll)
You: (the hook line)

[Body - 15 sec]
Break this into 3-5 sentences. For EACH sentence, include:
- Style: (speaking / non-speaking / high-energy / slow-pace / montage / timelapse)
- Visuals: (describe visuals)
- B-roll: (detailed shot ideas)
- You: (dialogue or narration)

[Wrap-up - 5 sec]
Style: (speaking / non-speaking / aesthetic)
Visuals: (describe visuals)
B-roll: (describe closer shot)
You: (final CTA line)

IMPORTANT:
- Keep lines short, high retention.
- Make it platform-optimized.
- Visual instructions must be specific.
- B-roll must match the sentence perfectly.
- Tone must be energetic, educational, or emotional depending on the idea.";

const CLOSING: &str = "Keep it simple, practical, beginner-friendly, and engaging. \
Focus on clear, actionable content that gets straight to the point.";

/// Builds the prompt; blank hook or sketch lines are left out
pub fn concept_prompt(title: &str, hook: Option<&str>, rough_sketch: Option<&str>) -> String {
    let mut prompt = String::with_capacity(SCRIPT_TEMPLATE.len() + 256);
    prompt.push_str(SCRIPT_TEMPLATE);
    prompt.push_str("\n\nVideo Title: ");
    prompt.push_str(title.trim());

    if let Some(hook) = hook.map(str::trim).filter(|h| !h.is_empty()) {
        prompt.push_str("\nHook: ");
        prompt.push_str(hook);
    }
    if let Some(sketch) = rough_sketch.map(str::trim).filter(|s| !s.is_empty()) {
        prompt.push_str("\nRough Sketch: ");
        prompt.push_str(sketch);
    }

    prompt.push_str("\n\n");
    prompt.push_str(CLOSING);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_inputs() {
        let prompt = concept_prompt("Morning routine", Some("Wake at 5"), Some("cold shower"));
        assert!(prompt.contains("[Hook - 3 sec]"));
        assert!(prompt.contains("[Wrap-up - 5 sec]"));
        assert!(prompt.contains("Video Title: Morning routine"));
        assert!(prompt.contains("Hook: Wake at 5"));
        assert!(prompt.contains("Rough Sketch: cold shower"));
        assert!(prompt.ends_with(CLOSING));
    }

    #[test]
    fn test_prompt_omits_blank_optionals() {
        let prompt = concept_prompt("Desk tour", Some("  "), None);
        assert!(!prompt.contains("\nHook:"));
        assert!(!prompt.contains("Rough Sketch:"));
    }
}
