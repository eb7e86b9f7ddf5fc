//! Prompt texts for the screenplay analysis battery.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — rewording a section's prompt or the shared
//!    system instruction requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect prompts directly without
//!    spinning up a real model, making prompt regressions easy to catch.
//!
//! Each template is a pure `fn(&str) -> String` over the *fenced* screenplay
//! text (see [`fence_screenplay`]); the ordered catalog that drives them
//! lives in [`crate::catalog`]. Callers can override the system instruction
//! via [`crate::config::AnalysisConfig::system_instruction`].

/// System instruction sent with every completion call.
///
/// Used when `AnalysisConfig::system_instruction` is `None`.
pub const SYSTEM_INSTRUCTION: &str = "You are an AI chatbot automating script improvements and \
providing data-driven insights (casting, budget, scheduling, marketing) to film producers.";

/// Delimit the screenplay for safe embedding into a prompt.
///
/// Screenplay text is untrusted input from the model's point of view: it may
/// itself contain the `"""` fence the templates use to mark where the
/// document starts and ends. This function neutralises embedded fences and
/// applies the configured length cap (on a char boundary) before wrapping the
/// text in a fresh fence. Every catalog template receives its screenplay
/// argument already in this form.
pub fn fence_screenplay(text: &str, max_chars: usize) -> String {
    let clipped = match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    };
    let body = clipped.replace("\"\"\"", "\\\"\\\"\\\"");
    format!("\"\"\"{body}\"\"\"")
}

// ── Section templates ────────────────────────────────────────────────────
//
// One function per analysis dimension, in the order the report presents
// them. Wording is part of the product: tightening a prompt changes the
// answers producers see, so edits here should be deliberate.

pub fn logline(screenplay: &str) -> String {
    format!(
        "Write a Hollywood-style logline for my screenplay. It should only contain the logline, \
making it engaging and high-concept.\n\nScreenplay:\n{screenplay}\n"
    )
}

pub fn genre(screenplay: &str) -> String {
    format!(
        "Suggest the genre for the provided screenplay. By genre, we mean a particular type or \
style of literature, art, film, or music recognizable by its special characteristics.\n\n\
Screenplay:\n{screenplay}\n"
    )
}

pub fn top_keywords(screenplay: &str) -> String {
    format!(
        "Give the top 10 keywords of the attached movie screenplay without any explanation.\n\n\
Screenplay:\n{screenplay}\n"
    )
}

pub fn location_setting(screenplay: &str) -> String {
    format!(
        "Give the location setting of the attached movie screenplay, considering only the \
primary location.\n\nScreenplay:\n{screenplay}\n"
    )
}

pub fn synopsis(screenplay: &str) -> String {
    format!("Give only the synopsis of the attached screenplay.\n\nScreenplay:\n{screenplay}\n")
}

pub fn script_score(screenplay: &str) -> String {
    format!(
        "Analyze the attached screenplay and give it a script score out of 10, including:\n\
- Character development score (out of 10) with 1-2 lines explanation\n\
- Plot construction (out of 10) with 1-2 lines explanation\n\
- Dialogue (out of 10) with 1-2 lines explanation\n\
- Originality (out of 10) with 1-2 lines explanation\n\
- Emotional engagement (out of 10) with 1-2 lines explanation\n\
- Theme and message (out of 10) with 1-2 lines explanation\n\
- Overall rating out of 10 with explanation\n\n\
Screenplay:\n{screenplay}\n"
    )
}

pub fn plot_assessment(screenplay: &str) -> String {
    format!(
        "Analyze the attached screenplay and give the plot assessment and enhancement, including:\n\
- 5 points of what is working well (positive aspects)\n\
- 5 points where the screenplay lacks\n\
- 5 points of improvements that may be made\n\
- An overall review of the screenplay\n\n\
Screenplay:\n{screenplay}\n"
    )
}

pub fn character_profiling(screenplay: &str) -> String {
    format!(
        "Analyze the attached screenplay and return character profiling for the main characters, \
including:\n\
- Brief description of each main character\n\
- What is working well for each character\n\
- Areas for improvement\n\
- The archetype for each\n\n\
Screenplay:\n{screenplay}\n"
    )
}

pub fn box_office(screenplay: &str) -> String {
    format!(
        "Analyze the attached screenplay and give its box office prediction with the following \
fields:\n\
- Opening day (global and local)\n\
- Opening week (global and local)\n\
- Opening month (global and local)\n\n\
Screenplay:\n{screenplay}\n"
    )
}
