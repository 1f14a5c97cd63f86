//! Prompt tokens that mark a line as an executable example.

/// Prompts introducing an example whose expected output is a value.
pub const NORMAL_PROMPTS: [&str; 3] = [">>>", "$$$", "%%%"];

/// Prompt introducing an example expected to raise an exception.
pub const EXCEPTION_PROMPT: &str = "!!!";

/// Every recognized prompt, normal prompts first.
pub const PROMPTS: [&str; 4] = [
    NORMAL_PROMPTS[0],
    NORMAL_PROMPTS[1],
    NORMAL_PROMPTS[2],
    EXCEPTION_PROMPT,
];

/// Whether `marker` denotes the exception prompt.
pub fn is_exception_prompt(marker: &str) -> bool {
    marker.contains(EXCEPTION_PROMPT)
}

/// The prompt a line starts with, ignoring leading spaces.
pub fn leading_prompt(line: &str) -> Option<&'static str> {
    let rest = line.trim_start_matches(' ');
    PROMPTS.into_iter().find(|prompt| rest.starts_with(prompt))
}

/// Alternation of all prompts, escaped for use inside a regex.
pub(crate) fn prompt_alternation() -> String {
    PROMPTS
        .iter()
        .map(|prompt| regex::escape(prompt))
        .collect::<Vec<_>>()
        .join("|")
}
