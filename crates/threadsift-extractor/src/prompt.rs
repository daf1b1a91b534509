//! LLM prompt engineering for feedback extraction

use threadsift_domain::{ExtractionPrompt, Thread};

/// Separator between the labeled sections of the combined thread text
const SECTION_SEPARATOR: &str = "\n------\n";

/// Builds the extraction prompt for one thread
///
/// Pure and deterministic: the same thread always yields the same prompt.
pub struct PromptBuilder<'a> {
    thread: &'a Thread,
    max_comments: usize,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder for `thread`
    pub fn new(thread: &'a Thread) -> Self {
        Self {
            thread,
            max_comments: usize::MAX,
        }
    }

    /// Limit the number of comments included
    pub fn with_max_comments(mut self, max_comments: usize) -> Self {
        self.max_comments = max_comments;
        self
    }

    /// The thread's title, body and comments under labeled sections
    ///
    /// Missing fields render as empty strings rather than being omitted.
    pub fn combined_text(&self) -> String {
        let comments = self
            .thread
            .comment_list()
            .iter()
            .take(self.max_comments)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "title: {}{sep}post: {}{sep}comments: {}",
            self.thread.title,
            self.thread.body_text(),
            comments,
            sep = SECTION_SEPARATOR,
        )
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> ExtractionPrompt {
        let mut user = String::from(USER_INSTRUCTION);
        user.push_str("\nText:\n");
        user.push_str(&self.combined_text());

        ExtractionPrompt::new(SYSTEM_INSTRUCTIONS, user)
    }
}

const USER_INSTRUCTION: &str = "Extract all user feedback, complaints, feature requests, or opinions from the following Reddit post in a valid format.";

const SYSTEM_INSTRUCTIONS: &str = r#"Extract issues, topics and feedback from the text that will help in product development.
The text has the title, the post and the comments of a discussion thread. The post is the main factor; use the comments to decide whether the issue was resolved.

Return exactly one JSON object with these keys:

{
  "content": "the feedback text (title - post)",
  "type": "complaint" | "feature request" | "opinion",
  "build": "build number if mentioned, else empty",
  "version": "product version if mentioned, else empty",
  "sentiment": "positive" | "negative" | "neutral",
  "severity": "low" | "medium" | "high",
  "resolved": true | false,
  "resolve_text": "how it was resolved, else empty"
}

Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;
