//! Offline reply generator used when no Gemini API key is configured.

use async_trait::async_trait;

use super::{ChatTurn, ReplyError, ReplyGenerator};

/// Keyword-matched replies in the assistant's usual tone. Keywords match
/// whole words only.
const RULES: [(&[&str], &str); 5] = [
    (
        &["hello", "hi", "namaste", "hey"],
        "Namaste Boss, Guru yahan hai!",
    ),
    (
        &["disease", "fungus", "spot", "spots", "blight", "infection"],
        "Lagta hai fungus infection Bhai",
    ),
    (
        &["leaf", "leaves", "plant", "plants", "crop", "crops"],
        "Photo bhejo Sir, check karta hoon",
    ),
    (
        &["water", "irrigation", "humidity"],
        "Subah paani do Boss, shaam nahi",
    ),
    (
        &["thank", "thanks", "shukriya", "dhanyavad"],
        "Koi baat nahi Bhai!",
    ),
];

const FALLBACK: &str = "Sir, abhi offline hoon, thodi der baad try karo";

/// Replies from a fixed keyword table; never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineReplies;

#[async_trait]
impl ReplyGenerator for OfflineReplies {
    async fn generate(
        &self,
        _system_prompt: &str,
        history: &[ChatTurn],
    ) -> Result<String, ReplyError> {
        let message = history
            .last()
            .map(|t| t.text.to_lowercase())
            .unwrap_or_default();
        let words: Vec<&str> = message
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let reply = RULES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| words.contains(k)))
            .map(|(_, reply)| *reply)
            .unwrap_or(FALLBACK);

        Ok(reply.to_string())
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn reply_to(message: &str) -> String {
        OfflineReplies
            .generate("", &[ChatTurn::user(message)])
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn matches_keywords_case_insensitively() {
        assert_eq!(reply_to("HELLO there").await, "Namaste Boss, Guru yahan hai!");
        assert_eq!(reply_to("Leaf pe brown spot hai").await, "Lagta hai fungus infection Bhai");
    }

    #[tokio::test]
    async fn keywords_do_not_match_inside_words() {
        assert_eq!(
            reply_to("which white powder treats this disease?").await,
            "Lagta hai fungus infection Bhai"
        );
        assert_eq!(reply_to("shipment ka status?").await, FALLBACK);
        assert_eq!(reply_to("hi, thanks!").await, "Namaste Boss, Guru yahan hai!");
    }

    #[tokio::test]
    async fn unknown_message_gets_fallback() {
        assert_eq!(reply_to("tractor ka price?").await, FALLBACK);
    }
}
