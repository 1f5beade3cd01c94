//! Interview-coach prompt and request shaping.

use serde::Serialize;

/// Output token cap sent with every request.
pub const MAX_OUTPUT_TOKENS: u32 = 3000;
/// Sampling temperature sent with every request.
pub const TEMPERATURE: f64 = 0.8;

/// Fixed instruction prefixed to every question.
pub const COACH_PROMPT: &str = "你是一名非常资深的AI产品经理。我是一个正在进行AI产品求职的人。我会向你请教一系列AI产品经理面试问题，希望你能结合 AI 产品的特性、行业实践和自身对岗位的理解，给出逻辑清晰、内容详实且有深度的回答。

回答时请遵循以下原则：
只需要进行问题的回答，无需寒暄客套。
字数限制在2000字以内;
针对性：紧密围绕问题核心，不偏离主题；
专业性：体现对 AI 技术（如大模型能力边界、数据安全、算法逻辑等）的扎实认知，不出现技术认知错误；
产品思维：必须有产品经理必备的思维（如用户需求分析、产品定位、迭代策略等）；
商业思维：如果涉及实际业务应用，需要考虑落地性、商业化等问题，体现出商业思维。
表达：语言简洁，用词专业，结构化，采用 \"观点 + 分析 \" 的模式，先用核心观点回应，再分点展开分析。
案例：如果只讨论理论不足以解释问题，必要时可结合过往经验或行业案例佐证（可合理虚构符合逻辑的经历）；
前瞻性：在回答中体现对 AI 产品发展趋势的思考，如AI产品体验与比较、技术与场景的结合、用户体验的优化方向、伦理合规等潜在问题的应对思路；
";

/// Chat-completion request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// One chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
}

/// Multimodal content part; only text is produced here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
}

impl ChatRequest {
    /// Builds the single user turn asking `question` under `category`.
    pub fn interview_question(model: &str, question: &str, category: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![ContentPart::Text {
                    text: compose_prompt(question, category),
                }],
            }],
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

/// Coach prompt followed by the category and the literal question.
pub fn compose_prompt(question: &str, category: &str) -> String {
    format!("{COACH_PROMPT}\n\n类别: {category}\n问题: {question}")
}

#[cfg(test)]
mod tests {
    use super::{compose_prompt, ChatRequest, COACH_PROMPT};
    use serde_json::json;

    #[test]
    fn prompt_ends_with_category_and_question() {
        let prompt = compose_prompt("什么是RAG？", "技术原理与基础概念");
        assert!(prompt.starts_with(COACH_PROMPT));
        assert!(prompt.ends_with("类别: 技术原理与基础概念\n问题: 什么是RAG？"));
    }

    #[test]
    fn request_serializes_to_provider_shape() {
        let request = ChatRequest::interview_question("model-x", "Q", "C");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], json!("model-x"));
        assert_eq!(value["max_tokens"], json!(3000));
        assert_eq!(value["temperature"], json!(0.8));
        assert_eq!(value["messages"].as_array().unwrap().len(), 1);
        assert_eq!(value["messages"][0]["role"], json!("user"));
        assert_eq!(value["messages"][0]["content"][0]["type"], json!("text"));
        let text = value["messages"][0]["content"][0]["text"].as_str().unwrap();
        assert!(text.ends_with("问题: Q"));
    }
}
