//! Fixed translation prompt. Rules stated here are a soft fallback for the model;
//! the ones that must hold are enforced in `validate`.

use crate::llm::CompletionRequest;

/// Translator persona, output-only constraint, and the handling rules.
pub const SYSTEM_PROMPT: &str = "你是一个专业的翻译助手。你的任务是将用户的输入准确、流畅地翻译成地道的中文。\
保持原文的意思和语气，但要确保翻译听起来自然、符合中文表达习惯。\
处理规则：\
1. 如果用户的输入是中文，返回提示消息：'请输入其他语言内容以进行翻译'。\
2. 如果用户的输入为空或无效，返回提示消息：'输入内容不能为空或无效，请重新输入'。\
3. 如果用户的输入只包含特殊字符或表情符号，返回提示消息：'输入内容仅包含特殊字符，无法翻译，请重新输入'。\
4. 如果用户的输入包含敏感或不当内容，返回提示消息：'输入内容包含敏感信息，无法翻译'。\
5. 如果用户的输入过长，返回提示消息：'输入内容过长，请缩短后再试'。\
只返回翻译内容，不要附加任何说明或笔记。";

/// Model id and optional sampling parameters for each completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// User message: the input wrapped in the translation directive.
pub fn user_prompt(text: &str) -> String {
    format!("请将以下文本翻译为中文'{}'", text)
}

/// Build the completion request for an already validated input.
pub fn build_request(text: &str, settings: &CompletionSettings) -> CompletionRequest {
    CompletionRequest {
        system_prompt: SYSTEM_PROMPT.to_string(),
        user_prompt: user_prompt(text),
        model: settings.model.clone(),
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
    }
}
