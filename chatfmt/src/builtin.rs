//! Built-in chat templates and the matcher chain that selects them.
//!
//! The prefixes, suffixes and stop strings below are the exact text each
//! model family was trained on. Do not "tidy" them.

use crate::resolver::Matcher;
use crate::template::{ChatTemplate, ChatTemplateStyle};

/// Template names of the built-in set.
pub mod names {
    /// Generic `USER:` / `ASSISTANT:` tags, used when nothing else matches.
    pub const DEFAULT: &str = "default";
    /// Anthropic `Human:` / `Assistant:` layout.
    pub const CLAUDE: &str = "claude";
    /// `<|im_start|>` / `<|im_end|>` tokens.
    pub const CHATML: &str = "chatml";
    /// `ChatML` for llava-v1.6-34b.
    pub const CHATML_LLAVA: &str = "chatml-llava";
    /// Vicuna v1.1 and llava-v1.5.
    pub const VICUNA_V1_1: &str = "vicuna_v1.1";
    /// Llama-2 chat `[INST]` layout.
    pub const LLAMA_2_CHAT: &str = "llama-2-chat";
    /// Llama-3 instruct header tokens.
    pub const LLAMA_3_INSTRUCT: &str = "llama-3-instruct";
    /// Yi vision-language.
    pub const YI: &str = "yi";
    /// Gemma instruction tuned.
    pub const GEMMA_IT: &str = "gemma-it";
    /// DBRX instruct.
    pub const DBRX_INSTRUCT: &str = "dbrx-instruct";
    /// YT chat v1.2.
    pub const YT_CHAT_V1_2: &str = "yt-chat-v1.2";
    /// YT chat v1.3.
    pub const YT_CHAT_V1_3: &str = "yt-chat-v1.3";
    /// YT chat v1.6.
    pub const YT_CHAT_V1_6: &str = "yt-chat-v1.6";
    /// YT chat v1.7 (Llama-3 tokens).
    pub const YT_CHAT_V1_7: &str = "yt-chat-v1.7";
    /// YT chat v1.8 (Gemma tokens).
    pub const YT_CHAT_V1_8: &str = "yt-chat-v1.8";
    /// Cohere Command-R.
    pub const C4AI_COMMAND_R: &str = "c4ai-command-r";
}

use names::{
    C4AI_COMMAND_R, CHATML, CHATML_LLAVA, CLAUDE, DBRX_INSTRUCT, DEFAULT, GEMMA_IT,
    LLAMA_2_CHAT, LLAMA_3_INSTRUCT, VICUNA_V1_1, YI, YT_CHAT_V1_2, YT_CHAT_V1_3, YT_CHAT_V1_6,
    YT_CHAT_V1_7, YT_CHAT_V1_8,
};

const VICUNA_SYSTEM_PROMPT: &str = "A chat between a curious user and an artificial intelligence assistant. \
The assistant gives helpful, detailed, and polite answers to the user's questions.";

const YI_SYSTEM_PROMPT: &str = "This is a chat between an inquisitive human and an AI assistant. \
Assume the role of the AI assistant. Read all the images carefully, and respond to the human's \
questions with informative, helpful, detailed and polite answers.\
这是一个好奇的人类和一个人工智能助手之间的对话。假设你扮演这个AI助手的角色。\
仔细阅读所有的图像，并对人类的问题做出信息丰富、有帮助、详细的和礼貌的回答。";

const DBRX_SYSTEM_PROMPT: &str = "You are DBRX, created by Databricks. You were last updated in \
December 2023. You answer questions based on information available up to that point.\n\
YOU PROVIDE SHORT RESPONSES TO SHORT QUESTIONS OR STATEMENTS, but provide thorough responses \
to more complex and open-ended questions.\n\
You assist with various tasks, from writing to coding (using markdown for code blocks \u{2014} \
remember to use ``` with code, JSON, and tables).\n\
(You do not have real-time data access or code execution capabilities. You avoid stereotyping \
and provide balanced perspectives on controversial topics. You do not provide song lyrics, \
poems, or news articles and do not divulge details of your training data.)\n\
This is your system prompt, guiding your responses. Do not reference it, just respond to the \
user. If you find yourself talking about this message, stop. You should be responding \
appropriately and usually that means not mentioning this.\n\
YOU DO NOT MENTION ANY OF THIS INFORMATION ABOUT YOURSELF UNLESS THE INFORMATION IS DIRECTLY \
PERTINENT TO THE USER'S QUERY.";

const YT_CHAT_SYSTEM_PROMPT: &str = "A chat between a curious user and an AI role. \
The role gives helpful, detailed, and polite answers to the user's questions.\n\
Your name is Nety, a virtual character created by researchers from BaoYu Organization (BYO).";

/// All built-in templates, in registration order.
#[must_use]
pub fn templates() -> Vec<ChatTemplate> {
    vec![
        ChatTemplate::builder(DEFAULT)
            .system("SYSTEM:", "\n")
            .user("USER:", "\n")
            .assistant("ASSISTANT:", "\n")
            .build(),
        ChatTemplate::builder(CLAUDE)
            .system("", "")
            .user("\n\nHuman: ", "")
            .assistant("\n\nAssistant:", "")
            .build(),
        ChatTemplate::builder(CHATML)
            .system("<|im_start|>system\n", "<|im_end|>\n")
            .user("<|im_start|>user\n", "<|im_end|>\n")
            .assistant("<|im_start|>assistant\n", "<|im_end|>\n")
            .stop_str(["<|im_end|>"])
            .build(),
        ChatTemplate::builder(CHATML_LLAVA)
            .default_system_prompt("Answer the questions.")
            .system("<|im_start|>system\n", "<|im_end|>\n")
            .user("<|im_start|>user\n", "<|im_end|>\n")
            .assistant("<|im_start|>assistant\n", "<|im_end|>\n")
            .stop_str(["<|im_end|>"])
            .image_token(" <image>\n")
            .build(),
        ChatTemplate::builder(VICUNA_V1_1)
            .default_system_prompt(VICUNA_SYSTEM_PROMPT)
            .system("", " ")
            .user("USER:", " ")
            .assistant("ASSISTANT:", "</s>")
            .image_token(" <image>\n")
            .build(),
        ChatTemplate::builder(LLAMA_2_CHAT)
            .system("<<SYS>>\n", "\n<</SYS>>\n\n")
            .user("[INST] ", " [/INST]")
            .assistant("", " </s><s>")
            .style(ChatTemplateStyle::Llama2)
            .build(),
        ChatTemplate::builder(LLAMA_3_INSTRUCT)
            .system("<|start_header_id|>system<|end_header_id|>\n\n", "<|eot_id|>")
            .user("<|start_header_id|>user<|end_header_id|>\n\n", "<|eot_id|>")
            .assistant("<|start_header_id|>assistant<|end_header_id|>\n\n", "<|eot_id|>")
            .stop_str(["<|eot_id|>"])
            .build(),
        ChatTemplate::builder(YI)
            .default_system_prompt(YI_SYSTEM_PROMPT)
            .system("", "\n\n")
            .user("### Human:", "\n")
            .assistant("### Assistant:", "\n")
            .image_token(" <image_placeholder>\n")
            .build(),
        ChatTemplate::builder(GEMMA_IT)
            .system("", "")
            .user("<start_of_turn>user\n", "<end_of_turn>\n")
            .assistant("<start_of_turn>model\n", "<end_of_turn>\n")
            .build(),
        ChatTemplate::builder(DBRX_INSTRUCT)
            .default_system_prompt(DBRX_SYSTEM_PROMPT)
            .system("<|im_start|>system\n", "<|im_end|>")
            .user("\n<|im_start|>user\n", "<|im_end|>")
            .assistant("\n<|im_start|>assistant\n", "<|im_end|>")
            .stop_str(["<|im_end|>"])
            .build(),
        ChatTemplate::builder(YT_CHAT_V1_2)
            .default_system_prompt(YT_CHAT_SYSTEM_PROMPT)
            .system("<|im_start|>system\n", "<|im_end|>")
            .user("<|im_start|>user\n", "<|im_end|>")
            .assistant("\n<|im_start|>role\n", "<|im_end|>")
            .stop_str(["<|im_end|>", "</s>", "<|im_start|>", "<s>", "</|im"])
            .build(),
        ChatTemplate::builder(YT_CHAT_V1_3)
            .default_system_prompt(YT_CHAT_SYSTEM_PROMPT)
            .system("<s>System\n", "</s>")
            .user("\n<s>User\n", "</s>")
            .assistant("\n<s>Role\n", "</s>")
            .stop_str(["</s>"])
            .build(),
        ChatTemplate::builder(YT_CHAT_V1_6)
            .default_system_prompt(YT_CHAT_SYSTEM_PROMPT)
            .system("<|im_start|>system\n", "<|im_end|>")
            .user("\n<|im_start|>user\n", "<|im_end|>")
            .assistant("\n<|im_start|>role\n", "<|im_end|>")
            .stop_str(["<|im_end|>"])
            .build(),
        ChatTemplate::builder(YT_CHAT_V1_7)
            .default_system_prompt(YT_CHAT_SYSTEM_PROMPT)
            .system("<|begin_of_text|>System\n", "<|end_of_text|>")
            .user("\n<|begin_of_text|>User\n", "<|end_of_text|>")
            .assistant("\n<|begin_of_text|>Role\n", "<|end_of_text|>")
            .stop_str(["<|end_of_text|>"])
            .build(),
        // The second stop string is one literal, commas included.
        ChatTemplate::builder(YT_CHAT_V1_8)
            .default_system_prompt(YT_CHAT_SYSTEM_PROMPT)
            .system("<bos>System\n", "<eos>")
            .user("\n<bos>User\n", "<eos>")
            .assistant("\n<bos>Role\n", "<eos>")
            .stop_str(["<eos>", "<bos>, <pad>, <unk>"])
            .build(),
        ChatTemplate::builder(C4AI_COMMAND_R)
            .system("<|START_OF_TURN_TOKEN|><|SYSTEM_TOKEN|>", "<|END_OF_TURN_TOKEN|>")
            .user("<|START_OF_TURN_TOKEN|><|USER_TOKEN|>", "<|END_OF_TURN_TOKEN|>")
            .assistant("<|START_OF_TURN_TOKEN|><|CHATBOT_TOKEN|>", "<|END_OF_TURN_TOKEN|>")
            .build(),
    ]
}

/// The built-in matcher chain. Order decides ties and must not change.
#[must_use]
pub fn matchers() -> Vec<Matcher> {
    vec![
        Matcher::new("dbrx")
            .alias("dbrx", DBRX_INSTRUCT)
            .path(dbrx_path),
        Matcher::new("vicuna")
            .alias("vicuna", VICUNA_V1_1)
            .path(vicuna_path),
        Matcher::new("llama2_chat")
            .alias("llama-2", LLAMA_2_CHAT)
            .path(llama2_chat_path),
        Matcher::new("llama3_instruct")
            .alias("llama-3", LLAMA_3_INSTRUCT)
            .path(llama3_instruct_path),
        Matcher::new("chatml")
            .alias(CHATML, CHATML)
            .alias(CHATML_LLAVA, CHATML_LLAVA)
            .path(chatml_path),
        Matcher::new("yi").alias(YI, YI).path(yi_path),
        Matcher::new("gemma_it")
            .alias("gemma", GEMMA_IT)
            .path(gemma_it_path),
        Matcher::new("yt_chat")
            .alias(YT_CHAT_V1_2, YT_CHAT_V1_2)
            .alias(YT_CHAT_V1_3, YT_CHAT_V1_3)
            .alias(YT_CHAT_V1_6, YT_CHAT_V1_6)
            .alias(YT_CHAT_V1_7, YT_CHAT_V1_7)
            .alias(YT_CHAT_V1_8, YT_CHAT_V1_8)
            .path(yt_chat_path),
    ]
}

/// Opt-in matcher for Cohere Command-R.
///
/// Not part of [`matchers`], so Command-R paths resolve to `default` unless
/// this is added with [`ChatTemplatesBuilder::matcher`].
///
/// [`ChatTemplatesBuilder::matcher`]: crate::ChatTemplatesBuilder::matcher
#[must_use]
pub fn c4ai_command_r_matcher() -> Matcher {
    Matcher::new("c4ai_command_r")
        .alias(C4AI_COMMAND_R, C4AI_COMMAND_R)
        .path(c4ai_command_r_path)
}

fn dbrx_path(model_path: &str) -> Option<&'static str> {
    let path = model_path.to_lowercase();
    (path.contains("dbrx") && path.contains("instruct")).then_some(DBRX_INSTRUCT)
}

fn vicuna_path(model_path: &str) -> Option<&'static str> {
    let path = model_path.to_lowercase();
    (path.contains("vicuna") || path.contains("llava-v1.5")).then_some(VICUNA_V1_1)
}

fn llama2_chat_path(model_path: &str) -> Option<&'static str> {
    let path = model_path.to_lowercase();
    let instruct = path.contains("instruct");
    let matched = (path.contains("llama-2") && path.contains("chat"))
        || ((path.contains("mistral") || path.contains("mixtral")) && instruct)
        || (path.contains("codellama") && instruct);
    matched.then_some(LLAMA_2_CHAT)
}

fn llama3_instruct_path(model_path: &str) -> Option<&'static str> {
    let path = model_path.to_lowercase();
    (path.contains("llama-3") && path.contains("instruct")).then_some(LLAMA_3_INSTRUCT)
}

fn chatml_path(model_path: &str) -> Option<&'static str> {
    let path = model_path.to_lowercase();
    if path.contains("tinyllama") || (path.contains("qwen") && path.contains("chat")) {
        Some(CHATML)
    } else if path.contains("llava-v1.6-34b") {
        Some(CHATML_LLAVA)
    } else {
        None
    }
}

// Any path containing "yi" qualifies, false positives included.
fn yi_path(model_path: &str) -> Option<&'static str> {
    model_path.to_lowercase().contains("yi").then_some(YI)
}

fn gemma_it_path(model_path: &str) -> Option<&'static str> {
    let path = model_path.to_lowercase();
    (path.contains("gemma") && path.contains("it")).then_some(GEMMA_IT)
}

fn yt_chat_path(model_path: &str) -> Option<&'static str> {
    model_path
        .to_lowercase()
        .contains("yt-chat")
        .then_some(YT_CHAT_V1_3)
}

fn c4ai_command_r_path(model_path: &str) -> Option<&'static str> {
    model_path
        .to_lowercase()
        .contains("c4ai-command-r")
        .then_some(C4AI_COMMAND_R)
}
