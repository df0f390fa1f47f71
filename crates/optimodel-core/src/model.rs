//! Closed enums for logical model names and provider identifiers.
//!
//! Both enums are serialized/deserialized with the exact wire strings the
//! original model-routing service used, via `strum`'s `EnumString`/
//! `Display`, the same pattern the provider-dispatch `EngineType` enum uses.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A closed catalog of logical model names a query can request.
///
/// A logical model is provider-agnostic: the same `LogicalModel` can be
/// backed by several `ProviderEntry` rows in the catalog (e.g.
/// `Llama3_70bInstruct` is servable by both Together AI and Bedrock).
/// Every variant carries an explicit `strum`/`serde` wire string rather than
/// relying on `serialize_all = "snake_case"`: these identifiers mix digits,
/// dates, and abbreviations (`Gpt4oMini20240718`, `Llama3_1_8bInstruct`) in
/// ways no single case-conversion rule reproduces consistently, and the
/// exact strings must match the model names the catalog and the original
/// routing service both key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
pub enum LogicalModel {
    #[strum(serialize = "llama_3_8b_instruct")]
    #[serde(rename = "llama_3_8b_instruct")]
    Llama3_8bInstruct,
    #[strum(serialize = "llama_3_70b_instruct")]
    #[serde(rename = "llama_3_70b_instruct")]
    Llama3_70bInstruct,
    #[strum(serialize = "llama_3_1_8b")]
    #[serde(rename = "llama_3_1_8b")]
    Llama3_1_8b,
    #[strum(serialize = "llama_3_1_70b")]
    #[serde(rename = "llama_3_1_70b")]
    Llama3_1_70b,
    #[strum(serialize = "llama_3_1_405b")]
    #[serde(rename = "llama_3_1_405b")]
    Llama3_1_405b,
    #[strum(serialize = "llama_3_1_8b_instruct")]
    #[serde(rename = "llama_3_1_8b_instruct")]
    Llama3_1_8bInstruct,
    #[strum(serialize = "llama_3_1_70b_instruct")]
    #[serde(rename = "llama_3_1_70b_instruct")]
    Llama3_1_70bInstruct,
    #[strum(serialize = "llama_3_1_405b_instruct")]
    #[serde(rename = "llama_3_1_405b_instruct")]
    Llama3_1_405bInstruct,
    #[strum(serialize = "mistral_7b_instruct")]
    #[serde(rename = "mistral_7b_instruct")]
    Mistral7bInstruct,
    #[strum(serialize = "mixtral_8x7b_instruct")]
    #[serde(rename = "mixtral_8x7b_instruct")]
    Mixtral8x7bInstruct,
    #[strum(serialize = "open_mistral_nemo")]
    #[serde(rename = "open_mistral_nemo")]
    OpenMistralNemo,
    #[strum(serialize = "mistral_large_latest")]
    #[serde(rename = "mistral_large_latest")]
    MistralLargeLatest,
    #[strum(serialize = "codestral_latest")]
    #[serde(rename = "codestral_latest")]
    CodestralLatest,
    #[strum(serialize = "claude_3_haiku")]
    #[serde(rename = "claude_3_haiku")]
    Claude3Haiku,
    #[strum(serialize = "claude_3_haiku_20240307")]
    #[serde(rename = "claude_3_haiku_20240307")]
    Claude3Haiku20240307,
    #[strum(serialize = "claude_3_sonnet")]
    #[serde(rename = "claude_3_sonnet")]
    Claude3Sonnet,
    #[strum(serialize = "claude_3_5_sonnet")]
    #[serde(rename = "claude_3_5_sonnet")]
    Claude3_5Sonnet,
    #[strum(serialize = "claude_3_5_sonnet_20240620")]
    #[serde(rename = "claude_3_5_sonnet_20240620")]
    Claude3_5Sonnet20240620,
    #[strum(serialize = "claude_3_5_sonnet_20241022")]
    #[serde(rename = "claude_3_5_sonnet_20241022")]
    Claude3_5Sonnet20241022,
    #[strum(serialize = "gpt_4")]
    #[serde(rename = "gpt_4")]
    Gpt4,
    #[strum(serialize = "gpt_4_turbo")]
    #[serde(rename = "gpt_4_turbo")]
    Gpt4Turbo,
    #[strum(serialize = "gpt_4o")]
    #[serde(rename = "gpt_4o")]
    Gpt4o,
    #[strum(serialize = "gpt_4o_mini")]
    #[serde(rename = "gpt_4o_mini")]
    Gpt4oMini,
    #[strum(serialize = "gpt_4o_mini_2024_07_18")]
    #[serde(rename = "gpt_4o_mini_2024_07_18")]
    Gpt4oMini20240718,
    #[strum(serialize = "gpt_4o_2024_08_06")]
    #[serde(rename = "gpt_4o_2024_08_06")]
    Gpt4o20240806,
    #[strum(serialize = "gpt_4o_2024_05_13")]
    #[serde(rename = "gpt_4o_2024_05_13")]
    Gpt4o20240513,
    #[strum(serialize = "gpt_3_5_turbo")]
    #[serde(rename = "gpt_3_5_turbo")]
    Gpt35Turbo,
    #[strum(serialize = "gpt_3_5_turbo_0125")]
    #[serde(rename = "gpt_3_5_turbo_0125")]
    Gpt35Turbo0125,
    #[strum(serialize = "o1_preview")]
    #[serde(rename = "o1_preview")]
    O1Preview,
    #[strum(serialize = "o1_preview_2024_09_12")]
    #[serde(rename = "o1_preview_2024_09_12")]
    O1Preview20240912,
    #[strum(serialize = "o1_mini")]
    #[serde(rename = "o1_mini")]
    O1Mini,
    #[strum(serialize = "o1_mini_2024_09_12")]
    #[serde(rename = "o1_mini_2024_09_12")]
    O1Mini20240912,
    #[strum(serialize = "gemini_1_5_pro")]
    #[serde(rename = "gemini_1_5_pro")]
    Gemini1_5Pro,
    #[strum(serialize = "gemini_1_5_pro_latest")]
    #[serde(rename = "gemini_1_5_pro_latest")]
    Gemini1_5ProLatest,
    #[strum(serialize = "gemini_1_5_pro_001")]
    #[serde(rename = "gemini_1_5_pro_001")]
    Gemini1_5Pro001,
    #[strum(serialize = "gemini_1_5_pro_002")]
    #[serde(rename = "gemini_1_5_pro_002")]
    Gemini1_5Pro002,
    #[strum(serialize = "gemini_1_5_pro_exp_0801")]
    #[serde(rename = "gemini_1_5_pro_exp_0801")]
    Gemini1_5ProExp0801,
    #[strum(serialize = "gemini_1_5_pro_exp_0827")]
    #[serde(rename = "gemini_1_5_pro_exp_0827")]
    Gemini1_5ProExp0827,
    #[strum(serialize = "gemini_1_5_flash")]
    #[serde(rename = "gemini_1_5_flash")]
    Gemini1_5Flash,
    #[strum(serialize = "gemini_1_5_flash_latest")]
    #[serde(rename = "gemini_1_5_flash_latest")]
    Gemini1_5FlashLatest,
    #[strum(serialize = "gemini_1_5_flash_001")]
    #[serde(rename = "gemini_1_5_flash_001")]
    Gemini1_5Flash001,
    #[strum(serialize = "gemini_1_5_flash_001_tuning")]
    #[serde(rename = "gemini_1_5_flash_001_tuning")]
    Gemini1_5Flash001Tuning,
    #[strum(serialize = "gemini_1_5_flash_exp_0827")]
    #[serde(rename = "gemini_1_5_flash_exp_0827")]
    Gemini1_5FlashExp0827,
    #[strum(serialize = "gemini_1_5_flash_8b")]
    #[serde(rename = "gemini_1_5_flash_8b")]
    Gemini1_5Flash8b,
    #[strum(serialize = "gemini_1_5_flash_8b_exp_0827")]
    #[serde(rename = "gemini_1_5_flash_8b_exp_0827")]
    Gemini1_5Flash8bExp0827,
}

/// Which back-end a `ProviderEntry` in the catalog routes to.
///
/// `serde`'s own `rename`/`rename_all` are repeated alongside the `strum`
/// ones rather than derived from them — the two derives don't share
/// attributes, and `ProviderEntry.provider` round-trips through `serde`
/// while the catalog's outer JSON keys round-trip through `FromStr`/
/// `Display`, so both need to agree on the same wire strings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
pub enum ProviderId {
    #[strum(serialize = "openai")]
    #[serde(rename = "openai")]
    OpenAi,
    #[strum(serialize = "anthropic")]
    #[serde(rename = "anthropic")]
    Anthropic,
    #[strum(serialize = "gemini")]
    #[serde(rename = "gemini")]
    GoogleGemini,
    #[strum(serialize = "groq")]
    #[serde(rename = "groq")]
    Groq,
    #[strum(serialize = "togetherai")]
    #[serde(rename = "togetherai")]
    TogetherAi,
    #[strum(serialize = "mistralai")]
    #[serde(rename = "mistralai")]
    MistralAi,
    #[strum(serialize = "bedrock")]
    #[serde(rename = "bedrock")]
    Bedrock,
}

/// How a caller wants the `Planner` to weigh candidates against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, Default)]
#[strum(serialize_all = "snake_case")]
pub enum SpeedPriority {
    High,
    #[default]
    Low,
}
