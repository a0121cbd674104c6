//! Classification prompt.

/// Instruction preamble; the transcript text follows it
const INSTRUCTIONS: &str = "\
你是一位专门分析社交媒体视频内容的中文广告识别专家。请仔细阅读下面的视频语音转写文本，\
判断作者是否借日常记录或个人分享，隐晦地植入了商品或品牌的宣传信息，即使文中没有任何推荐语、营销语或购买引导。

请特别留意：
- 介绍拍摄、运动、学习或日常生活时顺带提到的具体品牌或产品；
- 对商品使用体验、效果或性能的描述，即使语气客观中立；
- 通过展示生活方式（摄影器材、学习工具、家居用品等）间接提高商品曝光；
- 可能引起观众兴趣或模仿欲望的物品描述；
- 在并不需要的场景下提及产品；
- 部分文本可能由英文歌词转写而来，应当排除。

只要出现真实商品、使用描述，或可能对观众的消费决定产生影响，都应视为潜在软广。

内容如下：
";

/// Required reply schema
const RESPONSE_SCHEMA: &str = "
请以JSON格式返回结果，包含以下字段：
- is_ad: 是否包含广告（true/false）
- ad_type: 广告类型（硬广/软广/无）
- product_name: 商品名称（如有，多个商品用、分隔）
- ad_text: 广告文本片段（如有）
- confidence: 置信度（0-1）
- timestamp: 时间戳（如有）

只返回JSON格式结果，不要其他文字。";

/// Build the classification prompt for a transcript's full text
#[must_use]
pub fn build_prompt(transcript_text: &str) -> String {
    let mut prompt =
        String::with_capacity(INSTRUCTIONS.len() + transcript_text.len() + RESPONSE_SCHEMA.len());
    prompt.push_str(INSTRUCTIONS);
    prompt.push_str(transcript_text.trim());
    prompt.push('\n');
    prompt.push_str(RESPONSE_SCHEMA);
    prompt
}
